//! Accuracy measurement using perceptual color difference metrics
//!
//! CIEDE2000 is the primary metric for PCS comparisons. Raw XYZ values
//! are compared by absolute difference.

use palette::Lab;
use palette::color_difference::Ciede2000;
use palette::white_point::D50;

/// Statistics from a deltaE comparison
#[derive(Debug, Clone)]
pub struct DeltaEStats {
    /// Mean deltaE across all samples
    pub mean: f64,
    /// Maximum deltaE
    pub max: f64,
    /// 95th percentile deltaE
    pub p95: f64,
    /// Number of samples
    pub count: usize,
}

impl DeltaEStats {
    /// All differences imperceptible (deltaE < 1.0)
    pub fn is_excellent(&self) -> bool {
        self.max < 1.0
    }

    /// All differences barely perceptible (deltaE < 2.0)
    pub fn is_good(&self) -> bool {
        self.max < 2.0
    }
}

/// deltaE2000 between two D50 Lab colors.
pub fn delta_e_2000(lab1: [f64; 3], lab2: [f64; 3]) -> f64 {
    let a = Lab::<D50, f64>::new(lab1[0], lab1[1], lab1[2]);
    let b = Lab::<D50, f64>::new(lab2[0], lab2[1], lab2[2]);
    a.difference(b)
}

/// Compare two equally long Lab buffers.
pub fn compare_lab(reference: &[[f64; 3]], actual: &[[f64; 3]]) -> DeltaEStats {
    assert_eq!(reference.len(), actual.len(), "buffer length mismatch");
    let mut diffs: Vec<f64> = reference
        .iter()
        .zip(actual)
        .map(|(r, a)| delta_e_2000(*r, *a))
        .collect();
    diffs.sort_by(f64::total_cmp);

    let count = diffs.len();
    if count == 0 {
        return DeltaEStats {
            mean: 0.0,
            max: 0.0,
            p95: 0.0,
            count,
        };
    }
    let p95_idx = ((count as f64 * 0.95) as usize).min(count - 1);
    DeltaEStats {
        mean: diffs.iter().sum::<f64>() / count as f64,
        max: diffs[count - 1],
        p95: diffs[p95_idx],
        count,
    }
}

/// Largest absolute per-component difference.
pub fn max_abs_diff(reference: &[[f64; 3]], actual: &[[f64; 3]]) -> f64 {
    reference
        .iter()
        .zip(actual)
        .flat_map(|(r, a)| r.iter().zip(a).map(|(x, y)| (x - y).abs()))
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_is_zero() {
        let lab = [[50.0, 10.0, -10.0], [90.0, 0.0, 0.0]];
        let stats = compare_lab(&lab, &lab);
        assert_eq!(stats.max, 0.0);
        assert_eq!(stats.count, 2);
        assert!(stats.is_excellent());
    }

    #[test]
    fn test_lightness_step() {
        let de = delta_e_2000([50.0, 0.0, 0.0], [51.0, 0.0, 0.0]);
        assert!(de > 0.5 && de < 1.5, "deltaE {de}");
    }
}
