//! Per-channel curve kernels over interleaved pixel data
//!
//! `offset` selects the channel and `stride` is the pixel size in values.
//! Inputs are clamped to `[0, 1]`; the kernels return true if any value
//! needed clamping.

use multiversion::multiversion;

/// Apply `y = x^gamma` to one channel.
#[multiversion(targets("x86_64+avx2", "x86_64+sse4.1", "aarch64+neon",))]
pub fn gamma_strided(gamma: f64, data: &mut [f64], offset: usize, stride: usize) -> bool {
    let mut clip = false;
    for v in data.iter_mut().skip(offset).step_by(stride.max(1)) {
        let x = v.clamp(0.0, 1.0);
        clip |= x != *v;
        *v = x.powf(gamma);
    }
    clip
}

/// Linearly interpolate one channel through a table sampled evenly over
/// `[0, 1]`. An empty table is the identity.
#[multiversion(targets("x86_64+avx2", "x86_64+sse4.1", "aarch64+neon",))]
pub fn lut1d_strided(table: &[f64], data: &mut [f64], offset: usize, stride: usize) -> bool {
    let mut clip = false;
    let Some(&last) = table.last() else {
        for v in data.iter_mut().skip(offset).step_by(stride.max(1)) {
            let x = v.clamp(0.0, 1.0);
            clip |= x != *v;
            *v = x;
        }
        return clip;
    };
    let top = (table.len() - 1) as f64;

    for v in data.iter_mut().skip(offset).step_by(stride.max(1)) {
        let x = v.clamp(0.0, 1.0);
        clip |= x != *v;
        let pos = x * top;
        let idx = pos.floor() as usize;
        *v = match (table.get(idx), table.get(idx + 1)) {
            (Some(&a), Some(&b)) => a + (pos - idx as f64) * (b - a),
            _ => last,
        };
    }
    clip
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::lut1d_interp;

    #[test]
    fn test_gamma_one_channel() {
        let mut data = [0.5, 0.5, 0.5, 0.25, 0.25, 0.25];
        let clip = gamma_strided(2.2, &mut data, 1, 3);
        assert!(!clip);
        assert_eq!(data[0], 0.5);
        assert!((data[1] - 0.5f64.powf(2.2)).abs() < 1e-12);
        assert!((data[4] - 0.25f64.powf(2.2)).abs() < 1e-12);
        assert_eq!(data[5], 0.25);
    }

    #[test]
    fn test_table_matches_scalar_interp() {
        let table: Vec<f64> = (0..17).map(|i| (i as f64 / 16.0).powi(2)).collect();
        let inputs = [0.0, 0.1, 0.33, 0.5, 0.97, 1.0];
        let mut data = inputs;
        assert!(!lut1d_strided(&table, &mut data, 0, 1));
        for (x, y) in inputs.iter().zip(data) {
            assert!((lut1d_interp(&table, *x) - y).abs() < 1e-12);
        }
    }

    #[test]
    fn test_table_reports_clip() {
        let table = [0.0, 1.0];
        let mut data = [1.5, -0.5];
        assert!(lut1d_strided(&table, &mut data, 0, 1));
        assert_eq!(data, [1.0, 0.0]);
    }
}
