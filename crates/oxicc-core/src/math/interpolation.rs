//! Interpolation helpers

/// Linear interpolation between two values
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Lookup in a 1D LUT with linear interpolation
///
/// Input is clamped to `[0, 1]`; an empty table is the identity.
pub fn lut1d_interp(lut: &[f64], input: f64) -> f64 {
    if lut.is_empty() {
        return input;
    }
    if lut.len() == 1 {
        return lut[0];
    }

    let max_idx = (lut.len() - 1) as f64;
    let pos = (input * max_idx).clamp(0.0, max_idx);

    let i0 = pos.floor() as usize;
    let i1 = (i0 + 1).min(lut.len() - 1);
    let t = pos - i0 as f64;

    lerp(lut[i0], lut[i1], t)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-10;

    #[test]
    fn test_lerp() {
        assert!((lerp(0.0, 10.0, 0.5) - 5.0).abs() < EPSILON);
        assert!((lerp(2.0, 4.0, 0.0) - 2.0).abs() < EPSILON);
    }

    #[test]
    fn test_lut1d() {
        let lut = vec![0.0, 0.5, 1.0];

        assert!((lut1d_interp(&lut, 0.0) - 0.0).abs() < EPSILON);
        assert!((lut1d_interp(&lut, 0.25) - 0.25).abs() < EPSILON);
        assert!((lut1d_interp(&lut, 1.0) - 1.0).abs() < EPSILON);
        assert!((lut1d_interp(&lut, 1.5) - 1.0).abs() < EPSILON);
        assert!((lut1d_interp(&[], 0.3) - 0.3).abs() < EPSILON);
    }
}
