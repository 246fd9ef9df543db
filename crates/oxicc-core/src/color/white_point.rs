//! CIE Standard Illuminant White Points
//!
//! Specified as CIE XYZ with Y = 1.0. D50 uses the ICC PCS illuminant
//! values exactly, since those are what profiles encode.

use crate::color::Xyz;

/// A white point definition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhitePoint {
    /// Name of the illuminant
    pub name: &'static str,
    /// CIE XYZ coordinates (Y normalized to 1.0)
    pub xyz: Xyz,
}

impl WhitePoint {
    pub const fn new(name: &'static str, x: f64, y: f64, z: f64) -> Self {
        Self {
            name,
            xyz: Xyz::new(x, y, z),
        }
    }

    /// An unnamed white point from measured XYZ.
    pub const fn from_xyz(xyz: Xyz) -> Self {
        Self {
            name: "media",
            xyz,
        }
    }

    /// Chromaticity coordinates (x, y)
    pub fn chromaticity(&self) -> (f64, f64) {
        let (x, y, _) = self.xyz.to_xyy();
        (x, y)
    }
}

/// ICC Profile Connection Space illuminant
pub const D50: WhitePoint = WhitePoint::new("D50", 0.9642, 1.0, 0.8249);

/// CIE Standard Illuminant D65 (Noon Daylight)
pub const D65: WhitePoint = WhitePoint::new("D65", 0.9505, 1.0, 1.0890);

/// CIE Standard Illuminant A (Incandescent)
pub const A: WhitePoint = WhitePoint::new("A", 1.0985, 1.0, 0.3558);

/// CIE Standard Illuminant E (Equal Energy)
pub const E: WhitePoint = WhitePoint::new("E", 1.0, 1.0, 1.0);

/// Check if two white points are approximately equal
pub fn white_points_equal(a: &WhitePoint, b: &WhitePoint, epsilon: f64) -> bool {
    a.xyz.approx_eq(&b.xyz, epsilon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_d50_is_icc_pcs() {
        assert_eq!(D50.xyz.to_array(), [0.9642, 1.0, 0.8249]);
    }

    #[test]
    fn test_chromaticity() {
        let (x, y) = D65.chromaticity();
        assert!((x - 0.3127).abs() < 0.001);
        assert!((y - 0.3290).abs() < 0.001);
    }

    #[test]
    fn test_white_points_equal() {
        assert!(white_points_equal(&D65, &D65, 0.001));
        assert!(!white_points_equal(&D65, &D50, 0.001));
        assert!(white_points_equal(&WhitePoint::from_xyz(E.xyz), &E, 1e-12));
    }
}
