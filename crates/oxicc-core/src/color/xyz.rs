//! CIE XYZ Color Space
//!
//! XYZ is one of the two ICC profile connection spaces.

use std::ops::{Add, Mul, Sub};

/// CIE 1931 XYZ color coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Xyz {
    pub x: f64,
    /// Luminance
    pub y: f64,
    pub z: f64,
}

impl Xyz {
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub const fn from_array(arr: [f64; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }

    #[inline]
    pub const fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Scale all components by a factor
    #[inline]
    pub fn scale(&self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }

    /// Normalize so Y = 1.0
    #[inline]
    pub fn normalize(&self) -> Self {
        if self.y > 0.0 {
            self.scale(1.0 / self.y)
        } else {
            *self
        }
    }

    /// Convert to xyY as (x, y, Y)
    #[inline]
    pub fn to_xyy(&self) -> (f64, f64, f64) {
        let sum = self.x + self.y + self.z;
        if sum > 0.0 {
            (self.x / sum, self.y / sum, self.y)
        } else {
            (0.0, 0.0, 0.0)
        }
    }

    /// Create XYZ from xyY
    #[inline]
    pub fn from_xyy(x: f64, y: f64, big_y: f64) -> Self {
        if y > 0.0 {
            Self::new(x * big_y / y, big_y, (1.0 - x - y) * big_y / y)
        } else {
            Self::default()
        }
    }

    #[inline]
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        (self.x - other.x).abs() < epsilon
            && (self.y - other.y).abs() < epsilon
            && (self.z - other.z).abs() < epsilon
    }
}

impl From<[f64; 3]> for Xyz {
    fn from(arr: [f64; 3]) -> Self {
        Self::from_array(arr)
    }
}

impl From<Xyz> for [f64; 3] {
    fn from(xyz: Xyz) -> Self {
        xyz.to_array()
    }
}

impl Add for Xyz {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Xyz {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Xyz {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        self.scale(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xyy_roundtrip() {
        let original = Xyz::new(0.5, 0.6, 0.7);
        let (x, y, big_y) = original.to_xyy();
        assert!(original.approx_eq(&Xyz::from_xyy(x, y, big_y), 1e-10));
    }

    #[test]
    fn test_xyy_black() {
        assert_eq!(Xyz::from_xyy(0.3, 0.0, 1.0), Xyz::default());
        assert_eq!(Xyz::default().to_xyy(), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_normalize() {
        let n = Xyz::new(0.5, 0.25, 0.75).normalize();
        assert!(n.approx_eq(&Xyz::new(2.0, 1.0, 3.0), 1e-10));
    }

    #[test]
    fn test_arithmetic() {
        let a = Xyz::new(1.0, 2.0, 3.0);
        let b = Xyz::new(0.1, 0.2, 0.3);
        assert!((a + b).approx_eq(&Xyz::new(1.1, 2.2, 3.3), 1e-10));
        assert!((a - b).approx_eq(&Xyz::new(0.9, 1.8, 2.7), 1e-10));
        assert!((a * 2.0).approx_eq(&Xyz::new(2.0, 4.0, 6.0), 1e-10));
    }
}
