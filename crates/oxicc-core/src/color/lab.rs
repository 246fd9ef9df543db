//! CIELAB (L*a*b*) and its cylindrical LCh form
//!
//! - L*: Lightness (0 = black, 100 = white)
//! - a*: Green-red axis
//! - b*: Blue-yellow axis

use crate::color::{D50, WhitePoint, Xyz};

/// CIELAB color coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Lab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

impl Lab {
    #[inline]
    pub const fn new(l: f64, a: f64, b: f64) -> Self {
        Self { l, a, b }
    }

    #[inline]
    pub const fn from_array(arr: [f64; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }

    #[inline]
    pub const fn to_array(&self) -> [f64; 3] {
        [self.l, self.a, self.b]
    }

    /// Convert from XYZ relative to the D50 PCS white
    pub fn from_xyz(xyz: Xyz) -> Self {
        Self::from_xyz_with_white(xyz, &D50)
    }

    pub fn from_xyz_with_white(xyz: Xyz, white: &WhitePoint) -> Self {
        let fx = lab_f(xyz.x / white.xyz.x);
        let fy = lab_f(xyz.y / white.xyz.y);
        let fz = lab_f(xyz.z / white.xyz.z);

        Self {
            l: 116.0 * fy - 16.0,
            a: 500.0 * (fx - fy),
            b: 200.0 * (fy - fz),
        }
    }

    /// Convert to XYZ relative to the D50 PCS white
    pub fn to_xyz(&self) -> Xyz {
        self.to_xyz_with_white(&D50)
    }

    pub fn to_xyz_with_white(&self, white: &WhitePoint) -> Xyz {
        let fy = (self.l + 16.0) / 116.0;
        let fx = self.a / 500.0 + fy;
        let fz = fy - self.b / 200.0;

        Xyz::new(
            lab_f_inv(fx) * white.xyz.x,
            lab_f_inv(fy) * white.xyz.y,
            lab_f_inv(fz) * white.xyz.z,
        )
    }

    #[inline]
    pub fn chroma(&self) -> f64 {
        self.a.hypot(self.b)
    }

    /// Hue angle in degrees (0-360)
    #[inline]
    pub fn hue_degrees(&self) -> f64 {
        let h = self.b.atan2(self.a).to_degrees();
        if h < 0.0 { h + 360.0 } else { h }
    }

    pub fn to_lch(&self) -> Lch {
        Lch::new(self.l, self.chroma(), self.hue_degrees())
    }

    #[inline]
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        (self.l - other.l).abs() < epsilon
            && (self.a - other.a).abs() < epsilon
            && (self.b - other.b).abs() < epsilon
    }
}

/// Cylindrical Lab: lightness, chroma, hue in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Lch {
    pub l: f64,
    pub c: f64,
    pub h: f64,
}

impl Lch {
    #[inline]
    pub const fn new(l: f64, c: f64, h: f64) -> Self {
        Self { l, c, h }
    }

    pub fn to_lab(&self) -> Lab {
        let (s, c) = self.h.to_radians().sin_cos();
        Lab::new(self.l, self.c * c, self.c * s)
    }
}

/// Lab forward function f(t)
#[inline]
pub(crate) fn lab_f(t: f64) -> f64 {
    const DELTA: f64 = 6.0 / 29.0;
    const DELTA_CUBED: f64 = DELTA * DELTA * DELTA;

    if t > DELTA_CUBED {
        t.cbrt()
    } else {
        t / (3.0 * DELTA * DELTA) + 4.0 / 29.0
    }
}

/// Lab inverse function
#[inline]
pub(crate) fn lab_f_inv(t: f64) -> f64 {
    const DELTA: f64 = 6.0 / 29.0;

    if t > DELTA {
        t * t * t
    } else {
        3.0 * DELTA * DELTA * (t - 4.0 / 29.0)
    }
}

impl From<[f64; 3]> for Lab {
    fn from(arr: [f64; 3]) -> Self {
        Self::from_array(arr)
    }
}

impl From<Lab> for [f64; 3] {
    fn from(lab: Lab) -> Self {
        lab.to_array()
    }
}
