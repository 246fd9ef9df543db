//! CIELUV and its cylindrical LCh(uv) form

use crate::color::lab::{lab_f, lab_f_inv};
use crate::color::{D50, Lch, WhitePoint, Xyz};

/// CIELUV color coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Luv {
    pub l: f64,
    pub u: f64,
    pub v: f64,
}

/// u'v' chromaticity of an XYZ value. Black maps to the origin.
fn uv_prime(xyz: Xyz) -> (f64, f64) {
    let den = xyz.x + 15.0 * xyz.y + 3.0 * xyz.z;
    if den <= 0.0 {
        return (0.0, 0.0);
    }
    (4.0 * xyz.x / den, 9.0 * xyz.y / den)
}

impl Luv {
    #[inline]
    pub const fn new(l: f64, u: f64, v: f64) -> Self {
        Self { l, u, v }
    }

    pub fn from_xyz(xyz: Xyz) -> Self {
        Self::from_xyz_with_white(xyz, &D50)
    }

    pub fn from_xyz_with_white(xyz: Xyz, white: &WhitePoint) -> Self {
        let l = 116.0 * lab_f(xyz.y / white.xyz.y) - 16.0;
        if xyz.x + 15.0 * xyz.y + 3.0 * xyz.z <= 0.0 {
            return Self::new(l, 0.0, 0.0);
        }
        let (up, vp) = uv_prime(xyz);
        let (wu, wv) = uv_prime(white.xyz);
        Self::new(l, 13.0 * l * (up - wu), 13.0 * l * (vp - wv))
    }

    pub fn to_xyz(&self) -> Xyz {
        self.to_xyz_with_white(&D50)
    }

    pub fn to_xyz_with_white(&self, white: &WhitePoint) -> Xyz {
        let y = lab_f_inv((self.l + 16.0) / 116.0) * white.xyz.y;
        if self.l <= 0.0 {
            return Xyz::new(0.0, y, 0.0);
        }
        let (wu, wv) = uv_prime(white.xyz);
        let up = self.u / (13.0 * self.l) + wu;
        let vp = self.v / (13.0 * self.l) + wv;
        if vp == 0.0 {
            return Xyz::new(0.0, y, 0.0);
        }
        let x = y * 9.0 * up / (4.0 * vp);
        let z = y * (12.0 - 3.0 * up - 20.0 * vp) / (4.0 * vp);
        Xyz::new(x, y, z)
    }

    /// Cylindrical form, hue in degrees.
    pub fn to_lch(&self) -> Lch {
        let h = self.v.atan2(self.u).to_degrees();
        Lch::new(self.l, self.u.hypot(self.v), if h < 0.0 { h + 360.0 } else { h })
    }

    pub fn from_lch(lch: Lch) -> Self {
        let (s, c) = lch.h.to_radians().sin_cos();
        Self::new(lch.l, lch.c * c, lch.c * s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_white_has_no_chroma() {
        let luv = Luv::from_xyz(D50.xyz);
        assert!((luv.l - 100.0).abs() < 1e-9);
        assert!(luv.u.abs() < 1e-9 && luv.v.abs() < 1e-9);
    }

    #[test]
    fn test_roundtrip() {
        for xyz in [
            Xyz::new(0.4, 0.3, 0.2),
            Xyz::new(0.05, 0.02, 0.3),
            Xyz::new(0.9, 0.95, 0.7),
        ] {
            let back = Luv::from_xyz(xyz).to_xyz();
            assert!(xyz.approx_eq(&back, 1e-9), "{xyz:?} vs {back:?}");
        }
    }

    #[test]
    fn test_lch_roundtrip() {
        let luv = Luv::new(40.0, 20.0, -15.0);
        let back = Luv::from_lch(luv.to_lch());
        assert!((back.u - luv.u).abs() < 1e-9 && (back.v - luv.v).abs() < 1e-9);
    }
}
