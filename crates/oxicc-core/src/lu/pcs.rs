//! PCS value conversions used around the wrapped transforms.

use crate::color::{Lab, Xyz};
use crate::icc::ColorSpace;
use crate::icc::tags::LutPrecision;

/// How one side of a Lut maps its values onto the `[0, 1]` table domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LutSide {
    /// Device values are already normalized.
    Device,
    /// u1Fixed15 XYZ.
    Xyz,
    /// 8-bit Lab: L over 0..255, a/b offset by 128.
    Lab8,
    /// Legacy 16-bit Lab: L 100 at 0xFF00, a/b 0 at 0x8000.
    Lab16,
}

const XYZ_SCALE: f64 = 32768.0 / 65535.0;
const LAB16_L: f64 = 65280.0 / 65535.0;
const LAB16_AB: f64 = 256.0 / 65535.0;

impl LutSide {
    pub(crate) fn for_space(space: ColorSpace, is_pcs: bool, precision: LutPrecision) -> Self {
        match (is_pcs, space, precision) {
            (false, ..) => Self::Device,
            (true, ColorSpace::Xyz, _) => Self::Xyz,
            (true, ColorSpace::Lab, LutPrecision::Eight) => Self::Lab8,
            (true, ColorSpace::Lab, LutPrecision::Sixteen) => Self::Lab16,
            (true, ..) => Self::Device,
        }
    }

    /// PCS value to table domain.
    pub(crate) fn normalize(self, v: &mut [f64]) {
        if v.len() < 3 {
            return;
        }
        match self {
            Self::Device => {}
            Self::Xyz => v[..3].iter_mut().for_each(|c| *c *= XYZ_SCALE),
            Self::Lab8 => {
                v[0] /= 100.0;
                v[1] = (v[1] + 128.0) / 255.0;
                v[2] = (v[2] + 128.0) / 255.0;
            }
            Self::Lab16 => {
                v[0] = v[0] / 100.0 * LAB16_L;
                v[1] = (v[1] + 128.0) * LAB16_AB;
                v[2] = (v[2] + 128.0) * LAB16_AB;
            }
        }
    }

    /// Table domain to PCS value.
    pub(crate) fn denormalize(self, v: &mut [f64]) {
        if v.len() < 3 {
            return;
        }
        match self {
            Self::Device => {}
            Self::Xyz => v[..3].iter_mut().for_each(|c| *c /= XYZ_SCALE),
            Self::Lab8 => {
                v[0] *= 100.0;
                v[1] = v[1] * 255.0 - 128.0;
                v[2] = v[2] * 255.0 - 128.0;
            }
            Self::Lab16 => {
                v[0] = v[0] / LAB16_L * 100.0;
                v[1] = v[1] / LAB16_AB - 128.0;
                v[2] = v[2] / LAB16_AB - 128.0;
            }
        }
    }
}

/// PCS triple in `space` to XYZ.
pub(crate) fn to_xyz(space: ColorSpace, v: [f64; 3]) -> Xyz {
    match space {
        ColorSpace::Lab => Lab::from_array(v).to_xyz(),
        _ => Xyz::from_array(v),
    }
}

/// XYZ to a PCS triple in `space`.
pub(crate) fn from_xyz(space: ColorSpace, xyz: Xyz) -> [f64; 3] {
    match space {
        ColorSpace::Lab => Lab::from_xyz(xyz).to_array(),
        _ => xyz.to_array(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lab16_white_and_neutral() {
        let mut v = [100.0, 0.0, 0.0];
        LutSide::Lab16.normalize(&mut v);
        assert!((v[0] * 65535.0 - 65280.0).abs() < 1e-6);
        assert!((v[1] * 65535.0 - 32768.0).abs() < 1e-6);
        LutSide::Lab16.denormalize(&mut v);
        assert!((v[0] - 100.0).abs() < 1e-9 && v[1].abs() < 1e-9);
    }

    #[test]
    fn test_xyz_one_is_half_scale() {
        let mut v = [1.0, 0.5, 0.0];
        LutSide::Xyz.normalize(&mut v);
        assert!((v[0] * 65535.0 - 32768.0).abs() < 1e-6);
    }

    #[test]
    fn test_lab8_range() {
        let mut v = [50.0, -128.0, 127.0];
        LutSide::Lab8.normalize(&mut v);
        assert_eq!(v, [0.5, 0.0, 1.0]);
    }

    #[test]
    fn test_device_side_untouched() {
        let side = LutSide::for_space(ColorSpace::Cmyk, false, LutPrecision::Sixteen);
        let mut v = [0.1, 0.2, 0.3, 0.4];
        side.normalize(&mut v);
        assert_eq!(v, [0.1, 0.2, 0.3, 0.4]);
    }
}
