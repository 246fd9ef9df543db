//! ICC Profile Basic Types
//!
//! Signatures and the small fixed-layout records shared by the header and
//! the tag payloads.

use std::fmt;

use chrono::{Datelike, Timelike, Utc};

use super::error::sig_str;
use crate::color::Xyz;

/// ICC Tag Signature (4-byte ASCII code)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagSignature(pub u32);

impl TagSignature {
    /// Create from 4 ASCII characters
    pub const fn from_bytes(b: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(b))
    }

    pub const A2B0: Self = Self::from_bytes(*b"A2B0");
    pub const A2B1: Self = Self::from_bytes(*b"A2B1");
    pub const A2B2: Self = Self::from_bytes(*b"A2B2");
    pub const B2A0: Self = Self::from_bytes(*b"B2A0");
    pub const B2A1: Self = Self::from_bytes(*b"B2A1");
    pub const B2A2: Self = Self::from_bytes(*b"B2A2");
    pub const BLUE_COLORANT: Self = Self::from_bytes(*b"bXYZ");
    pub const BLUE_TRC: Self = Self::from_bytes(*b"bTRC");
    pub const CALIBRATION_DATE_TIME: Self = Self::from_bytes(*b"calt");
    pub const CHAR_TARGET: Self = Self::from_bytes(*b"targ");
    pub const CHAD: Self = Self::from_bytes(*b"chad");
    pub const COLORANT_TABLE: Self = Self::from_bytes(*b"clrt");
    pub const COLORANT_TABLE_OUT: Self = Self::from_bytes(*b"clot");
    pub const COPYRIGHT: Self = Self::from_bytes(*b"cprt");
    pub const CRD_INFO: Self = Self::from_bytes(*b"crdi");
    pub const DESC: Self = Self::from_bytes(*b"desc");
    pub const DEVICE_MFG_DESC: Self = Self::from_bytes(*b"dmnd");
    pub const DEVICE_MODEL_DESC: Self = Self::from_bytes(*b"dmdd");
    pub const GAMUT: Self = Self::from_bytes(*b"gamt");
    pub const GRAY_TRC: Self = Self::from_bytes(*b"kTRC");
    pub const GREEN_COLORANT: Self = Self::from_bytes(*b"gXYZ");
    pub const GREEN_TRC: Self = Self::from_bytes(*b"gTRC");
    pub const LUMINANCE: Self = Self::from_bytes(*b"lumi");
    pub const MEASUREMENT: Self = Self::from_bytes(*b"meas");
    pub const MEDIA_BLACK: Self = Self::from_bytes(*b"bkpt");
    pub const MEDIA_WHITE: Self = Self::from_bytes(*b"wtpt");
    pub const NAMED_COLOR: Self = Self::from_bytes(*b"ncol");
    pub const NAMED_COLOR2: Self = Self::from_bytes(*b"ncl2");
    pub const PREVIEW0: Self = Self::from_bytes(*b"pre0");
    pub const PREVIEW1: Self = Self::from_bytes(*b"pre1");
    pub const PREVIEW2: Self = Self::from_bytes(*b"pre2");
    pub const PROFILE_SEQUENCE_DESC: Self = Self::from_bytes(*b"pseq");
    pub const PS2_CRD0: Self = Self::from_bytes(*b"psd0");
    pub const PS2_CRD1: Self = Self::from_bytes(*b"psd1");
    pub const PS2_CRD2: Self = Self::from_bytes(*b"psd2");
    pub const PS2_CRD3: Self = Self::from_bytes(*b"psd3");
    pub const PS2_CSA: Self = Self::from_bytes(*b"ps2s");
    pub const PS2_RENDERING_INTENT: Self = Self::from_bytes(*b"ps2i");
    pub const RED_COLORANT: Self = Self::from_bytes(*b"rXYZ");
    pub const RED_TRC: Self = Self::from_bytes(*b"rTRC");
    pub const SCREENING_DESC: Self = Self::from_bytes(*b"scrd");
    pub const SCREENING: Self = Self::from_bytes(*b"scrn");
    pub const TECHNOLOGY: Self = Self::from_bytes(*b"tech");
    pub const UCR_BG: Self = Self::from_bytes(*b"bfd ");
    pub const VIDEO_CARD_GAMMA: Self = Self::from_bytes(*b"vcgt");
    pub const VIEW_COND_DESC: Self = Self::from_bytes(*b"vued");
    pub const VIEW_COND: Self = Self::from_bytes(*b"view");
    /// Private tag recording the absolute/relative cone matrix.
    pub const ABS_TO_REL: Self = Self::from_bytes(*b"arts");
}

impl fmt::Display for TagSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&sig_str(self.0))
    }
}

/// Type signatures for ICC tag data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeSignature(pub u32);

impl TypeSignature {
    pub const fn from_bytes(b: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(b))
    }

    pub const UINT8_ARRAY: Self = Self::from_bytes(*b"ui08");
    pub const UINT16_ARRAY: Self = Self::from_bytes(*b"ui16");
    pub const UINT32_ARRAY: Self = Self::from_bytes(*b"ui32");
    pub const UINT64_ARRAY: Self = Self::from_bytes(*b"ui64");
    pub const U16_FIXED16_ARRAY: Self = Self::from_bytes(*b"uf32");
    pub const S15_FIXED16_ARRAY: Self = Self::from_bytes(*b"sf32");
    pub const XYZ: Self = Self::from_bytes(*b"XYZ ");
    pub const CURVE: Self = Self::from_bytes(*b"curv");
    pub const PARA: Self = Self::from_bytes(*b"para");
    pub const DATA: Self = Self::from_bytes(*b"data");
    pub const TEXT: Self = Self::from_bytes(*b"text");
    pub const DATE_TIME: Self = Self::from_bytes(*b"dtim");
    pub const LUT8: Self = Self::from_bytes(*b"mft1");
    pub const LUT16: Self = Self::from_bytes(*b"mft2");
    pub const MEASUREMENT: Self = Self::from_bytes(*b"meas");
    pub const NAMED_COLOR: Self = Self::from_bytes(*b"ncol");
    pub const NAMED_COLOR2: Self = Self::from_bytes(*b"ncl2");
    pub const COLORANT_TABLE: Self = Self::from_bytes(*b"clrt");
    pub const TEXT_DESCRIPTION: Self = Self::from_bytes(*b"desc");
    pub const MLUC: Self = Self::from_bytes(*b"mluc");
    pub const PROFILE_SEQUENCE_DESC: Self = Self::from_bytes(*b"pseq");
    pub const SIGNATURE: Self = Self::from_bytes(*b"sig ");
    pub const SCREENING: Self = Self::from_bytes(*b"scrn");
    pub const UCR_BG: Self = Self::from_bytes(*b"bfd ");
    pub const VIDEO_CARD_GAMMA: Self = Self::from_bytes(*b"vcgt");
    pub const VIEWING_CONDITIONS: Self = Self::from_bytes(*b"view");
    pub const CRD_INFO: Self = Self::from_bytes(*b"crdi");
    pub const LUT_A_TO_B: Self = Self::from_bytes(*b"mAB ");
    pub const LUT_B_TO_A: Self = Self::from_bytes(*b"mBA ");
}

impl fmt::Display for TypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&sig_str(self.0))
    }
}

/// XYZNumber - ICC XYZ value (3 x s15Fixed16 on disk)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct XyzNumber {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl XyzNumber {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub const fn from_array(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }

    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Convert to Xyz color type
    pub fn to_xyz(self) -> Xyz {
        Xyz::new(self.x, self.y, self.z)
    }
}

impl From<Xyz> for XyzNumber {
    fn from(xyz: Xyz) -> Self {
        Self::new(xyz.x, xyz.y, xyz.z)
    }
}

impl fmt::Display for XyzNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X = {:.6}, Y = {:.6}, Z = {:.6}", self.x, self.y, self.z)
    }
}

/// dateTimeNumber - ICC date/time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateTimeNumber {
    pub year: u16,
    pub month: u16,
    pub day: u16,
    pub hour: u16,
    pub minute: u16,
    pub second: u16,
}

impl DateTimeNumber {
    /// Current UTC time.
    pub fn now() -> Self {
        let now = Utc::now();
        Self {
            year: now.year().clamp(1900, 3000) as u16,
            month: now.month() as u16,
            day: now.day() as u16,
            hour: now.hour() as u16,
            minute: now.minute() as u16,
            second: now.second() as u16,
        }
    }

    /// All fields inside their legal ranges.
    pub fn is_valid(&self) -> bool {
        (1900..=3000).contains(&self.year)
            && (1..=12).contains(&self.month)
            && (1..=31).contains(&self.day)
            && self.hour <= 23
            && self.minute <= 59
            && self.second <= 59
    }
}

impl fmt::Display for DateTimeNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_signature() {
        assert_eq!(TagSignature::DESC.to_string(), "desc");
        assert_eq!(TagSignature::RED_COLORANT.to_string(), "rXYZ");
        assert_eq!(TagSignature(0x0000_0001).to_string(), "0x00000001");
    }

    #[test]
    fn test_type_signature_bytes() {
        assert_eq!(TypeSignature::XYZ.0, 0x5859_5A20);
        assert_eq!(TypeSignature::LUT16.to_string(), "mft2");
    }

    #[test]
    fn test_now_is_valid() {
        assert!(DateTimeNumber::now().is_valid());
    }

    #[test]
    fn test_date_display() {
        let d = DateTimeNumber {
            year: 2004,
            month: 3,
            day: 9,
            hour: 14,
            minute: 5,
            second: 0,
        };
        assert_eq!(d.to_string(), "2004-03-09 14:05:00");
    }
}
