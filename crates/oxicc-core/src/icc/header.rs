//! ICC Profile Header
//!
//! The header is exactly 128 bytes. Everything in it is decoded eagerly,
//! mutated by the building application, and finalized (size and ID) when
//! the profile is written.

use std::fmt;

use super::error::IccError;
use super::primitives::{ByteReader, ByteWriter};
use super::types::{DateTimeNumber, XyzNumber};
use crate::color::D50;

/// Profile file signature - must be 'acsp' (0x61637370)
pub const PROFILE_SIGNATURE: u32 = 0x61637370;

/// Header size, also the minimum valid profile size
pub const HEADER_SIZE: usize = 128;

/// Byte ranges zeroed in the header copy hashed for the profile ID.
pub(crate) const ID_ZEROED_RANGES: [std::ops::Range<usize>; 3] = [44..48, 64..68, 84..100];

/// ICC Profile Header (128 bytes)
#[derive(Debug, Clone, PartialEq)]
pub struct IccHeader {
    /// Profile size in bytes, recomputed on write
    pub size: u32,
    /// Preferred CMM type signature
    pub cmm_type: u32,
    pub version: ProfileVersion,
    pub device_class: ProfileClass,
    /// Color space of data (RGB, CMYK, etc.)
    pub color_space: ColorSpace,
    /// Profile connection space (XYZ or Lab)
    pub pcs: ColorSpace,
    pub creation_date: DateTimeNumber,
    /// Primary platform signature
    pub platform: u32,
    pub flags: u32,
    pub manufacturer: u32,
    pub model: u32,
    pub attributes: u64,
    /// Default rendering intent
    pub rendering_intent: RenderingIntent,
    /// PCS illuminant (should be D50)
    pub illuminant: XyzNumber,
    pub creator: u32,
    /// Profile ID (MD5 hash, or zero)
    pub profile_id: [u8; 16],
}

impl IccHeader {
    /// Fresh V2.2 header for a building application.
    pub fn new(device_class: ProfileClass, color_space: ColorSpace, pcs: ColorSpace) -> Self {
        let d50 = D50.xyz;
        Self {
            size: 0,
            cmm_type: 0,
            version: ProfileVersion::new(2, 2, 0),
            device_class,
            color_space,
            pcs,
            creation_date: DateTimeNumber::now(),
            platform: 0,
            flags: 0,
            manufacturer: 0,
            model: 0,
            attributes: 0,
            rendering_intent: RenderingIntent::Perceptual,
            illuminant: XyzNumber::new(d50.x, d50.y, d50.z),
            creator: 0,
            profile_id: [0; 16],
        }
    }

    /// Decode the fixed 128-byte header.
    pub fn read(data: &[u8], strict_datetime: bool) -> Result<Self, IccError> {
        if data.len() < HEADER_SIZE {
            return Err(IccError::TooSmall {
                expected: HEADER_SIZE,
                actual: data.len(),
            });
        }
        let mut r = ByteReader::new(&data[..HEADER_SIZE]);

        let size = r.u32()?;
        let cmm_type = r.u32()?;
        let major = r.u8()?;
        let minor_bugfix = r.u8()?;
        r.skip(2)?;
        let version = ProfileVersion::new(major, minor_bugfix >> 4, minor_bugfix & 0x0F);
        let device_class = ProfileClass::from_u32(r.u32()?)?;
        let color_space = ColorSpace::from_u32(r.u32()?)?;
        let pcs = ColorSpace::from_u32(r.u32()?)?;
        let creation_date = r.date_time(strict_datetime)?;

        let signature = r.u32()?;
        if signature != PROFILE_SIGNATURE {
            return Err(IccError::InvalidSignature(signature));
        }

        let platform = r.u32()?;
        let flags = r.u32()?;
        let manufacturer = r.u32()?;
        let model = r.u32()?;
        let attributes = r.u64()?;
        let rendering_intent = RenderingIntent::from_u32(r.u32()?)?;
        let illuminant = r.xyz()?;
        let creator = r.u32()?;
        let mut profile_id = [0u8; 16];
        profile_id.copy_from_slice(r.bytes(16)?);

        Ok(Self {
            size,
            cmm_type,
            version,
            device_class,
            color_space,
            pcs,
            creation_date,
            platform,
            flags,
            manufacturer,
            model,
            attributes,
            rendering_intent,
            illuminant,
            creator,
            profile_id,
        })
    }

    /// Encode into 128 bytes. The reserved tail is zero.
    pub fn write(&self) -> Result<[u8; HEADER_SIZE], IccError> {
        if self.version.minor > 15 || self.version.bugfix > 15 {
            return Err(IccError::NotRepresentable {
                field: "profile version",
                value: self.version.minor as f64,
            });
        }
        let mut w = ByteWriter::with_capacity(HEADER_SIZE)?;
        w.u32(self.size);
        w.u32(self.cmm_type);
        w.u8(self.version.major);
        w.u8((self.version.minor << 4) | self.version.bugfix);
        w.zeros(2);
        w.u32(self.device_class.to_u32());
        w.u32(self.color_space.to_u32());
        w.u32(self.pcs.to_u32());
        w.date_time(self.creation_date)?;
        w.u32(PROFILE_SIGNATURE);
        w.u32(self.platform);
        w.u32(self.flags);
        w.u32(self.manufacturer);
        w.u32(self.model);
        w.u64(self.attributes);
        w.u32(self.rendering_intent.to_u32());
        w.xyz(self.illuminant)?;
        w.u32(self.creator);
        if self.version.class() >= VersionClass::V4_1 {
            w.bytes(&self.profile_id);
        } else {
            w.zeros(16);
        }
        w.zeros(HEADER_SIZE - w.len());

        let mut out = [0u8; HEADER_SIZE];
        out.copy_from_slice(w.as_bytes());
        Ok(out)
    }

    /// Human-readable rendering, tiered by verbosity.
    pub fn dump(&self, out: &mut dyn fmt::Write, verbose: u32) {
        if verbose == 0 {
            return;
        }
        let _ = writeln!(out, "Header:");
        let _ = writeln!(out, "  size         = {} bytes", self.size);
        let _ = writeln!(out, "  version      = {}", self.version);
        let _ = writeln!(out, "  class        = {:?}", self.device_class);
        let _ = writeln!(out, "  color space  = {:?}", self.color_space);
        let _ = writeln!(out, "  PCS          = {:?}", self.pcs);
        let _ = writeln!(out, "  intent       = {:?}", self.rendering_intent);
        if verbose >= 2 {
            let _ = writeln!(out, "  created      = {}", self.creation_date);
            let _ = writeln!(out, "  illuminant   = {}", self.illuminant);
            let _ = writeln!(out, "  flags        = 0x{:08X}", self.flags);
            let _ = writeln!(out, "  attributes   = 0x{:016X}", self.attributes);
            let _ = writeln!(out, "  manufacturer = {}", super::error::sig_str(self.manufacturer));
            let _ = writeln!(out, "  model        = {}", super::error::sig_str(self.model));
            let _ = writeln!(out, "  creator      = {}", super::error::sig_str(self.creator));
            let id: String = self.profile_id.iter().map(|b| format!("{:02x}", b)).collect();
            let _ = writeln!(out, "  profile ID   = {}", id);
        }
    }
}

/// ICC Profile Version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProfileVersion {
    pub major: u8,
    pub minor: u8,
    pub bugfix: u8,
}

impl ProfileVersion {
    pub const fn new(major: u8, minor: u8, bugfix: u8) -> Self {
        Self {
            major,
            minor,
            bugfix,
        }
    }

    /// Check if this is a v4 (or later) profile
    pub fn is_v4(&self) -> bool {
        self.major >= 4
    }

    /// Derived version class.
    pub fn class(&self) -> VersionClass {
        match (self.major, self.minor) {
            (0..=1, _) => VersionClass::V1,
            (2, 0) => VersionClass::V2_0,
            (2, 1) => VersionClass::V2_1,
            (2, 2) => VersionClass::V2_2,
            (2, 3) => VersionClass::V2_3,
            (2, _) => VersionClass::V2_4,
            (3, _) | (4, 0) => VersionClass::V4_0,
            (4, 1) => VersionClass::V4_1,
            (4, 2) => VersionClass::V4_2,
            (4, 3) => VersionClass::V4_3,
            _ => VersionClass::V4_4,
        }
    }
}

impl fmt::Display for ProfileVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.bugfix)
    }
}

/// Version buckets the codecs care about, in release order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VersionClass {
    V1,
    V2_0,
    V2_1,
    V2_2,
    V2_3,
    V2_4,
    V4_0,
    V4_1,
    V4_2,
    V4_3,
    V4_4,
}

/// ICC Profile Class (Device Class)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileClass {
    /// Input device (scanner, camera)
    Input,
    /// Display device (monitor)
    Display,
    /// Output device (printer)
    Output,
    /// Device link
    DeviceLink,
    /// Color space conversion
    ColorSpace,
    /// Abstract profile
    Abstract,
    /// Named color profile
    NamedColor,
}

impl ProfileClass {
    pub fn from_u32(val: u32) -> Result<Self, IccError> {
        match &val.to_be_bytes() {
            b"scnr" => Ok(Self::Input),
            b"mntr" => Ok(Self::Display),
            b"prtr" => Ok(Self::Output),
            b"link" => Ok(Self::DeviceLink),
            b"spac" => Ok(Self::ColorSpace),
            b"abst" => Ok(Self::Abstract),
            b"nmcl" => Ok(Self::NamedColor),
            _ => Err(IccError::InvalidProfileClass(val)),
        }
    }

    pub fn to_u32(&self) -> u32 {
        match self {
            Self::Input => u32::from_be_bytes(*b"scnr"),
            Self::Display => u32::from_be_bytes(*b"mntr"),
            Self::Output => u32::from_be_bytes(*b"prtr"),
            Self::DeviceLink => u32::from_be_bytes(*b"link"),
            Self::ColorSpace => u32::from_be_bytes(*b"spac"),
            Self::Abstract => u32::from_be_bytes(*b"abst"),
            Self::NamedColor => u32::from_be_bytes(*b"nmcl"),
        }
    }
}

/// ICC Color Space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// XYZ
    Xyz,
    /// Lab
    Lab,
    /// Luv
    Luv,
    /// YCbCr
    YCbCr,
    /// Yxy
    Yxy,
    /// RGB
    Rgb,
    /// Grayscale
    Gray,
    /// HSV
    Hsv,
    /// HLS
    Hls,
    /// CMYK
    Cmyk,
    /// CMY
    Cmy,
    /// 2 color
    Color2,
    /// 3 color
    Color3,
    /// 4 color
    Color4,
    /// 5 color
    Color5,
    /// 6 color
    Color6,
    /// 7 color
    Color7,
    /// 8 color
    Color8,
    /// 9 color
    Color9,
    /// 10 color
    Color10,
    /// 11 color
    Color11,
    /// 12 color
    Color12,
    /// 13 color
    Color13,
    /// 14 color
    Color14,
    /// 15 color
    Color15,
}

impl ColorSpace {
    pub fn from_u32(val: u32) -> Result<Self, IccError> {
        match &val.to_be_bytes() {
            b"XYZ " => Ok(Self::Xyz),
            b"Lab " => Ok(Self::Lab),
            b"Luv " => Ok(Self::Luv),
            b"YCbr" => Ok(Self::YCbCr),
            b"Yxy " => Ok(Self::Yxy),
            b"RGB " => Ok(Self::Rgb),
            b"GRAY" => Ok(Self::Gray),
            b"HSV " => Ok(Self::Hsv),
            b"HLS " => Ok(Self::Hls),
            b"CMYK" => Ok(Self::Cmyk),
            b"CMY " => Ok(Self::Cmy),
            b"2CLR" => Ok(Self::Color2),
            b"3CLR" => Ok(Self::Color3),
            b"4CLR" => Ok(Self::Color4),
            b"5CLR" => Ok(Self::Color5),
            b"6CLR" => Ok(Self::Color6),
            b"7CLR" => Ok(Self::Color7),
            b"8CLR" => Ok(Self::Color8),
            b"9CLR" => Ok(Self::Color9),
            b"ACLR" => Ok(Self::Color10),
            b"BCLR" => Ok(Self::Color11),
            b"CCLR" => Ok(Self::Color12),
            b"DCLR" => Ok(Self::Color13),
            b"ECLR" => Ok(Self::Color14),
            b"FCLR" => Ok(Self::Color15),
            _ => Err(IccError::InvalidColorSpace(val)),
        }
    }

    pub fn to_u32(&self) -> u32 {
        match self {
            Self::Xyz => u32::from_be_bytes(*b"XYZ "),
            Self::Lab => u32::from_be_bytes(*b"Lab "),
            Self::Luv => u32::from_be_bytes(*b"Luv "),
            Self::YCbCr => u32::from_be_bytes(*b"YCbr"),
            Self::Yxy => u32::from_be_bytes(*b"Yxy "),
            Self::Rgb => u32::from_be_bytes(*b"RGB "),
            Self::Gray => u32::from_be_bytes(*b"GRAY"),
            Self::Hsv => u32::from_be_bytes(*b"HSV "),
            Self::Hls => u32::from_be_bytes(*b"HLS "),
            Self::Cmyk => u32::from_be_bytes(*b"CMYK"),
            Self::Cmy => u32::from_be_bytes(*b"CMY "),
            Self::Color2 => u32::from_be_bytes(*b"2CLR"),
            Self::Color3 => u32::from_be_bytes(*b"3CLR"),
            Self::Color4 => u32::from_be_bytes(*b"4CLR"),
            Self::Color5 => u32::from_be_bytes(*b"5CLR"),
            Self::Color6 => u32::from_be_bytes(*b"6CLR"),
            Self::Color7 => u32::from_be_bytes(*b"7CLR"),
            Self::Color8 => u32::from_be_bytes(*b"8CLR"),
            Self::Color9 => u32::from_be_bytes(*b"9CLR"),
            Self::Color10 => u32::from_be_bytes(*b"ACLR"),
            Self::Color11 => u32::from_be_bytes(*b"BCLR"),
            Self::Color12 => u32::from_be_bytes(*b"CCLR"),
            Self::Color13 => u32::from_be_bytes(*b"DCLR"),
            Self::Color14 => u32::from_be_bytes(*b"ECLR"),
            Self::Color15 => u32::from_be_bytes(*b"FCLR"),
        }
    }

    /// True for the two profile connection spaces.
    pub fn is_pcs(&self) -> bool {
        matches!(self, Self::Xyz | Self::Lab)
    }

    /// Get number of channels for this color space
    pub fn channels(&self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Color2 => 2,
            Self::Xyz
            | Self::Lab
            | Self::Luv
            | Self::YCbCr
            | Self::Yxy
            | Self::Rgb
            | Self::Hsv
            | Self::Hls
            | Self::Cmy
            | Self::Color3 => 3,
            Self::Cmyk | Self::Color4 => 4,
            Self::Color5 => 5,
            Self::Color6 => 6,
            Self::Color7 => 7,
            Self::Color8 => 8,
            Self::Color9 => 9,
            Self::Color10 => 10,
            Self::Color11 => 11,
            Self::Color12 => 12,
            Self::Color13 => 13,
            Self::Color14 => 14,
            Self::Color15 => 15,
        }
    }
}

/// ICC Rendering Intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderingIntent {
    /// Perceptual - best for photographs
    #[default]
    Perceptual,
    /// Relative colorimetric - preserves in-gamut colors
    RelativeColorimetric,
    /// Saturation - maintains saturation
    Saturation,
    /// Absolute colorimetric - preserves white point
    AbsoluteColorimetric,
}

impl RenderingIntent {
    pub fn from_u32(val: u32) -> Result<Self, IccError> {
        match val {
            0 => Ok(Self::Perceptual),
            1 => Ok(Self::RelativeColorimetric),
            2 => Ok(Self::Saturation),
            3 => Ok(Self::AbsoluteColorimetric),
            _ => Err(IccError::InvalidRenderingIntent(val)),
        }
    }

    pub fn to_u32(&self) -> u32 {
        match self {
            Self::Perceptual => 0,
            Self::RelativeColorimetric => 1,
            Self::Saturation => 2,
            Self::AbsoluteColorimetric => 3,
        }
    }
}
