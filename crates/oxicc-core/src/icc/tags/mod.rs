//! ICC tag types
//!
//! Every tag payload starts with a 4-byte type signature and 4 reserved
//! bytes. Each payload format is a struct implementing [`TagType`]; the
//! closed set of them is the [`Tag`] enum.
//!
//! See ICC.1:2001-04 Section 6.5 and ICC.1:2022 Section 10.

mod arrays;
mod curves;
mod data;
mod device;
mod lut;
mod measurement;
mod named;
mod pseq;
mod text;
mod unknown;

use std::fmt;

pub use arrays::{
    ArrayElement, NumberArray, S15Fixed16, S15Fixed16Array, U16Fixed16, U16Fixed16Array,
    UInt8Array, UInt16Array, UInt32Array, UInt64Array, XyzArray,
};
pub use curves::{Curve, CurveKind, ParametricCurveTag};
pub use data::{Data, DataFlag, DateTime, Signature, Text};
pub use device::{CrdInfo, Screening, ScreeningChannel, UcrBg, VcgtData, VcgtFormula, VideoCardGamma};
pub use lut::{Lut, LutPrecision, MAX_CHAN};
pub use measurement::{Measurement, ViewingConditions};
pub use named::{Colorant, ColorantTable, NamedColor, NamedColorEntry, NamedColorKind};
pub use pseq::{Description, ProfileSequenceDesc, SequenceEntry};
pub use text::{Mluc, MlucRecord, TextDescription};
pub use unknown::Unknown;

use super::error::IccError;
use super::header::{ColorSpace, IccHeader, ProfileVersion};
use super::io::IccFile;
use super::primitives::{ByteWriter, PcsEncoding};
use super::types::TypeSignature;
use crate::sat::SatArith;

pub(crate) type Result<T> = std::result::Result<T, IccError>;

/// Type signature plus reserved word.
pub const TAG_HEADER_SIZE: u32 = 8;

/// Profile-level facts some payload codecs depend on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TagContext {
    pub version: ProfileVersion,
    /// Data color space from the header
    pub color_space: ColorSpace,
    pub pcs: ColorSpace,
    /// Reject malformed date-time fields instead of repairing them
    pub strict_datetime: bool,
}

impl TagContext {
    pub fn from_header(header: &IccHeader, strict_datetime: bool) -> Self {
        Self {
            version: header.version,
            color_space: header.color_space,
            pcs: header.pcs,
            strict_datetime,
        }
    }

    /// The profile's default PCS encoding.
    pub fn pcs_encoding(&self) -> Result<PcsEncoding> {
        PcsEncoding::ProfileDefault.resolve(self.pcs, self.version)
    }
}

impl Default for TagContext {
    fn default() -> Self {
        Self {
            version: ProfileVersion::new(2, 2, 0),
            color_space: ColorSpace::Rgb,
            pcs: ColorSpace::Xyz,
            strict_datetime: false,
        }
    }
}

/// The contract every tag payload type implements.
///
/// `read` and `write` are provided in terms of `decode`/`encode`: they do
/// the file I/O, the type-signature check and the size bookkeeping.
pub trait TagType: fmt::Debug {
    fn type_signature(&self) -> TypeSignature;

    /// Smallest legal tag length, type header included.
    fn min_size(&self) -> u32 {
        TAG_HEADER_SIZE
    }

    /// Exact on-disk size including the type header. `u32::MAX` means the
    /// payload is too large to be encoded.
    fn get_size(&self, ctx: &TagContext) -> u32;

    /// Decode the payload that follows the 8-byte type header.
    fn decode(&mut self, body: &[u8], ctx: &TagContext) -> Result<()>;

    /// Encode the payload that follows the 8-byte type header.
    fn encode(&self, w: &mut ByteWriter, ctx: &TagContext) -> Result<()>;

    /// Human-readable rendering for `verbose >= 1`.
    fn dump_to(&self, out: &mut dyn fmt::Write, verbose: u32) -> fmt::Result;

    /// (Re)size payload storage to match the logical sizes.
    fn allocate(&mut self) -> Result<()>;

    /// Tiered dump. Level 0 prints nothing; formatting errors are dropped.
    fn dump(&self, out: &mut dyn fmt::Write, verbose: u32) {
        if verbose > 0 {
            let _ = self.dump_to(out, verbose);
        }
    }

    /// Read `len` bytes at `offset` and decode them.
    fn read(
        &mut self,
        file: &mut dyn IccFile,
        len: u32,
        offset: u32,
        ctx: &TagContext,
    ) -> Result<()> {
        let buf = read_tag_bytes(file, len, offset)?;
        check_type_header(&buf, self.type_signature(), self.min_size())?;
        self.decode(&buf[TAG_HEADER_SIZE as usize..], ctx)
    }

    /// Encode the complete tag, type header included.
    fn to_bytes(&self, ctx: &TagContext) -> Result<Vec<u8>> {
        let size = self.get_size(ctx);
        if size.is_saturated() {
            return Err(IccError::TooLarge("tag payload"));
        }
        let mut w = ByteWriter::with_capacity(size as usize)?;
        w.u32(self.type_signature().0);
        w.u32(0);
        self.encode(&mut w, ctx)?;
        if w.len() != size as usize {
            return Err(IccError::CorruptedData(format!(
                "'{}' encoded {} bytes but sized {}",
                self.type_signature(),
                w.len(),
                size
            )));
        }
        Ok(w.into_bytes())
    }

    /// Encode and write at `offset`, returning the bytes written.
    fn write(&self, file: &mut dyn IccFile, offset: u32, ctx: &TagContext) -> Result<u32> {
        let bytes = self.to_bytes(ctx)?;
        file.seek(offset as u64)?;
        file.write(&bytes)?;
        Ok(bytes.len() as u32)
    }
}

/// Read a whole tag into a scratch buffer.
pub(crate) fn read_tag_bytes(file: &mut dyn IccFile, len: u32, offset: u32) -> Result<Vec<u8>> {
    let len = len as usize;
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| IccError::Allocation { bytes: len })?;
    buf.resize(len, 0);
    file.read_exact_at(offset as u64, &mut buf)?;
    Ok(buf)
}

/// Check the minimum length and the embedded type signature.
pub(crate) fn check_type_header(buf: &[u8], expected: TypeSignature, min: u32) -> Result<()> {
    if buf.len() < min as usize || buf.len() < TAG_HEADER_SIZE as usize {
        return Err(IccError::TooSmall {
            expected: min as usize,
            actual: buf.len(),
        });
    }
    let found = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);
    if found != expected.0 {
        return Err(IccError::TypeMismatch {
            expected: expected.0,
            found,
        });
    }
    Ok(())
}

/// Type signature at the start of a tag buffer.
pub(crate) fn peek_type(buf: &[u8]) -> Option<TypeSignature> {
    let b: [u8; 4] = buf.get(..4)?.try_into().ok()?;
    Some(TypeSignature(u32::from_be_bytes(b)))
}

/// Replace `v` with a zeroed buffer of `n` elements unless it already holds
/// exactly `n`. Returns true when storage was replaced.
pub(crate) fn alloc_vec<T: Clone + Default>(v: &mut Vec<T>, n: usize) -> Result<bool> {
    if v.len() == n {
        return Ok(false);
    }
    *v = Vec::new();
    let bytes = n.sat_mul(std::mem::size_of::<T>());
    v.try_reserve_exact(n)
        .map_err(|_| IccError::Allocation { bytes })?;
    v.resize(n, T::default());
    Ok(true)
}

/// `usize` to a u32 size, saturating.
#[inline]
pub(crate) fn sat_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Element count from a body length: `(len - fixed) / elem`.
pub(crate) fn element_count(body_len: usize, fixed: usize, elem: usize) -> Result<usize> {
    if body_len.ovr_sub(fixed) {
        return Err(IccError::TooSmall {
            expected: fixed,
            actual: body_len,
        });
    }
    Ok((body_len - fixed) / elem)
}

macro_rules! tag_variants {
    ($($variant:ident($ty:ty) => $as_ref:ident, $as_mut:ident;)*) => {
        /// A decoded tag payload.
        #[derive(Debug, Clone)]
        pub enum Tag {
            $($variant($ty),)*
        }

        impl Tag {
            pub fn as_dyn(&self) -> &dyn TagType {
                match self {
                    $(Self::$variant(t) => t,)*
                }
            }

            pub fn as_dyn_mut(&mut self) -> &mut dyn TagType {
                match self {
                    $(Self::$variant(t) => t,)*
                }
            }

            $(
                pub fn $as_ref(&self) -> Option<&$ty> {
                    match self {
                        Self::$variant(t) => Some(t),
                        _ => None,
                    }
                }

                pub fn $as_mut(&mut self) -> Option<&mut $ty> {
                    match self {
                        Self::$variant(t) => Some(t),
                        _ => None,
                    }
                }
            )*
        }

        $(
            impl From<$ty> for Tag {
                fn from(t: $ty) -> Self {
                    Self::$variant(t)
                }
            }
        )*
    };
}

tag_variants! {
    UInt8Array(UInt8Array) => as_uint8_array, as_uint8_array_mut;
    UInt16Array(UInt16Array) => as_uint16_array, as_uint16_array_mut;
    UInt32Array(UInt32Array) => as_uint32_array, as_uint32_array_mut;
    UInt64Array(UInt64Array) => as_uint64_array, as_uint64_array_mut;
    U16Fixed16Array(U16Fixed16Array) => as_u16f16_array, as_u16f16_array_mut;
    S15Fixed16Array(S15Fixed16Array) => as_s15f16_array, as_s15f16_array_mut;
    Xyz(XyzArray) => as_xyz, as_xyz_mut;
    Curve(Curve) => as_curve, as_curve_mut;
    ParametricCurve(ParametricCurveTag) => as_parametric_curve, as_parametric_curve_mut;
    Data(Data) => as_data, as_data_mut;
    Text(Text) => as_text, as_text_mut;
    DateTime(DateTime) => as_date_time, as_date_time_mut;
    Lut(Lut) => as_lut, as_lut_mut;
    Measurement(Measurement) => as_measurement, as_measurement_mut;
    NamedColor(NamedColor) => as_named_color, as_named_color_mut;
    ColorantTable(ColorantTable) => as_colorant_table, as_colorant_table_mut;
    TextDescription(TextDescription) => as_text_description, as_text_description_mut;
    Mluc(Mluc) => as_mluc, as_mluc_mut;
    ProfileSequenceDesc(ProfileSequenceDesc) => as_profile_sequence_desc, as_profile_sequence_desc_mut;
    Signature(Signature) => as_signature, as_signature_mut;
    Screening(Screening) => as_screening, as_screening_mut;
    UcrBg(UcrBg) => as_ucr_bg, as_ucr_bg_mut;
    VideoCardGamma(VideoCardGamma) => as_video_card_gamma, as_video_card_gamma_mut;
    ViewingConditions(ViewingConditions) => as_viewing_conditions, as_viewing_conditions_mut;
    CrdInfo(CrdInfo) => as_crd_info, as_crd_info_mut;
    Unknown(Unknown) => as_unknown, as_unknown_mut;
}

impl Tag {
    /// An empty instance of the variant handling `type_sig`, or None when
    /// the type is not recognized.
    pub fn new_for_type(type_sig: TypeSignature) -> Option<Self> {
        let tag = match type_sig {
            TypeSignature::UINT8_ARRAY => UInt8Array::default().into(),
            TypeSignature::UINT16_ARRAY => UInt16Array::default().into(),
            TypeSignature::UINT32_ARRAY => UInt32Array::default().into(),
            TypeSignature::UINT64_ARRAY => UInt64Array::default().into(),
            TypeSignature::U16_FIXED16_ARRAY => U16Fixed16Array::default().into(),
            TypeSignature::S15_FIXED16_ARRAY => S15Fixed16Array::default().into(),
            TypeSignature::XYZ => XyzArray::default().into(),
            TypeSignature::CURVE => Curve::default().into(),
            TypeSignature::PARA => ParametricCurveTag::default().into(),
            TypeSignature::DATA => Data::default().into(),
            TypeSignature::TEXT => Text::default().into(),
            TypeSignature::DATE_TIME => DateTime::default().into(),
            TypeSignature::LUT8 => Lut::new(LutPrecision::Eight).into(),
            TypeSignature::LUT16 => Lut::new(LutPrecision::Sixteen).into(),
            TypeSignature::MEASUREMENT => Measurement::default().into(),
            TypeSignature::NAMED_COLOR => NamedColor::new(NamedColorKind::V1).into(),
            TypeSignature::NAMED_COLOR2 => NamedColor::new(NamedColorKind::V2).into(),
            TypeSignature::COLORANT_TABLE => ColorantTable::default().into(),
            TypeSignature::TEXT_DESCRIPTION => TextDescription::default().into(),
            TypeSignature::MLUC => Mluc::default().into(),
            TypeSignature::PROFILE_SEQUENCE_DESC => ProfileSequenceDesc::default().into(),
            TypeSignature::SIGNATURE => Signature::default().into(),
            TypeSignature::SCREENING => Screening::default().into(),
            TypeSignature::UCR_BG => UcrBg::default().into(),
            TypeSignature::VIDEO_CARD_GAMMA => VideoCardGamma::default().into(),
            TypeSignature::VIEWING_CONDITIONS => ViewingConditions::default().into(),
            TypeSignature::CRD_INFO => CrdInfo::default().into(),
            _ => return None,
        };
        Some(tag)
    }

    /// Decode a complete tag buffer (type header included) into the
    /// matching variant, falling back to [`Unknown`] when `allow_unknown`.
    pub fn from_bytes(buf: &[u8], ctx: &TagContext, allow_unknown: bool) -> Result<Self> {
        let type_sig = peek_type(buf).ok_or(IccError::TooSmall {
            expected: TAG_HEADER_SIZE as usize,
            actual: buf.len(),
        })?;
        let mut tag = match Self::new_for_type(type_sig) {
            Some(tag) => tag,
            None if allow_unknown => Unknown::default().into(),
            None => {
                return Err(IccError::UnknownTagType {
                    tag: 0,
                    type_sig: type_sig.0,
                })
            }
        };
        let mut file = super::io::MemFile::from_bytes(buf.to_vec());
        tag.read(&mut file, sat_u32(buf.len()), 0, ctx)?;
        Ok(tag)
    }

    pub fn type_signature(&self) -> TypeSignature {
        self.as_dyn().type_signature()
    }

    pub fn get_size(&self, ctx: &TagContext) -> u32 {
        self.as_dyn().get_size(ctx)
    }

    pub fn read(
        &mut self,
        file: &mut dyn IccFile,
        len: u32,
        offset: u32,
        ctx: &TagContext,
    ) -> Result<()> {
        self.as_dyn_mut().read(file, len, offset, ctx)
    }

    pub fn write(&self, file: &mut dyn IccFile, offset: u32, ctx: &TagContext) -> Result<u32> {
        self.as_dyn().write(file, offset, ctx)
    }

    pub fn to_bytes(&self, ctx: &TagContext) -> Result<Vec<u8>> {
        self.as_dyn().to_bytes(ctx)
    }

    pub fn dump(&self, out: &mut dyn fmt::Write, verbose: u32) {
        self.as_dyn().dump(out, verbose)
    }

    pub fn allocate(&mut self) -> Result<()> {
        self.as_dyn_mut().allocate()
    }

    /// Forward lookup through a `curv` or `para` tag.
    pub fn curve_fwd(&self, v: f64) -> Option<(f64, bool)> {
        match self {
            Self::Curve(c) => Some(c.lookup_fwd(v)),
            Self::ParametricCurve(c) => Some(c.lookup_fwd(v)),
            _ => None,
        }
    }

    /// Backward lookup through a `curv` or `para` tag.
    pub fn curve_bwd(&self, v: f64) -> Option<(f64, bool)> {
        match self {
            Self::Curve(c) => Some(c.lookup_bwd(v)),
            Self::ParametricCurve(c) => Some(c.lookup_bwd(v)),
            _ => None,
        }
    }

    /// First value of an `XYZ ` tag.
    pub fn xyz_value(&self) -> Option<super::types::XyzNumber> {
        self.as_xyz().and_then(|a| a.data.first().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_fallback() {
        let data = [b'u', b'n', b'k', b'n', 0, 0, 0, 0, 1, 2, 3, 4];
        let ctx = TagContext::default();

        let tag = Tag::from_bytes(&data, &ctx, true).unwrap();
        let unknown = tag.as_unknown().unwrap();
        assert_eq!(unknown.uttype, TypeSignature::from_bytes(*b"unkn"));
        assert_eq!(tag.to_bytes(&ctx).unwrap(), data.to_vec());

        assert!(matches!(
            Tag::from_bytes(&data, &ctx, false),
            Err(IccError::UnknownTagType { .. })
        ));
    }

    #[test]
    fn test_type_mismatch_is_structural() {
        let ctx = TagContext::default();
        let mut curve: Tag = Curve::default().into();
        let mut file = super::super::io::MemFile::from_bytes(b"XYZ \0\0\0\0\0\0\0\0".to_vec());
        let err = curve.read(&mut file, 12, 0, &ctx).unwrap_err();
        assert!(matches!(err, IccError::TypeMismatch { .. }));
    }

    #[test]
    fn test_every_known_type_constructs() {
        let ctx = TagContext::default();
        for sig in [
            TypeSignature::UINT8_ARRAY,
            TypeSignature::S15_FIXED16_ARRAY,
            TypeSignature::CURVE,
            TypeSignature::PARA,
            TypeSignature::TEXT,
            TypeSignature::LUT16,
            TypeSignature::NAMED_COLOR2,
            TypeSignature::TEXT_DESCRIPTION,
            TypeSignature::MLUC,
            TypeSignature::SIGNATURE,
            TypeSignature::CRD_INFO,
        ] {
            let tag = Tag::new_for_type(sig).unwrap();
            assert_eq!(tag.type_signature(), sig);
            assert!(tag.get_size(&ctx) >= TAG_HEADER_SIZE);
        }
        assert!(Tag::new_for_type(TypeSignature::LUT_A_TO_B).is_none());
    }

    #[test]
    fn test_alloc_vec_only_on_change() {
        let mut v: Vec<u16> = Vec::new();
        assert!(alloc_vec(&mut v, 4).unwrap());
        v[0] = 7;
        assert!(!alloc_vec(&mut v, 4).unwrap());
        assert_eq!(v[0], 7);
        assert!(alloc_vec(&mut v, 2).unwrap());
        assert_eq!(v, vec![0, 0]);
    }

    #[test]
    fn test_dump_level_zero_is_silent() {
        let mut out = String::new();
        Tag::from(Signature::default()).dump(&mut out, 0);
        assert!(out.is_empty());
        Tag::from(Signature::default()).dump(&mut out, 1);
        assert!(!out.is_empty());
    }
}
