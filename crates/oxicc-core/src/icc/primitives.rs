//! Primitive big-endian codec
//!
//! Fixed-point conversions fail with [`IccError::NotRepresentable`] rather
//! than clamping. [`ByteReader`] and [`ByteWriter`] do the byte-order work
//! for the tag and header codecs.

use log::warn;

use super::error::IccError;
use super::header::{ColorSpace, ProfileVersion};
use super::types::{DateTimeNumber, XyzNumber};

type Result<T> = std::result::Result<T, IccError>;

fn not_representable(field: &'static str, value: f64) -> IccError {
    IccError::NotRepresentable { field, value }
}

#[inline]
fn round_to_i64(v: f64) -> i64 {
    (v + 0.5).floor() as i64
}

/// u8Fixed8Number to double.
#[inline]
pub fn read_u8f8(raw: u16) -> f64 {
    raw as f64 / 256.0
}

/// Double to u8Fixed8Number. Valid range is `[0, 256)`.
pub fn write_u8f8(v: f64) -> Result<u16> {
    if !(0.0..256.0).contains(&v) {
        return Err(not_representable("u8Fixed8", v));
    }
    Ok(round_to_i64(v * 256.0).clamp(0, u16::MAX as i64) as u16)
}

/// u16Fixed16Number to double.
#[inline]
pub fn read_u16f16(raw: u32) -> f64 {
    raw as f64 / 65536.0
}

/// Double to u16Fixed16Number. Valid range is `[0, 65536)`.
pub fn write_u16f16(v: f64) -> Result<u32> {
    if !(0.0..65536.0).contains(&v) {
        return Err(not_representable("u16Fixed16", v));
    }
    Ok(round_to_i64(v * 65536.0).clamp(0, u32::MAX as i64) as u32)
}

/// s15Fixed16Number to double.
#[inline]
pub fn read_s15f16(raw: i32) -> f64 {
    raw as f64 / 65536.0
}

/// Double to s15Fixed16Number. Valid range is `[-32768, 32768)`.
pub fn write_s15f16(v: f64) -> Result<i32> {
    if !(-32768.0..32768.0).contains(&v) {
        return Err(not_representable("s15Fixed16", v));
    }
    Ok(round_to_i64(v * 65536.0).clamp(i32::MIN as i64, i32::MAX as i64) as i32)
}

/// 8-bit device coordinate to `[0, 1]`.
#[inline]
pub fn read_dcs8(raw: u8) -> f64 {
    raw as f64 / 255.0
}

/// `[0, 1]` to an 8-bit device coordinate.
pub fn write_dcs8(v: f64) -> Result<u8> {
    if !(0.0..=1.0).contains(&v) {
        return Err(not_representable("8-bit device coordinate", v));
    }
    Ok(round_to_i64(v * 255.0) as u8)
}

/// 16-bit device coordinate to `[0, 1]`.
#[inline]
pub fn read_dcs16(raw: u16) -> f64 {
    raw as f64 / 65535.0
}

/// `[0, 1]` to a 16-bit device coordinate.
pub fn write_dcs16(v: f64) -> Result<u16> {
    if !(0.0..=1.0).contains(&v) {
        return Err(not_representable("16-bit device coordinate", v));
    }
    Ok(round_to_i64(v * 65535.0) as u16)
}

/// Encoding used for a profile connection space triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcsEncoding {
    /// Whatever the profile's PCS and version imply.
    ProfileDefault,
    /// u1Fixed15 XYZ in 16 bits per component.
    Xyz,
    /// Lab in 8 bits per component.
    Lab8,
    /// Legacy 16-bit Lab (L 0..100 over 0..0xFF00).
    LabV2,
    /// V4 16-bit Lab (L 0..100 over 0..0xFFFF).
    LabV4,
}

impl PcsEncoding {
    /// Resolve [`PcsEncoding::ProfileDefault`] against a PCS and version.
    pub fn resolve(self, pcs: ColorSpace, version: ProfileVersion) -> Result<Self> {
        match self {
            Self::ProfileDefault => match pcs {
                ColorSpace::Xyz => Ok(Self::Xyz),
                ColorSpace::Lab if version.is_v4() => Ok(Self::LabV4),
                ColorSpace::Lab => Ok(Self::LabV2),
                other => Err(IccError::InvalidColorSpace(other.to_u32())),
            },
            other => Ok(other),
        }
    }

    /// Encoded size of one triple.
    pub const fn size(self) -> usize {
        match self {
            Self::Lab8 => 3,
            _ => 6,
        }
    }
}

const XYZ16_SCALE: f64 = 32768.0;

/// Sequential big-endian reader over a tag or header buffer.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn set_pos(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(IccError::TooSmall {
                expected: pos,
                actual: self.data.len(),
            });
        }
        self.pos = pos;
        Ok(())
    }

    pub fn bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(IccError::TooSmall {
                expected: self.pos.saturating_add(n),
                actual: self.data.len(),
            });
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.bytes(n).map(|_| ())
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(N)?);
        Ok(out)
    }

    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.array::<1>()?[0])
    }

    pub fn u16(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.array()?))
    }

    pub fn u32(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.array()?))
    }

    /// 64-bit value stored as a high/low 32-bit pair.
    pub fn u64(&mut self) -> Result<u64> {
        let hi = self.u32()? as u64;
        let lo = self.u32()? as u64;
        Ok((hi << 32) | lo)
    }

    pub fn i8(&mut self) -> Result<i8> {
        Ok(self.u8()? as i8)
    }

    pub fn i16(&mut self) -> Result<i16> {
        Ok(i16::from_be_bytes(self.array()?))
    }

    pub fn i32(&mut self) -> Result<i32> {
        Ok(i32::from_be_bytes(self.array()?))
    }

    pub fn i64(&mut self) -> Result<i64> {
        Ok(self.u64()? as i64)
    }

    pub fn u8f8(&mut self) -> Result<f64> {
        Ok(read_u8f8(self.u16()?))
    }

    pub fn u16f16(&mut self) -> Result<f64> {
        Ok(read_u16f16(self.u32()?))
    }

    pub fn s15f16(&mut self) -> Result<f64> {
        Ok(read_s15f16(self.i32()?))
    }

    pub fn dcs8(&mut self) -> Result<f64> {
        Ok(read_dcs8(self.u8()?))
    }

    pub fn dcs16(&mut self) -> Result<f64> {
        Ok(read_dcs16(self.u16()?))
    }

    pub fn xyz(&mut self) -> Result<XyzNumber> {
        Ok(XyzNumber::new(self.s15f16()?, self.s15f16()?, self.s15f16()?))
    }

    /// Date-time with the non-strict repair tier applied unless `strict`.
    pub fn date_time(&mut self, strict: bool) -> Result<DateTimeNumber> {
        let raw = DateTimeNumber {
            year: self.u16()?,
            month: self.u16()?,
            day: self.u16()?,
            hour: self.u16()?,
            minute: self.u16()?,
            second: self.u16()?,
        };
        repair_date_time(raw, strict)
    }

    /// One PCS triple in the given (already resolved) encoding.
    pub fn pcs(&mut self, enc: PcsEncoding) -> Result<[f64; 3]> {
        match enc {
            PcsEncoding::ProfileDefault => Err(IccError::Unsupported(
                "unresolved PCS encoding".into(),
            )),
            PcsEncoding::Xyz => Ok([
                self.u16()? as f64 / XYZ16_SCALE,
                self.u16()? as f64 / XYZ16_SCALE,
                self.u16()? as f64 / XYZ16_SCALE,
            ]),
            PcsEncoding::Lab8 => Ok([
                self.u8()? as f64 * 100.0 / 255.0,
                self.u8()? as f64 - 128.0,
                self.u8()? as f64 - 128.0,
            ]),
            PcsEncoding::LabV2 => Ok([
                self.u16()? as f64 * 100.0 / 65280.0,
                self.u16()? as f64 / 256.0 - 128.0,
                self.u16()? as f64 / 256.0 - 128.0,
            ]),
            PcsEncoding::LabV4 => Ok([
                self.u16()? as f64 * 100.0 / 65535.0,
                self.u16()? as f64 / 257.0 - 128.0,
                self.u16()? as f64 / 257.0 - 128.0,
            ]),
        }
    }

    /// NUL-terminated ASCII in a fixed-width field.
    pub fn fixed_ascii(&mut self, width: usize) -> Result<String> {
        let raw = self.bytes(width)?;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        Ok(raw[..end].iter().map(|&b| b as char).collect())
    }
}

/// The date-time repair tier.
///
/// A known legacy encoder wrote month/year, hour/day and second/minute
/// swapped. That exact pattern is swapped back. Anything else out of range
/// is clamped field by field.
pub fn repair_date_time(raw: DateTimeNumber, strict: bool) -> Result<DateTimeNumber> {
    if raw.is_valid() {
        return Ok(raw);
    }
    if strict {
        return Err(IccError::CorruptedData(format!("invalid date-time {}", raw)));
    }
    let swapped = DateTimeNumber {
        year: raw.month,
        month: raw.year,
        day: raw.hour,
        hour: raw.day,
        minute: raw.second,
        second: raw.minute,
    };
    if swapped.is_valid() {
        warn!("date-time {} has swapped fields, repaired to {}", raw, swapped);
        return Ok(swapped);
    }
    let clamped = DateTimeNumber {
        year: raw.year.clamp(1900, 3000),
        month: raw.month.clamp(1, 12),
        day: raw.day.clamp(1, 31),
        hour: raw.hour.min(23),
        minute: raw.minute.min(59),
        second: raw.second.min(59),
    };
    warn!("date-time {} out of range, clamped to {}", raw, clamped);
    Ok(clamped)
}

/// Big-endian writer building a tag or header buffer.
#[derive(Debug, Clone, Default)]
pub struct ByteWriter {
    data: Vec<u8>,
}

impl ByteWriter {
    /// Writer with `capacity` bytes reserved up front.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(capacity)
            .map_err(|_| IccError::Allocation { bytes: capacity })?;
        Ok(Self { data })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn bytes(&mut self, b: &[u8]) {
        self.data.extend_from_slice(b);
    }

    pub fn zeros(&mut self, n: usize) {
        self.data.resize(self.data.len() + n, 0);
    }

    /// Overwrite previously written bytes.
    pub fn patch(&mut self, at: usize, b: &[u8]) -> Result<()> {
        let end = at.checked_add(b.len()).ok_or(IccError::TooLarge("patch"))?;
        if end > self.data.len() {
            return Err(IccError::TooSmall {
                expected: end,
                actual: self.data.len(),
            });
        }
        self.data[at..end].copy_from_slice(b);
        Ok(())
    }

    pub fn u8(&mut self, v: u8) {
        self.data.push(v);
    }

    pub fn u16(&mut self, v: u16) {
        self.bytes(&v.to_be_bytes());
    }

    pub fn u32(&mut self, v: u32) {
        self.bytes(&v.to_be_bytes());
    }

    /// 64-bit value as a high/low 32-bit pair.
    pub fn u64(&mut self, v: u64) {
        self.u32((v >> 32) as u32);
        self.u32(v as u32);
    }

    pub fn i8(&mut self, v: i8) {
        self.u8(v as u8);
    }

    pub fn i16(&mut self, v: i16) {
        self.bytes(&v.to_be_bytes());
    }

    pub fn i32(&mut self, v: i32) {
        self.bytes(&v.to_be_bytes());
    }

    pub fn i64(&mut self, v: i64) {
        self.u64(v as u64);
    }

    /// Write a `usize` count into a u32 field.
    pub fn count32(&mut self, field: &'static str, n: usize) -> Result<()> {
        let v = u32::try_from(n).map_err(|_| not_representable(field, n as f64))?;
        self.u32(v);
        Ok(())
    }

    /// Write a `usize` count into a u16 field.
    pub fn count16(&mut self, field: &'static str, n: usize) -> Result<()> {
        let v = u16::try_from(n).map_err(|_| not_representable(field, n as f64))?;
        self.u16(v);
        Ok(())
    }

    /// Write a `usize` count into a u8 field.
    pub fn count8(&mut self, field: &'static str, n: usize) -> Result<()> {
        let v = u8::try_from(n).map_err(|_| not_representable(field, n as f64))?;
        self.u8(v);
        Ok(())
    }

    pub fn u8f8(&mut self, v: f64) -> Result<()> {
        self.u16(write_u8f8(v)?);
        Ok(())
    }

    pub fn u16f16(&mut self, v: f64) -> Result<()> {
        self.u32(write_u16f16(v)?);
        Ok(())
    }

    pub fn s15f16(&mut self, v: f64) -> Result<()> {
        self.i32(write_s15f16(v)?);
        Ok(())
    }

    pub fn dcs8(&mut self, v: f64) -> Result<()> {
        self.u8(write_dcs8(v)?);
        Ok(())
    }

    pub fn dcs16(&mut self, v: f64) -> Result<()> {
        self.u16(write_dcs16(v)?);
        Ok(())
    }

    pub fn xyz(&mut self, v: XyzNumber) -> Result<()> {
        self.s15f16(v.x)?;
        self.s15f16(v.y)?;
        self.s15f16(v.z)
    }

    /// Date-time, range-checked.
    pub fn date_time(&mut self, d: DateTimeNumber) -> Result<()> {
        if !d.is_valid() {
            return Err(not_representable("dateTimeNumber", d.year as f64));
        }
        for v in [d.year, d.month, d.day, d.hour, d.minute, d.second] {
            self.u16(v);
        }
        Ok(())
    }

    /// One PCS triple in the given (already resolved) encoding.
    pub fn pcs(&mut self, enc: PcsEncoding, v: [f64; 3]) -> Result<()> {
        fn scaled16(field: &'static str, v: f64) -> Result<u16> {
            let r = round_to_i64(v);
            if !(0..=65535).contains(&r) || !v.is_finite() {
                return Err(not_representable(field, v));
            }
            Ok(r as u16)
        }
        fn scaled8(field: &'static str, v: f64) -> Result<u8> {
            let r = round_to_i64(v);
            if !(0..=255).contains(&r) || !v.is_finite() {
                return Err(not_representable(field, v));
            }
            Ok(r as u8)
        }
        match enc {
            PcsEncoding::ProfileDefault => {
                return Err(IccError::Unsupported("unresolved PCS encoding".into()));
            }
            PcsEncoding::Xyz => {
                for c in v {
                    self.u16(scaled16("PCS XYZ", c * XYZ16_SCALE)?);
                }
            }
            PcsEncoding::Lab8 => {
                self.u8(scaled8("PCS L*", v[0] * 255.0 / 100.0)?);
                self.u8(scaled8("PCS a*", v[1] + 128.0)?);
                self.u8(scaled8("PCS b*", v[2] + 128.0)?);
            }
            PcsEncoding::LabV2 => {
                self.u16(scaled16("PCS L*", v[0] * 65280.0 / 100.0)?);
                self.u16(scaled16("PCS a*", (v[1] + 128.0) * 256.0)?);
                self.u16(scaled16("PCS b*", (v[2] + 128.0) * 256.0)?);
            }
            PcsEncoding::LabV4 => {
                self.u16(scaled16("PCS L*", v[0] * 65535.0 / 100.0)?);
                self.u16(scaled16("PCS a*", (v[1] + 128.0) * 257.0)?);
                self.u16(scaled16("PCS b*", (v[2] + 128.0) * 257.0)?);
            }
        }
        Ok(())
    }

    /// NUL-padded ASCII in a fixed-width field. Must leave room for the NUL.
    pub fn fixed_ascii(&mut self, field: &'static str, s: &str, width: usize) -> Result<()> {
        if s.len() >= width || !s.is_ascii() {
            return Err(not_representable(field, s.len() as f64));
        }
        self.bytes(s.as_bytes());
        self.zeros(width - s.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_s15f16_range() {
        assert!(write_s15f16(-32768.0).is_ok());
        assert!(write_s15f16(32767.99).is_ok());
        assert!(write_s15f16(32768.0).is_err());
        assert!(write_s15f16(-32768.001).is_err());
        assert!(write_s15f16(f64::NAN).is_err());
    }

    #[test]
    fn test_s15f16_quantization() {
        for &x in &[0.0, 1.0, -1.5, 0.9642, 12345.678, -32767.123, 3.0e-5] {
            let back = read_s15f16(write_s15f16(x).unwrap());
            assert!((back - x).abs() <= 1.0 / 65536.0, "{x} -> {back}");
        }
    }

    #[test]
    fn test_unsigned_fixed_ranges() {
        assert!(write_u8f8(-0.1).is_err());
        assert!(write_u8f8(256.0).is_err());
        assert_eq!(write_u8f8(2.2).unwrap(), 563);
        assert!(write_u16f16(65536.0).is_err());
        assert_eq!(write_u16f16(1.0).unwrap(), 65536);
        assert!(write_dcs8(1.01).is_err());
        assert_eq!(write_dcs16(1.0).unwrap(), 65535);
    }

    #[test]
    fn test_u64_hi_lo() {
        let mut w = ByteWriter::default();
        w.u64(0x0102_0304_0506_0708);
        assert_eq!(w.as_bytes(), &[1, 2, 3, 4, 5, 6, 7, 8]);
        let mut r = ByteReader::new(w.as_bytes());
        assert_eq!(r.u64().unwrap(), 0x0102_0304_0506_0708);
    }

    #[test]
    fn test_short_read_is_structural() {
        let mut r = ByteReader::new(&[0, 1]);
        assert!(matches!(r.u32(), Err(IccError::TooSmall { .. })));
    }

    #[test]
    fn test_date_valid_passthrough() {
        let mut w = ByteWriter::default();
        for v in [2024u16, 2, 29, 23, 59, 59] {
            w.u16(v);
        }
        let d = ByteReader::new(w.as_bytes()).date_time(false).unwrap();
        assert_eq!((d.year, d.month, d.day), (2024, 2, 29));
    }

    #[test]
    fn test_date_swapped_repair() {
        let raw = DateTimeNumber {
            year: 7,
            month: 2003,
            day: 11,
            hour: 14,
            minute: 30,
            second: 12,
        };
        let fixed = repair_date_time(raw, false).unwrap();
        assert_eq!(
            fixed,
            DateTimeNumber {
                year: 2003,
                month: 7,
                day: 14,
                hour: 11,
                minute: 12,
                second: 30,
            }
        );
    }

    #[test]
    fn test_date_clamp_repair() {
        let raw = DateTimeNumber {
            year: 0,
            month: 13,
            day: 0,
            hour: 24,
            minute: 61,
            second: 99,
        };
        let fixed = repair_date_time(raw, false).unwrap();
        assert_eq!(
            fixed,
            DateTimeNumber {
                year: 1900,
                month: 12,
                day: 1,
                hour: 23,
                minute: 59,
                second: 59,
            }
        );
        assert!(repair_date_time(raw, true).is_err());
    }

    #[test]
    fn test_pcs_lab_encodings() {
        let lab = [50.0, -20.0, 30.0];
        for enc in [PcsEncoding::Lab8, PcsEncoding::LabV2, PcsEncoding::LabV4] {
            let mut w = ByteWriter::default();
            w.pcs(enc, lab).unwrap();
            assert_eq!(w.len(), enc.size());
            let back = ByteReader::new(w.as_bytes()).pcs(enc).unwrap();
            let tol = if enc == PcsEncoding::Lab8 { 0.5 } else { 0.01 };
            for i in 0..3 {
                assert!((back[i] - lab[i]).abs() < tol, "{enc:?} {back:?}");
            }
        }
    }

    #[test]
    fn test_pcs_default_resolution() {
        let v2 = ProfileVersion::new(2, 1, 0);
        let v4 = ProfileVersion::new(4, 3, 0);
        assert_eq!(
            PcsEncoding::ProfileDefault.resolve(ColorSpace::Lab, v2).unwrap(),
            PcsEncoding::LabV2
        );
        assert_eq!(
            PcsEncoding::ProfileDefault.resolve(ColorSpace::Lab, v4).unwrap(),
            PcsEncoding::LabV4
        );
        assert_eq!(
            PcsEncoding::ProfileDefault.resolve(ColorSpace::Xyz, v4).unwrap(),
            PcsEncoding::Xyz
        );
        assert!(PcsEncoding::ProfileDefault.resolve(ColorSpace::Rgb, v2).is_err());
    }

    #[test]
    fn test_pcs_xyz_range() {
        let mut w = ByteWriter::default();
        assert!(w.pcs(PcsEncoding::Xyz, [0.9642, 1.0, 0.8249]).is_ok());
        let mut w = ByteWriter::default();
        assert!(w.pcs(PcsEncoding::Xyz, [2.5, 1.0, 0.5]).is_err());
    }
}
