//! Localized text tag types
//!
//! - desc: ASCII, Unicode and ScriptCode renditions of one description (V2)
//! - mluc: records of language/country tagged UTF-16 strings (V4)
//!
//! See ICC.1:2001-04 Section 6.5.17 (desc) and ICC.1:2022 Section 10.15 (mluc)

use std::fmt;

use super::{alloc_vec, sat_u32, Result, TagContext, TagType, TAG_HEADER_SIZE};
use crate::icc::error::IccError;
use crate::icc::primitives::{ByteReader, ByteWriter};
use crate::icc::types::TypeSignature;
use crate::sat::{sat_add, sat_mul, SatArith};

/// Fixed width of the ScriptCode field.
pub const SCRIPT_CODE_LEN: usize = 67;

/// textDescriptionType
#[derive(Debug, Clone, PartialEq)]
pub struct TextDescription {
    /// ASCII byte count, including the NUL
    pub size: usize,
    pub desc: Vec<u8>,
    pub uc_lang_code: u32,
    /// Unicode character count, including the NUL
    pub uc_size: usize,
    pub uc_desc: Vec<u16>,
    pub sc_code: u16,
    /// ScriptCode byte count, at most 67
    pub sc_size: usize,
    pub sc_desc: [u8; SCRIPT_CODE_LEN],
}

impl Default for TextDescription {
    fn default() -> Self {
        Self {
            size: 0,
            desc: Vec::new(),
            uc_lang_code: 0,
            uc_size: 0,
            uc_desc: Vec::new(),
            sc_code: 0,
            sc_size: 0,
            sc_desc: [0; SCRIPT_CODE_LEN],
        }
    }
}

impl TextDescription {
    /// Description with only the ASCII rendition.
    pub fn new(ascii: &str) -> Self {
        let mut desc = Self::default();
        desc.set_ascii(ascii);
        desc
    }

    pub fn set_ascii(&mut self, ascii: &str) {
        let mut bytes = ascii.as_bytes().to_vec();
        bytes.push(0);
        self.size = bytes.len();
        self.desc = bytes;
    }

    /// Set the Unicode rendition, NUL terminated on disk.
    pub fn set_unicode(&mut self, lang_code: u32, text: &str) {
        let mut units: Vec<u16> = text.encode_utf16().collect();
        units.push(0);
        self.uc_lang_code = lang_code;
        self.uc_size = units.len();
        self.uc_desc = units;
    }

    /// ASCII rendition up to the NUL.
    pub fn ascii(&self) -> String {
        let end = self.desc.iter().position(|&b| b == 0).unwrap_or(self.desc.len());
        String::from_utf8_lossy(&self.desc[..end]).into_owned()
    }

    /// Unicode rendition up to the NUL.
    pub fn unicode(&self) -> String {
        let end = self.uc_desc.iter().position(|&c| c == 0).unwrap_or(self.uc_desc.len());
        String::from_utf16_lossy(&self.uc_desc[..end])
    }

    /// Payload size without the type header.
    pub(crate) fn body_size(&self) -> u32 {
        let ascii = sat_add(4, sat_u32(self.size));
        let unicode = sat_add(8, sat_mul(sat_u32(self.uc_size), 2));
        sat_add(sat_add(ascii, unicode), 3 + SCRIPT_CODE_LEN as u32)
    }

    /// Decode from a reader positioned just after the type header,
    /// consuming exactly the payload.
    pub(crate) fn decode_from(&mut self, r: &mut ByteReader<'_>) -> Result<()> {
        let count = r.u32()? as usize;
        if count > r.remaining() {
            return Err(IccError::TooSmall {
                expected: r.pos().saturating_add(count),
                actual: r.pos() + r.remaining(),
            });
        }
        self.size = count;
        let uc_at = r.pos() + count;
        r.set_pos(uc_at)?;
        self.uc_lang_code = r.u32()?;
        let uc_count = r.u32()? as usize;
        if uc_count > r.remaining() / 2 {
            return Err(IccError::TooSmall {
                expected: r.pos().saturating_add(uc_count.saturating_mul(2)),
                actual: r.pos() + r.remaining(),
            });
        }
        self.uc_size = uc_count;
        self.allocate()?;

        // Rewind to fill the ASCII part now that storage exists.
        r.set_pos(uc_at - count)?;
        self.desc.copy_from_slice(r.bytes(count)?);
        if self.desc.last().is_some_and(|&b| b != 0) {
            return Err(IccError::CorruptedData(
                "description ASCII string is not NUL terminated".into(),
            ));
        }
        r.skip(8)?;
        for c in self.uc_desc.iter_mut() {
            *c = r.u16()?;
        }

        self.sc_code = r.u16()?;
        self.sc_size = r.u8()? as usize;
        if self.sc_size > SCRIPT_CODE_LEN {
            return Err(IccError::CorruptedData(format!(
                "ScriptCode count {} exceeds {}",
                self.sc_size, SCRIPT_CODE_LEN
            )));
        }
        self.sc_desc.copy_from_slice(r.bytes(SCRIPT_CODE_LEN)?);
        Ok(())
    }

    pub(crate) fn encode_body(&self, w: &mut ByteWriter) -> Result<()> {
        if self.desc.len() != self.size || self.uc_desc.len() != self.uc_size {
            return Err(IccError::CorruptedData("description not allocated".into()));
        }
        w.count32("description ASCII count", self.size)?;
        w.bytes(&self.desc);
        w.u32(self.uc_lang_code);
        w.count32("description Unicode count", self.uc_size)?;
        for &c in &self.uc_desc {
            w.u16(c);
        }
        w.u16(self.sc_code);
        if self.sc_size > SCRIPT_CODE_LEN {
            return Err(IccError::NotRepresentable {
                field: "ScriptCode count",
                value: self.sc_size as f64,
            });
        }
        w.u8(self.sc_size as u8);
        w.bytes(&self.sc_desc);
        Ok(())
    }
}

impl TagType for TextDescription {
    fn type_signature(&self) -> TypeSignature {
        TypeSignature::TEXT_DESCRIPTION
    }

    fn min_size(&self) -> u32 {
        TAG_HEADER_SIZE + 12 + 3 + SCRIPT_CODE_LEN as u32
    }

    fn get_size(&self, _ctx: &TagContext) -> u32 {
        sat_add(TAG_HEADER_SIZE, self.body_size())
    }

    fn decode(&mut self, body: &[u8], _ctx: &TagContext) -> Result<()> {
        self.decode_from(&mut ByteReader::new(body))
    }

    fn encode(&self, w: &mut ByteWriter, _ctx: &TagContext) -> Result<()> {
        self.encode_body(w)
    }

    fn dump_to(&self, out: &mut dyn fmt::Write, verbose: u32) -> fmt::Result {
        writeln!(out, "Text Description:")?;
        writeln!(out, "  ASCII data, length {} chars", self.size)?;
        writeln!(out, "    \"{}\"", self.ascii())?;
        if verbose >= 2 {
            if self.uc_size > 0 {
                writeln!(out, "  Unicode data, language code 0x{:08x}, length {} chars", self.uc_lang_code, self.uc_size)?;
                writeln!(out, "    \"{}\"", self.unicode())?;
            } else {
                writeln!(out, "  No Unicode data")?;
            }
            if self.sc_size > 0 {
                writeln!(out, "  ScriptCode code 0x{:04x}, length {} chars", self.sc_code, self.sc_size)?;
            } else {
                writeln!(out, "  No ScriptCode data")?;
            }
        }
        Ok(())
    }

    fn allocate(&mut self) -> Result<()> {
        alloc_vec(&mut self.desc, self.size)?;
        alloc_vec(&mut self.uc_desc, self.uc_size)?;
        Ok(())
    }
}

/// One localized string of an `mluc` tag.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MlucRecord {
    /// ISO 639-1 language code, two ASCII letters
    pub language: u16,
    /// ISO 3166-1 country code, two ASCII letters
    pub country: u16,
    pub text: String,
}

impl MlucRecord {
    pub fn new(language: &[u8; 2], country: &[u8; 2], text: &str) -> Self {
        Self {
            language: u16::from_be_bytes(*language),
            country: u16::from_be_bytes(*country),
            text: text.to_string(),
        }
    }

    fn locale(&self) -> String {
        let l = self.language.to_be_bytes();
        let c = self.country.to_be_bytes();
        format!("{}{}-{}{}", l[0] as char, l[1] as char, c[0] as char, c[1] as char)
    }
}

const MLUC_RECORD_SIZE: usize = 12;

/// multiLocalizedUnicodeType
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mluc {
    /// Logical record count
    pub size: usize,
    pub records: Vec<MlucRecord>,
}

impl Mluc {
    pub fn new(text: &str) -> Self {
        Self::from_records(vec![MlucRecord::new(b"en", b"US", text)])
    }

    pub fn from_records(records: Vec<MlucRecord>) -> Self {
        Self {
            size: records.len(),
            records,
        }
    }

    /// The English record if there is one, else the first.
    pub fn text(&self) -> Option<&str> {
        let en = u16::from_be_bytes(*b"en");
        self.records
            .iter()
            .find(|r| r.language == en)
            .or_else(|| self.records.first())
            .map(|r| r.text.as_str())
    }

    pub(crate) fn body_size(&self) -> u32 {
        let strings = self
            .records
            .iter()
            .fold(0u32, |acc, r| sat_add(acc, sat_mul(sat_u32(r.text.encode_utf16().count()), 2)));
        let table = sat_add(8, sat_mul(sat_u32(self.size), MLUC_RECORD_SIZE as u32));
        sat_add(table, strings)
    }

    /// Decode from a buffer starting at the type header. Returns the
    /// number of bytes the payload spans, which for an embedded `mluc` is
    /// the furthest string end.
    pub(crate) fn decode_tag(&mut self, buf: &[u8]) -> Result<usize> {
        let mut r = ByteReader::new(buf);
        r.skip(TAG_HEADER_SIZE as usize)?;
        let count = r.u32()? as usize;
        let rec_size = r.u32()? as usize;
        if rec_size < MLUC_RECORD_SIZE {
            return Err(IccError::CorruptedData(format!(
                "mluc record size {} too small",
                rec_size
            )));
        }
        let table_end = count.sat_mul(rec_size).sat_add(16);
        if table_end > buf.len() {
            return Err(IccError::TooSmall {
                expected: table_end,
                actual: buf.len(),
            });
        }
        self.size = count;
        self.allocate()?;

        let mut span = table_end;
        for (i, rec) in self.records.iter_mut().enumerate() {
            r.set_pos(16 + i * rec_size)?;
            rec.language = r.u16()?;
            rec.country = r.u16()?;
            let len = r.u32()? as usize;
            let offset = r.u32()? as usize;
            let end = offset.sat_add(len);
            if end > buf.len() || len % 2 != 0 {
                return Err(IccError::CorruptedData(format!(
                    "mluc string at {}+{} outside tag of {} bytes",
                    offset,
                    len,
                    buf.len()
                )));
            }
            let units: Vec<u16> = buf[offset..end]
                .chunks_exact(2)
                .map(|c| u16::from_be_bytes([c[0], c[1]]))
                .collect();
            rec.text = String::from_utf16_lossy(&units)
                .trim_end_matches('\0')
                .to_string();
            span = span.max(end);
        }
        Ok(span)
    }
}

impl TagType for Mluc {
    fn type_signature(&self) -> TypeSignature {
        TypeSignature::MLUC
    }

    fn min_size(&self) -> u32 {
        TAG_HEADER_SIZE + 8
    }

    fn get_size(&self, _ctx: &TagContext) -> u32 {
        sat_add(TAG_HEADER_SIZE, self.body_size())
    }

    /// Record offsets are relative to the tag start, so decode works on the
    /// whole tag buffer.
    fn read(
        &mut self,
        file: &mut dyn crate::icc::io::IccFile,
        len: u32,
        offset: u32,
        _ctx: &TagContext,
    ) -> Result<()> {
        let buf = super::read_tag_bytes(file, len, offset)?;
        super::check_type_header(&buf, TypeSignature::MLUC, self.min_size())?;
        self.decode_tag(&buf).map(|_| ())
    }

    fn decode(&mut self, body: &[u8], _ctx: &TagContext) -> Result<()> {
        let mut buf = Vec::with_capacity(body.len() + TAG_HEADER_SIZE as usize);
        buf.extend_from_slice(&TypeSignature::MLUC.0.to_be_bytes());
        buf.extend_from_slice(&[0; 4]);
        buf.extend_from_slice(body);
        self.decode_tag(&buf).map(|_| ())
    }

    fn encode(&self, w: &mut ByteWriter, _ctx: &TagContext) -> Result<()> {
        let records = self
            .records
            .get(..self.size)
            .ok_or_else(|| IccError::CorruptedData("mluc records not allocated".into()))?;
        w.count32("mluc record count", self.size)?;
        w.u32(MLUC_RECORD_SIZE as u32);

        let mut offset = TAG_HEADER_SIZE as usize + 8 + self.size * MLUC_RECORD_SIZE;
        let encoded: Vec<Vec<u16>> = records.iter().map(|r| r.text.encode_utf16().collect()).collect();
        for (rec, units) in records.iter().zip(&encoded) {
            w.u16(rec.language);
            w.u16(rec.country);
            w.count32("mluc string length", units.len() * 2)?;
            w.count32("mluc string offset", offset)?;
            offset += units.len() * 2;
        }
        for units in &encoded {
            for &u in units {
                w.u16(u);
            }
        }
        Ok(())
    }

    fn dump_to(&self, out: &mut dyn fmt::Write, verbose: u32) -> fmt::Result {
        writeln!(out, "Multi-Localized Unicode:")?;
        writeln!(out, "  No. records = {}", self.size)?;
        let shown = if verbose >= 2 { self.records.len() } else { 1 };
        for rec in self.records.iter().take(shown) {
            writeln!(out, "    {}: \"{}\"", rec.locale(), rec.text)?;
        }
        Ok(())
    }

    fn allocate(&mut self) -> Result<()> {
        alloc_vec(&mut self.records, self.size)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icc::tags::Tag;

    fn roundtrip(tag: &Tag) -> Tag {
        let ctx = TagContext::default();
        Tag::from_bytes(&tag.to_bytes(&ctx).unwrap(), &ctx, false).unwrap()
    }

    #[test]
    fn test_desc_layout() {
        let desc = TextDescription::new("sRGB");
        // 8 header + 4 + 5 ASCII + 8 Unicode header + 3 + 67 ScriptCode
        assert_eq!(desc.get_size(&TagContext::default()), 95);
        let back = roundtrip(&desc.into());
        assert_eq!(back.as_text_description().unwrap().ascii(), "sRGB");
    }

    #[test]
    fn test_desc_unicode_bytes_roundtrip() {
        let mut desc = TextDescription::new("Display");
        desc.set_unicode(u32::from_be_bytes(*b"enUS"), "Display \u{00e9}");
        desc.sc_code = 1;
        desc.sc_size = 3;
        desc.sc_desc[..3].copy_from_slice(b"abc");

        let ctx = TagContext::default();
        let bytes = desc.to_bytes(&ctx).unwrap();
        let back = Tag::from_bytes(&bytes, &ctx, false).unwrap();
        assert_eq!(back.as_text_description().unwrap().unicode(), "Display \u{00e9}");
        assert_eq!(back.to_bytes(&ctx).unwrap(), bytes);
    }

    #[test]
    fn test_desc_unterminated_ascii_fails() {
        let mut desc = TextDescription::new("abc");
        desc.desc[3] = b'd';
        let bytes = desc.to_bytes(&TagContext::default()).unwrap();
        assert!(Tag::from_bytes(&bytes, &TagContext::default(), false).is_err());
    }

    #[test]
    fn test_desc_ascii_count_past_end_fails() {
        let mut bytes = b"desc\0\0\0\0".to_vec();
        bytes.extend_from_slice(&0x7FFF_FFFFu32.to_be_bytes());
        bytes.extend_from_slice(&[0; 80]);
        assert!(matches!(
            Tag::from_bytes(&bytes, &TagContext::default(), false),
            Err(IccError::TooSmall { .. })
        ));
    }

    #[test]
    fn test_mluc_records() {
        let mluc = Mluc::from_records(vec![
            MlucRecord::new(b"de", b"DE", "Farbe"),
            MlucRecord::new(b"en", b"US", "Color"),
        ]);
        let ctx = TagContext::default();
        let bytes = mluc.to_bytes(&ctx).unwrap();
        assert_eq!(bytes.len(), 16 + 24 + 20);
        let back = Tag::from_bytes(&bytes, &ctx, false).unwrap();
        let back = back.as_mluc().unwrap();
        assert_eq!(back.text(), Some("Color"));
        assert_eq!(back.records[0].text, "Farbe");
    }

    #[test]
    fn test_mluc_string_out_of_bounds() {
        let mut bytes = b"mluc\0\0\0\0".to_vec();
        for v in [1u32, 12] {
            bytes.extend_from_slice(&v.to_be_bytes());
        }
        bytes.extend_from_slice(b"enUS");
        bytes.extend_from_slice(&100u32.to_be_bytes());
        bytes.extend_from_slice(&28u32.to_be_bytes());
        assert!(Tag::from_bytes(&bytes, &TagContext::default(), false).is_err());
    }
}
