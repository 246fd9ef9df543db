//! Small scalar and string tag types: data, text, sig and dtim.

use std::fmt;

use super::{alloc_vec, sat_u32, Result, TagContext, TagType, TAG_HEADER_SIZE};
use crate::icc::error::{sig_str, IccError};
use crate::icc::primitives::{ByteReader, ByteWriter};
use crate::icc::types::{DateTimeNumber, TypeSignature};
use crate::sat::sat_add;

/// Interpretation flag of a `data` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataFlag {
    #[default]
    Ascii,
    Binary,
}

/// dataType: flagged ASCII or binary bytes
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Data {
    pub flag: DataFlag,
    /// Logical byte count, including the NUL for ASCII data
    pub size: usize,
    pub data: Vec<u8>,
}

impl Data {
    pub fn ascii(text: &str) -> Self {
        let mut data = text.as_bytes().to_vec();
        data.push(0);
        Self {
            flag: DataFlag::Ascii,
            size: data.len(),
            data,
        }
    }

    pub fn binary(bytes: &[u8]) -> Self {
        Self {
            flag: DataFlag::Binary,
            size: bytes.len(),
            data: bytes.to_vec(),
        }
    }

    /// ASCII contents up to the first NUL.
    pub fn as_str(&self) -> Option<String> {
        if self.flag != DataFlag::Ascii {
            return None;
        }
        let end = self.data.iter().position(|&b| b == 0).unwrap_or(self.data.len());
        Some(String::from_utf8_lossy(&self.data[..end]).into_owned())
    }
}

impl TagType for Data {
    fn type_signature(&self) -> TypeSignature {
        TypeSignature::DATA
    }

    fn min_size(&self) -> u32 {
        TAG_HEADER_SIZE + 4
    }

    fn get_size(&self, _ctx: &TagContext) -> u32 {
        sat_add(TAG_HEADER_SIZE + 4, sat_u32(self.size))
    }

    fn decode(&mut self, body: &[u8], _ctx: &TagContext) -> Result<()> {
        let mut r = ByteReader::new(body);
        self.flag = match r.u32()? {
            0 => DataFlag::Ascii,
            1 => DataFlag::Binary,
            other => {
                return Err(IccError::CorruptedData(format!("unknown data flag {}", other)));
            }
        };
        self.size = r.remaining();
        self.allocate()?;
        self.data.copy_from_slice(r.bytes(self.size)?);
        if self.flag == DataFlag::Ascii && self.data.last().is_some_and(|&b| b != 0) {
            return Err(IccError::CorruptedData("ASCII data is not NUL terminated".into()));
        }
        Ok(())
    }

    fn encode(&self, w: &mut ByteWriter, _ctx: &TagContext) -> Result<()> {
        w.u32(match self.flag {
            DataFlag::Ascii => 0,
            DataFlag::Binary => 1,
        });
        let payload = self
            .data
            .get(..self.size)
            .ok_or_else(|| IccError::CorruptedData("data payload not allocated".into()))?;
        w.bytes(payload);
        Ok(())
    }

    fn dump_to(&self, out: &mut dyn fmt::Write, verbose: u32) -> fmt::Result {
        writeln!(out, "Data:")?;
        match self.flag {
            DataFlag::Ascii => {
                writeln!(out, "  ASCII data, length {} chars", self.size)?;
                if verbose >= 2 {
                    writeln!(out, "  \"{}\"", self.as_str().unwrap_or_default())?;
                }
            }
            DataFlag::Binary => {
                writeln!(out, "  Binary data, length {} bytes", self.size)?;
                if verbose >= 2 {
                    for chunk in self.data.chunks(16) {
                        let hex: Vec<String> = chunk.iter().map(|b| format!("{:02x}", b)).collect();
                        writeln!(out, "    {}", hex.join(" "))?;
                    }
                }
            }
        }
        Ok(())
    }

    fn allocate(&mut self) -> Result<()> {
        alloc_vec(&mut self.data, self.size)?;
        Ok(())
    }
}

/// textType: NUL-terminated 7-bit ASCII
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Text {
    pub text: String,
}

impl Text {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl TagType for Text {
    fn type_signature(&self) -> TypeSignature {
        TypeSignature::TEXT
    }

    fn min_size(&self) -> u32 {
        TAG_HEADER_SIZE + 1
    }

    fn get_size(&self, _ctx: &TagContext) -> u32 {
        sat_add(TAG_HEADER_SIZE + 1, sat_u32(self.text.len()))
    }

    fn decode(&mut self, body: &[u8], _ctx: &TagContext) -> Result<()> {
        let end = body
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| IccError::CorruptedData("text is not NUL terminated".into()))?;
        self.text = String::from_utf8_lossy(&body[..end]).into_owned();
        Ok(())
    }

    fn encode(&self, w: &mut ByteWriter, _ctx: &TagContext) -> Result<()> {
        if self.text.as_bytes().contains(&0) {
            return Err(IccError::NotRepresentable {
                field: "text with embedded NUL",
                value: self.text.len() as f64,
            });
        }
        w.bytes(self.text.as_bytes());
        w.u8(0);
        Ok(())
    }

    fn dump_to(&self, out: &mut dyn fmt::Write, verbose: u32) -> fmt::Result {
        writeln!(out, "Text:")?;
        writeln!(out, "  No. chars = {}", self.text.len())?;
        if verbose >= 2 {
            for line in self.text.lines() {
                writeln!(out, "  {}", line)?;
            }
        }
        Ok(())
    }

    fn allocate(&mut self) -> Result<()> {
        Ok(())
    }
}

/// signatureType: a single 4-byte signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Signature {
    pub sig: u32,
}

impl Signature {
    pub fn new(sig: u32) -> Self {
        Self { sig }
    }
}

impl TagType for Signature {
    fn type_signature(&self) -> TypeSignature {
        TypeSignature::SIGNATURE
    }

    fn min_size(&self) -> u32 {
        TAG_HEADER_SIZE + 4
    }

    fn get_size(&self, _ctx: &TagContext) -> u32 {
        TAG_HEADER_SIZE + 4
    }

    fn decode(&mut self, body: &[u8], _ctx: &TagContext) -> Result<()> {
        self.sig = ByteReader::new(body).u32()?;
        Ok(())
    }

    fn encode(&self, w: &mut ByteWriter, _ctx: &TagContext) -> Result<()> {
        w.u32(self.sig);
        Ok(())
    }

    fn dump_to(&self, out: &mut dyn fmt::Write, _verbose: u32) -> fmt::Result {
        writeln!(out, "Signature: {}", sig_str(self.sig))
    }

    fn allocate(&mut self) -> Result<()> {
        Ok(())
    }
}

/// dateTimeType
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateTime {
    pub date: DateTimeNumber,
}

impl DateTime {
    pub fn now() -> Self {
        Self {
            date: DateTimeNumber::now(),
        }
    }
}

impl TagType for DateTime {
    fn type_signature(&self) -> TypeSignature {
        TypeSignature::DATE_TIME
    }

    fn min_size(&self) -> u32 {
        TAG_HEADER_SIZE + 12
    }

    fn get_size(&self, _ctx: &TagContext) -> u32 {
        TAG_HEADER_SIZE + 12
    }

    fn decode(&mut self, body: &[u8], ctx: &TagContext) -> Result<()> {
        self.date = ByteReader::new(body).date_time(ctx.strict_datetime)?;
        Ok(())
    }

    fn encode(&self, w: &mut ByteWriter, _ctx: &TagContext) -> Result<()> {
        w.date_time(self.date)
    }

    fn dump_to(&self, out: &mut dyn fmt::Write, _verbose: u32) -> fmt::Result {
        writeln!(out, "Date & Time: {}", self.date)
    }

    fn allocate(&mut self) -> Result<()> {
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
    fn test_data_ascii_and_binary() {
        let back = roundtrip(&Data::ascii("hello").into());
        assert_eq!(back.as_data().unwrap().as_str().as_deref(), Some("hello"));

        let back = roundtrip(&Data::binary(&[1, 2, 3]).into());
        let data = back.as_data().unwrap();
        assert_eq!(data.flag, DataFlag::Binary);
        assert_eq!(data.data, vec![1, 2, 3]);
        assert_eq!(data.as_str(), None);
    }

    #[test]
    fn test_unterminated_ascii_data_fails() {
        let bytes = b"data\0\0\0\0\0\0\0\0abc";
        assert!(Tag::from_bytes(bytes, &TagContext::default(), false).is_err());
    }

    #[test]
    fn test_text() {
        let tag: Tag = Text::new("Copyright 2004").into();
        assert_eq!(tag.get_size(&TagContext::default()), 8 + 15);
        assert_eq!(roundtrip(&tag).as_text().unwrap().text, "Copyright 2004");

        let unterminated = b"text\0\0\0\0abc";
        assert!(Tag::from_bytes(unterminated, &TagContext::default(), false).is_err());
    }

    #[test]
    fn test_signature() {
        let tag: Tag = Signature::new(u32::from_be_bytes(*b"CRT ")).into();
        assert_eq!(roundtrip(&tag).as_signature().unwrap().sig, u32::from_be_bytes(*b"CRT "));
    }

    #[test]
    fn test_date_time_repair_honours_context() {
        let mut bytes = b"dtim\0\0\0\0".to_vec();
        for v in [7u16, 2003, 11, 14, 30, 12] {
            bytes.extend_from_slice(&v.to_be_bytes());
        }
        let lenient = TagContext::default();
        let tag = Tag::from_bytes(&bytes, &lenient, false).unwrap();
        assert_eq!(tag.as_date_time().unwrap().date.year, 2003);

        let strict = TagContext {
            strict_datetime: true,
            ..TagContext::default()
        };
        assert!(Tag::from_bytes(&bytes, &strict, false).is_err());
    }
}
