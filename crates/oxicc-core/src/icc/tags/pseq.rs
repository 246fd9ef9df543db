//! profileSequenceDescType
//!
//! Each entry embeds two complete description tags, type header included.
//! V2 profiles embed `desc`, V4 profiles may embed `mluc`.

use std::fmt;

use super::{alloc_vec, peek_type, sat_u32, Mluc, Result, TagContext, TagType, TextDescription, TAG_HEADER_SIZE};
use crate::icc::error::{sig_str, IccError};
use crate::icc::primitives::{ByteReader, ByteWriter};
use crate::icc::types::TypeSignature;
use crate::sat::{sat_add, SatArith};

/// Fixed part of one sequence entry: mfg, model, attributes, technology.
const ENTRY_FIXED: usize = 20;

/// An embedded description.
#[derive(Debug, Clone, PartialEq)]
pub enum Description {
    Text(TextDescription),
    Mluc(Mluc),
}

impl Default for Description {
    fn default() -> Self {
        Self::Text(TextDescription::default())
    }
}

impl Description {
    pub fn text(&self) -> String {
        match self {
            Self::Text(d) => d.ascii(),
            Self::Mluc(m) => m.text().unwrap_or_default().to_string(),
        }
    }

    /// Embedded size, type header included.
    fn size(&self) -> u32 {
        match self {
            Self::Text(d) => sat_add(TAG_HEADER_SIZE, d.body_size()),
            Self::Mluc(m) => sat_add(TAG_HEADER_SIZE, m.body_size()),
        }
    }

    fn decode(r: &mut ByteReader<'_>) -> Result<Self> {
        let start = r.pos();
        let rest = r.bytes(r.remaining())?;
        r.set_pos(start)?;
        match peek_type(rest) {
            Some(TypeSignature::TEXT_DESCRIPTION) => {
                r.skip(TAG_HEADER_SIZE as usize)?;
                let mut d = TextDescription::default();
                d.decode_from(r)?;
                Ok(Self::Text(d))
            }
            Some(TypeSignature::MLUC) => {
                let mut m = Mluc::default();
                let span = m.decode_tag(rest)?;
                r.skip(span)?;
                Ok(Self::Mluc(m))
            }
            Some(other) => Err(IccError::CorruptedData(format!(
                "profile sequence description has type '{}'",
                sig_str(other.0)
            ))),
            None => Err(IccError::TooSmall {
                expected: start + 4,
                actual: start + rest.len(),
            }),
        }
    }

    fn encode(&self, w: &mut ByteWriter, ctx: &TagContext) -> Result<()> {
        let bytes = match self {
            Self::Text(d) => d.to_bytes(ctx)?,
            Self::Mluc(m) => m.to_bytes(ctx)?,
        };
        w.bytes(&bytes);
        Ok(())
    }
}

/// Description of one profile in a sequence.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SequenceEntry {
    pub manufacturer: u32,
    pub model: u32,
    pub attributes: u64,
    pub technology: u32,
    pub mfg_desc: Description,
    pub model_desc: Description,
}

/// profileSequenceDescType
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProfileSequenceDesc {
    /// Logical entry count
    pub count: usize,
    pub data: Vec<SequenceEntry>,
}

impl ProfileSequenceDesc {
    pub fn from_entries(data: Vec<SequenceEntry>) -> Self {
        Self {
            count: data.len(),
            data,
        }
    }
}

impl TagType for ProfileSequenceDesc {
    fn type_signature(&self) -> TypeSignature {
        TypeSignature::PROFILE_SEQUENCE_DESC
    }

    fn min_size(&self) -> u32 {
        TAG_HEADER_SIZE + 4
    }

    fn get_size(&self, _ctx: &TagContext) -> u32 {
        self.data.iter().fold(TAG_HEADER_SIZE + 4, |acc, e| {
            let descs = sat_add(e.mfg_desc.size(), e.model_desc.size());
            sat_add(acc, sat_add(ENTRY_FIXED as u32, descs))
        })
    }

    fn decode(&mut self, body: &[u8], _ctx: &TagContext) -> Result<()> {
        let mut r = ByteReader::new(body);
        self.count = r.u32()? as usize;
        // Two description headers per entry at minimum.
        let min_entry = ENTRY_FIXED + 2 * TAG_HEADER_SIZE as usize;
        if self.count > r.remaining() / min_entry {
            return Err(IccError::TooSmall {
                expected: self.count.sat_mul(min_entry),
                actual: r.remaining(),
            });
        }
        self.allocate()?;
        for e in self.data.iter_mut() {
            e.manufacturer = r.u32()?;
            e.model = r.u32()?;
            e.attributes = r.u64()?;
            e.technology = r.u32()?;
            e.mfg_desc = Description::decode(&mut r)?;
            e.model_desc = Description::decode(&mut r)?;
        }
        Ok(())
    }

    fn encode(&self, w: &mut ByteWriter, ctx: &TagContext) -> Result<()> {
        let data = self
            .data
            .get(..self.count)
            .ok_or_else(|| IccError::CorruptedData("profile sequence not allocated".into()))?;
        w.count32("profile sequence count", self.count)?;
        for e in data {
            w.u32(e.manufacturer);
            w.u32(e.model);
            w.u64(e.attributes);
            w.u32(e.technology);
            e.mfg_desc.encode(w, ctx)?;
            e.model_desc.encode(w, ctx)?;
        }
        Ok(())
    }

    fn dump_to(&self, out: &mut dyn fmt::Write, verbose: u32) -> fmt::Result {
        writeln!(out, "Profile Sequence Description:")?;
        writeln!(out, "  No. entries = {}", sat_u32(self.count))?;
        if verbose >= 2 {
            for (i, e) in self.data.iter().enumerate() {
                writeln!(out, "  {}:", i)?;
                writeln!(out, "    Dev. Mnfctr.    = {}", sig_str(e.manufacturer))?;
                writeln!(out, "    Dev. Model      = {}", sig_str(e.model))?;
                writeln!(out, "    Dev. Attrbts    = 0x{:016x}", e.attributes)?;
                writeln!(out, "    Dev. Technology = {}", sig_str(e.technology))?;
                writeln!(out, "    Mnfctr. Desc    = \"{}\"", e.mfg_desc.text())?;
                writeln!(out, "    Model Desc      = \"{}\"", e.model_desc.text())?;
            }
        }
        Ok(())
    }

    fn allocate(&mut self) -> Result<()> {
        alloc_vec(&mut self.data, self.count)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icc::tags::Tag;

    fn entry(mfg: &str, model: Description) -> SequenceEntry {
        SequenceEntry {
            manufacturer: u32::from_be_bytes(*b"APPL"),
            model: 0x1234,
            attributes: 1,
            technology: u32::from_be_bytes(*b"CRT "),
            mfg_desc: Description::Text(TextDescription::new(mfg)),
            model_desc: model,
        }
    }

    #[test]
    fn test_mixed_descriptions_roundtrip() {
        let ctx = TagContext::default();
        let seq = ProfileSequenceDesc::from_entries(vec![
            entry("Maker", Description::Text(TextDescription::new("Monitor"))),
            entry("Other", Description::Mluc(Mluc::new("Printer"))),
        ]);
        let bytes = seq.to_bytes(&ctx).unwrap();
        assert_eq!(bytes.len() as u32, seq.get_size(&ctx));

        let back = Tag::from_bytes(&bytes, &ctx, false).unwrap();
        let back = back.as_profile_sequence_desc().unwrap();
        assert_eq!(back.count, 2);
        assert_eq!(back.data[0].model_desc.text(), "Monitor");
        assert_eq!(back.data[1].mfg_desc.text(), "Other");
        assert_eq!(back.data[1].model_desc.text(), "Printer");
        assert_eq!(back.data[1].technology, u32::from_be_bytes(*b"CRT "));
    }

    #[test]
    fn test_bad_embedded_type() {
        let ctx = TagContext::default();
        let mut bytes = b"pseq\0\0\0\0".to_vec();
        bytes.extend_from_slice(&1u32.to_be_bytes());
        bytes.extend_from_slice(&[0; ENTRY_FIXED]);
        bytes.extend_from_slice(b"text\0\0\0\0");
        bytes.extend_from_slice(b"desc\0\0\0\0");
        assert!(matches!(
            Tag::from_bytes(&bytes, &ctx, false),
            Err(IccError::CorruptedData(_))
        ));
    }

    #[test]
    fn test_count_beyond_payload() {
        let ctx = TagContext::default();
        let mut bytes = b"pseq\0\0\0\0".to_vec();
        bytes.extend_from_slice(&1000u32.to_be_bytes());
        assert!(matches!(
            Tag::from_bytes(&bytes, &ctx, false),
            Err(IccError::TooSmall { .. })
        ));
    }
}
