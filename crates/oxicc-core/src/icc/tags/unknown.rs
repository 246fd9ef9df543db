//! Opaque payload of an unrecognized type.

use std::fmt;

use super::{read_tag_bytes, sat_u32, Result, TagContext, TagType};
use crate::icc::error::IccError;
use crate::icc::io::IccFile;
use crate::icc::primitives::ByteWriter;
use crate::icc::types::TypeSignature;
use crate::sat::sat_add;

/// A tag whose type signature is not recognized, kept byte for byte.
#[derive(Debug, Clone, PartialEq)]
pub struct Unknown {
    /// Type signature found in the tag
    pub uttype: TypeSignature,
    /// Everything after the type signature, reserved word included
    pub data: Vec<u8>,
}

impl Default for Unknown {
    fn default() -> Self {
        Self {
            uttype: TypeSignature(0),
            data: vec![0; 4],
        }
    }
}

impl TagType for Unknown {
    fn type_signature(&self) -> TypeSignature {
        self.uttype
    }

    fn get_size(&self, _ctx: &TagContext) -> u32 {
        sat_add(4, sat_u32(self.data.len()))
    }

    fn read(
        &mut self,
        file: &mut dyn IccFile,
        len: u32,
        offset: u32,
        _ctx: &TagContext,
    ) -> Result<()> {
        let buf = read_tag_bytes(file, len, offset)?;
        if buf.len() < 8 {
            return Err(IccError::TooSmall {
                expected: 8,
                actual: buf.len(),
            });
        }
        self.uttype = TypeSignature(u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]));
        self.data = buf[4..].to_vec();
        Ok(())
    }

    fn decode(&mut self, body: &[u8], _ctx: &TagContext) -> Result<()> {
        self.data = vec![0; 4];
        self.data.extend_from_slice(body);
        Ok(())
    }

    fn encode(&self, w: &mut ByteWriter, _ctx: &TagContext) -> Result<()> {
        w.bytes(self.data.get(4..).unwrap_or_default());
        Ok(())
    }

    fn to_bytes(&self, ctx: &TagContext) -> Result<Vec<u8>> {
        if self.data.len() < 4 {
            return Err(IccError::CorruptedData(
                "unknown tag lost its reserved word".into(),
            ));
        }
        let mut w = ByteWriter::with_capacity(self.get_size(ctx) as usize)?;
        w.u32(self.uttype.0);
        w.bytes(&self.data);
        Ok(w.into_bytes())
    }

    fn dump_to(&self, out: &mut dyn fmt::Write, verbose: u32) -> fmt::Result {
        writeln!(out, "Unknown:")?;
        writeln!(out, "  Type = {}", self.uttype)?;
        writeln!(out, "  Payload size = {} bytes", self.data.len().saturating_sub(4))?;
        if verbose >= 2 {
            for (i, row) in self.data.get(4..).unwrap_or_default().chunks(16).enumerate() {
                write!(out, "    {:04x}:", i * 16)?;
                for b in row {
                    write!(out, " {:02x}", b)?;
                }
                writeln!(out)?;
            }
        }
        Ok(())
    }

    fn allocate(&mut self) -> Result<()> {
        if self.data.len() < 4 {
            self.data.resize(4, 0);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icc::tags::Tag;

    #[test]
    fn test_reserved_word_preserved() {
        let bytes = b"priv\x01\x02\x03\x04payload".to_vec();
        let ctx = TagContext::default();
        let tag = Tag::from_bytes(&bytes, &ctx, true).unwrap();
        assert_eq!(tag.get_size(&ctx) as usize, bytes.len());
        assert_eq!(tag.to_bytes(&ctx).unwrap(), bytes);
        let mut out = String::new();
        tag.dump(&mut out, 2);
        assert!(out.contains("70 61 79"));
    }
}
