//! Named colors and colorant tables: ncol, ncl2 and clrt.

use std::fmt;

use super::{alloc_vec, sat_u32, Result, TagContext, TagType, TAG_HEADER_SIZE, MAX_CHAN};
use crate::icc::error::IccError;
use crate::icc::header::ColorSpace;
use crate::icc::primitives::{ByteReader, ByteWriter, PcsEncoding};
use crate::icc::types::TypeSignature;
use crate::sat::{sat_add, sat_mul, SatArith};

/// Width of the fixed name fields of ncl2 and clrt.
const NAME_LEN: usize = 32;

/// PCS encoding for 16-bit named/colorant values. Device links carry no
/// PCS in the header, so those fall back to Lab.
fn pcs16(ctx: &TagContext) -> PcsEncoding {
    match ctx.pcs {
        ColorSpace::Xyz => PcsEncoding::Xyz,
        _ if ctx.version.is_v4() => PcsEncoding::LabV4,
        _ => PcsEncoding::LabV2,
    }
}

fn read_cstr(r: &mut ByteReader<'_>) -> Result<String> {
    let start = r.pos();
    loop {
        if r.u8()? == 0 {
            break;
        }
    }
    let end = r.pos() - 1;
    r.set_pos(start)?;
    let s = String::from_utf8_lossy(r.bytes(end - start)?).into_owned();
    r.skip(1)?;
    Ok(s)
}

fn write_cstr(w: &mut ByteWriter, field: &'static str, s: &str) -> Result<()> {
    if s.as_bytes().contains(&0) {
        return Err(IccError::NotRepresentable {
            field,
            value: s.len() as f64,
        });
    }
    w.bytes(s.as_bytes());
    w.u8(0);
    Ok(())
}

/// Which named color layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedColorKind {
    /// namedColorType (ncol): variable-length names, 8-bit device values
    V1,
    /// namedColor2Type (ncl2): 32-byte names, PCS and 16-bit device values
    V2,
}

/// One named color.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NamedColorEntry {
    pub root: String,
    /// PCS value (ncl2 only)
    pub pcs: [f64; 3],
    /// Device values in `[0, 1]`
    pub device: Vec<f64>,
}

/// namedColorType / namedColor2Type
#[derive(Debug, Clone, PartialEq)]
pub struct NamedColor {
    pub kind: NamedColorKind,
    pub vendor_flag: u32,
    /// Logical entry count
    pub count: usize,
    /// Device coordinates per entry
    pub n_device_coords: usize,
    pub prefix: String,
    pub suffix: String,
    pub data: Vec<NamedColorEntry>,
}

impl NamedColor {
    pub fn new(kind: NamedColorKind) -> Self {
        Self {
            kind,
            vendor_flag: 0,
            count: 0,
            n_device_coords: 0,
            prefix: String::new(),
            suffix: String::new(),
            data: Vec::new(),
        }
    }

    fn v2_entry_size(&self) -> u32 {
        sat_add(NAME_LEN as u32 + 6, sat_mul(sat_u32(self.n_device_coords), 2))
    }

    fn decode_v1(&mut self, r: &mut ByteReader<'_>, ctx: &TagContext) -> Result<()> {
        self.prefix = read_cstr(r)?;
        self.suffix = read_cstr(r)?;
        self.n_device_coords = ctx.color_space.channels();
        // Every entry needs at least its NUL and device bytes.
        let min_entry = 1 + self.n_device_coords;
        if self.count > r.remaining() / min_entry {
            return Err(IccError::TooSmall {
                expected: self.count.sat_mul(min_entry),
                actual: r.remaining(),
            });
        }
        self.allocate()?;
        for entry in self.data.iter_mut() {
            entry.root = read_cstr(r)?;
            for v in entry.device.iter_mut() {
                *v = r.dcs8()?;
            }
        }
        Ok(())
    }

    fn decode_v2(&mut self, r: &mut ByteReader<'_>, ctx: &TagContext) -> Result<()> {
        self.n_device_coords = r.u32()? as usize;
        if self.n_device_coords > MAX_CHAN {
            return Err(IccError::CorruptedData(format!(
                "ncl2 declares {} device coordinates",
                self.n_device_coords
            )));
        }
        self.prefix = r.fixed_ascii(NAME_LEN)?;
        self.suffix = r.fixed_ascii(NAME_LEN)?;
        let entry = self.v2_entry_size() as usize;
        if self.count > r.remaining() / entry {
            return Err(IccError::TooSmall {
                expected: self.count.sat_mul(entry),
                actual: r.remaining(),
            });
        }
        let enc = if ctx.pcs == ColorSpace::Xyz {
            PcsEncoding::Xyz
        } else {
            PcsEncoding::LabV2
        };
        self.allocate()?;
        for e in self.data.iter_mut() {
            e.root = r.fixed_ascii(NAME_LEN)?;
            e.pcs = r.pcs(enc)?;
            for v in e.device.iter_mut() {
                *v = r.dcs16()?;
            }
        }
        Ok(())
    }
}

impl TagType for NamedColor {
    fn type_signature(&self) -> TypeSignature {
        match self.kind {
            NamedColorKind::V1 => TypeSignature::NAMED_COLOR,
            NamedColorKind::V2 => TypeSignature::NAMED_COLOR2,
        }
    }

    fn min_size(&self) -> u32 {
        match self.kind {
            NamedColorKind::V1 => TAG_HEADER_SIZE + 10,
            NamedColorKind::V2 => TAG_HEADER_SIZE + 12 + 2 * NAME_LEN as u32,
        }
    }

    fn get_size(&self, ctx: &TagContext) -> u32 {
        match self.kind {
            NamedColorKind::V1 => {
                let n_dev = ctx.color_space.channels();
                let head = sat_add(
                    TAG_HEADER_SIZE + 10,
                    sat_u32(self.prefix.len().sat_add(self.suffix.len())),
                );
                self.data.iter().fold(head, |acc, e| {
                    sat_add(acc, sat_u32(e.root.len().sat_add(1).sat_add(n_dev)))
                })
            }
            NamedColorKind::V2 => sat_add(
                TAG_HEADER_SIZE + 12 + 2 * NAME_LEN as u32,
                sat_mul(sat_u32(self.count), self.v2_entry_size()),
            ),
        }
    }

    fn decode(&mut self, body: &[u8], ctx: &TagContext) -> Result<()> {
        let mut r = ByteReader::new(body);
        self.vendor_flag = r.u32()?;
        self.count = r.u32()? as usize;
        match self.kind {
            NamedColorKind::V1 => self.decode_v1(&mut r, ctx),
            NamedColorKind::V2 => self.decode_v2(&mut r, ctx),
        }
    }

    fn encode(&self, w: &mut ByteWriter, ctx: &TagContext) -> Result<()> {
        if self.data.len() != self.count {
            return Err(IccError::CorruptedData("named colors not allocated".into()));
        }
        w.u32(self.vendor_flag);
        w.count32("named color count", self.count)?;
        match self.kind {
            NamedColorKind::V1 => {
                let n_dev = ctx.color_space.channels();
                write_cstr(w, "named color prefix", &self.prefix)?;
                write_cstr(w, "named color suffix", &self.suffix)?;
                for e in &self.data {
                    write_cstr(w, "named color root", &e.root)?;
                    for i in 0..n_dev {
                        w.dcs8(e.device.get(i).copied().unwrap_or(0.0))?;
                    }
                }
            }
            NamedColorKind::V2 => {
                let enc = if ctx.pcs == ColorSpace::Xyz {
                    PcsEncoding::Xyz
                } else {
                    PcsEncoding::LabV2
                };
                w.count32("device coordinate count", self.n_device_coords)?;
                w.fixed_ascii("named color prefix", &self.prefix, NAME_LEN)?;
                w.fixed_ascii("named color suffix", &self.suffix, NAME_LEN)?;
                for e in &self.data {
                    w.fixed_ascii("named color root", &e.root, NAME_LEN)?;
                    w.pcs(enc, e.pcs)?;
                    if e.device.len() != self.n_device_coords {
                        return Err(IccError::CorruptedData(format!(
                            "named color '{}' has {} device values, expected {}",
                            e.root,
                            e.device.len(),
                            self.n_device_coords
                        )));
                    }
                    for &v in &e.device {
                        w.dcs16(v)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn dump_to(&self, out: &mut dyn fmt::Write, verbose: u32) -> fmt::Result {
        writeln!(out, "Named Colors ({}):", self.type_signature())?;
        writeln!(out, "  Vendor Flag = 0x{:x}", self.vendor_flag)?;
        writeln!(out, "  No. colors  = {}", self.count)?;
        writeln!(out, "  No. dev. coords = {}", self.n_device_coords)?;
        writeln!(out, "  Name prefix = '{}'", self.prefix)?;
        writeln!(out, "  Name suffix = '{}'", self.suffix)?;
        if verbose >= 2 {
            for (i, e) in self.data.iter().enumerate() {
                write!(out, "    Color {}: '{}'", i, e.root)?;
                if self.kind == NamedColorKind::V2 {
                    write!(out, " PCS {:.4} {:.4} {:.4}", e.pcs[0], e.pcs[1], e.pcs[2])?;
                }
                writeln!(out, " device {:?}", e.device)?;
            }
        }
        Ok(())
    }

    fn allocate(&mut self) -> Result<()> {
        alloc_vec(&mut self.data, self.count)?;
        for e in self.data.iter_mut() {
            if e.device.len() != self.n_device_coords {
                e.device = vec![0.0; self.n_device_coords];
            }
        }
        Ok(())
    }
}

/// One entry of a colorant table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Colorant {
    pub name: String,
    /// PCS value in the profile's 16-bit PCS encoding
    pub pcs: [f64; 3],
}

/// colorantTableType
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColorantTable {
    /// Logical colorant count
    pub count: usize,
    pub data: Vec<Colorant>,
}

impl ColorantTable {
    pub fn from_colorants(data: Vec<Colorant>) -> Self {
        Self {
            count: data.len(),
            data,
        }
    }
}

impl TagType for ColorantTable {
    fn type_signature(&self) -> TypeSignature {
        TypeSignature::COLORANT_TABLE
    }

    fn min_size(&self) -> u32 {
        TAG_HEADER_SIZE + 4
    }

    fn get_size(&self, _ctx: &TagContext) -> u32 {
        sat_add(TAG_HEADER_SIZE + 4, sat_mul(sat_u32(self.count), NAME_LEN as u32 + 6))
    }

    fn decode(&mut self, body: &[u8], ctx: &TagContext) -> Result<()> {
        let mut r = ByteReader::new(body);
        self.count = r.u32()? as usize;
        if self.count > r.remaining() / (NAME_LEN + 6) {
            return Err(IccError::TooSmall {
                expected: self.count.sat_mul(NAME_LEN + 6),
                actual: r.remaining(),
            });
        }
        self.allocate()?;
        let enc = pcs16(ctx);
        for c in self.data.iter_mut() {
            c.name = r.fixed_ascii(NAME_LEN)?;
            c.pcs = r.pcs(enc)?;
        }
        Ok(())
    }

    fn encode(&self, w: &mut ByteWriter, ctx: &TagContext) -> Result<()> {
        let data = self
            .data
            .get(..self.count)
            .ok_or_else(|| IccError::CorruptedData("colorant table not allocated".into()))?;
        w.count32("colorant count", self.count)?;
        let enc = pcs16(ctx);
        for c in data {
            w.fixed_ascii("colorant name", &c.name, NAME_LEN)?;
            w.pcs(enc, c.pcs)?;
        }
        Ok(())
    }

    fn dump_to(&self, out: &mut dyn fmt::Write, verbose: u32) -> fmt::Result {
        writeln!(out, "Colorant Table:")?;
        writeln!(out, "  No. colorants = {}", self.count)?;
        if verbose >= 2 {
            for (i, c) in self.data.iter().enumerate() {
                writeln!(
                    out,
                    "    {}: '{}' {:.4} {:.4} {:.4}",
                    i, c.name, c.pcs[0], c.pcs[1], c.pcs[2]
                )?;
            }
        }
        Ok(())
    }

    fn allocate(&mut self) -> Result<()> {
        alloc_vec(&mut self.data, self.count)?;
        Ok(())
    }
}
