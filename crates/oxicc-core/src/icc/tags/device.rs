//! Device and rendering tags: scrn, bfd, vcgt and crdi.

use std::fmt;

use super::{alloc_vec, sat_u32, Result, TagContext, TagType, TAG_HEADER_SIZE};
use crate::icc::error::IccError;
use crate::icc::primitives::{ByteReader, ByteWriter};
use crate::icc::types::TypeSignature;
use crate::sat::{sat_add, sat_mul, sat_mul3, SatArith};

fn short_payload(r: &ByteReader<'_>, need: usize) -> IccError {
    IccError::TooSmall {
        expected: r.pos().sat_add(need),
        actual: r.pos() + r.remaining(),
    }
}

/// Halftone parameters for one channel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreeningChannel {
    /// Lines per inch
    pub frequency: f64,
    /// Degrees
    pub angle: f64,
    pub spot_shape: u32,
}

/// screeningType
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Screening {
    pub flags: u32,
    /// Logical channel count
    pub channels: usize,
    pub data: Vec<ScreeningChannel>,
}

impl TagType for Screening {
    fn type_signature(&self) -> TypeSignature {
        TypeSignature::SCREENING
    }

    fn min_size(&self) -> u32 {
        TAG_HEADER_SIZE + 8
    }

    fn get_size(&self, _ctx: &TagContext) -> u32 {
        sat_add(TAG_HEADER_SIZE + 8, sat_mul(sat_u32(self.channels), 12))
    }

    fn decode(&mut self, body: &[u8], _ctx: &TagContext) -> Result<()> {
        let mut r = ByteReader::new(body);
        self.flags = r.u32()?;
        self.channels = r.u32()? as usize;
        if self.channels > r.remaining() / 12 {
            return Err(short_payload(&r, self.channels.sat_mul(12)));
        }
        self.allocate()?;
        for c in self.data.iter_mut() {
            c.frequency = r.s15f16()?;
            c.angle = r.s15f16()?;
            c.spot_shape = r.u32()?;
        }
        Ok(())
    }

    fn encode(&self, w: &mut ByteWriter, _ctx: &TagContext) -> Result<()> {
        let data = self
            .data
            .get(..self.channels)
            .ok_or_else(|| IccError::CorruptedData("screening channels not allocated".into()))?;
        w.u32(self.flags);
        w.count32("screening channel count", self.channels)?;
        for c in data {
            w.s15f16(c.frequency)?;
            w.s15f16(c.angle)?;
            w.u32(c.spot_shape);
        }
        Ok(())
    }

    fn dump_to(&self, out: &mut dyn fmt::Write, verbose: u32) -> fmt::Result {
        writeln!(out, "Screening:")?;
        writeln!(out, "  Flags = 0x{:08x}", self.flags)?;
        writeln!(out, "  No. channels = {}", self.channels)?;
        if verbose >= 2 {
            for (i, c) in self.data.iter().enumerate() {
                writeln!(
                    out,
                    "    {}: frequency {:.4}, angle {:.4}, spot {}",
                    i, c.frequency, c.angle, c.spot_shape
                )?;
            }
        }
        Ok(())
    }

    fn allocate(&mut self) -> Result<()> {
        alloc_vec(&mut self.data, self.channels)?;
        Ok(())
    }
}

/// ucrbgType: under color removal and black generation curves.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UcrBg {
    /// A single entry is a percentage, more are a curve.
    pub ucr: Vec<u16>,
    pub bg: Vec<u16>,
    /// Trailing ASCII description, NUL included when present
    pub desc: Vec<u8>,
}

impl UcrBg {
    fn read_curve(r: &mut ByteReader<'_>) -> Result<Vec<u16>> {
        let count = r.u32()? as usize;
        if count > r.remaining() / 2 {
            return Err(short_payload(r, count.sat_mul(2)));
        }
        let mut curve = Vec::new();
        alloc_vec(&mut curve, count)?;
        for v in curve.iter_mut() {
            *v = r.u16()?;
        }
        Ok(curve)
    }

    /// Description up to the NUL.
    pub fn description(&self) -> String {
        let end = self.desc.iter().position(|&b| b == 0).unwrap_or(self.desc.len());
        String::from_utf8_lossy(&self.desc[..end]).into_owned()
    }
}

impl TagType for UcrBg {
    fn type_signature(&self) -> TypeSignature {
        TypeSignature::UCR_BG
    }

    fn min_size(&self) -> u32 {
        TAG_HEADER_SIZE + 8
    }

    fn get_size(&self, _ctx: &TagContext) -> u32 {
        let curves = sat_mul(sat_u32(self.ucr.len().sat_add(self.bg.len())), 2);
        sat_add(sat_add(TAG_HEADER_SIZE + 8, curves), sat_u32(self.desc.len()))
    }

    fn decode(&mut self, body: &[u8], _ctx: &TagContext) -> Result<()> {
        let mut r = ByteReader::new(body);
        self.ucr = Self::read_curve(&mut r)?;
        self.bg = Self::read_curve(&mut r)?;
        self.desc = r.bytes(r.remaining())?.to_vec();
        Ok(())
    }

    fn encode(&self, w: &mut ByteWriter, _ctx: &TagContext) -> Result<()> {
        for curve in [&self.ucr, &self.bg] {
            w.count32("ucr/bg curve count", curve.len())?;
            for &v in curve.iter() {
                w.u16(v);
            }
        }
        w.bytes(&self.desc);
        Ok(())
    }

    fn dump_to(&self, out: &mut dyn fmt::Write, verbose: u32) -> fmt::Result {
        writeln!(out, "Undercolor Removal/Black Generation:")?;
        for (name, curve) in [("UCR", &self.ucr), ("BG", &self.bg)] {
            match curve.len() {
                0 => writeln!(out, "  {}: none", name)?,
                1 => writeln!(out, "  {}: {}%", name, curve[0])?,
                n => {
                    writeln!(out, "  {}: curve of {} entries", name, n)?;
                    if verbose >= 2 {
                        for (i, v) in curve.iter().enumerate() {
                            writeln!(out, "    {:3}: {}", i, v)?;
                        }
                    }
                }
            }
        }
        writeln!(out, "  Description: \"{}\"", self.description())
    }

    fn allocate(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Per-channel formula of a `vcgt` tag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VcgtFormula {
    pub gamma: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for VcgtFormula {
    fn default() -> Self {
        Self {
            gamma: 1.0,
            min: 0.0,
            max: 1.0,
        }
    }
}

impl VcgtFormula {
    pub fn eval(&self, v: f64) -> f64 {
        self.min + (self.max - self.min) * v.clamp(0.0, 1.0).powf(self.gamma)
    }
}

/// Payload of a `vcgt` tag.
#[derive(Debug, Clone, PartialEq)]
pub enum VcgtData {
    /// `channels` ramps of `entry_count` values, each `entry_size` bytes
    /// on disk. Values are normalized to `[0, 1]`.
    Table {
        channels: usize,
        entry_count: usize,
        entry_size: usize,
        data: Vec<f64>,
    },
    Formula([VcgtFormula; 3]),
}

const VCGT_TABLE: u32 = 0;
const VCGT_FORMULA: u32 = 1;

/// Apple video card gamma tag.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoCardGamma {
    pub data: VcgtData,
}

impl Default for VideoCardGamma {
    fn default() -> Self {
        Self {
            data: VcgtData::Formula([VcgtFormula::default(); 3]),
        }
    }
}

impl VideoCardGamma {
    /// Identity ramps of `entry_count` 16-bit entries for `channels`.
    pub fn linear_table(channels: usize, entry_count: usize) -> Self {
        let mut data = Vec::with_capacity(channels * entry_count);
        for _ in 0..channels {
            data.extend((0..entry_count).map(|i| i as f64 / (entry_count.max(2) - 1) as f64));
        }
        Self {
            data: VcgtData::Table {
                channels,
                entry_count,
                entry_size: 2,
                data,
            },
        }
    }

    /// Apply the ramp for `channel` to `v` in `[0, 1]`.
    pub fn lookup(&self, channel: usize, v: f64) -> Option<f64> {
        match &self.data {
            VcgtData::Formula(f) => f.get(channel).map(|f| f.eval(v)),
            VcgtData::Table {
                channels,
                entry_count,
                data,
                ..
            } => {
                if channel >= *channels {
                    return None;
                }
                let ramp = data.get(channel * entry_count..(channel + 1) * entry_count)?;
                Some(crate::math::lut1d_interp(ramp, v))
            }
        }
    }
}

impl TagType for VideoCardGamma {
    fn type_signature(&self) -> TypeSignature {
        TypeSignature::VIDEO_CARD_GAMMA
    }

    fn min_size(&self) -> u32 {
        TAG_HEADER_SIZE + 4
    }

    fn get_size(&self, _ctx: &TagContext) -> u32 {
        match &self.data {
            VcgtData::Table {
                channels,
                entry_count,
                entry_size,
                ..
            } => sat_add(
                TAG_HEADER_SIZE + 10,
                sat_mul3(sat_u32(*channels), sat_u32(*entry_count), sat_u32(*entry_size)),
            ),
            VcgtData::Formula(_) => TAG_HEADER_SIZE + 4 + 36,
        }
    }

    fn decode(&mut self, body: &[u8], _ctx: &TagContext) -> Result<()> {
        let mut r = ByteReader::new(body);
        match r.u32()? {
            VCGT_TABLE => {
                let channels = r.u16()? as usize;
                let entry_count = r.u16()? as usize;
                let entry_size = r.u16()? as usize;
                if entry_size != 1 && entry_size != 2 {
                    return Err(IccError::CorruptedData(format!(
                        "vcgt entry size {} is not 1 or 2",
                        entry_size
                    )));
                }
                let n = channels.sat_mul(entry_count);
                if n.sat_mul(entry_size) > r.remaining() {
                    return Err(short_payload(&r, n.sat_mul(entry_size)));
                }
                let mut data = Vec::new();
                alloc_vec(&mut data, n)?;
                for v in data.iter_mut() {
                    *v = if entry_size == 1 { r.dcs8()? } else { r.dcs16()? };
                }
                self.data = VcgtData::Table {
                    channels,
                    entry_count,
                    entry_size,
                    data,
                };
            }
            VCGT_FORMULA => {
                let mut f = [VcgtFormula::default(); 3];
                for c in f.iter_mut() {
                    c.gamma = r.s15f16()?;
                    c.min = r.s15f16()?;
                    c.max = r.s15f16()?;
                }
                self.data = VcgtData::Formula(f);
            }
            other => {
                return Err(IccError::CorruptedData(format!(
                    "vcgt kind {} is neither table nor formula",
                    other
                )))
            }
        }
        Ok(())
    }

    fn encode(&self, w: &mut ByteWriter, _ctx: &TagContext) -> Result<()> {
        match &self.data {
            VcgtData::Table {
                channels,
                entry_count,
                entry_size,
                data,
            } => {
                if data.len() != channels.sat_mul(*entry_count) {
                    return Err(IccError::CorruptedData("vcgt table not allocated".into()));
                }
                w.u32(VCGT_TABLE);
                w.count16("vcgt channel count", *channels)?;
                w.count16("vcgt entry count", *entry_count)?;
                w.count16("vcgt entry size", *entry_size)?;
                for &v in data {
                    match entry_size {
                        1 => w.dcs8(v)?,
                        2 => w.dcs16(v)?,
                        _ => {
                            return Err(IccError::NotRepresentable {
                                field: "vcgt entry size",
                                value: *entry_size as f64,
                            })
                        }
                    }
                }
            }
            VcgtData::Formula(f) => {
                w.u32(VCGT_FORMULA);
                for c in f {
                    w.s15f16(c.gamma)?;
                    w.s15f16(c.min)?;
                    w.s15f16(c.max)?;
                }
            }
        }
        Ok(())
    }

    fn dump_to(&self, out: &mut dyn fmt::Write, verbose: u32) -> fmt::Result {
        writeln!(out, "Video Card Gamma:")?;
        match &self.data {
            VcgtData::Table {
                channels,
                entry_count,
                entry_size,
                data,
            } => {
                writeln!(
                    out,
                    "  Table: {} channels, {} entries of {} bytes",
                    channels, entry_count, entry_size
                )?;
                if verbose >= 2 {
                    for (i, ramp) in data.chunks(*entry_count.max(&1)).enumerate() {
                        let last = ramp.last().copied().unwrap_or(0.0);
                        writeln!(out, "    channel {}: ends at {:.6}", i, last)?;
                    }
                }
            }
            VcgtData::Formula(f) => {
                for (i, c) in f.iter().enumerate() {
                    writeln!(
                        out,
                        "  channel {}: gamma {:.4}, min {:.4}, max {:.4}",
                        i, c.gamma, c.min, c.max
                    )?;
                }
            }
        }
        Ok(())
    }

    fn allocate(&mut self) -> Result<()> {
        if let VcgtData::Table {
            channels,
            entry_count,
            data,
            ..
        } = &mut self.data
        {
            alloc_vec(data, channels.sat_mul(*entry_count))?;
        }
        Ok(())
    }
}

/// crdInfoType: PostScript product name and CRD names per intent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CrdInfo {
    /// Raw bytes, NUL included when present
    pub product: Vec<u8>,
    pub crd_names: [Vec<u8>; 4],
}

impl CrdInfo {
    fn read_counted(r: &mut ByteReader<'_>) -> Result<Vec<u8>> {
        let count = r.u32()? as usize;
        if count > r.remaining() {
            return Err(short_payload(r, count));
        }
        Ok(r.bytes(count)?.to_vec())
    }
}

impl TagType for CrdInfo {
    fn type_signature(&self) -> TypeSignature {
        TypeSignature::CRD_INFO
    }

    fn min_size(&self) -> u32 {
        TAG_HEADER_SIZE + 20
    }

    fn get_size(&self, _ctx: &TagContext) -> u32 {
        std::iter::once(&self.product)
            .chain(self.crd_names.iter())
            .fold(TAG_HEADER_SIZE, |acc, s| sat_add(acc, sat_add(4, sat_u32(s.len()))))
    }

    fn decode(&mut self, body: &[u8], _ctx: &TagContext) -> Result<()> {
        let mut r = ByteReader::new(body);
        self.product = Self::read_counted(&mut r)?;
        for name in self.crd_names.iter_mut() {
            *name = Self::read_counted(&mut r)?;
        }
        Ok(())
    }

    fn encode(&self, w: &mut ByteWriter, _ctx: &TagContext) -> Result<()> {
        for s in std::iter::once(&self.product).chain(self.crd_names.iter()) {
            w.count32("crdi string length", s.len())?;
            w.bytes(s);
        }
        Ok(())
    }

    fn dump_to(&self, out: &mut dyn fmt::Write, _verbose: u32) -> fmt::Result {
        let show = |s: &[u8]| {
            let end = s.iter().position(|&b| b == 0).unwrap_or(s.len());
            String::from_utf8_lossy(&s[..end]).into_owned()
        };
        writeln!(out, "PostScript Product name and CRD names:")?;
        writeln!(out, "  Product name = \"{}\"", show(&self.product))?;
        for (i, n) in self.crd_names.iter().enumerate() {
            writeln!(out, "  CRD {} name = \"{}\"", i, show(n))?;
        }
        Ok(())
    }

    fn allocate(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icc::tags::Tag;

    fn roundtrip(tag: Tag) -> Tag {
        let ctx = TagContext::default();
        let bytes = tag.to_bytes(&ctx).unwrap();
        assert_eq!(bytes.len() as u32, tag.get_size(&ctx));
        Tag::from_bytes(&bytes, &ctx, false).unwrap()
    }

    #[test]
    fn test_screening_channels() {
        let mut s = Screening {
            flags: 1,
            channels: 2,
            data: Vec::new(),
        };
        s.allocate().unwrap();
        s.data[0] = ScreeningChannel {
            frequency: 150.0,
            angle: 45.0,
            spot_shape: 3,
        };
        s.data[1].angle = 15.0;
        let back = roundtrip(s.into());
        let back = back.as_screening().unwrap();
        assert_eq!(back.data[0].frequency, 150.0);
        assert_eq!(back.data[0].spot_shape, 3);
        assert_eq!(back.data[1].angle, 15.0);
    }

    #[test]
    fn test_ucrbg_percentage_and_curve() {
        let u = UcrBg {
            ucr: vec![40],
            bg: vec![0, 1000, 40000, 65535],
            desc: b"GCR heavy\0".to_vec(),
        };
        let back = roundtrip(u.clone().into());
        let back = back.as_ucr_bg().unwrap();
        assert_eq!(back, &u);
        assert_eq!(back.description(), "GCR heavy");
    }

    #[test]
    fn test_vcgt_table_and_formula() {
        let v = VideoCardGamma::linear_table(3, 256);
        let back = roundtrip(v.into());
        let back = back.as_video_card_gamma().unwrap();
        assert!((back.lookup(1, 0.5).unwrap() - 0.5).abs() < 1e-4);
        assert!(back.lookup(3, 0.5).is_none());

        let mut f = VideoCardGamma::default();
        if let VcgtData::Formula(ch) = &mut f.data {
            ch[0].gamma = 2.2;
        }
        let back = roundtrip(f.into());
        let y = back.as_video_card_gamma().unwrap().lookup(0, 0.5).unwrap();
        assert!((y - 0.5f64.powf(2.2)).abs() < 1e-4);
    }

    #[test]
    fn test_vcgt_rejects_odd_entry_size() {
        let mut bytes = b"vcgt\0\0\0\0".to_vec();
        bytes.extend_from_slice(&0u32.to_be_bytes());
        bytes.extend_from_slice(&[0, 1, 0, 2, 0, 3]);
        bytes.extend_from_slice(&[0; 6]);
        assert!(matches!(
            Tag::from_bytes(&bytes, &TagContext::default(), false),
            Err(IccError::CorruptedData(_))
        ));
    }

    #[test]
    fn test_crdi_strings() {
        let c = CrdInfo {
            product: b"Printer\0".to_vec(),
            crd_names: [b"P\0".to_vec(), Vec::new(), b"S\0".to_vec(), Vec::new()],
        };
        let back = roundtrip(c.clone().into());
        assert_eq!(back.as_crd_info().unwrap(), &c);
        let mut out = String::new();
        back.dump(&mut out, 1);
        assert!(out.contains("\"Printer\""));
    }
}
