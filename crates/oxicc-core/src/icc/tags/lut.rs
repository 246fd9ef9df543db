//! LUT Tag Types (mft1 / mft2)
//!
//! Both carry per-channel input tables, an N-dimensional CLUT and
//! per-channel output tables, preceded by a 3x3 matrix that only applies
//! to XYZ input. Values are held normalized to `[0, 1]`; the 8-bit form
//! always has 256-entry input and output tables.
//!
//! The CLUT is stored with the first input channel varying least rapidly
//! and the output channels of one grid point adjacent.
//!
//! See ICC.1:2001-04 Sections 6.5.7 (lut16) and 6.5.8 (lut8)

use std::cell::OnceCell;
use std::fmt;

use log::debug;

use super::{alloc_vec, sat_u32, Result, TagContext, TagType, TAG_HEADER_SIZE};
use crate::icc::error::IccError;
use crate::icc::primitives::{ByteReader, ByteWriter};
use crate::icc::types::TypeSignature;
use crate::lut::RevTable;
use crate::math::Matrix3x3;
use crate::sat::{sat_add, sat_mul, sat_pow, SatArith};

/// Most input or output channels a Lut may declare.
pub const MAX_CHAN: usize = 15;

/// Largest per-channel table the 16-bit form may declare.
pub const MAX_TABLE_ENTRIES: usize = 4096;

/// Entries of every 8-bit per-channel table.
pub const LUT8_TABLE_ENTRIES: usize = 256;

/// On-disk sample width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LutPrecision {
    /// lut8Type (mft1)
    Eight,
    /// lut16Type (mft2)
    Sixteen,
}

impl LutPrecision {
    fn fixed_size(self) -> u32 {
        match self {
            Self::Eight => 48,
            Self::Sixteen => 52,
        }
    }

    fn sample_size(self) -> u32 {
        match self {
            Self::Eight => 1,
            Self::Sixteen => 2,
        }
    }
}

/// lut8Type / lut16Type
#[derive(Debug, Clone)]
pub struct Lut {
    pub precision: LutPrecision,
    pub input_chan: usize,
    pub output_chan: usize,
    /// Grid points per CLUT dimension
    pub clut_points: usize,
    /// Entries per input table
    pub input_ent: usize,
    /// Entries per output table
    pub output_ent: usize,
    pub matrix: Matrix3x3,
    /// `input_chan` tables of `input_ent` entries, back to back
    pub input_table: Vec<f64>,
    /// `output_chan * clut_points ^ input_chan` samples
    pub clut_table: Vec<f64>,
    /// `output_chan` tables of `output_ent` entries, back to back
    pub output_table: Vec<f64>,
    pub(crate) rev_input: Vec<OnceCell<RevTable>>,
    pub(crate) rev_output: Vec<OnceCell<RevTable>>,
    /// CLUT index step per input dimension
    pub(crate) dinc: Vec<usize>,
    /// CLUT offsets of the `2 ^ input_chan` corners of a grid cell
    pub(crate) dcube: Vec<usize>,
}

impl Lut {
    /// Empty Lut of the given precision. Set the dimensions, then
    /// [`TagType::allocate`].
    pub fn new(precision: LutPrecision) -> Self {
        let ent = match precision {
            LutPrecision::Eight => LUT8_TABLE_ENTRIES,
            LutPrecision::Sixteen => 0,
        };
        Self {
            precision,
            input_chan: 0,
            output_chan: 0,
            clut_points: 0,
            input_ent: ent,
            output_ent: ent,
            matrix: Matrix3x3::identity(),
            input_table: Vec::new(),
            clut_table: Vec::new(),
            output_table: Vec::new(),
            rev_input: Vec::new(),
            rev_output: Vec::new(),
            dinc: Vec::new(),
            dcube: Vec::new(),
        }
    }

    /// Allocated Lut with zeroed tables and an identity matrix.
    pub fn with_dims(
        precision: LutPrecision,
        input_chan: usize,
        output_chan: usize,
        clut_points: usize,
        input_ent: usize,
        output_ent: usize,
    ) -> Result<Self> {
        let mut lut = Self::new(precision);
        lut.input_chan = input_chan;
        lut.output_chan = output_chan;
        lut.clut_points = clut_points;
        if precision == LutPrecision::Sixteen {
            lut.input_ent = input_ent;
            lut.output_ent = output_ent;
        }
        lut.allocate()?;
        Ok(lut)
    }

    /// Input table of channel `ch`.
    pub fn input_curve(&self, ch: usize) -> &[f64] {
        let start = ch * self.input_ent;
        self.input_table.get(start..start + self.input_ent).unwrap_or(&[])
    }

    pub fn input_curve_mut(&mut self, ch: usize) -> &mut [f64] {
        let start = ch * self.input_ent;
        self.input_table.get_mut(start..start + self.input_ent).unwrap_or(&mut [])
    }

    /// Output table of channel `ch`.
    pub fn output_curve(&self, ch: usize) -> &[f64] {
        let start = ch * self.output_ent;
        self.output_table.get(start..start + self.output_ent).unwrap_or(&[])
    }

    pub fn output_curve_mut(&mut self, ch: usize) -> &mut [f64] {
        let start = ch * self.output_ent;
        self.output_table.get_mut(start..start + self.output_ent).unwrap_or(&mut [])
    }

    /// Number of CLUT grid points (vertices).
    pub fn clut_vertices(&self) -> usize {
        sat_pow(self.clut_points, self.input_chan as u32)
    }

    /// Drop cached reverse tables after tables were edited in place.
    pub fn invalidate_reverse(&mut self) {
        self.rev_input = (0..self.input_chan).map(|_| OnceCell::new()).collect();
        self.rev_output = (0..self.output_chan).map(|_| OnceCell::new()).collect();
    }

    /// True if the matrix must be applied (non-identity).
    pub fn has_matrix(&self) -> bool {
        !self.matrix.is_identity(1e-9)
    }

    fn validate_dims(&self) -> Result<()> {
        if !(1..=MAX_CHAN).contains(&self.input_chan) || !(1..=MAX_CHAN).contains(&self.output_chan) {
            return Err(IccError::CorruptedData(format!(
                "Lut channel counts {} -> {} outside 1..={}",
                self.input_chan, self.output_chan, MAX_CHAN
            )));
        }
        if self.clut_points < 2 {
            return Err(IccError::CorruptedData(format!(
                "Lut needs at least 2 CLUT points, has {}",
                self.clut_points
            )));
        }
        let ents = 2..=MAX_TABLE_ENTRIES;
        if !ents.contains(&self.input_ent) || !ents.contains(&self.output_ent) {
            return Err(IccError::CorruptedData(format!(
                "Lut table sizes {} / {} outside 2..={}",
                self.input_ent, self.output_ent, MAX_TABLE_ENTRIES
            )));
        }
        Ok(())
    }

    fn table_sizes(&self) -> Result<(usize, usize, usize)> {
        let clut = sat_mul(self.clut_vertices(), self.output_chan);
        if clut.is_saturated() {
            return Err(IccError::TooLarge("Lut CLUT"));
        }
        Ok((
            self.input_chan * self.input_ent,
            clut,
            self.output_chan * self.output_ent,
        ))
    }

    fn compute_increments(&mut self) {
        let mut dinc = vec![0usize; self.input_chan];
        let mut step = self.output_chan;
        for d in dinc.iter_mut().rev() {
            *d = step;
            step = step.sat_mul(self.clut_points);
        }
        let dcube = (0..1usize << self.input_chan)
            .map(|corner| {
                dinc.iter()
                    .enumerate()
                    .filter(|(i, _)| corner & (1 << i) != 0)
                    .map(|(_, &d)| d)
                    .sum()
            })
            .collect();
        self.dinc = dinc;
        self.dcube = dcube;
    }

    fn read_sample(&self, r: &mut ByteReader<'_>) -> Result<f64> {
        match self.precision {
            LutPrecision::Eight => r.dcs8(),
            LutPrecision::Sixteen => r.dcs16(),
        }
    }

    fn write_sample(&self, w: &mut ByteWriter, v: f64) -> Result<()> {
        match self.precision {
            LutPrecision::Eight => w.dcs8(v),
            LutPrecision::Sixteen => w.dcs16(v),
        }
    }
}

impl TagType for Lut {
    fn type_signature(&self) -> TypeSignature {
        match self.precision {
            LutPrecision::Eight => TypeSignature::LUT8,
            LutPrecision::Sixteen => TypeSignature::LUT16,
        }
    }

    fn min_size(&self) -> u32 {
        self.precision.fixed_size()
    }

    fn get_size(&self, _ctx: &TagContext) -> u32 {
        let clut_ent = sat_mul(
            sat_pow(sat_u32(self.clut_points), self.input_chan as u32),
            sat_u32(self.output_chan),
        );
        let samples = sat_add(
            sat_add(
                sat_mul(sat_u32(self.input_chan), sat_u32(self.input_ent)),
                clut_ent,
            ),
            sat_mul(sat_u32(self.output_chan), sat_u32(self.output_ent)),
        );
        sat_add(
            self.precision.fixed_size(),
            sat_mul(samples, self.precision.sample_size()),
        )
    }

    fn decode(&mut self, body: &[u8], ctx: &TagContext) -> Result<()> {
        let mut r = ByteReader::new(body);
        self.input_chan = r.u8()? as usize;
        self.output_chan = r.u8()? as usize;
        self.clut_points = r.u8()? as usize;
        r.skip(1)?;
        let mut m = [0.0; 9];
        for v in m.iter_mut() {
            *v = r.s15f16()?;
        }
        self.matrix = Matrix3x3::from_row_major(&m);
        match self.precision {
            LutPrecision::Eight => {
                self.input_ent = LUT8_TABLE_ENTRIES;
                self.output_ent = LUT8_TABLE_ENTRIES;
            }
            LutPrecision::Sixteen => {
                self.input_ent = r.u16()? as usize;
                self.output_ent = r.u16()? as usize;
            }
        }
        self.validate_dims()?;

        let expected = self.get_size(ctx);
        let actual = sat_u32(body.len()).sat_add(TAG_HEADER_SIZE);
        if expected.is_saturated() {
            return Err(IccError::TooLarge("Lut tables"));
        }
        if expected != actual {
            return Err(IccError::CorruptedData(format!(
                "Lut dimensions need {} bytes, tag holds {}",
                expected, actual
            )));
        }

        self.allocate()?;
        let mut input = std::mem::take(&mut self.input_table);
        let mut clut = std::mem::take(&mut self.clut_table);
        let mut output = std::mem::take(&mut self.output_table);
        for table in [&mut input, &mut clut, &mut output] {
            for v in table.iter_mut() {
                *v = self.read_sample(&mut r)?;
            }
        }
        self.input_table = input;
        self.clut_table = clut;
        self.output_table = output;
        debug!(
            "{} {} -> {} channels, {} grid points",
            self.type_signature(),
            self.input_chan,
            self.output_chan,
            self.clut_points
        );
        Ok(())
    }

    fn encode(&self, w: &mut ByteWriter, _ctx: &TagContext) -> Result<()> {
        let (n_in, n_clut, n_out) = self.table_sizes()?;
        if self.input_table.len() != n_in
            || self.clut_table.len() != n_clut
            || self.output_table.len() != n_out
        {
            return Err(IccError::CorruptedData("Lut tables not allocated".into()));
        }
        w.count8("Lut input channels", self.input_chan)?;
        w.count8("Lut output channels", self.output_chan)?;
        w.count8("Lut CLUT points", self.clut_points)?;
        w.u8(0);
        for v in self.matrix.to_row_major() {
            w.s15f16(v)?;
        }
        if self.precision == LutPrecision::Sixteen {
            w.count16("Lut input entries", self.input_ent)?;
            w.count16("Lut output entries", self.output_ent)?;
        }
        for table in [&self.input_table, &self.clut_table, &self.output_table] {
            for &v in table.iter() {
                self.write_sample(w, v)?;
            }
        }
        Ok(())
    }

    fn dump_to(&self, out: &mut dyn fmt::Write, verbose: u32) -> fmt::Result {
        writeln!(out, "Lut{}:", if self.precision == LutPrecision::Eight { 8 } else { 16 })?;
        writeln!(out, "  Input Channels = {}", self.input_chan)?;
        writeln!(out, "  Output Channels = {}", self.output_chan)?;
        writeln!(out, "  CLUT resolution = {}", self.clut_points)?;
        writeln!(out, "  Input Table entries = {}", self.input_ent)?;
        writeln!(out, "  Output Table entries = {}", self.output_ent)?;
        if verbose >= 2 {
            writeln!(out, "  Matrix:")?;
            for row in &self.matrix.m {
                writeln!(out, "    {:.8} {:.8} {:.8}", row[0], row[1], row[2])?;
            }
        }
        if verbose >= 3 {
            for ch in 0..self.input_chan {
                writeln!(out, "  Input table {}: {:?}", ch, self.input_curve(ch))?;
            }
            for (i, vertex) in self.clut_table.chunks(self.output_chan.max(1)).enumerate() {
                writeln!(out, "  CLUT {}: {:?}", i, vertex)?;
            }
            for ch in 0..self.output_chan {
                writeln!(out, "  Output table {}: {:?}", ch, self.output_curve(ch))?;
            }
        }
        Ok(())
    }

    fn allocate(&mut self) -> Result<()> {
        if self.precision == LutPrecision::Eight {
            self.input_ent = LUT8_TABLE_ENTRIES;
            self.output_ent = LUT8_TABLE_ENTRIES;
        }
        self.validate_dims()?;
        let (n_in, n_clut, n_out) = self.table_sizes()?;
        let mut changed = alloc_vec(&mut self.input_table, n_in)?;
        changed |= alloc_vec(&mut self.clut_table, n_clut)?;
        changed |= alloc_vec(&mut self.output_table, n_out)?;
        if changed || self.rev_input.len() != self.input_chan {
            self.invalidate_reverse();
        }
        self.compute_increments();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icc::tags::Tag;

    fn identity_lut(precision: LutPrecision, points: usize) -> Lut {
        let mut lut = Lut::with_dims(precision, 3, 3, points, 2, 2).unwrap();
        for ch in 0..3 {
            lut.input_curve_mut(ch).copy_from_slice(&[0.0, 1.0]);
            lut.output_curve_mut(ch).copy_from_slice(&[0.0, 1.0]);
        }
        let step = 1.0 / (points - 1) as f64;
        for idx in 0..lut.clut_vertices() {
            for ch in 0..3 {
                let coord = (idx / points.pow(2 - ch as u32)) % points;
                lut.clut_table[idx * 3 + ch] = coord as f64 * step;
            }
        }
        lut
    }

    #[test]
    fn test_lut16_size() {
        let lut = identity_lut(LutPrecision::Sixteen, 2);
        // 52 + 2 * (3*2 + 8*3 + 3*2)
        assert_eq!(lut.get_size(&TagContext::default()), 52 + 72);
    }

    #[test]
    fn test_lut8_forces_256_entries() {
        let lut = Lut::with_dims(LutPrecision::Eight, 1, 3, 3, 2, 2).unwrap();
        assert_eq!(lut.input_ent, 256);
        assert_eq!(lut.input_table.len(), 256);
        assert_eq!(lut.clut_table.len(), 9);
        assert_eq!(lut.get_size(&TagContext::default()), 48 + 256 + 9 + 768);
    }

    #[test]
    fn test_lut16_bytes_roundtrip() {
        let lut = identity_lut(LutPrecision::Sixteen, 3);
        let ctx = TagContext::default();
        let bytes = lut.to_bytes(&ctx).unwrap();
        let back = Tag::from_bytes(&bytes, &ctx, false).unwrap();
        let back = back.as_lut().unwrap();
        assert_eq!((back.input_chan, back.output_chan, back.clut_points), (3, 3, 3));
        for (a, b) in back.clut_table.iter().zip(&lut.clut_table) {
            assert!((a - b).abs() <= 0.5 / 65535.0);
        }
        assert_eq!(back.to_bytes(&ctx).unwrap(), bytes);
    }

    #[test]
    fn test_length_must_match_dimensions() {
        let lut = identity_lut(LutPrecision::Sixteen, 2);
        let ctx = TagContext::default();
        let mut bytes = lut.to_bytes(&ctx).unwrap();
        bytes.push(0);
        bytes.push(0);
        assert!(matches!(
            Tag::from_bytes(&bytes, &ctx, false),
            Err(IccError::CorruptedData(_))
        ));
    }

    #[test]
    fn test_huge_dimensions_rejected_before_allocation() {
        let mut bytes = b"mft2\0\0\0\0".to_vec();
        bytes.extend_from_slice(&[15, 15, 255, 0]);
        for i in 0..9 {
            let v: i32 = if i % 4 == 0 { 0x10000 } else { 0 };
            bytes.extend_from_slice(&v.to_be_bytes());
        }
        bytes.extend_from_slice(&4096u16.to_be_bytes());
        bytes.extend_from_slice(&4096u16.to_be_bytes());
        let err = Tag::from_bytes(&bytes, &TagContext::default(), false).unwrap_err();
        assert!(matches!(err, IccError::TooLarge(_) | IccError::CorruptedData(_)));
    }

    #[test]
    fn test_increments() {
        let lut = identity_lut(LutPrecision::Sixteen, 3);
        assert_eq!(lut.dinc, vec![27, 9, 3]);
        assert_eq!(lut.dcube.len(), 8);
        assert_eq!(lut.dcube[7], 39);
    }
}
