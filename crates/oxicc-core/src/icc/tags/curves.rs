//! Curve Tag Types
//!
//! - curv: identity, a single gamma, or a sampled table
//! - para: one of the five parametric function families
//!
//! See ICC.1:2022 Sections 10.6 (curv) and 10.18 (para)

use std::cell::OnceCell;
use std::fmt;

use super::{alloc_vec, element_count, sat_u32, Result, TagContext, TagType, TAG_HEADER_SIZE};
use crate::icc::error::IccError;
use crate::icc::primitives::{ByteReader, ByteWriter};
use crate::icc::types::TypeSignature;
use crate::lut::RevTable;
use crate::math::{lut1d_interp, ParametricCurve, ParametricCurveType};
use crate::sat::{sat_add, sat_mul};

/// What a `curv` tag holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurveKind {
    /// Identity (count = 0)
    #[default]
    Linear,
    /// `y = x^g` (count = 1, u8Fixed8)
    Gamma,
    /// Sampled table (count >= 2)
    Table,
}

/// Curve tag data (curv type)
#[derive(Debug, Clone, Default)]
pub struct Curve {
    pub kind: CurveKind,
    /// Logical entry count: 0 for Linear, 1 for Gamma
    pub size: usize,
    /// Gamma exponent, or table values in `[0, 1]`
    data: Vec<f64>,
    rev: OnceCell<RevTable>,
}

impl Curve {
    pub fn linear() -> Self {
        Self::default()
    }

    pub fn gamma(g: f64) -> Self {
        Self {
            kind: CurveKind::Gamma,
            size: 1,
            data: vec![g],
            rev: OnceCell::new(),
        }
    }

    pub fn from_table(values: Vec<f64>) -> Self {
        Self {
            kind: CurveKind::Table,
            size: values.len(),
            data: values,
            rev: OnceCell::new(),
        }
    }

    /// Gamma exponent, or table values in `[0, 1]`.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Editable values. Drops the reverse index, which is rebuilt on the
    /// next backward lookup.
    pub fn data_mut(&mut self) -> &mut [f64] {
        self.invalidate_reverse();
        &mut self.data
    }

    pub fn invalidate_reverse(&mut self) {
        self.rev = OnceCell::new();
    }

    /// Forward lookup. Clips (and reports it) outside `[0, 1]`.
    pub fn lookup_fwd(&self, v: f64) -> (f64, bool) {
        let clip = !(0.0..=1.0).contains(&v);
        let x = v.clamp(0.0, 1.0);
        let y = match self.kind {
            CurveKind::Linear => x,
            CurveKind::Gamma => x.powf(self.data.first().copied().unwrap_or(1.0)),
            CurveKind::Table => lut1d_interp(&self.data, x),
        };
        (y, clip)
    }

    /// Backward lookup. Table curves build their reverse index on first use.
    pub fn lookup_bwd(&self, v: f64) -> (f64, bool) {
        match self.kind {
            CurveKind::Linear => (v.clamp(0.0, 1.0), !(0.0..=1.0).contains(&v)),
            CurveKind::Gamma => {
                let g = self.data.first().copied().unwrap_or(1.0);
                let clip = !(0.0..=1.0).contains(&v);
                let y = v.clamp(0.0, 1.0);
                if g.abs() > 1e-10 {
                    (y.powf(1.0 / g), clip)
                } else {
                    (y, clip)
                }
            }
            CurveKind::Table => self
                .rev
                .get_or_init(|| RevTable::build(&self.data))
                .lookup(&self.data, v),
        }
    }
}

impl TagType for Curve {
    fn type_signature(&self) -> TypeSignature {
        TypeSignature::CURVE
    }

    fn min_size(&self) -> u32 {
        TAG_HEADER_SIZE + 4
    }

    fn get_size(&self, _ctx: &TagContext) -> u32 {
        sat_add(TAG_HEADER_SIZE + 4, sat_mul(sat_u32(self.size), 2))
    }

    fn decode(&mut self, body: &[u8], _ctx: &TagContext) -> Result<()> {
        let mut r = ByteReader::new(body);
        let count = r.u32()? as usize;
        if count > element_count(body.len(), 4, 2)? {
            return Err(IccError::TooSmall {
                expected: count.saturating_mul(2).saturating_add(4),
                actual: body.len(),
            });
        }
        self.size = count;
        self.kind = match count {
            0 => CurveKind::Linear,
            1 => CurveKind::Gamma,
            _ => CurveKind::Table,
        };
        self.allocate()?;
        match self.kind {
            CurveKind::Linear => {}
            CurveKind::Gamma => self.data[0] = r.u8f8()?,
            CurveKind::Table => {
                for v in self.data.iter_mut() {
                    *v = r.dcs16()?;
                }
            }
        }
        Ok(())
    }

    fn encode(&self, w: &mut ByteWriter, _ctx: &TagContext) -> Result<()> {
        w.count32("curve entry count", self.size)?;
        match self.kind {
            CurveKind::Linear => {}
            CurveKind::Gamma => w.u8f8(self.data.first().copied().unwrap_or(1.0))?,
            CurveKind::Table => {
                if self.data.len() != self.size {
                    return Err(IccError::CorruptedData("curve table not allocated".into()));
                }
                for &v in &self.data {
                    w.dcs16(v)?;
                }
            }
        }
        Ok(())
    }

    fn dump_to(&self, out: &mut dyn fmt::Write, verbose: u32) -> fmt::Result {
        writeln!(out, "Curve:")?;
        match self.kind {
            CurveKind::Linear => writeln!(out, "  Curve is linear"),
            CurveKind::Gamma => {
                let g = self.data.first().copied().unwrap_or(1.0);
                writeln!(out, "  Curve is gamma of {:.6}", g)
            }
            CurveKind::Table => {
                writeln!(out, "  No. elements = {}", self.size)?;
                if verbose >= 2 {
                    for (i, v) in self.data.iter().enumerate() {
                        writeln!(out, "    {:3}:  {:.6}", i, v)?;
                    }
                }
                Ok(())
            }
        }
    }

    fn allocate(&mut self) -> Result<()> {
        let size = match self.kind {
            CurveKind::Linear => 0,
            CurveKind::Gamma => 1,
            CurveKind::Table if self.size < 2 => {
                return Err(IccError::CorruptedData(format!(
                    "curve table needs at least 2 entries, has {}",
                    self.size
                )))
            }
            CurveKind::Table => self.size,
        };
        self.size = size;
        if alloc_vec(&mut self.data, size)? {
            self.rev = OnceCell::new();
        }
        Ok(())
    }
}

/// Parametric curve tag (para type)
#[derive(Debug, Clone, PartialEq)]
pub struct ParametricCurveTag {
    pub curve: ParametricCurve,
}

impl Default for ParametricCurveTag {
    fn default() -> Self {
        Self {
            curve: ParametricCurve::gamma(1.0),
        }
    }
}

impl ParametricCurveTag {
    pub fn new(curve: ParametricCurve) -> Self {
        Self { curve }
    }

    pub fn lookup_fwd(&self, v: f64) -> (f64, bool) {
        (self.curve.eval(v), !(0.0..=1.0).contains(&v))
    }

    pub fn lookup_bwd(&self, v: f64) -> (f64, bool) {
        (self.curve.eval_inverse(v), !(0.0..=1.0).contains(&v))
    }
}

impl TagType for ParametricCurveTag {
    fn type_signature(&self) -> TypeSignature {
        TypeSignature::PARA
    }

    fn min_size(&self) -> u32 {
        TAG_HEADER_SIZE + 8
    }

    fn get_size(&self, _ctx: &TagContext) -> u32 {
        TAG_HEADER_SIZE + 4 + 4 * self.curve.curve_type.param_count() as u32
    }

    fn decode(&mut self, body: &[u8], _ctx: &TagContext) -> Result<()> {
        let mut r = ByteReader::new(body);
        let function = r.u16()?;
        r.skip(2)?;
        let curve_type = ParametricCurveType::from_icc(function).ok_or_else(|| {
            IccError::CorruptedData(format!("unknown parametric function type {}", function))
        })?;
        let mut params = Vec::with_capacity(curve_type.param_count());
        for _ in 0..curve_type.param_count() {
            params.push(r.s15f16()?);
        }
        self.curve = ParametricCurve::from_params(curve_type, &params).ok_or_else(|| {
            IccError::CorruptedData("parametric curve parameter count".into())
        })?;
        Ok(())
    }

    fn encode(&self, w: &mut ByteWriter, _ctx: &TagContext) -> Result<()> {
        w.u16(self.curve.curve_type.to_icc());
        w.u16(0);
        for p in self.curve.to_params() {
            w.s15f16(p)?;
        }
        Ok(())
    }

    fn dump_to(&self, out: &mut dyn fmt::Write, _verbose: u32) -> fmt::Result {
        writeln!(out, "Parametric curve:")?;
        writeln!(out, "  Function type = {}", self.curve.curve_type.to_icc())?;
        let names = ["g", "a", "b", "c", "d", "e", "f"];
        for (name, p) in names.iter().zip(self.curve.to_params()) {
            writeln!(out, "  {} = {:.6}", name, p)?;
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

    fn roundtrip(tag: &Tag) -> Tag {
        let ctx = TagContext::default();
        Tag::from_bytes(&tag.to_bytes(&ctx).unwrap(), &ctx, false).unwrap()
    }

    #[test]
    fn test_curve_kinds_by_count() {
        let lin = roundtrip(&Curve::linear().into());
        assert_eq!(lin.as_curve().unwrap().kind, CurveKind::Linear);
        assert_eq!(lin.get_size(&TagContext::default()), 12);

        let gamma = roundtrip(&Curve::gamma(2.2).into());
        let g = gamma.as_curve().unwrap();
        assert_eq!(g.kind, CurveKind::Gamma);
        assert!((g.data[0] - 2.2).abs() <= 1.0 / 256.0);
    }

    #[test]
    fn test_table_bytes_roundtrip() {
        let mut bytes = b"curv\0\0\0\0".to_vec();
        bytes.extend_from_slice(&3u32.to_be_bytes());
        for v in [0u16, 0x4000, 0xFFFF] {
            bytes.extend_from_slice(&v.to_be_bytes());
        }
        let ctx = TagContext::default();
        let tag = Tag::from_bytes(&bytes, &ctx, false).unwrap();
        assert_eq!(tag.to_bytes(&ctx).unwrap(), bytes);
    }

    #[test]
    fn test_count_beyond_length_fails() {
        let mut bytes = b"curv\0\0\0\0".to_vec();
        bytes.extend_from_slice(&1000u32.to_be_bytes());
        bytes.extend_from_slice(&[0, 0]);
        assert!(Tag::from_bytes(&bytes, &TagContext::default(), false).is_err());
    }

    #[test]
    fn test_fwd_bwd_idempotence() {
        let table: Vec<f64> = (0..64).map(|i| (i as f64 / 63.0).powf(1.8)).collect();
        let curve = Curve::from_table(table);
        let step = 1.0 / 63.0;
        for i in 1..50 {
            let v = i as f64 / 50.0;
            let (y, clip) = curve.lookup_fwd(v);
            assert!(!clip);
            let (back, clip) = curve.lookup_bwd(y);
            assert!(!clip);
            assert!((back - v).abs() <= step, "v={v} back={back}");
        }
    }

    #[test]
    fn test_fwd_clip_flag() {
        let curve = Curve::gamma(2.0);
        assert_eq!(curve.lookup_fwd(0.5), (0.25, false));
        assert_eq!(curve.lookup_fwd(1.5), (1.0, true));
        assert_eq!(curve.lookup_fwd(-0.1), (0.0, true));
        assert!((curve.lookup_bwd(0.25).0 - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_allocate_resets_reverse_cache() {
        let mut curve = Curve::from_table(vec![0.0, 1.0]);
        assert!((curve.lookup_bwd(0.25).0 - 0.25).abs() < 1e-12);
        curve.size = 3;
        curve.allocate().unwrap();
        curve.data.copy_from_slice(&[0.0, 0.0, 1.0]);
        assert!((curve.lookup_bwd(0.5).0 - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_edit_in_place_resets_reverse_cache() {
        let mut curve = Curve::from_table(vec![0.0, 0.5, 1.0]);
        assert!((curve.lookup_bwd(0.25).0 - 0.25).abs() < 1e-12);
        curve.data_mut()[1] = 0.25;
        assert_eq!(curve.data(), &[0.0, 0.25, 1.0]);
        assert!((curve.lookup_bwd(0.25).0 - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_para_roundtrip() {
        let tag: Tag = ParametricCurveTag::new(ParametricCurve::srgb()).into();
        assert_eq!(tag.get_size(&TagContext::default()), 12 + 20);
        let back = roundtrip(&tag);
        let curve = back.as_parametric_curve().unwrap().curve;
        assert_eq!(curve.curve_type, ParametricCurveType::IEC61966_2_1);
        assert!((curve.g - 2.4).abs() < 1e-4);
        let (y, _) = back.curve_fwd(0.5).unwrap();
        assert!((y - 0.214).abs() < 1e-3);
    }

    #[test]
    fn test_para_bad_function_type() {
        let bytes = b"para\0\0\0\0\0\x09\0\0\0\x01\0\0";
        assert!(Tag::from_bytes(bytes, &TagContext::default(), false).is_err());
    }
}
