//! Lu: uniform lookup objects over a profile's transforms
//!
//! [`IccProfile::get_luobj`](crate::icc::IccProfile::get_luobj) resolves a
//! function and rendering intent to the tags implementing it (a Lut, a
//! matrix/shaper set or a single gray curve) and wraps them in a
//! [`LuObject`]. Every object evaluates through the same
//! [`LuObject::lookup`], which also applies the absolute/relative PCS
//! conversion and any XYZ/Lab remapping the caller asked for.
//!
//! Device values are normalized to `[0, 1]`. PCS values are XYZ (white
//! `Y = 1`) or Lab (`L` in `0..100`).

mod pcs;
mod resolve;

use crate::color::{D50, Xyz};
use crate::icc::tags::{CurveKind, MAX_CHAN, Tag};
use crate::icc::{ColorSpace, IccError, RenderingIntent, TagHandle, TagSignature, TypeSignature};
use crate::lut::LutInterp;
use crate::math::Matrix3x3;
use crate::simd;

use pcs::LutSide;

type Result<T> = std::result::Result<T, IccError>;

/// Direction of a Lu object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LuFunction {
    /// Device to PCS
    Forward,
    /// PCS to device
    Backward,
    /// PCS to out-of-gamut distance
    Gamut,
    /// PCS to PCS through the device
    Preview,
}

/// Rendering intent requested from a Lu object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LuIntent {
    /// The profile's default (perceptual) table, relative PCS
    #[default]
    Default,
    Perceptual,
    RelativeColorimetric,
    Saturation,
    AbsoluteColorimetric,
}

impl From<RenderingIntent> for LuIntent {
    fn from(intent: RenderingIntent) -> Self {
        match intent {
            RenderingIntent::Perceptual => Self::Perceptual,
            RenderingIntent::RelativeColorimetric => Self::RelativeColorimetric,
            RenderingIntent::Saturation => Self::Saturation,
            RenderingIntent::AbsoluteColorimetric => Self::AbsoluteColorimetric,
        }
    }
}

/// Order in which transform representations are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LuOrder {
    /// Lut, then matrix/shaper, then monochrome
    #[default]
    Normal,
    /// Monochrome, then matrix/shaper, then Lut
    Reverse,
}

/// Representation wrapped by a Lu object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LuAlgorithm {
    Mono,
    Matrix,
    Lut,
}

/// Outcome of a successful lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupStatus {
    #[default]
    Exact,
    /// Some value fell outside a table domain and was clamped.
    Clipped,
}

impl LookupStatus {
    pub fn is_clipped(self) -> bool {
        self == Self::Clipped
    }
}

impl From<bool> for LookupStatus {
    fn from(clipped: bool) -> Self {
        if clipped { Self::Clipped } else { Self::Exact }
    }
}

/// Native and effective colorspaces of a Lu object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LuSpaces {
    /// Input space seen by callers
    pub input: ColorSpace,
    /// Output space seen by callers
    pub output: ColorSpace,
    /// Input space of the wrapped tags
    pub native_input: ColorSpace,
    /// Output space of the wrapped tags
    pub native_output: ColorSpace,
    /// PCS seen by callers
    pub pcs: ColorSpace,
    /// PCS declared by the profile header
    pub native_pcs: ColorSpace,
}

#[derive(Debug, Clone)]
enum LuKind {
    Mono {
        curve: TagHandle,
    },
    Matrix {
        curves: [TagHandle; 3],
        matrix: Matrix3x3,
        inverse: Matrix3x3,
    },
    Lut {
        lut: TagHandle,
        in_side: LutSide,
        out_side: LutSide,
        interp: LutInterp,
    },
}

/// A resolved transform with a single `lookup` entry point.
///
/// Holds shared handles to the tags it was built from, so it outlives the
/// profile and does not change the profile's directory.
#[derive(Debug, Clone)]
pub struct LuObject {
    kind: LuKind,
    function: LuFunction,
    intent: LuIntent,
    tags: Vec<TagSignature>,
    spaces: LuSpaces,
    in_pcs: bool,
    out_pcs: bool,
    /// PCS the wrapped tags compute in
    core_pcs: ColorSpace,
    absolute: bool,
    white: Xyz,
    black: Xyz,
    to_abs: Matrix3x3,
    from_abs: Matrix3x3,
}

fn curve_fwd(handle: &TagHandle, v: f64) -> Result<(f64, bool)> {
    let tag = handle.borrow();
    tag.curve_fwd(v).ok_or(IccError::TypeMismatch {
        expected: TypeSignature::CURVE.0,
        found: tag.type_signature().0,
    })
}

fn curve_bwd(handle: &TagHandle, v: f64) -> Result<(f64, bool)> {
    let tag = handle.borrow();
    tag.curve_bwd(v).ok_or(IccError::TypeMismatch {
        expected: TypeSignature::CURVE.0,
        found: tag.type_signature().0,
    })
}

/// Forward curve over one channel of interleaved data.
fn curve_fwd_strided(handle: &TagHandle, data: &mut [f64], ch: usize, stride: usize) -> Result<bool> {
    let tag = handle.borrow();
    match &*tag {
        Tag::Curve(c) if matches!(c.kind, CurveKind::Table) => {
            Ok(simd::lut1d_strided(c.data(), data, ch, stride))
        }
        Tag::Curve(c) if matches!(c.kind, CurveKind::Gamma) => {
            let g = c.data().first().copied().unwrap_or(1.0);
            Ok(simd::gamma_strided(g, data, ch, stride))
        }
        _ => {
            let mut clip = false;
            for v in data.iter_mut().skip(ch).step_by(stride) {
                let (y, c) = curve_fwd(handle, *v)?;
                clip |= c;
                *v = y;
            }
            Ok(clip)
        }
    }
}

fn clamp_unit(v: f64) -> (f64, bool) {
    let c = v.clamp(0.0, 1.0);
    (c, c != v)
}

impl LuObject {
    pub fn function(&self) -> LuFunction {
        self.function
    }

    pub fn intent(&self) -> LuIntent {
        self.intent
    }

    pub fn algorithm(&self) -> LuAlgorithm {
        match self.kind {
            LuKind::Mono { .. } => LuAlgorithm::Mono,
            LuKind::Matrix { .. } => LuAlgorithm::Matrix,
            LuKind::Lut { .. } => LuAlgorithm::Lut,
        }
    }

    /// Tags the object was built from.
    pub fn tags(&self) -> &[TagSignature] {
        &self.tags
    }

    pub fn spaces(&self) -> LuSpaces {
        self.spaces
    }

    pub fn input_channels(&self) -> usize {
        self.spaces.input.channels()
    }

    pub fn output_channels(&self) -> usize {
        match self.function {
            LuFunction::Gamut => 1,
            _ => self.spaces.output.channels(),
        }
    }

    /// Media white and black points in XYZ. Relative intents report them
    /// as seen through the relative PCS, so white is D50.
    pub fn white_black(&self) -> (Xyz, Xyz) {
        if self.absolute {
            (self.white, self.black)
        } else {
            let black = self.from_abs.multiply_vec(self.black.to_array());
            (D50.xyz, Xyz::from_array(black))
        }
    }

    /// Override the CLUT interpolation of a Lut object.
    pub fn set_interp(&mut self, interp: LutInterp) {
        if let LuKind::Lut { interp: current, .. } = &mut self.kind {
            *current = interp;
        }
    }

    /// Caller PCS to the PCS the tags compute in.
    fn pcs_in(&self, v: &mut [f64]) {
        if !self.absolute && self.spaces.pcs == self.core_pcs {
            return;
        }
        let mut xyz = pcs::to_xyz(self.spaces.pcs, [v[0], v[1], v[2]]);
        if self.absolute {
            xyz = Xyz::from_array(self.from_abs.multiply_vec(xyz.to_array()));
        }
        v[..3].copy_from_slice(&pcs::from_xyz(self.core_pcs, xyz));
    }

    /// PCS the tags compute in to caller PCS.
    fn pcs_out(&self, v: &mut [f64]) {
        if !self.absolute && self.spaces.pcs == self.core_pcs {
            return;
        }
        let mut xyz = pcs::to_xyz(self.core_pcs, [v[0], v[1], v[2]]);
        if self.absolute {
            xyz = Xyz::from_array(self.to_abs.multiply_vec(xyz.to_array()));
        }
        v[..3].copy_from_slice(&pcs::from_xyz(self.spaces.pcs, xyz));
    }

    fn check_lengths(&self, in_len: usize, out_len: usize) -> Result<(usize, usize)> {
        let (n_in, n_out) = (self.input_channels(), self.output_channels());
        if n_in > MAX_CHAN || n_out > MAX_CHAN || in_len < n_in || out_len < n_out {
            return Err(IccError::CorruptedData(format!(
                "lookup needs {} inputs and {} outputs, got {} and {}",
                n_in, n_out, in_len, out_len
            )));
        }
        Ok((n_in, n_out))
    }

    /// Evaluate one color.
    pub fn lookup(&self, input: &[f64], output: &mut [f64]) -> Result<LookupStatus> {
        let (n_in, n_out) = self.check_lengths(input.len(), output.len())?;
        let mut a = [0.0; MAX_CHAN];
        let mut b = [0.0; MAX_CHAN];
        a[..n_in].copy_from_slice(&input[..n_in]);
        if self.in_pcs {
            self.pcs_in(&mut a);
        }

        let forward = self.function == LuFunction::Forward;
        let mut clip = false;
        match &self.kind {
            LuKind::Mono { curve } if forward => {
                let (y, c) = curve_fwd(curve, a[0])?;
                clip |= c;
                b[..3].copy_from_slice(&D50.xyz.scale(y).to_array());
            }
            LuKind::Mono { curve } => {
                let (y, c0) = clamp_unit(a[1]);
                let (v, c1) = curve_bwd(curve, y)?;
                clip |= c0 | c1;
                b[0] = v;
            }
            LuKind::Matrix { curves, matrix, .. } if forward => {
                let mut lin = [0.0; 3];
                for (ch, curve) in curves.iter().enumerate() {
                    let (v, c) = curve_fwd(curve, a[ch])?;
                    clip |= c;
                    lin[ch] = v;
                }
                b[..3].copy_from_slice(&matrix.multiply_vec(lin));
            }
            LuKind::Matrix { curves, inverse, .. } => {
                let lin = inverse.multiply_vec([a[0], a[1], a[2]]);
                for (ch, curve) in curves.iter().enumerate() {
                    let (l, c0) = clamp_unit(lin[ch]);
                    let (v, c1) = curve_bwd(curve, l)?;
                    clip |= c0 | c1;
                    b[ch] = v;
                }
            }
            LuKind::Lut {
                lut,
                in_side,
                out_side,
                interp,
            } => {
                let tag = lut.borrow();
                let lut = tag.as_lut().ok_or(IccError::TypeMismatch {
                    expected: TypeSignature::LUT16.0,
                    found: tag.type_signature().0,
                })?;
                in_side.normalize(&mut a[..n_in]);
                clip |= lut.lookup(&a, &mut b, *interp, Some(self.spaces.native_input))?;
                out_side.denormalize(&mut b[..n_out]);
            }
        }

        if self.out_pcs {
            self.pcs_out(&mut b);
        }
        output[..n_out].copy_from_slice(&b[..n_out]);
        Ok(clip.into())
    }

    /// Evaluate a run of interleaved colors. Matrix/shaper objects use the
    /// batch kernels; other objects evaluate color by color.
    pub fn lookup_batch(&self, input: &[f64], output: &mut [f64]) -> Result<LookupStatus> {
        let (n_in, n_out) = (self.input_channels(), self.output_channels());
        let pixels = if n_in == 0 { 0 } else { input.len() / n_in };
        if n_in == 0 || input.len() % n_in != 0 || output.len() < pixels * n_out {
            return Err(IccError::CorruptedData(format!(
                "batch of {} values does not fit {} inputs and {} output slots",
                input.len(),
                n_in,
                output.len()
            )));
        }

        if let LuKind::Matrix {
            curves,
            matrix,
            inverse,
        } = &self.kind
        {
            let out = &mut output[..input.len()];
            out.copy_from_slice(input);
            return self.matrix_batch(curves, matrix, inverse, out).map(Into::into);
        }

        let mut clip = false;
        for (src, dst) in input
            .chunks_exact(n_in)
            .zip(output.chunks_exact_mut(n_out))
        {
            clip |= self.lookup(src, dst)?.is_clipped();
        }
        Ok(clip.into())
    }

    fn matrix_batch(
        &self,
        curves: &[TagHandle; 3],
        matrix: &Matrix3x3,
        inverse: &Matrix3x3,
        data: &mut [f64],
    ) -> Result<bool> {
        let mut clip = false;
        if self.function == LuFunction::Forward {
            for (ch, curve) in curves.iter().enumerate() {
                clip |= curve_fwd_strided(curve, data, ch, 3)?;
            }
            simd::matrix3_apply_batch(&matrix.m, data);
            for px in data.chunks_exact_mut(3) {
                self.pcs_out(px);
            }
        } else {
            for px in data.chunks_exact_mut(3) {
                self.pcs_in(px);
            }
            simd::matrix3_apply_batch(&inverse.m, data);
            for px in data.chunks_exact_mut(3) {
                for (v, curve) in px.iter_mut().zip(curves) {
                    let (l, c0) = clamp_unit(*v);
                    let (y, c1) = curve_bwd(curve, l)?;
                    clip |= c0 | c1;
                    *v = y;
                }
            }
        }
        Ok(clip)
    }

    /// Inverse of the per-channel input tables of a Lut object, in the
    /// table domain.
    pub fn inv_input(&self, input: &[f64], output: &mut [f64]) -> Result<LookupStatus> {
        match &self.kind {
            LuKind::Lut { lut, .. } => {
                let tag = lut.borrow();
                let lut = tag
                    .as_lut()
                    .ok_or(IccError::Unsupported("inverse input curves need a Lut".into()))?;
                Ok(lut.inv_lookup_input(input, output)?.into())
            }
            _ => Err(IccError::Unsupported(
                "inverse input curves need a Lut".into(),
            )),
        }
    }

    /// Inverse of the per-channel output tables of a Lut object, in the
    /// table domain.
    pub fn inv_output(&self, input: &[f64], output: &mut [f64]) -> Result<LookupStatus> {
        match &self.kind {
            LuKind::Lut { lut, .. } => {
                let tag = lut.borrow();
                let lut = tag
                    .as_lut()
                    .ok_or(IccError::Unsupported("inverse output curves need a Lut".into()))?;
                Ok(lut.inv_lookup_output(input, output)?.into())
            }
            _ => Err(IccError::Unsupported(
                "inverse output curves need a Lut".into(),
            )),
        }
    }
}
