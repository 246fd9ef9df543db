//! Lut forward/backward evaluation and CLUT interpolation.

use crate::icc::IccError;
use crate::icc::header::ColorSpace;
use crate::icc::tags::{Lut, MAX_CHAN};
use crate::math::lut1d_interp;

use super::RevTable;

type Result<T> = std::result::Result<T, IccError>;

/// CLUT interpolation algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LutInterp {
    /// Decide per Lut with [`Lut::choose_interp`].
    #[default]
    Auto,
    /// Multi-linear over all `2^n` cell corners.
    Linear,
    /// Simplex (generalized tetrahedral) over `n + 1` corners.
    Simplex,
}

/// Clamp to `[0, 1]`, reporting whether clamping occurred.
#[inline]
fn clamp_unit(v: f64) -> (f64, bool) {
    if v < 0.0 {
        (0.0, true)
    } else if v > 1.0 {
        (1.0, true)
    } else {
        (v, false)
    }
}

impl Lut {
    fn check_io(&self, in_len: usize, n_in: usize, out_len: usize, n_out: usize) -> Result<()> {
        if in_len < n_in || out_len < n_out {
            return Err(IccError::CorruptedData(format!(
                "Lut lookup needs {} inputs and {} outputs, got {} and {}",
                n_in, n_out, in_len, out_len
            )));
        }
        if self.dinc.len() != self.input_chan
            || self.input_table.len() != self.input_chan * self.input_ent
            || self.output_table.len() != self.output_chan * self.output_ent
            || self.clut_table.len() != self.clut_vertices().saturating_mul(self.output_chan)
        {
            return Err(IccError::CorruptedData("Lut tables not allocated".into()));
        }
        Ok(())
    }

    /// Per-channel input tables. Returns true if any input was clipped.
    pub fn lookup_input(&self, input: &[f64], out: &mut [f64]) -> Result<bool> {
        self.check_io(input.len(), self.input_chan, out.len(), self.input_chan)?;
        let mut clip = false;
        for ch in 0..self.input_chan {
            let (v, c) = clamp_unit(input[ch]);
            clip |= c;
            out[ch] = lut1d_interp(self.input_curve(ch), v);
        }
        Ok(clip)
    }

    /// Inverse of the per-channel input tables.
    pub fn inv_lookup_input(&self, input: &[f64], out: &mut [f64]) -> Result<bool> {
        self.check_io(input.len(), self.input_chan, out.len(), self.input_chan)?;
        let mut clip = false;
        for ch in 0..self.input_chan {
            let curve = self.input_curve(ch);
            let (v, c) = match self.rev_input.get(ch) {
                Some(cell) => cell.get_or_init(|| RevTable::build(curve)).lookup(curve, input[ch]),
                None => RevTable::build(curve).lookup(curve, input[ch]),
            };
            clip |= c;
            out[ch] = v;
        }
        Ok(clip)
    }

    /// The 3x3 matrix, which only applies to 3-channel (XYZ) input.
    /// Other channel counts pass through unchanged.
    pub fn lookup_matrix(&self, input: &[f64], out: &mut [f64]) -> Result<bool> {
        let n = self.input_chan;
        self.check_io(input.len(), n, out.len(), n)?;
        if n == 3 {
            let v = self.matrix.multiply_vec([input[0], input[1], input[2]]);
            out[..3].copy_from_slice(&v);
        } else {
            out[..n].copy_from_slice(&input[..n]);
        }
        Ok(false)
    }

    /// Per-channel output tables.
    pub fn lookup_output(&self, input: &[f64], out: &mut [f64]) -> Result<bool> {
        self.check_io(input.len(), self.output_chan, out.len(), self.output_chan)?;
        let mut clip = false;
        for ch in 0..self.output_chan {
            let (v, c) = clamp_unit(input[ch]);
            clip |= c;
            out[ch] = lut1d_interp(self.output_curve(ch), v);
        }
        Ok(clip)
    }

    /// Inverse of the per-channel output tables.
    pub fn inv_lookup_output(&self, input: &[f64], out: &mut [f64]) -> Result<bool> {
        self.check_io(input.len(), self.output_chan, out.len(), self.output_chan)?;
        let mut clip = false;
        for ch in 0..self.output_chan {
            let curve = self.output_curve(ch);
            let (v, c) = match self.rev_output.get(ch) {
                Some(cell) => cell.get_or_init(|| RevTable::build(curve)).lookup(curve, input[ch]),
                None => RevTable::build(curve).lookup(curve, input[ch]),
            };
            clip |= c;
            out[ch] = v;
        }
        Ok(clip)
    }

    /// Locate the grid cell of `input`: the base vertex offset and the
    /// fractional position along each axis.
    fn locate(&self, input: &[f64], frac: &mut [f64; MAX_CHAN]) -> (usize, bool) {
        let top = self.clut_points - 1;
        let scale = top as f64;
        let mut base = 0;
        let mut clip = false;
        for e in 0..self.input_chan {
            let (v, c) = clamp_unit(input[e]);
            clip |= c;
            let t = v * scale;
            // Inputs of exactly 1.0 land in the last cell with frac 1.
            let x = (t.floor() as usize).min(top - 1);
            frac[e] = t - x as f64;
            base += x * self.dinc[e];
        }
        (base, clip)
    }

    /// Visit the corners an interpolation uses, with their weights.
    fn for_each_corner(
        &self,
        input: &[f64],
        simplex: bool,
        mut f: impl FnMut(usize, f64),
    ) -> bool {
        let mut frac = [0.0; MAX_CHAN];
        let (base, clip) = self.locate(input, &mut frac);
        let n = self.input_chan;
        if simplex {
            let mut order = [0usize; MAX_CHAN];
            for (i, o) in order.iter_mut().enumerate().take(n) {
                *o = i;
            }
            order[..n].sort_by(|&a, &b| frac[b].total_cmp(&frac[a]));
            let mut off = base;
            let mut prev = 1.0;
            for &d in &order[..n] {
                f(off, prev - frac[d]);
                off += self.dinc[d];
                prev = frac[d];
            }
            f(off, prev);
        } else {
            for (corner, &off) in self.dcube.iter().enumerate() {
                let mut w = 1.0;
                for (e, &fr) in frac.iter().enumerate().take(n) {
                    w *= if corner & (1 << e) != 0 { fr } else { 1.0 - fr };
                }
                if w != 0.0 {
                    f(base + off, w);
                }
            }
        }
        clip
    }

    fn lookup_clut(&self, input: &[f64], out: &mut [f64], simplex: bool) -> Result<bool> {
        let n_out = self.output_chan;
        self.check_io(input.len(), self.input_chan, out.len(), n_out)?;
        out[..n_out].fill(0.0);
        let clut = &self.clut_table;
        let clip = self.for_each_corner(input, simplex, |off, w| {
            for (o, &v) in out[..n_out].iter_mut().zip(&clut[off..off + n_out]) {
                *o += w * v;
            }
        });
        Ok(clip)
    }

    /// Multi-linear CLUT interpolation.
    pub fn lookup_clut_linear(&self, input: &[f64], out: &mut [f64]) -> Result<bool> {
        self.lookup_clut(input, out, false)
    }

    /// Simplex CLUT interpolation.
    pub fn lookup_clut_simplex(&self, input: &[f64], out: &mut [f64]) -> Result<bool> {
        self.lookup_clut(input, out, true)
    }

    /// Pick an interpolation algorithm.
    ///
    /// Device spaces vary along the diagonal and get simplex. Spaces with a
    /// luminance axis get multi-linear. Unknown spaces are measured: if no
    /// single input axis dominates the first output channel, simplex.
    pub fn choose_interp(&self, in_space: Option<ColorSpace>) -> LutInterp {
        match in_space {
            // PCS-side tables (XYZ and Lab B2A) are sampled on a perceptual or
            // linear-light grid where no diagonal dominates.
            Some(
                ColorSpace::Xyz
                | ColorSpace::Lab
                | ColorSpace::Luv
                | ColorSpace::YCbCr
                | ColorSpace::Yxy
                | ColorSpace::Hsv
                | ColorSpace::Hls,
            ) => return LutInterp::Linear,
            Some(ColorSpace::Rgb | ColorSpace::Gray | ColorSpace::Cmy | ColorSpace::Cmyk) => {
                return LutInterp::Simplex
            }
            _ => {}
        }

        let n_out = self.output_chan;
        let last = self.clut_points.saturating_sub(1);
        let origin = match self.clut_table.first() {
            Some(&v) if n_out > 0 => v,
            _ => return LutInterp::Linear,
        };
        let mut sum = 0.0;
        let mut max: f64 = 0.0;
        for &d in &self.dinc {
            let delta = self
                .clut_table
                .get(last * d)
                .map_or(0.0, |v| (v - origin).abs());
            sum += delta;
            max = max.max(delta);
        }
        if sum > 0.0 && max < 0.8 * sum {
            LutInterp::Simplex
        } else {
            LutInterp::Linear
        }
    }

    /// Full forward transform: matrix, input tables, CLUT, output tables.
    pub fn lookup(
        &self,
        input: &[f64],
        out: &mut [f64],
        interp: LutInterp,
        in_space: Option<ColorSpace>,
    ) -> Result<bool> {
        let mut a = [0.0; MAX_CHAN];
        let mut b = [0.0; MAX_CHAN];
        let mut clip = false;
        if self.has_matrix() {
            clip |= self.lookup_matrix(input, &mut a)?;
            clip |= self.lookup_input(&a, &mut b)?;
        } else {
            clip |= self.lookup_input(input, &mut b)?;
        }
        let simplex = match interp {
            LutInterp::Auto => self.choose_interp(in_space) == LutInterp::Simplex,
            LutInterp::Simplex => true,
            LutInterp::Linear => false,
        };
        clip |= self.lookup_clut(&b, &mut a, simplex)?;
        clip |= self.lookup_output(&a, out)?;
        Ok(clip)
    }

    /// Nudge the CLUT so that `input` (CLUT input space) interpolates to
    /// `target` (CLUT output space).
    ///
    /// The correction is spread over the corners the interpolation uses in
    /// proportion to their weights, normalized by the sum of squared
    /// weights. Corners are clamped to `[0, 1]`; returns true if any were.
    pub fn tune_value(&mut self, input: &[f64], target: &[f64], interp: LutInterp) -> Result<bool> {
        let n_out = self.output_chan;
        let simplex = match interp {
            LutInterp::Auto => self.choose_interp(None) == LutInterp::Simplex,
            LutInterp::Simplex => true,
            LutInterp::Linear => false,
        };
        let mut current = [0.0; MAX_CHAN];
        let mut clip = self.lookup_clut(input, &mut current, simplex)?;
        if target.len() < n_out {
            return Err(IccError::CorruptedData(format!(
                "tune target has {} values, Lut has {} outputs",
                target.len(),
                n_out
            )));
        }

        let mut corners: Vec<(usize, f64)> = Vec::new();
        self.for_each_corner(input, simplex, |off, w| corners.push((off, w)));
        let norm: f64 = corners.iter().map(|&(_, w)| w * w).sum();
        if norm <= 0.0 {
            return Ok(clip);
        }
        for (off, w) in corners {
            let k = w / norm;
            for o in 0..n_out {
                let v = &mut self.clut_table[off + o];
                let (nv, c) = clamp_unit(*v + k * (target[o] - current[o]));
                *v = nv;
                clip |= c;
            }
        }
        Ok(clip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icc::tags::{LutPrecision, TagType};

    fn identity(input_chan: usize, points: usize) -> Lut {
        let mut lut =
            Lut::with_dims(LutPrecision::Sixteen, input_chan, input_chan, points, 2, 2).unwrap();
        for ch in 0..input_chan {
            lut.input_curve_mut(ch).copy_from_slice(&[0.0, 1.0]);
            lut.output_curve_mut(ch).copy_from_slice(&[0.0, 1.0]);
        }
        let step = 1.0 / (points - 1) as f64;
        for idx in 0..lut.clut_vertices() {
            for ch in 0..input_chan {
                let stride = lut.dinc[ch] / input_chan;
                let coord = (idx / stride) % points;
                lut.clut_table[idx * input_chan + ch] = coord as f64 * step;
            }
        }
        lut
    }

    #[test]
    fn test_identity_exact_at_vertices() {
        let lut = identity(3, 5);
        let mut out = [0.0; 3];
        for &v in &[[0.0, 0.25, 1.0], [0.5, 0.75, 0.0], [1.0, 1.0, 1.0]] {
            lut.lookup_clut_linear(&v, &mut out).unwrap();
            assert_eq!(out, v);
            lut.lookup_clut_simplex(&v, &mut out).unwrap();
            assert_eq!(out, v);
        }
    }

    #[test]
    fn test_identity_between_vertices() {
        let lut = identity(4, 3);
        let v = [0.13, 0.61, 0.99, 0.37];
        let mut a = [0.0; 4];
        let mut b = [0.0; 4];
        assert!(!lut.lookup_clut_linear(&v, &mut a).unwrap());
        assert!(!lut.lookup_clut_simplex(&v, &mut b).unwrap());
        for i in 0..4 {
            assert!((a[i] - v[i]).abs() < 1e-12);
            assert!((b[i] - v[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_clip_reported() {
        let lut = identity(3, 2);
        let mut out = [0.0; 3];
        assert!(lut.lookup(&[1.2, 0.5, -0.1], &mut out, LutInterp::Linear, None).unwrap());
        assert!((out[0] - 1.0).abs() < 1e-12);
        assert!(out[2].abs() < 1e-12);
        assert!(!lut.lookup(&[0.2, 0.5, 0.1], &mut out, LutInterp::Simplex, None).unwrap());
    }

    #[test]
    fn test_simplex_differs_on_nonlinear_cell() {
        let mut lut = identity(2, 2);
        // Bump the far corner of the single cell.
        let far = lut.dcube[3];
        lut.clut_table[far] = 0.5;
        let mut lin = [0.0; 2];
        let mut sx = [0.0; 2];
        lut.lookup_clut_linear(&[0.5, 0.5], &mut lin).unwrap();
        lut.lookup_clut_simplex(&[0.5, 0.5], &mut sx).unwrap();
        assert!((lin[0] - 0.375).abs() < 1e-12);
        assert!((sx[0] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_inverse_curves() {
        let mut lut = identity(3, 2);
        let curve: Vec<f64> = (0..16).map(|i| (i as f64 / 15.0).powf(2.2)).collect();
        lut.input_ent = 16;
        lut.allocate().unwrap();
        for ch in 0..3 {
            lut.input_curve_mut(ch).copy_from_slice(&curve);
        }
        let mut fwd = [0.0; 3];
        let mut back = [0.0; 3];
        lut.lookup_input(&[0.3, 0.6, 0.9], &mut fwd).unwrap();
        assert!(!lut.inv_lookup_input(&fwd, &mut back).unwrap());
        for (b, v) in back.iter().zip([0.3, 0.6, 0.9]) {
            assert!((b - v).abs() < 1e-9);
        }
    }

    #[test]
    fn test_choose_interp() {
        let lut = identity(3, 3);
        assert_eq!(lut.choose_interp(Some(ColorSpace::Lab)), LutInterp::Linear);
        assert_eq!(lut.choose_interp(Some(ColorSpace::Xyz)), LutInterp::Linear);
        assert_eq!(lut.choose_interp(Some(ColorSpace::Cmyk)), LutInterp::Simplex);
        // Identity: first output follows only the first input axis.
        assert_eq!(lut.choose_interp(None), LutInterp::Linear);

        let mut diag = identity(3, 2);
        for idx in 0..diag.clut_vertices() {
            let sum: f64 = (0..3).map(|ch| diag.clut_table[idx * 3 + ch]).sum();
            diag.clut_table[idx * 3] = sum / 3.0;
        }
        assert_eq!(diag.choose_interp(None), LutInterp::Simplex);
    }

    #[test]
    fn test_tune_value_hits_target() {
        let mut lut = identity(3, 3);
        let input = [0.3, 0.4, 0.8];
        let target = [0.35, 0.42, 0.7];
        for interp in [LutInterp::Linear, LutInterp::Simplex] {
            let mut l = lut.clone();
            assert!(!l.tune_value(&input, &target, interp).unwrap());
            let mut out = [0.0; 3];
            l.lookup_clut(&input, &mut out, interp == LutInterp::Simplex).unwrap();
            for i in 0..3 {
                assert!((out[i] - target[i]).abs() < 1e-9, "{interp:?}");
            }
        }
        lut.clut_table[0] = 0.0;
        assert!(lut.tune_value(&[0.0; 3], &[-0.5, 0.0, 0.0], LutInterp::Linear).unwrap());
    }
}
