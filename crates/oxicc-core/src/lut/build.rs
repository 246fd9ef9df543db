//! Lut construction
//!
//! Tables are filled from callbacks. CLUT vertices are visited in
//! pseudo-Hilbert order. Several Luts sharing one input normalization
//! (one per rendering intent, say) can be filled from a single pass over
//! a device model.

use log::debug;

use super::PseudoHilbert;
use crate::icc::IccError;
use crate::icc::tags::{Lut, MAX_CHAN};

type Result<T> = std::result::Result<T, IccError>;

/// Callbacks that define one Lut.
pub trait LutFiller {
    /// Input table of channel `ch` at `v` in `[0, 1]`.
    fn input(&mut self, _ch: usize, v: f64) -> f64 {
        v
    }

    /// CLUT function from input-table space to output-table space.
    /// Returns true if the result was clipped.
    fn clut(&mut self, input: &[f64], out: &mut [f64]) -> bool;

    /// Output table of channel `ch` at `v` in `[0, 1]`.
    fn output(&mut self, _ch: usize, v: f64) -> f64 {
        v
    }
}

/// Callbacks that define several Luts with shared input tables.
pub trait MultiLutFiller {
    fn input(&mut self, _ch: usize, v: f64) -> f64 {
        v
    }

    /// `out` holds the outputs of Lut 0, then Lut 1, and so on.
    fn clut(&mut self, input: &[f64], out: &mut [f64]) -> bool;

    fn output(&mut self, _lut: usize, _ch: usize, v: f64) -> f64 {
        v
    }
}

/// Optional CLUT post-processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableOptions {
    /// Sample the function at every cell center too and move each vertex
    /// by the mean center residual of the cells around it.
    pub smooth_centers: bool,
    /// Replace vertices whose callback reported clipping with the mean of
    /// themselves and their axis neighbors.
    pub clip_blur: bool,
}

struct Single<'a>(&'a mut dyn LutFiller);

impl MultiLutFiller for Single<'_> {
    fn input(&mut self, ch: usize, v: f64) -> f64 {
        self.0.input(ch, v)
    }

    fn clut(&mut self, input: &[f64], out: &mut [f64]) -> bool {
        self.0.clut(input, out)
    }

    fn output(&mut self, _lut: usize, ch: usize, v: f64) -> f64 {
        self.0.output(ch, v)
    }
}

fn clamp_into(dst: &mut f64, v: f64) -> bool {
    let c = v.clamp(0.0, 1.0);
    *dst = c;
    c != v
}

/// Vertex index of grid coordinates, first axis varying least rapidly.
fn vertex_index(co: &[usize], points: usize) -> usize {
    co.iter().fold(0, |acc, &c| acc * points + c)
}

impl Lut {
    /// Fill all tables from `filler`. Returns true if any value was clamped
    /// into `[0, 1]` or any CLUT callback reported clipping.
    pub fn set_tables(&mut self, filler: &mut dyn LutFiller, opts: &TableOptions) -> Result<bool> {
        set_multi_tables(&mut [self], &mut Single(filler), opts)
    }
}

/// Fill several Luts that share input channel count, grid resolution and
/// input table size.
pub fn set_multi_tables(
    luts: &mut [&mut Lut],
    filler: &mut dyn MultiLutFiller,
    opts: &TableOptions,
) -> Result<bool> {
    let (input_chan, points, input_ent) = match luts.first() {
        Some(l) => (l.input_chan, l.clut_points, l.input_ent),
        None => return Ok(false),
    };
    for l in luts.iter() {
        if (l.input_chan, l.clut_points, l.input_ent) != (input_chan, points, input_ent) {
            return Err(IccError::Unsupported(
                "Luts filled together must share input dimensions".into(),
            ));
        }
        if l.clut_table.len() != l.clut_vertices().saturating_mul(l.output_chan)
            || l.input_table.len() != input_chan * input_ent
            || l.output_table.len() != l.output_chan * l.output_ent
        {
            return Err(IccError::CorruptedData("Lut tables not allocated".into()));
        }
    }
    let mut clip = false;

    let step = 1.0 / (input_ent - 1) as f64;
    for ch in 0..input_chan {
        for i in 0..input_ent {
            let v = filler.input(ch, i as f64 * step);
            for l in luts.iter_mut() {
                clip |= clamp_into(&mut l.input_table[ch * input_ent + i], v);
            }
        }
    }

    for (k, l) in luts.iter_mut().enumerate() {
        let ent = l.output_ent;
        let step = 1.0 / (ent - 1) as f64;
        for ch in 0..l.output_chan {
            for i in 0..ent {
                let v = filler.output(k, ch, i as f64 * step);
                clip |= clamp_into(&mut l.output_table[ch * ent + i], v);
            }
        }
    }

    let total_out: usize = luts.iter().map(|l| l.output_chan).sum();
    let vertices = luts[0].clut_vertices();
    let scale = 1.0 / (points - 1) as f64;
    let mut buf = vec![0.0; total_out];
    let mut input = [0.0; MAX_CHAN];
    let mut clipped = vec![false; if opts.clip_blur { vertices } else { 0 }];
    for co in PseudoHilbert::new(&vec![points; input_chan])? {
        for (v, &c) in input.iter_mut().zip(&co) {
            *v = c as f64 * scale;
        }
        let vclip = filler.clut(&input[..input_chan], &mut buf);
        clip |= vclip;
        let vi = vertex_index(&co, points);
        if let Some(flag) = clipped.get_mut(vi) {
            *flag = vclip;
        }
        let mut vals = buf.iter();
        for l in luts.iter_mut() {
            let base = vi * l.output_chan;
            for (dst, &v) in l.clut_table[base..base + l.output_chan].iter_mut().zip(&mut vals) {
                clip |= clamp_into(dst, v);
            }
        }
    }

    if opts.smooth_centers {
        clip |= smooth_centers(luts, filler, total_out)?;
    }
    if opts.clip_blur && clipped.iter().any(|&c| c) {
        blur_clipped(luts, &clipped);
    }

    for l in luts.iter_mut() {
        l.invalidate_reverse();
    }
    debug!(
        "filled {} Lut(s), {} inputs, {} grid points",
        luts.len(),
        input_chan,
        points
    );
    Ok(clip)
}

fn smooth_centers(
    luts: &mut [&mut Lut],
    filler: &mut dyn MultiLutFiller,
    total_out: usize,
) -> Result<bool> {
    let input_chan = luts[0].input_chan;
    let points = luts[0].clut_points;
    let vertices = luts[0].clut_vertices();
    let corners = 1usize << input_chan;
    let scale = 1.0 / (points - 1) as f64;

    let mut residual = vec![0.0; vertices * total_out];
    let mut count = vec![0u32; vertices];
    let mut buf = vec![0.0; total_out];
    let mut input = [0.0; MAX_CHAN];
    let mut corner_co = [0usize; MAX_CHAN];

    for cell in PseudoHilbert::new(&vec![points - 1; input_chan])? {
        for (v, &c) in input.iter_mut().zip(&cell) {
            *v = (c as f64 + 0.5) * scale;
        }
        filler.clut(&input[..input_chan], &mut buf);

        let mut corner_idx = Vec::with_capacity(corners);
        for corner in 0..corners {
            for (e, c) in corner_co.iter_mut().enumerate().take(input_chan) {
                *c = cell[e] + ((corner >> (input_chan - 1 - e)) & 1);
            }
            corner_idx.push(vertex_index(&corner_co[..input_chan], points));
        }

        let mut at = 0;
        for l in luts.iter() {
            let n = l.output_chan;
            for o in 0..n {
                let mean = corner_idx
                    .iter()
                    .map(|&vi| l.clut_table[vi * n + o])
                    .sum::<f64>()
                    / corners as f64;
                let r = buf[at + o] - mean;
                for &vi in &corner_idx {
                    residual[vi * total_out + at + o] += r;
                }
            }
            at += n;
        }
        for &vi in &corner_idx {
            count[vi] += 1;
        }
    }

    let mut clip = false;
    for vi in 0..vertices {
        if count[vi] == 0 {
            continue;
        }
        let mut at = 0;
        for l in luts.iter_mut() {
            let n = l.output_chan;
            for o in 0..n {
                let dst = &mut l.clut_table[vi * n + o];
                let v = *dst + residual[vi * total_out + at + o] / count[vi] as f64;
                clip |= clamp_into(dst, v);
            }
            at += n;
        }
    }
    Ok(clip)
}

fn blur_clipped(luts: &mut [&mut Lut], clipped: &[bool]) {
    let input_chan = luts[0].input_chan;
    let points = luts[0].clut_points;
    for l in luts.iter_mut() {
        let n = l.output_chan;
        let orig = l.clut_table.clone();
        for (vi, _) in clipped.iter().enumerate().filter(|&(_, &c)| c) {
            let mut sum = vec![0.0; n];
            let mut k = 0usize;
            let mut add = |idx: usize| {
                for (s, &v) in sum.iter_mut().zip(&orig[idx * n..idx * n + n]) {
                    *s += v;
                }
                k += 1;
            };
            add(vi);
            let mut stride = 1;
            for _ in 0..input_chan {
                let c = (vi / stride) % points;
                if c > 0 {
                    add(vi - stride);
                }
                if c + 1 < points {
                    add(vi + stride);
                }
                stride *= points;
            }
            for (dst, s) in l.clut_table[vi * n..vi * n + n].iter_mut().zip(&sum) {
                *dst = s / k as f64;
            }
        }
    }
}
