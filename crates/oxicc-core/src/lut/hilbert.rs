//! Pseudo-Hilbert grid walk
//!
//! Visits every point of an N-D grid once. The index is Gray coded and its
//! bits are dealt round-robin to the axes, with the dealing order reversed
//! on every second bit plane; each axis value is then Gray decoded.
//! Consecutive points are usually neighbors, which keeps a fill callback's
//! working set local. Points outside the grid are skipped.

use crate::icc::IccError;

/// Largest index space walked, in bits.
const MAX_BITS: u32 = 48;

fn gray_decode(mut g: u64) -> u64 {
    let mut v = g;
    while g > 0 {
        g >>= 1;
        v ^= g;
    }
    v
}

/// Iterator over the coordinates of a grid with `res[e]` points per axis.
#[derive(Debug, Clone)]
pub struct PseudoHilbert {
    res: Vec<usize>,
    bits: u32,
    index: u64,
    end: u64,
}

impl PseudoHilbert {
    pub fn new(res: &[usize]) -> Result<Self, IccError> {
        let max = res.iter().copied().max().unwrap_or(0);
        let bits = usize::BITS - max.saturating_sub(1).leading_zeros();
        let total_bits = bits.saturating_mul(res.len() as u32);
        if total_bits > MAX_BITS || res.len() > 64 {
            return Err(IccError::TooLarge("pseudo-Hilbert index space"));
        }
        let end = if res.contains(&0) { 0 } else { 1u64 << total_bits };
        Ok(Self {
            res: res.to_vec(),
            bits,
            index: 0,
            end,
        })
    }

    /// Total number of grid points.
    pub fn len(&self) -> usize {
        self.res.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn coords(&self, index: u64, co: &mut [usize]) -> bool {
        let di = self.res.len();
        let mut gray = index ^ (index >> 1);
        let mut raw = [0u64; 64];
        for b in 0..self.bits {
            for k in 0..di {
                let e = if b & 1 == 1 { di - 1 - k } else { k };
                raw[e] |= (gray & 1) << b;
                gray >>= 1;
            }
        }
        for (e, c) in co.iter_mut().enumerate() {
            let v = gray_decode(raw[e]) as usize;
            if v >= self.res[e] {
                return false;
            }
            *c = v;
        }
        true
    }
}

impl Iterator for PseudoHilbert {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let mut co = vec![0; self.res.len()];
        while self.index < self.end {
            let index = self.index;
            self.index += 1;
            if self.coords(index, &mut co) {
                return Some(co);
            }
        }
        None
    }
}
