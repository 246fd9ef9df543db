//! Reverse lookup accelerator for 1D tables
//!
//! The output range of a forward table is quantized into buckets. Every
//! adjacent pair of entries is listed in each bucket its value span
//! touches, so a backward lookup only scans the pairs that can contain
//! the answer.

/// Reverse index over one forward table.
#[derive(Debug, Clone)]
pub struct RevTable {
    min: f64,
    max: f64,
    /// Buckets per unit of output value
    qscale: f64,
    buckets: Vec<Vec<u32>>,
}

impl RevTable {
    /// Build the index for `table`. Tables with fewer than two entries get
    /// an empty index and always take the fallback path.
    pub fn build(table: &[f64]) -> Self {
        let (min, max) = table
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        if table.len() < 2 || !min.is_finite() || !max.is_finite() {
            return Self {
                min: 0.0,
                max: 0.0,
                qscale: 0.0,
                buckets: Vec::new(),
            };
        }

        let rsize = table.len().div_ceil(2).max(1);
        let span = max - min;
        let qscale = if span > 0.0 { rsize as f64 / span } else { 0.0 };
        let mut buckets: Vec<Vec<u32>> = vec![Vec::new(); rsize];

        let bucket_of = |v: f64| -> usize { (((v - min) * qscale) as usize).min(rsize - 1) };
        for (i, pair) in table.windows(2).enumerate() {
            let (lo, hi) = if pair[0] <= pair[1] {
                (pair[0], pair[1])
            } else {
                (pair[1], pair[0])
            };
            for bucket in &mut buckets[bucket_of(lo)..=bucket_of(hi)] {
                bucket.push(i as u32);
            }
        }

        Self {
            min,
            max,
            qscale,
            buckets,
        }
    }

    /// Value range of the forward table.
    pub fn range(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    /// Find an input in `[0, 1]` mapping to `v` through `table`.
    ///
    /// Returns the input and whether the result was clipped: either `v` lay
    /// outside the table's range, or no segment contained it and the
    /// nearest entry was used.
    pub fn lookup(&self, table: &[f64], v: f64) -> (f64, bool) {
        if table.len() < 2 {
            return (v.clamp(0.0, 1.0), true);
        }
        let step = 1.0 / (table.len() - 1) as f64;

        let mut clip = false;
        let v = if v < self.min {
            clip = true;
            self.min
        } else if v > self.max {
            clip = true;
            self.max
        } else {
            v
        };

        if !self.buckets.is_empty() {
            let b = (((v - self.min) * self.qscale) as usize).min(self.buckets.len() - 1);
            for &i in &self.buckets[b] {
                let i = i as usize;
                let (y0, y1) = (table[i], table[i + 1]);
                let (lo, hi) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
                if v < lo || v > hi {
                    continue;
                }
                let t = if (y1 - y0).abs() > 1e-12 {
                    (v - y0) / (y1 - y0)
                } else {
                    0.0
                };
                return ((i as f64 + t) * step, clip);
            }
        }

        // Non-monotonic or degenerate: nearest entry.
        let mut best = 0;
        let mut best_err = f64::INFINITY;
        for (i, &y) in table.iter().enumerate() {
            let err = (y - v).abs();
            if err < best_err {
                best_err = err;
                best = i;
            }
        }
        (best as f64 * step, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gamma_table(n: usize, g: f64) -> Vec<f64> {
        (0..n)
            .map(|i| (i as f64 / (n - 1) as f64).powf(g))
            .collect()
    }

    #[test]
    fn test_monotonic_inverse() {
        let table = gamma_table(256, 2.2);
        let rev = RevTable::build(&table);
        for i in 1..100 {
            let x = i as f64 / 100.0;
            let y = crate::math::lut1d_interp(&table, x);
            let (back, clip) = rev.lookup(&table, y);
            assert!(!clip);
            assert!((back - x).abs() <= 1.0 / 255.0, "x={x} back={back}");
        }
    }

    #[test]
    fn test_out_of_range_clips() {
        let table = vec![0.1, 0.5, 0.9];
        let rev = RevTable::build(&table);
        let (x, clip) = rev.lookup(&table, 0.95);
        assert!(clip);
        assert!((x - 1.0).abs() < 1e-12);
        let (x, clip) = rev.lookup(&table, 0.0);
        assert!(clip);
        assert!(x.abs() < 1e-12);
    }

    #[test]
    fn test_decreasing_table() {
        let table = vec![1.0, 0.75, 0.5, 0.25, 0.0];
        let rev = RevTable::build(&table);
        let (x, clip) = rev.lookup(&table, 0.6);
        assert!(!clip);
        assert!((x - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_flat_table() {
        let table = vec![0.5; 8];
        let rev = RevTable::build(&table);
        let (x, clip) = rev.lookup(&table, 0.5);
        assert!(!clip);
        assert_eq!(x, 0.0);
        assert_eq!(rev.range(), (0.5, 0.5));
    }
}
