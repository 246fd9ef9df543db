//! Deterministic input generation

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// `count` device colors with `channels` components in `[0, 1]`.
pub fn random_device(seed: u64, count: usize, channels: usize) -> Vec<Vec<f64>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| (0..channels).map(|_| rng.r#gen::<f64>()).collect())
        .collect()
}

/// `count` RGB triples in `[0, 1]`.
pub fn random_rgb(seed: u64, count: usize) -> Vec<[f64; 3]> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| [rng.r#gen(), rng.r#gen(), rng.r#gen()])
        .collect()
}

/// `count` Lab values inside the usual gamut box.
pub fn random_lab(seed: u64, count: usize) -> Vec<[f64; 3]> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            [
                rng.gen_range(5.0..95.0),
                rng.gen_range(-60.0..60.0),
                rng.gen_range(-60.0..60.0),
            ]
        })
        .collect()
}

/// Neutral ramp from black to white.
pub fn gray_ramp(steps: usize) -> Vec<[f64; 3]> {
    let top = steps.saturating_sub(1).max(1) as f64;
    (0..steps)
        .map(|i| {
            let v = i as f64 / top;
            [v, v, v]
        })
        .collect()
}

/// The 8 corners of the RGB cube.
pub fn cube_corners() -> Vec<[f64; 3]> {
    (0..8)
        .map(|i| {
            [
                (i & 1) as f64,
                ((i >> 1) & 1) as f64,
                ((i >> 2) & 1) as f64,
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_inputs_repeat() {
        assert_eq!(random_rgb(7, 16), random_rgb(7, 16));
        assert_ne!(random_rgb(7, 16), random_rgb(8, 16));
        assert!(random_device(1, 10, 4).iter().flatten().all(|v| (0.0..1.0).contains(v)));
    }

    #[test]
    fn test_ramp_ends() {
        let ramp = gray_ramp(5);
        assert_eq!(ramp[0], [0.0; 3]);
        assert_eq!(ramp[4], [1.0; 3]);
        assert_eq!(cube_corners().len(), 8);
    }
}
