//! Batch kernels for Lu evaluation
//!
//! Functions here use the `multiversion` crate for runtime CPU dispatch.
//!
//! Supported instruction sets:
//! - x86-64: SSE4.1, AVX2
//! - ARM64: NEON
//!
//! Every kernel works in place over interleaved pixel data and has a
//! scalar fallback.

mod curve;
mod matrix;

pub use curve::{gamma_strided, lut1d_strided};
pub use matrix::matrix3_apply_batch;

/// Get a description of the active SIMD features
pub fn active_features() -> &'static str {
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2") {
            "AVX2"
        } else if is_x86_feature_detected!("sse4.1") {
            "SSE4.1"
        } else {
            "scalar"
        }
    }
    #[cfg(target_arch = "aarch64")]
    {
        "NEON"
    }
    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        "scalar"
    }
}
