//! 3x3 matrix application over pixel batches
//!
//! Used by matrix/shaper Lu objects between the curve stages.

use multiversion::multiversion;

/// Multiply every RGB/XYZ triple of `data` by a row-major 3x3 matrix, in
/// place. A trailing partial triple is left untouched.
#[multiversion(targets("x86_64+avx2", "x86_64+sse4.1", "aarch64+neon",))]
pub fn matrix3_apply_batch(matrix: &[[f64; 3]; 3], data: &mut [f64]) {
    // Extract matrix elements for better register allocation
    let [[m00, m01, m02], [m10, m11, m12], [m20, m21, m22]] = *matrix;

    for px in data.chunks_exact_mut(3) {
        let (r, g, b) = (px[0], px[1], px[2]);
        px[0] = m00 * r + m01 * g + m02 * b;
        px[1] = m10 * r + m11 * g + m12 * b;
        px[2] = m20 * r + m21 * g + m22 * b;
    }
}
