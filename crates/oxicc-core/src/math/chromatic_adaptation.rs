//! Chromatic Adaptation Transforms
//!
//! A diagonal scaling between two white points, optionally wrapped in a
//! cone-response matrix. ICC V2 output profiles historically used the
//! identity cone matrix ("wrong Von Kries"); everything else uses Bradford.

use crate::color::{WhitePoint, Xyz};
use crate::math::Matrix3x3;

/// Chromatic adaptation method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChromaticAdaptationMethod {
    /// Bradford cone matrix (ICC default)
    #[default]
    Bradford,
    /// Von Kries cone matrix
    VonKries,
    /// Identity cone matrix: scaling directly in XYZ
    WrongVonKries,
    /// No adaptation (identity)
    None,
}

/// Bradford matrix: XYZ -> cone response
pub const BRADFORD: Matrix3x3 = Matrix3x3::new([
    [0.8951, 0.2664, -0.1614],
    [-0.7502, 1.7135, 0.0367],
    [0.0389, -0.0685, 1.0296],
]);

/// Von Kries matrix: XYZ -> cone response
pub const VON_KRIES: Matrix3x3 = Matrix3x3::new([
    [0.40024, 0.70760, -0.08081],
    [-0.22630, 1.16532, 0.04570],
    [0.0, 0.0, 0.91822],
]);

impl ChromaticAdaptationMethod {
    /// The XYZ to cone-space matrix for this method.
    pub fn cone_matrix(self) -> Matrix3x3 {
        match self {
            Self::Bradford => BRADFORD,
            Self::VonKries => VON_KRIES,
            Self::WrongVonKries | Self::None => Matrix3x3::identity(),
        }
    }

    /// Recognize a stored cone matrix.
    pub fn from_cone_matrix(m: &Matrix3x3) -> Option<Self> {
        if m.approx_eq(&BRADFORD, 1e-4) {
            Some(Self::Bradford)
        } else if m.approx_eq(&VON_KRIES, 1e-4) {
            Some(Self::VonKries)
        } else if m.is_identity(1e-4) {
            Some(Self::WrongVonKries)
        } else {
            None
        }
    }
}

/// Adaptation matrix using an explicit cone matrix.
///
/// Returns `cone^-1 x diag(dst / src) x cone`. Singular cone matrices and
/// zero cone responses degrade to identity scaling on that axis.
pub fn adaptation_matrix_with_cone(src: Xyz, dst: Xyz, cone: &Matrix3x3) -> Matrix3x3 {
    let Some(cone_inv) = cone.inverse() else {
        return Matrix3x3::identity();
    };
    let s = cone.multiply_vec(src.to_array());
    let d = cone.multiply_vec(dst.to_array());
    let ratio = |i: usize| {
        if s[i].abs() > 1e-10 {
            d[i] / s[i]
        } else {
            1.0
        }
    };
    let scale = Matrix3x3::diagonal(ratio(0), ratio(1), ratio(2));
    cone_inv.multiply(&scale.multiply(cone))
}

/// Matrix M with `XYZ_dst = M x XYZ_src`.
pub fn adaptation_matrix(
    src_white: &WhitePoint,
    dst_white: &WhitePoint,
    method: ChromaticAdaptationMethod,
) -> Matrix3x3 {
    if method == ChromaticAdaptationMethod::None {
        return Matrix3x3::identity();
    }
    adaptation_matrix_with_cone(src_white.xyz, dst_white.xyz, &method.cone_matrix())
}

/// Bradford adaptation matrix
#[inline]
pub fn bradford_matrix(src_white: &WhitePoint, dst_white: &WhitePoint) -> Matrix3x3 {
    adaptation_matrix(src_white, dst_white, ChromaticAdaptationMethod::Bradford)
}

/// Adapt an XYZ color from one white point to another
#[inline]
pub fn adapt_xyz(
    xyz: Xyz,
    src_white: &WhitePoint,
    dst_white: &WhitePoint,
    method: ChromaticAdaptationMethod,
) -> Xyz {
    let matrix = adaptation_matrix(src_white, dst_white, method);
    Xyz::from_array(matrix.multiply_vec(xyz.to_array()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::white_point::{A, D50, D65};

    #[test]
    fn test_identity_adaptation() {
        assert!(bradford_matrix(&D65, &D65).is_identity(1e-9));
    }

    #[test]
    fn test_d65_to_d50_bradford() {
        // Lindbloom's D65 -> D50 Bradford matrix
        let expected = Matrix3x3::new([
            [1.0478112, 0.0228866, -0.0501270],
            [0.0295424, 0.9904844, -0.0170491],
            [-0.0092345, 0.0150436, 0.7521316],
        ]);
        assert!(bradford_matrix(&D65, &D50).approx_eq(&expected, 2e-3));
    }

    #[test]
    fn test_white_maps_to_white() {
        for method in [
            ChromaticAdaptationMethod::Bradford,
            ChromaticAdaptationMethod::VonKries,
            ChromaticAdaptationMethod::WrongVonKries,
        ] {
            let adapted = adapt_xyz(A.xyz, &A, &D50, method);
            assert!(adapted.approx_eq(&D50.xyz, 1e-9), "{method:?}: {adapted:?}");
        }
    }

    #[test]
    fn test_wrong_von_kries_is_diagonal() {
        let m = adaptation_matrix(&D65, &D50, ChromaticAdaptationMethod::WrongVonKries);
        for i in 0..3 {
            for j in 0..3 {
                if i != j {
                    assert_eq!(m[i][j], 0.0);
                }
            }
        }
        assert!((m[2][2] - D50.xyz.z / D65.xyz.z).abs() < 1e-12);
    }

    #[test]
    fn test_roundtrip() {
        let there = bradford_matrix(&D65, &D50);
        let back = bradford_matrix(&D50, &D65);
        assert!((there * back).is_identity(1e-9));
    }

    #[test]
    fn test_recognize_cone_matrix() {
        assert_eq!(
            ChromaticAdaptationMethod::from_cone_matrix(&BRADFORD),
            Some(ChromaticAdaptationMethod::Bradford)
        );
        assert_eq!(
            ChromaticAdaptationMethod::from_cone_matrix(&Matrix3x3::identity()),
            Some(ChromaticAdaptationMethod::WrongVonKries)
        );
        assert_eq!(
            ChromaticAdaptationMethod::from_cone_matrix(&Matrix3x3::diagonal(2.0, 1.0, 1.0)),
            None
        );
    }
}
