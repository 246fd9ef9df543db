//! Mathematical operations for color management
//!
//! - 3x3 matrix operations
//! - ICC parametric transfer functions
//! - Chromatic adaptation
//! - 1D interpolation

pub mod chromatic_adaptation;
pub mod gamma;
pub mod interpolation;
pub mod matrix;

pub use chromatic_adaptation::{
    adapt_xyz, adaptation_matrix, adaptation_matrix_with_cone, bradford_matrix,
    ChromaticAdaptationMethod,
};
pub use gamma::{
    parametric_curve_eval, parametric_curve_eval_inverse, ParametricCurve, ParametricCurveType,
};
pub use interpolation::{lerp, lut1d_interp};
pub use matrix::Matrix3x3;
