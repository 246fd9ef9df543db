//! # cms-tests
//!
//! Integration and cross-CMS parity tests for oxicc.
//!
//! Profiles built or parsed with oxicc are evaluated through Lu objects and
//! compared against the same profiles in reference implementations:
//!
//! - **lcms2**: reference for transform values (XYZ and Lab, all intents)
//! - **moxcms**: reference for parsed profile content
//!
//! Differences are measured with CIEDE2000 from `palette`.

pub mod accuracy;
pub mod fixtures;
pub mod reference;
pub mod samples;

pub use accuracy::{DeltaEStats, compare_lab, delta_e_2000, max_abs_diff};
