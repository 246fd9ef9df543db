//! Color space types and conversions
//!
//! XYZ and Lab are the profile connection spaces. Luv and the LCh forms
//! are provided for tooling that evaluates profiles.

pub mod delta_e;
pub mod lab;
pub mod luv;
pub mod white_point;
pub mod xyz;

pub use delta_e::{delta_e, delta_e_94, delta_e_2000};
pub use lab::{Lab, Lch};
pub use luv::Luv;
pub use white_point::{D50, D65, WhitePoint};
pub use xyz::Xyz;
