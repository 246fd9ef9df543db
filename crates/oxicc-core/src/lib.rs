//! # oxicc - ICC profile codec and transform evaluation
//!
//! Reads, edits and writes ICC.1 profiles (V2 and V4), and evaluates the
//! transforms they carry through a uniform lookup interface.
//!
//! ## Layout
//!
//! - [`icc`]: binary codec. Header, tag directory, typed tag payloads,
//!   legality checks and the profile container.
//! - [`lut`]: Lut evaluation. Input/output tables, multi-linear and simplex
//!   CLUT interpolation, inverse curves, table construction and tuning.
//! - [`lu`]: Lu objects. Resolve a function and intent to the Lut,
//!   matrix/shaper or gray tags implementing it.
//! - [`color`], [`math`]: XYZ/Lab, white points, matrices and chromatic
//!   adaptation.
//! - [`simd`]: batch kernels used by matrix/shaper evaluation.
//!
//! ## Quick Start
//!
//! ```no_run
//! use oxicc_core::lu::{LuFunction, LuIntent, LuOrder};
//! use oxicc_core::IccProfile;
//!
//! let mut profile = IccProfile::open("display.icc")?;
//! let lu = profile.get_luobj(
//!     LuFunction::Forward,
//!     LuIntent::RelativeColorimetric,
//!     None,
//!     LuOrder::Normal,
//! )?;
//!
//! let mut xyz = [0.0; 3];
//! lu.lookup(&[1.0, 1.0, 1.0], &mut xyz)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod color;
pub mod error;
pub mod icc;
pub mod lu;
pub mod lut;
pub mod math;
pub mod sat;
pub mod simd;

pub use error::{Error, Result};
pub use icc::{
    ColorSpace, IccError, IccOptions, IccProfile, ProfileClass, RenderingIntent, Tag,
    TagSignature, TypeSignature,
};
pub use lu::{LookupStatus, LuAlgorithm, LuFunction, LuIntent, LuObject, LuOrder};

/// Version of oxicc
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
