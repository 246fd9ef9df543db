//! ICC profile codec
//!
//! Reading and writing of ICC.1 (V2 and V4) profiles.
//!
//! # Structure
//!
//! An ICC profile consists of:
//! 1. A 128-byte header
//! 2. A tag table listing all tags
//! 3. Tag data (entries may share data)
//!
//! The header and table are decoded up front. Tag payloads are decoded on
//! first access through [`IccProfile::read_tag`].
//!
//! # Example
//!
//! ```no_run
//! use oxicc_core::icc::{IccProfile, TagSignature};
//!
//! let bytes = std::fs::read("display.icc")?;
//! let mut profile = IccProfile::from_bytes(&bytes)?;
//! let trc = profile.read_tag(TagSignature::RED_TRC)?;
//! let (y, _clipped) = trc.borrow().curve_fwd(0.5).unwrap_or((0.5, false));
//! # let _ = y;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod header;
pub mod io;
pub mod legality;
pub mod primitives;
pub mod tags;

mod error;
mod options;
mod profile;
mod types;

pub use error::{ErrorKind, IccError};
pub use header::{
    ColorSpace, HEADER_SIZE, IccHeader, ProfileClass, ProfileVersion, RenderingIntent,
    VersionClass,
};
pub use io::{IccFile, Md5File, MemFile, StdFile};
pub use options::IccOptions;
pub use primitives::PcsEncoding;
pub use profile::{IccProfile, TagHandle, TagPresence};
pub use tags::{Tag, TagContext, TagType};
pub use types::{DateTimeNumber, TagSignature, TypeSignature, XyzNumber};
