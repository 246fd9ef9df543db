//! LUT evaluation engine
//!
//! Forward and backward lookups through Lut tags, CLUT interpolation,
//! single-vertex tuning and table construction.

mod build;
mod clut;
mod hilbert;
mod rev;

pub use build::{set_multi_tables, LutFiller, MultiLutFiller, TableOptions};
pub use clut::LutInterp;
pub use hilbert::PseudoHilbert;
pub use rev::RevTable;
