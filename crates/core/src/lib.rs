//! # Gridshade Core
//!
//! Core types for the gridshade raster statistics and classification engine.
//!
//! This crate provides:
//! - `BandBlock` / `SampleSource`: band sample buffers and the input contract
//! - `band_statistics`: min/max, cumulative-cut and std-dev stretch bounds
//! - `MinMaxOrigin`: the stretch-bounds policy value object, with lenient
//!   XML persistence
//! - `Error` / `Result`: shared error handling

pub mod block;
pub mod error;
pub mod minmax;
pub mod stats;

pub use block::{BandBlock, MemoryRaster, SampleSource};
pub use error::{Error, Result};
pub use minmax::{Extent, Limits, MinMaxOrigin, StatAccuracy};
pub use stats::{band_statistics, BandStatistics, ESTIMATE_STRIDE};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::block::{BandBlock, MemoryRaster, SampleSource};
    pub use crate::error::{Error, Result};
    pub use crate::minmax::{Extent, Limits, MinMaxOrigin, StatAccuracy};
    pub use crate::stats::{band_statistics, BandStatistics};
}
