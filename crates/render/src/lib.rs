//! # Gridshade Render
//!
//! Transparency classification, contrast enhancement and single-band
//! renderers for gridshade.
//!
//! - **transparency**: value ranges mapped to opacity, first match wins
//! - **contrast**: linear stretch of raw values into the display range
//! - **renderer**: gray and pseudo-color renderers producing premultiplied
//!   RGBA buffers
//! - **layer**: renderer ownership, atomic replacement and change
//!   notification

pub mod contrast;
pub mod layer;
pub mod renderer;
pub mod transparency;

pub use contrast::{ContrastAlgorithm, ContrastEnhancement};
pub use layer::{ObserverId, RasterLayer};
pub use renderer::{
    RasterRenderer, RgbaImage, SingleBandGrayRenderer, SingleBandPseudoColorRenderer,
};
pub use transparency::{RasterTransparency, TransparentValueRange};
