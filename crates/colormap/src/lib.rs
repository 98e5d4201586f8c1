//! # Gridshade Colormap
//!
//! Color ramp shading for gridshade: maps a pixel value to an RGBA color
//! through an ordered list of color stops, in one of three modes
//! (interpolated, discrete, exact). The main entry point is
//! [`ColorRampShader::shade`].

mod color;
mod shader;

pub use color::Rgba;
pub use shader::{ColorRampItem, ColorRampShader, RampType};
