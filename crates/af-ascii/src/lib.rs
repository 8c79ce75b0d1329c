//! Glyph conversion engine for gifscii.
//!
//! Converts RGB frames to glyph grids using a fixed brightness ramp.

pub mod color_map;
pub mod luminance;
