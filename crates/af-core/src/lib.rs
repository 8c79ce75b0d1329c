//! Configuration, types, and shared structures for gifscii.
//!
//! This crate contains the data model shared by every pipeline stage:
//! frames, the glyph ramp, glyph grids, conversion options and errors.

pub mod config;
pub mod error;
pub mod frame;
pub mod ramp;
pub mod traits;

pub use config::{ConversionOptions, OutputMode};
pub use error::CoreError;
pub use frame::{Animation, Frame, FrameBuffer, FrameSequence, GlyphCell, GlyphGrid};
pub use ramp::GlyphRamp;

