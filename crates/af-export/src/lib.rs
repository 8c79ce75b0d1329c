//! Output renderers for gifscii: annotated text and re-rasterized images.

pub mod font;
pub mod output;
pub mod rasterizer;
pub mod text;

pub use rasterizer::GlyphRasterizer;
pub use text::TextRenderer;
