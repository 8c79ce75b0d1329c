//! Visual source modules for gifscii: container decoding and resampling.

pub mod decode;
pub mod resize;
