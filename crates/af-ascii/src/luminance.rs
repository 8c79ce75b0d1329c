use af_core::config::ConversionOptions;
use af_core::frame::{Animation, FrameBuffer, FrameSequence, GlyphCell, GlyphGrid};
use af_core::ramp::GlyphRamp;
use af_core::CoreError;

use crate::color_map::glyph_color;

/// Map one pixel to its glyph cell.
///
/// A pixel whose three channels are all zero is background: the ramp's
/// first glyph with the fill color, even when colors are preserved.
/// Otherwise brightness is the plain mean of the three channels
/// (optionally inverted) and selects `floor(brightness / 256 × N)`.
///
/// # Example
/// ```
/// use af_ascii::luminance::map_pixel;
/// use af_core::config::ConversionOptions;
/// use af_core::ramp::GlyphRamp;
///
/// let ramp = GlyphRamp::default();
/// let mut opts = ConversionOptions::default();
/// assert_eq!(map_pixel((128, 128, 128), &opts, &ramp).ch, '+');
/// opts.inverse = true;
/// assert_eq!(map_pixel((128, 128, 128), &opts, &ramp).ch, '=');
/// ```
#[inline(always)]
#[must_use]
pub fn map_pixel(pixel: (u8, u8, u8), opts: &ConversionOptions, ramp: &GlyphRamp) -> GlyphCell {
    let (r, g, b) = pixel;
    if r == 0 && g == 0 && b == 0 {
        return GlyphCell {
            ch: ramp.blank(),
            color: opts.fill_color,
        };
    }

    let mut sum = u16::from(r) + u16::from(g) + u16::from(b);
    if opts.inverse {
        // 255 - sum/3 == (765 - sum)/3
        sum = 765 - sum;
    }

    GlyphCell {
        ch: ramp.glyph_for_sum(sum),
        color: glyph_color(pixel, opts),
    }
}

/// Process a frame into a glyph grid of identical dimensions.
///
/// Traversal is column-major (x outer, y inner); each cell depends only on
/// its own pixel, so the result is independent of the order.
///
/// # Example
/// ```
/// use af_core::frame::FrameBuffer;
/// use af_core::config::ConversionOptions;
/// use af_core::ramp::GlyphRamp;
/// use af_ascii::luminance::map_frame;
///
/// let frame = FrameBuffer::new(10, 4);
/// let grid = map_frame(&frame, &ConversionOptions::default(), &GlyphRamp::default());
/// assert_eq!((grid.width, grid.height), (10, 4));
/// ```
#[must_use]
pub fn map_frame(frame: &FrameBuffer, opts: &ConversionOptions, ramp: &GlyphRamp) -> GlyphGrid {
    let mut grid = GlyphGrid::new(frame.width, frame.height);
    for x in 0..frame.width {
        for y in 0..frame.height {
            grid.set(x, y, map_pixel(frame.pixel(x, y), opts, ramp));
        }
    }
    grid
}

/// Map every frame of a sequence; delays travel alongside unchanged.
///
/// # Errors
/// Propagates [`CoreError`] from [`Animation::new`] (cannot happen for a
/// well-formed [`FrameSequence`]).
pub fn map_sequence(
    seq: &FrameSequence,
    opts: &ConversionOptions,
    ramp: &GlyphRamp,
) -> Result<Animation, CoreError> {
    let grids: Vec<GlyphGrid> = seq
        .frames()
        .iter()
        .map(|f| map_frame(&f.buffer, opts, ramp))
        .collect();
    log::debug!("{} grilles de {} glyphes", grids.len(), ramp.len());
    Animation::new(grids, seq.delays())
}
