use af_core::config::ConversionOptions;

/// Couleur d'un glyphe non-fond.
///
/// `preserve_color` keeps the source pixel, otherwise every glyph gets the
/// fill color.
///
/// # Example
/// ```
/// use af_ascii::color_map::glyph_color;
/// use af_core::config::ConversionOptions;
/// let mut opts = ConversionOptions::default();
/// assert_eq!(glyph_color((200, 50, 50), &opts), (255, 255, 255));
/// opts.preserve_color = true;
/// assert_eq!(glyph_color((200, 50, 50), &opts), (200, 50, 50));
/// ```
#[inline(always)]
#[must_use]
pub fn glyph_color(pixel: (u8, u8, u8), opts: &ConversionOptions) -> (u8, u8, u8) {
    if opts.preserve_color {
        pixel
    } else {
        opts.fill_color
    }
}
