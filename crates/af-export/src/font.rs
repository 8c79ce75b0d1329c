use std::path::Path;

use ab_glyph::{Font, FontVec, PxScale, point};
use anyhow::{Context, Result};
use font8x8::{BASIC_FONTS, LATIN_FONTS, UnicodeFonts};

/// Caractère de référence mesuré pour fixer la taille des cellules.
pub const REFERENCE_GLYPH: char = '#';

/// Masque de couverture d'un glyphe, positionné par rapport à l'origine
/// de sa cellule (coin haut-gauche, ligne d'ascendante).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphMask {
    /// Horizontal offset from the cell origin, in pixels.
    pub left: i32,
    /// Vertical offset from the cell origin, in pixels.
    pub top: i32,
    /// Mask width.
    pub width: u32,
    /// Mask height.
    pub height: u32,
    /// Coverage 0..=255, row-major.
    pub coverage: Vec<u8>,
}

impl GlyphMask {
    /// Right and bottom edges of the inked area, relative to the cell origin.
    ///
    /// Returns `None` for a blank glyph.
    #[must_use]
    pub fn ink_extent(&self) -> Option<(i32, i32)> {
        let mut extent: Option<(i32, i32)> = None;
        for y in 0..self.height {
            for x in 0..self.width {
                if self.coverage[(y * self.width + x) as usize] == 0 {
                    continue;
                }
                let right = self.left + x as i32 + 1;
                let bottom = self.top + y as i32 + 1;
                extent = Some(extent.map_or((right, bottom), |(r, b)| (r.max(right), b.max(bottom))));
            }
        }
        extent
    }
}

/// Police utilisée par le rasterizer.
///
/// Two branches: the requested outline font, or the built-in 8×8 bitmap
/// face when the requested one cannot be loaded.
pub enum FontFace {
    /// TrueType/OpenType font at a fixed pixel scale.
    Outline {
        /// Parsed font.
        font: FontVec,
        /// Scale giving the requested em size in pixels.
        scale: PxScale,
    },
    /// Built-in 8×8 bitmap face; ignores the requested size.
    Builtin,
}

impl FontFace {
    /// Charge `path` à `point_size`, ou la police intégrée en cas d'échec.
    ///
    /// The fallback is not an error: it is only logged at debug level.
    ///
    /// # Example
    /// ```
    /// use af_export::font::FontFace;
    /// use std::path::Path;
    /// let face = FontFace::load(Path::new("/nonexistent/font.ttf"), 12);
    /// assert!(face.is_builtin());
    /// ```
    #[must_use]
    pub fn load(path: &Path, point_size: u32) -> Self {
        match Self::open(path, point_size) {
            Ok(face) => {
                log::debug!("Police chargée : {} ({point_size}pt)", path.display());
                face
            }
            Err(e) => {
                log::debug!("Police intégrée utilisée à la place de {} : {e:#}", path.display());
                Self::Builtin
            }
        }
    }

    /// Load an outline font from disk.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a valid font.
    pub fn open(path: &Path, point_size: u32) -> Result<Self> {
        let data = std::fs::read(path)
            .with_context(|| format!("Impossible de lire {}", path.display()))?;
        Self::from_bytes(data, point_size)
            .with_context(|| format!("Police invalide : {}", path.display()))
    }

    /// Parse an outline font from raw bytes.
    ///
    /// # Errors
    /// Returns an error if the data is not a valid TrueType/OpenType font.
    pub fn from_bytes(data: Vec<u8>, point_size: u32) -> Result<Self> {
        let font = FontVec::try_from_vec(data)?;
        // PxScale is the ascent-descent height; convert from em size.
        let em_px = point_size as f32;
        let scale_y = match font.units_per_em() {
            Some(upem) if upem > 0.0 => em_px * font.height_unscaled() / upem,
            _ => em_px,
        };
        Ok(Self::Outline {
            font,
            scale: PxScale::from(scale_y),
        })
    }

    /// `true` when the built-in bitmap face is in use.
    #[must_use]
    pub fn is_builtin(&self) -> bool {
        matches!(self, Self::Builtin)
    }

    /// Rasterise `ch`, positioned at the cell origin.
    ///
    /// Returns `None` when the face has no glyph (or no outline) for `ch`.
    #[must_use]
    pub fn rasterize(&self, ch: char) -> Option<GlyphMask> {
        match self {
            Self::Outline { font, scale } => rasterize_outline(font, *scale, ch),
            Self::Builtin => rasterize_builtin(ch),
        }
    }

    /// Taille fixe d'une cellule : boîte englobante du glyphe de référence.
    ///
    /// Measured once; every glyph is then laid out on this grid whatever
    /// its own metrics.
    #[must_use]
    pub fn cell_size(&self) -> (u32, u32) {
        if let Some((right, bottom)) = self
            .rasterize(REFERENCE_GLYPH)
            .and_then(|mask| mask.ink_extent())
        {
            return (right.max(1) as u32, bottom.max(1) as u32);
        }

        match self {
            Self::Outline { font, scale } => {
                let h_advance = font.h_advance_unscaled(font.glyph_id('M'));
                let width = (h_advance * scale.x / font.height_unscaled()).ceil() as u32;
                let v_advance =
                    font.ascent_unscaled() - font.descent_unscaled() + font.line_gap_unscaled();
                let height = (v_advance * scale.y / font.height_unscaled()).ceil() as u32;
                (width.max(1), height.max(1))
            }
            Self::Builtin => (8, 8),
        }
    }
}

fn rasterize_outline(font: &FontVec, scale: PxScale, ch: char) -> Option<GlyphMask> {
    // glyph_id 0 = .notdef; skip it rather than draw a placeholder box.
    let gid = font.glyph_id(ch);
    if gid.0 == 0 {
        return None;
    }

    let ascent_px = font.ascent_unscaled() * scale.y / font.height_unscaled();
    let glyph = gid.with_scale_and_position(scale, point(0.0, ascent_px));
    let outline = font.outline_glyph(glyph)?;

    let bounds = outline.px_bounds();
    let width = bounds.width() as u32;
    let height = bounds.height() as u32;
    let mut coverage = vec![0u8; (width * height) as usize];
    outline.draw(|x, y, v| {
        if x < width && y < height {
            coverage[(y * width + x) as usize] = (v * 255.0).round().clamp(0.0, 255.0) as u8;
        }
    });

    Some(GlyphMask {
        left: bounds.min.x as i32,
        top: bounds.min.y as i32,
        width,
        height,
        coverage,
    })
}

fn rasterize_builtin(ch: char) -> Option<GlyphMask> {
    let rows = BASIC_FONTS.get(ch).or_else(|| LATIN_FONTS.get(ch))?;
    let mut coverage = vec![0u8; 64];
    for (y, bits) in rows.iter().enumerate() {
        for x in 0..8 {
            // Bit 0 is the leftmost pixel.
            if bits & (1 << x) != 0 {
                coverage[y * 8 + x] = 255;
            }
        }
    }
    Some(GlyphMask {
        left: 0,
        top: 0,
        width: 8,
        height: 8,
        coverage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 1024 units/em, ascent 768, descent -256; glyphs are plain rectangles
    /// for ' ' (empty), '#', '.' and '@'. Nothing else is mapped.
    const BLOCKS_TTF: &[u8] = include_bytes!("../fixtures/blocks.ttf");

    fn blocks(size: u32) -> FontFace {
        FontFace::from_bytes(BLOCKS_TTF.to_vec(), size).unwrap()
    }

    #[test]
    fn outline_font_loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blocks.ttf");
        std::fs::write(&path, BLOCKS_TTF).unwrap();
        assert!(!FontFace::load(&path, 12).is_builtin());
    }

    #[test]
    fn point_size_is_em_size_in_pixels() {
        let FontFace::Outline { scale, .. } = blocks(32) else {
            panic!("outline face expected");
        };
        // height (ascent - descent) equals units/em in this font.
        assert!((scale.y - 32.0).abs() < f32::EPSILON);
    }

    #[test]
    fn outline_cell_is_hash_extent() {
        // '#' spans x 64..576, y 0..704 units; baseline sits at the ascent.
        assert_eq!(blocks(32).cell_size(), (18, 24));
        assert_eq!(blocks(16).cell_size(), (9, 12));
    }

    #[test]
    fn outline_glyph_is_placed_below_ascent() {
        let mask = blocks(32).rasterize('#').unwrap();
        assert_eq!((mask.left, mask.top), (2, 2));
        assert_eq!((mask.width, mask.height), (16, 22));
        assert!(mask.coverage.iter().all(|&c| c == 255));

        let dot = blocks(32).rasterize('.').unwrap();
        assert_eq!(dot.ink_extent(), Some((12, 24)));
    }

    #[test]
    fn unmapped_and_empty_glyphs_draw_nothing() {
        let face = blocks(32);
        // '%' resolves to .notdef.
        assert!(face.rasterize('%').is_none());
        assert!(face.rasterize(' ').is_none());
    }

    #[test]
    fn garbage_font_falls_back_to_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("font.ttf");
        std::fs::write(&path, b"not a font").unwrap();
        assert!(FontFace::open(&path, 12).is_err());
        assert!(FontFace::load(&path, 12).is_builtin());
    }

    #[test]
    fn builtin_hash_measures_seven_pixels() {
        // font8x8 '#': rows 0..=6 lit, columns 0..=6 lit.
        assert_eq!(FontFace::Builtin.cell_size(), (7, 7));
    }

    #[test]
    fn builtin_space_is_blank() {
        let mask = FontFace::Builtin.rasterize(' ').unwrap();
        assert!(mask.coverage.iter().all(|&c| c == 0));
        assert_eq!(mask.ink_extent(), None);
    }

    #[test]
    fn builtin_covers_ramp_glyphs() {
        for ch in " .:-=+*#%@".chars() {
            assert!(FontFace::Builtin.rasterize(ch).is_some(), "{ch:?}");
        }
    }

    #[test]
    fn ink_extent_uses_offsets() {
        let mask = GlyphMask {
            left: 2,
            top: 3,
            width: 3,
            height: 2,
            coverage: vec![0, 0, 0, 0, 9, 0],
        };
        assert_eq!(mask.ink_extent(), Some((4, 5)));
    }
}
