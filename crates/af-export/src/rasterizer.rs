use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

use af_core::error::CoreError;
use af_core::frame::{Animation, GlyphGrid};
use af_core::ramp::GlyphRamp;
use af_core::traits::Renderer;
use anyhow::{Context, Result};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, DynamicImage, ImageFormat, Rgba, RgbaImage};

use crate::font::{FontFace, GlyphMask};
use crate::output::write_atomic;

/// Qualité de quantification NeuQuant (1 = la plus fidèle).
const GIF_QUANT_SPEED: i32 = 1;

/// Dessine chaque grille de glyphes dans une nouvelle image, puis encode
/// la séquence (image fixe ou GIF animé en boucle infinie).
///
/// Les masques des glyphes de la rampe sont pré-calculés une fois.
pub struct GlyphRasterizer {
    face: FontFace,
    char_width: u32,
    char_height: u32,
    background: [u8; 4],
    /// Maps a char to its coverage mask (`None` = nothing to draw).
    glyph_cache: HashMap<char, Option<GlyphMask>>,
}

impl GlyphRasterizer {
    /// Mesure la cellule sur le glyphe de référence et met en cache les
    /// glyphes de `ramp`.
    ///
    /// # Example
    /// ```
    /// use af_core::ramp::GlyphRamp;
    /// use af_export::font::FontFace;
    /// use af_export::rasterizer::GlyphRasterizer;
    ///
    /// let r = GlyphRasterizer::new(FontFace::Builtin, &GlyphRamp::default(), [0, 0, 0, 255]);
    /// assert_eq!(r.target_dimensions(10, 2), (70, 14));
    /// ```
    #[must_use]
    pub fn new(face: FontFace, ramp: &GlyphRamp, background: [u8; 4]) -> Self {
        let (char_width, char_height) = face.cell_size();
        let glyph_cache = ramp
            .chars()
            .iter()
            .map(|&ch| (ch, face.rasterize(ch)))
            .collect();
        log::debug!(
            "Cellule {char_width}×{char_height}px, police {}",
            if face.is_builtin() { "intégrée" } else { "externe" }
        );

        Self {
            face,
            char_width,
            char_height,
            background,
            glyph_cache,
        }
    }

    /// Cell size in pixels.
    #[must_use]
    pub fn cell_size(&self) -> (u32, u32) {
        (self.char_width, self.char_height)
    }

    /// Calcule les dimensions de l'image produite pour une taille de grille.
    #[must_use]
    pub fn target_dimensions(&self, grid_w: u32, grid_h: u32) -> (u32, u32) {
        (grid_w * self.char_width, grid_h * self.char_height)
    }

    /// Rendu d'une grille sur une image neuve remplie du fond.
    ///
    /// Glyphs are alpha-blended at their cell origin in their own color and
    /// may spill over neighbouring cells; only the image edge clips them.
    #[must_use]
    pub fn render_grid(&self, grid: &GlyphGrid) -> RgbaImage {
        let (w, h) = self.target_dimensions(grid.width, grid.height);
        let mut img = RgbaImage::from_pixel(w, h, Rgba(self.background));

        for x in 0..grid.width {
            for y in 0..grid.height {
                let cell = grid.get(x, y);
                let origin = (
                    (x * self.char_width) as i64,
                    (y * self.char_height) as i64,
                );
                match self.glyph_cache.get(&cell.ch) {
                    Some(Some(mask)) => blend_mask(&mut img, mask, origin, cell.color),
                    Some(None) => {}
                    None => {
                        if let Some(mask) = self.face.rasterize(cell.ch) {
                            blend_mask(&mut img, &mask, origin, cell.color);
                        }
                    }
                }
            }
        }
        img
    }

    /// Encode les images rendues : fixe si une seule, GIF animé sinon.
    ///
    /// # Errors
    /// Returns an error if the static format cannot be inferred from `out`
    /// or if the encoder fails.
    pub fn encode(&self, frames: Vec<RgbaImage>, delays: &[u32], out: &Path) -> Result<Vec<u8>> {
        if frames.len() != delays.len() {
            return Err(CoreError::LengthMismatch {
                frames: frames.len(),
                delays: delays.len(),
            }
            .into());
        }
        let mut bytes = Vec::new();

        if let [single] = frames.as_slice() {
            let format = ImageFormat::from_path(out)
                .with_context(|| format!("Format de sortie inconnu : {}", out.display()))?;
            let img = if self.background[3] == 255 {
                DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(single.clone()).to_rgb8())
            } else {
                DynamicImage::ImageRgba8(single.clone())
            };
            img.write_to(&mut Cursor::new(&mut bytes), format)
                .with_context(|| format!("Encodage {format:?} échoué"))?;
            return Ok(bytes);
        }

        if ImageFormat::from_path(out).ok() != Some(ImageFormat::Gif) {
            log::warn!(
                "{} frames : sortie GIF animée écrite dans {}",
                frames.len(),
                out.display()
            );
        }

        {
            let mut encoder = GifEncoder::new_with_speed(&mut bytes, GIF_QUANT_SPEED);
            encoder
                .set_repeat(Repeat::Infinite)
                .context("Encodage GIF échoué")?;
            for (idx, (img, &delay)) in frames.into_iter().zip(delays).enumerate() {
                let frame =
                    image::Frame::from_parts(img, 0, 0, Delay::from_numer_denom_ms(delay, 1));
                encoder
                    .encode_frame(frame)
                    .with_context(|| format!("Encodage GIF de la frame {} échoué", idx + 1))?;
            }
        }
        Ok(bytes)
    }
}

impl Renderer for GlyphRasterizer {
    fn render(&self, animation: &Animation, out: &Path) -> Result<()> {
        let first = &animation.grids()[0];
        if let Some(bad) = animation
            .grids()
            .iter()
            .find(|g| (g.width, g.height) != (first.width, first.height))
        {
            return Err(CoreError::InvalidDimensions {
                width: bad.width,
                height: bad.height,
            }
            .into());
        }

        let frames: Vec<RgbaImage> = animation
            .grids()
            .iter()
            .map(|grid| self.render_grid(grid))
            .collect();

        let bytes = self.encode(frames, animation.delays(), out)?;
        write_atomic(out, &bytes)?;
        log::info!("{} images écrites dans {}", animation.len(), out.display());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "raster"
    }
}

/// Source-over composite of `fg` at coverage `a` onto the image.
///
/// On an opaque pixel this is `fg × a + dst × (1 − a)`; on a clear pixel
/// the glyph keeps its own color and takes `a` as alpha.
fn blend_mask(img: &mut RgbaImage, mask: &GlyphMask, origin: (i64, i64), fg: (u8, u8, u8)) {
    let (img_w, img_h) = (i64::from(img.width()), i64::from(img.height()));
    let fg = [fg.0, fg.1, fg.2];

    for my in 0..mask.height {
        let py = origin.1 + i64::from(mask.top) + i64::from(my);
        if py < 0 || py >= img_h {
            continue;
        }
        for mx in 0..mask.width {
            let a = u32::from(mask.coverage[(my * mask.width + mx) as usize]);
            if a == 0 {
                continue;
            }
            let px = origin.0 + i64::from(mask.left) + i64::from(mx);
            if px < 0 || px >= img_w {
                continue;
            }
            let dst = img.get_pixel_mut(px as u32, py as u32);
            let da = u32::from(dst.0[3]);
            // Alpha scaled by 255 to keep integer precision.
            let out_a = a * 255 + da * (255 - a);
            for (d, &f) in dst.0[..3].iter_mut().zip(fg.iter()) {
                let num = u32::from(f) * a * 255 + u32::from(*d) * da * (255 - a);
                *d = ((num + out_a / 2) / out_a) as u8;
            }
            dst.0[3] = ((out_a + 127) / 255) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use af_core::frame::GlyphCell;
    use image::AnimationDecoder;
    use image::codecs::gif::GifDecoder;

    fn grid_filled(width: u32, height: u32, ch: char, color: (u8, u8, u8)) -> GlyphGrid {
        let mut grid = GlyphGrid::new(width, height);
        for x in 0..width {
            for y in 0..height {
                grid.set(x, y, GlyphCell { ch, color });
            }
        }
        grid
    }

    fn builtin(background: [u8; 4]) -> GlyphRasterizer {
        GlyphRasterizer::new(FontFace::Builtin, &GlyphRamp::default(), background)
    }

    #[test]
    fn image_size_is_cells_times_grid() {
        let r = builtin([0, 0, 0, 255]);
        let img = r.render_grid(&grid_filled(4, 3, '@', (255, 255, 255)));
        let (cw, ch) = r.cell_size();
        assert_eq!(img.dimensions(), (4 * cw, 3 * ch));
    }

    #[test]
    fn blank_cells_leave_background() {
        let r = builtin([10, 20, 30, 255]);
        let img = r.render_grid(&grid_filled(3, 2, ' ', (255, 255, 255)));
        assert!(img.pixels().all(|p| p.0 == [10, 20, 30, 255]));
    }

    #[test]
    fn glyphs_drawn_in_cell_color() {
        let r = builtin([0, 0, 0, 255]);
        let img = r.render_grid(&grid_filled(2, 2, '#', (200, 10, 10)));
        assert!(img.pixels().any(|p| p.0 == [200, 10, 10, 255]));
        assert!(img.pixels().any(|p| p.0 == [0, 0, 0, 255]));
    }

    #[test]
    fn outline_font_draws_in_cell_color() {
        let face = FontFace::from_bytes(include_bytes!("../fixtures/blocks.ttf").to_vec(), 32)
            .unwrap();
        let r = GlyphRasterizer::new(face, &GlyphRamp::default(), [0, 0, 0, 255]);
        assert_eq!(r.cell_size(), (18, 24));

        let img = r.render_grid(&grid_filled(2, 1, '#', (10, 200, 30)));
        assert_eq!(img.dimensions(), (36, 24));
        // Inside the first and second '#', then the left bearing.
        assert_eq!(img.get_pixel(5, 10).0, [10, 200, 30, 255]);
        assert_eq!(img.get_pixel(18 + 5, 10).0, [10, 200, 30, 255]);
        assert_eq!(img.get_pixel(0, 10).0, [0, 0, 0, 255]);
    }

    #[test]
    fn transparent_background_stays_clear() {
        let r = builtin([0, 0, 0, 0]);
        let img = r.render_grid(&grid_filled(2, 1, ' ', (255, 255, 255)));
        assert!(img.pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn partial_coverage_on_clear_background_keeps_glyph_color() {
        let mut img = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 0]));
        let mask = GlyphMask {
            left: 0,
            top: 0,
            width: 2,
            height: 1,
            coverage: vec![128, 255],
        };
        blend_mask(&mut img, &mask, (0, 0), (200, 100, 50));
        assert_eq!(img.get_pixel(0, 0).0, [200, 100, 50, 128]);
        assert_eq!(img.get_pixel(1, 0).0, [200, 100, 50, 255]);
    }

    #[test]
    fn partial_coverage_on_opaque_background_mixes() {
        let mut img = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]));
        let mask = GlyphMask {
            left: 0,
            top: 0,
            width: 1,
            height: 1,
            coverage: vec![51],
        };
        blend_mask(&mut img, &mask, (0, 0), (255, 255, 255));
        assert_eq!(img.get_pixel(0, 0).0, [51, 51, 51, 255]);
    }

    #[test]
    fn single_frame_writes_static_png() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.png");
        let anim = Animation::new(vec![grid_filled(3, 2, '@', (255, 255, 255))], vec![100]).unwrap();
        let r = builtin([0, 0, 0, 255]);
        r.render(&anim, &out).unwrap();

        let img = image::open(&out).unwrap();
        assert_eq!((img.width(), img.height()), r.target_dimensions(3, 2));
    }

    #[test]
    fn multi_frame_gif_keeps_delays() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.gif");
        let anim = Animation::new(
            vec![
                grid_filled(2, 2, '@', (255, 255, 255)),
                grid_filled(2, 2, '.', (255, 0, 0)),
            ],
            vec![40, 250],
        )
        .unwrap();
        builtin([0, 0, 0, 255]).render(&anim, &out).unwrap();

        let file = std::io::BufReader::new(std::fs::File::open(&out).unwrap());
        let frames = GifDecoder::new(file)
            .unwrap()
            .into_frames()
            .collect_frames()
            .unwrap();
        assert_eq!(frames.len(), 2);
        let delays: Vec<u32> = frames
            .iter()
            .map(|f| {
                let (n, d) = f.delay().numer_denom_ms();
                n / d
            })
            .collect();
        assert_eq!(delays, vec![40, 250]);
    }

    #[test]
    fn mismatched_grids_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.gif");
        let anim = Animation::new(
            vec![
                grid_filled(2, 2, '@', (255, 255, 255)),
                grid_filled(3, 2, '@', (255, 255, 255)),
            ],
            vec![100, 100],
        )
        .unwrap();
        assert!(builtin([0, 0, 0, 255]).render(&anim, &out).is_err());
        assert!(!out.exists());
    }

    #[test]
    fn unknown_static_extension_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.unknown");
        let anim = Animation::new(vec![grid_filled(1, 1, '@', (255, 255, 255))], vec![100]).unwrap();
        assert!(builtin([0, 0, 0, 255]).render(&anim, &out).is_err());
        assert!(!out.exists());
    }
}
