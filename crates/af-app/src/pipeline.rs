use std::path::Path;

use af_ascii::luminance::map_sequence;
use af_core::config::{ConversionOptions, OutputMode};
use af_core::error::CoreError;
use af_core::traits::Renderer;
use af_export::font::FontFace;
use af_export::{GlyphRasterizer, TextRenderer};
use af_source::decode::decode_frames;
use af_source::resize::resample_sequence;
use anyhow::{Context, Result};

/// Vérifie que le fichier d'entrée existe, avant tout décodage.
///
/// # Errors
/// Returns [`CoreError::FileNotFound`] if `input` does not exist.
pub fn check_input(input: &Path) -> Result<()> {
    if !input.exists() {
        return Err(CoreError::FileNotFound {
            path: input.display().to_string(),
        }
        .into());
    }
    Ok(())
}

/// Exécute la conversion complète : décodage → redimensionnement →
/// mapping → rendu.
///
/// Each stage runs to completion before the next starts. `opts` must
/// already be validated.
///
/// # Errors
/// Returns the first stage failure; nothing is written to `opts.out` in
/// that case.
pub fn run(input: &Path, opts: &ConversionOptions) -> Result<()> {
    let ramp = opts.glyph_ramp()?;

    log::info!("Conversion...");
    let frames = decode_frames(input, opts.speed)
        .with_context(|| format!("Conversion de {} échouée", input.display()))?;
    let frames = resample_sequence(frames, opts.scale).context("Redimensionnement échoué")?;
    let animation = map_sequence(&frames, opts, &ramp)?;
    drop(frames);

    log::info!("Génération de la sortie...");
    let renderer: Box<dyn Renderer> = match opts.output_mode {
        OutputMode::Text => Box::new(TextRenderer::new()),
        OutputMode::Raster => Box::new(GlyphRasterizer::new(
            FontFace::load(&opts.font, opts.font_size),
            &ramp,
            opts.background(),
        )),
    };
    renderer
        .render(&animation, &opts.out)
        .with_context(|| format!("Génération de la sortie ({}) échouée", renderer.name()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::gif::{GifEncoder, Repeat};
    use image::{Delay, Rgb, RgbImage, Rgba, RgbaImage};
    use std::path::PathBuf;

    fn write_gif(path: &Path, shades: &[u8], delay_ms: u32) {
        let mut bytes = Vec::new();
        {
            let mut encoder = GifEncoder::new(&mut bytes);
            encoder.set_repeat(Repeat::Infinite).unwrap();
            for &s in shades {
                let img = RgbaImage::from_pixel(4, 2, Rgba([s, s, s, 255]));
                encoder
                    .encode_frame(image::Frame::from_parts(
                        img,
                        0,
                        0,
                        Delay::from_numer_denom_ms(delay_ms, 1),
                    ))
                    .unwrap();
            }
        }
        std::fs::write(path, bytes).unwrap();
    }

    fn text_opts(out: PathBuf) -> ConversionOptions {
        ConversionOptions {
            output_mode: OutputMode::Text,
            out,
            ..ConversionOptions::default()
        }
    }

    #[test]
    fn single_frame_text_has_only_rows() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("white.png");
        RgbImage::from_pixel(3, 2, Rgb([255, 255, 255]))
            .save(&input)
            .unwrap();
        let out = dir.path().join("out.txt");

        run(&input, &text_opts(out.clone())).unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "@@@\n@@@\n");
    }

    #[test]
    fn two_frame_text_has_two_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("anim.gif");
        write_gif(&input, &[255, 128], 60);
        let out = dir.path().join("out.txt");

        run(&input, &text_opts(out.clone())).unwrap();
        let text = std::fs::read_to_string(&out).unwrap();
        assert!(text.starts_with("Frame 1 (Delay: 60ms):\n"));
        assert!(text.contains("\n\nFrame 2 (Delay: 60ms):\n"));
        assert_eq!(text.matches("Frame ").count(), 2);
    }

    #[test]
    fn scaled_raster_output_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("anim.gif");
        write_gif(&input, &[255, 90, 200], 100);
        let out = dir.path().join("out.gif");
        let opts = ConversionOptions {
            scale: (0.5, 1.0),
            font: dir.path().join("missing.ttf"),
            out: out.clone(),
            ..ConversionOptions::default()
        };

        run(&input, &opts).unwrap();
        let img = image::open(&out).unwrap();
        // Builtin face: 7×7 cells, grid 2×2.
        assert_eq!((img.width(), img.height()), (14, 14));
    }

    #[test]
    fn missing_input_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = check_input(&dir.path().join("nope.gif")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::FileNotFound { .. })
        ));
    }

    #[test]
    fn undecodable_input_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.gif");
        std::fs::write(&input, b"GIF89a garbage").unwrap();
        let out = dir.path().join("out.txt");

        assert!(run(&input, &text_opts(out.clone())).is_err());
        assert!(!out.exists());
    }
}
