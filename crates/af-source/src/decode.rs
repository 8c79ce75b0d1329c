use std::io::Cursor;
use std::path::Path;

use af_core::error::CoreError;
use af_core::frame::{Frame, FrameBuffer, FrameSequence};
use anyhow::{Context, Result};
use image::codecs::gif::GifDecoder;
use image::codecs::png::PngDecoder;
use image::{AnimationDecoder, Delay, DynamicImage, ImageFormat, RgbImage};

/// Délai appliqué quand le conteneur n'en fournit pas.
///
/// A stored 0 is indistinguishable from a missing delay after GIF decoding
/// and gets the same value.
pub const DEFAULT_DELAY_MS: u32 = 100;

/// Décode toutes les frames d'un fichier image, animé ou non.
///
/// Le format est détecté par les octets magiques : GIF (toutes les frames,
/// composées sur le canevas complet), PNG/APNG, JPEG, BMP. Chaque frame est
/// convertie en RGB 8 bits ; son délai est divisé par `speed` puis tronqué.
///
/// # Errors
/// - [`CoreError::FileNotFound`] if `path` does not exist,
/// - [`CoreError::UnsupportedFormat`] for an unrecognised container,
/// - [`CoreError::EmptyAnimation`] if no frame could be extracted,
/// - a codec error (with context) for corrupt data.
///
/// # Example
/// ```no_run
/// use af_source::decode::decode_frames;
/// use std::path::Path;
/// let frames = decode_frames(Path::new("input.gif"), 1.0).unwrap();
/// assert_eq!(frames.delays().len(), frames.len());
/// ```
pub fn decode_frames(path: &Path, speed: f64) -> Result<FrameSequence> {
    if !path.exists() {
        return Err(CoreError::FileNotFound {
            path: path.display().to_string(),
        }
        .into());
    }

    let bytes =
        std::fs::read(path).with_context(|| format!("Impossible de lire {}", path.display()))?;

    let format = image::guess_format(&bytes).map_err(|_| CoreError::UnsupportedFormat {
        format: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("inconnu")
            .to_string(),
    })?;

    let frames = match format {
        ImageFormat::Gif => {
            let decoder = GifDecoder::new(Cursor::new(bytes.as_slice()))
                .with_context(|| format!("GIF illisible : {}", path.display()))?;
            decode_animation(decoder, speed)?
        }
        ImageFormat::Png => {
            let decoder = PngDecoder::new(Cursor::new(bytes.as_slice()))
                .with_context(|| format!("PNG illisible : {}", path.display()))?;
            if decoder.is_apng()? {
                decode_animation(decoder.apng()?, speed)?
            } else {
                let img = DynamicImage::from_decoder(decoder)
                    .with_context(|| format!("PNG illisible : {}", path.display()))?;
                vec![still_frame(img.into_rgb8(), speed)]
            }
        }
        ImageFormat::Jpeg | ImageFormat::Bmp => {
            let img = image::load_from_memory_with_format(&bytes, format)
                .with_context(|| format!("Image illisible : {}", path.display()))?;
            vec![still_frame(img.into_rgb8(), speed)]
        }
        other => {
            return Err(CoreError::UnsupportedFormat {
                format: format!("{other:?}"),
            }
            .into());
        }
    };

    if frames.is_empty() {
        return Err(CoreError::EmptyAnimation {
            path: path.display().to_string(),
        }
        .into());
    }

    log::info!("{} frames chargées depuis {}", frames.len(), path.display());
    Ok(FrameSequence::new(frames)?)
}

/// Applique le multiplicateur de vitesse à un délai brut.
///
/// `raw_ms` keeps its fractional part (APNG delays are arbitrary
/// fractions of a second); the result is truncated once.
///
/// # Example
/// ```
/// use af_source::decode::apply_speed;
/// assert_eq!(apply_speed(100.0, 1.0), 100);
/// assert_eq!(apply_speed(100.0, 3.0), 33);
/// assert_eq!(apply_speed(70.0, 0.5), 140);
/// assert_eq!(apply_speed(100.0 / 3.0, 0.25), 133);
/// ```
#[must_use]
pub fn apply_speed(raw_ms: f64, speed: f64) -> u32 {
    (raw_ms / speed) as u32
}

/// Délai d'une frame en millisecondes, fraction conservée.
///
/// GIF stores "no delay" and "delay 0" identically once decoded (a frame
/// without a graphic control extension reports 0), so both fall back to
/// [`DEFAULT_DELAY_MS`].
///
/// # Example
/// ```
/// use af_source::decode::frame_delay_ms;
/// use image::Delay;
/// assert_eq!(frame_delay_ms(Delay::from_numer_denom_ms(120, 1)), 120.0);
/// assert_eq!(frame_delay_ms(Delay::from_numer_denom_ms(0, 1)), 100.0);
/// ```
#[must_use]
pub fn frame_delay_ms(delay: Delay) -> f64 {
    let (numer, denom) = delay.numer_denom_ms();
    if numer == 0 || denom == 0 {
        f64::from(DEFAULT_DELAY_MS)
    } else {
        f64::from(numer) / f64::from(denom)
    }
}

fn decode_animation<'a>(decoder: impl AnimationDecoder<'a>, speed: f64) -> Result<Vec<Frame>> {
    let mut frames = Vec::new();
    for (idx, frame) in decoder.into_frames().enumerate() {
        let frame = frame.with_context(|| format!("Décodage de la frame {} échoué", idx + 1))?;

        let raw_ms = frame_delay_ms(frame.delay());

        let rgb = DynamicImage::ImageRgba8(frame.into_buffer()).into_rgb8();
        log::trace!("frame {} : {}×{}, {raw_ms:.2}ms", idx + 1, rgb.width(), rgb.height());

        frames.push(Frame {
            buffer: into_frame_buffer(rgb),
            delay_ms: apply_speed(raw_ms, speed),
        });
    }
    Ok(frames)
}

fn still_frame(rgb: RgbImage, speed: f64) -> Frame {
    Frame {
        buffer: into_frame_buffer(rgb),
        delay_ms: apply_speed(f64::from(DEFAULT_DELAY_MS), speed),
    }
}

fn into_frame_buffer(rgb: RgbImage) -> FrameBuffer {
    let (width, height) = rgb.dimensions();
    FrameBuffer {
        data: rgb.into_raw(),
        width,
        height,
    }
}
