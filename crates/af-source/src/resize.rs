use af_core::error::CoreError;
use af_core::frame::{Frame, FrameBuffer, FrameSequence};
use anyhow::{Context, Result};
use fast_image_resize::images::Image;
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer as FirResizer};

/// Resizer réutilisable wrappant fast_image_resize (Lanczos3, RGB 8 bits).
///
/// # Example
/// ```
/// use af_source::resize::Resizer;
/// let r = Resizer::new();
/// ```
pub struct Resizer {
    inner: FirResizer,
    options: ResizeOptions,
    /// Scratch image for source (owned buffer to avoid the mut borrow issue).
    src_buf: Vec<u8>,
}

impl Resizer {
    /// Create a new resizer with a Lanczos3 convolution filter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: FirResizer::new(),
            options: ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Lanczos3)),
            src_buf: Vec::new(),
        }
    }

    /// Resize `src` into `dst`. Dimensions of `dst` determine output size.
    ///
    /// # Errors
    /// Returns an error if the resize operation fails.
    ///
    /// # Example
    /// ```
    /// use af_source::resize::Resizer;
    /// use af_core::frame::FrameBuffer;
    /// let mut r = Resizer::new();
    /// let src = FrameBuffer::new(100, 100);
    /// let mut dst = FrameBuffer::new(50, 50);
    /// r.resize_into(&src, &mut dst).unwrap();
    /// assert_eq!(dst.width, 50);
    /// ```
    pub fn resize_into(&mut self, src: &FrameBuffer, dst: &mut FrameBuffer) -> Result<()> {
        if src.width == dst.width && src.height == dst.height {
            dst.data.copy_from_slice(&src.data);
            return Ok(());
        }

        // fast_image_resize requires &mut on the source buffer
        self.src_buf.clear();
        self.src_buf.extend_from_slice(&src.data);

        let src_image =
            Image::from_slice_u8(src.width, src.height, &mut self.src_buf, PixelType::U8x3)
                .context("Dimensions source invalides")?;

        let mut dst_image =
            Image::from_slice_u8(dst.width, dst.height, &mut dst.data, PixelType::U8x3)
                .context("Dimensions destination invalides")?;

        self.inner
            .resize(&src_image, &mut dst_image, Some(&self.options))
            .context("Redimensionnement échoué")?;

        Ok(())
    }
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Dimensions cibles : `floor(w × sx)`, `floor(h × sy)`.
///
/// # Errors
/// Returns [`CoreError::InvalidDimensions`] if either side rounds down to 0.
///
/// # Example
/// ```
/// use af_source::resize::target_size;
/// assert_eq!(target_size(100, 51, (0.5, 0.5)).unwrap(), (50, 25));
/// assert!(target_size(1, 1, (0.5, 1.0)).is_err());
/// ```
pub fn target_size(width: u32, height: u32, scale: (f64, f64)) -> Result<(u32, u32), CoreError> {
    let w = (f64::from(width) * scale.0).floor() as u32;
    let h = (f64::from(height) * scale.1).floor() as u32;
    if w == 0 || h == 0 {
        return Err(CoreError::InvalidDimensions {
            width: w,
            height: h,
        });
    }
    Ok((w, h))
}

/// Redimensionne chaque frame de la séquence, délais inchangés.
///
/// Frames are processed one at a time; each output is independent of the
/// others.
///
/// # Errors
/// Returns [`CoreError::InvalidDimensions`] if the scaled size is empty, or
/// a resize error.
///
/// # Example
/// ```
/// use af_core::frame::{Frame, FrameBuffer, FrameSequence};
/// use af_source::resize::resample_sequence;
/// let seq = FrameSequence::new(vec![Frame { buffer: FrameBuffer::new(10, 8), delay_ms: 70 }]).unwrap();
/// let out = resample_sequence(seq, (0.5, 0.25)).unwrap();
/// assert_eq!((out.frames()[0].buffer.width, out.frames()[0].buffer.height), (5, 2));
/// assert_eq!(out.delays(), vec![70]);
/// ```
pub fn resample_sequence(seq: FrameSequence, scale: (f64, f64)) -> Result<FrameSequence> {
    let mut resizer = Resizer::new();
    let mut out = Vec::with_capacity(seq.len());

    for (idx, frame) in seq.into_frames().into_iter().enumerate() {
        let (w, h) = target_size(frame.buffer.width, frame.buffer.height, scale)?;
        let mut dst = FrameBuffer::new(w, h);
        resizer
            .resize_into(&frame.buffer, &mut dst)
            .with_context(|| format!("frame {}", idx + 1))?;
        log::trace!(
            "frame {} : {}×{} → {w}×{h}",
            idx + 1,
            frame.buffer.width,
            frame.buffer.height
        );
        out.push(Frame {
            buffer: dst,
            delay_ms: frame.delay_ms,
        });
    }

    Ok(FrameSequence::new(out)?)
}
