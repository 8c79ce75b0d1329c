use crate::error::CoreError;

/// Buffer de pixels RGB, row-major, 3 bytes par pixel.
///
/// Jamais muté après le redimensionnement.
///
/// # Example
/// ```
/// use af_core::frame::FrameBuffer;
/// let fb = FrameBuffer::new(10, 10);
/// assert_eq!(fb.data.len(), 300);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    /// Pixels RGB, row-major, 3 bytes par pixel.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FrameBuffer {
    /// Crée un buffer noir aux dimensions données.
    ///
    /// # Example
    /// ```
    /// use af_core::frame::FrameBuffer;
    /// let fb = FrameBuffer::new(100, 50);
    /// assert_eq!(fb.width, 100);
    /// assert_eq!(fb.height, 50);
    /// assert_eq!(fb.data.len(), 100 * 50 * 3);
    /// ```
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0u8; width as usize * height as usize * 3],
            width,
            height,
        }
    }

    /// Wrap an existing RGB buffer.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidDimensions`] if `data.len()` is not
    /// `width × height × 3`.
    ///
    /// # Example
    /// ```
    /// use af_core::frame::FrameBuffer;
    /// assert!(FrameBuffer::from_raw(2, 1, vec![0; 6]).is_ok());
    /// assert!(FrameBuffer::from_raw(2, 2, vec![0; 6]).is_err());
    /// ```
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self, CoreError> {
        if data.len() != width as usize * height as usize * 3 {
            return Err(CoreError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Accès au pixel (x, y) → (r, g, b).
    ///
    /// # Example
    /// ```
    /// use af_core::frame::FrameBuffer;
    /// let mut fb = FrameBuffer::new(2, 2);
    /// fb.set_pixel(1, 0, (10, 20, 30));
    /// assert_eq!(fb.pixel(1, 0), (10, 20, 30));
    /// assert_eq!(fb.pixel(0, 0), (0, 0, 0));
    /// ```
    #[inline(always)]
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> (u8, u8, u8) {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        (self.data[idx], self.data[idx + 1], self.data[idx + 2])
    }

    /// Écrit le pixel (x, y).
    #[inline(always)]
    pub fn set_pixel(&mut self, x: u32, y: u32, rgb: (u8, u8, u8)) {
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        self.data[idx] = rgb.0;
        self.data[idx + 1] = rgb.1;
        self.data[idx + 2] = rgb.2;
    }
}

/// One decoded frame and its display duration.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Pixel data.
    pub buffer: FrameBuffer,
    /// Display duration in milliseconds, speed already applied.
    pub delay_ms: u32,
}

/// Non-empty, ordered list of frames.
///
/// # Example
/// ```
/// use af_core::frame::{Frame, FrameBuffer, FrameSequence};
/// let seq = FrameSequence::new(vec![Frame { buffer: FrameBuffer::new(1, 1), delay_ms: 40 }]).unwrap();
/// assert_eq!(seq.len(), 1);
/// assert_eq!(seq.delays(), vec![40]);
/// assert!(FrameSequence::new(Vec::new()).is_err());
/// ```
#[derive(Clone, Debug)]
pub struct FrameSequence {
    frames: Vec<Frame>,
}

impl FrameSequence {
    /// # Errors
    /// Returns [`CoreError::EmptyAnimation`] if `frames` is empty.
    pub fn new(frames: Vec<Frame>) -> Result<Self, CoreError> {
        if frames.is_empty() {
            return Err(CoreError::EmptyAnimation {
                path: String::from("<mémoire>"),
            });
        }
        Ok(Self { frames })
    }

    /// Number of frames, always ≥ 1.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames in display order.
    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Durations in display order, same length as the frame list.
    #[must_use]
    pub fn delays(&self) -> Vec<u32> {
        self.frames.iter().map(|f| f.delay_ms).collect()
    }

    /// Consume the sequence.
    #[must_use]
    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }
}

/// Single cell in the glyph grid.
///
/// # Example
/// ```
/// use af_core::frame::GlyphCell;
/// let cell = GlyphCell::default();
/// assert_eq!(cell.ch, ' ');
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphCell {
    /// Caractère de la rampe.
    pub ch: char,
    /// Couleur du glyphe (RGB).
    pub color: (u8, u8, u8),
}

impl Default for GlyphCell {
    fn default() -> Self {
        Self {
            ch: ' ',
            color: (255, 255, 255),
        }
    }
}

/// Grille de glyphes d'une frame, adressée par (colonne, ligne).
///
/// Stockage plat row-major ; `get(x, y)` renvoie la cellule de la colonne
/// `x` et de la ligne `y`.
///
/// # Example
/// ```
/// use af_core::frame::{GlyphGrid, GlyphCell};
/// let mut grid = GlyphGrid::new(80, 24);
/// grid.set(0, 0, GlyphCell { ch: '@', color: (255, 0, 0) });
/// assert_eq!(grid.get(0, 0).ch, '@');
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphGrid {
    /// Flat array of cells, row-major.
    pub cells: Vec<GlyphCell>,
    /// Width in columns.
    pub width: u32,
    /// Height in rows.
    pub height: u32,
}

impl GlyphGrid {
    /// Crée une grille pré-allouée.
    ///
    /// # Example
    /// ```
    /// use af_core::frame::GlyphGrid;
    /// let grid = GlyphGrid::new(80, 24);
    /// assert_eq!(grid.cells.len(), 80 * 24);
    /// ```
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            cells: vec![GlyphCell::default(); width as usize * height as usize],
            width,
            height,
        }
    }

    /// Set a cell at column `x`, row `y`.
    #[inline(always)]
    pub fn set(&mut self, x: u32, y: u32, cell: GlyphCell) {
        self.cells[y as usize * self.width as usize + x as usize] = cell;
    }

    /// Get a cell reference at column `x`, row `y`.
    #[inline(always)]
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> &GlyphCell {
        &self.cells[y as usize * self.width as usize + x as usize]
    }

    /// Cells of row `y`, left to right.
    ///
    /// # Example
    /// ```
    /// use af_core::frame::{GlyphGrid, GlyphCell};
    /// let mut grid = GlyphGrid::new(3, 2);
    /// grid.set(2, 1, GlyphCell { ch: '#', color: (0, 0, 0) });
    /// let row: String = grid.row(1).iter().map(|c| c.ch).collect();
    /// assert_eq!(row, "  #");
    /// ```
    #[must_use]
    pub fn row(&self, y: u32) -> &[GlyphCell] {
        let start = y as usize * self.width as usize;
        &self.cells[start..start + self.width as usize]
    }
}

/// Séquence de grilles prête pour un renderer, avec ses délais.
///
/// Invariants: at least one grid, `grids.len() == delays.len()`.
#[derive(Clone, Debug)]
pub struct Animation {
    grids: Vec<GlyphGrid>,
    delays: Vec<u32>,
}

impl Animation {
    /// # Errors
    /// Returns [`CoreError::LengthMismatch`] if the two lists differ in
    /// length, or [`CoreError::EmptyAnimation`] if they are empty.
    ///
    /// # Example
    /// ```
    /// use af_core::frame::{Animation, GlyphGrid};
    /// assert!(Animation::new(vec![GlyphGrid::new(1, 1)], vec![100]).is_ok());
    /// assert!(Animation::new(vec![GlyphGrid::new(1, 1)], vec![]).is_err());
    /// ```
    pub fn new(grids: Vec<GlyphGrid>, delays: Vec<u32>) -> Result<Self, CoreError> {
        if grids.len() != delays.len() {
            return Err(CoreError::LengthMismatch {
                frames: grids.len(),
                delays: delays.len(),
            });
        }
        if grids.is_empty() {
            return Err(CoreError::EmptyAnimation {
                path: String::from("<mémoire>"),
            });
        }
        Ok(Self { grids, delays })
    }

    /// Grids in display order.
    #[must_use]
    pub fn grids(&self) -> &[GlyphGrid] {
        &self.grids
    }

    /// Delays in milliseconds, parallel to [`Animation::grids`].
    #[must_use]
    pub fn delays(&self) -> &[u32] {
        &self.delays
    }

    /// Number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.grids.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }

    /// `(grid, delay)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (&GlyphGrid, u32)> {
        self.grids.iter().zip(self.delays.iter().copied())
    }
}
