use std::path::Path;

use af_core::frame::{Animation, GlyphGrid};
use af_core::traits::Renderer;
use anyhow::Result;

use crate::output::write_atomic;

/// Longueur de la ligne de séparation sous chaque en-tête de frame.
const SEPARATOR_LEN: usize = 50;

/// Sérialise les grilles en texte brut ; la couleur est ignorée.
///
/// One frame: raw rows only. Several frames: each block is preceded by
/// `Frame N (Delay: Dms):` and a line of 50 dashes, and followed by a blank
/// line.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextRenderer;

impl TextRenderer {
    /// Create a text renderer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Build the full text artifact in memory.
    ///
    /// # Example
    /// ```
    /// use af_core::frame::{Animation, GlyphCell, GlyphGrid};
    /// use af_export::text::TextRenderer;
    ///
    /// let mut grid = GlyphGrid::new(2, 1);
    /// grid.set(1, 0, GlyphCell { ch: '@', color: (255, 255, 255) });
    /// let anim = Animation::new(vec![grid], vec![100]).unwrap();
    /// assert_eq!(TextRenderer::new().to_text(&anim), " @\n");
    /// ```
    #[must_use]
    pub fn to_text(&self, animation: &Animation) -> String {
        let mut out = String::new();
        if animation.len() == 1 {
            push_rows(&mut out, &animation.grids()[0]);
            return out;
        }

        for (idx, (grid, delay)) in animation.iter().enumerate() {
            out.push_str(&format!("Frame {} (Delay: {delay}ms):\n", idx + 1));
            out.push_str(&"-".repeat(SEPARATOR_LEN));
            out.push('\n');
            push_rows(&mut out, grid);
            out.push('\n');
        }
        out
    }
}

impl Renderer for TextRenderer {
    fn render(&self, animation: &Animation, out: &Path) -> Result<()> {
        let text = self.to_text(animation);
        write_atomic(out, text.as_bytes())?;
        log::info!("Animation texte enregistrée dans {}", out.display());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "text"
    }
}

/// Rows top to bottom, columns left to right, one newline per row.
fn push_rows(out: &mut String, grid: &GlyphGrid) {
    for y in 0..grid.height {
        out.extend(grid.row(y).iter().map(|cell| cell.ch));
        out.push('\n');
    }
}
