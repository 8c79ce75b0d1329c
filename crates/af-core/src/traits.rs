use std::path::Path;

use crate::frame::Animation;

/// Écrit une animation de glyphes dans un fichier de sortie.
///
/// Implémenté par : `TextRenderer`, `GlyphRasterizer`.
///
/// # Example
/// ```
/// use af_core::traits::Renderer;
/// use af_core::frame::Animation;
/// use std::path::Path;
///
/// struct DummyRenderer;
/// impl Renderer for DummyRenderer {
///     fn render(&self, _animation: &Animation, _out: &Path) -> anyhow::Result<()> { Ok(()) }
///     fn name(&self) -> &'static str { "dummy" }
/// }
/// ```
pub trait Renderer {
    /// Produit le fichier `out` à partir de `animation`.
    ///
    /// CONTRAT : en cas d'échec, aucun fichier partiel n'est laissé à `out`.
    ///
    /// # Errors
    /// Returns an error if the artifact cannot be produced or written.
    fn render(&self, animation: &Animation, out: &Path) -> anyhow::Result<()>;

    /// Nom lisible pour les logs.
    fn name(&self) -> &'static str;
}
