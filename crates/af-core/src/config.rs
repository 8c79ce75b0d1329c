use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::ramp::{GlyphRamp, RAMP_DEFAULT};

/// Sélection du renderer de sortie.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Texte brut, une frame ou plusieurs frames annotées.
    Text,
    /// Glyphes rasterisés dans une image (animée si plusieurs frames).
    #[default]
    Raster,
}

/// Options de conversion, validées une seule fois avant tout décodage.
///
/// Sérialisable en TOML. Chaque champ a une valeur par défaut saine.
///
/// # Example
/// ```
/// use af_core::config::{ConversionOptions, OutputMode};
/// let opts = ConversionOptions::default();
/// assert_eq!(opts.scale, (1.0, 1.0));
/// assert_eq!(opts.font_size, 12);
/// assert_eq!(opts.output_mode, OutputMode::Raster);
/// assert!(opts.validate().is_ok());
/// ```
#[allow(clippy::struct_excessive_bools)]
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ConversionOptions {
    // === Échantillonnage ===
    /// Facteurs d'échelle (x, y), chacun dans ]0.0, 1.0].
    pub scale: (f64, f64),
    /// Multiplicateur de vitesse (> 0). Les délais sont divisés par ce facteur.
    pub speed: f64,

    // === Mapping ===
    /// Inverser la luminosité.
    pub inverse: bool,
    /// Conserver la couleur d'origine de chaque pixel.
    pub preserve_color: bool,
    /// Couleur des glyphes (et des pixels de fond).
    pub fill_color: (u8, u8, u8),
    /// Rampe de glyphes, du plus sombre au plus clair.
    pub ramp: String,

    // === Sortie ===
    /// Couleur de fond du rendu rasterisé.
    pub back_color: (u8, u8, u8),
    /// Fond transparent (ignore `back_color`).
    pub transparent: bool,
    /// Renderer de sortie.
    pub output_mode: OutputMode,
    /// Police TrueType/OpenType pour la rasterisation.
    pub font: PathBuf,
    /// Taille de police en points (taille em en pixels).
    pub font_size: u32,
    /// Fichier de sortie.
    pub out: PathBuf,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            scale: (1.0, 1.0),
            speed: 1.0,
            inverse: false,
            preserve_color: false,
            fill_color: (255, 255, 255),
            ramp: RAMP_DEFAULT.to_string(),
            back_color: (0, 0, 0),
            transparent: false,
            output_mode: OutputMode::Raster,
            font: PathBuf::from("font.ttf"),
            font_size: 12,
            out: PathBuf::from("out.gif"),
        }
    }
}

impl ConversionOptions {
    /// Check every value before a single frame is touched.
    ///
    /// # Errors
    /// Returns [`CoreError::Config`] for a scale outside ]0, 1], a speed
    /// that is not strictly positive, a zero font size or an empty output
    /// path, and [`CoreError::InvalidRamp`] for an unusable ramp.
    ///
    /// # Example
    /// ```
    /// use af_core::config::ConversionOptions;
    /// let mut opts = ConversionOptions::default();
    /// opts.scale = (0.0, 1.0);
    /// assert!(opts.validate().is_err());
    /// opts.scale = (0.5, 1.5);
    /// assert!(opts.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), CoreError> {
        let (sx, sy) = self.scale;
        if !(sx > 0.0 && sx <= 1.0 && sy > 0.0 && sy <= 1.0) {
            return Err(CoreError::Config(format!(
                "l'échelle doit être dans ]0.0, 1.0] (reçu {sx} {sy})"
            )));
        }
        if !(self.speed.is_finite() && self.speed > 0.0) {
            return Err(CoreError::Config(format!(
                "la vitesse doit être > 0 (reçu {})",
                self.speed
            )));
        }
        if self.font_size == 0 {
            return Err(CoreError::Config("la taille de police doit être > 0".to_string()));
        }
        if self.out.as_os_str().is_empty() {
            return Err(CoreError::Config("chemin de sortie vide".to_string()));
        }
        GlyphRamp::new(&self.ramp)?;
        Ok(())
    }

    /// Build the glyph ramp described by `self.ramp`.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidRamp`] if the ramp is empty or repeats a glyph.
    pub fn glyph_ramp(&self) -> Result<GlyphRamp, CoreError> {
        GlyphRamp::new(&self.ramp)
    }

    /// Background as RGBA; fully transparent when `transparent` is set.
    ///
    /// # Example
    /// ```
    /// use af_core::config::ConversionOptions;
    /// let mut opts = ConversionOptions::default();
    /// assert_eq!(opts.background(), [0, 0, 0, 255]);
    /// opts.transparent = true;
    /// assert_eq!(opts.background(), [0, 0, 0, 0]);
    /// ```
    #[must_use]
    pub fn background(&self) -> [u8; 4] {
        if self.transparent {
            [0, 0, 0, 0]
        } else {
            let (r, g, b) = self.back_color;
            [r, g, b, 255]
        }
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    convert: Option<ConvertSection>,
}

/// `[convert]` section, all fields optional for partial override.
#[derive(Deserialize)]
struct ConvertSection {
    scale: Option<(f64, f64)>,
    speed: Option<f64>,
    inverse: Option<bool>,
    preserve_color: Option<bool>,
    fill_color: Option<(u8, u8, u8)>,
    ramp: Option<String>,
    ramp_preset: Option<String>,
    back_color: Option<(u8, u8, u8)>,
    transparent: Option<bool>,
    output_mode: Option<OutputMode>,
    font: Option<PathBuf>,
    font_size: Option<u32>,
    out: Option<PathBuf>,
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// The result is not validated; call [`ConversionOptions::validate`] once
/// every override has been applied.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed, or names an
/// unknown ramp preset.
///
/// # Example
/// ```no_run
/// use af_core::config::load_config;
/// use std::path::Path;
/// let opts = load_config(Path::new("gifscii.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<ConversionOptions> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;

    let file: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Erreur de parsing TOML dans {}", path.display()))?;

    let mut opts = ConversionOptions::default();
    let Some(c) = file.convert else {
        log::warn!("{} : pas de section [convert]", path.display());
        return Ok(opts);
    };

    if let Some(v) = c.scale {
        opts.scale = v;
    }
    if let Some(v) = c.speed {
        opts.speed = v;
    }
    if let Some(v) = c.inverse {
        opts.inverse = v;
    }
    if let Some(v) = c.preserve_color {
        opts.preserve_color = v;
    }
    if let Some(v) = c.fill_color {
        opts.fill_color = v;
    }
    if let Some(name) = c.ramp_preset {
        let ramp = GlyphRamp::preset(&name)?;
        opts.ramp = ramp.chars().iter().collect();
    }
    if let Some(v) = c.ramp {
        opts.ramp = v;
    }
    if let Some(v) = c.back_color {
        opts.back_color = v;
    }
    if let Some(v) = c.transparent {
        opts.transparent = v;
    }
    if let Some(v) = c.output_mode {
        opts.output_mode = v;
    }
    if let Some(v) = c.font {
        opts.font = v;
    }
    if let Some(v) = c.font_size {
        opts.font_size = v;
    }
    if let Some(v) = c.out {
        opts.out = v;
    }

    Ok(opts)
}
