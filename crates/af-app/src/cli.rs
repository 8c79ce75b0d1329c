use std::path::PathBuf;

use af_core::config::{ConversionOptions, OutputMode};
use af_core::ramp::GlyphRamp;
use clap::Parser;

/// gifscii — convertit une image animée en art de caractères.
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = None,
    after_help = "Exemples :\n  gifscii input.gif\n  gifscii input.gif --scale 0.5 0.5 --out output.gif\n  gifscii input.gif --size 16 --color --inverse\n  gifscii input.gif --ascii --out frames.txt"
)]
pub struct Cli {
    /// Fichier d'entrée (GIF, APNG, PNG, JPEG, BMP).
    pub input_file: PathBuf,

    /// Échelle de sortie x y, chacune dans ]0.0, 1.0]. Défaut : 1.0 1.0.
    #[arg(long, num_args = 2, value_names = ["X", "Y"], allow_negative_numbers = true)]
    pub scale: Option<Vec<f64>>,

    /// Multiplicateur de vitesse de l'animation (> 0). Défaut : 1.0.
    #[arg(long, allow_negative_numbers = true)]
    pub speed: Option<f64>,

    /// Inverser la luminosité.
    #[arg(long, default_value_t = false)]
    pub inverse: bool,

    /// Conserver les couleurs d'origine.
    #[arg(long, default_value_t = false)]
    pub color: bool,

    /// Taille de police en points. Défaut : 12.
    #[arg(long)]
    pub size: Option<u32>,

    /// Police TrueType/OpenType. Défaut : font.ttf (police intégrée si illisible).
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Fichier de sortie. Défaut : out.gif.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Écrire du texte au lieu d'une image.
    #[arg(long, default_value_t = false)]
    pub ascii: bool,

    /// Fond transparent.
    #[arg(long, default_value_t = false)]
    pub transparent: bool,

    /// Couleur de fond R G B. Défaut : 0 0 0.
    #[arg(long, num_args = 3, value_names = ["R", "G", "B"])]
    pub backcolor: Option<Vec<u8>>,

    /// Couleur des glyphes R G B. Défaut : 255 255 255.
    #[arg(long, num_args = 3, value_names = ["R", "G", "B"])]
    pub fillcolor: Option<Vec<u8>>,

    /// Rampe de glyphes littérale, du plus sombre au plus clair.
    #[arg(long, conflicts_with = "ramp_preset", allow_hyphen_values = true)]
    pub ramp: Option<String>,

    /// Rampe intégrée : default, simple, extended.
    #[arg(long, value_parser = ["default", "simple", "extended"])]
    pub ramp_preset: Option<String>,

    /// Fichier de configuration TOML (section [convert]).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    /// Applique les options passées en ligne de commande sur `opts`.
    ///
    /// Flags only ever switch a behaviour on; absent options leave `opts`
    /// untouched.
    ///
    /// # Errors
    /// Returns an error for an unknown ramp preset.
    pub fn apply_overrides(&self, opts: &mut ConversionOptions) -> anyhow::Result<()> {
        if let Some(&[x, y]) = self.scale.as_deref() {
            opts.scale = (x, y);
        }
        if let Some(v) = self.speed {
            opts.speed = v;
        }
        if self.inverse {
            opts.inverse = true;
        }
        if self.color {
            opts.preserve_color = true;
        }
        if let Some(v) = self.size {
            opts.font_size = v;
        }
        if let Some(ref v) = self.font {
            opts.font.clone_from(v);
        }
        if let Some(ref v) = self.out {
            opts.out.clone_from(v);
        }
        if self.ascii {
            opts.output_mode = OutputMode::Text;
        }
        if self.transparent {
            opts.transparent = true;
        }
        if let Some(&[r, g, b]) = self.backcolor.as_deref() {
            opts.back_color = (r, g, b);
        }
        if let Some(&[r, g, b]) = self.fillcolor.as_deref() {
            opts.fill_color = (r, g, b);
        }
        if let Some(ref name) = self.ramp_preset {
            opts.ramp = GlyphRamp::preset(name)?.chars().iter().collect();
        }
        if let Some(ref v) = self.ramp {
            opts.ramp.clone_from(v);
        }
        Ok(())
    }
}
