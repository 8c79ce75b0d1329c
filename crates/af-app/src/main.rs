use af_core::config::ConversionOptions;
use anyhow::{Context, Result};
use clap::Parser;

pub mod cli;
pub mod pipeline;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Info))
        .init();

    // 3. Charger la config puis appliquer les overrides CLI
    let opts = resolve_options(&cli)?;

    // 4. Valider l'entrée avant tout traitement
    pipeline::check_input(&cli.input_file)?;

    // 5. Conversion
    pipeline::run(&cli.input_file, &opts)?;

    log::info!("Terminé : {}", opts.out.display());
    Ok(())
}

/// defaults < `--config` < CLI flags, validated once after merging.
fn resolve_options(cli: &cli::Cli) -> Result<ConversionOptions> {
    let mut opts = match cli.config {
        Some(ref path) => af_core::config::load_config(path)?,
        None => ConversionOptions::default(),
    };
    cli.apply_overrides(&mut opts)?;
    opts.validate().context("Options de conversion invalides")?;
    Ok(opts)
}
