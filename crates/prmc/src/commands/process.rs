use camino::Utf8PathBuf;
use colored::Colorize;
use miette::Result;
use prmc_terrain::process_all;

use crate::errors::CliError;
use crate::println_pad;
use crate::utils::config::AppConfig;

#[derive(Debug)]
pub struct ProcessArgs {
    pub input: Option<Utf8PathBuf>,
    pub output: Option<Utf8PathBuf>,
    pub map: Option<String>,
}

pub fn process_maps(cfg: &AppConfig, args: ProcessArgs) -> Result<()> {
    let input = args.input.unwrap_or_else(|| cfg.raw_dir.clone());
    let output = args.output.unwrap_or_else(|| cfg.processed_dir.clone());

    println!(
        "{} {}",
        "⛰️  Processing maps from:".bright_blue().bold(),
        input.as_str().bright_cyan().bold()
    );
    println!();

    let outcome = process_all(&input, &output, args.map.as_deref()).map_err(CliError::from)?;

    for metadata in &outcome.processed {
        println_pad!(
            "{} {:<30} {}",
            "✓".bright_green(),
            metadata.map_name.bright_white(),
            format!(
                "{} m, {}x{}, height scale {}, {:.2} m/px",
                metadata.map_size,
                metadata.heightmap_resolution,
                metadata.heightmap_resolution,
                metadata.height_scale,
                metadata.meters_per_pixel
            )
            .dimmed()
        );
    }
    for error in &outcome.errors {
        println_pad!("{} {}", "✗".bright_red(), error.bright_red());
    }
    println!();
    println!(
        "{} {} ({} maps)",
        "🧾 Catalog:".bright_green(),
        output.join(prmc_terrain::CATALOG_FILE_NAME).as_str().bright_white().bold(),
        outcome.catalog.count
    );

    if outcome.has_errors() {
        let total = outcome.processed.len() + outcome.errors.len();
        return Err(CliError::completed_with_errors(outcome.errors.len(), total).into());
    }

    println!(
        "{}",
        format!("✅ Processed {} maps", outcome.processed.len())
            .bright_green()
            .bold()
    );
    Ok(())
}
