use camino::Utf8PathBuf;
use colored::Colorize;
use miette::Result;
use prmc_terrain::{write_catalog, MapMetadata};

use crate::errors::CliError;
use crate::println_pad;
use crate::utils::config::AppConfig;

#[derive(Debug)]
pub struct ListArgs {
    pub dir: Option<Utf8PathBuf>,
}

pub fn list_processed(cfg: &AppConfig, args: ListArgs) -> Result<()> {
    let dir = args.dir.unwrap_or_else(|| cfg.processed_dir.clone());
    let catalog = write_catalog(&dir).map_err(CliError::from)?;

    println!(
        "{} {}",
        "🗺️  Processed maps in".bright_blue().bold(),
        dir.as_str().bright_cyan().bold()
    );
    println!();

    for entry in &catalog.maps {
        match MapMetadata::load(&dir.join(&entry.path)) {
            Ok(metadata) => println_pad!(
                "{} {:<30} {}",
                "•".bright_cyan(),
                entry.name.bright_white(),
                format!(
                    "{} m, {}x{}, processed {}",
                    metadata.map_size,
                    metadata.heightmap_resolution,
                    metadata.heightmap_resolution,
                    metadata.processed_at
                )
                .dimmed()
            ),
            Err(e) => println_pad!(
                "{} {:<30} {}",
                "•".bright_cyan(),
                entry.name.bright_white(),
                format!("unreadable metadata: {}", e).bright_red()
            ),
        }
    }

    println!();
    println!(
        "{} {}",
        format!("{} maps", catalog.count).bright_green().bold(),
        format!("(catalog: {})", dir.join(prmc_terrain::CATALOG_FILE_NAME)).dimmed()
    );
    Ok(())
}
