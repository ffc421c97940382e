use camino::Utf8PathBuf;
use colored::Colorize;
use miette::Result;
use prmc_terrain::compress_pending;

use crate::errors::CliError;
use crate::println_pad;
use crate::utils::config::AppConfig;
use crate::utils::megabytes;

#[derive(Debug)]
pub struct CompressArgs {
    pub dir: Option<Utf8PathBuf>,
}

pub fn compress_processed(cfg: &AppConfig, args: CompressArgs) -> Result<()> {
    let dir = args.dir.unwrap_or_else(|| cfg.processed_dir.clone());

    let stats = compress_pending(&dir).map_err(CliError::from)?;
    if stats.is_empty() {
        println!(
            "{} {}",
            "No uncompressed heightmap.json files in".bright_yellow(),
            dir.as_str().bright_white()
        );
        return Ok(());
    }

    println!(
        "{}",
        "🗜️  Compressing with gzip level 9...".bright_blue().bold()
    );
    println!();

    let mut total_original = 0;
    let mut total_compressed = 0;
    for s in &stats {
        println_pad!(
            "{:<30} {:>6.1}MB -> {:>6.1}MB  (saved {:>5.1}%)",
            s.map_name,
            megabytes(s.original_bytes),
            megabytes(s.compressed_bytes),
            s.savings_percent()
        );
        total_original += s.original_bytes;
        total_compressed += s.compressed_bytes;
    }

    let total_saved = if total_original == 0 {
        0.0
    } else {
        (1.0 - total_compressed as f64 / total_original as f64) * 100.0
    };

    println!();
    println!(
        "{} {:.1}MB -> {:.1}MB ({:.1}% savings)",
        "Total:".bright_white().bold(),
        megabytes(total_original),
        megabytes(total_compressed),
        total_saved
    );
    Ok(())
}
