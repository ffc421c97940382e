use camino::Utf8PathBuf;
use colored::Colorize;
use miette::Result;
use prmc_collect::{
    persist_run, require_installation, utc_timestamp, CollectionManifest, Collector,
    MANIFEST_FILE_NAME,
};

use crate::errors::CliError;
use crate::println_pad;
use crate::utils::config::AppConfig;

#[derive(Debug)]
pub struct CollectArgs {
    pub path: Option<Utf8PathBuf>,
    pub output: Option<Utf8PathBuf>,
    pub report: Option<Utf8PathBuf>,
}

pub fn collect_maps(cfg: &AppConfig, args: CollectArgs) -> Result<()> {
    let custom = args.path.or_else(|| cfg.installation_path.clone());
    let installation = require_installation(custom.as_deref()).map_err(CliError::from)?;
    let output = args.output.unwrap_or_else(|| cfg.raw_dir.clone());
    let report_path = args.report.unwrap_or_else(|| cfg.report_path());
    let manifest_path = output.join(MANIFEST_FILE_NAME);

    println!(
        "{} {}",
        "🗺️  Collecting maps from:".bright_blue().bold(),
        installation.as_str().bright_cyan().bold()
    );
    println!(
        "{} {}",
        "📁 Output directory:".bright_yellow(),
        output.as_str().bright_white().bold()
    );
    println!();

    let previous = CollectionManifest::load_or_discard(&manifest_path);
    if let Some(previous) = &previous {
        println_pad!(
            "{} {} maps",
            "Previous manifest:".dimmed(),
            previous.total_maps
        );
    }

    let outcome = Collector::new(&output)
        .with_previous(previous.as_ref())
        .with_progress(|p| {
            println_pad!(
                "{} {}",
                format!("[{}/{}]", p.current, p.total).dimmed(),
                p.map_name.bright_white()
            );
        })
        .collect(&installation)
        .map_err(CliError::from)?;
    println!();

    let persisted = persist_run(&outcome, &output, &report_path, &utc_timestamp());

    if let Ok(true) = persisted.manifest {
        println!(
            "{} {}",
            "📝 Manifest written:".bright_green(),
            persisted.manifest_path.as_str().bright_white().bold()
        );
    }
    println!();
    println!("{}", persisted.report_text);
    println!();
    if persisted.report.is_ok() {
        println!(
            "{} {}",
            "📄 Report written:".bright_green(),
            persisted.report_path.as_str().bright_white().bold()
        );
    }

    if let Err(e) = persisted.manifest {
        return Err(CliError::write_failed("manifest", persisted.manifest_path, e).into());
    }
    if let Err(e) = persisted.report {
        return Err(CliError::write_failed("report", persisted.report_path, e).into());
    }

    if outcome.has_errors() {
        return Err(CliError::completed_with_errors(outcome.errors.len(), outcome.maps_found()).into());
    }

    println!(
        "{}",
        format!("✅ Collected {} maps", outcome.records.len())
            .bright_green()
            .bold()
    );
    Ok(())
}
