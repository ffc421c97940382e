use crate::errors::CliError;
use crate::utils::config::{AppConfig, ConfigSource};
use crate::utils::status_mark;
use camino::{Utf8Path, Utf8PathBuf};
use colored::Colorize;
use miette::Result;
use prmc_collect::{find_installation, is_valid_installation};

/// Print a config path entry with status indicator
fn print_path_config(name: &str, path: Option<&Utf8Path>, validator: impl Fn(&Utf8Path) -> bool) {
    match path {
        Some(p) => {
            println!(
                "  {} {} {}",
                format!("{}:", name).bright_white(),
                p,
                status_mark(validator(p))
            );
        }
        None => {
            println!(
                "  {} {}",
                format!("{}:", name).bright_white(),
                "(not set)".bright_yellow()
            );
        }
    }
}

fn save(source: &ConfigSource, cfg: &AppConfig) -> Result<()> {
    source.save(cfg).map_err(|e| {
        CliError::ConfigSaveFailed {
            path: source.path().to_path_buf(),
            source: e,
        }
        .into()
    })
}

pub fn show_config(source: &ConfigSource) -> Result<()> {
    let cfg = source.load();

    println!();
    println!(
        "  {} {} {}",
        "config_file:".bright_white(),
        source.path(),
        if source.exists() {
            "".normal()
        } else {
            "(defaults)".dimmed()
        }
    );

    print_path_config(
        "installation_path",
        cfg.installation_path.as_deref(),
        is_valid_installation,
    );
    if cfg.installation_path.is_none() {
        if let Some(detected) = find_installation(None) {
            println!(
                "  {} {}",
                "detected_installation:".bright_white(),
                detected.as_str().bright_green()
            );
        }
    }
    print_path_config("raw_dir", Some(cfg.raw_dir.as_path()), |p| p.is_dir());
    print_path_config("processed_dir", Some(cfg.processed_dir.as_path()), |p| p.is_dir());
    print_path_config("report_path", Some(cfg.report_path().as_path()), |p| p.is_file());

    println!();
    Ok(())
}

pub fn set_installation(source: &ConfigSource, path: Utf8PathBuf) -> Result<()> {
    if !is_valid_installation(&path) {
        eprintln!(
            "  {}",
            "The path must be the PR:BF2 installation root.".bright_yellow()
        );
        eprintln!(
            "  {}",
            "Example: C:\\Program Files (x86)\\Project Reality\\Project Reality BF2".bright_yellow()
        );
        eprintln!();
        eprintln!("  {} The directory does not exist", "•".bright_red());
        eprintln!("  {} The directory has no levels/ subdirectory", "•".bright_red());

        return Err(CliError::InvalidInstallation { path }.into());
    }

    let mut cfg = source.load();
    cfg.installation_path = Some(path.clone());
    save(source, &cfg)?;

    println!(
        "{}",
        "✓ Installation path set successfully!".bright_green().bold()
    );
    println!();
    println!(
        "  {} {}",
        "Path:".bright_white().bold(),
        path.as_str().bright_green()
    );

    Ok(())
}

pub fn reset_config(source: &ConfigSource) -> Result<()> {
    save(source, &AppConfig::default())?;

    println!(
        "{}",
        "✓ Configuration reset to defaults".bright_green().bold()
    );
    println!();
    println!("  {} {}", "Config file:".bright_white().bold(), source.path());
    println!();
    println!(
        "  {}",
        "Run 'prmc config set-installation <path>' to point at your PR:BF2 installation"
            .bright_cyan()
    );

    Ok(())
}
