//! Application configuration stored in prmc.toml.

use camino::{Utf8Path, Utf8PathBuf};
use prmc_collect::REPORT_FILE_NAME;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;

/// File name used when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "prmc.toml";

const DEFAULT_RAW_DIR: &str = "raw_map_data";
const DEFAULT_PROCESSED_DIR: &str = "processed_maps";

/// Paths used by every command. Flags override them per invocation.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// PR:BF2 installation root.
    pub installation_path: Option<Utf8PathBuf>,
    /// Collection output root.
    pub raw_dir: Utf8PathBuf,
    /// Processing output root.
    pub processed_dir: Utf8PathBuf,
    /// Collection report location, `<raw_dir>/collection_report.txt` if unset.
    pub report_path: Option<Utf8PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            installation_path: None,
            raw_dir: DEFAULT_RAW_DIR.into(),
            processed_dir: DEFAULT_PROCESSED_DIR.into(),
            report_path: None,
        }
    }
}

impl AppConfig {
    pub fn report_path(&self) -> Utf8PathBuf {
        self.report_path
            .clone()
            .unwrap_or_else(|| self.raw_dir.join(REPORT_FILE_NAME))
    }
}

/// Where the configuration lives for this invocation.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    path: Utf8PathBuf,
}

impl ConfigSource {
    pub fn resolve(custom: Option<Utf8PathBuf>) -> Self {
        Self {
            path: custom.unwrap_or_else(|| DEFAULT_CONFIG_FILE.into()),
        }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Loads the configuration.
    /// Returns defaults if the file doesn't exist or cannot be parsed.
    pub fn load(&self) -> AppConfig {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return AppConfig::default(),
            Err(e) => {
                tracing::warn!("Could not read {}: {}; using defaults", self.path, e);
                return AppConfig::default();
            }
        };

        match toml::from_str(&content) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!("Could not parse {}: {}; using defaults", self.path, e);
                AppConfig::default()
            }
        }
    }

    pub fn save(&self, cfg: &AppConfig) -> io::Result<()> {
        let content = toml::to_string_pretty(cfg).map_err(io::Error::other)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, content)
    }
}
