//! The `maps.json` catalog of processed maps.

use std::fs;

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::encoder::METADATA_FILE_NAME;
use crate::error::Result;

pub const CATALOG_FILE_NAME: &str = "maps.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    /// Directory of the map relative to the processed root.
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapCatalog {
    pub maps: Vec<CatalogEntry>,
    pub count: usize,
}

impl MapCatalog {
    pub fn from_entries(maps: Vec<CatalogEntry>) -> Self {
        let count = maps.len();
        Self { maps, count }
    }
}

/// Processed maps below `processed_root`, sorted by name.
///
/// Only directories holding a `metadata.json` count as maps. A missing root
/// yields an empty list.
pub fn list_processed_maps(processed_root: &Utf8Path) -> Result<Vec<CatalogEntry>> {
    if !processed_root.is_dir() {
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    for entry in processed_root.read_dir_utf8()? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping entry in {}: {}", processed_root, e);
                continue;
            }
        };
        let path = entry.path();
        if !path.is_dir() || !path.join(METADATA_FILE_NAME).is_file() {
            continue;
        }

        let name = entry.file_name().to_string();
        entries.push(CatalogEntry {
            path: name.clone(),
            name,
        });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Rebuild `<processed_root>/maps.json` from the directory contents.
pub fn write_catalog(processed_root: &Utf8Path) -> Result<MapCatalog> {
    let catalog = MapCatalog::from_entries(list_processed_maps(processed_root)?);

    fs::create_dir_all(processed_root)?;
    let path = processed_root.join(CATALOG_FILE_NAME);
    fs::write(&path, serde_json::to_string_pretty(&catalog)?)?;
    tracing::debug!("Wrote {} ({} maps)", path, catalog.count);

    Ok(catalog)
}
