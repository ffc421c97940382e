//! The collection manifest persisted as `manifest.json`.
//!
//! The manifest is loaded at the start of a collection run to decide which
//! archives changed, and rewritten wholesale at the end. Identity is decided
//! by `content_hash` alone. Maps are kept in a [`BTreeMap`] so the serialized
//! form is ordered by name and two runs over the same installation produce
//! byte-identical manifests apart from `collection_date`.
//!
//! # JSON format
//!
//! ```json
//! {
//!   "maps": {
//!     "adak": {
//!       "name": "adak",
//!       "server_zip": { "content_hash": "9f2c…", "size_bytes": 1048576, "has_required_member": true },
//!       "client_zip": null,
//!       "collected_at": "2024-11-19T10:30:00Z",
//!       "source_path": "D:/Games/PR/levels/adak",
//!       "status": "new"
//!     }
//!   },
//!   "total_maps": 1,
//!   "maps_with_minimaps": 0,
//!   "maps_heightmap_only": 1,
//!   "total_size_bytes": 1048576,
//!   "total_size_mb": 1.0,
//!   "collection_date": "2024-11-19T10:30:00Z",
//!   "format_version": "1.0"
//! }
//! ```

use std::collections::BTreeMap;

use camino::Utf8Path;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Compatibility tag written into every manifest.
pub const FORMAT_VERSION: &str = "1.0";

/// File name of the manifest inside the collection output root.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Current UTC time as ISO-8601 with a `Z` suffix.
pub fn utc_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// How a map's archives compare to the previous run.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CollectionStatus {
    /// No previous manifest entry existed.
    New,
    /// A previous entry existed and at least one archive hash differs.
    Updated,
    /// Both archive hashes match the previous entry; nothing was copied.
    Unchanged,
}

impl CollectionStatus {
    /// Single-character marker used in the text report.
    pub fn glyph(self) -> &'static str {
        match self {
            CollectionStatus::New => "+",
            CollectionStatus::Updated => "↻",
            CollectionStatus::Unchanged => "=",
        }
    }
}

/// One copied archive.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRecord {
    /// Hex SHA-256 of the archive bytes.
    pub content_hash: String,
    /// Size of the copied archive in bytes.
    pub size_bytes: u64,
    /// Whether the archive holds its required member (heightmap for
    /// `server.zip`, minimap for `client.zip`).
    pub has_required_member: bool,
}

/// A collected map.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MapRecord {
    pub name: String,
    pub server_zip: ArchiveRecord,
    /// `None` when the map has no usable `client.zip` (heightmap-only mode).
    pub client_zip: Option<ArchiveRecord>,
    pub collected_at: String,
    pub source_path: String,
    pub status: CollectionStatus,
}

impl MapRecord {
    pub fn has_minimap(&self) -> bool {
        self.client_zip
            .as_ref()
            .is_some_and(|client| client.has_required_member)
    }

    /// Combined size of the server and client archives.
    pub fn size_bytes(&self) -> u64 {
        self.server_zip.size_bytes + self.client_zip.as_ref().map_or(0, |c| c.size_bytes)
    }
}

/// The persisted record of a collection run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CollectionManifest {
    pub maps: BTreeMap<String, MapRecord>,
    pub total_maps: usize,
    pub maps_with_minimaps: usize,
    pub maps_heightmap_only: usize,
    pub total_size_bytes: u64,
    pub total_size_mb: f64,
    pub collection_date: String,
    pub format_version: String,
}

impl CollectionManifest {
    /// Build a manifest and its aggregates from the records of a run.
    pub fn from_records(
        records: impl IntoIterator<Item = MapRecord>,
        collection_date: impl Into<String>,
    ) -> Self {
        let maps: BTreeMap<String, MapRecord> = records
            .into_iter()
            .map(|record| (record.name.clone(), record))
            .collect();

        let maps_with_minimaps = maps.values().filter(|m| m.has_minimap()).count();
        let total_size_bytes: u64 = maps.values().map(MapRecord::size_bytes).sum();

        Self {
            total_maps: maps.len(),
            maps_with_minimaps,
            maps_heightmap_only: maps.len() - maps_with_minimaps,
            total_size_bytes,
            total_size_mb: bytes_to_mb(total_size_bytes),
            collection_date: collection_date.into(),
            format_version: FORMAT_VERSION.to_string(),
            maps,
        }
    }

    pub fn get(&self, name: &str) -> Option<&MapRecord> {
        self.maps.get(name)
    }

    /// Load a manifest from disk.
    ///
    /// Returns `Ok(None)` if the file doesn't exist and `Err` if it exists but
    /// cannot be read or parsed.
    pub fn load(path: &Utf8Path) -> Result<Option<Self>> {
        if !path.as_std_path().exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(path.as_std_path())?;
        let manifest: Self = serde_json::from_str(&contents)?;
        Ok(Some(manifest))
    }

    /// Load the previous run's manifest, treating an unreadable one as absent.
    ///
    /// A corrupt manifest only costs the dedup state, so the run starts over
    /// and every map is collected as new.
    pub fn load_or_discard(path: &Utf8Path) -> Option<Self> {
        match Self::load(path) {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::warn!(
                    "Ignoring unreadable manifest {}: {}; collecting from scratch",
                    path,
                    e
                );
                None
            }
        }
    }

    /// Write the manifest as pretty JSON, creating parent directories if needed.
    pub fn save(&self, path: &Utf8Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent.as_std_path())?;
        }

        let mut contents = serde_json::to_string_pretty(self)?;
        contents.push('\n');
        std::fs::write(path.as_std_path(), contents)?;
        Ok(())
    }
}

/// Megabytes rounded to two decimals.
fn bytes_to_mb(bytes: u64) -> f64 {
    (bytes as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0
}
