//! Collection of Project Reality map archives.
//!
//! Scans a PR:BF2 installation's `levels/` directory, validates and
//! fingerprints each map's `server.zip` (and optional `client.zip`), and
//! copies only the archives whose content hash differs from the previous
//! run's [`CollectionManifest`]. The result of a run is a list of
//! [`MapRecord`]s plus soft per-map errors, which feed the new manifest and
//! the [`CollectionReport`].
//!
//! ```no_run
//! use camino::Utf8Path;
//! use prmc_collect::{collect, CollectionManifest};
//!
//! # fn main() -> prmc_collect::Result<()> {
//! let output = Utf8Path::new("raw_map_data");
//! let previous = CollectionManifest::load_or_discard(&output.join("manifest.json"));
//! let outcome = collect(Utf8Path::new("D:/Games/PR"), output, previous.as_ref())?;
//! println!("{} collected, {} failed", outcome.records.len(), outcome.errors.len());
//! # Ok(())
//! # }
//! ```

pub mod collector;
pub mod error;
pub mod install;
pub mod manifest;
pub mod persist;
pub mod report;

#[cfg(test)]
mod tests;

pub use collector::{collect, discover_maps, CollectionOutcome, Collector, MapCandidate, MapProgress};
pub use error::{Error, Result};
pub use install::{
    find_installation, is_valid_installation, levels_dir, require_installation, DEFAULT_INSTALL_PATHS,
};
pub use manifest::{
    utc_timestamp, ArchiveRecord, CollectionManifest, CollectionStatus, MapRecord,
    FORMAT_VERSION, MANIFEST_FILE_NAME,
};
pub use persist::{persist_run, PersistedRun};
pub use report::{CollectionReport, REPORT_FILE_NAME};
