//! Error types for map collection.
//!
//! Only run-level failures are errors. Problems with a single map are
//! collected as strings in [`CollectionOutcome::errors`](crate::CollectionOutcome)
//! so one bad archive never aborts the run.

use camino::Utf8PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] prmc_archive::Error),

    /// None of the searched locations is a PR:BF2 installation.
    #[error("Could not find a PR:BF2 installation")]
    InstallationNotFound { searched: Vec<Utf8PathBuf> },

    /// The installation root has no `levels/` directory.
    #[error("Map directory not found: {0}")]
    LevelsDirMissing(Utf8PathBuf),

    /// `levels/` exists but no subdirectory contains a `server.zip`.
    #[error("No maps found in {0}")]
    NoMapsFound(Utf8PathBuf),
}
