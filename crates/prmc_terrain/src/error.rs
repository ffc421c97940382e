//! Error types for terrain processing.

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

    /// The raw heightmap cannot hold whole 16-bit samples.
    #[error("Heightmap has an odd byte count ({0} bytes)")]
    OddByteCount(usize),

    /// The sample count is not a perfect square.
    #[error("Heightmap is not square: {0} samples")]
    NotSquare(usize),

    /// A grid needs at least two samples per side to have a pixel spacing.
    #[error("Heightmap resolution {0} is too small")]
    TooSmall(usize),

    /// No `<map>/server.zip` found below the raw data root.
    #[error("No collected maps found in {0}")]
    NoMapsFound(Utf8PathBuf),
}
