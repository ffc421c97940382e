use camino::Utf8PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading a map archive.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A member that the caller expected to exist is not in the archive.
    #[error("{member} not found in {archive}")]
    MemberNotFound {
        archive: Utf8PathBuf,
        member: String,
    },
}
