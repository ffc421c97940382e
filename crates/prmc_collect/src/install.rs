//! PR:BF2 installation discovery.

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::{Error, Result};

/// Locations checked when no installation path is configured.
pub const DEFAULT_INSTALL_PATHS: &[&str] = &[
    r"C:\Program Files (x86)\Project Reality\Project Reality BF2",
    r"D:\Games\Project Reality\Project Reality BF2",
    r"C:\Program Files\Project Reality\Project Reality BF2",
];

/// The map-listing directory of an installation.
pub fn levels_dir(installation_root: &Utf8Path) -> Utf8PathBuf {
    installation_root.join("levels")
}

/// An installation is any existing directory with a `levels/` subdirectory.
pub fn is_valid_installation(path: &Utf8Path) -> bool {
    path.is_dir() && levels_dir(path).is_dir()
}

/// Find an installation, trying `custom` first and then the default locations.
pub fn find_installation(custom: Option<&Utf8Path>) -> Option<Utf8PathBuf> {
    candidate_paths(custom)
        .into_iter()
        .find(|path| is_valid_installation(path))
}

/// Like [`find_installation`] but reports the searched paths on failure.
pub fn require_installation(custom: Option<&Utf8Path>) -> Result<Utf8PathBuf> {
    find_installation(custom).ok_or_else(|| Error::InstallationNotFound {
        searched: candidate_paths(custom),
    })
}

fn candidate_paths(custom: Option<&Utf8Path>) -> Vec<Utf8PathBuf> {
    custom
        .map(Utf8Path::to_path_buf)
        .into_iter()
        .chain(DEFAULT_INSTALL_PATHS.iter().map(Utf8PathBuf::from))
        .collect()
}
