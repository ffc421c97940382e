use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("Project Reality installation not found (searched: {})", format_paths(.searched))]
    #[diagnostic(
        code(install::not_found),
        help("Pass --path <install> or run 'prmc config set-installation <path>'")
    )]
    InstallationNotFound { searched: Vec<Utf8PathBuf> },

    #[error("Not a Project Reality installation: {path}")]
    #[diagnostic(
        code(install::invalid),
        help("The path must be the installation root, the directory that contains levels/")
    )]
    InvalidInstallation { path: Utf8PathBuf },

    #[error("Levels directory not found: {path}")]
    #[diagnostic(
        code(install::levels_missing),
        help("The installation appears incomplete; verify the game files")
    )]
    LevelsDirMissing { path: Utf8PathBuf },

    #[error("No maps found in {path}")]
    #[diagnostic(
        code(collect::no_maps),
        help("A map is a directory under levels/ that contains server.zip")
    )]
    NoMapsFound { path: Utf8PathBuf },

    #[error("Nothing to process in {path}")]
    #[diagnostic(
        code(process::no_maps),
        help("Run 'prmc collect' first, or check the --input directory and --map name")
    )]
    NothingToProcess { path: Utf8PathBuf },

    #[error("{failed} of {total} maps failed")]
    #[diagnostic(
        code(run::completed_with_errors),
        help("The failing maps and reasons are listed above")
    )]
    CompletedWithErrors { failed: usize, total: usize },

    #[error("Failed to write {what}: {path}")]
    #[diagnostic(
        code(fs::write_failed),
        help("Check file permissions and available disk space")
    )]
    WriteFailed {
        what: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: prmc_collect::Error,
    },

    #[error("Failed to save configuration: {path}")]
    #[diagnostic(code(config::save_failed))]
    ConfigSaveFailed {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(code(collect::failed))]
    Collect(prmc_collect::Error),

    #[error(transparent)]
    #[diagnostic(code(process::failed))]
    Terrain(prmc_terrain::Error),
}

impl From<prmc_collect::Error> for CliError {
    fn from(error: prmc_collect::Error) -> Self {
        match error {
            prmc_collect::Error::InstallationNotFound { searched } => {
                Self::InstallationNotFound { searched }
            }
            prmc_collect::Error::LevelsDirMissing(path) => Self::LevelsDirMissing { path },
            prmc_collect::Error::NoMapsFound(path) => Self::NoMapsFound { path },
            other => Self::Collect(other),
        }
    }
}

impl From<prmc_terrain::Error> for CliError {
    fn from(error: prmc_terrain::Error) -> Self {
        match error {
            prmc_terrain::Error::NoMapsFound(path) => Self::NothingToProcess { path },
            other => Self::Terrain(other),
        }
    }
}

impl CliError {
    pub fn write_failed(what: &'static str, path: Utf8PathBuf, source: prmc_collect::Error) -> Self {
        Self::WriteFailed { what, path, source }
    }

    pub fn completed_with_errors(failed: usize, total: usize) -> Self {
        Self::CompletedWithErrors { failed, total }
    }
}

fn format_paths(paths: &[Utf8PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_collect_errors_get_dedicated_variants() {
        let error = CliError::from(prmc_collect::Error::NoMapsFound("pr/levels".into()));
        assert!(matches!(error, CliError::NoMapsFound { .. }));

        let error = CliError::from(prmc_collect::Error::InstallationNotFound {
            searched: vec!["C:/a".into(), "D:/b".into()],
        });
        assert!(matches!(error, CliError::InstallationNotFound { ref searched } if searched.len() == 2));
    }

    #[test]
    fn test_empty_raw_dir_is_nothing_to_process() {
        let error = CliError::from(prmc_terrain::Error::NoMapsFound("raw_map_data".into()));
        assert_eq!(error.to_string(), "Nothing to process in raw_map_data");
    }

    #[test]
    fn test_format_paths() {
        assert_eq!(format_paths(&["a".into(), "b".into()]), "a, b");
    }
}
