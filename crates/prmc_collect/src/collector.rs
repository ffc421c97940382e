//! Map discovery and incremental archive collection.
//!
//! # Algorithm
//!
//! 1. Resolve `<installation>/levels`; a missing directory is fatal.
//! 2. Every immediate subdirectory holding a `server.zip` is a candidate.
//!    Candidates are sorted by name; zero candidates is fatal.
//! 3. For each candidate, in order:
//!    - validate `server.zip` (failure records a soft error and skips the map),
//!    - fingerprint it,
//!    - validate and fingerprint `client.zip` if present, falling back to
//!      heightmap-only mode when it is unusable,
//!    - compare both hashes with the previous manifest entry. If both match
//!      the previous record is reused and nothing is copied. Otherwise the
//!      changed archives are copied into `<output>/<map>/`.
//! 4. Return the records and the soft errors. Nothing here writes the
//!    manifest; that is the caller's decision.

use std::fs;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use prmc_archive::{fingerprint_file, validate_archive, ArchiveKind};

use crate::error::{Error, Result};
use crate::install::levels_dir;
use crate::manifest::{utc_timestamp, ArchiveRecord, CollectionManifest, CollectionStatus, MapRecord};

/// A map folder found in the installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapCandidate {
    pub name: String,
    pub dir: Utf8PathBuf,
    pub server_zip: Utf8PathBuf,
    pub client_zip: Option<Utf8PathBuf>,
}

/// Emitted before each map is collected.
#[derive(Debug, Clone)]
pub struct MapProgress {
    /// 1-based index of the map being collected.
    pub current: usize,
    pub total: usize,
    pub map_name: String,
}

/// Result of a collection run.
#[derive(Debug, Default)]
pub struct CollectionOutcome {
    /// One record per successfully collected map, in name order.
    pub records: Vec<MapRecord>,
    /// One `"<map>: <reason>"` entry per map that failed.
    pub errors: Vec<String>,
}

impl CollectionOutcome {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Candidates seen by the run (collected plus failed).
    pub fn maps_found(&self) -> usize {
        self.records.len() + self.errors.len()
    }
}

/// List the map candidates of an installation, sorted by name.
pub fn discover_maps(installation_root: &Utf8Path) -> Result<Vec<MapCandidate>> {
    let levels = levels_dir(installation_root);
    if !levels.is_dir() {
        return Err(Error::LevelsDirMissing(levels));
    }

    let mut candidates = Vec::new();
    for entry in fs::read_dir(levels.as_std_path())? {
        let entry = entry?;
        let dir = match Utf8PathBuf::from_path_buf(entry.path()) {
            Ok(p) => p,
            Err(p) => {
                tracing::warn!("Skipping non-UTF-8 path: {}", p.display());
                continue;
            }
        };

        if !dir.is_dir() {
            continue;
        }

        let server_zip = dir.join(ArchiveKind::Server.file_name());
        if !server_zip.is_file() {
            continue;
        }

        let client_zip = dir.join(ArchiveKind::Client.file_name());
        let Some(name) = dir.file_name().map(str::to_string) else {
            continue;
        };

        candidates.push(MapCandidate {
            name,
            server_zip,
            client_zip: client_zip.is_file().then_some(client_zip),
            dir,
        });
    }

    candidates.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(candidates)
}

/// Collect `installation_root` into `output_root`, deduplicating against `previous`.
pub fn collect(
    installation_root: &Utf8Path,
    output_root: &Utf8Path,
    previous: Option<&CollectionManifest>,
) -> Result<CollectionOutcome> {
    Collector::new(output_root)
        .with_previous(previous)
        .collect(installation_root)
}

/// Incremental collector over one output tree.
pub struct Collector<'a> {
    output_root: Utf8PathBuf,
    previous: Option<&'a CollectionManifest>,
    progress: Option<Box<dyn FnMut(MapProgress) + 'a>>,
}

impl<'a> Collector<'a> {
    pub fn new(output_root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            previous: None,
            progress: None,
        }
    }

    /// Seed dedup decisions from a previous run's manifest.
    pub fn with_previous(mut self, previous: Option<&'a CollectionManifest>) -> Self {
        self.previous = previous;
        self
    }

    pub fn with_progress(mut self, callback: impl FnMut(MapProgress) + 'a) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    /// Run the collection.
    ///
    /// Fails only on run-level preconditions; per-map failures end up in
    /// [`CollectionOutcome::errors`].
    pub fn collect(mut self, installation_root: &Utf8Path) -> Result<CollectionOutcome> {
        let candidates = discover_maps(installation_root)?;
        if candidates.is_empty() {
            return Err(Error::NoMapsFound(levels_dir(installation_root)));
        }

        tracing::info!(
            "Collecting {} maps from {} into {}",
            candidates.len(),
            installation_root,
            self.output_root
        );

        fs::create_dir_all(self.output_root.as_std_path())?;

        let mut outcome = CollectionOutcome::default();
        let total = candidates.len();

        for (i, candidate) in candidates.iter().enumerate() {
            if let Some(progress) = self.progress.as_mut() {
                progress(MapProgress {
                    current: i + 1,
                    total,
                    map_name: candidate.name.clone(),
                });
            }

            match self.collect_map(candidate) {
                Ok(record) => {
                    tracing::info!("{}: {:?}", record.name, record.status);
                    outcome.records.push(record);
                }
                Err(reason) => {
                    tracing::error!("{}: {}", candidate.name, reason);
                    outcome.errors.push(format!("{}: {}", candidate.name, reason));
                }
            }
        }

        Ok(outcome)
    }

    fn collect_map(&self, candidate: &MapCandidate) -> std::result::Result<MapRecord, String> {
        let validation = validate_archive(&candidate.server_zip, ArchiveKind::Server);
        if !validation.is_valid() {
            return Err(format!("server.zip validation failed: {}", validation.reason()));
        }

        let server_hash = fingerprint_file(&candidate.server_zip).map_err(|e| e.to_string())?;
        let client_hash = candidate
            .client_zip
            .as_deref()
            .and_then(|path| usable_client_hash(&candidate.name, path));

        let prior = self.previous.and_then(|m| m.get(&candidate.name));

        let server_same = prior.is_some_and(|p| p.server_zip.content_hash == server_hash);
        let client_same = prior.is_some_and(|p| {
            match (p.client_zip.as_ref(), client_hash.as_deref()) {
                (None, None) => true,
                (Some(record), Some(hash)) => record.content_hash == hash,
                _ => false,
            }
        });

        if let Some(prior) = prior {
            if server_same && client_same {
                tracing::debug!("{}: identical to previous collection, skipping copy", candidate.name);
                return Ok(MapRecord {
                    status: CollectionStatus::Unchanged,
                    ..prior.clone()
                });
            }
        }

        self.copy_changed(candidate, prior, server_hash, client_hash, server_same, client_same)
            .map_err(|e| format!("copy failed: {}", e))
    }

    fn copy_changed(
        &self,
        candidate: &MapCandidate,
        prior: Option<&MapRecord>,
        server_hash: String,
        client_hash: Option<String>,
        server_same: bool,
        client_same: bool,
    ) -> io::Result<MapRecord> {
        let map_dir = self.output_root.join(&candidate.name);
        fs::create_dir_all(map_dir.as_std_path())?;

        let server_zip = match prior {
            Some(p) if server_same => p.server_zip.clone(),
            _ => {
                let dest = map_dir.join(ArchiveKind::Server.file_name());
                ArchiveRecord {
                    content_hash: server_hash,
                    size_bytes: copy_archive(&candidate.server_zip, &dest)?,
                    has_required_member: true,
                }
            }
        };

        let dest = map_dir.join(ArchiveKind::Client.file_name());
        let client_zip = match (client_hash, candidate.client_zip.as_deref()) {
            (Some(hash), Some(source)) => match prior.and_then(|p| p.client_zip.as_ref()) {
                Some(record) if client_same => Some(record.clone()),
                _ => Some(ArchiveRecord {
                    content_hash: hash,
                    size_bytes: copy_archive(source, &dest)?,
                    has_required_member: true,
                }),
            },
            _ => {
                if dest.is_file() {
                    tracing::info!("{}: removing stale {}", candidate.name, dest);
                    fs::remove_file(dest.as_std_path())?;
                }
                None
            }
        };

        Ok(MapRecord {
            name: candidate.name.clone(),
            server_zip,
            client_zip,
            collected_at: utc_timestamp(),
            source_path: candidate.dir.to_string(),
            status: if prior.is_some() {
                CollectionStatus::Updated
            } else {
                CollectionStatus::New
            },
        })
    }
}

/// Hash of a client archive, or `None` when it cannot be used.
fn usable_client_hash(map_name: &str, path: &Utf8Path) -> Option<String> {
    let validation = validate_archive(path, ArchiveKind::Client);
    if !validation.is_valid() {
        tracing::warn!(
            "{}: client.zip unusable ({}), continuing in heightmap-only mode",
            map_name,
            validation.reason()
        );
        return None;
    }

    match fingerprint_file(path) {
        Ok(hash) => Some(hash),
        Err(e) => {
            tracing::warn!(
                "{}: could not hash client.zip ({}), continuing in heightmap-only mode",
                map_name,
                e
            );
            None
        }
    }
}

/// Copy `source` to `dest`, keeping permissions and modification time.
///
/// Returns the size of the copy.
fn copy_archive(source: &Utf8Path, dest: &Utf8Path) -> io::Result<u64> {
    fs::copy(source.as_std_path(), dest.as_std_path())?;

    if let Err(e) = preserve_modified_time(source, dest) {
        tracing::warn!("Could not preserve modification time of {}: {}", dest, e);
    }

    let size = fs::metadata(dest.as_std_path())?.len();
    tracing::debug!("Copied {} -> {} ({} bytes)", source, dest, size);
    Ok(size)
}

fn preserve_modified_time(source: &Utf8Path, dest: &Utf8Path) -> io::Result<()> {
    let modified = fs::metadata(source.as_std_path())?.modified()?;
    // fs::copy carries over a read-only bit, so fall back to a read handle.
    let copy = fs::OpenOptions::new()
        .write(true)
        .open(dest.as_std_path())
        .or_else(|_| fs::File::open(dest.as_std_path()))?;
    copy.set_modified(modified)
}
