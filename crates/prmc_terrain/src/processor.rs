//! Per-map and batch processing of collected archives.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use prmc_archive::ArchiveReader;

use crate::catalog::{write_catalog, MapCatalog};
use crate::con::{parse_height_scale, parse_map_size, read_config_members};
use crate::encoder::{encode_artifacts, MapMetadata};
use crate::error::{Error, Result};
use crate::heightmap::extract_heightmap;
use crate::params::TerrainParameters;

const SERVER_ZIP: &str = "server.zip";

/// Result of a batch run.
#[derive(Debug, Default)]
pub struct ProcessingOutcome {
    /// Metadata of every map processed, in name order.
    pub processed: Vec<MapMetadata>,
    /// One `"<map>: <reason>"` entry per map that failed.
    pub errors: Vec<String>,
    /// Catalog written after the batch.
    pub catalog: MapCatalog,
}

impl ProcessingOutcome {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Turn one `server.zip` into the web artifacts under `output_dir`.
pub fn process_map(archive_path: &Utf8Path, map_name: &str, output_dir: &Utf8Path) -> Result<MapMetadata> {
    let mut archive = ArchiveReader::open(archive_path)?;

    let grid = extract_heightmap(&mut archive)?;
    let members = read_config_members(&mut archive)?;

    let params = TerrainParameters::resolve(
        parse_map_size(members.init_con.as_deref()),
        parse_height_scale(members.terrain_con.as_deref()),
        grid.resolution(),
    );
    tracing::debug!(
        "{}: map_size={} height_scale={} resolution={}",
        map_name,
        params.map_size,
        params.height_scale,
        grid.resolution()
    );

    encode_artifacts(&grid, &params, map_name, output_dir)
}

/// Process every `<raw_root>/<map>/server.zip` into `<processed_root>/<map>`.
///
/// With `only` set, just that map is processed. Per-map failures are
/// collected; having nothing to process is fatal. The catalog is rewritten
/// afterwards.
pub fn process_all(
    raw_root: &Utf8Path,
    processed_root: &Utf8Path,
    only: Option<&str>,
) -> Result<ProcessingOutcome> {
    let mut maps = collected_maps(raw_root)?;
    if let Some(name) = only {
        maps.retain(|(map_name, _)| map_name == name);
    }
    if maps.is_empty() {
        return Err(Error::NoMapsFound(raw_root.to_path_buf()));
    }

    let mut outcome = ProcessingOutcome::default();
    for (name, archive_path) in maps {
        tracing::info!("Processing {}", name);
        match process_map(&archive_path, &name, &processed_root.join(&name)) {
            Ok(metadata) => outcome.processed.push(metadata),
            Err(e) => {
                tracing::error!("{}: {}", name, e);
                outcome.errors.push(format!("{}: {}", name, e));
            }
        }
    }

    outcome.catalog = write_catalog(processed_root)?;
    Ok(outcome)
}

fn collected_maps(raw_root: &Utf8Path) -> Result<Vec<(String, Utf8PathBuf)>> {
    if !raw_root.is_dir() {
        return Ok(Vec::new());
    }

    let mut maps = Vec::new();
    for entry in fs::read_dir(raw_root.as_std_path())? {
        let entry = entry?;
        let dir = match Utf8PathBuf::from_path_buf(entry.path()) {
            Ok(p) => p,
            Err(p) => {
                tracing::warn!("Skipping non-UTF-8 path: {}", p.display());
                continue;
            }
        };

        let server_zip = dir.join(SERVER_ZIP);
        if !server_zip.is_file() {
            continue;
        }
        if let Some(name) = dir.file_name() {
            maps.push((name.to_string(), server_zip));
        }
    }

    maps.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(maps)
}
