//! Web artifacts for one processed map.
//!
//! The grid document is written compact, compressed to `heightmap.json.gz`
//! and then removed; `metadata.json` stays uncompressed so it can be read by
//! hand.

use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{SecondsFormat, Utc};
use flate2::{Compression, GzBuilder};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::Result;
use crate::heightmap::HeightmapGrid;
use crate::params::TerrainParameters;

/// Version tag written into every metadata document.
pub const FORMAT_VERSION: &str = "1.0";

pub const GRID_FILE_NAME: &str = "heightmap.json";
pub const GRID_GZ_FILE_NAME: &str = "heightmap.json.gz";
pub const METADATA_FILE_NAME: &str = "metadata.json";

const GRID_FORMAT: &str = "uint16";
const GRID_COMPRESSION: &str = "none";

/// The grid document consumed by the calculator front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDocument<'a> {
    pub resolution: usize,
    pub width: usize,
    pub height: usize,
    pub format: Cow<'a, str>,
    /// Row-major samples.
    pub data: Cow<'a, [u16]>,
    /// Describes `data` itself; the gzip layer wraps the whole document.
    pub compression: Cow<'a, str>,
}

impl<'a> GridDocument<'a> {
    pub fn borrowed(grid: &'a HeightmapGrid) -> Self {
        Self {
            resolution: grid.resolution(),
            width: grid.resolution(),
            height: grid.resolution(),
            format: Cow::Borrowed(GRID_FORMAT),
            data: Cow::Borrowed(grid.samples()),
            compression: Cow::Borrowed(GRID_COMPRESSION),
        }
    }
}

/// Published description of a processed map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMetadata {
    pub map_name: String,
    pub map_size: u32,
    pub height_scale: f64,
    pub grid_scale: f64,
    pub heightmap_resolution: usize,
    pub meters_per_pixel: f64,
    pub processed_at: String,
    pub format_version: String,
}

impl MapMetadata {
    pub fn new(
        map_name: impl Into<String>,
        params: &TerrainParameters,
        resolution: usize,
        processed_at: impl Into<String>,
    ) -> Self {
        Self {
            map_name: map_name.into(),
            map_size: params.map_size,
            height_scale: params.height_scale,
            grid_scale: params.grid_scale(),
            heightmap_resolution: resolution,
            meters_per_pixel: params.meters_per_pixel(resolution),
            processed_at: processed_at.into(),
            format_version: FORMAT_VERSION.to_string(),
        }
    }

    /// Load `metadata.json` from a processed map directory.
    pub fn load(map_dir: &Utf8Path) -> Result<Self> {
        let file = File::open(map_dir.join(METADATA_FILE_NAME))?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

/// Size change from compressing one grid document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionStats {
    pub map_name: String,
    pub original_bytes: u64,
    pub compressed_bytes: u64,
}

impl CompressionStats {
    /// Percentage of the original size saved, `0.0` for an empty input.
    pub fn savings_percent(&self) -> f64 {
        if self.original_bytes == 0 {
            return 0.0;
        }
        (1.0 - self.compressed_bytes as f64 / self.original_bytes as f64) * 100.0
    }
}

/// Write the grid and metadata artifacts for one map into `output_dir`.
///
/// `metadata.json` is removed first and written last, so it only ever sits
/// next to a complete `heightmap.json.gz`. On failure no `heightmap.json`
/// or partial gzip is left behind.
pub fn encode_artifacts(
    grid: &HeightmapGrid,
    params: &TerrainParameters,
    map_name: &str,
    output_dir: &Utf8Path,
) -> Result<MapMetadata> {
    fs::create_dir_all(output_dir)?;
    remove_if_exists(&output_dir.join(METADATA_FILE_NAME))?;

    let grid_path = output_dir.join(GRID_FILE_NAME);
    let written = write_grid_document(grid, &grid_path).and_then(|()| compress_document(&grid_path));
    let stats = match written {
        Ok(stats) => stats,
        Err(e) => {
            discard(&grid_path);
            return Err(e);
        }
    };
    tracing::debug!(
        "{}: grid document {} -> {} bytes",
        map_name,
        stats.original_bytes,
        stats.compressed_bytes
    );

    let metadata = MapMetadata::new(
        map_name,
        params,
        grid.resolution(),
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    );
    let json = serde_json::to_string_pretty(&metadata)?;
    fs::write(output_dir.join(METADATA_FILE_NAME), json)?;

    Ok(metadata)
}

fn write_grid_document(grid: &HeightmapGrid, path: &Utf8Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, &GridDocument::borrowed(grid))?;
    writer.flush()?;
    Ok(())
}

/// Gzip `heightmap.json` next to itself at level 9 and delete the original.
///
/// The gzip header carries no file name and a zero mtime, so equal
/// documents produce equal bytes. The archive is written under a temporary
/// name and renamed into place; the original is only removed after that.
/// On failure the original is kept and the temporary file is removed.
pub fn compress_document(json_path: &Utf8Path) -> Result<CompressionStats> {
    let gz_path = gz_path_for(json_path);
    let partial_path = partial_path_for(&gz_path);
    let original_bytes = fs::metadata(json_path)?.len();

    let written =
        write_gzip(json_path, &partial_path).and_then(|()| fs::rename(&partial_path, &gz_path));
    if let Err(e) = written {
        discard(&partial_path);
        return Err(e.into());
    }

    let compressed_bytes = fs::metadata(&gz_path)?.len();
    fs::remove_file(json_path)?;

    Ok(CompressionStats {
        map_name: json_path
            .parent()
            .and_then(Utf8Path::file_name)
            .unwrap_or_default()
            .to_string(),
        original_bytes,
        compressed_bytes,
    })
}

fn write_gzip(source: &Utf8Path, destination: &Utf8Path) -> io::Result<()> {
    let mut reader = BufReader::new(File::open(source)?);
    let mut encoder = GzBuilder::new()
        .mtime(0)
        .write(BufWriter::new(File::create(destination)?), Compression::best());
    io::copy(&mut reader, &mut encoder)?;
    encoder.finish()?.flush()
}

fn remove_if_exists(path: &Utf8Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// Best-effort cleanup on an error path that is already being reported.
fn discard(path: &Utf8Path) {
    if let Err(e) = remove_if_exists(path) {
        tracing::warn!("Could not remove {}: {}", path, e);
    }
}

fn partial_path_for(gz_path: &Utf8Path) -> Utf8PathBuf {
    let mut path = gz_path.as_str().to_owned();
    path.push_str(".partial");
    Utf8PathBuf::from(path)
}

fn gz_path_for(json_path: &Utf8Path) -> Utf8PathBuf {
    let mut path = json_path.as_str().to_owned();
    path.push_str(".gz");
    Utf8PathBuf::from(path)
}

/// Compress every leftover `heightmap.json` below `processed_root`.
pub fn compress_pending(processed_root: &Utf8Path) -> Result<Vec<CompressionStats>> {
    let mut stats = Vec::new();

    for entry in WalkDir::new(processed_root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|x| x.ok())
    {
        if !entry.file_type().is_file() || entry.file_name() != GRID_FILE_NAME {
            continue;
        }

        let Ok(path) = Utf8PathBuf::from_path_buf(entry.into_path()) else {
            tracing::warn!("Skipping non-UTF-8 path below {}", processed_root);
            continue;
        };

        let result = compress_document(&path)?;
        tracing::info!(
            "Compressed {} ({:.1}% saved)",
            path,
            result.savings_percent()
        );
        stats.push(result);
    }

    Ok(stats)
}
