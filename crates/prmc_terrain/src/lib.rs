//! Terrain processing for Project Reality maps.
//!
//! Turns a collected `server.zip` into the artifact set the web calculator
//! loads:
//!
//! ```text
//! <processed_root>/<map>/heightmap.json.gz   grid document, gzip level 9
//! <processed_root>/<map>/metadata.json       MapMetadata, pretty JSON
//! <processed_root>/maps.json                 catalog of processed maps
//! ```
//!
//! The pipeline per map is [`extract_heightmap`] → [`parse_map_size`] /
//! [`parse_height_scale`] → [`TerrainParameters::resolve`] →
//! [`encode_artifacts`]. [`process_map`] runs it for one archive and
//! [`process_all`] for every collected map.

pub mod catalog;
pub mod con;
pub mod encoder;
pub mod error;
pub mod heightmap;
pub mod params;
pub mod processor;


pub use catalog::{list_processed_maps, write_catalog, CatalogEntry, MapCatalog, CATALOG_FILE_NAME};
pub use con::{parse_height_scale, parse_map_size, read_config_members, ConfigMembers};
pub use encoder::{
    compress_document, compress_pending, encode_artifacts, CompressionStats, GridDocument,
    MapMetadata, FORMAT_VERSION, GRID_FILE_NAME, GRID_GZ_FILE_NAME, METADATA_FILE_NAME,
};
pub use error::{Error, Result};
pub use heightmap::{extract_heightmap, HeightmapGrid};
pub use params::TerrainParameters;
pub use processor::{process_all, process_map, ProcessingOutcome};
