//! Scale parameters from BF2 `.con` configuration scripts.
//!
//! Two statements matter for the calculator:
//!
//! - `init.con`: `heightmapCluster.create <W> <H> <cluster> <n>` declares the
//!   physical map width in meters.
//! - `terrain.con`: `HeightmapCluster.setHeightScale <scale>` declares the
//!   vertical scale applied to raw samples.
//!
//! BF2 is case-insensitive about object and method names and authors are not
//! consistent, so both patterns ignore case. Only the first declaration in a
//! file counts.

use std::io::{Read, Seek};
use std::sync::LazyLock;

use prmc_archive::ArchiveReader;
use regex::Regex;

use crate::error::Result;

static MAP_SIZE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)heightmapCluster\.create\s+(\d+)\s+(\d+)").expect("map size pattern is valid")
});

static HEIGHT_SCALE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)HeightmapCluster\.setHeightScale\s+(\d+\.?\d*)")
        .expect("height scale pattern is valid")
});

/// Declared map width in meters, or `None` if absent.
pub fn parse_map_size(text: Option<&str>) -> Option<u32> {
    let captures = MAP_SIZE_PATTERN.captures(text?)?;
    captures.get(1)?.as_str().parse().ok()
}

/// Declared vertical height scale, or `None` if absent.
pub fn parse_height_scale(text: Option<&str>) -> Option<f64> {
    let captures = HEIGHT_SCALE_PATTERN.captures(text?)?;
    captures.get(1)?.as_str().parse().ok()
}

/// The text configuration members of a server archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigMembers {
    pub init_con: Option<String>,
    pub terrain_con: Option<String>,
}

/// Read `init.con` and `terrain.con` from an archive, if present.
///
/// Members are matched by case-insensitive suffix; the first match wins.
pub fn read_config_members<R: Read + Seek>(archive: &mut ArchiveReader<R>) -> Result<ConfigMembers> {
    let init_name = archive.find_member_ending_with("init.con");
    let terrain_name = archive.find_member_ending_with("terrain.con");

    let init_con = match init_name {
        Some(name) => Some(archive.read_member_text(&name)?),
        None => None,
    };
    let terrain_con = match terrain_name {
        Some(name) => Some(archive.read_member_text(&name)?),
        None => None,
    };

    if init_con.is_none() {
        tracing::debug!("{}: no init.con member", archive.path());
    }
    if terrain_con.is_none() {
        tracing::debug!("{}: no terrain.con member", archive.path());
    }

    Ok(ConfigMembers {
        init_con,
        terrain_con,
    })
}
