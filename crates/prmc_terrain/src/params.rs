//! Scale parameters with their fallbacks.

/// Height scale used when `terrain.con` does not declare one.
pub const DEFAULT_HEIGHT_SCALE: f64 = 300.0;

/// BF2 tiles every map into a 13×13 grid of keypad squares.
pub const GRID_PARTITIONS: u32 = 13;

/// Resolution whose map size falls back to 2048 m.
const SMALL_MAP_RESOLUTION: usize = 1025;
const SMALL_MAP_SIZE: u32 = 2048;
const LARGE_MAP_SIZE: u32 = 4096;

/// Physical parameters of one map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainParameters {
    /// Map width in meters.
    pub map_size: u32,
    /// Vertical scale applied to raw samples.
    pub height_scale: f64,
}

impl TerrainParameters {
    /// Fill in whatever the config files did not declare.
    ///
    /// A declared value is always used, including zero. An absent map size
    /// falls back to 2048 for 1025-sample grids and 4096 for anything else.
    pub fn resolve(map_size: Option<u32>, height_scale: Option<f64>, resolution: usize) -> Self {
        let map_size = map_size.unwrap_or_else(|| {
            let fallback = fallback_map_size(resolution);
            tracing::warn!(
                "No map size declared, assuming {} m for resolution {}",
                fallback,
                resolution
            );
            fallback
        });
        let height_scale = height_scale.unwrap_or_else(|| {
            tracing::warn!(
                "No height scale declared, assuming {}",
                DEFAULT_HEIGHT_SCALE
            );
            DEFAULT_HEIGHT_SCALE
        });

        Self {
            map_size,
            height_scale,
        }
    }

    /// Width of one keypad grid square in meters.
    pub fn grid_scale(&self) -> f64 {
        f64::from(self.map_size) / f64::from(GRID_PARTITIONS)
    }

    /// Distance between neighbouring samples of a `resolution`-wide grid.
    pub fn meters_per_pixel(&self, resolution: usize) -> f64 {
        f64::from(self.map_size) / (resolution.saturating_sub(1).max(1) as f64)
    }
}

fn fallback_map_size(resolution: usize) -> u32 {
    if resolution == SMALL_MAP_RESOLUTION {
        SMALL_MAP_SIZE
    } else {
        LARGE_MAP_SIZE
    }
}
