//! Raw heightmap extraction.
//!
//! BF2 stores terrain elevation in `HeightmapPrimary.raw`: a headerless,
//! row-major run of little-endian `u16` samples covering a square grid
//! (typically 1025×1025 or 2049×2049). The side length is never stored, so it
//! is recovered from the byte length and anything that is not `2·N²` bytes is
//! rejected rather than truncated or padded.

use std::io::{Read, Seek};

use byteorder::{ByteOrder, LittleEndian};
use prmc_archive::validate::HEIGHTMAP_MARKER;
use prmc_archive::ArchiveReader;

use crate::error::{Error, Result};

/// A decoded square elevation grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeightmapGrid {
    resolution: usize,
    samples: Vec<u16>,
}

impl HeightmapGrid {
    /// Reinterpret raw little-endian bytes as a square grid.
    pub fn from_raw(bytes: &[u8]) -> Result<Self> {
        if bytes.len() % 2 != 0 {
            return Err(Error::OddByteCount(bytes.len()));
        }

        let mut samples = vec![0u16; bytes.len() / 2];
        LittleEndian::read_u16_into(bytes, &mut samples);
        Self::from_samples(samples)
    }

    /// Wrap samples whose count must be a perfect square.
    pub fn from_samples(samples: Vec<u16>) -> Result<Self> {
        let resolution = exact_sqrt(samples.len()).ok_or(Error::NotSquare(samples.len()))?;
        if resolution < 2 {
            return Err(Error::TooSmall(resolution));
        }

        Ok(Self {
            resolution,
            samples,
        })
    }

    /// Side length N of the N×N grid.
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Row-major samples, `resolution²` of them.
    pub fn samples(&self) -> &[u16] {
        &self.samples
    }
}

/// Locate and decode the heightmap member of a server archive.
pub fn extract_heightmap<R: Read + Seek>(archive: &mut ArchiveReader<R>) -> Result<HeightmapGrid> {
    let Some(member) = archive.find_member_containing(HEIGHTMAP_MARKER) else {
        // Validation guarantees the member; reaching this means the archive
        // changed after it was validated or was never validated.
        tracing::error!("{} has no {} member", archive.path(), HEIGHTMAP_MARKER);
        return Err(prmc_archive::Error::MemberNotFound {
            archive: archive.path().to_path_buf(),
            member: HEIGHTMAP_MARKER.to_string(),
        }
        .into());
    };

    let raw = archive.read_member(&member)?;
    let grid = HeightmapGrid::from_raw(&raw)?;
    tracing::debug!(
        "Decoded {} ({} bytes) as {}x{} grid",
        member,
        raw.len(),
        grid.resolution(),
        grid.resolution()
    );
    Ok(grid)
}

fn exact_sqrt(n: usize) -> Option<usize> {
    let approx = (n as f64).sqrt() as usize;
    (approx.saturating_sub(1)..=approx + 1).find(|r| r * r == n)
}
