use std::fs::File;
use std::io::{self, BufReader, Read, Seek};

use camino::{Utf8Path, Utf8PathBuf};
use zip::ZipArchive;

use crate::error::{Error, Result};

/// A read-only view over a zip map archive.
///
/// Member lookups are case-insensitive because PR:BF2 archives are authored
/// on Windows and the casing of member paths is not consistent between maps
/// (`HeightmapPrimary.raw`, `heightmapprimary.raw`, ...).
pub struct ArchiveReader<R: Read + Seek> {
    archive: ZipArchive<R>,
    path: Utf8PathBuf,
}

impl ArchiveReader<BufReader<File>> {
    /// Open the archive at `path`.
    pub fn open(path: impl AsRef<Utf8Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path.as_std_path())?;
        Self::new(BufReader::new(file), path)
    }
}

impl<R: Read + Seek> ArchiveReader<R> {
    /// Wrap an arbitrary reader. `path` is only used for error messages.
    pub fn new(reader: R, path: impl Into<Utf8PathBuf>) -> Result<Self> {
        let archive = ZipArchive::new(reader)?;
        Ok(Self {
            archive,
            path: path.into(),
        })
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Member names in central directory order.
    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.archive.file_names()
    }

    /// First member whose lowercased name contains `needle` (lowercased).
    pub fn find_member_containing(&self, needle: &str) -> Option<String> {
        let needle = needle.to_ascii_lowercase();
        self.member_names()
            .find(|name| name.to_ascii_lowercase().contains(&needle))
            .map(str::to_string)
    }

    /// First member whose normalized name ends with `suffix`.
    ///
    /// Both sides are lowercased and backslashes are treated as `/`.
    pub fn find_member_ending_with(&self, suffix: &str) -> Option<String> {
        let suffix = normalize_member_name(suffix);
        self.member_names()
            .find(|name| normalize_member_name(name).ends_with(&suffix))
            .map(str::to_string)
    }

    /// Read a member by its exact name.
    pub fn read_member(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(zip::result::ZipError::FileNotFound) => {
                return Err(Error::MemberNotFound {
                    archive: self.path.clone(),
                    member: name.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        // The declared size comes from an unverified central directory.
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Read a member as text, replacing invalid UTF-8 sequences.
    pub fn read_member_text(&mut self, name: &str) -> Result<String> {
        let data = self.read_member(name)?;
        Ok(String::from_utf8_lossy(&data).into_owned())
    }

    /// Read every file member to the end so the zip reader verifies its CRC-32.
    ///
    /// Returns the name of the first member that fails to decompress or whose
    /// checksum does not match, or `None` if the whole archive is intact.
    pub fn first_corrupt_member(&mut self) -> Option<String> {
        for i in 0..self.archive.len() {
            let fallback = self
                .archive
                .name_for_index(i)
                .map(str::to_string)
                .unwrap_or_else(|| format!("#{}", i));

            let mut file = match self.archive.by_index(i) {
                Ok(file) => file,
                Err(e) => {
                    tracing::debug!("Member {} of {} unreadable: {}", fallback, self.path, e);
                    return Some(fallback);
                }
            };

            if file.is_dir() {
                continue;
            }

            let name = file.name().to_string();
            if let Err(e) = io::copy(&mut file, &mut io::sink()) {
                tracing::debug!("Member {} of {} failed integrity check: {}", name, self.path, e);
                return Some(name);
            }
        }

        None
    }
}

/// Lowercase a member name and use `/` as the only separator.
pub fn normalize_member_name(name: &str) -> String {
    name.replace('\\', "/").to_ascii_lowercase()
}


#[cfg(test)]
mod tests {
    use super::test_support::{build_zip, corrupt_payload};
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_find_member_case_insensitive() {
        let data = build_zip(&[
            ("levels/adak/init.con", b"rem"),
            ("levels/adak/HeightmapPrimary.raw", &[0, 0]),
        ]);
        let reader = ArchiveReader::new(Cursor::new(data), "server.zip").unwrap();

        assert_eq!(
            reader.find_member_containing("heightmapprimary.raw").as_deref(),
            Some("levels/adak/HeightmapPrimary.raw")
        );
        assert_eq!(
            reader.find_member_ending_with("INIT.CON").as_deref(),
            Some("levels/adak/init.con")
        );
        assert!(reader.find_member_containing("terrain.con").is_none());
    }

    #[test]
    fn test_find_member_ending_with_backslashes() {
        let data = build_zip(&[("Info\\Minimap.dds", b"DDS ")]);
        let reader = ArchiveReader::new(Cursor::new(data), "client.zip").unwrap();

        assert!(reader.find_member_ending_with("info/minimap.dds").is_some());
    }

    #[test]
    fn test_read_member() {
        let data = build_zip(&[("terrain.con", b"HeightmapCluster.setHeightScale 300")]);
        let mut reader = ArchiveReader::new(Cursor::new(data), "server.zip").unwrap();

        let text = reader.read_member_text("terrain.con").unwrap();
        assert_eq!(text, "HeightmapCluster.setHeightScale 300");
    }

    #[test]
    fn test_read_member_not_found() {
        let data = build_zip(&[("terrain.con", b"")]);
        let mut reader = ArchiveReader::new(Cursor::new(data), "server.zip").unwrap();

        let result = reader.read_member("init.con");
        assert!(matches!(result, Err(Error::MemberNotFound { .. })));
    }

    #[test]
    fn test_first_corrupt_member() {
        let mut data = build_zip(&[
            ("good.txt", b"intact payload"),
            ("bad.txt", b"payload that will be damaged"),
        ]);
        let mut reader = ArchiveReader::new(Cursor::new(data.clone()), "server.zip").unwrap();
        assert_eq!(reader.first_corrupt_member(), None);

        corrupt_payload(&mut data, b"payload that will be damaged");
        let mut reader = ArchiveReader::new(Cursor::new(data), "server.zip").unwrap();
        assert_eq!(reader.first_corrupt_member().as_deref(), Some("bad.txt"));
    }

    #[test]
    fn test_first_corrupt_member_with_broken_local_header() {
        let mut data = build_zip(&[("good.txt", b"intact payload"), ("bad.txt", b"second")]);
        let second_header = data
            .windows(4)
            .enumerate()
            .filter(|(_, w)| w.starts_with(b"PK\x03\x04"))
            .nth(1)
            .map(|(pos, _)| pos)
            .unwrap();
        data[second_header + 2] = 0;

        let mut reader = ArchiveReader::new(Cursor::new(data), "server.zip").unwrap();
        assert_eq!(reader.first_corrupt_member().as_deref(), Some("bad.txt"));
    }

    #[test]
    fn test_read_member_ignores_declared_size() {
        let mut data = build_zip(&[("HeightmapPrimary.raw", b"\x01\x00\x02\x00")]);
        let central = data
            .windows(4)
            .position(|w| w == b"PK\x01\x02")
            .unwrap();
        data[central + 24..central + 28].copy_from_slice(&0x7fff_fff0u32.to_le_bytes());

        let mut reader = ArchiveReader::new(Cursor::new(data), "server.zip").unwrap();
        if let Ok(bytes) = reader.read_member("HeightmapPrimary.raw") {
            assert_eq!(bytes, [1, 0, 2, 0]);
        }
    }

    #[test]
    fn test_new_rejects_non_zip() {
        let result = ArchiveReader::new(Cursor::new(b"not a zip at all".to_vec()), "x.zip");
        assert!(matches!(result, Err(Error::Zip(_))));
    }
}
