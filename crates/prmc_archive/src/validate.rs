use std::io::{Read, Seek};

use camino::Utf8Path;

use crate::archive::{normalize_member_name, ArchiveReader};

/// Member that marks a server archive as carrying terrain data.
pub const HEIGHTMAP_MARKER: &str = "heightmapprimary.raw";

/// Member that marks a client archive as carrying minimap imagery.
pub const MINIMAP_MARKER: &str = "info/minimap.dds";

/// The two archive flavours shipped per map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    /// `server.zip`, required. Holds the heightmap and `.con` configuration.
    Server,
    /// `client.zip`, optional. Holds the minimap.
    Client,
}

impl ArchiveKind {
    /// File name of this archive inside a map folder.
    pub fn file_name(self) -> &'static str {
        match self {
            ArchiveKind::Server => "server.zip",
            ArchiveKind::Client => "client.zip",
        }
    }

    /// Lowercased marker path that must be present in the archive.
    pub fn marker(self) -> &'static str {
        match self {
            ArchiveKind::Server => HEIGHTMAP_MARKER,
            ArchiveKind::Client => MINIMAP_MARKER,
        }
    }

    fn has_marker(self, member_name: &str) -> bool {
        let name = normalize_member_name(member_name);
        match self {
            ArchiveKind::Server => name.contains(HEIGHTMAP_MARKER),
            ArchiveKind::Client => name.ends_with(MINIMAP_MARKER),
        }
    }

    fn missing_marker_reason(self) -> &'static str {
        match self {
            ArchiveKind::Server => "Missing HeightmapPrimary.raw",
            ArchiveKind::Client => "Missing info/minimap.dds",
        }
    }
}

/// Outcome of validating one archive.
///
/// Validation never fails with an error: corrupt or incomplete archives are
/// reported through `reason` and the caller decides how severe that is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveValidation {
    pub valid: bool,
    pub reason: Option<String>,
}

impl ArchiveValidation {
    pub fn ok() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: Some(reason.into()),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// The failure reason, or an empty string for a valid archive.
    pub fn reason(&self) -> &str {
        self.reason.as_deref().unwrap_or("")
    }
}

/// Validate the archive at `path` as an archive of the given kind.
pub fn validate_archive(path: &Utf8Path, kind: ArchiveKind) -> ArchiveValidation {
    match ArchiveReader::open(path) {
        Ok(mut reader) => validate_opened(&mut reader, kind),
        Err(crate::Error::Zip(_)) => ArchiveValidation::invalid("Not a valid zip file"),
        Err(e) => ArchiveValidation::invalid(format!("Validation error: {}", e)),
    }
}

/// Validate an archive held by an arbitrary reader.
pub fn validate_reader<R: Read + Seek>(reader: R, kind: ArchiveKind) -> ArchiveValidation {
    match ArchiveReader::new(reader, kind.file_name()) {
        Ok(mut reader) => validate_opened(&mut reader, kind),
        Err(_) => ArchiveValidation::invalid("Not a valid zip file"),
    }
}

fn validate_opened<R: Read + Seek>(
    reader: &mut ArchiveReader<R>,
    kind: ArchiveKind,
) -> ArchiveValidation {
    if let Some(bad) = reader.first_corrupt_member() {
        return ArchiveValidation::invalid(format!("Corrupted file in zip: {}", bad));
    }

    if !reader.member_names().any(|name| kind.has_marker(name)) {
        return ArchiveValidation::invalid(kind.missing_marker_reason());
    }

    ArchiveValidation::ok()
}
