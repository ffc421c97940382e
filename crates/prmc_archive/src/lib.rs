//! Archive access primitives for Project Reality map bundles.
//!
//! Every map in a PR:BF2 installation ships as a `server.zip` (terrain,
//! heightmap and text configuration) and an optional `client.zip` (minimap
//! imagery and other client assets). This crate provides the pieces shared by
//! the collector and the terrain processor:
//!
//! - [`ArchiveReader`]: open a zip, list members, look members up
//!   case-insensitively and read them.
//! - [`validate_archive`]: integrity check plus required-member check,
//!   reported as an [`ArchiveValidation`] value rather than an error.
//! - [`fingerprint_file`]: streaming SHA-256 content hash used for
//!   incremental collection.

pub mod archive;
pub mod error;
pub mod fingerprint;
pub mod validate;

pub use archive::ArchiveReader;
pub use error::{Error, Result};
pub use fingerprint::{fingerprint_file, fingerprint_reader};
pub use validate::{validate_archive, validate_reader, ArchiveKind, ArchiveValidation};
