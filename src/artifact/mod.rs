//! Release artifact builders.
//!
//! - `archive` - Packs the binary into `<bin>-<version>-<target>.tar.gz`
//! - `checksum` - SHA-256 of the archive in `sha256sum` format
//! - `metadata` - Version and archive-name side files

pub mod archive;
pub mod checksum;
pub mod metadata;

pub use archive::{create_archive, list_entries};
pub use metadata::{clear_metadata, write_metadata, ReleaseMetadata};
