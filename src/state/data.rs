/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the database layer, the upload task and the UI layer.
use std::path::PathBuf;

use crate::config::StorageConfig;

/// A single row of the `images` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    /// Unique database ID (auto-increment)
    pub id: i64,
    /// Raw image bytes, stored as-is
    pub gambar: Vec<u8>,
}

/// Everything the upload task needs, detached from the UI state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// Where the database and the display file live
    pub storage: StorageConfig,
    /// File chosen in the picker
    pub source: PathBuf,
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    /// ID of the row the bytes were read back from
    pub id: i64,
    /// Payload length in bytes
    pub size: usize,
    /// Display file holding a copy of the stored payload
    pub display_path: PathBuf,
}
