/// Storage locations for the database and display files
///
/// Everything lives under a single storage root:
/// - Android: the app-private data directory
/// - Everywhere else: the current working directory
use std::path::{Path, PathBuf};

/// Name of the SQLite database file inside the storage root
pub const DB_FILE_NAME: &str = "kivydata.db";

/// Directory name used under the platform data dir on Android
const APP_DIR_NAME: &str = "image-upload";

/// Extensions offered by the file picker
pub const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Extension used for display files when the MIME type can't be guessed
pub const DEFAULT_EXTENSION: &str = "jpg";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    root: PathBuf,
}

impl StorageConfig {
    /// Use an explicit storage root
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Pick the storage root for the platform we're running on
    pub fn detect() -> Self {
        let root = if cfg!(target_os = "android") {
            dirs::data_local_dir()
                .map(|dir| dir.join(APP_DIR_NAME))
                .unwrap_or_else(current_dir)
        } else {
            current_dir()
        };

        tracing::debug!(root = %root.display(), "storage root selected");
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the database file
    pub fn db_path(&self) -> PathBuf {
        self.root.join(DB_FILE_NAME)
    }

    /// Path of the display file written for a stored image
    pub fn temp_image_path(&self, id: i64, extension: &str) -> PathBuf {
        self.root.join(format!("temp_image_{}.{}", id, extension))
    }
}

fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
