/// Error types shared by the library and the upload workflow
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Image row {0} disappeared after insert")]
    MissingRow(i64),

    #[error("Images table is empty after insert")]
    EmptyTable,

    #[error("Background task failed: {0}")]
    Task(String),
}

impl Error {
    /// Wrap an IO error together with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
