/// Application controller
///
/// Holds everything the image upload screen needs (selected file, database
/// handle, status line, displayed image) and reacts to `Message`s. It never
/// touches the UI toolkit or runs I/O itself for the upload: `update` returns
/// an `Effect` and the caller decides how to run it. This keeps the whole
/// flow testable without a window.
use std::path::{Path, PathBuf};

use super::data::{UploadRequest, UploadedImage};
use super::library::Library;
use crate::config::StorageConfig;

pub const STATUS_DATABASE_ERROR: &str = "Database error";
pub const STATUS_UPLOADING: &str = "Uploading...";
pub const STATUS_UPLOAD_OK: &str = "Upload successful!";
pub const STATUS_UPLOAD_FAILED: &str = "Upload failed";

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// User clicked "Select Image"
    SelectImage,
    /// File picker closed; `None` when the user cancelled
    FileSelected(Option<PathBuf>),
    /// User clicked "Upload Image"
    Upload,
    /// Background upload finished
    UploadFinished(Result<UploadedImage, String>),
    /// The window is closing
    Shutdown,
}

/// Work the UI shell has to run on behalf of the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Show the native file picker
    PickFile,
    /// Run the upload in the background
    Upload(UploadRequest),
    /// Quit the application
    Exit,
}

#[derive(Debug)]
pub struct Controller {
    storage: StorageConfig,
    /// Long-lived connection opened at startup, `None` if that failed
    library: Option<Library>,
    selected_file: Option<PathBuf>,
    uploading: bool,
    status: String,
    displayed_image: Option<PathBuf>,
}

impl Controller {
    /// Create the controller and initialize the database.
    ///
    /// A database failure doesn't stop the app: it is logged, the status
    /// line says so and the session continues without the connection.
    pub fn new(storage: StorageConfig) -> Self {
        let mut status = String::new();

        let library = match Library::open(&storage.db_path()) {
            Ok(library) => {
                match library.image_count() {
                    Ok(count) => tracing::info!(
                        count,
                        path = %library.path().display(),
                        "images in library"
                    ),
                    Err(e) => tracing::warn!(error = ?e, "could not count images"),
                }
                Some(library)
            }
            Err(e) => {
                tracing::error!(
                    path = %storage.db_path().display(),
                    error = ?e,
                    "database error: {}",
                    e
                );
                status = STATUS_DATABASE_ERROR.to_string();
                None
            }
        };

        Controller {
            storage,
            library,
            selected_file: None,
            uploading: false,
            status,
            displayed_image: None,
        }
    }

    /// Handle a message and tell the caller what to run next
    pub fn update(&mut self, message: Message) -> Effect {
        match message {
            Message::SelectImage => Effect::PickFile,
            Message::FileSelected(selection) => {
                // Cancel leaves everything as it was
                if let Some(path) = selection {
                    self.status = format!("Selected: {}", basename(&path));
                    tracing::debug!(path = %path.display(), "file selected");
                    self.selected_file = Some(path);
                }
                Effect::None
            }
            Message::Upload => {
                let Some(source) = self.selected_file.clone() else {
                    return Effect::None;
                };
                if self.uploading {
                    tracing::debug!("upload already in progress, ignoring");
                    return Effect::None;
                }

                // Status first, the I/O only starts once the effect runs
                self.uploading = true;
                self.status = STATUS_UPLOADING.to_string();

                Effect::Upload(UploadRequest {
                    storage: self.storage.clone(),
                    source,
                })
            }
            Message::UploadFinished(result) => {
                self.uploading = false;
                match result {
                    Ok(uploaded) => {
                        self.displayed_image = Some(uploaded.display_path);
                        self.status = STATUS_UPLOAD_OK.to_string();
                    }
                    Err(_) => {
                        // Already logged by the upload task
                        self.status = STATUS_UPLOAD_FAILED.to_string();
                    }
                }
                Effect::None
            }
            Message::Shutdown => {
                self.shutdown();
                Effect::Exit
            }
        }
    }

    /// Close the long-lived connection, ignoring any error
    pub fn shutdown(&mut self) {
        if let Some(library) = self.library.take() {
            if let Err(e) = library.close() {
                tracing::debug!(error = ?e, "error closing database, ignored");
            }
        }
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn selected_file(&self) -> Option<&Path> {
        self.selected_file.as_deref()
    }

    /// Whether the upload button should be enabled
    pub fn can_upload(&self) -> bool {
        self.selected_file.is_some() && !self.uploading
    }

    /// Display file currently shown in the image surface
    pub fn displayed_image(&self) -> Option<&Path> {
        self.displayed_image.as_deref()
    }

    #[cfg(test)]
    pub fn has_library(&self) -> bool {
        self.library.is_some()
    }
}

fn basename(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .to_string()
}
