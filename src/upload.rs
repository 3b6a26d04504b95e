/// Upload workflow: file → database → display file
///
/// The blocking part opens its own connection (rusqlite::Connection is not
/// Send, so the UI's connection can't be shared), stores the file bytes,
/// reads them back from the database and writes them to a display file
/// the image widget can load from a path.
use image::ImageFormat;
use std::fs;
use std::path::Path;

use crate::config::DEFAULT_EXTENSION;
use crate::error::{Error, Result};
use crate::state::data::{UploadRequest, UploadedImage};
use crate::state::library::Library;

/// Run an upload on a blocking worker.
///
/// Failures are logged here with their full cause; the UI only gets the
/// error text back.
pub async fn upload_image(request: UploadRequest) -> std::result::Result<UploadedImage, String> {
    let source = request.source.clone();

    let result = tokio::task::spawn_blocking(move || upload_image_blocking(&request))
        .await
        .map_err(|e| Error::Task(e.to_string()))
        .and_then(|r| r);

    result.map_err(|e| {
        tracing::error!(source = %source.display(), error = ?e, "upload failed: {}", e);
        e.to_string()
    })
}

/// Blocking implementation of the upload
pub fn upload_image_blocking(request: &UploadRequest) -> Result<UploadedImage> {
    // Fresh connection, dropped when this function returns
    let library = Library::connect(&request.storage.db_path())?;

    let bytes = fs::read(&request.source).map_err(|e| Error::io(&request.source, e))?;
    library.insert_image(&bytes)?;

    // Read our own write back instead of reusing `bytes`
    let id = library.latest_image_id()?.ok_or(Error::EmptyTable)?;
    let gambar = library.get_image(id)?.ok_or(Error::MissingRow(id))?.gambar;

    let extension = display_extension(&request.source);
    let display_path = request.storage.temp_image_path(id, &extension);
    fs::write(&display_path, &gambar).map_err(|e| Error::io(&display_path, e))?;

    tracing::info!(
        id,
        size = gambar.len(),
        display = %display_path.display(),
        "image stored"
    );

    Ok(UploadedImage {
        id,
        size: gambar.len(),
        display_path,
    })
}

/// Extension for the display file: the subtype of the guessed MIME type
/// (`photo.jpg` → `image/jpeg` → `jpeg`), or `jpg` when nothing can be guessed.
pub fn display_extension(path: &Path) -> String {
    match ImageFormat::from_path(path) {
        Ok(format) => format
            .to_mime_type()
            .rsplit('/')
            .next()
            .unwrap_or(DEFAULT_EXTENSION)
            .to_string(),
        Err(_) => DEFAULT_EXTENSION.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use std::path::PathBuf;

    fn setup() -> (tempfile::TempDir, StorageConfig) {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageConfig::new(dir.path());
        Library::open(&storage.db_path()).unwrap();
        (dir, storage)
    }

    fn write_source(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, bytes).unwrap();
        path
    }

    fn row_count(storage: &StorageConfig) -> i64 {
        Library::connect(&storage.db_path())
            .unwrap()
            .image_count()
            .unwrap()
    }

    #[test]
    fn test_display_extension_from_mime() {
        assert_eq!(display_extension(Path::new("a/photo.png")), "png");
        assert_eq!(display_extension(Path::new("photo.PNG")), "png");
        assert_eq!(display_extension(Path::new("photo.jpg")), "jpeg");
        assert_eq!(display_extension(Path::new("photo.jpeg")), "jpeg");
    }

    #[test]
    fn test_display_extension_defaults_to_jpg() {
        assert_eq!(display_extension(Path::new("photo")), "jpg");
        assert_eq!(display_extension(Path::new("photo.unknownext")), "jpg");
    }

    #[test]
    fn test_upload_stores_and_copies_bytes() {
        let (dir, storage) = setup();
        // Not a decodable PNG; payloads are never validated
        let payload: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        let source = write_source(&dir, "cat.png", &payload);

        let uploaded = upload_image_blocking(&UploadRequest {
            storage: storage.clone(),
            source,
        })
        .unwrap();

        assert_eq!(uploaded.size, payload.len());
        assert_eq!(row_count(&storage), 1);
        assert_eq!(uploaded.display_path, storage.temp_image_path(uploaded.id, "png"));

        let stored = Library::connect(&storage.db_path())
            .unwrap()
            .image_payload(uploaded.id)
            .unwrap()
            .unwrap();
        assert_eq!(stored.len(), payload.len());
        assert_eq!(fs::read(&uploaded.display_path).unwrap(), stored);
    }

    #[test]
    fn test_sequential_uploads_get_increasing_ids() {
        let (dir, storage) = setup();
        let source = write_source(&dir, "dog.jpg", b"not really a jpeg");

        let request = UploadRequest {
            storage: storage.clone(),
            source,
        };
        let first = upload_image_blocking(&request).unwrap();
        let second = upload_image_blocking(&request).unwrap();

        assert!(second.id > first.id);
        assert_eq!(row_count(&storage), 2);
        assert!(second
            .display_path
            .ends_with(format!("temp_image_{}.jpeg", second.id)));
    }

    #[test]
    fn test_unreadable_source_inserts_nothing() {
        let (dir, storage) = setup();

        let err = upload_image_blocking(&UploadRequest {
            storage: storage.clone(),
            source: dir.path().join("missing.png"),
        })
        .unwrap_err();

        assert!(matches!(err, Error::Io { .. }));
        assert_eq!(row_count(&storage), 0);
    }

    #[test]
    fn test_upload_without_schema_fails() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageConfig::new(dir.path());
        let source = write_source(&dir, "cat.png", b"bytes");

        let err = upload_image_blocking(&UploadRequest { storage, source }).unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }

    #[tokio::test]
    async fn test_upload_image_async() {
        let (dir, storage) = setup();
        let source = write_source(&dir, "cat.png", b"abc");

        let uploaded = upload_image(UploadRequest {
            storage: storage.clone(),
            source,
        })
        .await
        .unwrap();
        assert_eq!(uploaded.size, 3);

        let failed = upload_image(UploadRequest {
            storage,
            source: dir.path().join("gone.png"),
        })
        .await;
        assert!(failed.is_err());
    }
}
