use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

use super::data::ImageRecord;
use crate::error::{Error, Result};

/// The Library manages the SQLite image store.
/// Each row holds the raw bytes of one uploaded image.
pub struct Library {
    conn: Connection,
    db_path: PathBuf,
}

impl Library {
    /// Open (or create) the database and make sure the schema exists.
    ///
    /// Used once at application start. Safe to run against an existing
    /// database: rows already stored are left untouched.
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
            }
        }

        let library = Self::connect(db_path)?;
        library.init_schema()?;

        tracing::info!(path = %db_path.display(), "database initialized");
        Ok(library)
    }

    /// Open a plain connection without touching the schema.
    /// The upload workflow uses this for its short-lived connection.
    pub fn connect(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        Ok(Library {
            conn,
            db_path: db_path.to_path_buf(),
        })
    }

    /// Create the images table if it doesn't exist.
    /// The layout is shared with other tools reading `kivydata.db`, keep it as is.
    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS images
                (id INTEGER PRIMARY KEY AUTOINCREMENT, gambar BLOB)",
            [],
        )?;
        Ok(())
    }

    /// Get the path to the database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Get a count of images in the library
    pub fn image_count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM images", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Store raw image bytes in a new row.
    /// Returns the new image ID
    pub fn insert_image(&self, gambar: &[u8]) -> Result<i64> {
        self.conn
            .execute("INSERT INTO images (gambar) VALUES (?1)", params![gambar])?;
        Ok(self.conn.last_insert_rowid())
    }

    /// ID of the most recently inserted image, if any
    pub fn latest_image_id(&self) -> Result<Option<i64>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM images ORDER BY id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    /// Stored bytes for an image ID
    pub fn image_payload(&self, id: i64) -> Result<Option<Vec<u8>>> {
        let gambar = self
            .conn
            .query_row(
                "SELECT gambar FROM images WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(gambar)
    }

    /// Full record for an image ID
    pub fn get_image(&self, id: i64) -> Result<Option<ImageRecord>> {
        Ok(self
            .image_payload(id)?
            .map(|gambar| ImageRecord { id, gambar }))
    }

    /// Close the connection, reporting any error SQLite raises on close
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| Error::Storage(e))
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("db_path", &self.db_path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_in(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("kivydata.db")
    }

    #[test]
    fn test_open_creates_images_table() {
        let dir = tempfile::tempdir().unwrap();
        let library = Library::open(&db_in(&dir)).unwrap();

        assert!(db_in(&dir).exists());
        assert_eq!(library.image_count().unwrap(), 0);
        assert_eq!(library.latest_image_id().unwrap(), None);
    }

    #[test]
    fn test_schema_columns() {
        let dir = tempfile::tempdir().unwrap();
        let library = Library::open(&db_in(&dir)).unwrap();

        let mut stmt = library.conn.prepare("PRAGMA table_info(images)").unwrap();
        let columns: Vec<(String, String, i64)> = stmt
            .query_map([], |row| Ok((row.get(1)?, row.get(2)?, row.get(5)?)))
            .unwrap()
            .map(|c| c.unwrap())
            .collect();

        assert_eq!(
            columns,
            vec![
                ("id".to_string(), "INTEGER".to_string(), 1),
                ("gambar".to_string(), "BLOB".to_string(), 0),
            ]
        );
    }

    #[test]
    fn test_reopen_keeps_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = db_in(&dir);

        let library = Library::open(&path).unwrap();
        library.insert_image(b"first").unwrap();
        library.close().unwrap();

        let library = Library::open(&path).unwrap();
        assert_eq!(library.image_count().unwrap(), 1);
        assert_eq!(library.image_payload(1).unwrap(), Some(b"first".to_vec()));
    }

    #[test]
    fn test_ids_increase() {
        let dir = tempfile::tempdir().unwrap();
        let library = Library::open(&db_in(&dir)).unwrap();

        let a = library.insert_image(&[1, 2, 3]).unwrap();
        let b = library.insert_image(&[4, 5]).unwrap();

        assert!(b > a);
        assert_eq!(library.latest_image_id().unwrap(), Some(b));
        assert_eq!(
            library.get_image(a).unwrap(),
            Some(ImageRecord {
                id: a,
                gambar: vec![1, 2, 3]
            })
        );
    }

    #[test]
    fn test_missing_image() {
        let dir = tempfile::tempdir().unwrap();
        let library = Library::open(&db_in(&dir)).unwrap();

        assert_eq!(library.image_payload(42).unwrap(), None);
        assert_eq!(library.get_image(42).unwrap(), None);
    }

    #[test]
    fn test_open_fails_when_parent_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();

        assert!(Library::open(&blocker.join("kivydata.db")).is_err());
    }
}
