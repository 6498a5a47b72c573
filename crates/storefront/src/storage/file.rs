//! File-backed storage backend.
//!
//! Each key maps to `<dir>/<key>.json`. Writes go to a temporary file that is
//! renamed into place, so a crash never leaves a half-written value behind.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{LocalStorage, StorageError, validate_key};

/// Storage persisted as files in a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Use `dir` as the storage root. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The storage root.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl LocalStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;

        let tmp = path.with_extension("json.tmp");
        let written = fs::write(&tmp, value).and_then(|()| fs::rename(&tmp, &path));
        if written.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        written.map_err(Into::into)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(tmp.path().join("nested"));

        assert!(storage.get_item("cart").unwrap().is_none());
        storage.set_item("cart", "[]").unwrap();
        assert_eq!(storage.get_item("cart").unwrap().as_deref(), Some("[]"));
        assert!(tmp.path().join("nested").join("cart.json").exists());
    }

    #[test]
    fn test_remove_missing_key_is_ok() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(tmp.path());
        storage.remove_item("user").unwrap();
    }

    #[test]
    fn test_unreadable_entry_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        // A directory where the value file should be
        fs::create_dir_all(tmp.path().join("user.json")).unwrap();
        let storage = FileStorage::new(tmp.path());
        assert!(matches!(storage.get_item("user"), Err(StorageError::Io(_))));
    }

    #[test]
    fn test_failed_write_leaves_no_temp_file() {
        let tmp = tempfile::tempdir().unwrap();
        // A non-empty directory where the value file should land
        fs::create_dir_all(tmp.path().join("cart.json").join("occupied")).unwrap();
        let storage = FileStorage::new(tmp.path());

        assert!(matches!(storage.set_item("cart", "[]"), Err(StorageError::Io(_))));
        assert!(!tmp.path().join("cart.json.tmp").exists());
    }

    #[test]
    fn test_invalid_key_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(tmp.path());
        assert!(matches!(
            storage.set_item("../escape", "x"),
            Err(StorageError::InvalidKey(_))
        ));
    }
}
