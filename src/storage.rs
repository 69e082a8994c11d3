use std::path::PathBuf;

use crate::error::{Result, StoreError};
use crate::model::WellnessDocument;

/// JSON-file persistence for the wellness document.
///
/// One document, one file. Every failure (I/O, malformed JSON) surfaces as
/// `StoreError::Persistence`; nothing panics past this boundary. Callers
/// treat any load failure as "use defaults".
#[derive(Debug, Clone)]
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    pub fn new(path: PathBuf) -> Self {
        Storage { path }
    }

    pub fn load(&self) -> Result<WellnessDocument> {
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| StoreError::Persistence(format!("failed to read {}: {}", self.path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| StoreError::Persistence(format!("failed to parse {}: {}", self.path.display(), e)))
    }

    pub fn save(&self, doc: &WellnessDocument) -> Result<()> {
        let content = serde_json::to_string_pretty(doc)
            .map_err(|e| StoreError::Persistence(format!("failed to serialize document: {}", e)))?;
        self.write_raw(&content)
    }

    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Persistence(format!(
                "failed to remove {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    /// Raw persisted JSON, for backup/export.
    pub fn export_raw(&self) -> Result<String> {
        std::fs::read_to_string(&self.path)
            .map_err(|e| StoreError::Persistence(format!("failed to read {}: {}", self.path.display(), e)))
    }

    /// Replace the persisted document with externally provided JSON.
    /// The text must parse as a full document before anything is written.
    pub fn import_raw(&self, text: &str) -> Result<()> {
        let _doc: WellnessDocument = serde_json::from_str(text)
            .map_err(|e| StoreError::Persistence(format!("invalid import data: {}", e)))?;
        self.write_raw(text)
    }

    pub(crate) fn write_raw(&self, content: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Persistence(format!("failed to create {}: {}", parent.display(), e))
            })?;
        }
        std::fs::write(&self.path, content)
            .map_err(|e| StoreError::Persistence(format!("failed to write {}: {}", self.path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_storage() -> (tempfile::TempDir, Storage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().join("wellness.json"));
        (dir, storage)
    }

    #[test]
    fn test_load_missing_file_fails() {
        let (_dir, storage) = temp_storage();
        assert!(matches!(storage.load(), Err(StoreError::Persistence(_))));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let (_dir, storage) = temp_storage();
        let mut doc = WellnessDocument::initial();
        doc.user_name = Some("Ana".to_string());
        doc.profile.xp = 42;

        storage.save(&doc).unwrap();
        let loaded = storage.load().unwrap();

        assert_eq!(loaded.user_name.as_deref(), Some("Ana"));
        assert_eq!(loaded.profile.xp, 42);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let (_dir, storage) = temp_storage();
        storage.save(&WellnessDocument::initial()).unwrap();
        storage.clear().unwrap();
        storage.clear().unwrap();
        assert!(storage.load().is_err());
    }

    #[test]
    fn test_import_rejects_malformed_json() {
        let (_dir, storage) = temp_storage();
        assert!(storage.import_raw("{not json").is_err());
        assert!(storage.import_raw("{\"unexpected\": true}").is_err());
        assert!(storage.load().is_err());
    }

    #[test]
    fn test_export_import_roundtrip() {
        let (_dir, storage) = temp_storage();
        let mut doc = WellnessDocument::initial();
        doc.user_name = Some("Bruno".to_string());
        storage.save(&doc).unwrap();

        let raw = storage.export_raw().unwrap();
        storage.clear().unwrap();
        storage.import_raw(&raw).unwrap();

        assert_eq!(storage.load().unwrap().user_name.as_deref(), Some("Bruno"));
    }
}
