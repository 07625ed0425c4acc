//! Durable storage for the mind-map collection.
//!
//! The whole collection is one JSON array under a single file, read once at
//! startup and overwritten on every mutation. The trait exists so the store
//! can be driven by a test double instead of the filesystem.

use std::fs;
use std::path::PathBuf;

use thiserror::Error;

use super::MindMapDocument;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("could not determine home directory")]
    HomeDirNotFound,
    #[error("failed to access mind-map storage: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize mind-map collection: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Load/save seam for the document collection. `load` returns `None` when the
/// stored data is absent or malformed; the store falls back to a seed
/// document in that case.
pub trait GraphPersistence: Send {
    fn load(&self) -> Option<Vec<MindMapDocument>>;
    fn save(&self, documents: &[MindMapDocument]) -> Result<(), StorageError>;
}

/// Filesystem-backed storage at `~/.opsdesk/mindmaps.json`.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new() -> Result<Self, StorageError> {
        let home = dirs::home_dir().ok_or(StorageError::HomeDirNotFound)?;
        Ok(FileStorage::at(home.join(".opsdesk").join("mindmaps.json")))
    }

    pub fn at(path: PathBuf) -> Self {
        FileStorage { path }
    }
}

impl GraphPersistence for FileStorage {
    fn load(&self) -> Option<Vec<MindMapDocument>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("failed to read mind-map storage: {e}");
                }
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(documents) => Some(documents),
            Err(e) => {
                log::warn!("malformed mind-map storage, starting fresh: {e}");
                None
            }
        }
    }

    fn save(&self, documents: &[MindMapDocument]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(documents)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mindmap::{Node, NodeKind, Position};

    fn doc() -> MindMapDocument {
        MindMapDocument {
            id: "m1".to_string(),
            name: "Onboarding".to_string(),
            nodes: vec![Node {
                id: "n1".to_string(),
                label: "Start".to_string(),
                position: Position { x: 250.0, y: 150.0 },
                kind: NodeKind::Editable,
            }],
            edges: Vec::new(),
        }
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FileStorage::at(dir.path().join("mindmaps.json"));

        storage.save(&[doc()]).expect("save");
        let loaded = storage.load().expect("load");
        assert_eq!(loaded, vec![doc()]);
    }

    #[test]
    fn test_missing_file_loads_as_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = FileStorage::at(dir.path().join("missing.json"));
        assert!(storage.load().is_none());
    }

    #[test]
    fn test_malformed_file_loads_as_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("mindmaps.json");
        std::fs::write(&path, "{not json").expect("write");

        let storage = FileStorage::at(path);
        assert!(storage.load().is_none());
    }
}
