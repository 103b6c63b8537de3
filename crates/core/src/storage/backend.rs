use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::errors::CoreError;

/// Named-slot key/value storage.
///
/// Each slot holds one serialized payload. `read` returns `Ok(None)` when the
/// slot has never been written.
pub trait StorageBackend: Send + Sync {
    fn read(&self, slot: &str) -> Result<Option<String>, CoreError>;

    fn write(&self, slot: &str, payload: &str) -> Result<(), CoreError>;
}

/// One `<slot>.json` file per slot inside a directory, created on first write.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `slot`.
    pub fn slot_path(&self, slot: &str) -> Result<PathBuf, CoreError> {
        let valid = !slot.is_empty()
            && slot
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(CoreError::PersistenceWrite(format!(
                "invalid slot name {slot:?}"
            )));
        }
        Ok(self.dir.join(format!("{slot}.json")))
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, slot: &str) -> Result<Option<String>, CoreError> {
        let path = self
            .slot_path(slot)
            .map_err(|e| CoreError::PersistenceRead(e.to_string()))?;
        match std::fs::read_to_string(&path) {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CoreError::PersistenceRead(format!(
                "{}: {e}",
                path.display()
            ))),
        }
    }

    fn write(&self, slot: &str, payload: &str) -> Result<(), CoreError> {
        let path = self.slot_path(slot)?;
        let io = |e: std::io::Error| CoreError::PersistenceWrite(format!("{}: {e}", path.display()));

        std::fs::create_dir_all(&self.dir).map_err(io)?;
        std::fs::write(&path, payload).map_err(io)
    }
}

/// Process-local slots. Clones share the same slots, which lets two store
/// instances observe each other's writes.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose `slot` already holds `payload`.
    pub fn with_slot(slot: &str, payload: impl Into<String>) -> Self {
        let backend = Self::new();
        backend
            .slots
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(slot.to_string(), payload.into());
        backend
    }

    /// Raw payload currently stored in `slot`.
    pub fn raw(&self, slot: &str) -> Option<String> {
        self.slots
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(slot)
            .cloned()
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, slot: &str) -> Result<Option<String>, CoreError> {
        Ok(self.raw(slot))
    }

    fn write(&self, slot: &str, payload: &str) -> Result<(), CoreError> {
        self.slots
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(slot.to_string(), payload.to_string());
        Ok(())
    }
}
