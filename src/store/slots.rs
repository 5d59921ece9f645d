use log::debug;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::CatalogError;

/// Slot holding the freight default
pub const FREIGHT_SLOT: &str = "freight_default";
/// Slot holding the margin percentage default
pub const MARGIN_SLOT: &str = "margin_default";
/// Slot holding the serialized product array
pub const PRODUCTS_SLOT: &str = "products";

/// Durable key-value slots holding serialized catalog state.
pub trait SlotStorage {
    /// Read a slot; `None` when it was never written.
    fn read(&self, key: &str) -> Result<Option<String>, CatalogError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), CatalogError>;
}

/// One JSON file per slot inside a directory.
#[derive(Debug, Clone)]
pub struct FileSlots {
    dir: PathBuf,
}

impl FileSlots {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileSlots { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl SlotStorage for FileSlots {
    fn read(&self, key: &str) -> Result<Option<String>, CatalogError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CatalogError::PersistenceFailure(format!(
                "failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), CatalogError> {
        let failure = |path: &Path, e: std::io::Error| {
            CatalogError::PersistenceFailure(format!("failed to write {}: {}", path.display(), e))
        };

        fs::create_dir_all(&self.dir).map_err(|e| failure(self.dir.as_path(), e))?;

        // Write next to the slot and rename so a crash never leaves half a file
        let path = self.path_for(key);
        let staging = self.dir.join(format!(".{}.json.tmp", key));
        fs::write(&staging, value).map_err(|e| failure(staging.as_path(), e))?;
        fs::rename(&staging, &path).map_err(|e| failure(path.as_path(), e))?;
        debug!("Wrote slot {} to {}", key, path.display());
        Ok(())
    }
}

/// In-memory slots, for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemorySlots {
    slots: HashMap<String, String>,
}

impl MemorySlots {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStorage for MemorySlots {
    fn read(&self, key: &str) -> Result<Option<String>, CatalogError> {
        Ok(self.slots.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), CatalogError> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
