use std::cell::{Cell, RefCell};

use crate::{
    models::project::Project,
    storage::{STORAGE_SLOT, Storage, StorageError},
};

/// A single in-process slot holding the serialized project list, the same
/// shape the file adapter writes.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slot: RefCell<Option<String>>,
    fail_saves: Cell<bool>,
    saves: Cell<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with raw slot contents, valid or not.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        let storage = Self::default();
        storage.slot.replace(Some(contents.into()));
        storage
    }

    /// While set, every save fails with `StorageError::Unavailable`.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.set(fail);
    }

    pub fn contents(&self) -> Option<String> {
        self.slot.borrow().clone()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

impl Storage for MemoryStorage {
    fn load(&self) -> Result<Vec<Project>, StorageError> {
        match self.slot.borrow().as_deref() {
            None => Ok(vec![]),
            Some(content) => {
                serde_json::from_str(content).map_err(|e| StorageError::ParseFailed {
                    path: STORAGE_SLOT.into(),
                    source: e,
                })
            }
        }
    }

    fn save(&self, projects: &[Project]) -> Result<(), StorageError> {
        if self.fail_saves.get() {
            return Err(StorageError::Unavailable(STORAGE_SLOT.to_string()));
        }
        let json = serde_json::to_string(projects)
            .map_err(|e| StorageError::SerializeFailed { source: e })?;
        self.slot.replace(Some(json));
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_slot_loads_empty_list() {
        let storage = MemoryStorage::new();
        assert!(storage.load().unwrap().is_empty());
    }

    #[test]
    fn test_garbage_slot_is_parse_error() {
        let storage = MemoryStorage::with_contents("{ not json");
        assert!(matches!(storage.load(), Err(StorageError::ParseFailed { .. })));
    }

    #[test]
    fn test_failing_saves_keep_previous_contents() {
        let storage = MemoryStorage::new();
        storage.save(&[]).unwrap();
        storage.set_fail_saves(true);

        assert!(matches!(storage.save(&[]), Err(StorageError::Unavailable(_))));
        assert_eq!(storage.contents().as_deref(), Some("[]"));
        assert_eq!(storage.save_count(), 1);
    }
}
