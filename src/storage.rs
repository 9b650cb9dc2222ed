use std::path::PathBuf;

use thiserror::Error;

use crate::models::project::Project;

pub mod json;
#[cfg(test)]
pub mod memory;

/// Name of the slot holding the serialized project list.
pub const STORAGE_SLOT: &str = "kanban-projects";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to load projects from '{path}': {source}")]
    LoadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON from '{path}': {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to save projects to '{path}': {source}")]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize projects to JSON: {source}")]
    SerializeFailed {
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to create backup at '{path}': {source}")]
    BackupFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to cleanup old backups in '{dir}': {source}")]
    CleanupFailed {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to keep a copy of unreadable data at '{path}': {source}")]
    PreserveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(test)]
    #[error("Storage slot '{0}' is unavailable")]
    Unavailable(String),
}

/// Durable mirror of the project list. The in-memory store is the authority;
/// `save` replaces whatever was stored before.
pub trait Storage {
    fn load(&self) -> Result<Vec<Project>, StorageError>;
    fn save(&self, projects: &[Project]) -> Result<(), StorageError>;

    /// Copies stored contents that failed to load somewhere later saves and
    /// backup rotation never touch. Returns where the copy went, if anywhere.
    fn preserve_unreadable(&self) -> Result<Option<PathBuf>, StorageError> {
        Ok(None)
    }
}
