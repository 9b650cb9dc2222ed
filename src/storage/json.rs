use std::{
    fs::{self, OpenOptions, rename, write},
    path::{Path, PathBuf},
};

use fs2::FileExt;
use serde_json::to_string_pretty;
use uuid::Uuid;

use crate::{
    models::project::Project,
    storage::{STORAGE_SLOT, Storage, StorageError},
};

const BACKUPS_TO_KEEP: usize = 5;

pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// The well-known slot file inside `data_dir`.
    #[cfg(test)]
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(format!("{STORAGE_SLOT}.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn create_backup_dir(&self) -> Result<(), StorageError> {
        let backups_dir = self.get_backup_dir();
        fs::create_dir(&backups_dir).map_err(|e| StorageError::BackupFailed {
            path: backups_dir,
            source: e,
        })?;
        Ok(())
    }

    fn create_backup(&self) -> Result<u64, StorageError> {
        let file_exists = fs::exists(&self.path).map_err(|e| StorageError::BackupFailed {
            path: self.path.clone(),
            source: e,
        })?;
        if !file_exists {
            return Ok(0);
        }

        let backup_path = self.get_backup_path();
        match fs::copy(&self.path, &backup_path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.create_backup_dir()?;
                self.create_backup()
            }
            Err(e) => Err(StorageError::BackupFailed {
                path: backup_path,
                source: e,
            }),
            Ok(bytes) => Ok(bytes),
        }
    }

    fn cleanup_old_backups(&self) -> Result<(), StorageError> {
        let backup_dir = self.get_backup_dir();
        let backup_dir_exists =
            fs::exists(&backup_dir).map_err(|e| StorageError::CleanupFailed {
                dir: backup_dir.clone(),
                source: e,
            })?;
        if !backup_dir_exists {
            return Ok(());
        }

        let mut file_entries = fs::read_dir(&backup_dir)
            .map_err(|e| StorageError::CleanupFailed {
                dir: backup_dir.clone(),
                source: e,
            })?
            .flatten()
            .filter(|entry| entry.metadata().map(|m| m.is_file()).unwrap_or(false))
            .map(|entry| entry.path())
            .collect::<Vec<_>>();

        // Names end in a zero-padded timestamp, so lexical order is age order.
        file_entries.sort();

        let number_of_files_to_delete = file_entries.len().saturating_sub(BACKUPS_TO_KEEP);
        for file_path in &file_entries[..number_of_files_to_delete] {
            tracing::debug!(path = %file_path.display(), "removing old backup");
            fs::remove_file(file_path).map_err(|e| StorageError::CleanupFailed {
                dir: backup_dir.clone(),
                source: e,
            })?;
        }

        Ok(())
    }

    /// Lock, back up the current file and rename `temp_path` over it.
    fn replace_with(&self, temp_path: &Path) -> Result<(), StorageError> {
        let lock_file_path = self.path.with_extension("lock");
        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_file_path)
            .map_err(|e| StorageError::SaveFailed {
                path: lock_file_path.clone(),
                source: e,
            })?;
        lock_file
            .lock_exclusive()
            .map_err(|e| StorageError::SaveFailed {
                path: lock_file_path,
                source: e,
            })?;

        self.create_backup()?;
        self.cleanup_old_backups()?;

        rename(temp_path, &self.path).map_err(|e| StorageError::SaveFailed {
            path: self.path.clone(),
            source: e,
        })?;

        lock_file.unlock().map_err(|e| StorageError::SaveFailed {
            path: self.path.clone(),
            source: e,
        })
    }

    fn get_backup_dir(&self) -> PathBuf {
        let parent_store_path = self.path.parent().unwrap_or(Path::new("."));
        parent_store_path.join("backups")
    }

    fn get_backup_path(&self) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(STORAGE_SLOT);
        let nanos = jiff::Timestamp::now().as_nanosecond();

        self.get_backup_dir().join(format!("{stem}-{nanos:020}.json"))
    }
}

impl Storage for JsonFileStorage {
    fn load(&self) -> Result<Vec<Project>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let projects: Vec<Project> =
                    serde_json::from_str(&content).map_err(|e| StorageError::ParseFailed {
                        path: self.path.clone(),
                        source: e,
                    })?;
                tracing::debug!(
                    path = %self.path.display(),
                    projects = projects.len(),
                    "loaded projects"
                );
                Ok(projects)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(vec![]),
            Err(e) => Err(StorageError::LoadFailed {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    fn save(&self, projects: &[Project]) -> Result<(), StorageError> {
        let json =
            to_string_pretty(projects).map_err(|e| StorageError::SerializeFailed { source: e })?;

        let unique_temp = format!("{}.tmp.{}", self.path.display(), Uuid::new_v4());
        let temp_path = PathBuf::from(&unique_temp);
        let result = write(&temp_path, json)
            .map_err(|e| StorageError::SaveFailed {
                path: temp_path.clone(),
                source: e,
            })
            .and_then(|()| self.replace_with(&temp_path));

        if result.is_err() {
            discard_temp_file(&temp_path);
        }
        result?;

        tracing::debug!(
            path = %self.path.display(),
            projects = projects.len(),
            "saved projects"
        );
        Ok(())
    }

    fn preserve_unreadable(&self) -> Result<Option<PathBuf>, StorageError> {
        if !self.path.is_file() {
            return Ok(None);
        }
        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(STORAGE_SLOT);
        let nanos = jiff::Timestamp::now().as_nanosecond();
        let copy_path = self
            .path
            .with_file_name(format!("{stem}.unreadable-{nanos:020}.json"));

        fs::copy(&self.path, &copy_path).map_err(|e| StorageError::PreserveFailed {
            path: copy_path.clone(),
            source: e,
        })?;
        Ok(Some(copy_path))
    }
}

/// Removes the temp file of a failed save. The save error is the one reported.
fn discard_temp_file(temp_path: &Path) {
    match fs::remove_file(temp_path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %temp_path.display(), error = %e, "could not remove temp file");
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;

    use crate::{
        ids::ProjectId,
        models::{
            project_type::default_project_types,
            task::{CreateTaskParameters, Priority, Task},
        },
        services::ProjectStore,
    };

    fn sample_projects() -> Vec<Project> {
        let now = Timestamp::now();
        default_project_types()
            .into_iter()
            .map(|project_type| {
                let mut columns = project_type.seed_columns();
                columns[0].tasks.push(Task::from_parameters(
                    CreateTaskParameters {
                        description: Some("with details".to_string()),
                        priority: Priority::High,
                        assignee: Some("bea".to_string()),
                        due_date: Some(jiff::civil::date(2026, 1, 31)),
                        tags: vec!["x".to_string(), "x".to_string()],
                        ..CreateTaskParameters::titled("First")
                    },
                    now,
                ));
                Project {
                    id: ProjectId::generate(),
                    name: project_type.name.clone(),
                    description: Some("sample".to_string()),
                    columns,
                    project_type,
                    created_at: now,
                    updated_at: now,
                }
            })
            .collect()
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::in_dir(dir.path());
        let projects = sample_projects();

        if let Err(e) = storage.save(&projects) {
            panic!("Should correctly save the projects: {e}");
        }
        match storage.load() {
            Ok(loaded) => assert_eq!(loaded, projects),
            Err(e) => panic!("Should correctly load the saved projects: {e}"),
        }
    }

    #[test]
    fn test_slot_file_name() {
        let storage = JsonFileStorage::in_dir(Path::new("/data"));
        assert_eq!(storage.path(), Path::new("/data/kanban-projects.json"));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::in_dir(dir.path());

        assert!(storage.load().unwrap().is_empty());
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kanban-projects.json");
        fs::write(&path, "{ this is not valid json }").unwrap();

        let storage = JsonFileStorage::new(path);
        match storage.load() {
            Err(StorageError::ParseFailed { .. }) => {}
            _ => panic!("Expected ParseFailed error, got something else"),
        }
    }

    #[test]
    fn test_save_writes_a_bare_array() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::in_dir(dir.path());
        storage.save(&sample_projects()).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(storage.path()).unwrap()).unwrap();
        let array = raw.as_array().expect("top level should be an array");
        assert_eq!(array.len(), 4);
        assert!(array[0].get("createdAt").is_some());
    }

    #[test]
    fn test_backup_creation_and_cleanup() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::in_dir(dir.path());

        for _ in 1..=7 {
            storage.save(&sample_projects()).unwrap();
            std::thread::sleep(std::time::Duration::from_millis(10));
        }

        let backup_count = fs::read_dir(dir.path().join("backups"))
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.metadata().map(|m| m.is_file()).unwrap_or(false))
            .count();

        assert_eq!(backup_count, BACKUPS_TO_KEEP, "Should keep exactly 5 backups");
    }

    #[test]
    fn test_backup_directory_created_on_second_save() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::in_dir(dir.path());
        let backups_dir = dir.path().join("backups");

        storage.save(&[]).unwrap();
        assert!(
            !backups_dir.exists(),
            "Backups dir should not exist after first save"
        );

        storage.save(&sample_projects()).unwrap();
        assert!(backups_dir.is_dir(), "Backups dir should be created on second save");
    }

    fn temp_files_in(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.contains(".tmp."))
            .collect()
    }

    #[test]
    fn test_failed_save_removes_its_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::in_dir(dir.path());
        storage.save(&sample_projects()).unwrap();
        let before = fs::read_to_string(storage.path()).unwrap();

        // A directory where the lock file should be makes every save fail
        // after the temp file is written.
        fs::remove_file(dir.path().join("kanban-projects.lock")).unwrap();
        fs::create_dir(dir.path().join("kanban-projects.lock")).unwrap();

        for _ in 0..3 {
            assert!(matches!(
                storage.save(&[]),
                Err(StorageError::SaveFailed { .. })
            ));
        }

        assert_eq!(temp_files_in(dir.path()), Vec::<String>::new());
        assert_eq!(fs::read_to_string(storage.path()).unwrap(), before);
    }

    #[test]
    fn test_successful_save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::in_dir(dir.path());
        storage.save(&sample_projects()).unwrap();
        storage.save(&[]).unwrap();

        assert!(temp_files_in(dir.path()).is_empty());
    }

    #[test]
    fn test_unreadable_data_survives_backup_rotation() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::in_dir(dir.path());
        fs::write(storage.path(), "[{ half written").unwrap();

        let mut store = ProjectStore::open(storage);
        assert!(store.projects().is_empty());
        for i in 0..=BACKUPS_TO_KEEP + 1 {
            store
                .create_project(&format!("P{i}"), "", "todo")
                .unwrap();
            std::thread::sleep(std::time::Duration::from_millis(2));
        }

        let kept: Vec<PathBuf> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("kanban-projects.unreadable-"))
            })
            .collect();
        assert_eq!(kept.len(), 1);
        assert_eq!(fs::read_to_string(&kept[0]).unwrap(), "[{ half written");
    }

    #[test]
    fn test_preserve_without_stored_file_does_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::in_dir(dir.path());

        assert_eq!(storage.preserve_unreadable().unwrap(), None);
    }
}
