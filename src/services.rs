use jiff::Timestamp;

use crate::{
    ids::ProjectId,
    models::{
        project::Project,
        project_type::{ProjectType, default_project_types},
        store::{ProjectMode, Store},
    },
    storage::{Storage, StorageError},
};

pub mod columns;
pub mod drag;
pub mod projects;
pub mod tasks;

/// The context object behind every view: owns the project state, the
/// project type catalog and the storage mirror.
///
/// Every mutation runs to completion on the in-memory state, refreshes the
/// affected project's `updated_at` and then writes the whole collection
/// through `S`. Failed validations leave the state untouched. A failed write
/// is returned to the caller but the in-memory change stands; the next
/// successful write mirrors it.
pub struct ProjectStore<S: Storage> {
    store: Store,
    project_types: Vec<ProjectType>,
    storage: S,
}

impl<S: Storage> ProjectStore<S> {
    /// Loads the stored projects. Unreadable data degrades to an empty list
    /// after the storage has set a copy of it aside.
    pub fn open(storage: S) -> Self {
        let projects = match storage.load() {
            Ok(projects) => projects,
            Err(e) => {
                tracing::warn!(error = %e, "stored projects are unreadable, starting empty");
                match storage.preserve_unreadable() {
                    Ok(Some(path)) => {
                        tracing::warn!(path = %path.display(), "kept a copy of the unreadable data");
                    }
                    Ok(None) => {}
                    Err(e) => tracing::error!(error = %e, "could not keep the unreadable data"),
                }
                vec![]
            }
        };
        Self {
            store: Store::from_projects(projects),
            project_types: default_project_types(),
            storage,
        }
    }

    pub fn projects(&self) -> &[Project] {
        &self.store.projects
    }

    pub fn project_types(&self) -> &[ProjectType] {
        &self.project_types
    }

    pub fn project_type(&self, type_id: &str) -> Option<&ProjectType> {
        self.project_types.iter().find(|t| t.id == type_id)
    }

    pub fn project(&self, project_id: ProjectId) -> Option<&Project> {
        self.store.get_project(project_id)
    }

    pub fn current_project(&self) -> Option<&Project> {
        self.store.current_project()
    }

    pub fn search_projects<'a>(
        &'a self,
        query: &'a str,
        mode: ProjectMode,
    ) -> impl Iterator<Item = &'a Project> + 'a {
        self.store.search_projects(query, mode)
    }

    #[cfg(test)]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn persist(&self) -> Result<(), StorageError> {
        self.storage.save(&self.store.projects).inspect_err(|e| {
            tracing::error!(error = %e, "failed to write projects, in-memory state is ahead of storage");
        })
    }

    /// Funnel for every project mutation. `mutate` must validate before it
    /// changes anything; on success the project's `updated_at` is refreshed
    /// and the collection is written through.
    fn commit<T, E>(
        &mut self,
        project_id: ProjectId,
        missing: impl FnOnce() -> E,
        mutate: impl FnOnce(&mut Project, Timestamp) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<StorageError>,
    {
        let now = Timestamp::now();
        let project = self.store.get_project_mut(project_id).ok_or_else(missing)?;
        let value = mutate(project, now)?;
        project.updated_at = now;
        self.persist()?;
        Ok(value)
    }

    /// Same as `commit`, for the active project.
    fn commit_current<T, E>(
        &mut self,
        no_active: impl Fn() -> E,
        mutate: impl FnOnce(&mut Project, Timestamp) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<StorageError>,
    {
        let project_id = self.store.current_project_id.ok_or_else(&no_active)?;
        self.commit(project_id, no_active, mutate)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::storage::memory::MemoryStorage;

    pub fn empty_store() -> ProjectStore<MemoryStorage> {
        ProjectStore::open(MemoryStorage::new())
    }

    /// A store with one active project of `type_id`.
    pub fn store_with_project(type_id: &str) -> ProjectStore<MemoryStorage> {
        let mut store = empty_store();
        store
            .create_project("Sample", "", type_id)
            .expect("catalog type should exist");
        store
    }

    pub fn column_titles(project: &Project) -> Vec<String> {
        project
            .sorted_columns()
            .iter()
            .map(|c| c.title.clone())
            .collect()
    }

    pub fn pause() {
        std::thread::sleep(std::time::Duration::from_millis(2));
    }
}
