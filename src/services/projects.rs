use jiff::Timestamp;
use thiserror::Error;

use crate::{
    ids::ProjectId,
    models::{
        project::{Project, ProjectPatch},
        task::non_blank,
    },
    services::ProjectStore,
    storage::{Storage, StorageError},
};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Project name cannot be empty")]
    EmptyName,

    #[error("Unknown project type '{0}'")]
    UnknownProjectType(String),

    #[error("Project '{0}' not found")]
    ProjectNotFound(ProjectId),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl<S: Storage> ProjectStore<S> {
    /// Creates a project seeded from the `type_id` template and appends it.
    /// It becomes the active project when none is active.
    pub fn create_project(
        &mut self,
        name: &str,
        description: &str,
        type_id: &str,
    ) -> Result<Project, ProjectError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProjectError::EmptyName);
        }
        let project_type = self
            .project_type(type_id)
            .ok_or_else(|| ProjectError::UnknownProjectType(type_id.to_string()))?
            .clone();

        let now = Timestamp::now();
        let project = Project {
            id: ProjectId::generate(),
            name: name.to_string(),
            description: non_blank(Some(description.to_string())),
            columns: project_type.seed_columns(),
            project_type,
            created_at: now,
            updated_at: now,
        };

        tracing::info!(project_id = %project.id, project_type = type_id, "created project");
        self.store.add_project(project.clone());
        if self.store.current_project_id.is_none() {
            self.store.current_project_id = Some(project.id);
        }
        self.persist()?;

        Ok(project)
    }

    pub fn update_project(
        &mut self,
        project_id: ProjectId,
        patch: ProjectPatch,
    ) -> Result<Project, ProjectError> {
        if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(ProjectError::EmptyName);
        }
        self.commit(
            project_id,
            || ProjectError::ProjectNotFound(project_id),
            |project, _| {
                project.apply(patch);
                Ok(())
            },
        )?;
        tracing::debug!(project_id = %project_id, "updated project");

        self.project(project_id)
            .cloned()
            .ok_or(ProjectError::ProjectNotFound(project_id))
    }

    /// Removes the project with its columns and tasks.
    pub fn delete_project(&mut self, project_id: ProjectId) -> Result<Project, ProjectError> {
        let project = self
            .store
            .remove_project(project_id)
            .ok_or(ProjectError::ProjectNotFound(project_id))?;

        tracing::info!(
            project_id = %project_id,
            tasks = project.task_count(),
            "deleted project"
        );
        self.persist()?;

        Ok(project)
    }

    /// Selects the active project. Does not touch the project list or storage.
    pub fn set_current_project(&mut self, project_id: Option<ProjectId>) -> Result<(), ProjectError> {
        if let Some(id) = project_id
            && self.project(id).is_none()
        {
            return Err(ProjectError::ProjectNotFound(id));
        }
        self.store.current_project_id = project_id;
        Ok(())
    }
}
