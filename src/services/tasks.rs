use thiserror::Error;

use crate::{
    ids::{ColumnId, TaskId},
    models::task::{CreateTaskParameters, Task, TaskPatch},
    services::ProjectStore,
    storage::{Storage, StorageError},
};

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("No project is open")]
    NoActiveProject,

    #[error("Task title cannot be empty")]
    EmptyTitle,

    #[error("Column '{0}' not found in the open project")]
    ColumnNotFound(ColumnId),

    #[error("Task '{0}' not found in the open project")]
    TaskNotFound(TaskId),

    #[error("Task '{task_id}' is not in column '{column_id}'")]
    TaskNotInColumn { task_id: TaskId, column_id: ColumnId },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl<S: Storage> ProjectStore<S> {
    /// Appends a new task to the end of `column_id` in the active project.
    pub fn create_task(
        &mut self,
        column_id: ColumnId,
        parameters: CreateTaskParameters,
    ) -> Result<Task, TaskError> {
        if parameters.title.trim().is_empty() {
            return Err(TaskError::EmptyTitle);
        }

        let task = self.commit_current(
            || TaskError::NoActiveProject,
            |project, now| {
                let column = project
                    .get_column_mut(column_id)
                    .ok_or(TaskError::ColumnNotFound(column_id))?;
                let task = Task::from_parameters(parameters, now);
                column.tasks.push(task.clone());
                Ok(task)
            },
        )?;

        tracing::debug!(task_id = %task.id, column_id = %column_id, "created task");
        Ok(task)
    }

    pub fn update_task(&mut self, task_id: TaskId, patch: TaskPatch) -> Result<Task, TaskError> {
        if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(TaskError::EmptyTitle);
        }

        let task = self.commit_current(
            || TaskError::NoActiveProject,
            |project, now| {
                let task = project
                    .find_task_mut(task_id)
                    .ok_or(TaskError::TaskNotFound(task_id))?;
                task.apply(patch, now);
                Ok(task.clone())
            },
        )?;

        tracing::debug!(task_id = %task_id, "updated task");
        Ok(task)
    }

    /// Flips the check box of a to-do item.
    pub fn toggle_task(&mut self, task_id: TaskId) -> Result<Task, TaskError> {
        let completed = self
            .current_project()
            .ok_or(TaskError::NoActiveProject)?
            .find_task(task_id)
            .map(|(_, task)| task.completed)
            .ok_or(TaskError::TaskNotFound(task_id))?;

        self.update_task(
            task_id,
            TaskPatch {
                completed: Some(!completed),
                ..TaskPatch::default()
            },
        )
    }

    /// Removes the task from whichever column holds it.
    pub fn delete_task(&mut self, task_id: TaskId) -> Result<Task, TaskError> {
        let task = self.commit_current(
            || TaskError::NoActiveProject,
            |project, _| {
                project
                    .columns
                    .iter_mut()
                    .find_map(|column| {
                        column
                            .position_of(task_id)
                            .map(|index| column.tasks.remove(index))
                    })
                    .ok_or(TaskError::TaskNotFound(task_id))
            },
        )?;

        tracing::debug!(task_id = %task_id, "deleted task");
        Ok(task)
    }

    /// Cuts the task out of `from_column_id` and inserts it into
    /// `to_column_id` at `new_index`, clamped to the destination length.
    /// Both columns are checked before anything moves.
    pub fn move_task(
        &mut self,
        task_id: TaskId,
        from_column_id: ColumnId,
        to_column_id: ColumnId,
        new_index: usize,
    ) -> Result<(), TaskError> {
        if from_column_id == to_column_id {
            return self.reorder_task(task_id, from_column_id, new_index);
        }

        self.commit_current(
            || TaskError::NoActiveProject,
            |project, _| {
                if project.get_column(to_column_id).is_none() {
                    return Err(TaskError::ColumnNotFound(to_column_id));
                }
                let source = project
                    .get_column_mut(from_column_id)
                    .ok_or(TaskError::ColumnNotFound(from_column_id))?;
                let index = source.position_of(task_id).ok_or(TaskError::TaskNotInColumn {
                    task_id,
                    column_id: from_column_id,
                })?;
                let task = source.tasks.remove(index);

                // Checked above, the destination exists.
                if let Some(destination) = project.get_column_mut(to_column_id) {
                    let index = new_index.min(destination.tasks.len());
                    destination.tasks.insert(index, task);
                }
                Ok(())
            },
        )?;

        tracing::debug!(
            task_id = %task_id,
            from = %from_column_id,
            to = %to_column_id,
            index = new_index,
            "moved task"
        );
        Ok(())
    }

    /// Repositions a task inside its column.
    pub fn reorder_task(
        &mut self,
        task_id: TaskId,
        column_id: ColumnId,
        new_index: usize,
    ) -> Result<(), TaskError> {
        self.commit_current(
            || TaskError::NoActiveProject,
            |project, _| {
                let column = project
                    .get_column_mut(column_id)
                    .ok_or(TaskError::ColumnNotFound(column_id))?;
                if column.reposition(task_id, new_index) {
                    Ok(())
                } else {
                    Err(TaskError::TaskNotInColumn { task_id, column_id })
                }
            },
        )?;

        tracing::debug!(task_id = %task_id, column_id = %column_id, index = new_index, "reordered task");
        Ok(())
    }
}
