use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{
    ids::{ColumnId, ProjectId, TaskId},
    models::{column::Column, project_type::ProjectType, task::Task},
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Identifier of the project
    pub id: ProjectId,
    /// Name of the project
    pub name: String,
    /// Description of the project
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Archetype the project was created from, embedded so stored data stays
    /// readable if the catalog changes
    #[serde(rename = "type")]
    pub project_type: ProjectType,
    /// Columns in storage order; display order comes from `Column::order`
    pub columns: Vec<Column>,
    pub created_at: Timestamp,
    /// Refreshed by every mutation of the project or anything inside it
    pub updated_at: Timestamp,
}

#[derive(Debug, Default, Clone)]
pub struct ProjectPatch {
    pub name: Option<String>,
    /// `Some(None)` clears the description
    pub description: Option<Option<String>>,
}

impl Project {
    pub fn is_todo(&self) -> bool {
        self.project_type.is_todo()
    }

    pub fn sorted_columns(&self) -> Vec<&Column> {
        let mut columns: Vec<&Column> = self.columns.iter().collect();
        columns.sort_by_key(|c| c.order);
        columns
    }

    pub fn sorted_column_ids(&self) -> Vec<ColumnId> {
        self.sorted_columns().iter().map(|c| c.id).collect()
    }

    /// Order value that places a new column after every existing one.
    pub fn next_column_order(&self) -> i32 {
        self.columns.iter().map(|c| c.order).max().map_or(0, |max| max + 1)
    }

    pub fn get_column(&self, column_id: ColumnId) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == column_id)
    }

    pub fn get_column_mut(&mut self, column_id: ColumnId) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.id == column_id)
    }

    /// The column holding `task_id` and the task itself.
    pub fn find_task(&self, task_id: TaskId) -> Option<(&Column, &Task)> {
        self.columns
            .iter()
            .find_map(|c| c.get_task(task_id).map(|t| (c, t)))
    }

    pub fn find_task_mut(&mut self, task_id: TaskId) -> Option<&mut Task> {
        self.columns
            .iter_mut()
            .flat_map(|c| c.tasks.iter_mut())
            .find(|t| t.id == task_id)
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.columns.iter().flat_map(|c| c.tasks.iter())
    }

    pub fn task_count(&self) -> usize {
        self.columns.iter().map(|c| c.tasks.len()).sum()
    }

    /// `(done, total)` task counts. To-do lists count checked tasks; boards
    /// count tasks sitting in a done column.
    pub fn progress(&self) -> (usize, usize) {
        let done = if self.is_todo() {
            self.tasks().filter(|t| t.completed).count()
        } else {
            self.columns
                .iter()
                .filter(|c| c.is_done_column())
                .map(|c| c.tasks.len())
                .sum()
        };
        (done, self.task_count())
    }

    pub(crate) fn apply(&mut self, patch: ProjectPatch) {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = patch.description {
            self.description = crate::models::task::non_blank(description);
        }
    }
}
