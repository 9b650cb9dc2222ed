use jiff::Timestamp;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::ids::TaskId;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Identifier of the task, never reassigned
    pub id: TaskId,
    /// Title of the task
    pub title: String,
    /// Free-form details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: Priority,
    /// Who is working on the task
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Date>,
    /// Tags of the task, in the order they were added
    #[serde(default)]
    pub tags: Vec<String>,
    /// Check box state, only shown for to-do projects
    #[serde(default)]
    pub completed: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(
    Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// Everything a caller chooses when creating a task. Ids and timestamps are
/// assigned by the store.
#[derive(Debug, Default, Clone)]
pub struct CreateTaskParameters {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub assignee: Option<String>,
    pub due_date: Option<Date>,
    pub tags: Vec<String>,
    pub completed: bool,
}

impl CreateTaskParameters {
    #[cfg(test)]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Partial update of a task. `None` leaves a field untouched; for optional
/// fields `Some(None)` clears the value.
#[derive(Debug, Default, Clone)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<Priority>,
    pub assignee: Option<Option<String>>,
    pub due_date: Option<Option<Date>>,
    pub tags: Option<Vec<String>>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.assignee.is_none()
            && self.due_date.is_none()
            && self.tags.is_none()
            && self.completed.is_none()
    }
}

impl Task {
    pub fn from_parameters(parameters: CreateTaskParameters, now: Timestamp) -> Self {
        Task {
            id: TaskId::generate(),
            title: parameters.title.trim().to_string(),
            description: non_blank(parameters.description),
            priority: parameters.priority,
            assignee: non_blank(parameters.assignee),
            due_date: parameters.due_date,
            tags: parameters.tags,
            completed: parameters.completed,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merges `patch` into the task. The title must already be validated.
    pub fn apply(&mut self, patch: TaskPatch, now: Timestamp) {
        if let Some(title) = patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            self.description = non_blank(description);
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(assignee) = patch.assignee {
            self.assignee = non_blank(assignee);
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        self.updated_at = now;
    }

    pub fn is_overdue(&self, today: Date) -> bool {
        !self.completed && self.due_date.is_some_and(|due| due < today)
    }
}

/// Trims optional text, treating blank input as absent.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
