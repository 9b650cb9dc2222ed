//! Translation of a finished drag gesture into a single store operation.
//!
//! Intermediate drag states never reach the store: only the drop, carrying
//! where the item came from and where it landed.

use thiserror::Error;

use crate::{
    ids::{ColumnId, TaskId},
    services::{ProjectStore, columns::ColumnError, tasks::TaskError},
    storage::Storage,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropLocation {
    pub column_id: ColumnId,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropResult {
    /// A column header dragged along the board; indices are positions in the
    /// order-sorted column list.
    Column {
        source_index: usize,
        destination_index: Option<usize>,
    },
    Task {
        task_id: TaskId,
        source: DropLocation,
        destination: Option<DropLocation>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// Dropped outside any target, or back where it started.
    Ignored,
    ColumnsReordered,
    TaskReordered,
    TaskMoved,
}

#[derive(Debug, Error)]
pub enum DropError {
    #[error("No project is open")]
    NoActiveProject,

    #[error("No column at position {0}")]
    ColumnIndexOutOfRange(usize),

    #[error(transparent)]
    Column(#[from] ColumnError),

    #[error(transparent)]
    Task(#[from] TaskError),
}

impl<S: Storage> ProjectStore<S> {
    pub fn apply_drop(&mut self, drop: DropResult) -> Result<DropOutcome, DropError> {
        match drop {
            DropResult::Column {
                destination_index: None,
                ..
            }
            | DropResult::Task {
                destination: None, ..
            } => Ok(DropOutcome::Ignored),

            DropResult::Column {
                source_index,
                destination_index: Some(destination_index),
            } => {
                if source_index == destination_index {
                    return Ok(DropOutcome::Ignored);
                }
                let mut ids = self
                    .current_project()
                    .ok_or(DropError::NoActiveProject)?
                    .sorted_column_ids();
                if source_index >= ids.len() {
                    return Err(DropError::ColumnIndexOutOfRange(source_index));
                }
                let moved = ids.remove(source_index);
                ids.insert(destination_index.min(ids.len()), moved);

                self.reorder_columns(&ids)?;
                Ok(DropOutcome::ColumnsReordered)
            }

            DropResult::Task {
                task_id,
                source,
                destination: Some(destination),
            } => {
                if source == destination {
                    Ok(DropOutcome::Ignored)
                } else if source.column_id == destination.column_id {
                    self.reorder_task(task_id, source.column_id, destination.index)?;
                    Ok(DropOutcome::TaskReordered)
                } else {
                    self.move_task(
                        task_id,
                        source.column_id,
                        destination.column_id,
                        destination.index,
                    )?;
                    Ok(DropOutcome::TaskMoved)
                }
            }
        }
    }
}
