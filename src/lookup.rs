//! Resolves what the user typed on the command line to a single entity.
//!
//! A query matches by id (the full id, or its trailing hex digits as printed
//! by listings, at least four of them) or by name. An exact, accent-insensitive
//! name beats a substring match, so "Todo" picks the "Todo" column even when
//! "Todo urgente" also exists.

use thiserror::Error;

use crate::{
    ids::TaskId,
    models::{column::Column, project::Project, store::matches_query, task::Task},
    services::drag::{DropLocation, DropResult},
};

const MIN_ID_DIGITS: usize = 4;

#[derive(Debug, Error, PartialEq)]
pub enum LookupError {
    #[error("'{0}' did not match anything")]
    NotFound(String),

    #[error("'{query}' is ambiguous")]
    Ambiguous {
        query: String,
        candidates: Vec<String>,
    },
}

pub fn find_project<'a>(projects: &'a [Project], query: &str) -> Result<&'a Project, LookupError> {
    resolve(projects.iter(), query, |p| p.id.to_string(), |p| p.name.as_str())
}

/// Looks among the columns of `project`, in board order.
pub fn find_column<'a>(project: &'a Project, query: &str) -> Result<&'a Column, LookupError> {
    resolve(
        project.sorted_columns().into_iter(),
        query,
        |c| c.id.to_string(),
        |c| c.title.as_str(),
    )
}

/// Looks across every column of `project`. Returns the task with the
/// column that holds it and its index there.
pub fn find_task<'a>(project: &'a Project, query: &str) -> Result<TaskLocation<'a>, LookupError> {
    let located: Vec<TaskLocation<'a>> = project
        .sorted_columns()
        .into_iter()
        .flat_map(|column| {
            column
                .tasks
                .iter()
                .enumerate()
                .map(move |(index, task)| TaskLocation {
                    column,
                    index,
                    task,
                })
        })
        .collect();

    resolve(
        located.into_iter(),
        query,
        |l| l.task.id.to_string(),
        |l| l.task.title.as_str(),
    )
}

#[derive(Debug, Clone, Copy)]
pub struct TaskLocation<'a> {
    pub column: &'a Column,
    pub index: usize,
    pub task: &'a Task,
}

impl TaskLocation<'_> {
    pub fn task_id(&self) -> TaskId {
        self.task.id
    }

    /// The drop that lands this task at `position` (counted from 1) of
    /// `destination`, or at its end when `position` is `None`. Inside the
    /// task's own column the end is the last slot, so a task that is already
    /// there yields a no-op drop.
    pub fn drop_onto(&self, destination: &Column, position: Option<usize>) -> DropResult {
        let last = if destination.id == self.column.id {
            destination.tasks.len().saturating_sub(1)
        } else {
            destination.tasks.len()
        };
        let index = position.map_or(last, |p| p.saturating_sub(1).min(last));

        DropResult::Task {
            task_id: self.task.id,
            source: DropLocation {
                column_id: self.column.id,
                index: self.index,
            },
            destination: Some(DropLocation {
                column_id: destination.id,
                index,
            }),
        }
    }
}

fn resolve<T>(
    items: impl Iterator<Item = T>,
    query: &str,
    id_of: impl Fn(&T) -> String,
    name_of: impl for<'n> Fn(&'n T) -> &'n str,
) -> Result<T, LookupError> {
    let query = query.trim();
    let items: Vec<T> = items.collect();

    let needle = query.to_lowercase().replace('-', "");
    if needle.len() >= MIN_ID_DIGITS && needle.chars().all(|c| c.is_ascii_hexdigit()) {
        let by_id: Vec<usize> = (0..items.len())
            .filter(|&i| id_of(&items[i]).replace('-', "").ends_with(&needle))
            .collect();
        if !by_id.is_empty() {
            return pick(items, by_id, query, &name_of);
        }
    }

    let wanted = slug::slugify(query);
    let exact: Vec<usize> = (0..items.len())
        .filter(|&i| !wanted.is_empty() && slug::slugify(name_of(&items[i])) == wanted)
        .collect();
    if !exact.is_empty() {
        return pick(items, exact, query, &name_of);
    }

    let partial: Vec<usize> = (0..items.len())
        .filter(|&i| !wanted.is_empty() && matches_query(name_of(&items[i]), query))
        .collect();
    pick(items, partial, query, &name_of)
}

fn pick<T>(
    mut items: Vec<T>,
    matches: Vec<usize>,
    query: &str,
    name_of: &impl for<'n> Fn(&'n T) -> &'n str,
) -> Result<T, LookupError> {
    match matches.as_slice() {
        [] => Err(LookupError::NotFound(query.to_string())),
        [only] => Ok(items.swap_remove(*only)),
        many => Err(LookupError::Ambiguous {
            query: query.to_string(),
            candidates: many.iter().map(|&i| name_of(&items[i]).to_string()).collect(),
        }),
    }
}
