use std::collections::HashSet;

use thiserror::Error;

use crate::{
    ids::ColumnId,
    models::column::{Column, ColumnPatch, CreateColumnParameters},
    services::ProjectStore,
    storage::{Storage, StorageError},
};

#[derive(Debug, Error)]
pub enum ColumnError {
    #[error("No project is open")]
    NoActiveProject,

    #[error("Column title cannot be empty")]
    EmptyTitle,

    #[error("Column '{0}' not found in the open project")]
    ColumnNotFound(ColumnId),

    #[error("'{0}' is the last column of the project and cannot be deleted")]
    LastColumn(String),

    #[error("Project '{0}' is a to-do list and keeps a single column")]
    SingleColumnProject(String),

    #[error("Column order must list every column of the project exactly once")]
    InvalidColumnOrder,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl<S: Storage> ProjectStore<S> {
    pub fn create_column(&mut self, parameters: CreateColumnParameters) -> Result<Column, ColumnError> {
        if parameters.title.trim().is_empty() {
            return Err(ColumnError::EmptyTitle);
        }

        let column = self.commit_current(
            || ColumnError::NoActiveProject,
            |project, _| {
                if project.is_todo() {
                    return Err(ColumnError::SingleColumnProject(project.name.clone()));
                }
                let column = Column::from_parameters(parameters);
                project.columns.push(column.clone());
                Ok(column)
            },
        )?;

        tracing::debug!(column_id = %column.id, order = column.order, "created column");
        Ok(column)
    }

    pub fn update_column(&mut self, column_id: ColumnId, patch: ColumnPatch) -> Result<Column, ColumnError> {
        if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(ColumnError::EmptyTitle);
        }

        let column = self.commit_current(
            || ColumnError::NoActiveProject,
            |project, _| {
                let column = project
                    .get_column_mut(column_id)
                    .ok_or(ColumnError::ColumnNotFound(column_id))?;
                column.apply(patch);
                Ok(column.clone())
            },
        )?;

        tracing::debug!(column_id = %column_id, "updated column");
        Ok(column)
    }

    /// Removes the column together with its tasks. A project always keeps at
    /// least one column.
    pub fn delete_column(&mut self, column_id: ColumnId) -> Result<Column, ColumnError> {
        let column = self.commit_current(
            || ColumnError::NoActiveProject,
            |project, _| {
                let index = project
                    .columns
                    .iter()
                    .position(|c| c.id == column_id)
                    .ok_or(ColumnError::ColumnNotFound(column_id))?;
                if project.columns.len() == 1 {
                    return Err(ColumnError::LastColumn(project.columns[index].title.clone()));
                }
                Ok(project.columns.remove(index))
            },
        )?;

        tracing::info!(
            column_id = %column_id,
            tasks = column.tasks.len(),
            "deleted column"
        );
        Ok(column)
    }

    /// Rewrites column order to match `ordered_ids`, which must be a
    /// permutation of the active project's column ids. Orders become 0..N-1.
    pub fn reorder_columns(&mut self, ordered_ids: &[ColumnId]) -> Result<(), ColumnError> {
        self.commit_current(
            || ColumnError::NoActiveProject,
            |project, _| {
                let existing: HashSet<ColumnId> = project.columns.iter().map(|c| c.id).collect();
                let requested: HashSet<ColumnId> = ordered_ids.iter().copied().collect();
                if ordered_ids.len() != project.columns.len()
                    || requested.len() != ordered_ids.len()
                    || requested != existing
                {
                    return Err(ColumnError::InvalidColumnOrder);
                }

                let mut columns = std::mem::take(&mut project.columns);
                for (order, id) in (0..).zip(ordered_ids) {
                    if let Some(index) = columns.iter().position(|c| c.id == *id) {
                        let mut column = columns.swap_remove(index);
                        column.order = order;
                        project.columns.push(column);
                    }
                }
                Ok(())
            },
        )?;

        tracing::debug!(columns = ordered_ids.len(), "reordered columns");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::{
        models::{color::Color, task::CreateTaskParameters},
        services::test_support::*,
    };

    fn new_column(title: &str, order: i32) -> CreateColumnParameters {
        CreateColumnParameters {
            title: title.to_string(),
            color: Color::Pink,
            order,
        }
    }

    #[test]
    fn test_create_column_appends_at_next_order() {
        let mut store = store_with_project("estudos");
        let order = store.current_project().unwrap().next_column_order();

        let column = store.create_column(new_column("  Arquivado ", order)).unwrap();

        assert_eq!(column.title, "Arquivado");
        assert_eq!(column.order, 4);
        assert!(column.tasks.is_empty());
        let project = store.current_project().unwrap();
        assert_eq!(column_titles(project).last().map(String::as_str), Some("Arquivado"));
    }

    #[test]
    fn test_create_column_failures() {
        let mut store = empty_store();
        assert!(matches!(
            store.create_column(new_column("X", 0)),
            Err(ColumnError::NoActiveProject)
        ));

        let mut store = store_with_project("estudos");
        assert!(matches!(
            store.create_column(new_column(" ", 4)),
            Err(ColumnError::EmptyTitle)
        ));

        let mut todo = store_with_project("todo");
        assert!(matches!(
            todo.create_column(new_column("Second", 1)),
            Err(ColumnError::SingleColumnProject(_))
        ));
        assert_eq!(todo.current_project().unwrap().columns.len(), 1);
    }

    #[test]
    fn test_update_column_renames_and_recolors() {
        let mut store = store_with_project("leituras");
        let id = store.current_project().unwrap().sorted_column_ids()[2];

        let updated = store
            .update_column(
                id,
                ColumnPatch {
                    title: Some("Em pausa".to_string()),
                    color: Some(Color::Yellow),
                },
            )
            .unwrap();

        assert_eq!(updated.title, "Em pausa");
        assert_eq!(updated.color, Color::Yellow);
        assert_eq!(updated.order, 2);
        assert!(matches!(
            store.update_column(ColumnId::generate(), ColumnPatch::default()),
            Err(ColumnError::ColumnNotFound(_))
        ));
        assert!(matches!(
            store.update_column(
                id,
                ColumnPatch {
                    title: Some(String::new()),
                    ..ColumnPatch::default()
                }
            ),
            Err(ColumnError::EmptyTitle)
        ));
    }

    #[test]
    fn test_delete_column_removes_its_tasks() {
        let mut store = store_with_project("estudos");
        let cols = store.current_project().unwrap().sorted_column_ids();
        for (i, col) in [0, 1, 1, 2, 1].iter().enumerate() {
            store
                .create_task(cols[*col], CreateTaskParameters::titled(format!("t{i}")))
                .unwrap();
        }
        let before = store.current_project().unwrap().task_count();

        let removed = store.delete_column(cols[1]).unwrap();

        let project = store.current_project().unwrap();
        assert_eq!(removed.tasks.len(), 3);
        assert_eq!(project.task_count(), before - removed.tasks.len());
        assert!(project.get_column(cols[1]).is_none());
    }

    #[test]
    fn test_last_column_cannot_be_deleted() {
        let mut store = store_with_project("todo");
        let only = store.current_project().unwrap().columns[0].id;

        assert!(matches!(
            store.delete_column(only),
            Err(ColumnError::LastColumn(title)) if title == "Tarefas"
        ));

        let mut board = store_with_project("estudos");
        let cols = board.current_project().unwrap().sorted_column_ids();
        for id in &cols[..3] {
            board.delete_column(*id).unwrap();
        }
        assert!(matches!(
            board.delete_column(cols[3]),
            Err(ColumnError::LastColumn(_))
        ));
    }

    #[test]
    fn test_reorder_columns_assigns_dense_orders() {
        let mut store = store_with_project("programacao");
        let cols = store.current_project().unwrap().sorted_column_ids();
        let wanted = vec![cols[4], cols[0], cols[3], cols[1], cols[2]];

        store.reorder_columns(&wanted).unwrap();

        let project = store.current_project().unwrap();
        assert_eq!(project.sorted_column_ids(), wanted);
        let orders: Vec<i32> = project.columns.iter().map(|c| c.order).collect();
        assert_eq!(orders, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_reorder_columns_rejects_non_permutations() {
        let mut store = store_with_project("estudos");
        let cols = store.current_project().unwrap().sorted_column_ids();
        let snapshot = store.current_project().unwrap().clone();

        for bad in [
            vec![cols[0], cols[1], cols[2]],
            vec![cols[0], cols[1], cols[2], cols[2]],
            vec![cols[0], cols[1], cols[2], ColumnId::generate()],
            vec![cols[0], cols[1], cols[2], cols[3], cols[0]],
        ] {
            assert!(matches!(
                store.reorder_columns(&bad),
                Err(ColumnError::InvalidColumnOrder)
            ));
        }
        assert_eq!(store.current_project(), Some(&snapshot));
    }

    proptest! {
        #[test]
        fn prop_reorder_columns_reproduces_permutation(
            permutation in Just((0..5usize).collect::<Vec<_>>()).prop_shuffle()
        ) {
            let mut store = store_with_project("programacao");
            let cols = store.current_project().unwrap().sorted_column_ids();
            let wanted: Vec<ColumnId> = permutation.iter().map(|i| cols[*i]).collect();

            store.reorder_columns(&wanted).unwrap();

            prop_assert_eq!(store.current_project().unwrap().sorted_column_ids(), wanted);
        }
    }
}
