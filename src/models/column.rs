use serde::{Deserialize, Serialize};

use crate::{
    ids::{ColumnId, TaskId},
    models::{color::Color, task::Task},
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
    pub color: Color,
    /// Left-to-right position within the project
    pub order: i32,
    /// Tasks in display order, top to bottom
    #[serde(default)]
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone)]
pub struct CreateColumnParameters {
    pub title: String,
    pub color: Color,
    /// Callers append with `Project::next_column_order`
    pub order: i32,
}

#[derive(Debug, Default, Clone)]
pub struct ColumnPatch {
    pub title: Option<String>,
    pub color: Option<Color>,
}

impl Column {
    pub fn from_parameters(parameters: CreateColumnParameters) -> Self {
        Column {
            id: ColumnId::generate(),
            title: parameters.title.trim().to_string(),
            color: parameters.color,
            order: parameters.order,
            tasks: vec![],
        }
    }

    pub fn apply(&mut self, patch: ColumnPatch) {
        if let Some(title) = patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
    }

    pub fn position_of(&self, task_id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == task_id)
    }

    pub fn get_task(&self, task_id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    /// Completed and open tasks of a to-do list, each keeping list order.
    pub fn partition_by_completion(&self) -> (Vec<&Task>, Vec<&Task>) {
        self.tasks.iter().partition(|t| t.completed)
    }

    /// Columns whose title marks finished work ("Concluído", "Finalizado").
    pub fn is_done_column(&self) -> bool {
        let slug = slug::slugify(&self.title);
        slug.contains("conclu") || slug.contains("finaliz")
    }

    /// Removes the task at `task_id` and reinserts it at `new_index`, clamped to
    /// the end of the list. Returns `false` when the task is not in this column.
    pub(crate) fn reposition(&mut self, task_id: TaskId, new_index: usize) -> bool {
        let Some(current) = self.position_of(task_id) else {
            return false;
        };
        let task = self.tasks.remove(current);
        let index = new_index.min(self.tasks.len());
        self.tasks.insert(index, task);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::CreateTaskParameters;

    fn column_with(titles: &[&str]) -> Column {
        let mut column = Column::from_parameters(CreateColumnParameters {
            title: "Backlog".to_string(),
            color: Color::Gray,
            order: 0,
        });
        let now = jiff::Timestamp::now();
        column.tasks = titles
            .iter()
            .map(|t| Task::from_parameters(CreateTaskParameters::titled(*t), now))
            .collect();
        column
    }

    fn titles(column: &Column) -> Vec<&str> {
        column.tasks.iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn test_reposition_moves_within_list() {
        let mut column = column_with(&["a", "b", "c"]);
        let a = column.tasks[0].id;

        assert!(column.reposition(a, 2));
        assert_eq!(titles(&column), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_reposition_clamps_index() {
        let mut column = column_with(&["a", "b", "c"]);
        let b = column.tasks[1].id;

        assert!(column.reposition(b, 99));
        assert_eq!(titles(&column), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_reposition_same_index_keeps_list() {
        let mut column = column_with(&["a", "b", "c"]);
        let b = column.tasks[1].id;

        assert!(column.reposition(b, 1));
        assert_eq!(titles(&column), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_reposition_unknown_task() {
        let mut column = column_with(&["a"]);
        assert!(!column.reposition(TaskId::generate(), 0));
        assert_eq!(titles(&column), vec!["a"]);
    }

    #[test]
    fn test_is_done_column_ignores_accents_and_case() {
        let mut column = column_with(&[]);
        for title in ["Concluído", "CONCLUIDO", "Finalizado"] {
            column.title = title.to_string();
            assert!(column.is_done_column(), "{title} should count as done");
        }
        column.title = "Em Progresso".to_string();
        assert!(!column.is_done_column());
    }

    #[test]
    fn test_partition_by_completion() {
        let mut column = column_with(&["a", "b", "c"]);
        column.tasks[1].completed = true;

        let (done, open) = column.partition_by_completion();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].title, "b");
        assert_eq!(open.iter().map(|t| t.title.as_str()).collect::<Vec<_>>(), vec!["a", "c"]);
    }
}
