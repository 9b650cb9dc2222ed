use serde::{Deserialize, Serialize};

use crate::{
    ids::ColumnId,
    models::{color::Color, column::Column},
};

/// Id of the archetype whose projects are a single flat task list.
pub const TODO_TYPE_ID: &str = "todo";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectType {
    pub id: String,
    pub name: String,
    /// Icon name understood by the presentation layer
    pub icon: String,
    pub color: Color,
    pub default_columns: Vec<ColumnTemplate>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ColumnTemplate {
    pub title: String,
    pub color: Color,
    pub order: i32,
}

impl ProjectType {
    pub fn is_todo(&self) -> bool {
        self.id == TODO_TYPE_ID
    }

    /// Fresh columns for a new project: new ids, empty task lists.
    pub fn seed_columns(&self) -> Vec<Column> {
        self.default_columns
            .iter()
            .map(|template| Column {
                id: ColumnId::generate(),
                title: template.title.clone(),
                color: template.color,
                order: template.order,
                tasks: vec![],
            })
            .collect()
    }
}

fn archetype(
    id: &str,
    name: &str,
    icon: &str,
    color: Color,
    columns: &[(&str, Color)],
) -> ProjectType {
    ProjectType {
        id: id.to_string(),
        name: name.to_string(),
        icon: icon.to_string(),
        color,
        default_columns: columns
            .iter()
            .zip(0..)
            .map(|((title, color), order)| ColumnTemplate {
                title: title.to_string(),
                color: *color,
                order,
            })
            .collect(),
    }
}

/// The predefined catalog: three kanban archetypes and the to-do list.
pub fn default_project_types() -> Vec<ProjectType> {
    vec![
        archetype(
            "estudos",
            "Estudos",
            "book",
            Color::Blue,
            &[
                ("Para Estudar", Color::Red),
                ("Estudando", Color::Orange),
                ("Revisando", Color::Purple),
                ("Concluído", Color::Green),
            ],
        ),
        archetype(
            "programacao",
            "Programação",
            "folder-kanban",
            Color::Purple,
            &[
                ("Backlog", Color::Gray),
                ("Todo", Color::Red),
                ("Em Progresso", Color::Orange),
                ("Review", Color::Blue),
                ("Concluído", Color::Green),
            ],
        ),
        archetype(
            "leituras",
            "Leituras",
            "book-open",
            Color::Green,
            &[
                ("Lista de Leitura", Color::Gray),
                ("Lendo", Color::Orange),
                ("Pausado", Color::Red),
                ("Finalizado", Color::Green),
            ],
        ),
        archetype(
            TODO_TYPE_ID,
            "To-Do",
            "list-todo",
            Color::Green,
            &[("Tarefas", Color::Blue)],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_catalog_has_three_boards_and_one_todo() {
        let types = default_project_types();
        assert_eq!(types.len(), 4);
        assert_eq!(types.iter().filter(|t| t.is_todo()).count(), 1);

        let todo = types.iter().find(|t| t.is_todo()).unwrap();
        assert_eq!(todo.default_columns.len(), 1);
    }

    #[test]
    fn test_template_orders_are_dense() {
        for project_type in default_project_types() {
            let orders: Vec<i32> = project_type.default_columns.iter().map(|c| c.order).collect();
            let expected: Vec<i32> = (0..orders.len() as i32).collect();
            assert_eq!(orders, expected, "{}", project_type.id);
        }
    }

    #[test]
    fn test_seed_columns_get_fresh_ids() {
        let types = default_project_types();
        let programacao = types.iter().find(|t| t.id == "programacao").unwrap();

        let first = programacao.seed_columns();
        let second = programacao.seed_columns();
        let ids: HashSet<_> = first.iter().chain(second.iter()).map(|c| c.id).collect();

        assert_eq!(ids.len(), 10);
        assert!(first.iter().all(|c| c.tasks.is_empty()));
        assert_eq!(first[2].title, "Em Progresso");
        assert_eq!(first[2].color, Color::Orange);
    }
}
