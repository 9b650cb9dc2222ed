use crate::{ids::ProjectId, models::project::Project};

/// In-memory state: the ordered project list and which project is active.
///
/// The active project is kept as an id so reads always see the latest
/// version of it.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Store {
    pub projects: Vec<Project>,
    pub current_project_id: Option<ProjectId>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ProjectMode {
    #[default]
    All,
    Kanban,
    Todo,
}

impl Store {
    /// Builds the startup state; the first stored project becomes active.
    pub fn from_projects(projects: Vec<Project>) -> Self {
        let current_project_id = projects.first().map(|p| p.id);
        Self {
            projects,
            current_project_id,
        }
    }

    pub fn add_project(&mut self, project: Project) {
        self.projects.push(project);
    }

    pub fn remove_project(&mut self, project_id: ProjectId) -> Option<Project> {
        let index = self.projects.iter().position(|p| p.id == project_id)?;
        if self.current_project_id == Some(project_id) {
            self.current_project_id = None;
        }
        Some(self.projects.remove(index))
    }

    pub fn get_project(&self, project_id: ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == project_id)
    }

    pub fn get_project_mut(&mut self, project_id: ProjectId) -> Option<&mut Project> {
        self.projects.iter_mut().find(|p| p.id == project_id)
    }

    pub fn current_project(&self) -> Option<&Project> {
        self.current_project_id.and_then(|id| self.get_project(id))
    }

    pub fn search_projects<'a>(
        &'a self,
        query: &'a str,
        mode: ProjectMode,
    ) -> impl Iterator<Item = &'a Project> + 'a {
        self.projects
            .iter()
            .filter(move |p| match mode {
                ProjectMode::All => true,
                ProjectMode::Kanban => !p.is_todo(),
                ProjectMode::Todo => p.is_todo(),
            })
            .filter(move |p| {
                matches_query(&p.name, query)
                    || p.description
                        .as_deref()
                        .is_some_and(|d| matches_query(d, query))
            })
    }
}

/// Case- and accent-insensitive substring match; a blank query matches
/// everything.
pub fn matches_query(text: &str, query: &str) -> bool {
    let query = slug::slugify(query);
    query.is_empty() || slug::slugify(text).contains(&query)
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;
    use crate::models::project_type::default_project_types;

    fn project(name: &str, type_id: &str, description: Option<&str>) -> Project {
        let project_type = default_project_types()
            .into_iter()
            .find(|t| t.id == type_id)
            .unwrap();
        let now = Timestamp::now();
        Project {
            id: ProjectId::generate(),
            name: name.to_string(),
            description: description.map(String::from),
            columns: project_type.seed_columns(),
            project_type,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_from_projects_activates_first() {
        let a = project("A", "estudos", None);
        let b = project("B", "todo", None);
        let first_id = a.id;

        let store = Store::from_projects(vec![a, b]);
        assert_eq!(store.current_project_id, Some(first_id));

        let empty = Store::from_projects(vec![]);
        assert_eq!(empty.current_project(), None);
    }

    #[test]
    fn test_remove_active_project_clears_reference() {
        let a = project("A", "estudos", None);
        let id = a.id;
        let mut store = Store::from_projects(vec![a]);

        assert!(store.remove_project(id).is_some());
        assert_eq!(store.current_project_id, None);
        assert!(store.remove_project(id).is_none());
    }

    #[test]
    fn test_search_by_mode_and_query() {
        let store = Store::from_projects(vec![
            project("Cálculo", "estudos", None),
            project("Compras", "todo", Some("mercado da semana")),
            project("Backend", "programacao", Some("API de cálculo")),
        ]);

        let names = |query: &str, mode| {
            store
                .search_projects(query, mode)
                .map(|p| p.name.clone())
                .collect::<Vec<_>>()
        };

        assert_eq!(names("", ProjectMode::Todo), vec!["Compras"]);
        assert_eq!(names("calculo", ProjectMode::All), vec!["Cálculo", "Backend"]);
        assert_eq!(names("calculo", ProjectMode::Kanban), vec!["Cálculo", "Backend"]);
        assert_eq!(names("MERCADO", ProjectMode::All), vec!["Compras"]);
        assert!(names("nothing", ProjectMode::All).is_empty());
    }

    #[test]
    fn test_matches_query() {
        assert!(matches_query("Concluído", "concluido"));
        assert!(matches_query("Em Progresso", "progr"));
        assert!(matches_query("anything", "   "));
        assert!(!matches_query("Review", "todo"));
    }
}
