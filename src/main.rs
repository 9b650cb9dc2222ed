use std::{fmt::Display, path::PathBuf};

use clap::{Parser, Subcommand};
use jiff::civil::Date;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    config::{Config, Overrides},
    lookup::{LookupError, TaskLocation, find_column, find_project, find_task},
    models::{
        color::Color,
        column::{ColumnPatch, CreateColumnParameters},
        project::{Project, ProjectPatch},
        store::ProjectMode,
        task::{CreateTaskParameters, Priority, TaskPatch},
    },
    services::{
        ProjectStore,
        columns::ColumnError,
        drag::{DropError, DropOutcome, DropResult},
        projects::ProjectError,
        tasks::TaskError,
    },
    storage::{Storage, json::JsonFileStorage},
};

mod config;
mod ids;
mod lookup;
mod models;
mod services;
mod storage;
mod ui;

#[derive(Parser)]
#[command(
    name = "tb",
    about = "Kanban boards and to-do lists in your terminal"
)]
struct Cli {
    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// File holding the projects
    #[arg(long, global = true, env = "TASKBOARD_STORE")]
    store: Option<PathBuf>,

    /// Project to work on (name or id); defaults to the first project
    #[arg(short, long, global = true, env = "TASKBOARD_PROJECT")]
    project: Option<String>,

    /// Log filter used when RUST_LOG is unset (e.g. "debug")
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the active project
    Board,

    /// List project types and colors
    Types,

    /// Manage projects
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Manage tasks of the active project
    #[command(subcommand)]
    Task(TaskCommands),

    /// Manage columns of the active project
    #[command(subcommand)]
    Column(ColumnCommands),
}

#[derive(Debug, Subcommand)]
enum ProjectCommands {
    /// Create a new project from a project type
    New {
        name: String,

        #[arg(short, long)]
        description: Option<String>,

        /// Project type id (see `tb types`)
        #[arg(short = 't', long = "type")]
        project_type: Option<String>,
    },
    /// List projects
    List {
        /// Only projects whose name or description matches
        #[arg(short, long)]
        search: Option<String>,

        /// Only kanban boards
        #[arg(long, conflicts_with = "todo")]
        kanban: bool,

        /// Only to-do lists
        #[arg(long)]
        todo: bool,
    },
    /// Rename or describe a project
    Edit {
        /// Project name or id
        query: String,

        #[arg(short, long)]
        name: Option<String>,

        /// New description; an empty value clears it
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a project with all its columns and tasks
    Delete { query: String },
}

#[derive(Debug, Subcommand)]
enum TaskCommands {
    /// Add a task
    Add {
        title: String,

        /// Column name or id; defaults to the first column
        #[arg(short, long)]
        column: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short = 'P', long, value_enum)]
        priority: Option<Priority>,

        #[arg(short, long)]
        assignee: Option<String>,

        /// Due date (e.g., "2026-03-01")
        #[arg(long)]
        due: Option<String>,

        /// Add tags (can be used multiple times)
        #[arg(short, long, action = clap::ArgAction::Append)]
        tag: Vec<String>,
    },
    /// Change task fields; empty values clear optional fields
    Edit {
        /// Task title or id
        task: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short = 'P', long, value_enum)]
        priority: Option<Priority>,

        #[arg(short, long)]
        assignee: Option<String>,

        #[arg(long)]
        due: Option<String>,

        /// Replace tags (can be used multiple times)
        #[arg(short, long, action = clap::ArgAction::Append)]
        tag: Vec<String>,

        /// Remove all tags
        #[arg(long, conflicts_with = "tag")]
        clear_tags: bool,
    },
    /// Toggle a task between done and open
    Done { task: String },
    /// Delete a task
    Delete { task: String },
    /// Move a task to another column
    Move {
        task: String,

        /// Destination column name or id
        column: String,

        /// Position in the destination column, starting at 1; defaults to the end
        #[arg(long)]
        position: Option<usize>,
    },
    /// Move a task within its column
    Reorder {
        task: String,

        /// New position, starting at 1
        position: usize,
    },
}

#[derive(Debug, Subcommand)]
enum ColumnCommands {
    /// Add a column at the right end of the board
    Add {
        title: String,

        /// Palette color by name or hex (see `tb types`)
        #[arg(short, long, default_value = "gray")]
        color: Color,
    },
    /// Rename or recolor a column
    Edit {
        column: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(short, long)]
        color: Option<Color>,
    },
    /// Delete a column with its tasks
    Delete { column: String },
    /// Move a column along the board
    Move {
        column: String,

        /// New position, starting at 1
        position: usize,
    },
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn exit_with(message: impl Display) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

fn exit_with_lookup(kind: &str, error: LookupError) -> ! {
    match error {
        LookupError::NotFound(query) => exit_with(format!("{kind} '{query}' not found")),
        LookupError::Ambiguous { query, candidates } => {
            eprintln!("Error: {kind} '{query}' is ambiguous. Multiple matches found:");
            for candidate in candidates {
                eprintln!("  - {}", candidate);
            }
            eprintln!("\nPlease be more specific or use the id.");
            std::process::exit(1);
        }
    }
}

fn parse_due(value: &str) -> Option<Date> {
    if value.trim().is_empty() {
        return None;
    }
    match value.trim().parse::<Date>() {
        Ok(date) => Some(date),
        Err(e) => {
            eprintln!("Error: Invalid due date '{}': {}", value, e);
            eprintln!("\nExpected format: YYYY-MM-DD (e.g., 2026-03-01)");
            std::process::exit(1);
        }
    }
}

fn active_project<S: Storage>(store: &ProjectStore<S>) -> &Project {
    match store.current_project() {
        Some(project) => project,
        None => {
            eprintln!("Error: No project is open");
            if store.projects().is_empty() {
                eprintln!("\nCreate one with `tb project new <name>`.");
            } else {
                eprintln!("\nPick one with `--project <name>`.");
            }
            std::process::exit(1);
        }
    }
}

fn locate_task<'a>(project: &'a Project, query: &str) -> TaskLocation<'a> {
    find_task(project, query).unwrap_or_else(|e| exit_with_lookup("Task", e))
}

fn report_project_error(error: ProjectError, store: &ProjectStore<impl Storage>) -> ! {
    match error {
        ProjectError::UnknownProjectType(type_id) => {
            eprintln!("Error: Unknown project type '{}'", type_id);
            eprintln!("\nAvailable types:");
            for project_type in store.project_types() {
                eprintln!("  - {} ({})", project_type.id, project_type.name);
            }
            std::process::exit(1);
        }
        ProjectError::Storage(e) => exit_with(format!("Failed to save projects: {e}")),
        other => exit_with(other),
    }
}

fn report_drop_error(error: DropError) -> ! {
    match error {
        DropError::Task(TaskError::Storage(e)) | DropError::Column(ColumnError::Storage(e)) => {
            exit_with(format!("Failed to save projects: {e}"))
        }
        other => exit_with(other),
    }
}

fn main() {
    let cli = Cli::parse();

    let config = match Config::load(
        cli.config.as_deref(),
        Overrides {
            store_path: cli.store.clone(),
            project: cli.project.clone(),
            log_level: cli.log_level.clone(),
        },
    ) {
        Ok(config) => config,
        Err(e) => exit_with(e),
    };

    init_tracing(&config.log_level);

    // Create parent directory if it doesn't exist
    if let Some(parent) = config.store_path.parent()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        exit_with(format!("Failed to create data directory: {e}"));
    }

    let storage = JsonFileStorage::new(config.store_path.clone());
    tracing::debug!(path = %storage.path().display(), "opening project store");
    let mut store = ProjectStore::open(storage);

    if let Some(query) = &config.default_project {
        match find_project(store.projects(), query).map(|p| p.id) {
            Ok(project_id) => {
                if let Err(e) = store.set_current_project(Some(project_id)) {
                    exit_with(e);
                }
            }
            // An explicit --project must match; a configured default may be stale.
            Err(e) if cli.project.is_some() => exit_with_lookup("Project", e),
            Err(e) => tracing::warn!(error = %e, "ignoring configured default project"),
        }
    }

    let today = jiff::Zoned::now().date();

    match cli.command.unwrap_or(Commands::Board) {
        Commands::Board => match store.current_project() {
            Some(project) => ui::render_project(project, today),
            None => {
                println!("No projects yet");
                println!("\nCreate one with `tb project new <name> --type <type>`.");
            }
        },
        Commands::Types => {
            ui::render_project_types(store.project_types());
            ui::render_palette();
        }
        Commands::Project(ProjectCommands::New {
            name,
            description,
            project_type,
        }) => {
            let type_id = project_type.unwrap_or_else(|| config.default_project_type.clone());
            match store.create_project(&name, description.as_deref().unwrap_or(""), &type_id) {
                Ok(project) => {
                    println!(
                        "✓ Project {} created ({})",
                        project.name, project.project_type.name
                    );
                    println!("  {}", project.id.short());
                }
                Err(e) => report_project_error(e, &store),
            }
        }
        Commands::Project(ProjectCommands::List {
            search,
            kanban,
            todo,
        }) => {
            let mode = if kanban {
                ProjectMode::Kanban
            } else if todo {
                ProjectMode::Todo
            } else {
                ProjectMode::All
            };
            let query = search.unwrap_or_default();
            let projects: Vec<_> = store.search_projects(&query, mode).collect();

            if projects.is_empty() {
                println!("No projects found");
            } else {
                let current = store.current_project().map(|p| p.id);
                ui::render_project_list(&projects, current);
            }
        }
        Commands::Project(ProjectCommands::Edit {
            query,
            name,
            description,
        }) => {
            let project_id = find_project(store.projects(), &query)
                .unwrap_or_else(|e| exit_with_lookup("Project", e))
                .id;
            let patch = ProjectPatch {
                name,
                description: description.map(Some),
            };
            match store.update_project(project_id, patch) {
                Ok(project) => println!("✓ Project updated: {}", project.name),
                Err(e) => report_project_error(e, &store),
            }
        }
        Commands::Project(ProjectCommands::Delete { query }) => {
            let project_id = find_project(store.projects(), &query)
                .unwrap_or_else(|e| exit_with_lookup("Project", e))
                .id;
            match store.delete_project(project_id) {
                Ok(project) => {
                    println!("✓ Project deleted: {}", project.name);
                    let (columns, tasks) = (project.columns.len(), project.task_count());
                    println!("  └─ {} column(s) and {} task(s) also deleted", columns, tasks);
                }
                Err(e) => report_project_error(e, &store),
            }
        }
        Commands::Task(TaskCommands::Add {
            title,
            column,
            description,
            priority,
            assignee,
            due,
            tag,
        }) => {
            let project = active_project(&store);
            let column_id = match &column {
                Some(query) => find_column(project, query)
                    .unwrap_or_else(|e| exit_with_lookup("Column", e))
                    .id,
                None => match project.sorted_column_ids().first() {
                    Some(id) => *id,
                    None => exit_with(format!("Project '{}' has no columns", project.name)),
                },
            };
            let parameters = CreateTaskParameters {
                title,
                description,
                priority: priority.unwrap_or_default(),
                assignee,
                due_date: due.as_deref().and_then(parse_due),
                tags: tag,
                completed: false,
            };

            match store.create_task(column_id, parameters) {
                Ok(task) => {
                    println!("✓ Task added: {}", task.title);
                    println!("  {}", task.id.short());
                }
                Err(TaskError::Storage(e)) => exit_with(format!("Failed to save task: {e}")),
                Err(e) => exit_with(e),
            }
        }
        Commands::Task(TaskCommands::Edit {
            task,
            title,
            description,
            priority,
            assignee,
            due,
            tag,
            clear_tags,
        }) => {
            let task_id = locate_task(active_project(&store), &task).task_id();
            let patch = TaskPatch {
                title,
                description: description.map(Some),
                priority,
                assignee: assignee.map(Some),
                due_date: due.as_deref().map(parse_due),
                tags: if clear_tags {
                    Some(vec![])
                } else if tag.is_empty() {
                    None
                } else {
                    Some(tag)
                },
                completed: None,
            };
            if patch.is_empty() {
                exit_with("Nothing to change. Pass at least one field to edit.");
            }

            match store.update_task(task_id, patch) {
                Ok(task) => println!("✓ Task updated: {}", task.title),
                Err(TaskError::Storage(e)) => exit_with(format!("Failed to save task: {e}")),
                Err(e) => exit_with(e),
            }
        }
        Commands::Task(TaskCommands::Done { task }) => {
            let task_id = locate_task(active_project(&store), &task).task_id();
            match store.toggle_task(task_id) {
                Ok(task) if task.completed => println!("✓ Task completed: {}", task.title),
                Ok(task) => println!("○ Task reopened: {}", task.title),
                Err(TaskError::Storage(e)) => exit_with(format!("Failed to save task: {e}")),
                Err(e) => exit_with(e),
            }
        }
        Commands::Task(TaskCommands::Delete { task }) => {
            let task_id = locate_task(active_project(&store), &task).task_id();
            match store.delete_task(task_id) {
                Ok(task) => println!("✓ Task deleted: {}", task.title),
                Err(TaskError::Storage(e)) => exit_with(format!("Failed to save task: {e}")),
                Err(e) => exit_with(e),
            }
        }
        Commands::Task(TaskCommands::Move {
            task,
            column,
            position,
        }) => {
            let project = active_project(&store);
            let located = locate_task(project, &task);
            let destination = find_column(project, &column)
                .unwrap_or_else(|e| exit_with_lookup("Column", e));
            let (title, column_title) = (located.task.title.clone(), destination.title.clone());
            let gesture = located.drop_onto(destination, position);

            match store.apply_drop(gesture) {
                Ok(DropOutcome::Ignored) => println!("Task {} is already there", title),
                Ok(_) => println!("✓ Task moved: {} → {}", title, column_title),
                Err(e) => report_drop_error(e),
            }
        }
        Commands::Task(TaskCommands::Reorder { task, position }) => {
            let located = locate_task(active_project(&store), &task);
            let title = located.task.title.clone();
            let gesture = located.drop_onto(located.column, Some(position));

            match store.apply_drop(gesture) {
                Ok(DropOutcome::Ignored) => println!("Task {} is already there", title),
                Ok(_) => println!("✓ Task reordered: {}", title),
                Err(e) => report_drop_error(e),
            }
        }
        Commands::Column(ColumnCommands::Add { title, color }) => {
            let order = active_project(&store).next_column_order();
            match store.create_column(CreateColumnParameters {
                title,
                color,
                order,
            }) {
                Ok(column) => println!("✓ Column added: {}", column.title),
                Err(ColumnError::Storage(e)) => exit_with(format!("Failed to save column: {e}")),
                Err(e) => exit_with(e),
            }
        }
        Commands::Column(ColumnCommands::Edit {
            column,
            title,
            color,
        }) => {
            let column_id = find_column(active_project(&store), &column)
                .unwrap_or_else(|e| exit_with_lookup("Column", e))
                .id;
            match store.update_column(column_id, ColumnPatch { title, color }) {
                Ok(column) => println!("✓ Column updated: {}", column.title),
                Err(ColumnError::Storage(e)) => exit_with(format!("Failed to save column: {e}")),
                Err(e) => exit_with(e),
            }
        }
        Commands::Column(ColumnCommands::Delete { column }) => {
            let column_id = find_column(active_project(&store), &column)
                .unwrap_or_else(|e| exit_with_lookup("Column", e))
                .id;
            match store.delete_column(column_id) {
                Ok(column) => {
                    println!("✓ Column deleted: {}", column.title);
                    if !column.tasks.is_empty() {
                        println!("  └─ {} task(s) also deleted", column.tasks.len());
                    }
                }
                Err(ColumnError::Storage(e)) => exit_with(format!("Failed to save column: {e}")),
                Err(e) => exit_with(e),
            }
        }
        Commands::Column(ColumnCommands::Move { column, position }) => {
            let project = active_project(&store);
            let moving = find_column(project, &column)
                .unwrap_or_else(|e| exit_with_lookup("Column", e));
            let title = moving.title.clone();
            let source_index = project
                .sorted_column_ids()
                .iter()
                .position(|id| *id == moving.id)
                .unwrap_or_default();
            let gesture = DropResult::Column {
                source_index,
                destination_index: Some(position.saturating_sub(1)),
            };

            match store.apply_drop(gesture) {
                Ok(DropOutcome::Ignored) => println!("Column {} is already there", title),
                Ok(_) => println!("✓ Column moved: {}", title),
                Err(e) => report_drop_error(e),
            }
        }
    }
}
