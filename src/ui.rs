use colored::*;
use jiff::civil::Date;

use crate::{
    ids::ProjectId,
    models::{
        color::{Color, PALETTE},
        column::Column,
        project::Project,
        project_type::ProjectType,
        task::{Priority, Task},
    },
};

/// Get the terminal width, defaulting to 80 if unavailable
fn get_terminal_width() -> usize {
    term_size::dimensions().map(|(w, _)| w).unwrap_or(80)
}

/// Paint text in one of the palette colors
pub fn paint(text: &str, color: Color) -> ColoredString {
    let (r, g, b) = color.rgb();
    text.truecolor(r, g, b)
}

pub fn get_priority_glyph(priority: Priority) -> ColoredString {
    match priority {
        Priority::High => "▲".red(),
        Priority::Medium => "■".yellow(),
        Priority::Low => "▽".dimmed(),
    }
}

/// Render a view header with title and count
pub fn render_view_header(title: &str, count: usize) {
    let task_word = if count == 1 { "task" } else { "tasks" };
    println!("\n  {} ({} {})\n", title.cyan().bold(), count, task_word);
}

/// Render a section header (e.g., a column title)
pub fn render_section_header(title: &str) {
    println!("\n  ─── {} ───\n", title.bold());
}

/// Render the active project: a checklist for to-do lists, columns otherwise
pub fn render_project(project: &Project, today: Date) {
    if project.is_todo() {
        render_todo_list(project, today);
    } else {
        render_board(project, today);
    }
}

pub fn render_board(project: &Project, today: Date) {
    render_project_header(project);

    for (position, column) in project.sorted_columns().into_iter().enumerate() {
        render_column_header(position + 1, column);
        if column.tasks.is_empty() {
            println!("    {}", "(empty)".dimmed());
        }
        for task in &column.tasks {
            render_task_line(task, today, None);
        }
    }
    println!();
}

pub fn render_todo_list(project: &Project, today: Date) {
    render_project_header(project);

    let Some(column) = project.sorted_columns().into_iter().next() else {
        return;
    };
    let (done, open) = column.partition_by_completion();

    if open.is_empty() {
        println!("  {}", "Nothing left to do".dimmed());
    }
    for task in open {
        render_task_line(task, today, Some(false));
    }

    if !done.is_empty() {
        render_section_header(&format!("Completed ({})", done.len()));
        for task in done {
            render_task_line(task, today, Some(true));
        }
    }
    println!();
}

fn render_project_header(project: &Project) {
    let (done, total) = project.progress();
    render_view_header(&project.name, total);

    let mut meta = vec![paint(&project.project_type.name, project.project_type.color).to_string()];
    if total > 0 {
        meta.push(format!("{}/{} done ({}%)", done, total, percent(done, total)));
    }
    println!("  {}", meta.join(&format!(" {} ", "•".dimmed())));
    if let Some(description) = &project.description {
        println!("  {}", description.dimmed());
    }
}

fn render_column_header(position: usize, column: &Column) {
    println!(
        "\n  {} {} {}  {}",
        format!("{position}.").dimmed(),
        paint(&format!("━━ {} ━━", column.title), column.color).bold(),
        format!("({})", column.tasks.len()).dimmed(),
        column.id.short().dimmed()
    );
}

/// Render a single task line with short id, glyph, title, and right-aligned
/// metadata. `checked` draws a checkbox instead of the priority glyph.
pub fn render_task_line(task: &Task, today: Date, checked: Option<bool>) {
    let terminal_width = get_terminal_width();

    let id_str = task.id.short();
    let glyph = match checked {
        Some(true) => "[✓]".dimmed(),
        Some(false) => "[ ]".green(),
        None => get_priority_glyph(task.priority),
    };
    let glyph_width = glyph.chars().count();
    let title = &task.title;

    let left_section = format!("    {}  {}  {}", id_str.dimmed(), glyph, title);
    let styled_left = if checked == Some(true) {
        left_section.dimmed()
    } else {
        left_section.bold()
    };

    let mut right_parts = vec![];
    if let Some(assignee) = &task.assignee {
        right_parts.push(format!("@{assignee}"));
    }
    for tag in &task.tags {
        right_parts.push(format!("#{tag}"));
    }
    let due = task.due_date.map(|date| format_due_date(date, today));
    if let Some(due) = &due {
        right_parts.push(due.clone());
    }
    let right_section = right_parts.join("  ");

    if right_section.is_empty() {
        println!("{}", styled_left);
    } else {
        let left_visible_len = 4 + id_str.len() + 2 + glyph_width + 2 + title.chars().count();
        let right_visible_len = right_section.chars().count();
        let total_content = left_visible_len + right_visible_len;

        let right_styled = if task.is_overdue(today) {
            right_section.red()
        } else {
            right_section.dimmed()
        };

        if total_content + 4 < terminal_width {
            let padding = terminal_width - total_content - 2;
            println!("{}{}{}", styled_left, " ".repeat(padding), right_styled);
        } else {
            // Not enough space for right alignment
            println!("{}", styled_left);
            println!("         {}", right_styled);
        }
    }

    if checked.is_none()
        && let Some(description) = &task.description
    {
        println!("         {}", description.dimmed());
    }
}

pub fn render_project_list(projects: &[&Project], current: Option<ProjectId>) {
    println!(
        "{} ({} {})\n",
        "PROJECTS".cyan(),
        projects.len(),
        if projects.len() == 1 {
            "project"
        } else {
            "projects"
        }
    );

    for project in projects {
        let marker = if Some(project.id) == current {
            "▸".green()
        } else {
            "•".green()
        };
        println!(
            "{} {}  {}",
            marker,
            project.name.bold(),
            project.id.short().dimmed()
        );

        let (done, total) = project.progress();
        println!(
            "    {} {} {} {}",
            paint(&project.project_type.name, project.project_type.color),
            "•".dimmed(),
            format!(
                "{} {}",
                total,
                if total == 1 { "task" } else { "tasks" }
            )
            .dimmed(),
            render_progress_bar(done, total)
        );
        if let Some(description) = &project.description {
            println!("    {}", description.dimmed());
        }

        println!("    {}", "─".repeat(30).dimmed());
        println!();
    }
}

pub fn render_project_types(types: &[ProjectType]) {
    println!("{} ({})\n", "PROJECT TYPES".cyan(), types.len());
    for project_type in types {
        println!(
            "{} {}  {}",
            paint("●", project_type.color),
            project_type.name.bold(),
            format!("{} · {}", project_type.id, project_type.icon).dimmed()
        );
        let columns: Vec<String> = project_type
            .default_columns
            .iter()
            .map(|c| paint(&c.title, c.color).to_string())
            .collect();
        println!("    {}", columns.join(&format!(" {} ", "→".dimmed())));
        println!();
    }
}

pub fn render_palette() {
    println!("{}\n", "COLORS".cyan());
    for color in PALETTE {
        println!(
            "  {}  {:<8} {}",
            paint("■■", color),
            color.name(),
            color.hex().dimmed()
        );
    }
    println!();
}

fn percent(done: usize, total: usize) -> usize {
    if total == 0 { 0 } else { done * 100 / total }
}

fn render_progress_bar(done: usize, total: usize) -> String {
    const WIDTH: usize = 10;
    let filled = if total == 0 { 0 } else { done * WIDTH / total };
    format!(
        "{}{} {}%",
        "█".repeat(filled).green(),
        "░".repeat(WIDTH - filled).dimmed(),
        percent(done, total)
    )
}

/// Format a due date for display (e.g., "Today", "Tomorrow", "Mar 01")
pub fn format_due_date(date: Date, today: Date) -> String {
    if date == today {
        "due Today".to_string()
    } else if today.tomorrow().is_ok_and(|d| d == date) {
        "due Tomorrow".to_string()
    } else if today.yesterday().is_ok_and(|d| d == date) {
        "due Yesterday".to_string()
    } else if date.year() == today.year() {
        format!("due {}", date.strftime("%b %d"))
    } else {
        format!("due {}", date.strftime("%b %d %Y"))
    }
}
