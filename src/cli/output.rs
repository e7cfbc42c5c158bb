// Output formatting utilities

use std::collections::HashMap;
use std::io::IsTerminal;

use crate::list::{Facets, ListView};
use crate::models::{Project, Selection, Service, Task, User};
use crate::stats::DashboardStats;
use crate::utils::{format_date, format_iso_date};

// ANSI escape codes for terminal formatting
const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_RESET: &str = "\x1b[0m";

const ANSI_FG_RED: &str = "\x1b[31m";
const ANSI_FG_GREEN: &str = "\x1b[32m";
const ANSI_FG_YELLOW: &str = "\x1b[33m";
const ANSI_FG_BLUE: &str = "\x1b[34m";
const ANSI_FG_CYAN: &str = "\x1b[36m";
const ANSI_FG_BRIGHT_BLACK: &str = "\x1b[90m";

/// Check if stdout is a terminal (TTY)
pub fn is_tty() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width dynamically
///
/// Uses the `terminal_size` crate, falling back to the COLUMNS environment
/// variable and then to 120.
pub fn get_terminal_width() -> usize {
    if let Some((terminal_size::Width(w), _)) = terminal_size::terminal_size() {
        if w > 0 {
            return w as usize;
        }
    }

    if let Ok(cols) = std::env::var("COLUMNS") {
        if let Ok(width) = cols.parse::<usize>() {
            if width > 0 && width < 10000 {
                return width;
            }
        }
    }

    120
}

/// How list output should look
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub tty: bool,
    pub width: usize,
}

impl RenderOptions {
    pub fn detect() -> Self {
        Self { tty: is_tty(), width: get_terminal_width() }
    }

    /// Plain, wide output (used by tests and pipes)
    pub fn plain() -> Self {
        Self { tty: false, width: 120 }
    }
}

fn bold_if_tty(text: &str, tty: bool) -> String {
    if tty {
        format!("{}{}{}", ANSI_BOLD, text, ANSI_RESET)
    } else {
        text.to_string()
    }
}

fn paint(text: &str, color: Option<&str>, tty: bool) -> String {
    match color {
        Some(color) if tty => format!("{}{}{}", color, text, ANSI_RESET),
        _ => text.to_string(),
    }
}

/// Colour for a status or priority label
fn label_color(label: &str) -> Option<&'static str> {
    match label {
        "Completed" => Some(ANSI_FG_GREEN),
        "In Progress" => Some(ANSI_FG_BLUE),
        "In Review" => Some(ANSI_FG_CYAN),
        "On Hold" | "Blocked" | "High" => Some(ANSI_FG_YELLOW),
        "Critical" | "Urgent" => Some(ANSI_FG_RED),
        "Cancelled" => Some(ANSI_FG_BRIGHT_BLACK),
        _ => None,
    }
}

/// Parse `#RGB` / `#RRGGBB` into components
fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#').filter(|h| h.is_ascii())?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        6 => Some((channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
        3 => {
            let mut parts = hex.chars().map(|c| channel(&c.to_string()).map(|v| v * 17));
            Some((parts.next()??, parts.next()??, parts.next()??))
        }
        _ => None,
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max <= 3 {
        return text.chars().take(max).collect();
    }
    let mut out: String = text.chars().take(max - 3).collect();
    out.push_str("...");
    out
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        text.to_string()
    } else {
        format!("{}{}", text, " ".repeat(width - len))
    }
}

struct Column {
    header: &'static str,
    /// Shrinks first when the table is wider than the terminal
    flexible: bool,
    /// Colour cells by their label
    colored: bool,
}

impl Column {
    fn new(header: &'static str) -> Self {
        Self { header, flexible: false, colored: false }
    }

    fn flexible(mut self) -> Self {
        self.flexible = true;
        self
    }

    fn colored(mut self) -> Self {
        self.colored = true;
        self
    }
}

fn render_table(columns: &[Column], rows: &[Vec<String>], options: RenderOptions) -> String {
    let mut widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(col.header.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    // Shrink flexible columns to fit, never below their header
    let separators = columns.len().saturating_sub(1);
    let total: usize = widths.iter().sum::<usize>() + separators;
    if total > options.width {
        let mut excess = total - options.width;
        for (i, col) in columns.iter().enumerate() {
            if !col.flexible || excess == 0 {
                continue;
            }
            let floor = col.header.len().max(10);
            let available = widths[i].saturating_sub(floor);
            let cut = available.min(excess);
            widths[i] -= cut;
            excess -= cut;
        }
    }

    let mut output = String::new();
    let header: Vec<String> = columns.iter().zip(&widths).map(|(col, w)| pad(col.header, *w)).collect();
    output.push_str(&bold_if_tty(header.join(" ").trim_end(), options.tty));
    output.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    output.push_str(&rule.join(" "));
    output.push('\n');

    for row in rows {
        let cells: Vec<String> = columns
            .iter()
            .zip(&widths)
            .zip(row)
            .map(|((col, w), value)| {
                let text = truncate(value, *w);
                let color = if col.colored { label_color(value) } else { None };
                paint(&pad(&text, *w), color, options.tty)
            })
            .collect();
        output.push_str(cells.join(" ").trim_end());
        output.push('\n');
    }
    output
}

fn pagination_line<T>(view: &ListView<'_, T>, noun: &str) -> String {
    let noun = if view.total_count == 1 { noun.to_string() } else { format!("{}s", noun) };
    format!(
        "Page {} of {} ({} {})",
        view.page,
        view.total_pages.max(1),
        view.total_count,
        noun
    )
}

fn facets_lines(facets: &Facets) -> String {
    let mut output = String::new();
    if !facets.status_counts.is_empty() {
        let counts: Vec<String> = facets
            .status_counts
            .iter()
            .map(|(status, count)| format!("{} ({})", status, count))
            .collect();
        output.push_str(&format!("Statuses: {}\n", counts.join(", ")));
    }
    if !facets.tags.is_empty() {
        output.push_str(&format!("Tags: {}\n", facets.tags.join(", ")));
    }
    output
}

pub fn format_project_list(view: &ListView<'_, Project>, facets: &Facets, options: RenderOptions) -> String {
    if view.is_empty() {
        return "No projects found.".to_string();
    }

    let columns = [
        Column::new("ID"),
        Column::new("Name").flexible(),
        Column::new("Status").colored(),
        Column::new("Priority").colored(),
        Column::new("Done"),
        Column::new("Target"),
        Column::new("Tags").flexible(),
    ];
    let rows: Vec<Vec<String>> = view
        .items
        .iter()
        .map(|p| {
            vec![
                p.id.map(|id| id.to_string()).unwrap_or_default(),
                p.name.clone(),
                p.status.as_str().to_string(),
                p.priority.as_str().to_string(),
                format!("{}%", p.completion),
                format_iso_date(p.target_end_ts),
                p.tags.join(", "),
            ]
        })
        .collect();

    let mut output = render_table(&columns, &rows, options);
    output.push('\n');
    output.push_str(&pagination_line(view, "project"));
    output.push('\n');
    output.push_str(&facets_lines(facets));
    output.trim_end().to_string()
}

pub fn format_task_list(
    view: &ListView<'_, Task>,
    project_names: &HashMap<i64, String>,
    now_ts: i64,
    options: RenderOptions,
) -> String {
    if view.is_empty() {
        return "No tasks found.".to_string();
    }

    let columns = [
        Column::new("ID"),
        Column::new("Title").flexible(),
        Column::new("Project").flexible(),
        Column::new("Status").colored(),
        Column::new("Priority").colored(),
        Column::new("Assignee"),
        Column::new("Due"),
    ];
    let rows: Vec<Vec<String>> = view
        .items
        .iter()
        .map(|t| {
            let mut due = format_iso_date(t.due_ts);
            if t.is_overdue(now_ts) {
                due.push_str(" (overdue)");
            }
            vec![
                t.id.map(|id| id.to_string()).unwrap_or_default(),
                t.title.clone(),
                project_names
                    .get(&t.project_id)
                    .cloned()
                    .unwrap_or_else(|| format!("[{}]", t.project_id)),
                t.status.as_str().to_string(),
                t.priority.as_str().to_string(),
                t.assigned_to.clone().unwrap_or_default(),
                due,
            ]
        })
        .collect();

    let mut output = render_table(&columns, &rows, options);
    output.push('\n');
    output.push_str(&pagination_line(view, "task"));
    output
}

pub fn format_project_detail(project: &Project, tasks: &[Task], is_current: bool) -> String {
    let mut output = String::new();
    let marker = if is_current { " (current)" } else { "" };
    output.push_str(&format!("Project {}: {}{}\n", project.id.unwrap_or_default(), project.name, marker));
    if !project.description.is_empty() {
        output.push_str(&format!("  {}\n", project.description));
    }
    output.push('\n');
    output.push_str(&format!("Status:      {}\n", project.status.as_str()));
    output.push_str(&format!("Priority:    {}\n", project.priority.as_str()));
    output.push_str(&format!("Completion:  {}%\n", project.completion));
    output.push_str(&format!("Start:       {}\n", format_date(project.start_ts)));
    output.push_str(&format!("Target end:  {}\n", format_date(project.target_end_ts)));
    output.push_str(&format!("Actual end:  {}\n", format_date(project.actual_end_ts)));
    if !project.tags.is_empty() {
        output.push_str(&format!("Tags:        {}\n", project.tags.join(", ")));
    }
    if let Some(repo) = &project.git_repo {
        output.push_str(&format!("Repository:  {}\n", repo));
    }
    if let Some(domain) = &project.domain {
        output.push_str(&format!("Domain:      {}\n", domain));
    }

    output.push('\n');
    if tasks.is_empty() {
        output.push_str("No tasks.\n");
    } else {
        output.push_str(&format!("Tasks ({}):\n", tasks.len()));
        for task in tasks {
            output.push_str(&format!(
                "  {:<5} [{}] {}\n",
                task.id.unwrap_or_default(),
                task.status.as_str(),
                task.title
            ));
        }
    }
    output.trim_end().to_string()
}

pub fn format_service_list(services: &[Service], options: RenderOptions) -> String {
    if services.is_empty() {
        return "No services found.".to_string();
    }
    let mut output = String::new();
    output.push_str(&bold_if_tty(&format!("{:<6} {:<30} {}", "ID", "Name", "Color"), options.tty));
    output.push('\n');
    output.push_str(&"-".repeat(46));
    for service in services {
        let swatch = match hex_to_rgb(&service.color) {
            Some((r, g, b)) if options.tty => format!("\x1b[38;2;{};{};{}m##{} ", r, g, b, ANSI_RESET),
            _ => String::new(),
        };
        output.push_str(&format!(
            "\n{:<6} {:<30} {}{}",
            service.id.unwrap_or_default(),
            truncate(&service.name, 30),
            swatch,
            service.color
        ));
    }
    output
}

pub fn format_user_list(users: &[User]) -> String {
    if users.is_empty() {
        return "No users found.".to_string();
    }
    let mut output = format!("{:<6} {:<32} {}\n{}", "ID", "Email", "Username", "-".repeat(56));
    for user in users {
        output.push_str(&format!(
            "\n{:<6} {:<32} {}",
            user.id.unwrap_or_default(),
            user.email,
            user.username
        ));
    }
    output
}

/// One line describing the current project; stale pointers read as unset
pub fn format_selection(selection: &Selection) -> String {
    match selection.project() {
        Some(project) => format!("Current project: {} (id {})", project.name, project.id.unwrap_or_default()),
        None => "No project selected.".to_string(),
    }
}

pub fn format_dashboard(stats: &DashboardStats, selection: &Selection, tty: bool) -> String {
    let mut output = String::new();

    output.push_str(&bold_if_tty("=== Current Project ===", tty));
    output.push('\n');
    output.push_str(&format_selection(selection));
    output.push_str("\n\n");

    output.push_str(&bold_if_tty("=== Projects ===", tty));
    output.push('\n');
    output.push_str(&format!(
        "Total: {}  Completed: {}  Ongoing: {}  High priority: {}\n",
        stats.total_projects, stats.completed_projects, stats.ongoing_projects, stats.high_priority
    ));
    output.push_str(&format!("Average completion: {:.1}%\n", stats.avg_completion));
    for entry in &stats.status_counts {
        output.push_str(&format!("  {:<12} {}\n", entry.status, entry.count));
    }
    output.push('\n');

    output.push_str(&bold_if_tty("=== Tasks ===", tty));
    output.push('\n');
    output.push_str(&format!(
        "Total: {}  Completed: {} ({}%)  Overdue: {}\n",
        stats.total_tasks, stats.completed_tasks, stats.task_completion, stats.overdue_tasks
    ));
    output.push('\n');
    output.push_str(&format!("Services: {}", stats.services));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::{self, Criteria};
    use crate::models::{CurrentSelection, ProjectStatus};

    #[test]
    fn test_hex_to_rgb() {
        assert_eq!(hex_to_rgb("#3B82F6"), Some((0x3B, 0x82, 0xF6)));
        assert_eq!(hex_to_rgb("#fff"), Some((255, 255, 255)));
        assert_eq!(hex_to_rgb("3B82F6"), None);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer name", 8), "a lon...");
    }

    #[test]
    fn test_table_shrinks_flexible_columns() {
        let columns = [Column::new("ID"), Column::new("Name").flexible()];
        let rows = vec![vec!["1".to_string(), "x".repeat(80)]];
        let out = render_table(&columns, &rows, RenderOptions { tty: false, width: 40 });
        assert!(out.lines().all(|line| line.chars().count() <= 40));
        assert!(out.contains("..."));
    }

    #[test]
    fn test_project_list_output() {
        let mut alpha = Project::new("Alpha");
        alpha.id = Some(1);
        alpha.tags = vec!["React".to_string()];
        let mut beta = Project::new("Beta");
        beta.id = Some(2);
        beta.status = ProjectStatus::Completed;
        let items = vec![alpha, beta];

        let view = list::apply(&items, &Criteria::default());
        let out = format_project_list(&view, &list::facets(&items), RenderOptions::plain());
        assert!(out.contains("Alpha"));
        assert!(out.contains("Page 1 of 1 (2 projects)"));
        assert!(out.contains("Statuses: Completed (1), Planning (1)"));
        assert!(out.contains("Tags: React"));
        assert!(!out.contains('\x1b'));
    }

    #[test]
    fn test_task_list_marks_overdue() {
        let mut late = Task::new(1, "Late");
        late.id = Some(1);
        late.due_ts = Some(100);
        let mut orphan = Task::new(7, "Orphan");
        orphan.id = Some(2);
        let items = vec![late, orphan];
        let names = HashMap::from([(1, "Alpha".to_string())]);

        let view = list::apply(&items, &Criteria::default());
        let out = format_task_list(&view, &names, 1_000, RenderOptions::plain());
        assert!(out.contains("(overdue)"));
        assert!(out.contains("Alpha"));
        assert!(out.contains("[7]"));
        assert!(out.contains("Page 1 of 1 (2 tasks)"));
    }

    #[test]
    fn test_selection_output() {
        assert_eq!(format_selection(&Selection::None), "No project selected.");
        let stale = Selection::Stale(CurrentSelection {
            name: "Gone".to_string(),
            project_id: "9".to_string(),
            created_ts: 0,
        });
        assert_eq!(format_selection(&stale), "No project selected.");
    }
}
