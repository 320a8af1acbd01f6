use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use chrono::NaiveDateTime;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crate::cli::OutputFormat;
use crate::types::Priority;

/// Global output settings
static OUTPUT_FORMAT: AtomicU8 = AtomicU8::new(0);
static QUIET: AtomicBool = AtomicBool::new(false);

pub fn set_format(format: OutputFormat) {
    let raw = match format {
        OutputFormat::Table => 0,
        OutputFormat::Json => 1,
        OutputFormat::Compact => 2,
    };
    OUTPUT_FORMAT.store(raw, Ordering::Relaxed);
}

pub fn format() -> OutputFormat {
    match OUTPUT_FORMAT.load(Ordering::Relaxed) {
        1 => OutputFormat::Json,
        2 => OutputFormat::Compact,
        _ => OutputFormat::Table,
    }
}

pub fn is_json_output() -> bool {
    matches!(format(), OutputFormat::Json)
}

pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

pub fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

/// Print a table or JSON depending on output mode
pub fn print_table<T, R, F>(items: &[T], to_row: F)
where
    T: Serialize,
    R: Tabled,
    F: Fn(&T) -> R,
{
    if is_json_output() {
        println!("{}", serde_json::to_string_pretty(items).unwrap_or_default());
    } else {
        println!("{}", render_table(items.iter().map(to_row)));
    }
}

/// Render rows with the style of the current output mode
pub fn render_table<R: Tabled>(rows: impl IntoIterator<Item = R>) -> String {
    let mut table = Table::new(rows);
    match format() {
        OutputFormat::Compact => table.with(Style::blank()),
        _ => table.with(Style::rounded()),
    };
    table.to_string()
}

/// Print a single item or JSON depending on output mode
pub fn print_item<T: Serialize>(item: &T, display: impl FnOnce(&T)) {
    if is_json_output() {
        println!("{}", serde_json::to_string_pretty(item).unwrap_or_default());
    } else {
        display(item);
    }
}

/// Print a message (skipped in quiet mode, JSON object in JSON mode)
pub fn print_message(message: &str) {
    if is_quiet() {
        return;
    }
    if is_json_output() {
        println!("{}", serde_json::json!({ "message": message }));
    } else {
        println!("{message}");
    }
}

/// Placeholder for views with nothing to show
pub fn print_empty(what: &str) {
    if is_json_output() {
        println!("[]");
    } else {
        println!("{}", format!("No {what} match the current filters.").bright_black());
    }
}

/// Section heading for multi-part output
pub fn heading(title: &str) {
    if !is_json_output() {
        println!("\n{}", title.bold());
    }
}

/// Format priority with color
pub fn priority_colored(priority: Option<&str>) -> String {
    match priority {
        Some(name) => Priority::colored(name),
        None => "-".to_string(),
    }
}

/// Format status with color based on its name
pub fn status_colored(status: Option<&str>) -> String {
    let Some(status) = status else {
        return "-".to_string();
    };

    let lower = status.to_lowercase();
    if lower.contains("done")
        || lower.contains("closed")
        || lower.contains("resolved")
        || lower.contains("complete")
    {
        status.green().to_string()
    } else if lower.contains("progress") || lower.contains("started") {
        status.blue().to_string()
    } else if lower.contains("review") || lower.contains("test") {
        status.magenta().to_string()
    } else if lower.contains("reopen") || lower.contains("blocked") {
        status.red().to_string()
    } else if lower.contains("backlog") || lower.contains("to do") {
        status.bright_black().to_string()
    } else {
        status.to_string()
    }
}

/// Format a timestamp, `-` when absent
pub fn format_datetime(ts: Option<NaiveDateTime>) -> String {
    ts.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Truncate a string with ellipsis
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Horizontal bar scaled to `width` for the largest count
pub fn bar(count: usize, max: usize, width: usize) -> String {
    if max == 0 || count == 0 {
        return String::new();
    }
    let len = (count * width).div_ceil(max).max(1);
    "█".repeat(len)
}
