use serde::Serialize;
use tabled::Tabled;

use crate::aggregate::{value_counts, CountOrder, ValueCounts};
use crate::cli::BreakdownArgs;
use crate::error::Result;
use crate::output;
use crate::session::Session;
use crate::types::{Category, Field, IssueView};

const BAR_WIDTH: usize = 30;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CountEntry {
    pub value: Category,
    pub count: usize,
}

#[derive(Tabled)]
struct CountRow {
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Count")]
    count: usize,
    #[tabled(rename = "Share")]
    share: String,
    #[tabled(rename = "")]
    bar: String,
}

pub fn entries(counts: ValueCounts) -> Vec<CountEntry> {
    counts
        .into_iter()
        .map(|(value, count)| CountEntry { value, count })
        .collect()
}

/// Counts for `field`, `None` when the export lacks the column.
pub fn counts_for(view: &IssueView, field: Field, order: CountOrder) -> Option<Vec<CountEntry>> {
    value_counts(view, field, order).map(entries)
}

pub fn print_counts(field: Field, entries: &[CountEntry]) {
    if entries.is_empty() {
        output::print_empty("issues");
        return;
    }

    let total: usize = entries.iter().map(|e| e.count).sum();
    let max = entries.iter().map(|e| e.count).max().unwrap_or(0);
    output::print_table(entries, |entry| {
        let value = match field {
            Field::Priority => output::priority_colored(Some(entry.value.as_str())),
            Field::Status => output::status_colored(Some(entry.value.as_str())),
            _ => entry.value.to_string(),
        };
        CountRow {
            value,
            count: entry.count,
            share: format!("{:.1}%", entry.count as f64 * 100.0 / total as f64),
            bar: output::bar(entry.count, max, BAR_WIDTH),
        }
    });
}

pub fn run(session: &Session, args: BreakdownArgs) -> Result<()> {
    let criteria = args.source.filters.criteria()?;
    let view = session.filtered(&criteria);

    match counts_for(&view, args.by, args.sort) {
        Some(entries) => {
            output::heading(&format!("Bugs by {}", args.by));
            print_counts(args.by, &entries);
        }
        None => output::print_message(&format!(
            "Column '{}' is not present in this export",
            args.by
        )),
    }

    Ok(())
}
