use serde::Serialize;
use tabled::Tabled;

use crate::cli::ValuesArgs;
use crate::error::Result;
use crate::output;
use crate::session::Session;
use crate::types::Category;

#[derive(Serialize)]
struct ValueEntry<'a> {
    value: &'a str,
}

#[derive(Tabled)]
struct ValueRow {
    #[tabled(rename = "Value")]
    value: String,
}

/// Distinct non-blank values, the options offered for a column filter.
pub fn run(session: &Session, args: ValuesArgs) -> Result<()> {
    let Some(values) = session.dataset().unique_values(args.by) else {
        output::print_message(&format!(
            "Column '{}' is not present in this export",
            args.by
        ));
        return Ok(());
    };

    let entries: Vec<ValueEntry> = values
        .iter()
        .filter_map(|category| match category {
            Category::Value(value) => Some(ValueEntry { value }),
            Category::Blank => None,
        })
        .collect();

    output::print_table(&entries, |entry| ValueRow {
        value: entry.value.to_string(),
    });

    Ok(())
}
