use serde::Serialize;

use crate::aggregate::{fitting_bucket, CountOrder, Kpis};
use crate::cli::DashboardArgs;
use crate::drilldown;
use crate::error::Result;
use crate::output;
use crate::session::Session;
use crate::types::{DateField, Field};

use super::breakdown::{counts_for, print_counts, CountEntry};
use super::issues::{print_issues, records, IssueRecord};
use super::summary::{anchor, print_kpis};
use super::trend::{print_trend, trend_for, TrendEntry};

#[derive(Serialize)]
struct Dashboard<'a> {
    kpis: Kpis,
    by_priority: Option<Vec<CountEntry>>,
    by_status: Option<Vec<CountEntry>>,
    created_trend: Option<Vec<TrendEntry>>,
    issues: Vec<IssueRecord<'a>>,
}

pub fn run(session: &Session, args: DashboardArgs) -> Result<()> {
    let criteria = args.source.filters.criteria()?;
    let view = session.filtered(&criteria);
    let kpis = session.kpis(&view, anchor(None)?);

    let by_priority = counts_for(&view, Field::Priority, CountOrder::Count);
    let by_status = counts_for(&view, Field::Status, CountOrder::Count);
    let bucket = fitting_bucket(&view, DateField::Created, args.bucket);
    let created_trend = trend_for(&view, DateField::Created, bucket);

    let table = drilldown::sort_by(&view, &drilldown::default_sort(&view)).first(args.limit);

    if output::is_json_output() {
        let dashboard = Dashboard {
            kpis,
            by_priority,
            by_status,
            created_trend,
            issues: records(&table),
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&dashboard).unwrap_or_default()
        );
        return Ok(());
    }

    output::heading("Bug summary");
    print_kpis(&kpis);

    if view.is_empty() {
        println!();
        output::print_empty("issues");
        return Ok(());
    }

    if let Some(entries) = &by_priority {
        output::heading("Bugs by priority");
        print_counts(Field::Priority, entries);
    }
    if let Some(entries) = &by_status {
        output::heading("Bugs by status");
        print_counts(Field::Status, entries);
    }
    if let Some(entries) = &created_trend {
        output::heading("Bugs created over time");
        print_trend(entries, bucket);
    }

    output::heading("Bug details");
    print_issues(&table);
    if table.len() < view.len() {
        output::print_message(&format!(
            "Showing {} of {} matching issues (use `bugdash list` for all)",
            table.len(),
            view.len()
        ));
    }

    Ok(())
}
