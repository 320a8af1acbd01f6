use chrono::NaiveDateTime;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::{DrillArgs, ListArgs};
use crate::drilldown;
use crate::error::Result;
use crate::output::{self, format_datetime, priority_colored, status_colored, truncate};
use crate::session::Session;
use crate::types::{Category, Field, Issue, IssueView};

/// Issue as printed in JSON mode.
#[derive(Serialize, Debug)]
pub struct IssueRecord<'a> {
    pub key: Option<&'a str>,
    pub summary: Option<&'a str>,
    pub issue_type: Option<&'a str>,
    pub status: Option<&'a str>,
    pub priority: Option<&'a str>,
    pub assignee: Option<&'a str>,
    pub environment: Option<&'a str>,
    pub created: Option<NaiveDateTime>,
    pub updated: Option<NaiveDateTime>,
    pub resolved: Option<NaiveDateTime>,
}

impl<'a> From<&'a Issue> for IssueRecord<'a> {
    fn from(issue: &'a Issue) -> Self {
        Self {
            key: issue.key.as_deref(),
            summary: issue.summary.as_deref(),
            issue_type: issue.issue_type.as_deref(),
            status: issue.status.as_deref(),
            priority: issue.priority.as_deref(),
            assignee: issue.assignee.as_deref(),
            environment: issue.environment.as_deref(),
            created: issue.created,
            updated: issue.updated,
            resolved: issue.resolved,
        }
    }
}

#[derive(Tabled)]
struct IssueRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Summary")]
    summary: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Assignee")]
    assignee: String,
    #[tabled(rename = "Environment")]
    environment: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

impl From<&IssueRecord<'_>> for IssueRow {
    fn from(issue: &IssueRecord<'_>) -> Self {
        Self {
            key: issue.key.unwrap_or("-").to_string(),
            summary: truncate(issue.summary.unwrap_or(""), 50),
            status: status_colored(issue.status),
            priority: priority_colored(issue.priority),
            assignee: issue.assignee.unwrap_or("-").to_string(),
            environment: truncate(issue.environment.unwrap_or("-"), 20),
            created: format_datetime(issue.created),
            updated: format_datetime(issue.updated),
        }
    }
}

pub fn records<'a>(view: &IssueView<'a>) -> Vec<IssueRecord<'a>> {
    view.iter().map(IssueRecord::from).collect()
}

/// Print the detail table, or the empty state.
pub fn print_issues(view: &IssueView) {
    if view.is_empty() {
        output::print_empty("issues");
        return;
    }
    output::print_table(&records(view), |issue| IssueRow::from(issue));
}

fn sorted<'a>(view: &IssueView<'a>, sort_by: &[Field]) -> IssueView<'a> {
    if sort_by.is_empty() {
        drilldown::sort_by(view, &drilldown::default_sort(view))
    } else {
        drilldown::sort_by(view, sort_by)
    }
}

pub fn list(session: &Session, args: ListArgs) -> Result<()> {
    let criteria = args.source.filters.criteria()?;
    let view = sorted(&session.filtered(&criteria), &args.sort_by);
    let shown = match args.limit {
        Some(limit) => view.first(limit),
        None => view.clone(),
    };

    print_issues(&shown);
    if shown.len() < view.len() {
        output::print_message(&format!(
            "Showing {} of {} matching issues",
            shown.len(),
            view.len()
        ));
    }

    Ok(())
}

/// Category selected by `drill`: `--blank`, or the given value verbatim.
fn drill_target(args: &DrillArgs) -> Category {
    match (&args.value, args.blank) {
        (Some(value), false) => Category::parse(value),
        _ => Category::Blank,
    }
}

pub fn drill(session: &Session, args: DrillArgs) -> Result<()> {
    let criteria = args.source.filters.criteria()?;
    let view = session.filtered(&criteria);
    let target = drill_target(&args);

    let rows = drilldown::resolve(&view, args.by, &target);
    log::debug!("{} = {target}: {} issue(s)", args.by, rows.len());

    output::heading(&format!("{} = {target} ({} issues)", args.by, rows.len()));
    print_issues(&sorted(&rows, &args.sort_by));

    Ok(())
}
