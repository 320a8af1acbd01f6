use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use crate::aggregate::CountOrder;
use crate::error::{BugdashError, Result};
use crate::types::{Bucket, DateField, DateRange, Field, FilterCriteria, SummaryMatch};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Compact,
}

#[derive(Parser)]
#[command(name = "bugdash")]
#[command(about = "Filter, summarize and drill into Jira bug exports", version)]
#[command(after_help = "EXAMPLES:
    bugdash dashboard bugs.csv                     Everything at a glance
    bugdash summary bugs.csv --status Open          KPIs for open bugs
    bugdash breakdown bugs.csv --by assignee        Bugs per assignee
    bugdash drill bugs.csv --by priority Blocker    The rows behind one bar
    bugdash export bugs.csv --search login -O out.csv")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (table, json, compact)
    #[arg(long, short = 'o', global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Output as JSON (alias for --format json)
    #[arg(long, global = true, hide = true)]
    pub json: bool,

    /// Suppress informational messages
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Show detailed error information
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Always re-parse the export instead of reusing a cached parse
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Also require an 'Issue Type' column
    #[arg(long, global = true)]
    pub require_issue_type: bool,
}

impl Cli {
    /// Get the effective output format, considering --json flag
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.format
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show headline counts (total, in view, open, high priority, recent)
    #[command(after_help = "EXAMPLES:
    bugdash summary bugs.csv
    bugdash summary bugs.csv --assignee Ana --recent-days 7")]
    Summary(SummaryArgs),
    /// Count issues per value of a column
    #[command(
        alias = "b",
        after_help = "EXAMPLES:
    bugdash breakdown bugs.csv --by priority
    bugdash breakdown bugs.csv --by status --sort key"
    )]
    Breakdown(BreakdownArgs),
    /// Count issues per day or month
    #[command(after_help = "EXAMPLES:
    bugdash trend bugs.csv
    bugdash trend bugs.csv --field resolved --bucket month")]
    Trend(TrendArgs),
    /// List matching issues
    #[command(
        alias = "ls",
        after_help = "EXAMPLES:
    bugdash list bugs.csv --priority Blocker --priority Critical
    bugdash list bugs.csv --sort-by status --sort-by priority --limit 20"
    )]
    List(ListArgs),
    /// List the issues behind one value of a breakdown
    #[command(after_help = "EXAMPLES:
    bugdash drill bugs.csv --by priority Blocker
    bugdash drill bugs.csv --by assignee --blank")]
    Drill(DrillArgs),
    /// Write matching issues as CSV
    #[command(after_help = "EXAMPLES:
    bugdash export bugs.csv --status Open -O open.csv
    bugdash export bugs.csv --search crash > crashes.csv")]
    Export(ExportArgs),
    /// Summary, breakdowns, trend and table in one view
    #[command(after_help = "EXAMPLES:
    bugdash dashboard bugs.csv
    bugdash dashboard bugs.csv --from 2024-01-01 --to 2024-03-31")]
    Dashboard(DashboardArgs),
    /// List the distinct values of a column
    #[command(after_help = "EXAMPLES:
    bugdash values bugs.csv --by status")]
    Values(ValuesArgs),
    /// Generate shell completions
    #[command(after_help = "EXAMPLES:
    bugdash completions bash > ~/.bash_completion.d/bugdash
    bugdash completions zsh > ~/.zfunc/_bugdash")]
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
    /// Initialize configuration file interactively
    Init,
}

#[derive(Args, Clone, Debug, Default)]
pub struct FilterArgs {
    /// Keep only these statuses (repeatable or comma separated)
    #[arg(long, value_delimiter = ',')]
    pub status: Vec<String>,

    /// Keep only these priorities
    #[arg(long, value_delimiter = ',')]
    pub priority: Vec<String>,

    /// Keep only these assignees
    #[arg(long, value_delimiter = ',')]
    pub assignee: Vec<String>,

    /// Keep only these issue types
    #[arg(long, value_delimiter = ',')]
    pub issue_type: Vec<String>,

    /// Keep issues whose summary contains this text (case-insensitive)
    #[arg(long, short)]
    pub search: Option<String>,

    /// Treat --search as a regular expression
    #[arg(long, requires = "search")]
    pub regex: bool,

    /// Date column used by --from/--to
    #[arg(long, value_enum, default_value = "created")]
    pub date_field: DateField,

    /// First day of the date range (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub from: Option<String>,

    /// Last day of the date range (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub to: Option<String>,
}

impl FilterArgs {
    pub fn criteria(&self) -> Result<FilterCriteria> {
        let summary = match self.search.as_deref() {
            Some(pattern) if self.regex => SummaryMatch::regex(pattern)?,
            Some(pattern) => SummaryMatch::contains(pattern),
            None => SummaryMatch::Any,
        };

        let date_range = match (&self.from, &self.to) {
            (None, None) => None,
            (from, to) => {
                let start = from.as_deref().map(parse_day).transpose()?.unwrap_or(NaiveDate::MIN);
                let end = to.as_deref().map(parse_day).transpose()?.unwrap_or(NaiveDate::MAX);
                Some(DateRange::new(self.date_field, start, end)?)
            }
        };

        Ok(FilterCriteria {
            statuses: to_set(&self.status),
            priorities: to_set(&self.priority),
            assignees: to_set(&self.assignee),
            issue_types: to_set(&self.issue_type),
            summary,
            date_range,
        })
    }
}

fn to_set(values: &[String]) -> BTreeSet<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(String::from)
        .collect()
}

fn parse_day(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|_| BugdashError::InvalidDate(text.to_string()))
}

#[derive(Args, Clone, Debug)]
pub struct SourceArgs {
    /// Jira CSV export
    pub file: PathBuf,

    #[command(flatten)]
    pub filters: FilterArgs,
}

#[derive(Args, Clone, Debug)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Length of the recent-activity window in days
    #[arg(long)]
    pub recent_days: Option<u32>,

    /// End of the recent-activity window (YYYY-MM-DD, default: now)
    #[arg(long)]
    pub as_of: Option<String>,
}

#[derive(Args, Clone, Debug)]
pub struct BreakdownArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Column to group by
    #[arg(long, value_enum)]
    pub by: Field,

    /// Order by count or by value
    #[arg(long, value_enum, default_value = "count")]
    pub sort: CountOrder,
}

#[derive(Args, Clone, Debug)]
pub struct TrendArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Date column to bucket
    #[arg(long, value_enum, default_value = "created")]
    pub field: DateField,

    /// Bucket width
    #[arg(long, value_enum, default_value = "day")]
    pub bucket: Bucket,
}

#[derive(Args, Clone, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Sort keys, earlier first (default: priority, key)
    #[arg(long, value_enum, value_delimiter = ',')]
    pub sort_by: Vec<Field>,

    /// Maximum number of issues to show
    #[arg(long, short)]
    pub limit: Option<usize>,
}

#[derive(Args, Clone, Debug)]
pub struct DrillArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Column the value belongs to
    #[arg(long, value_enum)]
    pub by: Field,

    /// Value to drill into
    #[arg(required_unless_present = "blank")]
    pub value: Option<String>,

    /// Drill into issues with no value in the column
    #[arg(long, conflicts_with = "value")]
    pub blank: bool,

    /// Sort keys for the result (default: priority, key)
    #[arg(long, value_enum, value_delimiter = ',')]
    pub sort_by: Vec<Field>,
}

#[derive(Args, Clone, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output file (default: stdout)
    #[arg(long, short = 'O')]
    pub output: Option<PathBuf>,
}

#[derive(Args, Clone, Debug)]
pub struct DashboardArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Trend bucket width
    #[arg(long, value_enum, default_value = "day")]
    pub bucket: Bucket,

    /// Maximum number of issues in the table
    #[arg(long, short, default_value = "25")]
    pub limit: usize,
}

#[derive(Args, Clone, Debug)]
pub struct ValuesArgs {
    /// Jira CSV export
    pub file: PathBuf,

    /// Column to list
    #[arg(long, value_enum)]
    pub by: Field,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_repeated_and_comma_separated_filters() {
        let cli = Cli::parse_from([
            "bugdash", "list", "bugs.csv", "--status", "Open,In Progress", "--status", "Reopen",
        ]);
        let Commands::List(args) = cli.command else {
            panic!("expected list");
        };
        let criteria = args.source.filters.criteria().unwrap();
        assert_eq!(criteria.statuses.len(), 3);
        assert!(criteria.statuses.contains("In Progress"));
    }

    #[test]
    fn test_open_ended_date_range() {
        let args = FilterArgs {
            from: Some("2024-03-01".to_string()),
            ..FilterArgs::default()
        };
        let range = args.criteria().unwrap().date_range.unwrap();
        assert_eq!(range.field, DateField::Created);
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(range.end, NaiveDate::MAX);
    }

    #[test]
    fn test_bad_date_is_rejected() {
        let args = FilterArgs {
            to: Some("03/01/2024".to_string()),
            ..FilterArgs::default()
        };
        assert!(matches!(args.criteria(), Err(BugdashError::InvalidDate(_))));
    }

    #[test]
    fn test_drill_takes_a_value_or_blank() {
        let cli = Cli::parse_from(["bugdash", "drill", "bugs.csv", "--by", "assignee", "--blank"]);
        let Commands::Drill(args) = cli.command else {
            panic!("expected drill");
        };
        assert!(args.blank);
        assert_eq!(args.value, None);

        let cli = Cli::parse_from(["bugdash", "drill", "bugs.csv", "--by", "status", "(blank)"]);
        let Commands::Drill(args) = cli.command else {
            panic!("expected drill");
        };
        assert!(!args.blank);
        assert_eq!(args.value.as_deref(), Some("(blank)"));

        assert!(Cli::try_parse_from(["bugdash", "drill", "bugs.csv", "--by", "status"]).is_err());
        assert!(
            Cli::try_parse_from(["bugdash", "drill", "bugs.csv", "--by", "status", "Open", "--blank"])
                .is_err()
        );
    }

    #[test]
    fn test_json_flag_overrides_format() {
        let cli = Cli::parse_from(["bugdash", "--json", "values", "bugs.csv", "--by", "status"]);
        assert_eq!(cli.output_format(), OutputFormat::Json);
    }
}
