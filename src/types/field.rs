use std::fmt;

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Categorical and text columns of a Jira export.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Field {
    /// Issue key (e.g., V6D-123)
    Key,
    /// Free-text summary
    Summary,
    /// Issue type (Bug, Story, ...)
    IssueType,
    /// Workflow status
    Status,
    /// Priority name (Blocker, Critical, ...)
    Priority,
    /// Assignee display name
    Assignee,
    /// Environment text
    Environment,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Key,
        Field::Summary,
        Field::IssueType,
        Field::Status,
        Field::Priority,
        Field::Assignee,
        Field::Environment,
    ];

    /// Column header used by Jira CSV exports.
    pub fn column(self) -> &'static str {
        match self {
            Field::Key => "Issue key",
            Field::Summary => "Summary",
            Field::IssueType => "Issue Type",
            Field::Status => "Status",
            Field::Priority => "Priority",
            Field::Assignee => "Assignee",
            Field::Environment => "Environment",
        }
    }

    /// Whether the loader trims surrounding whitespace for this column.
    pub fn is_trimmed(self) -> bool {
        matches!(self, Field::Status | Field::Priority | Field::Assignee)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column())
    }
}

/// Timestamp columns of a Jira export.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DateField {
    #[default]
    Created,
    Updated,
    Resolved,
}

impl DateField {
    pub const ALL: [DateField; 3] = [DateField::Created, DateField::Updated, DateField::Resolved];

    pub fn column(self) -> &'static str {
        match self {
            DateField::Created => "Created",
            DateField::Updated => "Updated",
            DateField::Resolved => "Resolved",
        }
    }
}

impl fmt::Display for DateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column())
    }
}

/// Trend bucket width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    #[default]
    Day,
    Month,
}

impl Bucket {
    /// First day of the bucket containing `date`.
    pub fn start_of(self, date: NaiveDate) -> NaiveDate {
        match self {
            Bucket::Day => date,
            Bucket::Month => date.with_day(1).unwrap_or(date),
        }
    }

    /// First day of the bucket following the one that starts at `start`.
    pub fn next(self, start: NaiveDate) -> Option<NaiveDate> {
        match self {
            Bucket::Day => start.succ_opt(),
            Bucket::Month => {
                let (year, month) = if start.month() == 12 {
                    (start.year() + 1, 1)
                } else {
                    (start.year(), start.month() + 1)
                };
                NaiveDate::from_ymd_opt(year, month, 1)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_bucket_truncates_to_first_day() {
        assert_eq!(Bucket::Month.start_of(date(2024, 3, 17)), date(2024, 3, 1));
        assert_eq!(Bucket::Day.start_of(date(2024, 3, 17)), date(2024, 3, 17));
    }

    #[test]
    fn test_month_bucket_rolls_over_year() {
        assert_eq!(Bucket::Month.next(date(2024, 12, 1)), Some(date(2025, 1, 1)));
        assert_eq!(Bucket::Day.next(date(2024, 2, 28)), Some(date(2024, 2, 29)));
    }

    #[test]
    fn test_field_columns_match_jira_headers() {
        assert_eq!(Field::Key.column(), "Issue key");
        assert_eq!(Field::IssueType.column(), "Issue Type");
        assert_eq!(DateField::Resolved.column(), "Resolved");
    }
}
