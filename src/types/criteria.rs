use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};
use regex::{Regex, RegexBuilder};

use super::{DateField, Field};
use crate::error::{BugdashError, Result};

/// How the summary text is matched.
#[derive(Debug, Clone, Default)]
pub enum SummaryMatch {
    #[default]
    Any,
    /// Case-insensitive substring; stored lowercased.
    Contains(String),
    Regex(Regex),
}

impl SummaryMatch {
    pub fn contains(pattern: &str) -> Self {
        if pattern.is_empty() {
            SummaryMatch::Any
        } else {
            SummaryMatch::Contains(pattern.to_lowercase())
        }
    }

    pub fn regex(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Ok(SummaryMatch::Any);
        }
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map(SummaryMatch::Regex)
            .map_err(|source| BugdashError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, SummaryMatch::Any)
    }

    /// Blank summaries never match an active pattern.
    pub fn matches(&self, summary: Option<&str>) -> bool {
        match (self, summary) {
            (SummaryMatch::Any, _) => true,
            (_, None) => false,
            (SummaryMatch::Contains(needle), Some(text)) => text.to_lowercase().contains(needle),
            (SummaryMatch::Regex(re), Some(text)) => re.is_match(text),
        }
    }
}

/// Inclusive calendar-date range over one timestamp column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub field: DateField,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(field: DateField, start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(BugdashError::InvalidRange {
                from: start.to_string(),
                to: end.to_string(),
            });
        }
        Ok(Self { field, start, end })
    }

    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        let day = timestamp.date();
        self.start <= day && day <= self.end
    }
}

/// Active filter selections. Empty sets and [`SummaryMatch::Any`] impose no
/// restriction.
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    pub statuses: BTreeSet<String>,
    pub priorities: BTreeSet<String>,
    pub assignees: BTreeSet<String>,
    pub issue_types: BTreeSet<String>,
    pub summary: SummaryMatch,
    pub date_range: Option<DateRange>,
}

impl FilterCriteria {
    /// Allowed values for a set-membership field, if that field has one.
    pub fn allowed(&self, field: Field) -> Option<&BTreeSet<String>> {
        match field {
            Field::Status => Some(&self.statuses),
            Field::Priority => Some(&self.priorities),
            Field::Assignee => Some(&self.assignees),
            Field::IssueType => Some(&self.issue_types),
            Field::Key | Field::Summary | Field::Environment => None,
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        self.statuses.is_empty()
            && self.priorities.is_empty()
            && self.assignees.is_empty()
            && self.issue_types.is_empty()
            && !self.summary.is_active()
            && self.date_range.is_none()
    }
}
