use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Category, DateField, Field};

/// One row of the export.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Issue {
    pub key: Option<String>,
    pub summary: Option<String>,
    pub issue_type: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assignee: Option<String>,
    pub environment: Option<String>,
    pub created: Option<NaiveDateTime>,
    pub updated: Option<NaiveDateTime>,
    pub resolved: Option<NaiveDateTime>,
    /// Cells in header order, as stored after normalization.
    pub cells: Vec<String>,
}

impl Issue {
    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Key => self.key.as_deref(),
            Field::Summary => self.summary.as_deref(),
            Field::IssueType => self.issue_type.as_deref(),
            Field::Status => self.status.as_deref(),
            Field::Priority => self.priority.as_deref(),
            Field::Assignee => self.assignee.as_deref(),
            Field::Environment => self.environment.as_deref(),
        }
    }

    pub fn date(&self, field: DateField) -> Option<NaiveDateTime> {
        match field {
            DateField::Created => self.created,
            DateField::Updated => self.updated,
            DateField::Resolved => self.resolved,
        }
    }
}

/// A loaded export. Never mutated after load.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub issues: Vec<Issue>,
}

impl Dataset {
    pub fn position(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    pub fn has(&self, field: Field) -> bool {
        self.position(field.column()).is_some()
    }

    pub fn has_date(&self, field: DateField) -> bool {
        self.position(field.column()).is_some()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// View over every row.
    pub fn view(&self) -> IssueView<'_> {
        IssueView {
            dataset: self,
            issues: self.issues.iter().collect(),
        }
    }

    /// Sorted distinct values of a column, `None` if the column is absent.
    pub fn unique_values(&self, field: Field) -> Option<BTreeSet<Category>> {
        if !self.has(field) {
            return None;
        }
        Some(
            self.issues
                .iter()
                .map(|issue| Category::from_cell(issue.get(field)))
                .collect(),
        )
    }
}

/// An order-preserving selection of rows borrowed from a [`Dataset`].
#[derive(Debug, Clone)]
pub struct IssueView<'a> {
    dataset: &'a Dataset,
    issues: Vec<&'a Issue>,
}

impl<'a> IssueView<'a> {
    pub fn new(dataset: &'a Dataset, issues: Vec<&'a Issue>) -> Self {
        Self { dataset, issues }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    pub fn issues(&self) -> &[&'a Issue] {
        &self.issues
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Issue> + '_ {
        self.issues.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Keep the rows matching `predicate`, in order.
    pub fn retain<F>(&self, mut predicate: F) -> IssueView<'a>
    where
        F: FnMut(&Issue) -> bool,
    {
        IssueView {
            dataset: self.dataset,
            issues: self
                .issues
                .iter()
                .copied()
                .filter(|issue| predicate(issue))
                .collect(),
        }
    }

    pub fn first(&self, n: usize) -> IssueView<'a> {
        IssueView {
            dataset: self.dataset,
            issues: self.issues.iter().take(n).copied().collect(),
        }
    }
}
