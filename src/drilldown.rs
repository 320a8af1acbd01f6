use std::cmp::Ordering;

use crate::types::{Category, Field, Issue, IssueView, Priority};

/// Rows behind one category of a previous [`value_counts`] result, in order.
///
/// A value that no longer occurs (or a column the export lacks) yields an
/// empty view.
///
/// [`value_counts`]: crate::aggregate::value_counts
pub fn resolve<'a>(view: &IssueView<'a>, field: Field, target: &Category) -> IssueView<'a> {
    if !view.dataset().has(field) {
        return view.retain(|_| false);
    }
    view.retain(|issue| target.matches(issue.get(field)))
}

/// Stable sort by `keys`, earlier keys taking precedence.
///
/// Priorities order by severity, unknown names after known ones; other
/// fields order alphabetically. Blank values go last.
pub fn sort_by<'a>(view: &IssueView<'a>, keys: &[Field]) -> IssueView<'a> {
    let mut issues: Vec<&'a Issue> = view.issues().to_vec();
    issues.sort_by(|a, b| {
        keys.iter()
            .map(|&field| compare_field(field, a.get(field), b.get(field)))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
    IssueView::new(view.dataset(), issues)
}

/// Default order of the detail table: priority, then key.
pub fn default_sort(view: &IssueView) -> Vec<Field> {
    let mut keys = Vec::new();
    if view.dataset().has(Field::Priority) {
        keys.push(Field::Priority);
    }
    keys.push(Field::Key);
    keys
}

fn compare_field(field: Field, a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if field == Field::Priority => {
            match (Priority::from_name(a), Priority::from_name(b)) {
                (Some(pa), Some(pb)) => pa.cmp(&pb),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => a.cmp(b),
            }
        }
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
