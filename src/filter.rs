use crate::types::{Field, FilterCriteria, Issue, IssueView};

// ---------------------------------------------------------------------------
// Filter composition: every enabled constraint must hold
// ---------------------------------------------------------------------------

const SET_FIELDS: [Field; 4] = [
    Field::Status,
    Field::Priority,
    Field::Assignee,
    Field::IssueType,
];

/// Return the rows of `view` passing all active constraints, in order.
///
/// A row passes a set-membership constraint when:
/// * The allowed set is empty → passes (no constraint)
/// * The column is absent from the export → passes (constraint disabled)
/// * The row's value is in the allowed set → passes
///
/// Blank values never satisfy a non-empty set. The summary matcher and the
/// date range follow the same "absent column disables" rule.
pub fn apply<'a>(view: &IssueView<'a>, criteria: &FilterCriteria) -> IssueView<'a> {
    if criteria.is_unrestricted() {
        return view.clone();
    }

    let dataset = view.dataset();
    let set_fields: Vec<Field> = SET_FIELDS
        .into_iter()
        .filter(|&f| dataset.has(f))
        .filter(|&f| criteria.allowed(f).is_some_and(|set| !set.is_empty()))
        .collect();
    let match_summary = criteria.summary.is_active() && dataset.has(Field::Summary);
    let date_range = criteria
        .date_range
        .filter(|range| dataset.has_date(range.field));

    view.retain(|issue| {
        set_fields.iter().all(|&f| passes_set(issue, f, criteria))
            && (!match_summary || criteria.summary.matches(issue.summary.as_deref()))
            && date_range.map_or(true, |range| {
                issue
                    .date(range.field)
                    .is_some_and(|ts| range.contains(ts))
            })
    })
}

fn passes_set(issue: &Issue, field: Field, criteria: &FilterCriteria) -> bool {
    match (criteria.allowed(field), issue.get(field)) {
        (Some(allowed), Some(value)) => allowed.contains(value),
        (Some(allowed), None) => allowed.is_empty(),
        (None, _) => true,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::NaiveDate;

    use super::*;
    use crate::fixtures;
    use crate::types::{DateField, DateRange, SummaryMatch};

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn keys(view: &IssueView) -> Vec<String> {
        view.iter().filter_map(|i| i.key.clone()).collect()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_status_filter_keeps_order() {
        let ds = fixtures::bugs();
        let criteria = FilterCriteria {
            statuses: set(&["Open", "In Progress"]),
            ..FilterCriteria::default()
        };
        let view = apply(&ds.view(), &criteria);
        assert_eq!(view.len(), 3);
        assert_eq!(keys(&view), vec!["V6D-1", "V6D-3", "V6D-4"]);
    }

    #[test]
    fn test_empty_criteria_passes_everything() {
        let ds = fixtures::bugs();
        let view = apply(&ds.view(), &FilterCriteria::default());
        assert_eq!(view.len(), ds.len());
    }

    #[test]
    fn test_set_membership_is_case_sensitive() {
        let ds = fixtures::bugs();
        let criteria = FilterCriteria {
            statuses: set(&["open"]),
            ..FilterCriteria::default()
        };
        assert!(apply(&ds.view(), &criteria).is_empty());
    }

    #[test]
    fn test_constraints_are_conjunctive() {
        let ds = fixtures::bugs();
        let criteria = FilterCriteria {
            statuses: set(&["Open", "Closed"]),
            priorities: set(&["Critical"]),
            summary: SummaryMatch::contains("EXPORT"),
            ..FilterCriteria::default()
        };
        assert_eq!(keys(&apply(&ds.view(), &criteria)), vec!["V6D-3"]);
    }

    #[test]
    fn test_blank_assignee_fails_assignee_filter() {
        let ds = fixtures::bugs();
        let criteria = FilterCriteria {
            assignees: set(&["Ana", "Ben"]),
            ..FilterCriteria::default()
        };
        let view = apply(&ds.view(), &criteria);
        assert_eq!(keys(&view), vec!["V6D-1", "V6D-2", "V6D-4", "V6D-5"]);
    }

    #[test]
    fn test_filter_on_absent_column_is_ignored() {
        let ds = fixtures::load("Issue key,Summary,Status\nA-1,foo,Open\nA-2,bar,Closed\n");
        let criteria = FilterCriteria {
            priorities: set(&["Blocker"]),
            date_range: Some(
                DateRange::new(DateField::Created, date(2024, 1, 1), date(2024, 12, 31)).unwrap(),
            ),
            ..FilterCriteria::default()
        };
        assert_eq!(apply(&ds.view(), &criteria).len(), 2);
    }

    #[test]
    fn test_date_range_excludes_unparseable_dates() {
        let ds = fixtures::bugs();
        let criteria = FilterCriteria {
            date_range: Some(
                DateRange::new(DateField::Created, date(2024, 3, 1), date(2024, 3, 31)).unwrap(),
            ),
            ..FilterCriteria::default()
        };
        let view = apply(&ds.view(), &criteria);
        assert_eq!(keys(&view), vec!["V6D-1", "V6D-2", "V6D-3"]);

        // Without a range the row with "not-a-date" is still there.
        let all = apply(&ds.view(), &FilterCriteria::default());
        assert!(keys(&all).contains(&"V6D-5".to_string()));
    }

    #[test]
    fn test_date_range_over_resolved_skips_unresolved() {
        let ds = fixtures::bugs();
        let criteria = FilterCriteria {
            date_range: Some(
                DateRange::new(DateField::Resolved, date(2024, 1, 1), date(2024, 12, 31)).unwrap(),
            ),
            ..FilterCriteria::default()
        };
        assert_eq!(keys(&apply(&ds.view(), &criteria)), vec!["V6D-2", "V6D-5"]);
    }

    #[test]
    fn test_filter_is_monotonic_in_allowed_sets() {
        let ds = fixtures::bugs();
        let narrow = FilterCriteria {
            statuses: set(&["Open"]),
            priorities: set(&["Critical"]),
            ..FilterCriteria::default()
        };
        let wide = FilterCriteria {
            statuses: set(&["Open", "Closed"]),
            priorities: set(&["Critical", "Blocker"]),
            ..FilterCriteria::default()
        };
        let narrow_keys = keys(&apply(&ds.view(), &narrow));
        let wide_keys = keys(&apply(&ds.view(), &wide));
        assert!(!narrow_keys.is_empty());
        assert!(narrow_keys.iter().all(|k| wide_keys.contains(k)));
    }

    #[test]
    fn test_filter_does_not_mutate_dataset() {
        let ds = fixtures::bugs();
        let before = ds.clone();
        let criteria = FilterCriteria {
            statuses: set(&["Closed"]),
            ..FilterCriteria::default()
        };
        let _ = apply(&ds.view(), &criteria);
        assert_eq!(ds, before);
    }
}
