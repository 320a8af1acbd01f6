use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::types::{Bucket, Category, DateField, Field, IssueView};

/// Count of rows per category value.
pub type ValueCounts = Vec<(Category, usize)>;

/// Count of rows per period start, ascending.
pub type TimeSeries = Vec<(NaiveDate, usize)>;

/// Ordering of a [`ValueCounts`] result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CountOrder {
    /// Largest count first, ties alphabetical
    #[default]
    Count,
    /// Alphabetical by value, blanks last
    Key,
}

/// Group rows by the exact value of `field`.
///
/// Returns `None` when the export has no such column. Blank values are
/// counted under [`Category::Blank`].
pub fn value_counts(view: &IssueView, field: Field, order: CountOrder) -> Option<ValueCounts> {
    if !view.dataset().has(field) {
        return None;
    }

    let mut counts: HashMap<Category, usize> = HashMap::new();
    for issue in view.iter() {
        *counts.entry(Category::from_cell(issue.get(field))).or_default() += 1;
    }

    let mut counts: ValueCounts = counts.into_iter().collect();
    match order {
        CountOrder::Count => counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0))),
        CountOrder::Key => counts.sort_by(|a, b| a.0.cmp(&b.0)),
    }
    Some(counts)
}

/// Count rows per day or month of `field`.
///
/// Rows without a timestamp are skipped. The series covers every period
/// from the first to the last populated one, with zero for empty periods.
pub fn time_buckets(view: &IssueView, field: DateField, bucket: Bucket) -> Option<TimeSeries> {
    if !view.dataset().has_date(field) {
        return None;
    }

    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for ts in view.iter().filter_map(|issue| issue.date(field)) {
        *counts.entry(bucket.start_of(ts.date())).or_default() += 1;
    }

    let (Some(&first), Some(&last)) = (counts.keys().next(), counts.keys().next_back()) else {
        return Some(Vec::new());
    };

    let mut series = Vec::new();
    let mut period = Some(first);
    while let Some(start) = period.filter(|p| *p <= last) {
        series.push((start, counts.get(&start).copied().unwrap_or(0)));
        period = bucket.next(start);
    }
    Some(series)
}

/// Longest daily series before trends fall back to months.
pub const MAX_DAILY_PERIODS: i64 = 366;

/// `bucket`, widened to [`Bucket::Month`] when a daily series over the dated
/// rows of `view` would exceed [`MAX_DAILY_PERIODS`].
pub fn fitting_bucket(view: &IssueView, field: DateField, bucket: Bucket) -> Bucket {
    if bucket != Bucket::Day {
        return bucket;
    }

    let mut dates = view.iter().filter_map(|issue| issue.date(field)).map(|ts| ts.date());
    let Some(first) = dates.next() else {
        return bucket;
    };
    let (min, max) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));

    if (max - min).num_days() + 1 > MAX_DAILY_PERIODS {
        Bucket::Month
    } else {
        bucket
    }
}

/// Inputs for the derived KPI counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiSettings {
    pub open_statuses: BTreeSet<String>,
    pub high_priorities: BTreeSet<String>,
    pub recent_days: u32,
    pub recent_field: DateField,
}

impl Default for KpiSettings {
    fn default() -> Self {
        Self {
            open_statuses: ["To Do", "Open", "Reopen", "In Progress"]
                .into_iter()
                .map(String::from)
                .collect(),
            high_priorities: ["Blocker", "Critical"].into_iter().map(String::from).collect(),
            recent_days: 30,
            recent_field: DateField::Created,
        }
    }
}

/// Headline numbers for a filtered view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Kpis {
    /// Rows in the whole export
    pub total: usize,
    /// Rows passing the filters
    pub in_view: usize,
    pub open: Option<usize>,
    pub closed_or_other: Option<usize>,
    pub high_priority: Option<usize>,
    pub recent: Option<usize>,
    pub recent_days: u32,
    pub recent_field: DateField,
}

/// Compute KPIs for `view`. Counts that depend on a missing column are `None`.
///
/// The recent window is `[anchor - recent_days, anchor]`.
pub fn kpis(view: &IssueView, settings: &KpiSettings, anchor: NaiveDateTime) -> Kpis {
    let dataset = view.dataset();
    let in_view = view.len();

    let count_in = |field: Field, allowed: &BTreeSet<String>| -> Option<usize> {
        dataset.has(field).then(|| {
            view.iter()
                .filter(|issue| issue.get(field).is_some_and(|v| allowed.contains(v)))
                .count()
        })
    };

    let open = count_in(Field::Status, &settings.open_statuses);
    let high_priority = count_in(Field::Priority, &settings.high_priorities);

    let recent = dataset.has_date(settings.recent_field).then(|| {
        let window_start = anchor
            .checked_sub_signed(Duration::days(i64::from(settings.recent_days)))
            .unwrap_or(NaiveDateTime::MIN);
        view.iter()
            .filter_map(|issue| issue.date(settings.recent_field))
            .filter(|ts| window_start <= *ts && *ts <= anchor)
            .count()
    });

    Kpis {
        total: dataset.len(),
        in_view,
        open,
        closed_or_other: open.map(|open| in_view - open),
        high_priority,
        recent,
        recent_days: settings.recent_days,
        recent_field: settings.recent_field,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::filter;
    use crate::fixtures;
    use crate::types::FilterCriteria;

    fn value(v: &str) -> Category {
        Category::Value(v.to_string())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_status_counts_on_unfiltered_view() {
        let ds = fixtures::bugs();
        let counts = value_counts(&ds.view(), Field::Status, CountOrder::Count).unwrap();
        assert_eq!(
            counts,
            vec![(value("Closed"), 2), (value("Open"), 2), (value("In Progress"), 1)]
        );
    }

    #[test]
    fn test_counts_sorted_by_key() {
        let ds = fixtures::bugs();
        let counts = value_counts(&ds.view(), Field::Priority, CountOrder::Key).unwrap();
        let keys: Vec<&str> = counts.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(keys, vec!["Blocker", "Critical", "Major", "Minor"]);
    }

    #[test]
    fn test_blank_values_get_their_own_bucket() {
        let ds = fixtures::bugs();
        let counts = value_counts(&ds.view(), Field::Assignee, CountOrder::Count).unwrap();
        assert!(counts.contains(&(Category::Blank, 1)));
        let total: usize = counts.iter().map(|(_, n)| n).sum();
        assert_eq!(total, ds.len());
    }

    #[test]
    fn test_counts_sum_to_view_length() {
        let ds = fixtures::bugs();
        let criteria = FilterCriteria {
            priorities: ["Critical", "Minor"].into_iter().map(String::from).collect(),
            ..FilterCriteria::default()
        };
        let view = filter::apply(&ds.view(), &criteria);
        let counts = value_counts(&view, Field::Status, CountOrder::Count).unwrap();
        let total: usize = counts.iter().map(|(_, n)| n).sum();
        assert_eq!(total, view.len());
    }

    #[test]
    fn test_absent_column_yields_none() {
        let ds = fixtures::load("Issue key,Summary,Status\nA-1,foo,Open\n");
        assert!(value_counts(&ds.view(), Field::Priority, CountOrder::Count).is_none());
        assert!(time_buckets(&ds.view(), DateField::Created, Bucket::Day).is_none());
    }

    #[test]
    fn test_empty_view_aggregates_to_empty() {
        let ds = fixtures::bugs();
        let criteria = FilterCriteria {
            statuses: BTreeSet::from(["Nonexistent".to_string()]),
            ..FilterCriteria::default()
        };
        let view = filter::apply(&ds.view(), &criteria);
        assert_eq!(value_counts(&view, Field::Status, CountOrder::Count), Some(vec![]));
        assert_eq!(time_buckets(&view, DateField::Created, Bucket::Month), Some(vec![]));
    }

    #[test]
    fn test_monthly_buckets_skip_null_dates() {
        let ds = fixtures::bugs();
        let series = time_buckets(&ds.view(), DateField::Created, Bucket::Month).unwrap();
        assert_eq!(series, vec![(date(2024, 3, 1), 3), (date(2024, 4, 1), 1)]);
    }

    #[test]
    fn test_daily_buckets_fill_gaps() {
        let ds = fixtures::bugs();
        let march = FilterCriteria {
            statuses: ["Open", "Closed"].into_iter().map(String::from).collect(),
            ..FilterCriteria::default()
        };
        let view = filter::apply(&ds.view(), &march);
        let series = time_buckets(&view, DateField::Created, Bucket::Day).unwrap();
        assert_eq!(
            series,
            vec![(date(2024, 3, 1), 2), (date(2024, 3, 2), 0), (date(2024, 3, 3), 1)]
        );
    }

    #[test]
    fn test_long_spans_fall_back_to_months() {
        let ds = fixtures::load(
            "Issue key,Summary,Status,Created\n\
             A-1,placeholder,Open,1970-01-01\n\
             A-2,real,Open,2024-03-01 09:00\n",
        );
        assert_eq!(
            fitting_bucket(&ds.view(), DateField::Created, Bucket::Day),
            Bucket::Month
        );
        let series = time_buckets(&ds.view(), DateField::Created, Bucket::Month).unwrap();
        assert_eq!(series.len(), 651);
    }

    #[test]
    fn test_short_spans_keep_daily_buckets() {
        let ds = fixtures::bugs();
        assert_eq!(
            fitting_bucket(&ds.view(), DateField::Created, Bucket::Day),
            Bucket::Day
        );
        assert_eq!(
            fitting_bucket(&ds.view(), DateField::Created, Bucket::Month),
            Bucket::Month
        );
    }

    #[test]
    fn test_kpis() {
        let ds = fixtures::bugs();
        let criteria = FilterCriteria {
            summary: crate::types::SummaryMatch::contains("login"),
            ..FilterCriteria::default()
        };
        let view = filter::apply(&ds.view(), &criteria);
        let anchor = date(2024, 3, 20).and_hms_opt(0, 0, 0).unwrap();
        let kpis = kpis(&view, &KpiSettings::default(), anchor);

        assert_eq!(kpis.total, 5);
        assert_eq!(kpis.in_view, 2);
        assert_eq!(kpis.open, Some(1));
        assert_eq!(kpis.closed_or_other, Some(1));
        assert_eq!(kpis.high_priority, Some(1));
        assert_eq!(kpis.recent, Some(1));
    }

    #[test]
    fn test_recent_window_is_bounded_by_anchor() {
        let ds = fixtures::bugs();
        let settings = KpiSettings {
            recent_days: 7,
            ..KpiSettings::default()
        };
        let anchor = date(2024, 3, 3).and_hms_opt(8, 0, 0).unwrap();
        let kpis = kpis(&ds.view(), &settings, anchor);
        // 03-01 09:00, 03-01 15:30 and 03-03 08:00 fall inside; 04-15 is in the future.
        assert_eq!(kpis.recent, Some(3));
    }

    #[test]
    fn test_kpis_without_optional_columns() {
        let ds = fixtures::load("Issue key,Summary,Status\nA-1,foo,Open\nA-2,bar,Done\n");
        let anchor = date(2024, 1, 1).and_hms_opt(0, 0, 0).unwrap();
        let kpis = kpis(&ds.view(), &KpiSettings::default(), anchor);
        assert_eq!(kpis.open, Some(1));
        assert_eq!(kpis.closed_or_other, Some(1));
        assert_eq!(kpis.high_priority, None);
        assert_eq!(kpis.recent, None);
    }
}
