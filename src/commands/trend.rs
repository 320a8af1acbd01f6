use chrono::NaiveDate;
use serde::Serialize;
use tabled::Tabled;

use crate::aggregate::{fitting_bucket, time_buckets, MAX_DAILY_PERIODS};
use crate::cli::TrendArgs;
use crate::error::Result;
use crate::output;
use crate::session::Session;
use crate::types::{Bucket, DateField, IssueView};

const BAR_WIDTH: usize = 40;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TrendEntry {
    pub period: NaiveDate,
    pub count: usize,
}

#[derive(Tabled)]
struct TrendRow {
    #[tabled(rename = "Period")]
    period: String,
    #[tabled(rename = "Count")]
    count: usize,
    #[tabled(rename = "")]
    bar: String,
}

pub fn trend_for(view: &IssueView, field: DateField, bucket: Bucket) -> Option<Vec<TrendEntry>> {
    time_buckets(view, field, bucket).map(|series| {
        series
            .into_iter()
            .map(|(period, count)| TrendEntry { period, count })
            .collect()
    })
}

fn period_label(period: NaiveDate, bucket: Bucket) -> String {
    match bucket {
        Bucket::Day => period.format("%Y-%m-%d").to_string(),
        Bucket::Month => period.format("%Y-%m").to_string(),
    }
}

pub fn print_trend(entries: &[TrendEntry], bucket: Bucket) {
    if entries.is_empty() {
        output::print_empty("dated issues");
        return;
    }

    let max = entries.iter().map(|e| e.count).max().unwrap_or(0);
    output::print_table(entries, |entry| TrendRow {
        period: period_label(entry.period, bucket),
        count: entry.count,
        bar: output::bar(entry.count, max, BAR_WIDTH),
    });
}

pub fn run(session: &Session, args: TrendArgs) -> Result<()> {
    let criteria = args.source.filters.criteria()?;
    let view = session.filtered(&criteria);

    let bucket = fitting_bucket(&view, args.field, args.bucket);
    if bucket != args.bucket {
        log::info!("dates span more than {MAX_DAILY_PERIODS} days, grouping by month");
    }

    match trend_for(&view, args.field, bucket) {
        Some(entries) => {
            let per = match bucket {
                Bucket::Day => "day",
                Bucket::Month => "month",
            };
            output::heading(&format!("Bugs {} per {per}", args.field.column().to_lowercase()));
            print_trend(&entries, bucket);
        }
        None => output::print_message(&format!(
            "Column '{}' is not present in this export",
            args.field
        )),
    }

    Ok(())
}
