//! Parse a Jira CSV export into a normalized [`Dataset`].

use std::io::Read;
use std::path::Path;
use std::time::Instant;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{BugdashError, Result};
use crate::types::{Dataset, DateField, Field, Issue};

/// Loader behaviour that varies between dashboard profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Also require the `Issue Type` column.
    pub require_issue_type: bool,
    /// Read ambiguous numeric dates such as `03/04/2024` as day/month.
    pub day_first: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            require_issue_type: false,
            day_first: true,
        }
    }
}

impl LoadOptions {
    pub fn required_columns(&self) -> Vec<&'static str> {
        let mut columns = vec![
            Field::Key.column(),
            Field::Summary.column(),
            Field::Status.column(),
        ];
        if self.require_issue_type {
            columns.push(Field::IssueType.column());
        }
        columns
    }
}

pub fn load_file(path: &Path, options: &LoadOptions) -> Result<Dataset> {
    let bytes = std::fs::read(path).map_err(|source| BugdashError::FileRead {
        path: path.display().to_string(),
        source,
    })?;
    load_bytes(&bytes, options)
}

pub fn load_bytes(bytes: &[u8], options: &LoadOptions) -> Result<Dataset> {
    load_reader(bytes, options)
}

pub fn load_reader<R: Read>(input: R, options: &LoadOptions) -> Result<Dataset> {
    let started = Instant::now();
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if i == 0 {
                h.trim_start_matches('\u{feff}').to_string()
            } else {
                h.to_string()
            }
        })
        .collect();

    let missing: Vec<String> = options
        .required_columns()
        .into_iter()
        .filter(|required| !headers.iter().any(|h| h == required))
        .map(String::from)
        .collect();
    if !missing.is_empty() {
        return Err(BugdashError::MissingColumns { columns: missing });
    }

    let columns = Columns::new(&headers);
    let mut unparsed = [0usize; 3];
    let mut issues = Vec::new();

    for result in reader.records() {
        let record = result?;

        let cells: Vec<String> = (0..headers.len())
            .map(|i| {
                let raw = record.get(i).unwrap_or("");
                if columns.trimmed.contains(&i) {
                    raw.trim().to_string()
                } else {
                    raw.to_string()
                }
            })
            .collect();

        let text = |field: Field| -> Option<String> {
            columns
                .field(field)
                .map(|i| cells[i].as_str())
                .filter(|v| !v.trim().is_empty())
                .map(String::from)
        };

        let mut date = |field: DateField| -> Option<NaiveDateTime> {
            let i = columns.date(field)?;
            let raw = cells[i].trim();
            if raw.is_empty() {
                return None;
            }
            let parsed = parse_timestamp(raw, options.day_first);
            if parsed.is_none() {
                unparsed[field as usize] += 1;
            }
            parsed
        };

        let mut issue = Issue {
            key: text(Field::Key),
            summary: text(Field::Summary),
            issue_type: text(Field::IssueType),
            status: text(Field::Status),
            priority: text(Field::Priority),
            assignee: text(Field::Assignee),
            environment: text(Field::Environment),
            created: date(DateField::Created),
            updated: date(DateField::Updated),
            resolved: date(DateField::Resolved),
            cells: Vec::new(),
        };
        issue.cells = cells;
        issues.push(issue);
    }

    for field in DateField::ALL {
        let count = unparsed[field as usize];
        if count > 0 {
            log::debug!("{count} unparseable value(s) in '{field}' read as blank");
        }
    }
    log::info!(
        "loaded {} issue(s) with {} column(s) in {:?}",
        issues.len(),
        headers.len(),
        started.elapsed()
    );

    Ok(Dataset { headers, issues })
}

/// Header positions of the recognized columns.
struct Columns {
    fields: Vec<(Field, usize)>,
    dates: Vec<(DateField, usize)>,
    trimmed: Vec<usize>,
}

impl Columns {
    fn new(headers: &[String]) -> Self {
        let position = |name: &str| headers.iter().position(|h| h == name);

        let fields: Vec<(Field, usize)> = Field::ALL
            .iter()
            .filter_map(|&f| position(f.column()).map(|i| (f, i)))
            .collect();
        let dates = DateField::ALL
            .iter()
            .filter_map(|&f| position(f.column()).map(|i| (f, i)))
            .collect();
        let trimmed = fields
            .iter()
            .filter(|(f, _)| f.is_trimmed())
            .map(|&(_, i)| i)
            .collect();

        Self {
            fields,
            dates,
            trimmed,
        }
    }

    fn field(&self, field: Field) -> Option<usize> {
        self.fields.iter().find(|(f, _)| *f == field).map(|&(_, i)| i)
    }

    fn date(&self, field: DateField) -> Option<usize> {
        self.dates.iter().find(|(f, _)| *f == field).map(|&(_, i)| i)
    }
}

// Two-digit year forms come first: `%Y` would also accept `24` as year 24.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    // Jira's default export format, e.g. 12/Mar/24 10:15 AM
    "%d/%b/%y %I:%M %p",
    "%d/%b/%Y %I:%M %p",
    "%d/%b/%y %H:%M",
    "%d/%b/%Y %H:%M",
    "%d-%b-%y %H:%M",
    "%d-%b-%Y %H:%M",
];

const DAY_FIRST_DATETIME_FORMATS: &[&str] = &[
    "%d/%m/%y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%y %H:%M",
    "%d/%m/%Y %H:%M",
    "%d/%m/%y %I:%M %p",
    "%d/%m/%Y %I:%M %p",
    "%d.%m.%y %H:%M",
    "%d.%m.%Y %H:%M",
    "%d-%m-%y %H:%M",
    "%d-%m-%Y %H:%M",
];

const MONTH_FIRST_DATETIME_FORMATS: &[&str] = &[
    "%m/%d/%y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%y %H:%M",
    "%m/%d/%Y %H:%M",
    "%m/%d/%y %I:%M %p",
    "%m/%d/%Y %I:%M %p",
    "%m.%d.%y %H:%M",
    "%m.%d.%Y %H:%M",
    "%m-%d-%y %H:%M",
    "%m-%d-%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%b/%y", "%d/%b/%Y", "%d-%b-%y", "%d-%b-%Y"];

const DAY_FIRST_DATE_FORMATS: &[&str] = &[
    "%d/%m/%y", "%d/%m/%Y", "%d.%m.%y", "%d.%m.%Y", "%d-%m-%y", "%d-%m-%Y",
];

const MONTH_FIRST_DATE_FORMATS: &[&str] = &[
    "%m/%d/%y", "%m/%d/%Y", "%m.%d.%y", "%m.%d.%Y", "%m-%d-%y", "%m-%d-%Y",
];

/// Years below this are treated as unparseable rather than as ancient dates.
const MIN_YEAR: i32 = 1000;

/// Parse a timestamp cell. Unrecognized text yields `None`.
pub fn parse_timestamp(text: &str, day_first: bool) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local()).filter(|dt| dt.year() >= MIN_YEAR);
    }
    // Jira REST style: 2024-03-12T10:15:00.000+0100
    if let Ok(dt) = DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.naive_local()).filter(|dt| dt.year() >= MIN_YEAR);
    }

    let (numeric_datetime, numeric_date) = if day_first {
        (DAY_FIRST_DATETIME_FORMATS, DAY_FIRST_DATE_FORMATS)
    } else {
        (MONTH_FIRST_DATETIME_FORMATS, MONTH_FIRST_DATE_FORMATS)
    };

    DATETIME_FORMATS
        .iter()
        .chain(numeric_datetime)
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .chain(numeric_date)
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .filter(|dt| dt.year() >= MIN_YEAR)
}
