//! Sample exports shared by unit tests.

use crate::loader::{load_bytes, LoadOptions};
use crate::types::Dataset;

pub const BUGS_CSV: &str = "\
Issue key,Summary,Issue Type,Status,Priority,Assignee,Environment,Created,Updated,Resolved
V6D-1,Login page crashes on submit,Bug,Open,Blocker,Ana,Prod,2024-03-01 09:00,2024-03-02 10:00,
V6D-2,Totals wrong in monthly report,Bug,Closed,Critical,Ben,UAT,2024-03-01 15:30,2024-03-05 11:00,2024-03-05 11:00
V6D-3,Export hangs for large files,Bug,Open,Critical,,Prod,2024-03-03 08:00,2024-04-01 08:00,
V6D-4,Session timeout too short,Task,In Progress,Major,Ana,,2024-04-15 12:00,2024-04-16 12:00,
V6D-5,Typo in login banner,Bug,Closed,Minor,Ben,Prod,not-a-date,2024-04-20 09:00,2024-04-20 09:00
";

pub fn bugs() -> Dataset {
    load(BUGS_CSV)
}

pub fn load(csv: &str) -> Dataset {
    load_bytes(csv.as_bytes(), &LoadOptions::default()).expect("fixture should load")
}
