mod category;
mod criteria;
mod field;
mod issue;
mod priority;

pub use category::Category;
pub use criteria::{DateRange, FilterCriteria, SummaryMatch};
pub use field::{Bucket, DateField, Field};
pub use issue::{Dataset, Issue, IssueView};
pub use priority::Priority;
