use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Label shown for rows whose value is blank.
pub const BLANK_LABEL: &str = "(blank)";

/// Aggregation key: a field value, or the bucket for rows without one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    Value(String),
    Blank,
}

impl Category {
    pub fn from_cell(cell: Option<&str>) -> Self {
        match cell {
            Some(value) => Category::Value(value.to_string()),
            None => Category::Blank,
        }
    }

    /// Category for a user-supplied value. Only empty input selects blank
    /// rows; the display label `(blank)` is an ordinary value here.
    pub fn parse(input: &str) -> Self {
        if input.trim().is_empty() {
            Category::Blank
        } else {
            Category::Value(input.to_string())
        }
    }

    pub fn matches(&self, cell: Option<&str>) -> bool {
        match (self, cell) {
            (Category::Value(expected), Some(actual)) => expected == actual,
            (Category::Blank, None) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Category::Value(value) => value,
            Category::Blank => BLANK_LABEL,
        }
    }
}

// Values sort alphabetically, blanks last.
impl Ord for Category {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Category::Value(a), Category::Value(b)) => a.cmp(b),
            (Category::Value(_), Category::Blank) => Ordering::Less,
            (Category::Blank, Category::Value(_)) => Ordering::Greater,
            (Category::Blank, Category::Blank) => Ordering::Equal,
        }
    }
}

impl PartialOrd for Category {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Category {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Category::Value(value) => serializer.serialize_str(value),
            Category::Blank => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(Category::from_cell(value.as_deref()))
    }
}
