use std::fmt;

use colored::Colorize;

/// Priority names shipped with Jira's default schemes, most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    Blocker,
    Highest,
    Critical,
    High,
    Major,
    Medium,
    Minor,
    Low,
    Lowest,
    Trivial,
}

impl Priority {
    /// Recognize a priority name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        let priority = match name.trim().to_ascii_lowercase().as_str() {
            "blocker" => Priority::Blocker,
            "highest" => Priority::Highest,
            "critical" => Priority::Critical,
            "high" => Priority::High,
            "major" => Priority::Major,
            "medium" => Priority::Medium,
            "minor" => Priority::Minor,
            "low" => Priority::Low,
            "lowest" => Priority::Lowest,
            "trivial" => Priority::Trivial,
            _ => return None,
        };
        Some(priority)
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Blocker => "Blocker",
            Priority::Highest => "Highest",
            Priority::Critical => "Critical",
            Priority::High => "High",
            Priority::Major => "Major",
            Priority::Medium => "Medium",
            Priority::Minor => "Minor",
            Priority::Low => "Low",
            Priority::Lowest => "Lowest",
            Priority::Trivial => "Trivial",
        }
    }

    /// Color a priority name as it appears in the export.
    pub fn colored(name: &str) -> String {
        match Self::from_name(name) {
            Some(Priority::Blocker | Priority::Highest) => name.red().bold().to_string(),
            Some(Priority::Critical | Priority::High) => name.yellow().bold().to_string(),
            Some(Priority::Major | Priority::Medium) => name.blue().to_string(),
            Some(Priority::Minor | Priority::Low | Priority::Lowest | Priority::Trivial) => {
                name.bright_black().to_string()
            }
            None => name.to_string(),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_ignores_case_and_whitespace() {
        assert_eq!(Priority::from_name(" blocker "), Some(Priority::Blocker));
        assert_eq!(Priority::from_name("CRITICAL"), Some(Priority::Critical));
        assert_eq!(Priority::from_name("P1"), None);
    }

    #[test]
    fn test_severity_order() {
        assert!(Priority::Blocker < Priority::Critical);
        assert!(Priority::Critical < Priority::Major);
        assert!(Priority::Minor < Priority::Trivial);
    }
}
