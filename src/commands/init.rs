use std::collections::BTreeSet;
use std::io::{self, BufRead, Write};

use crate::aggregate::KpiSettings;
use crate::config::Config;
use crate::error::{BugdashError, Result};

fn prompt(question: &str) -> Result<String> {
    print!("{question}");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn parse_list(input: &str) -> Option<BTreeSet<String>> {
    let values: BTreeSet<String> = input
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .collect();
    (!values.is_empty()).then_some(values)
}

fn joined(values: &BTreeSet<String>) -> String {
    values.iter().cloned().collect::<Vec<_>>().join(", ")
}

pub fn run() -> Result<()> {
    let config_path = Config::config_path()?;

    if config_path.exists() {
        let answer = prompt(&format!(
            "Config file already exists at {}. Overwrite? [y/N] ",
            config_path.display()
        ))?;
        if !answer.eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    println!("bugdash configuration");
    println!("=====================\n");

    let defaults = KpiSettings::default();

    let open_statuses = parse_list(&prompt(&format!(
        "Statuses counted as open [{}]: ",
        joined(&defaults.open_statuses)
    ))?);

    let high_priorities = parse_list(&prompt(&format!(
        "Priorities counted as high [{}]: ",
        joined(&defaults.high_priorities)
    ))?);

    let recent_days = prompt(&format!(
        "Recent activity window in days [{}]: ",
        defaults.recent_days
    ))?
    .parse::<u32>()
    .ok();

    let require_issue_type = prompt("Require an 'Issue Type' column? [y/N] ")?
        .eq_ignore_ascii_case("y")
        .then_some(true);

    let config = Config {
        open_statuses,
        high_priorities,
        recent_days,
        require_issue_type,
        ..Config::default()
    };

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| BugdashError::ConfigWrite {
            path: config_path.clone(),
            source: e,
        })?;
    }

    let contents = toml::to_string(&config).unwrap_or_default();
    std::fs::write(&config_path, contents).map_err(|e| BugdashError::ConfigWrite {
        path: config_path.clone(),
        source: e,
    })?;

    println!("\nConfig saved to {}", config_path.display());
    println!("Unset values fall back to the defaults.");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_trims_and_drops_empty() {
        let values = parse_list(" Open, In Progress ,,Reopen").unwrap();
        assert_eq!(values.len(), 3);
        assert!(values.contains("In Progress"));
        assert_eq!(parse_list("  "), None);
    }

    #[test]
    fn test_written_config_reads_back() {
        let config = Config {
            recent_days: Some(14),
            high_priorities: parse_list("Blocker"),
            ..Config::default()
        };
        let text = toml::to_string(&config).unwrap();
        let restored: Config = toml::from_str(&text).unwrap();
        assert_eq!(restored, config);
    }
}
