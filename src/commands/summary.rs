use chrono::{Local, NaiveDate, NaiveDateTime};
use colored::Colorize;

use crate::aggregate::Kpis;
use crate::cli::SummaryArgs;
use crate::error::{BugdashError, Result};
use crate::output;
use crate::session::Session;

/// End of the recent window: the end of `as_of`, or now.
pub fn anchor(as_of: Option<&str>) -> Result<NaiveDateTime> {
    match as_of {
        Some(text) => NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
            .ok()
            .and_then(|day| day.and_hms_opt(23, 59, 59))
            .ok_or_else(|| BugdashError::InvalidDate(text.to_string())),
        None => Ok(Local::now().naive_local()),
    }
}

pub fn print_kpis(kpis: &Kpis) {
    let or_dash = |value: Option<usize>| value.map_or_else(|| "-".to_string(), |v| v.to_string());

    println!("Total bugs (all):         {}", kpis.total.to_string().bold());
    println!("Bugs in view (filters):   {}", kpis.in_view.to_string().bold());
    println!("Open / in progress:       {}", or_dash(kpis.open).yellow());
    println!("Closed / other:           {}", or_dash(kpis.closed_or_other).green());
    println!("High priority:            {}", or_dash(kpis.high_priority).red());
    println!(
        "{:<26}{}",
        format!("{} last {}d:", kpis.recent_field, kpis.recent_days),
        or_dash(kpis.recent)
    );
}

pub fn run(session: &Session, args: SummaryArgs) -> Result<()> {
    let criteria = args.source.filters.criteria()?;
    let view = session.filtered(&criteria);
    let anchor = anchor(args.as_of.as_deref())?;

    let kpis = match args.recent_days {
        Some(days) => {
            let mut settings = session.settings().clone();
            settings.recent_days = days;
            crate::aggregate::kpis(&view, &settings, anchor)
        }
        None => session.kpis(&view, anchor),
    };

    output::print_item(&kpis, print_kpis);
    if view.is_empty() && !output::is_json_output() {
        output::print_empty("issues");
    }

    Ok(())
}
