use std::fs::File;
use std::io::{self, BufWriter};

use crate::cli::ExportArgs;
use crate::error::{BugdashError, Result};
use crate::export::write_csv;
use crate::output;
use crate::session::Session;

pub fn run(session: &Session, args: ExportArgs) -> Result<()> {
    let criteria = args.source.filters.criteria()?;
    let view = session.filtered(&criteria);

    match &args.output {
        Some(path) => {
            let file = File::create(path).map_err(|source| BugdashError::FileWrite {
                path: path.display().to_string(),
                source,
            })?;
            write_csv(&view, BufWriter::new(file))?;
            output::print_message(&format!(
                "Wrote {} of {} issues to {}",
                view.len(),
                session.dataset().len(),
                path.display()
            ));
        }
        None => {
            let stdout = io::stdout();
            write_csv(&view, stdout.lock())?;
        }
    }

    if view.is_empty() {
        log::warn!("no issues match the current filters; exported header only");
    }

    Ok(())
}
