use std::io::Write;

use crate::error::Result;
use crate::types::IssueView;

/// Write the rows of `view` as CSV with the export's original header.
pub fn write_csv<W: Write>(view: &IssueView, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(&view.dataset().headers)?;
    for issue in view.iter() {
        writer.write_record(&issue.cells)?;
    }
    writer.flush()?;
    Ok(())
}
