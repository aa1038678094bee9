//! Static HTML report generation
//!
//! Turns an extracted record and its derived table into one self-contained
//! HTML document: a chart per lead in document order, the two clinical text
//! blocks, and a generation footer.

mod chart;
mod html;

use ecg_record::{Record, WaveTable};
use std::path::{Path, PathBuf};

/// Result type for report operations
pub type Result<T> = std::result::Result<T, RenderError>;

/// Errors that can occur while rendering the report
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to write report {path:?}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to draw chart for lead {lead}: {message}")]
    Chart { lead: String, message: String },
}

/// Render the report and write it to `path`, replacing any existing file
pub fn write_report(record: &Record, table: &WaveTable, path: &Path) -> Result<()> {
    let document = render_report(record, table)?;

    std::fs::write(path, document).map_err(|e| RenderError::OutputWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    log::info!("Report written to {:?}", path);
    Ok(())
}

/// Render the full HTML document in memory
pub fn render_report(record: &Record, table: &WaveTable) -> Result<String> {
    let mut panels = Vec::with_capacity(table.columns().len());
    for column in table.columns() {
        panels.push(chart::lead_panel(column, table.time(), table.time_span())?);
    }

    log::debug!("Rendered {} lead panels", panels.len());

    Ok(html::assemble(record, &panels))
}
