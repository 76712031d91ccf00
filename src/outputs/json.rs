//! JSON report output.
//!
//! A `run` can persist the same payload `/api/analysis` serves, organised by
//! date:
//!
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     ├── 08-00-12.json
//!     └── 17-45-03.json
//! ```

use crate::models::AnalysisReport;
use chrono::{Local, NaiveDateTime};
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

/// Relative path of the report for a run started at `at`.
pub fn report_path(at: NaiveDateTime) -> PathBuf {
    PathBuf::from(at.format("%Y-%m-%d").to_string())
        .join(format!("{}.json", at.format("%H-%M-%S")))
}

/// Write an [`AnalysisReport`] under `json_output_dir`, returning the file path.
///
/// # Errors
///
/// Returns an error if serialization, directory creation or the write fails.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_report(
    report: &AnalysisReport,
    json_output_dir: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(report)?;
    let path = PathBuf::from(json_output_dir).join(report_path(Local::now().naive_local()));

    if let Some(dir) = path.parent() {
        info!(dir = %dir.display(), "Ensuring JSON directory exists");
        if let Err(e) = fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to create JSON dir");
            return Err(e.into());
        }
    }

    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote JSON report");
    Ok(path)
}
