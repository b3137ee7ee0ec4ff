//! JSON snapshot output.
//!
//! Every refresh is kept under its date directory, and `latest.json` is
//! overwritten so consumers have a stable path to poll.

use super::compact_time;
use crate::models::DashboardSnapshot;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write `snapshot` to `{dir}/{date}/{HHMMSS}.json` and `{dir}/latest.json`.
///
/// # Arguments
///
/// * `snapshot` - The refresh to serialize
/// * `json_output_dir` - Base directory for JSON output
///
/// # Returns
///
/// The path of the dated file.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_snapshot(
    snapshot: &DashboardSnapshot,
    json_output_dir: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(snapshot)?;

    let dated_dir = PathBuf::from(json_output_dir).join(&snapshot.local_date);
    if let Err(e) = fs::create_dir_all(&dated_dir).await {
        error!(dir = %dated_dir.display(), error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let dated_path = dated_dir.join(format!("{}.json", compact_time(&snapshot.local_time)));
    fs::write(&dated_path, &json).await?;

    let latest_path = PathBuf::from(json_output_dir).join("latest.json");
    fs::write(&latest_path, &json).await?;

    info!(path = %dated_path.display(), "Wrote JSON snapshot");
    Ok(dated_path)
}
