//! JSON run report.
//!
//! # Output Structure
//!
//! Reports are grouped by run date, one file per run:
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     ├── cybersecurity_081500.json
//!     └── world-news_120000.json
//! ```

use crate::models::RunReport;
use std::error::Error;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write a [`RunReport`] to `{json_output_dir}/{date}/{actor}_{HHMMSS}.json`.
///
/// Returns the path written.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_run_report(
    report: &RunReport,
    json_output_dir: &str,
) -> Result<String, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(report)?;

    let full_json_dir = format!(
        "{}/{}",
        json_output_dir.trim_end_matches('/'),
        report.local_date
    );
    info!(%full_json_dir, "Ensuring JSON directory exists");
    if let Err(e) = fs::create_dir_all(&full_json_dir).await {
        error!(%full_json_dir, error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let stamp: String = report.local_time.chars().filter(char::is_ascii_digit).take(6).collect();
    let output_json_filename = format!("{}/{}_{}.json", full_json_dir, report.actor, stamp);

    fs::write(&output_json_filename, json).await?;
    info!(path = %output_json_filename, records = report.records.len(), "Wrote run report");

    Ok(output_json_filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> RunReport {
        RunReport {
            actor: "cybersecurity".to_string(),
            source: "all".to_string(),
            local_date: "2025-05-06".to_string(),
            local_time: "08:15:00".to_string(),
            requested: 10,
            fetched: 8,
            new_count: 4,
            recycled_count: 6,
            processed: 9,
            failed: 1,
            records: vec![],
        }
    }

    #[tokio::test]
    async fn test_write_run_report_path_and_contents() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().to_str().unwrap();

        let path = write_run_report(&report(), base).await.unwrap();
        assert!(path.ends_with("2025-05-06/cybersecurity_081500.json"));

        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        let back: RunReport = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.recycled_count, 6);
        assert_eq!(back.actor, "cybersecurity");
    }
}
