//! JSON Lines dataset sink: one [`EnrichedRecord`] per line, appended in batch order.

use crate::models::EnrichedRecord;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

#[derive(Debug, Clone)]
pub struct DatasetWriter {
    path: PathBuf,
}

impl DatasetWriter {
    /// Dataset for `actor` under `dir`: `{dir}/{actor}.jsonl`.
    pub fn new(dir: &Path, actor: &str) -> Self {
        Self {
            path: dir.join(format!("{actor}.jsonl")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record. The line is written with a single call and flushed.
    #[instrument(level = "debug", skip_all, fields(url = %record.url))]
    pub async fn push(&self, record: &EnrichedRecord) -> Result<(), Box<dyn Error>> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        debug!(path = %self.path.display(), "Pushed record to dataset");
        Ok(())
    }
}
