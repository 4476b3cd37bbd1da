//! Output generation: the dataset sink and the per-run JSON report.
//!
//! # Submodules
//!
//! - [`dataset`]: appends one JSON line per processed article
//! - [`json`]: writes a [`RunReport`](crate::models::RunReport) for each run
//!
//! # Output Structure
//!
//! ```text
//! dataset_dir/
//! └── cybersecurity.jsonl          # one record per line, all runs
//!
//! json_output_dir/
//! └── 2025-05-06/
//!     └── cybersecurity_081500.json
//! ```

pub mod dataset;
pub mod json;
