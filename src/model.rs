use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One type-checker measurement taken at one commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub sha: String,
    /// Commit time, not the time the measurement ran.
    pub date: DateTime<Utc>,
    #[serde(rename = "tsErrorCount")]
    pub ts_error_count: u32,
}

impl Sample {
    pub fn new(sha: impl Into<String>, date: DateTime<Utc>, ts_error_count: u32) -> Self {
        Self {
            sha: sha.into(),
            date,
            ts_error_count,
        }
    }
}

/// On-disk shape of the dataset file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsFile {
    pub stats: Vec<Sample>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub candidates: usize,
    pub skipped: usize,
    pub measured: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub dataset_path: String,
    pub samples: usize,
    pub first: Option<Sample>,
    pub latest: Option<Sample>,
    pub change: Option<i64>,
}
