use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Frequency;

/// Body of `POST /jobs/run`. Both fields fall back to configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RunRequest {
    /// Number of future periods; absent or 0 uses the default
    #[schema(example = 8)]
    pub horizon: Option<i64>,
    /// "W" (weekly) or "M" (monthly)
    #[schema(example = "W")]
    pub frequency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RunSummary {
    /// Number of categories forecast, as a decimal string
    pub categories: String,
    /// Number of forecast points written, as a decimal string
    pub points: String,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RunResult {
    pub horizon: u32,
    pub frequency: Frequency,
    pub version: String,
    /// UTC timestamp, `YYYY-MM-DDTHH:MM:SSZ`
    pub generated_at: String,
    pub summary: RunSummary,
}
