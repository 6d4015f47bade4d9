// src/analysis/types.rs
// Wire types and error definitions for the analysis service.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Successful response body from the analysis endpoint. Immutable once
/// received; a new successful submission replaces the previous value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub analysis: String,
    pub reading_speed: f64,
    pub cost: CostBreakdown,
    pub transcription: String,
    pub feedback: String,
    pub corrected_transcription: String,
    pub accuracy: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostBreakdown {
    #[serde(rename = "assemblyAI")]
    pub assembly_ai: f64,
    #[serde(rename = "openAI")]
    pub open_ai: f64,
}

/// Optional failure body on non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Analysis service error: {0}")]
    Remote(String),

    #[error("Malformed analysis response: {0}")]
    InvalidResponse(String),
}
