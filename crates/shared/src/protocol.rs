use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::GenerationOptions;

pub mod endpoints {
    pub const ANALYZE: &str = "/analyze";
    pub const ENTROPY_CALCULATE: &str = "/entropy/calculate";
    pub const GENERATE: &str = "/generate";
    pub const GENERATE_BULK: &str = "/generate/bulk";
    pub const HEALTH: &str = "/health";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub length: u32,
    pub options: GenerationOptions,
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub password: String,
    pub entropy: f64,
    pub strength_estimate: String,
}

impl fmt::Debug for GenerationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationResult")
            .field("password", &"<redacted>")
            .field("entropy", &self.entropy)
            .field("strength_estimate", &self.strength_estimate)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkGenerationRequest {
    pub length: u32,
    pub count: u32,
    pub options: GenerationOptions,
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkGenerationResponse {
    pub passwords: Vec<String>,
}

impl fmt::Debug for BulkGenerationResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BulkGenerationResponse")
            .field("passwords", &self.passwords.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntropyEstimate {
    pub entropy: f64,
    pub rating: String,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub password: String,
}

impl fmt::Debug for AnalyzeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyzeRequest")
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub analysis: AnalysisResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub length: u32,
    pub entropy: f64,
    pub diversity_score: f64,
    pub crack_time: String,
    pub has_uppercase: bool,
    pub has_lowercase: bool,
    pub has_numbers: bool,
    pub has_symbols: bool,
    #[serde(default)]
    pub detected_patterns: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    /// Meter position in percent.
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub strength: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub success: bool,
    #[serde(default)]
    pub status: String,
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
