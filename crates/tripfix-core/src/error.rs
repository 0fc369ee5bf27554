use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("factor weights sum to {sum}, expected 1.0")]
    InvalidWeights { sum: f64 },

    #[error("weight for {factor} must be a finite value in [0, 1], got {weight}")]
    InvalidWeight { factor: &'static str, weight: f64 },

    #[error(
        "tier thresholds must satisfy 0 <= high <= medium <= low <= 1 \
         (low={low}, medium={medium}, high={high})"
    )]
    InvalidTierThresholds { low: f64, medium: f64, high: f64 },

    #[error("invalid duration rule: {0}")]
    InvalidDurationRule(String),

    #[error("config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
