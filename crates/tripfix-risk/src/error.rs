use thiserror::Error;
use tripfix_core::CoreError;

use crate::factor::FactorKind;

#[derive(Debug, Error)]
pub enum RiskError {
    /// A case field an evaluator depends on is absent. The engine replaces
    /// the score with the evaluator's conservative default.
    #[error("{factor}: required input `{field}` is missing")]
    MissingInput {
        factor: FactorKind,
        field: &'static str,
    },

    #[error("{factor} produced out-of-range score {score}")]
    OutOfRangeScore { factor: FactorKind, score: f64 },

    #[error("{factor} evaluator failed: {message}")]
    Evaluator { factor: FactorKind, message: String },

    #[error("configuration error: {0}")]
    Config(#[from] CoreError),

    #[error("evaluation dataset is empty")]
    EmptyDataset,

    #[error("file not found: {0}")]
    NotFound(std::path::PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
