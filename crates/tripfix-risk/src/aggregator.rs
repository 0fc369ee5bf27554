//! Weighted aggregation of factor scores into confidence and risk tier.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;
use tripfix_core::config::TierThresholds;

use crate::error::RiskError;
use crate::factor::{FactorKind, RiskFactor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskTier {
    pub const ALL: [RiskTier; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    /// Step function over confidence. Lower bounds are inclusive, so a
    /// confidence exactly on a threshold lands in the less risky tier.
    pub fn from_confidence(confidence: f64, tiers: &TierThresholds) -> Self {
        if confidence >= tiers.low {
            Self::Low
        } else if confidence >= tiers.medium {
            Self::Medium
        } else if confidence >= tiers.high {
            Self::High
        } else {
            Self::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accept a raw evaluator score only if it lies in [0, 1].
pub fn check_score(kind: FactorKind, raw: f64) -> Result<f64, RiskError> {
    if (0.0..=1.0).contains(&raw) {
        Ok(raw)
    } else {
        Err(RiskError::OutOfRangeScore {
            factor: kind,
            score: raw,
        })
    }
}

/// Bring a raw evaluator score into [0, 1]. NaN becomes 0.0.
pub fn sanitize_score(kind: FactorKind, raw: f64) -> f64 {
    match check_score(kind, raw) {
        Ok(score) => score,
        Err(err) => {
            warn!(error = %err, "clamping evaluator score");
            if raw.is_nan() { 0.0 } else { raw.clamp(0.0, 1.0) }
        }
    }
}

/// `Σ weight · score`, clamped to [0, 1].
pub fn aggregate(factors: &[RiskFactor]) -> f64 {
    let total: f64 = factors.iter().map(RiskFactor::contribution).sum();
    if total.is_nan() {
        return 0.0;
    }
    total.clamp(0.0, 1.0)
}
