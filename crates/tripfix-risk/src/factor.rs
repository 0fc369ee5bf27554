//! Risk factor kinds, scored factors, and the evaluator seam.

use std::fmt;

use serde::{Deserialize, Serialize};
use tripfix_core::config::FactorWeights;

use crate::context::CaseContext;
use crate::error::RiskError;

/// The seven fixed risk dimensions, in assessment order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorKind {
    JurisdictionClarity,
    LegalComplexity,
    DelayReasonAmbiguity,
    DataCompleteness,
    RegulatoryEdgeCases,
    FinancialImpact,
    PrecedentSimilarity,
}

impl FactorKind {
    pub const ALL: [FactorKind; 7] = [
        Self::JurisdictionClarity,
        Self::LegalComplexity,
        Self::DelayReasonAmbiguity,
        Self::DataCompleteness,
        Self::RegulatoryEdgeCases,
        Self::FinancialImpact,
        Self::PrecedentSimilarity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JurisdictionClarity => "jurisdiction_clarity",
            Self::LegalComplexity => "legal_complexity",
            Self::DelayReasonAmbiguity => "delay_reason_ambiguity",
            Self::DataCompleteness => "data_completeness",
            Self::RegulatoryEdgeCases => "regulatory_edge_cases",
            Self::FinancialImpact => "financial_impact",
            Self::PrecedentSimilarity => "precedent_similarity",
        }
    }

    /// Human-readable name for summaries and display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::JurisdictionClarity => "Jurisdiction clarity",
            Self::LegalComplexity => "Legal complexity",
            Self::DelayReasonAmbiguity => "Delay reason ambiguity",
            Self::DataCompleteness => "Data completeness",
            Self::RegulatoryEdgeCases => "Regulatory edge cases",
            Self::FinancialImpact => "Financial impact",
            Self::PrecedentSimilarity => "Precedent similarity",
        }
    }

    pub fn weight(&self, weights: &FactorWeights) -> f64 {
        match self {
            Self::JurisdictionClarity => weights.jurisdiction_clarity,
            Self::LegalComplexity => weights.legal_complexity,
            Self::DelayReasonAmbiguity => weights.delay_reason_ambiguity,
            Self::DataCompleteness => weights.data_completeness,
            Self::RegulatoryEdgeCases => weights.regulatory_edge_cases,
            Self::FinancialImpact => weights.financial_impact,
            Self::PrecedentSimilarity => weights.precedent_similarity,
        }
    }
}

impl fmt::Display for FactorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw output of an evaluator before weighting.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorScore {
    pub score: f64,
    pub rationale: String,
}

impl FactorScore {
    pub fn new(score: f64, rationale: impl Into<String>) -> Self {
        Self {
            score,
            rationale: rationale.into(),
        }
    }
}

/// One weighted factor of an assessment. `score` is in [0, 1], 1.0 = no risk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub kind: FactorKind,
    pub weight: f64,
    pub score: f64,
    pub rationale: String,
}

impl RiskFactor {
    pub fn contribution(&self) -> f64 {
        self.weight * self.score
    }
}

/// Scores one risk dimension of a case.
///
/// Implementations must be deterministic for identical input. Returning
/// [`RiskError::MissingInput`] makes the engine fall back to
/// [`missing_input_default`](Self::missing_input_default); any other error
/// contributes a score of 0.0.
pub trait FactorEvaluator: Send + Sync {
    fn kind(&self) -> FactorKind;

    fn evaluate(&self, ctx: &CaseContext<'_>) -> Result<FactorScore, RiskError>;

    /// Conservative mid-risk score used when required input is absent.
    fn missing_input_default(&self) -> f64 {
        0.5
    }
}

/// Multiplicative penalty accumulator used by the built-in evaluators.
#[derive(Debug)]
pub(crate) struct Penalties {
    score: f64,
    notes: Vec<String>,
}

impl Penalties {
    pub(crate) fn start() -> Self {
        Self::from_base(1.0)
    }

    pub(crate) fn from_base(score: f64) -> Self {
        Self {
            score,
            notes: Vec::new(),
        }
    }

    pub(crate) fn apply(&mut self, multiplier: f64, note: impl Into<String>) {
        self.score *= multiplier;
        self.notes.push(note.into());
    }

    pub(crate) fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    /// Finish with the clamped score, using `clean` as rationale when nothing was noted.
    pub(crate) fn finish(self, clean: &str) -> FactorScore {
        let rationale = if self.notes.is_empty() {
            clean.to_string()
        } else {
            self.notes.join("; ")
        };
        FactorScore::new(self.score.clamp(0.0, 1.0), rationale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_in_fixed_order() {
        assert_eq!(FactorKind::ALL[0], FactorKind::JurisdictionClarity);
        assert_eq!(FactorKind::ALL[6], FactorKind::PrecedentSimilarity);
        let names: Vec<&str> = FactorKind::ALL.iter().map(|k| k.as_str()).collect();
        let weights = FactorWeights::default();
        let config_names: Vec<&str> = weights.entries().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, config_names);
    }

    #[test]
    fn weight_lookup_matches_config() {
        let weights = FactorWeights::default();
        let total: f64 = FactorKind::ALL.iter().map(|k| k.weight(&weights)).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert_eq!(FactorKind::JurisdictionClarity.weight(&weights), 0.25);
    }

    #[test]
    fn penalties_multiply_and_join_notes() {
        let mut p = Penalties::start();
        p.apply(0.5, "first");
        p.apply(0.5, "second");
        let score = p.finish("clean");
        assert!((score.score - 0.25).abs() < 1e-12);
        assert_eq!(score.rationale, "first; second");
    }

    #[test]
    fn penalties_clean_rationale() {
        let score = Penalties::start().finish("all good");
        assert_eq!(score.score, 1.0);
        assert_eq!(score.rationale, "all good");
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&FactorKind::DelayReasonAmbiguity).unwrap();
        assert_eq!(json, r#""delay_reason_ambiguity""#);
    }
}
