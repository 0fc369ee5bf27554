//! The immutable result of scoring one case: factors, confidence, tier,
//! patterns and the routing action derived from them.

use serde::{Deserialize, Serialize};
use tripfix_core::config::TierThresholds;

use crate::aggregator::{RiskTier, aggregate};
use crate::factor::RiskFactor;
use crate::gate::{self, Action};
use crate::patterns::PatternTag;

/// Factors scoring below this are called out in the summary.
const KEY_RISK_THRESHOLD: f64 = 0.7;

/// Result of assessing one case. Built once by the engine and read-only after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    case_id: String,
    factors: Vec<RiskFactor>,
    confidence: f64,
    tier: RiskTier,
    patterns: Vec<PatternTag>,
    action: Action,
    summary: String,
}

impl RiskAssessment {
    pub(crate) fn new(
        case_id: String,
        factors: Vec<RiskFactor>,
        patterns: Vec<PatternTag>,
        tiers: &TierThresholds,
    ) -> Self {
        let confidence = aggregate(&factors);
        let tier = RiskTier::from_confidence(confidence, tiers);
        let action = gate::decide(tier, &patterns);
        let summary = summarize(confidence, &factors, &patterns);
        Self {
            case_id,
            factors,
            confidence,
            tier,
            patterns,
            action,
            summary,
        }
    }

    pub fn case_id(&self) -> &str {
        &self.case_id
    }

    /// Factors in fixed [`FactorKind`](crate::FactorKind) order.
    pub fn factors(&self) -> &[RiskFactor] {
        &self.factors
    }

    pub fn factor(&self, kind: crate::FactorKind) -> Option<&RiskFactor> {
        self.factors.iter().find(|f| f.kind == kind)
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn tier(&self) -> RiskTier {
        self.tier
    }

    pub fn patterns(&self) -> &[PatternTag] {
        &self.patterns
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn requires_handoff(&self) -> bool {
        self.action.requires_handoff()
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }
}

fn summarize(confidence: f64, factors: &[RiskFactor], patterns: &[PatternTag]) -> String {
    let mut summary = format!("Overall confidence: {confidence:.2}.");

    let key: Vec<String> = factors
        .iter()
        .filter(|f| f.score < KEY_RISK_THRESHOLD)
        .map(|f| format!("{} ({:.2})", f.kind.label(), f.score))
        .collect();
    if !key.is_empty() {
        summary.push_str(&format!(" Key risk factors: {}.", key.join(", ")));
    }

    if !patterns.is_empty() {
        let names: Vec<&str> = patterns.iter().map(PatternTag::as_str).collect();
        summary.push_str(&format!(" Patterns detected: {}.", names.join(", ")));
    }
    summary
}
