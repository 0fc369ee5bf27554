//! Offline evaluation of the engine against labelled golden cases.
//!
//! Reports handoff precision/recall/F1, tier accuracy, expected calibration
//! error and accuracy per difficulty. A handoff decision is "correct" when
//! [`Action::requires_handoff`] matches the label.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use tripfix_core::{CaseInput, ConversationTurn};

use crate::aggregator::RiskTier;
use crate::engine::RiskEngine;
use crate::error::RiskError;
use crate::gate::Action;

const BUILTIN_GOLDEN_CASES: &str = include_str!("../data/golden_cases.json");

/// Confidence bins for calibration error; the last bin includes 1.0.
const CALIBRATION_BINS: [(f64, f64); 5] = [(0.0, 0.2), (0.2, 0.4), (0.4, 0.6), (0.6, 0.8), (0.8, 1.0)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

/// A case with the outcome a human reviewer expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoldenCase {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub tags: Vec<String>,
    pub case: CaseInput,
    #[serde(default)]
    pub conversation: Vec<ConversationTurn>,
    pub expected_handoff: bool,
    #[serde(default)]
    pub expected_tier: Option<RiskTier>,
}

/// Golden cases shipped with the crate.
pub fn builtin_golden_cases() -> Result<Vec<GoldenCase>, RiskError> {
    golden_cases_from_str(BUILTIN_GOLDEN_CASES)
}

pub fn golden_cases_from_str(raw: &str) -> Result<Vec<GoldenCase>, RiskError> {
    Ok(serde_json::from_str(raw)?)
}

pub fn load_golden_cases(path: &Path) -> Result<Vec<GoldenCase>, RiskError> {
    if !path.exists() {
        return Err(RiskError::NotFound(path.to_path_buf()));
    }
    let raw = std::fs::read_to_string(path)?;
    let cases = golden_cases_from_str(&raw)?;
    info!(path = %path.display(), count = cases.len(), "loaded golden cases");
    Ok(cases)
}

/// Engine outcome for one golden case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseResult {
    pub id: String,
    pub name: String,
    pub difficulty: Difficulty,
    pub confidence: f64,
    pub tier: RiskTier,
    pub action: Action,
    pub expected_handoff: bool,
    pub expected_tier: Option<RiskTier>,
}

impl CaseResult {
    pub fn handoff(&self) -> bool {
        self.action.requires_handoff()
    }

    pub fn handoff_correct(&self) -> bool {
        self.handoff() == self.expected_handoff
    }

    pub fn tier_correct(&self) -> Option<bool> {
        self.expected_tier.map(|t| t == self.tier)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confusion {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub true_negatives: usize,
}

impl Confusion {
    fn record(&mut self, predicted: bool, expected: bool) {
        match (predicted, expected) {
            (true, true) => self.true_positives += 1,
            (true, false) => self.false_positives += 1,
            (false, true) => self.false_negatives += 1,
            (false, false) => self.true_negatives += 1,
        }
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    pub fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r == 0.0 { 0.0 } else { 2.0 * p * r / (p + r) }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub total: usize,
    pub confusion: Confusion,
    pub handoff_accuracy: f64,
    pub handoff_precision: f64,
    pub handoff_recall: f64,
    pub handoff_f1: f64,
    /// Over cases that state an expected tier; `None` if none do.
    pub tier_accuracy: Option<f64>,
    pub calibration_error: f64,
    /// Handoff accuracy per difficulty present in the dataset.
    pub accuracy_by_difficulty: BTreeMap<Difficulty, f64>,
    pub tier_distribution: BTreeMap<RiskTier, usize>,
    pub results: Vec<CaseResult>,
}

impl EvaluationReport {
    /// Cases whose handoff decision or tier disagreed with the label.
    pub fn failures(&self) -> impl Iterator<Item = &CaseResult> {
        self.results
            .iter()
            .filter(|r| !r.handoff_correct() || r.tier_correct() == Some(false))
    }
}

/// Run every golden case through the engine and score the outcomes.
pub fn evaluate(engine: &RiskEngine, cases: &[GoldenCase]) -> Result<EvaluationReport, RiskError> {
    if cases.is_empty() {
        return Err(RiskError::EmptyDataset);
    }

    let results: Vec<CaseResult> = cases
        .iter()
        .map(|g| {
            let a = engine.assess(&g.case, &g.conversation);
            let result = CaseResult {
                id: g.id.clone(),
                name: g.name.clone(),
                difficulty: g.difficulty,
                confidence: a.confidence(),
                tier: a.tier(),
                action: a.action(),
                expected_handoff: g.expected_handoff,
                expected_tier: g.expected_tier,
            };
            debug!(id = %result.id, action = %result.action, correct = result.handoff_correct(), "golden case");
            result
        })
        .collect();

    let total = results.len();
    let mut confusion = Confusion::default();
    let mut tier_distribution = BTreeMap::new();
    let mut by_difficulty: BTreeMap<Difficulty, (usize, usize)> = BTreeMap::new();
    for r in &results {
        confusion.record(r.handoff(), r.expected_handoff);
        *tier_distribution.entry(r.tier).or_insert(0) += 1;
        let entry = by_difficulty.entry(r.difficulty).or_insert((0, 0));
        entry.0 += usize::from(r.handoff_correct());
        entry.1 += 1;
    }

    let tier_checks: Vec<bool> = results.iter().filter_map(CaseResult::tier_correct).collect();
    let tier_accuracy = (!tier_checks.is_empty())
        .then(|| ratio(tier_checks.iter().filter(|&&ok| ok).count(), tier_checks.len()));

    let samples: Vec<(f64, bool)> = results
        .iter()
        .map(|r| (r.confidence, r.handoff_correct()))
        .collect();

    let report = EvaluationReport {
        total,
        confusion,
        handoff_accuracy: ratio(confusion.true_positives + confusion.true_negatives, total),
        handoff_precision: confusion.precision(),
        handoff_recall: confusion.recall(),
        handoff_f1: confusion.f1(),
        tier_accuracy,
        calibration_error: expected_calibration_error(&samples),
        accuracy_by_difficulty: by_difficulty
            .into_iter()
            .map(|(d, (correct, n))| (d, ratio(correct, n)))
            .collect(),
        tier_distribution,
        results,
    };
    info!(
        total,
        accuracy = report.handoff_accuracy,
        f1 = report.handoff_f1,
        ece = report.calibration_error,
        "evaluation complete"
    );
    Ok(report)
}

/// Expected calibration error of `(confidence, correct)` samples over five
/// equal-width bins, weighted by bin size.
pub fn expected_calibration_error(samples: &[(f64, bool)]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let last = CALIBRATION_BINS.len() - 1;
    let mut total_error = 0.0;
    for (i, &(lo, hi)) in CALIBRATION_BINS.iter().enumerate() {
        let in_bin: Vec<&(f64, bool)> = samples
            .iter()
            .filter(|(c, _)| *c >= lo && (*c < hi || (i == last && *c <= hi)))
            .collect();
        if in_bin.is_empty() {
            continue;
        }
        let n = in_bin.len() as f64;
        let accuracy = in_bin.iter().filter(|(_, ok)| *ok).count() as f64 / n;
        let mean_confidence = in_bin.iter().map(|(c, _)| c).sum::<f64>() / n;
        total_error += (accuracy - mean_confidence).abs() * n;
    }
    total_error / samples.len() as f64
}
