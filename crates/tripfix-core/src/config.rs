//! Scoring configuration: factor weights, tier thresholds, duration rules,
//! and the keyword lists used to read free-text fields.
//!
//! All cut-offs are product-tunable. A config file only needs the sections it
//! overrides; everything else falls back to [`Default`]. Load with
//! [`ScoringConfig::load`], which validates before returning so a bad file
//! is rejected before any case is scored.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::case::Jurisdiction;
use crate::error::CoreError;

/// Allowed drift of the weight sum from 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: FactorWeights,
    pub tiers: TierThresholds,
    pub durations: DurationRules,
    pub financial: FinancialRules,
    pub calendar: CalendarRules,
    pub lexicon: Lexicon,
}

impl ScoringConfig {
    /// Read, parse and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound(path.to_path_buf()));
        }
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&raw)?;
        info!(path = %path.display(), "loaded scoring config");
        Ok(config)
    }

    /// Parse and validate a JSON config document.
    pub fn from_json_str(raw: &str) -> Result<Self, CoreError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        self.weights.validate()?;
        self.tiers.validate()?;
        self.durations.validate()
    }
}

// ── Weights ──

/// Weight of each risk factor in the aggregate confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorWeights {
    pub jurisdiction_clarity: f64,
    pub legal_complexity: f64,
    pub delay_reason_ambiguity: f64,
    pub data_completeness: f64,
    pub regulatory_edge_cases: f64,
    pub financial_impact: f64,
    pub precedent_similarity: f64,
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self {
            jurisdiction_clarity: 0.25,
            legal_complexity: 0.20,
            delay_reason_ambiguity: 0.20,
            data_completeness: 0.15,
            regulatory_edge_cases: 0.10,
            financial_impact: 0.05,
            precedent_similarity: 0.05,
        }
    }
}

impl FactorWeights {
    /// Named weights in factor order.
    pub fn entries(&self) -> [(&'static str, f64); 7] {
        [
            ("jurisdiction_clarity", self.jurisdiction_clarity),
            ("legal_complexity", self.legal_complexity),
            ("delay_reason_ambiguity", self.delay_reason_ambiguity),
            ("data_completeness", self.data_completeness),
            ("regulatory_edge_cases", self.regulatory_edge_cases),
            ("financial_impact", self.financial_impact),
            ("precedent_similarity", self.precedent_similarity),
        ]
    }

    pub fn sum(&self) -> f64 {
        self.entries().iter().map(|(_, w)| w).sum()
    }

    /// Each weight in [0, 1] and the total within [`WEIGHT_SUM_TOLERANCE`] of 1.0.
    pub fn validate(&self) -> Result<(), CoreError> {
        for (factor, weight) in self.entries() {
            if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
                return Err(CoreError::InvalidWeight { factor, weight });
            }
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(CoreError::InvalidWeights { sum });
        }
        Ok(())
    }
}

// ── Tiers ──

/// Lower bounds (inclusive) of the low, medium and high risk tiers.
/// Anything below `high` is critical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            low: 0.75,
            medium: 0.60,
            high: 0.40,
        }
    }
}

impl TierThresholds {
    pub fn validate(&self) -> Result<(), CoreError> {
        let ordered = [self.low, self.medium, self.high]
            .iter()
            .all(|v| v.is_finite())
            && 0.0 <= self.high
            && self.high <= self.medium
            && self.medium <= self.low
            && self.low <= 1.0;
        if ordered {
            Ok(())
        } else {
            Err(CoreError::InvalidTierThresholds {
                low: self.low,
                medium: self.medium,
                high: self.high,
            })
        }
    }
}

// ── Durations ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DurationRules {
    /// Delay lengths (hours) at which APPR compensation changes.
    pub appr_thresholds_hours: Vec<f64>,
    /// Delay lengths (hours) at which EU 261 compensation changes.
    pub eu261_thresholds_hours: Vec<f64>,
    /// Distance from a threshold that counts as borderline.
    pub tolerance_hours: f64,
    pub long_delay_hours: f64,
    pub very_long_delay_hours: f64,
    /// How far a delay reported in conversation may drift from the recorded one.
    pub conflict_tolerance_hours: f64,
}

impl Default for DurationRules {
    fn default() -> Self {
        Self {
            appr_thresholds_hours: vec![3.0, 6.0, 9.0],
            eu261_thresholds_hours: vec![3.0, 4.0],
            tolerance_hours: 0.3,
            long_delay_hours: 6.0,
            very_long_delay_hours: 12.0,
            conflict_tolerance_hours: 1.0,
        }
    }
}

impl DurationRules {
    /// Legal thresholds for a regime. Unknown or `NEITHER` uses every
    /// threshold, since either regime may still turn out to apply.
    pub fn thresholds_for(&self, jurisdiction: Option<Jurisdiction>) -> Vec<f64> {
        let mut thresholds = match jurisdiction {
            Some(Jurisdiction::Appr) => self.appr_thresholds_hours.clone(),
            Some(Jurisdiction::Eu261) => self.eu261_thresholds_hours.clone(),
            Some(Jurisdiction::Neither) | None => self
                .appr_thresholds_hours
                .iter()
                .chain(&self.eu261_thresholds_hours)
                .copied()
                .collect(),
        };
        thresholds.sort_by(f64::total_cmp);
        thresholds.dedup();
        thresholds
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        let all_thresholds = self
            .appr_thresholds_hours
            .iter()
            .chain(&self.eu261_thresholds_hours);
        for &t in all_thresholds {
            if !t.is_finite() || t <= 0.0 {
                return Err(CoreError::InvalidDurationRule(format!(
                    "threshold must be a positive number of hours, got {t}"
                )));
            }
        }
        let non_negative = [
            ("tolerance_hours", self.tolerance_hours),
            ("long_delay_hours", self.long_delay_hours),
            ("very_long_delay_hours", self.very_long_delay_hours),
            ("conflict_tolerance_hours", self.conflict_tolerance_hours),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(CoreError::InvalidDurationRule(format!(
                    "{name} must be a non-negative number of hours, got {value}"
                )));
            }
        }
        Ok(())
    }
}

// ── Financial and calendar ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancialRules {
    pub high_value_compensation: f64,
    pub significant_compensation: f64,
    pub large_party_size: u32,
}

impl Default for FinancialRules {
    fn default() -> Self {
        Self {
            high_value_compensation: 1000.0,
            significant_compensation: 500.0,
            large_party_size: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarRules {
    /// Months (1-12) treated as peak holiday travel.
    pub holiday_months: Vec<u32>,
}

impl Default for CalendarRules {
    fn default() -> Self {
        Self {
            holiday_months: vec![12, 1, 7, 8],
        }
    }
}

// ── Lexicon ──

/// Keyword lists for reading delay reasons, notes and conversation turns.
///
/// Phrases match case-insensitively on word boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lexicon {
    /// Airline boilerplate that names no concrete cause.
    pub ambiguous_reasons: Vec<String>,
    /// Wording that gives no reason at all.
    pub vague_reasons: Vec<String>,
    /// Causes within the carrier's control.
    pub controllable_reasons: Vec<String>,
    /// Causes outside the carrier's control.
    pub uncontrollable_reasons: Vec<String>,
    /// Terms carriers invoke as extraordinary circumstances.
    pub extraordinary_circumstances: Vec<String>,
    /// Qualifiers that substantiate an extraordinary circumstance.
    pub specificity_markers: Vec<String>,
    /// Causes with little or no case history.
    pub novel_reasons: Vec<String>,
    pub uncertainty_markers: Vec<String>,
    pub urgency_markers: Vec<String>,
    pub code_share_markers: Vec<String>,
    /// Connectives that join more than one stated cause.
    pub conjunctions: Vec<String>,
    /// Words marking a passenger clause as talk about the delay itself.
    pub delay_cues: Vec<String>,
}

fn phrases(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            ambiguous_reasons: phrases(&[
                "operational reasons",
                "operational reason",
                "operational requirements",
                "operational issues",
                "network optimization",
                "unforeseen circumstances",
                "technical issues",
                "beyond our control",
                "other reasons",
            ]),
            vague_reasons: phrases(&[
                "some time",
                "a while",
                "no reason",
                "not specified",
                "no explanation",
                "didn't say",
                "unknown reason",
            ]),
            controllable_reasons: phrases(&[
                "mechanical",
                "maintenance",
                "technical",
                "crew shortage",
                "crew scheduling",
                "crew availability",
                "staff shortage",
                "overbooking",
                "overbooked",
                "system outage",
                "it outage",
                "late inbound aircraft",
                "aircraft change",
                "refuelling",
                "catering",
                "baggage loading",
            ]),
            uncontrollable_reasons: phrases(&[
                "weather",
                "storm",
                "snow",
                "fog",
                "de-icing",
                "air traffic control",
                "atc",
                "security",
                "bird strike",
                "strike",
                "medical emergency",
                "political unrest",
                "natural disaster",
                "volcanic ash",
                "airport closure",
                "terrorism",
                "hurricane",
                "blizzard",
            ]),
            extraordinary_circumstances: phrases(&[
                "weather",
                "strike",
                "security",
                "terrorism",
                "political unrest",
                "natural disaster",
                "medical emergency",
                "bird strike",
            ]),
            specificity_markers: phrases(&[
                "severe",
                "extreme",
                "storm",
                "thunderstorm",
                "snowstorm",
                "hurricane",
                "blizzard",
                "lightning",
                "airport closure",
                "closed",
                "evacuation",
            ]),
            novel_reasons: phrases(&[
                "cyber attack",
                "pilot shortage",
                "fuel contamination",
                "cargo issue",
                "drone",
            ]),
            uncertainty_markers: phrases(&[
                "i think",
                "around",
                "approximately",
                "roughly",
                "maybe",
                "possibly",
                "not sure",
                "unclear",
                "don't remember",
                "might have been",
                "i guess",
            ]),
            urgency_markers: phrases(&[
                "urgent",
                "asap",
                "quickly",
                "soon",
                "immediately",
                "deadline",
            ]),
            code_share_markers: phrases(&[
                "operated by",
                "marketed by",
                "code share",
                "codeshare",
            ]),
            conjunctions: phrases(&["and", "also", "as well as", "plus"]),
            delay_cues: phrases(&[
                "delay",
                "delayed",
                "late",
                "wait",
                "waited",
                "waiting",
                "stuck",
                "stranded",
                "tarmac",
                "sat",
            ]),
        }
    }
}
