//! Reference set of prior case patterns for precedent similarity.
//!
//! The set is plain data: the caller loads it (built-in or from a JSON file)
//! before scoring, and the engine only reads it.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;
use tripfix_core::Jurisdiction;

use crate::context::{DelayCategory, RouteKind};
use crate::error::RiskError;

const JURISDICTION_SHARE: f64 = 0.3;
const CATEGORY_SHARE: f64 = 0.5;
const ROUTE_SHARE: f64 = 0.2;

/// A (jurisdiction, delay category, route kind) combination seen before.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrecedentPattern {
    pub jurisdiction: Jurisdiction,
    pub category: DelayCategory,
    pub route: RouteKind,
    #[serde(default)]
    pub description: String,
}

impl PrecedentPattern {
    pub fn new(
        jurisdiction: Jurisdiction,
        category: DelayCategory,
        route: RouteKind,
        description: impl Into<String>,
    ) -> Self {
        Self {
            jurisdiction,
            category,
            route,
            description: description.into(),
        }
    }

    /// Similarity in [0, 1] to a case with the given attributes.
    pub fn similarity(
        &self,
        jurisdiction: Option<Jurisdiction>,
        category: Option<DelayCategory>,
        route: RouteKind,
    ) -> f64 {
        let mut score = 0.0;
        if jurisdiction == Some(self.jurisdiction) {
            score += JURISDICTION_SHARE;
        }
        if category == Some(self.category) {
            score += CATEGORY_SHARE;
        }
        if route == self.route {
            score += ROUTE_SHARE;
        }
        score
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrecedentSet {
    patterns: Vec<PrecedentPattern>,
}

impl PrecedentSet {
    pub fn new(patterns: Vec<PrecedentPattern>) -> Self {
        Self { patterns }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Patterns covering the common APPR and EU 261 claim shapes.
    pub fn builtin() -> Self {
        use DelayCategory::*;
        use Jurisdiction::*;
        use RouteKind::*;
        Self::new(vec![
            PrecedentPattern::new(Appr, Controllable, Domestic, "domestic delay within carrier control"),
            PrecedentPattern::new(Appr, Uncontrollable, Domestic, "domestic delay outside carrier control"),
            PrecedentPattern::new(Appr, Controllable, International, "Canada-linked international delay within carrier control"),
            PrecedentPattern::new(Appr, Uncontrollable, International, "Canada-linked international delay outside carrier control"),
            PrecedentPattern::new(Eu261, Controllable, IntraEu, "intra-EU delay within carrier control"),
            PrecedentPattern::new(Eu261, Uncontrollable, IntraEu, "intra-EU delay outside carrier control"),
            PrecedentPattern::new(Eu261, Controllable, International, "EU departure or EU carrier, within carrier control"),
            PrecedentPattern::new(Eu261, Uncontrollable, International, "EU departure or EU carrier, outside carrier control"),
            PrecedentPattern::new(Neither, Controllable, Foreign, "no regime applies"),
        ])
    }

    pub fn load(path: &Path) -> Result<Self, RiskError> {
        if !path.exists() {
            return Err(RiskError::NotFound(path.to_path_buf()));
        }
        let raw = std::fs::read_to_string(path)?;
        let set = Self::from_json_str(&raw)?;
        info!(path = %path.display(), count = set.len(), "loaded precedent set");
        Ok(set)
    }

    /// Parse a JSON array of patterns.
    pub fn from_json_str(raw: &str) -> Result<Self, RiskError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn patterns(&self) -> &[PrecedentPattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Most similar pattern; the earliest wins ties.
    pub fn best_match(
        &self,
        jurisdiction: Option<Jurisdiction>,
        category: Option<DelayCategory>,
        route: RouteKind,
    ) -> Option<(&PrecedentPattern, f64)> {
        let mut best: Option<(&PrecedentPattern, f64)> = None;
        for p in &self.patterns {
            let s = p.similarity(jurisdiction, category, route);
            if best.is_none_or(|(_, b)| s > b) {
                best = Some((p, s));
            }
        }
        best
    }
}
