//! Built-in deterministic evaluators, one per [`FactorKind`].
//!
//! Each starts from 1.0 (or a base derived from the reason text) and
//! multiplies in penalties. Constants that product may want to tune live in
//! [`ScoringConfig`](tripfix_core::ScoringConfig); the multipliers here are
//! the fixed shape of each rule.

use chrono::Datelike;
use tripfix_core::Jurisdiction;

use crate::context::CaseContext;
use crate::error::RiskError;
use crate::factor::{FactorEvaluator, FactorKind, FactorScore, Penalties};

const MIN_REASONING_CHARS: usize = 20;

/// All built-in evaluators in factor order.
pub fn builtin() -> Vec<Box<dyn FactorEvaluator>> {
    vec![
        Box::new(JurisdictionClarity),
        Box::new(LegalComplexity),
        Box::new(DelayReasonAmbiguity),
        Box::new(DataCompleteness),
        Box::new(RegulatoryEdgeCases),
        Box::new(FinancialImpact),
        Box::new(PrecedentSimilarity),
    ]
}

fn missing(factor: FactorKind, field: &'static str) -> RiskError {
    RiskError::MissingInput { factor, field }
}

// ── Jurisdiction clarity ──

/// How unambiguously the route and carriers point at the recorded regime.
pub struct JurisdictionClarity;

impl FactorEvaluator for JurisdictionClarity {
    fn kind(&self) -> FactorKind {
        FactorKind::JurisdictionClarity
    }

    fn evaluate(&self, ctx: &CaseContext<'_>) -> Result<FactorScore, RiskError> {
        let jurisdiction = ctx
            .case
            .jurisdiction
            .ok_or_else(|| missing(self.kind(), "jurisdiction"))?;
        let route = &ctx.route;
        let mut p = Penalties::start();

        if !ctx.case.route.has_origin() || !ctx.case.route.has_destination() {
            p.apply(0.3, "origin or destination missing");
        } else if route.unlocated_stops() > 0 {
            p.apply(0.8, format!("{} stop(s) could not be located", route.unlocated_stops()));
        }

        if route.plausible.len() > 1 {
            let regimes: Vec<&str> = route.plausible.iter().map(|j| j.as_str()).collect();
            p.apply(0.7, format!("route plausibly falls under {}", regimes.join(" and ")));
        }
        if route.contradicts(Some(jurisdiction)) {
            p.apply(0.5, format!("{jurisdiction} does not fit the route"));
        }

        if route.nationality_mismatch {
            p.apply(0.8, "airline nationality differs from flight-code carrier");
        } else if route.code_share {
            p.apply(0.9, "code-share or multi-carrier booking");
        }

        if let Some(reasoning) = ctx.case.reasoning()
            && reasoning.chars().count() < MIN_REASONING_CHARS
        {
            p.apply(0.8, "jurisdiction reasoning is thin");
        }

        Ok(p.finish(&format!("route clearly falls under {jurisdiction}")))
    }
}

// ── Legal complexity ──

/// Closeness to legal duration thresholds and contestable causes.
pub struct LegalComplexity;

impl FactorEvaluator for LegalComplexity {
    fn kind(&self) -> FactorKind {
        FactorKind::LegalComplexity
    }

    fn evaluate(&self, ctx: &CaseContext<'_>) -> Result<FactorScore, RiskError> {
        let delay = ctx
            .case
            .delay()
            .ok_or_else(|| missing(self.kind(), "delay_hours"))?;
        let reason = &ctx.reason;
        let mut p = Penalties::start();

        if let Some(threshold) = ctx.borderline_threshold() {
            p.apply(0.6, format!("{delay}h is within tolerance of the {threshold}h threshold"));
        }
        if reason.vague_extraordinary() {
            p.apply(0.6, format!(
                "extraordinary circumstances ({}) without specifics",
                reason.extraordinary.join(", ")
            ));
        }
        if reason.multiple {
            p.apply(0.7, "several delay reasons given");
        }
        if !reason.present {
            p.apply(0.5, "no delay reason to assess eligibility against");
        } else if reason.uncategorised() {
            p.apply(0.3, "delay cause cannot be classed as controllable or not");
        }
        match ctx.case.jurisdiction {
            Some(Jurisdiction::Neither) | None => {
                p.apply(0.5, "no governing regime established");
            }
            _ => {}
        }

        Ok(p.finish("delay clearly on one side of every threshold"))
    }
}

// ── Delay reason ambiguity ──

/// Whether the stated cause maps cleanly to a controllable/uncontrollable category.
pub struct DelayReasonAmbiguity;

impl FactorEvaluator for DelayReasonAmbiguity {
    fn kind(&self) -> FactorKind {
        FactorKind::DelayReasonAmbiguity
    }

    fn missing_input_default(&self) -> f64 {
        0.3
    }

    fn evaluate(&self, ctx: &CaseContext<'_>) -> Result<FactorScore, RiskError> {
        let reason = &ctx.reason;
        if !reason.present {
            return Err(missing(self.kind(), "delay_reason"));
        }

        let categorised = !reason.causes.is_empty();
        let ambiguous = !reason.ambiguous.is_empty();
        let mut p = match (categorised, ambiguous) {
            (true, false) => Penalties::start(),
            (true, true) => {
                let mut p = Penalties::from_base(0.6);
                p.note(format!("generic wording ({}) alongside a specific cause", reason.ambiguous.join(", ")));
                p
            }
            (false, false) => {
                let mut p = Penalties::from_base(0.5);
                p.note("cause not recognised");
                p
            }
            (false, true) => {
                let mut p = Penalties::from_base(0.2);
                p.note(format!("generic wording ({}) names no cause", reason.ambiguous.join(", ")));
                p
            }
        };

        if reason.vague_extraordinary() {
            p.apply(0.7, "extraordinary circumstance claimed without specifics");
        }
        if !reason.vague.is_empty() {
            p.apply(0.6, format!("vague wording ({})", reason.vague.join(", ")));
        }
        if reason.multiple {
            p.apply(0.8, format!("several causes ({})", reason.causes.join(", ")));
        }

        Ok(p.finish(&format!("specific cause: {}", reason.causes.join(", "))))
    }
}

// ── Data completeness ──

/// Missing fields and hedged passenger statements.
pub struct DataCompleteness;

impl FactorEvaluator for DataCompleteness {
    fn kind(&self) -> FactorKind {
        FactorKind::DataCompleteness
    }

    fn evaluate(&self, ctx: &CaseContext<'_>) -> Result<FactorScore, RiskError> {
        let mut p = Penalties::start();

        let gaps = ctx.case.missing_fields();
        if !gaps.is_empty() {
            p.apply(
                0.8_f64.powi(gaps.len() as i32),
                format!("missing {}", gaps.join(", ")),
            );
        } else if !ctx.case.required_fields_present {
            p.apply(0.8, "collector reported incomplete data");
        }
        if ctx.reason.uncategorised() {
            p.apply(0.6, "delay cause unclear");
        }
        let hedges = ctx.uncertainty_markers();
        if !hedges.is_empty() {
            p.apply(0.8, format!("passenger uncertain ({})", hedges.join(", ")));
        }
        if ctx.case.legal_citations.is_empty() {
            p.apply(0.9, "no legal citations in eligibility draft");
        }

        Ok(p.finish("all required fields present"))
    }
}

// ── Regulatory edge cases ──

/// Enumerated conditions that regulators and carriers tend to dispute.
pub struct RegulatoryEdgeCases;

impl FactorEvaluator for RegulatoryEdgeCases {
    fn kind(&self) -> FactorKind {
        FactorKind::RegulatoryEdgeCases
    }

    fn evaluate(&self, ctx: &CaseContext<'_>) -> Result<FactorScore, RiskError> {
        let config = ctx.config;
        let case = ctx.case;
        let mut p = Penalties::start();

        match case.flight_date {
            Some(date) if config.calendar.holiday_months.contains(&date.month()) => {
                p.apply(0.9, "peak holiday travel period");
            }
            Some(_) => {}
            None => p.apply(0.9, "flight date unknown"),
        }
        if !case.route.connections.is_empty() {
            p.apply(0.85, format!("{} connection(s)", case.route.connections.len()));
        }
        if ctx.route.code_share {
            p.apply(0.8, "multi-airline itinerary");
        }
        if let Some(delay) = case.delay()
            && delay > config.durations.very_long_delay_hours
        {
            p.apply(0.7, format!("very long delay ({delay}h)"));
        }
        if !ctx.reason.ambiguous.is_empty() {
            p.apply(0.6, "airline explanation unsubstantiated");
        }

        Ok(p.finish("no edge conditions"))
    }
}

// ── Financial impact ──

/// Exposure of the claim by amount and party size.
pub struct FinancialImpact;

impl FactorEvaluator for FinancialImpact {
    fn kind(&self) -> FactorKind {
        FactorKind::FinancialImpact
    }

    fn evaluate(&self, ctx: &CaseContext<'_>) -> Result<FactorScore, RiskError> {
        let amount = ctx
            .case
            .compensation()
            .ok_or_else(|| missing(self.kind(), "compensation_estimate"))?;
        let rules = &ctx.config.financial;
        let mut p = Penalties::start();

        if amount > rules.high_value_compensation {
            p.apply(0.6, format!("high-value claim ({amount:.0})"));
        }
        if let Some(count) = ctx.case.passenger_count
            && count > rules.large_party_size
        {
            p.apply(0.9, format!("party of {count}"));
        }
        if let Some(delay) = ctx.case.delay()
            && delay > ctx.config.durations.long_delay_hours
            && amount > rules.significant_compensation
        {
            p.apply(0.85, "long delay with significant compensation");
        }

        Ok(p.finish(&format!("routine amount ({amount:.0})")))
    }
}

// ── Precedent similarity ──

/// Closeness of the case to a known prior pattern.
pub struct PrecedentSimilarity;

impl FactorEvaluator for PrecedentSimilarity {
    fn kind(&self) -> FactorKind {
        FactorKind::PrecedentSimilarity
    }

    fn evaluate(&self, ctx: &CaseContext<'_>) -> Result<FactorScore, RiskError> {
        let (pattern, similarity) = ctx
            .precedents
            .best_match(ctx.case.jurisdiction, ctx.reason.category, ctx.route.kind)
            .ok_or_else(|| missing(self.kind(), "precedents"))?;

        let mut p = Penalties::from_base(similarity);
        if similarity < 1.0 {
            let name = if pattern.description.is_empty() {
                "closest precedent"
            } else {
                pattern.description.as_str()
            };
            p.note(format!("partial match ({similarity:.1}) with {name}"));
        }
        if !ctx.reason.novel.is_empty() {
            p.apply(0.6, format!("novel circumstances ({})", ctx.reason.novel.join(", ")));
        }

        Ok(p.finish("matches a known precedent"))
    }
}
