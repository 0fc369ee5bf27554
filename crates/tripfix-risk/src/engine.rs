//! The risk engine: evaluators, aggregation, patterns and gate in one pass.

use tracing::{debug, info, warn};
use tripfix_core::{CaseInput, ConversationTurn, ScoringConfig};

use crate::aggregator::sanitize_score;
use crate::assessment::RiskAssessment;
use crate::context::CaseContext;
use crate::error::RiskError;
use crate::evaluators;
use crate::factor::{FactorEvaluator, FactorKind, FactorScore, RiskFactor};
use crate::patterns;
use crate::precedent::PrecedentSet;

/// Scores finalised cases. Holds only read-only configuration, so one
/// engine can be shared across threads.
pub struct RiskEngine {
    config: ScoringConfig,
    precedents: PrecedentSet,
    evaluators: Vec<Box<dyn FactorEvaluator>>,
}

impl RiskEngine {
    /// Validate the configuration and set up the built-in evaluators.
    pub fn new(config: ScoringConfig, precedents: PrecedentSet) -> Result<Self, RiskError> {
        config.validate()?;
        info!(precedents = precedents.len(), "risk engine ready");
        Ok(Self {
            config,
            precedents,
            evaluators: evaluators::builtin(),
        })
    }

    /// Replace the evaluator for one factor, e.g. with an externally
    /// assisted scorer honouring the same contract.
    pub fn with_evaluator(mut self, evaluator: Box<dyn FactorEvaluator>) -> Self {
        let kind = evaluator.kind();
        match self.evaluators.iter().position(|e| e.kind() == kind) {
            Some(i) => self.evaluators[i] = evaluator,
            None => self.evaluators.push(evaluator),
        }
        self
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn precedents(&self) -> &PrecedentSet {
        &self.precedents
    }

    /// Assess one case. Never fails: a factor that cannot be scored falls
    /// back to its conservative default, or to 0.0 on evaluator error.
    pub fn assess(&self, case: &CaseInput, conversation: &[ConversationTurn]) -> RiskAssessment {
        let ctx = CaseContext::new(case, conversation, &self.config, &self.precedents);

        let factors: Vec<RiskFactor> = FactorKind::ALL
            .iter()
            .map(|&kind| self.score_factor(kind, &ctx))
            .collect();
        let patterns = patterns::detect(&ctx);

        let assessment = RiskAssessment::new(
            case.case_id.clone(),
            factors,
            patterns,
            &self.config.tiers,
        );
        info!(
            case_id = %case.case_id,
            confidence = assessment.confidence(),
            tier = %assessment.tier(),
            action = %assessment.action(),
            patterns = assessment.patterns().len(),
            "case assessed"
        );
        assessment
    }

    fn score_factor(&self, kind: FactorKind, ctx: &CaseContext<'_>) -> RiskFactor {
        let weight = kind.weight(&self.config.weights);
        let Some(evaluator) = self.evaluators.iter().find(|e| e.kind() == kind) else {
            warn!(factor = %kind, "no evaluator registered, scoring 0.0");
            return RiskFactor {
                kind,
                weight,
                score: 0.0,
                rationale: "no evaluator registered".into(),
            };
        };

        let FactorScore { score, rationale } = match evaluator.evaluate(ctx) {
            Ok(s) => s,
            Err(RiskError::MissingInput { field, .. }) => {
                let fallback = evaluator.missing_input_default();
                debug!(factor = %kind, field, fallback, "missing input, using default");
                FactorScore::new(fallback, format!("{field} missing, conservative default"))
            }
            Err(e) => {
                warn!(factor = %kind, error = %e, "evaluator failed, scoring 0.0");
                FactorScore::new(0.0, format!("evaluation failed: {e}"))
            }
        };

        let score = sanitize_score(kind, score);
        debug!(factor = %kind, score, %rationale, "factor scored");
        RiskFactor {
            kind,
            weight,
            score,
            rationale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tripfix_core::config::FactorWeights;
    use tripfix_core::{CoreError, FlightRoute, Jurisdiction};

    use crate::aggregator::RiskTier;
    use crate::gate::Action;
    use crate::patterns::PatternTag;

    fn engine() -> RiskEngine {
        RiskEngine::new(ScoringConfig::default(), PrecedentSet::builtin()).unwrap()
    }

    fn toronto_vancouver(reason: &str, hours: f64) -> CaseInput {
        CaseInput::new("eng-1", FlightRoute::new("Toronto", "Vancouver"))
            .with_jurisdiction(Jurisdiction::Appr)
            .with_jurisdiction_reasoning("Domestic Canadian flight on a Canadian carrier")
            .with_delay(hours, reason)
            .with_flight("Air Canada", "AC123")
            .with_flight_date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
            .with_compensation(400.0)
            .with_citation("APPR s.19(1)(a)")
    }

    /// Only what intake collects: no date, reasoning, citations or party size.
    fn intake_only(reason: &str, hours: f64) -> CaseInput {
        CaseInput::new("eng-2", FlightRoute::new("Toronto", "Vancouver"))
            .with_jurisdiction(Jurisdiction::Appr)
            .with_delay(hours, reason)
            .with_flight("Air Canada", "AC123")
            .with_compensation(400.0)
    }

    fn score_of(a: &RiskAssessment, kind: FactorKind) -> f64 {
        a.factor(kind).map(|f| f.score).unwrap_or(f64::NAN)
    }

    struct Fixed(FactorKind, Result<f64, &'static str>);

    impl FactorEvaluator for Fixed {
        fn kind(&self) -> FactorKind {
            self.0
        }

        fn evaluate(&self, _ctx: &CaseContext<'_>) -> Result<FactorScore, RiskError> {
            match self.1 {
                Ok(score) => Ok(FactorScore::new(score, "fixed")),
                Err(message) => Err(RiskError::Evaluator {
                    factor: self.0,
                    message: message.into(),
                }),
            }
        }
    }

    // ── Scenarios ──

    #[test]
    fn operational_reasons_escalates() {
        let a = engine().assess(&toronto_vancouver("operational reasons", 4.0), &[]);
        assert!(score_of(&a, FactorKind::DelayReasonAmbiguity) < 0.3);
        assert!(matches!(a.tier(), RiskTier::High | RiskTier::Critical), "{a:?}");
        assert!(matches!(
            a.action(),
            Action::PriorityReview1h | Action::ImmediateHandoff
        ));
    }

    #[test]
    fn clear_mechanical_delay_auto_processes() {
        let a = engine().assess(&toronto_vancouver("mechanical failure", 5.0), &[]);
        assert!(score_of(&a, FactorKind::JurisdictionClarity) > 0.8);
        assert!(score_of(&a, FactorKind::LegalComplexity) > 0.8);
        assert!(a.confidence() >= 0.75);
        assert_eq!(a.tier(), RiskTier::Low);
        assert_eq!(a.action(), Action::AutoProcess);
        assert!(a.patterns().is_empty());
    }

    #[test]
    fn near_threshold_penalises_legal_complexity() {
        let a = engine().assess(&toronto_vancouver("mechanical failure", 2.95), &[]);
        assert!(score_of(&a, FactorKind::LegalComplexity) < 1.0);
        assert!(a.patterns().contains(&PatternTag::BorderlineDuration));
        // everything else is favourable
        assert_eq!(score_of(&a, FactorKind::JurisdictionClarity), 1.0);
        assert_eq!(score_of(&a, FactorKind::DelayReasonAmbiguity), 1.0);
    }

    #[test]
    fn intake_only_mechanical_delay_auto_processes() {
        let a = engine().assess(&intake_only("mechanical failure", 5.0), &[]);
        assert!(score_of(&a, FactorKind::JurisdictionClarity) > 0.8);
        assert!(score_of(&a, FactorKind::LegalComplexity) > 0.8);
        assert!(score_of(&a, FactorKind::DataCompleteness) < 1.0);
        assert!(a.confidence() >= 0.75, "{a:?}");
        assert_eq!(a.tier(), RiskTier::Low);
        assert!(a.patterns().is_empty(), "{:?}", a.patterns());
        assert_eq!(a.action(), Action::AutoProcess);
    }

    #[test]
    fn intake_only_json_case_auto_processes() {
        let json = r#"{
            "case_id": "json-1",
            "jurisdiction": "APPR",
            "delay_reason": "mechanical failure",
            "delay_hours": 5.0,
            "route": { "origin": "Toronto", "destination": "Vancouver" },
            "airline": "Air Canada",
            "flight_code": "AC123",
            "compensation_estimate": 400.0,
            "required_fields_present": true
        }"#;
        let case: CaseInput = serde_json::from_str(json).unwrap();
        let a = engine().assess(&case, &[]);
        assert_eq!(a.action(), Action::AutoProcess, "{a:?}");
    }

    #[test]
    fn intake_only_operational_reasons_escalates() {
        let a = engine().assess(&intake_only("operational reasons", 4.0), &[]);
        assert!(score_of(&a, FactorKind::DelayReasonAmbiguity) < 0.3);
        assert_eq!(a.tier(), RiskTier::High, "{a:?}");
        assert_eq!(a.action(), Action::PriorityReview1h);
    }

    #[test]
    fn intake_only_near_threshold_penalises_legal_complexity() {
        let a = engine().assess(&intake_only("mechanical failure", 2.95), &[]);
        assert!(score_of(&a, FactorKind::LegalComplexity) < 1.0);
        assert!(a.patterns().contains(&PatternTag::BorderlineDuration));
        assert_eq!(score_of(&a, FactorKind::JurisdictionClarity), 1.0);
        assert_eq!(score_of(&a, FactorKind::DelayReasonAmbiguity), 1.0);
    }

    #[test]
    fn incidental_durations_do_not_force_handoff() {
        let turns = vec![ConversationTurn::user(
            "We landed 5 hours late. The flight itself is only 2 hours normally.",
        )];
        let a = engine().assess(&toronto_vancouver("mechanical failure", 5.0), &turns);
        assert!(a.patterns().is_empty(), "{:?}", a.patterns());
        assert_eq!(a.action(), Action::AutoProcess);
    }

    #[test]
    fn conflicting_information_forces_handoff() {
        let turns = vec![ConversationTurn::user("the delay was 9 hours in total")];
        let a = engine().assess(&toronto_vancouver("mechanical failure", 5.0), &turns);
        assert!(a.confidence() >= 0.75);
        assert!(a.patterns().contains(&PatternTag::ConflictingInformation));
        assert_eq!(a.action(), Action::ImmediateHandoff);
    }

    // ── Properties ──

    #[test]
    fn repeated_assessment_is_identical() {
        let engine = engine();
        let case = toronto_vancouver("weather and crew shortage", 3.2);
        let turns = vec![ConversationTurn::user("I think it was around 3 hours")];
        let first = engine.assess(&case, &turns);
        let second = engine.assess(&case, &turns);
        assert_eq!(first, second);
        assert_eq!(first.confidence().to_bits(), second.confidence().to_bits());
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn confidence_always_in_unit_interval() {
        let engine = engine();
        let cases = [
            CaseInput::new("empty", FlightRoute::default()),
            toronto_vancouver("", f64::NAN),
            toronto_vancouver("operational reasons and weather", 100.0).with_compensation(1e9),
            toronto_vancouver("mechanical failure", -3.0),
        ];
        for case in &cases {
            let a = engine.assess(case, &[]);
            assert!((0.0..=1.0).contains(&a.confidence()), "{}", a.case_id());
            for f in a.factors() {
                assert!((0.0..=1.0).contains(&f.score), "{} {}", a.case_id(), f.kind);
            }
        }
    }

    #[test]
    fn factors_in_fixed_order_with_config_weights() {
        let a = engine().assess(&toronto_vancouver("mechanical failure", 5.0), &[]);
        let kinds: Vec<FactorKind> = a.factors().iter().map(|f| f.kind).collect();
        assert_eq!(kinds, FactorKind::ALL.to_vec());
        let total: f64 = a.factors().iter().map(|f| f.weight).sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn missing_inputs_use_documented_defaults() {
        let case = CaseInput::new("sparse", FlightRoute::new("Toronto", "Vancouver"));
        let a = RiskEngine::new(ScoringConfig::default(), PrecedentSet::empty())
            .unwrap()
            .assess(&case, &[]);
        assert_eq!(score_of(&a, FactorKind::JurisdictionClarity), 0.5);
        assert_eq!(score_of(&a, FactorKind::LegalComplexity), 0.5);
        assert_eq!(score_of(&a, FactorKind::DelayReasonAmbiguity), 0.3);
        assert_eq!(score_of(&a, FactorKind::FinancialImpact), 0.5);
        assert_eq!(score_of(&a, FactorKind::PrecedentSimilarity), 0.5);
        assert!(a.requires_handoff());
    }

    #[test]
    fn failing_evaluator_contributes_zero() {
        let engine = engine().with_evaluator(Box::new(Fixed(
            FactorKind::JurisdictionClarity,
            Err("upstream unavailable"),
        )));
        let a = engine.assess(&toronto_vancouver("mechanical failure", 5.0), &[]);
        assert_eq!(score_of(&a, FactorKind::JurisdictionClarity), 0.0);
        assert!((a.confidence() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn out_of_range_evaluator_is_clamped() {
        let engine = engine()
            .with_evaluator(Box::new(Fixed(FactorKind::FinancialImpact, Ok(3.5))))
            .with_evaluator(Box::new(Fixed(FactorKind::PrecedentSimilarity, Ok(f64::NAN))));
        let a = engine.assess(&toronto_vancouver("mechanical failure", 5.0), &[]);
        assert_eq!(score_of(&a, FactorKind::FinancialImpact), 1.0);
        assert_eq!(score_of(&a, FactorKind::PrecedentSimilarity), 0.0);
    }

    #[test]
    fn replacing_evaluator_keeps_one_per_kind() {
        let engine = engine().with_evaluator(Box::new(Fixed(FactorKind::FinancialImpact, Ok(0.2))));
        assert_eq!(engine.evaluators.len(), FactorKind::ALL.len());
        let a = engine.assess(&toronto_vancouver("mechanical failure", 5.0), &[]);
        assert_eq!(score_of(&a, FactorKind::FinancialImpact), 0.2);
    }

    #[test]
    fn invalid_weights_rejected_at_startup() {
        let mut config = ScoringConfig::default();
        config.weights = FactorWeights {
            jurisdiction_clarity: 0.5,
            ..FactorWeights::default()
        };
        let err = RiskEngine::new(config, PrecedentSet::builtin()).err();
        assert!(matches!(
            err,
            Some(RiskError::Config(CoreError::InvalidWeights { .. }))
        ));
    }

    #[test]
    fn engine_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RiskEngine>();
    }
}
