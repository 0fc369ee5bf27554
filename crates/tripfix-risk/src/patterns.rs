//! Categorical red flags detected alongside the numeric score.
//!
//! Patterns never change confidence. A hard pattern forces immediate
//! handoff whatever the tier.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::CaseContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternTag {
    MultiJurisdictionRoute,
    CodeShareMismatch,
    BorderlineDuration,
    VagueExtraordinaryCircumstances,
    ConflictingInformation,
    MultipleDelayReasons,
    UncertaintyExpressed,
    TimeSensitiveClaim,
}

impl PatternTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MultiJurisdictionRoute => "multi_jurisdiction_route",
            Self::CodeShareMismatch => "code_share_mismatch",
            Self::BorderlineDuration => "borderline_duration",
            Self::VagueExtraordinaryCircumstances => "vague_extraordinary_circumstances",
            Self::ConflictingInformation => "conflicting_information",
            Self::MultipleDelayReasons => "multiple_delay_reasons",
            Self::UncertaintyExpressed => "uncertainty_expressed",
            Self::TimeSensitiveClaim => "time_sensitive_claim",
        }
    }

    /// Forces escalation regardless of confidence.
    pub fn is_hard_override(&self) -> bool {
        matches!(self, Self::ConflictingInformation)
    }
}

impl fmt::Display for PatternTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detected patterns in declaration order, each at most once.
pub fn detect(ctx: &CaseContext<'_>) -> Vec<PatternTag> {
    let mut tags = Vec::new();

    if ctx.route.plausible.len() > 1 {
        tags.push(PatternTag::MultiJurisdictionRoute);
    }
    if ctx.route.code_share {
        tags.push(PatternTag::CodeShareMismatch);
    }
    if ctx.borderline_threshold().is_some() {
        tags.push(PatternTag::BorderlineDuration);
    }
    if ctx.reason.vague_extraordinary() {
        tags.push(PatternTag::VagueExtraordinaryCircumstances);
    }
    if has_conflict(ctx) {
        tags.push(PatternTag::ConflictingInformation);
    }
    if ctx.reason.multiple {
        tags.push(PatternTag::MultipleDelayReasons);
    }
    if !ctx.uncertainty_markers().is_empty() {
        tags.push(PatternTag::UncertaintyExpressed);
    }
    if !ctx.urgency_markers().is_empty() {
        tags.push(PatternTag::TimeSensitiveClaim);
    }

    tags
}

fn has_conflict(ctx: &CaseContext<'_>) -> bool {
    let case = ctx.case;
    if ctx.route.contradicts(case.jurisdiction) {
        debug!(case_id = %case.case_id, "jurisdiction contradicts route");
        return true;
    }
    if ctx.same_origin_and_destination() {
        debug!(case_id = %case.case_id, "origin equals destination");
        return true;
    }
    let reported = ctx.conflicting_reported_delays();
    if !reported.is_empty() {
        debug!(case_id = %case.case_id, ?reported, "passenger reported a different delay");
        return true;
    }
    if case.required_fields_present {
        let missing = case.missing_intake_fields();
        if !missing.is_empty() {
            debug!(case_id = %case.case_id, ?missing, "case flagged complete with intake fields missing");
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tripfix_core::{CaseInput, ConversationTurn, FlightRoute, Jurisdiction, ScoringConfig};

    use crate::precedent::PrecedentSet;

    fn clean_case() -> CaseInput {
        CaseInput::new("pt-1", FlightRoute::new("Toronto", "Vancouver"))
            .with_jurisdiction(Jurisdiction::Appr)
            .with_delay(5.0, "mechanical failure")
            .with_flight("Air Canada", "AC123")
            .with_flight_date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
    }

    fn tags(case: &CaseInput, turns: &[ConversationTurn]) -> Vec<PatternTag> {
        let config = ScoringConfig::default();
        let precedents = PrecedentSet::builtin();
        detect(&CaseContext::new(case, turns, &config, &precedents))
    }

    #[test]
    fn clean_case_has_no_patterns() {
        assert!(tags(&clean_case(), &[]).is_empty());
    }

    #[test]
    fn only_conflicting_information_is_hard() {
        let hard: Vec<PatternTag> = [
            PatternTag::MultiJurisdictionRoute,
            PatternTag::CodeShareMismatch,
            PatternTag::BorderlineDuration,
            PatternTag::VagueExtraordinaryCircumstances,
            PatternTag::ConflictingInformation,
            PatternTag::MultipleDelayReasons,
            PatternTag::UncertaintyExpressed,
            PatternTag::TimeSensitiveClaim,
        ]
        .into_iter()
        .filter(PatternTag::is_hard_override)
        .collect();
        assert_eq!(hard, vec![PatternTag::ConflictingInformation]);
    }

    #[test]
    fn route_and_carrier_patterns() {
        let case = CaseInput::new("pt-2", FlightRoute::new("Frankfurt", "Toronto"))
            .with_jurisdiction(Jurisdiction::Eu261)
            .with_delay(5.0, "mechanical failure")
            .with_flight("Air Canada", "LH470")
            .with_flight_date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(
            tags(&case, &[]),
            vec![
                PatternTag::MultiJurisdictionRoute,
                PatternTag::CodeShareMismatch
            ]
        );
    }

    #[test]
    fn duration_and_reason_patterns() {
        let case = clean_case().with_delay(3.1, "weather and crew shortage");
        assert_eq!(
            tags(&case, &[]),
            vec![
                PatternTag::BorderlineDuration,
                PatternTag::VagueExtraordinaryCircumstances,
                PatternTag::MultipleDelayReasons,
            ]
        );
    }

    #[test]
    fn passenger_language_patterns() {
        let turns = vec![ConversationTurn::user(
            "Not sure of the gate, need this resolved urgent",
        )];
        assert_eq!(
            tags(&clean_case(), &turns),
            vec![
                PatternTag::UncertaintyExpressed,
                PatternTag::TimeSensitiveClaim
            ]
        );
    }

    #[test]
    fn wrong_jurisdiction_conflicts() {
        let case = clean_case().with_jurisdiction(Jurisdiction::Eu261);
        assert!(tags(&case, &[]).contains(&PatternTag::ConflictingInformation));
    }

    #[test]
    fn reported_delay_conflicts() {
        let turns = vec![ConversationTurn::user("We were stuck for 9 hours")];
        assert!(tags(&clean_case(), &turns).contains(&PatternTag::ConflictingInformation));

        let close = vec![ConversationTurn::user("We were stuck for 5.5 hours")];
        assert!(!tags(&clean_case(), &close).contains(&PatternTag::ConflictingInformation));
    }

    #[test]
    fn completeness_flag_conflicts_with_missing_fields() {
        let mut case = clean_case();
        case.flight_code = None;
        assert!(tags(&case, &[]).contains(&PatternTag::ConflictingInformation));

        let honest = case.clone().with_required_fields_present(false);
        assert!(!tags(&honest, &[]).contains(&PatternTag::ConflictingInformation));
    }

    #[test]
    fn unknown_flight_date_is_not_a_conflict() {
        let mut case = clean_case();
        case.flight_date = None;
        assert!(case.required_fields_present);
        assert!(tags(&case, &[]).is_empty());
    }

    #[test]
    fn durations_outside_delay_talk_do_not_conflict() {
        let turns = vec![ConversationTurn::user(
            "We landed 5 hours late. The flight itself is only 2 hours normally.",
        )];
        assert!(tags(&clean_case(), &turns).is_empty());

        let layover = vec![ConversationTurn::user("I had a 9 hour layover in Calgary anyway")];
        assert!(tags(&clean_case(), &layover).is_empty());
    }

    #[test]
    fn same_endpoints_conflict() {
        let mut case = clean_case();
        case.route = FlightRoute::new("Toronto", "Toronto");
        assert!(tags(&case, &[]).contains(&PatternTag::ConflictingInformation));
    }
}
