//! Decision gate: the single point that turns a tier and patterns into an action.

use std::fmt;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::aggregator::RiskTier;
use crate::patterns::PatternTag;

/// What happens to a case after assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Action {
    #[serde(rename = "auto-process")]
    AutoProcess,
    #[serde(rename = "review-24h")]
    Review24h,
    #[serde(rename = "priority-review-1h")]
    PriorityReview1h,
    #[serde(rename = "immediate-handoff")]
    ImmediateHandoff,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AutoProcess => "auto-process",
            Self::Review24h => "review-24h",
            Self::PriorityReview1h => "priority-review-1h",
            Self::ImmediateHandoff => "immediate-handoff",
        }
    }

    /// A human reviewer must see the case before anything reaches the passenger.
    pub fn requires_handoff(&self) -> bool {
        !matches!(self, Self::AutoProcess)
    }

    /// Deadline for human review; `None` when no review is needed.
    pub fn review_window(&self) -> Option<Duration> {
        match self {
            Self::AutoProcess => None,
            Self::Review24h => Some(Duration::hours(24)),
            Self::PriorityReview1h => Some(Duration::hours(1)),
            Self::ImmediateHandoff => Some(Duration::zero()),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hard patterns win; otherwise the tier decides.
pub fn decide(tier: RiskTier, patterns: &[PatternTag]) -> Action {
    if patterns.iter().any(PatternTag::is_hard_override) {
        return Action::ImmediateHandoff;
    }
    match tier {
        RiskTier::Low => Action::AutoProcess,
        RiskTier::Medium => Action::Review24h,
        RiskTier::High => Action::PriorityReview1h,
        RiskTier::Critical => Action::ImmediateHandoff,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_mapping() {
        assert_eq!(decide(RiskTier::Low, &[]), Action::AutoProcess);
        assert_eq!(decide(RiskTier::Medium, &[]), Action::Review24h);
        assert_eq!(decide(RiskTier::High, &[]), Action::PriorityReview1h);
        assert_eq!(decide(RiskTier::Critical, &[]), Action::ImmediateHandoff);
    }

    #[test]
    fn hard_pattern_overrides_low_tier() {
        let patterns = [PatternTag::UncertaintyExpressed, PatternTag::ConflictingInformation];
        assert_eq!(decide(RiskTier::Low, &patterns), Action::ImmediateHandoff);
    }

    #[test]
    fn soft_patterns_do_not_override() {
        let patterns = [PatternTag::BorderlineDuration, PatternTag::TimeSensitiveClaim];
        assert_eq!(decide(RiskTier::Low, &patterns), Action::AutoProcess);
    }

    #[test]
    fn handoff_and_windows() {
        assert!(!Action::AutoProcess.requires_handoff());
        assert!(Action::Review24h.requires_handoff());
        assert_eq!(Action::Review24h.review_window(), Some(Duration::hours(24)));
        assert_eq!(Action::PriorityReview1h.review_window(), Some(Duration::hours(1)));
        assert_eq!(Action::ImmediateHandoff.review_window(), Some(Duration::zero()));
        assert_eq!(Action::AutoProcess.review_window(), None);
    }

    #[test]
    fn action_serialises_kebab_case() {
        assert_eq!(
            serde_json::to_string(&Action::PriorityReview1h).unwrap(),
            r#""priority-review-1h""#
        );
    }
}
