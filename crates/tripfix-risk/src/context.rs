//! Per-case derived facts shared by the evaluators and the pattern detector.
//!
//! Reading the delay reason and resolving the route are done once, here,
//! so every factor sees the same interpretation of the case.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tripfix_core::config::Lexicon;
use tripfix_core::places::{self, Carrier};
use tripfix_core::text::{
    contains_any, contains_words, delay_hours_mentioned, matching_phrases, words,
};
use tripfix_core::{CaseInput, ConversationTurn, Jurisdiction, Region, ScoringConfig};

use crate::precedent::PrecedentSet;

/// Guards threshold comparisons against float noise (2.7 vs 3.0 with 0.3 tolerance).
const HOURS_EPSILON: f64 = 1e-9;

/// Whether a delay cause is within the carrier's control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelayCategory {
    Controllable,
    Uncontrollable,
}

/// Shape of a route by the regions it touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    /// Every stop in Canada.
    Domestic,
    /// Every stop in the EU area.
    IntraEu,
    /// Every stop outside both Canada and the EU area.
    Foreign,
    /// Stops in more than one region.
    International,
    /// At least one stop could not be located.
    Unknown,
}

impl RouteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Domestic => "domestic",
            Self::IntraEu => "intra_eu",
            Self::Foreign => "foreign",
            Self::International => "international",
            Self::Unknown => "unknown",
        }
    }
}

// ── Delay reason ──

/// What the free-text delay reason says, read against the lexicon.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReasonProfile {
    pub present: bool,
    /// Recognised causes, with terms subsumed by longer matches removed.
    pub causes: Vec<String>,
    pub category: Option<DelayCategory>,
    pub ambiguous: Vec<String>,
    pub vague: Vec<String>,
    pub extraordinary: Vec<String>,
    /// Specific qualifiers ("severe", "airport closure") back the stated cause.
    pub substantiated: bool,
    pub novel: Vec<String>,
    pub multiple: bool,
}

impl ReasonProfile {
    pub fn read(reason: Option<&str>, lexicon: &Lexicon) -> Self {
        let Some(text) = reason else {
            return Self::default();
        };

        let controllable = matching_phrases(text, &lexicon.controllable_reasons);
        let uncontrollable = matching_phrases(text, &lexicon.uncontrollable_reasons);
        let matched: Vec<(&str, DelayCategory)> = controllable
            .iter()
            .map(|&t| (t, DelayCategory::Controllable))
            .chain(
                uncontrollable
                    .iter()
                    .map(|&t| (t, DelayCategory::Uncontrollable)),
            )
            .collect();

        // "bird strike" subsumes "strike"
        let mut causes: Vec<(&str, DelayCategory)> = Vec::new();
        for &(term, category) in &matched {
            let term_words = words(term);
            let subsumed = matched.iter().any(|&(other, _)| {
                other != term && contains_words(&words(other), &term_words)
            });
            if !subsumed && !causes.iter().any(|(t, _)| *t == term) {
                causes.push((term, category));
            }
        }

        let has_controllable = causes.iter().any(|(_, c)| *c == DelayCategory::Controllable);
        let has_uncontrollable = causes
            .iter()
            .any(|(_, c)| *c == DelayCategory::Uncontrollable);
        let category = match (has_controllable, has_uncontrollable) {
            (true, false) => Some(DelayCategory::Controllable),
            (false, true) => Some(DelayCategory::Uncontrollable),
            _ => None,
        };

        let multiple = causes.len() >= 2 && contains_any(text, &lexicon.conjunctions);

        Self {
            present: true,
            causes: causes.iter().map(|(t, _)| t.to_string()).collect(),
            category,
            ambiguous: owned(matching_phrases(text, &lexicon.ambiguous_reasons)),
            vague: owned(matching_phrases(text, &lexicon.vague_reasons)),
            extraordinary: owned(matching_phrases(text, &lexicon.extraordinary_circumstances)),
            substantiated: contains_any(text, &lexicon.specificity_markers),
            novel: owned(matching_phrases(text, &lexicon.novel_reasons)),
            multiple,
        }
    }

    /// A reason was given but names no recognisable cause.
    pub fn uncategorised(&self) -> bool {
        self.present && self.causes.is_empty()
    }

    /// Extraordinary-circumstance language with nothing specific behind it.
    pub fn vague_extraordinary(&self) -> bool {
        !self.extraordinary.is_empty() && !self.substantiated
    }
}

fn owned(items: Vec<&str>) -> Vec<String> {
    items.into_iter().map(str::to_string).collect()
}

// ── Route ──

/// Regions, plausible regimes and carrier facts for a case's itinerary.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteProfile {
    /// Region of each stop in travel order; `None` where unknown.
    pub stops: Vec<Option<Region>>,
    /// Both endpoints given and every stop located.
    pub resolved: bool,
    /// Regimes the itinerary could fall under. Only exhaustive when `resolved`.
    pub plausible: BTreeSet<Jurisdiction>,
    pub kind: RouteKind,
    /// Carrier named in the airline field.
    pub named_carrier: Option<&'static Carrier>,
    /// Carrier owning the flight-code designator.
    pub marketing_carrier: Option<&'static Carrier>,
    pub operating_region: Option<Region>,
    pub code_share: bool,
    /// Named and flight-code carriers come from different regions.
    pub nationality_mismatch: bool,
}

impl RouteProfile {
    pub fn build(case: &CaseInput, lexicon: &Lexicon) -> Self {
        let stops: Vec<Option<Region>> =
            case.route.stops().into_iter().map(places::locate).collect();
        let resolved = case.route.has_origin()
            && case.route.has_destination()
            && stops.iter().all(Option::is_some);

        let named_carrier = case.airline_name().and_then(places::carrier_by_name);
        let marketing_carrier = case.flight_code().and_then(places::carrier_by_flight_code);
        let operated_by = [case.airline_name(), case.notes()]
            .into_iter()
            .flatten()
            .find_map(operated_by);
        let operating_region = operated_by
            .or(named_carrier)
            .or(marketing_carrier)
            .map(|c| c.region);

        let different_carriers = match (named_carrier, marketing_carrier) {
            (Some(a), Some(b)) => a.designator != b.designator,
            _ => false,
        };
        let nationality_mismatch = match (named_carrier, marketing_carrier) {
            (Some(a), Some(b)) => a.region != b.region,
            _ => false,
        };
        let marker = [case.airline_name(), case.notes(), case.reason()]
            .into_iter()
            .flatten()
            .any(|t| contains_any(t, &lexicon.code_share_markers));

        let mut plausible = BTreeSet::new();
        if stops.contains(&Some(Region::Canada)) {
            plausible.insert(Jurisdiction::Appr);
        }
        let eu_departure = stops
            .windows(2)
            .any(|leg| leg[0] == Some(Region::Eu));
        let eu_arrival_on_eu_carrier = operating_region == Some(Region::Eu)
            && stops.iter().skip(1).any(|s| *s == Some(Region::Eu));
        if eu_departure || eu_arrival_on_eu_carrier {
            plausible.insert(Jurisdiction::Eu261);
        }
        if resolved && plausible.is_empty() {
            plausible.insert(Jurisdiction::Neither);
        }

        let kind = if !resolved {
            RouteKind::Unknown
        } else if stops.iter().all(|s| *s == Some(Region::Canada)) {
            RouteKind::Domestic
        } else if stops.iter().all(|s| *s == Some(Region::Eu)) {
            RouteKind::IntraEu
        } else if stops.iter().all(|s| *s == Some(Region::Other)) {
            RouteKind::Foreign
        } else {
            RouteKind::International
        };

        Self {
            stops,
            resolved,
            plausible,
            kind,
            named_carrier,
            marketing_carrier,
            operating_region,
            code_share: different_carriers || marker,
            nationality_mismatch,
        }
    }

    pub fn unlocated_stops(&self) -> usize {
        self.stops.iter().filter(|s| s.is_none()).count()
    }

    /// The recorded jurisdiction cannot apply to this itinerary.
    pub fn contradicts(&self, jurisdiction: Option<Jurisdiction>) -> bool {
        match jurisdiction {
            Some(j) => self.resolved && !self.plausible.contains(&j),
            None => false,
        }
    }
}

/// Carrier named after "operated by" in `text`, if any.
fn operated_by(text: &str) -> Option<&'static Carrier> {
    let lower = text.to_lowercase();
    let at = lower.find("operated by")?;
    places::carrier_by_name(&lower[at + "operated by".len()..])
}

// ── Context ──

/// Everything an evaluator may look at for one case.
pub struct CaseContext<'a> {
    pub case: &'a CaseInput,
    pub conversation: &'a [ConversationTurn],
    pub config: &'a ScoringConfig,
    pub precedents: &'a PrecedentSet,
    pub reason: ReasonProfile,
    pub route: RouteProfile,
}

impl<'a> CaseContext<'a> {
    pub fn new(
        case: &'a CaseInput,
        conversation: &'a [ConversationTurn],
        config: &'a ScoringConfig,
        precedents: &'a PrecedentSet,
    ) -> Self {
        Self {
            reason: ReasonProfile::read(case.reason(), &config.lexicon),
            route: RouteProfile::build(case, &config.lexicon),
            case,
            conversation,
            config,
            precedents,
        }
    }

    /// Passenger-authored text: notes, then user turns in order.
    pub fn passenger_text(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.case.notes().into_iter().chain(
            self.conversation
                .iter()
                .filter(|t| t.is_user())
                .map(|t| t.content.as_str()),
        )
    }

    pub fn uncertainty_markers(&self) -> Vec<&'a str> {
        self.markers(&self.config.lexicon.uncertainty_markers)
    }

    pub fn urgency_markers(&self) -> Vec<&'a str> {
        self.markers(&self.config.lexicon.urgency_markers)
    }

    fn markers(&self, phrases: &'a [String]) -> Vec<&'a str> {
        let mut found: Vec<&'a str> = Vec::new();
        for text in self.passenger_text() {
            for m in matching_phrases(text, phrases) {
                if !found.contains(&m) {
                    found.push(m);
                }
            }
        }
        found
    }

    /// Legal threshold the delay sits within tolerance of, if any.
    pub fn borderline_threshold(&self) -> Option<f64> {
        let delay = self.case.delay()?;
        let rules = &self.config.durations;
        rules
            .thresholds_for(self.case.jurisdiction)
            .into_iter()
            .find(|t| (delay - t).abs() <= rules.tolerance_hours + HOURS_EPSILON)
    }

    /// Delays reported by the passenger that disagree with the recorded one.
    /// Only hours stated alongside delay wording count, so a flight time or
    /// layover mentioned in passing is ignored.
    pub fn conflicting_reported_delays(&self) -> Vec<f64> {
        let Some(delay) = self.case.delay() else {
            return Vec::new();
        };
        let tolerance = self.config.durations.conflict_tolerance_hours;
        let cues = &self.config.lexicon.delay_cues;
        self.conversation
            .iter()
            .filter(|t| t.is_user())
            .flat_map(|t| delay_hours_mentioned(&t.content, cues))
            .filter(|h| (h - delay).abs() > tolerance + HOURS_EPSILON)
            .collect()
    }

    /// Origin and destination name the same place.
    pub fn same_origin_and_destination(&self) -> bool {
        let route = &self.case.route;
        route.has_origin()
            && route.has_destination()
            && route.origin.trim().eq_ignore_ascii_case(route.destination.trim())
    }
}
