//! Finalised intake case handed to the risk engine.
//!
//! A [`CaseInput`] is built once the conversational collector has gathered
//! every field it can (or validation gave up). It is read-only from then on:
//! the engine borrows it and never mutates it.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Regulatory regime determined to govern a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Jurisdiction {
    /// Canadian Air Passenger Protection Regulations.
    #[serde(rename = "APPR", alias = "appr")]
    Appr,
    /// EU Regulation 261/2004.
    #[serde(rename = "EU261", alias = "eu261")]
    Eu261,
    #[serde(rename = "NEITHER", alias = "neither")]
    Neither,
}

impl Jurisdiction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Appr => "APPR",
            Self::Eu261 => "EU261",
            Self::Neither => "NEITHER",
        }
    }
}

impl fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Origin, destination and any connecting airports, in travel order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightRoute {
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub connections: Vec<String>,
}

impl FlightRoute {
    pub fn new(origin: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            connections: Vec::new(),
        }
    }

    pub fn via(mut self, connection: impl Into<String>) -> Self {
        self.connections.push(connection.into());
        self
    }

    pub fn has_origin(&self) -> bool {
        !self.origin.trim().is_empty()
    }

    pub fn has_destination(&self) -> bool {
        !self.destination.trim().is_empty()
    }

    /// Every non-empty stop in travel order: origin, connections, destination.
    pub fn stops(&self) -> Vec<&str> {
        std::iter::once(self.origin.as_str())
            .chain(self.connections.iter().map(String::as_str))
            .chain(std::iter::once(self.destination.as_str()))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Consecutive (departure, arrival) pairs.
    pub fn legs(&self) -> Vec<(&str, &str)> {
        self.stops().windows(2).map(|w| (w[0], w[1])).collect()
    }
}

/// Required fields checked by [`CaseInput::missing_fields`].
pub const REQUIRED_FIELDS: &[&str] = &[
    "flight_code",
    "flight_date",
    "airline",
    "origin",
    "destination",
    "delay_hours",
    "delay_reason",
    "jurisdiction",
];

/// Fields gathered from the passenger during intake, the subset that
/// [`CaseInput::required_fields_present`] vouches for. `flight_date` is
/// supplementary and only counts against completeness.
pub const INTAKE_FIELDS: &[&str] = &[
    "flight_code",
    "airline",
    "origin",
    "destination",
    "delay_hours",
    "delay_reason",
    "jurisdiction",
];

fn default_true() -> bool {
    true
}

/// Immutable record of everything collected for one delay claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseInput {
    pub case_id: String,
    #[serde(default)]
    pub jurisdiction: Option<Jurisdiction>,
    /// Explanation produced alongside the jurisdiction result.
    #[serde(default)]
    pub jurisdiction_reasoning: Option<String>,
    #[serde(default)]
    pub delay_reason: Option<String>,
    #[serde(default)]
    pub delay_hours: Option<f64>,
    #[serde(default)]
    pub route: FlightRoute,
    #[serde(default)]
    pub airline: Option<String>,
    #[serde(default)]
    pub flight_code: Option<String>,
    #[serde(default)]
    pub flight_date: Option<NaiveDate>,
    /// Draft compensation amount from the eligibility step.
    #[serde(default)]
    pub compensation_estimate: Option<f64>,
    #[serde(default)]
    pub passenger_count: Option<u32>,
    #[serde(default)]
    pub legal_citations: Vec<String>,
    #[serde(default)]
    pub passenger_notes: Option<String>,
    /// Collector's own view of whether every required field was gathered.
    #[serde(default = "default_true")]
    pub required_fields_present: bool,
}

impl CaseInput {
    /// Start a case with only an id and a route; everything else absent.
    pub fn new(case_id: impl Into<String>, route: FlightRoute) -> Self {
        Self {
            case_id: case_id.into(),
            jurisdiction: None,
            jurisdiction_reasoning: None,
            delay_reason: None,
            delay_hours: None,
            route,
            airline: None,
            flight_code: None,
            flight_date: None,
            compensation_estimate: None,
            passenger_count: None,
            legal_citations: Vec::new(),
            passenger_notes: None,
            required_fields_present: true,
        }
    }

    pub fn with_jurisdiction(mut self, jurisdiction: Jurisdiction) -> Self {
        self.jurisdiction = Some(jurisdiction);
        self
    }

    pub fn with_jurisdiction_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.jurisdiction_reasoning = Some(reasoning.into());
        self
    }

    pub fn with_delay(mut self, hours: f64, reason: impl Into<String>) -> Self {
        self.delay_hours = Some(hours);
        self.delay_reason = Some(reason.into());
        self
    }

    pub fn with_flight(mut self, airline: impl Into<String>, flight_code: impl Into<String>) -> Self {
        self.airline = Some(airline.into());
        self.flight_code = Some(flight_code.into());
        self
    }

    pub fn with_flight_date(mut self, date: NaiveDate) -> Self {
        self.flight_date = Some(date);
        self
    }

    pub fn with_compensation(mut self, amount: f64) -> Self {
        self.compensation_estimate = Some(amount);
        self
    }

    pub fn with_passengers(mut self, count: u32) -> Self {
        self.passenger_count = Some(count);
        self
    }

    pub fn with_citation(mut self, citation: impl Into<String>) -> Self {
        self.legal_citations.push(citation.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.passenger_notes = Some(notes.into());
        self
    }

    pub fn with_required_fields_present(mut self, present: bool) -> Self {
        self.required_fields_present = present;
        self
    }

    /// Delay duration if it is a usable, non-negative number.
    pub fn delay(&self) -> Option<f64> {
        self.delay_hours.filter(|h| h.is_finite() && *h >= 0.0)
    }

    /// Delay reason, trimmed, if non-empty.
    pub fn reason(&self) -> Option<&str> {
        non_empty(self.delay_reason.as_deref())
    }

    pub fn airline_name(&self) -> Option<&str> {
        non_empty(self.airline.as_deref())
    }

    pub fn flight_code(&self) -> Option<&str> {
        non_empty(self.flight_code.as_deref())
    }

    pub fn notes(&self) -> Option<&str> {
        non_empty(self.passenger_notes.as_deref())
    }

    pub fn reasoning(&self) -> Option<&str> {
        non_empty(self.jurisdiction_reasoning.as_deref())
    }

    /// Compensation estimate if it is a usable, non-negative amount.
    pub fn compensation(&self) -> Option<f64> {
        self.compensation_estimate
            .filter(|a| a.is_finite() && *a >= 0.0)
    }

    /// Required fields that are absent or unusable, in [`REQUIRED_FIELDS`] order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let present = [
            self.flight_code().is_some(),
            self.flight_date.is_some(),
            self.airline_name().is_some(),
            self.route.has_origin(),
            self.route.has_destination(),
            self.delay().is_some(),
            self.reason().is_some(),
            self.jurisdiction.is_some(),
        ];
        REQUIRED_FIELDS
            .iter()
            .zip(present)
            .filter(|(_, ok)| !ok)
            .map(|(name, _)| *name)
            .collect()
    }

    /// Missing fields the collector was responsible for, in [`INTAKE_FIELDS`] order.
    pub fn missing_intake_fields(&self) -> Vec<&'static str> {
        self.missing_fields()
            .into_iter()
            .filter(|f| INTAKE_FIELDS.contains(f))
            .collect()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Who said a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
    System,
}

/// One prior message from the intake conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    #[serde(alias = "message_type")]
    pub role: Speaker,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Speaker::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Speaker::Assistant,
            content: content.into(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Speaker::User
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_case() -> CaseInput {
        CaseInput::new("c-1", FlightRoute::new("Toronto", "Vancouver"))
            .with_jurisdiction(Jurisdiction::Appr)
            .with_delay(5.0, "mechanical failure")
            .with_flight("Air Canada", "AC123")
            .with_flight_date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
    }

    #[test]
    fn complete_case_has_no_missing_fields() {
        assert!(complete_case().missing_fields().is_empty());
    }

    #[test]
    fn missing_fields_in_declared_order() {
        let case = CaseInput::new("c-2", FlightRoute::new("Toronto", ""));
        assert_eq!(
            case.missing_fields(),
            vec![
                "flight_code",
                "flight_date",
                "airline",
                "destination",
                "delay_hours",
                "delay_reason",
                "jurisdiction",
            ]
        );
    }

    #[test]
    fn whitespace_and_bad_numbers_count_as_missing() {
        let mut case = complete_case();
        case.delay_reason = Some("   ".into());
        case.delay_hours = Some(f64::NAN);
        assert_eq!(case.missing_fields(), vec!["delay_hours", "delay_reason"]);

        case.delay_hours = Some(-2.0);
        assert!(case.delay().is_none());
    }

    #[test]
    fn flight_date_is_not_an_intake_field() {
        let mut case = complete_case();
        case.flight_date = None;
        assert_eq!(case.missing_fields(), vec!["flight_date"]);
        assert!(case.missing_intake_fields().is_empty());

        case.airline = None;
        assert_eq!(case.missing_intake_fields(), vec!["airline"]);
    }

    #[test]
    fn route_stops_and_legs() {
        let route = FlightRoute::new("Frankfurt", "Vancouver").via("Toronto");
        assert_eq!(route.stops(), vec!["Frankfurt", "Toronto", "Vancouver"]);
        assert_eq!(
            route.legs(),
            vec![("Frankfurt", "Toronto"), ("Toronto", "Vancouver")]
        );
    }

    #[test]
    fn route_skips_blank_stops() {
        let route = FlightRoute::new("", "Vancouver");
        assert_eq!(route.stops(), vec!["Vancouver"]);
        assert!(route.legs().is_empty());
    }

    #[test]
    fn case_from_minimal_json() {
        let json = r#"{
            "case_id": "abc",
            "jurisdiction": "EU261",
            "delay_hours": 4.5,
            "route": { "origin": "Paris", "destination": "Montreal" },
            "flight_date": "2024-07-02"
        }"#;
        let case: CaseInput = serde_json::from_str(json).unwrap();
        assert_eq!(case.jurisdiction, Some(Jurisdiction::Eu261));
        assert_eq!(case.delay(), Some(4.5));
        assert!(case.route.connections.is_empty());
        assert!(case.required_fields_present);
        assert_eq!(case.flight_date, NaiveDate::from_ymd_opt(2024, 7, 2));
    }

    #[test]
    fn jurisdiction_accepts_lowercase_alias() {
        let j: Jurisdiction = serde_json::from_str(r#""appr""#).unwrap();
        assert_eq!(j, Jurisdiction::Appr);
        assert_eq!(serde_json::to_string(&j).unwrap(), r#""APPR""#);
    }

    #[test]
    fn conversation_turn_accepts_message_type() {
        let turn: ConversationTurn =
            serde_json::from_str(r#"{"message_type": "user", "content": "I think 5 hours"}"#)
                .unwrap();
        assert!(turn.is_user());
    }
}
