//! Core types for TripFix: finalised cases, scoring configuration, and
//! the place/carrier reference data used to reason about jurisdiction.

pub mod case;
pub mod config;
mod error;
pub mod places;
pub mod text;

pub use case::{CaseInput, ConversationTurn, FlightRoute, Jurisdiction, Speaker};
pub use config::ScoringConfig;
pub use error::CoreError;
pub use places::Region;
