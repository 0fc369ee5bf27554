//! Confidence scoring for finalised TripFix cases.
//!
//! Seven factor evaluators score a case, the aggregator folds them into a
//! confidence and risk tier, the pattern detector raises categorical red
//! flags, and the gate picks the action. [`RiskEngine::assess`] runs all of
//! it in memory with no I/O.

mod aggregator;
mod assessment;
pub mod context;
mod engine;
mod error;
pub mod evaluation;
pub mod evaluators;
mod factor;
mod gate;
mod patterns;
mod precedent;

pub use aggregator::{RiskTier, aggregate, check_score, sanitize_score};
pub use assessment::RiskAssessment;
pub use context::{CaseContext, DelayCategory, RouteKind};
pub use engine::RiskEngine;
pub use error::RiskError;
pub use factor::{FactorEvaluator, FactorKind, FactorScore, RiskFactor};
pub use gate::{Action, decide};
pub use patterns::{PatternTag, detect};
pub use precedent::{PrecedentPattern, PrecedentSet};
