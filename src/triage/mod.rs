//! Symptom triage: rule-based severity classification, request
//! validation, merging with AI advice, and outbreak risk.

pub mod assess;
pub mod classifier;
pub mod keywords;
pub mod outbreak;
pub mod validation;

pub use assess::{assess, fallback_advice, merge, DEFAULT_FOLLOW_UP};
pub use classifier::SeverityClassifier;
pub use outbreak::{analyze_outbreak, regional_risk, OutbreakAnalysis, RegionalRisk};
pub use validation::{validate_location_filter, validate_triage_request};
