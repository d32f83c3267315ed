use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{AdviceSource, Language, RiskFactor, Severity, SymptomDuration};
use super::triage::TriageLocation;

/// One persisted triage interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymptomLog {
    pub id: Uuid,
    pub symptoms: Vec<String>,
    pub duration: SymptomDuration,
    pub language: Language,
    pub severity: Severity,
    pub confidence: f32,
    pub advice: String,
    pub recommendations: Vec<String>,
    pub risk_factors: Vec<RiskFactor>,
    pub follow_up: String,
    pub advice_source: AdviceSource,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub location: Option<TriageLocation>,
    pub created_at: NaiveDateTime,
}
