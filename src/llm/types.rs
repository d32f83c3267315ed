use serde::{Deserialize, Serialize};

use super::LlmError;
use crate::models::Severity;

/// Text-generation provider abstraction (allows mocking).
pub trait AdviceClient: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    /// Provider/model label for logs.
    fn describe(&self) -> String;
}

/// Advice read from the provider's reply. Every field is optional:
/// absent fields fall back to the rule-based result when merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmAdvice {
    pub advice: Option<String>,
    pub severity: Option<Severity>,
    pub confidence: Option<f32>,
    pub recommendations: Option<Vec<String>>,
    pub emergency_actions: Option<Vec<String>>,
    pub follow_up: Option<String>,
}

impl LlmAdvice {
    /// True when the provider contributed nothing usable.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
