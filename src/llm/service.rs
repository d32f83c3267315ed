use std::sync::Arc;
use std::time::Instant;

use super::parser::parse_advice;
use super::prompt::build_triage_prompt;
use super::types::{AdviceClient, LlmAdvice};
use crate::models::{Language, SymptomDuration, SymptomText};

/// Asks the configured provider for triage advice.
///
/// Never fails: provider errors are logged and yield empty advice so
/// that callers fall back to the rule-based result.
#[derive(Clone)]
pub struct AdviceService {
    client: Arc<dyn AdviceClient>,
}

impl AdviceService {
    pub fn new(client: Arc<dyn AdviceClient>) -> Self {
        Self { client }
    }

    pub fn provider(&self) -> String {
        self.client.describe()
    }

    /// Blocking; call from a blocking-capable thread.
    pub fn advise(
        &self,
        symptoms: &SymptomText,
        language: Language,
        duration: SymptomDuration,
    ) -> LlmAdvice {
        let prompt = build_triage_prompt(symptoms, language, duration);
        let started = Instant::now();

        match self.client.generate(&prompt) {
            Ok(reply) => {
                let advice = parse_advice(&reply);
                tracing::debug!(
                    provider = %self.client.describe(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    severity = ?advice.severity,
                    "LLM advice received"
                );
                advice
            }
            Err(e) => {
                tracing::warn!(
                    provider = %self.client.describe(),
                    error = %e,
                    "LLM advice unavailable, using rule-based triage"
                );
                LlmAdvice::default()
            }
        }
    }
}
