use super::classifier::SeverityClassifier;
use crate::llm::{AdviceService, LlmAdvice};
use crate::models::{AdviceSource, ClassificationResult, Severity, TriageOutcome, TriageRequest};

pub const DEFAULT_FOLLOW_UP: &str = "Monitor symptoms and consult healthcare provider if needed";

/// Confidence assumed for the AI side when it gives none.
const DEFAULT_AI_CONFIDENCE: f32 = 0.5;

/// Advice shown when the AI provider gives none.
pub fn fallback_advice(severity: Severity) -> &'static str {
    match severity {
        Severity::High => {
            "Your symptoms require immediate medical attention. Please seek emergency care."
        }
        Severity::Medium => {
            "Monitor your symptoms closely. Consider consulting a healthcare provider."
        }
        Severity::Low => {
            "Rest, stay hydrated, and monitor your symptoms. Seek care if they worsen."
        }
    }
}

/// Merge AI advice over the rule-based result.
///
/// AI fields win when present; everything missing falls back to the
/// rules. Confidence is the higher of the two.
pub fn merge(rule: &ClassificationResult, ai: &LlmAdvice) -> TriageOutcome {
    let recommendations = ai
        .recommendations
        .clone()
        .filter(|r| !r.is_empty())
        .or_else(|| ai.emergency_actions.clone().filter(|r| !r.is_empty()))
        .unwrap_or_else(|| rule.recommendations.clone());

    TriageOutcome {
        advice: ai
            .advice
            .clone()
            .unwrap_or_else(|| fallback_advice(rule.severity).to_string()),
        severity: ai.severity.unwrap_or(rule.severity),
        confidence: ai
            .confidence
            .unwrap_or(DEFAULT_AI_CONFIDENCE)
            .max(rule.confidence),
        recommendations,
        risk_factors: rule.risk_factors.clone(),
        follow_up: ai
            .follow_up
            .clone()
            .unwrap_or_else(|| DEFAULT_FOLLOW_UP.to_string()),
        advice_source: if ai.is_empty() {
            AdviceSource::Rules
        } else {
            AdviceSource::Ai
        },
    }
}

/// Run the full triage for a validated request.
///
/// Blocking when an advisor is configured (network call).
pub fn assess(
    request: &TriageRequest,
    classifier: &SeverityClassifier,
    advisor: Option<&AdviceService>,
) -> TriageOutcome {
    let rule = classifier.classify(&request.classifier_input());
    tracing::debug!(
        severity = %rule.severity,
        confidence = rule.confidence,
        risk_factors = ?rule.risk_factors,
        "Rule-based classification"
    );

    let ai = match advisor {
        Some(service) => service.advise(&request.symptoms, request.language, request.duration),
        None => LlmAdvice::default(),
    };

    let outcome = merge(&rule, &ai);
    tracing::info!(
        severity = %outcome.severity,
        rule_severity = %rule.severity,
        source = %outcome.advice_source,
        "Triage completed"
    );
    outcome
}
