use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::types::LlmAdvice;
use crate::models::Severity;

/// Longest advice kept when the reply is free text.
const TEXT_ADVICE_MAX_CHARS: usize = 200;
const TEXT_CONFIDENCE: f32 = 0.6;
const TEXT_FOLLOW_UP: &str = "Monitor symptoms and seek care if they worsen";

const HIGH_SEVERITY_WORDS: &[&str] = &[
    "emergency",
    "immediate",
    "urgent",
    "hospital",
    "dangerous",
    "serious",
];
const MEDIUM_SEVERITY_WORDS: &[&str] = &["monitor", "concern", "doctor", "medical attention"];

/// Outermost `{ ... }` span, first opening brace to last closing brace.
static JSON_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("Invalid JSON span regex"));

/// Parse a provider reply into advice.
///
/// A JSON object anywhere in the reply is preferred; otherwise the
/// reply is read as prose.
pub fn parse_advice(response: &str) -> LlmAdvice {
    if let Some(span) = JSON_SPAN.find(response) {
        match serde_json::from_str::<Value>(span.as_str()) {
            Ok(value) => return advice_from_json(&value),
            Err(e) => tracing::warn!(error = %e, "LLM reply JSON did not parse, reading as text"),
        }
    }
    advice_from_text(response)
}

/// Read known fields leniently: wrong types or out-of-range values are dropped.
fn advice_from_json(value: &Value) -> LlmAdvice {
    LlmAdvice {
        advice: non_empty_str(value.get("advice")),
        severity: value
            .get("severity")
            .and_then(Value::as_str)
            .and_then(|s| Severity::from_str(&s.trim().to_lowercase()).ok()),
        confidence: value
            .get("confidence")
            .and_then(Value::as_f64)
            .filter(|c| c.is_finite() && (0.0..=1.0).contains(c))
            .map(|c| c as f32),
        recommendations: string_list(value.get("recommendations")),
        emergency_actions: string_list(value.get("emergencyActions")),
        follow_up: non_empty_str(value.get("followUp")),
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    let items: Vec<String> = value?
        .as_array()?
        .iter()
        .filter_map(|v| non_empty_str(Some(v)))
        .collect();
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

fn advice_from_text(text: &str) -> LlmAdvice {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return LlmAdvice::default();
    }

    let mut advice: String = trimmed.chars().take(TEXT_ADVICE_MAX_CHARS).collect();
    if trimmed.chars().count() > TEXT_ADVICE_MAX_CHARS {
        advice.push_str("...");
    }

    LlmAdvice {
        advice: Some(advice),
        severity: Some(detect_severity_from_text(trimmed)),
        confidence: Some(TEXT_CONFIDENCE),
        recommendations: None,
        emergency_actions: None,
        follow_up: Some(TEXT_FOLLOW_UP.to_string()),
    }
}

/// Guess severity from the wording of a prose reply.
pub fn detect_severity_from_text(text: &str) -> Severity {
    let lower = text.to_lowercase();
    if HIGH_SEVERITY_WORDS.iter().any(|w| lower.contains(w)) {
        Severity::High
    } else if MEDIUM_SEVERITY_WORDS.iter().any(|w| lower.contains(w)) {
        Severity::Medium
    } else {
        Severity::Low
    }
}
