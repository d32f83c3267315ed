use serde::{Deserialize, Serialize};

use super::enums::{AdviceSource, Language, RiskFactor, Severity, SymptomDuration};

/// Free-text symptoms as submitted: one sentence or a list of phrases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SymptomText {
    Single(String),
    List(Vec<String>),
}

impl SymptomText {
    /// Join the phrases with `sep`. A single string is returned as-is.
    pub fn joined(&self, sep: &str) -> String {
        match self {
            Self::Single(text) => text.clone(),
            Self::List(phrases) => phrases.join(sep),
        }
    }

    /// Phrases as stored in the symptom log (a single string becomes a one-item list).
    pub fn to_list(&self) -> Vec<String> {
        match self {
            Self::Single(text) => vec![text.clone()],
            Self::List(phrases) => phrases.clone(),
        }
    }
}

impl Default for SymptomText {
    fn default() -> Self {
        Self::Single(String::new())
    }
}

impl From<&str> for SymptomText {
    fn from(text: &str) -> Self {
        Self::Single(text.to_string())
    }
}

impl From<String> for SymptomText {
    fn from(text: String) -> Self {
        Self::Single(text)
    }
}

impl From<Vec<String>> for SymptomText {
    fn from(phrases: Vec<String>) -> Self {
        Self::List(phrases)
    }
}

impl From<&[&str]> for SymptomText {
    fn from(phrases: &[&str]) -> Self {
        Self::List(phrases.iter().map(|p| p.to_string()).collect())
    }
}

/// Input to the severity classifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymptomInput {
    pub symptoms: SymptomText,
    pub duration: SymptomDuration,
}

impl SymptomInput {
    pub fn new(symptoms: impl Into<SymptomText>, duration: SymptomDuration) -> Self {
        Self {
            symptoms: symptoms.into(),
            duration,
        }
    }
}

/// Rule-based triage result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub severity: Severity,
    pub risk_factors: Vec<RiskFactor>,
    pub recommendations: Vec<String>,
    /// Heuristic score in [0.3, 0.95].
    pub confidence: f32,
}

impl ClassificationResult {
    /// Result used when classification cannot complete.
    pub fn safe_default() -> Self {
        Self {
            severity: Severity::Medium,
            risk_factors: Vec::new(),
            recommendations: vec!["Consult healthcare provider".to_string()],
            confidence: 0.3,
        }
    }
}

/// Where the person reporting symptoms is located.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageLocation {
    pub camp: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
}

impl TriageLocation {
    pub fn is_set(&self) -> bool {
        self.camp.is_some() || self.region.is_some() || self.country.is_some()
    }

    /// Human-readable place name, most specific first, e.g. "Kakuma, Kenya".
    pub fn label(&self) -> String {
        let parts: Vec<&str> = [&self.camp, &self.region, &self.country]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .collect();
        if parts.is_empty() {
            "unknown".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Validated triage submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageRequest {
    pub symptoms: SymptomText,
    pub duration: SymptomDuration,
    pub language: Language,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<TriageLocation>,
}

impl TriageRequest {
    pub fn classifier_input(&self) -> SymptomInput {
        SymptomInput {
            symptoms: self.symptoms.clone(),
            duration: self.duration,
        }
    }
}

/// Final triage answer after merging rule-based and AI advice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageOutcome {
    pub advice: String,
    pub severity: Severity,
    pub confidence: f32,
    pub recommendations: Vec<String>,
    pub risk_factors: Vec<RiskFactor>,
    pub follow_up: String,
    pub advice_source: AdviceSource,
}
