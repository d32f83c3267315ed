use crate::models::RiskFactor;

/// Phrases that alone warrant emergency care.
pub const EMERGENCY_KEYWORDS: &[&str] = &[
    "difficulty breathing",
    "chest pain",
    "severe pain",
    "bleeding",
    "unconscious",
    "seizure",
    "high fever",
    "severe headache",
    "vomiting blood",
    "severe dehydration",
    "allergic reaction",
];

/// Phrases that warrant a consultation within a day.
pub const URGENT_KEYWORDS: &[&str] = &[
    "persistent fever",
    "persistent cough",
    "severe fatigue",
    "diarrhea",
    "vomiting",
    "moderate pain",
    "infection signs",
];

/// A fever lasting more than a week escalates to medium.
pub const PROLONGED_FEVER_TERM: &str = "fever";

/// A risk factor raised when both terms appear anywhere in the text.
pub struct CoOccurrenceRule {
    pub first: &'static str,
    pub second: &'static str,
    pub factor: RiskFactor,
}

/// Evaluated in order; result order follows this table.
pub const RISK_RULES: &[CoOccurrenceRule] = &[
    CoOccurrenceRule {
        first: "fever",
        second: "cough",
        factor: RiskFactor::RespiratoryInfection,
    },
    CoOccurrenceRule {
        first: "diarrhea",
        second: "vomiting",
        factor: RiskFactor::DehydrationRisk,
    },
    CoOccurrenceRule {
        first: "headache",
        second: "fever",
        factor: RiskFactor::PossibleInfection,
    },
];

/// Whether `text` contains any of `keywords` as a substring.
pub fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}
