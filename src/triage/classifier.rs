use std::panic::{self, AssertUnwindSafe};

use super::keywords::{
    contains_any, EMERGENCY_KEYWORDS, PROLONGED_FEVER_TERM, RISK_RULES, URGENT_KEYWORDS,
};
use crate::models::{ClassificationResult, RiskFactor, Severity, SymptomDuration, SymptomInput, SymptomText};

/// Confidence bounds applied after all adjustments.
pub const MIN_CONFIDENCE: f32 = 0.3;
pub const MAX_CONFIDENCE: f32 = 0.95;

/// More tokens than this earns a confidence bonus.
const DETAILED_TOKEN_THRESHOLD: usize = 3;
/// Fewer tokens than this costs a confidence penalty.
const SPARSE_TOKEN_THRESHOLD: usize = 2;
const TOKEN_ADJUSTMENT: f32 = 0.1;

/// Keyword-based symptom severity classifier.
///
/// Holds no state: keyword tables are compile-time constants, so any
/// number of callers can share or create instances freely.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeverityClassifier;

impl SeverityClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify symptoms into a severity bucket with risk factors,
    /// recommendations and a confidence score.
    ///
    /// Total: if evaluation fails for any reason the safe default
    /// (`medium`, confidence 0.3) is returned instead. The process panic
    /// hook still runs first, so the default hook prints the panic to stderr.
    pub fn classify(&self, input: &SymptomInput) -> ClassificationResult {
        classify_with(input, evaluate)
    }
}

fn classify_with<F>(input: &SymptomInput, eval: F) -> ClassificationResult
where
    F: FnOnce(&SymptomInput) -> ClassificationResult,
{
    panic::catch_unwind(AssertUnwindSafe(|| eval(input)))
        .unwrap_or_else(|_| ClassificationResult::safe_default())
}

fn evaluate(input: &SymptomInput) -> ClassificationResult {
    let text = normalize(&input.symptoms);
    let severity = determine_severity(&text, input.duration);
    let risk_factors = identify_risk_factors(&text);
    let recommendations = recommendations_for(severity, &risk_factors);
    let confidence = confidence_for(&text, severity);

    ClassificationResult {
        severity,
        risk_factors,
        recommendations,
        confidence,
    }
}

/// Join phrases with single spaces and lower-case the result.
pub fn normalize(symptoms: &SymptomText) -> String {
    symptoms.joined(" ").to_lowercase()
}

/// Emergency terms win outright; then urgent terms; then a week-long fever.
pub fn determine_severity(text: &str, duration: SymptomDuration) -> Severity {
    if contains_any(text, EMERGENCY_KEYWORDS) {
        return Severity::High;
    }

    if contains_any(text, URGENT_KEYWORDS) {
        return Severity::Medium;
    }

    if duration == SymptomDuration::MoreThanWeek && text.contains(PROLONGED_FEVER_TERM) {
        return Severity::Medium;
    }

    Severity::Low
}

/// Tag symptom co-occurrences, in rule-table order, without duplicates.
pub fn identify_risk_factors(text: &str) -> Vec<RiskFactor> {
    let mut factors = Vec::new();
    for rule in RISK_RULES {
        if text.contains(rule.first) && text.contains(rule.second) && !factors.contains(&rule.factor)
        {
            factors.push(rule.factor);
        }
    }
    factors
}

/// Severity base advice followed by risk-factor additions.
pub fn recommendations_for(severity: Severity, risk_factors: &[RiskFactor]) -> Vec<String> {
    let base: &[&str] = match severity {
        Severity::High => &[
            "Seek immediate medical attention",
            "Go to nearest emergency facility",
        ],
        Severity::Medium => &[
            "Consult healthcare provider within 24 hours",
            "Monitor symptoms closely",
        ],
        Severity::Low => &["Rest and stay hydrated", "Monitor symptoms for changes"],
    };

    let mut recommendations: Vec<String> = base.iter().map(|s| s.to_string()).collect();
    for factor in risk_factors {
        recommendations.extend(risk_factor_advice(*factor).iter().map(|s| s.to_string()));
    }
    recommendations
}

fn risk_factor_advice(factor: RiskFactor) -> &'static [&'static str] {
    match factor {
        RiskFactor::DehydrationRisk => &[
            "Increase fluid intake",
            "Consider oral rehydration solution",
        ],
        RiskFactor::RespiratoryInfection | RiskFactor::PossibleInfection => &[],
    }
}

/// Severity base score adjusted by how much detail was given.
pub fn confidence_for(text: &str, severity: Severity) -> f32 {
    let mut confidence: f32 = match severity {
        Severity::High => 0.9,
        Severity::Medium => 0.7,
        Severity::Low => 0.5,
    };

    let tokens = token_count(text);
    if tokens > DETAILED_TOKEN_THRESHOLD {
        confidence += TOKEN_ADJUSTMENT;
    }
    if tokens < SPARSE_TOKEN_THRESHOLD {
        confidence -= TOKEN_ADJUSTMENT;
    }

    confidence.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
}

/// Count tokens split on whitespace and commas.
pub fn token_count(text: &str) -> usize {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(symptoms: impl Into<SymptomText>, duration: SymptomDuration) -> ClassificationResult {
        SeverityClassifier::new().classify(&SymptomInput::new(symptoms, duration))
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    // =================================================================
    // SCENARIOS
    // =================================================================

    #[test]
    fn panicking_evaluation_yields_safe_default() {
        let input = SymptomInput::new("chest pain", SymptomDuration::Unknown);
        let result = classify_with(&input, |_| panic!("keyword table corrupted"));
        assert_eq!(result, ClassificationResult::safe_default());
        assert_eq!(result.severity, Severity::Medium);
        assert!(approx(result.confidence, MIN_CONFIDENCE));
    }

    #[test]
    fn fever_and_cough_is_low_with_respiratory_tag() {
        let result = classify(&["fever", "cough"][..], SymptomDuration::Unknown);
        assert_eq!(result.severity, Severity::Low);
        assert!(result.risk_factors.contains(&RiskFactor::RespiratoryInfection));
        assert_eq!(result.recommendations[0], "Rest and stay hydrated");
    }

    #[test]
    fn severe_chest_pain_is_high() {
        let result = classify("severe chest pain", SymptomDuration::Unknown);
        assert_eq!(result.severity, Severity::High);
        assert_eq!(result.confidence, 0.9);
        assert_eq!(result.recommendations[0], "Seek immediate medical attention");
    }

    #[test]
    fn diarrhea_and_vomiting_is_medium_with_dehydration() {
        let result = classify(&["diarrhea", "vomiting"][..], SymptomDuration::Unknown);
        assert_eq!(result.severity, Severity::Medium);
        assert_eq!(result.risk_factors, vec![RiskFactor::DehydrationRisk]);
        assert!(result
            .recommendations
            .contains(&"Increase fluid intake".to_string()));
    }

    #[test]
    fn long_tiredness_without_fever_stays_low() {
        let result = classify("mild tiredness", SymptomDuration::MoreThanWeek);
        assert_eq!(result.severity, Severity::Low);
    }

    #[test]
    fn empty_input_is_low_with_floor_confidence() {
        let result = classify("", SymptomDuration::Unknown);
        assert_eq!(result.severity, Severity::Low);
        assert!(result.risk_factors.is_empty());
        assert!(result.confidence >= MIN_CONFIDENCE);
        assert!(approx(result.confidence, 0.4));
        assert_eq!(
            result.recommendations,
            vec!["Rest and stay hydrated", "Monitor symptoms for changes"]
        );
    }

    // =================================================================
    // SEVERITY ORDERING
    // =================================================================

    #[test]
    fn emergency_keyword_wins_over_urgent() {
        let result = classify("vomiting and diarrhea with chest pain", SymptomDuration::Unknown);
        assert_eq!(result.severity, Severity::High);
    }

    #[test]
    fn every_emergency_keyword_is_high() {
        for keyword in EMERGENCY_KEYWORDS {
            let result = classify(format!("I have {keyword} today"), SymptomDuration::Unknown);
            assert_eq!(result.severity, Severity::High, "keyword: {keyword}");
        }
    }

    #[test]
    fn every_urgent_keyword_is_medium() {
        for keyword in URGENT_KEYWORDS {
            let result = classify(keyword.to_string(), SymptomDuration::Unknown);
            assert_eq!(result.severity, Severity::Medium, "keyword: {keyword}");
        }
    }

    #[test]
    fn matching_ignores_case() {
        let result = classify("Difficulty BREATHING", SymptomDuration::Unknown);
        assert_eq!(result.severity, Severity::High);
    }

    #[test]
    fn week_long_fever_escalates_to_medium() {
        let result = classify("mild fever", SymptomDuration::MoreThanWeek);
        assert_eq!(result.severity, Severity::Medium);
    }

    #[test]
    fn short_fever_stays_low() {
        let result = classify("mild fever", SymptomDuration::ThreeToSevenDays);
        assert_eq!(result.severity, Severity::Low);
    }

    #[test]
    fn vomiting_blood_is_high_not_medium() {
        let result = classify("vomiting blood", SymptomDuration::Unknown);
        assert_eq!(result.severity, Severity::High);
    }

    // =================================================================
    // RISK FACTORS
    // =================================================================

    #[test]
    fn risk_factors_follow_rule_order() {
        let factors = identify_risk_factors("headache, fever, cough, diarrhea, vomiting");
        assert_eq!(
            factors,
            vec![
                RiskFactor::RespiratoryInfection,
                RiskFactor::DehydrationRisk,
                RiskFactor::PossibleInfection,
            ]
        );
    }

    #[test]
    fn headache_and_fever_tag_possible_infection() {
        let factors = identify_risk_factors("headache and fever");
        assert_eq!(factors, vec![RiskFactor::PossibleInfection]);
    }

    #[test]
    fn single_term_raises_no_tag() {
        assert!(identify_risk_factors("cough").is_empty());
    }

    #[test]
    fn dehydration_advice_follows_base_list() {
        let recs = recommendations_for(Severity::High, &[RiskFactor::DehydrationRisk]);
        assert_eq!(
            recs,
            vec![
                "Seek immediate medical attention",
                "Go to nearest emergency facility",
                "Increase fluid intake",
                "Consider oral rehydration solution",
            ]
        );
    }

    // =================================================================
    // CONFIDENCE
    // =================================================================

    #[test]
    fn detailed_input_gains_confidence() {
        let c = confidence_for("fever cough tiredness aches", Severity::Low);
        assert!(approx(c, 0.6));
    }

    #[test]
    fn single_token_loses_confidence() {
        let c = confidence_for("cough", Severity::Medium);
        assert!(approx(c, 0.6));
    }

    #[test]
    fn confidence_is_capped() {
        let c = confidence_for("severe chest pain and difficulty breathing", Severity::High);
        assert_eq!(c, MAX_CONFIDENCE);
    }

    #[test]
    fn commas_split_tokens() {
        assert_eq!(token_count("fever,cough, headache"), 3);
        assert_eq!(token_count("   "), 0);
    }

    #[test]
    fn confidence_always_in_bounds() {
        let inputs = ["", "a", "fever", "chest pain", "one two three four five six seven"];
        for text in inputs {
            for severity in [Severity::Low, Severity::Medium, Severity::High] {
                let c = confidence_for(text, severity);
                assert!((MIN_CONFIDENCE..=MAX_CONFIDENCE).contains(&c), "{text}: {c}");
            }
        }
    }

    // =================================================================
    // PURITY
    // =================================================================

    #[test]
    fn classification_is_idempotent() {
        let classifier = SeverityClassifier::new();
        let input = SymptomInput::new("headache and fever for days", SymptomDuration::MoreThanWeek);
        assert_eq!(classifier.classify(&input), classifier.classify(&input));
    }

    #[test]
    fn empty_list_is_treated_as_empty_text() {
        let result = classify(Vec::<String>::new(), SymptomDuration::Unknown);
        assert_eq!(result.severity, Severity::Low);
        assert!(result.risk_factors.is_empty());
    }
}
