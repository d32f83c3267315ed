//! Regional outbreak risk from recently logged cases.
//!
//! Works on cases already loaded from the symptom log, so every
//! function here is pure apart from the high-risk alert log line.

use std::collections::{HashMap, HashSet};

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use crate::db::LocatedCase;
use crate::models::{OutbreakRiskLevel, OutbreakTrend, TriageLocation};

/// Cases older than this do not count towards the current risk.
pub const OUTBREAK_WINDOW_DAYS: i64 = 7;
/// Fewer similar cases than this is low risk.
pub const MEDIUM_RISK_CASES: usize = 5;
/// At least this many similar cases is high risk.
pub const HIGH_RISK_CASES: usize = 15;
pub const OUTBREAK_TIMEFRAME: &str = "7 days";

const COMMON_SYMPTOM_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymptomCount {
    pub symptom: String,
    pub count: usize,
}

/// Risk for one submission: how many recent cases at the same place
/// share at least one of its symptoms.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutbreakAnalysis {
    pub location: String,
    pub timeframe: &'static str,
    pub similar_cases: usize,
    pub risk_level: OutbreakRiskLevel,
    pub common_symptoms: Vec<SymptomCount>,
    pub recommendation: &'static str,
    pub alert_sent: bool,
}

/// Risk for a place regardless of symptoms, with a week-on-week trend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionalRisk {
    pub location: String,
    pub timeframe: &'static str,
    pub total_cases: usize,
    pub risk_level: OutbreakRiskLevel,
    pub trend: OutbreakTrend,
    pub common_symptoms: Vec<SymptomCount>,
    pub recommendation: &'static str,
}

/// Start of the current window.
pub fn window_start(now: NaiveDateTime) -> NaiveDateTime {
    now - Duration::days(OUTBREAK_WINDOW_DAYS)
}

/// Start of the previous window, used for the trend.
pub fn trend_window_start(now: NaiveDateTime) -> NaiveDateTime {
    now - Duration::days(2 * OUTBREAK_WINDOW_DAYS)
}

pub fn risk_level(case_count: usize) -> OutbreakRiskLevel {
    if case_count < MEDIUM_RISK_CASES {
        OutbreakRiskLevel::Low
    } else if case_count < HIGH_RISK_CASES {
        OutbreakRiskLevel::Medium
    } else {
        OutbreakRiskLevel::High
    }
}

pub fn recommendation(level: OutbreakRiskLevel) -> &'static str {
    match level {
        OutbreakRiskLevel::Low => "Continue monitoring. Standard precautions recommended.",
        OutbreakRiskLevel::Medium => {
            "Increased surveillance recommended. Monitor for symptom clusters."
        }
        OutbreakRiskLevel::High => {
            "Potential outbreak detected. Immediate investigation and containment measures recommended."
        }
    }
}

/// Compare this window's case count with the previous one.
pub fn trend(recent: usize, previous: usize) -> OutbreakTrend {
    let (recent, previous) = (recent as f64, previous as f64);
    if recent > previous * 1.5 {
        OutbreakTrend::Increasing
    } else if recent < previous * 0.5 {
        OutbreakTrend::Decreasing
    } else {
        OutbreakTrend::Stable
    }
}

fn phrase_key(phrase: &str) -> String {
    phrase.trim().to_lowercase()
}

/// Most frequent phrases across `cases`, highest count first, ties by name.
pub fn common_symptoms<'a>(cases: impl IntoIterator<Item = &'a LocatedCase>) -> Vec<SymptomCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for case in cases {
        for phrase in &case.symptoms {
            let key = phrase_key(phrase);
            if !key.is_empty() {
                *counts.entry(key).or_default() += 1;
            }
        }
    }

    let mut ranked: Vec<SymptomCount> = counts
        .into_iter()
        .map(|(symptom, count)| SymptomCount { symptom, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.symptom.cmp(&b.symptom)));
    ranked.truncate(COMMON_SYMPTOM_LIMIT);
    ranked
}

/// Analyze a submission against `cases` logged at the same location.
pub fn analyze_outbreak(
    symptoms: &[String],
    location: Option<&TriageLocation>,
    cases: &[LocatedCase],
    now: NaiveDateTime,
) -> OutbreakAnalysis {
    let wanted: HashSet<String> = symptoms.iter().map(|s| phrase_key(s)).collect();
    let since = window_start(now);

    let similar: Vec<&LocatedCase> = cases
        .iter()
        .filter(|c| c.created_at >= since)
        .filter(|c| c.symptoms.iter().any(|s| wanted.contains(&phrase_key(s))))
        .collect();

    let level = risk_level(similar.len());
    let location = location.map(TriageLocation::label).unwrap_or_else(|| "unknown".into());
    let alert_sent = level == OutbreakRiskLevel::High;

    if alert_sent {
        tracing::warn!(
            location = %location,
            similar_cases = similar.len(),
            "Possible outbreak: high case count for shared symptoms"
        );
    }

    OutbreakAnalysis {
        location,
        timeframe: OUTBREAK_TIMEFRAME,
        similar_cases: similar.len(),
        risk_level: level,
        common_symptoms: common_symptoms(similar.iter().copied()),
        recommendation: recommendation(level),
        alert_sent,
    }
}

/// Summarize `cases` logged at a location over the last two windows.
pub fn regional_risk(
    location: Option<&TriageLocation>,
    cases: &[LocatedCase],
    now: NaiveDateTime,
) -> RegionalRisk {
    let since = window_start(now);
    let previous_since = trend_window_start(now);

    let recent: Vec<&LocatedCase> = cases.iter().filter(|c| c.created_at >= since).collect();
    let previous = cases
        .iter()
        .filter(|c| c.created_at >= previous_since && c.created_at < since)
        .count();

    let level = risk_level(recent.len());
    RegionalRisk {
        location: location.map(TriageLocation::label).unwrap_or_else(|| "unknown".into()),
        timeframe: OUTBREAK_TIMEFRAME,
        total_cases: recent.len(),
        risk_level: level,
        trend: trend(recent.len(), previous),
        common_symptoms: common_symptoms(recent.iter().copied()),
        recommendation: recommendation(level),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> NaiveDateTime {
        chrono::Utc::now().naive_utc()
    }

    fn case(symptoms: &[&str], days_ago: i64) -> LocatedCase {
        LocatedCase {
            symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
            created_at: now() - Duration::days(days_ago) + Duration::minutes(1),
        }
    }

    fn owned(symptoms: &[&str]) -> Vec<String> {
        symptoms.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn risk_thresholds() {
        assert_eq!(risk_level(0), OutbreakRiskLevel::Low);
        assert_eq!(risk_level(4), OutbreakRiskLevel::Low);
        assert_eq!(risk_level(5), OutbreakRiskLevel::Medium);
        assert_eq!(risk_level(14), OutbreakRiskLevel::Medium);
        assert_eq!(risk_level(15), OutbreakRiskLevel::High);
    }

    #[test]
    fn similar_cases_need_a_shared_symptom() {
        let cases = vec![
            case(&["Fever", "cough"], 1),
            case(&["diarrhea"], 2),
            case(&["cough"], 3),
        ];
        let analysis = analyze_outbreak(&owned(&["cough"]), None, &cases, now());
        assert_eq!(analysis.similar_cases, 2);
        assert_eq!(analysis.location, "unknown");
        assert_eq!(analysis.risk_level, OutbreakRiskLevel::Low);
        assert!(!analysis.alert_sent);
        assert_eq!(
            analysis.common_symptoms[0],
            SymptomCount {
                symptom: "cough".into(),
                count: 2
            }
        );
    }

    #[test]
    fn old_cases_are_ignored() {
        let cases: Vec<LocatedCase> = (0..6).map(|_| case(&["fever"], 10)).collect();
        let analysis = analyze_outbreak(&owned(&["fever"]), None, &cases, now());
        assert_eq!(analysis.similar_cases, 0);
    }

    #[test]
    fn cluster_raises_high_risk_and_alert() {
        let camp = TriageLocation {
            camp: Some("Zaatari".into()),
            region: None,
            country: Some("Jordan".into()),
        };
        let cases: Vec<LocatedCase> = (0..HIGH_RISK_CASES).map(|_| case(&["diarrhea", "vomiting"], 1)).collect();
        let analysis = analyze_outbreak(&owned(&["vomiting"]), Some(&camp), &cases, now());
        assert_eq!(analysis.risk_level, OutbreakRiskLevel::High);
        assert!(analysis.alert_sent);
        assert_eq!(analysis.location, "Zaatari, Jordan");
        assert!(analysis.recommendation.starts_with("Potential outbreak detected"));
    }

    #[test]
    fn common_symptoms_ranked_and_limited() {
        let cases = vec![
            case(&["a", "b", "c", "d", "e", "f"], 0),
            case(&["b", "c"], 0),
            case(&["c"], 0),
        ];
        let ranked = common_symptoms(&cases);
        assert_eq!(ranked.len(), COMMON_SYMPTOM_LIMIT);
        let names: Vec<&str> = ranked.iter().map(|s| s.symptom.as_str()).collect();
        assert_eq!(names, vec!["c", "b", "a", "d", "e"]);
    }

    #[test]
    fn trend_compares_windows() {
        assert_eq!(trend(0, 0), OutbreakTrend::Stable);
        assert_eq!(trend(4, 2), OutbreakTrend::Increasing);
        assert_eq!(trend(1, 4), OutbreakTrend::Decreasing);
        assert_eq!(trend(3, 3), OutbreakTrend::Stable);
    }

    #[test]
    fn regional_risk_counts_current_window() {
        let mut cases: Vec<LocatedCase> = (0..5).map(|_| case(&["fever"], 2)).collect();
        cases.push(case(&["cough"], 10));
        let risk = regional_risk(None, &cases, now());
        assert_eq!(risk.total_cases, 5);
        assert_eq!(risk.risk_level, OutbreakRiskLevel::Medium);
        assert_eq!(risk.trend, OutbreakTrend::Increasing);
        assert_eq!(risk.common_symptoms[0].symptom, "fever");
    }
}
