use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use serde::Serialize;
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_symptom_log(conn: &Connection, log: &SymptomLog) -> Result<(), DatabaseError> {
    let location = log.location.clone().unwrap_or_default();
    conn.execute(
        "INSERT INTO symptom_logs (id, symptoms, duration, language, severity, confidence,
         advice, recommendations, risk_factors, follow_up, advice_source, ip_address,
         user_agent, location_camp, location_region, location_country, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
        params![
            log.id.to_string(),
            serde_json::to_string(&log.symptoms)?,
            log.duration.as_str(),
            log.language.as_str(),
            log.severity.as_str(),
            log.confidence as f64,
            log.advice,
            serde_json::to_string(&log.recommendations)?,
            serde_json::to_string(&log.risk_factors)?,
            log.follow_up,
            log.advice_source.as_str(),
            log.ip_address,
            log.user_agent,
            location.camp,
            location.region,
            location.country,
            log.created_at,
        ],
    )?;
    Ok(())
}

pub fn count_symptom_logs(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM symptom_logs", [], |row| {
        row.get::<_, i64>(0)
    })?;
    Ok(count)
}

/// Number of logged triages per final severity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub low: i64,
    pub medium: i64,
    pub high: i64,
}

pub fn count_by_severity(conn: &Connection) -> Result<SeverityCounts, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT severity, COUNT(*) FROM symptom_logs GROUP BY severity")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
    })?;

    let mut counts = SeverityCounts::default();
    for row in rows {
        let (severity, count) = row?;
        match Severity::from_str(&severity)? {
            Severity::Low => counts.low = count,
            Severity::Medium => counts.medium = count,
            Severity::High => counts.high = count,
        }
    }
    Ok(counts)
}

/// Most recent logs first.
pub fn recent_symptom_logs(conn: &Connection, limit: u32) -> Result<Vec<SymptomLog>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, symptoms, duration, language, severity, confidence, advice,
         recommendations, risk_factors, follow_up, advice_source, ip_address, user_agent,
         location_camp, location_region, location_country, created_at
         FROM symptom_logs ORDER BY created_at DESC LIMIT ?1",
    )?;

    let rows = stmt.query_map(params![limit], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, f64>(5)?,
            row.get::<_, String>(6)?,
            row.get::<_, String>(7)?,
            row.get::<_, String>(8)?,
            row.get::<_, String>(9)?,
            row.get::<_, String>(10)?,
            row.get::<_, Option<String>>(11)?,
            row.get::<_, Option<String>>(12)?,
            row.get::<_, Option<String>>(13)?,
            row.get::<_, Option<String>>(14)?,
            row.get::<_, Option<String>>(15)?,
            row.get::<_, NaiveDateTime>(16)?,
        ))
    })?;

    let mut logs = Vec::new();
    for row in rows {
        let (
            id, symptoms, duration, language, severity, confidence, advice,
            recommendations, risk_factors, follow_up, advice_source, ip_address, user_agent,
            camp, region, country, created_at,
        ) = row?;

        let location = if camp.is_some() || region.is_some() || country.is_some() {
            Some(TriageLocation { camp, region, country })
        } else {
            None
        };

        logs.push(SymptomLog {
            id: Uuid::parse_str(&id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            symptoms: serde_json::from_str(&symptoms)?,
            duration: SymptomDuration::from_str(&duration)?,
            language: Language::from_str(&language)?,
            severity: Severity::from_str(&severity)?,
            confidence: confidence as f32,
            advice,
            recommendations: serde_json::from_str(&recommendations)?,
            risk_factors: serde_json::from_str(&risk_factors)?,
            follow_up,
            advice_source: AdviceSource::from_str(&advice_source)?,
            ip_address,
            user_agent,
            location,
            created_at,
        });
    }
    Ok(logs)
}

/// Symptoms and time of one logged case, for regional analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedCase {
    pub symptoms: Vec<String>,
    pub created_at: NaiveDateTime,
}

/// Cases logged at exactly `location` since `since`, oldest first.
///
/// `None` (or a location with no field set) matches cases logged without
/// a location.
pub fn cases_at_location(
    conn: &Connection,
    location: Option<&TriageLocation>,
    since: NaiveDateTime,
) -> Result<Vec<LocatedCase>, DatabaseError> {
    let location = location.cloned().unwrap_or_default();
    // `IS` compares NULLs as equal
    let mut stmt = conn.prepare(
        "SELECT symptoms, created_at FROM symptom_logs
         WHERE location_camp IS ?1 AND location_region IS ?2 AND location_country IS ?3
           AND created_at >= ?4
         ORDER BY created_at ASC",
    )?;

    let rows = stmt.query_map(
        params![location.camp, location.region, location.country, since],
        |row| Ok((row.get::<_, String>(0)?, row.get::<_, NaiveDateTime>(1)?)),
    )?;

    let mut cases = Vec::new();
    for row in rows {
        let (symptoms, created_at) = row?;
        cases.push(LocatedCase {
            symptoms: serde_json::from_str(&symptoms)?,
            created_at,
        });
    }
    Ok(cases)
}
