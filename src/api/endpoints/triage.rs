//! Triage submission, statistics and outbreak risk endpoints.

use std::net::SocketAddr;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{ConnectInfo, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::middleware::rate::client_ip;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;
use crate::db::{self, SeverityCounts};
use crate::models::{SymptomLog, TriageLocation, TriageOutcome, TriageRequest};
use crate::triage::outbreak::{trend_window_start, window_start};
use crate::triage::{
    analyze_outbreak, assess, regional_risk, validate_location_filter, validate_triage_request,
    OutbreakAnalysis, RegionalRisk,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageResponse {
    pub success: bool,
    pub data: TriageOutcome,
    pub user_input: TriageRequest,
    /// `null` when the log could not be read.
    pub outbreak_risk: Option<OutbreakAnalysis>,
    pub timestamp: String,
}

/// Who submitted a triage, as far as the request tells us.
#[derive(Debug, Clone, Default)]
pub struct RequestOrigin {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestOrigin {
    fn from_parts(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
        Self {
            ip_address: client_ip(headers, peer),
            user_agent: headers
                .get(axum::http::header::USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        }
    }
}

/// `POST /api/triage`: validate, classify, advise, log, check for clusters.
pub async fn submit(
    State(ctx): State<ApiContext>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<TriageResponse>, ApiError> {
    let Json(body) = body.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    let request = validate_triage_request(&body).map_err(|errors| {
        tracing::info!(?errors, "Triage request rejected");
        ApiError::Validation(errors)
    })?;

    let origin = RequestOrigin::from_parts(&headers, peer.map(|ConnectInfo(addr)| addr));
    let core = ctx.core.clone();
    let user_input = request.clone();

    // Classification is CPU-only but advice may block on the network.
    let (data, outbreak_risk) = tokio::task::spawn_blocking(move || {
        let outcome = assess(&request, &core.classifier, core.advisor.as_ref());
        save_log(&core, &request, &outcome, origin);
        let outbreak = check_outbreak(&core, &request);
        (outcome, outbreak)
    })
    .await?;

    tracing::info!(severity = %data.severity, source = %data.advice_source, "Triage completed");

    Ok(Json(TriageResponse {
        success: true,
        data,
        user_input,
        outbreak_risk,
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}

/// Persist a completed triage. Failures are logged, never surfaced.
fn save_log(core: &CoreState, request: &TriageRequest, outcome: &TriageOutcome, origin: RequestOrigin) {
    let log = SymptomLog {
        id: Uuid::new_v4(),
        symptoms: request.symptoms.to_list(),
        duration: request.duration,
        language: request.language,
        severity: outcome.severity,
        confidence: outcome.confidence,
        advice: outcome.advice.clone(),
        recommendations: outcome.recommendations.clone(),
        risk_factors: outcome.risk_factors.clone(),
        follow_up: outcome.follow_up.clone(),
        advice_source: outcome.advice_source,
        ip_address: origin.ip_address,
        user_agent: origin.user_agent,
        location: request.location.clone(),
        created_at: chrono::Utc::now().naive_utc(),
    };

    let result = core
        .open_db()
        .map_err(|e| e.to_string())
        .and_then(|conn| db::insert_symptom_log(&conn, &log).map_err(|e| e.to_string()));

    match result {
        Ok(()) => tracing::debug!(id = %log.id, "Symptom log saved"),
        Err(e) => tracing::error!(error = %e, "Failed to save symptom log"),
    }
}

/// Compare a just-logged submission with recent cases at its location.
/// The submission itself is among the cases counted.
fn check_outbreak(core: &CoreState, request: &TriageRequest) -> Option<OutbreakAnalysis> {
    let now = chrono::Utc::now().naive_utc();
    let cases = core
        .open_db()
        .map_err(|e| e.to_string())
        .and_then(|conn| {
            db::cases_at_location(&conn, request.location.as_ref(), window_start(now))
                .map_err(|e| e.to_string())
        });

    match cases {
        Ok(cases) => Some(analyze_outbreak(
            &request.symptoms.to_list(),
            request.location.as_ref(),
            &cases,
            now,
        )),
        Err(e) => {
            tracing::error!(error = %e, "Outbreak check failed");
            None
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageStats {
    pub total_triages: i64,
    pub by_severity: SeverityCounts,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub data: TriageStats,
    pub timestamp: String,
}

/// `GET /api/triage/stats`
pub async fn stats(State(ctx): State<ApiContext>) -> Result<Json<StatsResponse>, ApiError> {
    let core = ctx.core.clone();
    let data = tokio::task::spawn_blocking(move || -> Result<TriageStats, ApiError> {
        let conn = core.open_db()?;
        Ok(TriageStats {
            total_triages: db::count_symptom_logs(&conn)?,
            by_severity: db::count_by_severity(&conn)?,
        })
    })
    .await??;

    Ok(Json(StatsResponse {
        success: true,
        data,
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}

#[derive(Serialize)]
pub struct OutbreakResponse {
    pub success: bool,
    pub data: RegionalRisk,
    pub timestamp: String,
}

/// `GET /api/triage/outbreak?camp=&region=&country=`
///
/// With no parameters, reports on cases logged without a location.
pub async fn outbreak(
    State(ctx): State<ApiContext>,
    query: Result<Query<TriageLocation>, QueryRejection>,
) -> Result<Json<OutbreakResponse>, ApiError> {
    let Query(location) = query.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let location = validate_location_filter(&location).map_err(ApiError::Validation)?;

    let core = ctx.core.clone();
    let data = tokio::task::spawn_blocking(move || -> Result<RegionalRisk, ApiError> {
        let now = chrono::Utc::now().naive_utc();
        let conn = core.open_db()?;
        let cases = db::cases_at_location(&conn, location.as_ref(), trend_window_start(now))?;
        Ok(regional_risk(location.as_ref(), &cases, now))
    })
    .await??;

    Ok(Json(OutbreakResponse {
        success: true,
        data,
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}
