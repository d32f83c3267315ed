//! Health check endpoints.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::ApiContext;
use crate::config::{APP_NAME, APP_VERSION};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
    pub timestamp: String,
}

/// `GET /health`: liveness probe.
pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        service: APP_NAME,
        version: APP_VERSION,
        uptime_secs: ctx.core.uptime_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageHealthResponse {
    pub success: bool,
    pub service: &'static str,
    pub status: &'static str,
    /// Whether an LLM provider is configured.
    pub ai_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_provider: Option<String>,
    pub timestamp: String,
}

/// `GET /api/triage/health`
pub async fn triage(State(ctx): State<ApiContext>) -> Json<TriageHealthResponse> {
    let ai_provider = ctx.core.advisor.as_ref().map(|a| a.provider());
    Json(TriageHealthResponse {
        success: true,
        service: "RefugeAlly Triage Service",
        status: "OK",
        ai_enabled: ai_provider.is_some(),
        ai_provider,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
