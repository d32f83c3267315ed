//! API server lifecycle: bind, spawn the axum server, return a handle.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::api::router::triage_api_router;
use crate::core_state::CoreState;

/// Handle to a running API server.
pub struct ApiServer {
    pub addr: SocketAddr,
    pub started_at: String,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl ApiServer {
    /// Signal graceful shutdown. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("API server shutdown signal sent");
        }
    }

    /// Signal shutdown and wait until in-flight requests finish.
    pub async fn stop(mut self) {
        self.shutdown();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!("API server task failed: {e}");
            }
        }
    }
}

/// Start the API server on `addr` (port 0 picks an ephemeral port).
pub async fn start_api_server_on(
    core: Arc<CoreState>,
    addr: SocketAddr,
    cors_origins: &[String],
) -> Result<ApiServer, std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let addr = listener.local_addr()?;

    let app = triage_api_router(core, cors_origins);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("API server received shutdown signal");
        };

        tracing::info!(%addr, "API server started");

        // Peer addresses feed the rate limiter and the symptom log
        if let Err(e) = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal)
        .await
        {
            tracing::error!("API server error: {e}");
        }

        tracing::info!("API server stopped");
    });

    Ok(ApiServer {
        addr,
        started_at: chrono::Utc::now().to_rfc3339(),
        shutdown_tx: Some(shutdown_tx),
        task: Some(task),
    })
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use super::*;
    use crate::db;

    fn test_core() -> (Arc<CoreState>, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let core = CoreState::new(tmp.path().join("server.db"), None).unwrap();
        (Arc::new(core), tmp)
    }

    fn localhost() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0)
    }

    #[tokio::test]
    async fn start_and_stop_server() {
        let (core, _tmp) = test_core();
        let server = start_api_server_on(core, localhost(), &[])
            .await
            .expect("server should start");

        assert!(server.addr.port() > 0);
        assert!(!server.started_at.is_empty());

        let url = format!("http://{}/health", server.addr);
        let status = reqwest::get(&url).await.unwrap().status();
        assert_eq!(status, reqwest::StatusCode::OK);

        server.stop().await;
    }

    #[tokio::test]
    async fn serves_triage_and_records_peer_address() {
        let (core, _tmp) = test_core();
        let server = start_api_server_on(core.clone(), localhost(), &[])
            .await
            .expect("server should start");

        let client = reqwest::Client::new();
        let resp = client
            .post(format!("http://{}/api/triage", server.addr))
            .header("Content-Type", "application/json")
            .body(r#"{"symptoms": ["fever", "cough"], "duration": "more-than-week"}"#)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["data"]["severity"], "medium");
        drop(client);

        let status = reqwest::get(format!("http://{}/nonexistent", server.addr))
            .await
            .unwrap()
            .status();
        assert_eq!(status, reqwest::StatusCode::NOT_FOUND);

        server.stop().await;

        let conn = core.open_db().unwrap();
        let logs = db::recent_symptom_logs(&conn, 1).unwrap();
        assert_eq!(logs[0].ip_address.as_deref(), Some("127.0.0.1"));
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let (core, _tmp) = test_core();
        let mut server = start_api_server_on(core, localhost(), &[])
            .await
            .expect("server should start");

        server.shutdown();
        server.shutdown();
        server.stop().await;
    }
}
