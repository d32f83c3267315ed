//! Shared application state for the HTTP layer.
//!
//! `CoreState` is wrapped in `Arc` at startup. It holds no mutable
//! state: the classifier is stateless and database connections are
//! opened per request.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::config::AppConfig;
use crate::db;
use crate::llm::{AdviceService, GeminiClient, LlmError};
use crate::triage::SeverityClassifier;

pub struct CoreState {
    /// SQLite file holding the triage log.
    pub db_path: PathBuf,
    pub classifier: SeverityClassifier,
    /// `None` when no LLM provider is configured.
    pub advisor: Option<AdviceService>,
    started_at: Instant,
}

impl CoreState {
    /// Create state and make sure the database schema is current.
    pub fn new(db_path: PathBuf, advisor: Option<AdviceService>) -> Result<Self, CoreError> {
        db::open_database(&db_path)?;
        Ok(Self {
            db_path,
            classifier: SeverityClassifier::new(),
            advisor,
            started_at: Instant::now(),
        })
    }

    /// Build state from configuration, wiring the Gemini advisor when a key is set.
    ///
    /// Must be called outside an async context (the blocking HTTP client
    /// owns its own runtime).
    pub fn from_config(config: &AppConfig) -> Result<Self, CoreError> {
        let advisor = match &config.gemini_api_key {
            Some(key) => {
                let client = GeminiClient::new(
                    &config.gemini_base_url,
                    key,
                    &config.gemini_model,
                    config.llm_timeout_secs,
                )?;
                let service = AdviceService::new(Arc::new(client));
                tracing::info!(provider = %service.provider(), "AI advice enabled");
                Some(service)
            }
            None => {
                tracing::warn!("GEMINI_API_KEY not set, triage will use rules only");
                None
            }
        };
        Self::new(config.database_path.clone(), advisor)
    }

    /// Open a database connection for one request.
    pub fn open_db(&self) -> Result<rusqlite::Connection, CoreError> {
        db::open_database(&self.db_path).map_err(CoreError::Database)
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
    #[error("LLM client error: {0}")]
    Llm(#[from] LlmError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockAdviceClient;

    #[test]
    fn new_initializes_database_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("state.db");
        let core = CoreState::new(path.clone(), None).unwrap();
        assert!(path.exists());
        let conn = core.open_db().unwrap();
        assert_eq!(db::count_symptom_logs(&conn).unwrap(), 0);
    }

    #[test]
    fn advisor_is_optional() {
        let tmp = tempfile::tempdir().unwrap();
        let advisor = AdviceService::new(Arc::new(MockAdviceClient::new("{}")));
        let core = CoreState::new(tmp.path().join("a.db"), Some(advisor)).unwrap();
        assert!(core.advisor.is_some());
    }

    #[test]
    fn from_config_without_key_is_rules_only() {
        let tmp = tempfile::tempdir().unwrap();
        let db_path = tmp.path().join("cfg.db");
        let config = AppConfig::from_lookup(|key| match key {
            "REFUGEALLY_DB_PATH" => Some(db_path.to_string_lossy().into_owned()),
            _ => None,
        })
        .unwrap();
        let core = CoreState::from_config(&config).unwrap();
        assert!(core.advisor.is_none());
    }
}
