use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

use super::types::AdviceClient;
use super::LlmError;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Gemini REST client for hosted LLM inference.
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl GeminiClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        model: &str,
        timeout_secs: u64,
    ) -> Result<Self, LlmError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| LlmError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

/// Request body for `models/{model}:generateContent`
#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

/// Response body from `generateContent`
#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

fn request_body(prompt: &str) -> GenerateRequest<'_> {
    GenerateRequest {
        contents: vec![Content {
            parts: vec![RequestPart { text: prompt }],
        }],
    }
}

/// Concatenate the text parts of the first candidate.
fn first_candidate_text(response: GenerateResponse) -> Result<String, LlmError> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(text)
}

impl AdviceClient for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body(prompt))
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    LlmError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    LlmError::Timeout(self.timeout_secs)
                } else {
                    LlmError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(LlmError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| LlmError::ResponseParsing(e.to_string()))?;

        first_candidate_text(parsed)
    }

    fn describe(&self) -> String {
        format!("gemini/{}", self.model)
    }
}

/// Mock advice client for testing that returns a configurable reply.
pub struct MockAdviceClient {
    reply: Result<String, String>,
    calls: AtomicUsize,
}

impl MockAdviceClient {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    /// A client whose every call fails as if the provider were down.
    pub fn unavailable() -> Self {
        Self {
            reply: Err("http://mock.invalid".to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AdviceClient for MockAdviceClient {
    fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone().map_err(LlmError::Connection)
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use axum::routing::post;
    use axum::{Json, Router};

    use super::*;

    #[test]
    fn request_body_wraps_prompt_in_parts() {
        let json = serde_json::to_value(request_body("hello")).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
    }

    #[test]
    fn candidate_text_joins_parts() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"{\"a\":"},{"text":"1}"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(first_candidate_text(response).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn no_candidates_is_empty_response() {
        let response: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(
            first_candidate_text(response),
            Err(LlmError::EmptyResponse)
        ));
    }

    #[test]
    fn endpoint_uses_model_path() {
        let client = GeminiClient::new("http://localhost:9/", "key", "gemini-test", 5).unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost:9/v1beta/models/gemini-test:generateContent"
        );
        assert_eq!(client.describe(), "gemini/gemini-test");
    }

    #[test]
    fn mock_counts_calls_and_can_fail() {
        let mock = MockAdviceClient::unavailable();
        assert!(mock.generate("x").is_err());
        assert_eq!(mock.calls(), 1);
    }

    async fn spawn_fake_gemini(reply: serde_json::Value) -> SocketAddr {
        let app = Router::new().route(
            "/v1beta/models/:model",
            post(move || {
                let reply = reply.clone();
                async move { Json(reply) }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn generate_reads_reply_from_server() {
        let addr = spawn_fake_gemini(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "{\"severity\":\"low\"}"}]}}]
        }))
        .await;

        let text = tokio::task::spawn_blocking(move || {
            let client =
                GeminiClient::new(&format!("http://{addr}"), "test-key", "gemini-test", 5).unwrap();
            client.generate("prompt")
        })
        .await
        .unwrap()
        .unwrap();

        assert_eq!(text, "{\"severity\":\"low\"}");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn generate_reports_connection_failure() {
        let result = tokio::task::spawn_blocking(|| {
            // Port 9 (discard) is not listening in test environments.
            let client = GeminiClient::new("http://127.0.0.1:9", "k", "m", 2).unwrap();
            client.generate("prompt")
        })
        .await
        .unwrap();

        assert!(result.is_err());
    }
}
