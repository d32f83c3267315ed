//! AI advice: prompt construction, provider client, and lenient parsing
//! of the provider's reply into `LlmAdvice`.

pub mod gemini;
pub mod parser;
pub mod prompt;
pub mod service;
pub mod types;

pub use gemini::*;
pub use parser::*;
pub use prompt::*;
pub use service::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("LLM provider unreachable at {0}")]
    Connection(String),

    #[error("LLM request timed out after {0}s")]
    Timeout(u64),

    #[error("LLM provider returned error (status {status}): {body}")]
    Provider { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("LLM response contained no text")]
    EmptyResponse,
}
