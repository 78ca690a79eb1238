//! Text-generation service layer: the oracle trait, its configuration, and the Gemini HTTP client.

mod config;
mod error;
mod generator;

pub use config::{
    DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_RETRY_BACKOFF_MS, DEFAULT_TIMEOUT_SECS, LlmConfig,
};
pub use error::LlmError;
pub use generator::{ScriptedGenerator, TextGenerator};

#[cfg(feature = "http")]
pub mod gemini;

#[cfg(feature = "http")]
pub use gemini::GeminiClient;
