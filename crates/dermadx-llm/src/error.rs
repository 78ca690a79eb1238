use dermadx_core::DiagnosisError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("request timed out after {0}s")]
    Timeout(u64),
    #[error("service returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("response contained no text")]
    EmptyResponse,
    #[error("no API key configured")]
    MissingApiKey,
    #[error("transport error: {0}")]
    Transport(String),
}

impl LlmError {
    /// Whether a single retry is worth attempting.
    pub fn is_transient(&self) -> bool {
        match self {
            #[cfg(feature = "http")]
            Self::Http(e) => e.is_connect() || e.is_timeout(),
            Self::Timeout(_) | Self::Transport(_) => true,
            Self::Server { status, .. } => *status == 429 || *status >= 500,
            Self::Json(_) | Self::EmptyResponse | Self::MissingApiKey => false,
        }
    }
}

impl From<LlmError> for DiagnosisError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Json(_) | LlmError::EmptyResponse => {
                DiagnosisError::MalformedResponse(e.to_string())
            }
            other => DiagnosisError::ServiceUnavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_transient_client_errors_not() {
        let s = |status| LlmError::Server {
            status,
            body: String::new(),
        };
        assert!(s(503).is_transient());
        assert!(s(500).is_transient());
        assert!(s(429).is_transient());
        assert!(!s(400).is_transient());
        assert!(!s(403).is_transient());
    }

    #[test]
    fn decode_failures_not_transient() {
        assert!(!LlmError::EmptyResponse.is_transient());
        assert!(!LlmError::MissingApiKey.is_transient());
        assert!(LlmError::Timeout(30).is_transient());
    }

    #[test]
    fn maps_into_diagnosis_error() {
        assert!(matches!(
            DiagnosisError::from(LlmError::EmptyResponse),
            DiagnosisError::MalformedResponse(_)
        ));
        assert!(matches!(
            DiagnosisError::from(LlmError::Timeout(5)),
            DiagnosisError::ServiceUnavailable(_)
        ));
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(
            DiagnosisError::from(LlmError::Json(json_err)),
            DiagnosisError::MalformedResponse(_)
        ));
    }
}
