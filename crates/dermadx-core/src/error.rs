use thiserror::Error;

use crate::session::Stage;

#[derive(Debug, Error)]
pub enum DiagnosisError {
    #[error("text-generation service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("malformed response from text-generation service: {0}")]
    MalformedResponse(String),

    #[error("no symptom description or image supplied")]
    MissingInput,

    #[error("unreadable image: {0}")]
    InvalidImage(String),

    #[error("classifier error: {0}")]
    Classifier(String),

    #[error(transparent)]
    Session(#[from] SessionError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session is at stage {actual:?}, expected {expected:?}")]
    OutOfOrder { expected: Stage, actual: Stage },

    #[error("{0} follow-up question(s) have no recorded answer")]
    UnansweredQuestions(usize),
}
