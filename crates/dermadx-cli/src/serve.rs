//! Stateless JSON HTTP API for the web front end.
//!
//! The client carries the session between calls: `/api/analyze` returns the
//! candidates and follow-up questions, and `/api/final-diagnosis` receives
//! them back together with the user's answers.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use dermadx_ai::ImageClassifier;
use dermadx_core::{Answers, Candidate, DiagnosisError, DiagnosticSession, Mode};
use dermadx_flow::{DiagnosticFlow, ask_health_question};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

/// Request body cap, sized for full-resolution phone photos.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    flow: DiagnosticFlow,
    classifier: Option<Arc<dyn ImageClassifier>>,
}

impl AppState {
    pub fn new(flow: DiagnosticFlow, classifier: Option<Arc<dyn ImageClassifier>>) -> Self {
        Self { flow, classifier }
    }
}

#[derive(Serialize)]
struct HealthRes {
    ok: bool,
    message: String,
}

#[derive(Serialize)]
struct AnalyzeRes {
    predictions: Vec<Candidate>,
    followup_questions: Vec<String>,
}

/// `predictions` is usually the candidate list from `/api/analyze`, but the
/// web client may send its own result object instead.
#[derive(Deserialize)]
struct FinalDiagnosisReq {
    #[serde(default)]
    predictions: Value,
    #[serde(default)]
    user_answers: Answers,
}

#[derive(Serialize)]
struct FinalDiagnosisRes {
    final_disease: String,
    treatment: String,
}

#[derive(Deserialize)]
struct HealthChatReq {
    #[serde(default)]
    question: String,
}

#[derive(Serialize)]
struct HealthChatRes {
    response: String,
}

/// JSON error body with the status it maps to.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<DiagnosisError> for ApiError {
    fn from(err: DiagnosisError) -> Self {
        let status = match &err {
            DiagnosisError::MissingInput => StatusCode::BAD_REQUEST,
            DiagnosisError::InvalidImage(_) => StatusCode::UNPROCESSABLE_ENTITY,
            DiagnosisError::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
            DiagnosisError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            DiagnosisError::Classifier(_) => StatusCode::INTERNAL_SERVER_ERROR,
            DiagnosisError::Session(_) => StatusCode::CONFLICT,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            warn!(status = %self.status, error = %self.message, "request failed");
        }
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

pub fn router(state: AppState, cors_origin: &str) -> anyhow::Result<Router> {
    let origin: HeaderValue = cors_origin
        .parse()
        .with_context(|| format!("invalid CORS origin {cors_origin:?}"))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Ok(Router::new()
        .route("/health", get(health))
        .route("/api/analyze", post(analyze))
        .route("/api/final-diagnosis", post(final_diagnosis))
        .route("/api/health_chat", post(health_chat))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .with_state(state))
}

pub async fn run(addr: &str, cors_origin: &str, state: AppState) -> anyhow::Result<()> {
    let app = router(state, cors_origin)?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, %cors_origin, "dermadx API listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "dermadx API is alive".into(),
    })
}

/// Multipart fields: `description` (text) and `image` (file). Either may be
/// omitted, but not both.
async fn analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeRes>, ApiError> {
    let mut description: Option<String> = None;
    let mut image: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "description" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(e.body_text()))?;
                description = Some(text);
            }
            "image" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(e.body_text()))?;
                if !bytes.is_empty() {
                    image = Some(bytes.to_vec());
                }
            }
            _ => {}
        }
    }

    let image_candidate = match image {
        Some(bytes) => Some(classify(state.classifier.clone(), bytes).await?),
        None => None,
    };

    let mut session = DiagnosticSession::new(Mode::ImageText);
    state
        .flow
        .analyze(&mut session, description.as_deref(), image_candidate)
        .await?;

    Ok(Json(AnalyzeRes {
        predictions: session.candidates().to_vec(),
        followup_questions: session.followup_questions().to_vec(),
    }))
}

/// Run inference off the async runtime.
async fn classify(
    classifier: Option<Arc<dyn ImageClassifier>>,
    bytes: Vec<u8>,
) -> Result<Candidate, DiagnosisError> {
    let classifier = classifier
        .ok_or_else(|| DiagnosisError::Classifier("no classifier checkpoint loaded".into()))?;
    let candidate = tokio::task::spawn_blocking(move || classifier.classify_bytes(&bytes))
        .await
        .map_err(|e| DiagnosisError::Classifier(e.to_string()))??;
    Ok(candidate)
}

async fn final_diagnosis(
    State(state): State<AppState>,
    Json(req): Json<FinalDiagnosisReq>,
) -> Result<Json<FinalDiagnosisRes>, ApiError> {
    let session = match serde_json::from_value::<Vec<Candidate>>(req.predictions.clone()) {
        Ok(candidates) => {
            let candidates = candidates
                .into_iter()
                .map(|c| Candidate::new(c.label, c.confidence))
                .collect();
            let mut session = state
                .flow
                .resume(Mode::ImageText, candidates, req.user_answers)?;
            state.flow.finalize(&mut session).await?;
            session
        }
        Err(_) => {
            let mut session = state
                .flow
                .resume(Mode::ImageText, Vec::new(), req.user_answers)?;
            state
                .flow
                .finalize_with_predictions(&mut session, &req.predictions)
                .await?;
            session
        }
    };

    Ok(Json(FinalDiagnosisRes {
        final_disease: session.final_disease().unwrap_or_default().to_string(),
        treatment: session.treatment().unwrap_or_default().to_string(),
    }))
}

async fn health_chat(
    State(state): State<AppState>,
    Json(req): Json<HealthChatReq>,
) -> Result<Json<HealthChatRes>, ApiError> {
    let response = ask_health_question(state.flow.generator(), &req.question).await?;
    Ok(Json(HealthChatRes { response }))
}
