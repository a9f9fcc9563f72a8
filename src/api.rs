use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::assessment::TrustAssessment;
use crate::engine::TrustEngine;
use crate::error::ValidationError;
use crate::metrics;
use crate::registry::{NormalizationRule, SignalRegistry};
use crate::signal::Modality;

#[derive(Clone)]
pub struct AppState {
    engine: Arc<TrustEngine>,
}

impl AppState {
    pub fn new(engine: TrustEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(|| async { "OK" }))
        .route("/assess/{modality}", post(assess))
        .route("/registry", get(registry))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Authenex trust engine is running",
        "supported_endpoints": [
            "/assess/image (image forensic signals)",
            "/assess/text (AI text signals)",
            "/assess/email (phishing email signals)",
            "/registry (known signals)"
        ]
    }))
}

#[derive(Serialize)]
struct AssessResp {
    content_type: Modality,
    #[serde(flatten)]
    assessment: TrustAssessment,
    analyzed_at: String,
}

async fn assess(
    State(state): State<AppState>,
    Path(modality): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<AssessResp>, ApiError> {
    let modality: Modality = modality.parse()?;
    let Json(body) = body?;
    let assessment = state.engine.assess_json(modality, &body)?;
    metrics::record_assessment(modality, &assessment);

    Ok(Json(AssessResp {
        content_type: modality,
        assessment,
        analyzed_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

#[derive(Serialize)]
struct RegistryEntryOut<'a> {
    name: &'a str,
    #[serde(flatten)]
    rule: &'a NormalizationRule,
}

async fn registry(State(state): State<AppState>) -> Json<Value> {
    let reg: &SignalRegistry = state.engine.registry();
    let rows: Vec<RegistryEntryOut<'_>> = reg
        .entries()
        .into_iter()
        .map(|(name, rule)| RegistryEntryOut { name, rule })
        .collect();
    Json(json!({ "count": rows.len(), "signals": rows }))
}

/// Rejected request: an unreadable body or a malformed bundle.
#[derive(Debug)]
pub enum ApiError {
    Body(JsonRejection),
    Invalid(ValidationError),
}

impl From<JsonRejection> for ApiError {
    fn from(r: JsonRejection) -> Self {
        Self::Body(r)
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Invalid(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::Body(r) => (r.status(), r.body_text()),
            ApiError::Invalid(e) => (StatusCode::BAD_REQUEST, e.to_string()),
        };
        metrics::record_validation_error();
        warn!(target: "trust", status = status.as_u16(), %error, "rejected signal bundle");
        (status, Json(json!({ "error": error }))).into_response()
    }
}
