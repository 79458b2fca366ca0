use axum::extract::rejection::FormRejection;
use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use tracing::{error, warn};

use super::AppState;
use crate::dataset::insights::EmissionInsights;
use crate::error::PredictError;
use crate::predictor::PredictionReport;
use crate::request::{ValidOptions, VehicleRequest};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /options
pub async fn options(State(state): State<AppState>) -> Json<ValidOptions> {
    Json(state.predictor.options())
}

/// GET /schema: the ordered feature columns every model expects.
pub async fn schema(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.predictor.schema().columns().to_vec())
}

/// GET /emission_insights
pub async fn emission_insights(State(state): State<AppState>) -> Json<EmissionInsights> {
    Json(state.predictor.insights().clone())
}

/// POST /predict_json with form fields `vehicle_year`, `make`,
/// `transmission` and `fuel_type`.
pub async fn predict_json(
    State(state): State<AppState>,
    form: Result<Form<VehicleRequest>, FormRejection>,
) -> Result<Json<PredictionReport>, ApiError> {
    let Form(request) = form.map_err(|e| ApiError::BadForm(e.body_text()))?;
    let report = state.predictor.predict(&request)?;
    Ok(Json(report))
}

#[derive(Debug)]
pub enum ApiError {
    BadForm(String),
    Predict(PredictError),
}

impl From<PredictError> for ApiError {
    fn from(e: PredictError) -> Self {
        ApiError::Predict(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadForm(message) => {
                warn!(%message, "Rejected malformed form");
                (StatusCode::BAD_REQUEST, message)
            }
            ApiError::Predict(e) if e.is_client_error() => {
                warn!(error = %e, "Rejected prediction request");
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            ApiError::Predict(e) => {
                error!(error = %e, "Prediction failed");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
