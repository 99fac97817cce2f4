//! API endpoints.

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};

use crate::models::{CarrierInfo, ShipmentRecord, TrackingRequest, string_or_number};
use crate::server::error::ApiError;
use crate::server::state::AppState;

/// Successful response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Default, Deserialize)]
pub struct ValidateRequest {
    #[serde(
        default,
        rename = "trackingNumber",
        deserialize_with = "string_or_number"
    )]
    pub tracking_number: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResult {
    pub is_valid: bool,
    pub courier: Option<String>,
}

/// API route group.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/track", post(track))
        .route("/api/couriers", get(couriers))
        .route("/api/validate", post(validate))
}

/// Unwrap a JSON body. A body sent without a JSON content type counts as
/// an empty request, anything else unparseable is a bad request.
fn body<T: Default>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        Err(rejection) => {
            log::debug!("Rejected request body: {}", rejection);
            Err(ApiError::BadRequest("请求格式错误".to_string()))
        }
    }
}

/// `GET /api/health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "快递查询服务运行正常",
    })
}

/// `POST /api/track`
pub async fn track(
    State(state): State<AppState>,
    payload: Result<Json<TrackingRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ShipmentRecord>>, ApiError> {
    let request = body(payload)?;
    let record = state.service.track(&request).await?;
    Ok(ApiResponse::ok(record))
}

/// `GET /api/couriers`
pub async fn couriers(State(state): State<AppState>) -> Json<ApiResponse<Vec<CarrierInfo>>> {
    ApiResponse::ok(state.service.couriers())
}

/// `POST /api/validate`
pub async fn validate(
    State(state): State<AppState>,
    payload: Result<Json<ValidateRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ValidateResult>>, ApiError> {
    let request = body(payload)?;
    let found = state
        .service
        .validate(request.tracking_number.as_deref().unwrap_or(""))?;

    Ok(ApiResponse::ok(ValidateResult {
        is_valid: found.is_some(),
        courier: found.map(|m| m.name),
    }))
}
