use crate::api::error::AppError;
use crate::api::handlers::documents::SensitiveItemResponse;
use crate::models::SensitiveType;
use crate::services::detection::{MlReport, NewItem};
use crate::utils::auth::Claims;
use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

/// Marks a payload produced by the external ML detector
pub const ML_SOURCE: &str = "ml_model";

#[derive(Deserialize, ToSchema, Debug)]
pub struct AnalyzeRequest {
    pub document_id: String,
}

fn default_item_type() -> SensitiveType {
    SensitiveType::Other
}

fn default_item_count() -> i32 {
    1
}

#[derive(Deserialize, ToSchema, Validate, Debug)]
pub struct MlSensitiveItem {
    #[serde(rename = "type", default = "default_item_type")]
    pub info_type: SensitiveType,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 1.0, message = "Confidence must be between 0 and 1"))]
    pub confidence: f64,
    #[serde(default)]
    pub location: Option<Value>,
    #[serde(default = "default_item_count")]
    #[validate(range(min = 1, message = "Count must be at least 1"))]
    pub count: i32,
}

#[derive(Deserialize, ToSchema, Validate, Debug)]
pub struct MlAnalysisPayload {
    pub document_id: String,
    pub detection_types: Vec<String>,
    #[validate(range(min = 0, message = "sensitive_items_count must be non-negative"))]
    pub sensitive_items_count: i64,
    #[validate(range(min = 0.0, message = "processing_time must be non-negative"))]
    pub processing_time: f64,
    pub source: String,
    #[serde(default)]
    #[validate(nested)]
    pub sensitive_items: Vec<MlSensitiveItem>,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct AnalysisResponse {
    pub scan_id: String,
    pub document_id: String,
    pub risk_level: String,
    pub processing_time: f64,
    pub scan_date: chrono::DateTime<Utc>,
    pub sensitive_items_count: usize,
    pub sensitive_items: Vec<SensitiveItemResponse>,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct MlAnalysisResponse {
    pub document_id: String,
    pub scan_id: String,
    pub scan_date: chrono::DateTime<Utc>,
    pub sensitive_items_count: i64,
    pub source: String,
    pub status: String,
}

#[utoipa::path(
    post,
    path = "/analysis",
    request_body(content = AnalyzeRequest, description = "`{document_id}` runs the built-in detectors; a payload with `source: ml_model` records external results"),
    responses(
        (status = 201, description = "Analysis recorded. ML payloads are answered with MlAnalysisResponse", body = AnalysisResponse),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Document not found")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "detection"
)]
pub async fn analyze(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(body) = payload?;

    match body.get("source") {
        None | Some(Value::Null) => {
            let req: AnalyzeRequest = serde_json::from_value(body)
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            run_backend_analysis(state, &claims.sub, req).await
        }
        Some(Value::String(source)) if source == ML_SOURCE => {
            let req: MlAnalysisPayload = serde_json::from_value(body)
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            record_ml_payload(state, &claims.sub, req).await
        }
        Some(_) => Err(AppError::BadRequest(format!(
            "Source must be '{}' for ML payloads",
            ML_SOURCE
        ))),
    }
}

async fn run_backend_analysis(
    state: crate::AppState,
    user_id: &str,
    req: AnalyzeRequest,
) -> Result<Response, AppError> {
    let (scan, items) = state
        .detection_service
        .analyze_document(user_id, &req.document_id)
        .await?;

    let response = AnalysisResponse {
        scan_id: scan.id,
        document_id: scan.document_id,
        risk_level: scan.risk_level,
        processing_time: scan.processing_time,
        scan_date: scan.scan_date,
        sensitive_items_count: items.len(),
        sensitive_items: items.into_iter().map(Into::into).collect(),
    };

    Ok((StatusCode::CREATED, Json(response)).into_response())
}

async fn record_ml_payload(
    state: crate::AppState,
    user_id: &str,
    req: MlAnalysisPayload,
) -> Result<Response, AppError> {
    req.validate()?;

    let report = MlReport {
        document_id: req.document_id,
        sensitive_items_count: req.sensitive_items_count,
        processing_time: req.processing_time,
        items: req
            .sensitive_items
            .into_iter()
            .map(|item| NewItem {
                info_type: item.info_type,
                confidence: item.confidence,
                location: item.location,
                count: item.count,
                redacted: false,
            })
            .collect(),
    };

    let count = report.sensitive_items_count;
    let scan = state
        .detection_service
        .record_ml_analysis(user_id, report)
        .await?;

    let response = MlAnalysisResponse {
        document_id: scan.document_id,
        scan_id: scan.id,
        scan_date: scan.scan_date,
        sensitive_items_count: count,
        source: ML_SOURCE.to_string(),
        status: "recorded".to_string(),
    };

    Ok((StatusCode::CREATED, Json(response)).into_response())
}
