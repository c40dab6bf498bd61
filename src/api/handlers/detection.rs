use crate::api::error::AppError;
use crate::entities::{detection_jobs, detection_models};
use crate::models::{JobStatus, ModelType};
use crate::utils::auth::Claims;
use crate::utils::ordering::parse_ordering;
use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, ToSchema, Debug)]
pub struct DetectionModelResponse {
    pub id: String,
    pub name: String,
    pub model_type: String,
    pub model_type_display: String,
    pub target_type: String,
    pub version: String,
    pub active: bool,
    pub created_at: chrono::DateTime<Utc>,
    pub updated_at: chrono::DateTime<Utc>,
}

impl From<detection_models::Model> for DetectionModelResponse {
    fn from(model: detection_models::Model) -> Self {
        let model_type_display = ModelType::parse(&model.model_type)
            .map(|t| t.display_name().to_string())
            .unwrap_or_else(|| model.model_type.clone());
        Self {
            id: model.id,
            name: model.name,
            model_type: model.model_type,
            model_type_display,
            target_type: model.target_type,
            version: model.version,
            active: model.active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Serialize, ToSchema, Debug)]
pub struct DetectionJobResponse {
    pub id: String,
    /// Document id
    pub document: String,
    pub status: String,
    pub status_display: String,
    pub models_used: Vec<DetectionModelResponse>,
    pub started_at: Option<chrono::DateTime<Utc>>,
    pub completed_at: Option<chrono::DateTime<Utc>>,
    pub error_message: Option<String>,
}

impl From<(detection_jobs::Model, Vec<detection_models::Model>)> for DetectionJobResponse {
    fn from((job, models): (detection_jobs::Model, Vec<detection_models::Model>)) -> Self {
        let status_display = JobStatus::parse(&job.status)
            .map(|s| s.display_name().to_string())
            .unwrap_or_else(|| job.status.clone());
        Self {
            id: job.id,
            document: job.document_id,
            status: job.status,
            status_display,
            models_used: models.into_iter().map(Into::into).collect(),
            started_at: job.started_at,
            completed_at: job.completed_at,
            error_message: job.error_message,
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct ListModelsQuery {
    pub model_type: Option<ModelType>,
    pub ordering: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct ListJobsQuery {
    pub status: Option<JobStatus>,
    pub document: Option<String>,
    pub ordering: Option<String>,
}

#[utoipa::path(
    get,
    path = "/detection/models",
    params(
        ("model_type" = Option<String>, Query, description = "pattern, ml or hybrid"),
        ("ordering" = Option<String>, Query, description = "name or created_at; prefix with - for descending")
    ),
    responses(
        (status = 200, description = "Active detection models", body = Vec<DetectionModelResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "detection"
)]
pub async fn list_models(
    State(state): State<crate::AppState>,
    Extension(_claims): Extension<Claims>,
    query: Result<Query<ListModelsQuery>, QueryRejection>,
) -> Result<Json<Vec<DetectionModelResponse>>, AppError> {
    let Query(query) = query?;
    let (field, order) = parse_ordering(query.ordering.as_deref(), &["name", "created_at"], "name")
        .map_err(AppError::BadRequest)?;
    let order_by = match field {
        "created_at" => detection_models::Column::CreatedAt,
        _ => detection_models::Column::Name,
    };

    let models = state
        .detection_service
        .list_models(query.model_type, order_by, order)
        .await?;

    Ok(Json(models.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/detection/models/{id}",
    params(
        ("id" = String, Path, description = "Model ID")
    ),
    responses(
        (status = 200, description = "Detection model", body = DetectionModelResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Model not found or inactive")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "detection"
)]
pub async fn get_model(
    State(state): State<crate::AppState>,
    Extension(_claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<DetectionModelResponse>, AppError> {
    let model = state.detection_service.find_model(&id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    get,
    path = "/detection/jobs",
    params(
        ("status" = Option<String>, Query, description = "pending, running, completed or failed"),
        ("document" = Option<String>, Query, description = "Document ID"),
        ("ordering" = Option<String>, Query, description = "started_at or completed_at; prefix with - for descending")
    ),
    responses(
        (status = 200, description = "Detection jobs of the current user's documents", body = Vec<DetectionJobResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "detection"
)]
pub async fn list_jobs(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    query: Result<Query<ListJobsQuery>, QueryRejection>,
) -> Result<Json<Vec<DetectionJobResponse>>, AppError> {
    let Query(query) = query?;
    let (field, order) = parse_ordering(
        query.ordering.as_deref(),
        &["started_at", "completed_at"],
        "-started_at",
    )
    .map_err(AppError::BadRequest)?;
    let order_by = match field {
        "completed_at" => detection_jobs::Column::CompletedAt,
        _ => detection_jobs::Column::StartedAt,
    };

    let jobs = state
        .detection_service
        .list_jobs(
            &claims.sub,
            query.status,
            query.document.as_deref(),
            order_by,
            order,
        )
        .await?;

    Ok(Json(jobs.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/detection/jobs/{id}",
    params(
        ("id" = String, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Detection job", body = DetectionJobResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Job not found")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "detection"
)]
pub async fn get_job(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<DetectionJobResponse>, AppError> {
    let job = state.detection_service.find_job(&claims.sub, &id).await?;
    Ok(Json(job.into()))
}
