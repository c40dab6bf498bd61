use crate::api::error::AppError;
use crate::api::handlers::documents::ScanResponse;
use crate::models::RiskLevel;
use crate::utils::auth::Claims;
use crate::utils::ordering::parse_ordering;
use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use serde::Deserialize;

#[derive(Deserialize, Debug, Default)]
pub struct ListScansQuery {
    pub risk_level: Option<RiskLevel>,
    /// `scan_date` or `-scan_date`
    pub ordering: Option<String>,
}

#[utoipa::path(
    get,
    path = "/scans",
    params(
        ("risk_level" = Option<String>, Query, description = "low, medium or high"),
        ("ordering" = Option<String>, Query, description = "scan_date or -scan_date")
    ),
    responses(
        (status = 200, description = "Scans of the current user's documents", body = Vec<ScanResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "scans"
)]
pub async fn list_scans(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    query: Result<Query<ListScansQuery>, QueryRejection>,
) -> Result<Json<Vec<ScanResponse>>, AppError> {
    let Query(query) = query?;
    let (_, order) = parse_ordering(query.ordering.as_deref(), &["scan_date"], "-scan_date")
        .map_err(AppError::BadRequest)?;

    let scans = state
        .document_service
        .list_scans(&claims.sub, None, query.risk_level, order)
        .await?;

    Ok(Json(scans.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/scans/{id}",
    params(
        ("id" = String, Path, description = "Scan ID")
    ),
    responses(
        (status = 200, description = "Scan with its findings", body = ScanResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Scan not found")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "scans"
)]
pub async fn get_scan(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<ScanResponse>, AppError> {
    let scan = state.document_service.find_scan(&claims.sub, &id).await?;
    Ok(Json(scan.into()))
}
