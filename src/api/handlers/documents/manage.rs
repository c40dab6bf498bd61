use crate::api::error::AppError;
use crate::utils::auth::Claims;
use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

use super::types::*;

#[utoipa::path(
    patch,
    path = "/documents/{id}",
    params(
        ("id" = String, Path, description = "Document ID")
    ),
    request_body = PatchDocumentRequest,
    responses(
        (status = 200, description = "Document updated", body = DocumentResponse),
        (status = 400, description = "Invalid field value"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Document not found")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "documents"
)]
pub async fn patch_document(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    payload: Result<Json<PatchDocumentRequest>, JsonRejection>,
) -> Result<Json<DocumentResponse>, AppError> {
    let Json(req) = payload?;
    let changes = req.into_changes()?;

    let updated = state
        .document_service
        .update_document(&claims.sub, &id, changes)
        .await?;

    Ok(Json(updated.into()))
}

#[utoipa::path(
    put,
    path = "/documents/{id}",
    params(
        ("id" = String, Path, description = "Document ID")
    ),
    request_body = PutDocumentRequest,
    responses(
        (status = 200, description = "Document replaced", body = DocumentResponse),
        (status = 400, description = "Missing or invalid field"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Document not found")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "documents"
)]
pub async fn put_document(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    payload: Result<Json<PutDocumentRequest>, JsonRejection>,
) -> Result<Json<DocumentResponse>, AppError> {
    let Json(req) = payload?;
    let changes = req.into_changes()?;

    let updated = state
        .document_service
        .update_document(&claims.sub, &id, changes)
        .await?;

    Ok(Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/documents/{id}",
    params(
        ("id" = String, Path, description = "Document ID")
    ),
    responses(
        (status = 204, description = "Document deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Document not found")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "documents"
)]
pub async fn delete_document(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state
        .document_service
        .delete_document(&claims.sub, &id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
