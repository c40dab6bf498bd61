use crate::api::error::AppError;
use crate::entities::documents;
use crate::services::document_service::DocumentFilter;
use crate::utils::auth::Claims;
use crate::utils::ordering::parse_ordering;
use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use sea_orm::Order;

use super::types::*;

#[utoipa::path(
    get,
    path = "/documents",
    params(
        ("file_type" = Option<String>, Query, description = "Filter by file type"),
        ("processed" = Option<bool>, Query, description = "Filter by processed flag"),
        ("search" = Option<String>, Query, description = "Case-insensitive title search"),
        ("ordering" = Option<String>, Query, description = "created_at, updated_at or title; prefix with - for descending"),
        ("limit" = Option<u64>, Query, description = "Page size"),
        ("offset" = Option<u64>, Query, description = "Rows to skip")
    ),
    responses(
        (status = 200, description = "Documents of the current user", body = Vec<DocumentResponse>),
        (status = 400, description = "Invalid filter"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "documents"
)]
pub async fn list_documents(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    query: Result<Query<ListDocumentsQuery>, QueryRejection>,
) -> Result<Json<Vec<DocumentResponse>>, AppError> {
    let Query(query) = query?;
    let (field, order) = parse_ordering(
        query.ordering.as_deref(),
        &["created_at", "updated_at", "title"],
        "-created_at",
    )
    .map_err(AppError::BadRequest)?;

    let order_by = match field {
        "updated_at" => documents::Column::UpdatedAt,
        "title" => documents::Column::Title,
        _ => documents::Column::CreatedAt,
    };

    let docs = state
        .document_service
        .list_documents(
            &claims.sub,
            DocumentFilter {
                file_type: query.file_type,
                processed: query.processed,
                search: query.search,
                order_by,
                order,
                limit: query.limit,
                offset: query.offset,
            },
        )
        .await?;

    Ok(Json(docs.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/documents/{id}",
    params(
        ("id" = String, Path, description = "Document ID")
    ),
    responses(
        (status = 200, description = "Document with its scans", body = DocumentDetailResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Document not found")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "documents"
)]
pub async fn get_document(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<DocumentDetailResponse>, AppError> {
    let document = state.document_service.find_owned(&claims.sub, &id).await?;
    let scans = state
        .document_service
        .list_scans(&claims.sub, Some(&id), None, Order::Desc)
        .await?;

    Ok(Json(DocumentDetailResponse {
        document: document.into(),
        scans: scans.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/documents/{id}/scans",
    params(
        ("id" = String, Path, description = "Document ID")
    ),
    responses(
        (status = 200, description = "Scans of the document", body = Vec<ScanResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Document not found")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "documents"
)]
pub async fn document_scans(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ScanResponse>>, AppError> {
    // 404 for documents outside the caller's scope, not an empty list
    state.document_service.find_owned(&claims.sub, &id).await?;

    let scans = state
        .document_service
        .list_scans(&claims.sub, Some(&id), None, Order::Desc)
        .await?;

    Ok(Json(scans.into_iter().map(Into::into).collect()))
}
