use crate::api::error::AppError;
use crate::utils::auth::Claims;
use axum::{
    Extension,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};

#[utoipa::path(
    get,
    path = "/documents/{id}/file",
    params(
        ("id" = String, Path, description = "Document ID")
    ),
    responses(
        (status = 200, description = "Raw document content"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Document not found")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "documents"
)]
pub async fn download_document(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let (document, data) = state.document_service.read_file(&claims.sub, &id).await?;

    let content_type = infer::get(&data)
        .map(|k| k.mime_type().to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let filename = document
        .file
        .rsplit('/')
        .next()
        .unwrap_or("document")
        .replace('"', "");

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        data,
    ))
}
