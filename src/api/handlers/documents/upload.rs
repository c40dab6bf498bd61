use crate::api::error::AppError;
use crate::models::FileType;
use crate::utils::auth::Claims;
use axum::{
    Extension, Json,
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
};

use super::types::*;

fn multipart_error(e: MultipartError) -> AppError {
    let err_msg = e.to_string();
    if err_msg.contains("length limit exceeded") {
        AppError::PayloadTooLarge("Request body exceeds the maximum allowed limit".to_string())
    } else {
        AppError::BadRequest(err_msg)
    }
}

#[utoipa::path(
    post,
    path = "/documents",
    request_body(content = Multipart, description = "Fields: title, file, optional file_type"),
    responses(
        (status = 201, description = "Document uploaded", body = DocumentResponse),
        (status = 400, description = "Missing field or rejected file"),
        (status = 401, description = "Unauthorized"),
        (status = 413, description = "File too large")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "documents"
)]
pub async fn upload_document(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<DocumentResponse>), AppError> {
    let mut title: Option<String> = None;
    let mut file_type: Option<FileType> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => title = Some(field.text().await.map_err(multipart_error)?),
            "file_type" => {
                let raw = field.text().await.map_err(multipart_error)?;
                let parsed = serde_json::from_value(serde_json::Value::String(raw.clone()))
                    .map_err(|_| AppError::BadRequest(format!("Invalid file_type '{}'", raw)))?;
                file_type = Some(parsed);
            }
            "file" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let data = field.bytes().await.map_err(multipart_error)?;
                file = Some((filename, data.to_vec()));
            }
            _ => {
                tracing::debug!("Ignoring unknown multipart field '{}'", name);
            }
        }
    }

    let (filename, data) = file.ok_or(AppError::BadRequest("No file provided".to_string()))?;
    let title = title.ok_or(AppError::BadRequest("Title is required".to_string()))?;

    let document = state
        .document_service
        .create_document(&claims.sub, &title, &filename, data, file_type)
        .await?;

    Ok((StatusCode::CREATED, Json(document.into())))
}
