use crate::api::error::AppError;
use crate::api::handlers::documents::DocumentResponse;
use crate::services::share_service::ShareService;
use crate::utils::auth::Claims;
use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Deserialize, ToSchema, Validate, Debug, Default)]
pub struct CreateShareRequest {
    /// Hours until the link expires (1-720)
    #[validate(range(min = 1, max = 720, message = "expiration_hours must be between 1 and 720"))]
    pub expiration_hours: Option<i64>,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct ShareLinkResponse {
    pub id: String,
    pub document_id: String,
    pub share_token: String,
    /// Public path resolving the token
    pub share_url: String,
    pub expires_at: chrono::DateTime<Utc>,
    pub created_at: Option<chrono::DateTime<Utc>>,
}

#[utoipa::path(
    post,
    path = "/documents/{id}/share",
    params(
        ("id" = String, Path, description = "Document ID")
    ),
    request_body = CreateShareRequest,
    responses(
        (status = 201, description = "Share link created", body = ShareLinkResponse),
        (status = 400, description = "Invalid expiration"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Document not found")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "shares"
)]
pub async fn create_share(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    payload: Result<Json<CreateShareRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ShareLinkResponse>), AppError> {
    // An empty POST means "use the defaults"
    let req = match payload {
        Ok(Json(req)) => req,
        Err(JsonRejection::MissingJsonContentType(_)) => CreateShareRequest::default(),
        Err(e) => return Err(e.into()),
    };
    req.validate()?;

    let hours = req
        .expiration_hours
        .unwrap_or(state.config.share_default_hours);
    let share = ShareService::create_share(&state.db, &id, &claims.sub, hours).await?;

    Ok((
        StatusCode::CREATED,
        Json(ShareLinkResponse {
            share_url: format!("/shared/{}", share.share_token),
            id: share.id,
            document_id: share.document_id,
            share_token: share.share_token,
            expires_at: share.expires_at,
            created_at: share.created_at,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/shared/{token}",
    params(
        ("token" = String, Path, description = "Share token")
    ),
    responses(
        (status = 200, description = "Shared document", body = DocumentResponse),
        (status = 404, description = "Share link not found"),
        (status = 410, description = "Share link has expired")
    ),
    tag = "shares"
)]
pub async fn get_shared_document(
    State(state): State<crate::AppState>,
    Path(token): Path<String>,
) -> Result<Json<DocumentResponse>, AppError> {
    let (_, document) = ShareService::get_shared_document(&state.db, &token).await?;
    Ok(Json(document.into()))
}
