use crate::api::error::AppError;
use crate::entities::{prelude::*, users};
use crate::services::stats::{UserStats, UserStatsService};
use crate::utils::auth::Claims;
use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Serialize, ToSchema, Debug)]
pub struct UserProfileResponse {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub created_at: Option<chrono::DateTime<Utc>>,
    #[serde(flatten)]
    pub stats: UserStats,
}

impl From<&users::Model> for UserProfileResponse {
    fn from(user: &users::Model) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            created_at: user.created_at,
            stats: UserStats::from(user),
        }
    }
}

#[derive(Deserialize, ToSchema, Validate)]
pub struct UpdateProfileRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
}

#[utoipa::path(
    get,
    path = "/auth/profile",
    responses(
        (status = 200, description = "Profile with usage statistics", body = UserProfileResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "auth"
)]
pub async fn get_profile(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UserProfileResponse>, AppError> {
    let user = Users::find_by_id(&claims.sub)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(UserProfileResponse::from(&user)))
}

#[utoipa::path(
    patch,
    path = "/auth/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated successfully", body = UserProfileResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "auth"
)]
pub async fn update_profile(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<UserProfileResponse>, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let user = Users::find_by_id(&claims.sub)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let mut active: users::ActiveModel = user.into();

    if let Some(email) = payload.email {
        active.email = Set(Some(email));
    }
    if let Some(name) = payload.name {
        active.name = Set(Some(name));
    }

    let updated = active.update(&state.db).await?;

    Ok(Json(UserProfileResponse::from(&updated)))
}

#[utoipa::path(
    get,
    path = "/auth/profile/stats",
    responses(
        (status = 200, description = "Usage statistics", body = UserStats),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "auth"
)]
pub async fn get_stats(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UserStats>, AppError> {
    let stats = UserStatsService::get_user_stats(&state.db, &claims.sub).await?;
    Ok(Json(stats))
}

#[utoipa::path(
    delete,
    path = "/auth/profile/stats",
    responses(
        (status = 200, description = "Statistics reset to zero", body = UserStats),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "auth"
)]
pub async fn reset_stats(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UserStats>, AppError> {
    UserStatsService::reset_user_stats(&state.db, &claims.sub).await?;
    let stats = UserStatsService::get_user_stats(&state.db, &claims.sub).await?;
    Ok(Json(stats))
}
