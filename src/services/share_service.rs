use crate::api::error::AppError;
use crate::entities::{prelude::*, *};
use crate::services::document_service::DocumentService;
use crate::services::stats::UserStatsService;
use base64::Engine;
use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use uuid::Uuid;

/// Longest lifetime a share link may be given, in hours (30 days)
pub const MAX_SHARE_HOURS: i64 = 720;

pub struct ShareService;

impl ShareService {
    /// Generate a URL-safe random token for share links
    pub fn generate_token() -> String {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        let bytes: Vec<u8> = (0..24).map(|_| rng.r#gen()).collect();
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&bytes)
    }

    /// Create a share link for a document the user owns and count it as shared
    pub async fn create_share(
        db: &DatabaseConnection,
        document_id: &str,
        created_by: &str,
        expiration_hours: i64,
    ) -> Result<share_links::Model, AppError> {
        if !(1..=MAX_SHARE_HOURS).contains(&expiration_hours) {
            return Err(AppError::BadRequest(format!(
                "expiration_hours must be between 1 and {}",
                MAX_SHARE_HOURS
            )));
        }

        let txn = db.begin().await?;
        let document = DocumentService::find_owned_in(&txn, created_by, document_id).await?;

        let now = Utc::now();
        let share = share_links::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            document_id: Set(document.id),
            created_by: Set(created_by.to_string()),
            share_token: Set(Self::generate_token()),
            expires_at: Set(now + Duration::hours(expiration_hours)),
            created_at: Set(Some(now)),
        }
        .insert(&txn)
        .await?;

        UserStatsService::increment_documents_shared(&txn, created_by).await?;
        txn.commit().await?;

        tracing::info!(
            document_id = %share.document_id,
            user_id = %created_by,
            expires_at = %share.expires_at,
            "Share link created"
        );
        Ok(share)
    }

    /// Resolve a token to its document (public access)
    pub async fn get_shared_document(
        db: &DatabaseConnection,
        token: &str,
    ) -> Result<(share_links::Model, documents::Model), AppError> {
        let (share, document) = ShareLinks::find()
            .filter(share_links::Column::ShareToken.eq(token))
            .find_also_related(Documents)
            .one(db)
            .await?
            .ok_or(AppError::NotFound("Share link not found".to_string()))?;

        // Check expiry
        if Utc::now() > share.expires_at {
            return Err(AppError::Gone("Share link has expired".to_string()));
        }

        let document =
            document.ok_or(AppError::NotFound("Shared document not found".to_string()))?;
        Ok((share, document))
    }
}
