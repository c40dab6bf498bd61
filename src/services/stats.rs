use crate::api::error::AppError;
use crate::entities::{prelude::*, *};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use serde::Serialize;
use utoipa::ToSchema;

/// Per-user usage counters plus the derived detection accuracy.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct UserStats {
    pub total_documents_saved: i64,
    pub total_documents_processed: i64,
    pub total_documents_shared: i64,
    pub total_sensitive_items_detected: i64,
    pub total_non_detected_items: i64,
    /// Percentage of analysed items that were sensitive, two decimals
    pub detection_accuracy: f64,
}

impl From<&users::Model> for UserStats {
    fn from(user: &users::Model) -> Self {
        Self {
            total_documents_saved: user.total_documents_saved,
            total_documents_processed: user.total_documents_processed,
            total_documents_shared: user.total_documents_shared,
            total_sensitive_items_detected: user.total_sensitive_items_detected,
            total_non_detected_items: user.total_non_detected_items,
            detection_accuracy: detection_accuracy(
                user.total_sensitive_items_detected,
                user.total_non_detected_items,
            ),
        }
    }
}

pub fn detection_accuracy(sensitive: i64, non_detected: i64) -> f64 {
    let total = sensitive + non_detected;
    if total <= 0 {
        return 0.0;
    }
    let pct = sensitive as f64 / total as f64 * 100.0;
    (pct * 100.0).round() / 100.0
}

/// Counter mutations. Every increment is a single `SET c = c + n` statement
/// so concurrent requests for the same user never lose an update.
pub struct UserStatsService;

impl UserStatsService {
    async fn increment<C: ConnectionTrait>(
        db: &C,
        user_id: &str,
        column: users::Column,
        amount: i64,
    ) -> Result<(), AppError> {
        if amount < 0 {
            return Err(AppError::BadRequest(format!(
                "Counter increment must be non-negative, got {}",
                amount
            )));
        }

        let res = Users::update_many()
            .col_expr(column, Expr::col(column).add(amount))
            .filter(users::Column::Id.eq(user_id))
            .exec(db)
            .await;

        match res {
            Ok(r) if r.rows_affected == 0 => {
                tracing::error!(user_id = %user_id, counter = ?column, "Stats update for unknown user");
                Err(AppError::NotFound("User not found".to_string()))
            }
            Ok(_) => {
                tracing::info!(user_id = %user_id, counter = ?column, amount, "User stat incremented");
                Ok(())
            }
            Err(e) => {
                tracing::error!(user_id = %user_id, counter = ?column, "Failed to update user stats: {}", e);
                Err(e.into())
            }
        }
    }

    pub async fn increment_documents_saved<C: ConnectionTrait>(
        db: &C,
        user_id: &str,
    ) -> Result<(), AppError> {
        Self::increment(db, user_id, users::Column::TotalDocumentsSaved, 1).await
    }

    pub async fn increment_documents_processed<C: ConnectionTrait>(
        db: &C,
        user_id: &str,
    ) -> Result<(), AppError> {
        Self::increment(db, user_id, users::Column::TotalDocumentsProcessed, 1).await
    }

    pub async fn increment_documents_shared<C: ConnectionTrait>(
        db: &C,
        user_id: &str,
    ) -> Result<(), AppError> {
        Self::increment(db, user_id, users::Column::TotalDocumentsShared, 1).await
    }

    pub async fn increment_sensitive_items_detected<C: ConnectionTrait>(
        db: &C,
        user_id: &str,
        count: i64,
    ) -> Result<(), AppError> {
        Self::increment(db, user_id, users::Column::TotalSensitiveItemsDetected, count).await
    }

    pub async fn increment_non_detected_items<C: ConnectionTrait>(
        db: &C,
        user_id: &str,
        count: i64,
    ) -> Result<(), AppError> {
        Self::increment(db, user_id, users::Column::TotalNonDetectedItems, count).await
    }

    /// Applies both analysis counters in one statement.
    pub async fn update_stats_after_analysis<C: ConnectionTrait>(
        db: &C,
        user_id: &str,
        sensitive: i64,
        non_sensitive: i64,
    ) -> Result<(), AppError> {
        if sensitive < 0 || non_sensitive < 0 {
            return Err(AppError::BadRequest(
                "Analysis counts must be non-negative".to_string(),
            ));
        }

        let res = Users::update_many()
            .col_expr(
                users::Column::TotalSensitiveItemsDetected,
                Expr::col(users::Column::TotalSensitiveItemsDetected).add(sensitive),
            )
            .col_expr(
                users::Column::TotalNonDetectedItems,
                Expr::col(users::Column::TotalNonDetectedItems).add(non_sensitive),
            )
            .filter(users::Column::Id.eq(user_id))
            .exec(db)
            .await?;

        if res.rows_affected == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        tracing::info!(
            user_id = %user_id,
            sensitive,
            non_sensitive,
            "Analysis stats recorded"
        );
        Ok(())
    }

    pub async fn get_user_stats<C: ConnectionTrait>(
        db: &C,
        user_id: &str,
    ) -> Result<UserStats, AppError> {
        let user = Users::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or(AppError::NotFound("User not found".to_string()))?;

        Ok(UserStats::from(&user))
    }

    pub async fn reset_user_stats<C: ConnectionTrait>(
        db: &C,
        user_id: &str,
    ) -> Result<(), AppError> {
        let res = Users::update_many()
            .col_expr(users::Column::TotalDocumentsSaved, Expr::value(0i64))
            .col_expr(users::Column::TotalDocumentsProcessed, Expr::value(0i64))
            .col_expr(users::Column::TotalDocumentsShared, Expr::value(0i64))
            .col_expr(users::Column::TotalSensitiveItemsDetected, Expr::value(0i64))
            .col_expr(users::Column::TotalNonDetectedItems, Expr::value(0i64))
            .filter(users::Column::Id.eq(user_id))
            .exec(db)
            .await
            .inspect_err(|e| tracing::error!(user_id = %user_id, "Failed to reset user stats: {}", e))?;

        if res.rows_affected == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        tracing::info!(user_id = %user_id, "User stats reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_accuracy() {
        assert_eq!(detection_accuracy(0, 0), 0.0);
        assert_eq!(detection_accuracy(5, 0), 100.0);
        assert_eq!(detection_accuracy(1, 2), 33.33);
        assert_eq!(detection_accuracy(2, 1), 66.67);
    }

    #[test]
    fn test_stats_from_user() {
        let user = users::Model {
            id: "u1".to_string(),
            username: "alice".to_string(),
            password_hash: String::new(),
            email: None,
            name: None,
            total_documents_saved: 4,
            total_documents_processed: 3,
            total_documents_shared: 1,
            total_sensitive_items_detected: 3,
            total_non_detected_items: 1,
            created_at: None,
        };
        let stats = UserStats::from(&user);
        assert_eq!(stats.total_documents_processed, 3);
        assert_eq!(stats.detection_accuracy, 75.0);
    }
}
