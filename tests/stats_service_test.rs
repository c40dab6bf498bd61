mod common;

use chrono::Utc;
use common::setup_test_db;
use docguard::api::error::AppError;
use docguard::entities::users;
use docguard::services::stats::UserStatsService;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

async fn create_user(db: &DatabaseConnection, id: &str) {
    users::ActiveModel {
        id: Set(id.to_string()),
        username: Set(format!("user-{}", id)),
        password_hash: Set("unused".to_string()),
        email: Set(None),
        name: Set(None),
        total_documents_saved: Set(0),
        total_documents_processed: Set(0),
        total_documents_shared: Set(0),
        total_sensitive_items_detected: Set(0),
        total_non_detected_items: Set(0),
        created_at: Set(Some(Utc::now())),
    }
    .insert(db)
    .await
    .unwrap();
}

#[tokio::test]
async fn test_increments_accumulate() {
    let db = setup_test_db().await;
    create_user(&db, "u1").await;

    UserStatsService::increment_documents_saved(&db, "u1").await.unwrap();
    UserStatsService::increment_documents_saved(&db, "u1").await.unwrap();
    UserStatsService::increment_documents_processed(&db, "u1").await.unwrap();
    UserStatsService::increment_documents_shared(&db, "u1").await.unwrap();
    UserStatsService::increment_sensitive_items_detected(&db, "u1", 3)
        .await
        .unwrap();
    UserStatsService::increment_non_detected_items(&db, "u1", 1)
        .await
        .unwrap();

    let stats = UserStatsService::get_user_stats(&db, "u1").await.unwrap();
    assert_eq!(stats.total_documents_saved, 2);
    assert_eq!(stats.total_documents_processed, 1);
    assert_eq!(stats.total_documents_shared, 1);
    assert_eq!(stats.total_sensitive_items_detected, 3);
    assert_eq!(stats.total_non_detected_items, 1);
    assert_eq!(stats.detection_accuracy, 75.0);
}

#[tokio::test]
async fn test_negative_amounts_are_rejected() {
    let db = setup_test_db().await;
    create_user(&db, "u1").await;

    let err = UserStatsService::increment_sensitive_items_detected(&db, "u1", -1)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = UserStatsService::update_stats_after_analysis(&db, "u1", 1, -1)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let stats = UserStatsService::get_user_stats(&db, "u1").await.unwrap();
    assert_eq!(stats.total_sensitive_items_detected, 0);
    assert_eq!(stats.total_non_detected_items, 0);
}

#[tokio::test]
async fn test_unknown_user_is_not_found() {
    let db = setup_test_db().await;

    let err = UserStatsService::increment_documents_processed(&db, "ghost")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = UserStatsService::get_user_stats(&db, "ghost")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_analysis_update_and_reset() {
    let db = setup_test_db().await;
    create_user(&db, "u1").await;
    create_user(&db, "u2").await;

    UserStatsService::update_stats_after_analysis(&db, "u1", 2, 0)
        .await
        .unwrap();
    UserStatsService::update_stats_after_analysis(&db, "u1", 0, 1)
        .await
        .unwrap();
    UserStatsService::increment_documents_saved(&db, "u2").await.unwrap();

    let stats = UserStatsService::get_user_stats(&db, "u1").await.unwrap();
    assert_eq!(stats.total_sensitive_items_detected, 2);
    assert_eq!(stats.total_non_detected_items, 1);
    assert_eq!(stats.detection_accuracy, 66.67);

    UserStatsService::reset_user_stats(&db, "u1").await.unwrap();
    let stats = UserStatsService::get_user_stats(&db, "u1").await.unwrap();
    assert_eq!(stats.total_sensitive_items_detected, 0);
    assert_eq!(stats.detection_accuracy, 0.0);

    // Other users are untouched
    let other = UserStatsService::get_user_stats(&db, "u2").await.unwrap();
    assert_eq!(other.total_documents_saved, 1);
}
