mod common;

use axum::http::StatusCode;
use chrono::Utc;
use common::*;
use docguard::entities::detection_models;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::json;
use uuid::Uuid;

const LEAKY_TEXT: &str = "Contact jane.doe@example.com, card 4111 1111 1111 1111.";

#[tokio::test]
async fn test_backend_analysis_records_scan_and_stats() {
    let ctx = spawn_app().await;
    let (token, _) = register_and_login(&ctx.app, "alice").await;
    let doc = upload_text(&ctx.app, &token, "Customer export", LEAKY_TEXT).await;
    let id = doc["id"].as_str().unwrap();

    let (status, body) = send(
        &ctx.app,
        json_request("POST", "/analysis", Some(&token), json!({ "document_id": id })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["document_id"], json!(id));
    assert_eq!(body["risk_level"], json!("medium"));
    assert_eq!(body["sensitive_items_count"], json!(2));

    let types: Vec<&str> = body["sensitive_items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["type"].as_str().unwrap())
        .collect();
    assert!(types.contains(&"email"));
    assert!(types.contains(&"credit_card"));

    let (_, detail) = send(&ctx.app, get(&format!("/documents/{}", id), Some(&token))).await;
    assert_eq!(detail["processed"], json!(true));
    assert_eq!(detail["scans"].as_array().unwrap().len(), 1);

    let profile = profile(&ctx.app, &token).await;
    assert_eq!(profile["total_documents_processed"], json!(1));
    assert_eq!(profile["total_sensitive_items_detected"], json!(2));
    assert_eq!(profile["total_non_detected_items"], json!(0));
    assert_eq!(profile["detection_accuracy"], json!(100.0));
}

#[tokio::test]
async fn test_reanalysis_does_not_recount_processed_document() {
    let ctx = spawn_app().await;
    let (token, _) = register_and_login(&ctx.app, "alice").await;
    let doc = upload_text(&ctx.app, &token, "Customer export", LEAKY_TEXT).await;
    let id = doc["id"].as_str().unwrap();

    for _ in 0..2 {
        let (status, _) = send(
            &ctx.app,
            json_request("POST", "/analysis", Some(&token), json!({ "document_id": id })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let profile = profile(&ctx.app, &token).await;
    assert_eq!(profile["total_documents_processed"], json!(1));
    assert_eq!(profile["total_sensitive_items_detected"], json!(4));

    let (status, scans) = send(
        &ctx.app,
        get(&format!("/documents/{}/scans", id), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(scans.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_clean_document_counts_as_non_detected() {
    let ctx = spawn_app().await;
    let (token, _) = register_and_login(&ctx.app, "alice").await;
    let doc = upload_text(&ctx.app, &token, "Shopping list", "milk, eggs and bread").await;

    let (status, body) = send(
        &ctx.app,
        json_request(
            "POST",
            "/analysis",
            Some(&token),
            json!({ "document_id": doc["id"] }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["risk_level"], json!("low"));
    assert_eq!(body["sensitive_items_count"], json!(0));

    let profile = profile(&ctx.app, &token).await;
    assert_eq!(profile["total_documents_processed"], json!(1));
    assert_eq!(profile["total_non_detected_items"], json!(1));
    assert_eq!(profile["detection_accuracy"], json!(0.0));
}

#[tokio::test]
async fn test_ml_payload_without_findings() {
    let ctx = spawn_app().await;
    let (token, _) = register_and_login(&ctx.app, "alice").await;
    let doc = upload_text(&ctx.app, &token, "Photo", "nothing here").await;
    let id = doc["id"].as_str().unwrap();

    let (status, body) = send(
        &ctx.app,
        json_request(
            "POST",
            "/analysis",
            Some(&token),
            json!({
                "document_id": id,
                "detection_types": ["email", "phone"],
                "sensitive_items_count": 0,
                "processing_time": 0.42,
                "source": "ml_model"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["status"], json!("recorded"));
    assert_eq!(body["source"], json!("ml_model"));

    let profile = profile(&ctx.app, &token).await;
    assert_eq!(profile["total_documents_processed"], json!(1));
    assert_eq!(profile["total_non_detected_items"], json!(1));
    assert_eq!(profile["total_sensitive_items_detected"], json!(0));

    let (_, scans) = send(&ctx.app, get("/scans?risk_level=low", Some(&token))).await;
    assert_eq!(scans.as_array().unwrap().len(), 1);
    assert_eq!(scans[0]["document_id"], json!(id));
}

#[tokio::test]
async fn test_ml_payload_with_findings() {
    let ctx = spawn_app().await;
    let (token, _) = register_and_login(&ctx.app, "alice").await;
    let doc = upload_text(&ctx.app, &token, "ID card", "scanned").await;
    let id = doc["id"].as_str().unwrap();

    let (status, _) = send(
        &ctx.app,
        json_request(
            "POST",
            "/analysis",
            Some(&token),
            json!({
                "document_id": id,
                "detection_types": ["ssn", "passport"],
                "sensitive_items_count": 3,
                "processing_time": 1.5,
                "source": "ml_model",
                "sensitive_items": [
                    { "type": "ssn", "confidence": 0.97, "count": 2 },
                    { "type": "passport", "confidence": 0.81 }
                ]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, detail) = send(&ctx.app, get(&format!("/documents/{}", id), Some(&token))).await;
    let scan = &detail["scans"][0];
    assert_eq!(scan["risk_level"], json!("high"));
    assert_eq!(scan["sensitive_items"].as_array().unwrap().len(), 2);

    let types: Vec<&str> = scan["sensitive_items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["type"].as_str().unwrap())
        .collect();
    assert!(types.contains(&"other"));

    let profile = profile(&ctx.app, &token).await;
    assert_eq!(profile["total_sensitive_items_detected"], json!(3));
    assert_eq!(profile["total_documents_processed"], json!(1));
}

#[tokio::test]
async fn test_invalid_analysis_requests() {
    let ctx = spawn_app().await;
    let (token, _) = register_and_login(&ctx.app, "alice").await;
    let doc = upload_text(&ctx.app, &token, "Notes", "plain text").await;
    let id = doc["id"].as_str().unwrap();

    let (status, _) = send(
        &ctx.app,
        json_request(
            "POST",
            "/analysis",
            Some(&token),
            json!({
                "document_id": id,
                "detection_types": [],
                "sensitive_items_count": 0,
                "processing_time": 0.1,
                "source": "manual"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &ctx.app,
        json_request(
            "POST",
            "/analysis",
            Some(&token),
            json!({
                "document_id": id,
                "detection_types": [],
                "sensitive_items_count": -2,
                "processing_time": 0.1,
                "source": "ml_model"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &ctx.app,
        json_request("POST", "/analysis", Some(&token), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(processed_count(&ctx.app, &token).await, 0);
}

#[tokio::test]
async fn test_analysis_of_foreign_document_is_not_found() {
    let ctx = spawn_app().await;
    let (alice, _) = register_and_login(&ctx.app, "alice").await;
    let (mallory, _) = register_and_login(&ctx.app, "mallory").await;
    let doc = upload_text(&ctx.app, &alice, "Private", LEAKY_TEXT).await;
    let id = doc["id"].as_str().unwrap();

    let (status, _) = send(
        &ctx.app,
        json_request("POST", "/analysis", Some(&mallory), json!({ "document_id": id })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &ctx.app,
        json_request(
            "POST",
            "/analysis",
            Some(&mallory),
            json!({
                "document_id": id,
                "detection_types": [],
                "sensitive_items_count": 1,
                "processing_time": 0.1,
                "source": "ml_model"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert_eq!(processed_count(&ctx.app, &alice).await, 0);
    let mallory_profile = profile(&ctx.app, &mallory).await;
    assert_eq!(mallory_profile["total_sensitive_items_detected"], json!(0));
}

#[tokio::test]
async fn test_detection_job_tracks_models() {
    let ctx = spawn_app().await;
    let (token, _) = register_and_login(&ctx.app, "alice").await;
    let doc = upload_text(&ctx.app, &token, "Export", LEAKY_TEXT).await;
    let id = doc["id"].as_str().unwrap();

    send(
        &ctx.app,
        json_request("POST", "/analysis", Some(&token), json!({ "document_id": id })),
    )
    .await;

    let (status, jobs) = send(&ctx.app, get("/detection/jobs", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    let jobs = jobs.as_array().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0]["status"], json!("completed"));
    assert_eq!(jobs[0]["document"], json!(id));
    assert_eq!(jobs[0]["models_used"].as_array().unwrap().len(), 7);
    assert!(jobs[0]["error_message"].is_null());

    let job_id = jobs[0]["id"].as_str().unwrap();
    let (status, job) = send(
        &ctx.app,
        get(&format!("/detection/jobs/{}", job_id), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(job["status_display"], json!("Completed"));

    // Jobs are scoped to the document owner
    let (other, _) = register_and_login(&ctx.app, "bob").await;
    let (_, jobs) = send(&ctx.app, get("/detection/jobs", Some(&other))).await;
    assert!(jobs.as_array().unwrap().is_empty());
    let (status, _) = send(
        &ctx.app,
        get(&format!("/detection/jobs/{}", job_id), Some(&other)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_failed_analysis_marks_job_failed() {
    let ctx = spawn_app().await;
    let (token, _) = register_and_login(&ctx.app, "alice").await;
    let doc = upload_text(&ctx.app, &token, "Export", LEAKY_TEXT).await;
    let id = doc["id"].as_str().unwrap();

    ctx.storage.clear();

    let (status, _) = send(
        &ctx.app,
        json_request("POST", "/analysis", Some(&token), json!({ "document_id": id })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (_, jobs) = send(&ctx.app, get("/detection/jobs?status=failed", Some(&token))).await;
    let jobs = jobs.as_array().unwrap();
    assert_eq!(jobs.len(), 1);
    assert!(jobs[0]["error_message"].is_string());
    assert!(jobs[0]["completed_at"].is_string());

    let profile = profile(&ctx.app, &token).await;
    assert_eq!(profile["total_documents_processed"], json!(0));
    assert_eq!(profile["total_non_detected_items"], json!(0));
}

#[tokio::test]
async fn test_detection_models_catalog() {
    let ctx = spawn_app().await;
    let (token, _) = register_and_login(&ctx.app, "alice").await;

    let (status, models) = send(&ctx.app, get("/detection/models", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    let models = models.as_array().unwrap();
    assert_eq!(models.len(), 7);
    assert!(models.iter().all(|m| m["model_type"] == json!("pattern")));

    let names: Vec<&str> = models.iter().map(|m| m["name"].as_str().unwrap()).collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);

    let (_, ml) = send(&ctx.app, get("/detection/models?model_type=ml", Some(&token))).await;
    assert!(ml.as_array().unwrap().is_empty());

    let model_id = models[0]["id"].as_str().unwrap();
    let (status, model) = send(
        &ctx.app,
        get(&format!("/detection/models/{}", model_id), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(model["version"], json!("1.0.0"));

    let (status, _) = send(&ctx.app, get("/detection/models?ordering=bogus", Some(&token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_scan_detail_is_scoped_to_owner() {
    let ctx = spawn_app().await;
    let (token, _) = register_and_login(&ctx.app, "alice").await;
    let (other, _) = register_and_login(&ctx.app, "bob").await;
    let doc = upload_text(&ctx.app, &token, "Export", LEAKY_TEXT).await;

    let (_, analysis) = send(
        &ctx.app,
        json_request(
            "POST",
            "/analysis",
            Some(&token),
            json!({ "document_id": doc["id"] }),
        ),
    )
    .await;
    let scan_uri = format!("/scans/{}", analysis["scan_id"].as_str().unwrap());

    let (status, scan) = send(&ctx.app, get(&scan_uri, Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(scan["id"], analysis["scan_id"]);
    assert_eq!(scan["document_id"], doc["id"]);
    assert_eq!(scan["risk_level"], json!("medium"));
    assert_eq!(scan["risk_level_display"], json!("Medium Risk"));
    assert_eq!(scan["sensitive_items_count"], json!(2));

    let items = scan["sensitive_items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|i| i["count"] == json!(1)));
    assert!(items.iter().any(|i| i["type_display"] == json!("Email Address")));

    let (status, body) = send(&ctx.app, get(&scan_uri, Some(&other))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    let (status, _) = send(&ctx.app, get("/scans/does-not-exist", Some(&token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_models_sharing_a_target_type_report_it_once() {
    let ctx = spawn_app().await;
    let (token, _) = register_and_login(&ctx.app, "alice").await;

    // Sorts after every seeded name, so it is not adjacent to "Email Address Pattern"
    let now = Utc::now();
    detection_models::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        name: Set("Zeta Email Pattern".to_string()),
        model_type: Set("pattern".to_string()),
        target_type: Set("email".to_string()),
        version: Set("2.0.0".to_string()),
        active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&ctx.state.db)
    .await
    .unwrap();

    let doc = upload_text(&ctx.app, &token, "Export", LEAKY_TEXT).await;
    let (status, body) = send(
        &ctx.app,
        json_request(
            "POST",
            "/analysis",
            Some(&token),
            json!({ "document_id": doc["id"] }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["sensitive_items_count"], json!(2));
    assert_eq!(body["risk_level"], json!("medium"));
    assert_eq!(
        profile(&ctx.app, &token).await["total_sensitive_items_detected"],
        json!(2)
    );
}
