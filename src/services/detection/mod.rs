pub mod patterns;

use crate::api::error::AppError;
use crate::entities::{prelude::*, *};
use crate::models::{JobStatus, ModelType, RiskLevel, SensitiveType};
use crate::services::document_service::{DocumentChanges, DocumentService, ScanWithItems};
use crate::services::stats::UserStatsService;
use crate::services::storage::StorageService;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, LoaderTrait, Order,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// One sensitive-information row waiting to be stored with a scan.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub info_type: SensitiveType,
    pub confidence: f64,
    pub location: Option<serde_json::Value>,
    pub count: i32,
    pub redacted: bool,
}

/// Results produced by the external ML detector.
#[derive(Debug, Clone)]
pub struct MlReport {
    pub document_id: String,
    pub sensitive_items_count: i64,
    pub processing_time: f64,
    pub items: Vec<NewItem>,
}

pub type JobWithModels = (detection_jobs::Model, Vec<detection_models::Model>);

pub struct DetectionService {
    db: DatabaseConnection,
    storage: Arc<dyn StorageService>,
    documents: Arc<DocumentService>,
}

impl DetectionService {
    pub fn new(
        db: DatabaseConnection,
        storage: Arc<dyn StorageService>,
        documents: Arc<DocumentService>,
    ) -> Self {
        Self {
            db,
            storage,
            documents,
        }
    }

    pub async fn list_models(
        &self,
        model_type: Option<ModelType>,
        order_by: detection_models::Column,
        order: Order,
    ) -> Result<Vec<detection_models::Model>, AppError> {
        let mut query = DetectionModels::find().filter(detection_models::Column::Active.eq(true));
        if let Some(model_type) = model_type {
            query = query.filter(detection_models::Column::ModelType.eq(model_type.as_str()));
        }
        Ok(query.order_by(order_by, order).all(&self.db).await?)
    }

    pub async fn find_model(&self, id: &str) -> Result<detection_models::Model, AppError> {
        DetectionModels::find_by_id(id)
            .filter(detection_models::Column::Active.eq(true))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound("Detection model not found".to_string()))
    }

    /// Jobs that ran against documents owned by `user_id`.
    pub async fn list_jobs(
        &self,
        user_id: &str,
        status: Option<JobStatus>,
        document_id: Option<&str>,
        order_by: detection_jobs::Column,
        order: Order,
    ) -> Result<Vec<JobWithModels>, AppError> {
        let mut query = DetectionJobs::find()
            .join(
                sea_orm::JoinType::InnerJoin,
                detection_jobs::Relation::Documents.def(),
            )
            .filter(documents::Column::UserId.eq(user_id));

        if let Some(status) = status {
            query = query.filter(detection_jobs::Column::Status.eq(status.as_str()));
        }
        if let Some(document_id) = document_id {
            query = query.filter(detection_jobs::Column::DocumentId.eq(document_id));
        }

        let jobs = query.order_by(order_by, order).all(&self.db).await?;
        let models = jobs
            .load_many_to_many(DetectionModels, DetectionJobModels, &self.db)
            .await?;

        Ok(jobs.into_iter().zip(models).collect())
    }

    pub async fn find_job(&self, user_id: &str, id: &str) -> Result<JobWithModels, AppError> {
        let job = DetectionJobs::find_by_id(id)
            .join(
                sea_orm::JoinType::InnerJoin,
                detection_jobs::Relation::Documents.def(),
            )
            .filter(documents::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound("Detection job not found".to_string()))?;

        let models = vec![job.clone()]
            .load_many_to_many(DetectionModels, DetectionJobModels, &self.db)
            .await?
            .into_iter()
            .next()
            .unwrap_or_default();

        Ok((job, models))
    }

    /// Runs the built-in pattern detectors over the stored blob and records
    /// the outcome as a scan. The run is tracked as a detection job.
    pub async fn analyze_document(
        &self,
        user_id: &str,
        document_id: &str,
    ) -> Result<ScanWithItems, AppError> {
        let document = self.documents.find_owned(user_id, document_id).await?;

        let models = DetectionModels::find()
            .filter(detection_models::Column::Active.eq(true))
            .filter(detection_models::Column::ModelType.eq(ModelType::Pattern.as_str()))
            .order_by_asc(detection_models::Column::Name)
            .all(&self.db)
            .await?;

        let job = self.start_job(&document.id, &models).await?;
        let started = Instant::now();

        match self.run_patterns(user_id, &document, &models, started).await {
            Ok(result) => {
                self.finish_job(job, JobStatus::Completed, None).await;
                Ok(result)
            }
            Err(e) => {
                tracing::error!(document_id = %document.id, job_id = %job.id, "Analysis failed: {}", e);
                self.finish_job(job, JobStatus::Failed, Some(e.to_string()))
                    .await;
                Err(e)
            }
        }
    }

    async fn start_job(
        &self,
        document_id: &str,
        models: &[detection_models::Model],
    ) -> Result<detection_jobs::Model, AppError> {
        let job = detection_jobs::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            document_id: Set(document_id.to_string()),
            status: Set(JobStatus::Running.as_str().to_string()),
            started_at: Set(Some(Utc::now())),
            completed_at: Set(None),
            error_message: Set(None),
        }
        .insert(&self.db)
        .await?;

        if !models.is_empty() {
            let links = models.iter().map(|m| detection_job_models::ActiveModel {
                job_id: Set(job.id.clone()),
                model_id: Set(m.id.clone()),
            });
            DetectionJobModels::insert_many(links)
                .exec_without_returning(&self.db)
                .await?;
        }

        Ok(job)
    }

    async fn finish_job(
        &self,
        job: detection_jobs::Model,
        status: JobStatus,
        error_message: Option<String>,
    ) {
        let job_id = job.id.clone();
        let mut active: detection_jobs::ActiveModel = job.into();
        active.status = Set(status.as_str().to_string());
        active.completed_at = Set(Some(Utc::now()));
        active.error_message = Set(error_message);

        if let Err(e) = active.update(&self.db).await {
            tracing::error!(job_id = %job_id, "Failed to update detection job: {}", e);
        }
    }

    async fn run_patterns(
        &self,
        user_id: &str,
        document: &documents::Model,
        models: &[detection_models::Model],
        started: Instant,
    ) -> Result<ScanWithItems, AppError> {
        let data = self
            .storage
            .get_file(&document.file)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to load document: {}", e)))?;
        let text = String::from_utf8_lossy(&data);

        let mut enabled: Vec<SensitiveType> = models
            .iter()
            .map(|m| SensitiveType::parse(&m.target_type))
            .filter(|t| *t != SensitiveType::Other)
            .collect();
        enabled.sort_by_key(|t| t.as_str());
        enabled.dedup();

        let items: Vec<NewItem> = patterns::scan_text(&text, &enabled)
            .into_iter()
            .map(|f| NewItem {
                info_type: f.info_type,
                confidence: f.confidence,
                location: Some(json!({ "start": f.first_match.0, "end": f.first_match.1 })),
                count: f.count,
                redacted: false,
            })
            .collect();

        // Risk and stats follow the number of distinct item rows
        let rows = items.len() as i64;
        let risk = RiskLevel::from_item_count(rows);
        let (sensitive, non_detected) = if rows > 0 { (rows, 0) } else { (0, 1) };

        self.persist_scan(
            user_id,
            &document.id,
            risk,
            started.elapsed().as_secs_f64(),
            items,
            sensitive,
            non_detected,
        )
        .await
    }

    /// Stores a scan reported by the ML detector.
    pub async fn record_ml_analysis(
        &self,
        user_id: &str,
        report: MlReport,
    ) -> Result<document_scans::Model, AppError> {
        let risk = RiskLevel::from_item_count(report.sensitive_items_count);
        let (sensitive, non_detected) = if report.sensitive_items_count > 0 {
            (report.sensitive_items_count, 0)
        } else {
            (0, 1)
        };

        let (scan, _) = self
            .persist_scan(
                user_id,
                &report.document_id,
                risk,
                report.processing_time,
                report.items,
                sensitive,
                non_detected,
            )
            .await?;

        tracing::info!(
            document_id = %report.document_id,
            sensitive_items_count = report.sensitive_items_count,
            "ML detection stats recorded"
        );
        Ok(scan)
    }

    /// Writes the scan and its items, marks the document processed and
    /// applies the analysis counters, all in one transaction under the
    /// document lock.
    #[allow(clippy::too_many_arguments)]
    async fn persist_scan(
        &self,
        user_id: &str,
        document_id: &str,
        risk: RiskLevel,
        processing_time: f64,
        items: Vec<NewItem>,
        sensitive: i64,
        non_detected: i64,
    ) -> Result<ScanWithItems, AppError> {
        let guard = self.documents.lock_document(document_id).await;

        let result = async {
            let txn = self.db.begin().await?;
            let document = DocumentService::find_owned_in(&txn, user_id, document_id).await?;

            let scan = document_scans::ActiveModel {
                id: Set(Uuid::new_v4().to_string()),
                document_id: Set(document.id.clone()),
                scan_date: Set(Utc::now()),
                risk_level: Set(risk.as_str().to_string()),
                processing_time: Set(processing_time),
            }
            .insert(&txn)
            .await?;

            let mut saved = Vec::with_capacity(items.len());
            for item in items {
                let row = sensitive_information::ActiveModel {
                    id: Set(Uuid::new_v4().to_string()),
                    scan_id: Set(scan.id.clone()),
                    info_type: Set(item.info_type.as_str().to_string()),
                    confidence: Set(item.confidence),
                    location: Set(item.location),
                    count: Set(item.count),
                    redacted: Set(item.redacted),
                }
                .insert(&txn)
                .await?;
                saved.push(row);
            }

            let (document, transition) =
                DocumentService::apply_changes(&txn, document, DocumentChanges::mark_processed())
                    .await?;
            UserStatsService::update_stats_after_analysis(&txn, user_id, sensitive, non_detected)
                .await?;

            txn.commit().await?;
            Ok::<_, AppError>((scan, saved, document, transition))
        }
        .await;

        drop(guard);
        self.documents.release_locks();

        let (scan, saved, document, transition) = result?;
        transition.log(&document);
        tracing::info!(
            document_id = %document.id,
            scan_id = %scan.id,
            risk_level = risk.as_str(),
            items = saved.len(),
            "Scan recorded"
        );

        Ok((scan, saved))
    }
}
