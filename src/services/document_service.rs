use crate::api::error::AppError;
use crate::config::AppConfig;
use crate::entities::{prelude::*, *};
use crate::models::{FileType, RiskLevel};
use crate::services::stats::UserStatsService;
use crate::services::storage::{StorageService, document_key};
use crate::utils::keyed_mutex::KeyedMutex;
use crate::utils::validation::{
    is_executable_content, normalize_title, sanitize_filename, validate_file_size,
};
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, LoaderTrait,
    Order, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

/// Fields a client may change on an existing document. `None` leaves the
/// stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentChanges {
    pub title: Option<String>,
    pub file_type: Option<FileType>,
    pub processed: Option<bool>,
}

impl DocumentChanges {
    pub fn mark_processed() -> Self {
        Self {
            processed: Some(true),
            ..Self::default()
        }
    }
}

/// How the `processed` flag moved during one write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessedTransition {
    MarkedProcessed,
    MarkedUnprocessed,
    Unchanged,
}

impl ProcessedTransition {
    pub fn between(old: bool, new: bool) -> Self {
        match (old, new) {
            (false, true) => ProcessedTransition::MarkedProcessed,
            (true, false) => ProcessedTransition::MarkedUnprocessed,
            _ => ProcessedTransition::Unchanged,
        }
    }

    /// Only a false -> true move counts towards the owner's processed total.
    pub fn increments_counter(&self) -> bool {
        matches!(self, ProcessedTransition::MarkedProcessed)
    }

    pub fn log(&self, document: &documents::Model) {
        match self {
            ProcessedTransition::MarkedProcessed => tracing::info!(
                document_id = %document.id,
                user_id = %document.user_id,
                "Document marked as processed"
            ),
            ProcessedTransition::MarkedUnprocessed => tracing::warn!(
                document_id = %document.id,
                user_id = %document.user_id,
                "Document marked as unprocessed"
            ),
            ProcessedTransition::Unchanged => tracing::info!(
                document_id = %document.id,
                user_id = %document.user_id,
                processed = document.processed,
                "Document processed status unchanged"
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DocumentFilter {
    pub file_type: Option<FileType>,
    pub processed: Option<bool>,
    pub search: Option<String>,
    pub order_by: documents::Column,
    pub order: Order,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl Default for DocumentFilter {
    fn default() -> Self {
        Self {
            file_type: None,
            processed: None,
            search: None,
            order_by: documents::Column::CreatedAt,
            order: Order::Desc,
            limit: None,
            offset: None,
        }
    }
}

pub type ScanWithItems = (document_scans::Model, Vec<sensitive_information::Model>);

pub struct DocumentService {
    db: DatabaseConnection,
    storage: Arc<dyn StorageService>,
    config: AppConfig,
    update_lock: KeyedMutex,
}

impl DocumentService {
    pub fn new(db: DatabaseConnection, storage: Arc<dyn StorageService>, config: AppConfig) -> Self {
        Self {
            db,
            storage,
            config,
            update_lock: KeyedMutex::new(),
        }
    }

    /// Stores the blob and creates an unprocessed document owned by `user_id`.
    pub async fn create_document(
        &self,
        user_id: &str,
        title: &str,
        filename: &str,
        data: Vec<u8>,
        file_type: Option<FileType>,
    ) -> Result<documents::Model, AppError> {
        validate_file_size(data.len(), self.config.max_file_size)
            .map_err(|e| AppError::PayloadTooLarge(e.to_string()))?;
        let title = normalize_title(title).map_err(|e| AppError::BadRequest(e.to_string()))?;
        let safe_name =
            sanitize_filename(filename).map_err(|e| AppError::BadRequest(e.to_string()))?;

        if is_executable_content(&data) {
            tracing::warn!(user_id = %user_id, filename = %safe_name, "Rejected executable upload");
            return Err(AppError::BadRequest(
                "Executable content is not allowed".to_string(),
            ));
        }

        let file_type = file_type.unwrap_or_else(|| FileType::infer(&data, &safe_name));
        let id = Uuid::new_v4().to_string();
        let key = document_key(user_id, &id, &safe_name);
        let size = data.len();

        self.storage
            .upload_file(&key, data)
            .await
            .map_err(|e| AppError::Internal(format!("Upload failed: {}", e)))?;

        let now = Utc::now();
        let document = documents::ActiveModel {
            id: Set(id),
            user_id: Set(user_id.to_string()),
            title: Set(title),
            file: Set(key.clone()),
            file_type: Set(file_type.as_str().to_string()),
            processed: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = async {
            let txn = self.db.begin().await?;
            let created = document.insert(&txn).await?;
            UserStatsService::increment_documents_saved(&txn, user_id).await?;
            txn.commit().await?;
            Ok::<_, AppError>(created)
        }
        .await;

        match result {
            Ok(created) => {
                tracing::info!(
                    document_id = %created.id,
                    user_id = %user_id,
                    size,
                    file_type = file_type.as_str(),
                    "Document uploaded"
                );
                Ok(created)
            }
            Err(e) => {
                // Orphaned blob
                if let Err(del) = self.storage.delete_file(&key).await {
                    tracing::warn!("Failed to remove blob {} after insert error: {}", key, del);
                }
                Err(e)
            }
        }
    }

    /// Looks a document up within the requester's ownership scope. A document
    /// owned by someone else is reported the same as a missing one.
    pub async fn find_owned_in<C: ConnectionTrait>(
        conn: &C,
        user_id: &str,
        document_id: &str,
    ) -> Result<documents::Model, AppError> {
        Documents::find_by_id(document_id)
            .filter(documents::Column::UserId.eq(user_id))
            .one(conn)
            .await?
            .ok_or(AppError::NotFound("Document not found".to_string()))
    }

    pub async fn find_owned(
        &self,
        user_id: &str,
        document_id: &str,
    ) -> Result<documents::Model, AppError> {
        Self::find_owned_in(&self.db, user_id, document_id).await
    }

    pub async fn list_documents(
        &self,
        user_id: &str,
        filter: DocumentFilter,
    ) -> Result<Vec<documents::Model>, AppError> {
        let mut query = Documents::find().filter(documents::Column::UserId.eq(user_id));

        if let Some(file_type) = filter.file_type {
            query = query.filter(documents::Column::FileType.eq(file_type.as_str()));
        }
        if let Some(processed) = filter.processed {
            query = query.filter(documents::Column::Processed.eq(processed));
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", search.to_lowercase());
            query = query.filter(
                Expr::expr(Func::lower(Expr::col((
                    documents::Entity,
                    documents::Column::Title,
                ))))
                .like(pattern),
            );
        }

        let docs = query
            .order_by(filter.order_by, filter.order)
            .offset(filter.offset)
            .limit(filter.limit)
            .all(&self.db)
            .await?;

        Ok(docs)
    }

    /// Locks a document against concurrent writers. Pair with `release_locks`
    /// once the guard has been dropped.
    pub async fn lock_document(&self, document_id: &str) -> OwnedMutexGuard<()> {
        self.update_lock.lock(document_id).await
    }

    pub fn release_locks(&self) {
        self.update_lock.cleanup();
    }

    /// Writes `changes` to `document` and bumps the owner's processed counter
    /// on a false -> true move. Every write of `processed` goes through here.
    /// Run it inside the transaction that holds the document lock.
    pub async fn apply_changes<C: ConnectionTrait>(
        conn: &C,
        document: documents::Model,
        changes: DocumentChanges,
    ) -> Result<(documents::Model, ProcessedTransition), AppError> {
        let old_processed = document.processed;
        let new_processed = changes.processed.unwrap_or(old_processed);

        let mut active: documents::ActiveModel = document.into();
        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(file_type) = changes.file_type {
            active.file_type = Set(file_type.as_str().to_string());
        }
        active.processed = Set(new_processed);
        active.updated_at = Set(Utc::now());

        let updated = active.update(conn).await?;

        let transition = ProcessedTransition::between(old_processed, new_processed);
        if transition.increments_counter() {
            UserStatsService::increment_documents_processed(conn, &updated.user_id).await?;
        }

        Ok((updated, transition))
    }

    pub async fn update_document(
        &self,
        user_id: &str,
        document_id: &str,
        changes: DocumentChanges,
    ) -> Result<documents::Model, AppError> {
        let guard = self.lock_document(document_id).await;

        let result = async {
            let txn = self.db.begin().await?;
            let current = Self::find_owned_in(&txn, user_id, document_id).await?;
            let outcome = Self::apply_changes(&txn, current, changes).await?;
            txn.commit().await?;
            Ok::<_, AppError>(outcome)
        }
        .await;

        drop(guard);
        self.release_locks();

        let (updated, transition) = result?;
        transition.log(&updated);
        Ok(updated)
    }

    /// Removes the document with its scans, jobs and share links, then the blob.
    /// Usage counters are left as they are.
    pub async fn delete_document(&self, user_id: &str, document_id: &str) -> Result<(), AppError> {
        let guard = self.lock_document(document_id).await;

        let result = async {
            let txn = self.db.begin().await?;
            let document = Self::find_owned_in(&txn, user_id, document_id).await?;

            let scan_ids: Vec<String> = DocumentScans::find()
                .filter(document_scans::Column::DocumentId.eq(document_id))
                .all(&txn)
                .await?
                .into_iter()
                .map(|s| s.id)
                .collect();
            SensitiveInformation::delete_many()
                .filter(sensitive_information::Column::ScanId.is_in(scan_ids))
                .exec(&txn)
                .await?;
            DocumentScans::delete_many()
                .filter(document_scans::Column::DocumentId.eq(document_id))
                .exec(&txn)
                .await?;

            let job_ids: Vec<String> = DetectionJobs::find()
                .filter(detection_jobs::Column::DocumentId.eq(document_id))
                .all(&txn)
                .await?
                .into_iter()
                .map(|j| j.id)
                .collect();
            DetectionJobModels::delete_many()
                .filter(detection_job_models::Column::JobId.is_in(job_ids))
                .exec(&txn)
                .await?;
            DetectionJobs::delete_many()
                .filter(detection_jobs::Column::DocumentId.eq(document_id))
                .exec(&txn)
                .await?;

            ShareLinks::delete_many()
                .filter(share_links::Column::DocumentId.eq(document_id))
                .exec(&txn)
                .await?;
            Documents::delete_by_id(document_id).exec(&txn).await?;

            txn.commit().await?;
            Ok::<_, AppError>(document)
        }
        .await;

        drop(guard);
        self.release_locks();
        let document = result?;

        if let Err(e) = self.storage.delete_file(&document.file).await {
            tracing::warn!("Failed to delete blob {}: {}", document.file, e);
        }

        tracing::info!(document_id = %document_id, user_id = %user_id, "Document deleted");
        Ok(())
    }

    pub async fn read_file(
        &self,
        user_id: &str,
        document_id: &str,
    ) -> Result<(documents::Model, Vec<u8>), AppError> {
        let document = self.find_owned(user_id, document_id).await?;
        let data = self
            .storage
            .get_file(&document.file)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to read blob: {}", e)))?;
        Ok((document, data))
    }

    /// Scans visible to `user_id`, newest first unless `order` says otherwise.
    pub async fn list_scans(
        &self,
        user_id: &str,
        document_id: Option<&str>,
        risk_level: Option<RiskLevel>,
        order: Order,
    ) -> Result<Vec<ScanWithItems>, AppError> {
        let mut query = DocumentScans::find()
            .join(
                sea_orm::JoinType::InnerJoin,
                document_scans::Relation::Documents.def(),
            )
            .filter(documents::Column::UserId.eq(user_id));

        if let Some(document_id) = document_id {
            query = query.filter(document_scans::Column::DocumentId.eq(document_id));
        }
        if let Some(risk) = risk_level {
            query = query.filter(document_scans::Column::RiskLevel.eq(risk.as_str()));
        }

        let scans = query
            .order_by(document_scans::Column::ScanDate, order)
            .all(&self.db)
            .await?;
        let items = scans.load_many(SensitiveInformation, &self.db).await?;

        Ok(scans.into_iter().zip(items).collect())
    }

    pub async fn find_scan(&self, user_id: &str, scan_id: &str) -> Result<ScanWithItems, AppError> {
        let scan = DocumentScans::find_by_id(scan_id)
            .join(
                sea_orm::JoinType::InnerJoin,
                document_scans::Relation::Documents.def(),
            )
            .filter(documents::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound("Scan not found".to_string()))?;

        let items = SensitiveInformation::find()
            .filter(sensitive_information::Column::ScanId.eq(&scan.id))
            .all(&self.db)
            .await?;

        Ok((scan, items))
    }
}
