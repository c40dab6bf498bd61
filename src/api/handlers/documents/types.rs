use crate::api::error::AppError;
use crate::entities::{document_scans, documents, sensitive_information};
use crate::models::{FileType, RiskLevel, SensitiveType};
use crate::services::document_service::DocumentChanges;
use crate::utils::validation::normalize_title;
use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Rejects an explicit `null`: the field is either absent or carries a value.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Serialize, ToSchema, Debug)]
pub struct DocumentResponse {
    pub id: String,
    /// Owner id
    pub user: String,
    pub title: String,
    /// Download path of the stored blob
    pub file: String,
    pub file_type: FileType,
    pub file_type_display: String,
    pub processed: bool,
    pub created_at: chrono::DateTime<Utc>,
    pub updated_at: chrono::DateTime<Utc>,
}

impl From<documents::Model> for DocumentResponse {
    fn from(doc: documents::Model) -> Self {
        let file_type = FileType::parse(&doc.file_type);
        Self {
            file: format!("/documents/{}/file", doc.id),
            id: doc.id,
            user: doc.user_id,
            title: doc.title,
            file_type,
            file_type_display: file_type.display_name().to_string(),
            processed: doc.processed,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

#[derive(Serialize, ToSchema, Debug)]
pub struct SensitiveItemResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub info_type: SensitiveType,
    pub type_display: String,
    pub confidence: f64,
    pub location: Option<serde_json::Value>,
    pub count: i32,
    pub redacted: bool,
}

impl From<sensitive_information::Model> for SensitiveItemResponse {
    fn from(item: sensitive_information::Model) -> Self {
        let info_type = SensitiveType::parse(&item.info_type);
        Self {
            id: item.id,
            info_type,
            type_display: info_type.display_name().to_string(),
            confidence: item.confidence,
            location: item.location,
            count: item.count,
            redacted: item.redacted,
        }
    }
}

#[derive(Serialize, ToSchema, Debug)]
pub struct ScanResponse {
    pub id: String,
    pub document_id: String,
    pub scan_date: chrono::DateTime<Utc>,
    pub risk_level: String,
    pub risk_level_display: String,
    /// Seconds
    pub processing_time: f64,
    pub sensitive_items_count: usize,
    pub sensitive_items: Vec<SensitiveItemResponse>,
}

impl From<(document_scans::Model, Vec<sensitive_information::Model>)> for ScanResponse {
    fn from((scan, items): (document_scans::Model, Vec<sensitive_information::Model>)) -> Self {
        let risk_level_display = RiskLevel::parse(&scan.risk_level)
            .map(|r| r.display_name().to_string())
            .unwrap_or_else(|| scan.risk_level.clone());
        Self {
            id: scan.id,
            document_id: scan.document_id,
            scan_date: scan.scan_date,
            risk_level: scan.risk_level,
            risk_level_display,
            processing_time: scan.processing_time,
            sensitive_items_count: items.len(),
            sensitive_items: items.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Serialize, ToSchema, Debug)]
pub struct DocumentDetailResponse {
    #[serde(flatten)]
    pub document: DocumentResponse,
    pub scans: Vec<ScanResponse>,
}

/// Partial update. Server-managed fields such as `created_at`, `updated_at`,
/// `id`, `user` and `file` are accepted in the body and ignored.
#[derive(Deserialize, ToSchema, Debug, Default)]
pub struct PatchDocumentRequest {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub file_type: Option<FileType>,
    #[serde(default, deserialize_with = "present")]
    pub processed: Option<bool>,
}

impl PatchDocumentRequest {
    pub fn into_changes(self) -> Result<DocumentChanges, AppError> {
        let title = self
            .title
            .map(|t| normalize_title(&t))
            .transpose()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        Ok(DocumentChanges {
            title,
            file_type: self.file_type,
            processed: self.processed,
        })
    }
}

/// Full update: `title` and `file_type` are required, `processed` stays optional.
#[derive(Deserialize, ToSchema, Debug)]
pub struct PutDocumentRequest {
    pub title: String,
    pub file_type: FileType,
    #[serde(default, deserialize_with = "present")]
    pub processed: Option<bool>,
}

impl PutDocumentRequest {
    pub fn into_changes(self) -> Result<DocumentChanges, AppError> {
        PatchDocumentRequest {
            title: Some(self.title),
            file_type: Some(self.file_type),
            processed: self.processed,
        }
        .into_changes()
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct ListDocumentsQuery {
    pub file_type: Option<FileType>,
    pub processed: Option<bool>,
    pub search: Option<String>,
    /// `created_at`, `updated_at` or `title`, `-` prefix for descending
    pub ordering: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_accepts_partial_body() {
        let req: PatchDocumentRequest = serde_json::from_str(r#"{"processed": true}"#).unwrap();
        assert_eq!(req.processed, Some(true));
        assert!(req.title.is_none());
        assert!(req.file_type.is_none());
    }

    #[test]
    fn test_patch_ignores_server_managed_fields() {
        let req: PatchDocumentRequest = serde_json::from_str(
            r#"{"created_at": "2001-01-01T00:00:00Z", "updated_at": "x", "id": "other", "user": "u2"}"#,
        )
        .unwrap();
        assert_eq!(req.into_changes().unwrap(), DocumentChanges::default());
    }

    #[test]
    fn test_patch_rejects_non_boolean_processed() {
        assert!(serde_json::from_str::<PatchDocumentRequest>(r#"{"processed": "yes"}"#).is_err());
        assert!(serde_json::from_str::<PatchDocumentRequest>(r#"{"processed": 1}"#).is_err());
        assert!(serde_json::from_str::<PatchDocumentRequest>(r#"{"processed": null}"#).is_err());
    }

    #[test]
    fn test_patch_rejects_unknown_file_type() {
        assert!(serde_json::from_str::<PatchDocumentRequest>(r#"{"file_type": "video"}"#).is_err());
    }

    #[test]
    fn test_patch_title_is_normalized() {
        let req: PatchDocumentRequest = serde_json::from_str(r#"{"title": "  Lease  "}"#).unwrap();
        assert_eq!(req.into_changes().unwrap().title.as_deref(), Some("Lease"));

        let req: PatchDocumentRequest = serde_json::from_str(r#"{"title": "   "}"#).unwrap();
        assert!(req.into_changes().is_err());
    }

    #[test]
    fn test_put_requires_title_and_file_type() {
        assert!(serde_json::from_str::<PutDocumentRequest>(r#"{"processed": true}"#).is_err());
        let req: PutDocumentRequest =
            serde_json::from_str(r#"{"title": "Scan", "file_type": "pdf"}"#).unwrap();
        let changes = req.into_changes().unwrap();
        assert_eq!(changes.file_type, Some(FileType::Pdf));
        assert_eq!(changes.processed, None);
    }
}
