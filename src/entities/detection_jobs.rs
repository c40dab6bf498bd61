use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "detection_jobs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub document_id: String,
    pub status: String, // "pending", "running", "completed" or "failed"
    pub started_at: Option<DateTimeUtc>,
    pub completed_at: Option<DateTimeUtc>,
    #[sea_orm(column_type = "Text", nullable)]
    pub error_message: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::documents::Entity",
        from = "Column::DocumentId",
        to = "super::documents::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Documents,
    #[sea_orm(has_many = "super::detection_job_models::Entity")]
    DetectionJobModels,
}

impl Related<super::documents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Documents.def()
    }
}

impl Related<super::detection_job_models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DetectionJobModels.def()
    }
}

impl Related<super::detection_models::Entity> for Entity {
    fn to() -> RelationDef {
        super::detection_job_models::Relation::DetectionModels.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::detection_job_models::Relation::DetectionJobs.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
