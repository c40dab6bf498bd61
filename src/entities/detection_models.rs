use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "detection_models")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub name: String,
    pub model_type: String,  // "pattern", "ml" or "hybrid"
    pub target_type: String, // sensitive type this model reports
    pub version: String,
    pub active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::detection_job_models::Entity")]
    DetectionJobModels,
}

impl Related<super::detection_job_models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DetectionJobModels.def()
    }
}

impl Related<super::detection_jobs::Entity> for Entity {
    fn to() -> RelationDef {
        super::detection_job_models::Relation::DetectionJobs.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::detection_job_models::Relation::DetectionModels.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
