use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "detection_job_models")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub job_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub model_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::detection_jobs::Entity",
        from = "Column::JobId",
        to = "super::detection_jobs::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    DetectionJobs,
    #[sea_orm(
        belongs_to = "super::detection_models::Entity",
        from = "Column::ModelId",
        to = "super::detection_models::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    DetectionModels,
}

impl Related<super::detection_jobs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DetectionJobs.def()
    }
}

impl Related<super::detection_models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DetectionModels.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
