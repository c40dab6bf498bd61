use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub title: String,
    /// Object storage key of the uploaded blob
    pub file: String,
    pub file_type: String, // see models::FileType
    pub processed: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Users,
    #[sea_orm(has_many = "super::document_scans::Entity")]
    DocumentScans,
    #[sea_orm(has_many = "super::detection_jobs::Entity")]
    DetectionJobs,
    #[sea_orm(has_many = "super::share_links::Entity")]
    ShareLinks,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::document_scans::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DocumentScans.def()
    }
}

impl Related<super::detection_jobs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DetectionJobs.def()
    }
}

impl Related<super::share_links::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShareLinks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
