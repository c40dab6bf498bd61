use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "document_scans")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub document_id: String,
    pub scan_date: DateTimeUtc,
    pub risk_level: String, // "low", "medium" or "high"
    /// Seconds spent analysing the document
    pub processing_time: f64,
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
    #[sea_orm(has_many = "super::sensitive_information::Entity")]
    SensitiveInformation,
}

impl Related<super::documents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Documents.def()
    }
}

impl Related<super::sensitive_information::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SensitiveInformation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
