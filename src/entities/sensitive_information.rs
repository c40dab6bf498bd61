use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sensitive_information")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub scan_id: String,
    #[sea_orm(column_name = "type")]
    pub info_type: String,
    pub confidence: f64,
    #[sea_orm(column_type = "Json", nullable)]
    pub location: Option<Json>,
    pub count: i32,
    pub redacted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::document_scans::Entity",
        from = "Column::ScanId",
        to = "super::document_scans::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    DocumentScans,
}

impl Related<super::document_scans::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DocumentScans.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
