use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub email: Option<String>,
    pub name: Option<String>,
    // Usage counters, only ever moved by UserStatsService
    #[sea_orm(default_value = 0)]
    pub total_documents_saved: i64,
    #[sea_orm(default_value = 0)]
    pub total_documents_processed: i64,
    #[sea_orm(default_value = 0)]
    pub total_documents_shared: i64,
    #[sea_orm(default_value = 0)]
    pub total_sensitive_items_detected: i64,
    #[sea_orm(default_value = 0)]
    pub total_non_detected_items: i64,
    pub created_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::documents::Entity")]
    Documents,
}

impl Related<super::documents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Documents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
