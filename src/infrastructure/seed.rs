use crate::entities::{detection_models, prelude::*};
use crate::models::{ModelType, SensitiveType};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::info;
use uuid::Uuid;

/// Current revision of the built-in regex detectors
pub const PATTERN_MODEL_VERSION: &str = "1.0.0";

/// Registers one pattern model per built-in detector. Existing rows are left alone,
/// so an operator can deactivate a model and keep it that way across restarts.
pub async fn seed_detection_models(db: &DatabaseConnection) -> anyhow::Result<()> {
    info!("🌱 Seeding detection models...");

    for target in SensitiveType::DETECTABLE {
        let name = format!("{} Pattern", target.display_name());

        let exists = DetectionModels::find()
            .filter(detection_models::Column::Name.eq(&name))
            .one(db)
            .await?;

        if exists.is_none() {
            let now = Utc::now();
            let model = detection_models::ActiveModel {
                id: Set(Uuid::new_v4().to_string()),
                name: Set(name.clone()),
                model_type: Set(ModelType::Pattern.as_str().to_string()),
                target_type: Set(target.as_str().to_string()),
                version: Set(PATTERN_MODEL_VERSION.to_string()),
                active: Set(true),
                created_at: Set(now),
                updated_at: Set(now),
            };
            model.insert(db).await?;
            info!("   - Registered detection model '{}'", name);
        }
    }

    Ok(())
}
