use crate::entities::{
    detection_job_models, detection_jobs, detection_models, document_scans, documents,
    sensitive_information, share_links, users,
};
use anyhow::Context;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm::{ConnectionTrait, Schema};
use std::env;
use std::time::Duration;
use tracing::info;

pub async fn setup_database() -> anyhow::Result<DatabaseConnection> {
    let db_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    info!("📂 Database: {}", db_url);

    let mut opt = ConnectOptions::new(&db_url);
    opt.max_connections(100)
        .min_connections(5)
        .connect_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    let db = Database::connect(opt).await?;

    info!("✅ Database connected successfully");

    run_migrations(&db).await?;
    crate::infrastructure::seed::seed_detection_models(&db).await?;

    Ok(db)
}

pub async fn run_migrations(db: &DatabaseConnection) -> anyhow::Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    info!("🔄 Running auto-migrations...");

    // Order matters for foreign keys: Users -> Documents -> Scans -> Items, Jobs -> JobModels
    let stmts = vec![
        (
            "users",
            schema
                .create_table_from_entity(users::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "documents",
            schema
                .create_table_from_entity(documents::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "document_scans",
            schema
                .create_table_from_entity(document_scans::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "sensitive_information",
            schema
                .create_table_from_entity(sensitive_information::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "detection_models",
            schema
                .create_table_from_entity(detection_models::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "detection_jobs",
            schema
                .create_table_from_entity(detection_jobs::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "detection_job_models",
            schema
                .create_table_from_entity(detection_job_models::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "share_links",
            schema
                .create_table_from_entity(share_links::Entity)
                .if_not_exists()
                .to_owned(),
        ),
    ];

    for (name, stmt) in stmts {
        let stmt = builder.build(&stmt);
        db.execute(stmt)
            .await
            .with_context(|| format!("Failed to create table '{}'", name))?;
        info!("   - Table '{}' checked/created", name);
    }

    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_documents_user_id ON documents(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_documents_created_at ON documents(created_at)",
        "CREATE INDEX IF NOT EXISTS idx_document_scans_document_id ON document_scans(document_id)",
        "CREATE INDEX IF NOT EXISTS idx_sensitive_information_scan_id ON sensitive_information(scan_id)",
        "CREATE INDEX IF NOT EXISTS idx_detection_jobs_document_id ON detection_jobs(document_id)",
    ];

    for query in indexes {
        match db
            .execute(sea_orm::Statement::from_string(builder, query.to_owned()))
            .await
        {
            Ok(_) => tracing::debug!("   - Executed schema update: {}", query),
            Err(e) => tracing::warn!("   - Schema update warning: {} -> {}", query, e),
        }
    }

    Ok(())
}
