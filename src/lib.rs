pub mod api;
pub mod config;
pub mod entities;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;

use crate::config::AppConfig;
use crate::services::detection::DetectionService;
use crate::services::document_service::DocumentService;
use crate::services::storage::StorageService;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::auth::register,
        api::handlers::auth::login,
        api::handlers::users::get_profile,
        api::handlers::users::update_profile,
        api::handlers::users::get_stats,
        api::handlers::users::reset_stats,
        api::handlers::documents::list_documents,
        api::handlers::documents::upload_document,
        api::handlers::documents::get_document,
        api::handlers::documents::patch_document,
        api::handlers::documents::put_document,
        api::handlers::documents::delete_document,
        api::handlers::documents::document_scans,
        api::handlers::documents::download_document,
        api::handlers::scans::list_scans,
        api::handlers::scans::get_scan,
        api::handlers::analysis::analyze,
        api::handlers::detection::list_models,
        api::handlers::detection::get_model,
        api::handlers::detection::list_jobs,
        api::handlers::detection::get_job,
        api::handlers::shares::create_share,
        api::handlers::shares::get_shared_document,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            api::handlers::auth::RegisterRequest,
            api::handlers::auth::LoginRequest,
            api::handlers::auth::LoginResponse,
            api::handlers::users::UserProfileResponse,
            api::handlers::users::UpdateProfileRequest,
            services::stats::UserStats,
            api::handlers::documents::DocumentResponse,
            api::handlers::documents::DocumentDetailResponse,
            api::handlers::documents::PatchDocumentRequest,
            api::handlers::documents::PutDocumentRequest,
            api::handlers::documents::ScanResponse,
            api::handlers::documents::SensitiveItemResponse,
            api::handlers::analysis::AnalyzeRequest,
            api::handlers::analysis::MlAnalysisPayload,
            api::handlers::analysis::MlSensitiveItem,
            api::handlers::analysis::AnalysisResponse,
            api::handlers::analysis::MlAnalysisResponse,
            api::handlers::detection::DetectionModelResponse,
            api::handlers::detection::DetectionJobResponse,
            api::handlers::shares::CreateShareRequest,
            api::handlers::shares::ShareLinkResponse,
            api::handlers::health::HealthResponse,
            models::FileType,
            models::SensitiveType,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Authentication and profile endpoints"),
        (name = "documents", description = "Document management endpoints"),
        (name = "scans", description = "Scan results"),
        (name = "detection", description = "Sensitive data analysis"),
        (name = "shares", description = "Public share links"),
        (name = "system", description = "Service health")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "jwt",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub storage: Arc<dyn StorageService>,
    pub document_service: Arc<DocumentService>,
    pub detection_service: Arc<DetectionService>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(db: DatabaseConnection, storage: Arc<dyn StorageService>, config: AppConfig) -> Self {
        let document_service = Arc::new(DocumentService::new(
            db.clone(),
            storage.clone(),
            config.clone(),
        ));
        let detection_service = Arc::new(DetectionService::new(
            db.clone(),
            storage.clone(),
            document_service.clone(),
        ));

        Self {
            db,
            storage,
            document_service,
            detection_service,
            config,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    use api::handlers::{analysis, auth, detection, documents, health, scans, shares, users};

    let protected = Router::new()
        .route(
            "/auth/profile",
            get(users::get_profile).patch(users::update_profile),
        )
        .route(
            "/auth/profile/stats",
            get(users::get_stats).delete(users::reset_stats),
        )
        .route(
            "/documents",
            get(documents::list_documents).post(documents::upload_document),
        )
        .route(
            "/documents/:id",
            get(documents::get_document)
                .patch(documents::patch_document)
                .put(documents::put_document)
                .delete(documents::delete_document),
        )
        .route("/documents/:id/scans", get(documents::document_scans))
        .route("/documents/:id/file", get(documents::download_document))
        .route("/documents/:id/share", post(shares::create_share))
        .route("/scans", get(scans::list_scans))
        .route("/scans/:id", get(scans::get_scan))
        .route("/analysis", post(analysis::analyze))
        .route("/detection/models", get(detection::list_models))
        .route("/detection/models/:id", get(detection::get_model))
        .route("/detection/jobs", get(detection::list_jobs))
        .route("/detection/jobs/:id", get(detection::get_job))
        .route_layer(from_fn_with_state(
            state.clone(),
            api::middleware::auth::auth_middleware,
        ));

    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health::health_check))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/shared/:token", get(shares::get_shared_document))
        .merge(protected)
        .layer(from_fn(api::middleware::metrics::metrics_middleware))
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
        )
        .layer(axum::extract::DefaultBodyLimit::max(
            state.config.max_file_size + 10 * 1024 * 1024, // Add 10MB buffer for multipart overhead
        ))
        .with_state(state)
}
