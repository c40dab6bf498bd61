pub use super::detection_job_models::Entity as DetectionJobModels;
pub use super::detection_jobs::Entity as DetectionJobs;
pub use super::detection_models::Entity as DetectionModels;
pub use super::document_scans::Entity as DocumentScans;
pub use super::documents::Entity as Documents;
pub use super::sensitive_information::Entity as SensitiveInformation;
pub use super::share_links::Entity as ShareLinks;
pub use super::users::Entity as Users;
