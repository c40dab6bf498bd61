pub mod prelude;

pub mod detection_job_models;
pub mod detection_jobs;
pub mod detection_models;
pub mod document_scans;
pub mod documents;
pub mod sensitive_information;
pub mod share_links;
pub mod users;
