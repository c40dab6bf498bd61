pub mod detection;
pub mod document_service;
pub mod share_service;
pub mod stats;
pub mod storage;
