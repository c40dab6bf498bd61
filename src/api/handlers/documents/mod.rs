pub mod download;
pub mod list;
pub mod manage;
pub mod types;
pub mod upload;

// Re-export all types
pub use types::*;

// Re-export all handlers
pub use download::{__path_download_document, download_document};
pub use list::{
    __path_document_scans, __path_get_document, __path_list_documents, document_scans,
    get_document, list_documents,
};
pub use manage::{
    __path_delete_document, __path_patch_document, __path_put_document, delete_document,
    patch_document, put_document,
};
pub use upload::{__path_upload_document, upload_document};
