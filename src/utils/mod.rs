pub mod auth;
pub mod keyed_mutex;
pub mod ordering;
pub mod validation;
