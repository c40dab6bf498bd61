pub mod analysis;
pub mod auth;
pub mod detection;
pub mod documents;
pub mod health;
pub mod scans;
pub mod shares;
pub mod users;
