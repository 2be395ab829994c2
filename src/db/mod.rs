pub mod models;
pub mod queries;

pub use models::*;
pub use queries::{init_db, AuditRepo, DbPool, SessionRepo, SqliteSettingsRepo};

#[cfg(test)]
pub use queries::setup_test_db;
