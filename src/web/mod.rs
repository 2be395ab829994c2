pub mod auth;
pub mod routes;
pub mod settings;
pub mod setup;

use crate::db::DbPool;
use crate::settings::SettingsService;

pub use auth::Viewer;
pub use routes::create_router;

/// Shared state for every handler
#[derive(Clone)]
pub struct AppState {
    /// Sessions are resolved straight from the pool
    pub pool: DbPool,
    pub settings: SettingsService,
}
