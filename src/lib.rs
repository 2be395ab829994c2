pub mod audit;
pub mod config;
pub mod db;
pub mod error;
pub mod schema;
pub mod secrets;
pub mod settings;
pub mod web;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
