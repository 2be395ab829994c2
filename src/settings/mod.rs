//! Settings persistence and the category operations built on it.
//!
//! [`SettingsStore`] owns transparent encryption; [`SettingsService`]
//! adds validation, access checks, audit and the setup wizard.

pub mod access;
pub mod service;
pub mod setup;
pub mod store;

pub use access::{Identity, ReadScope};
pub use service::{kind_for, SettingsService};
pub use setup::{SetupStatus, SetupStep};
pub use store::{SettingsBackend, SettingsStore};
