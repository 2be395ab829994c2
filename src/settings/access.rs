//! Who may read or change which category.

use crate::db::Role;
use crate::error::{AppError, AppResult};
use crate::schema::Category;
use serde::Serialize;

/// Caller resolved by the identity collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub user_id: String,
    pub role: Role,
}

impl Identity {
    pub fn new<S: Into<String>>(user_id: S, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// How much of a category the caller gets to see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadScope {
    Full,
    /// Sensitive fields omitted
    Redacted,
}

pub fn authorize_read(category: Category, viewer: Option<&Identity>) -> AppResult<ReadScope> {
    match viewer {
        Some(identity) if identity.is_admin() => Ok(ReadScope::Full),
        _ if category.is_public() => Ok(ReadScope::Redacted),
        Some(_) => Err(AppError::Forbidden),
        None => Err(AppError::AuthRequired),
    }
}

/// Every mutation needs an admin.
pub fn authorize_write(actor: Option<&Identity>) -> AppResult<&Identity> {
    match actor {
        Some(identity) if identity.is_admin() => Ok(identity),
        Some(_) => Err(AppError::Forbidden),
        None => Err(AppError::AuthRequired),
    }
}
