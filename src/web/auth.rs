//! Bearer-token identity extraction.

use super::AppState;
use crate::db::{Role, SessionRepo};
use crate::error::AppError;
use crate::settings::Identity;
use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts};

/// Caller of a request. `None` when no credentials were sent.
///
/// A present but unknown or expired token is rejected with 401 rather
/// than downgraded to anonymous.
#[derive(Debug, Clone)]
pub struct Viewer(pub Option<Identity>);

impl Viewer {
    pub fn identity(&self) -> Option<&Identity> {
        self.0.as_ref()
    }
}

impl FromRequestParts<AppState> for Viewer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts)? else {
            return Ok(Viewer(None));
        };

        let session = SessionRepo::get_valid(&state.pool, &token)
            .await?
            .ok_or(AppError::AuthRequired)?;

        Ok(Viewer(Some(Identity::new(
            session.user_id,
            Role::from_str(&session.role),
        ))))
    }
}

fn bearer_token(parts: &Parts) -> Result<Option<String>, AppError> {
    let Some(header) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = header.to_str().map_err(|_| AppError::AuthRequired)?;
    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(Some(token.trim().to_string())),
        _ => Err(AppError::AuthRequired),
    }
}
