//! Site-wide general settings.

use super::rules::{check_section, require_object};
use super::ValidationErrors;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

pub const SENSITIVE_FIELDS: &[&str] = &[];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneralSettings {
    #[validate(length(min = 1, max = 120, message = "must be 1 to 120 characters"))]
    pub site_title: String,
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub site_description: Option<String>,
    #[validate(url(message = "must be a valid URL"))]
    pub site_url: String,
    #[validate(email(message = "must be a valid email address"))]
    pub admin_email: String,
    /// IANA zone name, e.g. `Europe/Paris`
    #[validate(length(min = 1, message = "is required"))]
    pub timezone: String,
    #[validate(length(min = 2, max = 10, message = "must be a language tag"))]
    pub language: String,
    #[validate(
        required(message = "is required"),
        range(min = 1, max = 100, message = "must be between 1 and 100")
    )]
    pub posts_per_page: Option<i64>,
}

pub fn validate(raw: &Value) -> Result<GeneralSettings, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if !require_object(raw, &mut errors) {
        return errors.finish(None);
    }
    let settings = check_section(Some(raw), "", &mut errors);
    errors.finish(settings)
}
