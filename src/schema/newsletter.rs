//! Newsletter delivery settings.

use super::rules::{check_section, require_object};
use super::ValidationErrors;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

pub const SENSITIVE_FIELDS: &[&str] = &[];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct NewsletterSettings {
    pub enabled: bool,
    #[validate(length(min = 1, max = 100, message = "must be 1 to 100 characters"))]
    pub sender_name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub reply_to: Option<String>,
    /// Recipients per delivery batch
    #[validate(
        required(message = "is required"),
        range(min = 1, max = 1000, message = "must be between 1 and 1000")
    )]
    pub batch_size: Option<i64>,
    #[validate(
        required(message = "is required"),
        range(min = 0, max = 5, message = "must be between 0 and 5")
    )]
    pub retry_attempts: Option<i64>,
    pub double_opt_in: bool,
}

pub fn validate(raw: &Value) -> Result<NewsletterSettings, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if !require_object(raw, &mut errors) {
        return errors.finish(None);
    }
    let settings = check_section(Some(raw), "", &mut errors);
    errors.finish(settings)
}
