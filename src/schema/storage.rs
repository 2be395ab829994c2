//! Media storage settings: local disk, S3-compatible, or Cloudinary.

use super::rules::{check_provider, check_section, reject_foreign_sections, require_object, ProviderId};
use super::ValidationErrors;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

pub const SENSITIVE_FIELDS: &[&str] = &[
    "s3.accessKeyId",
    "s3.secretAccessKey",
    "cloudinary.apiKey",
    "cloudinary.apiSecret",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    Local,
    S3,
    Cloudinary,
}

impl ProviderId for StorageProvider {
    const ALL: &'static [Self] = &[Self::Local, Self::S3, Self::Cloudinary];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::S3 => "s3",
            Self::Cloudinary => "cloudinary",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct LocalStorageConfig {
    #[validate(length(min = 1, message = "is required"))]
    pub upload_dir: String,
    #[validate(url(message = "must be a valid URL"))]
    pub public_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct S3Config {
    #[validate(length(min = 3, max = 63, message = "must be 3 to 63 characters"))]
    pub bucket: String,
    #[validate(length(min = 1, message = "is required"))]
    pub region: String,
    #[validate(length(min = 1, message = "is required"))]
    pub access_key_id: String,
    #[validate(length(min = 1, message = "is required"))]
    pub secret_access_key: String,
    /// Custom endpoint for S3-compatible services
    #[validate(url(message = "must be a valid URL"))]
    pub endpoint: Option<String>,
    #[validate(url(message = "must be a valid URL"))]
    pub public_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct CloudinaryConfig {
    #[validate(length(min = 1, message = "is required"))]
    pub cloud_name: String,
    #[validate(length(min = 1, message = "is required"))]
    pub api_key: String,
    #[validate(length(min = 1, message = "is required"))]
    pub api_secret: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum StorageSettings {
    Local { local: LocalStorageConfig },
    S3 { s3: S3Config },
    Cloudinary { cloudinary: CloudinaryConfig },
}

impl StorageSettings {
    pub fn provider(&self) -> StorageProvider {
        match self {
            Self::Local { .. } => StorageProvider::Local,
            Self::S3 { .. } => StorageProvider::S3,
            Self::Cloudinary { .. } => StorageProvider::Cloudinary,
        }
    }
}

pub fn validate(raw: &Value) -> Result<StorageSettings, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if !require_object(raw, &mut errors) {
        return errors.finish(None);
    }

    let settings = check_provider::<StorageProvider>(raw, &mut errors).and_then(|provider| {
        reject_foreign_sections(raw, provider, &mut errors);
        let section = raw.get(provider.as_str());
        match provider {
            StorageProvider::Local => check_section(section, "local", &mut errors)
                .map(|local| StorageSettings::Local { local }),
            StorageProvider::S3 => {
                check_section(section, "s3", &mut errors).map(|s3| StorageSettings::S3 { s3 })
            }
            StorageProvider::Cloudinary => check_section(section, "cloudinary", &mut errors)
                .map(|cloudinary| StorageSettings::Cloudinary { cloudinary }),
        }
    });
    errors.finish(settings)
}
