//! Content database connection settings.

use super::rules::{check_provider, check_section, require_object, ProviderId};
use super::ValidationErrors;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

pub const SENSITIVE_FIELDS: &[&str] = &["settings.password"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseProvider {
    Neon,
    Supabase,
    Postgres,
    Mysql,
}

impl ProviderId for DatabaseProvider {
    const ALL: &'static [Self] = &[Self::Neon, Self::Supabase, Self::Postgres, Self::Mysql];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Neon => "neon",
            Self::Supabase => "supabase",
            Self::Postgres => "postgres",
            Self::Mysql => "mysql",
        }
    }
}

impl DatabaseProvider {
    pub fn default_port(&self) -> u16 {
        match self {
            Self::Neon | Self::Supabase | Self::Postgres => 5432,
            Self::Mysql => 3306,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SslMode {
    Disable,
    Prefer,
    #[default]
    Require,
    VerifyFull,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct DatabaseConnection {
    #[validate(length(min = 1, max = 255, message = "is required"))]
    pub host: String,
    #[validate(range(min = 1, max = 65535, message = "must be between 1 and 65535"))]
    pub port: Option<i64>,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub database: Option<String>,
    #[validate(length(min = 1, message = "is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
    pub ssl_mode: SslMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseSettings {
    pub provider: DatabaseProvider,
    pub settings: DatabaseConnection,
}

impl DatabaseSettings {
    /// Port to connect to, falling back to the provider default
    pub fn port(&self) -> u16 {
        self.settings
            .port
            .and_then(|p| u16::try_from(p).ok())
            .unwrap_or_else(|| self.provider.default_port())
    }
}

pub fn validate(raw: &Value) -> Result<DatabaseSettings, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if !require_object(raw, &mut errors) {
        return errors.finish(None);
    }

    let provider = check_provider::<DatabaseProvider>(raw, &mut errors);
    let settings: Option<DatabaseConnection> =
        check_section(raw.get("settings"), "settings", &mut errors);

    let validated = match (provider, settings) {
        (Some(provider), Some(settings)) => Some(DatabaseSettings { provider, settings }),
        _ => None,
    };
    errors.finish(validated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_neon() {
        let settings = validate(&json!({
            "provider": "neon",
            "settings": {
                "host": "db.example.com",
                "username": "u",
                "password": "p",
                "sslMode": "require"
            }
        }))
        .unwrap();

        assert_eq!(settings.provider, DatabaseProvider::Neon);
        assert_eq!(settings.settings.ssl_mode, SslMode::Require);
        assert_eq!(settings.port(), 5432);
    }

    #[test]
    fn test_ssl_mode_defaults_and_spelling() {
        let settings = validate(&json!({
            "provider": "mysql",
            "settings": {"host": "h", "port": 3307, "username": "u", "password": "p"}
        }))
        .unwrap();
        assert_eq!(settings.settings.ssl_mode, SslMode::Require);
        assert_eq!(settings.port(), 3307);

        let wire = serde_json::to_value(&settings).unwrap();
        assert_eq!(wire["settings"]["sslMode"], "require");

        let verify = validate(&json!({
            "provider": "postgres",
            "settings": {"host": "h", "username": "u", "password": "p", "sslMode": "verify-full"}
        }))
        .unwrap();
        assert_eq!(verify.settings.ssl_mode, SslMode::VerifyFull);
    }

    #[test]
    fn test_missing_settings_and_provider() {
        let errors = validate(&json!({})).unwrap_err();
        for field in ["provider", "settings.host", "settings.username", "settings.password"] {
            assert!(errors.has_field(field), "missing error for {}", field);
        }
    }

    #[test]
    fn test_unknown_provider() {
        let errors = validate(&json!({
            "provider": "oracle",
            "settings": {"host": "h", "username": "u", "password": "p"}
        }))
        .unwrap_err();
        assert_eq!(errors.fields().len(), 1);
        assert_eq!(errors.fields()[0].field, "provider");
    }

    #[test]
    fn test_port_out_of_range_is_rejected_not_clamped() {
        let errors = validate(&json!({
            "provider": "postgres",
            "settings": {"host": "h", "port": 0, "username": "u", "password": "p"}
        }))
        .unwrap_err();
        assert!(errors.has_field("settings.port"));
    }

    #[test]
    fn test_bad_ssl_mode_named_at_field() {
        let errors = validate(&json!({
            "provider": "supabase",
            "settings": {"host": "h", "sslMode": "always"}
        }))
        .unwrap_err();
        assert!(errors.has_field("settings.sslMode"));
        assert!(errors.has_field("settings.username"));
        assert!(errors.has_field("settings.password"));
        assert!(!errors.has_field("settings"));
    }
}
