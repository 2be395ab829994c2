use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Storage classification of a setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingKind {
    /// Persisted as plaintext JSON
    General,
    /// Every string leaf persisted as an encrypted token
    Security,
}

impl SettingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Security => "security",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "general" => Some(Self::General),
            "security" => Some(Self::Security),
            _ => None,
        }
    }
}

impl std::fmt::Display for SettingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw settings row as stored in SQLite
#[derive(Debug, Clone, FromRow)]
pub struct SettingRow {
    pub id: i64,
    pub key: String,
    pub value: String, // JSON document
    pub kind: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A setting with its value parsed.
///
/// For security-kind settings `value` holds whatever layer produced it:
/// tokens when read from the backend, plaintext once the store has decrypted it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    pub key: String,
    pub value: serde_json::Value,
    pub kind: SettingKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<SettingRow> for Setting {
    type Error = String;

    fn try_from(row: SettingRow) -> Result<Self, Self::Error> {
        let kind = SettingKind::parse(&row.kind)
            .ok_or_else(|| format!("setting '{}' has unknown kind '{}'", row.key, row.kind))?;
        let value = serde_json::from_str(&row.value)
            .map_err(|e| format!("setting '{}' holds invalid JSON: {}", row.key, e))?;

        Ok(Self {
            key: row.key,
            value,
            kind,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Filter for listing settings
#[derive(Debug, Clone, Default)]
pub struct SettingFilter {
    pub kind: Option<SettingKind>,
    pub key_prefix: Option<String>,
}

impl SettingFilter {
    pub fn kind(kind: SettingKind) -> Self {
        Self {
            kind: Some(kind),
            key_prefix: None,
        }
    }

    pub fn prefix<S: Into<String>>(prefix: S) -> Self {
        Self {
            kind: None,
            key_prefix: Some(prefix.into()),
        }
    }
}

/// Audit log row
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: String,
    pub actor: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: String,
    pub metadata: String, // JSON object
    pub created_at: DateTime<Utc>,
}

/// New audit entry to record
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub actor: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: String,
    pub metadata: serde_json::Value,
}

impl AuditEntry {
    /// Entry for an action on a settings category. Never carries the payload.
    pub fn setting(actor: &str, action: &str, key: &str) -> Self {
        Self {
            actor: actor.to_string(),
            action: action.to_string(),
            entity_type: "setting".to_string(),
            entity_id: key.to_string(),
            metadata: serde_json::json!({ "category": key }),
        }
    }

    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }
}

/// Session issued by the external identity provider
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub token: String,
    pub user_id: String,
    pub role: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// New session (written by the identity provider, or by tests)
#[derive(Debug, Clone)]
pub struct NewSession {
    pub token: String,
    pub user_id: String,
    pub role: Role,
}

/// Back-office role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
    Author,
    Subscriber,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::Author => "author",
            Self::Subscriber => "subscriber",
        }
    }

    /// Unknown role names get the least privilege.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "admin" => Self::Admin,
            "editor" => Self::Editor,
            "author" => Self::Author,
            _ => Self::Subscriber,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
