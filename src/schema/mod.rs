//! Typed, validated shapes for every settings category.
//!
//! Each category module exposes a `validate(&Value)` that returns the typed
//! configuration or every field violation at once, plus the explicit list
//! of sensitive field paths for that category. Provider families (email,
//! storage, search, database) are tagged enums matched exhaustively.

pub mod database;
pub mod email;
pub mod general;
pub mod menus;
pub mod newsletter;
mod rules;
pub mod search;
pub mod storage;

pub use rules::ProviderId;

use serde::Serialize;
use serde_json::Value;

/// One field-level violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Dotted camelCase path, e.g. `smtp.host`; empty for the payload itself
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every violation found in one payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn push<F: Into<String>, M: Into<String>>(&mut self, field: F, message: M) {
        self.0.push(FieldError::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// `Ok(value)` if nothing was collected, otherwise the sorted violations.
    pub(crate) fn finish<T>(mut self, value: Option<T>) -> Result<T, Self> {
        match value {
            Some(value) if self.is_empty() => Ok(value),
            Some(_) | None => {
                if self.is_empty() {
                    self.push("", "invalid payload");
                }
                self.0.sort_by(|a, b| a.field.cmp(&b.field));
                Err(self)
            }
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| {
                if e.field.is_empty() {
                    e.message.clone()
                } else {
                    format!("{}: {}", e.field, e.message)
                }
            })
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Settings category addressed by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    General,
    Database,
    Email,
    Newsletter,
    Storage,
    Search,
    Menus,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Self::General,
        Self::Database,
        Self::Email,
        Self::Newsletter,
        Self::Storage,
        Self::Search,
        Self::Menus,
    ];

    /// Storage key of the category
    pub fn key(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Database => "database",
            Self::Email => "email",
            Self::Newsletter => "newsletter",
            Self::Storage => "storage",
            Self::Search => "search",
            Self::Menus => "menus",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.key() == key)
    }

    /// Field paths holding credentials
    pub fn sensitive_fields(&self) -> &'static [&'static str] {
        match self {
            Self::General => general::SENSITIVE_FIELDS,
            Self::Database => database::SENSITIVE_FIELDS,
            Self::Email => email::SENSITIVE_FIELDS,
            Self::Newsletter => newsletter::SENSITIVE_FIELDS,
            Self::Storage => storage::SENSITIVE_FIELDS,
            Self::Search => search::SENSITIVE_FIELDS,
            Self::Menus => menus::SENSITIVE_FIELDS,
        }
    }

    pub fn has_secrets(&self) -> bool {
        !self.sensitive_fields().is_empty()
    }

    /// Readable without authentication
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Menus)
    }

    /// Validate a raw payload and return its canonical JSON form.
    ///
    /// Unknown fields are dropped from the canonical form.
    pub fn validate(&self, raw: &Value) -> Result<Value, ValidationErrors> {
        match self {
            Self::General => canonical(general::validate(raw)),
            Self::Database => canonical(database::validate(raw)),
            Self::Email => canonical(email::validate(raw)),
            Self::Newsletter => canonical(newsletter::validate(raw)),
            Self::Storage => canonical(storage::validate(raw)),
            Self::Search => canonical(search::validate(raw)),
            Self::Menus => canonical(menus::validate(raw)),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

fn canonical<T: Serialize>(validated: Result<T, ValidationErrors>) -> Result<Value, ValidationErrors> {
    let typed = validated?;
    serde_json::to_value(typed).map_err(|e| {
        let mut errors = ValidationErrors::default();
        errors.push("", format!("could not encode settings: {}", e));
        errors
    })
}

/// Copy of `value` with every path in `paths` removed.
pub fn redact(value: &Value, paths: &[&str]) -> Value {
    let mut out = value.clone();
    for path in paths {
        remove_path(&mut out, path);
    }
    out
}

fn remove_path(value: &mut Value, path: &str) {
    match path.split_once('.') {
        Some((head, rest)) => {
            if let Some(child) = value.get_mut(head) {
                remove_path(child, rest);
            }
        }
        None => {
            if let Some(fields) = value.as_object_mut() {
                fields.remove(path);
            }
        }
    }
}
