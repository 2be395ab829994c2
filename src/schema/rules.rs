//! Shared validation plumbing for the category schemas.

use super::{FieldError, ValidationErrors};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use validator::{Validate, ValidationErrorsKind};

/// Identifier set of one provider family.
pub trait ProviderId: Copy + 'static {
    /// Every known provider, in display order.
    const ALL: &'static [Self];

    fn as_str(&self) -> &'static str;

    fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.as_str() == s)
    }
}

/// Join a parent path and a field name.
pub(crate) fn join(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}

/// `api_key` -> `apiKey`, matching the wire names.
pub(crate) fn to_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Payload must be a JSON object; anything else is reported once.
pub(crate) fn require_object(raw: &Value, errors: &mut ValidationErrors) -> bool {
    if raw.is_object() {
        true
    } else {
        errors.push("", "must be a JSON object");
        false
    }
}

/// Read and check the `provider` discriminator.
pub(crate) fn check_provider<P: ProviderId>(
    raw: &Value,
    errors: &mut ValidationErrors,
) -> Option<P> {
    match raw.get("provider") {
        None | Some(Value::Null) => {
            errors.push("provider", "is required");
            None
        }
        Some(Value::String(name)) if name.is_empty() => {
            errors.push("provider", "is required");
            None
        }
        Some(Value::String(name)) => {
            let provider = P::parse(name);
            if provider.is_none() {
                let known: Vec<&str> = P::ALL.iter().map(|p| p.as_str()).collect();
                errors.push(
                    "provider",
                    format!("unknown provider '{}'; expected one of: {}", name, known.join(", ")),
                );
            }
            provider
        }
        Some(_) => {
            errors.push("provider", "must be a string");
            None
        }
    }
}

/// Sub-objects that belong to a provider other than the selected one are rejected.
pub(crate) fn reject_foreign_sections<P: ProviderId + PartialEq>(
    raw: &Value,
    selected: P,
    errors: &mut ValidationErrors,
) {
    for other in P::ALL.iter().filter(|p| **p != selected) {
        if raw.get(other.as_str()).is_some_and(|v| !v.is_null()) {
            errors.push(
                other.as_str(),
                format!("must not be set when provider is '{}'", selected.as_str()),
            );
        }
    }
}

/// Deserialize one section and run its field rules, reporting under `prefix`.
///
/// A missing or null section is checked as an empty object so that every
/// required field gets named. A field of the wrong JSON type is reported at
/// its own path and left out, so the rules for its siblings still run.
pub(crate) fn check_section<T>(
    raw: Option<&Value>,
    prefix: &str,
    errors: &mut ValidationErrors,
) -> Option<T>
where
    T: DeserializeOwned + Validate,
{
    let empty = Map::new();
    let fields = match raw {
        None | Some(Value::Null) => &empty,
        Some(Value::Object(fields)) => fields,
        Some(_) => {
            errors.push(prefix, "must be an object");
            return None;
        }
    };

    let mut usable = fields.clone();
    let mut mistyped = Vec::new();
    for (name, value) in fields {
        let single: Map<String, Value> = [(name.clone(), value.clone())].into_iter().collect();
        if let Err(e) = T::deserialize(&Value::Object(single)) {
            let path = join(prefix, name);
            errors.push(path.clone(), format!("invalid value: {}", e));
            usable.remove(name);
            mistyped.push(path);
        }
    }

    let section = match T::deserialize(&Value::Object(usable)) {
        Ok(section) => section,
        Err(e) => {
            errors.push(prefix, format!("invalid value: {}", e));
            return None;
        }
    };

    let valid = match section.validate() {
        Ok(()) => true,
        Err(violations) => {
            let mut found = ValidationErrors::default();
            collect(prefix, &violations, &mut found);
            for error in found.fields() {
                if !mistyped.iter().any(|path| covers(path, &error.field)) {
                    errors.push(error.field.clone(), error.message.clone());
                }
            }
            false
        }
    };

    (valid && mistyped.is_empty()).then_some(section)
}

/// Whether `field` is `path` itself or lies beneath it.
fn covers(path: &str, field: &str) -> bool {
    match field.strip_prefix(path) {
        Some(rest) => rest.is_empty() || rest.starts_with('.') || rest.starts_with('['),
        None => false,
    }
}

/// Flatten validator's nested error tree into dotted paths.
fn collect(prefix: &str, violations: &validator::ValidationErrors, errors: &mut ValidationErrors) {
    for (field, kind) in violations.errors() {
        let path = join(prefix, &to_camel_case(&field.to_string()));
        match kind {
            ValidationErrorsKind::Field(list) => {
                for error in list {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("failed '{}' check", error.code));
                    errors.push(path.clone(), message);
                }
            }
            ValidationErrorsKind::Struct(inner) => collect(&path, inner, errors),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(&format!("{}[{}]", path, index), inner, errors);
                }
            }
        }
    }
}

impl From<Vec<FieldError>> for ValidationErrors {
    fn from(fields: Vec<FieldError>) -> Self {
        let mut errors = Self::default();
        for field in fields {
            errors.push(field.field, field.message);
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize, Validate)]
    #[serde(default, rename_all = "camelCase")]
    struct Sample {
        #[validate(length(min = 1, message = "is required"))]
        api_key: String,
        #[validate(required(message = "is required"), range(min = 1, max = 10, message = "must be between 1 and 10"))]
        count: Option<i64>,
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(to_camel_case("api_key"), "apiKey");
        assert_eq!(to_camel_case("secret_access_key"), "secretAccessKey");
        assert_eq!(to_camel_case("host"), "host");
        assert_eq!(to_camel_case("apiKey"), "apiKey");
    }

    #[test]
    fn test_missing_section_names_every_field() {
        let mut errors = ValidationErrors::default();
        let section: Option<Sample> = check_section(None, "sendgrid", &mut errors);
        assert!(section.is_none());
        assert!(errors.has_field("sendgrid.apiKey"));
        assert!(errors.has_field("sendgrid.count"));
    }

    #[test]
    fn test_range_is_inclusive() {
        let mut errors = ValidationErrors::default();
        let ok: Option<Sample> =
            check_section(Some(&json!({"apiKey": "k", "count": 10})), "s", &mut errors);
        assert!(ok.is_some());
        assert!(errors.is_empty());

        let too_big: Option<Sample> =
            check_section(Some(&json!({"apiKey": "k", "count": 11})), "s", &mut errors);
        assert!(too_big.is_none());
        assert_eq!(errors.fields()[0].message, "must be between 1 and 10");
    }

    #[test]
    fn test_type_mismatch_keeps_sibling_rules() {
        let mut errors = ValidationErrors::default();
        let section: Option<Sample> =
            check_section(Some(&json!({"count": "many"})), "s", &mut errors);
        assert!(section.is_none());

        let fields: Vec<&str> = errors.fields().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["s.count", "s.apiKey"]);
        assert!(errors.fields()[0].message.starts_with("invalid value"));
    }

    #[test]
    fn test_non_object_section_rejected() {
        let mut errors = ValidationErrors::default();
        let section: Option<Sample> = check_section(Some(&json!([1, 2])), "s", &mut errors);
        assert!(section.is_none());
        assert!(errors.has_field("s"));
    }

    #[test]
    fn test_covers() {
        assert!(covers("menus", "menus"));
        assert!(covers("menus", "menus[0].label"));
        assert!(covers("smtp", "smtp.port"));
        assert!(!covers("smtp", "smtpHost"));
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Fruit {
        Apple,
    }

    impl ProviderId for Fruit {
        const ALL: &'static [Self] = &[Self::Apple];

        fn as_str(&self) -> &'static str {
            "apple"
        }
    }

    #[test]
    fn test_provider_messages() {
        let mut errors = ValidationErrors::default();
        assert_eq!(check_provider::<Fruit>(&json!({"provider": "apple"}), &mut errors), Some(Fruit::Apple));
        assert!(errors.is_empty());

        check_provider::<Fruit>(&json!({"provider": 5}), &mut errors);
        check_provider::<Fruit>(&json!({}), &mut errors);
        let messages: Vec<&str> = errors.fields().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["must be a string", "is required"]);
    }
}
