//! Navigation menus. The only category readable without authentication.

use super::rules::{check_section, require_object};
use super::ValidationErrors;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use validator::Validate;

pub const SENSITIVE_FIELDS: &[&str] = &[];

pub const MAX_DEPTH_LIMIT: i64 = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct MenuItem {
    #[validate(length(min = 1, max = 80, message = "must be 1 to 80 characters"))]
    pub label: String,
    /// Absolute URL or site-relative path
    #[validate(length(min = 1, message = "is required"))]
    pub url: String,
    pub open_in_new_tab: bool,
    #[validate(nested)]
    pub children: Vec<MenuItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct Menu {
    #[validate(length(min = 1, message = "is required"))]
    pub name: String,
    /// Theme slot, e.g. `header` or `footer`
    #[validate(length(min = 1, message = "is required"))]
    pub location: String,
    #[validate(nested)]
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct MenusSettings {
    #[validate(
        required(message = "is required"),
        range(min = 1, max = 5, message = "must be between 1 and 5")
    )]
    pub max_depth: Option<i64>,
    #[validate(nested)]
    pub menus: Vec<Menu>,
}

pub fn validate(raw: &Value) -> Result<MenusSettings, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if !require_object(raw, &mut errors) {
        return errors.finish(None);
    }

    let settings = check_section(Some(raw), "", &mut errors);
    check_structure(raw, &mut errors);
    errors.finish(settings)
}

/// Rules that span items: nesting depth and unique locations.
fn check_structure(raw: &Value, errors: &mut ValidationErrors) {
    let max_depth = raw
        .get("maxDepth")
        .and_then(Value::as_i64)
        .filter(|d| (1..=MAX_DEPTH_LIMIT).contains(d));
    let Some(menus) = raw.get("menus").and_then(Value::as_array) else {
        return;
    };

    let mut locations = HashSet::new();
    for (i, menu) in menus.iter().enumerate() {
        let path = format!("menus[{}]", i);
        if let Some(location) = menu.get("location").and_then(Value::as_str) {
            if !location.is_empty() && !locations.insert(location) {
                errors.push(format!("{}.location", path), "duplicate menu location");
            }
        }
        if let (Some(limit), Some(items)) = (max_depth, menu.get("items")) {
            check_depth(items, &format!("{}.items", path), 1, limit, errors);
        }
    }
}

fn check_depth(items: &Value, path: &str, depth: i64, limit: i64, errors: &mut ValidationErrors) {
    let Some(items) = items.as_array() else {
        return;
    };
    for (i, item) in items.iter().enumerate() {
        let item_path = format!("{}[{}]", path, i);
        if depth > limit {
            errors.push(item_path, format!("nesting exceeds maxDepth of {}", limit));
            continue;
        }
        if let Some(children) = item.get("children") {
            check_depth(children, &format!("{}.children", item_path), depth + 1, limit, errors);
        }
    }
}
