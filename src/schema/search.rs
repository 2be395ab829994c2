//! Site search settings: Algolia or Meilisearch.

use super::rules::{check_provider, check_section, reject_foreign_sections, require_object, ProviderId};
use super::ValidationErrors;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

pub const SENSITIVE_FIELDS: &[&str] = &["algolia.adminApiKey", "meilisearch.apiKey"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchProvider {
    Algolia,
    Meilisearch,
}

impl ProviderId for SearchProvider {
    const ALL: &'static [Self] = &[Self::Algolia, Self::Meilisearch];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Algolia => "algolia",
            Self::Meilisearch => "meilisearch",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct AlgoliaConfig {
    #[validate(length(min = 1, message = "is required"))]
    pub app_id: String,
    #[validate(length(min = 1, message = "is required"))]
    pub admin_api_key: String,
    /// Search-only key, safe to hand to browsers
    #[validate(length(min = 1, message = "is required"))]
    pub search_api_key: String,
    #[validate(length(min = 1, message = "is required"))]
    pub index_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct MeilisearchConfig {
    #[validate(url(message = "must be a valid URL"))]
    pub host: String,
    #[validate(length(min = 1, message = "is required"))]
    pub api_key: String,
    #[validate(length(min = 1, message = "is required"))]
    pub index_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum SearchSettings {
    Algolia { algolia: AlgoliaConfig },
    Meilisearch { meilisearch: MeilisearchConfig },
}

impl SearchSettings {
    pub fn provider(&self) -> SearchProvider {
        match self {
            Self::Algolia { .. } => SearchProvider::Algolia,
            Self::Meilisearch { .. } => SearchProvider::Meilisearch,
        }
    }

    pub fn index_name(&self) -> &str {
        match self {
            Self::Algolia { algolia } => &algolia.index_name,
            Self::Meilisearch { meilisearch } => &meilisearch.index_name,
        }
    }
}

pub fn validate(raw: &Value) -> Result<SearchSettings, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if !require_object(raw, &mut errors) {
        return errors.finish(None);
    }

    let settings = check_provider::<SearchProvider>(raw, &mut errors).and_then(|provider| {
        reject_foreign_sections(raw, provider, &mut errors);
        let section = raw.get(provider.as_str());
        match provider {
            SearchProvider::Algolia => check_section(section, "algolia", &mut errors)
                .map(|algolia| SearchSettings::Algolia { algolia }),
            SearchProvider::Meilisearch => check_section(section, "meilisearch", &mut errors)
                .map(|meilisearch| SearchSettings::Meilisearch { meilisearch }),
        }
    });
    errors.finish(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_meilisearch() {
        let settings = validate(&json!({
            "provider": "meilisearch",
            "meilisearch": {"host": "http://search:7700", "apiKey": "master", "indexName": "posts"}
        }))
        .unwrap();
        assert_eq!(settings.provider(), SearchProvider::Meilisearch);
        assert_eq!(settings.index_name(), "posts");
    }

    #[test]
    fn test_algolia_collects_all_missing() {
        let errors = validate(&json!({"provider": "algolia", "algolia": {}})).unwrap_err();
        assert_eq!(errors.fields().len(), 4);
        assert!(errors.has_field("algolia.adminApiKey"));
        assert!(errors.has_field("algolia.searchApiKey"));
    }

    #[test]
    fn test_meilisearch_host_must_be_url() {
        let errors = validate(&json!({
            "provider": "meilisearch",
            "meilisearch": {"host": "search", "apiKey": "k", "indexName": "posts"}
        }))
        .unwrap_err();
        assert!(errors.has_field("meilisearch.host"));
    }
}
