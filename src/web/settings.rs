//! Handlers for `/api/settings`.

use super::{AppState, Viewer};
use crate::db::Setting;
use crate::error::{AppError, AppResult};
use crate::schema::Category;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{Map, Value};

fn parse_category(key: &str) -> AppResult<Category> {
    Category::from_key(key)
        .ok_or_else(|| AppError::not_found(format!("settings category '{}'", key)))
}

/// Handler: GET /api/settings
pub async fn list_settings(
    State(state): State<AppState>,
    viewer: Viewer,
) -> AppResult<Json<Vec<Setting>>> {
    Ok(Json(state.settings.list(viewer.identity()).await?))
}

/// Handler: GET /api/settings/public
pub async fn public_settings(State(state): State<AppState>) -> AppResult<Json<Map<String, Value>>> {
    Ok(Json(state.settings.public_settings().await?))
}

/// Handler: GET /api/settings/{category}
pub async fn get_category(
    State(state): State<AppState>,
    Path(key): Path<String>,
    viewer: Viewer,
) -> AppResult<Json<Value>> {
    let category = parse_category(&key)?;
    Ok(Json(state.settings.read(viewer.identity(), category).await?))
}

/// Handler: PUT /api/settings/{category}
pub async fn put_category(
    State(state): State<AppState>,
    Path(key): Path<String>,
    viewer: Viewer,
    Json(body): Json<Value>,
) -> AppResult<Json<Setting>> {
    let category = parse_category(&key)?;
    let saved = state
        .settings
        .save(viewer.identity(), category, &body)
        .await?;
    Ok(Json(saved))
}

/// Handler: DELETE /api/settings/{category}
pub async fn delete_category(
    State(state): State<AppState>,
    Path(key): Path<String>,
    viewer: Viewer,
) -> AppResult<StatusCode> {
    let category = parse_category(&key)?;
    state.settings.remove(viewer.identity(), category).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::routes::tests::test_state;
    use crate::db::Role;
    use crate::settings::Identity;
    use serde_json::json;

    fn admin() -> Viewer {
        Viewer(Some(Identity::new("admin-1", Role::Admin)))
    }

    #[tokio::test]
    async fn test_unknown_category_is_not_found() {
        let state = test_state().await;
        let result = get_category(State(state), Path("themes".to_string()), admin()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let state = test_state().await;
        let body = json!({
            "provider": "meilisearch",
            "meilisearch": {"host": "https://search.example.com", "apiKey": "k", "indexName": "posts"}
        });

        let Json(saved) = put_category(
            State(state.clone()),
            Path("search".to_string()),
            admin(),
            Json(body),
        )
        .await
        .unwrap();
        assert_eq!(saved.key, "search");

        let Json(value) = get_category(State(state), Path("search".to_string()), admin())
            .await
            .unwrap();
        assert_eq!(value["meilisearch"]["apiKey"], "k");
    }

    #[tokio::test]
    async fn test_delete_requires_admin() {
        let state = test_state().await;
        let editor = Viewer(Some(Identity::new("e", Role::Editor)));
        let result = delete_category(State(state.clone()), Path("general".to_string()), editor).await;
        assert!(matches!(result, Err(AppError::Forbidden)));

        let status = delete_category(State(state), Path("general".to_string()), admin())
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
}
