use crate::db::{Setting, SettingFilter, SettingKind};
use crate::error::{AppError, AppResult};
use crate::secrets::{decrypt_leaves, encrypt_leaves, SecretCodec};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Key/value persistence the store is built on
#[async_trait]
pub trait SettingsBackend: Send + Sync {
    /// Insert or overwrite by key. Must be atomic per key.
    async fn upsert(&self, key: &str, value: &Value, kind: SettingKind) -> AppResult<Setting>;

    async fn find_by_key(&self, key: &str) -> AppResult<Option<Setting>>;

    async fn find_many(&self, filter: &SettingFilter) -> AppResult<Vec<Setting>>;

    /// Returns whether a row was removed.
    async fn delete(&self, key: &str) -> AppResult<bool>;
}

/// Settings façade with transparent encryption of security-kind values.
///
/// Callers always hand in and receive plaintext trees; only the backend
/// ever sees tokens.
#[derive(Clone)]
pub struct SettingsStore {
    backend: Arc<dyn SettingsBackend>,
    codec: Arc<SecretCodec>,
}

impl SettingsStore {
    pub fn new(backend: Arc<dyn SettingsBackend>, codec: Arc<SecretCodec>) -> Self {
        Self { backend, codec }
    }

    /// Value for `key`, decrypted. `None` when the key is absent.
    pub async fn get(&self, key: &str) -> AppResult<Option<Value>> {
        Ok(self.get_setting(key).await?.map(|setting| setting.value))
    }

    /// Like [`SettingsStore::get`] but keeps kind and timestamps.
    pub async fn get_setting(&self, key: &str) -> AppResult<Option<Setting>> {
        match self.backend.find_by_key(key).await? {
            Some(setting) => Ok(Some(self.reveal(setting)?)),
            None => Ok(None),
        }
    }

    /// Value for `key`, or `NotFound` when absent.
    pub async fn require(&self, key: &str) -> AppResult<Value> {
        self.get(key)
            .await?
            .ok_or_else(|| AppError::not_found(format!("setting '{}'", key)))
    }

    /// Upsert `value` under `key`. Security-kind values have every string leaf encrypted.
    pub async fn set(&self, key: &str, value: &Value, kind: SettingKind) -> AppResult<Setting> {
        let stored = match kind {
            SettingKind::General => self.backend.upsert(key, value, kind).await?,
            SettingKind::Security => {
                let sealed = encrypt_leaves(&self.codec, value)?;
                self.backend.upsert(key, &sealed, kind).await?
            }
        };
        debug!("Stored setting {} as {}", key, kind);

        Ok(Setting {
            value: value.clone(),
            ..stored
        })
    }

    /// Remove `key`. Deleting an absent key is not an error.
    pub async fn delete(&self, key: &str) -> AppResult<()> {
        if !self.backend.delete(key).await? {
            debug!("Delete of absent setting {} ignored", key);
        }
        Ok(())
    }

    /// All settings matching `filter`, decrypted.
    pub async fn list(&self, filter: &SettingFilter) -> AppResult<Vec<Setting>> {
        self.backend
            .find_many(filter)
            .await?
            .into_iter()
            .map(|setting| self.reveal(setting))
            .collect()
    }

    fn reveal(&self, setting: Setting) -> AppResult<Setting> {
        match setting.kind {
            SettingKind::General => Ok(setting),
            SettingKind::Security => {
                let value = decrypt_leaves(&self.codec, &setting.value)?;
                Ok(Setting { value, ..setting })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{setup_test_db, SqliteSettingsRepo};
    use crate::secrets::{looks_like_token, CryptoError, EncryptionKey};
    use proptest::prelude::*;
    use serde_json::json;

    async fn test_store() -> (SettingsStore, Arc<SqliteSettingsRepo>) {
        let repo = Arc::new(SqliteSettingsRepo::new(setup_test_db().await));
        let codec = Arc::new(SecretCodec::new(&EncryptionKey::generate()));
        (SettingsStore::new(repo.clone(), codec), repo)
    }

    #[tokio::test]
    async fn test_get_absent_is_none() {
        let (store, _) = test_store().await;
        assert_eq!(store.get("general").await.unwrap(), None);
        assert!(matches!(
            store.require("general").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_general_value_stored_as_is() {
        let (store, repo) = test_store().await;
        let value = json!({"siteTitle": "Pressroom"});
        store.set("general", &value, SettingKind::General).await.unwrap();

        let raw = repo.find_by_key("general").await.unwrap().unwrap();
        assert_eq!(raw.value, value);
        assert_eq!(store.get("general").await.unwrap(), Some(value));
    }

    #[tokio::test]
    async fn test_security_value_encrypted_at_rest() {
        let (store, repo) = test_store().await;
        let value = json!({"a": "secret1", "b": {"c": "secret2", "d": 5}});
        let saved = store.set("vault", &value, SettingKind::Security).await.unwrap();
        assert_eq!(saved.value, value);

        let raw = repo.find_by_key("vault").await.unwrap().unwrap();
        assert_eq!(raw.kind, SettingKind::Security);
        let a = raw.value["a"].as_str().unwrap();
        let c = raw.value["b"]["c"].as_str().unwrap();
        assert!(looks_like_token(a) && a != "secret1");
        assert!(looks_like_token(c) && c != "secret2");
        assert_eq!(raw.value["b"]["d"], 5);

        assert_eq!(store.get("vault").await.unwrap(), Some(value));
    }

    #[tokio::test]
    async fn test_upsert_semantics() {
        let (store, _) = test_store().await;
        let first = store
            .set("menus", &json!({"v": 1}), SettingKind::General)
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        store
            .set("menus", &json!({"v": 2}), SettingKind::General)
            .await
            .unwrap();

        let current = store.get_setting("menus").await.unwrap().unwrap();
        assert_eq!(current.value, json!({"v": 2}));
        assert_eq!(current.created_at, first.created_at);
        assert!(current.updated_at > first.updated_at);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (store, _) = test_store().await;
        store.set("email", &json!({}), SettingKind::Security).await.unwrap();

        store.delete("email").await.unwrap();
        store.delete("email").await.unwrap();
        assert_eq!(store.get("email").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_plaintext_in_security_row_fails() {
        let (store, repo) = test_store().await;
        repo.upsert("email", &json!({"password": "p"}), SettingKind::Security)
            .await
            .unwrap();

        assert!(matches!(
            store.get("email").await,
            Err(AppError::Decryption(CryptoError::MalformedToken(_)))
        ));
    }

    #[tokio::test]
    async fn test_wrong_key_fails() {
        let (store, repo) = test_store().await;
        store
            .set("email", &json!({"password": "p"}), SettingKind::Security)
            .await
            .unwrap();

        let other = SettingsStore::new(
            repo,
            Arc::new(SecretCodec::new(&EncryptionKey::generate())),
        );
        assert!(matches!(
            other.get("email").await,
            Err(AppError::Decryption(CryptoError::DecryptionFailed))
        ));
    }

    #[tokio::test]
    async fn test_list_decrypts() {
        let (store, _) = test_store().await;
        store
            .set("email", &json!({"k": "v"}), SettingKind::Security)
            .await
            .unwrap();
        store
            .set("menus", &json!({"m": 1}), SettingKind::General)
            .await
            .unwrap();

        let all = store.list(&SettingFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].key, "email");
        assert_eq!(all[0].value, json!({"k": "v"}));
        assert_eq!(all[1].value, json!({"m": 1}));
    }

    #[tokio::test]
    async fn test_concurrent_sets_on_same_key() {
        let (store, repo) = test_store().await;
        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .set("newsletter", &json!({"batchSize": i}), SettingKind::General)
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let rows = repo
            .find_many(&SettingFilter::prefix("newsletter"))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        let batch = rows[0].value["batchSize"].as_i64().unwrap();
        assert!((0..16).contains(&batch));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_security_roundtrip(
            fields in prop::collection::btree_map("[a-z]{1,8}", ".*", 0..6),
            count in any::<i64>(),
        ) {
            let value = json!({"fields": fields, "count": count});
            let read = tokio_test::block_on(async {
                let (store, _) = test_store().await;
                store.set("prop", &value, SettingKind::Security).await.unwrap();
                store.get("prop").await.unwrap()
            });
            prop_assert_eq!(read, Some(value));
        }
    }
}
