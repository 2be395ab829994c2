use super::access::{authorize_read, authorize_write, Identity, ReadScope};
use super::setup::{
    SetupProgress, SetupStatus, SetupStep, SETUP_COMPLETED_KEY, SETUP_STEP_PREFIX,
};
use super::store::SettingsStore;
use crate::audit::{record_best_effort, AuditSink};
use crate::db::{AuditEntry, Setting, SettingFilter, SettingKind};
use crate::error::AppResult;
use crate::schema::{redact, Category};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::info;

pub const ACTION_UPDATE: &str = "settings.update";
pub const ACTION_DELETE: &str = "settings.delete";
pub const ACTION_SETUP_STEP: &str = "setup.step";

/// Kind a category is persisted under.
pub fn kind_for(category: Category) -> SettingKind {
    if category.has_secrets() {
        SettingKind::Security
    } else {
        SettingKind::General
    }
}

/// Category-level settings operations behind the HTTP handlers.
#[derive(Clone)]
pub struct SettingsService {
    store: SettingsStore,
    audit: Arc<dyn AuditSink>,
}

impl SettingsService {
    pub fn new(store: SettingsStore, audit: Arc<dyn AuditSink>) -> Self {
        Self { store, audit }
    }

    pub fn store(&self) -> &SettingsStore {
        &self.store
    }

    /// Stored value of `category` as the viewer may see it.
    pub async fn read(&self, viewer: Option<&Identity>, category: Category) -> AppResult<Value> {
        let scope = authorize_read(category, viewer)?;
        let value = self.store.require(category.key()).await?;
        Ok(match scope {
            ReadScope::Full => value,
            ReadScope::Redacted => redact(&value, category.sensitive_fields()),
        })
    }

    /// Every stored setting, decrypted. Admin only.
    pub async fn list(&self, viewer: Option<&Identity>) -> AppResult<Vec<Setting>> {
        authorize_write(viewer)?;
        self.store.list(&SettingFilter::default()).await
    }

    /// Public categories that have a value, sensitive fields omitted.
    pub async fn public_settings(&self) -> AppResult<Map<String, Value>> {
        let mut out = Map::new();
        for category in Category::ALL.into_iter().filter(|c| c.is_public()) {
            if let Some(value) = self.store.get(category.key()).await? {
                out.insert(
                    category.key().to_string(),
                    redact(&value, category.sensitive_fields()),
                );
            }
        }
        Ok(out)
    }

    /// Validate and persist `raw` as the new value of `category`.
    pub async fn save(
        &self,
        actor: Option<&Identity>,
        category: Category,
        raw: &Value,
    ) -> AppResult<Setting> {
        let actor = authorize_write(actor)?;
        let saved = self.persist(category, raw).await?;
        info!("Settings {} updated by {}", category, actor.user_id);

        record_best_effort(
            self.audit.as_ref(),
            AuditEntry::setting(&actor.user_id, ACTION_UPDATE, category.key()),
        )
        .await;
        Ok(saved)
    }

    /// Remove `category`. Absent categories are not an error.
    pub async fn remove(&self, actor: Option<&Identity>, category: Category) -> AppResult<()> {
        let actor = authorize_write(actor)?;
        self.store.delete(category.key()).await?;
        info!("Settings {} deleted by {}", category, actor.user_id);

        record_best_effort(
            self.audit.as_ref(),
            AuditEntry::setting(&actor.user_id, ACTION_DELETE, category.key()),
        )
        .await;
        Ok(())
    }

    pub async fn setup_status(&self, viewer: Option<&Identity>) -> AppResult<SetupStatus> {
        authorize_write(viewer)?;
        Ok(SetupStatus::from(&self.progress().await?))
    }

    /// Store the category behind `step` and advance the wizard.
    pub async fn complete_step(
        &self,
        actor: Option<&Identity>,
        step: SetupStep,
        data: &Value,
    ) -> AppResult<SetupStatus> {
        let actor = authorize_write(actor)?;
        let category = step.category();
        self.persist(category, data).await?;

        // Progress is one row per step, rebuilt on read
        self.store
            .set(&step.progress_key(), &Value::Bool(true), SettingKind::General)
            .await?;

        let progress = self.progress().await?;
        if progress.is_complete() {
            self.store
                .set(SETUP_COMPLETED_KEY, &Value::Bool(true), SettingKind::General)
                .await?;
            info!("Setup completed by {}", actor.user_id);
        }

        let mut entry = AuditEntry::setting(&actor.user_id, ACTION_SETUP_STEP, category.key());
        entry.metadata["step"] = serde_json::json!(step);
        record_best_effort(self.audit.as_ref(), entry).await;

        Ok(SetupStatus::from(&progress))
    }

    async fn persist(&self, category: Category, raw: &Value) -> AppResult<Setting> {
        let canonical = category.validate(raw)?;
        self.store
            .set(category.key(), &canonical, kind_for(category))
            .await
    }

    async fn progress(&self) -> AppResult<SetupProgress> {
        let rows = self
            .store
            .list(&SettingFilter::prefix(SETUP_STEP_PREFIX))
            .await?;
        Ok(SetupProgress::from_keys(rows.iter().map(|row| row.key.as_str())))
    }
}
