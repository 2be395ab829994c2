use crate::audit::AuditSink;
use crate::db::models::*;
use crate::error::{AppError, AppResult};
use crate::settings::SettingsBackend;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use sqlx::{Pool, QueryBuilder, Sqlite};
use tracing::{debug, info};

pub type DbPool = Pool<Sqlite>;

/// SQLite-backed settings table
#[derive(Debug, Clone)]
pub struct SqliteSettingsRepo {
    pool: DbPool,
}

impl SqliteSettingsRepo {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn parse_row(row: SettingRow) -> AppResult<Setting> {
        Setting::try_from(row).map_err(AppError::internal)
    }
}

#[async_trait]
impl SettingsBackend for SqliteSettingsRepo {
    /// Insert or overwrite by key in a single statement; `created_at` survives overwrites.
    async fn upsert(
        &self,
        key: &str,
        value: &serde_json::Value,
        kind: SettingKind,
    ) -> AppResult<Setting> {
        let now = Utc::now();
        let value_json = serde_json::to_string(value)
            .map_err(|e| AppError::internal(format!("Failed to encode setting: {}", e)))?;

        let row = sqlx::query_as::<_, SettingRow>(
            r#"
            INSERT INTO settings (key, value, kind, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                kind = excluded.kind,
                updated_at = excluded.updated_at
            RETURNING *
            "#,
        )
        .bind(key)
        .bind(&value_json)
        .bind(kind.as_str())
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        debug!("Upserted setting {} ({})", key, kind);
        Self::parse_row(row)
    }

    async fn find_by_key(&self, key: &str) -> AppResult<Option<Setting>> {
        let row = sqlx::query_as::<_, SettingRow>("SELECT * FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::parse_row).transpose()
    }

    async fn find_many(&self, filter: &SettingFilter) -> AppResult<Vec<Setting>> {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM settings WHERE 1 = 1");
        if let Some(kind) = filter.kind {
            query.push(" AND kind = ").push_bind(kind.as_str());
        }
        if let Some(prefix) = &filter.key_prefix {
            query.push(" AND instr(key, ").push_bind(prefix.clone()).push(") = 1");
        }
        query.push(" ORDER BY key");

        let rows = query
            .build_query_as::<SettingRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::parse_row).collect()
    }

    async fn delete(&self, key: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM settings WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Audit log persisted next to the settings
#[derive(Debug, Clone)]
pub struct AuditRepo {
    pool: DbPool,
}

impl AuditRepo {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Entries for one entity, oldest first
    pub async fn list_for_entity(&self, entity_id: &str) -> AppResult<Vec<AuditLog>> {
        let logs = sqlx::query_as::<_, AuditLog>(
            "SELECT * FROM audit_logs WHERE entity_id = ? ORDER BY created_at, rowid",
        )
        .bind(entity_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(logs)
    }
}

#[async_trait]
impl AuditSink for AuditRepo {
    async fn record(&self, entry: &AuditEntry) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (id, actor, action, entity_type, entity_id, metadata, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(AuditEntry::generate_id())
        .bind(&entry.actor)
        .bind(&entry.action)
        .bind(&entry.entity_type)
        .bind(&entry.entity_id)
        .bind(entry.metadata.to_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Database operations for sessions issued by the identity provider
pub struct SessionRepo;

impl SessionRepo {
    /// Store a session token
    pub async fn create(
        pool: &DbPool,
        session: NewSession,
        expiry_hours: u64,
    ) -> AppResult<Session> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(expiry_hours as i64);

        sqlx::query(
            r#"
            INSERT INTO sessions (token, user_id, role, expires_at, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&session.token)
        .bind(&session.user_id)
        .bind(session.role.as_str())
        .bind(expires_at)
        .bind(now)
        .execute(pool)
        .await?;

        Self::get_valid(pool, &session.token)
            .await?
            .ok_or_else(|| AppError::internal("Failed to create session"))
    }

    /// Get an unexpired session by token
    pub async fn get_valid(pool: &DbPool, token: &str) -> AppResult<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions WHERE token = ? AND expires_at > ?",
        )
        .bind(token)
        .bind(Utc::now())
        .fetch_optional(pool)
        .await?;

        Ok(session)
    }

    /// Delete expired sessions
    pub async fn cleanup_expired(pool: &DbPool) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(Utc::now())
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
pub async fn setup_test_db() -> DbPool {
    use sqlx::sqlite::SqlitePoolOptions;
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");
    init_db(&pool).await.expect("Failed to init database");
    pool
}

/// Initialize database with migrations
pub async fn init_db(pool: &DbPool) -> AppResult<()> {
    info!("Running database migrations");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            key TEXT UNIQUE NOT NULL,
            value TEXT NOT NULL,
            kind TEXT NOT NULL DEFAULT 'general',
            created_at DATETIME NOT NULL,
            updated_at DATETIME NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS audit_logs (
            id TEXT PRIMARY KEY NOT NULL,
            actor TEXT NOT NULL,
            action TEXT NOT NULL,
            entity_type TEXT NOT NULL,
            entity_id TEXT NOT NULL,
            metadata TEXT NOT NULL DEFAULT '{}',
            created_at DATETIME NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            token TEXT UNIQUE NOT NULL,
            user_id TEXT NOT NULL,
            role TEXT NOT NULL,
            expires_at DATETIME NOT NULL,
            created_at DATETIME NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_settings_kind ON settings(kind)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_audit_entity ON audit_logs(entity_type, entity_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_sessions_token ON sessions(token)")
        .execute(pool)
        .await?;

    info!("Database migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // --- SqliteSettingsRepo tests ---

    #[tokio::test]
    async fn test_upsert_creates_then_overwrites() {
        let repo = SqliteSettingsRepo::new(setup_test_db().await);

        let first = repo
            .upsert("menus", &json!({"maxDepth": 2}), SettingKind::General)
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        let second = repo
            .upsert("menus", &json!({"maxDepth": 3}), SettingKind::Security)
            .await
            .unwrap();

        assert_eq!(second.value, json!({"maxDepth": 3}));
        assert_eq!(second.kind, SettingKind::Security);
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at > first.updated_at);

        let all = repo.find_many(&SettingFilter::default()).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_find_by_key_missing() {
        let repo = SqliteSettingsRepo::new(setup_test_db().await);
        assert!(repo.find_by_key("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_many_filters() {
        let repo = SqliteSettingsRepo::new(setup_test_db().await);
        repo.upsert("setup_step_database", &json!(true), SettingKind::General)
            .await
            .unwrap();
        repo.upsert("setup_completed", &json!(true), SettingKind::General)
            .await
            .unwrap();
        repo.upsert("email", &json!({}), SettingKind::Security)
            .await
            .unwrap();

        let security = repo
            .find_many(&SettingFilter::kind(SettingKind::Security))
            .await
            .unwrap();
        assert_eq!(security.len(), 1);
        assert_eq!(security[0].key, "email");

        let setup = repo
            .find_many(&SettingFilter::prefix("setup_"))
            .await
            .unwrap();
        let keys: Vec<&str> = setup.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["setup_completed", "setup_step_database"]);

        // Prefix matching is literal, not a LIKE pattern
        let none = repo.find_many(&SettingFilter::prefix("setup%")).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_delete_reports_rows() {
        let repo = SqliteSettingsRepo::new(setup_test_db().await);
        repo.upsert("general", &json!({}), SettingKind::General)
            .await
            .unwrap();

        assert!(repo.delete("general").await.unwrap());
        assert!(!repo.delete("general").await.unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_kind_is_an_error() {
        let pool = setup_test_db().await;
        sqlx::query(
            "INSERT INTO settings (key, value, kind, created_at, updated_at) VALUES ('x', '{}', 'weird', ?, ?)",
        )
        .bind(Utc::now())
        .bind(Utc::now())
        .execute(&pool)
        .await
        .unwrap();

        let repo = SqliteSettingsRepo::new(pool);
        assert!(matches!(
            repo.find_by_key("x").await,
            Err(AppError::Internal(_))
        ));
    }

    // --- AuditRepo tests ---

    #[tokio::test]
    async fn test_audit_record_and_list() {
        let repo = AuditRepo::new(setup_test_db().await);
        repo.record(&AuditEntry::setting("u1", "settings.update", "email"))
            .await
            .unwrap();
        repo.record(&AuditEntry::setting("u1", "settings.delete", "email"))
            .await
            .unwrap();

        let logs = repo.list_for_entity("email").await.unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].action, "settings.update");
        assert_eq!(logs[1].action, "settings.delete");
        assert_eq!(logs[0].entity_type, "setting");
        assert_eq!(logs[0].metadata, r#"{"category":"email"}"#);
    }

    // --- SessionRepo tests ---

    #[tokio::test]
    async fn test_session_lifecycle() {
        let pool = setup_test_db().await;
        let session = SessionRepo::create(
            &pool,
            NewSession {
                token: "tok".to_string(),
                user_id: "u1".to_string(),
                role: Role::Admin,
            },
            1,
        )
        .await
        .unwrap();
        assert_eq!(session.role, "admin");

        assert!(SessionRepo::get_valid(&pool, "tok").await.unwrap().is_some());
        assert!(SessionRepo::get_valid(&pool, "other").await.unwrap().is_none());
        assert_eq!(SessionRepo::cleanup_expired(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_expired_session_ignored() {
        let pool = setup_test_db().await;
        let past = Utc::now() - Duration::hours(1);
        sqlx::query(
            "INSERT INTO sessions (token, user_id, role, expires_at, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind("old")
        .bind("u1")
        .bind(Role::Admin.as_str())
        .bind(past)
        .bind(past - Duration::hours(1))
        .execute(&pool)
        .await
        .unwrap();

        assert!(SessionRepo::get_valid(&pool, "old").await.unwrap().is_none());
        assert_eq!(SessionRepo::cleanup_expired(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_with_zero_expiry_is_not_retrievable() {
        let pool = setup_test_db().await;
        let result = SessionRepo::create(
            &pool,
            NewSession {
                token: "instant".to_string(),
                user_id: "u1".to_string(),
                role: Role::Editor,
            },
            0,
        )
        .await;

        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
