use pressroom::{
    config::AppConfig,
    db::{self, AuditRepo, SqliteSettingsRepo},
    secrets::SecretCodec,
    settings::{SettingsService, SettingsStore},
    web,
};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pressroom=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Pressroom settings v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load()?;
    info!("Configuration loaded");

    // Refuse to start without a usable key rather than failing on first secret write
    let codec = match SecretCodec::from_hex(&config.encryption.key) {
        Ok(codec) => Arc::new(codec),
        Err(e) => {
            error!("Encryption key unusable: {}", e);
            error!("Generate one with: pressroom-admin keygen");
            error!("Then set encryption.key in config/local.toml or PRESSROOM_ENCRYPTION__KEY");
            return Err(anyhow::anyhow!("encryption key not configured"));
        }
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    info!("Database connected: {}", config.database.url);

    db::init_db(&pool).await?;

    let purged = db::SessionRepo::cleanup_expired(&pool).await?;
    if purged > 0 {
        info!("Removed {} expired sessions", purged);
    }

    let store = SettingsStore::new(Arc::new(SqliteSettingsRepo::new(pool.clone())), codec);
    let audit = Arc::new(AuditRepo::new(pool.clone()));
    let state = web::AppState {
        pool,
        settings: SettingsService::new(store, audit),
    };

    let app = web::create_router(state);

    let addr = format!("{}:{}", config.web.host, config.web.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Web server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
