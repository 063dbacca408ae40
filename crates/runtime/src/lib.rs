use anyhow::{Context, Result};
use agora_auth::SessionAuthenticator;
use agora_chats::PresenceRegistry;
use agora_config::AppConfig;
use agora_database::initialize_database;
use sqlx::SqlitePool;
use tracing::info;

pub mod telemetry {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_max_level(Level::INFO)
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

/// Process-wide services shared by every connection.
#[derive(Clone)]
pub struct BackendServices {
    pub db_pool: SqlitePool,
    pub presence: PresenceRegistry,
    pub authenticator: SessionAuthenticator,
}

impl BackendServices {
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        let db_pool = initialize_database(&config.database)
            .await
            .with_context(|| format!("failed to open database at {}", config.database.url))?;

        let authenticator = SessionAuthenticator::new(&config.auth);
        info!(cookie = authenticator.cookie_name(), "session authenticator ready");

        Ok(Self {
            db_pool,
            presence: PresenceRegistry::new(),
            authenticator,
        })
    }

    /// Drops all presence entries and closes the pool. Presence never
    /// outlives the process.
    pub async fn shutdown(&self) {
        let dropped = self.presence.clear().await;
        self.db_pool.close().await;
        info!(dropped_connections = dropped, "backend services stopped");
    }
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
