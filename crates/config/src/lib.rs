use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "agora.toml",
    "config/agora.toml",
    "crates/config/agora.toml",
    "../agora.toml",
    "../config/agora.toml",
    "../../agora.toml",
];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub realtime: RealtimeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 7070,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://agora.db".to_string(),
            max_connections: 10,
        }
    }
}

/// Session cookie settings shared with the web tier that issues the cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "AuthConfig::default_session_cookie")]
    pub session_cookie: String,
}

impl AuthConfig {
    fn default_session_cookie() -> String {
        "sess:key".to_string()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_cookie: Self::default_session_cookie(),
        }
    }
}

/// Tuning for live connections and the chat read paths.
///
/// ```
/// use agora_config::RealtimeConfig;
///
/// let realtime = RealtimeConfig::default();
/// assert_eq!(realtime.history_page_size, 20);
/// assert_eq!(realtime.outbound_buffer, 100);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    #[serde(default = "RealtimeConfig::default_outbound_buffer")]
    pub outbound_buffer: usize,
    #[serde(default = "RealtimeConfig::default_history_page_size")]
    pub history_page_size: u32,
    #[serde(default = "RealtimeConfig::default_max_message_length")]
    pub max_message_length: usize,
}

impl RealtimeConfig {
    const fn default_outbound_buffer() -> usize {
        100
    }

    const fn default_history_page_size() -> u32 {
        20
    }

    const fn default_max_message_length() -> usize {
        10_000
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            outbound_buffer: Self::default_outbound_buffer(),
            history_page_size: Self::default_history_page_size(),
            max_message_length: Self::default_max_message_length(),
        }
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use agora_config::load;
///
/// std::env::remove_var("AGORA_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let mut builder = config::Config::builder()
        .set_default("http.address", defaults.http.address.clone())?
        .set_default("http.port", i64::from(defaults.http.port))?
        .set_default("database.url", defaults.database.url.clone())?
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )?
        .set_default("auth.session_cookie", defaults.auth.session_cookie.clone())?
        .set_default(
            "realtime.outbound_buffer",
            i64::try_from(defaults.realtime.outbound_buffer).unwrap_or(i64::MAX),
        )?
        .set_default(
            "realtime.history_page_size",
            i64::from(defaults.realtime.history_page_size),
        )?
        .set_default(
            "realtime.max_message_length",
            i64::try_from(defaults.realtime.max_message_length).unwrap_or(i64::MAX),
        )?;

    let environment_overrides = config::Environment::with_prefix("AGORA").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("AGORA_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via AGORA_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let mut config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    if config.realtime.history_page_size == 0 {
        config.realtime.history_page_size = RealtimeConfig::default_history_page_size();
    }
    if config.realtime.outbound_buffer == 0 {
        config.realtime.outbound_buffer = RealtimeConfig::default_outbound_buffer();
    }

    debug!(?config, "loaded backend configuration");
    Ok(config)
}
