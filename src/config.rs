use anyhow::Context;
use serde::Deserialize;

use crate::domain::YearRange;

const ENV_PREFIX: &str = "LIBRARY";
const DEFAULT_CONFIG_FILE: &str = "config/default";

/// Top-level configuration loaded from layered sources.
///
/// Order (later wins): `config/default.toml`, `LIBRARY_*` environment
/// variables (`__` separates nested keys, e.g. `LIBRARY_BOOKS__YEAR_MIN`),
/// then the bare `DATABASE_URL` and `PORT` variables.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub books: BookSettings,
}

impl Settings {
    /// Load configuration from `.env`, the optional config file and the environment.
    pub fn load() -> anyhow::Result<Self> {
        // Allow missing `.env` files without failing.
        let _ = dotenvy::dotenv();

        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(DEFAULT_CONFIG_FILE).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        if let Ok(url) = std::env::var("DATABASE_URL") {
            builder = builder.set_override("database.url", url)?;
        }
        if let Ok(port) = std::env::var("PORT") {
            builder = builder.set_override("server.port", port)?;
        }

        let cfg = builder
            .build()
            .with_context(|| "failed to build configuration")?;

        Self::from_config(cfg)
    }

    /// Deserialize and validate an already-built configuration.
    pub fn from_config(cfg: config::Config) -> anyhow::Result<Self> {
        let settings: Settings = cfg
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;

        settings.books.year_range()?;

        Ok(settings)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "ServerSettings::default_host")]
    pub host: String,
    #[serde(default = "ServerSettings::default_port")]
    pub port: u16,
}

impl ServerSettings {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        3000
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "DatabaseSettings::default_url")]
    pub url: String,
    #[serde(default = "DatabaseSettings::default_max_connections")]
    pub max_connections: u32,
}

impl DatabaseSettings {
    fn default_url() -> String {
        "postgres://localhost/library".to_string()
    }

    fn default_max_connections() -> u32 {
        5
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: Self::default_url(),
            max_connections: Self::default_max_connections(),
        }
    }
}

/// Where books are persisted.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct StorageSettings {
    #[serde(default)]
    pub backend: StorageBackend,
}

/// Book validation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct BookSettings {
    #[serde(default = "BookSettings::default_year_min")]
    pub year_min: i32,
    #[serde(default = "BookSettings::default_year_max")]
    pub year_max: i32,
}

impl BookSettings {
    fn default_year_min() -> i32 {
        YearRange::DEFAULT_MIN
    }

    fn default_year_max() -> i32 {
        YearRange::DEFAULT_MAX
    }

    pub fn year_range(&self) -> anyhow::Result<YearRange> {
        YearRange::new(self.year_min, self.year_max).with_context(|| "invalid books.year_* settings")
    }
}

impl Default for BookSettings {
    fn default() -> Self {
        Self {
            year_min: Self::default_year_min(),
            year_max: Self::default_year_max(),
        }
    }
}
