use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct MentorlinkConfig {
    pub service: ServiceConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub uploads: UploadConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8787,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    /// Number of weekly buckets in activity charts.
    pub activity_weeks: usize,
    pub default_time_range: String,
    pub upcoming_limit: usize,
    pub recent_limit: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            activity_weeks: 4,
            default_time_range: "30d".to_string(),
            upcoming_limit: 5,
            recent_limit: 5,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    pub dir: String,
    pub max_bytes: usize,
    pub allowed_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: "uploads".to_string(),
            max_bytes: 5 * 1024 * 1024,
            allowed_types: vec![
                "image/jpeg".to_string(),
                "image/png".to_string(),
                "image/webp".to_string(),
                "image/gif".to_string(),
            ],
        }
    }
}

impl MentorlinkConfig {
    /// Load from a TOML file, then apply `MENTORLINK__SECTION__KEY` overrides.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("MENTORLINK").separator("__"))
            .build()?;
        s.try_deserialize()
    }

    /// Configuration for running without a config file (tests, local demos).
    pub fn with_database_url(url: impl Into<String>) -> Self {
        Self {
            service: ServiceConfig {
                log_level: "info".to_string(),
            },
            database: DatabaseConfig {
                url: url.into(),
                max_connections: 5,
            },
            http: HttpConfig::default(),
            dashboard: DashboardConfig::default(),
            uploads: UploadConfig::default(),
        }
    }
}
