//! Bootstrap configuration loading
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (handled by the binary)
//! 2. Environment variable (handled by the binary)
//! 3. TOML config file
//! 4. Compiled default
//!
//! A missing TOML file is not an error: the service starts on defaults and
//! logs a warning. A file that exists but does not parse aborts startup.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Application name used for config and data directories
pub const APP_DIR_NAME: &str = "domscope";

/// Bootstrap configuration loaded from TOML
///
/// Every field has a compiled default, so an empty file is valid.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Path to the SQLite database file (defaults to the platform data dir)
    pub database_path: Option<PathBuf>,

    /// Address the HTTP server binds to
    pub bind: String,

    /// HTTP server port
    pub port: u16,

    pub logging: LoggingConfig,

    pub providers: ProvidersConfig,

    pub enrichment: EnrichmentConfig,

    pub refresh: RefreshConfig,

    pub cors: CorsConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            bind: "127.0.0.1".to_string(),
            port: 8000,
            logging: LoggingConfig::default(),
            providers: ProvidersConfig::default(),
            enrichment: EnrichmentConfig::default(),
            refresh: RefreshConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` overrides it
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Settings for one upstream HTTP provider
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Base URL without trailing slash
    pub base_url: String,

    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_timeout_secs() -> u64 {
    10
}

/// Upstream providers: certificate transparency and the two IP-intelligence APIs
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub crt_sh: ProviderConfig,
    pub ip_who_is: ProviderConfig,
    pub ip_info: ProviderConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            crt_sh: ProviderConfig::new("https://crt.sh"),
            ip_who_is: ProviderConfig::new("http://ipwho.is"),
            ip_info: ProviderConfig::new("https://ipinfo.io"),
        }
    }
}

/// Batch enrichment tuning
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// Maximum number of hostnames enriched at the same time
    pub max_concurrency: usize,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 16,
        }
    }
}

/// Periodic refresh task
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Seconds between refresh cycles; 0 disables the task
    pub interval_secs: u64,
}

/// Cross-origin access for browser front ends
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Origins allowed to call the API; `"*"` allows any origin
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:8000".to_string()],
        }
    }
}

impl CorsConfig {
    pub fn allows_any(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

impl TomlConfig {
    /// Parse TOML text, then normalize and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Database path, falling back to the platform data directory
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(default_database_path)
    }

    fn normalize(&mut self) {
        for provider in [
            &mut self.providers.crt_sh,
            &mut self.providers.ip_who_is,
            &mut self.providers.ip_info,
        ] {
            let trimmed = provider.base_url.trim_end_matches('/').len();
            provider.base_url.truncate(trimmed);
        }

        // Browsers send origins without a trailing slash
        for origin in &mut self.cors.allowed_origins {
            *origin = origin.trim().trim_end_matches('/').to_string();
        }
    }

    /// Reject values the service cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.enrichment.max_concurrency == 0 {
            return Err(Error::Config(
                "enrichment.max_concurrency must be at least 1".to_string(),
            ));
        }

        for (name, provider) in [
            ("crt_sh", &self.providers.crt_sh),
            ("ip_who_is", &self.providers.ip_who_is),
            ("ip_info", &self.providers.ip_info),
        ] {
            if provider.base_url.is_empty() {
                return Err(Error::Config(format!(
                    "providers.{}.base_url must not be empty",
                    name
                )));
            }
            if provider.timeout_secs == 0 {
                return Err(Error::Config(format!(
                    "providers.{}.timeout_secs must be at least 1",
                    name
                )));
            }
        }

        if self.cors.allowed_origins.iter().any(|o| o.is_empty()) {
            return Err(Error::Config(
                "cors.allowed_origins must not contain empty entries".to_string(),
            ));
        }

        Ok(())
    }
}

/// Load the bootstrap config
///
/// `explicit_path` comes from `--config` / `DOMSCOPE_CONFIG`. Without it the
/// user config dir is tried. Missing files yield defaults.
pub fn load_toml_config(explicit_path: Option<&Path>) -> Result<TomlConfig> {
    let path = match explicit_path {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path(),
    };

    let Some(path) = path else {
        warn!("Could not determine config directory, using built-in defaults");
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        warn!(
            "Config file not found at {}, using built-in defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;

    let config = TomlConfig::from_toml_str(&content)?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// `<config dir>/domscope/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("config.toml"))
}

/// `<data dir>/domscope/domscope.db`, or `./domscope_data/domscope.db`
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("./domscope_data"))
        .join("domscope.db")
}
