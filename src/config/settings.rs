//! Application settings and configuration structures.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Deserializer};

/// Default location of the INI configuration file.
pub const DEFAULT_CONFIG_FILE: &str = "rpserver.ini";

/// Default port of the loopback-only administrative listener.
pub const DEFAULT_ADMIN_PORT: u16 = 12789;

/// Default drain time per listener on stop.
pub const DEFAULT_SHUTDOWN_TIMEOUT_MS: u64 = 5_000;

/// Root configuration structure.
///
/// Field names follow the INI keys (`dataDir`, `sslPort`, ...). The lowercase
/// aliases cover sources that fold key case.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Directory holding the document store
    #[serde(rename = "dataDir", alias = "datadir")]
    pub data_dir: PathBuf,

    /// Port of the client-facing listener
    pub port: u16,

    /// Whether TLS is expected in front of the client listener
    pub ssl: bool,

    #[serde(rename = "sslPort", alias = "sslport")]
    pub ssl_port: u16,

    #[serde(rename = "sslDomain", alias = "ssldomain")]
    pub ssl_domain: String,

    #[serde(rename = "letsencryptAcceptTOS", alias = "letsencryptaccepttos")]
    pub letsencrypt_accept_tos: bool,

    #[serde(rename = "letsencryptEmail", alias = "letsencryptemail")]
    pub letsencrypt_email: String,

    /// Port of the administrative listener (always bound to 127.0.0.1)
    #[serde(rename = "adminPort", alias = "adminport")]
    pub admin_port: u16,

    /// Lifetime of issued user tokens
    #[serde(rename = "tokenExpiryDays", alias = "tokenexpirydays")]
    pub token_expiry_days: i64,

    /// Allowed CORS origins; empty allows any
    #[serde(rename = "corsOrigins", alias = "corsorigins", deserialize_with = "origin_list")]
    pub cors_origins: Vec<String>,

    /// Time each listener gets to drain in-flight requests on stop
    #[serde(rename = "shutdownTimeoutMs", alias = "shutdowntimeoutms")]
    pub shutdown_timeout_ms: u64,
}

/// An origin list given either as a list or, as INI files and environment
/// variables do, as one comma-separated string.
fn origin_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Origins {
        List(Vec<String>),
        Joined(String),
    }

    let origins = match Origins::deserialize(deserializer)? {
        Origins::List(list) => list,
        Origins::Joined(joined) => joined.split(',').map(String::from).collect(),
    };
    Ok(origins
        .iter()
        .map(|o| o.trim())
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect())
}

impl Settings {
    /// Load settings from defaults, the INI file and environment variables.
    ///
    /// The loading order is:
    /// 1. built-in defaults
    /// 2. the INI file at `path` (required), or `rpserver.ini` if present
    /// 3. environment variables prefixed with `RP_` (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be read or parsed, or if the
    /// TLS settings are incomplete.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let file = match path {
            Some(path) => File::from(path).format(FileFormat::Ini).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).format(FileFormat::Ini).required(false),
        };

        let settings: Self = Self::defaults()?
            .add_source(file)
            // RP_PORT=8080 -> port = 8080
            .add_source(Environment::with_prefix("RP").try_parsing(true))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from an INI document held in memory.
    pub fn from_ini_str(ini: &str) -> Result<Self, ConfigError> {
        let settings: Self = Self::defaults()?
            .add_source(File::from_str(ini, FileFormat::Ini))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn defaults() -> Result<config::builder::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("dataDir", "/var/local/rpnow")?
            .set_default("port", 80)?
            .set_default("ssl", false)?
            .set_default("sslPort", 443)?
            .set_default("sslDomain", "")?
            .set_default("letsencryptAcceptTOS", false)?
            .set_default("letsencryptEmail", "")?
            .set_default("adminPort", DEFAULT_ADMIN_PORT)?
            .set_default("tokenExpiryDays", 365)?
            .set_default("corsOrigins", Vec::<String>::new())?
            .set_default("shutdownTimeoutMs", DEFAULT_SHUTDOWN_TIMEOUT_MS)
    }

    /// Semantic checks that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ssl {
            if self.ssl_domain.is_empty() {
                return Err(ConfigError::Message("ssl is enabled but sslDomain is empty".into()));
            }
            if !self.letsencrypt_accept_tos {
                return Err(ConfigError::Message(
                    "ssl is enabled but letsencryptAcceptTOS is not set".into(),
                ));
            }
            if self.letsencrypt_email.is_empty() {
                return Err(ConfigError::Message(
                    "ssl is enabled but letsencryptEmail is empty".into(),
                ));
            }
        }
        if self.token_expiry_days <= 0 {
            return Err(ConfigError::Message("tokenExpiryDays must be positive".into()));
        }
        Ok(())
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    /// Address of the client-facing listener.
    pub fn client_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }

    /// Address of the administrative listener.
    pub fn admin_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::LOCALHOST, self.admin_port))
    }

    /// Settings for an isolated instance: given store directory, ephemeral
    /// ports on both listeners.
    pub fn ephemeral(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            port: 0,
            ssl: false,
            ssl_port: 443,
            ssl_domain: String::new(),
            letsencrypt_accept_tos: false,
            letsencrypt_email: String::new(),
            admin_port: 0,
            token_expiry_days: 365,
            cors_origins: Vec::new(),
            shutdown_timeout_ms: DEFAULT_SHUTDOWN_TIMEOUT_MS,
        }
    }
}
