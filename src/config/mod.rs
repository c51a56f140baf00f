//! Configuration management
//!
//! This module provides YAML-based configuration management with support for:
//! - Environment variable overrides
//! - Multiple configuration file locations
//! - Default values for all settings

use std::path::PathBuf;

use anyhow::{Context, Result};
use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    /// Deployment environment; selects the token validation mode
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub auth: AuthConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Deployment environment
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Developer machine: tokens are decoded without verification.
    /// Only selected when configured explicitly.
    Local,
    Dev,
    Staging,
    #[default]
    Prod,
}

impl Environment {
    pub fn is_local(&self) -> bool {
        matches!(self, Environment::Local)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Local => write!(f, "local"),
            Environment::Dev => write!(f, "dev"),
            Environment::Staging => write!(f, "staging"),
            Environment::Prod => write!(f, "prod"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Environment::Local),
            "dev" => Ok(Environment::Dev),
            "staging" => Ok(Environment::Staging),
            "prod" => Ok(Environment::Prod),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Identity provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Identity provider domain; the key set lives at
    /// `https://{domain}/.well-known/jwks.json`
    #[serde(default)]
    pub domain: String,
    /// Explicit key set URL, overriding the one derived from `domain`
    #[serde(default)]
    pub jwks_url: Option<String>,
    /// Expected `iss` claim
    #[serde(default)]
    pub issuer: String,
    /// Expected `aud` claim; also prefixes namespaced custom claims
    #[serde(default)]
    pub audience: String,
    /// Accepted signing algorithms
    #[serde(default = "default_algorithms")]
    pub algorithms: Vec<String>,
    /// Timeout for the key set request
    #[serde(default = "default_jwks_timeout")]
    pub jwks_timeout_secs: u64,
    /// Key set cache lifetime (0 re-fetches on every validation)
    #[serde(default)]
    pub jwks_cache_ttl_secs: u64,
    /// Static bearer key accepted in the local environment
    #[serde(default)]
    pub local_api_key: Option<String>,
    /// Organization name assigned to callers using the local key
    #[serde(default = "default_local_org_name")]
    pub local_org_name: String,
}

fn default_algorithms() -> Vec<String> {
    vec!["RS256".to_string()]
}

fn default_jwks_timeout() -> u64 {
    10
}

fn default_local_org_name() -> String {
    "local".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            domain: String::new(),
            jwks_url: None,
            issuer: String::new(),
            audience: String::new(),
            algorithms: default_algorithms(),
            jwks_timeout_secs: default_jwks_timeout(),
            jwks_cache_ttl_secs: 0,
            local_api_key: None,
            local_org_name: default_local_org_name(),
        }
    }
}

impl AuthConfig {
    /// URL of the signing key set
    pub fn jwks_endpoint(&self) -> String {
        self.jwks_url
            .clone()
            .unwrap_or_else(|| format!("https://{}/.well-known/jwks.json", self.domain))
    }

    /// Parse the configured algorithm names
    pub fn signing_algorithms(&self) -> Result<Vec<Algorithm>> {
        self.algorithms
            .iter()
            .map(|name| {
                name.parse::<Algorithm>()
                    .map_err(|_| anyhow::anyhow!("Unsupported signing algorithm: {}", name))
            })
            .collect()
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_idle_timeout() -> u64 {
    600
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    /// Log output target (console or file)
    #[serde(default = "default_log_target")]
    pub target: LogTarget,
    /// Directory for log files (used when target is "file" or "both")
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    #[serde(default = "default_log_prefix")]
    pub log_prefix: String,
    #[serde(default = "default_log_rotation")]
    pub daily_rotation: bool,
}

/// Log line format
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

/// Log output target
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    #[default]
    Console,
    File,
    Both,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

fn default_log_target() -> LogTarget {
    LogTarget::Console
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("./logs")
}

fn default_log_prefix() -> String {
    "recordme-backend".to_string()
}

fn default_log_rotation() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            target: default_log_target(),
            log_dir: default_log_dir(),
            log_prefix: default_log_prefix(),
            daily_rotation: default_log_rotation(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
            },
            environment: Environment::default(),
            auth: AuthConfig::default(),
            database: DatabaseConfig {
                url: "sqlite://./data/recordme.db".to_string(),
                max_connections: default_max_connections(),
                min_connections: default_min_connections(),
                connect_timeout_secs: default_connect_timeout(),
                idle_timeout_secs: default_idle_timeout(),
            },
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values
    /// 2. Configuration file (YAML)
    /// 3. Environment variables
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let config_path = std::env::var("RECORDME_CONFIG")
            .map(PathBuf::from)
            .ok()
            .or_else(Self::find_config_file);

        let mut config = match config_path {
            Some(ref path) if path.exists() => {
                eprintln!("[CONFIG] Loading configuration from: {:?}", path);
                Self::from_file(path)?
            }
            Some(ref path) => {
                eprintln!("[CONFIG] Config file not found: {:?}, using defaults", path);
                AppConfig::default()
            }
            None => {
                eprintln!("[CONFIG] No config file found, using defaults");
                AppConfig::default()
            }
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parse a YAML configuration file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        serde_norway::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Find the configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let paths = [
            PathBuf::from("config.yaml"),
            PathBuf::from("config/config.yaml"),
            PathBuf::from("/etc/recordme/config.yaml"),
            dirs::config_dir()
                .map(|p| p.join("recordme/config.yaml"))
                .unwrap_or_default(),
        ];

        paths.into_iter().find(|p| p.exists())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("RECORDME_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("RECORDME_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }

        if let Ok(state) = std::env::var("ENV_STATE") {
            match state.parse() {
                Ok(env) => self.environment = env,
                Err(e) => eprintln!("[CONFIG] Ignoring ENV_STATE: {}", e),
            }
        }

        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database.url = url;
        }

        // Identity provider overrides
        if let Ok(domain) = std::env::var("AUTH_DOMAIN") {
            self.auth.domain = domain;
        }
        if let Ok(url) = std::env::var("AUTH_JWKS_URL") {
            self.auth.jwks_url = Some(url);
        }
        if let Ok(issuer) = std::env::var("AUTH_ISSUER") {
            self.auth.issuer = issuer;
        }
        if let Ok(audience) = std::env::var("API_AUDIENCE") {
            self.auth.audience = audience;
        }
        if let Ok(algorithms) = std::env::var("AUTH_ALGORITHMS") {
            self.auth.algorithms = algorithms
                .split(',')
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .collect();
        }
        if let Ok(key) = std::env::var("LOCAL_API_KEY") {
            self.auth.local_api_key = Some(key);
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("RECORDME_LOG_FORMAT") {
            self.logging.format = match format.to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "compact" => LogFormat::Compact,
                _ => LogFormat::Pretty,
            };
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port cannot be 0");
        }

        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.auth.algorithms.is_empty() {
            anyhow::bail!("At least one signing algorithm must be configured");
        }
        self.auth.signing_algorithms()?;

        // Verified tokens need a full identity provider configuration
        if !self.environment.is_local() {
            if self.auth.domain.is_empty() && self.auth.jwks_url.is_none() {
                anyhow::bail!(
                    "auth.domain or auth.jwks_url is required in the {} environment",
                    self.environment
                );
            }
            if self.auth.issuer.is_empty() {
                anyhow::bail!("auth.issuer is required in the {} environment", self.environment);
            }
            if self.auth.audience.is_empty() {
                anyhow::bail!(
                    "auth.audience is required in the {} environment",
                    self.environment
                );
            }
        }

        Ok(())
    }
}
