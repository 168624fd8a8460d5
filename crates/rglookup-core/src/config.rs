//! Gateway configuration
//!
//! Loaded from TOML at startup, falls back to defaults if no config file exists.
//! Environment variables override the file; CLI flags override both.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    pub gateway: GatewayConfig,
    pub limits: LimitsConfig,
    pub store: StoreConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub port: u16,
    pub bind: BindMode,
}

fn default_port() -> u16 {
    8474
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: BindMode::default(),
        }
    }
}

/// Bind mode for the gateway
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindMode {
    #[default]
    Loopback,
    Lan,
}

impl BindMode {
    pub fn to_addr(&self) -> &str {
        match self {
            BindMode::Loopback => "127.0.0.1",
            BindMode::Lan => "0.0.0.0",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "loopback" | "localhost" | "127.0.0.1" => BindMode::Loopback,
            _ => BindMode::Lan,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Deadline for opening the transaction and starting the query, and for each row fetch.
    pub query_timeout_ms: u64,
    /// Deadline for each write to the response sink.
    pub write_timeout_ms: u64,
    /// Longest identifier accepted, in bytes.
    pub max_identifier_len: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            query_timeout_ms: 10_000,
            write_timeout_ms: 30_000,
            max_identifier_len: 512,
        }
    }
}

impl LimitsConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON file of nodes loaded into the in-memory graph at startup.
    pub seed_path: Option<PathBuf>,
}

impl LookupConfig {
    /// Load config from a TOML file. A missing file yields defaults; a malformed one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let config = toml::from_str(&content)
                    .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))?;
                tracing::info!("Loaded config from {}", path.display());
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config at {} - using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Apply `RGLOOKUP_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    pub fn apply_env_from(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(port) = var("RGLOOKUP_PORT") {
            self.gateway.port = port
                .parse()
                .map_err(|_| Error::ConfigError(format!("RGLOOKUP_PORT is not a port: {port}")))?;
        }
        if let Some(bind) = var("RGLOOKUP_BIND") {
            self.gateway.bind = BindMode::parse(&bind);
        }
        if let Some(seed) = var("RGLOOKUP_SEED") {
            self.store.seed_path = Some(PathBuf::from(seed));
        }
        Ok(())
    }

    /// Write the current config as TOML (for generating a default config file).
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}
