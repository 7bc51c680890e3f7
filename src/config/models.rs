// src/config/models.rs
use anyhow::{bail, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub checker: CheckerConfig,
    pub metrics: MetricsConfig,
    /// Sorted first on the dashboard regardless of its status.
    pub primary_url: Option<String>,
    /// Targets probed by `GET /api/status`.
    pub targets: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    pub default_timeout_ms: u64,
    pub max_timeout_ms: u64,
    pub max_batch_size: usize,
    /// Upper bound on in-flight probes per batch; 0 disables the cap.
    pub max_concurrency: usize,
    pub user_agent: String,
    pub max_redirects: usize,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: 6000,
            max_timeout_ms: 30_000,
            max_batch_size: 100,
            max_concurrency: 32,
            user_agent: concat!("status-probe/", env!("CARGO_PKG_VERSION")).to_string(),
            max_redirects: 10,
        }
    }
}

impl CheckerConfig {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    pub fn max_timeout(&self) -> Duration {
        Duration::from_millis(self.max_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 9090,
            path: "/metrics".to_string(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        let checker = &self.checker;
        if checker.default_timeout_ms == 0 {
            bail!("checker.default_timeout_ms must be greater than 0");
        }
        if checker.default_timeout_ms > checker.max_timeout_ms {
            bail!(
                "checker.default_timeout_ms ({}) exceeds checker.max_timeout_ms ({})",
                checker.default_timeout_ms,
                checker.max_timeout_ms
            );
        }
        if checker.max_batch_size == 0 {
            bail!("checker.max_batch_size must be greater than 0");
        }
        if self.targets.len() > checker.max_batch_size {
            bail!(
                "{} targets configured but checker.max_batch_size is {}",
                self.targets.len(),
                checker.max_batch_size
            );
        }
        if !self.metrics.path.starts_with('/') {
            bail!("metrics.path must start with '/', got {:?}", self.metrics.path);
        }
        if let Some(primary) = &self.primary_url {
            Url::parse(primary)
                .map_err(|e| anyhow::anyhow!("primary_url {:?} is not an absolute URL: {}", primary, e))?;
        }
        for target in &self.targets {
            Url::parse(target)
                .map_err(|e| anyhow::anyhow!("target {:?} is not an absolute URL: {}", target, e))?;
        }
        Ok(())
    }
}
