// src/config/mod.rs
mod models;

pub use models::*;

use anyhow::{Context, Result};
use ::config::{Environment, File, FileFormat, Source};
use std::path::Path;

const ENV_PREFIX: &str = "STATUS";

/// Load configuration from an optional file (YAML or JSON, by extension)
/// with `STATUS_*` environment overrides layered on top.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::warn!("Config file {} not found, using defaults", path.display());
    }
    build(File::from(path).required(false))
}

/// Parse a YAML document without environment overrides.
pub fn from_yaml_str(contents: &str) -> Result<Config> {
    let settings = ::config::Config::builder()
        .add_source(File::from_str(contents, FileFormat::Yaml))
        .build()
        .context("Failed to parse YAML config")?;
    finish(settings)
}

fn build<S>(file: S) -> Result<Config>
where
    S: Source + Send + Sync + 'static,
{
    let settings = ::config::Config::builder()
        .add_source(file)
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to read config")?;
    finish(settings)
}

fn finish(settings: ::config::Config) -> Result<Config> {
    let config: Config = settings
        .try_deserialize()
        .context("Failed to deserialize config")?;
    config.validate()?;
    Ok(config)
}
