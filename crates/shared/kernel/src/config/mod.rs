use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::info;

/// Errors raised while assembling the layered configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config error ({context}): {source}")]
    Config { source: config::ConfigError, context: &'static str },
}

/// A reusable configuration loader combining file-based settings with
/// environment overrides.
///
/// Layering:
/// 1. **Base file**: `server.toml` in the working directory unless another
///    path is given.
/// 2. **Environment**: variables prefixed `FHUB__`, nested keys separated by
///    double underscores (`FHUB__STORAGE__ROOT` maps to `storage.root`).
///
/// # Errors
/// Fails when the file is missing, an override is malformed, or the result
/// does not deserialize into `T`.
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let effective_path = path.map_or_else(|| PathBuf::from("server"), |p| p.as_ref().to_path_buf());

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(true))
        .add_source(
            Environment::with_prefix("FHUB")
                .separator("__")
                .convert_case(config::Case::Snake),
        );

    info!("Loading config from {}", effective_path.display());

    let config = builder
        .build()
        .map_err(|source| ConfigError::Config { source, context: "build" })?
        .try_deserialize::<T>()
        .map_err(|source| ConfigError::Config { source, context: "deserialize" })?;

    Ok(config)
}
