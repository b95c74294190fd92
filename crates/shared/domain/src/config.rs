use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level API configuration shared across services.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfigInner {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub upload: UploadConfig,
    pub share: ShareConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(flatten, default)]
    inner: Arc<ApiConfigInner>,
}

impl Deref for ApiConfig {
    type Target = ApiConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ApiConfig {
    fn deref_mut(&mut self) -> &mut ApiConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub ssl: Option<SslConfig>,
}

/// TLS certificate/key paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Storage root and public URL mapping.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Filesystem root every logical path resolves under.
    pub root: PathBuf,
    /// URL prefix of the external static server fronting the root.
    pub public_base: String,
    /// Optional internal listing accelerator; listings fall back to local
    /// readdir when unset or unreachable.
    pub accelerator_url: Option<String>,
}

/// Resumable upload knobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Upper bound accepted for a single chunk body, in bytes.
    pub max_chunk_size: u64,
    /// Age after which abandoned scratch chunks are swept at startup.
    pub scratch_ttl_secs: u64,
}

/// Share link configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    /// URL prefix baked into share links handed to clients.
    pub base_url: String,
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: 4590, ssl: None }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("cert.pem"), key: PathBuf::from("key.pem") }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { root: PathBuf::from("./data"), public_base: "/files".to_owned(), accelerator_url: None }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self { max_chunk_size: 32 * 1024 * 1024, scratch_ttl_secs: 86_400 }
    }
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self { base_url: "/share".to_owned() }
    }
}
