//! # FileHub Server
//!
//! A web file-management backend built on `Axum`: path-gated directory
//! operations, resumable chunked uploads, streaming ZIP downloads, and
//! expiring share links.
//!
//! ## Example
//! ```no_run
//! use fhub_server::Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Server::builder()
//!         .port(4590)
//!         .build()
//!         .await?
//!         .run()
//!         .await
//! }
//! ```

mod router;

use anyhow::{Context, Result, anyhow};
use axum_server::Handle;
use fhub::domain::config::ApiConfig;
use fhub::kernel::server::ApiState;
use fhub_vfs::Vfs;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};

/// A fluent builder for configuring and initializing the [`Server`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    cfg: ApiConfig,
}

impl ServerBuilder {
    /// Set up the server's configuration.
    pub fn config(mut self, cfg: ApiConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.cfg.server.port = port;
        self
    }

    /// Deployment env vars named by the ops contract override whatever the
    /// layered config produced.
    fn apply_env_overrides(&mut self) {
        if let Ok(root) = std::env::var("ROOT_DIR") {
            if !root.is_empty() {
                self.cfg.storage.root = root.into();
            }
        }
        if let Ok(base) = std::env::var("PUBLIC_FILES_BASE") {
            if !base.is_empty() {
                self.cfg.storage.public_base = base;
            }
        }
    }

    fn validate_ssl_config(&self) -> Result<()> {
        let Some(ssl) = &self.cfg.server.ssl else {
            return Ok(());
        };

        for (what, path) in [("certificate", &ssl.cert), ("private key", &ssl.key)] {
            if !path.exists() {
                anyhow::bail!("TLS {what} missing: {}", path.display());
            }
        }

        #[cfg(unix)]
        warn_on_loose_key_mode(&ssl.key)?;

        Ok(())
    }

    /// Consumes the builder and initializes the server.
    ///
    /// # Process
    /// 1. Applies deployment env overrides and validates TLS settings
    /// 2. Bootstraps the storage root and sweeps stale upload scratch
    /// 3. Initializes feature slices (browse, transfer, share)
    /// 4. Constructs application state
    ///
    /// # Errors
    /// Returns an error if the storage root cannot be created or resolved,
    /// TLS files are missing, or a feature slice fails to initialize.
    pub async fn build(mut self) -> Result<Server> {
        self.apply_env_overrides();
        self.validate_ssl_config()?;

        let address = SocketAddr::new(self.cfg.server.address, self.cfg.server.port);

        info!(
            address = %address,
            root = %self.cfg.storage.root.display(),
            "Initializing server"
        );

        let vfs = Vfs::builder()
            .root(&self.cfg.storage.root)
            .create(true)
            .scratch_ttl(Duration::from_secs(self.cfg.upload.scratch_ttl_secs))
            .connect()
            .await
            .context("Failed to initialize storage root")?;

        let slices = fhub::init().map_err(|e| anyhow!("Platform bootstrap failed: {e}"))?;

        let state = slices
            .into_iter()
            .fold(ApiState::builder().config(self.cfg).vfs(vfs), |builder, slice| {
                builder.register_slice(slice)
            })
            .build()
            .context("Failed to finalize API state registry")?;

        Ok(Server { state })
    }
}

/// A fully initialized server instance ready to run.
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct Server {
    state: ApiState,
}

impl Server {
    /// Returns a new [`ServerBuilder`] to configure the server.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Starts the server and runs until the shutdown signal is received.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind to the configured address
    /// or if TLS setup fails.
    pub async fn run(self) -> Result<()> {
        let cfg = self.state.config.clone();
        let address = SocketAddr::new(cfg.server.address, cfg.server.port);

        info!(
            address = %address,
            ssl = cfg.server.ssl.is_some(),
            "Starting server"
        );

        let app = router::init(self.state);

        let handle = Handle::<SocketAddr>::new();
        let shutdown_handle = handle.clone();

        // Spawn shutdown signal listener
        tokio::spawn(async move {
            shutdown_requested().await;
            info!("Shutdown signal received, starting graceful shutdown...");
            shutdown_handle.graceful_shutdown(Some(Duration::from_secs(30)));
        });

        if let Some(ssl_config) = &cfg.server.ssl {
            info!("Starting HTTPS server on https://{address}");

            let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
                &ssl_config.cert,
                &ssl_config.key,
            )
            .await
            .context("Failed to load SSL/TLS certificates")?;

            axum_server::bind_rustls(address, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .context("HTTPS server failed")?;
        } else {
            info!("Starting HTTP server on http://{address}");

            axum_server::bind(address)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .context("HTTP server failed")?;
        }

        info!("Server shutdown complete");
        Ok(())
    }

    /// Returns a reference to the application state.
    #[must_use]
    pub const fn state(&self) -> &ApiState {
        &self.state
    }

    /// Builds the full application router without binding a socket.
    ///
    /// Used by in-process tests that drive the API with `tower::oneshot`.
    #[must_use]
    pub fn into_router(self) -> axum::Router {
        router::init(self.state)
    }
}

/// Resolves once the process is asked to stop (Ctrl+C, or SIGTERM on Unix).
///
/// A signal source that cannot be installed is logged and parked forever
/// rather than treated as a shutdown; the other source keeps working.
async fn shutdown_requested() {
    let interrupt = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("Ctrl+C handler unavailable: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            },
            Err(err) => {
                error!("SIGTERM handler unavailable: {err}");
                std::future::pending::<()>().await;
            },
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => {},
        () = terminate => {},
    }
}

#[cfg(unix)]
fn warn_on_loose_key_mode(key: &std::path::Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = key.metadata()?.permissions().mode();
    if mode & 0o077 != 0 {
        let mode_octal = format!("{:o}", mode & 0o777);
        tracing::warn!(
            key = %key.display(),
            mode = %mode_octal,
            "TLS private key is readable by group/other; tighten it to 600"
        );
    }
    Ok(())
}
