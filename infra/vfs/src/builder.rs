use crate::engine::{Vfs, VfsInner};
use crate::error::{VfsError, VfsResult};
use crate::maintenance;
use private::Sealed;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::time::Duration;
use tokio::fs;
use tracing::info;

const DEFAULT_SCRATCH_TTL: Duration = Duration::from_secs(86_400);

#[derive(Debug, Clone)]
struct VfsConfig {
    create: bool,
    scratch_ttl: Duration,
}

impl Default for VfsConfig {
    fn default() -> Self {
        Self { create: true, scratch_ttl: DEFAULT_SCRATCH_TTL }
    }
}

#[derive(Debug, Default)]
pub struct NoRoot;
#[derive(Debug)]
pub struct WithRoot(PathBuf);

mod private {
    pub(super) trait Sealed {}
}
impl Sealed for NoRoot {}
impl Sealed for WithRoot {}

/// Type-safe fluent builder for a [`Vfs`] handle.
#[allow(private_bounds)]
#[derive(Debug, Default)]
pub struct VfsBuilder<S: Sealed = NoRoot> {
    state: S,
    config: VfsConfig,
}

#[allow(private_bounds)]
impl<S: Sealed> VfsBuilder<S> {
    /// Whether to create the root directory when it does not exist yet.
    #[must_use = "Sets whether the root should be created if missing"]
    pub const fn create(mut self, enable: bool) -> Self {
        self.config.create = enable;
        self
    }

    /// Age after which abandoned upload chunks are swept on connect.
    #[must_use = "Sets the stale-scratch sweep threshold"]
    pub const fn scratch_ttl(mut self, ttl: Duration) -> Self {
        self.config.scratch_ttl = ttl;
        self
    }

    fn transition<N: Sealed>(self, state: N) -> VfsBuilder<N> {
        VfsBuilder { state, config: self.config }
    }
}

impl VfsBuilder<NoRoot> {
    #[must_use = "Creates a new builder with default configuration"]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the storage root every logical path resolves under.
    #[must_use = "Sets the root directory"]
    pub fn root(self, path: impl Into<PathBuf>) -> VfsBuilder<WithRoot> {
        self.transition(WithRoot(path.into()))
    }
}

impl VfsBuilder<WithRoot> {
    /// Consumes the configuration and initializes the filesystem handle.
    ///
    /// Boot sequence: create the root (when configured), canonicalize it so
    /// containment checks compare like with like, then sweep scratch files
    /// left behind by abandoned uploads. The sweep is best-effort; failures
    /// are logged and never abort startup.
    ///
    /// # Errors
    /// Returns [`VfsError::Io`] when the root cannot be created or resolved.
    pub async fn connect(self) -> VfsResult<Vfs> {
        let root = &self.state.0;

        if self.config.create {
            fs::create_dir_all(root).await.map_err(|source| VfsError::Io { source })?;
            info!(path = %root.display(), "Bootstrapped storage root directory");
        }

        let canonical =
            fs::canonicalize(root).await.map_err(|source| VfsError::Io { source })?;

        let vfs = Vfs {
            inner: Arc::new(VfsInner {
                root: canonical,
                scratch_ttl: self.config.scratch_ttl,
                tmp_counter: AtomicU64::new(1),
            }),
        };

        maintenance::sweep_scratch(vfs.root(), vfs.scratch_ttl).await;

        Ok(vfs)
    }
}
