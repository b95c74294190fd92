use axum::extract::FromRef;
use fhub_domain::config::ApiConfig;
use fhub_domain::registry::{FeatureSlice, InitializedSlice};
use fhub_vfs::Vfs;
use fxhash::FxHashMap;
use std::any::TypeId;
use std::ops::Deref;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum ApiStateError {
    #[error("state validation error: {0}")]
    Validation(&'static str),
    #[error("state missing feature slice: {0}")]
    MissingSlice(&'static str),
}

#[derive(Debug)]
pub struct ApiStateInner {
    pub config: ApiConfig,
    pub vfs: Vfs,
    slices: FxHashMap<TypeId, InitializedSlice>,
}

/// Shared application state: configuration, the sandboxed filesystem, and a
/// type-erased registry of initialized feature slices.
#[derive(Debug, Clone)]
pub struct ApiState {
    inner: Arc<ApiStateInner>,
}

impl ApiState {
    #[must_use]
    pub fn builder() -> ApiStateBuilder {
        ApiStateBuilder::default()
    }

    #[must_use]
    pub fn get_slice<T: FeatureSlice>(&self) -> Option<&T> {
        self.inner
            .slices
            .get(&TypeId::of::<T>())
            .and_then(|initialized| initialized.state.as_any().downcast_ref::<T>())
    }

    /// Returns a reference to the slice if it is registered.
    ///
    /// # Errors
    /// Returns an error if the slice is not registered.
    pub fn try_get_slice<T: FeatureSlice>(&self) -> Result<&T, ApiStateError> {
        self.get_slice::<T>()
            .ok_or_else(|| ApiStateError::MissingSlice(std::any::type_name::<T>()))
    }
}

impl Deref for ApiState {
    type Target = ApiStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FromRef<ApiState> for ApiConfig {
    fn from_ref(state: &ApiState) -> Self {
        state.inner.config.clone()
    }
}

impl FromRef<ApiState> for Vfs {
    fn from_ref(state: &ApiState) -> Self {
        state.inner.vfs.clone()
    }
}

#[derive(Debug, Default)]
pub struct ApiStateBuilder {
    config: Option<ApiConfig>,
    vfs: Option<Vfs>,
    slices: FxHashMap<TypeId, InitializedSlice>,
}

impl ApiStateBuilder {
    #[must_use]
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn vfs(mut self, vfs: Vfs) -> Self {
        self.vfs = Some(vfs);
        self
    }

    #[must_use]
    pub fn register_slice(mut self, slice: InitializedSlice) -> Self {
        self.slices.insert(slice.id, slice);
        self
    }

    pub fn build(self) -> Result<ApiState, ApiStateError> {
        let config = self.config.ok_or(ApiStateError::Validation("ApiConfig not provided"))?;
        let vfs = self.vfs.ok_or(ApiStateError::Validation("Vfs not provided"))?;

        Ok(ApiState { inner: Arc::new(ApiStateInner { config, vfs, slices: self.slices }) })
    }
}
