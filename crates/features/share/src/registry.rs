//! The process-local share registry.
//!
//! Deliberately in-memory and non-durable: a restart invalidates every share.
//! Expiry is lazy: any access that finds a share past its TTL removes it on
//! the spot, and listings sweep first.

use crate::error::ShareError;
use fhub_domain::entry::EntryKind;
use fhub_domain::share::{Share, ShareOptions, ShareView};
use fhub_kernel::safe_nanoid;
use fhub_vfs::Vfs;
use fxhash::FxHashMap;
use parking_lot::Mutex;
use tracing::info;

/// Share id length: 24 chars over a 55-symbol alphabet is ~139 bits.
const SHARE_ID_LEN: usize = 24;

/// Everything needed to mint a new share.
#[derive(Debug, Clone, Default)]
pub struct CreateShare {
    /// Logical path of the file or directory to expose.
    pub path: String,
    /// Lifetime in seconds; `None` or `0` means the share never expires.
    pub expires_in: Option<i64>,
    pub password: Option<String>,
    pub options: ShareOptions,
}

/// Partial update; absent fields keep their current value, except
/// `expires_in` whose absence (or `0`) clears the expiry.
#[derive(Debug, Clone, Default)]
pub struct UpdateShare {
    pub expires_in: Option<i64>,
    /// `Some("")` clears the password, `Some(value)` replaces it.
    pub password: Option<String>,
    pub allow_uploads: Option<bool>,
    pub disable_viewer: Option<bool>,
    pub quick_download: Option<bool>,
    pub max_bandwidth: Option<u64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub theme: Option<String>,
    pub view_mode: Option<String>,
}

/// Share feature state: the id-to-share map behind a single mutex.
#[derive(Debug, Default)]
pub struct Shares {
    entries: Mutex<FxHashMap<String, Share>>,
}

impl Shares {
    /// Validates the target and mints a new share.
    pub async fn create(&self, vfs: &Vfs, spec: CreateShare) -> Result<ShareView, ShareError> {
        if spec.path.trim().is_empty() {
            return Err(ShareError::BadRequest("path is required".into()));
        }
        if spec.expires_in.is_some_and(|secs| secs < 0) {
            return Err(ShareError::BadRequest("expiresIn must not be negative".into()));
        }

        let resolved = vfs.resolve(&spec.path)?;
        let meta = vfs.metadata(&spec.path).await?;
        let kind = if meta.is_dir() { EntryKind::Dir } else { EntryKind::File };

        let now = now_ms();
        let share = Share {
            id: safe_nanoid!(SHARE_ID_LEN),
            path: resolved,
            logical: spec.path,
            kind,
            created_at: now,
            expires_at: expiry_from(now, spec.expires_in),
            password: spec.password.filter(|p| !p.is_empty()),
            options: spec.options,
        };

        let view = share.view();
        info!(id = %share.id, path = %share.logical, "Share created");
        self.entries.lock().insert(share.id.clone(), share);
        Ok(view)
    }

    /// Metadata lookup with lazy expiry: an expired share is removed and
    /// reported as missing.
    pub fn get(&self, id: &str) -> Result<ShareView, ShareError> {
        let mut entries = self.entries.lock();
        let Some(share) = entries.get(id) else {
            return Err(ShareError::NotFound);
        };
        if share.expired_at(now_ms()) {
            entries.remove(id);
            return Err(ShareError::NotFound);
        }
        Ok(share.view())
    }

    /// Sweeps expired shares, then lists the rest (oldest first).
    pub fn list(&self) -> Vec<ShareView> {
        let now = now_ms();
        let mut entries = self.entries.lock();
        entries.retain(|_, share| !share.expired_at(now));

        let mut views: Vec<ShareView> = entries.values().map(Share::view).collect();
        views.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        views
    }

    /// Applies a partial update. The expiry is always re-derived: an absent
    /// or zero `expires_in` clears it, anything else restarts the TTL now.
    pub fn update(&self, id: &str, patch: UpdateShare) -> Result<ShareView, ShareError> {
        if patch.expires_in.is_some_and(|secs| secs < 0) {
            return Err(ShareError::BadRequest("expiresIn must not be negative".into()));
        }

        let mut entries = self.entries.lock();
        let Some(share) = entries.get_mut(id) else {
            return Err(ShareError::NotFound);
        };
        if share.expired_at(now_ms()) {
            entries.remove(id);
            return Err(ShareError::NotFound);
        }

        share.expires_at = expiry_from(now_ms(), patch.expires_in);
        if let Some(password) = patch.password {
            share.password = Some(password).filter(|p| !p.is_empty());
        }
        let options = &mut share.options;
        if let Some(v) = patch.allow_uploads {
            options.allow_uploads = v;
        }
        if let Some(v) = patch.disable_viewer {
            options.disable_viewer = v;
        }
        if let Some(v) = patch.quick_download {
            options.quick_download = v;
        }
        if let Some(v) = patch.max_bandwidth {
            options.max_bandwidth = Some(v);
        }
        if let Some(v) = patch.title {
            options.title = Some(v);
        }
        if let Some(v) = patch.description {
            options.description = Some(v);
        }
        if let Some(v) = patch.theme {
            options.theme = Some(v);
        }
        if let Some(v) = patch.view_mode {
            options.view_mode = Some(v);
        }

        Ok(share.view())
    }

    /// Removes a share outright.
    pub fn delete(&self, id: &str) -> Result<(), ShareError> {
        match self.entries.lock().remove(id) {
            Some(share) => {
                info!(id = %share.id, "Share deleted");
                Ok(())
            },
            None => Err(ShareError::NotFound),
        }
    }

    /// Password-gated access returning the full record for content handlers.
    ///
    /// Missing and expired shares are indistinguishable to the caller: both
    /// are `Gone` here (the share *link* is known, its target is not).
    pub fn access(&self, id: &str, password: Option<&str>) -> Result<Share, ShareError> {
        let mut entries = self.entries.lock();
        let Some(share) = entries.get(id) else {
            return Err(ShareError::Gone);
        };
        if share.expired_at(now_ms()) {
            entries.remove(id);
            return Err(ShareError::Gone);
        }
        if let Some(expected) = &share.password {
            if password != Some(expected.as_str()) {
                return Err(ShareError::AuthFailed);
            }
        }
        Ok(share.clone())
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn expiry_from(now: i64, expires_in: Option<i64>) -> Option<i64> {
    match expires_in {
        None | Some(0) => None,
        Some(secs) => Some(now + secs.saturating_mul(1000)),
    }
}
