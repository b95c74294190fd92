use crate::entry::EntryKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use utoipa::ToSchema;

/// Presentation options carried by a share and editable after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ShareOptions {
    pub allow_uploads: bool,
    pub disable_viewer: bool,
    pub quick_download: bool,
    /// Advisory per-client bandwidth cap in bytes per second.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_bandwidth: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_mode: Option<String>,
}

/// The registry's internal record for one share.
///
/// `path` is the resolved filesystem target; `logical` is the client-facing
/// path the share was created from. The raw password never leaves the
/// registry; clients see only [`ShareView`].
#[derive(Debug, Clone)]
pub struct Share {
    pub id: String,
    pub path: PathBuf,
    pub logical: String,
    pub kind: EntryKind,
    /// Unix milliseconds.
    pub created_at: i64,
    /// Unix milliseconds; `None` means the share never expires.
    pub expires_at: Option<i64>,
    pub password: Option<String>,
    pub options: ShareOptions,
}

impl Share {
    /// True from the expiry instant onward.
    #[must_use]
    pub fn expired_at(&self, now_ms: i64) -> bool {
        self.expires_at.is_some_and(|at| at <= now_ms)
    }

    /// The client-safe projection of this share.
    #[must_use]
    pub fn view(&self) -> ShareView {
        ShareView {
            id: self.id.clone(),
            path: self.logical.clone(),
            kind: self.kind,
            created_at: self.created_at,
            expires_at: self.expires_at,
            has_password: self.password.is_some(),
            options: self.options.clone(),
        }
    }
}

/// Public projection of a [`Share`]: the raw password is replaced by a flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShareView {
    pub id: String,
    pub path: String,
    pub kind: EntryKind,
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    pub has_password: bool,
    #[serde(flatten)]
    pub options: ShareOptions,
}
