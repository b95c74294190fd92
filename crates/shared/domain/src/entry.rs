use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Whether a directory entry is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
}

impl EntryKind {
    #[must_use]
    pub const fn is_dir(self) -> bool {
        matches!(self, Self::Dir)
    }
}

/// One row of a directory listing as handed to clients.
///
/// `size` is present for files only; `url` points into the public files base
/// (or a share-scoped download route) and is `None` for directories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DirectoryEntry {
    pub name: String,
    pub kind: EntryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Modification time in Unix milliseconds.
    pub mtime: i64,
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&EntryKind::Dir).unwrap(), "\"dir\"");
        assert_eq!(serde_json::to_string(&EntryKind::File).unwrap(), "\"file\"");
    }

    #[test]
    fn directory_entry_omits_size_for_dirs() {
        let entry = DirectoryEntry {
            name: "docs".to_owned(),
            kind: EntryKind::Dir,
            size: None,
            mtime: 0,
            url: None,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("size").is_none());
        assert!(json.get("url").unwrap().is_null());
    }
}
