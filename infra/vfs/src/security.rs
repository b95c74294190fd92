use crate::error::{VfsError, VfsResult};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::path::{Path, PathBuf};

/// Everything outside RFC 3986 "unreserved" gets percent-encoded.
const SEGMENT: &AsciiSet =
    &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Lexically resolves a `/`-rooted logical path against the sandbox root.
///
/// `.` segments and empty segments collapse; `..` pops the previously pushed
/// segment and fails once it would climb above the root. The check is purely
/// lexical: symlinks inside the root are a deployment concern, not ours.
pub(crate) fn resolve_logical(root: &Path, logical: &str) -> VfsResult<PathBuf> {
    let mut rel = PathBuf::new();

    for segment in logical.split('/') {
        match segment {
            "" | "." => {},
            ".." => {
                if !rel.pop() {
                    return Err(VfsError::PathEscaped { path: logical.to_owned() });
                }
            },
            other => {
                // A segment that parses as a root or drive prefix would break
                // out of the join below.
                if Path::new(other).is_absolute() || other.contains('\\') {
                    return Err(VfsError::PathEscaped { path: logical.to_owned() });
                }
                rel.push(other);
            },
        }
    }

    Ok(root.join(rel))
}

/// Percent-encodes each segment of a logical path, preserving `/` separators.
///
/// Used when embedding logical paths into accelerator or public-base URLs.
#[must_use]
pub fn encode_segments(logical: &str) -> String {
    logical
        .split('/')
        .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}
