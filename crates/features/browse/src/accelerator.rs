//! Optional read-only listing accelerator.
//!
//! When configured, directory listings first ask an internal HTTP service
//! for the entry set and fall back to the local readdir path on any failure.
//! The two paths must be observably identical, so this module only produces
//! raw entries; decoration and sorting are shared with the local path.

use fhub_domain::entry::EntryKind;
use fhub_vfs::{RawEntry, encode_segments, sort_entries};
use serde::Deserialize;
use tracing::debug;

/// Wire shape the accelerator speaks: either a bare array of entries or a
/// single-key object wrapping one.
#[derive(Debug, Deserialize)]
struct WireEntry {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    mtime: i64,
    size: Option<u64>,
}

/// Fetches and normalizes a listing. `None` means "fall back to readdir";
/// transport errors, bad statuses, and undecodable bodies all end up there.
pub(crate) async fn fetch_listing(
    client: &reqwest::Client,
    base_url: &str,
    logical: &str,
) -> Option<Vec<RawEntry>> {
    let url = format!("{}{}", base_url.trim_end_matches('/'), encode_segments(logical));

    let response = match client.get(&url).send().await {
        Ok(response) => response,
        Err(err) => {
            debug!(url, error = %err, "Accelerator unreachable; using readdir");
            return None;
        },
    };
    if !response.status().is_success() {
        debug!(url, status = %response.status(), "Accelerator refused; using readdir");
        return None;
    }

    let body: serde_json::Value = match response.json().await {
        Ok(body) => body,
        Err(err) => {
            debug!(url, error = %err, "Accelerator body unreadable; using readdir");
            return None;
        },
    };

    let wire: Vec<WireEntry> = match unwrap_entries(body) {
        Some(wire) => wire,
        None => {
            debug!(url, "Accelerator body shape unexpected; using readdir");
            return None;
        },
    };

    let mut entries: Vec<RawEntry> = wire
        .into_iter()
        .filter(|entry| entry.name != "." && entry.name != "..")
        .filter_map(|entry| {
            let kind = match entry.kind.as_str() {
                "file" => EntryKind::File,
                "dir" | "directory" => EntryKind::Dir,
                _ => return None,
            };
            Some(RawEntry {
                name: entry.name,
                kind,
                size: (kind == EntryKind::File).then_some(entry.size.unwrap_or(0)),
                mtime: entry.mtime,
            })
        })
        .collect();

    sort_entries(&mut entries);
    Some(entries)
}

/// Accepts `[{...}]` or `{"anything": [{...}]}`.
fn unwrap_entries(body: serde_json::Value) -> Option<Vec<WireEntry>> {
    let array = match body {
        serde_json::Value::Array(_) => body,
        serde_json::Value::Object(map) if map.len() == 1 => {
            map.into_iter().next().map(|(_, v)| v)?
        },
        _ => return None,
    };
    serde_json::from_value(array).ok()
}
