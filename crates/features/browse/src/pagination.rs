//! Pagination of directory listings at the HTTP layer.
//!
//! The directory service always returns the full sorted set; the window is
//! applied here. Two addressing styles are accepted: `page`/`pageSize`
//! (1-based) and `offset`/`limit`.

use fhub_kernel::prelude::{ApiError, ApiResult};
use serde::Serialize;
use utoipa::ToSchema;

const MAX_PAGE_SIZE: u32 = 1000;
const DEFAULT_PAGE_SIZE: u32 = 100;

/// The requested slice of the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Window {
    All,
    Page { page: u32, size: u32 },
    Offset { offset: u32, limit: u32 },
}

/// Parses raw query strings so malformed numbers surface as `BadRequest`
/// inside the JSON envelope rather than a framework rejection.
pub(crate) fn parse_window(
    page: Option<&str>,
    page_size: Option<&str>,
    offset: Option<&str>,
    limit: Option<&str>,
) -> ApiResult<Window> {
    if page.is_some() || page_size.is_some() {
        let page = parse_bounded(page, "page", 1, u32::MAX)?.unwrap_or(1);
        let size = parse_bounded(page_size, "pageSize", 1, MAX_PAGE_SIZE)?
            .unwrap_or(DEFAULT_PAGE_SIZE);
        return Ok(Window::Page { page, size });
    }

    if offset.is_some() || limit.is_some() {
        let offset = parse_bounded(offset, "offset", 0, u32::MAX)?.unwrap_or(0);
        let limit =
            parse_bounded(limit, "limit", 1, MAX_PAGE_SIZE)?.unwrap_or(DEFAULT_PAGE_SIZE);
        return Ok(Window::Offset { offset, limit });
    }

    Ok(Window::All)
}

fn parse_bounded(
    raw: Option<&str>,
    name: &str,
    min: u32,
    max: u32,
) -> ApiResult<Option<u32>> {
    let Some(raw) = raw else { return Ok(None) };
    let value = raw
        .trim()
        .parse::<u32>()
        .map_err(|_| ApiError::BadRequest(format!("{name} must be a non-negative integer").into()))?;
    if value < min || value > max {
        return Err(ApiError::BadRequest(format!("{name} must be between {min} and {max}").into()));
    }
    Ok(Some(value))
}

/// Echoed back alongside a windowed listing.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Pagination {
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Applies the window in place, returning the `pagination` echo when one was
/// requested.
pub(crate) fn apply<T>(window: Window, items: &mut Vec<T>) -> Option<Pagination> {
    let total = items.len();
    match window {
        Window::All => None,
        Window::Page { page, size } => {
            let start = (page as usize - 1).saturating_mul(size as usize);
            take_slice(items, start, size as usize);
            Some(Pagination {
                total,
                page: Some(page),
                page_size: Some(size),
                total_pages: Some(total.div_ceil(size as usize).max(1) as u32),
                offset: None,
                limit: None,
            })
        },
        Window::Offset { offset, limit } => {
            take_slice(items, offset as usize, limit as usize);
            Some(Pagination {
                total,
                page: None,
                page_size: None,
                total_pages: None,
                offset: Some(offset),
                limit: Some(limit),
            })
        },
    }
}

fn take_slice<T>(items: &mut Vec<T>, start: usize, len: usize) {
    if start >= items.len() {
        items.clear();
        return;
    }
    items.drain(..start);
    items.truncate(len);
}
