//! Offset/limit paging with a one-row lookahead.

use serde::Serialize;

pub const DEFAULT_PAGE_LIMIT: usize = 20;
pub const MAX_PAGE_LIMIT: usize = 50;
/// Largest offset that still binds as a non-negative `BIGINT`.
pub const MAX_PAGE_OFFSET: usize = i64::MAX as usize - MAX_PAGE_LIMIT;

/// Offset/limit window over a newest-first listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl PageRequest {
    /// Missing values fall back to defaults; the limit is clamped to `1..=MAX_PAGE_LIMIT`
    /// and the offset to `MAX_PAGE_OFFSET`.
    pub fn new(offset: Option<usize>, limit: Option<usize>) -> Self {
        Self {
            offset: offset.unwrap_or(0).min(MAX_PAGE_OFFSET),
            limit: limit
                .unwrap_or(DEFAULT_PAGE_LIMIT)
                .clamp(1, MAX_PAGE_LIMIT),
        }
    }

    /// Rows a store should fetch: one more than the page size, so the caller
    /// can tell whether anything follows.
    pub fn fetch_limit(&self) -> usize {
        self.limit.saturating_add(1)
    }
}

/// One page of results.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub offset: usize,
    pub limit: usize,
    pub has_more: bool,
    pub next_offset: Option<usize>,
}

impl<T> Page<T> {
    /// Build a page from rows fetched with [`PageRequest::fetch_limit`].
    pub fn from_lookahead(mut rows: Vec<T>, request: PageRequest) -> Self {
        let has_more = rows.len() > request.limit;
        rows.truncate(request.limit);
        Self {
            items: rows,
            offset: request.offset,
            limit: request.limit,
            has_more,
            next_offset: has_more.then_some(request.offset.saturating_add(request.limit)),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            offset: self.offset,
            limit: self.limit,
            has_more: self.has_more,
            next_offset: self.next_offset,
        }
    }
}
