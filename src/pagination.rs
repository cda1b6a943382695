//! Sentinel pagination: an absent `limit`/`page` is `-1`, and a negative
//! limit or offset means "unbounded" to the store.

use serde::{Deserialize, Serialize};

/// Sentinel for "not supplied" / "unbounded".
pub const UNBOUNDED: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
    pub page: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: UNBOUNDED,
            offset: UNBOUNDED,
            page: UNBOUNDED,
        }
    }
}

impl Pagination {
    /// Normalizes raw query values. Absent or unparseable values become `-1`;
    /// the offset is only computed when at least one of them was supplied.
    pub fn from_query(limit: Option<&str>, page: Option<&str>) -> Self {
        let limit = parse_or_sentinel(limit);
        let page = parse_or_sentinel(page);
        let offset = if limit != UNBOUNDED || page != UNBOUNDED {
            (page - 1).saturating_mul(limit)
        } else {
            UNBOUNDED
        };
        Self { limit, offset, page }
    }

    /// `LIMIT` bind value; `None` renders as `LIMIT NULL` (no limit).
    pub fn sql_limit(&self) -> Option<i64> {
        (self.limit >= 0).then_some(self.limit)
    }

    /// `OFFSET` bind value; `None` renders as `OFFSET NULL` (no offset).
    pub fn sql_offset(&self) -> Option<i64> {
        (self.offset >= 0).then_some(self.offset)
    }

    /// Applies the window to an already filtered and ordered slice.
    pub fn apply<T: Clone>(&self, items: &[T]) -> Vec<T> {
        let skip = self.sql_offset().map_or(0, |o| o as usize);
        let iter = items.iter().skip(skip).cloned();
        match self.sql_limit() {
            Some(limit) => iter.take(limit as usize).collect(),
            None => iter.collect(),
        }
    }
}

/// One page of a filtered listing. `total_count` covers the whole filtered
/// set, not just `items`.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub total_count: i64,
    pub limit: i64,
    pub page: i64,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(total_count: i64, pagination: &Pagination, items: Vec<T>) -> Self {
        Self {
            total_count,
            limit: pagination.limit,
            page: pagination.page,
            items,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            total_count: self.total_count,
            limit: self.limit,
            page: self.page,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}

fn parse_or_sentinel(raw: Option<&str>) -> i64 {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(UNBOUNDED)
}
