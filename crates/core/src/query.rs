// Query engine: substring search and offset/limit pagination

use crate::error::{A2tError, A2tResult};
use crate::types::{Group, Tool};

/// Validated pagination window. A `limit` of 0 means "everything from
/// `offset` on".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: usize,
}

impl PageRequest {
    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }

    /// Build from wire values, rejecting negatives instead of clamping them
    pub fn from_signed(offset: i64, limit: i64) -> A2tResult<Self> {
        let offset = usize::try_from(offset).map_err(|_| A2tError::InvalidPagination {
            field: "offset",
            value: offset,
        })?;
        let limit = usize::try_from(limit).map_err(|_| A2tError::InvalidPagination {
            field: "limit",
            value: limit,
        })?;
        Ok(Self { offset, limit })
    }

    /// Everything, unpaginated
    pub fn all() -> Self {
        Self::default()
    }

    /// Slice bounds for a match set of `total` items
    fn bounds(&self, total: usize) -> (usize, usize) {
        if self.offset >= total {
            return (total, total);
        }
        let end = if self.limit == 0 {
            total
        } else {
            self.offset.saturating_add(self.limit).min(total)
        };
        (self.offset, end)
    }
}

/// Items the query engine can search over
pub trait Searchable {
    fn search_name(&self) -> &str;
    fn search_description(&self) -> &str;
}

impl Searchable for Tool {
    fn search_name(&self) -> &str {
        &self.name
    }

    fn search_description(&self) -> &str {
        &self.description
    }
}

impl Searchable for Group {
    fn search_name(&self) -> &str {
        &self.name
    }

    fn search_description(&self) -> &str {
        &self.description
    }
}

/// Case-insensitive substring match on name or description.
/// An empty query matches everything.
pub fn matches_query(name: &str, description: &str, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let query = query.to_lowercase();
    name.to_lowercase().contains(&query) || description.to_lowercase().contains(&query)
}

/// A page of results plus the pre-pagination match count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
}

/// Filter `items` by `predicate` and `query`, then slice by `page`.
///
/// Input order is preserved, so callers must hand over items in a
/// deterministic order for pagination to be meaningful.
pub fn filter_and_paginate<T, I, P>(items: I, predicate: P, query: &str, page: PageRequest) -> Page<T>
where
    T: Searchable,
    I: IntoIterator<Item = T>,
    P: Fn(&T) -> bool,
{
    let mut matched: Vec<T> = items
        .into_iter()
        .filter(|item| predicate(item))
        .filter(|item| matches_query(item.search_name(), item.search_description(), query))
        .collect();

    let total = matched.len();
    let (start, end) = page.bounds(total);
    matched.truncate(end);
    let items = matched.split_off(start);

    Page { items, total }
}
