//! Pagination utilities
//!
//! Page numbers are 1-indexed. `total_pages = ceil(total / limit)`.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Page used when the client sends none
pub const DEFAULT_PAGE: i64 = 1;
/// Page size used when the client sends none
pub const DEFAULT_LIMIT: i64 = 10;
/// Largest page size a client may request
pub const MAX_LIMIT: i64 = 100;

/// Raw `?page=&limit=` query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Validated page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: i64,
    /// Rows per page
    pub limit: i64,
    /// Offset for SQL LIMIT/OFFSET query
    pub offset: i64,
}

impl PageQuery {
    /// Apply defaults and reject out-of-range values.
    ///
    /// # Examples
    /// ```
    /// use holocron_common::pagination::PageQuery;
    ///
    /// let p = PageQuery { page: Some(2), limit: Some(5) }.resolve().unwrap();
    /// assert_eq!(p.offset, 5);
    ///
    /// let p = PageQuery::default().resolve().unwrap();
    /// assert_eq!((p.page, p.limit, p.offset), (1, 10, 0));
    ///
    /// assert!(PageQuery { page: Some(0), limit: None }.resolve().is_err());
    /// ```
    pub fn resolve(self) -> Result<Pagination> {
        let page = self.page.unwrap_or(DEFAULT_PAGE);
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT);

        if page < 1 {
            return Err(Error::InvalidInput("page must not be less than 1".to_string()));
        }
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(Error::InvalidInput(format!(
                "limit must be between 1 and {}",
                MAX_LIMIT
            )));
        }

        let offset = (page - 1)
            .checked_mul(limit)
            .ok_or_else(|| Error::InvalidInput(format!("page {} is out of range", page)))?;

        Ok(Pagination {
            page,
            limit,
            offset,
        })
    }
}

/// Pagination metadata returned next to every page of results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
}

impl PaginationMeta {
    pub fn new(total: i64, page: i64, limit: i64) -> Self {
        let total_pages = if limit > 0 { (total + limit - 1) / limit } else { 0 };

        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }
}

/// One page of results: `{ data, meta }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total: i64, pagination: Pagination) -> Self {
        Self {
            data,
            meta: PaginationMeta::new(total, pagination.page, pagination.limit),
        }
    }
}
