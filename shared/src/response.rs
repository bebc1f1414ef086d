//! API Response types
//!
//! Standardized response structures shared by every endpoint.

use serde::{Deserialize, Serialize};

/// Unified API response structure
///
/// All API responses follow this format:
/// ```json
/// {
///     "ok": true,
///     "message": "Success to get tables collection.",
///     "data": { ... }
/// }
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request succeeded
    pub ok: bool,
    /// Human-readable message
    pub message: String,
    /// Response data (null on failures and empty successes)
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            ok: true,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Create an error response
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            data: None,
        }
    }
}

impl ApiResponse<()> {
    /// Create a successful response without a payload
    pub fn ok_empty(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
            data: None,
        }
    }
}

/// Pagination metadata
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Pagination {
    /// Current page number (1-based)
    pub page: u32,
    /// Items per page
    pub per_page: u32,
    /// Total number of items
    pub total: u64,
    /// Total number of pages
    pub total_pages: u32,
}

impl Pagination {
    pub fn new(page: u32, per_page: u32, total: u64) -> Self {
        let total_pages = if per_page == 0 {
            0
        } else {
            ((total as f64) / (per_page as f64)).ceil() as u32
        };
        Self {
            page,
            per_page,
            total,
            total_pages,
        }
    }
}

/// Paginated response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, page: u32, per_page: u32, total: u64) -> Self {
        Self {
            items,
            pagination: Pagination::new(page, per_page, total),
        }
    }
}

/// Collection payload — paginated when the caller asked for a page,
/// the plain full set otherwise (`limit <= 0`).
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ListPayload<T> {
    Paged(PaginatedResponse<T>),
    All(Vec<T>),
}

impl<T> ListPayload<T> {
    pub fn from_parts(items: Vec<T>, pagination: Option<Pagination>) -> Self {
        match pagination {
            Some(p) => Self::Paged(PaginatedResponse {
                items,
                pagination: p,
            }),
            None => Self::All(items),
        }
    }
}
