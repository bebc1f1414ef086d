//! List query types
//!
//! Every collection endpoint accepts the same base query string:
//! `search`, `sort` (comma-separated, `-` prefix = descending), `limit`
//! (`<= 0` means unpaginated) and `page`. Parameters arrive as raw
//! strings and are parsed leniently — invalid values degrade to "no
//! filter applied", list endpoints never reject their query string.

use serde::{Deserialize, Serialize};

/// Default page size when `limit` is absent
pub const DEFAULT_LIMIT: i64 = 15;

/// Base query parameters for collection endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    /// Free-text search term, OR-matched over the endpoint's allow-list
    pub search: Option<String>,
    /// `sort=col1,-col2` — left-to-right priority, `-` = descending
    pub sort: Option<String>,
    /// Page size; `<= 0` (or anything non-numeric) returns the full
    /// result set unpaginated
    pub limit: Option<String>,
    /// Page number, 1-based
    pub page: Option<String>,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// A single parsed `sort` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    pub field: String,
    pub order: SortOrder,
}

impl ListQuery {
    /// Effective page size: the explicit `limit`, or the default.
    /// A value `<= 0` — including unparseable input — disables
    /// pagination entirely.
    pub fn effective_limit(&self) -> i64 {
        match &self.limit {
            None => DEFAULT_LIMIT,
            Some(raw) => raw.trim().parse().unwrap_or(0),
        }
    }

    /// Whether the caller asked for a paginated response
    pub fn paginated(&self) -> bool {
        self.effective_limit() > 0
    }

    /// Current page, clamped to 1
    pub fn current_page(&self) -> i64 {
        self.page
            .as_deref()
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(1)
            .max(1)
    }

    /// Parse the `sort` parameter into ordered fields.
    /// Empty segments are dropped; validation against the allow-list
    /// happens at the query-building layer.
    pub fn sort_fields(&self) -> Vec<SortField> {
        let Some(sort) = &self.sort else {
            return Vec::new();
        };

        sort.split(',')
            .filter_map(|segment| {
                let segment = segment.trim();
                if segment.is_empty() || segment == "-" {
                    return None;
                }
                let (field, order) = match segment.strip_prefix('-') {
                    Some(rest) => (rest, SortOrder::Desc),
                    None => (segment, SortOrder::Asc),
                };
                Some(SortField {
                    field: field.to_string(),
                    order,
                })
            })
            .collect()
    }

    /// Convenience constructor for an explicit page size
    pub fn with_limit(limit: i64) -> Self {
        Self {
            limit: Some(limit.to_string()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_parses_directions_in_order() {
        let query = ListQuery {
            sort: Some("name,-created_at,price".to_string()),
            ..Default::default()
        };

        let fields = query.sort_fields();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].field, "name");
        assert_eq!(fields[0].order, SortOrder::Asc);
        assert_eq!(fields[1].field, "created_at");
        assert_eq!(fields[1].order, SortOrder::Desc);
        assert_eq!(fields[2].field, "price");
        assert_eq!(fields[2].order, SortOrder::Asc);
    }

    #[test]
    fn sort_skips_empty_segments() {
        let query = ListQuery {
            sort: Some(",,-,name,".to_string()),
            ..Default::default()
        };

        let fields = query.sort_fields();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].field, "name");
    }

    #[test]
    fn limit_zero_negative_or_garbage_disables_pagination() {
        for raw in ["0", "-1", "-15", "abc", ""] {
            let query = ListQuery {
                limit: Some(raw.to_string()),
                ..Default::default()
            };
            assert!(!query.paginated(), "limit={raw:?} must not paginate");
        }

        let query = ListQuery::default();
        assert!(query.paginated());
        assert_eq!(query.effective_limit(), DEFAULT_LIMIT);
    }

    #[test]
    fn page_falls_back_to_one() {
        for raw in [None, Some("0"), Some("-3"), Some("junk")] {
            let query = ListQuery {
                page: raw.map(|r| r.to_string()),
                ..Default::default()
            };
            assert_eq!(query.current_page(), 1);
        }

        let query = ListQuery {
            page: Some("4".to_string()),
            ..Default::default()
        };
        assert_eq!(query.current_page(), 4);
    }
}
