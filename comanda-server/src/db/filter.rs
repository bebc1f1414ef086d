//! Generic list-query translation
//!
//! Every collection endpoint funnels its `search` / `sort` / `limit`
//! parameters through here. An endpoint declares an allow-list mapping of
//! public field name → actual column; anything outside the allow-list is
//! silently ignored, and column names only ever come from the allow-list —
//! user input is always bound, never spliced into SQL.

use shared::query::ListQuery;
use shared::response::Pagination;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use super::repository::RepoResult;

/// A bound value for a dynamically assembled condition
#[derive(Debug, Clone)]
pub enum SqlArg {
    Int(i64),
    Text(String),
}

/// One `WHERE` fragment plus its bound values, AND-combined with the rest
#[derive(Debug, Clone)]
pub struct Condition {
    pub sql: String,
    pub args: Vec<SqlArg>,
}

impl Condition {
    /// Equality condition on a fixed column
    pub fn eq_int(column: &str, value: i64) -> Self {
        Self {
            sql: format!("{column} = ?"),
            args: vec![SqlArg::Int(value)],
        }
    }

    /// Equality condition on a fixed column (text value)
    pub fn eq_text(column: &str, value: impl Into<String>) -> Self {
        Self {
            sql: format!("{column} = ?"),
            args: vec![SqlArg::Text(value.into())],
        }
    }

    /// `column IN (...)` condition
    pub fn in_ints(column: &str, values: &[i64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let placeholders = vec!["?"; values.len()].join(", ");
        Some(Self {
            sql: format!("{column} IN ({placeholders})"),
            args: values.iter().copied().map(SqlArg::Int).collect(),
        })
    }
}

/// Build the OR-match search condition over the allow-listed fields.
/// `None` when the term is absent/empty or no field is searchable.
pub fn search_condition(
    query: &ListQuery,
    fields: &'static [(&'static str, &'static str)],
) -> Option<Condition> {
    let term = query.search.as_deref()?.trim();
    if term.is_empty() || fields.is_empty() {
        return None;
    }

    let pattern = format!("%{term}%");
    let fragments: Vec<String> = fields
        .iter()
        .map(|(_, column)| format!("{column} LIKE ?"))
        .collect();

    Some(Condition {
        sql: format!("({})", fragments.join(" OR ")),
        args: vec![SqlArg::Text(pattern); fields.len()],
    })
}

/// Build the `ORDER BY` clause from the allow-listed sortable fields.
/// Unknown field names are skipped; an empty result means no clause.
pub fn order_clause(
    query: &ListQuery,
    fields: &'static [(&'static str, &'static str)],
) -> String {
    let parts: Vec<String> = query
        .sort_fields()
        .into_iter()
        .filter_map(|sort| {
            fields
                .iter()
                .find(|(public, _)| *public == sort.field)
                .map(|(_, column)| format!("{column} {}", sort.order.as_sql()))
        })
        .collect();

    if parts.is_empty() {
        String::new()
    } else {
        format!(" ORDER BY {}", parts.join(", "))
    }
}

fn push_args<'a>(builder: &mut QueryBuilder<'a, Sqlite>, sql: &str, args: &'a [SqlArg]) {
    // Split the fragment on `?` and interleave binds
    let mut pieces = sql.split('?');
    if let Some(first) = pieces.next() {
        builder.push(first);
    }
    for (piece, arg) in pieces.zip(args.iter()) {
        match arg {
            SqlArg::Int(v) => builder.push_bind(*v),
            SqlArg::Text(v) => builder.push_bind(v.as_str()),
        };
        builder.push(piece);
    }
}

fn build_where<'a>(builder: &mut QueryBuilder<'a, Sqlite>, conditions: &'a [Condition]) {
    for (i, condition) in conditions.iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        push_args(builder, &condition.sql, &condition.args);
    }
}

/// Run a list query: AND-combined conditions, allow-listed ordering, and
/// the limit convention (`limit > 0` paginates with metadata, `<= 0`
/// returns everything).
pub async fn fetch_list<T>(
    pool: &SqlitePool,
    base_select: &str,
    base_count: &str,
    conditions: Vec<Condition>,
    order_sql: String,
    query: &ListQuery,
) -> RepoResult<(Vec<T>, Option<Pagination>)>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    if !query.paginated() {
        let mut builder = QueryBuilder::new(base_select);
        build_where(&mut builder, &conditions);
        builder.push(&order_sql);
        let items = builder.build_query_as::<T>().fetch_all(pool).await?;
        return Ok((items, None));
    }

    let per_page = query.effective_limit();
    let page = query.current_page();

    let mut count_builder = QueryBuilder::new(base_count);
    build_where(&mut count_builder, &conditions);
    let total: i64 = count_builder
        .build_query_scalar()
        .fetch_one(pool)
        .await?;

    let mut builder = QueryBuilder::new(base_select);
    build_where(&mut builder, &conditions);
    builder.push(&order_sql);
    builder.push(" LIMIT ");
    builder.push_bind(per_page);
    builder.push(" OFFSET ");
    builder.push_bind((page - 1) * per_page);

    let items = builder.build_query_as::<T>().fetch_all(pool).await?;
    let pagination = Pagination::new(page as u32, per_page as u32, total as u64);
    Ok((items, Some(pagination)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: &[(&str, &str)] = &[("name", "name"), ("created_at", "created_at")];

    #[test]
    fn unknown_sort_columns_are_skipped() {
        let query = ListQuery {
            sort: Some("bogus,-created_at,also_bogus,name".to_string()),
            ..Default::default()
        };
        assert_eq!(
            order_clause(&query, FIELDS),
            " ORDER BY created_at DESC, name ASC"
        );
    }

    #[test]
    fn absent_sort_is_a_noop() {
        let query = ListQuery::default();
        assert_eq!(order_clause(&query, FIELDS), "");
    }

    #[test]
    fn search_builds_or_match_over_allow_list() {
        let query = ListQuery {
            search: Some("burger".to_string()),
            ..Default::default()
        };
        let condition = search_condition(&query, FIELDS).unwrap();
        assert_eq!(condition.sql, "(name LIKE ? OR created_at LIKE ?)");
        assert_eq!(condition.args.len(), 2);
    }

    #[test]
    fn blank_search_is_a_noop() {
        let query = ListQuery {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(search_condition(&query, FIELDS).is_none());
    }

    #[test]
    fn in_condition_skips_empty_lists() {
        assert!(Condition::in_ints("category_id", &[]).is_none());
        let condition = Condition::in_ints("category_id", &[1, 2, 3]).unwrap();
        assert_eq!(condition.sql, "category_id IN (?, ?, ?)");
    }
}
