//! Food Repository

use super::{RepoError, RepoResult};
use crate::db::filter::{self, Condition};
use shared::models::{CategoryBrief, Food, FoodCreate, FoodUpdate};
use shared::query::ListQuery;
use shared::response::Pagination;
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

const SELECT: &str = "SELECT id, category_id, name, description, price, discount, image, created_at, updated_at FROM foods";
const COUNT: &str = "SELECT COUNT(*) FROM foods";

const SEARCHABLE: &[(&str, &str)] = &[
    ("name", "name"),
    ("description", "description"),
    ("price", "price"),
    ("discount", "discount"),
];

const SORTABLE: &[(&str, &str)] = &[
    ("id", "id"),
    ("name", "name"),
    ("description", "description"),
    ("price", "price"),
    ("discount", "discount"),
    ("created_at", "created_at"),
    ("updated_at", "updated_at"),
];

/// Entity-specific preset orderings (`filter=` query parameter).
/// Unknown values fall through to no ordering, like every other invalid
/// list parameter.
fn preset_order(preset: Option<&str>) -> Option<&'static str> {
    match preset {
        Some("new") => Some(" ORDER BY created_at DESC"),
        Some("random") => Some(" ORDER BY RANDOM()"),
        Some("popular") => Some(
            " ORDER BY (SELECT COUNT(*) FROM detail_orders d WHERE d.food_id = foods.id) DESC",
        ),
        Some("name") => Some(" ORDER BY name ASC"),
        Some("price") => Some(" ORDER BY price ASC"),
        _ => None,
    }
}

pub async fn list(
    pool: &SqlitePool,
    query: &ListQuery,
    categories: &[i64],
    preset: Option<&str>,
) -> RepoResult<(Vec<Food>, Option<Pagination>)> {
    let mut conditions = Vec::new();
    if let Some(search) = filter::search_condition(query, SEARCHABLE) {
        conditions.push(search);
    }
    if let Some(in_categories) = Condition::in_ints("category_id", categories) {
        conditions.push(in_categories);
    }

    // An explicit sort wins over the preset ordering
    let mut order = filter::order_clause(query, SORTABLE);
    if order.is_empty()
        && let Some(preset_sql) = preset_order(preset)
    {
        order = preset_sql.to_string();
    }

    filter::fetch_list(pool, SELECT, COUNT, conditions, order, query).await
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Food>> {
    let sql = format!("{SELECT} ORDER BY name");
    let foods = sqlx::query_as::<_, Food>(&sql).fetch_all(pool).await?;
    Ok(foods)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Food>> {
    let sql = format!("{SELECT} WHERE id = ?");
    let food = sqlx::query_as::<_, Food>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(food)
}

pub async fn category_of(pool: &SqlitePool, food: &Food) -> RepoResult<Option<CategoryBrief>> {
    let brief = sqlx::query_as::<_, CategoryBrief>("SELECT id, name FROM categories WHERE id = ?")
        .bind(food.category_id)
        .fetch_optional(pool)
        .await?;
    Ok(brief)
}

async fn require_category(pool: &SqlitePool, category_id: i64) -> RepoResult<()> {
    let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM categories WHERE id = ?")
        .bind(category_id)
        .fetch_optional(pool)
        .await?;
    if exists.is_none() {
        return Err(RepoError::NotFound("Category not found.".into()));
    }
    Ok(())
}

pub async fn create(pool: &SqlitePool, data: FoodCreate, image: Option<String>) -> RepoResult<Food> {
    require_category(pool, data.category_id).await?;

    let id = snowflake_id();
    let now = now_millis();
    sqlx::query(
        "INSERT INTO foods (id, category_id, name, description, price, discount, image, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(data.category_id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.price)
    .bind(data.discount)
    .bind(image)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create food".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: FoodUpdate) -> RepoResult<Food> {
    if let Some(category_id) = data.category_id {
        require_category(pool, category_id).await?;
    }

    let rows = sqlx::query(
        "UPDATE foods SET category_id = COALESCE(?1, category_id), name = COALESCE(?2, name), \
         description = COALESCE(?3, description), price = COALESCE(?4, price), \
         discount = COALESCE(?5, discount), updated_at = ?6 WHERE id = ?7",
    )
    .bind(data.category_id)
    .bind(data.name)
    .bind(data.description)
    .bind(data.price)
    .bind(data.discount)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound("Food not found.".into()));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound("Food not found.".into()))
}

/// Swap the stored image path, returning the previous one so the caller
/// can remove the stale asset.
pub async fn update_image(
    pool: &SqlitePool,
    id: i64,
    image: &str,
) -> RepoResult<Option<String>> {
    let existing = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound("Food not found.".into()))?;

    sqlx::query("UPDATE foods SET image = ?, updated_at = ? WHERE id = ?")
        .bind(image)
        .bind(now_millis())
        .bind(id)
        .execute(pool)
        .await?;

    Ok(existing.image)
}

/// Delete the food, returning its image path for asset cleanup
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<Option<String>> {
    let existing = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound("Food not found.".into()))?;

    sqlx::query("DELETE FROM foods WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(existing.image)
}

/// Insert a row verbatim (spreadsheet import); row data is trusted
pub async fn insert_imported(
    pool: &SqlitePool,
    category_id: i64,
    name: &str,
    description: &str,
    price: f64,
    discount: i64,
    image: Option<&str>,
) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO foods (id, category_id, name, description, price, discount, image, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(snowflake_id())
    .bind(category_id)
    .bind(name)
    .bind(description)
    .bind(price)
    .bind(discount)
    .bind(image)
    .bind(now_millis())
    .bind(now_millis())
    .execute(pool)
    .await?;
    Ok(())
}
