//! Shared test fixtures

use comanda_server::db::repository::{category, dining_table, food, user};
use comanda_server::db::DbService;
use sqlx::SqlitePool;
use tempfile::TempDir;

use shared::models::{CategoryCreate, DiningTableCreate, FoodCreate};

/// Fresh file-backed database in a scratch directory, fully migrated and
/// seeded. The TempDir must be kept alive for the duration of the test.
pub async fn setup_db() -> (TempDir, SqlitePool) {
    let dir = TempDir::new().expect("Failed to create scratch dir");
    let path = dir.path().join("comanda.db");
    let service = DbService::new(&path.to_string_lossy())
        .await
        .expect("Failed to initialize test database");
    (dir, service.pool)
}

/// The seeded bootstrap admin
pub async fn admin_id(pool: &SqlitePool) -> i64 {
    user::find_by_username(pool, "admin")
        .await
        .expect("Failed to query admin")
        .expect("Seeded admin missing")
        .id
}

/// A category with two foods: 20000 @ 10% discount and 5000 @ none.
/// Returns (discounted_food_id, plain_food_id).
pub async fn seed_menu(pool: &SqlitePool) -> (i64, i64) {
    let menu = category::create(
        pool,
        CategoryCreate {
            name: "Mains".to_string(),
        },
    )
    .await
    .expect("Failed to create category");

    let discounted = food::create(
        pool,
        FoodCreate {
            category_id: menu.id,
            name: "Nasi Goreng".to_string(),
            description: "Fried rice with chicken".to_string(),
            price: 20000.0,
            discount: 10,
        },
        None,
    )
    .await
    .expect("Failed to create food");

    let plain = food::create(
        pool,
        FoodCreate {
            category_id: menu.id,
            name: "Es Teh".to_string(),
            description: "Iced tea".to_string(),
            price: 5000.0,
            discount: 0,
        },
        None,
    )
    .await
    .expect("Failed to create food");

    (discounted.id, plain.id)
}

/// A free table with the given number
pub async fn seed_table(pool: &SqlitePool, number: i64) -> i64 {
    dining_table::create(pool, DiningTableCreate { number })
        .await
        .expect("Failed to create table")
        .id
}

/// Core invariant: a table is occupied exactly when it has an open order.
/// Holds at every rest point of the order lifecycle (a freshly seated
/// table that has not ordered yet is the deliberate exception).
pub async fn assert_occupancy_invariant(pool: &SqlitePool) {
    let violations: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM tables t \
         WHERE (t.available = 'N') != \
               (EXISTS (SELECT 1 FROM orders o WHERE o.table_id = t.id AND o.status = 'N'))",
    )
    .fetch_one(pool)
    .await
    .expect("Failed to check invariant");
    assert_eq!(
        violations, 0,
        "occupancy flag and open-order existence diverged"
    );
}
