//! First-start seeding
//!
//! Populates the RBAC graph (permission catalogue, default roles and
//! their grants) and a bootstrap admin account when the store is empty.

use sqlx::SqlitePool;

use super::repository::RepoResult;
use crate::auth::password::hash_password;
use shared::util::{now_millis, snowflake_id};

/// Permission contexts — one per managed entity
const CONTEXTS: &[&str] = &[
    "role",
    "permission",
    "user",
    "food",
    "order",
    "transaction",
    "table",
    "category",
];

/// Abilities available in every context
const ABILITIES: &[&str] = &[
    "index", "show", "create", "update", "delete", "import", "export",
];

/// Default role grants. `admin` gets the full catalogue separately.
const ROLE_GRANTS: &[(&str, &[&str])] = &[
    (
        "waiter",
        &[
            "food.index",
            "food.show",
            "food.import",
            "food.export",
            "order.index",
            "order.show",
            "order.update",
            "order.delete",
            "table.index",
            "table.show",
            "table.update",
            "table.delete",
        ],
    ),
    (
        "cashier",
        &[
            "transaction.index",
            "transaction.create",
            "transaction.show",
            "transaction.import",
            "transaction.export",
        ],
    ),
    (
        "customer",
        &["food.index", "food.show", "category.index", "order.create"],
    ),
    (
        "owner",
        &[
            "food.index",
            "food.show",
            "food.import",
            "food.export",
            "order.index",
            "order.show",
            "order.import",
            "order.export",
            "user.index",
            "user.show",
            "user.import",
            "user.export",
            "transaction.index",
            "transaction.import",
            "transaction.export",
            "role.index",
            "role.show",
            "role.import",
            "role.export",
            "permission.index",
            "permission.show",
            "permission.import",
            "permission.export",
            "category.index",
            "category.import",
            "category.export",
        ],
    ),
];

/// Bootstrap admin credentials; the password must be rotated on first login
const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "password";

/// Seed the RBAC graph and the admin user if the store is empty.
/// Subsequent starts are a no-op.
pub async fn ensure_seeded(pool: &SqlitePool) -> RepoResult<()> {
    let permission_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM permissions")
        .fetch_one(pool)
        .await?;
    if permission_count > 0 {
        return Ok(());
    }

    tracing::info!("Empty store detected, seeding RBAC graph and admin user");

    let mut tx = pool.begin().await?;
    let now = now_millis();

    // Full permission catalogue: <context>.<ability>
    for context in CONTEXTS {
        for ability in ABILITIES {
            sqlx::query(
                "INSERT INTO permissions (id, name, created_at, updated_at) VALUES (?, ?, ?, ?)",
            )
            .bind(snowflake_id())
            .bind(format!("{context}.{ability}"))
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }
    }

    // admin role holds every permission
    let admin_role_id = snowflake_id();
    sqlx::query("INSERT INTO roles (id, name, created_at, updated_at) VALUES (?, 'admin', ?, ?)")
        .bind(admin_role_id)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    sqlx::query(
        "INSERT INTO permission_role (permission_id, role_id) SELECT id, ? FROM permissions",
    )
    .bind(admin_role_id)
    .execute(&mut *tx)
    .await?;

    // Remaining roles with their grants
    for (role_name, grants) in ROLE_GRANTS {
        let role_id = snowflake_id();
        sqlx::query("INSERT INTO roles (id, name, created_at, updated_at) VALUES (?, ?, ?, ?)")
            .bind(role_id)
            .bind(role_name)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        for grant in *grants {
            sqlx::query(
                "INSERT INTO permission_role (permission_id, role_id) \
                 SELECT id, ? FROM permissions WHERE name = ?",
            )
            .bind(role_id)
            .bind(grant)
            .execute(&mut *tx)
            .await?;
        }
    }

    // Bootstrap admin user
    let password = hash_password(ADMIN_PASSWORD)
        .map_err(|e| super::repository::RepoError::Database(format!("Hashing failed: {e}")))?;
    let admin_user_id = snowflake_id();
    sqlx::query(
        "INSERT INTO users (id, name, username, password, created_at, updated_at) \
         VALUES (?, 'Administrator', ?, ?, ?, ?)",
    )
    .bind(admin_user_id)
    .bind(ADMIN_USERNAME)
    .bind(&password)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;
    sqlx::query("INSERT INTO role_user (role_id, user_id) VALUES (?, ?)")
        .bind(admin_role_id)
        .bind(admin_user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::warn!(
        username = ADMIN_USERNAME,
        "Seeded bootstrap admin with the default password, change it immediately"
    );
    Ok(())
}
