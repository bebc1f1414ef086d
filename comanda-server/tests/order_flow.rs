//! Consistency-core tests: table occupancy, order lifecycle, checkout.

mod common;

use common::{admin_id, assert_occupancy_invariant, seed_menu, seed_table, setup_db};
use comanda_server::db::repository::{dining_table, order, transaction, user, RepoError};
use shared::models::{DetailOrderInput, SyncRolesRequest, DETAILS_COMPLETE, DETAILS_PENDING};
use shared::query::ListQuery;

fn item(food_id: i64, qty: i64, tips: Option<&str>) -> DetailOrderInput {
    DetailOrderInput {
        food_id,
        qty,
        tips: tips.map(|t| t.to_string()),
    }
}

#[tokio::test]
async fn seat_marks_table_occupied_and_busy_for_others() {
    let (_dir, pool) = setup_db().await;
    seed_table(&pool, 5).await;

    let seated = dining_table::seat(&pool, 5).await.unwrap();
    assert_eq!(seated.available, "N");

    // Seating again fails with the busy rule
    let err = dining_table::seat(&pool, 5).await.unwrap_err();
    assert!(matches!(err, RepoError::Business(_)));

    // Unknown table is a different failure
    let err = dining_table::seat(&pool, 99).await.unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[tokio::test]
async fn release_is_idempotent() {
    let (_dir, pool) = setup_db().await;
    seed_table(&pool, 7).await;

    dining_table::seat(&pool, 7).await.unwrap();
    assert!(dining_table::release(&pool, 7).await.unwrap());

    // Releasing an already-free table is a no-op, not an error
    assert!(!dining_table::release(&pool, 7).await.unwrap());
    let table = dining_table::find_by_number(&pool, 7).await.unwrap().unwrap();
    assert_eq!(table.available, "Y");

    // Unknown table: still a quiet no-op
    assert!(!dining_table::release(&pool, 99).await.unwrap());
}

#[tokio::test]
async fn concurrent_seat_attempts_have_one_winner() {
    let (_dir, pool) = setup_db().await;
    seed_table(&pool, 3).await;

    let (a, b) = tokio::join!(
        dining_table::seat(&pool, 3),
        dining_table::seat(&pool, 3),
    );

    let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one concurrent seat must win");

    let table = dining_table::find_by_number(&pool, 3).await.unwrap().unwrap();
    assert_eq!(table.available, "N");
}

#[tokio::test]
async fn reassignment_moves_occupancy_atomically() {
    let (_dir, pool) = setup_db().await;
    seed_table(&pool, 1).await;
    seed_table(&pool, 2).await;
    dining_table::seat(&pool, 1).await.unwrap();

    dining_table::set_table(&pool, Some(2), Some(1)).await.unwrap();

    let old = dining_table::find_by_number(&pool, 1).await.unwrap().unwrap();
    let new = dining_table::find_by_number(&pool, 2).await.unwrap().unwrap();
    assert_eq!(old.available, "Y");
    assert_eq!(new.available, "N");

    // Reassigning onto a busy table fails and rolls back entirely
    dining_table::seat(&pool, 1).await.unwrap();
    let err = dining_table::set_table(&pool, Some(2), Some(1)).await.unwrap_err();
    assert!(matches!(err, RepoError::Business(_)));
    let old = dining_table::find_by_number(&pool, 1).await.unwrap().unwrap();
    assert_eq!(old.available, "N", "failed reassignment must not release");
}

#[tokio::test]
async fn order_round_trips_with_line_items() {
    let (_dir, pool) = setup_db().await;
    let customer = admin_id(&pool).await;
    let (nasi, teh) = seed_menu(&pool).await;
    seed_table(&pool, 5).await;
    dining_table::seat(&pool, 5).await.unwrap();

    let placed = order::place(
        &pool,
        customer,
        5,
        &[item(nasi, 2, Some("extra spicy")), item(teh, 1, None)],
    )
    .await
    .unwrap();

    let loaded = order::find_with_details(&pool, placed.order.id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(loaded.order.status, "N");
    assert_eq!(loaded.order.details_complete, DETAILS_PENDING);
    assert_eq!(loaded.details.len(), 2);

    let first = loaded.details.iter().find(|d| d.food_id == nasi).unwrap();
    assert_eq!(first.qty, 2);
    assert_eq!(first.tips.as_deref(), Some("extra spicy"));
    assert!(first.served_at.is_none(), "served_at starts null");

    assert_occupancy_invariant(&pool).await;
}

#[tokio::test]
async fn placing_on_a_free_table_is_rejected() {
    let (_dir, pool) = setup_db().await;
    let customer = admin_id(&pool).await;
    let (nasi, _) = seed_menu(&pool).await;
    seed_table(&pool, 5).await;

    let err = order::place(&pool, customer, 5, &[item(nasi, 1, None)])
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Business(_)));
}

#[tokio::test]
async fn placing_with_unknown_food_is_rejected() {
    let (_dir, pool) = setup_db().await;
    let customer = admin_id(&pool).await;
    seed_menu(&pool).await;
    seed_table(&pool, 5).await;
    dining_table::seat(&pool, 5).await.unwrap();

    let err = order::place(&pool, customer, 5, &[item(424242, 1, None)])
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[tokio::test]
async fn concurrent_placements_converge_on_one_open_order() {
    let (_dir, pool) = setup_db().await;
    let customer = admin_id(&pool).await;
    let (nasi, teh) = seed_menu(&pool).await;
    let table_id = seed_table(&pool, 8).await;
    dining_table::seat(&pool, 8).await.unwrap();

    let items_a = [item(nasi, 1, None)];
    let items_b = [item(teh, 2, None)];
    let (a, b) = tokio::join!(
        order::place(&pool, customer, 8, &items_a),
        order::place(&pool, customer, 8, &items_b),
    );
    let a = a.unwrap();
    let b = b.unwrap();

    assert_eq!(a.order.id, b.order.id, "both placements share the open order");

    let open_orders: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE table_id = ? AND status = 'N'")
            .bind(table_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(open_orders, 1);

    // All four line items landed on the single order
    let loaded = order::find_with_details(&pool, a.order.id).await.unwrap().unwrap();
    assert_eq!(loaded.details.len(), 2);
}

#[tokio::test]
async fn serving_all_items_completes_the_order() {
    let (_dir, pool) = setup_db().await;
    let customer = admin_id(&pool).await;
    let (nasi, teh) = seed_menu(&pool).await;
    seed_table(&pool, 5).await;
    dining_table::seat(&pool, 5).await.unwrap();

    let placed = order::place(&pool, customer, 5, &[item(nasi, 2, None), item(teh, 1, None)])
        .await
        .unwrap();
    let order_id = placed.order.id;
    let first = placed.details[0].id;
    let second = placed.details[1].id;

    let after_first = order::serve_detail(&pool, order_id, first).await.unwrap();
    assert_eq!(after_first.order.details_complete, DETAILS_PENDING);

    let after_second = order::serve_detail(&pool, order_id, second).await.unwrap();
    assert_eq!(after_second.order.details_complete, DETAILS_COMPLETE);
    assert!(after_second.details.iter().all(|d| d.served_at.is_some()));

    // Re-serving keeps the original timestamp
    let original = after_second
        .details
        .iter()
        .find(|d| d.id == first)
        .unwrap()
        .served_at;
    let reserved = order::serve_detail(&pool, order_id, first).await.unwrap();
    let kept = reserved.details.iter().find(|d| d.id == first).unwrap().served_at;
    assert_eq!(original, kept);
}

#[tokio::test]
async fn serving_a_foreign_detail_is_not_found() {
    let (_dir, pool) = setup_db().await;
    let customer = admin_id(&pool).await;
    let (nasi, _) = seed_menu(&pool).await;
    seed_table(&pool, 5).await;
    seed_table(&pool, 6).await;
    dining_table::seat(&pool, 5).await.unwrap();
    dining_table::seat(&pool, 6).await.unwrap();

    let first = order::place(&pool, customer, 5, &[item(nasi, 1, None)]).await.unwrap();
    let second = order::place(&pool, customer, 6, &[item(nasi, 1, None)]).await.unwrap();

    // A detail id that belongs to another order does not resolve
    let err = order::serve_detail(&pool, first.order.id, second.details[0].id)
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[tokio::test]
async fn deleting_the_last_item_keeps_the_order_open() {
    let (_dir, pool) = setup_db().await;
    let customer = admin_id(&pool).await;
    let (nasi, _) = seed_menu(&pool).await;
    seed_table(&pool, 5).await;
    dining_table::seat(&pool, 5).await.unwrap();

    let placed = order::place(&pool, customer, 5, &[item(nasi, 1, None)]).await.unwrap();
    order::delete_detail(&pool, placed.order.id, placed.details[0].id)
        .await
        .unwrap();

    let loaded = order::find_with_details(&pool, placed.order.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.order.status, "N");
    assert!(loaded.details.is_empty());
}

#[tokio::test]
async fn deleting_an_order_cascades_to_line_items() {
    let (_dir, pool) = setup_db().await;
    let customer = admin_id(&pool).await;
    let (nasi, _) = seed_menu(&pool).await;
    seed_table(&pool, 5).await;
    dining_table::seat(&pool, 5).await.unwrap();

    let placed = order::place(&pool, customer, 5, &[item(nasi, 1, None)]).await.unwrap();
    order::delete(&pool, placed.order.id).await.unwrap();

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM detail_orders WHERE order_id = ?")
        .bind(placed.order.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}

#[tokio::test]
async fn checkout_computes_discounted_total_exactly() {
    let (_dir, pool) = setup_db().await;
    let cashier = admin_id(&pool).await;
    let (nasi, teh) = seed_menu(&pool).await;
    seed_table(&pool, 5).await;
    dining_table::seat(&pool, 5).await.unwrap();

    // 20000 @ 10% x 2 = 36000, plus 5000 x 3 = 15000
    let placed = order::place(&pool, cashier, 5, &[item(nasi, 2, None), item(teh, 3, None)])
        .await
        .unwrap();

    let created = transaction::checkout(&pool, placed.order.id, cashier).await.unwrap();
    assert_eq!(created.total_price, 51000.0);
    assert_eq!(created.order_id, placed.order.id);
    assert_eq!(created.user_id, cashier);
}

#[tokio::test]
async fn full_service_scenario() {
    let (_dir, pool) = setup_db().await;
    let staff = admin_id(&pool).await;
    let (nasi, teh) = seed_menu(&pool).await;
    seed_table(&pool, 5).await;

    // Seat table 5, place an order with two items
    dining_table::seat(&pool, 5).await.unwrap();
    let placed = order::place(&pool, staff, 5, &[item(nasi, 2, None), item(teh, 1, None)])
        .await
        .unwrap();
    assert_occupancy_invariant(&pool).await;

    // Serve items one by one
    let after_first = order::serve_detail(&pool, placed.order.id, placed.details[0].id)
        .await
        .unwrap();
    assert_eq!(after_first.order.details_complete, DETAILS_PENDING);

    let after_second = order::serve_detail(&pool, placed.order.id, placed.details[1].id)
        .await
        .unwrap();
    assert_eq!(after_second.order.details_complete, DETAILS_COMPLETE);

    // Checkout closes the order and frees the table
    transaction::checkout(&pool, placed.order.id, staff).await.unwrap();

    let table = dining_table::find_by_number(&pool, 5).await.unwrap().unwrap();
    assert_eq!(table.available, "Y");
    let closed = order::find_by_id(&pool, placed.order.id).await.unwrap().unwrap();
    assert_eq!(closed.status, "Y");
    assert_occupancy_invariant(&pool).await;
}

#[tokio::test]
async fn checkout_twice_does_not_double_charge() {
    let (_dir, pool) = setup_db().await;
    let cashier = admin_id(&pool).await;
    let (nasi, _) = seed_menu(&pool).await;
    seed_table(&pool, 5).await;
    dining_table::seat(&pool, 5).await.unwrap();

    let placed = order::place(&pool, cashier, 5, &[item(nasi, 1, None)]).await.unwrap();

    transaction::checkout(&pool, placed.order.id, cashier).await.unwrap();
    let err = transaction::checkout(&pool, placed.order.id, cashier)
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));

    let charges: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions WHERE order_id = ?")
        .bind(placed.order.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(charges, 1);
}

#[tokio::test]
async fn list_limit_convention() {
    let (_dir, pool) = setup_db().await;
    for number in 1..=20 {
        seed_table(&pool, number).await;
    }

    // Default limit paginates to 15 with metadata
    let (items, pagination) = dining_table::list(&pool, &ListQuery::default(), None, None)
        .await
        .unwrap();
    assert_eq!(items.len(), 15);
    let pagination = pagination.expect("default listing is paginated");
    assert_eq!(pagination.per_page, 15);
    assert_eq!(pagination.total, 20);
    assert_eq!(pagination.total_pages, 2);

    // limit <= 0 returns the full collection unpaginated
    for limit in [0, -1] {
        let query = ListQuery::with_limit(limit);
        let (items, pagination) = dining_table::list(&pool, &query, None, None).await.unwrap();
        assert_eq!(items.len(), 20);
        assert!(pagination.is_none());
    }

    // Unknown sort fields are ignored rather than failing the request
    let query = ListQuery {
        sort: Some("bogus,-number".to_string()),
        ..ListQuery::with_limit(0)
    };
    let (items, _) = dining_table::list(&pool, &query, None, None).await.unwrap();
    assert_eq!(items.first().unwrap().number, 20);
}

#[tokio::test]
async fn effective_permissions_are_the_union_of_roles() {
    let (_dir, pool) = setup_db().await;

    let created = user::create(
        &pool,
        shared::models::UserCreate {
            name: "Pat".to_string(),
            username: "pat".to_string(),
            password: "irrelevant-hash".to_string(),
        },
    )
    .await
    .unwrap();

    let waiter = sqlx::query_scalar::<_, i64>("SELECT id FROM roles WHERE name = 'waiter'")
        .fetch_one(&pool)
        .await
        .unwrap();
    let cashier = sqlx::query_scalar::<_, i64>("SELECT id FROM roles WHERE name = 'cashier'")
        .fetch_one(&pool)
        .await
        .unwrap();

    user::sync_roles(
        &pool,
        created.id,
        &SyncRolesRequest {
            roles_ids: vec![waiter, cashier],
        },
    )
    .await
    .unwrap();

    let granted = user::permissions_for(&pool, created.id).await.unwrap();
    assert!(granted.contains("table.update"), "from waiter");
    assert!(granted.contains("transaction.create"), "from cashier");
    assert!(!granted.contains("user.delete"), "granted to neither role");
}
