use log::debug;
use sqlx::SqliteConnection;
use storefront_common::Birr;

use crate::{
    db_types::{NewOrder, Order, OrderItem, TxRef},
    traits::CheckoutError,
};

/// Inserts a new order. The unique constraint on `tx_ref` is the backstop against double settlement; a violation is
/// reported as [`CheckoutError::DuplicateTxRef`] so callers can recover the existing order.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, CheckoutError> {
    let result: Result<Order, sqlx::Error> = sqlx::query_as(
        r#"
            INSERT INTO orders (order_id, customer_id, tx_ref, total_amount)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(order.order_id)
    .bind(order.customer_id)
    .bind(order.tx_ref.as_str())
    .bind(order.total_amount.value())
    .fetch_one(conn)
    .await;
    match result {
        Ok(order) => {
            debug!("🗃️ Order {} inserted with id {}", order.order_id, order.id);
            Ok(order)
        },
        Err(sqlx::Error::Database(e)) if e.message().contains("UNIQUE constraint failed: orders.tx_ref") => {
            Err(CheckoutError::DuplicateTxRef(order.tx_ref))
        },
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_order_by_tx_ref(tx_ref: &TxRef, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order =
        sqlx::query_as("SELECT * FROM orders WHERE tx_ref = $1").bind(tx_ref.as_str()).fetch_optional(conn).await?;
    Ok(order)
}

/// Returns all orders for the customer, oldest first.
pub async fn fetch_orders_for_customer(
    customer_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders WHERE customer_id = $1 ORDER BY created_at ASC")
        .bind(customer_id)
        .fetch_all(conn)
        .await?;
    Ok(orders)
}

pub async fn insert_order_item(
    order_id: i64,
    product_id: i64,
    price_at_purchase: Birr,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<OrderItem, sqlx::Error> {
    let item = sqlx::query_as(
        r#"
            INSERT INTO order_items (order_id, product_id, price_at_purchase, quantity)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(product_id)
    .bind(price_at_purchase.value())
    .bind(quantity)
    .fetch_one(conn)
    .await?;
    Ok(item)
}

pub async fn fetch_order_items(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    let items = sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id ASC")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(items)
}
