use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{CartItem, CartLine};

pub async fn cart_item_exists(
    customer_id: &str,
    product_id: i64,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let existing: Option<CartItem> =
        sqlx::query_as("SELECT * FROM cart_items WHERE customer_id = $1 AND product_id = $2")
            .bind(customer_id)
            .bind(product_id)
            .fetch_optional(conn)
            .await?;
    Ok(existing.is_some())
}

pub async fn insert_cart_item(
    customer_id: &str,
    product_id: i64,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<CartItem, sqlx::Error> {
    let item: CartItem = sqlx::query_as(
        r#"
            INSERT INTO cart_items (customer_id, product_id, quantity)
            VALUES ($1, $2, $3)
            RETURNING *;
        "#,
    )
    .bind(customer_id)
    .bind(product_id)
    .bind(quantity)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Cart line added for {customer_id}: {quantity} x product #{product_id}");
    Ok(item)
}

/// Fetches the customer's cart joined with the current catalog details of each product, oldest line first.
pub async fn fetch_cart_lines(customer_id: &str, conn: &mut SqliteConnection) -> Result<Vec<CartLine>, sqlx::Error> {
    let lines = sqlx::query_as(
        r#"
        SELECT
            cart_items.product_id as product_id,
            products.name as name,
            products.price as unit_price,
            cart_items.quantity as quantity,
            products.stock_quantity as stock_quantity
        FROM cart_items JOIN products ON products.id = cart_items.product_id
        WHERE cart_items.customer_id = $1
        ORDER BY cart_items.created_at ASC"#,
    )
    .bind(customer_id)
    .fetch_all(conn)
    .await?;
    Ok(lines)
}

pub async fn remove_cart_item(
    customer_id: &str,
    product_id: i64,
    conn: &mut SqliteConnection,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM cart_items WHERE customer_id = $1 AND product_id = $2")
        .bind(customer_id)
        .bind(product_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

/// Removes every line in the customer's cart. Called from inside the settlement transaction.
pub async fn clear_cart(customer_id: &str, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM cart_items WHERE customer_id = $1").bind(customer_id).execute(conn).await?;
    debug!("🗃️ Cleared {} cart line(s) for {customer_id}", result.rows_affected());
    Ok(result.rows_affected())
}
