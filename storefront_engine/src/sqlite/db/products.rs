use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewProduct, Product},
    traits::{CatalogApiError, CheckoutError},
};

pub async fn insert_product(product: NewProduct, conn: &mut SqliteConnection) -> Result<Product, sqlx::Error> {
    let product: Product = sqlx::query_as(
        r#"
            INSERT INTO products (name, description, price, stock_quantity, category)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(product.name)
    .bind(product.description)
    .bind(product.price.value())
    .bind(product.stock_quantity)
    .bind(product.category)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Product '{}' inserted with id {}", product.name, product.id);
    Ok(product)
}

pub async fn fetch_product(product_id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    let product =
        sqlx::query_as("SELECT * FROM products WHERE id = $1").bind(product_id).fetch_optional(conn).await?;
    Ok(product)
}

/// Returns all products, newest first.
pub async fn fetch_products(conn: &mut SqliteConnection) -> Result<Vec<Product>, sqlx::Error> {
    let products = sqlx::query_as("SELECT * FROM products ORDER BY created_at DESC").fetch_all(conn).await?;
    Ok(products)
}

/// Sets the stock level to an absolute value. This is the administrative restock path; the checkout flow only ever
/// moves stock through [`reserve_stock`].
pub async fn restock_product(
    product_id: i64,
    new_quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<Product, CatalogApiError> {
    let product: Option<Product> = sqlx::query_as(
        "UPDATE products SET stock_quantity = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *",
    )
    .bind(new_quantity)
    .bind(product_id)
    .fetch_optional(conn)
    .await?;
    product.ok_or(CatalogApiError::ProductDoesNotExist(product_id))
}

/// The guarded decrement backing the inventory ledger.
///
/// The decrement and the availability comparison happen in a single conditional UPDATE, so two settlements can
/// never both read a stale stock value and over-decrement. When the guard fails, the current catalog row is read
/// back to report the product name and the units actually available.
pub async fn reserve_stock(
    product_id: i64,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<Product, CheckoutError> {
    let updated: Option<Product> = sqlx::query_as(
        r#"
            UPDATE products
            SET stock_quantity = stock_quantity - $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND stock_quantity >= $1
            RETURNING *;
        "#,
    )
    .bind(quantity)
    .bind(product_id)
    .fetch_optional(&mut *conn)
    .await?;
    match updated {
        Some(product) => {
            debug!("🗃️ Reserved {quantity} x '{}'. {} remain", product.name, product.stock_quantity);
            Ok(product)
        },
        None => match fetch_product(product_id, conn).await? {
            Some(product) => Err(CheckoutError::InsufficientStock {
                product: product.name,
                available: product.stock_quantity,
            }),
            None => Err(CheckoutError::DatabaseError(format!(
                "Product #{product_id} disappeared from the catalog during settlement"
            ))),
        },
    }
}
