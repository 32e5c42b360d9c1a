use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{Customer, NewCustomer};

pub async fn insert_customer(customer: NewCustomer, conn: &mut SqliteConnection) -> Result<Customer, sqlx::Error> {
    let customer: Customer = sqlx::query_as(
        r#"
            INSERT INTO customers (customer_id, email, first_name, last_name)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(customer.customer_id)
    .bind(customer.email)
    .bind(customer.first_name)
    .bind(customer.last_name)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Customer {} registered with id {}", customer.customer_id, customer.id);
    Ok(customer)
}

pub async fn fetch_customer_by_id(
    customer_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Customer>, sqlx::Error> {
    let customer =
        sqlx::query_as("SELECT * FROM customers WHERE customer_id = $1").bind(customer_id).fetch_optional(conn).await?;
    Ok(customer)
}

pub async fn fetch_customer_by_email(
    email: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Customer>, sqlx::Error> {
    let customer =
        sqlx::query_as("SELECT * FROM customers WHERE email = $1").bind(email).fetch_optional(conn).await?;
    Ok(customer)
}
