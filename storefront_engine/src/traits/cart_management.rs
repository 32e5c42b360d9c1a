use crate::{
    db_types::{CartItem, CartLine},
    traits::CartApiError,
};

/// Per-customer cart management.
///
/// A cart line is an intent, not a reservation: adding one performs an advisory stock check only. The authoritative
/// check happens inside the settlement transaction.
#[allow(async_fn_in_trait)]
pub trait CartManagement: Clone {
    /// Adds a line to the customer's cart. Fails if the quantity is less than 1, if the product is already in the
    /// cart (lines are never mutated), or if the requested quantity exceeds the currently available stock.
    async fn add_cart_item(&self, customer_id: &str, product_id: i64, quantity: i64)
        -> Result<CartItem, CartApiError>;

    /// The customer's cart lines joined with current product details, oldest first.
    async fn fetch_cart(&self, customer_id: &str) -> Result<Vec<CartLine>, CartApiError>;

    /// Removes the line for the given product. Returns the number of rows removed (0 or 1).
    async fn remove_cart_item(&self, customer_id: &str, product_id: i64) -> Result<u64, CartApiError>;
}
