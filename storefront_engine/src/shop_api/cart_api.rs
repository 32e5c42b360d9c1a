use crate::{
    db_types::{CartItem, CartLine},
    traits::{CartApiError, CartManagement},
};

/// Thin API wrapper around per-customer cart behaviour.
#[derive(Debug, Clone)]
pub struct CartApi<B> {
    db: B,
}

impl<B> CartApi<B>
where B: CartManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn add_item(&self, customer_id: &str, product_id: i64, quantity: i64) -> Result<CartItem, CartApiError> {
        self.db.add_cart_item(customer_id, product_id, quantity).await
    }

    pub async fn cart(&self, customer_id: &str) -> Result<Vec<CartLine>, CartApiError> {
        self.db.fetch_cart(customer_id).await
    }

    pub async fn remove_item(&self, customer_id: &str, product_id: i64) -> Result<u64, CartApiError> {
        self.db.remove_cart_item(customer_id, product_id).await
    }
}
