use crate::{
    db_types::{Order, OrderItem, TxRef},
    traits::{CheckoutError, NewSettlement, SettlementOutcome},
};

/// The settlement core of a storefront backend.
///
/// This behaviour includes:
/// * Atomically converting a set of cart lines into an order (the *settlement*).
/// * Guaranteeing the stock invariant: no product's stock ever goes negative, under any mix of concurrent
///   settlements.
/// * Idempotent handling of repeated settlement requests for the same transaction reference.
#[allow(async_fn_in_trait)]
pub trait CheckoutDatabase: Clone {
    /// Settles an order in a single atomic transaction:
    /// * If an order already exists for the transaction reference, it is returned unchanged
    ///   ([`SettlementOutcome::AlreadySettled`]) and nothing is written.
    /// * Otherwise, for every line, in ascending product-id order, the product's stock is decremented only if
    ///   sufficient; any shortfall aborts the whole transaction with [`CheckoutError::InsufficientStock`] and no
    ///   partial effect.
    /// * On success: the order and its line items are created (unit prices snapshotted from the catalog inside the
    ///   transaction), the sales totals are updated additively, and the customer's cart is cleared.
    async fn settle_order(&self, settlement: NewSettlement) -> Result<SettlementOutcome, CheckoutError>;

    /// Returns the order for the given transaction reference, if one exists.
    async fn fetch_order_by_tx_ref(&self, tx_ref: &TxRef) -> Result<Option<Order>, CheckoutError>;

    /// Returns all orders for the given customer, oldest first.
    async fn fetch_orders_for_customer(&self, customer_id: &str) -> Result<Vec<Order>, CheckoutError>;

    /// Returns the line items for the given order (by internal order id).
    async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, CheckoutError>;
}
