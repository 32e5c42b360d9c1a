use serde::{Deserialize, Serialize};
use storefront_common::Birr;

use crate::db_types::{Order, OrderItem, TxRef};

/// What the client needs to continue a checkout on the gateway's hosted page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub tx_ref: TxRef,
    pub checkout_url: String,
    pub amount: Birr,
    pub items: Vec<String>,
}

/// The result of a successfully handled payment webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettledOrder {
    pub order: Order,
    pub items: Vec<OrderItem>,
    /// False when this webhook delivery found the order already settled by an earlier delivery.
    pub newly_settled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}
