use std::fmt::Display;

use serde::{Deserialize, Serialize};
use storefront_common::Birr;

use crate::db_types::{Order, OrderItem, Product, TxRef};

//------------------------------------------  SettlementLine  --------------------------------------------------------
/// One line of a settlement request. The price is *not* part of the request; it is snapshotted from the catalog
/// inside the settlement transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementLine {
    pub product_id: i64,
    pub quantity: i64,
}

//------------------------------------------  NewSettlement   --------------------------------------------------------
/// A request to atomically convert a customer's cart into an order.
#[derive(Debug, Clone)]
pub struct NewSettlement {
    pub tx_ref: TxRef,
    pub customer_id: String,
    pub lines: Vec<SettlementLine>,
}

//------------------------------------------ SettlementOutcome ------------------------------------------------------
/// The result of [`crate::traits::CheckoutDatabase::settle_order`].
///
/// `AlreadySettled` is returned when an order for the transaction reference exists; repeated webhook deliveries for
/// one `tx_ref` must converge on the same order without creating anything new.
#[derive(Debug, Clone)]
pub enum SettlementOutcome {
    Settled {
        order: Order,
        items: Vec<OrderItem>,
        /// The post-decrement catalog rows for every settled product, in settlement order. Callers use these to
        /// detect products that have run low on stock.
        updated_products: Vec<Product>,
    },
    AlreadySettled {
        order: Order,
        items: Vec<OrderItem>,
    },
}

//------------------------------------------ CustomerContact  --------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerContact {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

//------------------------------------------ InitializeCheckout -----------------------------------------------------
/// Everything the payment gateway needs to open a hosted checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializeCheckout {
    pub amount: Birr,
    pub currency: String,
    pub customer: CustomerContact,
    pub tx_ref: TxRef,
    pub callback_url: String,
    pub return_url: String,
    pub title: String,
    pub description: String,
}

//------------------------------------------  PaymentStatus   --------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Success,
    Pending,
    Failed,
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Success => write!(f, "success"),
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Failed => write!(f, "failed"),
        }
    }
}

//------------------------------------------ VerifiedPayment  --------------------------------------------------------
/// The gateway's answer to a verify-by-reference call. Only data the gateway itself reports is carried here; webhook
/// payload contents are never trusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedPayment {
    pub status: PaymentStatus,
    pub amount: Birr,
    pub customer_email: Option<String>,
}

impl VerifiedPayment {
    pub fn is_successful(&self) -> bool {
        self.status == PaymentStatus::Success
    }
}
