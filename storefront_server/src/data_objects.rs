//! Typed request and response bodies, one struct per endpoint.
use serde::{Deserialize, Serialize};
use storefront_common::Birr;
use storefront_engine::db_types::TxRef;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub message: String,
}

impl JsonResponse {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self { message: message.into() }
    }
}

//----------------------------------------------   Catalog   ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Price in cents.
    pub price: Birr,
    pub stock_quantity: i64,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCustomerRequest {
    pub customer_id: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

//----------------------------------------------     Cart    ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddCartItemRequest {
    pub customer_id: String,
    pub product_id: i64,
    pub quantity: i64,
}

//----------------------------------------------   Checkout  ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub customer_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub checkout_url: String,
    pub tx_ref: TxRef,
    pub amount: Birr,
    pub items: Vec<String>,
}

/// The webhook body the gateway posts after a payment attempt. Only the reference is read; everything else about
/// the payment is re-verified against the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentNotification {
    pub tx_ref: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentVerifiedResponse {
    pub message: String,
    pub order_id: String,
    pub tx_ref: TxRef,
    pub amount: Birr,
}
