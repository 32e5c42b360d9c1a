use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use storefront_common::Birr;
use thiserror::Error;

//--------------------------------------        TxRef        ---------------------------------------------------------
/// The unique external transaction reference correlating a payment-gateway session with a cart and customer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct TxRef(pub String);

impl FromStr for TxRef {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for TxRef {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for TxRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.0)
    }
}

impl TxRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------       Product       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: Birr,
    pub stock_quantity: i64,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Birr,
    pub stock_quantity: i64,
    pub category: String,
}

//--------------------------------------      Customer       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    /// Short unique identifier for the customer. This is the value embedded in transaction references.
    pub customer_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCustomer {
    pub customer_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

//--------------------------------------      CartItem       ---------------------------------------------------------
/// A single {product, quantity} intent in a customer's cart. Cart items are created by customer action and deleted
/// on settlement or explicit removal. They are never mutated.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct CartItem {
    pub id: i64,
    pub customer_id: String,
    pub product_id: i64,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
}

/// A cart item joined with the current catalog record for its product.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: i64,
    pub name: String,
    pub unit_price: Birr,
    pub quantity: i64,
    pub stock_quantity: i64,
}

impl CartLine {
    pub fn line_total(&self) -> Birr {
        self.unit_price * self.quantity
    }
}

//--------------------------------------        Order        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_id: String,
    pub customer_id: String,
    pub tx_ref: TxRef,
    pub total_amount: Birr,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_id: String,
    pub customer_id: String,
    pub tx_ref: TxRef,
    pub total_amount: Birr,
}

impl NewOrder {
    pub fn new(customer_id: String, tx_ref: TxRef, total_amount: Birr) -> Self {
        Self { order_id: crate::helpers::new_order_id(), customer_id, tx_ref, total_amount }
    }
}

//--------------------------------------      OrderItem      ---------------------------------------------------------
/// A settled order line. The price is snapshotted at settlement time and is decoupled from any later catalog price
/// change.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub price_at_purchase: Birr,
    pub quantity: i64,
}

//--------------------------------------     SalesTotals     ---------------------------------------------------------
/// The store-wide running totals since the last daily rollover. There is exactly one row of this table, with id 1.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct SalesTotals {
    pub id: i64,
    pub total_sales_amount: Birr,
    pub total_transactions: i64,
    pub total_stock_sold: i64,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------  DailySalesSummary  ---------------------------------------------------------
/// An immutable point-in-time copy of [`SalesTotals`], written once per day just before the totals are reset.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct DailySalesSummary {
    pub id: i64,
    pub date: NaiveDate,
    pub total_sales_amount: Birr,
    pub total_transactions: i64,
    pub total_stock_sold: i64,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------   RequestLogEntry   ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct RequestLogEntry {
    pub id: i64,
    pub ip_address: String,
    pub path: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRequestLog {
    pub ip_address: String,
    pub path: String,
}

//--------------------------------------     FlagReason      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Type, Serialize, Deserialize)]
pub enum FlagReason {
    /// The IP accessed a sensitive path at least once within the scan window.
    SensitivePath,
    /// The IP issued more requests within the scan window than the configured threshold.
    ExcessiveRequests,
}

impl Display for FlagReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlagReason::SensitivePath => write!(f, "SensitivePath"),
            FlagReason::ExcessiveRequests => write!(f, "ExcessiveRequests"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid flag reason: {0}")]
pub struct FlagReasonConversionError(String);

impl FromStr for FlagReason {
    type Err = FlagReasonConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SensitivePath" => Ok(Self::SensitivePath),
            "ExcessiveRequests" => Ok(Self::ExcessiveRequests),
            s => Err(FlagReasonConversionError(s.to_string())),
        }
    }
}

//--------------------------------------    SuspiciousIp     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct SuspiciousIp {
    pub id: i64,
    pub ip_address: String,
    pub reason: FlagReason,
    pub created_at: DateTime<Utc>,
}
