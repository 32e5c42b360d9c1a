//! The behaviour a storage backend must provide to power the storefront engine, plus the traits describing the
//! engine's external collaborators (the payment gateway).
//!
//! Backends implement the database traits in this module ([`CheckoutDatabase`] in particular carries the settlement
//! core and its atomicity requirements). The engine's public APIs in `shop_api` are generic over these traits, so a
//! different storage technology can be swapped in without touching the orchestration logic.

mod abuse_tracking;
mod cart_management;
mod catalog_management;
mod checkout_database;
mod data_objects;
mod errors;
mod payment_gateway;
mod sales_ledger;

pub use abuse_tracking::AbuseTracking;
pub use cart_management::CartManagement;
pub use catalog_management::CatalogManagement;
pub use checkout_database::CheckoutDatabase;
pub use data_objects::{
    CustomerContact,
    InitializeCheckout,
    NewSettlement,
    PaymentStatus,
    SettlementLine,
    SettlementOutcome,
    VerifiedPayment,
};
pub use errors::{AbuseApiError, CartApiError, CatalogApiError, CheckoutError, GatewayError, SalesApiError};
pub use payment_gateway::PaymentGateway;
pub use sales_ledger::SalesLedger;
