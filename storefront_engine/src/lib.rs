//! Nexus Storefront Engine
//!
//! The storefront engine contains the core logic of the e-commerce backend: the product catalog and inventory
//! ledger, per-customer carts, the checkout/settlement flow, the running sales aggregate, and request-log based
//! abuse detection. It is provider-agnostic: the payment gateway is a trait, and backends implement the database
//! traits defined in the [`mod@traits`] module.
//!
//! The library is divided into three main sections:
//! 1. Database management and control ([`mod@sqlite`]). SQLite is the supported backend. You should never need to
//!    access the database directly; use the public APIs instead. The exception is the data types used in the
//!    database, which are defined in the `db_types` module and are public.
//! 2. The engine public API ([`mod@shop_api`]). This provides the public-facing functionality of the engine:
//!    catalog and cart management, the checkout orchestration, daily sales rollover, and suspicious-IP scanning.
//! 3. An event-hook system ([`mod@events`]) that lets callers react to engine events (an order settling, a product
//!    running low on stock) without coupling those side effects to the settlement transaction.

pub mod db_types;
pub mod events;
pub mod helpers;
mod shop_api;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use shop_api::{
    abuse_api::{classify_window, AbuseApi, DEFAULT_MAX_REQUESTS_PER_WINDOW, DEFAULT_SENSITIVE_PATHS},
    cart_api::CartApi,
    catalog_api::CatalogApi,
    checkout_flow_api::{CheckoutApi, CheckoutConfig},
    checkout_objects::{CheckoutSession, OrderWithItems, SettledOrder},
    sales_api::SalesApi,
};
