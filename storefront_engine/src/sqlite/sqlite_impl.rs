//! `SqliteDatabase` is the concrete SQLite implementation of the storefront backend.
//!
//! It implements all the traits defined in the [`crate::traits`] module. Every multi-step write runs inside a pool
//! transaction; SQLite's single-writer discipline plus the conditional stock update give the settlement path its
//! atomicity without any in-process locking.
use std::fmt::Debug;

use chrono::{DateTime, NaiveDate, Utc};
use log::*;
use sqlx::SqlitePool;
use storefront_common::Birr;

use super::db::{carts, customers, db_url, new_pool, orders, products, request_log, sales};
use crate::{
    db_types::{
        CartItem,
        CartLine,
        Customer,
        DailySalesSummary,
        FlagReason,
        NewCustomer,
        NewOrder,
        NewProduct,
        NewRequestLog,
        Order,
        OrderItem,
        Product,
        RequestLogEntry,
        SalesTotals,
        SuspiciousIp,
        TxRef,
    },
    traits::{
        AbuseApiError,
        AbuseTracking,
        CartApiError,
        CartManagement,
        CatalogApiError,
        CatalogManagement,
        CheckoutDatabase,
        CheckoutError,
        NewSettlement,
        SalesApiError,
        SalesLedger,
        SettlementOutcome,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL from the environment.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&mut self) {
        self.pool.close().await;
    }
}

impl CheckoutDatabase for SqliteDatabase {
    async fn settle_order(&self, settlement: NewSettlement) -> Result<SettlementOutcome, CheckoutError> {
        let NewSettlement { tx_ref, customer_id, mut lines } = settlement;
        let mut tx = self.pool.begin().await?;
        // Check-before-create keeps duplicate webhook deliveries cheap; the unique tx_ref constraint remains the
        // backstop against a race between two concurrent deliveries.
        if let Some(order) = orders::fetch_order_by_tx_ref(&tx_ref, &mut tx).await? {
            let items = orders::fetch_order_items(order.id, &mut tx).await?;
            tx.commit().await?;
            debug!("🗃️ {tx_ref} is already settled as order {}. Returning the existing order", order.order_id);
            return Ok(SettlementOutcome::AlreadySettled { order, items });
        }
        // Stable acquisition order: two settlements sharing products always touch their rows in the same sequence.
        lines.sort_by_key(|line| line.product_id);
        let mut updated_products = Vec::with_capacity(lines.len());
        for line in &lines {
            let product = products::reserve_stock(line.product_id, line.quantity, &mut tx).await?;
            updated_products.push(product);
        }
        let total: Birr = lines.iter().zip(&updated_products).map(|(line, p)| p.price * line.quantity).sum();
        let new_order = NewOrder::new(customer_id.clone(), tx_ref.clone(), total);
        let order = orders::insert_order(new_order, &mut tx).await?;
        let mut items = Vec::with_capacity(lines.len());
        for (line, product) in lines.iter().zip(&updated_products) {
            let item = orders::insert_order_item(order.id, product.id, product.price, line.quantity, &mut tx).await?;
            items.push(item);
        }
        let units_sold: i64 = lines.iter().map(|line| line.quantity).sum();
        sales::record_sale(total, units_sold, &mut tx).await?;
        carts::clear_cart(&customer_id, &mut tx).await?;
        tx.commit().await?;
        debug!(
            "🗃️ Order {} settled for {customer_id}: {total} across {} line(s), {units_sold} unit(s)",
            order.order_id,
            items.len()
        );
        Ok(SettlementOutcome::Settled { order, items, updated_products })
    }

    async fn fetch_order_by_tx_ref(&self, tx_ref: &TxRef) -> Result<Option<Order>, CheckoutError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_tx_ref(tx_ref, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_orders_for_customer(&self, customer_id: &str) -> Result<Vec<Order>, CheckoutError> {
        let mut conn = self.pool.acquire().await?;
        let result = orders::fetch_orders_for_customer(customer_id, &mut conn).await?;
        Ok(result)
    }

    async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, CheckoutError> {
        let mut conn = self.pool.acquire().await?;
        let items = orders::fetch_order_items(order_id, &mut conn).await?;
        Ok(items)
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn insert_product(&self, product: NewProduct) -> Result<Product, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::insert_product(product, &mut conn).await?;
        Ok(product)
    }

    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::fetch_product(product_id, &mut conn).await?;
        Ok(product)
    }

    async fn fetch_products(&self) -> Result<Vec<Product>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let result = products::fetch_products(&mut conn).await?;
        Ok(result)
    }

    async fn restock_product(&self, product_id: i64, new_quantity: i64) -> Result<Product, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        products::restock_product(product_id, new_quantity, &mut conn).await
    }

    async fn insert_customer(&self, customer: NewCustomer) -> Result<Customer, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let customer = customers::insert_customer(customer, &mut conn).await?;
        Ok(customer)
    }

    async fn fetch_customer_by_id(&self, customer_id: &str) -> Result<Option<Customer>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let customer = customers::fetch_customer_by_id(customer_id, &mut conn).await?;
        Ok(customer)
    }

    async fn fetch_customer_by_email(&self, email: &str) -> Result<Option<Customer>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let customer = customers::fetch_customer_by_email(email, &mut conn).await?;
        Ok(customer)
    }
}

impl CartManagement for SqliteDatabase {
    async fn add_cart_item(
        &self,
        customer_id: &str,
        product_id: i64,
        quantity: i64,
    ) -> Result<CartItem, CartApiError> {
        if quantity < 1 {
            return Err(CartApiError::InvalidQuantity(quantity));
        }
        let mut tx = self.pool.begin().await?;
        let product = products::fetch_product(product_id, &mut tx)
            .await?
            .ok_or(CartApiError::ProductDoesNotExist(product_id))?;
        if carts::cart_item_exists(customer_id, product_id, &mut tx).await? {
            return Err(CartApiError::DuplicateCartItem(product.name));
        }
        // Advisory check only. Stock may still change before settlement, which re-verifies atomically.
        if product.stock_quantity < quantity {
            return Err(CartApiError::InsufficientStock { product: product.name, available: product.stock_quantity });
        }
        let item = carts::insert_cart_item(customer_id, product_id, quantity, &mut tx).await?;
        tx.commit().await?;
        Ok(item)
    }

    async fn fetch_cart(&self, customer_id: &str) -> Result<Vec<CartLine>, CartApiError> {
        let mut conn = self.pool.acquire().await?;
        let lines = carts::fetch_cart_lines(customer_id, &mut conn).await?;
        Ok(lines)
    }

    async fn remove_cart_item(&self, customer_id: &str, product_id: i64) -> Result<u64, CartApiError> {
        let mut conn = self.pool.acquire().await?;
        let removed = carts::remove_cart_item(customer_id, product_id, &mut conn).await?;
        Ok(removed)
    }
}

impl SalesLedger for SqliteDatabase {
    async fn sales_totals(&self) -> Result<SalesTotals, SalesApiError> {
        let mut conn = self.pool.acquire().await?;
        sales::sales_totals(&mut conn).await
    }

    async fn rollover_daily_sales(&self, date: NaiveDate) -> Result<Option<DailySalesSummary>, SalesApiError> {
        let mut tx = self.pool.begin().await?;
        if sales::summary_for_date(date, &mut tx).await?.is_some() {
            trace!("🗃️ Daily sales for {date} have already been captured. Nothing to do");
            return Ok(None);
        }
        let totals = sales::sales_totals(&mut tx).await?;
        let summary = sales::insert_summary(date, &totals, &mut tx).await?;
        sales::reset_totals(&mut tx).await?;
        tx.commit().await?;
        debug!(
            "🗃️ Daily sales for {date} captured: {} over {} transaction(s). Totals reset",
            summary.total_sales_amount, summary.total_transactions
        );
        Ok(Some(summary))
    }

    async fn fetch_daily_summaries(&self) -> Result<Vec<DailySalesSummary>, SalesApiError> {
        let mut conn = self.pool.acquire().await?;
        let summaries = sales::fetch_daily_summaries(&mut conn).await?;
        Ok(summaries)
    }
}

impl AbuseTracking for SqliteDatabase {
    async fn record_request(&self, entry: NewRequestLog) -> Result<(), AbuseApiError> {
        let mut conn = self.pool.acquire().await?;
        request_log::insert_request(entry, &mut conn).await?;
        Ok(())
    }

    async fn requests_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<RequestLogEntry>, AbuseApiError> {
        let mut conn = self.pool.acquire().await?;
        let entries = request_log::requests_since(cutoff, &mut conn).await?;
        Ok(entries)
    }

    async fn flag_suspicious(&self, ip: &str, reason: FlagReason) -> Result<(SuspiciousIp, bool), AbuseApiError> {
        let mut tx = self.pool.begin().await?;
        let result = request_log::get_or_create_flag(ip, reason, &mut tx).await?;
        tx.commit().await?;
        Ok(result)
    }

    async fn fetch_flagged(&self) -> Result<Vec<SuspiciousIp>, AbuseApiError> {
        let mut conn = self.pool.acquire().await?;
        let flags = request_log::fetch_flagged(&mut conn).await?;
        Ok(flags)
    }

    async fn is_flagged(&self, ip: &str) -> Result<bool, AbuseApiError> {
        let mut conn = self.pool.acquire().await?;
        let flagged = request_log::is_flagged(ip, &mut conn).await?;
        Ok(flagged)
    }
}
