use std::{fmt::Debug, time::Duration};

use log::*;
use storefront_common::{Birr, ETB_CURRENCY_CODE};

use crate::{
    db_types::{Customer, TxRef},
    events::{EventProducers, LowStockEvent, OrderSettledEvent},
    helpers::{customer_id_from_tx_ref, new_tx_ref, retry_with_backoff},
    shop_api::checkout_objects::{CheckoutSession, OrderWithItems, SettledOrder},
    traits::{
        CartManagement,
        CatalogManagement,
        CheckoutDatabase,
        CheckoutError,
        CustomerContact,
        InitializeCheckout,
        NewSettlement,
        PaymentGateway,
        SettlementLine,
        SettlementOutcome,
    },
};

#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    pub currency: String,
    /// Where the gateway posts its webhook after the shopper pays.
    pub callback_url: String,
    /// Where the gateway redirects the shopper's browser after payment.
    pub return_url: String,
    /// Settled products at or below this stock level raise a [`LowStockEvent`].
    pub low_stock_threshold: i64,
    /// Attempt budget for transient gateway and settlement failures.
    pub max_retries: usize,
    pub retry_delay: Duration,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            currency: ETB_CURRENCY_CODE.to_string(),
            callback_url: String::default(),
            return_url: String::default(),
            low_stock_threshold: 5,
            max_retries: 3,
            retry_delay: Duration::from_millis(500),
        }
    }
}

/// `CheckoutApi` is the primary API for taking a customer's cart through payment to a settled order.
///
/// The flow is split across two entry points because payment confirmation is asynchronous:
/// * [`Self::initiate_checkout`] validates the cart and opens a payment session with the gateway.
/// * [`Self::handle_payment_webhook`] runs when the gateway calls back, verifies the payment independently, and
///   performs the atomic settlement.
pub struct CheckoutApi<B, G> {
    db: B,
    gateway: G,
    config: CheckoutConfig,
    producers: EventProducers,
}

impl<B, G> Debug for CheckoutApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CheckoutApi")
    }
}

impl<B, G> CheckoutApi<B, G> {
    pub fn new(db: B, gateway: G, config: CheckoutConfig, producers: EventProducers) -> Self {
        Self { db, gateway, config, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B, G> CheckoutApi<B, G>
where
    B: CheckoutDatabase + CartManagement + CatalogManagement,
    G: PaymentGateway,
{
    /// Opens a payment session for the customer's current cart.
    ///
    /// Fails with [`CheckoutError::EmptyCart`] when there is nothing to check out, and with
    /// [`CheckoutError::InsufficientStock`] when any line exceeds the currently available stock. The stock check
    /// here is advisory; the authoritative check happens inside the settlement transaction, which re-reads the
    /// cart after payment is verified.
    pub async fn initiate_checkout(&self, customer_id: &str) -> Result<CheckoutSession, CheckoutError> {
        let customer = self
            .db
            .fetch_customer_by_id(customer_id)
            .await?
            .ok_or(CheckoutError::UnknownCustomer)?;
        let cart = self.db.fetch_cart(customer_id).await?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        for line in &cart {
            if line.quantity > line.stock_quantity {
                return Err(CheckoutError::InsufficientStock {
                    product: line.name.clone(),
                    available: line.stock_quantity,
                });
            }
        }
        let amount: Birr = cart.iter().map(|line| line.line_total()).sum();
        let tx_ref = new_tx_ref(customer_id);
        debug!("🛒️ Opening payment session {tx_ref} for {customer_id}: {amount} over {} line(s)", cart.len());
        let request = InitializeCheckout {
            amount,
            currency: self.config.currency.clone(),
            customer: contact_for(&customer),
            tx_ref: tx_ref.clone(),
            callback_url: self.config.callback_url.clone(),
            return_url: self.config.return_url.clone(),
            title: "Cart Checkout".to_string(),
            description: format!("Payment for {} cart item(s)", cart.len()),
        };
        // Gateway I/O happens outside any database transaction, and only transient failures are retried.
        let checkout_url = retry_with_backoff(
            self.config.max_retries,
            self.config.retry_delay,
            "🛒️ Payment session initialization",
            || self.gateway.initialize(request.clone()),
            |e| matches!(e, crate::traits::GatewayError::Unavailable(_)),
        )
        .await?;
        info!("🛒️ Payment session {tx_ref} opened for {customer_id}");
        let items = cart.into_iter().map(|line| line.name).collect();
        Ok(CheckoutSession { tx_ref, checkout_url, amount, items })
    }

    /// Handles an asynchronous payment notification carrying nothing but a transaction reference.
    ///
    /// The payment is verified against the gateway (the webhook payload is never trusted), the customer is
    /// re-resolved, the *current* cart is re-read, and the settlement runs as one atomic transaction. Calling this
    /// twice with the same reference returns the same order; the duplicate delivery settles nothing.
    pub async fn handle_payment_webhook(&self, tx_ref: &TxRef) -> Result<SettledOrder, CheckoutError> {
        let verification = retry_with_backoff(
            self.config.max_retries,
            self.config.retry_delay,
            "🛒️ Payment verification",
            || self.gateway.verify(tx_ref),
            |e| matches!(e, crate::traits::GatewayError::Unavailable(_)),
        )
        .await?;
        if !verification.is_successful() {
            debug!("🛒️ Gateway reports {tx_ref} as '{}'. Not settling", verification.status);
            return Err(CheckoutError::PaymentNotSuccessful(format!(
                "The gateway reported status '{}' for {tx_ref}",
                verification.status
            )));
        }
        // Duplicate deliveries land here after the first one has already cleared the cart, so the settled-order
        // check must come before the cart is consulted.
        if let Some(order) = self.db.fetch_order_by_tx_ref(tx_ref).await? {
            info!("🛒️ Duplicate webhook for {tx_ref}. Returning existing order {}", order.order_id);
            let items = self.db.fetch_order_items(order.id).await?;
            return Ok(SettledOrder { order, items, newly_settled: false });
        }
        let customer = self.resolve_customer(tx_ref, verification.customer_email.as_deref()).await?;
        let cart = self.db.fetch_cart(&customer.customer_id).await?;
        if cart.is_empty() {
            // A verified payment with nothing left to settle. Surfaced to the caller rather than swallowed; an
            // operator has to reconcile the charge.
            warn!("🛒️ Payment {tx_ref} verified but {}'s cart is empty", customer.customer_id);
            return Err(CheckoutError::EmptyCart);
        }
        let computed_total: Birr = cart.iter().map(|line| line.line_total()).sum();
        if computed_total != verification.amount {
            warn!(
                "🛒️ Verified amount {} for {tx_ref} differs from the current cart total {computed_total}. \
                 Settlement proceeds with the cart total",
                verification.amount
            );
        }
        let lines =
            cart.iter().map(|line| SettlementLine { product_id: line.product_id, quantity: line.quantity }).collect();
        let settlement =
            NewSettlement { tx_ref: tx_ref.clone(), customer_id: customer.customer_id.clone(), lines };
        let outcome = retry_with_backoff(
            self.config.max_retries,
            self.config.retry_delay,
            "🛒️ Settlement",
            || self.db.settle_order(settlement.clone()),
            CheckoutError::is_transient,
        )
        .await;
        let outcome = match outcome {
            Ok(outcome) => outcome,
            // Two deliveries raced past the check-before-create; the unique constraint caught the loser. Recover
            // the winner's order.
            Err(CheckoutError::DuplicateTxRef(_)) => {
                let order =
                    self.db.fetch_order_by_tx_ref(tx_ref).await?.ok_or_else(|| {
                        CheckoutError::DatabaseError(format!(
                            "Order for {tx_ref} reported as duplicate but could not be fetched"
                        ))
                    })?;
                let items = self.db.fetch_order_items(order.id).await?;
                SettlementOutcome::AlreadySettled { order, items }
            },
            Err(e) => return Err(e),
        };
        match outcome {
            SettlementOutcome::Settled { order, items, updated_products } => {
                info!("🛒️ Order {} settled for {} ({tx_ref})", order.order_id, customer.customer_id);
                let event = OrderSettledEvent::new(order.clone(), items.clone(), customer.email.clone());
                for producer in &self.producers.order_settled_producer {
                    producer.publish_event(event.clone()).await;
                }
                for product in
                    updated_products.into_iter().filter(|p| p.stock_quantity <= self.config.low_stock_threshold)
                {
                    debug!("🛒️ '{}' is low on stock ({} left)", product.name, product.stock_quantity);
                    for producer in &self.producers.low_stock_producer {
                        producer.publish_event(LowStockEvent::new(product.clone())).await;
                    }
                }
                Ok(SettledOrder { order, items, newly_settled: true })
            },
            SettlementOutcome::AlreadySettled { order, items } => {
                info!("🛒️ Duplicate webhook for {tx_ref}. Returning existing order {}", order.order_id);
                Ok(SettledOrder { order, items, newly_settled: false })
            },
        }
    }

    /// All settled orders for a customer, each with its line items.
    pub async fn order_history(&self, customer_id: &str) -> Result<Vec<OrderWithItems>, CheckoutError> {
        let orders = self.db.fetch_orders_for_customer(customer_id).await?;
        let mut result = Vec::with_capacity(orders.len());
        for order in orders {
            let items = self.db.fetch_order_items(order.id).await?;
            result.push(OrderWithItems { order, items });
        }
        Ok(result)
    }

    /// Resolves the paying customer. The identifier embedded in the transaction reference is authoritative; the
    /// email the gateway verified is only a fallback. If both resolve to different customers the webhook is
    /// rejected rather than guessing.
    async fn resolve_customer(
        &self,
        tx_ref: &TxRef,
        verified_email: Option<&str>,
    ) -> Result<Customer, CheckoutError> {
        let by_reference = match customer_id_from_tx_ref(tx_ref) {
            Some(customer_id) => self.db.fetch_customer_by_id(&customer_id).await?,
            None => None,
        };
        let by_email = match verified_email {
            Some(email) => self.db.fetch_customer_by_email(email).await?,
            None => None,
        };
        match (by_reference, by_email) {
            (Some(a), Some(b)) if a.id != b.id => {
                error!(
                    "🛒️ {tx_ref} embeds customer {} but the verified email belongs to {}. Rejecting",
                    a.customer_id, b.customer_id
                );
                Err(CheckoutError::CustomerMismatch)
            },
            (Some(customer), _) => Ok(customer),
            (None, Some(customer)) => {
                debug!("🛒️ {tx_ref} did not resolve by reference. Falling back to the verified email");
                Ok(customer)
            },
            (None, None) => Err(CheckoutError::UnknownCustomer),
        }
    }
}

fn contact_for(customer: &Customer) -> CustomerContact {
    let first_name = if customer.first_name.is_empty() { "Customer".to_string() } else { customer.first_name.clone() };
    CustomerContact { email: customer.email.clone(), first_name, last_name: customer.last_name.clone() }
}
