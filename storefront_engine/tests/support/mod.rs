// Not every test binary uses every helper in here.
#![allow(dead_code)]

use storefront_common::Birr;
use storefront_engine::{
    db_types::{Customer, NewCustomer, NewProduct, Product, TxRef},
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    traits::{CatalogManagement, GatewayError, InitializeCheckout, PaymentGateway, PaymentStatus, VerifiedPayment},
    CheckoutConfig,
    SqliteDatabase,
};

pub async fn new_test_db() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 8).await.expect("Error creating database")
}

/// A gateway that always answers the same thing. Initialize echoes a checkout URL derived from the reference;
/// verify reports the configured status/amount/email.
#[derive(Clone)]
pub struct StubGateway {
    pub status: PaymentStatus,
    pub amount: Birr,
    pub email: Option<String>,
}

impl StubGateway {
    pub fn success(amount: Birr) -> Self {
        Self { status: PaymentStatus::Success, amount, email: None }
    }

    pub fn success_for(amount: Birr, email: &str) -> Self {
        Self { status: PaymentStatus::Success, amount, email: Some(email.to_string()) }
    }

    pub fn failed() -> Self {
        Self { status: PaymentStatus::Failed, amount: Birr::from_cents(0), email: None }
    }
}

impl PaymentGateway for StubGateway {
    async fn initialize(&self, request: InitializeCheckout) -> Result<String, GatewayError> {
        Ok(format!("https://checkout.test/{}", request.tx_ref.as_str()))
    }

    async fn verify(&self, _tx_ref: &TxRef) -> Result<VerifiedPayment, GatewayError> {
        Ok(VerifiedPayment { status: self.status, amount: self.amount, customer_email: self.email.clone() })
    }
}

/// Fast retry timings so failure-path tests do not sleep for real.
pub fn test_checkout_config() -> CheckoutConfig {
    CheckoutConfig { retry_delay: std::time::Duration::from_millis(5), ..CheckoutConfig::default() }
}

pub async fn seed_product(db: &SqliteDatabase, name: &str, price_cents: i64, stock: i64) -> Product {
    db.insert_product(NewProduct {
        name: name.to_string(),
        description: format!("{name} for testing"),
        price: Birr::from_cents(price_cents),
        stock_quantity: stock,
        category: "test".to_string(),
    })
    .await
    .expect("Error inserting product")
}

pub async fn seed_customer(db: &SqliteDatabase, customer_id: &str, email: &str) -> Customer {
    db.insert_customer(NewCustomer {
        customer_id: customer_id.to_string(),
        email: email.to_string(),
        first_name: "Test".to_string(),
        last_name: "Customer".to_string(),
    })
    .await
    .expect("Error inserting customer")
}
