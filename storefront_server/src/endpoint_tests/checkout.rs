use std::time::Duration;

use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::Utc;
use serde_json::json;
use storefront_common::Birr;
use storefront_engine::{
    db_types::{CartLine, Customer, Order, OrderItem, Product, TxRef},
    helpers::new_tx_ref,
    traits::{CartApiError, CheckoutError, PaymentStatus, SettlementOutcome, VerifiedPayment},
    CartApi,
    CheckoutApi,
    CheckoutConfig,
};

use super::{
    helpers::send_post,
    mocks::{MockBackend, MockGateway},
};
use crate::routes::{add_cart_item, checkout, verify_payment};

fn test_customer() -> Customer {
    Customer {
        id: 1,
        customer_id: "alice".to_string(),
        email: "alice@example.com".to_string(),
        first_name: "Alice".to_string(),
        last_name: "Walker".to_string(),
        created_at: Utc::now(),
    }
}

fn sneakers_line() -> CartLine {
    CartLine {
        product_id: 7,
        name: "Sneakers".to_string(),
        unit_price: Birr::from_cents(1000),
        quantity: 2,
        stock_quantity: 5,
    }
}

fn settled_order(tx_ref: TxRef) -> (Order, Vec<OrderItem>) {
    let order = Order {
        id: 1,
        order_id: "ord-00000000000000a1".to_string(),
        customer_id: "alice".to_string(),
        tx_ref,
        total_amount: Birr::from_cents(2000),
        created_at: Utc::now(),
    };
    let items = vec![OrderItem {
        id: 1,
        order_id: 1,
        product_id: 7,
        price_at_purchase: Birr::from_cents(1000),
        quantity: 2,
    }];
    (order, items)
}

fn test_config() -> CheckoutConfig {
    CheckoutConfig { retry_delay: Duration::from_millis(1), ..CheckoutConfig::default() }
}

fn checkout_app(
    backend: MockBackend,
    gateway: MockGateway,
) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let api = CheckoutApi::new(backend, gateway, test_config(), Default::default());
        cfg.app_data(web::Data::new(api))
            .route("/checkout", web::post().to(checkout::<MockBackend, MockGateway>))
            .route("/verify-payment", web::post().to(verify_payment::<MockBackend, MockGateway>));
    }
}

#[actix_web::test]
async fn checkout_returns_the_gateway_url() {
    let _ = env_logger::try_init();
    let mut backend = MockBackend::new();
    backend.expect_fetch_customer_by_id().returning(|_| Ok(Some(test_customer())));
    backend.expect_fetch_cart().returning(|_| Ok(vec![sneakers_line()]));
    let mut gateway = MockGateway::new();
    gateway.expect_initialize().returning(|req| Ok(format!("https://checkout.test/{}", req.tx_ref.as_str())));

    let (status, body) = send_post("/checkout", json!({"customer_id": "alice"}), checkout_app(backend, gateway)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("https://checkout.test/"));
    assert!(body.contains("\"amount\":2000"));
    assert!(body.contains("Sneakers"));
}

#[actix_web::test]
async fn checkout_with_an_empty_cart_is_rejected() {
    let _ = env_logger::try_init();
    let mut backend = MockBackend::new();
    backend.expect_fetch_customer_by_id().returning(|_| Ok(Some(test_customer())));
    backend.expect_fetch_cart().returning(|_| Ok(vec![]));
    let gateway = MockGateway::new();

    let (status, body) = send_post("/checkout", json!({"customer_id": "alice"}), checkout_app(backend, gateway)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Your cart is empty."));
}

#[actix_web::test]
async fn checkout_for_an_unknown_customer_is_not_found() {
    let _ = env_logger::try_init();
    let mut backend = MockBackend::new();
    backend.expect_fetch_customer_by_id().returning(|_| Ok(None));
    let gateway = MockGateway::new();

    let (status, body) = send_post("/checkout", json!({"customer_id": "ghost"}), checkout_app(backend, gateway)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("No customer could be resolved"));
}

#[actix_web::test]
async fn the_webhook_settles_a_verified_payment() {
    let _ = env_logger::try_init();
    let tx_ref = new_tx_ref("alice");
    let mut backend = MockBackend::new();
    backend.expect_fetch_order_by_tx_ref().returning(|_| Ok(None));
    backend.expect_fetch_customer_by_id().returning(|_| Ok(Some(test_customer())));
    backend.expect_fetch_cart().returning(|_| Ok(vec![sneakers_line()]));
    let settlement_ref = tx_ref.clone();
    backend.expect_settle_order().returning(move |_| {
        let (order, items) = settled_order(settlement_ref.clone());
        let updated_products = vec![Product {
            id: 7,
            name: "Sneakers".to_string(),
            description: String::new(),
            price: Birr::from_cents(1000),
            stock_quantity: 3,
            category: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }];
        Ok(SettlementOutcome::Settled { order, items, updated_products })
    });
    let mut gateway = MockGateway::new();
    gateway.expect_verify().returning(|_| {
        Ok(VerifiedPayment {
            status: PaymentStatus::Success,
            amount: Birr::from_cents(2000),
            customer_email: None,
        })
    });

    let (status, body) =
        send_post("/verify-payment", json!({"tx_ref": tx_ref.as_str()}), checkout_app(backend, gateway)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Payment verified and order created successfully"));
    assert!(body.contains("ord-00000000000000a1"));
}

#[actix_web::test]
async fn the_webhook_surfaces_a_stock_shortfall() {
    let _ = env_logger::try_init();
    let tx_ref = new_tx_ref("alice");
    let mut backend = MockBackend::new();
    backend.expect_fetch_order_by_tx_ref().returning(|_| Ok(None));
    backend.expect_fetch_customer_by_id().returning(|_| Ok(Some(test_customer())));
    backend.expect_fetch_cart().returning(|_| Ok(vec![sneakers_line()]));
    backend.expect_settle_order().returning(|_| {
        Err(CheckoutError::InsufficientStock { product: "Sneakers".to_string(), available: 1 })
    });
    let mut gateway = MockGateway::new();
    gateway.expect_verify().returning(|_| {
        Ok(VerifiedPayment {
            status: PaymentStatus::Success,
            amount: Birr::from_cents(2000),
            customer_email: None,
        })
    });

    let (status, body) =
        send_post("/verify-payment", json!({"tx_ref": tx_ref.as_str()}), checkout_app(backend, gateway)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Insufficient stock for 'Sneakers'. Only 1 left."));
}

#[actix_web::test]
async fn a_duplicate_webhook_returns_the_existing_order() {
    let _ = env_logger::try_init();
    let tx_ref = new_tx_ref("alice");
    let mut backend = MockBackend::new();
    let existing_ref = tx_ref.clone();
    backend.expect_fetch_order_by_tx_ref().returning(move |_| Ok(Some(settled_order(existing_ref.clone()).0)));
    backend.expect_fetch_order_items().returning(|_| Ok(settled_order(new_tx_ref("alice")).1));
    let mut gateway = MockGateway::new();
    gateway.expect_verify().returning(|_| {
        Ok(VerifiedPayment {
            status: PaymentStatus::Success,
            amount: Birr::from_cents(2000),
            customer_email: None,
        })
    });

    let (status, body) =
        send_post("/verify-payment", json!({"tx_ref": tx_ref.as_str()}), checkout_app(backend, gateway)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Payment already settled"));
    assert!(body.contains("ord-00000000000000a1"));
}

#[actix_web::test]
async fn the_webhook_rejects_an_unsuccessful_payment() {
    let _ = env_logger::try_init();
    let backend = MockBackend::new();
    let mut gateway = MockGateway::new();
    gateway.expect_verify().returning(|_| {
        Ok(VerifiedPayment { status: PaymentStatus::Failed, amount: Birr::from_cents(0), customer_email: None })
    });

    let (status, body) =
        send_post("/verify-payment", json!({"tx_ref": "cart-alice-1-ab"}), checkout_app(backend, gateway)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Payment not successful"));
}

#[actix_web::test]
async fn the_webhook_requires_a_reference() {
    let _ = env_logger::try_init();
    let backend = MockBackend::new();
    let gateway = MockGateway::new();
    let (status, body) =
        send_post("/verify-payment", json!({"tx_ref": ""}), checkout_app(backend, gateway)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Missing tx_ref"));
}

#[actix_web::test]
async fn cart_quantity_validation_is_surfaced() {
    let _ = env_logger::try_init();
    let mut backend = MockBackend::new();
    backend
        .expect_add_cart_item()
        .returning(|_, _, quantity| Err(CartApiError::InvalidQuantity(quantity)));

    let configure = move |cfg: &mut ServiceConfig| {
        let api = CartApi::new(backend);
        cfg.app_data(web::Data::new(api)).route("/cart", web::post().to(add_cart_item::<MockBackend>));
    };
    let (status, body) =
        send_post("/cart", json!({"customer_id": "alice", "product_id": 7, "quantity": 0}), configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Quantity must be at least 1"));
}
