//! End-to-end checkout flow tests against a real SQLite database, with the payment gateway stubbed out.
mod support;

use storefront_common::Birr;
use storefront_engine::{
    db_types::TxRef,
    events::EventHandlers,
    helpers::customer_id_from_tx_ref,
    traits::{CartManagement, CatalogManagement, CheckoutDatabase, CheckoutError, SalesLedger},
    CheckoutApi,
};
use support::{new_test_db, seed_customer, seed_product, test_checkout_config, StubGateway};

#[tokio::test]
async fn settles_a_two_line_cart() {
    let db = new_test_db().await;
    let sneakers = seed_product(&db, "Sneakers", 1000, 5).await;
    let socks = seed_product(&db, "Socks", 500, 1).await;
    let alice = seed_customer(&db, "alice", "alice@example.com").await;
    db.add_cart_item(&alice.customer_id, sneakers.id, 2).await.unwrap();
    db.add_cart_item(&alice.customer_id, socks.id, 1).await.unwrap();

    let api = CheckoutApi::new(
        db.clone(),
        StubGateway::success(Birr::from_cents(2500)),
        test_checkout_config(),
        Default::default(),
    );
    let session = api.initiate_checkout(&alice.customer_id).await.expect("checkout failed");
    assert_eq!(session.amount, Birr::from_cents(2500));
    assert_eq!(session.items, vec!["Sneakers".to_string(), "Socks".to_string()]);
    assert_eq!(customer_id_from_tx_ref(&session.tx_ref).as_deref(), Some("alice"));
    assert!(session.checkout_url.starts_with("https://checkout.test/"));

    let settled = api.handle_payment_webhook(&session.tx_ref).await.expect("settlement failed");
    assert!(settled.newly_settled);
    assert_eq!(settled.order.total_amount, Birr::from_cents(2500));
    assert_eq!(settled.items.len(), 2);

    // Stock moved, aggregate updated, cart emptied.
    assert_eq!(db.fetch_product(sneakers.id).await.unwrap().unwrap().stock_quantity, 3);
    assert_eq!(db.fetch_product(socks.id).await.unwrap().unwrap().stock_quantity, 0);
    let totals = db.sales_totals().await.unwrap();
    assert_eq!(totals.total_sales_amount, Birr::from_cents(2500));
    assert_eq!(totals.total_transactions, 1);
    assert_eq!(totals.total_stock_sold, 3);
    assert!(db.fetch_cart(&alice.customer_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn a_failing_line_rolls_back_the_whole_settlement() {
    let db = new_test_db().await;
    let sneakers = seed_product(&db, "Sneakers", 1000, 5).await;
    let socks = seed_product(&db, "Socks", 500, 1).await;
    let alice = seed_customer(&db, "alice", "alice@example.com").await;
    db.add_cart_item(&alice.customer_id, sneakers.id, 2).await.unwrap();
    db.add_cart_item(&alice.customer_id, socks.id, 1).await.unwrap();
    // The cart was valid when it was filled, but the last pair of socks is gone by settlement time.
    db.restock_product(socks.id, 0).await.unwrap();

    let api = CheckoutApi::new(
        db.clone(),
        StubGateway::success(Birr::from_cents(2500)),
        test_checkout_config(),
        Default::default(),
    );
    let precheck = api.initiate_checkout(&alice.customer_id).await.expect_err("pre-check should already fail");
    assert!(matches!(precheck, CheckoutError::InsufficientStock { .. }));

    // Drive the webhook directly: payment verified, but the stock is gone.
    let tx_ref = storefront_engine::helpers::new_tx_ref(&alice.customer_id);
    let err = api.handle_payment_webhook(&tx_ref).await.expect_err("settlement should fail");
    match err {
        CheckoutError::InsufficientStock { product, available } => {
            assert_eq!(product, "Socks");
            assert_eq!(available, 0);
        },
        other => panic!("Expected InsufficientStock, got {other:?}"),
    }

    // Nothing was persisted: no order, no stock movement, no aggregate change, cart intact.
    assert!(db.fetch_orders_for_customer(&alice.customer_id).await.unwrap().is_empty());
    assert_eq!(db.fetch_product(sneakers.id).await.unwrap().unwrap().stock_quantity, 5);
    let totals = db.sales_totals().await.unwrap();
    assert_eq!(totals.total_transactions, 0);
    assert_eq!(totals.total_sales_amount, Birr::from_cents(0));
    assert_eq!(db.fetch_cart(&alice.customer_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn duplicate_webhooks_settle_exactly_once() {
    let db = new_test_db().await;
    let sneakers = seed_product(&db, "Sneakers", 1000, 5).await;
    let alice = seed_customer(&db, "alice", "alice@example.com").await;
    db.add_cart_item(&alice.customer_id, sneakers.id, 2).await.unwrap();

    let api = CheckoutApi::new(
        db.clone(),
        StubGateway::success(Birr::from_cents(2000)),
        test_checkout_config(),
        Default::default(),
    );
    let session = api.initiate_checkout(&alice.customer_id).await.unwrap();
    let first = api.handle_payment_webhook(&session.tx_ref).await.unwrap();
    let second = api.handle_payment_webhook(&session.tx_ref).await.unwrap();

    assert!(first.newly_settled);
    assert!(!second.newly_settled);
    assert_eq!(first.order.order_id, second.order.order_id);
    // Exactly one order and one aggregate update.
    assert_eq!(db.fetch_orders_for_customer(&alice.customer_id).await.unwrap().len(), 1);
    let totals = db.sales_totals().await.unwrap();
    assert_eq!(totals.total_transactions, 1);
    assert_eq!(totals.total_stock_sold, 2);
    assert_eq!(db.fetch_product(sneakers.id).await.unwrap().unwrap().stock_quantity, 3);
}

#[tokio::test]
async fn order_totals_are_snapshotted_against_price_changes() {
    let db = new_test_db().await;
    let sneakers = seed_product(&db, "Sneakers", 1000, 5).await;
    let alice = seed_customer(&db, "alice", "alice@example.com").await;
    db.add_cart_item(&alice.customer_id, sneakers.id, 3).await.unwrap();

    let api = CheckoutApi::new(
        db.clone(),
        StubGateway::success(Birr::from_cents(3000)),
        test_checkout_config(),
        Default::default(),
    );
    let session = api.initiate_checkout(&alice.customer_id).await.unwrap();
    let settled = api.handle_payment_webhook(&session.tx_ref).await.unwrap();

    // A later catalog price change must not affect the settled order.
    sqlx::query("UPDATE products SET price = 99999 WHERE id = $1")
        .bind(sneakers.id)
        .execute(db.pool())
        .await
        .unwrap();

    let history = api.order_history(&alice.customer_id).await.unwrap();
    assert_eq!(history.len(), 1);
    let line_sum: Birr = history[0].items.iter().map(|i| i.price_at_purchase * i.quantity).sum();
    assert_eq!(history[0].order.total_amount, line_sum);
    assert_eq!(line_sum, Birr::from_cents(3000));
    assert_eq!(settled.order.total_amount, Birr::from_cents(3000));
}

#[tokio::test]
async fn checkout_of_an_empty_cart_is_rejected() {
    let db = new_test_db().await;
    let alice = seed_customer(&db, "alice", "alice@example.com").await;
    let api = CheckoutApi::new(
        db.clone(),
        StubGateway::success(Birr::from_cents(0)),
        test_checkout_config(),
        Default::default(),
    );
    let err = api.initiate_checkout(&alice.customer_id).await.expect_err("expected EmptyCart");
    assert!(matches!(err, CheckoutError::EmptyCart));
}

#[tokio::test]
async fn a_verified_payment_with_an_emptied_cart_is_surfaced() {
    let db = new_test_db().await;
    let sneakers = seed_product(&db, "Sneakers", 1000, 5).await;
    let alice = seed_customer(&db, "alice", "alice@example.com").await;
    db.add_cart_item(&alice.customer_id, sneakers.id, 1).await.unwrap();

    let api = CheckoutApi::new(
        db.clone(),
        StubGateway::success(Birr::from_cents(1000)),
        test_checkout_config(),
        Default::default(),
    );
    let session = api.initiate_checkout(&alice.customer_id).await.unwrap();
    // The shopper empties the cart between paying and the webhook arriving.
    db.remove_cart_item(&alice.customer_id, sneakers.id).await.unwrap();

    let err = api.handle_payment_webhook(&session.tx_ref).await.expect_err("expected EmptyCart");
    assert!(matches!(err, CheckoutError::EmptyCart));
    assert!(db.fetch_orders_for_customer(&alice.customer_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn unsuccessful_payments_are_not_settled() {
    let db = new_test_db().await;
    let sneakers = seed_product(&db, "Sneakers", 1000, 5).await;
    let alice = seed_customer(&db, "alice", "alice@example.com").await;
    db.add_cart_item(&alice.customer_id, sneakers.id, 1).await.unwrap();

    let api = CheckoutApi::new(db.clone(), StubGateway::failed(), test_checkout_config(), Default::default());
    let tx_ref = storefront_engine::helpers::new_tx_ref(&alice.customer_id);
    let err = api.handle_payment_webhook(&tx_ref).await.expect_err("expected failure");
    assert!(matches!(err, CheckoutError::PaymentNotSuccessful(_)));
    assert_eq!(db.fetch_product(sneakers.id).await.unwrap().unwrap().stock_quantity, 5);
}

#[tokio::test]
async fn customer_resolution_prefers_the_reference_and_rejects_mismatches() {
    let db = new_test_db().await;
    let sneakers = seed_product(&db, "Sneakers", 1000, 5).await;
    let alice = seed_customer(&db, "alice", "alice@example.com").await;
    let _bob = seed_customer(&db, "bob", "bob@example.com").await;
    db.add_cart_item(&alice.customer_id, sneakers.id, 1).await.unwrap();

    // The reference says alice, but the verified email belongs to bob: reject.
    let api = CheckoutApi::new(
        db.clone(),
        StubGateway::success_for(Birr::from_cents(1000), "bob@example.com"),
        test_checkout_config(),
        Default::default(),
    );
    let tx_ref = storefront_engine::helpers::new_tx_ref("alice");
    let err = api.handle_payment_webhook(&tx_ref).await.expect_err("expected mismatch");
    assert!(matches!(err, CheckoutError::CustomerMismatch));

    // A reference that resolves nowhere falls back to the verified email.
    let api = CheckoutApi::new(
        db.clone(),
        StubGateway::success_for(Birr::from_cents(1000), "alice@example.com"),
        test_checkout_config(),
        Default::default(),
    );
    let foreign_ref = TxRef::from("cart-ghost-1722470400-ab12".to_string());
    let settled = api.handle_payment_webhook(&foreign_ref).await.expect("email fallback failed");
    assert_eq!(settled.order.customer_id, "alice");

    // No reference match and no email match: unknown customer.
    let api = CheckoutApi::new(
        db.clone(),
        StubGateway::success(Birr::from_cents(1000)),
        test_checkout_config(),
        Default::default(),
    );
    let err =
        api.handle_payment_webhook(&TxRef::from("cart-ghost-1722470400-cd34".to_string())).await.expect_err("?");
    assert!(matches!(err, CheckoutError::UnknownCustomer));
}

#[tokio::test]
async fn settlement_publishes_order_and_low_stock_events() {
    let db = new_test_db().await;
    // Threshold is 5, so settling 2 of 6 leaves 4 and must raise a low-stock event.
    let sneakers = seed_product(&db, "Sneakers", 1000, 6).await;
    let alice = seed_customer(&db, "alice", "alice@example.com").await;
    db.add_cart_item(&alice.customer_id, sneakers.id, 2).await.unwrap();

    let (settled_tx, mut settled_rx) = tokio::sync::mpsc::channel(4);
    let (low_stock_tx, mut low_stock_rx) = tokio::sync::mpsc::channel(4);
    let mut hooks = storefront_engine::events::EventHooks::default();
    hooks.on_order_settled(move |ev| {
        let tx = settled_tx.clone();
        Box::pin(async move {
            let _ = tx.send(ev).await;
        }) as std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>>
    });
    hooks.on_low_stock(move |ev| {
        let tx = low_stock_tx.clone();
        Box::pin(async move {
            let _ = tx.send(ev).await;
        }) as std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>>
    });
    let handlers = EventHandlers::new(4, hooks);
    let producers = handlers.producers();
    handlers.start_handlers().await;

    let api =
        CheckoutApi::new(db.clone(), StubGateway::success(Birr::from_cents(2000)), test_checkout_config(), producers);
    let session = api.initiate_checkout(&alice.customer_id).await.unwrap();
    api.handle_payment_webhook(&session.tx_ref).await.unwrap();

    let settled_event = tokio::time::timeout(std::time::Duration::from_secs(5), settled_rx.recv())
        .await
        .expect("timed out waiting for the settled event")
        .expect("channel closed");
    assert_eq!(settled_event.customer_email, "alice@example.com");
    assert_eq!(settled_event.items.len(), 1);

    let low_stock_event = tokio::time::timeout(std::time::Duration::from_secs(5), low_stock_rx.recv())
        .await
        .expect("timed out waiting for the low-stock event")
        .expect("channel closed");
    assert_eq!(low_stock_event.product.id, sneakers.id);
    assert_eq!(low_stock_event.product.stock_quantity, 4);
}
