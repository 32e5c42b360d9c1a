//! The stock invariant under fire: many concurrent settlements against one product can never oversell it.
mod support;

use std::time::Duration;

use log::*;
use storefront_common::Birr;
use storefront_engine::{
    helpers::{new_tx_ref, retry_with_backoff},
    traits::{CartManagement, CatalogManagement, CheckoutDatabase, CheckoutError, NewSettlement, SalesLedger,
        SettlementLine},
};
use support::{new_test_db, seed_customer, seed_product};

const NUM_SHOPPERS: usize = 8;
const STARTING_STOCK: i64 = 5;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_settlements_never_oversell() {
    let db = new_test_db().await;
    let gadget = seed_product(&db, "Gadget", 100, STARTING_STOCK).await;

    let mut carts = Vec::with_capacity(NUM_SHOPPERS);
    for i in 0..NUM_SHOPPERS {
        let customer_id = format!("shopper-{i}");
        seed_customer(&db, &customer_id, &format!("{customer_id}@example.com")).await;
        db.add_cart_item(&customer_id, gadget.id, 1).await.unwrap();
        carts.push(customer_id);
    }

    info!("🚀️ Injecting {NUM_SHOPPERS} concurrent settlements against stock {STARTING_STOCK}");
    let mut handles = Vec::with_capacity(NUM_SHOPPERS);
    for customer_id in carts {
        let db = db.clone();
        let product_id = gadget.id;
        handles.push(tokio::spawn(async move {
            let settlement = NewSettlement {
                tx_ref: new_tx_ref(&customer_id),
                customer_id,
                lines: vec![SettlementLine { product_id, quantity: 1 }],
            };
            // SQLite writers conflict under load; transient busy errors are retried, exactly as the
            // orchestrator does it.
            retry_with_backoff(
                10,
                Duration::from_millis(10),
                "settlement",
                || db.settle_order(settlement.clone()),
                CheckoutError::is_transient,
            )
            .await
        }));
    }

    let mut successes = 0;
    let mut rejections = 0;
    for handle in handles {
        match handle.await.expect("task panicked") {
            Ok(_) => successes += 1,
            Err(CheckoutError::InsufficientStock { available, .. }) => {
                assert!(available >= 0);
                rejections += 1;
            },
            Err(e) => panic!("Unexpected settlement error: {e}"),
        }
    }

    // Exactly the starting stock was sold; everyone else was turned away.
    assert_eq!(successes, STARTING_STOCK as usize);
    assert_eq!(rejections, NUM_SHOPPERS - STARTING_STOCK as usize);
    let product = db.fetch_product(gadget.id).await.unwrap().unwrap();
    assert_eq!(product.stock_quantity, 0);
    let totals = db.sales_totals().await.unwrap();
    assert_eq!(totals.total_transactions, STARTING_STOCK);
    assert_eq!(totals.total_stock_sold, STARTING_STOCK);
    assert_eq!(totals.total_sales_amount, Birr::from_cents(100 * STARTING_STOCK));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn overlapping_multi_line_settlements_do_not_deadlock() {
    let db = new_test_db().await;
    let left = seed_product(&db, "Left", 100, 50).await;
    let right = seed_product(&db, "Right", 100, 50).await;

    // Half the shoppers buy (left, right), the other half (right, left). The stable acquisition order inside
    // settlement means the overlap cannot deadlock.
    let mut handles = Vec::new();
    for i in 0..6usize {
        let customer_id = format!("pair-{i}");
        seed_customer(&db, &customer_id, &format!("{customer_id}@example.com")).await;
        let (first, second) = if i % 2 == 0 { (left.id, right.id) } else { (right.id, left.id) };
        db.add_cart_item(&customer_id, first, 2).await.unwrap();
        db.add_cart_item(&customer_id, second, 2).await.unwrap();
        let db = db.clone();
        handles.push(tokio::spawn(async move {
            let settlement = NewSettlement {
                tx_ref: new_tx_ref(&customer_id),
                customer_id,
                lines: vec![
                    SettlementLine { product_id: first, quantity: 2 },
                    SettlementLine { product_id: second, quantity: 2 },
                ],
            };
            retry_with_backoff(
                10,
                Duration::from_millis(10),
                "settlement",
                || db.settle_order(settlement.clone()),
                CheckoutError::is_transient,
            )
            .await
        }));
    }
    for handle in handles {
        handle.await.expect("task panicked").expect("settlement failed");
    }
    assert_eq!(db.fetch_product(left.id).await.unwrap().unwrap().stock_quantity, 50 - 12);
    assert_eq!(db.fetch_product(right.id).await.unwrap().unwrap().stock_quantity, 50 - 12);
}
