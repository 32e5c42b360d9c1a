//! Daily sales rollover: snapshot, reset, and at-most-once-per-day semantics.
mod support;

use chrono::NaiveDate;
use storefront_common::Birr;
use storefront_engine::{sqlite::db::sales, traits::SalesLedger, SalesApi};
use support::new_test_db;

#[tokio::test]
async fn rollover_snapshots_and_resets_the_totals() {
    let db = new_test_db().await;
    // Accumulate (100.00, 4, 10) the same way settlements do.
    let mut conn = db.pool().acquire().await.unwrap();
    sales::record_sale(Birr::from_cents(2500), 3, &mut conn).await.unwrap();
    sales::record_sale(Birr::from_cents(2500), 3, &mut conn).await.unwrap();
    sales::record_sale(Birr::from_cents(2500), 2, &mut conn).await.unwrap();
    sales::record_sale(Birr::from_cents(2500), 2, &mut conn).await.unwrap();
    drop(conn);

    let api = SalesApi::new(db.clone());
    let date = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
    let summary = api.rollover(date).await.unwrap().expect("first rollover must capture a summary");
    assert_eq!(summary.date, date);
    assert_eq!(summary.total_sales_amount, Birr::from_cents(10000));
    assert_eq!(summary.total_transactions, 4);
    assert_eq!(summary.total_stock_sold, 10);

    let totals = db.sales_totals().await.unwrap();
    assert_eq!(totals.total_sales_amount, Birr::from_cents(0));
    assert_eq!(totals.total_transactions, 0);
    assert_eq!(totals.total_stock_sold, 0);
}

#[tokio::test]
async fn rollover_runs_at_most_once_per_day() {
    let db = new_test_db().await;
    let mut conn = db.pool().acquire().await.unwrap();
    sales::record_sale(Birr::from_cents(500), 1, &mut conn).await.unwrap();
    drop(conn);

    let api = SalesApi::new(db.clone());
    let date = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
    assert!(api.rollover(date).await.unwrap().is_some());

    // Sales continue after the rollover; a second run on the same date must not capture them.
    let mut conn = db.pool().acquire().await.unwrap();
    sales::record_sale(Birr::from_cents(700), 2, &mut conn).await.unwrap();
    drop(conn);
    assert!(api.rollover(date).await.unwrap().is_none());

    let summaries = api.daily_summaries().await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].total_sales_amount, Birr::from_cents(500));
    // The post-rollover sale is still in the running totals, waiting for the next day.
    let totals = api.totals().await.unwrap();
    assert_eq!(totals.total_sales_amount, Birr::from_cents(700));

    // The next day picks it up.
    let next_day = NaiveDate::from_ymd_opt(2025, 8, 2).unwrap();
    let summary = api.rollover(next_day).await.unwrap().expect("next day must roll over");
    assert_eq!(summary.total_sales_amount, Birr::from_cents(700));
    assert_eq!(summary.total_stock_sold, 2);
}
