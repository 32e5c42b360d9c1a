//! Suspicious-IP scanning against a real request log.
mod support;

use chrono::Duration;
use storefront_engine::{db_types::FlagReason, traits::AbuseTracking, AbuseApi};
use support::new_test_db;

#[tokio::test]
async fn scan_flags_and_is_idempotent() {
    let db = new_test_db().await;
    let api = AbuseApi::new(db.clone()).with_limits(vec!["/admin".to_string()], 100);

    for _ in 0..101 {
        api.record_request("10.1.1.1".to_string(), "/api/products".to_string()).await.unwrap();
    }
    api.record_request("10.2.2.2".to_string(), "/admin/login".to_string()).await.unwrap();
    api.record_request("10.3.3.3".to_string(), "/api/products".to_string()).await.unwrap();

    let newly_flagged = api.scan(Duration::hours(1)).await.unwrap();
    assert_eq!(newly_flagged.len(), 2);

    assert!(api.is_flagged("10.1.1.1").await.unwrap());
    assert!(api.is_flagged("10.2.2.2").await.unwrap());
    assert!(!api.is_flagged("10.3.3.3").await.unwrap());

    let flags = api.flagged().await.unwrap();
    let excessive = flags.iter().find(|f| f.ip_address == "10.1.1.1").unwrap();
    assert_eq!(excessive.reason, FlagReason::ExcessiveRequests);
    let sensitive = flags.iter().find(|f| f.ip_address == "10.2.2.2").unwrap();
    assert_eq!(sensitive.reason, FlagReason::SensitivePath);

    // Re-running over the same window creates nothing new.
    let second_run = api.scan(Duration::hours(1)).await.unwrap();
    assert!(second_run.is_empty());
    assert_eq!(api.flagged().await.unwrap().len(), 2);
}

#[tokio::test]
async fn old_entries_fall_out_of_the_window() {
    let db = new_test_db().await;
    let api = AbuseApi::new(db.clone()).with_limits(vec!["/admin".to_string()], 100);
    api.record_request("10.9.9.9".to_string(), "/admin".to_string()).await.unwrap();

    // A window that ends before the entry was written sees nothing.
    let flagged = api.scan(Duration::seconds(-5)).await.unwrap();
    assert!(flagged.is_empty());
    assert!(!db.is_flagged("10.9.9.9").await.unwrap());
}
