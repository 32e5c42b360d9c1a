//! Background jobs: the daily sales rollover and the suspicious-IP scan.
use chrono::Utc;
use log::*;
use storefront_engine::{
    traits::{AbuseTracking, SalesLedger},
    AbuseApi,
    SalesApi,
};
use tokio::task::JoinHandle;

use crate::config::AbuseConfig;

/// Starts the daily sales rollover worker. Do not await the returned JoinHandle, as it will run indefinitely.
///
/// The job ticks frequently but acts at most once per calendar day: the rollover is a no-op whenever a summary for
/// the current date already exists.
pub fn start_rollover_worker<B>(db: B, interval: std::time::Duration) -> JoinHandle<()>
where B: SalesLedger + Send + Sync + 'static {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        let api = SalesApi::new(db);
        info!("🕰️ Daily sales rollover worker started");
        loop {
            timer.tick().await;
            let today = Utc::now().date_naive();
            match api.rollover(today).await {
                Ok(Some(summary)) => {
                    info!("🕰️ Saved daily sales for {} and reset the running totals", summary.date);
                },
                Ok(None) => {
                    trace!("🕰️ Daily sales for {today} already captured");
                },
                Err(e) => {
                    error!("🕰️ Error running the daily sales rollover: {e}");
                },
            }
        }
    })
}

/// Starts the suspicious-IP scan worker. Do not await the returned JoinHandle, as it will run indefinitely.
pub fn start_abuse_worker<B>(db: B, config: AbuseConfig) -> JoinHandle<()>
where B: AbuseTracking + Send + Sync + 'static {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(config.scan_interval);
        let api = AbuseApi::new(db).with_limits(config.sensitive_paths.clone(), config.max_requests);
        info!("🕰️ Suspicious-IP scan worker started");
        loop {
            timer.tick().await;
            match api.scan(config.window).await {
                Ok(newly_flagged) if newly_flagged.is_empty() => {
                    trace!("🕰️ Suspicious-IP scan complete. Nothing new");
                },
                Ok(newly_flagged) => {
                    let flagged = newly_flagged
                        .iter()
                        .map(|f| format!("{} ({})", f.ip_address, f.reason))
                        .collect::<Vec<String>>()
                        .join(", ");
                    info!("🕰️ {} new suspicious IP(s): {flagged}", newly_flagged.len());
                },
                Err(e) => {
                    error!("🕰️ Error running the suspicious-IP scan: {e}");
                },
            }
        }
    })
}
