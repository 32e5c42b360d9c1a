use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, Utc};
use log::debug;

use crate::{
    db_types::{FlagReason, NewRequestLog, RequestLogEntry, SuspiciousIp},
    traits::{AbuseApiError, AbuseTracking},
};

pub const DEFAULT_SENSITIVE_PATHS: [&str; 2] = ["/admin", "/api/token"];
pub const DEFAULT_MAX_REQUESTS_PER_WINDOW: i64 = 100;

/// The pure classifier at the heart of the scanner. Given a window of request-log entries, an IP is suspicious if
/// it touched a sensitive path at least once, or issued strictly more than `max_requests` requests in the window.
/// The result is sorted and de-duplicated, so repeated runs over the same window produce the same flags.
pub fn classify_window(
    entries: &[RequestLogEntry],
    sensitive_paths: &[String],
    max_requests: i64,
) -> Vec<(String, FlagReason)> {
    let mut request_counts: BTreeMap<&str, i64> = BTreeMap::new();
    let mut sensitive_hits: BTreeSet<&str> = BTreeSet::new();
    for entry in entries {
        *request_counts.entry(entry.ip_address.as_str()).or_insert(0) += 1;
        if sensitive_paths.iter().any(|p| entry.path.starts_with(p.as_str())) {
            sensitive_hits.insert(entry.ip_address.as_str());
        }
    }
    let mut flags = Vec::new();
    for ip in &sensitive_hits {
        flags.push((ip.to_string(), FlagReason::SensitivePath));
    }
    for (ip, count) in &request_counts {
        if *count > max_requests {
            flags.push((ip.to_string(), FlagReason::ExcessiveRequests));
        }
    }
    flags.sort();
    flags
}

/// Scans the request log for abusive IPs and persists flags with get-or-create semantics.
#[derive(Debug, Clone)]
pub struct AbuseApi<B> {
    db: B,
    sensitive_paths: Vec<String>,
    max_requests: i64,
}

impl<B> AbuseApi<B>
where B: AbuseTracking
{
    pub fn new(db: B) -> Self {
        let sensitive_paths = DEFAULT_SENSITIVE_PATHS.iter().map(|p| p.to_string()).collect();
        Self { db, sensitive_paths, max_requests: DEFAULT_MAX_REQUESTS_PER_WINDOW }
    }

    pub fn with_limits(mut self, sensitive_paths: Vec<String>, max_requests: i64) -> Self {
        self.sensitive_paths = sensitive_paths;
        self.max_requests = max_requests;
        self
    }

    pub async fn record_request(&self, ip_address: String, path: String) -> Result<(), AbuseApiError> {
        self.db.record_request(NewRequestLog { ip_address, path }).await
    }

    pub async fn is_flagged(&self, ip: &str) -> Result<bool, AbuseApiError> {
        self.db.is_flagged(ip).await
    }

    pub async fn flagged(&self) -> Result<Vec<SuspiciousIp>, AbuseApiError> {
        self.db.fetch_flagged().await
    }

    /// Classifies the trailing `window` of the request log and persists any flags. Returns the flags that are new
    /// in this run; flags that already existed are left untouched.
    pub async fn scan(&self, window: Duration) -> Result<Vec<SuspiciousIp>, AbuseApiError> {
        let cutoff = Utc::now() - window;
        let entries = self.db.requests_since(cutoff).await?;
        let flags = classify_window(&entries, &self.sensitive_paths, self.max_requests);
        debug!("🕵️ Scanned {} request(s): {} candidate flag(s)", entries.len(), flags.len());
        let mut newly_flagged = Vec::new();
        for (ip, reason) in flags {
            let (flag, created) = self.db.flag_suspicious(&ip, reason).await?;
            if created {
                newly_flagged.push(flag);
            }
        }
        Ok(newly_flagged)
    }
}

#[cfg(test)]
mod test {
    use chrono::Utc;

    use super::*;

    fn entry(ip: &str, path: &str) -> RequestLogEntry {
        RequestLogEntry { id: 0, ip_address: ip.to_string(), path: path.to_string(), created_at: Utc::now() }
    }

    fn sensitive() -> Vec<String> {
        DEFAULT_SENSITIVE_PATHS.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn a_single_sensitive_touch_is_enough() {
        let entries = vec![entry("10.0.0.1", "/api/products"), entry("10.0.0.2", "/admin/users")];
        let flags = classify_window(&entries, &sensitive(), 100);
        assert_eq!(flags, vec![("10.0.0.2".to_string(), FlagReason::SensitivePath)]);
    }

    #[test]
    fn the_threshold_is_strictly_greater_than() {
        let at_limit: Vec<_> = (0..100).map(|_| entry("10.0.0.1", "/api/products")).collect();
        assert!(classify_window(&at_limit, &sensitive(), 100).is_empty());

        let over_limit: Vec<_> = (0..101).map(|_| entry("10.0.0.1", "/api/products")).collect();
        let flags = classify_window(&over_limit, &sensitive(), 100);
        assert_eq!(flags, vec![("10.0.0.1".to_string(), FlagReason::ExcessiveRequests)]);
    }

    #[test]
    fn one_ip_can_earn_both_flags() {
        let mut entries: Vec<_> = (0..101).map(|_| entry("10.0.0.9", "/api/products")).collect();
        entries.push(entry("10.0.0.9", "/admin"));
        let flags = classify_window(&entries, &sensitive(), 100);
        assert_eq!(flags, vec![
            ("10.0.0.9".to_string(), FlagReason::SensitivePath),
            ("10.0.0.9".to_string(), FlagReason::ExcessiveRequests),
        ]);
    }

    #[test]
    fn reruns_are_deterministic() {
        let entries = vec![
            entry("10.0.0.3", "/admin"),
            entry("10.0.0.1", "/admin"),
            entry("10.0.0.2", "/api/token/refresh"),
        ];
        let first = classify_window(&entries, &sensitive(), 100);
        let second = classify_window(&entries, &sensitive(), 100);
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }
}
