use chrono::{DateTime, Utc};

use crate::{
    db_types::{FlagReason, NewRequestLog, RequestLogEntry, SuspiciousIp},
    traits::AbuseApiError,
};

/// Request-log storage backing the suspicious-IP scanner.
pub trait AbuseTracking: Clone {
    fn record_request(
        &self,
        entry: NewRequestLog,
    ) -> impl std::future::Future<Output = Result<(), AbuseApiError>> + Send;

    /// All log entries created at or after `cutoff`, oldest first.
    fn requests_since(
        &self,
        cutoff: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<Vec<RequestLogEntry>, AbuseApiError>> + Send;

    /// Get-or-create a flag for `(ip, reason)`. The boolean is true when the flag was newly created, so re-running
    /// a scan over the same window never duplicates flags.
    fn flag_suspicious(
        &self,
        ip: &str,
        reason: FlagReason,
    ) -> impl std::future::Future<Output = Result<(SuspiciousIp, bool), AbuseApiError>> + Send;

    fn fetch_flagged(&self) -> impl std::future::Future<Output = Result<Vec<SuspiciousIp>, AbuseApiError>> + Send;

    fn is_flagged(&self, ip: &str) -> impl std::future::Future<Output = Result<bool, AbuseApiError>> + Send;
}
