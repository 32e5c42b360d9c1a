use chrono::NaiveDate;

use crate::{
    db_types::{DailySalesSummary, SalesTotals},
    traits::SalesApiError,
};

/// The running sales aggregate and its daily rollover.
///
/// The totals row is process-wide shared mutable state; implementations must serialise every update against
/// in-flight settlements (the SQLite backend runs both inside write transactions on the same singleton row).
pub trait SalesLedger: Clone {
    /// The current running totals.
    fn sales_totals(&self) -> impl std::future::Future<Output = Result<SalesTotals, SalesApiError>> + Send;

    /// Snapshots the running totals into an immutable summary for `date` and resets the three counters to zero, in
    /// one transaction. If a summary for `date` already exists, nothing happens and `None` is returned, so the
    /// rollover can be re-run safely.
    fn rollover_daily_sales(
        &self,
        date: NaiveDate,
    ) -> impl std::future::Future<Output = Result<Option<DailySalesSummary>, SalesApiError>> + Send;

    /// All daily summaries, newest first.
    fn fetch_daily_summaries(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<DailySalesSummary>, SalesApiError>> + Send;
}
