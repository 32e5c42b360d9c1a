use chrono::NaiveDate;
use log::info;

use crate::{
    db_types::{DailySalesSummary, SalesTotals},
    traits::{SalesApiError, SalesLedger},
};

/// API wrapper for the running sales aggregate and its daily rollover.
#[derive(Debug, Clone)]
pub struct SalesApi<B> {
    db: B,
}

impl<B> SalesApi<B>
where B: SalesLedger
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn totals(&self) -> Result<SalesTotals, SalesApiError> {
        self.db.sales_totals().await
    }

    /// Captures the running totals into the immutable summary for `date` and resets them. Re-running for a date
    /// that already has a summary is a no-op, so the surrounding job can fire as often as it likes.
    pub async fn rollover(&self, date: NaiveDate) -> Result<Option<DailySalesSummary>, SalesApiError> {
        let result = self.db.rollover_daily_sales(date).await?;
        if let Some(summary) = &result {
            info!(
                "🕰️ Daily sales for {date}: {} across {} transaction(s), {} unit(s) sold",
                summary.total_sales_amount, summary.total_transactions, summary.total_stock_sold
            );
        }
        Ok(result)
    }

    pub async fn daily_summaries(&self) -> Result<Vec<DailySalesSummary>, SalesApiError> {
        self.db.fetch_daily_summaries().await
    }
}
