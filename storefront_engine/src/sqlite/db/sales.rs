use chrono::NaiveDate;
use log::trace;
use sqlx::SqliteConnection;
use storefront_common::Birr;

use crate::{
    db_types::{DailySalesSummary, SalesTotals},
    traits::SalesApiError,
};

/// The singleton row holding the store-wide running totals.
const TOTALS_ROW_ID: i64 = 1;

pub async fn sales_totals(conn: &mut SqliteConnection) -> Result<SalesTotals, SalesApiError> {
    let totals: Option<SalesTotals> =
        sqlx::query_as("SELECT * FROM sales_totals WHERE id = $1").bind(TOTALS_ROW_ID).fetch_optional(conn).await?;
    totals.ok_or(SalesApiError::TotalsRowMissing)
}

/// Adds a settled order to the running totals. Runs inside the settlement transaction, so the update is serialised
/// against every other settlement and against the daily rollover.
pub async fn record_sale(
    amount: Birr,
    units_sold: i64,
    conn: &mut SqliteConnection,
) -> Result<SalesTotals, SalesApiError> {
    let totals: Option<SalesTotals> = sqlx::query_as(
        r#"
            UPDATE sales_totals
            SET total_sales_amount = total_sales_amount + $1,
                total_transactions = total_transactions + 1,
                total_stock_sold = total_stock_sold + $2,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $3
            RETURNING *;
        "#,
    )
    .bind(amount.value())
    .bind(units_sold)
    .bind(TOTALS_ROW_ID)
    .fetch_optional(conn)
    .await?;
    let totals = totals.ok_or(SalesApiError::TotalsRowMissing)?;
    trace!("🗃️ Sales totals now {} across {} transaction(s)", totals.total_sales_amount, totals.total_transactions);
    Ok(totals)
}

pub async fn summary_for_date(
    date: NaiveDate,
    conn: &mut SqliteConnection,
) -> Result<Option<DailySalesSummary>, sqlx::Error> {
    let summary =
        sqlx::query_as("SELECT * FROM daily_sales WHERE date = $1").bind(date).fetch_optional(conn).await?;
    Ok(summary)
}

pub async fn insert_summary(
    date: NaiveDate,
    totals: &SalesTotals,
    conn: &mut SqliteConnection,
) -> Result<DailySalesSummary, sqlx::Error> {
    let summary = sqlx::query_as(
        r#"
            INSERT INTO daily_sales (date, total_sales_amount, total_transactions, total_stock_sold)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(date)
    .bind(totals.total_sales_amount.value())
    .bind(totals.total_transactions)
    .bind(totals.total_stock_sold)
    .fetch_one(conn)
    .await?;
    Ok(summary)
}

pub async fn reset_totals(conn: &mut SqliteConnection) -> Result<(), SalesApiError> {
    let result = sqlx::query(
        r#"
            UPDATE sales_totals
            SET total_sales_amount = 0,
                total_transactions = 0,
                total_stock_sold = 0,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $1;
        "#,
    )
    .bind(TOTALS_ROW_ID)
    .execute(conn)
    .await?;
    if result.rows_affected() == 0 {
        return Err(SalesApiError::TotalsRowMissing);
    }
    Ok(())
}

/// Returns all daily summaries, newest first.
pub async fn fetch_daily_summaries(conn: &mut SqliteConnection) -> Result<Vec<DailySalesSummary>, sqlx::Error> {
    let summaries = sqlx::query_as("SELECT * FROM daily_sales ORDER BY date DESC").fetch_all(conn).await?;
    Ok(summaries)
}
