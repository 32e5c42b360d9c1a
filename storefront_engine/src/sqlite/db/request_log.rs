use chrono::{DateTime, Utc};
use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{FlagReason, NewRequestLog, RequestLogEntry, SuspiciousIp};

pub async fn insert_request(entry: NewRequestLog, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO request_log (ip_address, path) VALUES ($1, $2)")
        .bind(entry.ip_address)
        .bind(entry.path)
        .execute(conn)
        .await?;
    Ok(())
}

/// Fetches all log entries created at or after the cutoff, oldest first.
///
/// The comparison goes through `unixepoch` because rows carry the `CURRENT_TIMESTAMP` text format while bound
/// chrono values are RFC3339; the two do not compare lexicographically.
pub async fn requests_since(
    cutoff: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Vec<RequestLogEntry>, sqlx::Error> {
    let entries =
        sqlx::query_as("SELECT * FROM request_log WHERE unixepoch(created_at) >= $1 ORDER BY created_at ASC")
            .bind(cutoff.timestamp())
            .fetch_all(conn)
            .await?;
    Ok(entries)
}

/// Inserts a flag for `(ip, reason)` unless one already exists. The second return value is true when the flag was
/// newly created.
pub async fn get_or_create_flag(
    ip: &str,
    reason: FlagReason,
    conn: &mut SqliteConnection,
) -> Result<(SuspiciousIp, bool), sqlx::Error> {
    let existing: Option<SuspiciousIp> =
        sqlx::query_as("SELECT * FROM suspicious_ips WHERE ip_address = $1 AND reason = $2")
            .bind(ip)
            .bind(reason.to_string())
            .fetch_optional(&mut *conn)
            .await?;
    if let Some(flag) = existing {
        return Ok((flag, false));
    }
    let flag: SuspiciousIp =
        sqlx::query_as("INSERT INTO suspicious_ips (ip_address, reason) VALUES ($1, $2) RETURNING *")
            .bind(ip)
            .bind(reason.to_string())
            .fetch_one(conn)
            .await?;
    debug!("🗃️ Flagged {ip} as suspicious ({reason})");
    Ok((flag, true))
}

pub async fn fetch_flagged(conn: &mut SqliteConnection) -> Result<Vec<SuspiciousIp>, sqlx::Error> {
    let flags = sqlx::query_as("SELECT * FROM suspicious_ips ORDER BY created_at ASC").fetch_all(conn).await?;
    Ok(flags)
}

pub async fn is_flagged(ip: &str, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let existing: Option<SuspiciousIp> =
        sqlx::query_as("SELECT * FROM suspicious_ips WHERE ip_address = $1 LIMIT 1")
            .bind(ip)
            .fetch_optional(conn)
            .await?;
    Ok(existing.is_some())
}
