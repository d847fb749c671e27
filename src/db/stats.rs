//! Aggregate counts for the admin dashboard.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{timestamp_text, Store, StoreResult};

/// User totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    /// All registered users.
    pub total: u64,
    /// Not blocked.
    pub active: u64,
    /// Blocked.
    pub blocked: u64,
    /// Verified sellers.
    pub verified: u64,
    /// Registered since midnight UTC.
    pub new_today: u64,
    /// Registered in the last seven days.
    pub new_week: u64,
}

/// Listing totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingStats {
    /// All listings including deleted.
    pub total: u64,
    /// Active.
    pub active: u64,
    /// Sold.
    pub sold: u64,
    /// Flagged.
    pub flagged: u64,
    /// Created since midnight UTC.
    pub new_today: u64,
    /// Created in the last seven days.
    pub new_week: u64,
}

/// Transaction totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionStats {
    /// All transactions.
    pub total: u64,
    /// Pending.
    pub pending: u64,
    /// Completed.
    pub completed: u64,
}

/// Everything the dashboard shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// User totals.
    pub users: UserStats,
    /// Listing totals.
    pub listings: ListingStats,
    /// Transaction totals.
    pub transactions: TransactionStats,
}

fn count(value: Option<i64>) -> u64 {
    value.and_then(|v| u64::try_from(v).ok()).unwrap_or(0)
}

impl Store {
    /// Compute dashboard counters in three aggregate queries.
    ///
    /// # Errors
    ///
    /// Returns an error if any query fails.
    pub async fn dashboard_stats(&self) -> StoreResult<DashboardStats> {
        let now = Utc::now();
        let today = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|dt| timestamp_text(dt.and_utc()))
            .unwrap_or_else(|| timestamp_text(now));
        let week_ago = now
            .checked_sub_signed(Duration::days(7))
            .map(timestamp_text)
            .unwrap_or_else(|| today.clone());

        let users: (i64, Option<i64>, Option<i64>, Option<i64>, Option<i64>, Option<i64>) =
            sqlx::query_as(
                "SELECT COUNT(*),
                        SUM(is_active = 1),
                        SUM(is_active = 0),
                        SUM(is_verified = 1),
                        SUM(created_at >= ?1),
                        SUM(created_at >= ?2)
                 FROM users",
            )
            .bind(&today)
            .bind(&week_ago)
            .fetch_one(self.pool())
            .await?;

        let listings: (i64, Option<i64>, Option<i64>, Option<i64>, Option<i64>, Option<i64>) =
            sqlx::query_as(
                "SELECT COUNT(*),
                        SUM(status = 'active'),
                        SUM(status = 'sold'),
                        SUM(flagged = 1),
                        SUM(created_at >= ?1),
                        SUM(created_at >= ?2)
                 FROM listings",
            )
            .bind(&today)
            .bind(&week_ago)
            .fetch_one(self.pool())
            .await?;

        let transactions: (i64, Option<i64>, Option<i64>) = sqlx::query_as(
            "SELECT COUNT(*), SUM(status = 'pending'), SUM(status = 'completed') FROM transactions",
        )
        .fetch_one(self.pool())
        .await?;

        Ok(DashboardStats {
            users: UserStats {
                total: count(Some(users.0)),
                active: count(users.1),
                blocked: count(users.2),
                verified: count(users.3),
                new_today: count(users.4),
                new_week: count(users.5),
            },
            listings: ListingStats {
                total: count(Some(listings.0)),
                active: count(listings.1),
                sold: count(listings.2),
                flagged: count(listings.3),
                new_today: count(listings.4),
                new_week: count(listings.5),
            },
            transactions: TransactionStats {
                total: count(Some(transactions.0)),
                pending: count(transactions.1),
                completed: count(transactions.2),
            },
        })
    }
}
