//! Marketplace store backed by SQLite.
//!
//! [`Store`] is the only gateway to the database file. The schema is applied
//! inline via `include_str!` on every open; every statement in it is
//! idempotent so reopening an existing database is safe.
//!
//! Queries are grouped by table in the submodules, each adding an
//! `impl Store` block.

pub mod favorites;
pub mod grants;
pub mod listings;
pub mod messages;
pub mod reviews;
pub mod stats;
pub mod transactions;
pub mod users;
pub mod warnings;

use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

pub use self::listings::{
    Listing, ListingEdit, ListingField, ListingFilter, ListingStatus, NewListing, Photo, PhotoRef,
    SearchCriteria,
};
pub use self::messages::Message;
pub use self::reviews::{NewReview, Review};
pub use self::stats::{DashboardStats, ListingStats, TransactionStats, UserStats};
pub use self::transactions::{Transaction, TransactionStatus};
pub use self::users::{ProfileField, TelegramProfile, User, UserFilter};
pub use self::warnings::{Severity, Warning};

const SCHEMA_SQL: &str = include_str!("../../migrations/001_schema.sql");

/// Tables the schema creates, in creation order.
pub const TABLES: &[&str] = &[
    "users",
    "listings",
    "listing_photos",
    "favorites",
    "messages",
    "reviews",
    "transactions",
    "admin_grants",
    "admin_audit_log",
    "user_warnings",
];

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A JSON column could not be encoded or decoded.
    #[error("json column error: {0}")]
    Json(#[from] serde_json::Error),

    /// An invalid enum value was read from the database.
    #[error("invalid {field} value: {value:?}")]
    InvalidEnum {
        /// Which field contained the bad value.
        field: &'static str,
        /// The unexpected value.
        value: String,
    },

    /// A referenced row does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of row that was looked up.
        entity: &'static str,
        /// Id that failed to resolve.
        id: i64,
    },

    /// The write conflicts with existing data (duplicate, self-reference).
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Handle to the marketplace database. Cheap to clone.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (or create) the database at the given path and apply the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migration fails.
    pub async fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .pragma("trusted_schema", "OFF")
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .with_context(|| format!("failed to open database at {}", path.display()))?;

        sqlx::raw_sql(SCHEMA_SQL)
            .execute(&pool)
            .await
            .context("failed to apply marketplace schema")?;

        Ok(Self { pool })
    }

    /// Underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Names of the expected tables that are missing from the database.
    ///
    /// # Errors
    ///
    /// Returns an error if `sqlite_master` cannot be queried.
    pub async fn missing_tables(&self) -> StoreResult<Vec<&'static str>> {
        let present: Vec<(String,)> =
            sqlx::query_as("SELECT name FROM sqlite_master WHERE type = 'table'")
                .fetch_all(&self.pool)
                .await?;

        Ok(TABLES
            .iter()
            .copied()
            .filter(|t| !present.iter().any(|(name,)| name == t))
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// Current time as stored in every `*_at` column.
pub(crate) fn now_text() -> String {
    timestamp_text(Utc::now())
}

/// Fixed-width RFC 3339 with millisecond precision; sorts lexicographically.
pub(crate) fn timestamp_text(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `LIMIT`/`OFFSET` values are bound as `i64`.
pub(crate) fn to_sql_count(value: u32) -> i64 {
    i64::from(value)
}
