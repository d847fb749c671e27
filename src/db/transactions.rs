//! Purchase records between buyers and sellers.

use serde::{Deserialize, Serialize};

use super::{now_text, to_sql_count, Store, StoreError, StoreResult};

/// State of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Awaiting completion.
    Pending,
    /// Paid and delivered.
    Completed,
    /// Called off.
    Cancelled,
    /// Money returned.
    Refunded,
}

impl TransactionStatus {
    /// Returns the string representation stored in SQLite.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        }
    }

    /// Parse from a SQLite text value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a recognised status.
    pub fn parse(s: &str) -> Result<Self, StoreError> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "refunded" => Ok(Self::Refunded),
            other => Err(StoreError::InvalidEnum {
                field: "transaction status",
                value: other.to_owned(),
            }),
        }
    }
}

/// A transaction row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Row id.
    pub id: i64,
    /// Listing sold.
    pub listing_id: i64,
    /// Buyer (`users.id`).
    pub buyer_id: i64,
    /// Seller (`users.id`).
    pub seller_id: i64,
    /// Amount in cents.
    pub amount_cents: i64,
    /// ISO currency code.
    pub currency: String,
    /// Current state.
    pub status: TransactionStatus,
    /// Free-form payment method label.
    pub payment_method: Option<String>,
    /// Creation time (RFC 3339).
    pub created_at: String,
}

type TransactionRow = (i64, i64, i64, i64, i64, String, String, Option<String>, String);

const TRANSACTION_COLUMNS: &str = "id, listing_id, buyer_id, seller_id, amount_cents, currency, \
     status, payment_method, created_at";

fn row_into_transaction(row: TransactionRow) -> StoreResult<Transaction> {
    let (
        id,
        listing_id,
        buyer_id,
        seller_id,
        amount_cents,
        currency,
        status,
        payment_method,
        created_at,
    ) = row;
    Ok(Transaction {
        id,
        listing_id,
        buyer_id,
        seller_id,
        amount_cents,
        currency,
        status: TransactionStatus::parse(&status)?,
        payment_method,
        created_at,
    })
}

impl Store {
    /// Open a pending transaction for a listing at its current price.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the listing does not exist.
    pub async fn create_transaction(
        &self,
        listing_id: i64,
        buyer_id: i64,
        payment_method: Option<&str>,
    ) -> StoreResult<Transaction> {
        let listing = self.require_listing(listing_id).await?;
        let now = now_text();
        let result = sqlx::query(
            "INSERT INTO transactions (listing_id, buyer_id, seller_id, amount_cents, currency, payment_method, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
        )
        .bind(listing_id)
        .bind(buyer_id)
        .bind(listing.user_id)
        .bind(listing.price_cents)
        .bind(&listing.currency)
        .bind(payment_method)
        .bind(&now)
        .execute(self.pool())
        .await?;

        Ok(Transaction {
            id: result.last_insert_rowid(),
            listing_id,
            buyer_id,
            seller_id: listing.user_id,
            amount_cents: listing.price_cents,
            currency: listing.currency,
            status: TransactionStatus::Pending,
            payment_method: payment_method.map(str::to_owned),
            created_at: now,
        })
    }

    /// Move a transaction to a new state.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the transaction does not exist.
    pub async fn set_transaction_status(
        &self,
        transaction_id: i64,
        status: TransactionStatus,
    ) -> StoreResult<()> {
        let result =
            sqlx::query("UPDATE transactions SET status = ?1, updated_at = ?2 WHERE id = ?3")
                .bind(status.as_str())
                .bind(now_text())
                .bind(transaction_id)
                .execute(self.pool())
                .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "transaction",
                id: transaction_id,
            });
        }
        Ok(())
    }

    /// Transactions, optionally filtered by status, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database read fails.
    pub async fn list_transactions(
        &self,
        status: Option<TransactionStatus>,
        limit: u32,
        offset: u32,
    ) -> StoreResult<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions
             WHERE (?1 IS NULL OR status = ?1)
             ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3"
        ))
        .bind(status.map(|s| s.as_str()))
        .bind(to_sql_count(limit))
        .bind(to_sql_count(offset))
        .fetch_all(self.pool())
        .await?;
        rows.into_iter().map(row_into_transaction).collect()
    }

    /// Count transactions, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns an error if the database read fails.
    pub async fn count_transactions(&self, status: Option<TransactionStatus>) -> StoreResult<u64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM transactions WHERE (?1 IS NULL OR status = ?1)")
                .bind(status.map(|s| s.as_str()))
                .fetch_one(self.pool())
                .await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}
