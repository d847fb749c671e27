//! Buyer/seller messages relayed through the bot.

use serde::{Deserialize, Serialize};

use super::{now_text, Store, StoreResult};

/// A relayed message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Row id.
    pub id: i64,
    /// Listing the conversation is about, if any.
    pub listing_id: Option<i64>,
    /// Sender (`users.id`).
    pub sender_id: i64,
    /// Receiver (`users.id`).
    pub receiver_id: i64,
    /// Message body.
    pub text: String,
    /// Receiver opened it.
    pub is_read: bool,
    /// Sent time (RFC 3339).
    pub created_at: String,
}

impl Store {
    /// Persist a message before it is forwarded.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn create_message(
        &self,
        sender_id: i64,
        receiver_id: i64,
        listing_id: Option<i64>,
        text: &str,
    ) -> StoreResult<Message> {
        let now = now_text();
        let result = sqlx::query(
            "INSERT INTO messages (listing_id, sender_id, receiver_id, text, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(listing_id)
        .bind(sender_id)
        .bind(receiver_id)
        .bind(text)
        .bind(&now)
        .execute(self.pool())
        .await?;

        Ok(Message {
            id: result.last_insert_rowid(),
            listing_id,
            sender_id,
            receiver_id,
            text: text.to_owned(),
            is_read: false,
            created_at: now,
        })
    }

    /// Unread messages addressed to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database read fails.
    pub async fn unread_count(&self, user_id: i64) -> StoreResult<u64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM messages WHERE receiver_id = ?1 AND is_read = 0")
                .bind(user_id)
                .fetch_one(self.pool())
                .await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Mark everything addressed to `user_id` as read. Returns rows touched.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn mark_read(&self, user_id: i64) -> StoreResult<u64> {
        let result =
            sqlx::query("UPDATE messages SET is_read = 1 WHERE receiver_id = ?1 AND is_read = 0")
                .bind(user_id)
                .execute(self.pool())
                .await?;
        Ok(result.rows_affected())
    }
}
