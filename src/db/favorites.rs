//! Per-user saved listings.

use super::listings::Listing;
use super::{now_text, Store, StoreResult};

impl Store {
    /// Save a listing. Returns `false` if it was already saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn add_favorite(&self, user_id: i64, listing_id: i64) -> StoreResult<bool> {
        let result = sqlx::query(
            "INSERT INTO favorites (user_id, listing_id, created_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id, listing_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(listing_id)
        .bind(now_text())
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Unsave a listing. Returns `false` if it was not saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn remove_favorite(&self, user_id: i64, listing_id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = ?1 AND listing_id = ?2")
            .bind(user_id)
            .bind(listing_id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether `user_id` saved `listing_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database read fails.
    pub async fn is_favorite(&self, user_id: i64, listing_id: i64) -> StoreResult<bool> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM favorites WHERE user_id = ?1 AND listing_id = ?2")
                .bind(user_id)
                .bind(listing_id)
                .fetch_optional(self.pool())
                .await?;
        Ok(row.is_some())
    }

    /// Saved listings that are still visible, most recently saved first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database read fails.
    pub async fn favorites_for_user(&self, user_id: i64) -> StoreResult<Vec<Listing>> {
        let ids: Vec<(i64,)> = sqlx::query_as(
            "SELECT f.listing_id FROM favorites f
             JOIN listings l ON l.id = f.listing_id
             WHERE f.user_id = ?1 AND l.status != 'deleted'
             ORDER BY f.created_at DESC, f.id DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;

        let mut listings = Vec::with_capacity(ids.len());
        for (id,) in ids {
            if let Some(listing) = self.listing_by_id(id).await? {
                listings.push(listing);
            }
        }
        Ok(listings)
    }
}
