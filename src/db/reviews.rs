//! Seller reviews and the derived seller rating.

use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;

use super::{now_text, to_sql_count, Store, StoreError, StoreResult};

/// A stored review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Row id.
    pub id: i64,
    /// Author (`users.id`).
    pub reviewer_id: i64,
    /// Reviewed seller (`users.id`).
    pub seller_id: i64,
    /// Listing the purchase was about.
    pub listing_id: i64,
    /// Stars, 1 through 5.
    pub rating: i64,
    /// Optional comment.
    pub comment: Option<String>,
    /// Creation time (RFC 3339).
    pub created_at: String,
}

/// Validated review input produced by the review flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReview {
    /// Listing being reviewed.
    pub listing_id: i64,
    /// Stars, 1 through 5.
    pub rating: u8,
    /// Optional comment.
    pub comment: Option<String>,
}

type ReviewRow = (i64, i64, i64, i64, i64, Option<String>, String);

const REVIEW_COLUMNS: &str =
    "id, reviewer_id, seller_id, listing_id, rating, comment, created_at";

fn row_into_review(row: ReviewRow) -> Review {
    let (id, reviewer_id, seller_id, listing_id, rating, comment, created_at) = row;
    Review {
        id,
        reviewer_id,
        seller_id,
        listing_id,
        rating,
        comment,
        created_at,
    }
}

/// Recompute `rating` and `rating_count` for a seller from their reviews.
async fn refresh_seller_rating(conn: &mut SqliteConnection, seller_id: i64) -> StoreResult<()> {
    sqlx::query(
        "UPDATE users SET
            rating = COALESCE((SELECT AVG(rating) FROM reviews WHERE seller_id = ?1), 0),
            rating_count = (SELECT COUNT(*) FROM reviews WHERE seller_id = ?1),
            updated_at = ?2
         WHERE id = ?1",
    )
    .bind(seller_id)
    .bind(now_text())
    .execute(conn)
    .await?;
    Ok(())
}

impl Store {
    /// Store a review of the listing's seller and refresh their rating.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] for self-reviews or a second review
    /// of the same listing by the same reviewer, and
    /// [`StoreError::NotFound`] if the listing does not exist.
    pub async fn create_review(&self, reviewer_id: i64, new: &NewReview) -> StoreResult<Review> {
        if !(1..=5).contains(&new.rating) {
            return Err(StoreError::Conflict(format!(
                "rating {} outside 1..=5",
                new.rating
            )));
        }
        let listing = self.require_listing(new.listing_id).await?;
        if listing.user_id == reviewer_id {
            return Err(StoreError::Conflict(
                "sellers cannot review their own listing".to_owned(),
            ));
        }

        let mut tx = self.pool().begin().await?;

        let existing: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM reviews WHERE reviewer_id = ?1 AND listing_id = ?2")
                .bind(reviewer_id)
                .bind(new.listing_id)
                .fetch_optional(&mut *tx)
                .await?;
        if existing.is_some() {
            return Err(StoreError::Conflict(
                "listing already reviewed by this user".to_owned(),
            ));
        }

        let now = now_text();
        let result = sqlx::query(
            "INSERT INTO reviews (reviewer_id, seller_id, listing_id, rating, comment, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(reviewer_id)
        .bind(listing.user_id)
        .bind(new.listing_id)
        .bind(i64::from(new.rating))
        .bind(&new.comment)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        refresh_seller_rating(&mut tx, listing.user_id).await?;
        tx.commit().await?;

        Ok(Review {
            id: result.last_insert_rowid(),
            reviewer_id,
            seller_id: listing.user_id,
            listing_id: new.listing_id,
            rating: i64::from(new.rating),
            comment: new.comment.clone(),
            created_at: now,
        })
    }

    /// Whether `reviewer_id` already reviewed `listing_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database read fails.
    pub async fn has_reviewed(&self, reviewer_id: i64, listing_id: i64) -> StoreResult<bool> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM reviews WHERE reviewer_id = ?1 AND listing_id = ?2")
                .bind(reviewer_id)
                .bind(listing_id)
                .fetch_optional(self.pool())
                .await?;
        Ok(row.is_some())
    }

    /// Look up a review.
    ///
    /// # Errors
    ///
    /// Returns an error if the database read fails.
    pub async fn review_by_id(&self, review_id: i64) -> StoreResult<Option<Review>> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = ?1"
        ))
        .bind(review_id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(row_into_review))
    }

    /// Reviews received by a seller, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database read fails.
    pub async fn reviews_for_seller(
        &self,
        seller_id: i64,
        limit: u32,
        offset: u32,
    ) -> StoreResult<Vec<Review>> {
        let rows = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE seller_id = ?1
             ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3"
        ))
        .bind(seller_id)
        .bind(to_sql_count(limit))
        .bind(to_sql_count(offset))
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(row_into_review).collect())
    }

    /// Number of reviews received by a seller.
    ///
    /// # Errors
    ///
    /// Returns an error if the database read fails.
    pub async fn count_reviews_for_seller(&self, seller_id: i64) -> StoreResult<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reviews WHERE seller_id = ?1")
            .bind(seller_id)
            .fetch_one(self.pool())
            .await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// All reviews, newest first (moderation view).
    ///
    /// # Errors
    ///
    /// Returns an error if the database read fails.
    pub async fn recent_reviews(&self, limit: u32, offset: u32) -> StoreResult<Vec<Review>> {
        let rows = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews
             ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2"
        ))
        .bind(to_sql_count(limit))
        .bind(to_sql_count(offset))
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(row_into_review).collect())
    }

    /// Total number of reviews.
    ///
    /// # Errors
    ///
    /// Returns an error if the database read fails.
    pub async fn count_reviews(&self) -> StoreResult<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reviews")
            .fetch_one(self.pool())
            .await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Remove a review and refresh the seller's rating. Returns the removed review.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the review does not exist.
    pub async fn delete_review(&self, review_id: i64) -> StoreResult<Review> {
        let review = self
            .review_by_id(review_id)
            .await?
            .ok_or(StoreError::NotFound {
                entity: "review",
                id: review_id,
            })?;

        let mut tx = self.pool().begin().await?;
        sqlx::query("DELETE FROM reviews WHERE id = ?1")
            .bind(review_id)
            .execute(&mut *tx)
            .await?;
        refresh_seller_rating(&mut tx, review.seller_id).await?;
        tx.commit().await?;

        Ok(review)
    }
}
