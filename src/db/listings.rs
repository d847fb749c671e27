//! Listings, their photos, search, and admin listing views.

use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite};

use super::{now_text, to_sql_count, Store, StoreError, StoreResult};

// ---------------------------------------------------------------------------
// Domain types
// ---------------------------------------------------------------------------

/// Lifecycle state of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    /// Visible in search.
    Active,
    /// Marked sold by the seller.
    Sold,
    /// Held for a buyer.
    Reserved,
    /// Soft-deleted; kept for moderation history.
    Deleted,
}

impl ListingStatus {
    /// Returns the string representation stored in SQLite.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Sold => "sold",
            Self::Reserved => "reserved",
            Self::Deleted => "deleted",
        }
    }

    /// Parse from a SQLite text value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a recognised status.
    pub fn parse(s: &str) -> Result<Self, StoreError> {
        match s {
            "active" => Ok(Self::Active),
            "sold" => Ok(Self::Sold),
            "reserved" => Ok(Self::Reserved),
            "deleted" => Ok(Self::Deleted),
            other => Err(StoreError::InvalidEnum {
                field: "listing status",
                value: other.to_owned(),
            }),
        }
    }
}

/// Editable listing fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingField {
    /// Title text.
    Title,
    /// Description text.
    Description,
    /// Price in cents.
    Price,
    /// Category id.
    Category,
}

impl ListingField {
    /// Callback token and audit detail value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Price => "price",
            Self::Category => "category",
        }
    }

    /// Parse from a callback token.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a recognised field.
    pub fn parse(s: &str) -> Result<Self, StoreError> {
        match s {
            "title" => Ok(Self::Title),
            "description" => Ok(Self::Description),
            "price" => Ok(Self::Price),
            "category" => Ok(Self::Category),
            other => Err(StoreError::InvalidEnum {
                field: "listing field",
                value: other.to_owned(),
            }),
        }
    }

    fn column(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Price => "price_cents",
            Self::Category => "category",
        }
    }
}

/// New value for a [`ListingField`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListingEdit {
    /// Replace the title.
    Title(String),
    /// Replace or clear the description.
    Description(Option<String>),
    /// Replace the price.
    Price(i64),
    /// Move to another category.
    Category(String),
}

impl ListingEdit {
    /// Field this edit targets.
    pub fn field(&self) -> ListingField {
        match self {
            Self::Title(_) => ListingField::Title,
            Self::Description(_) => ListingField::Description,
            Self::Price(_) => ListingField::Price,
            Self::Category(_) => ListingField::Category,
        }
    }

    /// Value rendered for logs and audit details.
    pub fn display_value(&self) -> String {
        match self {
            Self::Title(v) | Self::Category(v) => v.clone(),
            Self::Description(v) => v.clone().unwrap_or_default(),
            Self::Price(cents) => cents.to_string(),
        }
    }
}

/// Admin-panel listing filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingFilter {
    /// Every listing including deleted ones.
    All,
    /// Active listings.
    Active,
    /// Flagged by a moderator.
    Flagged,
    /// Soft-deleted listings.
    Deleted,
}

impl ListingFilter {
    /// Callback token.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Flagged => "flagged",
            Self::Deleted => "deleted",
        }
    }

    /// Parse from a callback token.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a recognised filter.
    pub fn parse(s: &str) -> Result<Self, StoreError> {
        match s {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "flagged" => Ok(Self::Flagged),
            "deleted" => Ok(Self::Deleted),
            other => Err(StoreError::InvalidEnum {
                field: "listing filter",
                value: other.to_owned(),
            }),
        }
    }

    fn where_clause(&self) -> &'static str {
        match self {
            Self::All => "1 = 1",
            Self::Active => "status = 'active'",
            Self::Flagged => "flagged = 1",
            Self::Deleted => "status = 'deleted'",
        }
    }
}

/// A listing row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// Row id.
    pub id: i64,
    /// Seller (`users.id`).
    pub user_id: i64,
    /// Title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Price in cents.
    pub price_cents: i64,
    /// ISO currency code.
    pub currency: String,
    /// Category id.
    pub category: String,
    /// Optional location.
    pub location: Option<String>,
    /// Lifecycle state.
    pub status: ListingStatus,
    /// View counter.
    pub views: i64,
    /// Flagged by a moderator.
    pub flagged: bool,
    /// Why it was flagged.
    pub flag_reason: Option<String>,
    /// Creation time (RFC 3339).
    pub created_at: String,
    /// Last update time (RFC 3339).
    pub updated_at: String,
}

/// A Telegram photo reference attached to a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRef {
    /// File id usable for re-sending.
    pub file_id: String,
    /// Stable unique id.
    pub unique_id: String,
}

/// A stored listing photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    /// Row id.
    pub id: i64,
    /// Owning listing.
    pub listing_id: i64,
    /// Telegram file id.
    pub file_id: String,
    /// Telegram unique file id.
    pub file_unique_id: String,
    /// Shown first.
    pub is_primary: bool,
}

/// Validated input for creating a listing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewListing {
    /// Title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Price in cents.
    pub price_cents: i64,
    /// Category id.
    pub category: String,
    /// Optional location.
    pub location: Option<String>,
    /// Photos in upload order; the first becomes primary.
    pub photos: Vec<PhotoRef>,
}

/// Search filters. Every field is optional and combined with AND.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchCriteria {
    /// Substring matched against title or description.
    pub keywords: Option<String>,
    /// Category id.
    pub category: Option<String>,
    /// Inclusive lower price bound in cents.
    pub min_price_cents: Option<i64>,
    /// Inclusive upper price bound in cents.
    pub max_price_cents: Option<i64>,
}

impl SearchCriteria {
    fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        qb.push(" WHERE status = 'active'");
        if let Some(keywords) = self.keywords.as_deref().filter(|k| !k.is_empty()) {
            let pattern = format!("%{}%", escape_like(keywords));
            qb.push(" AND (title LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR description LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }
        if let Some(category) = &self.category {
            qb.push(" AND category = ").push_bind(category.clone());
        }
        if let Some(min) = self.min_price_cents {
            qb.push(" AND price_cents >= ").push_bind(min);
        }
        if let Some(max) = self.max_price_cents {
            qb.push(" AND price_cents <= ").push_bind(max);
        }
    }
}

/// Escape `LIKE` wildcards so user keywords match literally.
fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

type ListingRow = (
    i64,
    i64,
    String,
    Option<String>,
    i64,
    String,
    String,
    Option<String>,
    String,
    i64,
    bool,
    Option<String>,
    String,
    String,
);

const LISTING_COLUMNS: &str = "id, user_id, title, description, price_cents, currency, category, \
     location, status, views, flagged, flag_reason, created_at, updated_at";

fn row_into_listing(row: ListingRow) -> StoreResult<Listing> {
    let (
        id,
        user_id,
        title,
        description,
        price_cents,
        currency,
        category,
        location,
        status,
        views,
        flagged,
        flag_reason,
        created_at,
        updated_at,
    ) = row;
    Ok(Listing {
        id,
        user_id,
        title,
        description,
        price_cents,
        currency,
        category,
        location,
        status: ListingStatus::parse(&status)?,
        views,
        flagged,
        flag_reason,
        created_at,
        updated_at,
    })
}

fn rows_into_listings(rows: Vec<ListingRow>) -> StoreResult<Vec<Listing>> {
    rows.into_iter().map(row_into_listing).collect()
}

fn not_found(id: i64) -> StoreError {
    StoreError::NotFound {
        entity: "listing",
        id,
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

impl Store {
    /// Insert a listing and its photos atomically. Returns the new listing.
    ///
    /// # Errors
    ///
    /// Returns an error if any insert fails; nothing is written in that case.
    pub async fn create_listing(&self, user_id: i64, new: &NewListing) -> StoreResult<Listing> {
        let now = now_text();
        let mut tx = self.pool().begin().await?;

        let result = sqlx::query(
            "INSERT INTO listings (user_id, title, description, price_cents, category, location, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
        )
        .bind(user_id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.price_cents)
        .bind(&new.category)
        .bind(&new.location)
        .bind(&now)
        .execute(&mut *tx)
        .await?;
        let listing_id = result.last_insert_rowid();

        for (index, photo) in new.photos.iter().enumerate() {
            sqlx::query(
                "INSERT INTO listing_photos (listing_id, file_id, file_unique_id, is_primary)
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(listing_id)
            .bind(&photo.file_id)
            .bind(&photo.unique_id)
            .bind(index == 0)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        self.require_listing(listing_id).await
    }

    /// Look up a listing by id regardless of status.
    ///
    /// # Errors
    ///
    /// Returns an error if the database read fails.
    pub async fn listing_by_id(&self, listing_id: i64) -> StoreResult<Option<Listing>> {
        let row = sqlx::query_as::<_, ListingRow>(&format!(
            "SELECT {LISTING_COLUMNS} FROM listings WHERE id = ?1"
        ))
        .bind(listing_id)
        .fetch_optional(self.pool())
        .await?;
        row.map(row_into_listing).transpose()
    }

    /// Like [`Store::listing_by_id`] but a missing listing is an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no such listing exists.
    pub async fn require_listing(&self, listing_id: i64) -> StoreResult<Listing> {
        self.listing_by_id(listing_id)
            .await?
            .ok_or_else(|| not_found(listing_id))
    }

    /// A seller's listings, newest first, excluding deleted ones unless asked.
    ///
    /// # Errors
    ///
    /// Returns an error if the database read fails.
    pub async fn listings_by_user(
        &self,
        user_id: i64,
        status: Option<ListingStatus>,
    ) -> StoreResult<Vec<Listing>> {
        let rows = match status {
            Some(status) => {
                sqlx::query_as::<_, ListingRow>(&format!(
                    "SELECT {LISTING_COLUMNS} FROM listings
                     WHERE user_id = ?1 AND status = ?2
                     ORDER BY created_at DESC, id DESC"
                ))
                .bind(user_id)
                .bind(status.as_str())
                .fetch_all(self.pool())
                .await?
            }
            None => {
                sqlx::query_as::<_, ListingRow>(&format!(
                    "SELECT {LISTING_COLUMNS} FROM listings
                     WHERE user_id = ?1 AND status != 'deleted'
                     ORDER BY created_at DESC, id DESC"
                ))
                .bind(user_id)
                .fetch_all(self.pool())
                .await?
            }
        };
        rows_into_listings(rows)
    }

    /// Apply a single-field edit.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the listing does not exist.
    pub async fn update_listing_field(&self, listing_id: i64, edit: &ListingEdit) -> StoreResult<()> {
        // Column name comes from a closed enum, never from input.
        let sql = format!(
            "UPDATE listings SET {} = ?1, updated_at = ?2 WHERE id = ?3",
            edit.field().column()
        );
        let query = sqlx::query(&sql);
        let query = match edit {
            ListingEdit::Title(v) | ListingEdit::Category(v) => query.bind(v.clone()),
            ListingEdit::Description(v) => query.bind(v.clone()),
            ListingEdit::Price(cents) => query.bind(*cents),
        };
        let result = query
            .bind(now_text())
            .bind(listing_id)
            .execute(self.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found(listing_id));
        }
        Ok(())
    }

    /// Change a listing's status.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the listing does not exist.
    pub async fn set_listing_status(&self, listing_id: i64, status: ListingStatus) -> StoreResult<()> {
        let result = sqlx::query("UPDATE listings SET status = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(status.as_str())
            .bind(now_text())
            .bind(listing_id)
            .execute(self.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found(listing_id));
        }
        Ok(())
    }

    /// Soft-delete: the row stays, status becomes `deleted`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the listing does not exist.
    pub async fn soft_delete_listing(&self, listing_id: i64) -> StoreResult<()> {
        self.set_listing_status(listing_id, ListingStatus::Deleted)
            .await
    }

    /// Bump the view counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn increment_views(&self, listing_id: i64) -> StoreResult<()> {
        sqlx::query("UPDATE listings SET views = views + 1 WHERE id = ?1")
            .bind(listing_id)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    /// Flag (with reason) or unflag a listing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the listing does not exist.
    pub async fn set_flag(
        &self,
        listing_id: i64,
        flagged: bool,
        reason: Option<&str>,
    ) -> StoreResult<()> {
        let reason = if flagged { reason } else { None };
        let result = sqlx::query(
            "UPDATE listings SET flagged = ?1, flag_reason = ?2, updated_at = ?3 WHERE id = ?4",
        )
        .bind(flagged)
        .bind(reason)
        .bind(now_text())
        .bind(listing_id)
        .execute(self.pool())
        .await?;
        if result.rows_affected() == 0 {
            return Err(not_found(listing_id));
        }
        Ok(())
    }

    /// Photos of a listing, primary first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database read fails.
    pub async fn photos_for_listing(&self, listing_id: i64) -> StoreResult<Vec<Photo>> {
        let rows: Vec<(i64, i64, String, String, bool)> = sqlx::query_as(
            "SELECT id, listing_id, file_id, file_unique_id, is_primary
             FROM listing_photos WHERE listing_id = ?1
             ORDER BY is_primary DESC, id ASC",
        )
        .bind(listing_id)
        .fetch_all(self.pool())
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, listing_id, file_id, file_unique_id, is_primary)| Photo {
                id,
                listing_id,
                file_id,
                file_unique_id,
                is_primary,
            })
            .collect())
    }

    /// Active listings matching `criteria`, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database read fails.
    pub async fn search_listings(
        &self,
        criteria: &SearchCriteria,
        limit: u32,
        offset: u32,
    ) -> StoreResult<Vec<Listing>> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {LISTING_COLUMNS} FROM listings"));
        criteria.push_where(&mut qb);
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(to_sql_count(limit))
            .push(" OFFSET ")
            .push_bind(to_sql_count(offset));

        let rows = qb
            .build_query_as::<ListingRow>()
            .fetch_all(self.pool())
            .await?;
        rows_into_listings(rows)
    }

    /// Number of active listings matching `criteria`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database read fails.
    pub async fn count_search(&self, criteria: &SearchCriteria) -> StoreResult<u64> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM listings");
        criteria.push_where(&mut qb);
        let (count,) = qb
            .build_query_as::<(i64,)>()
            .fetch_one(self.pool())
            .await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Admin view of listings, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database read fails.
    pub async fn admin_list_listings(
        &self,
        filter: ListingFilter,
        limit: u32,
        offset: u32,
    ) -> StoreResult<Vec<Listing>> {
        let sql = format!(
            "SELECT {LISTING_COLUMNS} FROM listings WHERE {}
             ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2",
            filter.where_clause()
        );
        let rows = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(to_sql_count(limit))
            .bind(to_sql_count(offset))
            .fetch_all(self.pool())
            .await?;
        rows_into_listings(rows)
    }

    /// Count listings for an admin filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database read fails.
    pub async fn admin_count_listings(&self, filter: ListingFilter) -> StoreResult<u64> {
        let sql = format!(
            "SELECT COUNT(*) FROM listings WHERE {}",
            filter.where_clause()
        );
        let (count,): (i64,) = sqlx::query_as(&sql).fetch_one(self.pool()).await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}
