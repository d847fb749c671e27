//! Marketplace users keyed by Telegram id.

use serde::{Deserialize, Serialize};

use super::{now_text, to_sql_count, Store, StoreError, StoreResult};

/// A registered marketplace user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Internal row id.
    pub id: i64,
    /// Telegram user id.
    pub telegram_id: i64,
    /// Telegram @username without the `@`.
    pub username: Option<String>,
    /// Telegram first name.
    pub first_name: Option<String>,
    /// Telegram last name.
    pub last_name: Option<String>,
    /// Contact phone set via profile editing.
    pub phone: Option<String>,
    /// Free-form location.
    pub location: Option<String>,
    /// Short biography.
    pub bio: Option<String>,
    /// False once blocked by a moderator.
    pub is_active: bool,
    /// Verified seller badge.
    pub is_verified: bool,
    /// Average review rating (0 when unrated).
    pub rating: f64,
    /// Number of reviews contributing to `rating`.
    pub rating_count: i64,
    /// Why the user was blocked, if they are.
    pub suspension_reason: Option<String>,
    /// Warnings issued so far.
    pub warning_count: i64,
    /// Registration time (RFC 3339).
    pub created_at: String,
}

impl User {
    /// Human-friendly name: full name, then @username, then the numeric id.
    pub fn display_name(&self) -> String {
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !full.is_empty() {
            return full;
        }
        match self.username.as_deref() {
            Some(u) if !u.is_empty() => format!("@{u}"),
            _ => format!("User {}", self.telegram_id),
        }
    }
}

/// Identity fields Telegram supplies with every update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TelegramProfile {
    /// Telegram user id.
    pub telegram_id: i64,
    /// @username without the `@`.
    pub username: Option<String>,
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
}

/// Profile fields a user (or a moderator) may edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileField {
    /// Contact phone.
    Phone,
    /// Location.
    Location,
    /// Biography.
    Bio,
}

impl ProfileField {
    /// Column name and callback token.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Phone => "phone",
            Self::Location => "location",
            Self::Bio => "bio",
        }
    }

    /// Parse from a callback token.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a recognised field.
    pub fn parse(s: &str) -> Result<Self, StoreError> {
        match s {
            "phone" => Ok(Self::Phone),
            "location" => Ok(Self::Location),
            "bio" => Ok(Self::Bio),
            other => Err(StoreError::InvalidEnum {
                field: "profile field",
                value: other.to_owned(),
            }),
        }
    }
}

/// Admin-panel user listing filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserFilter {
    /// Everyone.
    All,
    /// Not blocked.
    Active,
    /// Blocked.
    Blocked,
    /// Verified sellers.
    Verified,
}

impl UserFilter {
    /// Callback token.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Blocked => "blocked",
            Self::Verified => "verified",
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
            "blocked" => Ok(Self::Blocked),
            "verified" => Ok(Self::Verified),
            other => Err(StoreError::InvalidEnum {
                field: "user filter",
                value: other.to_owned(),
            }),
        }
    }

    fn where_clause(&self) -> &'static str {
        match self {
            Self::All => "1 = 1",
            Self::Active => "is_active = 1",
            Self::Blocked => "is_active = 0",
            Self::Verified => "is_verified = 1",
        }
    }
}

type UserRow = (
    i64,
    i64,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    bool,
    bool,
    f64,
    i64,
    Option<String>,
    i64,
    String,
);

const USER_COLUMNS: &str = "id, telegram_id, username, first_name, last_name, phone, location, bio, \
     is_active, is_verified, rating, rating_count, suspension_reason, warning_count, created_at";

fn row_into_user(row: UserRow) -> User {
    let (
        id,
        telegram_id,
        username,
        first_name,
        last_name,
        phone,
        location,
        bio,
        is_active,
        is_verified,
        rating,
        rating_count,
        suspension_reason,
        warning_count,
        created_at,
    ) = row;
    User {
        id,
        telegram_id,
        username,
        first_name,
        last_name,
        phone,
        location,
        bio,
        is_active,
        is_verified,
        rating,
        rating_count,
        suspension_reason,
        warning_count,
        created_at,
    }
}

impl Store {
    /// Insert a user on first contact, or refresh their Telegram names.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn upsert_user(&self, profile: &TelegramProfile) -> StoreResult<User> {
        let now = now_text();
        sqlx::query(
            "INSERT INTO users (telegram_id, username, first_name, last_name, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             ON CONFLICT(telegram_id) DO UPDATE SET
                username = excluded.username,
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                updated_at = excluded.updated_at",
        )
        .bind(profile.telegram_id)
        .bind(&profile.username)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&now)
        .execute(self.pool())
        .await?;

        self.user_by_telegram_id(profile.telegram_id)
            .await?
            .ok_or(StoreError::NotFound {
                entity: "user",
                id: profile.telegram_id,
            })
    }

    /// Look up a user by Telegram id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database read fails.
    pub async fn user_by_telegram_id(&self, telegram_id: i64) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE telegram_id = ?1"
        ))
        .bind(telegram_id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(row_into_user))
    }

    /// Look up a user by internal id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database read fails.
    pub async fn user_by_id(&self, user_id: i64) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?1"
        ))
        .bind(user_id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(row_into_user))
    }

    /// Like [`Store::user_by_id`] but a missing user is an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no such user exists.
    pub async fn require_user(&self, user_id: i64) -> StoreResult<User> {
        self.user_by_id(user_id).await?.ok_or(StoreError::NotFound {
            entity: "user",
            id: user_id,
        })
    }

    /// Set one profile field. `None` clears it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the user does not exist.
    pub async fn update_profile_field(
        &self,
        user_id: i64,
        field: ProfileField,
        value: Option<&str>,
    ) -> StoreResult<()> {
        // Column name comes from a closed enum, never from input.
        let sql = format!(
            "UPDATE users SET {} = ?1, updated_at = ?2 WHERE id = ?3",
            field.as_str()
        );
        let result = sqlx::query(&sql)
            .bind(value)
            .bind(now_text())
            .bind(user_id)
            .execute(self.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "user",
                id: user_id,
            });
        }
        Ok(())
    }

    /// Block (`active = false`, with reason) or unblock a user.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the user does not exist.
    pub async fn set_user_active(
        &self,
        user_id: i64,
        active: bool,
        reason: Option<&str>,
    ) -> StoreResult<()> {
        let reason = if active { None } else { reason };
        let result = sqlx::query(
            "UPDATE users SET is_active = ?1, suspension_reason = ?2, updated_at = ?3 WHERE id = ?4",
        )
        .bind(active)
        .bind(reason)
        .bind(now_text())
        .bind(user_id)
        .execute(self.pool())
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "user",
                id: user_id,
            });
        }
        Ok(())
    }

    /// Page through users matching a filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database read fails.
    pub async fn list_users(
        &self,
        filter: UserFilter,
        limit: u32,
        offset: u32,
    ) -> StoreResult<Vec<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE {} ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2",
            filter.where_clause()
        );
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(to_sql_count(limit))
            .bind(to_sql_count(offset))
            .fetch_all(self.pool())
            .await?;
        Ok(rows.into_iter().map(row_into_user).collect())
    }

    /// Count users matching a filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database read fails.
    pub async fn count_users(&self, filter: UserFilter) -> StoreResult<u64> {
        let sql = format!("SELECT COUNT(*) FROM users WHERE {}", filter.where_clause());
        let (count,): (i64,) = sqlx::query_as(&sql).fetch_one(self.pool()).await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}
