//! Moderator-issued user warnings.

use serde::{Deserialize, Serialize};

use super::{now_text, Store, StoreError, StoreResult};

/// How serious a warning is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Minor.
    Low,
    /// Repeated or moderate.
    Medium,
    /// Last warning before a block.
    High,
}

impl Severity {
    /// Every level, mildest first.
    pub const ALL: [Severity; 3] = [Self::Low, Self::Medium, Self::High];

    /// Returns the string representation stored in SQLite.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Parse from a SQLite text value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a recognised severity.
    pub fn parse(s: &str) -> Result<Self, StoreError> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(StoreError::InvalidEnum {
                field: "severity",
                value: other.to_owned(),
            }),
        }
    }
}

/// A warning row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    /// Row id.
    pub id: i64,
    /// Warned user (`users.id`).
    pub user_id: i64,
    /// Moderator's actor id.
    pub actor_id: i64,
    /// Stated reason.
    pub reason: String,
    /// Severity level.
    pub severity: Severity,
    /// Still in effect.
    pub is_active: bool,
    /// Issue time (RFC 3339).
    pub created_at: String,
    /// Optional expiry (RFC 3339).
    pub expires_at: Option<String>,
}

type WarningRow = (i64, i64, i64, String, String, bool, String, Option<String>);

impl Store {
    /// Issue a warning and bump the user's `warning_count` atomically.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the user does not exist.
    pub async fn create_warning(
        &self,
        user_id: i64,
        actor_id: i64,
        severity: Severity,
        reason: &str,
    ) -> StoreResult<Warning> {
        let now = now_text();
        let mut tx = self.pool().begin().await?;

        let bumped = sqlx::query(
            "UPDATE users SET warning_count = warning_count + 1, updated_at = ?1 WHERE id = ?2",
        )
        .bind(&now)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
        if bumped.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "user",
                id: user_id,
            });
        }

        let result = sqlx::query(
            "INSERT INTO user_warnings (user_id, actor_id, reason, severity, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(user_id)
        .bind(actor_id)
        .bind(reason)
        .bind(severity.as_str())
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Warning {
            id: result.last_insert_rowid(),
            user_id,
            actor_id,
            reason: reason.to_owned(),
            severity,
            is_active: true,
            created_at: now,
            expires_at: None,
        })
    }

    /// A user's warnings, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database read fails.
    pub async fn warnings_for_user(&self, user_id: i64) -> StoreResult<Vec<Warning>> {
        let rows: Vec<WarningRow> = sqlx::query_as(
            "SELECT id, user_id, actor_id, reason, severity, is_active, created_at, expires_at
             FROM user_warnings WHERE user_id = ?1
             ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;

        rows.into_iter()
            .map(
                |(id, user_id, actor_id, reason, severity, is_active, created_at, expires_at)| {
                    Ok(Warning {
                        id,
                        user_id,
                        actor_id,
                        reason,
                        severity: Severity::parse(&severity)?,
                        is_active,
                        created_at,
                        expires_at,
                    })
                },
            )
            .collect()
    }
}
