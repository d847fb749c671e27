//! Persisted admin grants. Grants are deactivated, never deleted.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{now_text, Store, StoreError, StoreResult};

/// An actor's admin role and explicit permission set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminGrant {
    /// External actor id (Telegram user id).
    pub actor_id: i64,
    /// Role name, e.g. `moderator`.
    pub role: String,
    /// Permission tokens, matched case-sensitively.
    pub permissions: BTreeSet<String>,
    /// Inactive grants confer nothing.
    pub active: bool,
    /// Creation time (RFC 3339).
    pub created_at: String,
    /// Last change (RFC 3339).
    pub updated_at: String,
}

impl AdminGrant {
    /// Whether this grant currently confers `permission`.
    ///
    /// Always false for an inactive grant, whatever is stored.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.active && self.permissions.contains(permission)
    }
}

type GrantRow = (i64, String, String, bool, String, String);

const GRANT_COLUMNS: &str = "actor_id, role, permissions, is_active, created_at, updated_at";

fn row_into_grant(row: GrantRow) -> StoreResult<AdminGrant> {
    let (actor_id, role, permissions, active, created_at, updated_at) = row;
    let permissions: BTreeSet<String> = serde_json::from_str(&permissions)?;
    Ok(AdminGrant {
        actor_id,
        role,
        permissions,
        active,
        created_at,
        updated_at,
    })
}

fn not_found(actor_id: i64) -> StoreError {
    StoreError::NotFound {
        entity: "admin grant",
        id: actor_id,
    }
}

impl Store {
    /// Create or replace an actor's role and permissions, reactivating it.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn upsert_grant<I, S>(
        &self,
        actor_id: i64,
        role: &str,
        permissions: I,
    ) -> StoreResult<AdminGrant>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let permissions: BTreeSet<String> = permissions.into_iter().map(Into::into).collect();
        let encoded = serde_json::to_string(&permissions)?;
        let now = now_text();

        sqlx::query(
            "INSERT INTO admin_grants (actor_id, role, permissions, is_active, created_at, updated_at)
             VALUES (?1, ?2, ?3, 1, ?4, ?4)
             ON CONFLICT(actor_id) DO UPDATE SET
                role = excluded.role,
                permissions = excluded.permissions,
                is_active = 1,
                updated_at = excluded.updated_at",
        )
        .bind(actor_id)
        .bind(role)
        .bind(&encoded)
        .bind(&now)
        .execute(self.pool())
        .await?;

        self.grant(actor_id).await?.ok_or_else(|| not_found(actor_id))
    }

    /// Current grant for an actor. Always reads the table; nothing is cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails or the stored permissions are not valid JSON.
    pub async fn grant(&self, actor_id: i64) -> StoreResult<Option<AdminGrant>> {
        let row = sqlx::query_as::<_, GrantRow>(&format!(
            "SELECT {GRANT_COLUMNS} FROM admin_grants WHERE actor_id = ?1"
        ))
        .bind(actor_id)
        .fetch_optional(self.pool())
        .await?;
        row.map(row_into_grant).transpose()
    }

    /// Toggle the active flag.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the actor has no grant.
    pub async fn set_grant_active(&self, actor_id: i64, active: bool) -> StoreResult<()> {
        let result =
            sqlx::query("UPDATE admin_grants SET is_active = ?1, updated_at = ?2 WHERE actor_id = ?3")
                .bind(active)
                .bind(now_text())
                .bind(actor_id)
                .execute(self.pool())
                .await?;
        if result.rows_affected() == 0 {
            return Err(not_found(actor_id));
        }
        Ok(())
    }

    /// Replace the permission set without touching role or active flag.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the actor has no grant.
    pub async fn set_grant_permissions(
        &self,
        actor_id: i64,
        permissions: &BTreeSet<String>,
    ) -> StoreResult<()> {
        let encoded = serde_json::to_string(permissions)?;
        let result = sqlx::query(
            "UPDATE admin_grants SET permissions = ?1, updated_at = ?2 WHERE actor_id = ?3",
        )
        .bind(&encoded)
        .bind(now_text())
        .bind(actor_id)
        .execute(self.pool())
        .await?;
        if result.rows_affected() == 0 {
            return Err(not_found(actor_id));
        }
        Ok(())
    }

    /// Every grant, active first.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    pub async fn list_grants(&self) -> StoreResult<Vec<AdminGrant>> {
        let rows = sqlx::query_as::<_, GrantRow>(&format!(
            "SELECT {GRANT_COLUMNS} FROM admin_grants ORDER BY is_active DESC, actor_id ASC"
        ))
        .fetch_all(self.pool())
        .await?;
        rows.into_iter().map(row_into_grant).collect()
    }

    /// Number of active grants.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    pub async fn count_active_grants(&self) -> StoreResult<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM admin_grants WHERE is_active = 1")
            .fetch_one(self.pool())
            .await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}
