//! Authorization gate for privileged operations.
//!
//! Three checks, in order:
//! 1. the actor is on the static allow-list loaded at startup;
//! 2. the actor has a persisted grant and it is active;
//! 3. if a permission is required, the grant contains it (exact match).
//!
//! Grants are re-read on every call. A deactivation is visible to the very
//! next `authorize`.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use crate::db::grants::AdminGrant;
use crate::db::{Store, StoreResult};

/// Why an actor may not proceed. `Display` is the notice shown to the actor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Denied {
    /// Actor is not on the configured allow-list.
    #[error("You do not have access to the admin panel.")]
    NotWhitelisted,
    /// No grant, or the grant is deactivated.
    #[error("Your admin account is not active.")]
    Inactive,
    /// Grant lacks the named permission.
    #[error("Missing permission: {0}")]
    MissingPermission(String),
}

impl Denied {
    /// Short machine-readable reason for logs.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NotWhitelisted => "not_whitelisted",
            Self::Inactive => "inactive",
            Self::MissingPermission(_) => "missing_permission",
        }
    }

    /// Notice shown to the actor.
    pub fn notice(&self) -> String {
        self.to_string()
    }
}

/// Outcome of a gate check. Denial is a value, not an error.
pub type Authorization = Result<AdminGrant, Denied>;

/// Decide from already-loaded state. No I/O.
pub fn evaluate(
    allow_list: &BTreeSet<i64>,
    actor_id: i64,
    grant: Option<AdminGrant>,
    required_permission: Option<&str>,
) -> Authorization {
    if !allow_list.contains(&actor_id) {
        return Err(Denied::NotWhitelisted);
    }
    let grant = match grant {
        Some(g) if g.active => g,
        _ => return Err(Denied::Inactive),
    };
    if let Some(permission) = required_permission {
        if !grant.has_permission(permission) {
            return Err(Denied::MissingPermission(permission.to_owned()));
        }
    }
    Ok(grant)
}

/// The gate: an immutable allow-list plus live grant lookups.
#[derive(Clone)]
pub struct Gate {
    allow_list: Arc<BTreeSet<i64>>,
    store: Store,
}

impl Gate {
    /// Build a gate over a fixed allow-list.
    pub fn new(allow_list: BTreeSet<i64>, store: Store) -> Self {
        Self {
            allow_list: Arc::new(allow_list),
            store,
        }
    }

    /// Whether the actor is on the static allow-list.
    pub fn is_whitelisted(&self, actor_id: i64) -> bool {
        self.allow_list.contains(&actor_id)
    }

    /// Allow-listed actor ids.
    pub fn allow_list(&self) -> &BTreeSet<i64> {
        &self.allow_list
    }

    /// Check whether `actor_id` may proceed, optionally needing a permission.
    ///
    /// Non-allow-listed actors are denied without touching the database.
    ///
    /// # Errors
    ///
    /// Returns an error only when the grant lookup itself fails.
    pub async fn authorize(
        &self,
        actor_id: i64,
        required_permission: Option<&str>,
    ) -> StoreResult<Authorization> {
        if !self.is_whitelisted(actor_id) {
            debug!(actor_id, "denied: not whitelisted");
            return Ok(Err(Denied::NotWhitelisted));
        }
        let grant = self.store.grant(actor_id).await?;
        let decision = evaluate(&self.allow_list, actor_id, grant, required_permission);
        if let Err(ref denied) = decision {
            debug!(
                actor_id,
                reason = denied.reason(),
                permission = required_permission.unwrap_or("-"),
                "admin action denied"
            );
        }
        Ok(decision)
    }
}
