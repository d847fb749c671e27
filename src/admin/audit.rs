//! Append-only audit trail of privileged actions.
//!
//! [`Recorder::record`] writes synchronously and returns only after the row
//! is committed. Entries are never updated or deleted; recording the same
//! action twice yields two entries. Reads go through [`Recorder::list`] and
//! [`Recorder::count`], which share one filter so their page math agrees.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite};
use tracing::{error, info};

use crate::db::{now_text, Store, StoreError, StoreResult};

// ---------------------------------------------------------------------------
// Action kinds
// ---------------------------------------------------------------------------

/// Action kinds emitted by the moderation panel. The recorder accepts any string.
pub mod actions {
    /// A user was blocked.
    pub const USER_BLOCK: &str = "user_block";
    /// A user was unblocked.
    pub const USER_UNBLOCK: &str = "user_unblock";
    /// A user was warned.
    pub const USER_WARN: &str = "user_warn";
    /// A listing was flagged.
    pub const LISTING_FLAG: &str = "listing_flag";
    /// A flag was removed.
    pub const LISTING_UNFLAG: &str = "listing_unflag";
    /// A listing was edited by a moderator.
    pub const LISTING_EDIT: &str = "listing_edit";
    /// A listing was soft-deleted by a moderator.
    pub const LISTING_DELETE: &str = "listing_delete";
    /// A user profile was edited by a moderator.
    pub const PROFILE_EDIT: &str = "profile_edit";
    /// A review was removed.
    pub const REVIEW_DELETE: &str = "review_delete";
    /// An admin grant was created or replaced.
    pub const ADMIN_GRANT: &str = "admin_grant";
    /// An admin grant was reactivated.
    pub const ADMIN_ACTIVATE: &str = "admin_activate";
    /// An admin grant was deactivated.
    pub const ADMIN_DEACTIVATE: &str = "admin_deactivate";
}

/// Named filter presets offered in the admin panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditGroup {
    /// Everything.
    All,
    /// Blocks and unblocks.
    Block,
    /// Warnings.
    Warn,
    /// Listing and review removals.
    Delete,
    /// Listing and profile edits.
    Edit,
    /// Flags and unflags.
    Flag,
    /// Admin grant changes.
    Admins,
}

impl AuditGroup {
    /// Every group in menu order.
    pub const ALL: [AuditGroup; 7] = [
        Self::All,
        Self::Block,
        Self::Warn,
        Self::Delete,
        Self::Edit,
        Self::Flag,
        Self::Admins,
    ];

    /// Callback token.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Block => "block",
            Self::Warn => "warn",
            Self::Delete => "delete",
            Self::Edit => "edit",
            Self::Flag => "flag",
            Self::Admins => "admins",
        }
    }

    /// Parse from a callback token.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a recognised group.
    pub fn parse(s: &str) -> Result<Self, StoreError> {
        Self::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| StoreError::InvalidEnum {
                field: "audit group",
                value: s.to_owned(),
            })
    }

    /// Action kinds in this group; `None` means no restriction.
    pub fn kinds(&self) -> Option<BTreeSet<String>> {
        let kinds: &[&str] = match self {
            Self::All => return None,
            Self::Block => &[actions::USER_BLOCK, actions::USER_UNBLOCK],
            Self::Warn => &[actions::USER_WARN],
            Self::Delete => &[actions::LISTING_DELETE, actions::REVIEW_DELETE],
            Self::Edit => &[actions::LISTING_EDIT, actions::PROFILE_EDIT],
            Self::Flag => &[actions::LISTING_FLAG, actions::LISTING_UNFLAG],
            Self::Admins => &[
                actions::ADMIN_GRANT,
                actions::ADMIN_ACTIVATE,
                actions::ADMIN_DEACTIVATE,
            ],
        };
        Some(kinds.iter().map(|k| (*k).to_owned()).collect())
    }

    /// Filter selecting this group.
    pub fn filter(&self) -> AuditFilter {
        AuditFilter {
            action_kinds: self.kinds(),
            ..AuditFilter::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Free-form structured details attached to an entry.
pub type Details = BTreeMap<String, serde_json::Value>;

/// An immutable audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Row id; strictly increasing in insertion order.
    pub id: i64,
    /// Who acted.
    pub actor_id: i64,
    /// Free-form action kind.
    pub action: String,
    /// Kind of object acted on.
    pub target_type: Option<String>,
    /// Id of the object acted on.
    pub target_id: Option<i64>,
    /// Structured details.
    pub details: Details,
    /// Creation time (RFC 3339, milliseconds).
    pub created_at: String,
}

/// What a privileged operation asks to be logged.
///
/// Operations return this instead of writing to shared state, so the
/// caller decides when the entry is written.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AuditDescriptor {
    /// Action kind.
    pub action: String,
    /// Kind of object acted on.
    pub target_type: Option<String>,
    /// Id of the object acted on.
    pub target_id: Option<i64>,
    /// Structured details.
    pub details: Details,
}

impl AuditDescriptor {
    /// Start a descriptor for `action`.
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ..Self::default()
        }
    }

    /// Set the target.
    #[must_use]
    pub fn target(mut self, target_type: impl Into<String>, target_id: i64) -> Self {
        self.target_type = Some(target_type.into());
        self.target_id = Some(target_id);
        self
    }

    /// Add one detail.
    #[must_use]
    pub fn detail(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Filtering and pagination
// ---------------------------------------------------------------------------

/// Conjunctive filter over entries. Empty fields do not restrict.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuditFilter {
    /// Only this actor.
    pub actor_id: Option<i64>,
    /// Only these action kinds. An empty set matches nothing.
    pub action_kinds: Option<BTreeSet<String>>,
    /// Only this target type.
    pub target_type: Option<String>,
    /// Only this target id.
    pub target_id: Option<i64>,
}

impl AuditFilter {
    /// Entries about one target.
    pub fn for_target(target_type: impl Into<String>, target_id: i64) -> Self {
        Self {
            target_type: Some(target_type.into()),
            target_id: Some(target_id),
            ..Self::default()
        }
    }

    /// Entries by one actor.
    pub fn for_actor(actor_id: i64) -> Self {
        Self {
            actor_id: Some(actor_id),
            ..Self::default()
        }
    }

    fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        qb.push(" WHERE 1 = 1");
        if let Some(actor_id) = self.actor_id {
            qb.push(" AND actor_id = ").push_bind(actor_id);
        }
        if let Some(kinds) = &self.action_kinds {
            if kinds.is_empty() {
                qb.push(" AND 0 = 1");
            } else {
                qb.push(" AND action IN (");
                let mut separated = qb.separated(", ");
                for kind in kinds {
                    separated.push_bind(kind.clone());
                }
                separated.push_unseparated(")");
            }
        }
        if let Some(target_type) = &self.target_type {
            qb.push(" AND target_type = ").push_bind(target_type.clone());
        }
        if let Some(target_id) = self.target_id {
            qb.push(" AND target_id = ").push_bind(target_id);
        }
    }
}

/// Page arithmetic shared by every paginated view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Matching rows.
    pub total: u64,
    /// Current page, 1-based, always within `1..=total_pages`.
    pub page: u32,
    /// Rows per page, at least 1.
    pub page_size: u32,
    /// `ceil(total / page_size)`, at least 1.
    pub total_pages: u32,
}

impl Pagination {
    /// Clamp `requested_page` into range for `total` rows.
    pub fn new(total: u64, requested_page: u32, page_size: u32) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total.div_ceil(u64::from(page_size)).max(1);
        let total_pages = u32::try_from(total_pages).unwrap_or(u32::MAX);
        Self {
            total,
            page: requested_page.clamp(1, total_pages),
            page_size,
            total_pages,
        }
    }

    /// Rows to skip.
    pub fn offset(&self) -> u32 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// A previous page exists.
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// A next page exists.
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// One page of entries plus the math that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditPage {
    /// Entries, newest first.
    pub entries: Vec<AuditEntry>,
    /// Clamped paging state.
    pub pagination: Pagination,
}

// ---------------------------------------------------------------------------
// Recorder
// ---------------------------------------------------------------------------

type EntryRow = (i64, i64, String, Option<String>, Option<i64>, String, String);

const ENTRY_COLUMNS: &str = "id, actor_id, action, target_type, target_id, details, created_at";

fn row_into_entry(row: EntryRow) -> StoreResult<AuditEntry> {
    let (id, actor_id, action, target_type, target_id, details, created_at) = row;
    Ok(AuditEntry {
        id,
        actor_id,
        action,
        target_type,
        target_id,
        details: serde_json::from_str(&details)?,
        created_at,
    })
}

/// Writes and queries the audit log.
#[derive(Clone)]
pub struct Recorder {
    store: Store,
}

impl Recorder {
    /// Recorder over the shared store.
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Append an entry. Durable when this returns.
    ///
    /// Content is not validated; target references are the caller's concern.
    ///
    /// # Errors
    ///
    /// Returns an error if the details cannot be encoded or the insert fails.
    pub async fn record(
        &self,
        actor_id: i64,
        action: &str,
        target_type: Option<&str>,
        target_id: Option<i64>,
        details: &Details,
    ) -> StoreResult<AuditEntry> {
        let encoded = serde_json::to_string(details)?;
        let now = now_text();
        let result = sqlx::query(
            "INSERT INTO admin_audit_log (actor_id, action, target_type, target_id, details, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(actor_id)
        .bind(action)
        .bind(target_type)
        .bind(target_id)
        .bind(&encoded)
        .bind(&now)
        .execute(self.store.pool())
        .await?;

        Ok(AuditEntry {
            id: result.last_insert_rowid(),
            actor_id,
            action: action.to_owned(),
            target_type: target_type.map(str::to_owned),
            target_id,
            details: details.clone(),
            created_at: now,
        })
    }

    /// Append the entry a descriptor describes.
    ///
    /// # Errors
    ///
    /// Same as [`Recorder::record`].
    pub async fn record_descriptor(
        &self,
        actor_id: i64,
        descriptor: &AuditDescriptor,
    ) -> StoreResult<AuditEntry> {
        self.record(
            actor_id,
            &descriptor.action,
            descriptor.target_type.as_deref(),
            descriptor.target_id,
            &descriptor.details,
        )
        .await
    }

    /// Best-effort append: failures are logged, never returned or retried.
    ///
    /// The action that produced the descriptor has already happened and is
    /// not rolled back.
    pub async fn record_or_log(
        &self,
        actor_id: i64,
        descriptor: &AuditDescriptor,
    ) -> Option<AuditEntry> {
        match self.record_descriptor(actor_id, descriptor).await {
            Ok(entry) => {
                info!(
                    actor_id,
                    action = %entry.action,
                    target_type = entry.target_type.as_deref().unwrap_or("-"),
                    target_id = entry.target_id.unwrap_or_default(),
                    "audit entry recorded"
                );
                Some(entry)
            }
            Err(e) => {
                error!(
                    actor_id,
                    action = %descriptor.action,
                    error = %e,
                    "failed to record audit entry"
                );
                None
            }
        }
    }

    /// Number of entries matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    pub async fn count(&self, filter: &AuditFilter) -> StoreResult<u64> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM admin_audit_log");
        filter.push_where(&mut qb);
        let (count,) = qb
            .build_query_as::<(i64,)>()
            .fetch_one(self.store.pool())
            .await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// One page of matching entries, newest first. `page` is clamped.
    ///
    /// # Errors
    ///
    /// Returns an error if a read fails or stored details are not valid JSON.
    pub async fn list(
        &self,
        filter: &AuditFilter,
        page: u32,
        page_size: u32,
    ) -> StoreResult<AuditPage> {
        let total = self.count(filter).await?;
        let pagination = Pagination::new(total, page, page_size);

        let mut qb =
            QueryBuilder::<Sqlite>::new(format!("SELECT {ENTRY_COLUMNS} FROM admin_audit_log"));
        filter.push_where(&mut qb);
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(i64::from(pagination.page_size))
            .push(" OFFSET ")
            .push_bind(i64::from(pagination.offset()));

        let rows = qb
            .build_query_as::<EntryRow>()
            .fetch_all(self.store.pool())
            .await?;
        let entries = rows
            .into_iter()
            .map(row_into_entry)
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(AuditPage {
            entries,
            pagination,
        })
    }
}
