//! Privileged moderation operations.
//!
//! Every operation takes the acting admin explicitly and runs through
//! [`Moderation::privileged`]: authorize, perform, then record whatever
//! [`AuditDescriptor`] the operation returned. A denial short-circuits with
//! no side effects and no audit entry.

use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::sync::Arc;

use crate::admin::audit::{actions, AuditDescriptor, AuditGroup, AuditPage, Pagination, Recorder};
use crate::admin::gate::{Authorization, Denied, Gate};
use crate::admin::permissions;
use crate::db::grants::AdminGrant;
use crate::db::{
    DashboardStats, Listing, ListingEdit, ListingFilter, ProfileField, Review, Severity, Store,
    StoreError, StoreResult, Transaction, TransactionStatus, User, UserFilter, Warning,
};

/// Outer error is a storage fault; inner `Err` is a denial.
pub type Privileged<T> = StoreResult<Result<T, Denied>>;

/// What an operation did, plus what it wants logged.
#[derive(Debug)]
pub struct Performed<T> {
    /// Operation result.
    pub value: T,
    /// Entry to append, if the action is audit-worthy.
    pub audit: Option<AuditDescriptor>,
}

impl<T> Performed<T> {
    /// A read-only result; nothing is logged.
    pub fn quiet(value: T) -> Self {
        Self { value, audit: None }
    }

    /// A mutation that should appear in the audit log.
    pub fn audited(value: T, descriptor: AuditDescriptor) -> Self {
        Self {
            value,
            audit: Some(descriptor),
        }
    }
}

/// A page of rows for an admin list view.
#[derive(Debug, Clone, PartialEq)]
pub struct Paged<T> {
    /// Rows on this page.
    pub items: Vec<T>,
    /// Clamped paging state.
    pub pagination: Pagination,
}

/// Moderation service shared by all admin handlers.
#[derive(Clone)]
pub struct Moderation {
    store: Store,
    gate: Gate,
    recorder: Recorder,
    roles: Arc<BTreeMap<String, Vec<String>>>,
    page_size: u32,
}

impl Moderation {
    /// Build the service. `roles` maps role names to permission lists.
    pub fn new(
        store: Store,
        gate: Gate,
        recorder: Recorder,
        roles: BTreeMap<String, Vec<String>>,
        page_size: u32,
    ) -> Self {
        Self {
            store,
            gate,
            recorder,
            roles: Arc::new(roles),
            page_size: page_size.max(1),
        }
    }

    /// The gate used for every check.
    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    /// The recorder privileged operations log to.
    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    /// Authorize, run `op`, then record its descriptor best-effort.
    ///
    /// # Errors
    ///
    /// Returns an error if the grant lookup or `op` fails. Audit failures are
    /// logged and do not surface.
    pub async fn privileged<T, F, Fut>(
        &self,
        actor_id: i64,
        permission: &str,
        op: F,
    ) -> Privileged<T>
    where
        F: FnOnce(AdminGrant) -> Fut,
        Fut: Future<Output = StoreResult<Performed<T>>>,
    {
        let grant = match self.gate.authorize(actor_id, Some(permission)).await? {
            Ok(grant) => grant,
            Err(denied) => return Ok(Err(denied)),
        };
        let performed = op(grant).await?;
        if let Some(descriptor) = &performed.audit {
            self.recorder.record_or_log(actor_id, descriptor).await;
        }
        Ok(Ok(performed.value))
    }

    /// Entry check for the admin panel itself; no permission required.
    ///
    /// # Errors
    ///
    /// Returns an error if the grant lookup fails.
    pub async fn open_panel(&self, actor_id: i64) -> StoreResult<Authorization> {
        self.gate.authorize(actor_id, None).await
    }

    // -- users ---------------------------------------------------------------

    /// Block a user with a reason.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown user.
    pub async fn block_user(&self, actor_id: i64, user_id: i64, reason: &str) -> Privileged<User> {
        self.privileged(actor_id, permissions::BLOCK_USERS, |_| async move {
            self.store.set_user_active(user_id, false, Some(reason)).await?;
            let user = self.store.require_user(user_id).await?;
            let audit = AuditDescriptor::new(actions::USER_BLOCK)
                .target("user", user_id)
                .detail("reason", reason)
                .detail("telegram_id", user.telegram_id);
            Ok::<_, StoreError>(Performed::audited(user, audit))
        })
        .await
    }

    /// Lift a block.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown user.
    pub async fn unblock_user(&self, actor_id: i64, user_id: i64) -> Privileged<User> {
        self.privileged(actor_id, permissions::BLOCK_USERS, |_| async move {
            self.store.set_user_active(user_id, true, None).await?;
            let user = self.store.require_user(user_id).await?;
            let audit = AuditDescriptor::new(actions::USER_UNBLOCK)
                .target("user", user_id)
                .detail("telegram_id", user.telegram_id);
            Ok::<_, StoreError>(Performed::audited(user, audit))
        })
        .await
    }

    /// Issue a warning.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown user.
    pub async fn warn_user(
        &self,
        actor_id: i64,
        user_id: i64,
        severity: Severity,
        reason: &str,
    ) -> Privileged<Warning> {
        self.privileged(actor_id, permissions::WARN_USERS, |_| async move {
            let warning = self
                .store
                .create_warning(user_id, actor_id, severity, reason)
                .await?;
            let audit = AuditDescriptor::new(actions::USER_WARN)
                .target("user", user_id)
                .detail("severity", severity.as_str())
                .detail("reason", reason)
                .detail("warning_id", warning.id);
            Ok::<_, StoreError>(Performed::audited(warning, audit))
        })
        .await
    }

    /// Edit one profile field of any user. `None` clears it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown user.
    pub async fn edit_user_profile(
        &self,
        actor_id: i64,
        user_id: i64,
        field: ProfileField,
        value: Option<&str>,
    ) -> Privileged<User> {
        self.privileged(actor_id, permissions::MANAGE_USERS, |_| async move {
            self.store.update_profile_field(user_id, field, value).await?;
            let user = self.store.require_user(user_id).await?;
            let audit = AuditDescriptor::new(actions::PROFILE_EDIT)
                .target("user", user_id)
                .detail("field", field.as_str())
                .detail("value", value.unwrap_or_default());
            Ok::<_, StoreError>(Performed::audited(user, audit))
        })
        .await
    }

    /// A user with their warning history.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown user.
    pub async fn user_warnings(
        &self,
        actor_id: i64,
        user_id: i64,
    ) -> Privileged<(User, Vec<Warning>)> {
        self.privileged(actor_id, permissions::WARN_USERS, |_| async move {
            let user = self.store.require_user(user_id).await?;
            let warnings = self.store.warnings_for_user(user_id).await?;
            Ok::<_, StoreError>(Performed::quiet((user, warnings)))
        })
        .await
    }

    /// One user's detail card.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown user.
    pub async fn user_detail(&self, actor_id: i64, user_id: i64) -> Privileged<User> {
        self.privileged(actor_id, permissions::MANAGE_USERS, |_| async move {
            Ok::<_, StoreError>(Performed::quiet(self.store.require_user(user_id).await?))
        })
        .await
    }

    /// Page through users.
    ///
    /// # Errors
    ///
    /// Returns an error if a read fails.
    pub async fn users(&self, actor_id: i64, filter: UserFilter, page: u32) -> Privileged<Paged<User>> {
        self.privileged(actor_id, permissions::MANAGE_USERS, |_| async move {
            let total = self.store.count_users(filter).await?;
            let pagination = Pagination::new(total, page, self.page_size);
            let items = self
                .store
                .list_users(filter, pagination.page_size, pagination.offset())
                .await?;
            Ok::<_, StoreError>(Performed::quiet(Paged { items, pagination }))
        })
        .await
    }

    // -- listings ------------------------------------------------------------

    /// Flag a listing with a reason.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown listing.
    pub async fn flag_listing(
        &self,
        actor_id: i64,
        listing_id: i64,
        reason: &str,
    ) -> Privileged<Listing> {
        self.privileged(actor_id, permissions::MANAGE_LISTINGS, |_| async move {
            self.store.set_flag(listing_id, true, Some(reason)).await?;
            let listing = self.store.require_listing(listing_id).await?;
            let audit = AuditDescriptor::new(actions::LISTING_FLAG)
                .target("listing", listing_id)
                .detail("reason", reason)
                .detail("title", listing.title.clone());
            Ok::<_, StoreError>(Performed::audited(listing, audit))
        })
        .await
    }

    /// Remove a flag.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown listing.
    pub async fn unflag_listing(&self, actor_id: i64, listing_id: i64) -> Privileged<Listing> {
        self.privileged(actor_id, permissions::MANAGE_LISTINGS, |_| async move {
            self.store.set_flag(listing_id, false, None).await?;
            let listing = self.store.require_listing(listing_id).await?;
            let audit = AuditDescriptor::new(actions::LISTING_UNFLAG)
                .target("listing", listing_id)
                .detail("title", listing.title.clone());
            Ok::<_, StoreError>(Performed::audited(listing, audit))
        })
        .await
    }

    /// Soft-delete any listing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown listing.
    pub async fn delete_listing(&self, actor_id: i64, listing_id: i64) -> Privileged<Listing> {
        self.privileged(actor_id, permissions::DELETE_ANY_LISTING, |_| async move {
            self.store.soft_delete_listing(listing_id).await?;
            let listing = self.store.require_listing(listing_id).await?;
            let audit = AuditDescriptor::new(actions::LISTING_DELETE)
                .target("listing", listing_id)
                .detail("title", listing.title.clone())
                .detail("seller_id", listing.user_id);
            Ok::<_, StoreError>(Performed::audited(listing, audit))
        })
        .await
    }

    /// Edit any listing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown listing.
    pub async fn edit_listing(
        &self,
        actor_id: i64,
        listing_id: i64,
        edit: &ListingEdit,
    ) -> Privileged<Listing> {
        self.privileged(actor_id, permissions::EDIT_ANY_LISTING, |_| async move {
            self.store.update_listing_field(listing_id, edit).await?;
            let listing = self.store.require_listing(listing_id).await?;
            let audit = AuditDescriptor::new(actions::LISTING_EDIT)
                .target("listing", listing_id)
                .detail("field", edit.field().as_str())
                .detail("value", edit.display_value());
            Ok::<_, StoreError>(Performed::audited(listing, audit))
        })
        .await
    }

    /// A listing with its seller.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown listing.
    pub async fn listing_detail(
        &self,
        actor_id: i64,
        listing_id: i64,
    ) -> Privileged<(Listing, Option<User>)> {
        self.privileged(actor_id, permissions::MANAGE_LISTINGS, |_| async move {
            let listing = self.store.require_listing(listing_id).await?;
            let seller = self.store.user_by_id(listing.user_id).await?;
            Ok::<_, StoreError>(Performed::quiet((listing, seller)))
        })
        .await
    }

    /// Page through listings.
    ///
    /// # Errors
    ///
    /// Returns an error if a read fails.
    pub async fn listings(
        &self,
        actor_id: i64,
        filter: ListingFilter,
        page: u32,
    ) -> Privileged<Paged<Listing>> {
        self.privileged(actor_id, permissions::MANAGE_LISTINGS, |_| async move {
            let total = self.store.admin_count_listings(filter).await?;
            let pagination = Pagination::new(total, page, self.page_size);
            let items = self
                .store
                .admin_list_listings(filter, pagination.page_size, pagination.offset())
                .await?;
            Ok::<_, StoreError>(Performed::quiet(Paged { items, pagination }))
        })
        .await
    }

    /// A user with every listing they have not deleted.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown user.
    pub async fn user_listings(
        &self,
        actor_id: i64,
        user_id: i64,
    ) -> Privileged<(User, Vec<Listing>)> {
        self.privileged(actor_id, permissions::MANAGE_LISTINGS, |_| async move {
            let user = self.store.require_user(user_id).await?;
            let listings = self.store.listings_by_user(user_id, None).await?;
            Ok::<_, StoreError>(Performed::quiet((user, listings)))
        })
        .await
    }

    // -- reviews -------------------------------------------------------------

    /// Remove a review and refresh the seller's rating.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown review.
    pub async fn delete_review(&self, actor_id: i64, review_id: i64) -> Privileged<Review> {
        self.privileged(actor_id, permissions::MANAGE_LISTINGS, |_| async move {
            let review = self.store.delete_review(review_id).await?;
            let audit = AuditDescriptor::new(actions::REVIEW_DELETE)
                .target("review", review_id)
                .detail("seller_id", review.seller_id)
                .detail("listing_id", review.listing_id)
                .detail("rating", review.rating);
            Ok::<_, StoreError>(Performed::audited(review, audit))
        })
        .await
    }

    /// Page through reviews.
    ///
    /// # Errors
    ///
    /// Returns an error if a read fails.
    pub async fn reviews(&self, actor_id: i64, page: u32) -> Privileged<Paged<Review>> {
        self.privileged(actor_id, permissions::MANAGE_LISTINGS, |_| async move {
            let total = self.store.count_reviews().await?;
            let pagination = Pagination::new(total, page, self.page_size);
            let items = self
                .store
                .recent_reviews(pagination.page_size, pagination.offset())
                .await?;
            Ok::<_, StoreError>(Performed::quiet(Paged { items, pagination }))
        })
        .await
    }

    // -- transactions, analytics, audit --------------------------------------

    /// Page through transactions.
    ///
    /// # Errors
    ///
    /// Returns an error if a read fails.
    pub async fn transactions(
        &self,
        actor_id: i64,
        status: Option<TransactionStatus>,
        page: u32,
    ) -> Privileged<Paged<Transaction>> {
        self.privileged(actor_id, permissions::MANAGE_TRANSACTIONS, |_| async move {
            let total = self.store.count_transactions(status).await?;
            let pagination = Pagination::new(total, page, self.page_size);
            let items = self
                .store
                .list_transactions(status, pagination.page_size, pagination.offset())
                .await?;
            Ok::<_, StoreError>(Performed::quiet(Paged { items, pagination }))
        })
        .await
    }

    /// Dashboard counters.
    ///
    /// # Errors
    ///
    /// Returns an error if a read fails.
    pub async fn dashboard(&self, actor_id: i64) -> Privileged<DashboardStats> {
        self.privileged(actor_id, permissions::VIEW_ANALYTICS, |_| async move {
            Ok::<_, StoreError>(Performed::quiet(self.store.dashboard_stats().await?))
        })
        .await
    }

    /// One page of the audit log for a filter group.
    ///
    /// # Errors
    ///
    /// Returns an error if a read fails.
    pub async fn audit_log(
        &self,
        actor_id: i64,
        group: AuditGroup,
        page: u32,
    ) -> Privileged<AuditPage> {
        self.privileged(actor_id, permissions::VIEW_AUDIT_LOG, |_| async move {
            let page = self
                .recorder
                .list(&group.filter(), page, self.page_size)
                .await?;
            Ok::<_, StoreError>(Performed::quiet(page))
        })
        .await
    }

    // -- admins --------------------------------------------------------------

    /// Give `target_actor` the permissions of `role`, creating or replacing the grant.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] for an unknown role.
    pub async fn grant_admin(
        &self,
        actor_id: i64,
        target_actor: i64,
        role: &str,
    ) -> Privileged<AdminGrant> {
        self.privileged(actor_id, permissions::MANAGE_ADMINS, |_| async move {
            let role_permissions = self
                .roles
                .get(role)
                .ok_or_else(|| StoreError::Conflict(format!("unknown role {role:?}")))?;
            let grant = self
                .store
                .upsert_grant(target_actor, role, role_permissions.iter().cloned())
                .await?;
            let audit = AuditDescriptor::new(actions::ADMIN_GRANT)
                .target("admin", target_actor)
                .detail("role", role);
            Ok::<_, StoreError>(Performed::audited(grant, audit))
        })
        .await
    }

    /// Every admin grant, active first.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    pub async fn admins(&self, actor_id: i64) -> Privileged<Vec<AdminGrant>> {
        self.privileged(actor_id, permissions::MANAGE_ADMINS, |_| async move {
            Ok::<_, StoreError>(Performed::quiet(self.store.list_grants().await?))
        })
        .await
    }

    /// Replace another admin's permission set, keeping their role and active flag.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] on a self-edit or an unknown
    /// permission, and [`StoreError::NotFound`] if the target has no grant.
    pub async fn set_admin_permissions(
        &self,
        actor_id: i64,
        target_actor: i64,
        requested: &[String],
    ) -> Privileged<AdminGrant> {
        self.privileged(actor_id, permissions::MANAGE_ADMINS, |_| async move {
            if target_actor == actor_id {
                return Err(StoreError::Conflict(
                    "admins cannot change their own permissions".to_owned(),
                ));
            }
            if let Some(unknown) = requested
                .iter()
                .find(|p| !permissions::ALL.contains(&p.as_str()))
            {
                return Err(StoreError::Conflict(format!("unknown permission {unknown:?}")));
            }
            let set: BTreeSet<String> = requested.iter().cloned().collect();
            self.store.set_grant_permissions(target_actor, &set).await?;
            let grant = self.store.grant(target_actor).await?.ok_or(StoreError::NotFound {
                entity: "admin grant",
                id: target_actor,
            })?;
            let audit = AuditDescriptor::new(actions::ADMIN_GRANT)
                .target("admin", target_actor)
                .detail("role", grant.role.clone())
                .detail("permissions", set.into_iter().collect::<Vec<_>>());
            Ok::<_, StoreError>(Performed::audited(grant, audit))
        })
        .await
    }

    /// Activate or deactivate another admin. Admins cannot toggle themselves.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] on a self-toggle and
    /// [`StoreError::NotFound`] if the target has no grant.
    pub async fn set_admin_active(
        &self,
        actor_id: i64,
        target_actor: i64,
        active: bool,
    ) -> Privileged<AdminGrant> {
        self.privileged(actor_id, permissions::MANAGE_ADMINS, |_| async move {
            if target_actor == actor_id {
                return Err(StoreError::Conflict(
                    "admins cannot change their own active flag".to_owned(),
                ));
            }
            self.store.set_grant_active(target_actor, active).await?;
            let grant = self.store.grant(target_actor).await?.ok_or(StoreError::NotFound {
                entity: "admin grant",
                id: target_actor,
            })?;
            let action = if active {
                actions::ADMIN_ACTIVATE
            } else {
                actions::ADMIN_DEACTIVATE
            };
            let audit = AuditDescriptor::new(action)
                .target("admin", target_actor)
                .detail("role", grant.role.clone());
            Ok::<_, StoreError>(Performed::audited(grant, audit))
        })
        .await
    }
}
