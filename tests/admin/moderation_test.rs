//! Tests for `src/admin/moderation.rs`.

use bazaar::admin::audit::actions;
use bazaar::admin::{AuditFilter, AuditGroup, Denied, Gate, Moderation, Recorder};
use bazaar::config::AdminConfig;
use bazaar::db::{
    Listing, ListingEdit, ListingFilter, ListingStatus, NewListing, NewReview, ProfileField,
    Severity, Store, StoreError, TelegramProfile, User, UserFilter,
};
use serde_json::json;
use tempfile::TempDir;

const SUPER: i64 = 1;
const MODERATOR: i64 = 42;
const OUTSIDER: i64 = 77;
/// Allow-listed with an active grant that carries no permissions.
const SUPPORT: i64 = 55;

struct Fixture {
    store: Store,
    moderation: Moderation,
    recorder: Recorder,
    _dir: TempDir,
}

/// Store with a super admin (1), a moderator (42), and a permissionless
/// support grant (55) on the allow-list.
async fn fixture() -> Fixture {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let store = Store::open(&dir.path().join("bazaar.db"))
        .await
        .expect("store should open");
    let roles = AdminConfig::default().roles;

    for (actor, role) in [(SUPER, "super_admin"), (MODERATOR, "moderator")] {
        let perms = roles.get(role).cloned().expect("default role");
        store.upsert_grant(actor, role, perms).await.expect("grant");
    }
    store
        .upsert_grant(SUPPORT, "support", Vec::<String>::new())
        .await
        .expect("grant");

    let gate = Gate::new([SUPER, MODERATOR, SUPPORT].into_iter().collect(), store.clone());
    let recorder = Recorder::new(store.clone());
    let moderation = Moderation::new(store.clone(), gate, recorder.clone(), roles, 10);
    Fixture {
        store,
        moderation,
        recorder,
        _dir: dir,
    }
}

async fn member(store: &Store, telegram_id: i64) -> User {
    store
        .upsert_user(&TelegramProfile {
            telegram_id,
            first_name: Some("Member".to_owned()),
            ..TelegramProfile::default()
        })
        .await
        .expect("user should insert")
}

async fn listing(store: &Store, seller: &User, title: &str) -> Listing {
    store
        .create_listing(
            seller.id,
            &NewListing {
                title: title.to_owned(),
                price_cents: 20_000,
                category: "electronics".to_owned(),
                ..NewListing::default()
            },
        )
        .await
        .expect("listing")
}

fn missing(permission: &str) -> Option<Denied> {
    Some(Denied::MissingPermission(permission.to_owned()))
}

#[tokio::test]
async fn moderator_warning_is_applied_and_audited() {
    let f = fixture().await;
    let target = member(&f.store, 1000).await;

    let result = f
        .moderation
        .warn_user(MODERATOR, target.id, Severity::Low, "spam")
        .await
        .expect("store ok");
    let warning = match result {
        Ok(w) => w,
        Err(denied) => panic!("moderator should be allowed to warn: {denied}"),
    };
    assert_eq!(warning.actor_id, MODERATOR);

    let page = f
        .recorder
        .list(&AuditFilter::for_target("user", target.id), 1, 10)
        .await
        .expect("list");
    assert_eq!(page.entries.len(), 1);
    let entry = &page.entries[0];
    assert_eq!(entry.actor_id, MODERATOR);
    assert_eq!(entry.action, actions::USER_WARN);
    assert_eq!(entry.details.get("severity"), Some(&json!("low")));
    assert_eq!(entry.details.get("reason"), Some(&json!("spam")));
}

#[tokio::test]
async fn denied_block_changes_nothing_and_writes_no_entry() {
    let f = fixture().await;
    let target = member(&f.store, 1000).await;

    let result = f
        .moderation
        .block_user(MODERATOR, target.id, "spam")
        .await
        .expect("store ok");
    assert_eq!(
        result.err(),
        Some(Denied::MissingPermission("block_users".to_owned()))
    );

    let target = f.store.require_user(target.id).await.expect("reload");
    assert!(target.is_active);
    assert_eq!(
        f.recorder
            .count(&AuditFilter::default())
            .await
            .expect("count"),
        0
    );
}

#[tokio::test]
async fn outsider_is_denied_even_with_a_grant() {
    let f = fixture().await;
    f.store
        .upsert_grant(OUTSIDER, "super_admin", ["block_users"])
        .await
        .expect("grant");
    let target = member(&f.store, 1000).await;

    let result = f
        .moderation
        .block_user(OUTSIDER, target.id, "spam")
        .await
        .expect("store ok");
    assert_eq!(result.err(), Some(Denied::NotWhitelisted));
    assert!(f.moderation.open_panel(OUTSIDER).await.expect("lookup").is_err());
}

#[tokio::test]
async fn block_then_unblock_round_trips_with_audit() {
    let f = fixture().await;
    let target = member(&f.store, 1000).await;

    let blocked = f
        .moderation
        .block_user(SUPER, target.id, "fraud")
        .await
        .expect("store ok")
        .expect("allowed");
    assert!(!blocked.is_active);
    assert_eq!(blocked.suspension_reason.as_deref(), Some("fraud"));

    let restored = f
        .moderation
        .unblock_user(SUPER, target.id)
        .await
        .expect("store ok")
        .expect("allowed");
    assert!(restored.is_active);

    let page = f
        .recorder
        .list(&AuditGroup::Block.filter(), 1, 10)
        .await
        .expect("list");
    let kinds: Vec<&str> = page.entries.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(kinds, vec![actions::USER_UNBLOCK, actions::USER_BLOCK]);
}

#[tokio::test]
async fn failed_operation_is_not_audited() {
    let f = fixture().await;
    let result = f.moderation.block_user(SUPER, 9_999, "ghost").await;
    assert!(matches!(result, Err(StoreError::NotFound { .. })));
    assert_eq!(
        f.recorder
            .count(&AuditFilter::default())
            .await
            .expect("count"),
        0
    );
}

#[tokio::test]
async fn moderator_edits_and_flags_listings() {
    let f = fixture().await;
    let seller = member(&f.store, 1000).await;
    let listing = f
        .store
        .create_listing(
            seller.id,
            &NewListing {
                title: "Phone".to_owned(),
                price_cents: 20_000,
                category: "electronics".to_owned(),
                ..NewListing::default()
            },
        )
        .await
        .expect("listing");

    let edited = f
        .moderation
        .edit_listing(MODERATOR, listing.id, &ListingEdit::Price(15_000))
        .await
        .expect("store ok")
        .expect("allowed");
    assert_eq!(edited.price_cents, 15_000);

    let flagged = f
        .moderation
        .flag_listing(MODERATOR, listing.id, "stolen goods")
        .await
        .expect("store ok")
        .expect("allowed");
    assert!(flagged.flagged);

    // Moderators cannot delete.
    let delete = f
        .moderation
        .delete_listing(MODERATOR, listing.id)
        .await
        .expect("store ok");
    assert!(delete.is_err());

    let history = f
        .recorder
        .list(&AuditFilter::for_target("listing", listing.id), 1, 10)
        .await
        .expect("list");
    let kinds: Vec<&str> = history.entries.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(kinds, vec![actions::LISTING_FLAG, actions::LISTING_EDIT]);
    assert_eq!(history.entries[1].details.get("value"), Some(&json!("15000")));
}

#[tokio::test]
async fn grant_and_toggle_admins() {
    let f = fixture().await;

    let grant = f
        .moderation
        .grant_admin(SUPER, 500, "admin")
        .await
        .expect("store ok")
        .expect("allowed");
    assert_eq!(grant.role, "admin");
    assert!(grant.active);
    assert!(!grant.has_permission("manage_admins"));

    let deactivated = f
        .moderation
        .set_admin_active(SUPER, 500, false)
        .await
        .expect("store ok")
        .expect("allowed");
    assert!(!deactivated.active);

    let admins = f
        .recorder
        .count(&AuditGroup::Admins.filter())
        .await
        .expect("count");
    assert_eq!(admins, 2);
}

#[tokio::test]
async fn admins_cannot_toggle_themselves() {
    let f = fixture().await;
    let result = f.moderation.set_admin_active(SUPER, SUPER, false).await;
    assert!(matches!(result, Err(StoreError::Conflict(_))));

    let grant = f.store.grant(SUPER).await.expect("read").expect("exists");
    assert!(grant.active);
}

#[tokio::test]
async fn unknown_role_is_rejected() {
    let f = fixture().await;
    let result = f.moderation.grant_admin(SUPER, 500, "janitor").await;
    assert!(matches!(result, Err(StoreError::Conflict(_))));
    assert!(f.store.grant(500).await.expect("read").is_none());
}

#[tokio::test]
async fn moderator_cannot_manage_admins() {
    let f = fixture().await;
    let result = f
        .moderation
        .grant_admin(MODERATOR, 500, "admin")
        .await
        .expect("store ok");
    assert_eq!(
        result.err(),
        Some(Denied::MissingPermission("manage_admins".to_owned()))
    );
}

#[tokio::test]
async fn audit_log_view_needs_permission() {
    let f = fixture().await;
    let denied = f
        .moderation
        .audit_log(MODERATOR, AuditGroup::All, 1)
        .await
        .expect("store ok");
    assert!(denied.is_err());

    let page = f
        .moderation
        .audit_log(SUPER, AuditGroup::All, 1)
        .await
        .expect("store ok")
        .expect("allowed");
    assert!(page.entries.is_empty());
}

#[tokio::test]
async fn read_views_follow_their_permissions() {
    let f = fixture().await;
    let m = &f.moderation;
    let target = member(&f.store, 1000).await;

    // Moderator role: listings, warnings, analytics.
    assert!(m.dashboard(MODERATOR).await.expect("store ok").is_ok());
    assert!(m.listings(MODERATOR, ListingFilter::All, 1).await.expect("store ok").is_ok());
    assert!(m.reviews(MODERATOR, 1).await.expect("store ok").is_ok());
    assert!(m.user_warnings(MODERATOR, target.id).await.expect("store ok").is_ok());
    assert_eq!(
        m.users(MODERATOR, UserFilter::All, 1).await.expect("store ok").err(),
        missing("manage_users")
    );
    assert_eq!(
        m.transactions(MODERATOR, None, 1).await.expect("store ok").err(),
        missing("manage_transactions")
    );

    let users = m
        .users(SUPER, UserFilter::All, 1)
        .await
        .expect("store ok")
        .expect("allowed");
    assert_eq!(users.items.len(), 1);
    assert!(m.transactions(SUPER, None, 1).await.expect("store ok").is_ok());

    // An active grant with no permissions is denied each view by name.
    assert_eq!(m.dashboard(SUPPORT).await.expect("store ok").err(), missing("view_analytics"));
    assert_eq!(
        m.users(SUPPORT, UserFilter::All, 1).await.expect("store ok").err(),
        missing("manage_users")
    );
    assert_eq!(
        m.user_detail(SUPPORT, target.id).await.expect("store ok").err(),
        missing("manage_users")
    );
    assert_eq!(
        m.listings(SUPPORT, ListingFilter::All, 1).await.expect("store ok").err(),
        missing("manage_listings")
    );
    assert_eq!(
        m.transactions(SUPPORT, None, 1).await.expect("store ok").err(),
        missing("manage_transactions")
    );
    assert_eq!(m.reviews(SUPPORT, 1).await.expect("store ok").err(), missing("manage_listings"));
    assert_eq!(
        m.user_warnings(SUPPORT, target.id).await.expect("store ok").err(),
        missing("warn_users")
    );
    assert_eq!(
        m.user_listings(SUPPORT, target.id).await.expect("store ok").err(),
        missing("manage_listings")
    );
    assert_eq!(
        m.audit_log(SUPPORT, AuditGroup::All, 1).await.expect("store ok").err(),
        missing("view_audit_log")
    );
    assert_eq!(m.admins(SUPPORT).await.expect("store ok").err(), missing("manage_admins"));

    // Reads never write audit entries.
    assert_eq!(
        f.recorder.count(&AuditFilter::default()).await.expect("count"),
        0
    );
}

#[tokio::test]
async fn review_removal_is_gated_and_audited() {
    let f = fixture().await;
    let seller = member(&f.store, 1000).await;
    let buyer = member(&f.store, 2000).await;
    let item = listing(&f.store, &seller, "Phone").await;
    let review = f
        .store
        .create_review(
            buyer.id,
            &NewReview {
                listing_id: item.id,
                rating: 1,
                comment: Some("never shipped".to_owned()),
            },
        )
        .await
        .expect("review");

    let denied = f
        .moderation
        .delete_review(SUPPORT, review.id)
        .await
        .expect("store ok");
    assert_eq!(denied.err(), missing("manage_listings"));
    assert_eq!(
        f.recorder.count(&AuditFilter::default()).await.expect("count"),
        0
    );

    let removed = f
        .moderation
        .delete_review(MODERATOR, review.id)
        .await
        .expect("store ok")
        .expect("allowed");
    assert_eq!(removed.id, review.id);
    assert_eq!(f.store.count_reviews_for_seller(seller.id).await.expect("count"), 0);

    let page = f
        .recorder
        .list(&AuditFilter::for_target("review", review.id), 1, 10)
        .await
        .expect("list");
    assert_eq!(page.entries.len(), 1);
    assert_eq!(page.entries[0].action, actions::REVIEW_DELETE);
    assert_eq!(page.entries[0].details.get("seller_id"), Some(&json!(seller.id)));
    assert_eq!(page.entries[0].details.get("rating"), Some(&json!(1)));
}

#[tokio::test]
async fn profile_edit_on_behalf_of_user_is_audited() {
    let f = fixture().await;
    let target = member(&f.store, 1000).await;

    let denied = f
        .moderation
        .edit_user_profile(MODERATOR, target.id, ProfileField::Location, Some("Lisbon"))
        .await
        .expect("store ok");
    assert_eq!(denied.err(), missing("manage_users"));

    let edited = f
        .moderation
        .edit_user_profile(SUPER, target.id, ProfileField::Location, Some("Lisbon"))
        .await
        .expect("store ok")
        .expect("allowed");
    assert_eq!(edited.location.as_deref(), Some("Lisbon"));

    let cleared = f
        .moderation
        .edit_user_profile(SUPER, target.id, ProfileField::Location, None)
        .await
        .expect("store ok")
        .expect("allowed");
    assert_eq!(cleared.location, None);

    let page = f
        .recorder
        .list(&AuditFilter::for_target("user", target.id), 1, 10)
        .await
        .expect("list");
    let edits: Vec<_> = page
        .entries
        .iter()
        .filter(|e| e.action == actions::PROFILE_EDIT)
        .collect();
    assert_eq!(edits.len(), 2);
    assert_eq!(edits[1].details.get("field"), Some(&json!("location")));
    assert_eq!(edits[1].details.get("value"), Some(&json!("Lisbon")));
    assert_eq!(edits[0].details.get("value"), Some(&json!("")));
}

#[tokio::test]
async fn audit_write_failure_does_not_undo_the_action() {
    let f = fixture().await;
    let target = member(&f.store, 1000).await;
    sqlx::query("DROP TABLE admin_audit_log")
        .execute(f.store.pool())
        .await
        .expect("drop audit table");

    let blocked = f
        .moderation
        .block_user(SUPER, target.id, "fraud")
        .await
        .expect("store ok")
        .expect("allowed");
    assert!(!blocked.is_active);

    let reloaded = f.store.require_user(target.id).await.expect("reload");
    assert!(!reloaded.is_active);
    assert_eq!(reloaded.suspension_reason.as_deref(), Some("fraud"));
}

#[tokio::test]
async fn user_listings_skip_deleted_ones() {
    let f = fixture().await;
    let seller = member(&f.store, 1000).await;
    let kept = listing(&f.store, &seller, "Lamp").await;
    let gone = listing(&f.store, &seller, "Chair").await;
    f.store
        .set_listing_status(gone.id, ListingStatus::Deleted)
        .await
        .expect("delete");

    let (user, listings) = f
        .moderation
        .user_listings(MODERATOR, seller.id)
        .await
        .expect("store ok")
        .expect("allowed");
    assert_eq!(user.id, seller.id);
    let ids: Vec<i64> = listings.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![kept.id]);

    let unknown = f.moderation.user_listings(MODERATOR, 9_999).await;
    assert!(matches!(unknown, Err(StoreError::NotFound { .. })));
}

#[tokio::test]
async fn admins_list_active_grants_first() {
    let f = fixture().await;
    f.moderation
        .set_admin_active(SUPER, MODERATOR, false)
        .await
        .expect("store ok")
        .expect("allowed");

    let grants = f
        .moderation
        .admins(SUPER)
        .await
        .expect("store ok")
        .expect("allowed");
    let order: Vec<(i64, bool)> = grants.iter().map(|g| (g.actor_id, g.active)).collect();
    assert_eq!(order, vec![(SUPER, true), (SUPPORT, true), (MODERATOR, false)]);
}

#[tokio::test]
async fn permission_edit_replaces_the_set_and_is_audited() {
    let f = fixture().await;

    let grant = f
        .moderation
        .set_admin_permissions(SUPER, MODERATOR, &["warn_users".to_owned()])
        .await
        .expect("store ok")
        .expect("allowed");
    assert_eq!(grant.role, "moderator");
    assert!(grant.active);
    assert_eq!(grant.permissions.len(), 1);
    assert!(grant.has_permission("warn_users"));

    // The next authorization sees the narrowed set.
    assert_eq!(
        f.moderation.dashboard(MODERATOR).await.expect("store ok").err(),
        missing("view_analytics")
    );

    let page = f
        .recorder
        .list(&AuditFilter::for_target("admin", MODERATOR), 1, 10)
        .await
        .expect("list");
    assert_eq!(page.entries.len(), 1);
    assert_eq!(page.entries[0].action, actions::ADMIN_GRANT);
    assert_eq!(
        page.entries[0].details.get("permissions"),
        Some(&json!(["warn_users"]))
    );
}

#[tokio::test]
async fn permission_edit_rejects_bad_requests() {
    let f = fixture().await;
    let before = f.store.grant(MODERATOR).await.expect("read").expect("exists");

    let own = f
        .moderation
        .set_admin_permissions(SUPER, SUPER, &[])
        .await;
    assert!(matches!(own, Err(StoreError::Conflict(_))));

    let unknown = f
        .moderation
        .set_admin_permissions(SUPER, MODERATOR, &["launch_rockets".to_owned()])
        .await;
    assert!(matches!(unknown, Err(StoreError::Conflict(_))));
    let after = f.store.grant(MODERATOR).await.expect("read").expect("exists");
    assert_eq!(after.permissions, before.permissions);

    let no_grant = f
        .moderation
        .set_admin_permissions(SUPER, 500, &["warn_users".to_owned()])
        .await;
    assert!(matches!(no_grant, Err(StoreError::NotFound { .. })));

    let by_moderator = f
        .moderation
        .set_admin_permissions(MODERATOR, SUPPORT, &["warn_users".to_owned()])
        .await
        .expect("store ok");
    assert_eq!(by_moderator.err(), missing("manage_admins"));
    assert_eq!(
        f.recorder.count(&AuditFilter::default()).await.expect("count"),
        0
    );
}
