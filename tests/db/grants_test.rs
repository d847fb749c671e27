//! Tests for `src/db/grants.rs`.

use bazaar::db::{Store, StoreError};
use tempfile::TempDir;

async fn open_temp_db() -> (Store, TempDir) {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let store = Store::open(&dir.path().join("bazaar.db"))
        .await
        .expect("store should open");
    (store, dir)
}

#[tokio::test]
async fn fresh_database_has_every_table() {
    let (store, _dir) = open_temp_db().await;
    assert!(store.missing_tables().await.expect("query").is_empty());
}

#[tokio::test]
async fn reopening_applies_schema_idempotently() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let path = dir.path().join("nested").join("bazaar.db");
    let first = Store::open(&path).await.expect("first open");
    first
        .upsert_grant(1, "admin", ["view_analytics"])
        .await
        .expect("grant");
    drop(first);

    let second = Store::open(&path).await.expect("second open");
    assert!(second.grant(1).await.expect("read").is_some());
}

#[tokio::test]
async fn upsert_replaces_role_and_reactivates() {
    let (store, _dir) = open_temp_db().await;

    let grant = store
        .upsert_grant(42, "moderator", ["warn_users", "manage_listings"])
        .await
        .expect("grant");
    assert!(grant.active);
    assert!(grant.has_permission("warn_users"));
    assert!(!grant.has_permission("block_users"));

    store.set_grant_active(42, false).await.expect("deactivate");
    let inactive = store.grant(42).await.expect("read").expect("grant exists");
    assert!(!inactive.active);
    assert!(!inactive.has_permission("warn_users"));
    assert_eq!(store.count_active_grants().await.expect("count"), 0);

    let regranted = store
        .upsert_grant(42, "admin", ["block_users"])
        .await
        .expect("regrant");
    assert!(regranted.active);
    assert_eq!(regranted.role, "admin");
    assert!(regranted.has_permission("block_users"));
    assert!(!regranted.has_permission("warn_users"));
    assert_eq!(store.count_active_grants().await.expect("count"), 1);
}

#[tokio::test]
async fn permissions_are_case_sensitive() {
    let (store, _dir) = open_temp_db().await;
    let grant = store
        .upsert_grant(7, "moderator", ["warn_users"])
        .await
        .expect("grant");
    assert!(!grant.has_permission("WARN_USERS"));
}

#[tokio::test]
async fn missing_grant_cannot_be_toggled() {
    let (store, _dir) = open_temp_db().await;
    let result = store.set_grant_active(404, true).await;
    assert!(matches!(result, Err(StoreError::NotFound { .. })));
    assert!(store.grant(404).await.expect("read").is_none());
}

#[tokio::test]
async fn list_grants_orders_active_first() {
    let (store, _dir) = open_temp_db().await;
    store.upsert_grant(3, "admin", ["a"]).await.expect("grant");
    store.upsert_grant(1, "admin", ["a"]).await.expect("grant");
    store.upsert_grant(2, "admin", ["a"]).await.expect("grant");
    store.set_grant_active(1, false).await.expect("deactivate");

    let ids: Vec<i64> = store
        .list_grants()
        .await
        .expect("list")
        .iter()
        .map(|g| g.actor_id)
        .collect();
    assert_eq!(ids, vec![2, 3, 1]);
}
