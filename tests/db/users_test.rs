//! Tests for `src/db/users.rs`.

use bazaar::db::{ProfileField, Store, StoreError, TelegramProfile, UserFilter};
use tempfile::TempDir;

async fn open_temp_db() -> (Store, TempDir) {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let store = Store::open(&dir.path().join("bazaar.db"))
        .await
        .expect("store should open");
    (store, dir)
}

fn profile(telegram_id: i64, first_name: &str) -> TelegramProfile {
    TelegramProfile {
        telegram_id,
        username: None,
        first_name: Some(first_name.to_owned()),
        last_name: None,
    }
}

#[tokio::test]
async fn upsert_creates_then_refreshes_names() {
    let (store, _dir) = open_temp_db().await;

    let first = store.upsert_user(&profile(1001, "Ann")).await.expect("insert");
    assert!(first.is_active);
    assert_eq!(first.warning_count, 0);
    assert_eq!(first.display_name(), "Ann");

    let renamed = TelegramProfile {
        username: Some("ann_sells".to_owned()),
        ..profile(1001, "Annie")
    };
    let second = store.upsert_user(&renamed).await.expect("update");
    assert_eq!(second.id, first.id);
    assert_eq!(second.first_name.as_deref(), Some("Annie"));
    assert_eq!(second.username.as_deref(), Some("ann_sells"));
}

#[tokio::test]
async fn display_name_falls_back_to_username_then_id() {
    let (store, _dir) = open_temp_db().await;

    let named = store
        .upsert_user(&TelegramProfile {
            telegram_id: 7,
            username: Some("seller".to_owned()),
            ..TelegramProfile::default()
        })
        .await
        .expect("insert");
    assert_eq!(named.display_name(), "@seller");

    let anonymous = store
        .upsert_user(&TelegramProfile {
            telegram_id: 8,
            ..TelegramProfile::default()
        })
        .await
        .expect("insert");
    assert_eq!(anonymous.display_name(), "User 8");
}

#[tokio::test]
async fn profile_field_set_and_clear() {
    let (store, _dir) = open_temp_db().await;
    let user = store.upsert_user(&profile(5, "Bo")).await.expect("insert");

    store
        .update_profile_field(user.id, ProfileField::Location, Some("Berlin"))
        .await
        .expect("set location");
    let user = store.require_user(user.id).await.expect("reload");
    assert_eq!(user.location.as_deref(), Some("Berlin"));

    store
        .update_profile_field(user.id, ProfileField::Location, None)
        .await
        .expect("clear location");
    let user = store.require_user(user.id).await.expect("reload");
    assert_eq!(user.location, None);
}

#[tokio::test]
async fn missing_user_is_not_found() {
    let (store, _dir) = open_temp_db().await;
    let result = store
        .update_profile_field(404, ProfileField::Bio, Some("hi"))
        .await;
    assert!(matches!(
        result,
        Err(StoreError::NotFound { entity: "user", id: 404 })
    ));
    assert!(store.user_by_id(404).await.expect("read").is_none());
}

#[tokio::test]
async fn block_keeps_reason_and_unblock_clears_it() {
    let (store, _dir) = open_temp_db().await;
    let user = store.upsert_user(&profile(9, "Cy")).await.expect("insert");

    store
        .set_user_active(user.id, false, Some("spam"))
        .await
        .expect("block");
    let blocked = store.require_user(user.id).await.expect("reload");
    assert!(!blocked.is_active);
    assert_eq!(blocked.suspension_reason.as_deref(), Some("spam"));
    assert_eq!(store.count_users(UserFilter::Blocked).await.expect("count"), 1);

    store
        .set_user_active(user.id, true, Some("ignored"))
        .await
        .expect("unblock");
    let restored = store.require_user(user.id).await.expect("reload");
    assert!(restored.is_active);
    assert_eq!(restored.suspension_reason, None);
    assert_eq!(store.count_users(UserFilter::Blocked).await.expect("count"), 0);
}

#[tokio::test]
async fn list_users_pages_newest_first() {
    let (store, _dir) = open_temp_db().await;
    for id in 1..=3 {
        store
            .upsert_user(&profile(id, &format!("U{id}")))
            .await
            .expect("insert");
    }

    let page = store
        .list_users(UserFilter::All, 2, 0)
        .await
        .expect("list");
    let ids: Vec<i64> = page.iter().map(|u| u.telegram_id).collect();
    assert_eq!(ids, vec![3, 2]);

    let rest = store
        .list_users(UserFilter::All, 2, 2)
        .await
        .expect("list");
    assert_eq!(rest.len(), 1);
    assert_eq!(store.count_users(UserFilter::Active).await.expect("count"), 3);
}
