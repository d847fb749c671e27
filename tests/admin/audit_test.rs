//! Tests for `src/admin/audit.rs`.

use std::collections::BTreeSet;

use bazaar::admin::audit::actions;
use bazaar::admin::{AuditDescriptor, AuditFilter, AuditGroup, Details, Pagination, Recorder};
use bazaar::db::Store;
use serde_json::json;
use tempfile::TempDir;

async fn open_temp_db() -> (Store, TempDir) {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let store = Store::open(&dir.path().join("bazaar.db"))
        .await
        .expect("store should open");
    (store, dir)
}

fn details(pairs: &[(&str, &str)]) -> Details {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), json!(v)))
        .collect()
}

#[tokio::test]
async fn target_filter_returns_recorded_warning() {
    let (store, _dir) = open_temp_db().await;
    let recorder = Recorder::new(store);

    recorder
        .record(
            42,
            actions::USER_WARN,
            Some("user"),
            Some(7),
            &details(&[("severity", "low"), ("reason", "spam")]),
        )
        .await
        .expect("record");
    recorder
        .record(42, actions::USER_WARN, Some("user"), Some(8), &Details::new())
        .await
        .expect("record");

    let page = recorder
        .list(&AuditFilter::for_target("user", 7), 1, 10)
        .await
        .expect("list");
    assert_eq!(page.pagination.total, 1);
    let entry = &page.entries[0];
    assert_eq!(entry.actor_id, 42);
    assert_eq!(entry.action, "user_warn");
    assert_eq!(entry.details.get("severity"), Some(&json!("low")));
    assert_eq!(entry.details.get("reason"), Some(&json!("spam")));
}

#[tokio::test]
async fn entries_come_back_newest_first() {
    let (store, _dir) = open_temp_db().await;
    let recorder = Recorder::new(store);

    for action in [actions::USER_BLOCK, actions::USER_UNBLOCK, actions::USER_WARN] {
        recorder
            .record(1, action, Some("user"), Some(3), &Details::new())
            .await
            .expect("record");
    }

    let page = recorder
        .list(&AuditFilter::default(), 1, 10)
        .await
        .expect("list");
    let actions: Vec<&str> = page.entries.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(actions, vec!["user_warn", "user_unblock", "user_block"]);
}

#[tokio::test]
async fn identical_records_are_not_deduplicated() {
    let (store, _dir) = open_temp_db().await;
    let recorder = Recorder::new(store);
    let descriptor = AuditDescriptor::new(actions::LISTING_FLAG)
        .target("listing", 5)
        .detail("reason", "duplicate");

    let first = recorder
        .record_descriptor(9, &descriptor)
        .await
        .expect("record");
    let second = recorder
        .record_descriptor(9, &descriptor)
        .await
        .expect("record");
    assert_ne!(first.id, second.id);
    assert_eq!(
        recorder
            .count(&AuditFilter::for_target("listing", 5))
            .await
            .expect("count"),
        2
    );
}

#[tokio::test]
async fn empty_kind_set_matches_nothing() {
    let (store, _dir) = open_temp_db().await;
    let recorder = Recorder::new(store);
    recorder
        .record(1, actions::USER_BLOCK, None, None, &Details::new())
        .await
        .expect("record");

    let filter = AuditFilter {
        action_kinds: Some(BTreeSet::new()),
        ..AuditFilter::default()
    };
    let page = recorder.list(&filter, 1, 10).await.expect("list");
    assert!(page.entries.is_empty());
    assert_eq!(page.pagination.total, 0);
    assert_eq!(page.pagination.total_pages, 1);
}

#[tokio::test]
async fn group_and_actor_filters_combine() {
    let (store, _dir) = open_temp_db().await;
    let recorder = Recorder::new(store);
    recorder
        .record(1, actions::USER_BLOCK, Some("user"), Some(3), &Details::new())
        .await
        .expect("record");
    recorder
        .record(2, actions::USER_BLOCK, Some("user"), Some(4), &Details::new())
        .await
        .expect("record");
    recorder
        .record(1, actions::LISTING_DELETE, Some("listing"), Some(5), &Details::new())
        .await
        .expect("record");

    let blocks = recorder
        .count(&AuditGroup::Block.filter())
        .await
        .expect("count");
    assert_eq!(blocks, 2);

    let mut filter = AuditGroup::Block.filter();
    filter.actor_id = Some(1);
    assert_eq!(recorder.count(&filter).await.expect("count"), 1);

    assert_eq!(
        recorder
            .count(&AuditFilter::for_actor(1))
            .await
            .expect("count"),
        2
    );
    assert_eq!(
        recorder
            .count(&AuditGroup::All.filter())
            .await
            .expect("count"),
        3
    );
}

#[tokio::test]
async fn out_of_range_page_is_clamped() {
    let (store, _dir) = open_temp_db().await;
    let recorder = Recorder::new(store);
    for target in 1..=5 {
        recorder
            .record(1, actions::USER_WARN, Some("user"), Some(target), &Details::new())
            .await
            .expect("record");
    }

    let last = recorder
        .list(&AuditFilter::default(), 99, 2)
        .await
        .expect("list");
    assert_eq!(last.pagination.page, 3);
    assert_eq!(last.pagination.total_pages, 3);
    assert_eq!(last.entries.len(), 1);
    assert_eq!(last.entries[0].target_id, Some(1));

    let first = recorder
        .list(&AuditFilter::default(), 0, 2)
        .await
        .expect("list");
    assert_eq!(first.pagination.page, 1);
    assert_eq!(first.entries[0].target_id, Some(5));
}

#[tokio::test]
async fn empty_log_lists_a_single_empty_page() {
    let (store, _dir) = open_temp_db().await;
    let recorder = Recorder::new(store);

    for requested in [0, 1, 7] {
        let page = recorder
            .list(&AuditFilter::default(), requested, 10)
            .await
            .expect("list");
        assert!(page.entries.is_empty());
        assert_eq!(page.pagination.page, 1);
        assert_eq!(page.pagination.total_pages, 1);
        assert!(!page.pagination.has_next());
    }
}

#[test]
fn pagination_math() {
    let empty = Pagination::new(0, 4, 10);
    assert_eq!((empty.page, empty.total_pages), (1, 1));
    assert!(!empty.has_prev());
    assert!(!empty.has_next());

    let middle = Pagination::new(25, 2, 10);
    assert_eq!(middle.total_pages, 3);
    assert_eq!(middle.offset(), 10);
    assert!(middle.has_prev());
    assert!(middle.has_next());

    let zero_size = Pagination::new(3, 1, 0);
    assert_eq!(zero_size.page_size, 1);
    assert_eq!(zero_size.total_pages, 3);
}
