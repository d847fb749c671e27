//! Tests for `FlowStore`.

use bazaar::db::SearchCriteria;
use bazaar::flows::{ActiveFlow, CreateListing, FlowStore, Search};

#[tokio::test]
async fn one_flow_per_chat() {
    let flows = FlowStore::new();
    assert!(flows.is_empty().await);

    flows
        .set(10, ActiveFlow::CreateListing(CreateListing::start()))
        .await;
    flows.set(10, ActiveFlow::Search(Search::start())).await;
    flows.set(20, ActiveFlow::Search(Search::start())).await;
    assert_eq!(flows.len().await, 2);

    let current = flows.get(10).await.expect("chat 10 has a flow");
    assert_eq!(current.name(), "search");
}

#[tokio::test]
async fn take_removes_and_clear_reports() {
    let flows = FlowStore::new();
    flows.set(10, ActiveFlow::Search(Search::start())).await;

    assert!(flows.take(10).await.is_some());
    assert!(flows.take(10).await.is_none());
    assert!(!flows.clear(10).await);

    flows.set(10, ActiveFlow::Search(Search::start())).await;
    assert!(flows.clear(10).await);
}

#[tokio::test]
async fn last_search_survives_flow_end() {
    let flows = FlowStore::new();
    let criteria = SearchCriteria {
        keywords: Some("lamp".to_owned()),
        ..SearchCriteria::default()
    };
    flows.set(10, ActiveFlow::Search(Search::start())).await;
    flows.remember_search(10, criteria.clone()).await;
    flows.take(10).await;

    assert_eq!(flows.last_search(10).await, Some(criteria));
    assert_eq!(flows.last_search(11).await, None);
}

#[tokio::test]
async fn clear_forgets_the_saved_search() {
    let flows = FlowStore::new();
    let criteria = SearchCriteria {
        keywords: Some("lamp".to_owned()),
        ..SearchCriteria::default()
    };
    flows.remember_search(10, criteria.clone()).await;
    flows.remember_search(11, criteria.clone()).await;

    assert!(!flows.clear(10).await);
    assert_eq!(flows.last_search(10).await, None);
    assert_eq!(flows.last_search(11).await, Some(criteria));
}
