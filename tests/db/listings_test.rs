//! Tests for `src/db/listings.rs`.

use bazaar::db::{
    ListingEdit, ListingFilter, ListingStatus, NewListing, PhotoRef, SearchCriteria, Store,
    TelegramProfile, User,
};
use tempfile::TempDir;

async fn open_temp_db() -> (Store, TempDir) {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let store = Store::open(&dir.path().join("bazaar.db"))
        .await
        .expect("store should open");
    (store, dir)
}

async fn seller(store: &Store) -> User {
    store
        .upsert_user(&TelegramProfile {
            telegram_id: 500,
            first_name: Some("Seller".to_owned()),
            ..TelegramProfile::default()
        })
        .await
        .expect("seller should insert")
}

fn draft(title: &str, price_cents: i64, category: &str) -> NewListing {
    NewListing {
        title: title.to_owned(),
        description: Some(format!("{title} in good condition")),
        price_cents,
        category: category.to_owned(),
        ..NewListing::default()
    }
}

#[tokio::test]
async fn create_stores_photos_with_first_as_primary() {
    let (store, _dir) = open_temp_db().await;
    let user = seller(&store).await;

    let mut new = draft("Road bike", 25_000, "sports");
    new.photos = vec![
        PhotoRef {
            file_id: "f1".to_owned(),
            unique_id: "u1".to_owned(),
        },
        PhotoRef {
            file_id: "f2".to_owned(),
            unique_id: "u2".to_owned(),
        },
    ];
    let listing = store.create_listing(user.id, &new).await.expect("create");
    assert_eq!(listing.status, ListingStatus::Active);
    assert_eq!(listing.views, 0);
    assert!(!listing.flagged);

    let photos = store.photos_for_listing(listing.id).await.expect("photos");
    assert_eq!(photos.len(), 2);
    assert!(photos[0].is_primary);
    assert_eq!(photos[0].file_id, "f1");
    assert!(!photos[1].is_primary);
}

#[tokio::test]
async fn search_filters_combine() {
    let (store, _dir) = open_temp_db().await;
    let user = seller(&store).await;
    store
        .create_listing(user.id, &draft("Laptop stand", 2_000, "electronics"))
        .await
        .expect("create");
    store
        .create_listing(user.id, &draft("Gaming laptop", 90_000, "electronics"))
        .await
        .expect("create");
    store
        .create_listing(user.id, &draft("Winter jacket", 6_000, "clothing"))
        .await
        .expect("create");

    let keyword = SearchCriteria {
        keywords: Some("laptop".to_owned()),
        ..SearchCriteria::default()
    };
    assert_eq!(store.count_search(&keyword).await.expect("count"), 2);

    let cheap_electronics = SearchCriteria {
        category: Some("electronics".to_owned()),
        max_price_cents: Some(5_000),
        ..SearchCriteria::default()
    };
    let found = store
        .search_listings(&cheap_electronics, 10, 0)
        .await
        .expect("search");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "Laptop stand");

    let floor = SearchCriteria {
        min_price_cents: Some(5_000),
        ..SearchCriteria::default()
    };
    assert_eq!(store.count_search(&floor).await.expect("count"), 2);
}

#[tokio::test]
async fn sold_and_deleted_listings_leave_search() {
    let (store, _dir) = open_temp_db().await;
    let user = seller(&store).await;
    let sold = store
        .create_listing(user.id, &draft("Desk lamp", 1_500, "home"))
        .await
        .expect("create");
    let deleted = store
        .create_listing(user.id, &draft("Desk chair", 4_000, "home"))
        .await
        .expect("create");

    store
        .set_listing_status(sold.id, ListingStatus::Sold)
        .await
        .expect("sold");
    store.soft_delete_listing(deleted.id).await.expect("delete");

    assert_eq!(
        store
            .count_search(&SearchCriteria::default())
            .await
            .expect("count"),
        0
    );
    // Soft-deleted rows stay readable for moderation.
    let row = store.require_listing(deleted.id).await.expect("still there");
    assert_eq!(row.status, ListingStatus::Deleted);

    let own = store.listings_by_user(user.id, None).await.expect("own");
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].id, sold.id);
    assert_eq!(
        store
            .admin_count_listings(ListingFilter::Deleted)
            .await
            .expect("count"),
        1
    );
}

#[tokio::test]
async fn single_field_edits_apply() {
    let (store, _dir) = open_temp_db().await;
    let user = seller(&store).await;
    let listing = store
        .create_listing(user.id, &draft("Old title", 1_000, "books"))
        .await
        .expect("create");

    store
        .update_listing_field(listing.id, &ListingEdit::Title("New title".to_owned()))
        .await
        .expect("title");
    store
        .update_listing_field(listing.id, &ListingEdit::Price(1_250))
        .await
        .expect("price");
    store
        .update_listing_field(listing.id, &ListingEdit::Description(None))
        .await
        .expect("description");

    let updated = store.require_listing(listing.id).await.expect("reload");
    assert_eq!(updated.title, "New title");
    assert_eq!(updated.price_cents, 1_250);
    assert_eq!(updated.description, None);
    assert_eq!(updated.category, "books");
}

#[tokio::test]
async fn views_and_flags() {
    let (store, _dir) = open_temp_db().await;
    let user = seller(&store).await;
    let listing = store
        .create_listing(user.id, &draft("Guitar", 15_000, "other"))
        .await
        .expect("create");

    store.increment_views(listing.id).await.expect("view");
    store.increment_views(listing.id).await.expect("view");
    store
        .set_flag(listing.id, true, Some("counterfeit"))
        .await
        .expect("flag");

    let flagged = store.require_listing(listing.id).await.expect("reload");
    assert_eq!(flagged.views, 2);
    assert!(flagged.flagged);
    assert_eq!(flagged.flag_reason.as_deref(), Some("counterfeit"));
    assert_eq!(
        store
            .admin_count_listings(ListingFilter::Flagged)
            .await
            .expect("count"),
        1
    );

    store.set_flag(listing.id, false, Some("x")).await.expect("unflag");
    let cleared = store.require_listing(listing.id).await.expect("reload");
    assert!(!cleared.flagged);
    assert_eq!(cleared.flag_reason, None);
}

#[tokio::test]
async fn search_keywords_match_wildcards_literally() {
    let (store, _dir) = open_temp_db().await;
    let user = seller(&store).await;
    for title in ["100% cotton shirt", "100 cotton balls", "a_b adapter", "axb adapter"] {
        store
            .create_listing(user.id, &draft(title, 1_000, "clothing"))
            .await
            .expect("create");
    }

    let titles = |listings: Vec<bazaar::db::Listing>| -> Vec<String> {
        listings.into_iter().map(|l| l.title).collect()
    };

    let percent = SearchCriteria {
        keywords: Some("100%".to_owned()),
        ..SearchCriteria::default()
    };
    assert_eq!(store.count_search(&percent).await.expect("count"), 1);
    assert_eq!(
        titles(store.search_listings(&percent, 10, 0).await.expect("search")),
        vec!["100% cotton shirt"]
    );

    let underscore = SearchCriteria {
        keywords: Some("a_b".to_owned()),
        ..SearchCriteria::default()
    };
    assert_eq!(
        titles(store.search_listings(&underscore, 10, 0).await.expect("search")),
        vec!["a_b adapter"]
    );
}
