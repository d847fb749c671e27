//! Tests for `src/telegram/callbacks.rs`.

use bazaar::admin::AuditGroup;
use bazaar::db::{ListingField, ListingStatus, ProfileField, Severity, TransactionStatus, UserFilter};
use bazaar::telegram::callbacks::{AdminAction, CallbackAction, ConfirmAction, MenuItem};

fn parse(data: &str) -> Option<CallbackAction> {
    CallbackAction::parse(data)
}

#[test]
fn marketplace_buttons() {
    assert_eq!(parse("menu:new"), Some(CallbackAction::Menu(MenuItem::NewListing)));
    assert_eq!(parse("cat:books"), Some(CallbackAction::Category("books".to_owned())));
    assert_eq!(parse("confirm:yes"), Some(CallbackAction::Confirm(true)));
    assert_eq!(parse("confirm:no"), Some(CallbackAction::Confirm(false)));
    assert_eq!(parse("view:12"), Some(CallbackAction::View(12)));
    assert_eq!(parse("fav:3"), Some(CallbackAction::Favorite(3)));
    assert_eq!(parse("rate:5"), Some(CallbackAction::Rate(5)));
    assert_eq!(parse("field:price"), Some(CallbackAction::Field(ListingField::Price)));
    assert_eq!(parse("profile:bio"), Some(CallbackAction::Profile(ProfileField::Bio)));
    assert_eq!(parse("results:page:2"), Some(CallbackAction::ResultsPage(2)));
    assert_eq!(parse("severity:high"), Some(CallbackAction::Severity(Severity::High)));
    assert_eq!(parse("price:custom"), Some(CallbackAction::PriceRange("custom".to_owned())));
}

#[test]
fn own_listing_filters_and_seller_reviews() {
    assert_eq!(parse("mylistings:all"), Some(CallbackAction::MyListings(None)));
    assert_eq!(
        parse("mylistings:active"),
        Some(CallbackAction::MyListings(Some(ListingStatus::Active)))
    );
    assert_eq!(
        parse("mylistings:sold"),
        Some(CallbackAction::MyListings(Some(ListingStatus::Sold)))
    );
    assert_eq!(parse("mylistings:gone"), None);

    assert_eq!(
        parse("seller_reviews:3"),
        Some(CallbackAction::SellerReviews {
            seller_id: 3,
            page: 1
        })
    );
    assert_eq!(
        parse("seller_reviews:3:page:2"),
        Some(CallbackAction::SellerReviews {
            seller_id: 3,
            page: 2
        })
    );
    assert_eq!(parse("seller_reviews:"), None);
    assert_eq!(parse("seller_reviews:3:page:x"), None);
}

#[test]
fn reply_zero_listing_means_none() {
    assert_eq!(
        parse("reply:9:0"),
        Some(CallbackAction::Reply {
            user_id: 9,
            listing_id: None
        })
    );
    assert_eq!(
        parse("reply:9:4"),
        Some(CallbackAction::Reply {
            user_id: 9,
            listing_id: Some(4)
        })
    );
}

#[test]
fn malformed_data_is_rejected() {
    for data in [
        "",
        "view",
        "view:abc",
        "rate:0",
        "rate:6",
        "menu:settings",
        "cat:",
        "reply:9",
        "field:colour",
        "results:2",
        "teleport:1",
    ] {
        assert_eq!(parse(data), None, "{data:?} should not parse");
    }
}

#[test]
fn admin_lists_default_to_first_page() {
    assert_eq!(
        parse("admin_users:blocked"),
        Some(CallbackAction::Admin(AdminAction::Users {
            filter: UserFilter::Blocked,
            page: 1
        }))
    );
    assert_eq!(
        parse("admin_audit:warn:page:3"),
        Some(CallbackAction::Admin(AdminAction::Audit {
            group: AuditGroup::Warn,
            page: 3
        }))
    );
    assert_eq!(
        parse("admin_transactions:all"),
        Some(CallbackAction::Admin(AdminAction::Transactions {
            status: None,
            page: 1
        }))
    );
    assert_eq!(
        parse("admin_transactions:pending:page:2"),
        Some(CallbackAction::Admin(AdminAction::Transactions {
            status: Some(TransactionStatus::Pending),
            page: 2
        }))
    );
    assert_eq!(
        parse("admin_reviews"),
        Some(CallbackAction::Admin(AdminAction::Reviews { page: 1 }))
    );
}

#[test]
fn admin_confirmations() {
    assert_eq!(
        parse("admin_confirm:delete_listing:7"),
        Some(CallbackAction::Admin(AdminAction::Confirm {
            action: ConfirmAction::DeleteListing,
            id: 7
        }))
    );
    assert_eq!(
        parse("admin_cancel:unblock:3"),
        Some(CallbackAction::Admin(AdminAction::Cancel {
            action: ConfirmAction::Unblock,
            id: 3
        }))
    );
    assert_eq!(parse("admin_confirm:nuke:3"), None);
    assert_eq!(parse("admin_user_edit:5:avatar"), None);
    assert_eq!(parse("admin_users:everyone"), None);
    assert_eq!(parse("admin_unknown"), None);
}

#[test]
fn admin_user_jumps() {
    assert_eq!(
        parse("admin_user_edit:5"),
        Some(CallbackAction::Admin(AdminAction::EditUser(5)))
    );
    assert_eq!(
        parse("admin_user_edit:5:location"),
        Some(CallbackAction::Admin(AdminAction::EditUserField {
            user_id: 5,
            field: ProfileField::Location
        }))
    );
    assert_eq!(
        parse("admin_user_listings:5"),
        Some(CallbackAction::Admin(AdminAction::UserListings(5)))
    );
    assert_eq!(parse("admin_user_listings:x"), None);
}
