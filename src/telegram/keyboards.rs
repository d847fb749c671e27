//! Inline keyboards.
//!
//! Callback data produced here is decoded by
//! [`CallbackAction::parse`](crate::telegram::callbacks::CallbackAction::parse).

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::admin::{AuditGroup, Pagination};
use crate::catalog::CATEGORIES;
use crate::db::{
    Listing, ListingFilter, ListingStatus, ProfileField, Review, Severity, User, UserFilter,
};
use crate::flows::{Keys, ALL_CATEGORIES, CUSTOM_RANGE, PRICE_RANGES};
use crate::telegram::callbacks::{ConfirmAction, MenuItem};
use crate::telegram::ui;

fn button(text: impl Into<String>, data: impl Into<String>) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text.into(), data.into())
}

fn cancel_button() -> InlineKeyboardButton {
    button("\u{274C} Cancel", "cancel")
}

/// Keyboard for a flow prompt.
pub fn for_prompt(keys: Keys) -> InlineKeyboardMarkup {
    match keys {
        Keys::Cancel => cancel(),
        Keys::Skip => skip(),
        Keys::Categories => categories(false),
        Keys::BrowseCategories => categories(true),
        Keys::PriceRanges => price_ranges(),
        Keys::Photos => photos(),
        Keys::Confirm => confirm(),
        Keys::Rating => rating(),
        Keys::Severity => severity(),
        Keys::ListingFields => listing_fields(),
        Keys::SearchModes => search_modes(),
    }
}

/// Main menu.
pub fn main_menu() -> InlineKeyboardMarkup {
    let item = |label: &str, item: MenuItem| button(label, format!("menu:{}", item.as_str()));
    InlineKeyboardMarkup::new(vec![
        vec![
            item("\u{2795} New listing", MenuItem::NewListing),
            item("\u{1F50D} Search", MenuItem::Search),
        ],
        vec![
            item("\u{1F4CB} My listings", MenuItem::MyListings),
            item("\u{2764}\u{FE0F} Favorites", MenuItem::Favorites),
        ],
        vec![
            item("\u{1F464} Profile", MenuItem::Profile),
            item("\u{2753} Help", MenuItem::Help),
        ],
    ])
}

/// A lone cancel button.
pub fn cancel() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![cancel_button()]])
}

/// Skip plus cancel.
pub fn skip() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![button("\u{23ED}\u{FE0F} Skip", "skip"), cancel_button()]])
}

/// Category grid, two per row. `include_all` adds an "All categories" entry for browsing.
pub fn categories(include_all: bool) -> InlineKeyboardMarkup {
    let mut buttons: Vec<InlineKeyboardButton> = CATEGORIES
        .iter()
        .map(|c| button(format!("{} {}", c.emoji, c.name), format!("cat:{}", c.id)))
        .collect();
    if include_all {
        buttons.push(button("\u{1F4E6} All categories", format!("cat:{ALL_CATEGORIES}")));
    }
    let mut rows: Vec<Vec<InlineKeyboardButton>> =
        buttons.chunks(2).map(<[InlineKeyboardButton]>::to_vec).collect();
    rows.push(vec![cancel_button()]);
    InlineKeyboardMarkup::new(rows)
}

/// Price range presets plus a custom range.
pub fn price_ranges() -> InlineKeyboardMarkup {
    let mut buttons: Vec<InlineKeyboardButton> = PRICE_RANGES
        .iter()
        .map(|(label, range)| button(*label, format!("price:{range}")))
        .collect();
    buttons.push(button("Custom range", format!("price:{CUSTOM_RANGE}")));
    let mut rows: Vec<Vec<InlineKeyboardButton>> =
        buttons.chunks(2).map(<[InlineKeyboardButton]>::to_vec).collect();
    rows.push(vec![cancel_button()]);
    InlineKeyboardMarkup::new(rows)
}

/// Photo step: finish or skip.
pub fn photos() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        button("\u{2705} Done", "done"),
        button("\u{23ED}\u{FE0F} Skip", "skip"),
        cancel_button(),
    ]])
}

/// Yes/no confirmation.
pub fn confirm() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        button("\u{2705} Yes", "confirm:yes"),
        button("\u{274C} No", "confirm:no"),
    ]])
}

/// One to five stars.
pub fn rating() -> InlineKeyboardMarkup {
    let stars = (1u8..=5)
        .map(|n| button("\u{2B50}".repeat(usize::from(n)), format!("rate:{n}")))
        .collect();
    InlineKeyboardMarkup::new(vec![stars, vec![cancel_button()]])
}

/// Warning severity picker.
pub fn severity() -> InlineKeyboardMarkup {
    let levels = Severity::ALL
        .iter()
        .map(|s| {
            button(
                format!("{} {}", ui::severity_icon(*s), s.as_str()),
                format!("severity:{}", s.as_str()),
            )
        })
        .collect();
    InlineKeyboardMarkup::new(vec![levels, vec![cancel_button()]])
}

/// Editable listing fields.
pub fn listing_fields() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            button("\u{1F4DD} Title", "field:title"),
            button("\u{1F4C4} Description", "field:description"),
        ],
        vec![
            button("\u{1F4B0} Price", "field:price"),
            button("\u{1F4C1} Category", "field:category"),
        ],
        vec![cancel_button()],
    ])
}

/// Search modes.
pub fn search_modes() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![button("\u{1F524} Keywords", "search:keywords")],
        vec![button("\u{1F4C1} Browse categories", "search:category")],
        vec![button("\u{1F4B0} Price range", "search:price")],
        vec![cancel_button()],
    ])
}

/// Editable profile fields.
pub fn profile() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            button("\u{1F4DE} Phone", "profile:phone"),
            button("\u{1F4CD} Location", "profile:location"),
        ],
        vec![button("\u{1F4DD} Bio", "profile:bio")],
    ])
}

/// Listing card actions. Owners manage; everyone else buys.
pub fn listing_actions(listing: &Listing, is_owner: bool, is_favorite: bool) -> InlineKeyboardMarkup {
    let id = listing.id;
    if is_owner {
        let mut top = vec![button("\u{270F}\u{FE0F} Edit", format!("edit:{id}"))];
        if listing.status == ListingStatus::Active {
            top.push(button("\u{2705} Mark sold", format!("sold:{id}")));
        }
        let delete = vec![button("\u{1F5D1}\u{FE0F} Delete", format!("del:{id}"))];
        return InlineKeyboardMarkup::new(vec![top, delete]);
    }
    let favorite = if is_favorite {
        button("\u{1F494} Remove from favorites", format!("unfav:{id}"))
    } else {
        button("\u{2764}\u{FE0F} Add to favorites", format!("fav:{id}"))
    };
    InlineKeyboardMarkup::new(vec![
        vec![button("\u{2709}\u{FE0F} Message seller", format!("msg:{id}"))],
        vec![favorite],
        vec![
            button("\u{2B50} Review seller", format!("review:{id}")),
            button(
                "\u{1F4AC} Seller reviews",
                format!("seller_reviews:{}", listing.user_id),
            ),
        ],
    ])
}

/// Own listings with an all/active/sold filter row.
pub fn my_listings(listings: &[Listing], status: Option<ListingStatus>) -> InlineKeyboardMarkup {
    let filters = [
        (None, "All"),
        (Some(ListingStatus::Active), "Active"),
        (Some(ListingStatus::Sold), "Sold"),
    ];
    let filter_row = filters
        .iter()
        .map(|(f, label)| {
            let label = if *f == status {
                format!("\u{2022} {label}")
            } else {
                (*label).to_owned()
            };
            let token = f.map_or("all", |s| s.as_str());
            button(label, format!("mylistings:{token}"))
        })
        .collect();
    let mut rows = vec![filter_row];
    rows.extend(
        listings
            .iter()
            .map(|l| vec![button(ui::format_listing_short(l), format!("view:{}", l.id))]),
    );
    InlineKeyboardMarkup::new(rows)
}

/// Pagination for a seller's reviews, above the main menu.
pub fn seller_reviews(seller_id: i64, pagination: &Pagination) -> InlineKeyboardMarkup {
    let mut rows = main_menu().inline_keyboard;
    let page_row = pagination_row(&format!("seller_reviews:{seller_id}"), pagination);
    if !page_row.is_empty() {
        rows.insert(0, page_row);
    }
    InlineKeyboardMarkup::new(rows)
}

/// Reply button attached to a delivered message.
pub fn reply(sender_user_id: i64, listing_id: Option<i64>) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![button(
        "\u{21A9}\u{FE0F} Reply",
        format!("reply:{sender_user_id}:{}", listing_id.unwrap_or(0)),
    )]])
}

/// One button per listing, plus pagination.
pub fn listing_list(listings: &[Listing], page_row: Vec<InlineKeyboardButton>) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = listings
        .iter()
        .map(|l| vec![button(ui::format_listing_short(l), format!("view:{}", l.id))])
        .collect();
    if !page_row.is_empty() {
        rows.push(page_row);
    }
    InlineKeyboardMarkup::new(rows)
}

/// `« prev | n/total | next »` for `{prefix}:page:{n}`. Empty when there is one page.
pub fn pagination_row(prefix: &str, pagination: &Pagination) -> Vec<InlineKeyboardButton> {
    if pagination.total_pages <= 1 {
        return Vec::new();
    }
    let mut row = Vec::with_capacity(3);
    if pagination.has_prev() {
        row.push(button(
            "\u{00AB} prev",
            format!("{prefix}:page:{}", pagination.page.saturating_sub(1)),
        ));
    }
    row.push(button(
        format!("{}/{}", pagination.page, pagination.total_pages),
        "noop",
    ));
    if pagination.has_next() {
        row.push(button(
            "next \u{00BB}",
            format!("{prefix}:page:{}", pagination.page.saturating_add(1)),
        ));
    }
    row
}

// ---------------------------------------------------------------------------
// Admin keyboards
// ---------------------------------------------------------------------------

fn back_to_menu() -> InlineKeyboardButton {
    button("\u{25C0}\u{FE0F} Admin menu", "admin_menu")
}

/// Admin panel sections.
pub fn admin_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![button("\u{1F4CA} Dashboard", "admin_dashboard")],
        vec![
            button("\u{1F465} Users", "admin_users:all"),
            button("\u{1F4DD} Listings", "admin_listings:all"),
        ],
        vec![
            button("\u{1F4B3} Transactions", "admin_transactions:all"),
            button("\u{2B50} Reviews", "admin_reviews"),
        ],
        vec![button("\u{1F4DC} Audit log", "admin_audit:all")],
    ])
}

/// Back to the admin menu.
pub fn admin_back() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![back_to_menu()]])
}

/// User list with filter row and pagination.
pub fn admin_users(users: &[User], filter: UserFilter, pagination: &Pagination) -> InlineKeyboardMarkup {
    let filters = [
        (UserFilter::All, "All"),
        (UserFilter::Active, "Active"),
        (UserFilter::Blocked, "Blocked"),
        (UserFilter::Verified, "Verified"),
    ];
    let mut rows = vec![filters
        .iter()
        .map(|(f, label)| {
            let label = if *f == filter {
                format!("\u{2022} {label}")
            } else {
                (*label).to_owned()
            };
            button(label, format!("admin_users:{}", f.as_str()))
        })
        .collect::<Vec<_>>()];
    rows.extend(
        users
            .iter()
            .map(|u| vec![button(ui::format_admin_user_short(u), format!("admin_user:{}", u.id))]),
    );
    let page_row = pagination_row(&format!("admin_users:{}", filter.as_str()), pagination);
    if !page_row.is_empty() {
        rows.push(page_row);
    }
    rows.push(vec![back_to_menu()]);
    InlineKeyboardMarkup::new(rows)
}

/// Actions on one user.
pub fn admin_user_actions(user: &User) -> InlineKeyboardMarkup {
    let id = user.id;
    let block = if user.is_active {
        button("\u{1F6AB} Block", format!("admin_user_block:{id}"))
    } else {
        button("\u{2705} Unblock", format!("admin_user_unblock:{id}"))
    };
    InlineKeyboardMarkup::new(vec![
        vec![block, button("\u{26A0}\u{FE0F} Warn", format!("admin_user_warn:{id}"))],
        vec![
            button("\u{1F4CB} Warnings", format!("admin_user_warnings:{id}")),
            button("\u{1F4DD} Listings", format!("admin_user_listings:{id}")),
        ],
        vec![button("\u{270F}\u{FE0F} Edit profile", format!("admin_user_edit:{id}"))],
        vec![button("\u{25C0}\u{FE0F} Users", "admin_users:all")],
    ])
}

/// Profile fields an admin can change for a user.
pub fn admin_user_fields(user_id: i64) -> InlineKeyboardMarkup {
    let field = |label: &str, f: ProfileField| {
        button(label, format!("admin_user_edit:{user_id}:{}", f.as_str()))
    };
    InlineKeyboardMarkup::new(vec![
        vec![
            field("\u{1F4DE} Phone", ProfileField::Phone),
            field("\u{1F4CD} Location", ProfileField::Location),
        ],
        vec![field("\u{1F4DD} Bio", ProfileField::Bio)],
        vec![button("\u{25C0}\u{FE0F} Back", format!("admin_user:{user_id}"))],
    ])
}

/// One admin button per listing of a user, then back to the user.
pub fn admin_user_listings(user_id: i64, listings: &[Listing]) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = listings
        .iter()
        .map(|l| {
            vec![button(
                ui::format_admin_listing_short(l),
                format!("admin_listing:{}", l.id),
            )]
        })
        .collect();
    rows.push(vec![button("\u{25C0}\u{FE0F} User", format!("admin_user:{user_id}"))]);
    InlineKeyboardMarkup::new(rows)
}

/// Listing list with filter row and pagination.
pub fn admin_listings(
    listings: &[Listing],
    filter: ListingFilter,
    pagination: &Pagination,
) -> InlineKeyboardMarkup {
    let filters = [
        (ListingFilter::All, "All"),
        (ListingFilter::Active, "Active"),
        (ListingFilter::Flagged, "Flagged"),
        (ListingFilter::Deleted, "Deleted"),
    ];
    let mut rows = vec![filters
        .iter()
        .map(|(f, label)| {
            let label = if *f == filter {
                format!("\u{2022} {label}")
            } else {
                (*label).to_owned()
            };
            button(label, format!("admin_listings:{}", f.as_str()))
        })
        .collect::<Vec<_>>()];
    rows.extend(listings.iter().map(|l| {
        vec![button(
            ui::format_admin_listing_short(l),
            format!("admin_listing:{}", l.id),
        )]
    }));
    let page_row = pagination_row(&format!("admin_listings:{}", filter.as_str()), pagination);
    if !page_row.is_empty() {
        rows.push(page_row);
    }
    rows.push(vec![back_to_menu()]);
    InlineKeyboardMarkup::new(rows)
}

/// Actions on one listing.
pub fn admin_listing_actions(listing: &Listing) -> InlineKeyboardMarkup {
    let id = listing.id;
    let flag = if listing.flagged {
        button("\u{2713} Unflag", format!("admin_listing_unflag:{id}"))
    } else {
        button("\u{1F6A9} Flag", format!("admin_listing_flag:{id}"))
    };
    let mut rows = vec![
        vec![
            flag,
            button("\u{270F}\u{FE0F} Edit", format!("admin_listing_edit:{id}")),
        ],
        vec![button("\u{1F464} Seller", format!("admin_user:{}", listing.user_id))],
    ];
    if listing.status != ListingStatus::Deleted {
        rows.push(vec![button(
            "\u{1F5D1}\u{FE0F} Delete",
            format!("admin_listing_delete:{id}"),
        )]);
    }
    rows.push(vec![button("\u{25C0}\u{FE0F} Listings", "admin_listings:all")]);
    InlineKeyboardMarkup::new(rows)
}

/// Confirm or cancel a destructive action.
pub fn admin_confirm(action: ConfirmAction, id: i64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        button(
            "\u{2705} Confirm",
            format!("admin_confirm:{}:{id}", action.as_str()),
        ),
        button(
            "\u{274C} Cancel",
            format!("admin_cancel:{}:{id}", action.as_str()),
        ),
    ]])
}

/// Transaction status filters plus pagination.
pub fn admin_transactions(status: Option<&str>, pagination: &Pagination) -> InlineKeyboardMarkup {
    let current = status.unwrap_or("all");
    let filters = ["all", "pending", "completed", "cancelled", "refunded"];
    let mut rows = vec![filters
        .iter()
        .map(|f| {
            let label = if *f == current {
                format!("\u{2022} {f}")
            } else {
                (*f).to_owned()
            };
            button(label, format!("admin_transactions:{f}"))
        })
        .collect::<Vec<_>>()];
    let page_row = pagination_row(&format!("admin_transactions:{current}"), pagination);
    if !page_row.is_empty() {
        rows.push(page_row);
    }
    rows.push(vec![back_to_menu()]);
    InlineKeyboardMarkup::new(rows)
}

/// Review list with a remove button per review.
pub fn admin_reviews(reviews: &[Review], pagination: &Pagination) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = reviews
        .iter()
        .map(|r| {
            vec![button(
                format!("\u{1F5D1}\u{FE0F} Remove review #{}", r.id),
                format!("admin_review_delete:{}", r.id),
            )]
        })
        .collect();
    let page_row = pagination_row("admin_reviews", pagination);
    if !page_row.is_empty() {
        rows.push(page_row);
    }
    rows.push(vec![back_to_menu()]);
    InlineKeyboardMarkup::new(rows)
}

/// Audit group filters plus pagination.
pub fn admin_audit(group: AuditGroup, pagination: &Pagination) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = AuditGroup::ALL
        .chunks(4)
        .map(|chunk| {
            chunk
                .iter()
                .map(|g| {
                    let label = if *g == group {
                        format!("\u{2022} {}", g.as_str())
                    } else {
                        g.as_str().to_owned()
                    };
                    button(label, format!("admin_audit:{}", g.as_str()))
                })
                .collect()
        })
        .collect();
    let page_row = pagination_row(&format!("admin_audit:{}", group.as_str()), pagination);
    if !page_row.is_empty() {
        rows.push(page_row);
    }
    rows.push(vec![back_to_menu()]);
    InlineKeyboardMarkup::new(rows)
}
