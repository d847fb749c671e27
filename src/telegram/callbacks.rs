//! Inline-button callback data.
//!
//! Data is colon separated, e.g. `view:12`, `seller_reviews:3:page:2`,
//! `admin_users:blocked:page:3`, `admin_confirm:delete_listing:7`.
//! Telegram caps callback data at 64 bytes; every token here fits.

use crate::admin::AuditGroup;
use crate::db::{
    ListingField, ListingFilter, ListingStatus, ProfileField, Severity, TransactionStatus, UserFilter,
};

/// Main menu entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    /// Start the create-listing flow.
    NewListing,
    /// Start a search.
    Search,
    /// Own listings.
    MyListings,
    /// Saved listings.
    Favorites,
    /// Own profile.
    Profile,
    /// Command help.
    Help,
}

impl MenuItem {
    /// Callback token.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewListing => "new",
            Self::Search => "search",
            Self::MyListings => "mylistings",
            Self::Favorites => "favorites",
            Self::Profile => "profile",
            Self::Help => "help",
        }
    }

    /// Parse a callback token.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(Self::NewListing),
            "search" => Some(Self::Search),
            "mylistings" => Some(Self::MyListings),
            "favorites" => Some(Self::Favorites),
            "profile" => Some(Self::Profile),
            "help" => Some(Self::Help),
            _ => None,
        }
    }
}

/// Destructive admin actions that go through a confirm step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    /// Lift a block.
    Unblock,
    /// Soft-delete a listing.
    DeleteListing,
    /// Remove a review.
    DeleteReview,
}

impl ConfirmAction {
    /// Callback token.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unblock => "unblock",
            Self::DeleteListing => "delete_listing",
            Self::DeleteReview => "delete_review",
        }
    }

    /// Parse a callback token.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "unblock" => Some(Self::Unblock),
            "delete_listing" => Some(Self::DeleteListing),
            "delete_review" => Some(Self::DeleteReview),
            _ => None,
        }
    }
}

/// Admin panel buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    /// Panel root.
    Menu,
    /// Counters.
    Dashboard,
    /// User list.
    Users {
        /// Filter.
        filter: UserFilter,
        /// Requested page.
        page: u32,
    },
    /// One user.
    User(i64),
    /// Start the block flow.
    Block(i64),
    /// Ask to confirm an unblock.
    Unblock(i64),
    /// Start the warn flow.
    Warn(i64),
    /// Warning history.
    Warnings(i64),
    /// Pick a profile field to edit on a user's behalf.
    EditUser(i64),
    /// Start the admin profile-edit flow.
    EditUserField {
        /// User being edited (`users.id`).
        user_id: i64,
        /// Field to change.
        field: ProfileField,
    },
    /// A user's listings.
    UserListings(i64),
    /// Listing list.
    Listings {
        /// Filter.
        filter: ListingFilter,
        /// Requested page.
        page: u32,
    },
    /// One listing.
    Listing(i64),
    /// Start the flag flow.
    Flag(i64),
    /// Clear a flag.
    Unflag(i64),
    /// Start the admin edit flow.
    EditListing(i64),
    /// Ask to confirm a delete.
    DeleteListing(i64),
    /// Confirmed destructive action.
    Confirm {
        /// What to do.
        action: ConfirmAction,
        /// Target id.
        id: i64,
    },
    /// Declined destructive action.
    Cancel {
        /// What was declined.
        action: ConfirmAction,
        /// Target id.
        id: i64,
    },
    /// Transaction list; `None` shows every status.
    Transactions {
        /// Status filter.
        status: Option<TransactionStatus>,
        /// Requested page.
        page: u32,
    },
    /// Recent reviews.
    Reviews {
        /// Requested page.
        page: u32,
    },
    /// Ask to confirm a review removal.
    DeleteReview(i64),
    /// Audit log.
    Audit {
        /// Action-kind group.
        group: AuditGroup,
        /// Requested page.
        page: u32,
    },
}

/// A decoded button press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    /// Main menu entry.
    Menu(MenuItem),
    /// Category picked in a flow.
    Category(String),
    /// Skip an optional step.
    Skip,
    /// Finish a repeated step.
    Done,
    /// Yes/no.
    Confirm(bool),
    /// Abort the current flow.
    Cancel,
    /// Open a listing.
    View(i64),
    /// Save a listing.
    Favorite(i64),
    /// Unsave a listing.
    Unfavorite(i64),
    /// Message a listing's seller.
    Message(i64),
    /// Reply to a user.
    Reply {
        /// Recipient (`users.id`).
        user_id: i64,
        /// Listing the thread is about; `0` in the data means none.
        listing_id: Option<i64>,
    },
    /// Review a listing's seller.
    Review(i64),
    /// Star rating.
    Rate(u8),
    /// Seller marks a listing sold.
    MarkSold(i64),
    /// Seller deletes a listing.
    Delete(i64),
    /// Seller edits a listing.
    Edit(i64),
    /// Listing field picked in the edit flow.
    Field(ListingField),
    /// Edit own profile field.
    Profile(ProfileField),
    /// Search mode picked.
    SearchMode(String),
    /// Price preset (`min-max`) or `custom`.
    PriceRange(String),
    /// Browse a page of the last search.
    ResultsPage(u32),
    /// Warning severity picked.
    Severity(Severity),
    /// Own listings; `None` shows everything but deleted ones.
    MyListings(Option<ListingStatus>),
    /// Reviews a seller has received.
    SellerReviews {
        /// Seller (`users.id`).
        seller_id: i64,
        /// Requested page.
        page: u32,
    },
    /// Informational button.
    Noop,
    /// Admin panel.
    Admin(AdminAction),
}

fn id(s: &str) -> Option<i64> {
    s.parse().ok()
}

/// Split `rest` into the part before `:page:<n>` and the page (default 1).
fn split_page(rest: &str) -> Option<(&str, u32)> {
    match rest.split_once(":page:") {
        Some((head, page)) => Some((head, page.parse().ok()?)),
        None => Some((rest, 1)),
    }
}

impl CallbackAction {
    /// Decode callback data. Unknown or malformed data yields `None`.
    pub fn parse(data: &str) -> Option<Self> {
        if data.starts_with("admin_") {
            return parse_admin(data).map(Self::Admin);
        }
        let (head, rest) = data.split_once(':').unwrap_or((data, ""));
        let action = match (head, rest) {
            ("skip", "") => Self::Skip,
            ("done", "") => Self::Done,
            ("cancel", "") => Self::Cancel,
            ("noop", "") => Self::Noop,
            ("menu", item) => Self::Menu(MenuItem::parse(item)?),
            ("cat", c) if !c.is_empty() => Self::Category(c.to_owned()),
            ("confirm", "yes") => Self::Confirm(true),
            ("confirm", "no") => Self::Confirm(false),
            ("view", n) => Self::View(id(n)?),
            ("fav", n) => Self::Favorite(id(n)?),
            ("unfav", n) => Self::Unfavorite(id(n)?),
            ("msg", n) => Self::Message(id(n)?),
            ("reply", pair) => {
                let (user, listing) = pair.split_once(':')?;
                let listing = id(listing)?;
                Self::Reply {
                    user_id: id(user)?,
                    listing_id: (listing != 0).then_some(listing),
                }
            }
            ("review", n) => Self::Review(id(n)?),
            ("rate", n) => {
                let stars: u8 = n.parse().ok()?;
                if !(1..=5).contains(&stars) {
                    return None;
                }
                Self::Rate(stars)
            }
            ("sold", n) => Self::MarkSold(id(n)?),
            ("del", n) => Self::Delete(id(n)?),
            ("edit", n) => Self::Edit(id(n)?),
            ("field", f) => Self::Field(ListingField::parse(f).ok()?),
            ("profile", f) => Self::Profile(ProfileField::parse(f).ok()?),
            ("mylistings", "all") => Self::MyListings(None),
            ("mylistings", status) => Self::MyListings(Some(ListingStatus::parse(status).ok()?)),
            ("seller_reviews", rest) => {
                let (seller, page) = split_page(rest)?;
                Self::SellerReviews {
                    seller_id: id(seller)?,
                    page,
                }
            }
            ("search", mode) if !mode.is_empty() => Self::SearchMode(mode.to_owned()),
            ("price", range) if !range.is_empty() => Self::PriceRange(range.to_owned()),
            ("results", page) => Self::ResultsPage(page.strip_prefix("page:")?.parse().ok()?),
            ("severity", level) => Self::Severity(Severity::parse(level).ok()?),
            _ => return None,
        };
        Some(action)
    }
}

fn parse_admin(data: &str) -> Option<AdminAction> {
    let (head, rest) = data.split_once(':').unwrap_or((data, ""));
    let action = match head {
        "admin_menu" => AdminAction::Menu,
        "admin_dashboard" => AdminAction::Dashboard,
        "admin_users" => {
            let (filter, page) = split_page(rest)?;
            AdminAction::Users {
                filter: UserFilter::parse(filter).ok()?,
                page,
            }
        }
        "admin_user" => AdminAction::User(id(rest)?),
        "admin_user_block" => AdminAction::Block(id(rest)?),
        "admin_user_unblock" => AdminAction::Unblock(id(rest)?),
        "admin_user_warn" => AdminAction::Warn(id(rest)?),
        "admin_user_warnings" => AdminAction::Warnings(id(rest)?),
        "admin_user_edit" => match rest.split_once(':') {
            Some((user, field)) => AdminAction::EditUserField {
                user_id: id(user)?,
                field: ProfileField::parse(field).ok()?,
            },
            None => AdminAction::EditUser(id(rest)?),
        },
        "admin_user_listings" => AdminAction::UserListings(id(rest)?),
        "admin_listings" => {
            let (filter, page) = split_page(rest)?;
            AdminAction::Listings {
                filter: ListingFilter::parse(filter).ok()?,
                page,
            }
        }
        "admin_listing" => AdminAction::Listing(id(rest)?),
        "admin_listing_flag" => AdminAction::Flag(id(rest)?),
        "admin_listing_unflag" => AdminAction::Unflag(id(rest)?),
        "admin_listing_edit" => AdminAction::EditListing(id(rest)?),
        "admin_listing_delete" => AdminAction::DeleteListing(id(rest)?),
        "admin_confirm" | "admin_cancel" => {
            let (action, target) = rest.rsplit_once(':')?;
            let action = ConfirmAction::parse(action)?;
            let id = id(target)?;
            if head == "admin_confirm" {
                AdminAction::Confirm { action, id }
            } else {
                AdminAction::Cancel { action, id }
            }
        }
        "admin_transactions" => {
            let (status, page) = split_page(rest)?;
            let status = match status {
                "all" | "" => None,
                other => Some(TransactionStatus::parse(other).ok()?),
            };
            AdminAction::Transactions { status, page }
        }
        "admin_reviews" => {
            let page = match rest {
                "" => 1,
                r => r.strip_prefix("page:")?.parse().ok()?,
            };
            AdminAction::Reviews { page }
        }
        "admin_review_delete" => AdminAction::DeleteReview(id(rest)?),
        "admin_audit" => {
            let (group, page) = split_page(rest)?;
            AdminAction::Audit {
                group: AuditGroup::parse(group).ok()?,
                page,
            }
        }
        _ => return None,
    };
    Some(action)
}
