//! HTML formatting for Telegram messages.
//!
//! All output uses HTML parse mode (never MarkdownV2) per project convention.
//! Every user-supplied string goes through [`escape_html`].

use chrono::DateTime;

use crate::admin::{AuditEntry, AuditGroup, AuditPage, Pagination};
use crate::catalog::{category_emoji, category_name, format_price};
use crate::db::{
    DashboardStats, Listing, ListingStatus, Review, SearchCriteria, Severity, Transaction, User,
    Warning,
};

/// Escape special HTML characters in user-provided text.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Cut `text` to at most `max_chars` characters, ending in `...` when cut.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Render an RFC 3339 timestamp as `dd.mm.yyyy HH:MM`, or echo it if unparsable.
pub fn format_timestamp(rfc3339: &str) -> String {
    DateTime::parse_from_rfc3339(rfc3339)
        .map(|dt| dt.format("%d.%m.%Y %H:%M").to_string())
        .unwrap_or_else(|_| rfc3339.to_owned())
}

fn rating_suffix(user: &User) -> String {
    if user.rating > 0.0 {
        format!(" \u{2B50} {:.1} ({} reviews)", user.rating, user.rating_count)
    } else {
        String::new()
    }
}

// ---------------------------------------------------------------------------
// Marketplace views
// ---------------------------------------------------------------------------

/// Full listing card shown to buyers and sellers.
pub fn format_listing_detail(listing: &Listing, seller: Option<&User>) -> String {
    let mut text = format!(
        "<b>{}</b>\n\n\u{1F4B0} <b>Price:</b> {}\n\u{1F4C1} <b>Category:</b> {} {}\n",
        escape_html(&listing.title),
        format_price(listing.price_cents),
        category_emoji(&listing.category),
        escape_html(&category_name(&listing.category)),
    );
    if let Some(location) = &listing.location {
        text.push_str(&format!("\u{1F4CD} <b>Location:</b> {}\n", escape_html(location)));
    }
    text.push_str(&format!(
        "\n\u{1F4DD} <b>Description:</b>\n{}\n",
        escape_html(listing.description.as_deref().unwrap_or("No description"))
    ));
    if let Some(seller) = seller {
        text.push_str(&format!(
            "\n\u{1F464} <b>Seller:</b> {}{}",
            escape_html(&seller.display_name()),
            rating_suffix(seller)
        ));
    }
    text.push_str(&format!("\n\n\u{1F441}\u{FE0F} Views: {}", listing.views));
    match listing.status {
        ListingStatus::Active => {}
        ListingStatus::Sold => text.push_str("\n\u{2705} Status: Sold"),
        other => text.push_str(&format!("\n\u{1F512} Status: {}", other.as_str())),
    }
    text
}

/// One-line listing label for buttons and lists.
pub fn format_listing_short(listing: &Listing) -> String {
    format!(
        "{} - {}",
        truncate(&listing.title, 30),
        format_price(listing.price_cents)
    )
}

/// The user's own profile.
pub fn format_profile(user: &User) -> String {
    let mut text = format!(
        "\u{1F464} <b>Your profile</b>\n\n<b>Name:</b> {}\n",
        escape_html(&user.display_name())
    );
    if let Some(username) = &user.username {
        text.push_str(&format!("<b>Username:</b> @{}\n", escape_html(username)));
    }
    if let Some(phone) = &user.phone {
        text.push_str(&format!("<b>Phone:</b> {}\n", escape_html(phone)));
    }
    if let Some(location) = &user.location {
        text.push_str(&format!("<b>Location:</b> {}\n", escape_html(location)));
    }
    if let Some(bio) = &user.bio {
        text.push_str(&format!("<b>About:</b> {}\n", escape_html(bio)));
    }
    if user.rating > 0.0 {
        text.push_str(&format!(
            "\n\u{2B50} <b>Rating:</b> {:.1} ({} reviews)\n",
            user.rating, user.rating_count
        ));
    }
    if user.is_verified {
        text.push_str("\u{2705} Verified seller\n");
    }
    text
}

/// Notice for a suspended user, with the recorded reason when there is one.
pub fn format_suspension(reason: Option<&str>) -> String {
    let mut text = "\u{1F6AB} Your account has been suspended.".to_owned();
    if let Some(reason) = reason.filter(|r| !r.trim().is_empty()) {
        text.push_str(&format!("\nReason: {}", escape_html(reason)));
    }
    text
}

/// Header above a page of search results.
pub fn format_search_header(criteria: &SearchCriteria, total: u64) -> String {
    let mut text = "\u{1F50D} <b>Search results</b>\n\n".to_owned();
    let mut filters = Vec::new();
    if let Some(keywords) = &criteria.keywords {
        filters.push(format!("keywords \"{}\"", escape_html(keywords)));
    }
    if let Some(category) = &criteria.category {
        filters.push(format!("category {}", escape_html(&category_name(category))));
    }
    match (criteria.min_price_cents, criteria.max_price_cents) {
        (Some(min), Some(max)) => {
            filters.push(format!("price {} - {}", format_price(min), format_price(max)));
        }
        (Some(min), None) => filters.push(format!("price from {}", format_price(min))),
        (None, Some(max)) => filters.push(format!("price up to {}", format_price(max))),
        (None, None) => {}
    }
    if !filters.is_empty() {
        text.push_str(&format!("Filters: {}\n\n", filters.join(", ")));
    }
    text.push_str(&format!("Found <b>{total}</b> listings\n"));
    text
}

/// A review line in a seller's review list.
pub fn format_review(review: &Review) -> String {
    let stars = "\u{2B50}".repeat(usize::try_from(review.rating).unwrap_or(0));
    let mut text = format!("{stars} #{} (listing #{})", review.id, review.listing_id);
    if let Some(comment) = &review.comment {
        text.push_str(&format!("\n<i>{}</i>", escape_html(&truncate(comment, 200))));
    }
    text.push_str(&format!("\n\u{1F550} {}", format_timestamp(&review.created_at)));
    text
}

// ---------------------------------------------------------------------------
// Admin views
// ---------------------------------------------------------------------------

/// Admin panel greeting.
pub fn format_admin_menu(role: &str) -> String {
    format!(
        "\u{1F6E1}\u{FE0F} <b>Admin panel</b>\n\nRole: <code>{}</code>\n\nChoose a section:",
        escape_html(role)
    )
}

/// Detailed user card for moderators.
pub fn format_admin_user(user: &User) -> String {
    let mut text = format!(
        "\u{1F464} <b>User #{}</b>\n\n<b>Name:</b> {}\n<b>Telegram ID:</b> <code>{}</code>\n",
        user.id,
        escape_html(&user.display_name()),
        user.telegram_id
    );
    if let Some(username) = &user.username {
        text.push_str(&format!("<b>Username:</b> @{}\n", escape_html(username)));
    }
    if let Some(phone) = &user.phone {
        text.push_str(&format!("<b>Phone:</b> {}\n", escape_html(phone)));
    }
    if let Some(location) = &user.location {
        text.push_str(&format!("<b>Location:</b> {}\n", escape_html(location)));
    }
    let status = if user.is_active {
        "\u{2705} Active"
    } else {
        "\u{1F6AB} Blocked"
    };
    text.push_str(&format!("\n<b>Status:</b> {status}\n"));
    if !user.is_active {
        if let Some(reason) = &user.suspension_reason {
            text.push_str(&format!("<b>Block reason:</b> {}\n", escape_html(reason)));
        }
    }
    if user.is_verified {
        text.push_str("\u{2713} <b>Verified</b>\n");
    }
    if user.rating > 0.0 {
        text.push_str(&format!(
            "\u{2B50} <b>Rating:</b> {:.1} ({})\n",
            user.rating, user.rating_count
        ));
    }
    if user.warning_count > 0 {
        text.push_str(&format!("\u{26A0}\u{FE0F} <b>Warnings:</b> {}\n", user.warning_count));
    }
    text.push_str(&format!(
        "\n<b>Registered:</b> {}",
        format_timestamp(&user.created_at)
    ));
    text
}

/// Button label for a user in an admin list.
pub fn format_admin_user_short(user: &User) -> String {
    let status = if !user.is_active {
        "\u{1F6AB} "
    } else if user.is_verified {
        "\u{2713} "
    } else {
        ""
    };
    let warnings = if user.warning_count > 0 {
        format!(" \u{26A0}\u{FE0F}{}", user.warning_count)
    } else {
        String::new()
    };
    format!("{status}{} (ID: {}){warnings}", user.display_name(), user.id)
}

/// Detailed listing card for moderators.
pub fn format_admin_listing(listing: &Listing, seller: Option<&User>) -> String {
    let mut text = format!(
        "\u{1F4DD} <b>Listing #{}</b>\n\n<b>Title:</b> {}\n<b>Price:</b> {}\n<b>Category:</b> {}\n",
        listing.id,
        escape_html(&listing.title),
        format_price(listing.price_cents),
        escape_html(&category_name(&listing.category)),
    );
    if let Some(location) = &listing.location {
        text.push_str(&format!("<b>Location:</b> {}\n", escape_html(location)));
    }
    text.push_str(&format!(
        "\n<b>Description:</b>\n{}\n",
        escape_html(listing.description.as_deref().unwrap_or("No description"))
    ));
    let status = match listing.status {
        ListingStatus::Active => "\u{1F7E2} Active",
        ListingStatus::Sold => "\u{2705} Sold",
        ListingStatus::Reserved => "\u{1F512} Reserved",
        ListingStatus::Deleted => "\u{1F5D1}\u{FE0F} Deleted",
    };
    text.push_str(&format!("\n<b>Status:</b> {status}\n"));
    if listing.flagged {
        text.push_str("\u{1F6A9} <b>FLAGGED</b>\n");
        if let Some(reason) = &listing.flag_reason {
            text.push_str(&format!("<b>Reason:</b> {}\n", escape_html(reason)));
        }
    }
    text.push_str(&format!("<b>Views:</b> {}\n", listing.views));
    match seller {
        Some(seller) => text.push_str(&format!(
            "\n<b>Seller:</b> {} (ID: {})\n",
            escape_html(&seller.display_name()),
            seller.id
        )),
        None => text.push_str(&format!("\n<b>Seller ID:</b> {}\n", listing.user_id)),
    }
    text.push_str(&format!(
        "<b>Created:</b> {}",
        format_timestamp(&listing.created_at)
    ));
    text
}

/// Button label for a listing in an admin list.
pub fn format_admin_listing_short(listing: &Listing) -> String {
    let icon = if listing.flagged {
        "\u{1F6A9} "
    } else if listing.status == ListingStatus::Deleted {
        "\u{1F5D1}\u{FE0F} "
    } else {
        ""
    };
    format!(
        "{icon}{} - {} (ID: {})",
        truncate(&listing.title, 40),
        format_price(listing.price_cents),
        listing.id
    )
}

/// Emoji for a warning severity.
pub fn severity_icon(severity: Severity) -> &'static str {
    match severity {
        Severity::Low => "\u{26A0}\u{FE0F}",
        Severity::Medium => "\u{26A0}\u{FE0F}\u{26A0}\u{FE0F}",
        Severity::High => "\u{26A0}\u{FE0F}\u{26A0}\u{FE0F}\u{26A0}\u{FE0F}",
    }
}

/// One warning.
pub fn format_warning(warning: &Warning) -> String {
    let status = if warning.is_active {
        "\u{1F7E2} Active"
    } else {
        "\u{26AB} Lifted"
    };
    let mut text = format!(
        "{} <b>Warning #{}</b>\n<b>Severity:</b> {}\n<b>Reason:</b> {}\n<b>Status:</b> {status}\n<b>Date:</b> {}",
        severity_icon(warning.severity),
        warning.id,
        warning.severity.as_str(),
        escape_html(&warning.reason),
        format_timestamp(&warning.created_at),
    );
    if let Some(expires) = &warning.expires_at {
        text.push_str(&format!("\n<b>Expires:</b> {}", format_timestamp(expires)));
    }
    text
}

/// A user's warning history.
pub fn format_warnings(user: &User, warnings: &[Warning]) -> String {
    let mut text = format!(
        "\u{26A0}\u{FE0F} <b>Warnings for {}</b>\n\n",
        escape_html(&user.display_name())
    );
    if warnings.is_empty() {
        text.push_str("No warnings.");
        return text;
    }
    let blocks: Vec<String> = warnings.iter().map(format_warning).collect();
    text.push_str(&blocks.join("\n\n"));
    text
}

/// Emoji for an audit action kind.
pub fn audit_icon(action: &str) -> &'static str {
    match action {
        "user_block" => "\u{1F6AB}",
        "user_unblock" => "\u{2705}",
        "user_warn" => "\u{26A0}\u{FE0F}",
        "listing_flag" => "\u{1F6A9}",
        "listing_unflag" => "\u{2713}",
        "listing_edit" => "\u{270F}\u{FE0F}",
        "listing_delete" => "\u{1F5D1}\u{FE0F}",
        "profile_edit" => "\u{1F464}",
        _ => "\u{1F4DD}",
    }
}

fn title_case(text: &str) -> String {
    text.split(['_', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// One audit entry: icon, action, actor, target, reason, time.
pub fn format_audit_entry(entry: &AuditEntry) -> String {
    let mut text = format!(
        "{} <b>{}</b>\n\u{1F464} <code>{}</code>\n",
        audit_icon(&entry.action),
        escape_html(&title_case(&entry.action)),
        entry.actor_id
    );
    if let (Some(target_type), Some(target_id)) = (&entry.target_type, entry.target_id) {
        text.push_str(&format!(
            "\u{1F3AF} {} #{target_id}\n",
            escape_html(&title_case(target_type))
        ));
    }
    if let Some(reason) = entry.details.get("reason").and_then(|v| v.as_str()) {
        text.push_str(&format!("\u{1F4DD} {}\n", escape_html(reason)));
    }
    text.push_str(&format!("\u{1F550} {}", format_timestamp(&entry.created_at)));
    text
}

/// A page of the audit log.
pub fn format_audit_page(page: &AuditPage, group: AuditGroup) -> String {
    let mut text = format!(
        "\u{1F4DC} <b>Audit log</b> ({})\n{}\n\n",
        group.as_str(),
        format_page_counter(&page.pagination)
    );
    if page.entries.is_empty() {
        text.push_str("No entries.");
        return text;
    }
    let blocks: Vec<String> = page.entries.iter().map(format_audit_entry).collect();
    text.push_str(&blocks.join("\n\n"));
    text
}

/// `Page 2/5 (43 total)`.
pub fn format_page_counter(pagination: &Pagination) -> String {
    format!(
        "Page {}/{} ({} total)",
        pagination.page, pagination.total_pages, pagination.total
    )
}

/// One transaction line.
pub fn format_transaction(tx: &Transaction) -> String {
    format!(
        "#{} {} listing #{} buyer {} seller {} <b>{}</b> {}",
        tx.id,
        format_price(tx.amount_cents),
        tx.listing_id,
        tx.buyer_id,
        tx.seller_id,
        tx.status.as_str(),
        format_timestamp(&tx.created_at),
    )
}

/// Dashboard counters.
pub fn format_dashboard(stats: &DashboardStats) -> String {
    let u = &stats.users;
    let l = &stats.listings;
    let t = &stats.transactions;
    [
        "\u{1F4CA} <b>Admin dashboard</b>".to_owned(),
        String::new(),
        "<b>\u{1F465} Users:</b>".to_owned(),
        format!("\u{2022} Total: {}", u.total),
        format!("\u{2022} Active: {}", u.active),
        format!("\u{2022} Blocked: {}", u.blocked),
        format!("\u{2022} Verified: {}", u.verified),
        format!("\u{2022} New today: {}", u.new_today),
        format!("\u{2022} New this week: {}", u.new_week),
        String::new(),
        "<b>\u{1F4DD} Listings:</b>".to_owned(),
        format!("\u{2022} Total: {}", l.total),
        format!("\u{2022} Active: {}", l.active),
        format!("\u{2022} Sold: {}", l.sold),
        format!("\u{2022} Flagged: {}", l.flagged),
        format!("\u{2022} New today: {}", l.new_today),
        format!("\u{2022} New this week: {}", l.new_week),
        String::new(),
        "<b>\u{1F4B3} Transactions:</b>".to_owned(),
        format!("\u{2022} Total: {}", t.total),
        format!("\u{2022} Pending: {}", t.pending),
        format!("\u{2022} Completed: {}", t.completed),
    ]
    .join("\n")
}
