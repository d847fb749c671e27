//! Permission tokens checked by the gate.
//!
//! Grants store plain strings, so these are the spellings privileged
//! operations ask for. Unknown strings in a grant are kept and ignored.

/// Browse, edit profiles of and list users.
pub const MANAGE_USERS: &str = "manage_users";
/// Flag listings, remove reviews, browse the listing panel.
pub const MANAGE_LISTINGS: &str = "manage_listings";
/// Browse transactions.
pub const MANAGE_TRANSACTIONS: &str = "manage_transactions";
/// Open the dashboard.
pub const VIEW_ANALYTICS: &str = "view_analytics";
/// Grant, activate, and deactivate other admins.
pub const MANAGE_ADMINS: &str = "manage_admins";
/// Read the audit log.
pub const VIEW_AUDIT_LOG: &str = "view_audit_log";
/// Edit any seller's listing.
pub const EDIT_ANY_LISTING: &str = "edit_any_listing";
/// Soft-delete any seller's listing.
pub const DELETE_ANY_LISTING: &str = "delete_any_listing";
/// Block and unblock users.
pub const BLOCK_USERS: &str = "block_users";
/// Issue warnings.
pub const WARN_USERS: &str = "warn_users";

/// Every known token.
pub const ALL: &[&str] = &[
    MANAGE_USERS,
    MANAGE_LISTINGS,
    MANAGE_TRANSACTIONS,
    VIEW_ANALYTICS,
    MANAGE_ADMINS,
    VIEW_AUDIT_LOG,
    EDIT_ANY_LISTING,
    DELETE_ANY_LISTING,
    BLOCK_USERS,
    WARN_USERS,
];
