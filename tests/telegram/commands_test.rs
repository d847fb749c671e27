//! Tests for `src/telegram/commands.rs`.

use std::collections::BTreeSet;

use bazaar::admin::AdminGrant;
use bazaar::telegram::commands::{
    admin_commands, format_grant, format_grant_list, handle_cancel, handle_help, handle_unknown,
    parse_command, user_commands,
};

#[test]
fn parse_strips_bot_suffix_and_trims_args() {
    let parsed = parse_command("/grant@bazaar_bot  42 moderator ").expect("is a command");
    assert_eq!(parsed.name, "grant");
    assert_eq!(parsed.args, "42 moderator");

    let bare = parse_command("/start").expect("is a command");
    assert_eq!(bare.name, "start");
    assert_eq!(bare.args, "");
}

#[test]
fn non_commands_are_ignored() {
    assert!(parse_command("hello").is_none());
    assert!(parse_command("/").is_none());
    assert!(parse_command("/@bot").is_none());
}

#[test]
fn admin_menu_extends_user_menu() {
    let users = user_commands();
    let admins = admin_commands();
    assert_eq!(admins.len(), users.len() + 1);
    assert!(admins.iter().any(|c| c.command == "admin"));
    assert!(!users.iter().any(|c| c.command == "admin"));
}

#[test]
fn help_mentions_admin_commands_only_for_admins() {
    assert!(!handle_help(false).contains("/admin"));
    let admin_help = handle_help(true);
    assert!(admin_help.contains("/admin"));
    assert!(admin_help.contains("/grant"));
    assert!(admin_help.contains("/admins"));
    assert!(admin_help.contains("/setperms"));
    assert!(!handle_help(false).contains("/setperms"));
}

#[test]
fn cancel_and_unknown_replies() {
    assert_eq!(handle_cancel(false), "Nothing to cancel.");
    assert!(handle_cancel(true).contains("Cancelled"));
    assert_eq!(handle_unknown("<x>"), "Unknown command: /&lt;x&gt;");
}

fn grant(actor_id: i64, active: bool) -> AdminGrant {
    AdminGrant {
        actor_id,
        role: "moderator".to_owned(),
        permissions: ["warn_users", "manage_listings"]
            .into_iter()
            .map(str::to_owned)
            .collect::<BTreeSet<_>>(),
        active,
        created_at: "2026-03-01T10:05:00.000Z".to_owned(),
        updated_at: "2026-03-01T10:05:00.000Z".to_owned(),
    }
}

#[test]
fn grant_summary_lists_permissions() {
    let grant = grant(42, false);
    let text = format_grant(&grant);
    assert!(text.contains("<code>42</code>"));
    assert!(text.contains("State: inactive"));
    assert!(text.contains("manage_listings, warn_users"));
}

#[test]
fn grant_list_shows_each_admin() {
    assert_eq!(format_grant_list(&[]), "No admin grants yet.");

    let text = format_grant_list(&[grant(7, true), grant(42, false)]);
    assert!(text.contains("<b>Admins</b> (2)"));
    assert!(text.contains("<code>7</code> moderator (2 permissions)"));
    assert!(text.contains("<code>42</code>"));
    assert_eq!(text.lines().filter(|l| l.contains("<code>")).count(), 2);
}
