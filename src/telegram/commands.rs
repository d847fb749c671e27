//! Slash command text and menu registration.
//!
//! Each function returns an HTML-formatted response string. All output uses
//! HTML parse mode per project convention.

use teloxide::types::BotCommand;

use crate::admin::AdminGrant;
use crate::db::User;
use crate::telegram::ui::escape_html;

/// A parsed slash command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedCommand<'a> {
    /// Command name without the slash or `@bot` suffix.
    pub name: &'a str,
    /// Trimmed argument text.
    pub args: &'a str,
}

/// Split `/cmd@bot args` into name and args. Returns `None` for non-commands.
pub fn parse_command(text: &str) -> Option<ParsedCommand<'_>> {
    let without_slash = text.strip_prefix('/')?;
    let (full_command, args) = match without_slash.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, rest.trim()),
        None => (without_slash, ""),
    };
    let name = full_command.split('@').next().unwrap_or(full_command);
    if name.is_empty() {
        return None;
    }
    Some(ParsedCommand { name, args })
}

/// Commands shown in every user's menu.
pub fn user_commands() -> Vec<BotCommand> {
    vec![
        BotCommand::new("start", "Open the marketplace"),
        BotCommand::new("new", "Create a listing"),
        BotCommand::new("search", "Search listings"),
        BotCommand::new("mylistings", "Your listings"),
        BotCommand::new("favorites", "Saved listings"),
        BotCommand::new("profile", "Your profile"),
        BotCommand::new("help", "How to use the bot"),
        BotCommand::new("cancel", "Cancel the current action"),
    ]
}

/// User commands plus the admin entry, registered per admin chat.
pub fn admin_commands() -> Vec<BotCommand> {
    let mut commands = user_commands();
    commands.push(BotCommand::new("admin", "Admin panel"));
    commands
}

/// Greeting after `/start`.
pub fn handle_start(user: &User) -> String {
    format!(
        "\u{1F44B} Welcome, <b>{}</b>!\n\n\
         Buy and sell locally. Use the menu below to create a listing, \
         search, or manage your profile.",
        escape_html(&user.display_name())
    )
}

/// List all available commands.
pub fn handle_help(is_admin: bool) -> String {
    let mut lines = vec![
        "<b>Available commands:</b>",
        "",
        "/start — main menu",
        "/new — create a listing",
        "/search — search listings",
        "/mylistings — your listings",
        "/favorites — saved listings",
        "/profile — view and edit your profile",
        "/cancel — cancel the current action",
        "/help — show this message",
    ];
    if is_admin {
        lines.extend([
            "",
            "<b>Admin:</b>",
            "/admin — admin panel",
            "/grant &lt;telegram id&gt; &lt;role&gt; — grant admin access",
            "/deactivate &lt;telegram id&gt; — suspend an admin",
            "/activate &lt;telegram id&gt; — restore an admin",
            "/admins — list admin grants",
            "/setperms &lt;telegram id&gt; &lt;permission...&gt; — replace an admin's permissions",
        ]);
    }
    lines.join("\n")
}

/// Reply to `/cancel`.
pub fn handle_cancel(had_flow: bool) -> String {
    if had_flow {
        "\u{274C} Cancelled.".to_owned()
    } else {
        "Nothing to cancel.".to_owned()
    }
}

/// Confirmation after a grant change.
pub fn format_grant(grant: &AdminGrant) -> String {
    let state = if grant.active { "active" } else { "inactive" };
    let perms: Vec<&str> = grant.permissions.iter().map(String::as_str).collect();
    format!(
        "<b>Admin</b> <code>{}</code>\nRole: {}\nState: {state}\nPermissions: {}",
        grant.actor_id,
        escape_html(&grant.role),
        escape_html(&perms.join(", "))
    )
}

/// One line per grant for `/admins`.
pub fn format_grant_list(grants: &[AdminGrant]) -> String {
    if grants.is_empty() {
        return "No admin grants yet.".to_owned();
    }
    let mut text = format!("\u{1F6E1}\u{FE0F} <b>Admins</b> ({})\n", grants.len());
    for grant in grants {
        let marker = if grant.active { "\u{2705}" } else { "\u{23F8}\u{FE0F}" };
        text.push_str(&format!(
            "\n{marker} <code>{}</code> {} ({} permissions)",
            grant.actor_id,
            escape_html(&grant.role),
            grant.permissions.len()
        ));
    }
    text
}

/// Reply for unknown commands.
pub fn handle_unknown(name: &str) -> String {
    format!("Unknown command: /{}", escape_html(name))
}
