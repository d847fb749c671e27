//! Admin panel screens. Every action goes through [`Moderation`], which
//! checks the gate and writes the audit entry.
//!
//! [`Moderation`]: crate::admin::Moderation

use tracing::info;

use crate::admin::{permissions, Privileged};
use crate::db::{StoreError, User};
use crate::flows::{
    ActiveFlow, BlockUser, EditListing, EditOutcome, EditUserProfile, FlagListing, Reasoned,
    UserProfileEdit, WarnOutcome, WarnUser,
};
use crate::telegram::callbacks::{AdminAction, ConfirmAction};
use crate::telegram::commands::{format_grant, format_grant_list};
use crate::telegram::handlers::start_flow;
use crate::telegram::ui::{self, escape_html};
use crate::telegram::{keyboards, notify, Ctx};

/// Collapse a privileged result into the value or a notice for the actor.
///
/// Denials, missing rows, and conflicts become notices; storage failures
/// stay errors.
fn settle<T>(result: Privileged<T>) -> anyhow::Result<Result<T, String>> {
    match result {
        Ok(Ok(value)) => Ok(Ok(value)),
        Ok(Err(denied)) => Ok(Err(denied.notice())),
        Err(StoreError::NotFound { entity, id }) => Ok(Err(format!("{entity} #{id} not found."))),
        Err(StoreError::Conflict(reason)) => Ok(Err(reason)),
        Err(e) => Err(e.into()),
    }
}

/// Gate check before showing a prompt that leads to a privileged write.
async fn precheck(ctx: &Ctx<'_>, permission: &str) -> anyhow::Result<Option<String>> {
    Ok(ctx
        .state
        .gate
        .authorize(ctx.actor_id, Some(permission))
        .await?
        .err()
        .map(|denied| denied.notice()))
}

/// `/admin`: show the panel root, or the denial notice.
pub(super) async fn open(ctx: &Ctx<'_>) -> anyhow::Result<()> {
    match ctx.state.moderation.open_panel(ctx.actor_id).await? {
        Ok(grant) => {
            ctx.send(ui::format_admin_menu(&grant.role), Some(keyboards::admin_menu()))
                .await
        }
        Err(denied) => ctx.send(denied.notice(), None).await,
    }
}

/// `/admins`: every grant, active first.
pub(super) async fn list_admins(ctx: &Ctx<'_>) -> anyhow::Result<()> {
    match settle(ctx.state.moderation.admins(ctx.actor_id).await)? {
        Ok(grants) => ctx.send(format_grant_list(&grants), None).await,
        Err(notice) => ctx.send(escape_html(&notice), None).await,
    }
}

/// `/grant`, `/activate`, `/deactivate`, `/setperms`.
pub(super) async fn admin_command(ctx: &Ctx<'_>, command: &str, args: &str) -> anyhow::Result<()> {
    let moderation = &ctx.state.moderation;
    let mut parts = args.split_whitespace();
    let target = parts.next().and_then(|s| s.parse::<i64>().ok());

    let result = match (command, target) {
        ("grant", Some(target)) => {
            let Some(role) = parts.next() else {
                return ctx.send(grant_usage(ctx), None).await;
            };
            moderation.grant_admin(ctx.actor_id, target, role).await
        }
        ("grant", None) => return ctx.send(grant_usage(ctx), None).await,
        ("setperms", Some(target)) => {
            let requested: Vec<String> = parts.map(str::to_owned).collect();
            moderation
                .set_admin_permissions(ctx.actor_id, target, &requested)
                .await
        }
        ("setperms", None) => {
            return ctx
                .send(
                    format!(
                        "Usage: /setperms &lt;telegram id&gt; &lt;permission...&gt;\nPermissions: {}",
                        permissions::ALL.join(", ")
                    ),
                    None,
                )
                .await
        }
        ("activate", Some(target)) => moderation.set_admin_active(ctx.actor_id, target, true).await,
        ("deactivate", Some(target)) => {
            moderation.set_admin_active(ctx.actor_id, target, false).await
        }
        (other, _) => {
            return ctx
                .send(format!("Usage: /{other} &lt;telegram id&gt;"), None)
                .await
        }
    };

    match settle(result)? {
        Ok(grant) => {
            info!(actor_id = ctx.actor_id, target = grant.actor_id, command, "admin grant changed");
            ctx.send(format_grant(&grant), None).await
        }
        Err(notice) => ctx.send(escape_html(&notice), None).await,
    }
}

fn grant_usage(ctx: &Ctx<'_>) -> String {
    let roles: Vec<&str> = ctx.state.config.admin.roles.keys().map(String::as_str).collect();
    format!(
        "Usage: /grant &lt;telegram id&gt; &lt;role&gt;\nRoles: {}",
        escape_html(&roles.join(", "))
    )
}

/// Handle an admin panel button. Returns the callback answer, if any.
pub(super) async fn handle(ctx: &Ctx<'_>, action: AdminAction) -> anyhow::Result<Option<String>> {
    let moderation = &ctx.state.moderation;
    let actor = ctx.actor_id;

    match action {
        AdminAction::Menu => match moderation.open_panel(actor).await? {
            Ok(grant) => {
                ctx.send(ui::format_admin_menu(&grant.role), Some(keyboards::admin_menu()))
                    .await?;
            }
            Err(denied) => return Ok(Some(denied.notice())),
        },
        AdminAction::Dashboard => match settle(moderation.dashboard(actor).await)? {
            Ok(stats) => {
                ctx.send(ui::format_dashboard(&stats), Some(keyboards::admin_back()))
                    .await?;
            }
            Err(notice) => return Ok(Some(notice)),
        },

        // -- users ----------------------------------------------------------
        AdminAction::Users { filter, page } => {
            match settle(moderation.users(actor, filter, page).await)? {
                Ok(paged) => {
                    let text = format!(
                        "\u{1F465} <b>Users</b> ({})\n{}",
                        filter.as_str(),
                        ui::format_page_counter(&paged.pagination)
                    );
                    ctx.send(
                        text,
                        Some(keyboards::admin_users(&paged.items, filter, &paged.pagination)),
                    )
                    .await?;
                }
                Err(notice) => return Ok(Some(notice)),
            }
        }
        AdminAction::User(user_id) => match settle(moderation.user_detail(actor, user_id).await)? {
            Ok(user) => show_user(ctx, &user).await?,
            Err(notice) => return Ok(Some(notice)),
        },
        AdminAction::Block(user_id) => {
            if let Some(notice) = precheck(ctx, permissions::BLOCK_USERS).await? {
                return Ok(Some(notice));
            }
            start_flow(ctx, ActiveFlow::BlockUser(BlockUser::start(user_id))).await?;
        }
        AdminAction::Unblock(user_id) => {
            if let Some(notice) = precheck(ctx, permissions::BLOCK_USERS).await? {
                return Ok(Some(notice));
            }
            ctx.send(
                format!("Unblock user #{user_id}?"),
                Some(keyboards::admin_confirm(ConfirmAction::Unblock, user_id)),
            )
            .await?;
        }
        AdminAction::Warn(user_id) => {
            if let Some(notice) = precheck(ctx, permissions::WARN_USERS).await? {
                return Ok(Some(notice));
            }
            start_flow(ctx, ActiveFlow::WarnUser(WarnUser::start(user_id))).await?;
        }
        AdminAction::Warnings(user_id) => {
            match settle(moderation.user_warnings(actor, user_id).await)? {
                Ok((user, warnings)) => {
                    ctx.send(
                        ui::format_warnings(&user, &warnings),
                        Some(keyboards::admin_user_actions(&user)),
                    )
                    .await?;
                }
                Err(notice) => return Ok(Some(notice)),
            }
        }
        AdminAction::EditUser(user_id) => {
            match settle(moderation.user_detail(actor, user_id).await)? {
                Ok(user) => {
                    ctx.send(
                        format!(
                            "\u{270F}\u{FE0F} Which field of <b>{}</b> should change?",
                            escape_html(&user.display_name())
                        ),
                        Some(keyboards::admin_user_fields(user.id)),
                    )
                    .await?;
                }
                Err(notice) => return Ok(Some(notice)),
            }
        }
        AdminAction::EditUserField { user_id, field } => {
            if let Some(notice) = precheck(ctx, permissions::MANAGE_USERS).await? {
                return Ok(Some(notice));
            }
            start_flow(
                ctx,
                ActiveFlow::EditUserProfile(EditUserProfile::start(user_id, field)),
            )
            .await?;
        }
        AdminAction::UserListings(user_id) => {
            match settle(moderation.user_listings(actor, user_id).await)? {
                Ok((user, listings)) => {
                    let text = if listings.is_empty() {
                        format!("<b>{}</b> has no listings.", escape_html(&user.display_name()))
                    } else {
                        format!(
                            "\u{1F4DD} <b>Listings by {}</b> ({})",
                            escape_html(&user.display_name()),
                            listings.len()
                        )
                    };
                    ctx.send(text, Some(keyboards::admin_user_listings(user.id, &listings)))
                        .await?;
                }
                Err(notice) => return Ok(Some(notice)),
            }
        }

        // -- listings -------------------------------------------------------
        AdminAction::Listings { filter, page } => {
            match settle(moderation.listings(actor, filter, page).await)? {
                Ok(paged) => {
                    let text = format!(
                        "\u{1F4DD} <b>Listings</b> ({})\n{}",
                        filter.as_str(),
                        ui::format_page_counter(&paged.pagination)
                    );
                    ctx.send(
                        text,
                        Some(keyboards::admin_listings(&paged.items, filter, &paged.pagination)),
                    )
                    .await?;
                }
                Err(notice) => return Ok(Some(notice)),
            }
        }
        AdminAction::Listing(listing_id) => {
            match settle(moderation.listing_detail(actor, listing_id).await)? {
                Ok((listing, seller)) => {
                    ctx.send(
                        ui::format_admin_listing(&listing, seller.as_ref()),
                        Some(keyboards::admin_listing_actions(&listing)),
                    )
                    .await?;
                }
                Err(notice) => return Ok(Some(notice)),
            }
        }
        AdminAction::Flag(listing_id) => {
            if let Some(notice) = precheck(ctx, permissions::MANAGE_LISTINGS).await? {
                return Ok(Some(notice));
            }
            start_flow(ctx, ActiveFlow::FlagListing(FlagListing::start(listing_id))).await?;
        }
        AdminAction::Unflag(listing_id) => {
            match settle(moderation.unflag_listing(actor, listing_id).await)? {
                Ok(listing) => {
                    ctx.send(
                        ui::format_admin_listing(&listing, None),
                        Some(keyboards::admin_listing_actions(&listing)),
                    )
                    .await?;
                    return Ok(Some("Flag cleared".to_owned()));
                }
                Err(notice) => return Ok(Some(notice)),
            }
        }
        AdminAction::EditListing(listing_id) => {
            if let Some(notice) = precheck(ctx, permissions::EDIT_ANY_LISTING).await? {
                return Ok(Some(notice));
            }
            start_flow(
                ctx,
                ActiveFlow::EditListing(EditListing::start(listing_id, true)),
            )
            .await?;
        }
        AdminAction::DeleteListing(listing_id) => {
            if let Some(notice) = precheck(ctx, permissions::DELETE_ANY_LISTING).await? {
                return Ok(Some(notice));
            }
            ctx.send(
                format!("Delete listing #{listing_id}? The seller keeps a record of it."),
                Some(keyboards::admin_confirm(ConfirmAction::DeleteListing, listing_id)),
            )
            .await?;
        }

        // -- destructive confirmations --------------------------------------
        AdminAction::Confirm { action, id } => return confirm(ctx, action, id).await,
        AdminAction::Cancel { .. } => return Ok(Some("Cancelled".to_owned())),

        // -- transactions, reviews, audit ----------------------------------
        AdminAction::Transactions { status, page } => {
            match settle(moderation.transactions(actor, status, page).await)? {
                Ok(paged) => {
                    let mut text = format!(
                        "\u{1F4B3} <b>Transactions</b>\n{}\n\n",
                        ui::format_page_counter(&paged.pagination)
                    );
                    if paged.items.is_empty() {
                        text.push_str("No transactions.");
                    } else {
                        let lines: Vec<String> =
                            paged.items.iter().map(ui::format_transaction).collect();
                        text.push_str(&lines.join("\n"));
                    }
                    ctx.send(
                        text,
                        Some(keyboards::admin_transactions(
                            status.map(|s| s.as_str()),
                            &paged.pagination,
                        )),
                    )
                    .await?;
                }
                Err(notice) => return Ok(Some(notice)),
            }
        }
        AdminAction::Reviews { page } => match settle(moderation.reviews(actor, page).await)? {
            Ok(paged) => {
                let mut text = format!(
                    "\u{2B50} <b>Reviews</b>\n{}\n\n",
                    ui::format_page_counter(&paged.pagination)
                );
                if paged.items.is_empty() {
                    text.push_str("No reviews.");
                } else {
                    let blocks: Vec<String> = paged.items.iter().map(ui::format_review).collect();
                    text.push_str(&blocks.join("\n\n"));
                }
                ctx.send(
                    text,
                    Some(keyboards::admin_reviews(&paged.items, &paged.pagination)),
                )
                .await?;
            }
            Err(notice) => return Ok(Some(notice)),
        },
        AdminAction::DeleteReview(review_id) => {
            if let Some(notice) = precheck(ctx, permissions::MANAGE_LISTINGS).await? {
                return Ok(Some(notice));
            }
            ctx.send(
                format!("Remove review #{review_id}? The seller's rating is recalculated."),
                Some(keyboards::admin_confirm(ConfirmAction::DeleteReview, review_id)),
            )
            .await?;
        }
        AdminAction::Audit { group, page } => {
            match settle(moderation.audit_log(actor, group, page).await)? {
                Ok(audit) => {
                    ctx.send(
                        ui::format_audit_page(&audit, group),
                        Some(keyboards::admin_audit(group, &audit.pagination)),
                    )
                    .await?;
                }
                Err(notice) => return Ok(Some(notice)),
            }
        }
    }
    Ok(None)
}

async fn show_user(ctx: &Ctx<'_>, user: &User) -> anyhow::Result<()> {
    ctx.send(
        ui::format_admin_user(user),
        Some(keyboards::admin_user_actions(user)),
    )
    .await
}

async fn confirm(ctx: &Ctx<'_>, action: ConfirmAction, id: i64) -> anyhow::Result<Option<String>> {
    let moderation = &ctx.state.moderation;
    match action {
        ConfirmAction::Unblock => match settle(moderation.unblock_user(ctx.actor_id, id).await)? {
            Ok(user) => {
                notify(
                    ctx.bot,
                    user.telegram_id,
                    "\u{2705} Your account has been restored.".to_owned(),
                )
                .await;
                show_user(ctx, &user).await?;
                Ok(Some("User unblocked".to_owned()))
            }
            Err(notice) => Ok(Some(notice)),
        },
        ConfirmAction::DeleteListing => {
            match settle(moderation.delete_listing(ctx.actor_id, id).await)? {
                Ok(listing) => {
                    ctx.send(
                        format!(
                            "\u{1F5D1}\u{FE0F} Listing <b>{}</b> deleted.",
                            escape_html(&listing.title)
                        ),
                        Some(keyboards::admin_back()),
                    )
                    .await?;
                    Ok(Some("Listing deleted".to_owned()))
                }
                Err(notice) => Ok(Some(notice)),
            }
        }
        ConfirmAction::DeleteReview => {
            match settle(moderation.delete_review(ctx.actor_id, id).await)? {
                Ok(review) => {
                    ctx.send(
                        format!("\u{1F5D1}\u{FE0F} Review #{} removed.", review.id),
                        Some(keyboards::admin_back()),
                    )
                    .await?;
                    Ok(Some("Review removed".to_owned()))
                }
                Err(notice) => Ok(Some(notice)),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Flow finishers
// ---------------------------------------------------------------------------

pub(super) async fn finish_block(ctx: &Ctx<'_>, outcome: Reasoned) -> anyhow::Result<()> {
    let result = ctx
        .state
        .moderation
        .block_user(ctx.actor_id, outcome.target_id, &outcome.reason)
        .await;
    match settle(result)? {
        Ok(user) => {
            notify(
                ctx.bot,
                user.telegram_id,
                ui::format_suspension(Some(&outcome.reason)),
            )
            .await;
            ctx.send("\u{2705} User blocked.", None).await?;
            show_user(ctx, &user).await
        }
        Err(notice) => ctx.send(escape_html(&notice), Some(keyboards::admin_back())).await,
    }
}

pub(super) async fn finish_user_edit(ctx: &Ctx<'_>, edit: UserProfileEdit) -> anyhow::Result<()> {
    let result = ctx
        .state
        .moderation
        .edit_user_profile(ctx.actor_id, edit.user_id, edit.field, edit.value.as_deref())
        .await;
    match settle(result)? {
        Ok(user) => {
            info!(
                actor_id = ctx.actor_id,
                user_id = user.id,
                field = edit.field.as_str(),
                "profile edited by admin"
            );
            ctx.send("\u{2705} Profile updated.", None).await?;
            show_user(ctx, &user).await
        }
        Err(notice) => ctx.send(escape_html(&notice), Some(keyboards::admin_back())).await,
    }
}

pub(super) async fn finish_warn(ctx: &Ctx<'_>, outcome: WarnOutcome) -> anyhow::Result<()> {
    let result = ctx
        .state
        .moderation
        .warn_user(ctx.actor_id, outcome.user_id, outcome.severity, &outcome.reason)
        .await;
    let warning = match settle(result)? {
        Ok(warning) => warning,
        Err(notice) => {
            return ctx
                .send(escape_html(&notice), Some(keyboards::admin_back()))
                .await
        }
    };
    let user = ctx.state.store.require_user(warning.user_id).await?;
    notify(
        ctx.bot,
        user.telegram_id,
        format!(
            "{} <b>You received a warning</b> ({})\nReason: {}",
            ui::severity_icon(warning.severity),
            warning.severity.as_str(),
            escape_html(&warning.reason)
        ),
    )
    .await;
    ctx.send("\u{2705} Warning issued.", None).await?;
    show_user(ctx, &user).await
}

pub(super) async fn finish_flag(ctx: &Ctx<'_>, outcome: Reasoned) -> anyhow::Result<()> {
    let result = ctx
        .state
        .moderation
        .flag_listing(ctx.actor_id, outcome.target_id, &outcome.reason)
        .await;
    match settle(result)? {
        Ok(listing) => {
            ctx.send(
                format!(
                    "\u{1F6A9} Listing flagged.\n\n{}",
                    ui::format_admin_listing(&listing, None)
                ),
                Some(keyboards::admin_listing_actions(&listing)),
            )
            .await
        }
        Err(notice) => ctx.send(escape_html(&notice), Some(keyboards::admin_back())).await,
    }
}

pub(super) async fn finish_edit(ctx: &Ctx<'_>, outcome: EditOutcome) -> anyhow::Result<()> {
    let result = ctx
        .state
        .moderation
        .edit_listing(ctx.actor_id, outcome.listing_id, &outcome.edit)
        .await;
    match settle(result)? {
        Ok(listing) => {
            ctx.send(
                format!(
                    "\u{2705} Listing updated.\n\n{}",
                    ui::format_admin_listing(&listing, None)
                ),
                Some(keyboards::admin_listing_actions(&listing)),
            )
            .await
        }
        Err(notice) => ctx.send(escape_html(&notice), Some(keyboards::admin_back())).await,
    }
}
