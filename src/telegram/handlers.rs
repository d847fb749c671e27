//! User-side update handling: commands, flow driving, and marketplace buttons.

use teloxide::prelude::*;
use teloxide::types::{InputFile, ParseMode};
use tracing::{debug, info, warn};

use crate::admin::Pagination;
use crate::db::{ListingStatus, NewListing, NewReview, SearchCriteria, StoreError, User};
use crate::flows::{
    ActiveFlow, CreateListing, EditListing, EditOutcome, Flow, Input, MessageFlow,
    OutgoingMessage, ProfileEdit, ProfileOutcome, ReviewFlow, Search, Step,
};
use crate::telegram::callbacks::{CallbackAction, MenuItem};
use crate::telegram::commands::{self, parse_command};
use crate::telegram::ui::{self, escape_html};
use crate::telegram::{admin_panel, keyboards, profile_of, Ctx, SharedState};

const SUSPENDED: &str = "\u{1F6AB} Your account has been suspended.";
const EXPIRED: &str = "This action has expired.";

/// Resolve the actor's user row and build a context. A suspended actor
/// comes back as `Err` with their row, so the notice can carry the reason.
async fn context<'a>(
    bot: &'a Bot,
    state: &'a SharedState,
    from: &teloxide::types::User,
    chat: ChatId,
) -> anyhow::Result<Result<Ctx<'a>, User>> {
    let profile = profile_of(from);
    let actor_id = profile.telegram_id;
    let user = state.store.upsert_user(&profile).await?;
    // Allow-listed admins keep access so a mistaken block can be undone.
    if !user.is_active && !state.gate.is_whitelisted(actor_id) {
        debug!(actor_id, "update from suspended user");
        return Ok(Err(user));
    }
    Ok(Ok(Ctx {
        bot,
        state,
        chat,
        actor_id,
        user,
    }))
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

pub(super) async fn on_message(
    bot: &Bot,
    msg: &Message,
    from: &teloxide::types::User,
    state: &SharedState,
) -> anyhow::Result<()> {
    if !msg.chat.is_private() {
        debug!(chat_id = msg.chat.id.0, "message outside a private chat, ignoring");
        return Ok(());
    }
    let ctx = match context(bot, state, from, msg.chat.id).await? {
        Ok(ctx) => ctx,
        Err(user) => {
            let notice = ui::format_suspension(user.suspension_reason.as_deref());
            bot.send_message(msg.chat.id, notice)
                .parse_mode(ParseMode::Html)
                .await?;
            return Ok(());
        }
    };

    if let Some(text) = msg.text() {
        if let Some(command) = parse_command(text) {
            return dispatch_command(&ctx, command.name, command.args).await;
        }
    }

    let input = if let Some(text) = msg.text() {
        Input::Text(text.to_owned())
    } else if let Some(photo) = msg.photo().and_then(|sizes| sizes.last()) {
        Input::Photo {
            file_id: photo.file.id.clone(),
            unique_id: photo.file.unique_id.clone(),
        }
    } else {
        debug!(actor_id = ctx.actor_id, "unsupported message type, ignoring");
        return Ok(());
    };

    match state.flows.take(ctx.chat_key()).await {
        Some(flow) => advance(&ctx, flow, input).await,
        None => {
            ctx.send(
                "Use the menu below, or /help for a list of commands.",
                Some(keyboards::main_menu()),
            )
            .await
        }
    }
}

/// Parse and dispatch a slash command.
async fn dispatch_command(ctx: &Ctx<'_>, command: &str, args: &str) -> anyhow::Result<()> {
    match command {
        "start" => {
            ctx.send(commands::handle_start(&ctx.user), Some(keyboards::main_menu()))
                .await
        }
        "help" => open_menu(ctx, MenuItem::Help).await,
        "new" => open_menu(ctx, MenuItem::NewListing).await,
        "search" => open_menu(ctx, MenuItem::Search).await,
        "mylistings" => open_menu(ctx, MenuItem::MyListings).await,
        "favorites" => open_menu(ctx, MenuItem::Favorites).await,
        "profile" => open_menu(ctx, MenuItem::Profile).await,
        "cancel" => cancel(ctx).await,
        "admin" => admin_panel::open(ctx).await,
        "grant" | "activate" | "deactivate" | "setperms" => {
            admin_panel::admin_command(ctx, command, args).await
        }
        "admins" => admin_panel::list_admins(ctx).await,
        other => ctx.send(commands::handle_unknown(other), None).await,
    }
}

async fn open_menu(ctx: &Ctx<'_>, item: MenuItem) -> anyhow::Result<()> {
    match item {
        MenuItem::NewListing => start_flow(ctx, ActiveFlow::CreateListing(CreateListing::start())).await,
        MenuItem::Search => start_flow(ctx, ActiveFlow::Search(Search::start())).await,
        MenuItem::MyListings => my_listings(ctx, None).await,
        MenuItem::Favorites => favorites(ctx).await,
        MenuItem::Profile => {
            ctx.send(ui::format_profile(&ctx.user), Some(keyboards::profile()))
                .await
        }
        MenuItem::Help => {
            let is_admin = ctx.state.gate.is_whitelisted(ctx.actor_id);
            ctx.send(commands::handle_help(is_admin), None).await
        }
    }
}

async fn cancel(ctx: &Ctx<'_>) -> anyhow::Result<()> {
    let had_flow = ctx.state.flows.clear(ctx.chat_key()).await;
    ctx.send(commands::handle_cancel(had_flow), Some(keyboards::main_menu()))
        .await
}

/// Own listings, optionally narrowed to one status.
async fn my_listings(ctx: &Ctx<'_>, status: Option<ListingStatus>) -> anyhow::Result<()> {
    let listings = ctx.state.store.listings_by_user(ctx.user.id, status).await?;
    if listings.is_empty() && status.is_none() {
        return ctx
            .send("You have no listings yet.", Some(keyboards::main_menu()))
            .await;
    }
    let label = status.map_or("all", |s| s.as_str());
    ctx.send(
        format!("\u{1F4CB} <b>Your listings</b> ({label}, {})", listings.len()),
        Some(keyboards::my_listings(&listings, status)),
    )
    .await
}

async fn seller_reviews(ctx: &Ctx<'_>, seller_id: i64, page: u32) -> anyhow::Result<()> {
    let store = &ctx.state.store;
    let Some(seller) = store.user_by_id(seller_id).await? else {
        return ctx.send("Seller not found.", None).await;
    };
    let total = store.count_reviews_for_seller(seller_id).await?;
    let pagination = Pagination::new(total, page, ctx.state.config.limits.page_size);
    let reviews = store
        .reviews_for_seller(seller_id, pagination.page_size, pagination.offset())
        .await?;
    let mut text = format!(
        "\u{1F4AC} <b>Reviews of {}</b>\n{}\n\n",
        escape_html(&seller.display_name()),
        ui::format_page_counter(&pagination)
    );
    if reviews.is_empty() {
        text.push_str("No reviews yet.");
    } else {
        let blocks: Vec<String> = reviews.iter().map(ui::format_review).collect();
        text.push_str(&blocks.join("\n\n"));
    }
    ctx.send(text, Some(keyboards::seller_reviews(seller_id, &pagination)))
        .await
}

async fn favorites(ctx: &Ctx<'_>) -> anyhow::Result<()> {
    let listings = ctx.state.store.favorites_for_user(ctx.user.id).await?;
    if listings.is_empty() {
        return ctx
            .send("You have no saved listings.", Some(keyboards::main_menu()))
            .await;
    }
    ctx.send(
        format!("\u{2764}\u{FE0F} <b>Favorites</b> ({})", listings.len()),
        Some(keyboards::listing_list(&listings, Vec::new())),
    )
    .await
}

// ---------------------------------------------------------------------------
// Flow driving
// ---------------------------------------------------------------------------

/// Begin (or replace) the chat's flow and show its first prompt.
pub(super) async fn start_flow(ctx: &Ctx<'_>, flow: ActiveFlow) -> anyhow::Result<()> {
    let prompt = flow.prompt(&ctx.state.config.limits);
    debug!(actor_id = ctx.actor_id, flow = flow.name(), "flow started");
    ctx.state.flows.set(ctx.chat_key(), flow).await;
    ctx.send(prompt.text, Some(keyboards::for_prompt(prompt.keys)))
        .await
}

/// Feed one input to a flow. Stores the next step, or returns the output.
async fn drive<F, W>(ctx: &Ctx<'_>, flow: F, input: Input, wrap: W) -> anyhow::Result<Option<F::Output>>
where
    F: Flow,
    W: FnOnce(F) -> ActiveFlow,
{
    let limits = &ctx.state.config.limits;
    match flow.advance(input, limits) {
        Step::Next { state, prompt } => {
            ctx.state.flows.set(ctx.chat_key(), wrap(state)).await;
            ctx.send(prompt.text, Some(keyboards::for_prompt(prompt.keys)))
                .await?;
            Ok(None)
        }
        Step::Retry { state, error } => {
            let prompt = state.prompt(limits);
            ctx.state.flows.set(ctx.chat_key(), wrap(state)).await;
            ctx.send(
                format!("\u{274C} {}\n\n{}", escape_html(&error.to_string()), prompt.text),
                Some(keyboards::for_prompt(prompt.keys)),
            )
            .await?;
            Ok(None)
        }
        Step::Done(output) => Ok(Some(output)),
    }
}

/// Advance whichever flow the chat is in, finishing it when it completes.
async fn advance(ctx: &Ctx<'_>, flow: ActiveFlow, input: Input) -> anyhow::Result<()> {
    match flow {
        ActiveFlow::CreateListing(f) => {
            if let Some(draft) = drive(ctx, f, input, ActiveFlow::CreateListing).await? {
                finish_listing(ctx, draft).await?;
            }
        }
        ActiveFlow::EditListing(f) => {
            if let Some(outcome) = drive(ctx, f, input, ActiveFlow::EditListing).await? {
                finish_edit(ctx, outcome).await?;
            }
        }
        ActiveFlow::Search(f) => {
            if let Some(criteria) = drive(ctx, f, input, ActiveFlow::Search).await? {
                ctx.state
                    .flows
                    .remember_search(ctx.chat_key(), criteria.clone())
                    .await;
                show_results(ctx, &criteria, 1).await?;
            }
        }
        ActiveFlow::Message(f) => {
            if let Some(message) = drive(ctx, f, input, ActiveFlow::Message).await? {
                finish_message(ctx, message).await?;
            }
        }
        ActiveFlow::Review(f) => {
            if let Some(review) = drive(ctx, f, input, ActiveFlow::Review).await? {
                finish_review(ctx, review).await?;
            }
        }
        ActiveFlow::ProfileEdit(f) => {
            if let Some(outcome) = drive(ctx, f, input, ActiveFlow::ProfileEdit).await? {
                finish_profile(ctx, outcome).await?;
            }
        }
        ActiveFlow::WarnUser(f) => {
            if let Some(outcome) = drive(ctx, f, input, ActiveFlow::WarnUser).await? {
                admin_panel::finish_warn(ctx, outcome).await?;
            }
        }
        ActiveFlow::BlockUser(f) => {
            if let Some(outcome) = drive(ctx, f, input, ActiveFlow::BlockUser).await? {
                admin_panel::finish_block(ctx, outcome).await?;
            }
        }
        ActiveFlow::FlagListing(f) => {
            if let Some(outcome) = drive(ctx, f, input, ActiveFlow::FlagListing).await? {
                admin_panel::finish_flag(ctx, outcome).await?;
            }
        }
        ActiveFlow::EditUserProfile(f) => {
            if let Some(edit) = drive(ctx, f, input, ActiveFlow::EditUserProfile).await? {
                admin_panel::finish_user_edit(ctx, edit).await?;
            }
        }
    }
    Ok(())
}

/// Feed a button press to the active flow. Returns the callback answer.
async fn feed(ctx: &Ctx<'_>, input: Input) -> anyhow::Result<Option<String>> {
    match ctx.state.flows.take(ctx.chat_key()).await {
        Some(flow) => {
            advance(ctx, flow, input).await?;
            Ok(None)
        }
        None => Ok(Some(EXPIRED.to_owned())),
    }
}

async fn finish_listing(ctx: &Ctx<'_>, draft: Option<NewListing>) -> anyhow::Result<()> {
    let Some(mut draft) = draft else {
        return ctx
            .send("Listing discarded.", Some(keyboards::main_menu()))
            .await;
    };
    draft.location = ctx.user.location.clone();
    let listing = ctx.state.store.create_listing(ctx.user.id, &draft).await?;
    info!(
        listing_id = listing.id,
        user_id = ctx.user.id,
        photos = draft.photos.len(),
        "listing created"
    );
    ctx.send(
        format!(
            "\u{2705} <b>Listing published!</b>\n\n{}",
            ui::format_listing_detail(&listing, Some(&ctx.user))
        ),
        Some(keyboards::listing_actions(&listing, true, false)),
    )
    .await
}

async fn finish_edit(ctx: &Ctx<'_>, outcome: EditOutcome) -> anyhow::Result<()> {
    if outcome.admin {
        return admin_panel::finish_edit(ctx, outcome).await;
    }
    let Some(listing) = ctx.state.store.listing_by_id(outcome.listing_id).await? else {
        return ctx.send("Listing not found.", None).await;
    };
    if listing.user_id != ctx.user.id {
        return ctx.send("You can only edit your own listings.", None).await;
    }
    ctx.state
        .store
        .update_listing_field(listing.id, &outcome.edit)
        .await?;
    let listing = ctx.state.store.require_listing(listing.id).await?;
    info!(
        listing_id = listing.id,
        field = outcome.edit.field().as_str(),
        "listing edited by owner"
    );
    ctx.send(
        format!(
            "\u{2705} Listing updated.\n\n{}",
            ui::format_listing_detail(&listing, Some(&ctx.user))
        ),
        Some(keyboards::listing_actions(&listing, true, false)),
    )
    .await
}

async fn finish_message(ctx: &Ctx<'_>, message: OutgoingMessage) -> anyhow::Result<()> {
    let Some(recipient) = ctx.state.store.user_by_id(message.to).await? else {
        return ctx.send("Recipient not found.", None).await;
    };
    ctx.state
        .store
        .create_message(ctx.user.id, recipient.id, message.listing_id, &message.text)
        .await?;

    let about = match message.listing_id {
        Some(id) => match ctx.state.store.listing_by_id(id).await? {
            Some(listing) => format!("\nAbout: <b>{}</b>", escape_html(&listing.title)),
            None => String::new(),
        },
        None => String::new(),
    };
    let text = format!(
        "\u{2709}\u{FE0F} <b>New message from {}</b>{about}\n\n{}",
        escape_html(&ctx.user.display_name()),
        escape_html(&message.text)
    );
    let delivered = ctx
        .bot
        .send_message(ChatId(recipient.telegram_id), text)
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboards::reply(ctx.user.id, message.listing_id))
        .await;
    match delivered {
        Ok(_) => ctx.send("\u{2705} Message sent.", Some(keyboards::main_menu())).await,
        Err(e) => {
            warn!(recipient = recipient.id, error = %e, "message stored but not delivered");
            ctx.send(
                "Message saved, but it could not be delivered right now.",
                Some(keyboards::main_menu()),
            )
            .await
        }
    }
}

async fn finish_review(ctx: &Ctx<'_>, review: NewReview) -> anyhow::Result<()> {
    match ctx.state.store.create_review(ctx.user.id, &review).await {
        Ok(stored) => {
            info!(review_id = stored.id, seller_id = stored.seller_id, "review created");
            ctx.send("\u{2705} Thanks for your review!", Some(keyboards::main_menu()))
                .await
        }
        Err(StoreError::Conflict(reason)) => ctx.send(escape_html(&reason), None).await,
        Err(StoreError::NotFound { .. }) => ctx.send("Listing not found.", None).await,
        Err(e) => Err(e.into()),
    }
}

async fn finish_profile(ctx: &Ctx<'_>, outcome: ProfileOutcome) -> anyhow::Result<()> {
    ctx.state
        .store
        .update_profile_field(ctx.user.id, outcome.field, outcome.value.as_deref())
        .await?;
    let user = ctx.state.store.require_user(ctx.user.id).await?;
    ctx.send(
        format!("\u{2705} Profile updated.\n\n{}", ui::format_profile(&user)),
        Some(keyboards::profile()),
    )
    .await
}

async fn show_results(ctx: &Ctx<'_>, criteria: &SearchCriteria, page: u32) -> anyhow::Result<()> {
    let store = &ctx.state.store;
    let total = store.count_search(criteria).await?;
    let pagination = Pagination::new(total, page, ctx.state.config.limits.page_size);
    if total == 0 {
        return ctx
            .send(
                format!(
                    "{}\nNothing matched. Try another search.",
                    ui::format_search_header(criteria, 0)
                ),
                Some(keyboards::main_menu()),
            )
            .await;
    }
    let listings = store
        .search_listings(criteria, pagination.page_size, pagination.offset())
        .await?;
    ctx.send(
        format!(
            "{}{}",
            ui::format_search_header(criteria, total),
            ui::format_page_counter(&pagination)
        ),
        Some(keyboards::listing_list(
            &listings,
            keyboards::pagination_row("results", &pagination),
        )),
    )
    .await
}

// ---------------------------------------------------------------------------
// Callbacks
// ---------------------------------------------------------------------------

/// Handle a button press. Returns the text for the callback answer, if any.
pub(super) async fn on_callback(
    bot: &Bot,
    from: &teloxide::types::User,
    data: &str,
    state: &SharedState,
) -> anyhow::Result<Option<String>> {
    let chat = ChatId(super::actor_id_of(from));
    let ctx = match context(bot, state, from, chat).await? {
        Ok(ctx) => ctx,
        Err(user) => {
            let notice = ui::format_suspension(user.suspension_reason.as_deref());
            bot.send_message(chat, notice)
                .parse_mode(ParseMode::Html)
                .await?;
            return Ok(Some(SUSPENDED.to_owned()));
        }
    };
    let Some(action) = CallbackAction::parse(data) else {
        return Ok(Some("Unknown action".to_owned()));
    };

    match action {
        CallbackAction::Admin(admin) => admin_panel::handle(&ctx, admin).await,
        CallbackAction::Noop => Ok(None),
        CallbackAction::Menu(item) => {
            open_menu(&ctx, item).await?;
            Ok(None)
        }
        CallbackAction::Cancel => {
            cancel(&ctx).await?;
            Ok(None)
        }

        CallbackAction::Category(id) => feed(&ctx, Input::Choice(id)).await,
        CallbackAction::Skip | CallbackAction::Done => feed(&ctx, Input::Skip).await,
        CallbackAction::Confirm(yes) => feed(&ctx, Input::Confirm(yes)).await,
        CallbackAction::Rate(stars) => feed(&ctx, Input::Choice(stars.to_string())).await,
        CallbackAction::Field(field) => feed(&ctx, Input::Choice(field.as_str().to_owned())).await,
        CallbackAction::PriceRange(range) => feed(&ctx, Input::Choice(range)).await,
        CallbackAction::Severity(level) => {
            feed(&ctx, Input::Choice(level.as_str().to_owned())).await
        }
        CallbackAction::SearchMode(mode) => {
            advance(&ctx, ActiveFlow::Search(Search::start()), Input::Choice(mode)).await?;
            Ok(None)
        }
        CallbackAction::ResultsPage(page) => {
            match ctx.state.flows.last_search(ctx.chat_key()).await {
                Some(criteria) => {
                    show_results(&ctx, &criteria, page).await?;
                    Ok(None)
                }
                None => Ok(Some(EXPIRED.to_owned())),
            }
        }

        CallbackAction::MyListings(status) => {
            my_listings(&ctx, status).await?;
            Ok(None)
        }
        CallbackAction::SellerReviews { seller_id, page } => {
            seller_reviews(&ctx, seller_id, page).await?;
            Ok(None)
        }
        CallbackAction::View(listing_id) => view_listing(&ctx, listing_id).await,
        CallbackAction::Favorite(listing_id) => {
            if ctx.state.store.listing_by_id(listing_id).await?.is_none() {
                return Ok(Some("Listing not found.".to_owned()));
            }
            let added = ctx.state.store.add_favorite(ctx.user.id, listing_id).await?;
            Ok(Some(if added {
                "Added to favorites".to_owned()
            } else {
                "Already in favorites".to_owned()
            }))
        }
        CallbackAction::Unfavorite(listing_id) => {
            let removed = ctx
                .state
                .store
                .remove_favorite(ctx.user.id, listing_id)
                .await?;
            Ok(Some(if removed {
                "Removed from favorites".to_owned()
            } else {
                "Not in favorites".to_owned()
            }))
        }
        CallbackAction::Message(listing_id) => {
            let Some(listing) = ctx.state.store.listing_by_id(listing_id).await? else {
                return Ok(Some("Listing not found.".to_owned()));
            };
            if listing.user_id == ctx.user.id {
                return Ok(Some("This is your own listing.".to_owned()));
            }
            start_flow(
                &ctx,
                ActiveFlow::Message(MessageFlow::Compose {
                    listing_id,
                    to: listing.user_id,
                }),
            )
            .await?;
            Ok(None)
        }
        CallbackAction::Reply {
            user_id,
            listing_id,
        } => {
            start_flow(
                &ctx,
                ActiveFlow::Message(MessageFlow::Reply {
                    to: user_id,
                    listing_id,
                }),
            )
            .await?;
            Ok(None)
        }
        CallbackAction::Review(listing_id) => {
            let Some(listing) = ctx.state.store.listing_by_id(listing_id).await? else {
                return Ok(Some("Listing not found.".to_owned()));
            };
            if listing.user_id == ctx.user.id {
                return Ok(Some("You cannot review your own listing.".to_owned()));
            }
            if ctx.state.store.has_reviewed(ctx.user.id, listing_id).await? {
                return Ok(Some("You already reviewed this listing.".to_owned()));
            }
            start_flow(&ctx, ActiveFlow::Review(ReviewFlow::start(listing_id))).await?;
            Ok(None)
        }
        CallbackAction::MarkSold(listing_id) => {
            if let Some(answer) = require_owner(&ctx, listing_id).await? {
                return Ok(Some(answer));
            }
            ctx.state
                .store
                .set_listing_status(listing_id, ListingStatus::Sold)
                .await?;
            info!(listing_id, "listing marked sold");
            Ok(Some("Marked as sold".to_owned()))
        }
        CallbackAction::Delete(listing_id) => {
            if let Some(answer) = require_owner(&ctx, listing_id).await? {
                return Ok(Some(answer));
            }
            ctx.state.store.soft_delete_listing(listing_id).await?;
            info!(listing_id, "listing deleted by owner");
            Ok(Some("Listing deleted".to_owned()))
        }
        CallbackAction::Edit(listing_id) => {
            if let Some(answer) = require_owner(&ctx, listing_id).await? {
                return Ok(Some(answer));
            }
            start_flow(
                &ctx,
                ActiveFlow::EditListing(EditListing::start(listing_id, false)),
            )
            .await?;
            Ok(None)
        }
        CallbackAction::Profile(field) => {
            start_flow(&ctx, ActiveFlow::ProfileEdit(ProfileEdit::start(field))).await?;
            Ok(None)
        }
    }
}

/// `Some(answer)` unless the actor owns the listing.
async fn require_owner(ctx: &Ctx<'_>, listing_id: i64) -> anyhow::Result<Option<String>> {
    match ctx.state.store.listing_by_id(listing_id).await? {
        Some(listing) if listing.user_id == ctx.user.id => Ok(None),
        Some(_) => Ok(Some("You can only manage your own listings.".to_owned())),
        None => Ok(Some("Listing not found.".to_owned())),
    }
}

async fn view_listing(ctx: &Ctx<'_>, listing_id: i64) -> anyhow::Result<Option<String>> {
    let store = &ctx.state.store;
    let Some(mut listing) = store.listing_by_id(listing_id).await? else {
        return Ok(Some("Listing not found.".to_owned()));
    };
    let is_owner = listing.user_id == ctx.user.id;
    if listing.status == ListingStatus::Deleted && !is_owner {
        return Ok(Some("Listing not found.".to_owned()));
    }
    if !is_owner {
        store.increment_views(listing_id).await?;
        listing.views = listing.views.saturating_add(1);
    }
    let seller = store.user_by_id(listing.user_id).await?;
    let is_favorite = store.is_favorite(ctx.user.id, listing_id).await?;

    let photos = store.photos_for_listing(listing_id).await?;
    if let Some(photo) = photos.first() {
        if let Err(e) = ctx
            .bot
            .send_photo(ctx.chat, InputFile::file_id(photo.file_id.clone()))
            .await
        {
            warn!(listing_id, error = %e, "failed to send listing photo");
        }
    }

    ctx.send(
        ui::format_listing_detail(&listing, seller.as_ref()),
        Some(keyboards::listing_actions(&listing, is_owner, is_favorite)),
    )
    .await?;
    Ok(None)
}
