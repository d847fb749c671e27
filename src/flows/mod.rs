//! Multi-step conversations.
//!
//! Each flow is an enum whose variants are its steps. [`Flow::advance`] is a
//! pure transition: it consumes the current step plus one [`Input`] and
//! yields the next step, the same step with a validation error, or the
//! flow's output. Handlers own all I/O; flows never touch the store.
//!
//! [`FlowStore`] keeps at most one active flow per chat.

mod listing;
mod moderation;
mod search;
mod social;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

pub use listing::{CreateListing, EditListing, EditOutcome};
pub use moderation::{
    BlockUser, EditUserProfile, FlagListing, Reasoned, UserProfileEdit, WarnOutcome, WarnUser,
};
pub use search::{parse_range, Search, ALL_CATEGORIES, CUSTOM_RANGE, PRICE_RANGES};
pub use social::{MessageFlow, OutgoingMessage, ProfileEdit, ProfileOutcome, ReviewFlow};

use crate::config::Limits;
use crate::db::SearchCriteria;
use crate::validation::ValidationError;

/// One piece of user input, already decoded from a Telegram update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Free text.
    Text(String),
    /// A photo upload (largest size).
    Photo {
        /// Telegram file id.
        file_id: String,
        /// Telegram unique file id.
        unique_id: String,
    },
    /// An inline-button choice, e.g. a category id or a rating.
    Choice(String),
    /// Skip the current optional step, or finish a repeated one.
    Skip,
    /// Yes/no confirmation.
    Confirm(bool),
}

/// Which inline keyboard accompanies a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keys {
    /// Only a cancel button.
    Cancel,
    /// Skip plus cancel.
    Skip,
    /// Category grid.
    Categories,
    /// Category grid with an "all categories" entry.
    BrowseCategories,
    /// Price range presets.
    PriceRanges,
    /// Done once photos are attached, skip before.
    Photos,
    /// Yes/no.
    Confirm,
    /// One to five stars.
    Rating,
    /// Warning severity levels.
    Severity,
    /// Editable listing fields.
    ListingFields,
    /// Search modes.
    SearchModes,
}

/// What to ask the user next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// HTML message text.
    pub text: String,
    /// Keyboard to attach.
    pub keys: Keys,
}

impl Prompt {
    /// Build a prompt.
    pub fn new(text: impl Into<String>, keys: Keys) -> Self {
        Self {
            text: text.into(),
            keys,
        }
    }
}

/// Result of feeding one input to a flow.
#[derive(Debug, Clone, PartialEq)]
pub enum Step<S, O> {
    /// Moved to a new step.
    Next {
        /// The new step.
        state: S,
        /// What to ask.
        prompt: Prompt,
    },
    /// Input rejected; the step is unchanged.
    Retry {
        /// The unchanged step.
        state: S,
        /// Why the input was rejected.
        error: ValidationError,
    },
    /// The flow produced its output and is over.
    Done(O),
}

/// A conversational flow.
pub trait Flow: Sized {
    /// Value produced when the flow completes.
    type Output;

    /// Prompt for the current step.
    fn prompt(&self, limits: &Limits) -> Prompt;

    /// Consume one input.
    fn advance(self, input: Input, limits: &Limits) -> Step<Self, Self::Output>;
}

impl<S: Flow> Step<S, S::Output> {
    /// Move to `state`, prompting for it.
    pub fn next(state: S, limits: &Limits) -> Self {
        let prompt = state.prompt(limits);
        Self::Next { state, prompt }
    }

    /// Stay on `state` with an error.
    pub fn retry(state: S, error: ValidationError) -> Self {
        Self::Retry { state, error }
    }
}

/// Any flow a chat can be in.
#[derive(Debug, Clone, PartialEq)]
pub enum ActiveFlow {
    /// Creating a listing.
    CreateListing(CreateListing),
    /// Editing one listing field.
    EditListing(EditListing),
    /// Building a search.
    Search(Search),
    /// Writing to another user.
    Message(MessageFlow),
    /// Reviewing a seller.
    Review(ReviewFlow),
    /// Editing an own profile field.
    ProfileEdit(ProfileEdit),
    /// Admin: warning a user.
    WarnUser(WarnUser),
    /// Admin: blocking a user.
    BlockUser(BlockUser),
    /// Admin: flagging a listing.
    FlagListing(FlagListing),
    /// Admin: changing a user's profile field.
    EditUserProfile(EditUserProfile),
}

impl ActiveFlow {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateListing(_) => "create_listing",
            Self::EditListing(_) => "edit_listing",
            Self::Search(_) => "search",
            Self::Message(_) => "message",
            Self::Review(_) => "review",
            Self::ProfileEdit(_) => "profile_edit",
            Self::WarnUser(_) => "warn_user",
            Self::BlockUser(_) => "block_user",
            Self::FlagListing(_) => "flag_listing",
            Self::EditUserProfile(_) => "edit_user_profile",
        }
    }

    /// Prompt for whatever step the flow is on.
    pub fn prompt(&self, limits: &Limits) -> Prompt {
        match self {
            Self::CreateListing(f) => f.prompt(limits),
            Self::EditListing(f) => f.prompt(limits),
            Self::Search(f) => f.prompt(limits),
            Self::Message(f) => f.prompt(limits),
            Self::Review(f) => f.prompt(limits),
            Self::ProfileEdit(f) => f.prompt(limits),
            Self::WarnUser(f) => f.prompt(limits),
            Self::BlockUser(f) => f.prompt(limits),
            Self::FlagListing(f) => f.prompt(limits),
            Self::EditUserProfile(f) => f.prompt(limits),
        }
    }
}

/// Per-chat flow state, plus the last search so result pages can be browsed.
///
/// Keys are Telegram user ids; the bot only converses in private chats.
#[derive(Clone, Default)]
pub struct FlowStore {
    inner: Arc<Mutex<HashMap<i64, ActiveFlow>>>,
    searches: Arc<Mutex<HashMap<i64, SearchCriteria>>>,
}

impl FlowStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or replace) the chat's flow.
    pub async fn set(&self, chat_id: i64, flow: ActiveFlow) {
        self.inner.lock().await.insert(chat_id, flow);
    }

    /// Remove and return the chat's flow so it can be advanced.
    pub async fn take(&self, chat_id: i64) -> Option<ActiveFlow> {
        self.inner.lock().await.remove(&chat_id)
    }

    /// Copy of the chat's flow, if any.
    pub async fn get(&self, chat_id: i64) -> Option<ActiveFlow> {
        self.inner.lock().await.get(&chat_id).cloned()
    }

    /// Cancel the chat's flow and forget its saved search. Returns whether
    /// a flow was active.
    pub async fn clear(&self, chat_id: i64) -> bool {
        self.searches.lock().await.remove(&chat_id);
        self.inner.lock().await.remove(&chat_id).is_some()
    }

    /// Keep a finished search for paging.
    pub async fn remember_search(&self, chat_id: i64, criteria: SearchCriteria) {
        self.searches.lock().await.insert(chat_id, criteria);
    }

    /// The chat's most recent search.
    pub async fn last_search(&self, chat_id: i64) -> Option<SearchCriteria> {
        self.searches.lock().await.get(&chat_id).cloned()
    }

    /// Number of chats mid-flow.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    /// True when no chat is mid-flow.
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}
