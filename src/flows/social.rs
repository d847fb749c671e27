//! Buyer/seller messages, reviews, and profile edits.

use crate::config::Limits;
use crate::db::{NewReview, ProfileField};
use crate::flows::{Flow, Input, Keys, Prompt, Step};
use crate::validation::{self, ValidationError};

const TEXT_EXPECTED: ValidationError = ValidationError::WrongInput {
    expected: "a text message",
};

/// Writing a message to another user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageFlow {
    /// Buyer contacting a seller about a listing.
    Compose {
        /// Listing asked about.
        listing_id: i64,
        /// Recipient (`users.id`).
        to: i64,
    },
    /// Replying to a received message.
    Reply {
        /// Recipient (`users.id`).
        to: i64,
        /// Listing the thread is about, if any.
        listing_id: Option<i64>,
    },
}

/// A validated message ready to store and deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    /// Recipient (`users.id`).
    pub to: i64,
    /// Listing the message is about, if any.
    pub listing_id: Option<i64>,
    /// Body.
    pub text: String,
}

impl MessageFlow {
    fn target(self) -> (i64, Option<i64>) {
        match self {
            Self::Compose { listing_id, to } => (to, Some(listing_id)),
            Self::Reply { to, listing_id } => (to, listing_id),
        }
    }
}

impl Flow for MessageFlow {
    type Output = OutgoingMessage;

    fn prompt(&self, limits: &Limits) -> Prompt {
        let lead = match self {
            Self::Compose { .. } => "\u{2709}\u{FE0F} Write your message to the seller",
            Self::Reply { .. } => "\u{21A9}\u{FE0F} Write your reply",
        };
        Prompt::new(
            format!(
                "{lead} ({}-{} characters).",
                limits.message_min, limits.message_max
            ),
            Keys::Cancel,
        )
    }

    fn advance(self, input: Input, limits: &Limits) -> Step<Self, Self::Output> {
        let Input::Text(text) = input else {
            return Step::retry(self, TEXT_EXPECTED);
        };
        match validation::validate_message(&text, limits) {
            Ok(text) => {
                let (to, listing_id) = self.target();
                Step::Done(OutgoingMessage {
                    to,
                    listing_id,
                    text,
                })
            }
            Err(error) => Step::retry(self, error),
        }
    }
}

/// Reviewing the seller of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewFlow {
    /// Waiting for a star rating.
    Rating {
        /// Listing being reviewed.
        listing_id: i64,
    },
    /// Waiting for an optional comment.
    Comment {
        /// Listing being reviewed.
        listing_id: i64,
        /// Stars chosen.
        rating: u8,
    },
}

impl ReviewFlow {
    /// First step.
    pub fn start(listing_id: i64) -> Self {
        Self::Rating { listing_id }
    }
}

impl Flow for ReviewFlow {
    type Output = NewReview;

    fn prompt(&self, limits: &Limits) -> Prompt {
        match self {
            Self::Rating { .. } => Prompt::new("\u{2B50} Rate the seller:", Keys::Rating),
            Self::Comment { rating, .. } => Prompt::new(
                format!(
                    "{} Add a comment (up to {} characters), or press Skip.",
                    "\u{2B50}".repeat(usize::from(*rating)),
                    limits.comment_max
                ),
                Keys::Skip,
            ),
        }
    }

    fn advance(self, input: Input, limits: &Limits) -> Step<Self, Self::Output> {
        match (self, input) {
            (Self::Rating { listing_id }, Input::Choice(choice)) => {
                match validation::parse_rating(&choice) {
                    Ok(rating) => Step::next(Self::Comment { listing_id, rating }, limits),
                    Err(error) => Step::retry(self, error),
                }
            }
            (Self::Comment { listing_id, rating }, Input::Skip) => Step::Done(NewReview {
                listing_id,
                rating,
                comment: None,
            }),
            (Self::Comment { listing_id, rating }, Input::Text(text)) => {
                match validation::validate_comment(&text, limits) {
                    Ok(comment) => Step::Done(NewReview {
                        listing_id,
                        rating,
                        comment,
                    }),
                    Err(error) => Step::retry(self, error),
                }
            }
            (Self::Rating { .. }, _) => Step::retry(
                self,
                ValidationError::WrongInput {
                    expected: "a rating using the buttons",
                },
            ),
            (Self::Comment { .. }, _) => Step::retry(self, TEXT_EXPECTED),
        }
    }
}

/// Editing one field of the user's own profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileEdit {
    /// Waiting for the new value.
    Value {
        /// Field being edited.
        field: ProfileField,
    },
}

/// A validated profile change. `None` clears the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileOutcome {
    /// Field edited.
    pub field: ProfileField,
    /// New value.
    pub value: Option<String>,
}

impl ProfileEdit {
    /// Start editing `field`.
    pub fn start(field: ProfileField) -> Self {
        Self::Value { field }
    }
}

impl Flow for ProfileEdit {
    type Output = ProfileOutcome;

    fn prompt(&self, limits: &Limits) -> Prompt {
        let Self::Value { field } = self;
        let text = match field {
            ProfileField::Phone => "\u{1F4DE} Send your phone number, or press Skip to clear it.".to_owned(),
            ProfileField::Location => format!(
                "\u{1F4CD} Send your location (up to {} characters), or press Skip to clear it.",
                limits.location_max
            ),
            ProfileField::Bio => format!(
                "\u{1F4DD} Send a short bio (up to {} characters), or press Skip to clear it.",
                limits.bio_max
            ),
        };
        Prompt::new(text, Keys::Skip)
    }

    fn advance(self, input: Input, limits: &Limits) -> Step<Self, Self::Output> {
        let Self::Value { field } = self;
        match input {
            Input::Skip => Step::Done(ProfileOutcome { field, value: None }),
            Input::Text(text) => match validation::validate_profile_value(field, &text, limits) {
                Ok(value) => Step::Done(ProfileOutcome { field, value }),
                Err(error) => Step::retry(self, error),
            },
            _ => Step::retry(self, TEXT_EXPECTED),
        }
    }
}
