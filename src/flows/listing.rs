//! Listing creation and single-field edits.

use crate::catalog;
use crate::config::Limits;
use crate::db::{ListingEdit, ListingField, NewListing, PhotoRef};
use crate::flows::{Flow, Input, Keys, Prompt, Step};
use crate::telegram::ui::escape_html;
use crate::validation::{self, ValidationError};

/// Steps of creating a listing. Each step carries the draft so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateListing {
    /// Waiting for the title.
    Title,
    /// Waiting for an optional description.
    Description(NewListing),
    /// Waiting for the price.
    Price(NewListing),
    /// Waiting for a category button.
    Category(NewListing),
    /// Collecting photos until done or full.
    Photos(NewListing),
    /// Showing the draft for confirmation.
    Confirm(NewListing),
}

impl CreateListing {
    /// First step.
    pub fn start() -> Self {
        Self::Title
    }

    fn expected(&self) -> ValidationError {
        let expected = match self {
            Self::Title | Self::Description(_) | Self::Price(_) => "a text message",
            Self::Category(_) => "a category using the buttons",
            Self::Photos(_) => "a photo, or press Done",
            Self::Confirm(_) => "Yes or No using the buttons",
        };
        ValidationError::WrongInput { expected }
    }
}

impl Flow for CreateListing {
    /// `None` when the seller declined at the confirmation step.
    type Output = Option<NewListing>;

    fn prompt(&self, limits: &Limits) -> Prompt {
        match self {
            Self::Title => Prompt::new(
                format!(
                    "\u{1F4DD} <b>New listing</b>\n\nSend a title ({}-{} characters).",
                    limits.title_min, limits.title_max
                ),
                Keys::Cancel,
            ),
            Self::Description(_) => Prompt::new(
                format!(
                    "Send a description (up to {} characters), or press Skip.",
                    limits.description_max
                ),
                Keys::Skip,
            ),
            Self::Price(_) => Prompt::new("Send the price, e.g. <code>25.50</code>.", Keys::Cancel),
            Self::Category(_) => Prompt::new("Choose a category:", Keys::Categories),
            Self::Photos(draft) => {
                let text = if draft.photos.is_empty() {
                    format!(
                        "Send up to {} photos, or press Skip.",
                        limits.max_photos
                    )
                } else {
                    format!(
                        "Photo {}/{} added. Send another or press Done.",
                        draft.photos.len(),
                        limits.max_photos
                    )
                };
                Prompt::new(text, Keys::Photos)
            }
            Self::Confirm(draft) => {
                let description = draft.description.as_deref().unwrap_or("No description");
                Prompt::new(
                    format!(
                        "<b>{}</b>\n\n\u{1F4B0} {}\n\u{1F4C2} {} {}\n\u{1F4F7} {} photo(s)\n\n{}\n\nPublish this listing?",
                        escape_html(&draft.title),
                        catalog::format_price(draft.price_cents),
                        catalog::category_emoji(&draft.category),
                        escape_html(&catalog::category_name(&draft.category)),
                        draft.photos.len(),
                        escape_html(description),
                    ),
                    Keys::Confirm,
                )
            }
        }
    }

    fn advance(self, input: Input, limits: &Limits) -> Step<Self, Self::Output> {
        match (self, input) {
            (Self::Title, Input::Text(text)) => match validation::validate_title(&text, limits) {
                Ok(title) => Step::next(
                    Self::Description(NewListing {
                        title,
                        ..NewListing::default()
                    }),
                    limits,
                ),
                Err(error) => Step::retry(Self::Title, error),
            },

            (Self::Description(mut draft), Input::Skip) => {
                draft.description = None;
                Step::next(Self::Price(draft), limits)
            }
            (Self::Description(mut draft), Input::Text(text)) => {
                match validation::validate_description(&text, limits) {
                    Ok(description) => {
                        draft.description = description;
                        Step::next(Self::Price(draft), limits)
                    }
                    Err(error) => Step::retry(Self::Description(draft), error),
                }
            }

            (Self::Price(mut draft), Input::Text(text)) => {
                match validation::parse_price(&text, limits.price_max) {
                    Ok(cents) => {
                        draft.price_cents = cents;
                        Step::next(Self::Category(draft), limits)
                    }
                    Err(error) => Step::retry(Self::Price(draft), error),
                }
            }

            (Self::Category(mut draft), Input::Choice(id)) => {
                match validation::validate_category(&id) {
                    Ok(category) => {
                        draft.category = category;
                        Step::next(Self::Photos(draft), limits)
                    }
                    Err(error) => Step::retry(Self::Category(draft), error),
                }
            }

            (Self::Photos(mut draft), Input::Photo { file_id, unique_id }) => {
                if draft.photos.len() < limits.max_photos {
                    draft.photos.push(PhotoRef { file_id, unique_id });
                }
                if draft.photos.len() >= limits.max_photos {
                    Step::next(Self::Confirm(draft), limits)
                } else {
                    Step::next(Self::Photos(draft), limits)
                }
            }
            (Self::Photos(draft), Input::Skip) => Step::next(Self::Confirm(draft), limits),

            (Self::Confirm(draft), Input::Confirm(true)) => Step::Done(Some(draft)),
            (Self::Confirm(_), Input::Confirm(false)) => Step::Done(None),

            (state, _) => {
                let error = state.expected();
                Step::retry(state, error)
            }
        }
    }
}

/// Steps of editing one field of an existing listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditListing {
    /// Waiting for a field button.
    SelectField {
        /// Listing being edited.
        listing_id: i64,
        /// Editing through the admin panel.
        admin: bool,
    },
    /// Waiting for the field's new value.
    Value {
        /// Listing being edited.
        listing_id: i64,
        /// Editing through the admin panel.
        admin: bool,
        /// Field chosen.
        field: ListingField,
    },
}

/// A completed edit, ready for the store or the moderation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    /// Listing being edited.
    pub listing_id: i64,
    /// Route through the admin panel (permission check plus audit entry).
    pub admin: bool,
    /// The new value.
    pub edit: ListingEdit,
}

impl EditListing {
    /// Start by choosing a field.
    pub fn start(listing_id: i64, admin: bool) -> Self {
        Self::SelectField { listing_id, admin }
    }

    /// Start with the field already chosen.
    pub fn for_field(listing_id: i64, admin: bool, field: ListingField) -> Self {
        Self::Value {
            listing_id,
            admin,
            field,
        }
    }

    fn value(field: ListingField, input: Input, limits: &Limits) -> Result<ListingEdit, ValidationError> {
        match (field, input) {
            (ListingField::Title, Input::Text(text)) => {
                validation::validate_title(&text, limits).map(ListingEdit::Title)
            }
            (ListingField::Description, Input::Text(text)) => {
                validation::validate_description(&text, limits).map(ListingEdit::Description)
            }
            (ListingField::Description, Input::Skip) => Ok(ListingEdit::Description(None)),
            (ListingField::Price, Input::Text(text)) => {
                validation::parse_price(&text, limits.price_max).map(ListingEdit::Price)
            }
            (ListingField::Category, Input::Choice(id)) => {
                validation::validate_category(&id).map(ListingEdit::Category)
            }
            (ListingField::Category, _) => Err(ValidationError::WrongInput {
                expected: "a category using the buttons",
            }),
            _ => Err(ValidationError::WrongInput {
                expected: "a text message",
            }),
        }
    }
}

impl Flow for EditListing {
    type Output = EditOutcome;

    fn prompt(&self, limits: &Limits) -> Prompt {
        match self {
            Self::SelectField { .. } => {
                Prompt::new("What would you like to edit?", Keys::ListingFields)
            }
            Self::Value { field, .. } => match field {
                ListingField::Title => Prompt::new(
                    format!(
                        "Send the new title ({}-{} characters).",
                        limits.title_min, limits.title_max
                    ),
                    Keys::Cancel,
                ),
                ListingField::Description => Prompt::new(
                    format!(
                        "Send the new description (up to {} characters), or press Skip to clear it.",
                        limits.description_max
                    ),
                    Keys::Skip,
                ),
                ListingField::Price => Prompt::new("Send the new price.", Keys::Cancel),
                ListingField::Category => Prompt::new("Choose the new category:", Keys::Categories),
            },
        }
    }

    fn advance(self, input: Input, limits: &Limits) -> Step<Self, Self::Output> {
        match self {
            Self::SelectField { listing_id, admin } => match input {
                Input::Choice(name) => match ListingField::parse(&name) {
                    Ok(field) => Step::next(Self::for_field(listing_id, admin, field), limits),
                    Err(_) => Step::retry(self, ValidationError::UnknownChoice),
                },
                _ => Step::retry(
                    self,
                    ValidationError::WrongInput {
                        expected: "a field using the buttons",
                    },
                ),
            },
            Self::Value {
                listing_id,
                admin,
                field,
            } => match Self::value(field, input, limits) {
                Ok(edit) => Step::Done(EditOutcome {
                    listing_id,
                    admin,
                    edit,
                }),
                Err(error) => Step::retry(self, error),
            },
        }
    }
}
