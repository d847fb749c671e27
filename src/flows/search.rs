//! Building search criteria.

use crate::config::Limits;
use crate::db::SearchCriteria;
use crate::flows::{Flow, Input, Keys, Prompt, Step};
use crate::validation::{self, ValidationError};

/// Preset price ranges as `(label, "min-max")` in whole currency units.
/// A zero bound means unbounded.
pub const PRICE_RANGES: &[(&str, &str)] = &[
    ("Under $25", "0-25"),
    ("$25 - $50", "25-50"),
    ("$50 - $100", "50-100"),
    ("$100 - $500", "100-500"),
    ("$500+", "500-0"),
];

/// Choice token for a typed price range.
pub const CUSTOM_RANGE: &str = "custom";

/// Choice token for browsing every category.
pub const ALL_CATEGORIES: &str = "all";

/// Steps of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Search {
    /// Choosing how to search.
    Mode,
    /// Waiting for keywords.
    Keywords,
    /// Waiting for a category button.
    Category,
    /// Waiting for a preset range or `custom`.
    PriceRange,
    /// Waiting for a typed lower bound.
    MinPrice,
    /// Waiting for a typed upper bound.
    MaxPrice {
        /// Lower bound already entered, if any.
        min_cents: Option<i64>,
    },
}

/// Parse a `min-max` preset into optional cent bounds.
pub fn parse_range(token: &str) -> Option<(Option<i64>, Option<i64>)> {
    let (min, max) = token.split_once('-')?;
    let bound = |s: &str| -> Option<Option<i64>> {
        let units: i64 = s.trim().parse().ok()?;
        if units < 0 {
            return None;
        }
        Some((units > 0).then(|| units.saturating_mul(100)))
    };
    Some((bound(min)?, bound(max)?))
}

fn nonzero(cents: i64) -> Option<i64> {
    (cents > 0).then_some(cents)
}

impl Search {
    /// First step.
    pub fn start() -> Self {
        Self::Mode
    }
}

impl Flow for Search {
    type Output = SearchCriteria;

    fn prompt(&self, limits: &Limits) -> Prompt {
        match self {
            Self::Mode => Prompt::new("\u{1F50D} <b>Search</b>\n\nHow would you like to search?", Keys::SearchModes),
            Self::Keywords => Prompt::new(
                format!(
                    "Send search keywords (at least {} characters).",
                    limits.keywords_min
                ),
                Keys::Cancel,
            ),
            Self::Category => Prompt::new("Choose a category:", Keys::BrowseCategories),
            Self::PriceRange => Prompt::new("\u{1F4B0} Choose a price range:", Keys::PriceRanges),
            Self::MinPrice => Prompt::new(
                "Send the <b>minimum</b> price (0 for no minimum).",
                Keys::Cancel,
            ),
            Self::MaxPrice { .. } => Prompt::new(
                "Send the <b>maximum</b> price (0 for no maximum).",
                Keys::Cancel,
            ),
        }
    }

    fn advance(self, input: Input, limits: &Limits) -> Step<Self, Self::Output> {
        match (self, input) {
            (Self::Mode, Input::Choice(mode)) => match mode.as_str() {
                "keywords" => Step::next(Self::Keywords, limits),
                "category" => Step::next(Self::Category, limits),
                "price" => Step::next(Self::PriceRange, limits),
                _ => Step::retry(self, ValidationError::UnknownChoice),
            },

            (Self::Keywords, Input::Text(text)) => {
                match validation::validate_keywords(&text, limits) {
                    Ok(keywords) => Step::Done(SearchCriteria {
                        keywords: Some(keywords),
                        ..SearchCriteria::default()
                    }),
                    Err(error) => Step::retry(self, error),
                }
            }

            (Self::Category, Input::Choice(id)) if id == ALL_CATEGORIES => {
                Step::Done(SearchCriteria::default())
            }
            (Self::Category, Input::Choice(id)) => match validation::validate_category(&id) {
                Ok(category) => Step::Done(SearchCriteria {
                    category: Some(category),
                    ..SearchCriteria::default()
                }),
                Err(error) => Step::retry(self, error),
            },

            (Self::PriceRange, Input::Choice(token)) if token == CUSTOM_RANGE => {
                Step::next(Self::MinPrice, limits)
            }
            (Self::PriceRange, Input::Choice(token)) => match parse_range(&token) {
                Some((min_price_cents, max_price_cents)) => Step::Done(SearchCriteria {
                    min_price_cents,
                    max_price_cents,
                    ..SearchCriteria::default()
                }),
                None => Step::retry(self, ValidationError::UnknownChoice),
            },

            (Self::MinPrice, Input::Text(text)) => {
                match validation::parse_price(&text, limits.price_max) {
                    Ok(cents) => Step::next(
                        Self::MaxPrice {
                            min_cents: nonzero(cents),
                        },
                        limits,
                    ),
                    Err(error) => Step::retry(self, error),
                }
            }

            (Self::MaxPrice { min_cents }, Input::Text(text)) => {
                match validation::parse_price(&text, limits.price_max) {
                    Ok(cents) => {
                        let max_cents = nonzero(cents);
                        if let (Some(min), Some(max)) = (min_cents, max_cents) {
                            if max < min {
                                return Step::retry(self, ValidationError::InvertedRange);
                            }
                        }
                        Step::Done(SearchCriteria {
                            min_price_cents: min_cents,
                            max_price_cents: max_cents,
                            ..SearchCriteria::default()
                        })
                    }
                    Err(error) => Step::retry(self, error),
                }
            }

            (state, _) => {
                let expected = match state {
                    Self::Keywords | Self::MinPrice | Self::MaxPrice { .. } => "a text message",
                    Self::Mode | Self::Category | Self::PriceRange => "a choice using the buttons",
                };
                Step::retry(state, ValidationError::WrongInput { expected })
            }
        }
    }
}
