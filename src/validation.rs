//! Input validation for conversational flows.
//!
//! Every validator trims its input and either returns the cleaned value or a
//! [`ValidationError`] whose `Display` is shown to the user as a re-prompt.

use std::sync::LazyLock;

use regex::Regex;

use crate::catalog;
use crate::config::Limits;
use crate::db::{ProfileField, Severity};

/// User input rejected by a flow step.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Nothing was entered.
    #[error("{field} cannot be empty.")]
    Empty {
        /// Field label.
        field: &'static str,
    },

    /// Shorter than the minimum.
    #[error("{field} must be at least {min} characters.")]
    TooShort {
        /// Field label.
        field: &'static str,
        /// Minimum length in characters.
        min: usize,
    },

    /// Longer than the maximum.
    #[error("{field} cannot exceed {max} characters.")]
    TooLong {
        /// Field label.
        field: &'static str,
        /// Maximum length in characters.
        max: usize,
    },

    /// Price text is not a number.
    #[error("Please enter a valid number for the price.")]
    NotANumber,

    /// Price below zero.
    #[error("Price cannot be negative.")]
    NegativePrice,

    /// Price above the configured ceiling.
    #[error("Price cannot exceed {max}.")]
    PriceTooHigh {
        /// Formatted ceiling.
        max: String,
    },

    /// Not one of the offered choices.
    #[error("Please choose one of the offered options.")]
    UnknownChoice,

    /// Phone contains characters other than digits, spaces, `+`, `-`, `(`, `)`.
    #[error("Please enter a valid phone number.")]
    InvalidPhone,

    /// The step wanted a different kind of input.
    #[error("Please send {expected}.")]
    WrongInput {
        /// What the step expects, phrased for the user.
        expected: &'static str,
    },

    /// Minimum price exceeds maximum price.
    #[error("The maximum price must not be below the minimum price.")]
    InvertedRange,
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Trim and enforce `min..=max` characters.
fn bounded(
    text: &str,
    field: &'static str,
    min: usize,
    max: usize,
) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    let len = char_len(trimmed);
    if len < min {
        return Err(ValidationError::TooShort { field, min });
    }
    if len > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(trimmed.to_owned())
}

/// Listing title.
///
/// # Errors
///
/// Rejects empty, too short, or too long titles.
pub fn validate_title(text: &str, limits: &Limits) -> Result<String, ValidationError> {
    bounded(text, "Title", limits.title_min, limits.title_max)
}

/// Listing description; blank means "no description".
///
/// # Errors
///
/// Rejects descriptions longer than the limit.
pub fn validate_description(text: &str, limits: &Limits) -> Result<Option<String>, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if char_len(trimmed) > limits.description_max {
        return Err(ValidationError::TooLong {
            field: "Description",
            max: limits.description_max,
        });
    }
    Ok(Some(trimmed.to_owned()))
}

/// Parse a price into cents.
///
/// `$`, `,` and whitespace are ignored, so `"$1,234.5"` is 123450. More than
/// two decimals are rounded half-up.
///
/// # Errors
///
/// Rejects non-numbers, negatives, and values above `price_max` whole units.
pub fn parse_price(text: &str, price_max: i64) -> Result<i64, ValidationError> {
    let cleaned: String = text
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();

    let (negative, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.strip_prefix('+').unwrap_or(&cleaned)),
    };

    let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (whole.is_empty() && frac.is_empty()) || !all_digits(whole) || !all_digits(frac) {
        return Err(ValidationError::NotANumber);
    }

    let too_high = || ValidationError::PriceTooHigh {
        max: catalog::format_price(price_max.saturating_mul(100)),
    };

    let whole_value: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| too_high())?
    };

    let mut frac_digits = frac.bytes().map(|b| i64::from(b.saturating_sub(b'0')));
    let tens = frac_digits.next().unwrap_or(0);
    let ones = frac_digits.next().unwrap_or(0);
    let round_up = frac_digits.next().is_some_and(|d| d >= 5);

    let cents = whole_value
        .checked_mul(100)
        .and_then(|c| c.checked_add(tens.saturating_mul(10)))
        .and_then(|c| c.checked_add(ones))
        .and_then(|c| c.checked_add(i64::from(round_up)))
        .ok_or_else(too_high)?;

    if negative && cents > 0 {
        return Err(ValidationError::NegativePrice);
    }
    if cents > price_max.saturating_mul(100) {
        return Err(too_high());
    }
    Ok(cents)
}

/// Category id from a button press.
///
/// # Errors
///
/// Rejects ids not in the catalog.
pub fn validate_category(id: &str) -> Result<String, ValidationError> {
    catalog::category(id)
        .map(|c| c.id.to_owned())
        .ok_or(ValidationError::UnknownChoice)
}

/// Buyer/seller message body.
///
/// # Errors
///
/// Rejects messages outside the configured length range.
pub fn validate_message(text: &str, limits: &Limits) -> Result<String, ValidationError> {
    bounded(text, "Message", limits.message_min, limits.message_max)
}

/// Search keywords.
///
/// # Errors
///
/// Rejects queries shorter than the minimum.
pub fn validate_keywords(text: &str, limits: &Limits) -> Result<String, ValidationError> {
    bounded(text, "Search query", limits.keywords_min, 100)
}

/// Review comment; blank means "no comment".
///
/// # Errors
///
/// Rejects comments longer than the limit.
pub fn validate_comment(text: &str, limits: &Limits) -> Result<Option<String>, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if char_len(trimmed) > limits.comment_max {
        return Err(ValidationError::TooLong {
            field: "Comment",
            max: limits.comment_max,
        });
    }
    Ok(Some(trimmed.to_owned()))
}

/// Moderation reason for blocks, warnings, and flags.
///
/// # Errors
///
/// Rejects empty or overlong reasons.
pub fn validate_reason(text: &str, limits: &Limits) -> Result<String, ValidationError> {
    bounded(text, "Reason", 1, limits.reason_max)
}

/// Star rating from a button press.
///
/// # Errors
///
/// Rejects anything but `1` through `5`.
pub fn parse_rating(choice: &str) -> Result<u8, ValidationError> {
    match choice.trim().parse::<u8>() {
        Ok(n) if (1..=5).contains(&n) => Ok(n),
        _ => Err(ValidationError::UnknownChoice),
    }
}

/// Warning severity from a button press.
///
/// # Errors
///
/// Rejects unknown levels.
pub fn parse_severity(choice: &str) -> Result<Severity, ValidationError> {
    Severity::parse(choice).map_err(|_| ValidationError::UnknownChoice)
}

static PHONE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9][0-9 ()\-]{3,}$").ok());

fn is_phone(text: &str) -> bool {
    PHONE.as_ref().is_some_and(|re| re.is_match(text))
}

/// Profile field value. Blank clears the field.
///
/// # Errors
///
/// Rejects overlong values and malformed phone numbers.
pub fn validate_profile_value(
    field: ProfileField,
    text: &str,
    limits: &Limits,
) -> Result<Option<String>, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let (label, max) = match field {
        ProfileField::Phone => ("Phone", limits.phone_max),
        ProfileField::Location => ("Location", limits.location_max),
        ProfileField::Bio => ("Bio", limits.bio_max),
    };
    if char_len(trimmed) > max {
        return Err(ValidationError::TooLong { field: label, max });
    }
    if field == ProfileField::Phone && !is_phone(trimmed) {
        return Err(ValidationError::InvalidPhone);
    }
    Ok(Some(trimmed.to_owned()))
}
