//! Fixed listing categories and price formatting.

/// A listing category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    /// Stable id stored on listings and used in callback data.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Emoji shown before the name.
    pub emoji: &'static str,
}

/// All categories in menu order.
pub const CATEGORIES: &[Category] = &[
    Category { id: "electronics", name: "Electronics", emoji: "\u{1F4F1}" },
    Category { id: "clothing", name: "Clothing", emoji: "\u{1F455}" },
    Category { id: "home", name: "Home & Garden", emoji: "\u{1F3E0}" },
    Category { id: "vehicles", name: "Vehicles", emoji: "\u{1F697}" },
    Category { id: "services", name: "Services", emoji: "\u{1F527}" },
    Category { id: "jobs", name: "Jobs", emoji: "\u{1F4BC}" },
    Category { id: "pets", name: "Pets", emoji: "\u{1F43E}" },
    Category { id: "sports", name: "Sports", emoji: "\u{26BD}" },
    Category { id: "books", name: "Books", emoji: "\u{1F4DA}" },
    Category { id: "other", name: "Other", emoji: "\u{1F4E6}" },
];

/// Currency symbol prefixed to prices.
pub const CURRENCY_SYMBOL: &str = "$";

/// Look up a category by id.
pub fn category(id: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|c| c.id == id)
}

/// Display name for a category id; unknown ids are shown as-is.
pub fn category_name(id: &str) -> String {
    category(id).map_or_else(|| id.to_owned(), |c| c.name.to_owned())
}

/// Emoji for a category id, with a parcel for unknown ids.
pub fn category_emoji(id: &str) -> &'static str {
    category(id).map_or("\u{1F4E6}", |c| c.emoji)
}

/// Format cents as `$1,234.50`.
pub fn format_price(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let whole = (abs / 100).to_string();
    let frac = abs % 100;

    let mut grouped = String::with_capacity(whole.len().saturating_add(whole.len() / 3));
    for (i, ch) in whole.chars().enumerate() {
        let remaining = whole.len().saturating_sub(i);
        if i > 0 && remaining % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{CURRENCY_SYMBOL}{grouped}.{frac:02}")
}
