use crate::model::id::CardId;
use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// CardName
///
/// The stable external name of a card, as it appears in deep-link paths.
/// Unique across the metadata set; compared case-sensitively.
///

#[derive(Clone, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct CardName(String);

impl CardName {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for CardName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl From<&str> for CardName {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for CardName {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

///
/// Card
///
/// One screen definition. A card reads rows from `tablename`, writes
/// through `basetable`, and may carry a default filter expression in
/// `reducer`. Everything the resolver does starts from one of these rows.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Card {
    pub id: CardId,
    pub name: CardName,
    /// View or table the card lists from.
    pub tablename: String,
    /// Physical table receiving writes.
    pub basetable: String,
    /// Default filter expression applied when no named filter is active.
    /// Opaque to the resolver.
    #[serde(default)]
    pub reducer: Option<String>,
    /// Whether the card is offered in the top-level menu.
    #[serde(default)]
    pub in_main_menu: bool,
    /// Authorization tag. Opaque; enforcement happens outside the resolver.
    #[serde(default)]
    pub role: Option<String>,
}
