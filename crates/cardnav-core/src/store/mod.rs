//! Metadata store boundary.
//!
//! The resolver never owns metadata. Cards, fields, actions, and child
//! links live in an external store; this module defines the read-only
//! trait the resolver consumes and a [`MemoryStore`] adapter over a
//! deserialized snapshot.
//!
//! Doctrine:
//! - Reads are synchronous-semantics and return finite row sets.
//! - A store errors only on store-level failure (timeout, broken read),
//!   never on "not found"; absence is an `Ok(None)` / empty `Vec`.
//! - Each graph load treats what it read as one logical snapshot. The
//!   store does not promise immutability across separate calls.

mod memory;

pub use memory::{MemoryStore, MetadataSet};

use crate::model::{
    action::Action,
    card::{Card, CardName},
    field::Field,
    id::CardId,
    link::ChildLink,
};
use thiserror::Error as ThisError;

///
/// StoreError
///
/// Infrastructure failure inside the metadata store. Distinct from the
/// integrity errors the graph layer raises about what the store returned.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum StoreError {
    #[error("metadata read timed out after {budget_ms} ms")]
    Timeout { budget_ms: u64 },

    #[error("metadata read failed: {message}")]
    Read { message: String },
}

impl StoreError {
    /// Shorthand for a read failure with a formatted message.
    pub fn read(message: impl Into<String>) -> Self {
        Self::Read {
            message: message.into(),
        }
    }
}

///
/// MetadataStore
///
/// Read-only access to the metadata rows one card resolution needs.
/// Implementations hand back owned rows so a resolution pass works on
/// its own snapshot.
///

pub trait MetadataStore {
    /// Look up a card by its URL-facing name.
    fn card_by_name(&self, name: &CardName) -> Result<Option<Card>, StoreError>;

    /// Look up a card by row id. Child links reference their target card
    /// this way.
    fn card_by_id(&self, id: CardId) -> Result<Option<Card>, StoreError>;

    /// All field rows owned by `card`.
    fn fields(&self, card: CardId) -> Result<Vec<Field>, StoreError>;

    /// All action rows owned by `card`.
    fn actions(&self, card: CardId) -> Result<Vec<Action>, StoreError>;

    /// All child links whose parent is `card`.
    fn child_links(&self, parent: CardId) -> Result<Vec<ChildLink>, StoreError>;
}
