use crate::{
    model::{
        action::Action,
        card::{Card, CardName},
        field::Field,
        id::CardId,
        link::ChildLink,
    },
    store::{MetadataStore, StoreError},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// MetadataSet
///
/// A flat, serializable snapshot of metadata rows. This is the exchange
/// format for fixtures and the CLI's `--metadata` file.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct MetadataSet {
    #[serde(default)]
    pub cards: Vec<Card>,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub child_links: Vec<ChildLink>,
}

///
/// MemoryStore
///
/// [`MetadataStore`] over a [`MetadataSet`] held in memory. Rows are
/// indexed by owning card at construction; reads clone rows out, so a
/// resolution pass keeps its own snapshot.
///

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    cards: BTreeMap<CardId, Card>,
    names: BTreeMap<CardName, CardId>,
    fields: BTreeMap<CardId, Vec<Field>>,
    actions: BTreeMap<CardId, Vec<Action>>,
    links: BTreeMap<CardId, Vec<ChildLink>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new(set: MetadataSet) -> Self {
        let mut store = Self::default();

        for card in set.cards {
            store.names.insert(card.name.clone(), card.id);
            store.cards.insert(card.id, card);
        }
        for field in set.fields {
            store.fields.entry(field.card_id).or_default().push(field);
        }
        for action in set.actions {
            store
                .actions
                .entry(action.card_id)
                .or_default()
                .push(action);
        }
        for link in set.child_links {
            store
                .links
                .entry(link.parent_card_id)
                .or_default()
                .push(link);
        }

        store
    }

    /// Number of card definitions held.
    #[must_use]
    pub fn card_count(&self) -> usize {
        self.cards.len()
    }
}

impl MetadataStore for MemoryStore {
    fn card_by_name(&self, name: &CardName) -> Result<Option<Card>, StoreError> {
        Ok(self
            .names
            .get(name)
            .and_then(|id| self.cards.get(id))
            .cloned())
    }

    fn card_by_id(&self, id: CardId) -> Result<Option<Card>, StoreError> {
        Ok(self.cards.get(&id).cloned())
    }

    fn fields(&self, card: CardId) -> Result<Vec<Field>, StoreError> {
        Ok(self.fields.get(&card).cloned().unwrap_or_default())
    }

    fn actions(&self, card: CardId) -> Result<Vec<Action>, StoreError> {
        Ok(self.actions.get(&card).cloned().unwrap_or_default())
    }

    fn child_links(&self, parent: CardId) -> Result<Vec<ChildLink>, StoreError> {
        Ok(self.links.get(&parent).cloned().unwrap_or_default())
    }
}
