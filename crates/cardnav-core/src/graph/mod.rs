//! Per-card metadata graph.
//!
//! [`CardGraph::resolve`] loads one card's rows as a single logical
//! snapshot and builds the indices everything downstream navigates by:
//! field id lookup for `ord` validation, filter name lookup for `red`
//! resolution, and the shortcut path maps for keyboard prediction.
//!
//! A graph is a pure function of the snapshot it was built from. It is
//! disposable by doctrine: recomputed per resolution call, never cached
//! across calls, so it can never go stale against the store. Integrity
//! defects in the snapshot (group cycles, dangling group parents,
//! ambiguous sibling keycodes, foreign fields) fail the whole build;
//! nothing downstream ever sees a half-valid graph.

mod shortcut;


pub use shortcut::GroupKind;

use crate::{
    model::{
        action::{Action, ActionKind},
        card::{Card, CardName},
        field::Field,
        id::{ActionId, CardId, FieldId, LinkId},
        keycode::Keycode,
        link::ChildLink,
    },
    store::{MetadataStore, StoreError},
};
use serde::Serialize;
use shortcut::{chain_shown, check_sibling_keycodes, full_path, group_chain};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error as ThisError;

///
/// GraphError
///
/// Why a card graph could not be built. Everything except `UnknownCard`
/// and `Store` is a metadata integrity defect: fatal to the resolution,
/// never worked around, because guessing between ambiguous shortcuts or
/// tolerating a broken chain would produce wrong predictions.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum GraphError {
    #[error("unknown card '{name}'")]
    UnknownCard { name: CardName },

    #[error("field {field} belongs to card {owner}, not card {card}")]
    ForeignField {
        field: FieldId,
        owner: CardId,
        card: CardId,
    },

    #[error("filter name '{name}' is defined by both action {first} and action {second}")]
    DuplicateFilterName {
        name: String,
        first: ActionId,
        second: ActionId,
    },

    #[error("{kind} group chain cycles through id {id}")]
    CycleDetected { kind: GroupKind, id: u64 },

    #[error("{kind} {from} references missing group parent {to}")]
    DanglingReference { kind: GroupKind, from: u64, to: u64 },

    #[error("child link {link} targets missing card {card}")]
    MissingChildCard { link: LinkId, card: CardId },

    #[error("{kind} keycode '{keycode}' is ambiguous between siblings {first} and {second}")]
    AmbiguousShortcut {
        kind: GroupKind,
        keycode: Keycode,
        first: u64,
        second: u64,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

///
/// ShortcutTarget
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortcutTarget {
    Action(ActionId),
    Child(LinkId),
}

///
/// ShortcutHit
///
/// A resolved shortcut lookup, borrowing the matched row from the graph.
///

#[derive(Clone, Copy, Debug)]
pub enum ShortcutHit<'g> {
    Action(&'g Action),
    Child(&'g ChildLink),
}

///
/// ShortcutEntry
///
/// One human-facing line of the shortcut listing: the full key sequence,
/// what it reaches, and the label to print.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ShortcutEntry {
    pub path: Vec<Keycode>,
    pub target: ShortcutTarget,
    pub label: String,
    pub order: i32,
}

///
/// CardGraph
///

#[derive(Clone, Debug)]
pub struct CardGraph {
    card: Card,
    fields: BTreeMap<FieldId, Field>,
    actions: BTreeMap<ActionId, Action>,
    links: BTreeMap<LinkId, ChildLink>,
    filters: BTreeMap<String, ActionId>,
    action_paths: BTreeMap<Vec<Keycode>, ActionId>,
    link_paths: BTreeMap<Vec<Keycode>, LinkId>,
    paths_by_action: BTreeMap<ActionId, Vec<Keycode>>,
    menus: BTreeSet<ActionId>,
    entries: Vec<ShortcutEntry>,
}

impl CardGraph {
    /// Resolve `name` through the store and build its graph.
    pub fn resolve<S>(store: &S, name: &CardName) -> Result<Self, GraphError>
    where
        S: MetadataStore + ?Sized,
    {
        let card = store
            .card_by_name(name)?
            .ok_or_else(|| GraphError::UnknownCard { name: name.clone() })?;

        Self::build(store, card)
    }

    /// Build the graph for an already-loaded card row.
    pub(crate) fn build<S>(store: &S, card: Card) -> Result<Self, GraphError>
    where
        S: MetadataStore + ?Sized,
    {
        // Phase 1: one logical snapshot of the card's rows.
        let field_rows = store.fields(card.id)?;
        let action_rows = store.actions(card.id)?;
        let link_rows = store.child_links(card.id)?;

        // Phase 2: field index, restricted to this card.
        let mut fields = BTreeMap::new();
        for field in field_rows {
            if field.card_id != card.id {
                return Err(GraphError::ForeignField {
                    field: field.id,
                    owner: field.card_id,
                    card: card.id,
                });
            }
            fields.insert(field.id, field);
        }

        // Phase 3: arenas keyed by id.
        let actions: BTreeMap<ActionId, Action> = action_rows
            .into_iter()
            .map(|action| (action.id, action))
            .collect();
        let links: BTreeMap<LinkId, ChildLink> =
            link_rows.into_iter().map(|link| (link.id, link)).collect();

        // Phase 4: filter index over filter-kind actions.
        let mut filters = BTreeMap::new();
        for action in actions.values() {
            if action.kind == ActionKind::Filter
                && let Some(first) = filters.insert(action.name.clone(), action.id)
            {
                return Err(GraphError::DuplicateFilterName {
                    name: action.name.clone(),
                    first,
                    second: action.id,
                });
            }
        }

        let mut entries = Vec::new();

        // Phase 5: action group chains. Integrity checks run for every
        // action, keycoded or not; paths exist only for complete chains.
        let action_arena: BTreeMap<u64, &Action> = actions
            .values()
            .map(|action| (action.id.get(), action))
            .collect();
        check_sibling_keycodes(&action_arena)?;

        let mut action_paths = BTreeMap::new();
        let mut paths_by_action = BTreeMap::new();
        let mut menus = BTreeSet::new();
        for action in actions.values() {
            let chain = group_chain(&action_arena, action)?;
            if let Some(group) = action.group_id {
                menus.insert(group);
            }
            if let Some(path) = full_path(&chain) {
                if chain_shown(&chain) {
                    entries.push(ShortcutEntry {
                        path: path.clone(),
                        target: ShortcutTarget::Action(action.id),
                        label: action.display_name.clone(),
                        order: action.order,
                    });
                }
                paths_by_action.insert(action.id, path.clone());
                action_paths.insert(path, action.id);
            }
        }

        // Phase 6: child link group chains, same rules.
        let link_arena: BTreeMap<u64, &ChildLink> =
            links.values().map(|link| (link.id.get(), link)).collect();
        check_sibling_keycodes(&link_arena)?;

        let mut link_paths = BTreeMap::new();
        for link in links.values() {
            let chain = group_chain(&link_arena, link)?;
            if let Some(path) = full_path(&chain) {
                if chain_shown(&chain) {
                    entries.push(ShortcutEntry {
                        path: path.clone(),
                        target: ShortcutTarget::Child(link.id),
                        label: link.button_name.clone(),
                        order: link.order,
                    });
                }
                link_paths.insert(path, link.id);
            }
        }

        // Phase 7: stable enumeration order.
        entries.sort_by(|a, b| {
            (a.order, target_rank(a.target), target_id(a.target)).cmp(&(
                b.order,
                target_rank(b.target),
                target_id(b.target),
            ))
        });

        Ok(Self {
            card,
            fields,
            actions,
            links,
            filters,
            action_paths,
            link_paths,
            paths_by_action,
            menus,
            entries,
        })
    }

    #[must_use]
    pub const fn card(&self) -> &Card {
        &self.card
    }

    /// Field lookup for `ord` validation.
    #[must_use]
    pub fn field(&self, id: FieldId) -> Option<&Field> {
        self.fields.get(&id)
    }

    /// Filter lookup for `red` resolution. Names are exact and
    /// case-sensitive, matched after percent-decoding.
    #[must_use]
    pub fn filter(&self, name: &str) -> Option<&Action> {
        self.filters.get(name).and_then(|id| self.actions.get(id))
    }

    #[must_use]
    pub fn action(&self, id: ActionId) -> Option<&Action> {
        self.actions.get(&id)
    }

    #[must_use]
    pub fn link(&self, id: LinkId) -> Option<&ChildLink> {
        self.links.get(&id)
    }

    /// True when some child link of this card targets the given card.
    /// Hidden links count; display gating never narrows navigation.
    #[must_use]
    pub fn connects(&self, child: CardId) -> bool {
        self.links.values().any(|link| link.child_card_id == child)
    }

    /// Resolve a full shortcut path. Hidden and disabled rows resolve
    /// here too; display gating applies only to enumeration. On a
    /// cross-kind tie the action wins, deterministically.
    #[must_use]
    pub fn shortcut(&self, path: &[Keycode]) -> Option<ShortcutHit<'_>> {
        if let Some(id) = self.action_paths.get(path) {
            return self.actions.get(id).map(ShortcutHit::Action);
        }
        self.link_paths
            .get(path)
            .and_then(|id| self.links.get(id))
            .map(ShortcutHit::Child)
    }

    /// Whether `id` is a menu: an action some other action nests under.
    #[must_use]
    pub fn is_menu(&self, id: ActionId) -> bool {
        self.menus.contains(&id)
    }

    /// The full shortcut path of an action, when its chain is complete.
    #[must_use]
    pub fn action_path(&self, id: ActionId) -> Option<&[Keycode]> {
        self.paths_by_action.get(&id).map(Vec::as_slice)
    }

    /// Human-facing shortcut listing: shown rows with complete key
    /// chains, ordered by display rank then id.
    #[must_use]
    pub fn visible_shortcuts(&self) -> &[ShortcutEntry] {
        &self.entries
    }
}

const fn target_rank(target: ShortcutTarget) -> u8 {
    match target {
        ShortcutTarget::Action(_) => 0,
        ShortcutTarget::Child(_) => 1,
    }
}

const fn target_id(target: ShortcutTarget) -> u64 {
    match target {
        ShortcutTarget::Action(id) => id.get(),
        ShortcutTarget::Child(id) => id.get(),
    }
}
