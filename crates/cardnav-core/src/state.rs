//! Navigation request and state types.
//!
//! A [`NavigationRequest`] is what the URL codec produces: names and ids
//! straight out of the deep link, untouched by metadata. A
//! [`NavigationState`] is the validated product of resolution. States are
//! never mutated in place; every transition builds a new value.

use crate::model::{
    card::CardName,
    id::{ActionId, FieldId, RecordId},
};
use serde::{Deserialize, Serialize};

///
/// SortDirection
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

///
/// SortSpec
///
/// Ordered sort keys for one card, leftmost key has highest precedence.
/// Field references are by globally unique field id, exactly as `ord=`
/// tokens carry them.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct SortSpec {
    pub keys: Vec<(FieldId, SortDirection)>,
}

impl SortSpec {
    #[must_use]
    pub const fn new() -> Self {
        Self { keys: Vec::new() }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

///
/// ContextFrame
///
/// One level of child navigation: the card we descended from and the
/// record selected on it when we did.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ContextFrame {
    pub card: CardName,
    pub parent_record: RecordId,
}

///
/// NavigationRequest
///
/// The decoded form of a deep link. Purely syntactic: card names, field
/// ids, and record ids are carried as written and only checked against
/// metadata by the state resolver.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct NavigationRequest {
    /// First path segment: the outermost card.
    pub root: CardName,
    /// Each `(parentRecord, childCard)` pair the path descends through,
    /// outermost first.
    pub descents: Vec<(RecordId, CardName)>,
    pub sort: SortSpec,
    pub filter: Option<String>,
    pub selected: Option<RecordId>,
}

impl NavigationRequest {
    /// A request for a bare card path with no query parts.
    #[must_use]
    pub fn card(root: impl Into<CardName>) -> Self {
        Self {
            root: root.into(),
            descents: Vec::new(),
            sort: SortSpec::new(),
            filter: None,
            selected: None,
        }
    }

    /// The card the request ultimately lands on.
    #[must_use]
    pub fn innermost(&self) -> &CardName {
        self.descents.last().map_or(&self.root, |(_, card)| card)
    }

    /// Context depth, not counting the innermost card itself.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.descents.len()
    }
}

///
/// NavigationState
///
/// A fully resolved position in the card hierarchy. `submenu` is
/// transient interaction state owned by the predictor; it never appears
/// in rendered URLs.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct NavigationState {
    /// Parent frames, outermost first.
    pub stack: Vec<ContextFrame>,
    /// The innermost (current) card.
    pub card: CardName,
    pub sort: SortSpec,
    /// Active named filter, exact as metadata spells it.
    pub filter: Option<String>,
    /// Selected record on the innermost card. Carried unvalidated.
    pub selected: Option<RecordId>,
    /// Open submenu marker: the menu action whose children are armed.
    pub submenu: Option<ActionId>,
}

impl NavigationState {
    /// A fresh state sitting at `card` with nothing applied.
    #[must_use]
    pub fn at(card: impl Into<CardName>) -> Self {
        Self {
            stack: Vec::new(),
            card: card.into(),
            sort: SortSpec::new(),
            filter: None,
            selected: None,
            submenu: None,
        }
    }
}

impl From<&NavigationState> for NavigationRequest {
    /// Project a state back onto the request that would reproduce it.
    /// The transient submenu marker has no request-side counterpart and
    /// is dropped.
    fn from(state: &NavigationState) -> Self {
        let root = state
            .stack
            .first()
            .map_or_else(|| state.card.clone(), |frame| frame.card.clone());

        // Frame i descends from frame i's record into frame i+1's card;
        // the last frame descends into the innermost card.
        let descents = state
            .stack
            .iter()
            .enumerate()
            .map(|(at, frame)| {
                let child = state
                    .stack
                    .get(at + 1)
                    .map_or_else(|| state.card.clone(), |next| next.card.clone());
                (frame.parent_record, child)
            })
            .collect();

        Self {
            root,
            descents,
            sort: state.sort.clone(),
            filter: state.filter.clone(),
            selected: state.selected,
        }
    }
}
