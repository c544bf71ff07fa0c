//! Group-chain plumbing shared by actions and child links.
//!
//! Both row kinds nest through a nullable same-card `group_id`. The
//! functions here walk that relation upward with cycle and dangling
//! checks, and turn a complete chain of keycodes into a shortcut path.

use crate::{
    graph::GraphError,
    model::{
        action::{Action, Visibility},
        id::{ActionId, LinkId},
        keycode::Keycode,
        link::ChildLink,
    },
};
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

///
/// GroupKind
///
/// Which self-referential group relation a diagnostic is about.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GroupKind {
    Action,
    ChildLink,
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Action => write!(f, "action"),
            Self::ChildLink => write!(f, "child link"),
        }
    }
}

///
/// GroupNode
///
/// Anything that nests through a `group_id` chain: actions into menu
/// actions, child links into link groups. Implementations expose just
/// enough for integrity checks and shortcut enumeration.
///

pub(crate) trait GroupNode {
    const KIND: GroupKind;

    fn node_id(&self) -> u64;
    fn group_id(&self) -> Option<u64>;
    fn keycode(&self) -> Option<&Keycode>;
    /// Whether the row is offered in human-facing enumeration.
    fn shown(&self) -> bool;
}

impl GroupNode for Action {
    const KIND: GroupKind = GroupKind::Action;

    fn node_id(&self) -> u64 {
        self.id.get()
    }

    fn group_id(&self) -> Option<u64> {
        self.group_id.map(ActionId::get)
    }

    fn keycode(&self) -> Option<&Keycode> {
        self.keycode.as_ref()
    }

    fn shown(&self) -> bool {
        self.visibility != Visibility::Hidden && !self.disabled
    }
}

impl GroupNode for ChildLink {
    const KIND: GroupKind = GroupKind::ChildLink;

    fn node_id(&self) -> u64 {
        self.id.get()
    }

    fn group_id(&self) -> Option<u64> {
        self.group_id.map(LinkId::get)
    }

    fn keycode(&self) -> Option<&Keycode> {
        self.keycode.as_ref()
    }

    fn shown(&self) -> bool {
        !self.is_hidden
    }
}

// Sibling keycodes must be unique within one node kind. Scope is the
// (group parent, keycode) pair; a top-level row and a nested row may
// reuse a keycode freely.
pub(crate) fn check_sibling_keycodes<N: GroupNode>(
    arena: &BTreeMap<u64, &N>,
) -> Result<(), GraphError> {
    let mut seen: BTreeMap<(Option<u64>, &Keycode), u64> = BTreeMap::new();

    for node in arena.values() {
        let Some(keycode) = node.keycode() else {
            continue;
        };
        if let Some(&first) = seen.get(&(node.group_id(), keycode)) {
            return Err(GraphError::AmbiguousShortcut {
                kind: N::KIND,
                keycode: keycode.clone(),
                first,
                second: node.node_id(),
            });
        }
        seen.insert((node.group_id(), keycode), node.node_id());
    }

    Ok(())
}

// Walk the group chain from `node` to its root, returning members
// root-first. Fails closed on a revisited id or a parent the snapshot
// does not contain.
pub(crate) fn group_chain<'a, N: GroupNode>(
    arena: &BTreeMap<u64, &'a N>,
    node: &'a N,
) -> Result<Vec<&'a N>, GraphError> {
    let mut chain = vec![node];
    let mut visiting: BTreeSet<u64> = BTreeSet::new();
    visiting.insert(node.node_id());

    let mut current = node;
    while let Some(parent_id) = current.group_id() {
        if !visiting.insert(parent_id) {
            return Err(GraphError::CycleDetected {
                kind: N::KIND,
                id: parent_id,
            });
        }
        let parent = arena
            .get(&parent_id)
            .copied()
            .ok_or(GraphError::DanglingReference {
                kind: N::KIND,
                from: current.node_id(),
                to: parent_id,
            })?;
        chain.push(parent);
        current = parent;
    }

    chain.reverse();
    Ok(chain)
}

// A chain yields a shortcut path only when every member carries a
// keycode; one gap makes the whole row keyboard-unreachable.
pub(crate) fn full_path<N: GroupNode>(chain: &[&N]) -> Option<Vec<Keycode>> {
    chain.iter().map(|node| node.keycode().cloned()).collect()
}

// Enumeration shows a row only when it and every group ancestor are
// shown; a hidden menu hides everything behind it.
pub(crate) fn chain_shown<N: GroupNode>(chain: &[&N]) -> bool {
    chain.iter().all(|node| node.shown())
}
