//! Shared metadata fixtures for unit tests.
//!
//! One small world, used across graph, resolve, and predict tests:
//! `customers` → `orders` → `lines`, with a filter, a sub-menu, and a
//! hidden action on `orders`. Tests needing broken metadata build it
//! from the row constructors and override what they break.

use crate::{
    model::{
        action::{Action, ActionKind, Visibility},
        card::{Card, CardName},
        field::Field,
        id::{ActionId, CardId, FieldId, LinkId},
        keycode::Keycode,
        link::ChildLink,
    },
    store::{MemoryStore, MetadataSet},
};

pub(crate) fn card(id: u64, name: &str) -> Card {
    Card {
        id: CardId::new(id),
        name: CardName::from(name),
        tablename: format!("{name}_v"),
        basetable: name.to_string(),
        reducer: None,
        in_main_menu: true,
        role: None,
    }
}

pub(crate) fn field(id: u64, card: u64, name: &str) -> Field {
    Field {
        id: FieldId::new(id),
        card_id: CardId::new(card),
        name: name.to_string(),
        list_order: None,
        detail_order: None,
        sql: None,
    }
}

pub(crate) fn filter_action(id: u64, card: u64, name: &str, keycode: Option<&str>) -> Action {
    Action {
        id: ActionId::new(id),
        card_id: CardId::new(card),
        name: name.to_string(),
        display_name: name.to_string(),
        kind: ActionKind::Filter,
        sql: Some(format!("status = '{name}'")),
        keycode: keycode.map(Keycode::from),
        group_id: None,
        visibility: Visibility::Both,
        disabled: false,
        order: 0,
        role: None,
    }
}

pub(crate) fn procedure_action(id: u64, card: u64, name: &str, keycode: Option<&str>) -> Action {
    Action {
        id: ActionId::new(id),
        card_id: CardId::new(card),
        name: name.to_string(),
        display_name: name.to_string(),
        kind: ActionKind::Procedure,
        sql: Some(format!("EXEC {name}")),
        keycode: keycode.map(Keycode::from),
        group_id: None,
        visibility: Visibility::Both,
        disabled: false,
        order: 0,
        role: None,
    }
}

pub(crate) fn child_link(
    id: u64,
    parent: u64,
    child: u64,
    button: &str,
    keycode: Option<&str>,
) -> ChildLink {
    ChildLink {
        id: LinkId::new(id),
        parent_card_id: CardId::new(parent),
        child_card_id: CardId::new(child),
        ref_column: Some("parent_id".to_string()),
        keycode: keycode.map(Keycode::from),
        unbound: false,
        reducer: None,
        is_hidden: false,
        group_id: None,
        button_name: button.to_string(),
        order: 0,
    }
}

/// The standard three-card world.
///
/// orders (1): fields id=10, customer_id=11, total=12
///   - action 100 "Open"        filter,    keycode O
///   - action 101 "Extras"      menu,      keycode K
///   - action 102 "New Invoice" procedure, keycode N, inside Extras
///   - action 103 "Archive"     procedure, keycode A, hidden
///   - action 104 "Draft Items" filter,    no keycode
///   - link 200 → lines, keycode Enter
/// lines (2): fields id=20, order_id=21, qty=22
/// customers (3): fields id=30, name=31; link 201 → orders, keycode Enter
pub(crate) fn demo_set() -> MetadataSet {
    let mut extras = procedure_action(101, 1, "Extras", Some("K"));
    extras.sql = None;

    let mut invoice = procedure_action(102, 1, "New Invoice", Some("N"));
    invoice.group_id = Some(ActionId::new(101));

    let mut archive = procedure_action(103, 1, "Archive", Some("A"));
    archive.visibility = Visibility::Hidden;

    MetadataSet {
        cards: vec![card(1, "orders"), card(2, "lines"), card(3, "customers")],
        fields: vec![
            field(10, 1, "id"),
            field(11, 1, "customer_id"),
            field(12, 1, "total"),
            field(20, 2, "id"),
            field(21, 2, "order_id"),
            field(22, 2, "qty"),
            field(30, 3, "id"),
            field(31, 3, "name"),
        ],
        actions: vec![
            filter_action(100, 1, "Open", Some("O")),
            extras,
            invoice,
            archive,
            filter_action(104, 1, "Draft Items", None),
        ],
        child_links: vec![
            child_link(200, 1, 2, "Lines", Some("Enter")),
            child_link(201, 3, 1, "Orders", Some("Enter")),
        ],
    }
}

pub(crate) fn demo_store() -> MemoryStore {
    MemoryStore::new(demo_set())
}
