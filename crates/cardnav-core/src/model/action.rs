use crate::model::{
    id::{ActionId, CardId},
    keycode::Keycode,
};
use serde::{Deserialize, Serialize};

///
/// Action
///
/// One button row on a card: either a stored procedure to run or a named
/// filter to apply. Actions nest into menus through `group_id`, which
/// points at another action on the same card. The resolver walks that
/// relation to compute keyboard shortcut paths and refuses to load a card
/// whose action rows form a cycle.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Action {
    pub id: ActionId,
    pub card_id: CardId,
    /// Name unique within the card; filter actions are addressed by it.
    pub name: String,
    /// Human label shown on the button.
    pub display_name: String,
    pub kind: ActionKind,
    /// Procedure body or filter expression. Opaque to the resolver.
    #[serde(default)]
    pub sql: Option<String>,
    /// Keyboard trigger, unique among siblings of the same `group_id`.
    #[serde(default)]
    pub keycode: Option<Keycode>,
    /// Menu parent. `None` means top level.
    #[serde(default)]
    pub group_id: Option<ActionId>,
    #[serde(default)]
    pub visibility: Visibility,
    /// Greyed out in the UI. Display-only; does not block resolution.
    #[serde(default)]
    pub disabled: bool,
    /// Stable display rank among siblings.
    #[serde(default)]
    pub order: i32,
    /// Authorization tag. Opaque; enforcement happens outside the resolver.
    #[serde(default)]
    pub role: Option<String>,
}

///
/// ActionKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Runs an opaque procedure outside the resolver's scope.
    Procedure,
    /// Applies the action's named filter to the current card.
    Filter,
}

///
/// Visibility
///
/// Where a button is offered in the UI. Governs display only: a `Hidden`
/// action stays resolvable through its shortcut path, it is just left out
/// of human-facing enumeration.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    ListOnly,
    FormOnly,
    #[default]
    Both,
    Hidden,
}
