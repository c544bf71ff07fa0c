use crate::model::{
    id::{CardId, LinkId},
    keycode::Keycode,
};
use serde::{Deserialize, Serialize};

///
/// ChildLink
///
/// A parent-to-child relationship between two cards, rendered as a button
/// on the parent. Following one descends the context stack: the selected
/// parent record becomes the frame the child card is scoped by. Links
/// group into menus the same way actions do, via a self-referential
/// `group_id` scoped to links of one parent card.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ChildLink {
    pub id: LinkId,
    pub parent_card_id: CardId,
    pub child_card_id: CardId,
    /// Child column tying its rows to the parent record. Opaque here;
    /// the query layer is what interprets it.
    #[serde(rename = "ref", default)]
    pub ref_column: Option<String>,
    /// Keyboard trigger, unique among sibling links of the same `group_id`.
    #[serde(default)]
    pub keycode: Option<Keycode>,
    /// When set, the child is scoped by `reducer` instead of matching
    /// `ref_column` against the selected parent record.
    #[serde(default)]
    pub unbound: bool,
    /// Filter expression used for unbound links. Opaque to the resolver.
    #[serde(default)]
    pub reducer: Option<String>,
    /// Display-only; hidden links still resolve through shortcut paths.
    #[serde(default)]
    pub is_hidden: bool,
    /// Menu parent among this card's links. `None` means top level.
    #[serde(default)]
    pub group_id: Option<LinkId>,
    /// Human label shown on the button.
    pub button_name: String,
    /// Stable display rank among siblings.
    #[serde(default)]
    pub order: i32,
}
