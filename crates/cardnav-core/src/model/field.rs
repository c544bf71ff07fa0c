use crate::model::id::{CardId, FieldId};
use serde::{Deserialize, Serialize};

///
/// Field
///
/// One column definition on a card. Deep links reference fields by their
/// globally unique `id` in `ord=` sort tokens, which is why the resolver
/// has to confirm a referenced field actually belongs to the card being
/// resolved.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Field {
    pub id: FieldId,
    /// Owning card. Sort references crossing cards are invalid.
    pub card_id: CardId,
    pub name: String,
    /// Display rank in list view. Carried, not interpreted.
    #[serde(default)]
    pub list_order: Option<i32>,
    /// Display rank in detail view. Carried, not interpreted.
    #[serde(default)]
    pub detail_order: Option<i32>,
    /// Computed-column expression, when the field is not a plain column.
    /// Opaque to the resolver.
    #[serde(default)]
    pub sql: Option<String>,
}
