//! Core runtime for CardNav: the metadata model, the deep-link codec,
//! per-card metadata graphs, and the state resolver and predictor.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod graph;
pub mod model;
pub mod obs;
pub mod predict;
pub mod resolve;
pub mod state;
pub mod store;
pub mod url;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, resolvers, stores, or codec helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        model::{
            action::{Action, ActionKind, Visibility},
            card::{Card, CardName},
            field::Field,
            id::{ActionId, CardId, FieldId, LinkId, RecordId},
            keycode::Keycode,
            link::ChildLink,
        },
        predict::{Outcome, Prediction, Stimulus},
        state::{ContextFrame, NavigationRequest, NavigationState, SortDirection, SortSpec},
    };
}
