//! Next-state prediction.
//!
//! Given a resolved [`NavigationState`] and one user stimulus, compute
//! the state the UI should land on plus an [`Outcome`] describing what
//! happened. Prediction is pure over the metadata snapshot it reads:
//! it never executes procedures, touches row data, or mutates the input
//! state.
//!
//! Keypresses route through the card's shortcut index. A bare keycode is
//! tried as a direct (length 1) path first; if the state carries an open
//! submenu marker, the keycode is then tried as a child of that menu.
//! Menu hits only move the marker. Everything else closes it.

use crate::{
    graph::{CardGraph, GraphError, ShortcutHit},
    model::{
        action::{Action, ActionKind},
        card::CardName,
        id::{ActionId, LinkId, RecordId},
        keycode::Keycode,
        link::ChildLink,
    },
    obs::sink::{self, MetricsEvent},
    resolve::{Resolver, observe_graph},
    state::{ContextFrame, NavigationState, SortSpec},
    store::{MetadataStore, StoreError},
};
use serde::Serialize;
use std::slice;
use thiserror::Error as ThisError;

///
/// PredictError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum PredictError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("card '{card}' needs a selected record before entering a child card")]
    MissingSelection { card: CardName },

    #[error("keycode '{keycode}' matches no shortcut on card '{card}'")]
    NoMatchingShortcut { card: CardName, keycode: Keycode },

    #[error("card '{card}' has no filter named '{name}'")]
    UnknownFilter { name: String, card: CardName },
}

///
/// Stimulus
///
/// One unit of user input, already translated out of whatever raw event
/// the UI layer deals in.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Stimulus {
    /// A keypress, routed through the shortcut index.
    Key(Keycode),
    /// Apply a named filter directly, bypassing keycodes.
    ApplyFilter(String),
    /// Select a record on the innermost card.
    SelectRecord(RecordId),
}

///
/// Outcome
///
/// What a stimulus did beyond the state transition itself. Procedure
/// payloads are handed back opaque; running them is the caller's
/// business.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    FilterApplied {
        name: String,
    },
    MenuOpened {
        action: ActionId,
    },
    Procedure {
        action: ActionId,
        name: String,
        sql: Option<String>,
    },
    ChildEntered {
        link: LinkId,
        card: CardName,
    },
    RecordSelected {
        record: RecordId,
    },
}

///
/// Prediction
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Prediction {
    pub state: NavigationState,
    pub outcome: Outcome,
}

impl<'s, S> Resolver<'s, S>
where
    S: MetadataStore + ?Sized,
{
    /// Predict the state one stimulus lands on.
    ///
    /// The input state is read, never written; the prediction owns a
    /// fresh state value.
    pub fn predict(
        &self,
        state: &NavigationState,
        stimulus: &Stimulus,
    ) -> Result<Prediction, PredictError> {
        sink::record(MetricsEvent::PredictCall);

        let result = self.predict_inner(state, stimulus);
        if result.is_err() {
            sink::record(MetricsEvent::PredictFailure);
        }

        result
    }

    fn predict_inner(
        &self,
        state: &NavigationState,
        stimulus: &Stimulus,
    ) -> Result<Prediction, PredictError> {
        // Fresh graph pass for the current card on every prediction; a
        // state resolved a moment ago proves nothing about metadata now.
        let graph = self.resolve_card(&state.card)?;

        match stimulus {
            Stimulus::Key(keycode) => self.predict_key(state, &graph, keycode),
            Stimulus::ApplyFilter(name) => {
                let action = graph.filter(name).ok_or_else(|| PredictError::UnknownFilter {
                    name: name.clone(),
                    card: state.card.clone(),
                })?;

                Ok(apply_filter(state, action))
            }
            Stimulus::SelectRecord(record) => {
                let mut next = state.clone();
                next.selected = Some(*record);
                next.submenu = None;

                Ok(Prediction {
                    state: next,
                    outcome: Outcome::RecordSelected { record: *record },
                })
            }
        }
    }

    fn predict_key(
        &self,
        state: &NavigationState,
        graph: &CardGraph,
        keycode: &Keycode,
    ) -> Result<Prediction, PredictError> {
        // Direct shortcut first; only then inside the open submenu. A
        // stale marker (menu gone, or its chain broken) arms nothing.
        let hit = graph.shortcut(slice::from_ref(keycode)).or_else(|| {
            let menu = state.submenu?;
            let prefix = graph.action_path(menu)?;

            let mut path = Vec::with_capacity(prefix.len() + 1);
            path.extend(prefix.iter().cloned());
            path.push(keycode.clone());

            graph.shortcut(&path)
        });

        let Some(hit) = hit else {
            sink::record(MetricsEvent::ShortcutMiss {
                card: state.card.as_str(),
            });

            return Err(PredictError::NoMatchingShortcut {
                card: state.card.clone(),
                keycode: keycode.clone(),
            });
        };

        match hit {
            ShortcutHit::Action(action) if graph.is_menu(action.id) => {
                let mut next = state.clone();
                next.submenu = Some(action.id);

                Ok(Prediction {
                    state: next,
                    outcome: Outcome::MenuOpened { action: action.id },
                })
            }
            ShortcutHit::Action(action) => match action.kind {
                ActionKind::Filter => Ok(apply_filter(state, action)),
                ActionKind::Procedure => {
                    let mut next = state.clone();
                    next.submenu = None;

                    Ok(Prediction {
                        state: next,
                        outcome: Outcome::Procedure {
                            action: action.id,
                            name: action.name.clone(),
                            sql: action.sql.clone(),
                        },
                    })
                }
            },
            ShortcutHit::Child(link) => self.enter_child(state, link),
        }
    }

    fn enter_child(
        &self,
        state: &NavigationState,
        link: &ChildLink,
    ) -> Result<Prediction, PredictError> {
        let selected = state.selected.ok_or_else(|| PredictError::MissingSelection {
            card: state.card.clone(),
        })?;

        // Full graph pass on the target card before committing to the
        // descent; broken child metadata fails the prediction instead of
        // navigating into it.
        let child = self.resolve_child(link)?;

        let mut stack = state.stack.clone();
        stack.push(ContextFrame {
            card: state.card.clone(),
            parent_record: selected,
        });

        // Sort, filter, selection, and the submenu marker are all scoped
        // to one card and reset across the boundary.
        let card = child.card().name.clone();

        Ok(Prediction {
            state: NavigationState {
                stack,
                card: card.clone(),
                sort: SortSpec::new(),
                filter: None,
                selected: None,
                submenu: None,
            },
            outcome: Outcome::ChildEntered { link: link.id, card },
        })
    }

    fn resolve_child(&self, link: &ChildLink) -> Result<CardGraph, GraphError> {
        let card = match self.store.card_by_id(link.child_card_id) {
            Ok(Some(card)) => card,
            Ok(None) => {
                return Err(GraphError::MissingChildCard {
                    link: link.id,
                    card: link.child_card_id,
                });
            }
            Err(err) => {
                if matches!(err, StoreError::Timeout { .. }) {
                    sink::record(MetricsEvent::StoreTimeout);
                }

                return Err(err.into());
            }
        };

        let name = card.name.clone();
        let result = CardGraph::build(self.store, card);
        observe_graph(name.as_str(), &result);

        result
    }
}

/// Filter application, shared by the key and direct-stimulus paths.
/// Sort and selection survive; the submenu marker does not.
fn apply_filter(state: &NavigationState, action: &Action) -> Prediction {
    let mut next = state.clone();
    next.filter = Some(action.name.clone());
    next.submenu = None;

    Prediction {
        state: next,
        outcome: Outcome::FilterApplied {
            name: action.name.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::id::{CardId, FieldId},
        obs::metrics,
        state::SortDirection,
        store::{MemoryStore, MetadataSet},
        test_fixtures::{card, child_link, demo_store},
    };

    fn orders_state() -> NavigationState {
        NavigationState::at("orders")
    }

    fn predict(
        store: &MemoryStore,
        state: &NavigationState,
        stimulus: Stimulus,
    ) -> Result<Prediction, PredictError> {
        Resolver::new(store).predict(state, &stimulus)
    }

    #[test]
    fn menu_key_opens_the_submenu() {
        let store = demo_store();
        let mut state = orders_state();
        state.selected = Some(RecordId::new(5));

        let prediction =
            predict(&store, &state, Stimulus::Key(Keycode::from("K"))).expect("should predict");

        assert_eq!(prediction.outcome, Outcome::MenuOpened { action: ActionId::new(101) });
        assert_eq!(prediction.state.submenu, Some(ActionId::new(101)));

        // Opening a menu moves nothing else.
        assert_eq!(prediction.state.card, state.card);
        assert_eq!(prediction.state.sort, state.sort);
        assert_eq!(prediction.state.filter, state.filter);
        assert_eq!(prediction.state.selected, state.selected);
    }

    #[test]
    fn armed_menu_key_reaches_the_nested_action() {
        let store = demo_store();
        let mut state = orders_state();
        state.submenu = Some(ActionId::new(101));

        let prediction =
            predict(&store, &state, Stimulus::Key(Keycode::from("N"))).expect("should predict");

        assert_eq!(
            prediction.outcome,
            Outcome::Procedure {
                action: ActionId::new(102),
                name: "New Invoice".to_string(),
                sql: Some("EXEC New Invoice".to_string()),
            }
        );
        assert_eq!(prediction.state.submenu, None);
    }

    #[test]
    fn nested_key_misses_without_the_marker() {
        let store = demo_store();
        let err = predict(&store, &orders_state(), Stimulus::Key(Keycode::from("N")))
            .expect_err("should miss");

        assert_eq!(
            err,
            PredictError::NoMatchingShortcut {
                card: CardName::from("orders"),
                keycode: Keycode::from("N"),
            }
        );
    }

    #[test]
    fn direct_shortcut_wins_over_the_armed_submenu() {
        // 'O' is a direct filter shortcut; the armed menu never sees it.
        let store = demo_store();
        let mut state = orders_state();
        state.submenu = Some(ActionId::new(101));

        let prediction =
            predict(&store, &state, Stimulus::Key(Keycode::from("O"))).expect("should predict");

        assert_eq!(prediction.outcome, Outcome::FilterApplied { name: "Open".to_string() });
        assert_eq!(prediction.state.submenu, None);
    }

    #[test]
    fn filter_key_preserves_sort_and_selection() {
        let store = demo_store();
        let mut state = orders_state();
        state.sort.keys.push((FieldId::new(10), SortDirection::Asc));
        state.selected = Some(RecordId::new(5));

        let prediction =
            predict(&store, &state, Stimulus::Key(Keycode::from("O"))).expect("should predict");

        assert_eq!(prediction.state.filter.as_deref(), Some("Open"));
        assert_eq!(prediction.state.sort, state.sort);
        assert_eq!(prediction.state.selected, Some(RecordId::new(5)));
    }

    #[test]
    fn apply_filter_matches_filters_only() {
        let store = demo_store();

        let prediction = predict(
            &store,
            &orders_state(),
            Stimulus::ApplyFilter("Draft Items".to_string()),
        )
        .expect("should predict");
        assert_eq!(
            prediction.outcome,
            Outcome::FilterApplied { name: "Draft Items".to_string() }
        );

        // 'New Invoice' exists, but as a procedure.
        let err = predict(
            &store,
            &orders_state(),
            Stimulus::ApplyFilter("New Invoice".to_string()),
        )
        .expect_err("should fail");
        assert_eq!(
            err,
            PredictError::UnknownFilter {
                name: "New Invoice".to_string(),
                card: CardName::from("orders"),
            }
        );
    }

    #[test]
    fn select_record_swaps_only_the_selection() {
        let store = demo_store();
        let mut state = orders_state();
        state.filter = Some("Open".to_string());
        state.selected = Some(RecordId::new(5));

        let prediction = predict(&store, &state, Stimulus::SelectRecord(RecordId::new(42)))
            .expect("should predict");

        assert_eq!(prediction.outcome, Outcome::RecordSelected { record: RecordId::new(42) });
        assert_eq!(prediction.state.selected, Some(RecordId::new(42)));
        assert_eq!(prediction.state.filter.as_deref(), Some("Open"));
    }

    #[test]
    fn child_key_needs_a_selection() {
        let store = demo_store();
        let err = predict(&store, &orders_state(), Stimulus::Key(Keycode::from("Enter")))
            .expect_err("should fail");

        assert_eq!(err, PredictError::MissingSelection { card: CardName::from("orders") });
    }

    #[test]
    fn child_key_descends_and_resets_card_scope() {
        let store = demo_store();
        let mut state = orders_state();
        state.sort.keys.push((FieldId::new(10), SortDirection::Asc));
        state.filter = Some("Open".to_string());
        state.selected = Some(RecordId::new(123));

        let prediction =
            predict(&store, &state, Stimulus::Key(Keycode::from("Enter"))).expect("should predict");

        assert_eq!(
            prediction.outcome,
            Outcome::ChildEntered {
                link: LinkId::new(200),
                card: CardName::from("lines"),
            }
        );

        let next = prediction.state;
        assert_eq!(next.stack.len(), 1);
        assert_eq!(next.stack[0].card, CardName::from("orders"));
        assert_eq!(next.stack[0].parent_record, RecordId::new(123));
        assert_eq!(next.card, CardName::from("lines"));
        assert!(next.sort.is_empty());
        assert_eq!(next.filter, None);
        assert_eq!(next.selected, None);
        assert_eq!(next.submenu, None);
    }

    #[test]
    fn descents_stack_outermost_first() {
        let store = demo_store();
        let mut state = NavigationState::at("customers");
        state.selected = Some(RecordId::new(7));

        let mut state = predict(&store, &state, Stimulus::Key(Keycode::from("Enter")))
            .expect("should predict")
            .state;
        assert_eq!(state.card, CardName::from("orders"));

        state.selected = Some(RecordId::new(123));
        let state = predict(&store, &state, Stimulus::Key(Keycode::from("Enter")))
            .expect("should predict")
            .state;

        assert_eq!(state.card, CardName::from("lines"));
        assert_eq!(state.stack.len(), 2);
        assert_eq!(state.stack[0].card, CardName::from("customers"));
        assert_eq!(state.stack[0].parent_record, RecordId::new(7));
        assert_eq!(state.stack[1].card, CardName::from("orders"));
        assert_eq!(state.stack[1].parent_record, RecordId::new(123));
    }

    #[test]
    fn hidden_action_still_fires() {
        let store = demo_store();
        let prediction = predict(&store, &orders_state(), Stimulus::Key(Keycode::from("A")))
            .expect("should predict");

        assert!(matches!(
            prediction.outcome,
            Outcome::Procedure { action, .. } if action == ActionId::new(103)
        ));
    }

    #[test]
    fn stale_submenu_marker_arms_nothing() {
        let store = demo_store();
        let mut state = orders_state();
        state.submenu = Some(ActionId::new(999));

        let err = predict(&store, &state, Stimulus::Key(Keycode::from("N")))
            .expect_err("should miss");

        assert!(matches!(err, PredictError::NoMatchingShortcut { .. }));
    }

    #[test]
    fn missing_child_card_fails_closed() {
        let set = MetadataSet {
            cards: vec![card(1, "orders")],
            fields: Vec::new(),
            actions: Vec::new(),
            child_links: vec![child_link(200, 1, 2, "Lines", Some("Enter"))],
        };
        let store = MemoryStore::new(set);

        let mut state = orders_state();
        state.selected = Some(RecordId::new(5));

        let err = predict(&store, &state, Stimulus::Key(Keycode::from("Enter")))
            .expect_err("should fail");

        assert_eq!(
            err,
            PredictError::Graph(GraphError::MissingChildCard {
                link: LinkId::new(200),
                card: CardId::new(2),
            })
        );
    }

    #[test]
    fn unknown_current_card_fails() {
        let store = demo_store();
        let err = predict(&store, &NavigationState::at("ghost"), Stimulus::SelectRecord(RecordId::new(1)))
            .expect_err("should fail");

        assert!(matches!(err, PredictError::Graph(GraphError::UnknownCard { .. })));
    }

    #[test]
    fn misses_and_loads_land_in_the_event_state() {
        let store = demo_store();
        metrics::reset();

        predict(&store, &orders_state(), Stimulus::Key(Keycode::from("Z")))
            .expect_err("should miss");

        let report = metrics::report(None);
        let counters = report.counters.expect("window should include reset");

        assert_eq!(counters.ops.predict_calls, 1);
        assert_eq!(counters.ops.predict_failures, 1);
        assert_eq!(counters.ops.shortcut_misses, 1);
        assert_eq!(counters.ops.card_loads, 1);

        let orders = counters.cards.get("orders").expect("card should be counted");
        assert_eq!(orders.loads, 1);
        assert_eq!(orders.shortcut_misses, 1);
    }
}
