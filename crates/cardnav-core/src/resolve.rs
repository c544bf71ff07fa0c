//! Turns a parsed [`NavigationRequest`] into a validated
//! [`NavigationState`].
//!
//! Resolution is where the fail-closed doctrine bites: every card named
//! by the request gets a full graph pass, the context chain is checked
//! link by link, and sort/filter references are checked against the
//! innermost card. Anything that does not hold up rejects the whole
//! request; there is no partial state.

use crate::{
    graph::{CardGraph, GraphError},
    model::{card::CardName, id::FieldId},
    obs::sink::{self, MetricsEvent},
    state::{ContextFrame, NavigationRequest, NavigationState},
    store::{MetadataStore, StoreError},
};
use thiserror::Error as ThisError;

///
/// ResolveError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ResolveError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("card '{card}' has no field {field}")]
    UnknownField { field: FieldId, card: CardName },

    #[error("card '{card}' has no filter named '{name}'")]
    UnknownFilter { name: String, card: CardName },

    #[error("no child link leads from '{parent}' to '{child}'")]
    InvalidContext { parent: CardName, child: CardName },
}

///
/// Resolver
///
/// The entry point for resolution and prediction, borrowing a metadata
/// store for its lifetime. A `Resolver` holds no state of its own;
/// every call re-reads metadata through the store so concurrent edits
/// are picked up (or rejected) on the next request.
///

pub struct Resolver<'s, S: ?Sized> {
    pub(crate) store: &'s S,
}

impl<'s, S> Resolver<'s, S>
where
    S: MetadataStore + ?Sized,
{
    #[must_use]
    pub const fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Build the graph for one card, with load accounting.
    pub fn resolve_card(&self, name: &CardName) -> Result<CardGraph, GraphError> {
        let result = CardGraph::resolve(self.store, name);
        observe_graph(name.as_str(), &result);

        result
    }

    /// Resolve a request into a state.
    ///
    /// The returned state always has an empty submenu marker; markers
    /// are transient and never round-trip through a URL.
    pub fn resolve(&self, request: &NavigationRequest) -> Result<NavigationState, ResolveError> {
        sink::record(MetricsEvent::ResolveCall);

        let result = self.resolve_inner(request);
        if result.is_err() {
            sink::record(MetricsEvent::ResolveFailure);
        }

        result
    }

    fn resolve_inner(&self, request: &NavigationRequest) -> Result<NavigationState, ResolveError> {
        // Phase 1: walk the context chain outward, proving each hop is
        // an actual child link of the card before it.
        let mut graph = self.resolve_card(&request.root)?;
        let mut stack = Vec::with_capacity(request.descents.len());

        for (record, child_name) in &request.descents {
            let child = self.resolve_card(child_name)?;
            if !graph.connects(child.card().id) {
                return Err(ResolveError::InvalidContext {
                    parent: graph.card().name.clone(),
                    child: child_name.clone(),
                });
            }

            stack.push(ContextFrame {
                card: graph.card().name.clone(),
                parent_record: *record,
            });
            graph = child;
        }

        // Phase 2: every sort key must be a field of the innermost card.
        for (field, _) in &request.sort.keys {
            if graph.field(*field).is_none() {
                return Err(ResolveError::UnknownField {
                    field: *field,
                    card: graph.card().name.clone(),
                });
            }
        }

        // Phase 3: the filter, if any, must name a filter action of the
        // innermost card. Matching is case sensitive.
        if let Some(name) = &request.filter
            && graph.filter(name).is_none()
        {
            return Err(ResolveError::UnknownFilter {
                name: name.clone(),
                card: graph.card().name.clone(),
            });
        }

        // Phase 4: assemble. The selected record is carried through
        // unchecked; rows are data, not metadata, and may not even be
        // loaded yet.
        Ok(NavigationState {
            stack,
            card: graph.card().name.clone(),
            sort: request.sort.clone(),
            filter: request.filter.clone(),
            selected: request.selected,
            submenu: None,
        })
    }
}

/// Classify a graph pass for the metrics sink.
pub(crate) fn observe_graph(card: &str, result: &Result<CardGraph, GraphError>) {
    match result {
        Ok(_) => sink::record(MetricsEvent::CardLoad { card }),
        Err(GraphError::Store(StoreError::Timeout { .. })) => {
            sink::record(MetricsEvent::StoreTimeout);
        }
        Err(GraphError::Store(StoreError::Read { .. }) | GraphError::UnknownCard { .. }) => {}
        Err(_) => sink::record(MetricsEvent::IntegrityFailure { card }),
    }
}
