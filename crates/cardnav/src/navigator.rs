use crate::error::Error;
use cardnav_core::{
    self as core,
    graph::ShortcutEntry,
    model::card::CardName,
    predict::{Prediction, Stimulus},
    state::{NavigationRequest, NavigationState},
    store::MetadataStore,
};

/// Parse a deep link into a request. Pure string work; no metadata.
pub fn parse_url(raw: &str) -> Result<NavigationRequest, Error> {
    Ok(core::url::parse(raw)?)
}

/// Render a state back to its canonical deep link.
#[must_use]
pub fn render_url(state: &NavigationState) -> String {
    core::url::render(state)
}

///
/// Navigator
/// Public facade over the core resolver and predictor.
/// Converts core errors into `cardnav::Error`.
///

pub struct Navigator<'s, S: ?Sized> {
    inner: core::resolve::Resolver<'s, S>,
}

impl<'s, S> Navigator<'s, S>
where
    S: MetadataStore + ?Sized,
{
    /// Create a navigator over the given metadata store.
    #[must_use]
    pub const fn new(store: &'s S) -> Self {
        Self {
            inner: core::resolve::Resolver::new(store),
        }
    }

    /// Resolve a parsed request into a validated state.
    pub fn resolve(&self, request: &NavigationRequest) -> Result<NavigationState, Error> {
        Ok(self.inner.resolve(request)?)
    }

    /// Parse and resolve a deep link in one step.
    pub fn resolve_url(&self, raw: &str) -> Result<NavigationState, Error> {
        let request = core::url::parse(raw)?;

        Ok(self.inner.resolve(&request)?)
    }

    /// Predict the state one stimulus lands on.
    pub fn predict(&self, state: &NavigationState, stimulus: &Stimulus) -> Result<Prediction, Error> {
        Ok(self.inner.predict(state, stimulus)?)
    }

    /// Enumerate the visible shortcuts of one card, in display order.
    pub fn shortcuts(&self, card: &CardName) -> Result<Vec<ShortcutEntry>, Error> {
        Ok(self.inner.resolve_card(card)?.visible_shortcuts().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, ErrorOrigin};
    use cardnav_core::store::{MemoryStore, MetadataSet};

    fn store() -> MemoryStore {
        let set: MetadataSet = serde_json::from_value(serde_json::json!({
            "cards": [
                { "id": 1, "name": "orders", "tablename": "orders_v", "basetable": "orders" },
                { "id": 2, "name": "lines", "tablename": "lines_v", "basetable": "lines" }
            ],
            "fields": [
                { "id": 10, "card_id": 1, "name": "id" },
                { "id": 12, "card_id": 1, "name": "total" }
            ],
            "actions": [
                { "id": 100, "card_id": 1, "name": "Open", "display_name": "Open",
                  "kind": "filter", "sql": "status = 'open'", "keycode": "O", "order": 1 }
            ],
            "child_links": [
                { "id": 200, "parent_card_id": 1, "child_card_id": 2, "ref": "order_id",
                  "button_name": "Lines", "keycode": "Enter", "order": 2 }
            ]
        }))
        .expect("metadata should deserialize");

        MemoryStore::new(set)
    }

    #[test]
    fn resolves_a_url_end_to_end() {
        let store = store();
        let state = Navigator::new(&store)
            .resolve_url("/orders?ord=10&red=Open")
            .expect("should resolve");

        assert_eq!(state.card, CardName::from("orders"));
        assert_eq!(state.filter.as_deref(), Some("Open"));
        assert_eq!(render_url(&state), "/orders?ord=10&red=Open");
    }

    #[test]
    fn bad_url_is_malformed_at_the_url_origin() {
        let store = store();
        let err = Navigator::new(&store)
            .resolve_url("/orders?bogus=1")
            .expect_err("should fail");

        assert_eq!(err.kind, ErrorKind::Malformed);
        assert_eq!(err.origin, ErrorOrigin::Url);
    }

    #[test]
    fn unknown_card_is_not_found_at_the_graph_origin() {
        let store = store();
        let err = Navigator::new(&store)
            .resolve_url("/ghosts")
            .expect_err("should fail");

        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(err.origin, ErrorOrigin::Graph);
    }

    #[test]
    fn unknown_filter_is_not_found_at_the_resolve_origin() {
        let store = store();
        let err = Navigator::new(&store)
            .resolve_url("/orders?red=Closed")
            .expect_err("should fail");

        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(err.origin, ErrorOrigin::Resolve);
    }

    #[test]
    fn missed_keycode_is_no_effect_at_the_predict_origin() {
        let store = store();
        let navigator = Navigator::new(&store);

        let state = navigator.resolve_url("/orders").expect("should resolve");
        let err = navigator
            .predict(&state, &Stimulus::Key("Z".into()))
            .expect_err("should miss");

        assert_eq!(err.kind, ErrorKind::NoEffect);
        assert_eq!(err.origin, ErrorOrigin::Predict);
    }

    #[test]
    fn shortcuts_list_in_display_order() {
        let store = store();
        let entries = Navigator::new(&store)
            .shortcuts(&CardName::from("orders"))
            .expect("should enumerate");

        let labels: Vec<&str> = entries.iter().map(|entry| entry.label.as_str()).collect();
        assert_eq!(labels, vec!["Open", "Lines"]);
    }
}
