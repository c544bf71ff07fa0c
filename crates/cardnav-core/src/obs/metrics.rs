use serde::{Deserialize, Serialize};
use std::{cell::RefCell, collections::BTreeMap};

///
/// Metrics
/// Ephemeral, in-memory counters for resolver operations. Process-local
/// and thread-local; nothing here ever blocks a resolution.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub cards: BTreeMap<String, CardCounters>,
    pub since_ms: u64,
}

impl Default for EventState {
    fn default() -> Self {
        Self {
            ops: EventOps::default(),
            cards: BTreeMap::new(),
            since_ms: now_millis(),
        }
    }
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventOps {
    // Entrypoints
    pub resolve_calls: u64,
    pub resolve_failures: u64,
    pub predict_calls: u64,
    pub predict_failures: u64,

    // Graph loads
    pub card_loads: u64,

    // Failure classes
    pub store_timeouts: u64,
    pub integrity_failures: u64,
    pub shortcut_misses: u64,
}

///
/// CardCounters
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct CardCounters {
    pub loads: u64,
    pub integrity_failures: u64,
    pub shortcut_misses: u64,
}

///
/// EventReport
///
/// Snapshot handed to endpoints and tests. `counters` is `None` when
/// the requested window is not fully covered by the current state.
///

#[derive(Clone, Debug, Serialize)]
pub struct EventReport {
    pub counters: Option<EventState>,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all counters (useful in tests).
pub fn reset() {
    with_state_mut(|m| *m = EventState::default());
}

/// Snapshot the current state for a window starting at `since_ms`.
/// `None` means "everything recorded so far".
#[must_use]
pub fn report(since_ms: Option<u64>) -> EventReport {
    with_state(|state| {
        let covered = since_ms.is_none_or(|since| since <= state.since_ms);

        EventReport {
            counters: covered.then(|| state.clone()),
        }
    })
}

fn now_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
}
