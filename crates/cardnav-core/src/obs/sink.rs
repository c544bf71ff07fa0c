//! Metrics sink boundary.
//!
//! Resolution logic MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
//!
//! This module is the only allowed bridge between resolver logic
//! and the global metrics state.

use crate::obs::metrics;
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = const { RefCell::new(None) };
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug)]
pub enum MetricsEvent<'a> {
    ResolveCall,
    ResolveFailure,
    PredictCall,
    PredictFailure,
    CardLoad { card: &'a str },
    StoreTimeout,
    IntegrityFailure { card: &'a str },
    ShortcutMiss { card: &'a str },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent<'_>);
}

/// GlobalMetricsSink
/// Default process-local sink that writes into global metrics state.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent<'_>) {
        match event {
            MetricsEvent::ResolveCall => {
                metrics::with_state_mut(|m| {
                    m.ops.resolve_calls = m.ops.resolve_calls.saturating_add(1);
                });
            }

            MetricsEvent::ResolveFailure => {
                metrics::with_state_mut(|m| {
                    m.ops.resolve_failures = m.ops.resolve_failures.saturating_add(1);
                });
            }

            MetricsEvent::PredictCall => {
                metrics::with_state_mut(|m| {
                    m.ops.predict_calls = m.ops.predict_calls.saturating_add(1);
                });
            }

            MetricsEvent::PredictFailure => {
                metrics::with_state_mut(|m| {
                    m.ops.predict_failures = m.ops.predict_failures.saturating_add(1);
                });
            }

            MetricsEvent::CardLoad { card } => {
                metrics::with_state_mut(|m| {
                    m.ops.card_loads = m.ops.card_loads.saturating_add(1);
                    let entry = m.cards.entry(card.to_string()).or_default();
                    entry.loads = entry.loads.saturating_add(1);
                });
            }

            MetricsEvent::StoreTimeout => {
                metrics::with_state_mut(|m| {
                    m.ops.store_timeouts = m.ops.store_timeouts.saturating_add(1);
                });
            }

            MetricsEvent::IntegrityFailure { card } => {
                metrics::with_state_mut(|m| {
                    m.ops.integrity_failures = m.ops.integrity_failures.saturating_add(1);
                    let entry = m.cards.entry(card.to_string()).or_default();
                    entry.integrity_failures = entry.integrity_failures.saturating_add(1);
                });
            }

            MetricsEvent::ShortcutMiss { card } => {
                metrics::with_state_mut(|m| {
                    m.ops.shortcut_misses = m.ops.shortcut_misses.saturating_add(1);
                    let entry = m.cards.entry(card.to_string()).or_default();
                    entry.shortcut_misses = entry.shortcut_misses.saturating_add(1);
                });
            }
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent<'_>) {
    let sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());
    if let Some(sink) = sink {
        sink.record(event);
    } else {
        GLOBAL_METRICS_SINK.record(event);
    }
}

/// Snapshot the current metrics state for endpoint/test plumbing.
#[must_use]
pub fn metrics_report(since_ms: Option<u64>) -> metrics::EventReport {
    metrics::report(since_ms)
}

/// Reset all metrics state.
pub fn metrics_reset_all() {
    metrics::reset();
}

/// Run a closure with a temporary metrics sink override. The previous
/// sink is restored on all exits, including unwind.
pub(crate) fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = self.0.take();
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        cell::Cell,
        panic::{AssertUnwindSafe, catch_unwind},
    };

    struct CountingSink {
        calls: Cell<usize>,
    }

    impl CountingSink {
        fn install() -> Rc<Self> {
            Rc::new(Self {
                calls: Cell::new(0),
            })
        }
    }

    impl MetricsSink for CountingSink {
        fn record(&self, _: MetricsEvent<'_>) {
            self.calls.set(self.calls.get() + 1);
        }
    }

    #[test]
    fn with_metrics_sink_routes_and_restores_nested_overrides() {
        SINK_OVERRIDE.with(|cell| {
            *cell.borrow_mut() = None;
        });

        let outer = CountingSink::install();
        let inner = CountingSink::install();

        with_metrics_sink(outer.clone(), || {
            record(MetricsEvent::ResolveCall);
            assert_eq!(outer.calls.get(), 1);
            assert_eq!(inner.calls.get(), 0);

            with_metrics_sink(inner.clone(), || {
                record(MetricsEvent::PredictCall);
            });

            // Inner override was restored to outer override.
            record(MetricsEvent::ResolveFailure);
        });

        assert_eq!(outer.calls.get(), 2);
        assert_eq!(inner.calls.get(), 1);

        // Outer override was restored to previous (none).
        SINK_OVERRIDE.with(|cell| {
            assert!(cell.borrow().is_none());
        });

        record(MetricsEvent::ResolveCall);
        assert_eq!(outer.calls.get(), 2);
        assert_eq!(inner.calls.get(), 1);
    }

    #[test]
    fn with_metrics_sink_restores_override_on_panic() {
        SINK_OVERRIDE.with(|cell| {
            *cell.borrow_mut() = None;
        });

        let sink = CountingSink::install();

        let panicked = catch_unwind(AssertUnwindSafe(|| {
            with_metrics_sink(sink.clone(), || {
                record(MetricsEvent::PredictCall);
                panic!("intentional panic for guard test");
            });
        }))
        .is_err();
        assert!(panicked);
        assert_eq!(sink.calls.get(), 1);

        // Guard restored TLS slot after unwind.
        SINK_OVERRIDE.with(|cell| {
            assert!(cell.borrow().is_none());
        });

        record(MetricsEvent::ResolveCall);
        assert_eq!(sink.calls.get(), 1);
    }

    #[test]
    fn global_sink_accumulates_per_card_counters() {
        metrics_reset_all();

        record(MetricsEvent::CardLoad { card: "orders" });
        record(MetricsEvent::CardLoad { card: "orders" });
        record(MetricsEvent::ShortcutMiss { card: "orders" });
        record(MetricsEvent::IntegrityFailure { card: "lines" });
        record(MetricsEvent::StoreTimeout);

        let counters = metrics_report(None)
            .counters
            .expect("metrics report should include counters without since filter");
        assert_eq!(counters.ops.card_loads, 2);
        assert_eq!(counters.ops.shortcut_misses, 1);
        assert_eq!(counters.ops.integrity_failures, 1);
        assert_eq!(counters.ops.store_timeouts, 1);

        let orders = counters.cards.get("orders").expect("orders counters");
        assert_eq!(orders.loads, 2);
        assert_eq!(orders.shortcut_misses, 1);

        let lines = counters.cards.get("lines").expect("lines counters");
        assert_eq!(lines.integrity_failures, 1);
    }

    #[test]
    fn report_window_after_state_start_is_empty() {
        metrics_reset_all();
        record(MetricsEvent::ResolveCall);

        let since = metrics::with_state(|m| m.since_ms);

        assert!(metrics_report(Some(since)).counters.is_some());
        assert!(
            metrics_report(Some(since.saturating_add(1)))
                .counters
                .is_none()
        );
    }
}
