//! Custom test assertions for progress event streams

use media_dl::{ProgressEvent, Stage};
use tokio::sync::broadcast;

/// Drain every event already buffered in `rx`
pub fn drain_events(rx: &mut broadcast::Receiver<ProgressEvent>) -> Vec<ProgressEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Assert `events` start with `starting`, end with exactly one terminal event
/// of `terminal`, and never report a decreasing percentage
pub fn assert_lifecycle(events: &[ProgressEvent], terminal: Stage) {
    assert!(!events.is_empty(), "no events were emitted");
    assert_eq!(events[0].stage, Stage::Starting, "events: {events:?}");

    let terminals: Vec<_> = events
        .iter()
        .filter(|e| matches!(e.stage, Stage::Complete | Stage::Error))
        .collect();
    assert_eq!(terminals.len(), 1, "expected one terminal event: {events:?}");
    assert_eq!(events.last().map(|e| e.stage), Some(terminal));

    assert_non_decreasing(events);
}

/// Assert percentages within one operation never go backwards
pub fn assert_non_decreasing(events: &[ProgressEvent]) {
    for pair in events.windows(2) {
        assert!(
            pair[1].percent >= pair[0].percent,
            "percent went from {} to {}",
            pair[0].percent,
            pair[1].percent
        );
        assert!((0.0..=100.0).contains(&pair[1].percent));
    }
}
