use stockbook_core::Timestamp;

/// A domain-agnostic ledger event.
///
/// Events are:
/// - **immutable** (treat them as facts)
/// - designed to be **append-only**
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name as written to the log (e.g. "purchase").
    fn event_type(&self) -> &'static str;

    /// When the event was ingested, if the record carries it.
    fn occurred_at(&self) -> Option<&Timestamp>;
}
