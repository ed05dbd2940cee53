//! Editor event channel
//!
//! A live editor announces itself through exactly two events: `Ready` once
//! its constructor has finished wiring the document, and `Change` every
//! time the edited value moves. The event carries no payload; a consumer
//! that wants the new value reads it back from the instance, so bursts of
//! changes always observe the editor's current state rather than a stale
//! snapshot.

use std::sync::Arc;

/// Event emitted by a live editor instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorEvent {
    /// The editor finished constructing and is interactive.
    Ready,
    /// The edited value changed.
    Change,
}

/// Callback an editor instance delivers its events through.
///
/// The sink is handed to the library at construction so that an editor
/// which becomes ready synchronously inside its constructor still has
/// somewhere to announce it. Sinks must be callable from any thread.
pub type EventSink = Arc<dyn Fn(EditorEvent) + Send + Sync>;
