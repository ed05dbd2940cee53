//! Editor library interface
//!
//! The seam between the bridge and a concrete editor implementation. A
//! loaded [`EditorLibrary`] is a factory: given a root element, an options
//! document and an event sink it constructs one live [`EditorInstance`].
//! The bridge only ever talks to these two traits, so editors are swappable
//! without touching the mount or synchronization logic.

use crate::error::Result;
use crate::events::EventSink;
use formbridge_core::Options;
use formbridge_host::Element;
use serde_json::Value;

/// A loaded editor library, ready to construct instances.
///
/// Libraries are shared behind an `Arc` and may be asked for any number of
/// instances over their lifetime.
pub trait EditorLibrary: Send + Sync {
    /// Constructs an editor rooted at `root`, configured by `options`.
    ///
    /// The library takes ownership of `root`'s content and emits `Ready`
    /// through `events` once the instance is interactive. Implementations
    /// that finish synchronously emit `Ready` before returning, so the
    /// sink must be operational when this is called.
    fn instantiate(
        &self,
        root: &Element,
        options: &Options,
        events: EventSink,
    ) -> Result<Box<dyn EditorInstance>>;
}

/// One live editor bound to a root element.
pub trait EditorInstance: Send + Sync {
    /// The current edited value.
    fn value(&self) -> Value;

    /// Puts the editor into read-only mode. Idempotent; there is no
    /// re-enable.
    fn disable(&self);

    /// Whether the editor is in read-only mode.
    fn is_disabled(&self) -> bool;
}
