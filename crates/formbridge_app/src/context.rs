//! Mount context

use formbridge_core::Model;
use formbridge_host::Element;
use std::sync::Arc;

/// Everything the host hands the widget entry point.
#[derive(Clone)]
pub struct RenderContext {
    /// Synchronized model the widget reads its options from and writes
    /// its value into.
    pub model: Arc<dyn Model>,
    /// Container element owned by the host. The widget appends its own
    /// subtree under it and touches nothing else.
    pub el: Element,
}
