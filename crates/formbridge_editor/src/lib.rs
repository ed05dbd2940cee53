//! Formbridge Editor
//!
//! The editor side of the Formbridge widget stack:
//!
//! - **Library traits**: [`EditorLibrary`] constructs instances,
//!   [`EditorInstance`] is one live editor bound to a host element
//! - **Events**: the two-event channel (`Ready`, `Change`) an instance
//!   announces itself through
//! - **Loading**: asynchronous [`EditorLoader`] acquisition plus a module
//!   registry mapping bare specifiers to loaders, import-map style
//! - **Headless editor**: a complete in-memory reference implementation
//!   for tests and headless hosts
//!
//! # Example
//!
//! ```rust
//! use formbridge_core::Options;
//! use formbridge_editor::headless::HeadlessLibrary;
//! use formbridge_editor::{EditorEvent, EditorLibrary, EventSink};
//! use formbridge_host::Element;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let library = HeadlessLibrary::new();
//! let root = Element::new("div");
//! let sink: EventSink = Arc::new(|event| {
//!     assert_eq!(event, EditorEvent::Ready);
//! });
//!
//! let options = Options::new(json!({"startval": {"test": "x"}}));
//! let editor = library.instantiate(&root, &options, sink).unwrap();
//! assert_eq!(editor.value(), json!({"test": "x"}));
//! ```

pub mod error;
pub mod events;
pub mod headless;
pub mod library;
pub mod loader;

pub use error::{EditorError, Result};
pub use events::{EditorEvent, EventSink};
pub use library::{EditorInstance, EditorLibrary};
pub use loader::{
    default_module_specifier, module_is_registered, register_library, register_module,
    resolve_module, unregister_module, EditorLoader, LibraryLoader, LoadFuture, RegistryLoader,
    DEFAULT_MODULE, MODULE_ENV_VAR,
};
