//! Formbridge Core
//!
//! This crate provides the host-side primitives of the Formbridge widget
//! stack:
//!
//! - **Options**: the JSON options document handed to an editor library,
//!   with whole-document fallback resolution (caller options replace the
//!   built-in defaults, they are never merged)
//! - **Model**: the synchronized key/value store a widget reads its
//!   configuration from and writes its value back to, with an explicit
//!   set-then-save commit protocol
//!
//! # Example
//!
//! ```rust
//! use formbridge_core::model::{MemoryModel, Model};
//! use formbridge_core::options::{resolve_options, Options};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let model = Arc::new(MemoryModel::with_entries([(
//!     "options",
//!     json!({"theme": "html", "schema": {"type": "object"}}),
//! )]));
//!
//! // Resolve once at mount: the model document wins wholesale.
//! let options = resolve_options(model.get("options"), &Options::builtin_default());
//! assert_eq!(options.value()["theme"], "html");
//!
//! // The widget writes back through the same model.
//! model.set("value", json!({"test": "edited"}));
//! model.save_changes();
//! ```

pub mod model;
pub mod options;

pub use model::{MemoryModel, Model, ModelCommit, ModelOp, SubscriptionHandle};
pub use options::{is_truthy, resolve_options, Options};
