//! Formbridge Application Framework
//!
//! Ties the Formbridge stack together: the [`EditorBridge`] component
//! drives one editor instance through its lifecycle, and [`render`] is
//! the notebook-style mount entry point wiring a synchronized model to
//! that bridge.
//!
//! # Example (Mount Entry Point)
//!
//! ```ignore
//! use formbridge_app::prelude::*;
//!
//! // Host setup: an editor library registered under the default module
//! // specifier, a synchronized model, and a container element.
//! register_library(formbridge_editor::DEFAULT_MODULE, my_library);
//! let model: Arc<dyn Model> = Arc::new(MemoryModel::new());
//! let el = Element::new("div");
//!
//! // One call mounts the widget; edits now commit back to the model.
//! render(RenderContext { model, el });
//! ```
//!
//! # Example (Driving the Bridge Directly)
//!
//! ```ignore
//! use formbridge_app::prelude::*;
//!
//! let bridge = EditorBridge::new(
//!     BridgeConfig::new().title("Settings").enabled(false),
//!     Arc::new(LibraryLoader::new(my_library)),
//!     Arc::new(|value| println!("edited: {value}")),
//! );
//! host_container.append_child(&bridge.root());
//! bridge.start().await?;
//! ```

mod bridge;
mod context;
mod error;
mod mount;

#[cfg(test)]
mod tests;

pub use bridge::{BridgeConfig, BridgePhase, ChangeCallback, EditorBridge};
pub use context::RenderContext;
pub use error::{BridgeError, Result};
pub use mount::{render, render_with_loader, CONTAINER_ID};

/// Prelude module - import everything commonly needed
pub mod prelude {
    pub use crate::bridge::{BridgeConfig, BridgePhase, ChangeCallback, EditorBridge};
    pub use crate::context::RenderContext;
    pub use crate::error::{BridgeError, Result};
    pub use crate::mount::{render, render_with_loader, CONTAINER_ID};
    pub use formbridge_core::{resolve_options, MemoryModel, Model, ModelOp, Options};
    pub use formbridge_editor::headless::{HeadlessControl, HeadlessLibrary};
    pub use formbridge_editor::{
        default_module_specifier, register_library, EditorLoader, LibraryLoader, RegistryLoader,
        DEFAULT_MODULE,
    };
    pub use formbridge_host::Element;
}
