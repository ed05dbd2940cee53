//! Widget mount entry point
//!
//! [`render`] is the whole host-facing surface of the widget: hand it a
//! model and a container element and it builds the bridge, wires the
//! change callback to the model's set-then-save protocol, and kicks off
//! the asynchronous editor start in the background.
//!
//! The model is read exactly once, at mount. Later model changes do not
//! reconfigure a mounted editor; hosts remount instead.

use crate::bridge::{BridgeConfig, ChangeCallback, EditorBridge};
use crate::context::RenderContext;
use formbridge_core::{resolve_options, Options};
use formbridge_editor::{default_module_specifier, EditorLoader, RegistryLoader};
use serde_json::Value;
use std::sync::Arc;

/// DOM id of the application root appended under the container.
pub const CONTAINER_ID: &str = "jsoneditor-container";

/// Mounts the editor widget into `ctx.el`.
///
/// Appends one fresh child (the bridge root, id [`CONTAINER_ID`]) under
/// the container, resolves the options once from the model's `options`
/// key, and starts the bridge on a background task. Start failures are
/// logged and leave the bridge in its failed phase; the container and
/// model are untouched by them.
///
/// The editor library is resolved through the module registry under
/// [`default_module_specifier`](formbridge_editor::default_module_specifier).
///
/// # Panics
///
/// Panics when called outside a Tokio runtime, since the editor start is
/// spawned onto it.
pub fn render(ctx: RenderContext) {
    let loader = Arc::new(RegistryLoader::new(default_module_specifier()));
    render_with_loader(ctx, loader);
}

/// [`render`] with an explicit editor loader instead of the registry
/// default.
pub fn render_with_loader(ctx: RenderContext, loader: Arc<dyn EditorLoader>) {
    let options = resolve_options(ctx.model.get("options"), &Options::builtin_default());

    let model = ctx.model.clone();
    let on_change: ChangeCallback = Arc::new(move |value: Value| {
        tracing::debug!("editor change, committing value to model");
        model.set("value", value);
        model.save_changes();
    });

    let bridge = EditorBridge::new(BridgeConfig::new().options(options), loader, on_change);
    let root = bridge.root();
    root.set_attribute("id", CONTAINER_ID);
    ctx.el.append_child(&root);
    // The container keeps the mounted bridge reachable, and alive, for
    // as long as the host keeps the container.
    ctx.el.attach_component(bridge.clone());

    tokio::spawn(async move {
        if let Err(err) = bridge.start().await {
            tracing::error!(error = %err, "editor mount failed");
        }
    });
}
