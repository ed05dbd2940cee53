//! Embedded editor demo
//!
//! Runs the full widget stack headlessly: an in-memory model, the
//! headless editor library registered in the module registry, and the
//! render entry point wiring them together. Edits are driven
//! programmatically and committed back into the model.
//!
//! Run with: cargo run -p formbridge_app --example embedded_editor

use formbridge_app::prelude::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // The editor a real deployment would fetch from a registry; here it
    // is the in-process headless editor.
    let library = HeadlessLibrary::new();
    let specifier = default_module_specifier();
    register_library(&specifier, library.clone());
    tracing::info!(specifier = %specifier, "editor module registered");

    let model = Arc::new(MemoryModel::with_entries([(
        "options",
        json!({
            "theme": "bootstrap4",
            "schema": {
                "title": "Demo Editor",
                "properties": {"test": {"type": "string"}}
            },
            "startval": {"test": ""}
        }),
    )]));
    model.subscribe_commits(|commit| {
        tracing::info!(changed = ?commit.changed, "model committed");
    });

    let el = Element::new("div");
    render(RenderContext {
        model: model.clone(),
        el: el.clone(),
    });

    let bridge = el
        .component::<EditorBridge>()
        .expect("render attaches the bridge to the container");
    while bridge.phase() != BridgePhase::Active {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    tracing::info!(phase = %bridge.phase(), "editor mounted");

    let control = library.last_instance().expect("one live instance");
    control.edit(json!({"test": "hello from the demo"}));
    control.edit(json!({"test": "hello again"}));

    tracing::info!(
        value = %model.get("value").unwrap_or_default(),
        commits = model.commit_count(),
        "model state after edits"
    );
}
