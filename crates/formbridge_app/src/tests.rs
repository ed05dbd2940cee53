//! Scenario tests for the editor bridge and mount entry point
//!
//! Everything runs against the headless editor library, driven the way a
//! user would drive a real editor: mount, wait for the bridge to go
//! active, type, and watch the model.

use crate::prelude::*;
use formbridge_editor::{
    EditorError, EditorEvent, EditorInstance, EditorLibrary, EventSink, LoadFuture,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Loader that always fails, standing in for an unreachable registry.
struct FailingLoader;

impl EditorLoader for FailingLoader {
    fn load(&self) -> LoadFuture {
        Box::pin(async { Err(EditorError::Load("registry unreachable".to_string())) })
    }
}

/// Library whose instances count disable commands and whose event sink
/// stays accessible, so misbehaving-library event sequences can be
/// replayed against the bridge.
struct CountingLibrary {
    disables: Arc<AtomicUsize>,
    sink: Mutex<Option<EventSink>>,
}

impl CountingLibrary {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            disables: Arc::new(AtomicUsize::new(0)),
            sink: Mutex::new(None),
        })
    }

    fn emit(&self, event: EditorEvent) {
        let sink = self.sink.lock().unwrap().clone().unwrap();
        sink(event);
    }
}

struct CountingInstance {
    disables: Arc<AtomicUsize>,
}

impl EditorInstance for CountingInstance {
    fn value(&self) -> Value {
        json!({"counted": true})
    }

    fn disable(&self) {
        self.disables.fetch_add(1, Ordering::SeqCst);
    }

    fn is_disabled(&self) -> bool {
        self.disables.load(Ordering::SeqCst) > 0
    }
}

impl EditorLibrary for CountingLibrary {
    fn instantiate(
        &self,
        _root: &Element,
        _options: &Options,
        events: EventSink,
    ) -> formbridge_editor::Result<Box<dyn EditorInstance>> {
        *self.sink.lock().unwrap() = Some(events.clone());
        (events)(EditorEvent::Ready);
        Ok(Box::new(CountingInstance {
            disables: self.disables.clone(),
        }))
    }
}

/// Library whose instance announces a change from inside `disable`, the
/// way editors that refresh their document on a read-only toggle do.
struct ChattyDisableLibrary;

struct ChattyDisableInstance {
    sink: EventSink,
    disabled: AtomicBool,
}

impl EditorInstance for ChattyDisableInstance {
    fn value(&self) -> Value {
        json!({"readonly": true})
    }

    fn disable(&self) {
        self.disabled.store(true, Ordering::SeqCst);
        (self.sink)(EditorEvent::Change);
    }

    fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }
}

impl EditorLibrary for ChattyDisableLibrary {
    fn instantiate(
        &self,
        _root: &Element,
        _options: &Options,
        events: EventSink,
    ) -> formbridge_editor::Result<Box<dyn EditorInstance>> {
        (events)(EditorEvent::Ready);
        Ok(Box::new(ChattyDisableInstance {
            sink: events,
            disabled: AtomicBool::new(false),
        }))
    }
}

fn headless_loader(library: &Arc<HeadlessLibrary>) -> Arc<dyn EditorLoader> {
    Arc::new(LibraryLoader::new(library.clone()))
}

fn collecting_callback() -> (ChangeCallback, Arc<Mutex<Vec<Value>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_cb = seen.clone();
    let callback: ChangeCallback = Arc::new(move |value: Value| {
        seen_cb.lock().unwrap().push(value);
    });
    (callback, seen)
}

/// Polls until the bridge reaches `want`, failing the test if it never
/// does.
async fn wait_for_phase(bridge: &Arc<EditorBridge>, want: BridgePhase) {
    for _ in 0..200 {
        if bridge.phase() == want {
            return;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!(
        "bridge never reached phase {want}, still {}",
        bridge.phase()
    );
}

/// The bridge render() attached to the container.
fn mounted_bridge(el: &Element) -> Arc<EditorBridge> {
    el.component::<EditorBridge>()
        .expect("render should attach the bridge to the container")
}

// =============================================================================
// Bridge lifecycle
// =============================================================================

#[tokio::test]
async fn bridge_runs_full_lifecycle_to_active() {
    let library = HeadlessLibrary::new();
    let (callback, _seen) = collecting_callback();
    let bridge = EditorBridge::new(BridgeConfig::new(), headless_loader(&library), callback);

    assert_eq!(bridge.phase(), BridgePhase::Unmounted);
    bridge.start().await.unwrap();

    assert_eq!(bridge.phase(), BridgePhase::Active);
    assert_eq!(library.instance_count(), 1);
    assert_eq!(bridge.value(), Some(json!({})));
}

#[tokio::test]
async fn bridge_root_carries_the_title_heading() {
    let library = HeadlessLibrary::new();
    let (callback, _seen) = collecting_callback();
    let bridge = EditorBridge::new(
        BridgeConfig::new().title("Editor Settings"),
        headless_loader(&library),
        callback,
    );

    let children = bridge.root().children();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].tag(), "h2");
    assert_eq!(children[0].text(), "Editor Settings");

    // The heading exists even with the default empty title.
    let (callback, _seen) = collecting_callback();
    let untitled = EditorBridge::new(BridgeConfig::new(), headless_loader(&library), callback);
    assert_eq!(untitled.root().children()[0].text(), "");
}

#[tokio::test]
async fn bridge_passes_options_through_unchanged() {
    let library = HeadlessLibrary::new();
    let (callback, _seen) = collecting_callback();
    let document = json!({"theme": "html", "startval": {"test": "seed"}});
    let bridge = EditorBridge::new(
        BridgeConfig::new().options(Options::new(document.clone())),
        headless_loader(&library),
        callback,
    );

    bridge.start().await.unwrap();

    let control = library.last_instance().unwrap();
    assert_eq!(control.options(), &document);
    assert_eq!(bridge.value(), Some(json!({"test": "seed"})));
    assert_eq!(
        bridge.root().attribute("data-editor"),
        Some("headless".to_string())
    );
}

#[tokio::test]
async fn disabled_config_disables_editor_at_ready() {
    let library = HeadlessLibrary::new();
    let (callback, seen) = collecting_callback();
    let bridge = EditorBridge::new(
        BridgeConfig::new().enabled(false),
        headless_loader(&library),
        callback,
    );

    // The headless library announces readiness synchronously inside its
    // constructor, before the bridge holds the instance. Disable must
    // still land.
    bridge.start().await.unwrap();
    let control = library.last_instance().unwrap();
    assert!(control.is_disabled());

    control.edit(json!({"test": "ignored"}));
    assert_eq!(bridge.value(), Some(json!({})));
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn enabled_config_leaves_editor_interactive() {
    let library = HeadlessLibrary::new();
    let (callback, _seen) = collecting_callback();
    let bridge = EditorBridge::new(BridgeConfig::new(), headless_loader(&library), callback);

    bridge.start().await.unwrap();
    assert!(!library.last_instance().unwrap().is_disabled());
}

#[tokio::test]
async fn disable_is_issued_exactly_once() {
    let library = CountingLibrary::new();
    let (callback, seen) = collecting_callback();
    let bridge = EditorBridge::new(
        BridgeConfig::new().enabled(false),
        Arc::new(LibraryLoader::new(library.clone())),
        callback,
    );

    bridge.start().await.unwrap();
    assert_eq!(library.disables.load(Ordering::SeqCst), 1);

    // A misbehaving library repeating `Ready` must not trigger another
    // disable, and later changes still flow.
    library.emit(EditorEvent::Ready);
    assert_eq!(library.disables.load(Ordering::SeqCst), 1);

    library.emit(EditorEvent::Change);
    assert_eq!(*seen.lock().unwrap(), vec![json!({"counted": true})]);
    assert_eq!(library.disables.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn enabled_bridge_never_issues_disable() {
    let library = CountingLibrary::new();
    let (callback, _seen) = collecting_callback();
    let bridge = EditorBridge::new(
        BridgeConfig::new(),
        Arc::new(LibraryLoader::new(library.clone())),
        callback,
    );

    bridge.start().await.unwrap();
    library.emit(EditorEvent::Change);
    library.emit(EditorEvent::Ready);

    assert_eq!(library.disables.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn changes_emitted_from_inside_disable_still_flow() {
    let (callback, seen) = collecting_callback();
    let bridge = EditorBridge::new(
        BridgeConfig::new().enabled(false),
        Arc::new(LibraryLoader::new(Arc::new(ChattyDisableLibrary))),
        callback,
    );

    // The disable command issued at ready re-enters the bridge with a
    // change event; it must be delivered, not wedged on the bridge lock.
    bridge.start().await.unwrap();

    assert_eq!(bridge.phase(), BridgePhase::Active);
    assert_eq!(*seen.lock().unwrap(), vec![json!({"readonly": true})]);
    assert_eq!(bridge.value(), Some(json!({"readonly": true})));
}

#[tokio::test]
async fn changes_deliver_the_current_value_to_the_callback() {
    let library = HeadlessLibrary::new();
    let (callback, seen) = collecting_callback();
    let bridge = EditorBridge::new(BridgeConfig::new(), headless_loader(&library), callback);

    bridge.start().await.unwrap();
    let control = library.last_instance().unwrap();
    control.edit(json!({"test": "a"}));
    control.edit(json!({"test": "b"}));

    assert_eq!(
        *seen.lock().unwrap(),
        vec![json!({"test": "a"}), json!({"test": "b"})]
    );
    assert_eq!(bridge.value(), Some(json!({"test": "b"})));
}

#[tokio::test]
async fn second_start_is_rejected() {
    let library = HeadlessLibrary::new();
    let (callback, _seen) = collecting_callback();
    let bridge = EditorBridge::new(BridgeConfig::new(), headless_loader(&library), callback);

    bridge.start().await.unwrap();
    let err = bridge.start().await.unwrap_err();

    assert!(matches!(err, BridgeError::AlreadyStarted(_)));
    assert_eq!(bridge.phase(), BridgePhase::Active);
    assert_eq!(library.instance_count(), 1);
}

#[tokio::test]
async fn acquisition_failure_fails_the_bridge() {
    let (callback, seen) = collecting_callback();
    let bridge = EditorBridge::new(BridgeConfig::new(), Arc::new(FailingLoader), callback);

    let err = bridge.start().await.unwrap_err();

    assert!(matches!(err, BridgeError::Acquisition(_)));
    assert_eq!(bridge.phase(), BridgePhase::Failed);
    assert_eq!(bridge.value(), None);
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn construction_failure_fails_the_bridge() {
    let library = HeadlessLibrary::new();
    library.fail_construction(true);
    let (callback, _seen) = collecting_callback();
    let bridge = EditorBridge::new(BridgeConfig::new(), headless_loader(&library), callback);

    let err = bridge.start().await.unwrap_err();

    assert!(matches!(err, BridgeError::Construction(_)));
    assert_eq!(bridge.phase(), BridgePhase::Failed);
    assert_eq!(library.instance_count(), 0);
}

#[tokio::test]
async fn stop_tears_down_and_forbids_restart() {
    let library = HeadlessLibrary::new();
    let (callback, seen) = collecting_callback();
    let bridge = EditorBridge::new(BridgeConfig::new(), headless_loader(&library), callback);

    let host = Element::new("div");
    host.append_child(&bridge.root());
    bridge.start().await.unwrap();
    let control = library.last_instance().unwrap();

    bridge.stop();

    assert_eq!(bridge.phase(), BridgePhase::Unmounted);
    assert_eq!(host.child_count(), 0);
    assert!(bridge.root().parent().is_none());
    assert_eq!(bridge.value(), None);

    // Edits against the torn-down instance go nowhere.
    control.edit(json!({"test": "late"}));
    assert!(seen.lock().unwrap().is_empty());

    let err = bridge.start().await.unwrap_err();
    assert!(matches!(
        err,
        BridgeError::AlreadyStarted(BridgePhase::Unmounted)
    ));
}

// =============================================================================
// Mount entry point
// =============================================================================

#[tokio::test]
async fn render_appends_one_fresh_container_child() {
    let library = HeadlessLibrary::new();
    let model = Arc::new(MemoryModel::new());
    let el = Element::new("div");
    let existing = Element::new("p");
    existing.set_text("untouched");
    el.append_child(&existing);

    render_with_loader(
        RenderContext {
            model: model.clone(),
            el: el.clone(),
        },
        headless_loader(&library),
    );

    assert_eq!(el.child_count(), 2);
    let children = el.children();
    assert!(children[0].is_same(&existing));
    assert_eq!(children[0].text(), "untouched");
    assert_eq!(
        children[1].attribute("id"),
        Some(CONTAINER_ID.to_string())
    );
    assert!(el.find_by_id(CONTAINER_ID).is_some());

    let bridge = mounted_bridge(&el);
    assert!(bridge.root().is_same(&children[1]));
    wait_for_phase(&bridge, BridgePhase::Active).await;
}

#[tokio::test]
async fn render_reads_options_once_and_replaces_defaults() {
    let library = HeadlessLibrary::new();
    let document = json!({"theme": "html", "schema": {"type": "object"}});
    let model = Arc::new(MemoryModel::with_entries([(
        "options",
        document.clone(),
    )]));
    let el = Element::new("div");

    render_with_loader(
        RenderContext {
            model: model.clone(),
            el: el.clone(),
        },
        headless_loader(&library),
    );
    wait_for_phase(&mounted_bridge(&el), BridgePhase::Active).await;

    let control = library.last_instance().unwrap();
    assert_eq!(control.options(), &document);

    // Later model writes do not reconfigure the mounted editor.
    model.set("options", json!({"theme": "changed"}));
    model.save_changes();
    assert_eq!(control.options(), &document);
}

#[tokio::test]
async fn render_without_model_options_uses_builtin_defaults() {
    let library = HeadlessLibrary::new();
    let model = Arc::new(MemoryModel::new());
    let el = Element::new("div");

    render_with_loader(
        RenderContext {
            model: model.clone(),
            el: el.clone(),
        },
        headless_loader(&library),
    );
    wait_for_phase(&mounted_bridge(&el), BridgePhase::Active).await;

    let control = library.last_instance().unwrap();
    assert_eq!(control.options(), Options::builtin_default().value());
}

#[tokio::test]
async fn render_treats_empty_options_object_as_present() {
    let library = HeadlessLibrary::new();
    let model = Arc::new(MemoryModel::with_entries([("options", json!({}))]));
    let el = Element::new("div");

    render_with_loader(
        RenderContext {
            model: model.clone(),
            el: el.clone(),
        },
        headless_loader(&library),
    );
    wait_for_phase(&mounted_bridge(&el), BridgePhase::Active).await;

    assert_eq!(library.last_instance().unwrap().options(), &json!({}));
}

#[tokio::test]
async fn edits_commit_value_through_the_model() {
    let library = HeadlessLibrary::new();
    let model = Arc::new(MemoryModel::new());
    let el = Element::new("div");

    render_with_loader(
        RenderContext {
            model: model.clone(),
            el: el.clone(),
        },
        headless_loader(&library),
    );
    wait_for_phase(&mounted_bridge(&el), BridgePhase::Active).await;

    // Nothing is written to the model before the first edit.
    assert!(model.ops().is_empty());

    library.last_instance().unwrap().edit(json!({"test": "hello"}));

    assert_eq!(model.get("value"), Some(json!({"test": "hello"})));
    assert_eq!(
        model.ops(),
        vec![
            ModelOp::Set {
                key: "value".to_string(),
                value: json!({"test": "hello"}),
            },
            ModelOp::SaveChanges,
        ]
    );
}

#[tokio::test]
async fn burst_edits_commit_in_order() {
    let library = HeadlessLibrary::new();
    let model = Arc::new(MemoryModel::new());
    let el = Element::new("div");

    render_with_loader(
        RenderContext {
            model: model.clone(),
            el: el.clone(),
        },
        headless_loader(&library),
    );
    wait_for_phase(&mounted_bridge(&el), BridgePhase::Active).await;

    let control = library.last_instance().unwrap();
    for value in ["a", "b", "c"] {
        control.edit(json!({"test": value}));
    }

    assert_eq!(model.get("value"), Some(json!({"test": "c"})));
    assert_eq!(model.commit_count(), 3);

    // Each edit is an isolated set-then-save pair, in edit order.
    let ops = model.ops();
    assert_eq!(ops.len(), 6);
    for (i, value) in ["a", "b", "c"].iter().enumerate() {
        assert_eq!(
            ops[i * 2],
            ModelOp::Set {
                key: "value".to_string(),
                value: json!({"test": value}),
            }
        );
        assert_eq!(ops[i * 2 + 1], ModelOp::SaveChanges);
    }
}

#[tokio::test]
async fn render_failure_leaves_model_and_container_untouched() {
    let model = Arc::new(MemoryModel::new());
    let el = Element::new("div");

    render_with_loader(
        RenderContext {
            model: model.clone(),
            el: el.clone(),
        },
        Arc::new(FailingLoader),
    );

    let bridge = mounted_bridge(&el);
    wait_for_phase(&bridge, BridgePhase::Failed).await;

    assert!(model.ops().is_empty());
    assert_eq!(model.get("value"), None);
    // The bridge root (with its heading) is all that was mounted.
    assert_eq!(el.child_count(), 1);
    assert_eq!(bridge.root().children().len(), 1);
}

#[tokio::test]
async fn unregistered_specifier_surfaces_as_acquisition_failure() {
    let (callback, _seen) = collecting_callback();
    let bridge = EditorBridge::new(
        BridgeConfig::new(),
        Arc::new(RegistryLoader::new("app-test-unregistered")),
        callback,
    );

    let err = bridge.start().await.unwrap_err();
    assert!(matches!(
        err,
        BridgeError::Acquisition(EditorError::ModuleNotRegistered(_))
    ));
    assert_eq!(bridge.phase(), BridgePhase::Failed);
}

#[tokio::test]
async fn render_resolves_the_default_module_through_the_registry() {
    let library = HeadlessLibrary::new();
    let specifier = formbridge_editor::default_module_specifier();
    register_library(&specifier, library.clone());

    let model = Arc::new(MemoryModel::new());
    let el = Element::new("div");
    render(RenderContext {
        model: model.clone(),
        el: el.clone(),
    });
    wait_for_phase(&mounted_bridge(&el), BridgePhase::Active).await;

    assert_eq!(library.instance_count(), 1);
    assert!(formbridge_editor::unregister_module(&specifier));
}
