//! Headless reference editor
//!
//! A real deployment binds a graphical JSON editor; tests, demos and
//! server-side hosts need one that lives entirely in memory. The headless
//! library implements the full [`EditorLibrary`] contract: it seeds its
//! value from the `startval` option, marks its root element, announces
//! `Ready` synchronously from the constructor, and emits `Change` for
//! every accepted edit.
//!
//! Edits are driven from outside through [`HeadlessControl`], the stand-in
//! for a user typing into a real editor. A disabled editor ignores edits,
//! matching read-only mode in graphical editors.

use crate::error::{EditorError, Result};
use crate::events::{EditorEvent, EventSink};
use crate::library::{EditorInstance, EditorLibrary};
use formbridge_core::Options;
use formbridge_host::Element;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Attribute the headless editor stamps on its root element.
pub const EDITOR_ATTR: &str = "data-editor";

struct HeadlessState {
    /// Options document the instance was constructed with.
    options: Value,
    value: Mutex<Value>,
    disabled: AtomicBool,
    events: EventSink,
}

/// In-memory [`EditorLibrary`] for tests and headless hosts.
pub struct HeadlessLibrary {
    instances: Mutex<Vec<HeadlessControl>>,
    fail_construction: AtomicBool,
}

impl HeadlessLibrary {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            instances: Mutex::new(Vec::new()),
            fail_construction: AtomicBool::new(false),
        })
    }

    /// Makes every subsequent [`EditorLibrary::instantiate`] call fail.
    pub fn fail_construction(&self, fail: bool) {
        self.fail_construction.store(fail, Ordering::SeqCst);
    }

    /// Number of instances constructed so far.
    pub fn instance_count(&self) -> usize {
        self.instances.lock().unwrap().len()
    }

    /// Control handle for the most recently constructed instance.
    pub fn last_instance(&self) -> Option<HeadlessControl> {
        self.instances.lock().unwrap().last().cloned()
    }
}

impl EditorLibrary for HeadlessLibrary {
    fn instantiate(
        &self,
        root: &Element,
        options: &Options,
        events: EventSink,
    ) -> Result<Box<dyn EditorInstance>> {
        if self.fail_construction.load(Ordering::SeqCst) {
            return Err(EditorError::Construct(
                "headless library configured to fail".to_string(),
            ));
        }

        let startval = options
            .get("startval")
            .cloned()
            .unwrap_or_else(|| json!({}));
        root.set_attribute(EDITOR_ATTR, "headless");

        let state = Arc::new(HeadlessState {
            options: options.value().clone(),
            value: Mutex::new(startval),
            disabled: AtomicBool::new(false),
            events,
        });
        self.instances.lock().unwrap().push(HeadlessControl {
            state: state.clone(),
        });

        // Construction finishes synchronously, so readiness is announced
        // before the caller even holds the instance.
        (state.events)(EditorEvent::Ready);
        Ok(Box::new(HeadlessInstance { state }))
    }
}

/// Drives edits into a headless instance, standing in for the user.
#[derive(Clone)]
pub struct HeadlessControl {
    state: Arc<HeadlessState>,
}

impl HeadlessControl {
    /// Applies an edit, replacing the current value and emitting `Change`.
    ///
    /// Ignored while the editor is disabled.
    pub fn edit(&self, value: Value) {
        if self.state.disabled.load(Ordering::SeqCst) {
            tracing::debug!("headless editor is disabled, edit ignored");
            return;
        }
        *self.state.value.lock().unwrap() = value;
        (self.state.events)(EditorEvent::Change);
    }

    /// The instance's current value.
    pub fn value(&self) -> Value {
        self.state.value.lock().unwrap().clone()
    }

    /// The options document the instance was constructed with.
    pub fn options(&self) -> &Value {
        &self.state.options
    }

    /// Whether the instance has been disabled.
    pub fn is_disabled(&self) -> bool {
        self.state.disabled.load(Ordering::SeqCst)
    }
}

struct HeadlessInstance {
    state: Arc<HeadlessState>,
}

impl EditorInstance for HeadlessInstance {
    fn value(&self) -> Value {
        self.state.value.lock().unwrap().clone()
    }

    fn disable(&self) {
        self.state.disabled.store(true, Ordering::SeqCst);
    }

    fn is_disabled(&self) -> bool {
        self.state.disabled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture_sink() -> (EventSink, Arc<Mutex<Vec<EditorEvent>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_sink = seen.clone();
        let sink: EventSink = Arc::new(move |event| {
            seen_sink.lock().unwrap().push(event);
        });
        (sink, seen)
    }

    #[test]
    fn construction_seeds_startval_and_announces_ready() {
        let library = HeadlessLibrary::new();
        let root = Element::new("div");
        let options = Options::new(json!({"startval": {"test": "seed"}}));
        let (sink, seen) = capture_sink();

        let instance = library.instantiate(&root, &options, sink).unwrap();

        assert_eq!(instance.value(), json!({"test": "seed"}));
        assert_eq!(root.attribute(EDITOR_ATTR), Some("headless".to_string()));
        assert_eq!(*seen.lock().unwrap(), vec![EditorEvent::Ready]);
        assert_eq!(library.instance_count(), 1);
        assert_eq!(library.last_instance().unwrap().options(), options.value());
    }

    #[test]
    fn missing_startval_defaults_to_empty_object() {
        let library = HeadlessLibrary::new();
        let root = Element::new("div");
        let (sink, _seen) = capture_sink();

        let instance = library
            .instantiate(&root, &Options::builtin_default(), sink)
            .unwrap();
        assert_eq!(instance.value(), json!({}));
    }

    #[test]
    fn edits_update_value_and_emit_change() {
        let library = HeadlessLibrary::new();
        let root = Element::new("div");
        let (sink, seen) = capture_sink();

        let instance = library
            .instantiate(&root, &Options::new(json!({})), sink)
            .unwrap();
        let control = library.last_instance().unwrap();

        control.edit(json!({"test": "a"}));
        control.edit(json!({"test": "b"}));

        assert_eq!(instance.value(), json!({"test": "b"}));
        assert_eq!(control.value(), json!({"test": "b"}));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![EditorEvent::Ready, EditorEvent::Change, EditorEvent::Change]
        );
    }

    #[test]
    fn disabled_instances_ignore_edits() {
        let library = HeadlessLibrary::new();
        let root = Element::new("div");
        let (sink, seen) = capture_sink();

        let instance = library
            .instantiate(&root, &Options::new(json!({"startval": {"kept": true}})), sink)
            .unwrap();
        let control = library.last_instance().unwrap();

        assert!(!instance.is_disabled());
        instance.disable();
        assert!(instance.is_disabled());
        assert!(control.is_disabled());

        control.edit(json!({"kept": false}));
        assert_eq!(instance.value(), json!({"kept": true}));
        assert_eq!(*seen.lock().unwrap(), vec![EditorEvent::Ready]);

        // Disable stays latched.
        instance.disable();
        assert!(instance.is_disabled());
    }

    #[test]
    fn configured_failure_rejects_construction() {
        let library = HeadlessLibrary::new();
        let root = Element::new("div");
        let (sink, seen) = capture_sink();

        library.fail_construction(true);
        let err = library
            .instantiate(&root, &Options::new(json!({})), sink)
            .err()
            .expect("construction was configured to fail");

        assert!(matches!(err, EditorError::Construct(_)));
        assert_eq!(library.instance_count(), 0);
        assert!(seen.lock().unwrap().is_empty());
        assert!(root.attribute(EDITOR_ATTR).is_none());

        library.fail_construction(false);
        let (sink, _seen) = capture_sink();
        assert!(library
            .instantiate(&root, &Options::new(json!({})), sink)
            .is_ok());
    }
}
