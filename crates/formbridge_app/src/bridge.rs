//! Editor bridge component
//!
//! The bridge owns the lifecycle of one editor widget: it acquires the
//! editor library asynchronously, constructs exactly one instance in its
//! own root element, and forwards the instance's change events to a host
//! callback. The host never talks to the editor directly; everything goes
//! through the bridge.
//!
//! # Lifecycle
//!
//! A bridge moves through explicit phases:
//!
//! ```text
//! Unmounted --start()--> Loading --library loaded--> Constructing
//!     Constructing --instance built--> Active
//!     Loading | Constructing --error--> Failed
//!     any --stop()--> Unmounted
//! ```
//!
//! `start` is once per bridge. A stopped bridge stays stopped; hosts that
//! want the editor back build a fresh bridge, which keeps "exactly one
//! editor instance per mount" a structural guarantee rather than a
//! convention.
//!
//! # Readiness
//!
//! When the bridge is configured with `enabled: false`, the editor is put
//! into read-only mode the moment it announces `Ready`. That happens at
//! most once per bridge; readiness is an edge, not a level, and enabling
//! later is out of scope. Libraries whose constructor finishes
//! synchronously emit `Ready` before the bridge even holds the instance,
//! so events raised mid-construction are buffered and replayed once the
//! instance is stored.

use crate::error::{BridgeError, Result};
use formbridge_core::Options;
use formbridge_editor::{EditorEvent, EditorInstance, EditorLoader, EventSink};
use formbridge_host::Element;
use serde_json::Value;
use smallvec::SmallVec;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Callback the bridge delivers edited values through.
pub type ChangeCallback = Arc<dyn Fn(Value) + Send + Sync>;

// =============================================================================
// Phases
// =============================================================================

/// Lifecycle phase of an [`EditorBridge`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BridgePhase {
    /// Constructed but not started, or torn down again.
    Unmounted,
    /// Awaiting the editor library.
    Loading,
    /// Library in hand, constructing the editor instance.
    Constructing,
    /// Editor live and forwarding changes.
    Active,
    /// Library acquisition or construction failed.
    Failed,
}

impl BridgePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            BridgePhase::Unmounted => "unmounted",
            BridgePhase::Loading => "loading",
            BridgePhase::Constructing => "constructing",
            BridgePhase::Active => "active",
            BridgePhase::Failed => "failed",
        }
    }
}

impl fmt::Display for BridgePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for an [`EditorBridge`].
#[derive(Clone, Debug)]
pub struct BridgeConfig {
    /// Resolved options document handed to the editor at construction.
    pub options: Options,
    /// Document schema, for hosts that drive the editor library with a
    /// schema separate from `options`. The bridge passes it through
    /// untouched.
    pub schema: Option<Value>,
    /// Initial document value, same pass-through contract as `schema`.
    pub data: Option<Value>,
    /// When `false`, the editor is disabled the moment it reports ready.
    pub enabled: bool,
    /// Heading text rendered above the editor.
    pub title: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            options: Options::builtin_default(),
            schema: None,
            data: None,
            enabled: true,
            title: String::new(),
        }
    }
}

impl BridgeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }
}

// =============================================================================
// Bridge
// =============================================================================

struct BridgeInner {
    phase: BridgePhase,
    /// Latched by the first `start`; never cleared.
    started: bool,
    /// Latched by the first `Ready`; never cleared.
    ready_handled: bool,
    editor: Option<Arc<dyn EditorInstance>>,
    /// Events raised while the instance was still being constructed.
    pending: SmallVec<[EditorEvent; 2]>,
}

/// Editor work decided under the bridge lock, executed after it is
/// released.
enum EditorAction {
    Disable(Arc<dyn EditorInstance>),
    EmitChange(Arc<dyn EditorInstance>),
}

/// State the editor's event sink needs to reach. Held behind an `Arc`
/// so the sink can carry a weak handle to it.
struct BridgeShared {
    config: BridgeConfig,
    on_change: ChangeCallback,
    inner: Mutex<BridgeInner>,
}

impl BridgeShared {
    fn transition(inner: &mut BridgeInner, to: BridgePhase) {
        tracing::debug!(from = %inner.phase, to = %to, "bridge phase change");
        inner.phase = to;
    }

    fn handle_event(&self, event: EditorEvent) {
        let action = {
            let mut inner = self.inner.lock().unwrap();
            match inner.phase {
                BridgePhase::Constructing if inner.editor.is_none() => {
                    inner.pending.push(event);
                    None
                }
                BridgePhase::Active => self.decide_event(&mut inner, event),
                _ => {
                    tracing::trace!(phase = %inner.phase, ?event, "editor event outside active phase ignored");
                    None
                }
            }
        };
        // Editor commands and the host callback run outside the bridge
        // lock so either side can call back into the bridge.
        if let Some(action) = action {
            self.run_action(action);
        }
    }

    fn decide_event(&self, inner: &mut BridgeInner, event: EditorEvent) -> Option<EditorAction> {
        match event {
            EditorEvent::Ready => {
                if inner.ready_handled {
                    return None;
                }
                inner.ready_handled = true;
                if self.config.enabled {
                    None
                } else {
                    inner.editor.clone().map(EditorAction::Disable)
                }
            }
            EditorEvent::Change => inner.editor.clone().map(EditorAction::EmitChange),
        }
    }

    fn run_action(&self, action: EditorAction) {
        match action {
            EditorAction::Disable(editor) => {
                editor.disable();
                tracing::debug!("editor disabled at ready");
            }
            EditorAction::EmitChange(editor) => (self.on_change)(editor.value()),
        }
    }
}

/// Bridges one editor instance to a host change callback.
///
/// Construction is cheap and synchronous: the bridge builds its root
/// element (a `div` with an `h2` heading child) and waits. The editor
/// itself only comes into existence inside [`EditorBridge::start`].
pub struct EditorBridge {
    loader: Arc<dyn EditorLoader>,
    root: Element,
    shared: Arc<BridgeShared>,
}

impl EditorBridge {
    /// Creates an unstarted bridge with its own detached root element.
    pub fn new(
        config: BridgeConfig,
        loader: Arc<dyn EditorLoader>,
        on_change: ChangeCallback,
    ) -> Arc<Self> {
        let root = Element::new("div");
        let heading = Element::new("h2");
        heading.set_text(&config.title);
        root.append_child(&heading);

        Arc::new(Self {
            loader,
            root,
            shared: Arc::new(BridgeShared {
                config,
                on_change,
                inner: Mutex::new(BridgeInner {
                    phase: BridgePhase::Unmounted,
                    started: false,
                    ready_handled: false,
                    editor: None,
                    pending: SmallVec::new(),
                }),
            }),
        })
    }

    /// The bridge's root element. Hosts append this wherever the editor
    /// should appear.
    pub fn root(&self) -> Element {
        self.root.clone()
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> BridgePhase {
        self.shared.inner.lock().unwrap().phase
    }

    /// The editor's current value, once an instance exists.
    pub fn value(&self) -> Option<Value> {
        let editor = self.shared.inner.lock().unwrap().editor.clone();
        editor.map(|editor| editor.value())
    }

    /// Acquires the library, constructs the editor and goes active.
    ///
    /// Runs the full Unmounted -> Loading -> Constructing -> Active
    /// sequence. On failure the bridge lands in [`BridgePhase::Failed`]
    /// and the error is returned; nothing is written to the host in
    /// either failure case. Calling `start` a second time, stopped or
    /// not, returns [`BridgeError::AlreadyStarted`].
    pub async fn start(&self) -> Result<()> {
        {
            let mut inner = self.shared.inner.lock().unwrap();
            if inner.started {
                return Err(BridgeError::AlreadyStarted(inner.phase));
            }
            inner.started = true;
            BridgeShared::transition(&mut inner, BridgePhase::Loading);
        }

        let library = match self.loader.load().await {
            Ok(library) => library,
            Err(err) => {
                self.fail();
                return Err(BridgeError::Acquisition(err));
            }
        };

        {
            let mut inner = self.shared.inner.lock().unwrap();
            if inner.phase != BridgePhase::Loading {
                tracing::debug!(phase = %inner.phase, "bridge stopped during load, abandoning start");
                return Ok(());
            }
            BridgeShared::transition(&mut inner, BridgePhase::Constructing);
        }

        // The sink must be live before construction: a synchronous
        // library announces `Ready` from inside `instantiate`. It holds
        // a weak handle so a torn-down bridge stops receiving events.
        let shared = Arc::downgrade(&self.shared);
        let sink: EventSink = Arc::new(move |event| {
            if let Some(shared) = shared.upgrade() {
                shared.handle_event(event);
            }
        });

        let editor = match library.instantiate(&self.root, &self.shared.config.options, sink) {
            Ok(editor) => editor,
            Err(err) => {
                self.fail();
                return Err(BridgeError::Construction(err));
            }
        };

        let actions = {
            let mut inner = self.shared.inner.lock().unwrap();
            if inner.phase != BridgePhase::Constructing {
                tracing::debug!(phase = %inner.phase, "bridge stopped during construction, abandoning start");
                return Ok(());
            }
            inner.editor = Some(Arc::from(editor));
            BridgeShared::transition(&mut inner, BridgePhase::Active);

            let pending: SmallVec<[EditorEvent; 2]> = std::mem::take(&mut inner.pending);
            let mut actions = Vec::new();
            for event in pending {
                if let Some(action) = self.shared.decide_event(&mut inner, event) {
                    actions.push(action);
                }
            }
            actions
        };
        for action in actions {
            self.shared.run_action(action);
        }
        Ok(())
    }

    /// Tears the editor down and detaches the bridge root from its
    /// parent. Safe to call in any phase; the bridge cannot be started
    /// again afterwards.
    pub fn stop(&self) {
        let editor = {
            let mut inner = self.shared.inner.lock().unwrap();
            inner.pending.clear();
            if inner.phase != BridgePhase::Unmounted {
                BridgeShared::transition(&mut inner, BridgePhase::Unmounted);
            }
            inner.editor.take()
        };
        drop(editor);
        self.root.detach();
        tracing::debug!("bridge stopped");
    }

    fn fail(&self) {
        let mut inner = self.shared.inner.lock().unwrap();
        BridgeShared::transition(&mut inner, BridgePhase::Failed);
    }
}

impl fmt::Debug for EditorBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorBridge")
            .field("phase", &self.phase())
            .field("enabled", &self.shared.config.enabled)
            .field("title", &self.shared.config.title)
            .finish()
    }
}
