//! Synchronized key/value model
//!
//! The model is the host-facing half of the widget: a small string-keyed
//! store of JSON values with an explicit commit step. Writes made through
//! [`Model::set`] stage locally and become a synchronization message only
//! when [`Model::save_changes`] runs, mirroring the set-then-save protocol
//! of notebook widget kernels.
//!
//! [`MemoryModel`] is the in-process implementation used by embedding
//! hosts and tests. It keeps a journal of every operation in call order so
//! a host can assert exactly what the widget did to it.
//!
//! # Example
//!
//! ```
//! use formbridge_core::model::{MemoryModel, Model};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let model = Arc::new(MemoryModel::new());
//! model.set("value", json!({"test": "hello"}));
//! model.save_changes();
//!
//! assert_eq!(model.get("value"), Some(json!({"test": "hello"})));
//! ```

use rustc_hash::FxHashMap;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

// =============================================================================
// Model trait
// =============================================================================

/// Host-side state synchronized with a widget.
///
/// Implementations are shared across threads behind an `Arc`, so all
/// methods take `&self` and writes are interior. Writes are infallible at
/// this surface: transport problems belong to the concrete host, not to
/// the widget protocol.
pub trait Model: Send + Sync {
    /// Reads the current value under `key`, staged writes included.
    fn get(&self, key: &str) -> Option<Value>;

    /// Stages `value` under `key`. Not visible to the host's sync channel
    /// until [`Model::save_changes`] commits it.
    fn set(&self, key: &str, value: Value);

    /// Commits all staged writes as one synchronization message.
    fn save_changes(&self);
}

// =============================================================================
// Operation journal
// =============================================================================

/// One recorded call against a [`MemoryModel`].
#[derive(Clone, Debug, PartialEq)]
pub enum ModelOp {
    /// A `set(key, value)` call.
    Set { key: String, value: Value },
    /// A `save_changes()` call.
    SaveChanges,
}

/// Snapshot delivered to commit subscribers.
#[derive(Clone, Debug)]
pub struct ModelCommit {
    /// Keys staged since the previous commit, in first-write order.
    pub changed: Vec<String>,
    /// Full entry snapshot at commit time.
    pub entries: FxHashMap<String, Value>,
}

/// Token identifying a commit subscription, used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubscriptionHandle {
    id: u64,
}

type CommitCallback = Arc<dyn Fn(&ModelCommit) + Send + Sync>;

// =============================================================================
// MemoryModel
// =============================================================================

struct ModelState {
    entries: FxHashMap<String, Value>,
    /// Keys written since the last commit, first-write order, deduplicated.
    dirty: Vec<String>,
    ops: Vec<ModelOp>,
}

/// In-process [`Model`] with an operation journal and commit notifications.
///
/// Entries seeded through [`MemoryModel::with_entries`] are initial state
/// and do not appear in the journal.
pub struct MemoryModel {
    state: Mutex<ModelState>,
    subscribers: RwLock<FxHashMap<u64, CommitCallback>>,
    next_subscription: AtomicU64,
}

impl MemoryModel {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self::with_entries(std::iter::empty::<(String, Value)>())
    }

    /// Creates a model seeded with `entries`.
    pub fn with_entries<S, I>(entries: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, Value)>,
    {
        let entries = entries
            .into_iter()
            .map(|(key, value)| (key.into(), value))
            .collect();
        Self {
            state: Mutex::new(ModelState {
                entries,
                dirty: Vec::new(),
                ops: Vec::new(),
            }),
            subscribers: RwLock::new(FxHashMap::default()),
            next_subscription: AtomicU64::new(1),
        }
    }

    /// Registers a callback invoked once per [`Model::save_changes`] call.
    ///
    /// Callbacks run on the committing thread, after the commit has been
    /// journaled and with the model's locks released, so a callback may
    /// itself subscribe or unsubscribe.
    pub fn subscribe_commits<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn(&ModelCommit) + Send + Sync + 'static,
    {
        let id = self.next_subscription.fetch_add(1, Ordering::Relaxed);
        self.subscribers
            .write()
            .unwrap()
            .insert(id, Arc::new(callback));
        SubscriptionHandle { id }
    }

    /// Removes a commit subscription. Returns `false` if the handle was
    /// already removed.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        self.subscribers
            .write()
            .unwrap()
            .remove(&handle.id)
            .is_some()
    }

    /// The full operation journal, in call order.
    pub fn ops(&self) -> Vec<ModelOp> {
        self.state.lock().unwrap().ops.clone()
    }

    /// Number of `save_changes` calls recorded so far.
    pub fn commit_count(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .ops
            .iter()
            .filter(|op| matches!(op, ModelOp::SaveChanges))
            .count()
    }

    /// Snapshot of all entries, staged writes included.
    pub fn entries(&self) -> FxHashMap<String, Value> {
        self.state.lock().unwrap().entries.clone()
    }

    fn notify_subscribers(&self, commit: &ModelCommit) {
        // Snapshot first: callbacks run with the subscriber lock released
        // so they can subscribe or unsubscribe from inside.
        let callbacks: Vec<CommitCallback> = {
            let subscribers = self.subscribers.read().unwrap();
            subscribers.values().cloned().collect()
        };
        for callback in callbacks {
            callback(commit);
        }
    }
}

impl Default for MemoryModel {
    fn default() -> Self {
        Self::new()
    }
}

impl Model for MemoryModel {
    fn get(&self, key: &str) -> Option<Value> {
        self.state.lock().unwrap().entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) {
        let mut state = self.state.lock().unwrap();
        state.ops.push(ModelOp::Set {
            key: key.to_string(),
            value: value.clone(),
        });
        if !state.dirty.iter().any(|k| k == key) {
            state.dirty.push(key.to_string());
        }
        state.entries.insert(key.to_string(), value);
    }

    fn save_changes(&self) {
        let commit = {
            let mut state = self.state.lock().unwrap();
            state.ops.push(ModelOp::SaveChanges);
            let changed = std::mem::take(&mut state.dirty);
            tracing::debug!(changed = changed.len(), "model commit");
            ModelCommit {
                changed,
                entries: state.entries.clone(),
            }
        };
        self.notify_subscribers(&commit);
    }
}
