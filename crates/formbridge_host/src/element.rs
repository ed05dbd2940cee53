//! Host element tree
//!
//! A minimal DOM-shaped tree standing in for whatever surface the embedding
//! host renders into. Widgets receive an [`Element`] as their mount
//! container, append their own subtree under it, and are torn down when the
//! host drops that subtree.
//!
//! Elements are cheap shared handles: cloning an [`Element`] clones the
//! handle, not the node, and every clone observes the same tree. Structure,
//! attributes and text are mutated through `&self`, matching how a render
//! surface is shared between a host and the widgets mounted into it.
//!
//! Parent links are weak, so a subtree is kept alive by its root handle and
//! by the child references of its ancestors, never by its descendants.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

static NEXT_ELEMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of an element node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ElementId(u64);

impl ElementId {
    fn next() -> Self {
        Self(NEXT_ELEMENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw numeric id.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

struct ElementNode {
    id: ElementId,
    tag: String,
    attributes: FxHashMap<String, String>,
    text: String,
    children: Vec<Element>,
    parent: Option<Weak<RwLock<ElementNode>>>,
    /// Host-attached components (mounted applications, controllers).
    components: SmallVec<[Arc<dyn Any + Send + Sync>; 2]>,
}

/// Shared handle to one node of the host tree.
#[derive(Clone)]
pub struct Element {
    inner: Arc<RwLock<ElementNode>>,
}

impl Element {
    /// Creates a detached element with the given tag name.
    pub fn new(tag: &str) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ElementNode {
                id: ElementId::next(),
                tag: tag.to_string(),
                attributes: FxHashMap::default(),
                text: String::new(),
                children: Vec::new(),
                parent: None,
                components: SmallVec::new(),
            })),
        }
    }

    /// The node's process-unique id.
    pub fn id(&self) -> ElementId {
        self.inner.read().unwrap().id
    }

    /// The tag name given at creation.
    pub fn tag(&self) -> String {
        self.inner.read().unwrap().tag.clone()
    }

    /// Whether two handles refer to the same node.
    pub fn is_same(&self, other: &Element) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // =========================================================================
    // Attributes and text
    // =========================================================================

    /// Sets (or replaces) an attribute.
    pub fn set_attribute(&self, name: &str, value: &str) {
        self.inner
            .write()
            .unwrap()
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    /// Reads an attribute.
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.inner.read().unwrap().attributes.get(name).cloned()
    }

    /// Replaces the node's text content.
    pub fn set_text(&self, text: &str) {
        self.inner.write().unwrap().text = text.to_string();
    }

    /// The node's text content.
    pub fn text(&self) -> String {
        self.inner.read().unwrap().text.clone()
    }

    // =========================================================================
    // Tree structure
    // =========================================================================

    /// Appends `child` as the last child of this node.
    ///
    /// A child that is already attached elsewhere is detached from its
    /// current parent first, so a node has at most one parent.
    pub fn append_child(&self, child: &Element) {
        if self.is_same(child) {
            tracing::warn!(tag = %child.tag(), "refusing to append element to itself");
            return;
        }
        child.detach();
        child.inner.write().unwrap().parent = Some(Arc::downgrade(&self.inner));
        self.inner.write().unwrap().children.push(child.clone());
    }

    /// Removes `child` from this node. Returns `false` when `child` is not
    /// a child of this node.
    pub fn remove_child(&self, child: &Element) -> bool {
        let removed = {
            let mut node = self.inner.write().unwrap();
            match node
                .children
                .iter()
                .position(|c| Arc::ptr_eq(&c.inner, &child.inner))
            {
                Some(index) => {
                    node.children.remove(index);
                    true
                }
                None => false,
            }
        };
        if removed {
            child.inner.write().unwrap().parent = None;
        }
        removed
    }

    /// Detaches this node from its parent, if any. Returns whether the
    /// node was attached.
    pub fn detach(&self) -> bool {
        match self.parent() {
            Some(parent) => parent.remove_child(self),
            None => false,
        }
    }

    /// The parent node, if attached.
    pub fn parent(&self) -> Option<Element> {
        let node = self.inner.read().unwrap();
        node.parent
            .as_ref()
            .and_then(|weak| weak.upgrade())
            .map(|inner| Element { inner })
    }

    /// Handles to all children, in document order.
    pub fn children(&self) -> Vec<Element> {
        self.inner.read().unwrap().children.clone()
    }

    /// Number of children.
    pub fn child_count(&self) -> usize {
        self.inner.read().unwrap().children.len()
    }

    /// Depth-first search for a node whose `id` attribute equals `id`,
    /// this node included.
    pub fn find_by_id(&self, id: &str) -> Option<Element> {
        let children = {
            let node = self.inner.read().unwrap();
            if node.attributes.get("id").map(String::as_str) == Some(id) {
                return Some(self.clone());
            }
            node.children.clone()
        };
        children.iter().find_map(|child| child.find_by_id(id))
    }

    // =========================================================================
    // Component slots
    // =========================================================================

    /// Attaches a host component to this node.
    ///
    /// Component slots are how a host keeps a mounted application reachable
    /// (and alive) from its container element.
    pub fn attach_component(&self, component: Arc<dyn Any + Send + Sync>) {
        self.inner.write().unwrap().components.push(component);
    }

    /// Number of attached components.
    pub fn component_count(&self) -> usize {
        self.inner.read().unwrap().components.len()
    }

    /// The first attached component of type `T`, if any.
    pub fn component<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        let node = self.inner.read().unwrap();
        node.components
            .iter()
            .find_map(|c| c.clone().downcast::<T>().ok())
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.inner.read().unwrap();
        f.debug_struct("Element")
            .field("id", &node.id)
            .field("tag", &node.tag)
            .field("children", &node.children.len())
            .field("components", &node.components.len())
            .finish()
    }
}
