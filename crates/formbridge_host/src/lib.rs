//! Formbridge Host
//!
//! The element tree widgets mount into. An embedding host owns a tree of
//! [`Element`] nodes, hands one node to a widget as its mount container,
//! and tears the widget down by dropping that subtree.
//!
//! # Example
//!
//! ```rust
//! use formbridge_host::Element;
//!
//! let container = Element::new("div");
//! let child = Element::new("div");
//! child.set_attribute("id", "jsoneditor-container");
//! container.append_child(&child);
//!
//! assert!(container.find_by_id("jsoneditor-container").is_some());
//! ```

pub mod element;

pub use element::{Element, ElementId};
