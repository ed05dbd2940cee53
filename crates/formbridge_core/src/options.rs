//! Editor option resolution
//!
//! An editor widget is configured by a single JSON options document. The
//! host model may carry a caller-supplied document under its `options` key;
//! when it does, that document is used verbatim. When it is absent (or
//! holds a non-usable value such as `null`), the built-in defaults are used
//! wholesale instead. The two documents are never merged: defaults are a
//! fallback, not a base layer, so a caller that supplies options opts out
//! of every built-in value at once.
//!
//! # Example
//!
//! ```
//! use formbridge_core::options::{resolve_options, Options};
//! use serde_json::json;
//!
//! let defaults = Options::builtin_default();
//!
//! // Caller options replace the defaults entirely.
//! let resolved = resolve_options(Some(json!({"theme": "html"})), &defaults);
//! assert_eq!(resolved.value()["theme"], "html");
//! assert!(resolved.value().get("iconlib").is_none());
//!
//! // An absent document falls back to the defaults wholesale.
//! let fallback = resolve_options(None, &defaults);
//! assert_eq!(fallback.value()["iconlib"], "spectre");
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A JSON options document handed to an editor library at construction.
///
/// The document is opaque to the bridge: it is resolved once at mount and
/// passed through to the editor untouched. Keys are whatever the concrete
/// editor library understands (`theme`, `schema`, `startval`, ...).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Options(Value);

impl Options {
    /// Wraps a raw JSON value as an options document.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The built-in default options used when the model supplies none.
    ///
    /// These configure a minimal single-field string editor and are the
    /// complete fallback document, not a merge base.
    pub fn builtin_default() -> Self {
        Self(json!({
            "theme": "bootstrap4",
            "iconlib": "spectre",
            "schema": {
                "title": "Editor Test",
                "required": ["test"],
                "properties": {
                    "test": {
                        "type": "string"
                    }
                }
            }
        }))
    }

    /// The built-in defaults with the `schema` entry replaced.
    ///
    /// Convenience for hosts that want the stock theme configuration but
    /// their own document schema.
    pub fn with_schema(schema: Value) -> Self {
        let mut options = Self::builtin_default();
        if let Value::Object(map) = &mut options.0 {
            map.insert("schema".to_string(), schema);
        }
        options
    }

    /// Borrows the underlying JSON document.
    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Unwraps the underlying JSON document.
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Looks up a top-level entry of the document, if it is an object.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

impl From<Value> for Options {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Resolves the options to hand to the editor.
///
/// Returns the caller document when one is present and usable, otherwise a
/// clone of `default`. "Usable" follows JavaScript truthiness so that a
/// model key explicitly set to `null`, `false`, `0` or `""` falls back the
/// same way an absent key does. An empty object or array counts as present
/// and is used as-is.
pub fn resolve_options(caller: Option<Value>, default: &Options) -> Options {
    match caller {
        Some(value) if is_truthy(&value) => Options(value),
        Some(_) => {
            tracing::debug!("caller options not usable, falling back to defaults");
            default.clone()
        }
        None => default.clone(),
    }
}

/// JavaScript truthiness for a JSON value.
///
/// `null`, `false`, numeric zero and the empty string are falsy; every
/// object and array, including empty ones, is truthy. JSON cannot encode
/// `NaN` or `undefined`, so those falsy cases cannot arise here.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
