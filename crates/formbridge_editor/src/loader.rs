//! Asynchronous editor library acquisition
//!
//! Editor libraries arrive asynchronously: a real deployment fetches them
//! from a package registry or a bundled asset store, and even an in-process
//! library goes through the same seam so the bridge has exactly one
//! acquisition path. [`EditorLoader`] is that seam, and the module registry
//! maps bare module specifiers (`"jsoneditor"`) to loaders the way a host
//! import map resolves module names to sources.
//!
//! # Example
//!
//! ```ignore
//! use formbridge_editor::loader::{register_library, RegistryLoader};
//! use formbridge_editor::EditorLoader;
//! use std::sync::Arc;
//!
//! register_library("jsoneditor", my_library);
//! let loader = RegistryLoader::new("jsoneditor");
//! let library = loader.load().await?;
//! ```

use crate::error::{EditorError, Result};
use crate::library::EditorLibrary;
use rustc_hash::FxHashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, OnceLock, RwLock};

/// Module specifier used when the environment overrides nothing.
pub const DEFAULT_MODULE: &str = "jsoneditor";

/// Environment variable overriding the default module specifier.
pub const MODULE_ENV_VAR: &str = "FORMBRIDGE_EDITOR_MODULE";

/// Future produced by [`EditorLoader::load`].
pub type LoadFuture = Pin<Box<dyn Future<Output = Result<Arc<dyn EditorLibrary>>> + Send>>;

/// An asynchronous source of an editor library.
///
/// Loaders may be called more than once; implementations decide whether
/// repeated loads share one library or produce fresh ones.
pub trait EditorLoader: Send + Sync {
    /// Resolves the editor library.
    fn load(&self) -> LoadFuture;
}

// ============================================================================
// Immediate loader
// ============================================================================

/// Loader for a library already linked into the process.
///
/// Resolves immediately with the wrapped library. Useful for tests and for
/// hosts that compile their editor in statically.
pub struct LibraryLoader {
    library: Arc<dyn EditorLibrary>,
}

impl LibraryLoader {
    pub fn new(library: Arc<dyn EditorLibrary>) -> Self {
        Self { library }
    }
}

impl EditorLoader for LibraryLoader {
    fn load(&self) -> LoadFuture {
        let library = self.library.clone();
        Box::pin(async move { Ok(library) })
    }
}

// ============================================================================
// Module registry
// ============================================================================

/// Global specifier-to-loader registry.
struct ModuleRegistry {
    loaders: RwLock<FxHashMap<String, Arc<dyn EditorLoader>>>,
}

static MODULE_REGISTRY: OnceLock<ModuleRegistry> = OnceLock::new();

fn registry() -> &'static ModuleRegistry {
    MODULE_REGISTRY.get_or_init(|| ModuleRegistry {
        loaders: RwLock::new(FxHashMap::default()),
    })
}

/// Registers a loader under a module specifier, replacing any previous
/// registration.
pub fn register_module(specifier: &str, loader: Arc<dyn EditorLoader>) {
    tracing::debug!(specifier, "registering editor module");
    registry()
        .loaders
        .write()
        .unwrap()
        .insert(specifier.to_string(), loader);
}

/// Registers an in-process library under a module specifier.
///
/// Convenience wrapper that wraps `library` in a [`LibraryLoader`].
pub fn register_library(specifier: &str, library: Arc<dyn EditorLibrary>) {
    register_module(specifier, Arc::new(LibraryLoader::new(library)));
}

/// Removes a module registration. Returns `false` if the specifier was not
/// registered.
pub fn unregister_module(specifier: &str) -> bool {
    registry()
        .loaders
        .write()
        .unwrap()
        .remove(specifier)
        .is_some()
}

/// Whether a loader is registered under `specifier`.
pub fn module_is_registered(specifier: &str) -> bool {
    registry().loaders.read().unwrap().contains_key(specifier)
}

/// Looks up the loader registered under `specifier`.
pub fn resolve_module(specifier: &str) -> Result<Arc<dyn EditorLoader>> {
    registry()
        .loaders
        .read()
        .unwrap()
        .get(specifier)
        .cloned()
        .ok_or_else(|| EditorError::ModuleNotRegistered(specifier.to_string()))
}

/// The module specifier the default mount path loads.
///
/// Reads [`MODULE_ENV_VAR`] so a deployment can point the widget at a
/// different editor build without touching code; empty values fall back to
/// [`DEFAULT_MODULE`].
pub fn default_module_specifier() -> String {
    std::env::var(MODULE_ENV_VAR)
        .ok()
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_MODULE.to_string())
}

// ============================================================================
// Registry loader
// ============================================================================

/// Loader that resolves a module specifier against the registry at load
/// time.
///
/// Resolution is deferred until [`EditorLoader::load`] runs, so a module
/// registered after the loader was constructed is still found.
pub struct RegistryLoader {
    specifier: String,
}

impl RegistryLoader {
    pub fn new(specifier: impl Into<String>) -> Self {
        Self {
            specifier: specifier.into(),
        }
    }

    /// The specifier this loader resolves.
    pub fn specifier(&self) -> &str {
        &self.specifier
    }
}

impl EditorLoader for RegistryLoader {
    fn load(&self) -> LoadFuture {
        let specifier = self.specifier.clone();
        Box::pin(async move {
            let loader = resolve_module(&specifier)?;
            loader.load().await
        })
    }
}
