//! One debug handle per loaded module.
//!
//! A [`DebugHandle`] retains its module for as long as it is registered and owns the
//! module's external symbol source, if one could be opened. The [`HandleRegistry`]
//! guarantees at most one handle per module: opening an already registered module
//! returns the existing handle without retaining the module a second time.

use std::{fmt, sync::Arc};

use dashmap::DashMap;

use crate::{
    jit::ModuleId,
    symbols::{MethodInfo, ModuleRc, SymbolFile, SymbolMethod, SymbolReader},
};

/// Debug state of one loaded module.
pub struct DebugHandle {
    module: ModuleRc,
    symfile: Option<Box<dyn SymbolFile>>,
}

impl DebugHandle {
    /// The module this handle retains.
    #[must_use]
    pub fn module(&self) -> &ModuleRc {
        &self.module
    }

    /// Identity of the retained module.
    #[must_use]
    pub fn module_id(&self) -> ModuleId {
        self.module.id()
    }

    /// The external symbol source, if one was opened.
    #[must_use]
    pub fn symbol_file(&self) -> Option<&dyn SymbolFile> {
        self.symfile.as_deref()
    }

    /// `true` if a symbol source exists and reports itself loaded.
    #[must_use]
    pub fn has_loaded_symbols(&self) -> bool {
        self.symfile.as_ref().is_some_and(|file| file.is_loaded())
    }
}

impl fmt::Debug for DebugHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugHandle")
            .field("module", &self.module.id())
            .field("name", &self.module.name())
            .field("symbols", &self.symfile.is_some())
            .finish()
    }
}

/// Registry of debug handles keyed by module identity.
#[derive(Debug, Default)]
pub struct HandleRegistry {
    handles: DashMap<ModuleId, Arc<DebugHandle>>,
}

impl HandleRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        HandleRegistry {
            handles: DashMap::new(),
        }
    }

    /// Handle registered for `module`, if any.
    #[must_use]
    pub fn get(&self, module: ModuleId) -> Option<Arc<DebugHandle>> {
        self.handles.get(&module).map(|entry| Arc::clone(entry.value()))
    }

    /// Returns `true` if `module` has a handle.
    #[must_use]
    pub fn contains(&self, module: ModuleId) -> bool {
        self.handles.contains_key(&module)
    }

    /// Register a handle for `module`, or return the one already registered.
    ///
    /// A new handle retains `module` and asks `reader` for a symbol source built from
    /// `raw`. The handle is registered even when no source could be opened. Dynamic
    /// modules are never registered and yield `None`.
    pub fn open(
        &self,
        module: &ModuleRc,
        raw: Option<&[u8]>,
        reader: &dyn SymbolReader,
    ) -> Option<Arc<DebugHandle>> {
        if module.is_dynamic() {
            return None;
        }

        let id = module.id();
        if let Some(existing) = self.get(id) {
            return Some(existing);
        }

        let symfile = reader.open(module, raw, raw.is_some());
        tracing::debug!(
            "opened debug handle for {} ({}), symbols: {}",
            module.name(),
            id,
            symfile.is_some()
        );

        let handle = Arc::new(DebugHandle {
            module: Arc::clone(module),
            symfile,
        });
        self.handles.insert(id, Arc::clone(&handle));
        Some(handle)
    }

    /// Unregister the handle of `module`, releasing the module and closing its symbol
    /// source once no caller still holds the handle. Returns `false` if there was none.
    pub fn close(&self, module: ModuleId) -> bool {
        match self.handles.remove(&module) {
            Some((_, handle)) => {
                tracing::debug!("closed debug handle for {}", handle.module.name());
                true
            }
            None => false,
        }
    }

    /// Find the symbol entry of `method` across all registered symbol sources.
    ///
    /// The handle of the method's own module is asked first, then every other handle;
    /// the first source that knows the method wins. Handles are collected before any
    /// source is asked, so a source may re-enter the registry.
    #[must_use]
    pub fn lookup_method(&self, method: &dyn MethodInfo) -> Option<(Arc<DebugHandle>, SymbolMethod)> {
        let ask = |handle: &Arc<DebugHandle>| {
            let file = handle.symbol_file()?;
            let found = file.lookup_method(&handle.module, method)?;
            Some((Arc::clone(handle), found))
        };

        let owner = method.module();
        if let Some(found) = self.get(owner).as_ref().and_then(ask) {
            return Some(found);
        }

        let others: Vec<Arc<DebugHandle>> = self
            .handles
            .iter()
            .filter(|entry| *entry.key() != owner)
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        others.iter().find_map(ask)
    }

    /// Number of registered handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns `true` if no handle is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Drop every handle.
    pub fn clear(&self) {
        self.handles.clear();
    }
}
