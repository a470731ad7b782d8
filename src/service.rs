//! The debug service: every entry point the host runtime calls.
//!
//! [`DebugService`] owns the handle registry, the per-domain data tables and the bundled
//! symbol list behind one re-entrant [`DebugGate`]. The host wires its lifecycle
//! notifications to it (domain create/unload, module load/close, method compiled/freed)
//! and asks it questions (record of a method, IL offset of a native offset, source
//! location, locals, printable stack frame).
//!
//! When constructed with [`DebugFormat::None`] every entry point returns its neutral
//! value (`None`, `false`, nothing) before the gate is taken.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use jitdebug::{
//!     jit::{DomainId, LineNumberEntry, MethodId, MethodJitInfo, ModuleId},
//!     symbols::{MethodInfo, NoSymbols},
//!     DebugConfig, DebugService,
//! };
//!
//! struct Compiled(u64);
//!
//! impl MethodInfo for Compiled {
//!     fn id(&self) -> MethodId { MethodId(self.0) }
//!     fn module(&self) -> ModuleId { ModuleId(1) }
//!     fn is_dynamic(&self) -> bool { false }
//!     fn full_name(&self) -> String { "Program:Main ()".to_string() }
//! }
//!
//! let service = DebugService::new(DebugConfig::default(), Arc::new(NoSymbols))?;
//! let domain = DomainId(1);
//! service.domain_create(domain);
//!
//! let info = MethodJitInfo {
//!     code_start: 0x1000,
//!     code_size: 32,
//!     line_numbers: vec![LineNumberEntry::new(0, 0), LineNumberEntry::new(6, 12)],
//!     ..Default::default()
//! };
//! let method = Compiled(7);
//! service.add_method(&method, &info, domain)?;
//!
//! assert_eq!(service.il_offset_from_native(method.id(), domain, 20), Some(6));
//! assert_eq!(
//!     service.print_stack_frame(&method, 20, domain),
//!     "at Program.Main () <IL 0x00006, 0x00014>"
//! );
//! # Ok::<(), jitdebug::Error>(())
//! ```

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::{
    config::{DebugConfig, DebugFormat},
    domain::{DataTable, DataTableStats, DomainTables, MethodKey},
    gate::DebugGate,
    jit::{DomainId, MethodAddress, MethodId, MethodJitInfo, ModuleId},
    resolve,
    symbols::{
        BundleList, DebugHandle, HandleRegistry, LocalsInfo, MethodInfo, ModuleRc,
        SourceLocation, SymbolMethod, SymbolReader,
    },
    Error, Result,
};

/// Everything the gate protects.
#[derive(Debug)]
struct DebugState {
    handles: HandleRegistry,
    tables: DomainTables,
    bundles: BundleList,
}

/// Process-scoped JIT debug-information store.
///
/// All methods take `&self`; the service is meant to be shared across threads, typically
/// behind an [`Arc`].
pub struct DebugService {
    config: DebugConfig,
    reader: Arc<dyn SymbolReader>,
    gate: DebugGate<DebugState>,
    debugger_attached: AtomicBool,
}

impl DebugService {
    /// Initialize debug support.
    ///
    /// `reader` opens the external symbol source of each loaded module.
    ///
    /// # Errors
    /// Returns [`Error::NotSupported`] for [`DebugFormat::Debugger`], which is no longer
    /// supported.
    pub fn new(config: DebugConfig, reader: Arc<dyn SymbolReader>) -> Result<Self> {
        if config.format == DebugFormat::Debugger {
            return Err(Error::NotSupported(format!(
                "the '{}' debug format is no longer supported",
                config.format
            )));
        }

        tracing::debug!("debug support initialized, format {}", config.format);

        Ok(DebugService {
            config,
            reader,
            gate: DebugGate::new(DebugState {
                handles: HandleRegistry::new(),
                tables: DomainTables::new(config.arena_chunk_size),
                bundles: BundleList::new(),
            }),
            debugger_attached: AtomicBool::new(false),
        })
    }

    /// `true` unless the service was configured with [`DebugFormat::None`].
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_enabled()
    }

    /// The configured format.
    #[must_use]
    pub fn format(&self) -> DebugFormat {
        self.config.format
    }

    /// The configuration the service was built with.
    #[must_use]
    pub fn config(&self) -> &DebugConfig {
        &self.config
    }

    // Domains

    /// Create the data table of a new domain.
    pub fn domain_create(&self, domain: DomainId) {
        enabled_or!(self, ());

        let state = self.gate.lock();
        state.tables.create(domain);
    }

    /// Drop the data table of an unloading domain and every record in it.
    ///
    /// Records previously returned for the domain become invalid. An unknown domain is
    /// logged and ignored.
    pub fn domain_unload(&self, domain: DomainId) {
        enabled_or!(self, ());

        let state = self.gate.lock();
        state.tables.destroy(domain);
    }

    // Modules

    /// Load hook: open the debug handle of a freshly loaded module.
    ///
    /// Bundled symbols registered under the module's name are used when present;
    /// otherwise the reader is asked to find symbols on its own.
    pub fn module_loaded(&self, module: &ModuleRc) -> Option<Arc<DebugHandle>> {
        enabled_or!(self, None);

        let state = self.gate.lock();
        let bundled = state.bundles.find(module.name());
        if bundled.is_some() {
            tracing::debug!("using bundled symbols for {}", module.name());
        }
        state.handles.open(module, bundled, &*self.reader)
    }

    /// Open the debug handle of `module`, reading symbols from `raw` if given.
    ///
    /// Idempotent: an already registered module returns its existing handle, whatever
    /// `raw` holds. Dynamic modules yield `None`.
    pub fn open_image(&self, module: &ModuleRc, raw: Option<&[u8]>) -> Option<Arc<DebugHandle>> {
        enabled_or!(self, None);

        let state = self.gate.lock();
        state.handles.open(module, raw, &*self.reader)
    }

    /// [`DebugService::open_image`] for hosts that already hold the symbol bytes.
    pub fn open_image_from_memory(&self, module: &ModuleRc, raw: &[u8]) -> Option<Arc<DebugHandle>> {
        self.open_image(module, Some(raw))
    }

    /// Close the debug handle of `module`, releasing the module and its symbol source.
    /// Returns `false` if the module had no handle.
    pub fn close_image(&self, module: ModuleId) -> bool {
        enabled_or!(self, false);

        let state = self.gate.lock();
        state.handles.close(module)
    }

    /// The registered handle of `module`.
    #[must_use]
    pub fn debug_handle(&self, module: ModuleId) -> Option<Arc<DebugHandle>> {
        enabled_or!(self, None);

        let state = self.gate.lock();
        state.handles.get(module)
    }

    /// `true` if `module` has a debug handle, whether or not symbols were found for it.
    #[must_use]
    pub fn image_has_debug_info(&self, module: ModuleId) -> bool {
        enabled_or!(self, false);

        let state = self.gate.lock();
        state.handles.contains(module)
    }

    /// Register symbol bytes shipped inside the host binary for the module named
    /// `module_name`. A later registration under the same name takes precedence.
    pub fn register_bundled_symbols(&self, module_name: &'static str, bytes: &'static [u8]) {
        enabled_or!(self, ());

        let state = self.gate.lock();
        state.bundles.register(module_name, bytes);
        tracing::debug!("registered {} bundled symbol bytes for {module_name}", bytes.len());
    }

    // Methods

    /// Store the debug record of a freshly compiled method in `domain`.
    ///
    /// A second call for the same method replaces the earlier record. Returns `None` when
    /// debug support is disabled.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if `info` cannot be encoded.
    ///
    /// # Panics
    /// Stops the process if `domain` was never created.
    pub fn add_method(
        &self,
        method: &dyn MethodInfo,
        info: &MethodJitInfo,
        domain: DomainId,
    ) -> Result<Option<MethodAddress>> {
        enabled_or!(self, Ok(None));

        let key = MethodKey::of(method);
        let state = self.gate.lock();
        state
            .tables
            .with_table_mut(domain, |table| table.insert(key, info))
            .map(Some)
    }

    /// Free the record of a dynamic method.
    ///
    /// # Panics
    /// Stops the process if `method` is not dynamic or `domain` was never created.
    pub fn remove_method(&self, method: &dyn MethodInfo, domain: DomainId) {
        enabled_or!(self, ());

        let key = MethodKey::of(method);
        if !key.is_dynamic {
            fatal_error!("remove_method called for non-dynamic method {}", key.id);
        }

        let state = self.gate.lock();
        let removed = state.tables.with_table_mut(domain, |table| table.remove(key));
        if removed {
            tracing::trace!("domain {domain}: removed record of {}", key.id);
        } else {
            tracing::warn!("domain {domain}: no record to remove for {}", key.id);
        }
    }

    /// Header summary of the stored record of `method`.
    #[must_use]
    pub fn lookup_method_address(&self, method: MethodId, domain: DomainId) -> Option<MethodAddress> {
        enabled_or!(self, None);

        let state = self.gate.lock();
        state.tables.with_table(domain, |table| table.address(method))
    }

    /// Decode the stored record of `method`. The result belongs to the caller.
    #[must_use]
    pub fn find_method(&self, method: MethodId, domain: DomainId) -> Option<MethodJitInfo> {
        enabled_or!(self, None);

        let state = self.gate.lock();
        state.tables.with_table(domain, |table| table.find(method))
    }

    /// IL offset corresponding to `native_offset` in the compiled code of `method`.
    #[must_use]
    pub fn il_offset_from_native(
        &self,
        method: MethodId,
        domain: DomainId,
        native_offset: i32,
    ) -> Option<u32> {
        enabled_or!(self, None);

        let _state = self.gate.lock();
        let info = self.find_method(method, domain)?;
        resolve::il_offset_from_native(&info, native_offset)
    }

    // Symbols

    /// Symbol-source entry of `method`, searched across every registered module.
    #[must_use]
    pub fn lookup_method(&self, method: &dyn MethodInfo) -> Option<SymbolMethod> {
        enabled_or!(self, None);

        let state = self.gate.lock();
        state
            .handles
            .lookup_method(method)
            .map(|(_, symbol_method)| symbol_method)
    }

    /// Source position of `native_offset` in the compiled code of `method`.
    ///
    /// Needs a handle with a loaded symbol source that knows the method, and a record
    /// resolving the offset; `None` otherwise.
    #[must_use]
    pub fn lookup_source_location(
        &self,
        method: &dyn MethodInfo,
        native_offset: i32,
        domain: DomainId,
    ) -> Option<SourceLocation> {
        enabled_or!(self, None);

        let state = self.gate.lock();
        let (handle, symbol_method) = state.handles.lookup_method(method)?;
        let symfile = handle.symbol_file().filter(|file| file.is_loaded())?;

        let il_offset = self.il_offset_from_native(method.id(), domain, native_offset)?;
        symfile.lookup_location(&symbol_method, il_offset)
    }

    /// Local variable names and scopes of `method`, from its symbol source.
    #[must_use]
    pub fn lookup_locals(&self, method: &dyn MethodInfo) -> Option<LocalsInfo> {
        enabled_or!(self, None);

        let state = self.gate.lock();
        let (handle, symbol_method) = state.handles.lookup_method(method)?;
        let symfile = handle.symbol_file().filter(|file| file.is_loaded())?;
        symfile.lookup_locals(&symbol_method)
    }

    /// One printable stack-frame line for `native_offset` in `method`.
    ///
    /// Works in disabled mode too, falling back to the native offset alone.
    #[must_use]
    pub fn print_stack_frame(&self, method: &dyn MethodInfo, native_offset: i32, domain: DomainId) -> String {
        let location = self.lookup_source_location(method, native_offset, domain);
        let il_offset = match location {
            Some(_) => None,
            None => self.il_offset_from_native(method.id(), domain, native_offset),
        };

        resolve::format_stack_frame(
            &method.full_name(),
            location.as_ref(),
            il_offset,
            native_offset,
        )
    }

    // Diagnostics

    /// Counters of the data table of `domain`, `None` if it does not exist.
    #[must_use]
    pub fn domain_stats(&self, domain: DomainId) -> Option<DataTableStats> {
        enabled_or!(self, None);

        let state = self.gate.lock();
        if !state.tables.contains(domain) {
            return None;
        }
        Some(state.tables.with_table(domain, DataTable::stats))
    }

    /// How many times the gate was taken since construction.
    #[must_use]
    pub fn gate_acquisitions(&self) -> usize {
        self.gate.acquisitions()
    }

    /// Mark whether an external debugger is attached. Advisory only; not gated.
    pub fn set_debugger_attached(&self, attached: bool) {
        self.debugger_attached.store(attached, Ordering::Relaxed);
    }

    /// Whether an external debugger was marked attached.
    #[must_use]
    pub fn is_debugger_attached(&self) -> bool {
        self.debugger_attached.load(Ordering::Relaxed)
    }

    /// Drop every debug handle and every domain table.
    ///
    /// Modules are released and symbol sources closed once no caller still holds their
    /// handle. Bundled symbol registrations survive.
    pub fn cleanup(&self) {
        enabled_or!(self, ());

        let state = self.gate.lock();
        state.handles.clear();
        state.tables.clear();
        tracing::debug!("debug support cleaned up");
    }
}

impl std::fmt::Debug for DebugService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebugService")
            .field("config", &self.config)
            .field("debugger_attached", &self.is_debugger_attached())
            .finish_non_exhaustive()
    }
}
