//! Collaborator contracts and the per-module debug handle registry.
//!
//! The store does not model modules or methods, and it does not parse symbol files. It
//! consumes them through the traits in this module:
//!
//! - [`ModuleInfo`] - a loaded code module; shared as [`ModuleRc`], where holding a clone
//!   is the retain and dropping it the release
//! - [`MethodInfo`] - a compiled method with its owning module
//! - [`SymbolReader`] - opens an external symbol source for a module
//! - [`SymbolFile`] - an opened source answering method, location and locals queries;
//!   dropping it closes it
//!
//! On top of these sit [`DebugHandle`] / [`HandleRegistry`] (one handle per module) and
//! [`BundleList`] (symbol bytes embedded in the host binary).

use std::sync::Arc;

use crate::jit::{MethodId, ModuleId};

mod bundle;
mod handle;

pub use bundle::{BundleList, BundledSymbols};
pub use handle::{DebugHandle, HandleRegistry};

/// A loaded unit of code that may carry debug information.
pub trait ModuleInfo: Send + Sync {
    /// Stable identity of the module.
    fn id(&self) -> ModuleId;

    /// Module name, matched against bundled symbol entries.
    fn name(&self) -> &str;

    /// `true` for modules synthesized at runtime. Debug information is never kept for them.
    fn is_dynamic(&self) -> bool;
}

/// Shared module reference; a live clone keeps the module retained.
pub type ModuleRc = Arc<dyn ModuleInfo>;

/// A compiled method.
pub trait MethodInfo: Send + Sync {
    /// Stable identity of the method.
    fn id(&self) -> MethodId;

    /// The module declaring the method.
    fn module(&self) -> ModuleId;

    /// `true` for methods generated and possibly discarded at runtime.
    fn is_dynamic(&self) -> bool;

    /// Fully qualified name, as printed in stack frames.
    fn full_name(&self) -> String;
}

/// Domain-independent symbol information of a method, as found in a symbol source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolMethod {
    /// Module whose symbol source produced this entry.
    pub module: ModuleId,
    /// The method it describes.
    pub method: MethodId,
    /// Reader-specific index of the method inside the symbol source.
    pub index: u32,
}

/// A resolved source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Path of the source file.
    pub source_file: String,
    /// 1-based line.
    pub row: u32,
    /// 1-based column, `0` when unknown.
    pub column: u32,
    /// IL offset the location was resolved for.
    pub il_offset: u32,
}

/// A lexical block of a method's IL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeBlock {
    /// Index of the enclosing block in [`LocalsInfo::code_blocks`].
    pub parent: Option<usize>,
    /// First IL offset of the block.
    pub start_offset: u32,
    /// IL offset one past the block.
    pub end_offset: u32,
}

/// A named local variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVariable {
    /// Source name.
    pub name: String,
    /// Local slot index.
    pub index: u32,
    /// Index of the declaring block in [`LocalsInfo::code_blocks`].
    pub block: Option<usize>,
}

/// Local variable names and scopes of a method.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LocalsInfo {
    /// Locals in slot order.
    pub locals: Vec<LocalVariable>,
    /// Lexical blocks referenced by `locals`.
    pub code_blocks: Vec<CodeBlock>,
}

/// Factory for external symbol sources.
pub trait SymbolReader: Send + Sync {
    /// Open the symbol source of `module`.
    ///
    /// `raw` holds symbol bytes when the host already has them (bundled or in memory);
    /// `None` asks the reader to locate them itself. Returning `None` is normal: the
    /// module simply has no symbols.
    fn open(&self, module: &ModuleRc, raw: Option<&[u8]>, in_memory: bool)
        -> Option<Box<dyn SymbolFile>>;
}

/// An opened external symbol source.
pub trait SymbolFile: Send + Sync {
    /// `true` once the source holds usable data.
    fn is_loaded(&self) -> bool;

    /// Find the symbol entry of `method`.
    fn lookup_method(&self, module: &ModuleRc, method: &dyn MethodInfo) -> Option<SymbolMethod>;

    /// Map an IL offset of `method` to a source position.
    fn lookup_location(&self, method: &SymbolMethod, il_offset: u32) -> Option<SourceLocation>;

    /// Local variable names and scopes of `method`.
    fn lookup_locals(&self, method: &SymbolMethod) -> Option<LocalsInfo>;
}

/// Reader for hosts without symbol support; never opens anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSymbols;

impl SymbolReader for NoSymbols {
    fn open(
        &self,
        _module: &ModuleRc,
        _raw: Option<&[u8]>,
        _in_memory: bool,
    ) -> Option<Box<dyn SymbolFile>> {
        None
    }
}
