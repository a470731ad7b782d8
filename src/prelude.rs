//! # jitdebug Prelude
//!
//! The types a host needs to wire debug support into its runtime.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all jitdebug operations
pub use crate::Error;

/// The result type used throughout jitdebug
pub use crate::Result;

/// Debug support configuration
pub use crate::{DebugConfig, DebugFormat};

// ================================================================================================
// Main Entry Point
// ================================================================================================

/// The debug service
pub use crate::DebugService;

// ================================================================================================
// Records
// ================================================================================================

pub use crate::jit::{
    DomainId, GsharedVars, LineNumberEntry, MethodAddress, MethodId, MethodJitInfo, ModuleId,
    TypeHandle, VarInfo,
};

// ================================================================================================
// Collaborators
// ================================================================================================

pub use crate::symbols::{
    DebugHandle, LocalsInfo, MethodInfo, ModuleInfo, ModuleRc, NoSymbols, SourceLocation,
    SymbolFile, SymbolMethod, SymbolReader,
};
