//! JIT debug records: identities, decoded form and the serialized record codec.
//!
//! # Key Types
//!
//! - [`MethodJitInfo`] - decoded debug information of one compiled method
//! - [`LineNumberEntry`], [`VarInfo`], [`GsharedVars`] - its building blocks
//! - [`MethodRecord`] - borrowed view over a serialized record
//! - [`MethodAddress`] - owned summary of a stored record
//! - [`MethodId`], [`ModuleId`], [`DomainId`], [`TypeHandle`] - identity keys
//!
//! # Examples
//!
//! ```rust
//! use jitdebug::jit::{serialize_record, LineNumberEntry, MethodJitInfo, MethodRecord};
//!
//! let info = MethodJitInfo {
//!     code_start: 0x4000,
//!     code_size: 64,
//!     line_numbers: vec![LineNumberEntry::new(0, 0), LineNumberEntry::new(7, 12)],
//!     ..Default::default()
//! };
//!
//! let bytes = serialize_record(&info)?;
//! let decoded = MethodRecord::parse(&bytes)?.decode()?;
//! assert_eq!(decoded, info);
//! # Ok::<(), jitdebug::Error>(())
//! ```

mod info;
mod record;
mod token;

pub use info::{GsharedVars, LineNumberEntry, MethodJitInfo, VarInfo};
pub use record::{
    decode_method, encode_method, serialize_record, MethodAddress, MethodRecord,
    RECORD_HEADER_SIZE,
};
pub use token::{DomainId, MethodId, ModuleId, TypeHandle};
