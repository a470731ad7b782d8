// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # jitdebug
//!
//! In-process store for the debug information a JIT compiler produces: for every compiled
//! method, where its machine code lives, how native offsets map back to IL offsets, and
//! where its `this`, parameters and locals sit. Records are kept per execution domain in a
//! compact LEB128-based byte format and decoded on demand to answer stack-trace and
//! debugger queries.
//!
//! ## Features
//!
//! - **Compact records** - LEB128 variable-length encoding, exact-size storage
//! - **Per-domain arenas** - bump-allocated records freed wholesale when a domain unloads
//! - **Dynamic methods** - individually freeable records for runtime-generated code
//! - **Symbol integration** - pluggable external symbol sources for file/line and locals
//! - **Bundled symbols** - symbol bytes embedded in the host binary, matched by module name
//! - **One recursive lock** - every operation serialized behind a re-entrant gate
//! - **Zero-cost off switch** - `DebugFormat::None` turns every entry point into one branch
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use jitdebug::prelude::*;
//!
//! let service = DebugService::new(DebugConfig::default(), Arc::new(NoSymbols))?;
//! service.domain_create(DomainId(1));
//! assert!(service.enabled());
//! # Ok::<(), jitdebug::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`codec`] - byte cursor and buffer with LEB128 support
//! - [`jit`] - identities, decoded debug info and the record codec
//! - [`domain`] - arena, per-domain data table and the domain map
//! - [`symbols`] - collaborator traits, debug handles and bundled symbols
//! - [`resolve`] - native-to-IL resolution and stack-frame formatting
//! - [`gate`] - the re-entrant lock
//! - [`config`] - debug format and tuning knobs
//! - [`service`] - [`DebugService`], the entry points the host calls
//!
//! ## Error Handling
//!
//! Recoverable errors come only from the record codec and from construction and use
//! [`Error`]. Missing debug information is reported as `None`. Broken lifecycle contracts,
//! such as querying a domain that was never created, stop the process with a panic after
//! logging through [`tracing`].
//!
//! ## Fuzzing
//!
//! ```bash
//! cargo +nightly fuzz run decode
//! ```

#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use jitdebug::prelude::*;
///
/// let config = DebugConfig::disabled();
/// assert_eq!(config.format, DebugFormat::None);
/// ```
pub mod prelude;

pub mod codec;

pub mod config;
pub mod domain;
pub mod gate;
pub mod jit;
pub mod resolve;
pub mod service;
pub mod symbols;

/// `jitdebug` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

pub use codec::{parser::Parser, writer::Writer};
pub use config::{DebugConfig, DebugFormat};
pub use error::Error;
pub use service::DebugService;
