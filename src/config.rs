//! Debug support configuration
//!
//! Debug support is switched on once, at service construction, by picking a
//! [`DebugFormat`]. With [`DebugFormat::None`] every entry point of
//! [`crate::DebugService`] returns immediately and the service never takes its lock.

use strum::{Display, EnumIter, EnumString};

use crate::domain::DEFAULT_CHUNK_SIZE;

/// Debug information format requested by the host.
///
/// Parses from and prints as lowercase (`"none"`, `"mono"`, `"debugger"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum DebugFormat {
    /// Debug support disabled.
    None,
    /// In-process debug records.
    #[default]
    Mono,
    /// Legacy external debugger format. Recognized but rejected.
    Debugger,
}

/// Configuration for [`crate::DebugService`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugConfig {
    /// Requested debug format
    pub format: DebugFormat,

    /// Size in bytes of the arena chunks backing each domain's records (default: 4096)
    /// Records larger than a chunk get a chunk of their own
    pub arena_chunk_size: usize,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            format: DebugFormat::Mono,
            arena_chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl DebugConfig {
    /// Creates a configuration with debug support switched off
    ///
    /// Every service entry point becomes a no-op answering with its neutral value.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            format: DebugFormat::None,
            ..Self::default()
        }
    }

    /// Replaces the requested format
    #[must_use]
    pub fn with_format(mut self, format: DebugFormat) -> Self {
        self.format = format;
        self
    }

    /// Replaces the arena chunk size
    #[must_use]
    pub fn with_arena_chunk_size(mut self, size: usize) -> Self {
        self.arena_chunk_size = size;
        self
    }

    /// Returns `true` if debug support is requested
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.format != DebugFormat::None
    }
}
