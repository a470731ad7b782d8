//! Per-domain storage of method debug records.
//!
//! Every execution domain owns one [`DataTable`]. Tables are created when the domain is
//! created and dropped wholesale, arena and all, when it unloads.
//!
//! # Key Components
//!
//! - [`RecordArena`] - chunked bump allocator backing ordinary records
//! - [`DataTable`] - method-to-record index of one domain
//! - [`DomainTables`] - the domain-to-table map

mod arena;
mod table;

pub use arena::{ArenaSpan, RecordArena, DEFAULT_CHUNK_SIZE};
pub use table::{DataTable, DataTableStats, MethodKey};

use dashmap::DashMap;

use crate::jit::DomainId;

/// Map from domain to its [`DataTable`].
#[derive(Debug)]
pub struct DomainTables {
    tables: DashMap<DomainId, DataTable>,
    chunk_size: usize,
}

impl DomainTables {
    /// Create an empty map whose tables allocate arena chunks of `chunk_size` bytes.
    #[must_use]
    pub fn new(chunk_size: usize) -> Self {
        DomainTables {
            tables: DashMap::new(),
            chunk_size,
        }
    }

    /// Create the table of `domain`. An existing table for the same domain is dropped.
    pub fn create(&self, domain: DomainId) {
        let previous = self
            .tables
            .insert(domain, DataTable::new(domain, self.chunk_size));
        if previous.is_some() {
            tracing::warn!("domain {domain} created twice, previous records discarded");
        } else {
            tracing::debug!("created data table for domain {domain}");
        }
    }

    /// Drop the table of `domain` together with every record it holds.
    ///
    /// Returns `false`, after logging a warning, if the domain was never created.
    pub fn destroy(&self, domain: DomainId) -> bool {
        match self.tables.remove(&domain) {
            Some((_, table)) => {
                tracing::debug!(
                    "destroyed data table for domain {domain} ({} records)",
                    table.len()
                );
                true
            }
            None => {
                tracing::warn!("unloading unknown domain {domain}");
                false
            }
        }
    }

    /// Returns `true` if `domain` has a table.
    #[must_use]
    pub fn contains(&self, domain: DomainId) -> bool {
        self.tables.contains_key(&domain)
    }

    /// Run `f` against the table of `domain`.
    ///
    /// The table's shard stays locked while `f` runs, so `f` must not call back into host
    /// code.
    ///
    /// # Panics
    /// A domain without a table was never created or already unloaded; that is a caller
    /// bug and stops the process.
    pub fn with_table<R>(&self, domain: DomainId, f: impl FnOnce(&DataTable) -> R) -> R {
        match self.tables.get(&domain) {
            Some(table) => f(table.value()),
            None => fatal_error!("lookup of data table for domain {} failed", domain),
        }
    }

    /// Run `f` against the table of `domain` with write access.
    ///
    /// # Panics
    /// Same as [`DomainTables::with_table`].
    pub fn with_table_mut<R>(&self, domain: DomainId, f: impl FnOnce(&mut DataTable) -> R) -> R {
        match self.tables.get_mut(&domain) {
            Some(mut table) => f(table.value_mut()),
            None => fatal_error!("lookup of data table for domain {} failed", domain),
        }
    }

    /// Number of live domains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns `true` if no domain is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Drop every table.
    pub fn clear(&self) {
        self.tables.clear();
    }
}

impl Default for DomainTables {
    fn default() -> Self {
        DomainTables::new(DEFAULT_CHUNK_SIZE)
    }
}
