//! Per-domain table of serialized method records.

use std::collections::HashMap;

use crate::{
    domain::arena::{ArenaSpan, RecordArena},
    jit::{serialize_record, DomainId, MethodAddress, MethodId, MethodJitInfo, MethodRecord},
    symbols::MethodInfo,
    Result,
};

/// Identity and kind of a method, read from its [`MethodInfo`] before a table is locked.
///
/// The table never calls back into host objects, so a host method may re-enter the
/// service from any of its accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodKey {
    /// The method's identity.
    pub id: MethodId,
    /// `true` for runtime-generated methods whose record is individually freeable.
    pub is_dynamic: bool,
}

impl MethodKey {
    /// Snapshot `method`.
    #[must_use]
    pub fn of(method: &dyn MethodInfo) -> Self {
        MethodKey {
            id: method.id(),
            is_dynamic: method.is_dynamic(),
        }
    }
}

/// Where a record's bytes live.
#[derive(Debug)]
enum RecordStorage {
    /// Bump-allocated, freed with the domain.
    Arena(ArenaSpan),
    /// Individually owned, freed on removal. Only dynamic methods use this.
    Heap(Box<[u8]>),
}

/// Counters describing a [`DataTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DataTableStats {
    /// Records currently indexed.
    pub records: usize,
    /// Indexed records living on the heap.
    pub dynamic_records: usize,
    /// Bytes handed out by the arena, including records since overwritten.
    pub arena_bytes: usize,
}

/// Debug records of one execution domain.
///
/// Ordinary records are copied into the table's [`RecordArena`] and live until the table
/// is dropped. Records of dynamic methods are heap-allocated so they can be removed
/// individually. Inserting twice for the same method replaces the index entry; earlier
/// arena bytes stay allocated, an earlier heap copy is freed.
#[derive(Debug)]
pub struct DataTable {
    domain: DomainId,
    arena: RecordArena,
    records: HashMap<MethodId, RecordStorage>,
}

impl DataTable {
    /// Create an empty table for `domain`.
    #[must_use]
    pub fn new(domain: DomainId, chunk_size: usize) -> Self {
        DataTable {
            domain,
            arena: RecordArena::new(chunk_size),
            records: HashMap::new(),
        }
    }

    /// The owning domain.
    #[must_use]
    pub fn domain(&self) -> DomainId {
        self.domain
    }

    /// Serialize `info` and index it under `method`.
    ///
    /// The line table is stored in the order given. Resolution expects native offsets
    /// that never decrease, so an unordered table is logged but still stored.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `info` cannot be encoded.
    pub fn insert(&mut self, method: MethodKey, info: &MethodJitInfo) -> Result<MethodAddress> {
        if !info.has_ordered_lines() {
            tracing::warn!(
                "domain {}: line table of {} is not ordered by native offset",
                self.domain,
                method.id
            );
        }

        let bytes = serialize_record(info)?;
        let address = MethodAddress {
            code_start: info.code_start,
            code_size: info.code_size,
            size: bytes.len(),
            is_dynamic: method.is_dynamic,
        };

        let storage = if method.is_dynamic {
            RecordStorage::Heap(bytes.into_boxed_slice())
        } else {
            RecordStorage::Arena(self.arena.alloc(&bytes))
        };

        tracing::trace!(
            "domain {}: stored {} bytes for {} ({})",
            self.domain,
            address.size,
            method.id,
            if method.is_dynamic { "heap" } else { "arena" }
        );

        self.records.insert(method.id, storage);
        Ok(address)
    }

    /// Remove and free the record of a dynamic method. Returns `false` if there was none.
    ///
    /// # Panics
    /// Removing the record of a method that is not dynamic breaks the table's contract and
    /// stops the process.
    pub fn remove(&mut self, method: MethodKey) -> bool {
        if !method.is_dynamic {
            fatal_error!(
                "domain {}: removing record of non-dynamic method {}",
                self.domain,
                method.id
            );
        }

        self.records.remove(&method.id).is_some()
    }

    fn bytes<'a>(&'a self, storage: &'a RecordStorage) -> &'a [u8] {
        match storage {
            RecordStorage::Arena(span) => self.arena.get(*span),
            RecordStorage::Heap(bytes) => bytes,
        }
    }

    /// The stored record of `method`.
    ///
    /// The view borrows the table and cannot outlive it.
    #[must_use]
    pub fn lookup(&self, method: MethodId) -> Option<MethodRecord<'_>> {
        let storage = self.records.get(&method)?;
        match MethodRecord::parse(self.bytes(storage)) {
            Ok(record) => Some(record),
            Err(error) => fatal_error!(
                "domain {}: corrupt record header for {}: {}",
                self.domain,
                method,
                error
            ),
        }
    }

    /// Owned summary of the stored record of `method`.
    #[must_use]
    pub fn address(&self, method: MethodId) -> Option<MethodAddress> {
        let is_dynamic = matches!(self.records.get(&method)?, RecordStorage::Heap(_));
        let record = self.lookup(method)?;
        Some(MethodAddress {
            code_start: record.code_start(),
            code_size: record.code_size(),
            size: record.size(),
            is_dynamic,
        })
    }

    /// Decode the stored record of `method` into a fresh, caller-owned value.
    #[must_use]
    pub fn find(&self, method: MethodId) -> Option<MethodJitInfo> {
        let record = self.lookup(method)?;
        match record.decode() {
            Ok(info) => Some(info),
            Err(error) => fatal_error!(
                "domain {}: corrupt record for {}: {}",
                self.domain,
                method,
                error
            ),
        }
    }

    /// Number of indexed records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no record is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> DataTableStats {
        DataTableStats {
            records: self.records.len(),
            dynamic_records: self
                .records
                .values()
                .filter(|storage| matches!(storage, RecordStorage::Heap(_)))
                .count(),
            arena_bytes: self.arena.allocated_bytes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        jit::LineNumberEntry,
        test::{sample_jit_info, FakeMethod},
    };

    fn table() -> DataTable {
        DataTable::new(DomainId(1), 256)
    }

    #[test]
    fn test_insert_then_find() {
        let mut table = table();
        let method = FakeMethod::new(10, 1, "App:Run");
        let info = sample_jit_info();

        let address = table.insert(MethodKey::of(&*method), &info).unwrap();
        assert_eq!(address.code_start, info.code_start);
        assert_eq!(address.code_size, info.code_size);
        assert!(!address.is_dynamic);

        assert_eq!(table.find(method.id()), Some(info));
        assert_eq!(table.address(method.id()), Some(address));
        assert_eq!(table.lookup(method.id()).unwrap().size(), address.size);
    }

    #[test]
    fn test_missing_method_is_none() {
        let table = table();
        assert!(table.lookup(MethodId(99)).is_none());
        assert!(table.find(MethodId(99)).is_none());
        assert!(table.address(MethodId(99)).is_none());
    }

    #[test]
    fn test_second_insert_replaces_entry_but_keeps_arena_bytes() {
        let mut table = table();
        let method = FakeMethod::new(10, 1, "App:Run");
        let first = sample_jit_info();
        let mut second = sample_jit_info();
        second.line_numbers.push(LineNumberEntry::new(20, 44));

        let a = table.insert(MethodKey::of(&*method), &first).unwrap();
        let b = table.insert(MethodKey::of(&*method), &second).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.find(method.id()), Some(second));
        assert_eq!(table.stats().arena_bytes, a.size + b.size);
    }

    #[test]
    fn test_dynamic_records_live_on_heap_and_can_be_removed() {
        let mut table = table();
        let method = FakeMethod::dynamic(11, 1, "DynamicMethod:Invoke");

        let address = table.insert(MethodKey::of(&*method), &sample_jit_info()).unwrap();
        assert!(address.is_dynamic);
        assert_eq!(table.stats().arena_bytes, 0);
        assert_eq!(table.stats().dynamic_records, 1);

        assert!(table.remove(MethodKey::of(&*method)));
        assert!(table.lookup(method.id()).is_none());
        assert!(!table.remove(MethodKey::of(&*method)));
        assert_eq!(table.stats(), DataTableStats::default());
    }

    #[test]
    #[should_panic(expected = "non-dynamic")]
    fn test_removing_ordinary_method_is_fatal() {
        let mut table = table();
        let method = FakeMethod::new(10, 1, "App:Run");
        table.insert(MethodKey::of(&*method), &sample_jit_info()).unwrap();
        table.remove(MethodKey::of(&*method));
    }

    #[test]
    fn test_dynamic_reinsert_frees_previous_copy() {
        let mut table = table();
        let method = FakeMethod::dynamic(11, 1, "DynamicMethod:Invoke");
        let mut second = sample_jit_info();
        second.code_start += 0x100;

        table.insert(MethodKey::of(&*method), &sample_jit_info()).unwrap();
        table.insert(MethodKey::of(&*method), &second).unwrap();

        let stats = table.stats();
        assert_eq!(stats.records, 1);
        assert_eq!(stats.dynamic_records, 1);
        assert_eq!(stats.arena_bytes, 0);
        assert_eq!(table.find(method.id()), Some(second));
    }

    #[test]
    fn test_unordered_line_table_is_stored_as_given() {
        let mut table = table();
        let method = FakeMethod::new(12, 1, "App:Loop");
        let info = MethodJitInfo {
            code_start: 0x2000,
            code_size: 16,
            line_numbers: vec![LineNumberEntry::new(0, 10), LineNumberEntry::new(5, 0)],
            ..Default::default()
        };

        table.insert(MethodKey::of(&*method), &info).unwrap();
        assert_eq!(
            table.find(method.id()).unwrap().line_numbers,
            info.line_numbers
        );
    }
}
