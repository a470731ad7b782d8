//! Symbol bytes shipped inside the host binary.
//!
//! Embedding hosts register `(module name, bytes)` pairs before any module loads. When a
//! module loads, the list is scanned newest-first and the first entry whose name matches
//! supplies the bytes the module's symbol source is opened from. Registering a name twice
//! therefore shadows the earlier entry without removing it.

/// One bundled symbol blob. Neither field is owned; both outlive the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BundledSymbols {
    /// Name of the module the bytes belong to.
    pub module_name: &'static str,
    /// Raw symbol bytes.
    pub bytes: &'static [u8],
}

/// Append-only list of bundled symbol blobs.
#[derive(Debug, Default)]
pub struct BundleList {
    entries: boxcar::Vec<BundledSymbols>,
}

impl BundleList {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        BundleList {
            entries: boxcar::Vec::new(),
        }
    }

    /// Register `bytes` for the module named `module_name`.
    ///
    /// The new entry is scanned before every earlier one.
    pub fn register(&self, module_name: &'static str, bytes: &'static [u8]) {
        self.entries.push(BundledSymbols { module_name, bytes });
    }

    /// Bytes of the most recently registered entry named `module_name`.
    #[must_use]
    pub fn find(&self, module_name: &str) -> Option<&'static [u8]> {
        (0..self.entries.count())
            .rev()
            .filter_map(|index| self.entries.get(index))
            .find(|entry| entry.module_name == module_name)
            .map(|entry| entry.bytes)
    }

    /// Number of registered entries, shadowed ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.count()
    }

    /// Returns `true` if nothing was registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static FIRST: [u8; 3] = [1, 2, 3];
    static SECOND: [u8; 2] = [9, 9];

    #[test]
    fn test_find_by_name() {
        let bundles = BundleList::new();
        bundles.register("System.dll", &FIRST);
        bundles.register("App.exe", &SECOND);

        assert_eq!(bundles.find("System.dll"), Some(&FIRST[..]));
        assert_eq!(bundles.find("App.exe"), Some(&SECOND[..]));
        assert_eq!(bundles.find("Missing.dll"), None);
        assert_eq!(bundles.len(), 2);
    }

    #[test]
    fn test_newest_registration_shadows() {
        let bundles = BundleList::new();
        assert!(bundles.is_empty());

        bundles.register("App.exe", &FIRST);
        bundles.register("App.exe", &SECOND);

        assert_eq!(bundles.find("App.exe"), Some(&SECOND[..]));
        assert_eq!(bundles.len(), 2);
    }
}
