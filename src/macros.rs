#![allow(unused_macros)]

/// Helper macro for the disabled-mode short circuit of every public entry point
///
/// ```rust, ignore
///  enabled_or!(self, None);
///  // debug support is on from here
/// ```
macro_rules! enabled_or {
    ($service:expr, $ret:expr) => {
        if !$service.enabled() {
            return $ret;
        }
    };
}
