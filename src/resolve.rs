//! Pure resolution helpers over decoded debug information.
//!
//! Nothing here touches the store; [`crate::DebugService`] decodes a record under its
//! gate and hands the result to these functions.

use crate::{jit::MethodJitInfo, symbols::SourceLocation};

/// IL offset of the tightest line entry at or before `native_offset`.
///
/// Line entries are produced in non-decreasing native-offset order, so the table is
/// scanned from the end and the first entry not past `native_offset` wins. Returns `None`
/// if the table is empty, no entry qualifies, or the entry carries a negative IL offset.
///
/// # Examples
///
/// ```rust
/// use jitdebug::{jit::{LineNumberEntry, MethodJitInfo}, resolve::il_offset_from_native};
///
/// let info = MethodJitInfo {
///     line_numbers: vec![LineNumberEntry::new(0, 0), LineNumberEntry::new(6, 16)],
///     ..Default::default()
/// };
/// assert_eq!(il_offset_from_native(&info, 20), Some(6));
/// assert_eq!(il_offset_from_native(&info, -4), None);
/// ```
#[must_use]
pub fn il_offset_from_native(info: &MethodJitInfo, native_offset: i32) -> Option<u32> {
    info.line_numbers
        .iter()
        .rev()
        .find(|entry| entry.native_offset <= native_offset)
        .and_then(|entry| u32::try_from(entry.il_offset).ok())
}

/// Render one stack-frame line.
///
/// Every `:` in `method_name` becomes `.`. The richest available shape is used:
///
/// - `at NAME [0xIIIII] in FILE:LINE` with a source location
/// - `at NAME <IL 0xIIIII, 0xNNNNN>` with only an IL offset
/// - `at NAME <0xNNNNN>` otherwise
#[must_use]
pub fn format_stack_frame(
    method_name: &str,
    location: Option<&SourceLocation>,
    il_offset: Option<u32>,
    native_offset: i32,
) -> String {
    let name = method_name.replace(':', ".");

    match (location, il_offset) {
        (Some(location), _) => format!(
            "at {} [0x{:05x}] in {}:{}",
            name, location.il_offset, location.source_file, location.row
        ),
        (None, Some(il)) => format!("at {name} <IL 0x{il:05x}, 0x{native_offset:05x}>"),
        (None, None) => format!("at {name} <0x{native_offset:05x}>"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{jit::LineNumberEntry, test::sample_jit_info};

    #[test]
    fn test_reverse_scan_picks_enclosing_line() {
        let info = sample_jit_info();
        assert_eq!(il_offset_from_native(&info, 25), Some(12));
        assert_eq!(il_offset_from_native(&info, 5), Some(0));
        assert_eq!(il_offset_from_native(&info, 30), Some(18));
        assert_eq!(il_offset_from_native(&info, 1000), Some(18));
        assert_eq!(il_offset_from_native(&info, -1), None);
    }

    #[test]
    fn test_empty_table_resolves_nothing() {
        let info = MethodJitInfo::default();
        assert_eq!(il_offset_from_native(&info, 0), None);
    }

    #[test]
    fn test_negative_il_offset_is_unresolved() {
        let info = MethodJitInfo {
            line_numbers: vec![LineNumberEntry::new(-1, 0), LineNumberEntry::new(4, 8)],
            ..Default::default()
        };
        assert_eq!(il_offset_from_native(&info, 3), None);
        assert_eq!(il_offset_from_native(&info, 8), Some(4));
    }

    #[test]
    fn test_frame_shapes() {
        let location = SourceLocation {
            source_file: "/src/App.cs".to_string(),
            row: 22,
            column: 5,
            il_offset: 12,
        };

        assert_eq!(
            format_stack_frame("App:Run", Some(&location), Some(12), 25),
            "at App.Run [0x0000c] in /src/App.cs:22"
        );
        assert_eq!(
            format_stack_frame("App:Run", None, Some(12), 25),
            "at App.Run <IL 0x0000c, 0x00019>"
        );
        assert_eq!(
            format_stack_frame("Ns.App:Run (int)", None, None, 0x123456),
            "at Ns.App.Run (int) <0x123456>"
        );
    }
}
