//! Decoded, directly-addressable form of a method's JIT debug information.

use crate::jit::token::TypeHandle;

/// One entry of the line-number table: an IL offset and the native offset its code starts at.
///
/// Entries are kept in the order the code generator produced them. Resolution relies on
/// native offsets being non-decreasing along that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineNumberEntry {
    /// Offset into the method's IL stream.
    pub il_offset: i32,
    /// Offset into the method's native code.
    pub native_offset: i32,
}

impl LineNumberEntry {
    /// Create a line entry.
    #[must_use]
    pub fn new(il_offset: i32, native_offset: i32) -> Self {
        LineNumberEntry {
            il_offset,
            native_offset,
        }
    }
}

/// Location and lifetime of one variable in the generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VarInfo {
    /// Register or variable index, as the code generator encodes it.
    pub index: u32,
    /// Frame offset of the variable.
    pub offset: i32,
    /// Size of the variable in bytes.
    pub size: u32,
    /// Native offset where the variable comes into scope.
    pub begin_scope: u32,
    /// Native offset where the variable goes out of scope.
    pub end_scope: u32,
    /// Opaque type reference, copied verbatim.
    pub type_handle: TypeHandle,
}

/// The pair of helper variables a generic-shared method carries.
///
/// They are only ever present together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GsharedVars {
    /// Variable holding the runtime generic context info.
    pub info_var: VarInfo,
    /// Variable holding the area for generically-sized locals.
    pub locals_var: VarInfo,
}

/// JIT debug information of one compiled method.
///
/// Produced by the code generator and handed to [`crate::DebugService::add_method`], and
/// handed back, freshly decoded and owned by the caller, by
/// [`crate::DebugService::find_method`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MethodJitInfo {
    /// Address of the first byte of native code.
    pub code_start: usize,
    /// Length of the native code in bytes.
    pub code_size: u32,
    /// Native offset where the prologue ends.
    pub prologue_end: u32,
    /// Native offset where the epilogue begins.
    pub epilogue_begin: u32,
    /// IL to native offset correspondence.
    pub line_numbers: Vec<LineNumberEntry>,
    /// The `this` argument, for instance methods.
    pub this_var: Option<VarInfo>,
    /// Parameters in declaration order.
    pub params: Vec<VarInfo>,
    /// Locals in declaration order.
    pub locals: Vec<VarInfo>,
    /// Generic-sharing helper variables.
    pub gsharedvt: Option<GsharedVars>,
}

/// Worst-case bytes of one LEB128 group.
const MAX_GROUP_LEN: usize = 5;
/// Header groups: prologue end, epilogue begin and the three table counts.
const HEADER_GROUPS: usize = 5;
/// One variable: five groups plus the pointer-width type handle.
const VAR_SLOT_LEN: usize = MAX_GROUP_LEN * 5 + std::mem::size_of::<usize>();

impl MethodJitInfo {
    /// Upper bound of the encoded payload size, used to pre-size the encode buffer.
    ///
    /// Every variable slot is counted at its worst case, including an absent `this`, and
    /// both presence flags plus the generic-sharing pair are counted when present.
    #[must_use]
    pub fn max_encoded_size(&self) -> usize {
        let mut slots = 1 + self.params.len() + self.locals.len();
        if self.gsharedvt.is_some() {
            slots += 2;
        }

        HEADER_GROUPS * MAX_GROUP_LEN
            + 2
            + 2 * MAX_GROUP_LEN * self.line_numbers.len()
            + VAR_SLOT_LEN * slots
    }

    /// Returns `true` if native offsets never decrease along the line table.
    #[must_use]
    pub fn has_ordered_lines(&self) -> bool {
        self.line_numbers
            .windows(2)
            .all(|pair| pair[0].native_offset <= pair[1].native_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bound_grows_with_tables() {
        let empty = MethodJitInfo::default();
        let base = empty.max_encoded_size();
        assert_eq!(base, 25 + 2 + VAR_SLOT_LEN);

        let info = MethodJitInfo {
            line_numbers: vec![LineNumberEntry::new(0, 0); 3],
            params: vec![VarInfo::default(); 2],
            gsharedvt: Some(GsharedVars::default()),
            ..Default::default()
        };
        assert_eq!(info.max_encoded_size(), base + 30 + 4 * VAR_SLOT_LEN);
    }

    #[test]
    fn test_line_order() {
        let mut info = MethodJitInfo {
            line_numbers: vec![
                LineNumberEntry::new(0, 0),
                LineNumberEntry::new(4, 8),
                LineNumberEntry::new(6, 8),
            ],
            ..Default::default()
        };
        assert!(info.has_ordered_lines());

        info.line_numbers.push(LineNumberEntry::new(9, 2));
        assert!(!info.has_ordered_lines());
    }
}
