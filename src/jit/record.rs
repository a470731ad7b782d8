//! Serialized method-address records.
//!
//! A record is one contiguous byte buffer: a fixed header followed by the encoded
//! [`crate::jit::MethodJitInfo`] payload.
//!
//! # Record Layout
//!
//! ```text
//! code_start      native-endian usize   (pointer width of the writing process)
//! code_size       little-endian u32
//! prologue_end    uleb128
//! epilogue_begin  uleb128
//! line count      uleb128
//!   il_offset       sleb128   } per line entry
//!   native_offset   sleb128   }
//! this present    u8 (0/1), followed by one variable if 1
//! param count     uleb128, followed by that many variables
//! local count     uleb128, followed by that many variables
//! gshared present u8 (0/1), followed by two variables (info, locals) if 1
//! ```
//!
//! A variable is `index` uleb128, `offset` sleb128, `size`, `begin_scope`, `end_scope`
//! uleb128, then the type handle as a native-endian usize.
//!
//! The format is in-process only. Pointer-width fields are copied verbatim, so a record
//! written on one architecture is meaningless on another, and no versioning exists.

use crate::{
    codec::{parser::Parser, writer::Writer},
    jit::{
        info::{GsharedVars, LineNumberEntry, MethodJitInfo, VarInfo},
        token::TypeHandle,
    },
    Result,
};

/// Size of the fixed record header.
pub const RECORD_HEADER_SIZE: usize = std::mem::size_of::<usize>() + std::mem::size_of::<u32>();

fn count(len: usize, what: &str) -> Result<u32> {
    u32::try_from(len).map_err(|_| malformed_error!("Too many {} to encode - {}", what, len))
}

fn write_variable(writer: &mut Writer, var: &VarInfo) {
    writer.write_uleb128(var.index);
    writer.write_sleb128(var.offset);
    writer.write_uleb128(var.size);
    writer.write_uleb128(var.begin_scope);
    writer.write_uleb128(var.end_scope);
    writer.write_ne(var.type_handle.0);
}

fn read_variable(parser: &mut Parser) -> Result<VarInfo> {
    Ok(VarInfo {
        index: parser.read_uleb128()?,
        offset: parser.read_sleb128()?,
        size: parser.read_uleb128()?,
        begin_scope: parser.read_uleb128()?,
        end_scope: parser.read_uleb128()?,
        type_handle: TypeHandle(parser.read_ne::<usize>()?),
    })
}

fn read_variables(parser: &mut Parser) -> Result<Vec<VarInfo>> {
    let count = parser.read_uleb128()? as usize;
    let mut vars = Vec::with_capacity(count.min(parser.remaining()));
    for _ in 0..count {
        vars.push(read_variable(parser)?);
    }
    Ok(vars)
}

/// Encode the payload part of a record (everything after the header).
///
/// The returned buffer holds exactly the bytes written, never the worst-case bound.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if a table holds more entries than a 32-bit count
/// can describe.
pub fn encode_method(info: &MethodJitInfo) -> Result<Vec<u8>> {
    let mut writer = Writer::with_capacity(info.max_encoded_size());
    encode_payload(&mut writer, info)?;
    Ok(writer.into_inner())
}

fn encode_payload(writer: &mut Writer, info: &MethodJitInfo) -> Result<()> {
    writer.write_uleb128(info.prologue_end);
    writer.write_uleb128(info.epilogue_begin);

    writer.write_uleb128(count(info.line_numbers.len(), "line numbers")?);
    for entry in &info.line_numbers {
        writer.write_sleb128(entry.il_offset);
        writer.write_sleb128(entry.native_offset);
    }

    writer.write_flag(info.this_var.is_some());
    if let Some(this_var) = &info.this_var {
        write_variable(writer, this_var);
    }

    writer.write_uleb128(count(info.params.len(), "parameters")?);
    for param in &info.params {
        write_variable(writer, param);
    }

    writer.write_uleb128(count(info.locals.len(), "locals")?);
    for local in &info.locals {
        write_variable(writer, local);
    }

    writer.write_flag(info.gsharedvt.is_some());
    if let Some(gshared) = &info.gsharedvt {
        write_variable(writer, &gshared.info_var);
        write_variable(writer, &gshared.locals_var);
    }

    Ok(())
}

/// Decode a payload produced by [`encode_method`].
///
/// `code_start` and `code_size` come from the record header and are copied into the result.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] or [`crate::Error::Malformed`] if `payload` was not
/// produced by [`encode_method`].
pub fn decode_method(code_start: usize, code_size: u32, payload: &[u8]) -> Result<MethodJitInfo> {
    let mut parser = Parser::new(payload);

    let prologue_end = parser.read_uleb128()?;
    let epilogue_begin = parser.read_uleb128()?;

    let line_count = parser.read_uleb128()? as usize;
    let mut line_numbers = Vec::with_capacity(line_count.min(parser.remaining()));
    for _ in 0..line_count {
        let il_offset = parser.read_sleb128()?;
        let native_offset = parser.read_sleb128()?;
        line_numbers.push(LineNumberEntry {
            il_offset,
            native_offset,
        });
    }

    let this_var = if parser.read_flag()? {
        Some(read_variable(&mut parser)?)
    } else {
        None
    };

    let params = read_variables(&mut parser)?;
    let locals = read_variables(&mut parser)?;

    let gsharedvt = if parser.read_flag()? {
        Some(GsharedVars {
            info_var: read_variable(&mut parser)?,
            locals_var: read_variable(&mut parser)?,
        })
    } else {
        None
    };

    Ok(MethodJitInfo {
        code_start,
        code_size,
        prologue_end,
        epilogue_begin,
        line_numbers,
        this_var,
        params,
        locals,
        gsharedvt,
    })
}

/// Serialize a complete record: header followed by payload.
///
/// # Errors
/// See [`encode_method`].
pub fn serialize_record(info: &MethodJitInfo) -> Result<Vec<u8>> {
    let mut writer = Writer::with_capacity(RECORD_HEADER_SIZE + info.max_encoded_size());
    writer.write_ne(info.code_start);
    writer.write_le(info.code_size);
    encode_payload(&mut writer, info)?;
    Ok(writer.into_inner())
}

/// Borrowed view over a serialized record.
#[derive(Debug, Clone, Copy)]
pub struct MethodRecord<'a> {
    code_start: usize,
    code_size: u32,
    bytes: &'a [u8],
}

impl<'a> MethodRecord<'a> {
    /// Wrap a serialized record, reading its header.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `bytes` is shorter than the header.
    pub fn parse(bytes: &'a [u8]) -> Result<Self> {
        let mut parser = Parser::new(bytes);
        let code_start = parser.read_ne::<usize>()?;
        let code_size = parser.read_le::<u32>()?;

        Ok(MethodRecord {
            code_start,
            code_size,
            bytes,
        })
    }

    /// Address of the first byte of native code.
    #[must_use]
    pub fn code_start(&self) -> usize {
        self.code_start
    }

    /// Length of the native code in bytes.
    #[must_use]
    pub fn code_size(&self) -> u32 {
        self.code_size
    }

    /// Total stored size, header included.
    #[must_use]
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Raw record bytes, header included.
    #[must_use]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// The encoded payload after the header.
    #[must_use]
    pub fn payload(&self) -> &'a [u8] {
        &self.bytes[RECORD_HEADER_SIZE..]
    }

    /// Decode into a fresh, caller-owned [`crate::jit::MethodJitInfo`].
    ///
    /// # Errors
    /// See [`decode_method`].
    pub fn decode(&self) -> Result<MethodJitInfo> {
        decode_method(self.code_start, self.code_size, self.payload())
    }
}

/// Owned summary of a stored record, valid after the gate is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodAddress {
    /// Address of the first byte of native code.
    pub code_start: usize,
    /// Length of the native code in bytes.
    pub code_size: u32,
    /// Total stored size of the record, header included.
    pub size: usize,
    /// `true` if the record lives in individually freed storage (dynamic methods).
    pub is_dynamic: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn var(index: u32, offset: i32) -> VarInfo {
        VarInfo {
            index,
            offset,
            size: 8,
            begin_scope: 4,
            end_scope: 40,
            type_handle: TypeHandle(0x5555_0000 + index as usize),
        }
    }

    fn full_info() -> MethodJitInfo {
        MethodJitInfo {
            code_start: 0x7f00_0000,
            code_size: 96,
            prologue_end: 12,
            epilogue_begin: 80,
            line_numbers: vec![
                LineNumberEntry::new(0, 0),
                LineNumberEntry::new(5, 10),
                LineNumberEntry::new(-1, 20),
                LineNumberEntry::new(18, 300),
            ],
            this_var: Some(var(0, -8)),
            params: vec![var(1, 16), var(2, 24)],
            locals: vec![var(3, -16), var(4, -24), var(5, -200)],
            gsharedvt: Some(GsharedVars {
                info_var: var(6, -32),
                locals_var: var(7, -40),
            }),
        }
    }

    #[test]
    fn test_full_record_decodes_to_same_value() {
        let info = full_info();
        let bytes = serialize_record(&info).unwrap();
        let record = MethodRecord::parse(&bytes).unwrap();

        assert_eq!(record.code_start(), 0x7f00_0000);
        assert_eq!(record.code_size(), 96);
        assert_eq!(record.size(), bytes.len());
        assert_eq!(record.decode().unwrap(), info);
    }

    #[test]
    fn test_minimal_payload_layout() {
        let payload = encode_method(&MethodJitInfo::default()).unwrap();
        // prologue, epilogue, line count, this flag, params, locals, gshared flag
        assert_eq!(payload, [0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_payload_is_exact_not_worst_case() {
        let info = full_info();
        let payload = encode_method(&info).unwrap();
        assert!(payload.len() < info.max_encoded_size());

        let record = serialize_record(&info).unwrap();
        assert_eq!(record.len(), RECORD_HEADER_SIZE + payload.len());
        assert_eq!(&record[RECORD_HEADER_SIZE..], payload.as_slice());
    }

    #[test]
    fn test_variable_layout() {
        let info = MethodJitInfo {
            this_var: Some(VarInfo {
                index: 1,
                offset: -1,
                size: 4,
                begin_scope: 2,
                end_scope: 3,
                type_handle: TypeHandle(0xAB),
            }),
            ..Default::default()
        };
        let payload = encode_method(&info).unwrap();

        let mut expected = vec![0, 0, 0, 1, 1, 0x7F, 4, 2, 3];
        expected.extend_from_slice(&0xABusize.to_ne_bytes());
        expected.extend_from_slice(&[0, 0, 0]);
        assert_eq!(payload, expected);
    }

    #[test]
    fn test_truncated_payload_is_rejected() {
        let payload = encode_method(&full_info()).unwrap();
        for cut in [0, 1, 5, payload.len() - 1] {
            assert!(matches!(
                decode_method(0, 0, &payload[..cut]),
                Err(Error::OutOfBounds)
            ));
        }
    }

    #[test]
    fn test_huge_count_does_not_preallocate() {
        // line count of u32::MAX followed by nothing
        let payload = [0, 0, 0xFF, 0xFF, 0xFF, 0xFF, 0x0F];
        assert!(matches!(
            decode_method(0, 0, &payload),
            Err(Error::OutOfBounds)
        ));
    }

    #[test]
    fn test_short_header_is_rejected() {
        assert!(MethodRecord::parse(&[0u8; 3]).is_err());
    }
}
