//! Growable encoder for serialized method records.
//!
//! [`crate::codec::writer::Writer`] is the write-side counterpart of [`crate::codec::parser::Parser`].
//! It appends LEB128 groups and fixed-width fields to a `Vec<u8>` that is pre-sized by the
//! caller to a worst-case bound, so the common case never reallocates while writing.
//!
//! # Examples
//!
//! ```rust
//! use jitdebug::{Parser, Writer};
//!
//! let mut writer = Writer::with_capacity(16);
//! writer.write_uleb128(300);
//! writer.write_sleb128(-2);
//! let bytes = writer.into_inner();
//! assert_eq!(bytes, [0xAC, 0x02, 0x7E]);
//!
//! let mut parser = Parser::new(&bytes);
//! assert_eq!(parser.read_uleb128()?, 300);
//! assert_eq!(parser.read_sleb128()?, -2);
//! # Ok::<(), jitdebug::Error>(())
//! ```

use crate::codec::io::{write_le, write_ne, RecordIO};

/// Encoder appending record fields to an owned, growable buffer.
#[derive(Debug, Default)]
pub struct Writer {
    buffer: Vec<u8>,
}

impl Writer {
    /// Create an empty writer.
    #[must_use]
    pub fn new() -> Self {
        Writer { buffer: Vec::new() }
    }

    /// Create a writer whose buffer can hold `capacity` bytes without growing.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Writer {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns `true` if nothing was written yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Bytes written so far.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Consume the writer, returning exactly the bytes written.
    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }

    /// Append one byte.
    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    /// Append a presence flag byte (`1` or `0`).
    pub fn write_flag(&mut self, present: bool) {
        self.buffer.push(u8::from(present));
    }

    /// Append an unsigned LEB128 value.
    pub fn write_uleb128(&mut self, mut value: u32) {
        loop {
            let mut byte = (value & 0x7F) as u8;
            value >>= 7;
            if value != 0 {
                byte |= 0x80;
            }
            self.buffer.push(byte);
            if value == 0 {
                break;
            }
        }
    }

    /// Append a signed LEB128 value.
    ///
    /// Emission stops once the remaining value is all zeros with bit 6 of the last
    /// group clear, or all ones with bit 6 set.
    pub fn write_sleb128(&mut self, mut value: i32) {
        loop {
            let mut byte = (value & 0x7F) as u8;
            value >>= 7;

            let done = (value == 0 && (byte & 0x40) == 0) || (value == -1 && (byte & 0x40) != 0);
            if !done {
                byte |= 0x80;
            }
            self.buffer.push(byte);
            if done {
                break;
            }
        }
    }

    /// Append a little-endian fixed-width value.
    pub fn write_le<T: RecordIO>(&mut self, value: T) {
        write_le(&mut self.buffer, value);
    }

    /// Append a native-endian fixed-width value, copied verbatim.
    pub fn write_ne<T: RecordIO>(&mut self, value: T) {
        write_ne(&mut self.buffer, value);
    }
}
