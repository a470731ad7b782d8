//! Cursor-based reader for serialized method records.
//!
//! This module provides the [`crate::codec::parser::Parser`] type, a bounds-checked cursor over
//! a byte slice. It decodes the two LEB128 integer forms the record format is built from and
//! the fixed-width fields that sit between them.
//!
//! # Integer Forms
//!
//! - **Unsigned** ([`crate::codec::parser::Parser::read_uleb128`]) - base-128 groups, low 7 bits
//!   per byte, continuation bit `0x80` on all but the last byte, least-significant group first.
//! - **Signed** ([`crate::codec::parser::Parser::read_sleb128`]) - same grouping in two's
//!   complement; the value is sign-extended when bit 6 of the final byte is set and fewer than
//!   32 bits were consumed.
//!
//! Neither form carries a length prefix. A stream written by [`crate::codec::writer::Writer`] always
//! decodes; a truncated stream is reported as [`crate::Error::OutOfBounds`] and an over-long group
//! sequence as [`crate::Error::Malformed`].
//!
//! # Usage Examples
//!
//! ```rust
//! use jitdebug::Parser;
//!
//! // 624485 as unsigned, -123456 as signed
//! let data = [0xE5, 0x8E, 0x26, 0xC0, 0xBB, 0x78];
//! let mut parser = Parser::new(&data);
//!
//! assert_eq!(parser.read_uleb128()?, 624_485);
//! assert_eq!(parser.read_sleb128()?, -123_456);
//! assert!(!parser.has_more_data());
//! # Ok::<(), jitdebug::Error>(())
//! ```

use crate::{
    codec::io::{read_le_at, read_ne_at, RecordIO},
    Result,
};

/// Maximum number of groups a 32-bit LEB128 value may span.
const MAX_GROUPS: u32 = 5;

/// A cursor over a serialized method record.
///
/// `Parser` keeps a position into a borrowed byte slice and advances it on every read.
/// All reads are bounds-checked; a failed read leaves the position where the failing
/// value started only for fixed-width fields, LEB128 reads may have consumed bytes.
pub struct Parser<'a> {
    /// The binary data being parsed
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`crate::codec::parser::Parser`] from a byte slice.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use jitdebug::Parser;
    /// let data = [0x01, 0x02, 0x03, 0x04];
    /// let parser = Parser::new(&data);
    /// assert_eq!(parser.len(), 4);
    /// ```
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns the length of the underlying data buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the parser has no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if there is more data available to parse.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Get the current position of the parser within the data buffer.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Number of bytes left after the current position.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Read a little-endian fixed-width value.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if there are not enough bytes remaining.
    pub fn read_le<T: RecordIO>(&mut self) -> Result<T> {
        read_le_at::<T>(self.data, &mut self.position)
    }

    /// Read a native-endian fixed-width value, copied verbatim from the writer's process.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if there are not enough bytes remaining.
    pub fn read_ne<T: RecordIO>(&mut self) -> Result<T> {
        read_ne_at::<T>(self.data, &mut self.position)
    }

    /// Read a single byte.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] at the end of the data.
    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_le::<u8>()
    }

    /// Read an unsigned LEB128 value of at most 32 bits.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the data ends inside the value, or
    /// [`crate::Error::Malformed`] if the value spans more than five groups.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use jitdebug::Parser;
    /// let mut parser = Parser::new(&[0x80, 0x01]);
    /// assert_eq!(parser.read_uleb128()?, 128);
    /// assert_eq!(parser.pos(), 2);
    /// # Ok::<(), jitdebug::Error>(())
    /// ```
    pub fn read_uleb128(&mut self) -> Result<u32> {
        let mut value = 0u32;
        let mut groups = 0u32;

        loop {
            let byte = self.read_u8()?;
            value |= u32::from(byte & 0x7F).wrapping_shl(groups * 7);
            groups += 1;

            if (byte & 0x80) == 0 {
                return Ok(value);
            }

            if groups >= MAX_GROUPS {
                return Err(malformed_error!(
                    "LEB128 value exceeds 32 bits at offset {}",
                    self.position
                ));
            }
        }
    }

    /// Read a signed LEB128 value of at most 32 bits.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the data ends inside the value, or
    /// [`crate::Error::Malformed`] if the value spans more than five groups.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use jitdebug::Parser;
    /// let mut parser = Parser::new(&[0x7F, 0x80, 0x7F]);
    /// assert_eq!(parser.read_sleb128()?, -1);
    /// assert_eq!(parser.read_sleb128()?, -128);
    /// # Ok::<(), jitdebug::Error>(())
    /// ```
    pub fn read_sleb128(&mut self) -> Result<i32> {
        let mut value = 0i32;
        let mut shift = 0u32;

        loop {
            let byte = self.read_u8()?;
            value |= i32::from(byte & 0x7F).wrapping_shl(shift);
            shift += 7;

            if (byte & 0x80) != 0 {
                if shift >= MAX_GROUPS * 7 {
                    return Err(malformed_error!(
                        "LEB128 value exceeds 32 bits at offset {}",
                        self.position
                    ));
                }
                continue;
            }

            if shift < 32 && (byte & 0x40) != 0 {
                value |= -1i32 << shift;
            }
            return Ok(value);
        }
    }

    /// Read a presence flag byte; any non-zero value means present.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] at the end of the data.
    pub fn read_flag(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    /// Borrow the next `length` bytes and advance past them.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `length` bytes remain.
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        let end = self
            .position
            .checked_add(length)
            .ok_or(out_of_bounds_error!())?;

        if end > self.data.len() {
            return Err(out_of_bounds_error!());
        }

        let bytes = &self.data[self.position..end];
        self.position = end;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_read_uleb128() {
        let test_cases = vec![
            (vec![0x00], 0, 1),
            (vec![0x7F], 0x7F, 1),
            (vec![0x80, 0x01], 0x80, 2),
            (vec![0xFF, 0x7F], 0x3FFF, 2),
            (vec![0xE5, 0x8E, 0x26], 624_485, 3),
            (vec![0xFF, 0xFF, 0xFF, 0xFF, 0x0F], u32::MAX, 5),
        ];

        for (input, expected, consumed) in test_cases {
            let mut parser = Parser::new(&input);
            assert_eq!(parser.read_uleb128().unwrap(), expected);
            assert_eq!(parser.pos(), consumed);
        }
    }

    #[test]
    fn test_read_sleb128() {
        let test_cases = vec![
            (vec![0x00], 0),
            (vec![0x7F], -1),
            (vec![0x3F], 63),
            (vec![0x40], -64),
            (vec![0xC0, 0x00], 64),
            (vec![0x80, 0x7F], -128),
            (vec![0xC0, 0xBB, 0x78], -123_456),
            (vec![0xFF, 0xFF, 0xFF, 0xFF, 0x07], i32::MAX),
            (vec![0x80, 0x80, 0x80, 0x80, 0x78], i32::MIN),
        ];

        for (input, expected) in test_cases {
            let mut parser = Parser::new(&input);
            assert_eq!(parser.read_sleb128().unwrap(), expected, "{:02x?}", input);
            assert!(!parser.has_more_data());
        }
    }

    #[test]
    fn test_truncated_value() {
        let mut parser = Parser::new(&[0x80, 0x80]);
        assert!(matches!(parser.read_uleb128(), Err(Error::OutOfBounds)));

        let mut parser = Parser::new(&[0xFF]);
        assert!(matches!(parser.read_sleb128(), Err(Error::OutOfBounds)));
    }

    #[test]
    fn test_overlong_value() {
        let input = [0x80, 0x80, 0x80, 0x80, 0x80, 0x01];
        let mut parser = Parser::new(&input);
        assert!(matches!(parser.read_uleb128(), Err(Error::Malformed { .. })));

        let mut parser = Parser::new(&input);
        assert!(matches!(parser.read_sleb128(), Err(Error::Malformed { .. })));
    }

    #[test]
    fn test_read_bytes_and_flag() {
        let data = [0x01, 0xAA, 0xBB, 0x00];
        let mut parser = Parser::new(&data);
        assert!(parser.read_flag().unwrap());
        assert_eq!(parser.read_bytes(2).unwrap(), &[0xAA, 0xBB]);
        assert!(!parser.read_flag().unwrap());
        assert_eq!(parser.remaining(), 0);
        assert!(matches!(parser.read_bytes(1), Err(Error::OutOfBounds)));
    }
}
