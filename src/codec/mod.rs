//! Variable-length and fixed-width field codec shared by every record layer.
//!
//! - [`parser`] - bounds-checked cursor decoding LEB128 groups and fixed-width fields
//! - [`writer`] - growable encoder producing the same layout
//! - [`io`] - byte-order helpers behind both

pub mod io;
pub mod parser;
pub mod writer;

#[cfg(test)]
mod tests {
    use super::{parser::Parser, writer::Writer};

    #[test]
    fn test_zero_and_minus_one_take_one_byte() {
        let mut writer = Writer::new();
        writer.write_uleb128(0);
        assert_eq!(writer.len(), 1);

        let mut writer = Writer::new();
        writer.write_sleb128(0);
        assert_eq!(writer.len(), 1);

        let mut writer = Writer::new();
        writer.write_sleb128(-1);
        assert_eq!(writer.len(), 1);
    }

    #[test]
    fn test_boundary_values_survive() {
        let unsigned = [0, 1, 127, 128, 16_383, 16_384, 0x0FFF_FFFF, 0x1000_0000, u32::MAX];
        let signed = [0, 1, -1, 63, 64, -64, -65, 8191, -8192, i32::MAX, i32::MIN];

        let mut writer = Writer::new();
        for value in unsigned {
            writer.write_uleb128(value);
        }
        for value in signed {
            writer.write_sleb128(value);
        }

        let bytes = writer.into_inner();
        let mut parser = Parser::new(&bytes);
        for value in unsigned {
            assert_eq!(parser.read_uleb128().unwrap(), value);
        }
        for value in signed {
            assert_eq!(parser.read_sleb128().unwrap(), value);
        }
        assert!(!parser.has_more_data());
    }
}
