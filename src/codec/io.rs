//! Fixed-width reads and writes for the record codec.
//!
//! Method records carry two kinds of fixed-width fields next to their LEB128 groups:
//! the little-endian `code_size` of the record header, and native-endian pointer-width
//! fields (`code_start`, the opaque type handle of each variable). The latter are
//! copied byte-for-byte in the host's own width and order, which makes a record valid
//! only inside the process that wrote it.
//!
//! The [`crate::codec::io::RecordIO`] trait gives every supported primitive a uniform
//! byte-array conversion so the read/write helpers can stay generic.

use crate::{Error::OutOfBounds, Result};

/// Trait for implementing type-specific safe byte conversions.
///
/// Implemented for the primitive widths the record layout uses: `u8`, `u32`, `i32`,
/// `u64` and `usize`.
pub trait RecordIO: Sized {
    /// Fixed-size byte array of the implementing type.
    type Bytes: Sized + AsRef<[u8]> + for<'a> TryFrom<&'a [u8]>;

    /// Build a value from its little-endian bytes.
    fn from_le_bytes(bytes: Self::Bytes) -> Self;
    /// Build a value from its native-endian bytes.
    fn from_ne_bytes(bytes: Self::Bytes) -> Self;

    /// Little-endian bytes of the value.
    fn to_le_bytes(self) -> Self::Bytes;
    /// Native-endian bytes of the value.
    fn to_ne_bytes(self) -> Self::Bytes;
}

macro_rules! impl_record_io {
    ($($ty:ty),*) => {
        $(
            impl RecordIO for $ty {
                type Bytes = [u8; std::mem::size_of::<$ty>()];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }

                fn from_ne_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_ne_bytes(bytes)
                }

                fn to_le_bytes(self) -> Self::Bytes {
                    <$ty>::to_le_bytes(self)
                }

                fn to_ne_bytes(self) -> Self::Bytes {
                    <$ty>::to_ne_bytes(self)
                }
            }
        )*
    };
}

impl_record_io!(u8, u32, i32, u64, usize);

fn take<T: RecordIO>(data: &[u8], offset: &mut usize) -> Result<T::Bytes> {
    let type_len = std::mem::size_of::<T>();
    let end = offset.checked_add(type_len).ok_or(OutOfBounds)?;
    if end > data.len() {
        return Err(OutOfBounds);
    }

    let Ok(bytes) = <T::Bytes as TryFrom<&[u8]>>::try_from(&data[*offset..end]) else {
        return Err(OutOfBounds);
    };

    *offset = end;
    Ok(bytes)
}

/// Read a little-endian `T` at `offset`, advancing it past the value.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if fewer than `size_of::<T>()` bytes remain.
pub fn read_le_at<T: RecordIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    Ok(T::from_le_bytes(take::<T>(data, offset)?))
}

/// Read a native-endian `T` at `offset`, advancing it past the value.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if fewer than `size_of::<T>()` bytes remain.
pub fn read_ne_at<T: RecordIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    Ok(T::from_ne_bytes(take::<T>(data, offset)?))
}

/// Append the little-endian bytes of `value` to `buffer`.
pub fn write_le<T: RecordIO>(buffer: &mut Vec<u8>, value: T) {
    buffer.extend_from_slice(value.to_le_bytes().as_ref());
}

/// Append the native-endian bytes of `value` to `buffer`.
pub fn write_ne<T: RecordIO>(buffer: &mut Vec<u8>, value: T) {
    buffer.extend_from_slice(value.to_ne_bytes().as_ref());
}
