use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds
    };
}

/// Stops the process on a broken lifecycle contract.
///
/// Used where the surrounding runtime called into the store in an order it never
/// supports (querying a domain that was never created, removing a record of a
/// method that is not dynamic). These are not recoverable conditions.
macro_rules! fatal_error {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        tracing::error!($fmt $(, $arg)*);
        panic!($fmt $(, $arg)*)
    }};
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Only two layers produce recoverable errors: the record codec, when it is handed a
/// byte slice it did not produce itself or a value whose counts do not fit the wire
/// fields, and [`crate::DebugService::new`] when the configuration is unusable.
///
/// Absence of debug information is never an error. Every query on
/// [`crate::DebugService`] answers with [`Option::None`] instead.
///
/// # Examples
///
/// ```rust
/// use jitdebug::{Error, Parser};
///
/// let mut parser = Parser::new(&[0x80]);
/// match parser.read_uleb128() {
///     Err(Error::OutOfBounds) => {}
///     other => panic!("unexpected {:?}", other),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The record is damaged and could not be decoded.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while decoding a record.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// The requested debug format is not supported.
    #[error("This debug format is not supported - {0}")]
    NotSupported(String),

    /// Generic error for miscellaneous failures.
    #[error("{0}")]
    Error(String),
}
