use thiserror::Error;

macro_rules! unsupported_layout {
    // Single string version
    ($msg:expr) => {
        crate::Error::UnsupportedLayout {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::UnsupportedLayout {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every failure surfaces to the caller; nothing is retried and no partial measurement is ever
/// produced. Configuration problems are reported when a meter is built, never during a
/// measurement.
///
/// # Error Categories
///
/// ## Metadata Errors
/// - [`Error::ReflectionUnavailable`] - Class metadata cannot be inspected
/// - [`Error::RecursionLimit`] - Inheritance chain exceeds the supported depth
///
/// ## Configuration Errors
/// - [`Error::UnsupportedLayout`] - Runtime description cannot be mapped to a known layout
///
/// ## Defensive Errors
/// - [`Error::InvalidArray`] - Array extent overflows the addressable size
///
/// # Examples
///
/// ```rust
/// use heapscope::{Error, RuntimeLayout};
///
/// match RuntimeLayout::builder().reference_size(6).build() {
///     Err(Error::UnsupportedLayout { message, .. }) => {
///         assert!(message.contains("reference size"));
///     }
///     other => panic!("expected an unsupported layout, got {other:?}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// Class metadata cannot be inspected.
    ///
    /// Raised when a class is opaque to introspection or when a base-class link can no longer be
    /// resolved because the class has been unloaded. Fatal for the caller; the measurement is
    /// abandoned.
    #[error("Reflection unavailable for '{class}': {reason}")]
    ReflectionUnavailable {
        /// Full name of the class whose metadata could not be read
        class: String,
        /// Why the metadata was inaccessible
        reason: String,
    },

    /// The runtime description cannot be mapped to a known layout variant.
    ///
    /// Raised at construction time only, never during a measurement. The error includes the
    /// source location where the rejection was decided.
    ///
    /// # Fields
    ///
    /// * `message` - Which part of the description was rejected
    /// * `file` - Source file in which the rejection was decided
    /// * `line` - Source line in which the rejection was decided
    #[error("Unsupported layout - {file}:{line}: {message}")]
    UnsupportedLayout {
        /// The message to be printed for the rejected description
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An array extent overflows the addressable size.
    ///
    /// Defensive; unreachable with a well-formed host runtime, which could never have
    /// materialized such an array in the first place.
    #[error("Invalid array: {length} elements of {width} bytes overflow the addressable size")]
    InvalidArray {
        /// Number of elements read from the instance
        length: usize,
        /// Storage width of a single element in bytes
        width: u64,
    },

    /// An inheritance chain exceeded the maximum supported depth.
    ///
    /// Also defuses malformed, cyclic base-class links that would otherwise never terminate.
    #[error("Inheritance chain exceeded the maximum depth of {0}")]
    RecursionLimit(usize),
}
