//! Library error types.

use std::fmt;

use crate::version::Version;

/// A packstream Result, normally returning a packstream [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A packstream error. Every pack/unpack failure falls into one of four
/// categories, so callers can tell a recoverable out-of-domain value apart
/// from a corrupt byte stream.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// A value is outside the domain the wire format can carry: an integer
    /// wider than 64 bits, a collection with 2^32 or more entries, a point
    /// with more than three coordinates, or a temporal field out of range.
    ValueRange(String),
    /// A value kind the codec cannot encode, such as a time carrying a named
    /// zone (the wire only has an offset form for times).
    TypeMismatch(String),
    /// The byte stream is not valid PackStream: an unknown marker, a
    /// truncated value, or a string payload that is not UTF-8.
    InvalidEncoding(String),
    /// The value kind is not admitted under the negotiated protocol version.
    VersionMismatch {
        /// The version the call was made with.
        version: Version,
        /// The kind of value that was rejected.
        kind: &'static str,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::ValueRange(ref msg) => write!(f, "Value out of range: {}", msg),
            Error::TypeMismatch(ref msg) => write!(f, "Type mismatch: {}", msg),
            Error::InvalidEncoding(ref msg) => write!(f, "Invalid encoding: {}", msg),
            Error::VersionMismatch { version, kind } => write!(
                f,
                "Protocol version {} does not support {} values",
                version, kind
            ),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display_names_the_category() {
        let err = Error::ValueRange("integer too large".into());
        assert!(err.to_string().starts_with("Value out of range"));

        let err = Error::VersionMismatch {
            version: Version::new(1, 0),
            kind: "Date",
        };
        assert_eq!(
            err.to_string(),
            "Protocol version 1.0 does not support Date values"
        );
    }
}
