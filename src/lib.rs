//! A binary interchange codec for the PackStream wire format.
//!
//! PackStream carries a closed set of value kinds — null, booleans, 64-bit
//! signed integers, IEEE 754 doubles, UTF-8 strings, byte arrays, lists,
//! insertion-ordered dictionaries and tagged structures — plus temporal and
//! spatial kinds that ride on structures under protocol version 2.0 and up.
//! Every value starts with a marker byte; composite kinds pick the smallest
//! size class their length fits, so there is exactly one canonical encoding
//! for any value.
//!
//! The codec works on in-memory buffers only. Packing pushes values onto a
//! growing byte vector; unpacking walks a byte slice and yields one value at
//! a time:
//!
//! ```
//! use packstream::{pack, unpack, Value, Version};
//!
//! let data = pack(&Value::from("hello"), Version::default())?;
//! assert_eq!(data, b"\x85hello");
//!
//! let values: Result<Vec<Value>, _> = unpack(&data, Version::default()).collect();
//! assert_eq!(values?, [Value::from("hello")]);
//! # Ok::<(), packstream::Error>(())
//! ```
//!
//! Failures are never silent and never partial: packing an out-of-domain
//! value, or decoding a malformed or truncated buffer, surfaces one of the
//! four [`Error`] categories at the call boundary.

mod error;
mod marker;
mod pack;
mod property;
mod spatial;
mod structure;
mod temporal;
mod unpack;
mod value;
mod version;

pub use self::error::{Error, Result};
pub use self::pack::{pack, Packer};
pub use self::property::{MissingKey, PropertyDict};
pub use self::spatial::{
    Point, SRID_CARTESIAN_2D, SRID_CARTESIAN_3D, SRID_WGS84_2D, SRID_WGS84_3D,
};
pub use self::structure::Structure;
pub use self::temporal::{Date, DateTime, Duration, Time, TimeZone, MAX_YEAR, MIN_YEAR};
pub use self::unpack::{unpack, Unpacker};
pub use self::value::{Dictionary, Value};
pub use self::version::Version;
