use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::spatial::Point;
use crate::structure::Structure;
use crate::temporal::{Date, DateTime, Duration, Time};

/// The dictionary kind: a string-keyed map that preserves insertion order.
///
/// The wire format emits entries in iteration order and peers round-trip
/// that order, so a sorted or hashed map type is not a valid substitute.
pub type Dictionary = IndexMap<String, Value>;

/// Any value the codec can carry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Dictionary(Dictionary),
    Structure(Structure),
    Date(Date),
    Time(Time),
    DateTime(DateTime),
    Duration(Duration),
    Point(Point),
}

impl Value {
    /// Kind name, used in error messages.
    pub fn kind(&self) -> &'static str {
        use self::Value::*;
        match self {
            Null => "Null",
            Boolean(_) => "Boolean",
            Integer(_) => "Integer",
            Float(_) => "Float",
            String(_) => "String",
            Bytes(_) => "Bytes",
            List(_) => "List",
            Dictionary(_) => "Dictionary",
            Structure(_) => "Structure",
            Date(_) => "Date",
            Time(_) => "Time",
            DateTime(_) => "DateTime",
            Duration(_) => "Duration",
            Point(_) => "Point",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Value::Integer(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        if let Value::Boolean(v) = *self {
            Some(v)
        } else {
            None
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        if let Value::Integer(v) = *self {
            Some(v)
        } else {
            None
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Integer(v) => Some(v as f64),
            Value::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        if let Value::String(ref v) = *self {
            Some(v.as_str())
        } else {
            None
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        if let Value::Bytes(ref v) = *self {
            Some(v.as_slice())
        } else {
            None
        }
    }

    pub fn as_list(&self) -> Option<&Vec<Value>> {
        if let Value::List(ref v) = *self {
            Some(v)
        } else {
            None
        }
    }

    pub fn as_dictionary(&self) -> Option<&Dictionary> {
        if let Value::Dictionary(ref v) = *self {
            Some(v)
        } else {
            None
        }
    }

    pub fn as_structure(&self) -> Option<&Structure> {
        if let Value::Structure(ref v) = *self {
            Some(v)
        } else {
            None
        }
    }

    pub fn as_date(&self) -> Option<&Date> {
        if let Value::Date(ref v) = *self {
            Some(v)
        } else {
            None
        }
    }

    pub fn as_time(&self) -> Option<&Time> {
        if let Value::Time(ref v) = *self {
            Some(v)
        } else {
            None
        }
    }

    pub fn as_date_time(&self) -> Option<&DateTime> {
        if let Value::DateTime(ref v) = *self {
            Some(v)
        } else {
            None
        }
    }

    pub fn as_duration(&self) -> Option<&Duration> {
        if let Value::Duration(ref v) = *self {
            Some(v)
        } else {
            None
        }
    }

    pub fn as_point(&self) -> Option<&Point> {
        if let Value::Point(ref v) = *self {
            Some(v)
        } else {
            None
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

macro_rules! impl_from_int {
    ($t: ty) => {
        impl From<$t> for Value {
            fn from(n: $t) -> Self {
                Value::Integer(n as i64)
            }
        }
    };
}

impl_from_int!(u8);
impl_from_int!(u16);
impl_from_int!(u32);
impl_from_int!(i8);
impl_from_int!(i16);
impl_from_int!(i32);
impl_from_int!(i64);

macro_rules! impl_try_from_int {
    ($t: ty) => {
        impl TryFrom<$t> for Value {
            type Error = Error;
            fn try_from(n: $t) -> Result<Self, Self::Error> {
                let n = i64::try_from(n).map_err(|_| {
                    Error::ValueRange(format!("integer {} exceeds 64-bit signed range", n))
                })?;
                Ok(Value::Integer(n))
            }
        }
    };
}

impl_try_from_int!(u64);
impl_try_from_int!(usize);
impl_try_from_int!(i128);
impl_try_from_int!(u128);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<Dictionary> for Value {
    fn from(v: Dictionary) -> Self {
        Value::Dictionary(v)
    }
}

impl From<Structure> for Value {
    fn from(v: Structure) -> Self {
        Value::Structure(v)
    }
}

impl From<Date> for Value {
    fn from(v: Date) -> Self {
        Value::Date(v)
    }
}

impl From<Time> for Value {
    fn from(v: Time) -> Self {
        Value::Time(v)
    }
}

impl From<DateTime> for Value {
    fn from(v: DateTime) -> Self {
        Value::DateTime(v)
    }
}

impl From<Duration> for Value {
    fn from(v: Duration) -> Self {
        Value::Duration(v)
    }
}

impl From<Point> for Value {
    fn from(v: Point) -> Self {
        Value::Point(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}
