use byteorder::{BigEndian, ReadBytesExt};
use num_traits::NumCast;

use crate::error::{Error, Result};
use crate::marker::Marker;
use crate::spatial::Point;
use crate::structure::{tags, Structure};
use crate::temporal::{Date, DateTime, Duration, Time, TimeZone};
use crate::value::{Dictionary, Value};
use crate::version::Version;

/// Decode a byte buffer as a stream of values.
///
/// The returned iterator yields one complete top-level value per step and
/// ends when the buffer is exhausted at a value boundary. The value count
/// need not be known up front.
pub fn unpack(data: &[u8], version: Version) -> Unpacker<'_> {
    Unpacker::new(data, version)
}

/// A resumable decoding cursor over a byte slice.
///
/// After any decoding error the cursor is spent: no partial value is
/// yielded and iteration stops.
pub struct Unpacker<'a> {
    buf: &'a [u8],
    version: Version,
}

impl<'a> Unpacker<'a> {
    pub fn new(data: &'a [u8], version: Version) -> Unpacker<'a> {
        Unpacker { buf: data, version }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    fn read_value(&mut self) -> Result<Value> {
        let marker = Marker::from_u8(self.read_u8()?);
        Ok(match marker {
            Marker::Null => Value::Null,
            Marker::False => Value::Boolean(false),
            Marker::True => Value::Boolean(true),
            Marker::TinyInt(v) => Value::Integer(v as i64),
            Marker::Int8 => Value::Integer(self.buf.read_i8().map_err(end_of_data)? as i64),
            Marker::Int16 => {
                Value::Integer(self.buf.read_i16::<BigEndian>().map_err(end_of_data)? as i64)
            }
            Marker::Int32 => {
                Value::Integer(self.buf.read_i32::<BigEndian>().map_err(end_of_data)? as i64)
            }
            Marker::Int64 => {
                Value::Integer(self.buf.read_i64::<BigEndian>().map_err(end_of_data)?)
            }
            Marker::Float64 => {
                Value::Float(self.buf.read_f64::<BigEndian>().map_err(end_of_data)?)
            }
            Marker::TinyString(len) => self.read_string(len as usize)?,
            Marker::String8 => {
                let len = self.read_u8()? as usize;
                self.read_string(len)?
            }
            Marker::String16 => {
                let len = self.read_u16()? as usize;
                self.read_string(len)?
            }
            Marker::String32 => {
                let len = self.read_u32()? as usize;
                self.read_string(len)?
            }
            Marker::Bytes8 => {
                let len = self.read_u8()? as usize;
                Value::Bytes(self.read_raw(len)?.to_vec())
            }
            Marker::Bytes16 => {
                let len = self.read_u16()? as usize;
                Value::Bytes(self.read_raw(len)?.to_vec())
            }
            Marker::Bytes32 => {
                let len = self.read_u32()? as usize;
                Value::Bytes(self.read_raw(len)?.to_vec())
            }
            Marker::TinyList(len) => self.read_list(len as usize)?,
            Marker::List8 => {
                let len = self.read_u8()? as usize;
                self.read_list(len)?
            }
            Marker::List16 => {
                let len = self.read_u16()? as usize;
                self.read_list(len)?
            }
            Marker::List32 => {
                let len = self.read_u32()? as usize;
                self.read_list(len)?
            }
            Marker::TinyDict(len) => self.read_dictionary(len as usize)?,
            Marker::Dict8 => {
                let len = self.read_u8()? as usize;
                self.read_dictionary(len)?
            }
            Marker::Dict16 => {
                let len = self.read_u16()? as usize;
                self.read_dictionary(len)?
            }
            Marker::Dict32 => {
                let len = self.read_u32()? as usize;
                self.read_dictionary(len)?
            }
            Marker::TinyStructure(len) => self.read_structure(len as usize)?,
            Marker::Reserved(n) => {
                return Err(Error::InvalidEncoding(format!(
                    "unknown marker byte 0x{:02X}",
                    n
                )));
            }
        })
    }

    fn read_u8(&mut self) -> Result<u8> {
        self.buf.read_u8().map_err(end_of_data)
    }

    fn read_u16(&mut self) -> Result<u16> {
        self.buf.read_u16::<BigEndian>().map_err(end_of_data)
    }

    fn read_u32(&mut self) -> Result<u32> {
        self.buf.read_u32::<BigEndian>().map_err(end_of_data)
    }

    /// Take `len` bytes off the front of the buffer. Checks the declared
    /// length against the bytes actually left.
    fn read_raw(&mut self, len: usize) -> Result<&'a [u8]> {
        let buf = self.buf;
        if buf.len() >= len {
            let (data, rem) = buf.split_at(len);
            self.buf = rem;
            Ok(data)
        } else {
            Err(Error::InvalidEncoding(format!(
                "declared length {} larger than remaining data ({} bytes)",
                len,
                buf.len()
            )))
        }
    }

    fn read_string(&mut self, len: usize) -> Result<Value> {
        let data = self.read_raw(len)?;
        let s = std::str::from_utf8(data)
            .map_err(|_| Error::InvalidEncoding("string payload is not valid UTF-8".to_string()))?;
        Ok(Value::String(s.to_string()))
    }

    fn read_list(&mut self, len: usize) -> Result<Value> {
        // Capacity is capped by the bytes left, so a hostile declared length
        // cannot force a huge allocation.
        let mut items = Vec::with_capacity(len.min(self.buf.len()));
        for _ in 0..len {
            items.push(self.read_value()?);
        }
        Ok(Value::List(items))
    }

    fn read_dictionary(&mut self, len: usize) -> Result<Value> {
        let mut dict = Dictionary::with_capacity(len.min(self.buf.len()));
        for _ in 0..len {
            let key = match self.read_value()? {
                Value::String(key) => key,
                other => {
                    return Err(Error::InvalidEncoding(format!(
                        "dictionary key must be a string, not {}",
                        other.kind()
                    )));
                }
            };
            let value = self.read_value()?;
            // Later writes win but the entry keeps its original position.
            dict.insert(key, value);
        }
        Ok(Value::Dictionary(dict))
    }

    fn read_structure(&mut self, len: usize) -> Result<Value> {
        let tag = self.read_u8()?;
        let mut fields = Vec::with_capacity(len);
        for _ in 0..len {
            fields.push(self.read_value()?);
        }
        let structure = Structure::new(tag, fields);
        if self.version.supports_extended_types() {
            hydrate(structure)
        } else {
            Ok(Value::Structure(structure))
        }
    }
}

fn end_of_data(_: std::io::Error) -> Error {
    Error::InvalidEncoding("unexpected end of data".to_string())
}

impl<'a> Iterator for Unpacker<'a> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Result<Value>> {
        if self.buf.is_empty() {
            return None;
        }
        let result = self.read_value();
        if result.is_err() {
            self.buf = &[];
        }
        Some(result)
    }
}

/// Turn a structure with a recognised tag into its value kind. Unknown tags
/// pass through untouched so foreign structures survive a round trip.
fn hydrate(structure: Structure) -> Result<Value> {
    let value = match (structure.tag, structure.fields.as_slice()) {
        (tags::DATE, [days]) => {
            Value::Date(Date::from_epoch_days(field_i64(days, "day offset")?)?)
        }
        (tags::TIME, [nanos]) => {
            Value::Time(Time::from_nanos_of_day(field_cast(nanos, "nanosecond-of-day")?)?)
        }
        (tags::TIME_OFFSET, [nanos, offset]) => Value::Time(
            Time::from_nanos_of_day(field_cast(nanos, "nanosecond-of-day")?)?
                .with_offset(field_cast(offset, "offset seconds")?),
        ),
        (tags::DATE_TIME, [seconds, nanos]) => Value::DateTime(DateTime::from_epoch_seconds(
            field_i64(seconds, "epoch seconds")?,
            field_cast(nanos, "nanoseconds")?,
        )?),
        (tags::DATE_TIME_OFFSET, [seconds, nanos, offset]) => Value::DateTime(
            DateTime::from_epoch_seconds(
                field_i64(seconds, "epoch seconds")?,
                field_cast(nanos, "nanoseconds")?,
            )?
            .with_offset(field_cast(offset, "offset seconds")?),
        ),
        (tags::DATE_TIME_ZONE, [seconds, nanos, zone]) => Value::DateTime(
            DateTime::from_epoch_seconds(
                field_i64(seconds, "epoch seconds")?,
                field_cast(nanos, "nanoseconds")?,
            )?
            .with_timezone(TimeZone::Named(field_string(zone, "zone name")?)),
        ),
        (tags::DURATION, [months, days, seconds, nanos]) => Value::Duration(Duration::new(
            field_i64(months, "months")?,
            field_i64(days, "days")?,
            field_i64(seconds, "seconds")?,
            field_i64(nanos, "nanoseconds")?,
        )),
        (tags::POINT_2D, [srid, x, y]) => Value::Point(Point::new(
            field_i64(srid, "srid")?,
            vec![field_f64(x, "x")?, field_f64(y, "y")?],
        )),
        (tags::POINT_3D, [srid, x, y, z]) => Value::Point(Point::new(
            field_i64(srid, "srid")?,
            vec![
                field_f64(x, "x")?,
                field_f64(y, "y")?,
                field_f64(z, "z")?,
            ],
        )),
        (
            tags::DATE
            | tags::TIME
            | tags::TIME_OFFSET
            | tags::DATE_TIME
            | tags::DATE_TIME_OFFSET
            | tags::DATE_TIME_ZONE
            | tags::DURATION
            | tags::POINT_2D
            | tags::POINT_3D,
            fields,
        ) => {
            return Err(Error::InvalidEncoding(format!(
                "structure tag 0x{:02X} with {} fields",
                structure.tag,
                fields.len()
            )));
        }
        _ => Value::Structure(structure),
    };
    Ok(value)
}

fn field_i64(field: &Value, name: &str) -> Result<i64> {
    field.as_i64().ok_or_else(|| {
        Error::InvalidEncoding(format!("structure field {} must be an integer", name))
    })
}

/// Read an integer field and narrow it to the target width.
fn field_cast<T: NumCast>(field: &Value, name: &str) -> Result<T> {
    NumCast::from(field_i64(field, name)?).ok_or_else(|| {
        Error::InvalidEncoding(format!("structure field {} out of range", name))
    })
}

fn field_f64(field: &Value, name: &str) -> Result<f64> {
    field.as_f64().ok_or_else(|| {
        Error::InvalidEncoding(format!("structure field {} must be a number", name))
    })
}

fn field_string(field: &Value, name: &str) -> Result<String> {
    match field {
        Value::String(s) => Ok(s.clone()),
        _ => Err(Error::InvalidEncoding(format!(
            "structure field {} must be a string",
            name
        ))),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pack::pack;

    fn unpack_one(data: &[u8]) -> Value {
        unpack_one_v(data, Version::default())
    }

    fn unpack_one_v(data: &[u8], version: Version) -> Value {
        let mut stream = unpack(data, version);
        let value = stream.next().expect("a value").expect("clean decode");
        assert_eq!(stream.remaining(), 0, "input should be fully consumed");
        value
    }

    fn assert_packable(value: impl Into<Value>, data: &[u8]) {
        let value = value.into();
        assert_eq!(pack(&value, Version::V2_0).unwrap(), data, "pack mismatch");
        assert_eq!(unpack_one_v(data, Version::V2_0), value, "unpack mismatch");
    }

    #[test]
    fn unpack_scalars() {
        assert_eq!(unpack_one(b"\xC0"), Value::Null);
        assert_eq!(unpack_one(b"\xC3"), Value::Boolean(true));
        assert_eq!(unpack_one(b"\xC2"), Value::Boolean(false));
        assert_eq!(unpack_one(b"\x00"), Value::Integer(0));
        assert_eq!(unpack_one(b"\xC8\x80"), Value::Integer(-0x80));
        assert_eq!(unpack_one(b"\xC9\x00\x80"), Value::Integer(0x80));
        assert_eq!(unpack_one(b"\xCA\x00\x00\x80\x00"), Value::Integer(0x8000));
        assert_eq!(
            unpack_one(b"\xCB\x00\x00\x00\x00\x80\x00\x00\x00"),
            Value::Integer(0x80000000)
        );
    }

    #[test]
    fn unpack_floats() {
        assert_eq!(
            unpack_one(b"\xC1\x00\x00\x00\x00\x00\x00\x00\x00"),
            Value::Float(0.0)
        );
        let v = unpack_one(b"\xC1\x80\x00\x00\x00\x00\x00\x00\x00");
        assert_eq!(v.as_f64().unwrap().to_bits(), (-0.0f64).to_bits());
        assert_eq!(
            unpack_one(b"\xC1\x7F\xF0\x00\x00\x00\x00\x00\x00"),
            Value::Float(f64::INFINITY)
        );
        assert_eq!(
            unpack_one(b"\xC1\xFF\xF0\x00\x00\x00\x00\x00\x00"),
            Value::Float(f64::NEG_INFINITY)
        );
        let v = unpack_one(b"\xC1\x7F\xF8\x00\x00\x00\x00\x00\x00");
        assert!(v.as_f64().unwrap().is_nan());
    }

    #[test]
    fn unpack_strings() {
        assert_eq!(unpack_one(b"\x80"), Value::String(String::new()));
        assert_eq!(unpack_one(b"\x81A"), Value::String("A".to_string()));
        let mut data = b"\xD0\x10".to_vec();
        data.extend_from_slice(&[b'A'; 0x10]);
        assert_eq!(unpack_one(&data), Value::String("A".repeat(0x10)));
        let mut data = b"\xD1\x01\x00".to_vec();
        data.extend_from_slice(&[b'A'; 0x100]);
        assert_eq!(unpack_one(&data), Value::String("A".repeat(0x100)));
        let mut data = b"\xD2\x00\x01\x00\x00".to_vec();
        data.extend_from_slice(&[b'A'; 0x10000]);
        assert_eq!(unpack_one(&data), Value::String("A".repeat(0x10000)));
    }

    #[test]
    fn unpack_bytes() {
        assert_eq!(unpack_one(b"\xCC\x00"), Value::Bytes(Vec::new()));
        let mut data = b"\xCD\x01\x00".to_vec();
        data.extend_from_slice(&[0u8; 0x100]);
        assert_eq!(unpack_one(&data), Value::Bytes(vec![0u8; 0x100]));
        let mut data = b"\xCE\x00\x01\x00\x00".to_vec();
        data.extend_from_slice(&[0u8; 0x10000]);
        assert_eq!(unpack_one(&data), Value::Bytes(vec![0u8; 0x10000]));
    }

    #[test]
    fn unpack_lists() {
        assert_eq!(unpack_one(b"\x90"), Value::List(Vec::new()));
        assert_eq!(unpack_one(b"\x91\x00"), Value::List(vec![Value::Integer(0)]));
        let mut data = b"\xD5\x01\x00".to_vec();
        data.extend_from_slice(&[0u8; 0x100]);
        assert_eq!(unpack_one(&data), Value::List(vec![Value::Integer(0); 0x100]));
    }

    #[test]
    fn unpack_dicts() {
        assert_eq!(unpack_one(b"\xA0"), Value::Dictionary(Dictionary::new()));
        let mut dict = Dictionary::new();
        dict.insert("0".to_string(), Value::Null);
        assert_eq!(unpack_one(b"\xA1\x810\xC0"), Value::Dictionary(dict));
    }

    #[test]
    fn unpack_dict_keeps_wire_order() {
        let value = unpack_one(b"\xA2\x81z\x01\x81a\x02");
        let dict = value.as_dictionary().unwrap();
        let entries: Vec<(&str, i64)> = dict
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_i64().unwrap()))
            .collect();
        assert_eq!(entries, [("z", 1), ("a", 2)]);
    }

    #[test]
    fn duplicate_dict_keys_last_write_wins() {
        let value = unpack_one(b"\xA2\x81a\x01\x81a\x02");
        let dict = value.as_dictionary().unwrap();
        assert_eq!(dict.len(), 1);
        assert_eq!(dict["a"], Value::Integer(2));
    }

    #[test]
    fn non_string_dict_key_is_invalid() {
        let err = unpack(b"\xA1\x01\xC0", Version::default())
            .next()
            .unwrap()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidEncoding(_)));
    }

    #[test]
    fn unknown_markers_are_rejected() {
        for marker in [0xC4u8, 0xC7, 0xCF, 0xD3, 0xD7, 0xDB, 0xDF, 0xE0, 0xEF] {
            let err = unpack(&[marker], Version::default())
                .next()
                .unwrap()
                .unwrap_err();
            assert!(
                matches!(err, Error::InvalidEncoding(_)),
                "0x{:02X} should be invalid",
                marker
            );
        }
    }

    #[test]
    fn unpack_multiple() {
        let values: Result<Vec<Value>> = unpack(b"\x01\x02\x03", Version::default()).collect();
        assert_eq!(
            values.unwrap(),
            [Value::Integer(1), Value::Integer(2), Value::Integer(3)]
        );
    }

    #[test]
    fn truncated_values_are_invalid() {
        for data in [
            &b"\xC1\x00"[..],     // float cut short
            &b"\xC9\x00"[..],     // int16 cut short
            &b"\xD0"[..],         // string missing its length byte
            &b"\x83AB"[..],       // string payload cut short
            &b"\x92\x01"[..],     // list missing an element
            &b"\xA1\x81a"[..],    // dict missing a value
            &b"\xB1"[..],         // structure missing its tag
        ] {
            let err = unpack(data, Version::default()).next().unwrap().unwrap_err();
            assert!(matches!(err, Error::InvalidEncoding(_)), "{:?}", data);
        }
    }

    #[test]
    fn errors_poison_the_cursor() {
        let mut stream = unpack(b"\xDF\x01\x02", Version::default());
        assert!(stream.next().unwrap().is_err());
        assert!(stream.next().is_none());
    }

    #[test]
    fn invalid_utf8_is_invalid_encoding() {
        let err = unpack(b"\x81\xFF", Version::default())
            .next()
            .unwrap()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidEncoding(_)));
    }

    #[test]
    fn hostile_declared_lengths_fail_without_allocating() {
        for data in [
            &b"\xCE\xFF\xFF\xFF\xFF"[..],
            &b"\xD2\xFF\xFF\xFF\xFF"[..],
            &b"\xD6\xFF\xFF\xFF\xFF"[..],
            &b"\xDA\xFF\xFF\xFF\xFF"[..],
        ] {
            let err = unpack(data, Version::default()).next().unwrap().unwrap_err();
            assert!(matches!(err, Error::InvalidEncoding(_)));
        }
    }

    #[test]
    fn non_canonical_integers_still_decode() {
        // Canonical form is a packer obligation only.
        assert_eq!(unpack_one(b"\xCB\x00\x00\x00\x00\x00\x00\x00\x01"), Value::Integer(1));
        assert_eq!(unpack_one(b"\xC9\x00\x01"), Value::Integer(1));
    }

    #[test]
    fn hydrate_date() {
        assert_eq!(
            unpack_one_v(b"\xB1D\x00", Version::V2_0),
            Value::Date(Date::new(1970, 1, 1).unwrap())
        );
    }

    #[test]
    fn hydrate_times() {
        assert_eq!(
            unpack_one_v(b"\xB1t\x00", Version::V2_0),
            Value::Time(Time::new(0, 0, 0, 0).unwrap())
        );
        assert_eq!(
            unpack_one_v(b"\xB2T\x00\x00", Version::V2_0),
            Value::Time(Time::new(0, 0, 0, 0).unwrap().with_offset(0))
        );
    }

    #[test]
    fn hydrate_date_times() {
        assert_eq!(
            unpack_one_v(b"\xB2d\x00\x00", Version::V2_0),
            Value::DateTime(DateTime::new(1970, 1, 1, 0, 0, 0, 0).unwrap())
        );
        assert_eq!(
            unpack_one_v(b"\xB3F\x00\x00\x3C", Version::V2_0),
            Value::DateTime(DateTime::new(1970, 1, 1, 0, 0, 0, 0).unwrap().with_offset(60))
        );
        assert_eq!(
            unpack_one_v(b"\xB3f\x00\x00\x83UTC", Version::V2_0),
            Value::DateTime(
                DateTime::new(1970, 1, 1, 0, 0, 0, 0)
                    .unwrap()
                    .with_timezone(TimeZone::utc())
            )
        );
    }

    #[test]
    fn hydrate_duration() {
        assert_eq!(
            unpack_one_v(b"\xB4E\x00\x00\x00\x00", Version::V2_0),
            Value::Duration(Duration::default())
        );
    }

    #[test]
    fn hydrate_points_accepts_integer_coordinates() {
        // A dynamically typed peer may send whole-number coordinates as
        // integers; they are widened to doubles on this side.
        assert_eq!(
            unpack_one_v(b"\xB3X\xC9\x10\xE6\x00\x00", Version::V2_0),
            Value::Point(Point::wgs84(0.0, 0.0))
        );
        assert_eq!(
            unpack_one_v(b"\xB4Y\xC9\x23\xC5\x00\x00\x00", Version::V2_0),
            Value::Point(Point::cartesian_3d(0.0, 0.0, 0.0))
        );
    }

    #[test]
    fn known_tag_with_wrong_arity_is_invalid() {
        let err = unpack(b"\xB2D\x00\x00", Version::V2_0)
            .next()
            .unwrap()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidEncoding(_)));
    }

    #[test]
    fn old_versions_pass_structures_through() {
        let value = unpack_one(b"\xB1D\x00");
        assert_eq!(
            value,
            Value::Structure(Structure::new(tags::DATE, vec![Value::Integer(0)]))
        );
    }

    #[test]
    fn unknown_tags_pass_through() {
        let value = unpack_one_v(b"\xB1N\x2A", Version::V2_0);
        assert_eq!(
            value,
            Value::Structure(Structure::new(b'N', vec![Value::Integer(42)]))
        );
    }

    #[test]
    fn round_trip_tiny_and_i8_integers() {
        for i in -16i64..128 {
            assert_packable(i, &[(i as i8) as u8]);
        }
        for i in -128i64..-16 {
            assert_packable(i, &[0xC8, (i as i8) as u8]);
        }
    }

    #[test]
    fn round_trip_16bit_integers() {
        for i in (-0x8000i64..-0x80).chain(0x80..0x8000) {
            let mut data = vec![0xC9];
            data.extend_from_slice(&(i as i16).to_be_bytes());
            assert_packable(i, &data);
        }
    }

    #[test]
    fn round_trip_32bit_integers() {
        for i in (-0x8000_0000i64..-0x8000)
            .step_by(100_001)
            .chain((0x8000i64..0x8000_0000).step_by(100_001))
        {
            let mut data = vec![0xCA];
            data.extend_from_slice(&(i as i32).to_be_bytes());
            assert_packable(i, &data);
        }
    }

    #[test]
    fn round_trip_64bit_integers() {
        for i in (i64::MIN..-0x8000_0000)
            .step_by(1_000_000_000_000_001)
            .chain((0x8000_0000i64..i64::MAX).step_by(1_000_000_000_000_001))
        {
            let mut data = vec![0xCB];
            data.extend_from_slice(&i.to_be_bytes());
            assert_packable(i, &data);
        }
    }

    #[test]
    fn round_trip_random_floats() {
        use rand::{Rng, SeedableRng};
        let mut rng = rand::rngs::StdRng::seed_from_u64(0);
        for _ in 0..10_000 {
            let n: f64 = rng.gen_range(-1e10..1e10);
            let mut data = vec![0xC1];
            data.extend_from_slice(&n.to_be_bytes());
            assert_packable(n, &data);
        }
    }

    #[test]
    fn round_trip_string_size_classes() {
        for n in 0..16usize {
            let mut data = vec![0x80 + n as u8];
            data.extend_from_slice(&vec![b'A'; n]);
            assert_packable("A".repeat(n), &data);
        }
        for n in 16..256usize {
            let mut data = vec![0xD0, n as u8];
            data.extend_from_slice(&vec![b'A'; n]);
            assert_packable("A".repeat(n), &data);
        }
    }

    #[test]
    fn round_trip_byte_array_size_classes() {
        for n in 0..256usize {
            let mut data = vec![0xCC, n as u8];
            data.extend_from_slice(&vec![0u8; n]);
            assert_packable(vec![0u8; n], &data);
        }
    }

    #[test]
    fn round_trip_list_size_classes() {
        for n in 0..16usize {
            let mut data = vec![0x90 + n as u8];
            data.extend_from_slice(&vec![0u8; n]);
            assert_packable(vec![Value::Integer(0); n], &data);
        }
        for n in 16..256usize {
            let mut data = vec![0xD4, n as u8];
            data.extend_from_slice(&vec![0u8; n]);
            assert_packable(vec![Value::Integer(0); n], &data);
        }
    }

    #[test]
    fn round_trip_dict_size_classes() {
        for n in (0..16usize).chain([16, 100, 255]) {
            let dict: Dictionary = (0..n)
                .map(|i| (format!("{:02X}", i), Value::Null))
                .collect();
            let mut data = if n < 16 {
                vec![0xA0 + n as u8]
            } else {
                vec![0xD8, n as u8]
            };
            for i in 0..n {
                data.push(0x82);
                data.extend_from_slice(format!("{:02X}", i).as_bytes());
                data.push(0xC0);
            }
            assert_packable(dict, &data);
        }
    }

    #[test]
    fn round_trip_nested_values() {
        let mut dict = Dictionary::new();
        dict.insert("one".to_string(), Value::Integer(1));
        dict.insert(
            "nested".to_string(),
            Value::List(vec![
                Value::Null,
                Value::Boolean(true),
                Value::Bytes(vec![1, 2, 3]),
                Value::Float(1.5),
            ]),
        );
        let value = Value::List(vec![Value::Dictionary(dict), Value::String("end".into())]);
        let data = pack(&value, Version::default()).unwrap();
        assert_eq!(unpack_one(&data), value);
    }

    #[test]
    fn round_trip_temporal_values() {
        let values = [
            Value::Date(Date::new(2018, 10, 1).unwrap()),
            Value::Time(Time::new(12, 34, 56, 789_123_456).unwrap()),
            Value::Time(Time::new(12, 34, 56, 789_123_456).unwrap().with_offset(3600)),
            Value::DateTime(DateTime::new(2018, 10, 1, 12, 34, 56, 789_123_456).unwrap()),
            Value::DateTime(
                DateTime::new(2018, 10, 1, 12, 34, 56, 789_123_456)
                    .unwrap()
                    .with_offset(-4 * 3600),
            ),
            Value::DateTime(
                DateTime::new(2018, 10, 1, 12, 34, 56, 789_123_456)
                    .unwrap()
                    .with_timezone(TimeZone::Named("Europe/Stockholm".to_string())),
            ),
            Value::Duration(Duration::new(3, 25, 82_817, 914_390_409)),
            Value::Point(Point::wgs84(12.5684, 55.6761)),
            Value::Point(Point::cartesian_3d(1.0, -2.0, 3.5)),
        ];
        for value in values {
            let data = pack(&value, Version::V2_0).unwrap();
            assert_eq!(unpack_one_v(&data, Version::V2_0), value, "{}", value.kind());
        }
    }

    #[test]
    fn round_trip_duration_keeps_large_seconds() {
        // Seconds are not folded into days, nor clamped to a minute.
        let d = Duration::new(0, 0, 90_061, 0);
        let data = pack(&Value::Duration(d), Version::V2_0).unwrap();
        assert_eq!(unpack_one_v(&data, Version::V2_0), Value::Duration(d));
    }

    #[test]
    fn stream_of_packed_values_concatenates() {
        let a = pack(&Value::String("a".into()), Version::default()).unwrap();
        let b = pack(&Value::Integer(300), Version::default()).unwrap();
        let c = pack(&Value::List(vec![Value::Null]), Version::default()).unwrap();
        let data: Vec<u8> = [a, b, c].concat();
        let values: Result<Vec<Value>> = unpack(&data, Version::default()).collect();
        assert_eq!(
            values.unwrap(),
            [
                Value::String("a".into()),
                Value::Integer(300),
                Value::List(vec![Value::Null]),
            ]
        );
    }
}
