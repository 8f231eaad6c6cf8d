use crate::error::{Error, Result};
use crate::marker::Marker;
use crate::spatial::Point;
use crate::structure::{tags, Structure};
use crate::temporal::{Date, DateTime, Duration, Time, TimeZone};
use crate::value::{Dictionary, Value};
use crate::version::Version;

/// Pack a single value into a fresh byte vector.
pub fn pack(value: &Value, version: Version) -> Result<Vec<u8>> {
    let mut packer = Packer::new(version);
    packer.pack(value)?;
    Ok(packer.into_packed())
}

/// A streaming encoder.
///
/// Values are appended to an internal buffer with [`pack`][Self::pack]; the
/// accumulated bytes come back out of [`packed`][Self::packed]. If a pack
/// call fails partway through a composite value the buffer holds a partial
/// encoding and must not be shipped; [`clear`][Self::clear] resets it.
pub struct Packer {
    buffer: Vec<u8>,
    version: Version,
}

impl Packer {
    pub fn new(version: Version) -> Packer {
        Packer {
            buffer: Vec::new(),
            version,
        }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Append one value to the buffer.
    pub fn pack(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Null => {
                self.buffer.push(Marker::Null.into());
                Ok(())
            }
            Value::Boolean(v) => {
                self.buffer
                    .push(if *v { Marker::True } else { Marker::False }.into());
                Ok(())
            }
            Value::Integer(v) => {
                self.pack_integer(*v);
                Ok(())
            }
            Value::Float(v) => {
                self.buffer.push(Marker::Float64.into());
                self.buffer.extend_from_slice(&v.to_bits().to_be_bytes());
                Ok(())
            }
            Value::String(v) => self.pack_string(v),
            Value::Bytes(v) => {
                self.write_header(v.len(), None, Marker::Bytes8, Marker::Bytes16, Marker::Bytes32, "byte array")?;
                self.buffer.extend_from_slice(v);
                Ok(())
            }
            Value::List(v) => self.pack_list(v),
            Value::Dictionary(v) => self.pack_dictionary(v),
            Value::Structure(v) => self.pack_structure(v),
            Value::Date(v) => self.pack_date(v),
            Value::Time(v) => self.pack_time(v),
            Value::DateTime(v) => self.pack_date_time(v),
            Value::Duration(v) => self.pack_duration(v),
            Value::Point(v) => self.pack_point(v),
        }
    }

    /// The bytes accumulated so far.
    pub fn packed(&self) -> &[u8] {
        &self.buffer
    }

    /// Consume the packer, returning the accumulated bytes.
    pub fn into_packed(self) -> Vec<u8> {
        self.buffer
    }

    /// Discard the accumulated bytes, keeping the version.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    fn pack_integer(&mut self, n: i64) {
        if (-16..128).contains(&n) {
            self.buffer.push(n as i8 as u8);
        } else if (-128..128).contains(&n) {
            self.buffer.push(Marker::Int8.into());
            self.buffer.push(n as i8 as u8);
        } else if (i16::MIN as i64..=i16::MAX as i64).contains(&n) {
            self.buffer.push(Marker::Int16.into());
            self.buffer.extend_from_slice(&(n as i16).to_be_bytes());
        } else if (i32::MIN as i64..=i32::MAX as i64).contains(&n) {
            self.buffer.push(Marker::Int32.into());
            self.buffer.extend_from_slice(&(n as i32).to_be_bytes());
        } else {
            self.buffer.push(Marker::Int64.into());
            self.buffer.extend_from_slice(&n.to_be_bytes());
        }
    }

    fn pack_string(&mut self, s: &str) -> Result<()> {
        self.write_header(
            s.len(),
            Some(Marker::TinyString(0)),
            Marker::String8,
            Marker::String16,
            Marker::String32,
            "string",
        )?;
        self.buffer.extend_from_slice(s.as_bytes());
        Ok(())
    }

    fn pack_list(&mut self, items: &[Value]) -> Result<()> {
        self.write_header(
            items.len(),
            Some(Marker::TinyList(0)),
            Marker::List8,
            Marker::List16,
            Marker::List32,
            "list",
        )?;
        for item in items {
            self.pack(item)?;
        }
        Ok(())
    }

    fn pack_dictionary(&mut self, dict: &Dictionary) -> Result<()> {
        self.write_header(
            dict.len(),
            Some(Marker::TinyDict(0)),
            Marker::Dict8,
            Marker::Dict16,
            Marker::Dict32,
            "dictionary",
        )?;
        for (key, value) in dict {
            self.pack_string(key)?;
            self.pack(value)?;
        }
        Ok(())
    }

    fn pack_structure(&mut self, structure: &Structure) -> Result<()> {
        self.write_structure_header(structure.tag, structure.fields.len())?;
        for field in &structure.fields {
            self.pack(field)?;
        }
        Ok(())
    }

    fn pack_date(&mut self, date: &Date) -> Result<()> {
        self.check_extended("Date")?;
        self.write_structure_header(tags::DATE, 1)?;
        self.pack_integer(date.epoch_days());
        Ok(())
    }

    fn pack_time(&mut self, time: &Time) -> Result<()> {
        self.check_extended("Time")?;
        match time.timezone() {
            None => {
                self.write_structure_header(tags::TIME, 1)?;
                self.pack_integer(time.nanos_of_day() as i64);
            }
            Some(TimeZone::Offset(seconds)) => {
                self.write_structure_header(tags::TIME_OFFSET, 2)?;
                self.pack_integer(time.nanos_of_day() as i64);
                self.pack_integer(*seconds as i64);
            }
            Some(TimeZone::Named(name)) => {
                return Err(Error::TypeMismatch(format!(
                    "time with named zone {:?} has no wire form; use a UTC offset",
                    name
                )));
            }
        }
        Ok(())
    }

    fn pack_date_time(&mut self, dt: &DateTime) -> Result<()> {
        self.check_extended("DateTime")?;
        match dt.timezone() {
            None => {
                self.write_structure_header(tags::DATE_TIME, 2)?;
                self.pack_integer(dt.epoch_seconds());
                self.pack_integer(dt.nanosecond() as i64);
            }
            Some(TimeZone::Offset(seconds)) => {
                self.write_structure_header(tags::DATE_TIME_OFFSET, 3)?;
                self.pack_integer(dt.epoch_seconds());
                self.pack_integer(dt.nanosecond() as i64);
                self.pack_integer(*seconds as i64);
            }
            Some(TimeZone::Named(name)) => {
                self.write_structure_header(tags::DATE_TIME_ZONE, 3)?;
                self.pack_integer(dt.epoch_seconds());
                self.pack_integer(dt.nanosecond() as i64);
                self.pack_string(name)?;
            }
        }
        Ok(())
    }

    fn pack_duration(&mut self, duration: &Duration) -> Result<()> {
        self.check_extended("Duration")?;
        self.write_structure_header(tags::DURATION, 4)?;
        self.pack_integer(duration.months());
        self.pack_integer(duration.days());
        self.pack_integer(duration.seconds());
        self.pack_integer(duration.nanoseconds() as i64);
        Ok(())
    }

    fn pack_point(&mut self, point: &Point) -> Result<()> {
        self.check_extended("Point")?;
        let tag = match point.dimensions() {
            2 => tags::POINT_2D,
            3 => tags::POINT_3D,
            n => {
                return Err(Error::ValueRange(format!(
                    "cannot pack a point with {} coordinates",
                    n
                )));
            }
        };
        self.write_structure_header(tag, 1 + point.dimensions())?;
        self.pack_integer(point.srid());
        for &coordinate in point.coordinates() {
            self.buffer.push(Marker::Float64.into());
            self.buffer
                .extend_from_slice(&coordinate.to_bits().to_be_bytes());
        }
        Ok(())
    }

    /// Write a size-class header for a length-prefixed kind, always picking
    /// the smallest class the declared length fits. The check is on the
    /// declared length alone, so it also guards lengths the buffer could
    /// never hold.
    fn write_header(
        &mut self,
        len: usize,
        tiny: Option<Marker>,
        m8: Marker,
        m16: Marker,
        m32: Marker,
        kind: &'static str,
    ) -> Result<()> {
        if len <= 15 {
            if let Some(tiny) = tiny {
                self.buffer.push(tiny.into_u8() | len as u8);
                return Ok(());
            }
        }
        if len <= u8::MAX as usize {
            self.buffer.push(m8.into());
            self.buffer.push(len as u8);
        } else if len <= u16::MAX as usize {
            self.buffer.push(m16.into());
            self.buffer.extend_from_slice(&(len as u16).to_be_bytes());
        } else if len <= u32::MAX as usize {
            self.buffer.push(m32.into());
            self.buffer.extend_from_slice(&(len as u32).to_be_bytes());
        } else {
            return Err(Error::ValueRange(format!(
                "{} of length {} exceeds the 32-bit length limit",
                kind, len
            )));
        }
        Ok(())
    }

    fn write_structure_header(&mut self, tag: u8, n_fields: usize) -> Result<()> {
        if n_fields > 15 {
            return Err(Error::ValueRange(format!(
                "structure with {} fields exceeds the 15-field limit",
                n_fields
            )));
        }
        self.buffer
            .push(Marker::TinyStructure(n_fields as u8).into());
        self.buffer.push(tag);
        Ok(())
    }

    fn check_extended(&self, kind: &'static str) -> Result<()> {
        if self.version.supports_extended_types() {
            Ok(())
        } else {
            Err(Error::VersionMismatch {
                version: self.version,
                kind,
            })
        }
    }
}
