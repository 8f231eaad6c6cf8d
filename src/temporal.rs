use std::fmt;
use std::ops;
use std::sync::OnceLock;
use std::time::SystemTime;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Lowest year the codec will carry in a civil date.
pub const MIN_YEAR: i32 = 1;
/// Highest year the codec will carry in a civil date.
pub const MAX_YEAR: i32 = 9999;

const MAX_NANOSEC: u32 = 999_999_999;
const NANOS_PER_SEC: i64 = 1_000_000_000;
const SECS_PER_DAY: i64 = 86_400;
const NANOS_PER_DAY: u64 = 86_400 * 1_000_000_000;

/// Day count of the given month, honouring leap years.
fn days_in_month(year: i32, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Days from 1970-01-01 to the given proleptic-Gregorian civil date.
fn days_from_civil(y: i64, m: u8, d: u8) -> i64 {
    let y = if m <= 2 { y - 1 } else { y };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    let mp = (m as i64 + 9) % 12;
    let doy = (153 * mp + 2) / 5 + d as i64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146097 + doe - 719468
}

/// Inverse of [`days_from_civil`].
fn civil_from_days(z: i64) -> (i64, u8, u8) {
    let z = z + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = z - era * 146097;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let m = (if mp < 10 { mp + 3 } else { mp - 9 }) as u8;
    (if m <= 2 { y + 1 } else { y }, m, d)
}

/// Pad or accept a fractional-second digit string and return nanoseconds.
/// Integer-only on purpose; ISO fractions never pass through a float.
fn nanos_from_digits(digits: &str) -> u32 {
    let mut nanos: u32 = 0;
    for (i, c) in digits.bytes().take(9).enumerate() {
        nanos += (c - b'0') as u32 * 10u32.pow(8 - i as u32);
    }
    nanos
}

/// A timezone carrier: either a fixed UTC offset or a named IANA zone.
///
/// The codec transports zone names verbatim and owns no zone database;
/// resolving a name to an offset is the peer's concern.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeZone {
    /// Fixed offset east of UTC, in seconds.
    Offset(i32),
    /// Named IANA zone, e.g. `"Europe/Stockholm"`.
    Named(String),
}

impl TimeZone {
    /// The named UTC zone.
    pub fn utc() -> TimeZone {
        TimeZone::Named("UTC".to_string())
    }

    /// A fixed offset given in whole minutes.
    pub fn offset_minutes(minutes: i32) -> TimeZone {
        TimeZone::Offset(minutes * 60)
    }
}

/// A civil date on the proleptic Gregorian calendar.
///
/// Wire form is a signed day offset from 1970-01-01. The all-zero date
/// `(0, 0, 0)` is accepted as a sentinel one day before 0001-01-01; every
/// other date must fall inside [[`MIN_YEAR`], [`MAX_YEAR`]].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Date {
    year: i32,
    month: u8,
    day: u8,
}

impl Date {
    /// Construct a date from civil fields.
    ///
    /// A negative day indexes from the end of the month, so `-1` is the last
    /// day. Out-of-domain fields fail with a value-range error.
    pub fn new(year: i32, month: i8, day: i8) -> Result<Date> {
        if year == 0 && month == 0 && day == 0 {
            return Ok(Date::ZERO);
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(Error::ValueRange(format!(
                "year {} out of range {}..={}",
                year, MIN_YEAR, MAX_YEAR
            )));
        }
        if !(1..=12).contains(&month) {
            return Err(Error::ValueRange(format!("month {} out of range 1..=12", month)));
        }
        let month = month as u8;
        let last = days_in_month(year, month) as i8;
        let day = if day < 0 { last + 1 + day } else { day };
        if day < 1 || day > last {
            return Err(Error::ValueRange(format!(
                "day {} out of range for {:04}-{:02}",
                day, year, month
            )));
        }
        Ok(Date {
            year,
            month,
            day: day as u8,
        })
    }

    /// The zero sentinel date.
    pub const ZERO: Date = Date {
        year: 0,
        month: 0,
        day: 0,
    };

    /// Construct a date from its wire form, a signed day offset from
    /// 1970-01-01.
    pub fn from_epoch_days(days: i64) -> Result<Date> {
        let (year, month, day) = civil_from_days(days);
        if !(MIN_YEAR as i64..=MAX_YEAR as i64).contains(&year) {
            return Err(Error::ValueRange(format!(
                "day offset {} falls outside year range {}..={}",
                days, MIN_YEAR, MAX_YEAR
            )));
        }
        Ok(Date {
            year: year as i32,
            month,
            day,
        })
    }

    /// Signed day offset from 1970-01-01. The zero sentinel maps to the day
    /// before 0001-01-01.
    pub fn epoch_days(&self) -> i64 {
        if self.is_zero() {
            days_from_civil(0, 12, 31)
        } else {
            days_from_civil(self.year as i64, self.month, self.day)
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    pub fn is_zero(&self) -> bool {
        *self == Date::ZERO
    }

    /// `YYYY-MM-DD`.
    pub fn iso_format(&self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }

    /// Parse a `YYYY-MM-DD` string.
    pub fn from_iso_format(s: &str) -> Result<Date> {
        static RE: OnceLock<Regex> = OnceLock::new();
        let re = RE.get_or_init(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").unwrap());
        let caps = re
            .captures(s)
            .ok_or_else(|| Error::ValueRange(format!("not an ISO date: {:?}", s)))?;
        let year: i32 = caps[1].parse().unwrap();
        let month: i8 = caps[2].parse().unwrap();
        let day: i8 = caps[3].parse().unwrap();
        Date::new(year, month, day)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.iso_format())
    }
}

/// A time of day with nanosecond resolution and an optional timezone.
///
/// Wire form is the nanosecond-of-day; aware times additionally carry their
/// UTC offset in seconds. A named zone on a time has no wire form.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Time {
    nanos_of_day: u64,
    tz: Option<TimeZone>,
}

impl Time {
    /// Construct a naive time from clock fields.
    pub fn new(hour: u8, minute: u8, second: u8, nanosecond: u32) -> Result<Time> {
        if hour > 23 {
            return Err(Error::ValueRange(format!("hour {} out of range 0..=23", hour)));
        }
        if minute > 59 {
            return Err(Error::ValueRange(format!("minute {} out of range 0..=59", minute)));
        }
        if second > 59 {
            return Err(Error::ValueRange(format!("second {} out of range 0..=59", second)));
        }
        if nanosecond > MAX_NANOSEC {
            return Err(Error::ValueRange(format!(
                "nanosecond {} out of range 0..={}",
                nanosecond, MAX_NANOSEC
            )));
        }
        let secs = hour as u64 * 3600 + minute as u64 * 60 + second as u64;
        Ok(Time {
            nanos_of_day: secs * NANOS_PER_SEC as u64 + nanosecond as u64,
            tz: None,
        })
    }

    /// Construct a naive time from its wire form.
    pub fn from_nanos_of_day(nanos_of_day: u64) -> Result<Time> {
        if nanos_of_day >= NANOS_PER_DAY {
            return Err(Error::ValueRange(format!(
                "nanosecond-of-day {} exceeds one day",
                nanos_of_day
            )));
        }
        Ok(Time {
            nanos_of_day,
            tz: None,
        })
    }

    /// Attach a timezone carrier.
    pub fn with_timezone(mut self, tz: TimeZone) -> Time {
        self.tz = Some(tz);
        self
    }

    /// Attach a fixed UTC offset in seconds.
    pub fn with_offset(self, seconds: i32) -> Time {
        self.with_timezone(TimeZone::Offset(seconds))
    }

    pub fn nanos_of_day(&self) -> u64 {
        self.nanos_of_day
    }

    pub fn hour(&self) -> u8 {
        (self.nanos_of_day / (3600 * NANOS_PER_SEC as u64)) as u8
    }

    pub fn minute(&self) -> u8 {
        (self.nanos_of_day / (60 * NANOS_PER_SEC as u64) % 60) as u8
    }

    pub fn second(&self) -> u8 {
        (self.nanos_of_day / NANOS_PER_SEC as u64 % 60) as u8
    }

    pub fn nanosecond(&self) -> u32 {
        (self.nanos_of_day % NANOS_PER_SEC as u64) as u32
    }

    pub fn timezone(&self) -> Option<&TimeZone> {
        self.tz.as_ref()
    }

    pub fn is_aware(&self) -> bool {
        self.tz.is_some()
    }

    /// Strip the timezone carrier.
    pub fn to_naive(&self) -> Time {
        Time {
            nanos_of_day: self.nanos_of_day,
            tz: None,
        }
    }

    /// `HH:MM:SS.fffffffff`, with an offset suffix when aware of one.
    pub fn iso_format(&self) -> String {
        let mut out = format!(
            "{:02}:{:02}:{:02}.{:09}",
            self.hour(),
            self.minute(),
            self.second(),
            self.nanosecond()
        );
        if let Some(TimeZone::Offset(seconds)) = self.tz {
            out.push_str(&format_offset(seconds));
        }
        out
    }

    /// Parse `HH[:MM[:SS[.f…]]]` with an optional `±HH:MM` offset.
    pub fn from_iso_format(s: &str) -> Result<Time> {
        static RE: OnceLock<Regex> = OnceLock::new();
        let re = RE.get_or_init(|| {
            Regex::new(r"^(\d{2})(?::(\d{2})(?::(\d{2})(?:\.(\d{1,9}))?)?)?([+-]\d{2}:\d{2}(?::\d{2}(?:\.\d{1,9})?)?)?$")
                .unwrap()
        });
        let caps = re
            .captures(s)
            .ok_or_else(|| Error::ValueRange(format!("not an ISO time: {:?}", s)))?;
        let hour: u8 = caps[1].parse().unwrap();
        let minute: u8 = caps.get(2).map_or(0, |m| m.as_str().parse().unwrap());
        let second: u8 = caps.get(3).map_or(0, |m| m.as_str().parse().unwrap());
        let nanos = caps.get(4).map_or(0, |m| nanos_from_digits(m.as_str()));
        let time = Time::new(hour, minute, second, nanos)?;
        match caps.get(5) {
            Some(m) => Ok(time.with_offset(parse_offset(m.as_str()))),
            None => Ok(time),
        }
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.iso_format())
    }
}

/// Render a UTC offset as `±HH:MM`, appending `:SS` only when the offset
/// does not sit on a whole minute.
fn format_offset(seconds: i32) -> String {
    let sign = if seconds < 0 { '-' } else { '+' };
    let magnitude = seconds.unsigned_abs();
    let mut out = format!("{}{:02}:{:02}", sign, magnitude / 3600, magnitude / 60 % 60);
    if magnitude % 60 != 0 {
        out.push_str(&format!(":{:02}", magnitude % 60));
    }
    out
}

/// Parse a `±HH:MM[:SS[.f…]]` offset into seconds. Any seconds group is
/// ignored, matching the source format's behaviour.
fn parse_offset(s: &str) -> i32 {
    let sign = if s.starts_with('-') { -1 } else { 1 };
    let hours: i32 = s[1..3].parse().unwrap();
    let minutes: i32 = s[4..6].parse().unwrap();
    sign * (hours * 3600 + minutes * 60)
}

/// A civil date paired with a time of day, with an optional timezone.
///
/// Wire form is epoch seconds plus nanosecond-of-second; for aware values
/// the seconds are the *local* wall-clock seconds, and the offset or zone
/// name travels alongside.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateTime {
    date: Date,
    time: Time,
    tz: Option<TimeZone>,
}

impl DateTime {
    /// Construct a naive datetime from civil fields.
    pub fn new(
        year: i32,
        month: i8,
        day: i8,
        hour: u8,
        minute: u8,
        second: u8,
        nanosecond: u32,
    ) -> Result<DateTime> {
        Ok(DateTime {
            date: Date::new(year, month, day)?,
            time: Time::new(hour, minute, second, nanosecond)?,
            tz: None,
        })
    }

    /// Combine a date and a time; the time's timezone, if any, lifts onto
    /// the datetime.
    pub fn from_parts(date: Date, time: Time) -> DateTime {
        let tz = time.tz.clone();
        DateTime {
            date,
            time: time.to_naive(),
            tz,
        }
    }

    /// Attach a timezone carrier.
    pub fn with_timezone(mut self, tz: TimeZone) -> DateTime {
        self.tz = Some(tz);
        self
    }

    /// Attach a fixed UTC offset in seconds.
    pub fn with_offset(self, seconds: i32) -> DateTime {
        self.with_timezone(TimeZone::Offset(seconds))
    }

    /// Construct a naive datetime from wire-form epoch seconds and
    /// nanosecond-of-second.
    pub fn from_epoch_seconds(seconds: i64, nanosecond: u32) -> Result<DateTime> {
        if nanosecond > MAX_NANOSEC {
            return Err(Error::ValueRange(format!(
                "nanosecond {} out of range 0..={}",
                nanosecond, MAX_NANOSEC
            )));
        }
        let date = Date::from_epoch_days(seconds.div_euclid(SECS_PER_DAY))?;
        let secs_of_day = seconds.rem_euclid(SECS_PER_DAY) as u64;
        Ok(DateTime {
            date,
            time: Time {
                nanos_of_day: secs_of_day * NANOS_PER_SEC as u64 + nanosecond as u64,
                tz: None,
            },
            tz: None,
        })
    }

    /// Wire-form epoch seconds: the wall-clock seconds since 1970-01-01 of
    /// the civil fields, ignoring any timezone.
    pub fn epoch_seconds(&self) -> i64 {
        self.date.epoch_days() * SECS_PER_DAY + (self.time.nanos_of_day / NANOS_PER_SEC as u64) as i64
    }

    /// The current instant in UTC, as a naive datetime.
    pub fn utc_now() -> DateTime {
        let elapsed = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default();
        DateTime::from_epoch_seconds(elapsed.as_secs() as i64, elapsed.subsec_nanos())
            .expect("system clock within year range")
    }

    pub fn date(&self) -> Date {
        self.date
    }

    pub fn time(&self) -> &Time {
        &self.time
    }

    pub fn year(&self) -> i32 {
        self.date.year
    }

    pub fn month(&self) -> u8 {
        self.date.month
    }

    pub fn day(&self) -> u8 {
        self.date.day
    }

    pub fn hour(&self) -> u8 {
        self.time.hour()
    }

    pub fn minute(&self) -> u8 {
        self.time.minute()
    }

    pub fn second(&self) -> u8 {
        self.time.second()
    }

    pub fn nanosecond(&self) -> u32 {
        self.time.nanosecond()
    }

    pub fn timezone(&self) -> Option<&TimeZone> {
        self.tz.as_ref()
    }

    pub fn is_aware(&self) -> bool {
        self.tz.is_some()
    }

    /// Apply a duration, month component first with the day clamped to the
    /// target month's length, then days and sub-day components through epoch
    /// arithmetic. `None` when the result leaves the year domain.
    pub fn checked_add(&self, duration: &Duration) -> Option<DateTime> {
        let mut year = self.date.year;
        let mut month = self.date.month;
        let mut day = self.date.day;
        if duration.months != 0 {
            let total = year as i64 * 12 + (month as i64 - 1) + duration.months;
            year = i32::try_from(total.div_euclid(12)).ok()?;
            month = total.rem_euclid(12) as u8 + 1;
            day = day.min(days_in_month(year, month));
        }
        let days = days_from_civil(year as i64, month, day) + duration.days;
        let mut seconds =
            days * SECS_PER_DAY + (self.time.nanos_of_day / NANOS_PER_SEC as u64) as i64 + duration.seconds;
        let mut nanos = self.time.nanosecond() + duration.nanos;
        if nanos > MAX_NANOSEC {
            nanos -= MAX_NANOSEC + 1;
            seconds += 1;
        }
        let mut result = DateTime::from_epoch_seconds(seconds, nanos).ok()?;
        result.tz = self.tz.clone();
        Some(result)
    }

    /// Apply a negated duration. `None` when the result leaves the year
    /// domain.
    pub fn checked_sub(&self, duration: &Duration) -> Option<DateTime> {
        self.checked_add(&-*duration)
    }

    /// `<date>T<time>` with an offset suffix when offset-aware. Named zones
    /// are not resolved and render without a suffix.
    pub fn iso_format(&self) -> String {
        let mut out = format!("{}T{}", self.date.iso_format(), self.time.iso_format());
        if let Some(TimeZone::Offset(seconds)) = self.tz {
            out.push_str(&format_offset(seconds));
        }
        out
    }

    /// Parse an ISO-8601 datetime.
    ///
    /// The time part may stop after the hour, the minute, or the second; a
    /// fraction carries up to nine digits. An offset is `±HH:MM`, optionally
    /// followed by a seconds group that is ignored.
    pub fn from_iso_format(s: &str) -> Result<DateTime> {
        static RE: OnceLock<Regex> = OnceLock::new();
        let re = RE.get_or_init(|| {
            Regex::new(
                r"^(\d{4})-(\d{2})-(\d{2})T(\d{2})(?::(\d{2})(?::(\d{2})(?:\.(\d{1,9}))?)?)?([+-]\d{2}:\d{2}(?::\d{2}(?:\.\d{1,9})?)?)?$",
            )
            .unwrap()
        });
        let caps = re
            .captures(s)
            .ok_or_else(|| Error::ValueRange(format!("not an ISO datetime: {:?}", s)))?;
        let date = Date::new(
            caps[1].parse().unwrap(),
            caps[2].parse().unwrap(),
            caps[3].parse().unwrap(),
        )?;
        let hour: u8 = caps[4].parse().unwrap();
        let minute: u8 = caps.get(5).map_or(0, |m| m.as_str().parse().unwrap());
        let second: u8 = caps.get(6).map_or(0, |m| m.as_str().parse().unwrap());
        let nanos = caps.get(7).map_or(0, |m| nanos_from_digits(m.as_str()));
        let time = Time::new(hour, minute, second, nanos)?;
        let dt = DateTime::from_parts(date, time);
        match caps.get(8) {
            Some(m) => Ok(dt.with_offset(parse_offset(m.as_str()))),
            None => Ok(dt),
        }
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.iso_format())
    }
}

impl ops::Add<Duration> for DateTime {
    type Output = DateTime;

    fn add(self, rhs: Duration) -> DateTime {
        self.checked_add(&rhs).expect("datetime out of range")
    }
}

impl ops::Sub<Duration> for DateTime {
    type Output = DateTime;

    fn sub(self, rhs: Duration) -> DateTime {
        self.checked_sub(&rhs).expect("datetime out of range")
    }
}

impl ops::Sub<DateTime> for DateTime {
    type Output = Duration;

    /// Componentwise difference: whole months from the civil dates, whole
    /// days from the day fields, and the time-of-day difference as
    /// seconds + nanoseconds. Days and seconds may come out negative.
    fn sub(self, rhs: DateTime) -> Duration {
        let months = (self.date.year as i64 - rhs.date.year as i64) * 12
            + (self.date.month as i64 - rhs.date.month as i64);
        let days = self.date.day as i64 - rhs.date.day as i64;
        let nano_diff = self.time.nanos_of_day as i64 - rhs.time.nanos_of_day as i64;
        Duration::new(months, days, 0, nano_diff)
    }
}

/// A calendar-aware span of time.
///
/// The four components are deliberately independent: month and day lengths
/// vary, so none is normalised into another. Only the nanosecond component
/// is kept inside a second, borrowing from the seconds component as needed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Duration {
    months: i64,
    days: i64,
    seconds: i64,
    nanos: u32,
}

impl Duration {
    /// Construct a duration. `nanoseconds` may carry any sign or magnitude;
    /// whole seconds are folded into the seconds component so the stored
    /// nanosecond part lands in `0..1_000_000_000`.
    pub fn new(months: i64, days: i64, seconds: i64, nanoseconds: i64) -> Duration {
        Duration {
            months,
            days,
            seconds: seconds + nanoseconds.div_euclid(NANOS_PER_SEC),
            nanos: nanoseconds.rem_euclid(NANOS_PER_SEC) as u32,
        }
    }

    pub fn months(&self) -> i64 {
        self.months
    }

    pub fn days(&self) -> i64 {
        self.days
    }

    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    pub fn nanoseconds(&self) -> u32 {
        self.nanos
    }
}

impl ops::Neg for Duration {
    type Output = Duration;

    fn neg(self) -> Duration {
        Duration::new(-self.months, -self.days, -self.seconds, -(self.nanos as i64))
    }
}
