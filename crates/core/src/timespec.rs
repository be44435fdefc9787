//! Bit-packed schedule descriptor
//!
//! A [`TimeSpec`] packs a schedule into 32 bits so it fits in the settings
//! record. The top three bits select the variant:
//!
//! ```text
//!  31 29 28                                                         0
//! +-----+------------------------------------------------------------+
//! | tag |                  variant-specific fields                   |
//! +-----+------------------------------------------------------------+
//!
//! tag 000  wildcard:  ----MMMMDDDDDDddddhhhhhmmmmmm
//!                     m minute 0..59 (*=63)   h hour 0..23 (*=31)
//!                     d weekday 0..7 (*=15)   D date 0..31 (*=63)
//!                     M month 0..11 (*=15)
//! tag 001  period:    ------------------mmmmmmmmmmm  every m minutes (0..1439)
//! tag 010  inclusive: --------------------uuuuulllll low < hour < high
//! tag 011  exclusive: --------------------uuuuulllll NOT (low < hour < high)
//! tag 111  none:      never matches
//! ```
//!
//! Tags `100..110` are reserved. Decoding rejects reserved tags, out-of-range
//! fields and set bits outside the variant's fields, so every accepted word
//! re-encodes to itself.

use core::fmt;

const TAG_SHIFT: u32 = 29;
const TAG_MASK: u32 = 0b111 << TAG_SHIFT;
const BODY_MASK: u32 = !TAG_MASK;

const TAG_WILDCARD: u32 = 0b000;
const TAG_PERIOD: u32 = 0b001;
const TAG_INCLUSIVE: u32 = 0b010;
const TAG_EXCLUSIVE: u32 = 0b011;
const TAG_NONE: u32 = 0b111;

/// Bit position and width of a packed field
#[derive(Clone, Copy)]
struct Field {
    shift: u32,
    width: u32,
}

impl Field {
    const fn mask(self) -> u32 {
        ((1 << self.width) - 1) << self.shift
    }

    const fn get(self, raw: u32) -> u32 {
        (raw & self.mask()) >> self.shift
    }

    const fn put(self, value: u32) -> u32 {
        (value << self.shift) & self.mask()
    }
}

const MINUTE: Field = Field { shift: 0, width: 6 };
const HOUR: Field = Field { shift: 6, width: 5 };
const WEEKDAY: Field = Field { shift: 11, width: 4 };
const DATE: Field = Field { shift: 15, width: 6 };
const MONTH: Field = Field { shift: 21, width: 4 };
const PERIOD: Field = Field { shift: 0, width: 11 };
const RANGE_LOW: Field = Field { shift: 0, width: 5 };
const RANGE_HIGH: Field = Field { shift: 5, width: 5 };

/// Largest period: one minute short of a day
pub const MAX_PERIOD_MINUTES: u16 = 24 * 60 - 1;

/// Decode or encode failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSpecError {
    /// Tag `100..110`
    ReservedVariant(u8),
    /// A field holds a value outside its range and is not the wildcard
    FieldOutOfRange,
    /// Bits outside the variant's fields are set
    ReservedBitsSet,
}

impl fmt::Display for TimeSpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeSpecError::ReservedVariant(tag) => write!(f, "reserved time spec variant {:03b}", tag),
            TimeSpecError::FieldOutOfRange => write!(f, "time spec field out of range"),
            TimeSpecError::ReservedBitsSet => write!(f, "time spec reserved bits set"),
        }
    }
}

/// Wall-clock timestamp a [`TimeSpec`] is evaluated against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateTime {
    /// 0..59
    pub minute: u8,
    /// 0..23
    pub hour: u8,
    /// 0..6, 0 = Sunday
    pub weekday: u8,
    /// Day of month, 1..31
    pub date: u8,
    /// 0..11, 0 = January
    pub month: u8,
}

impl DateTime {
    pub const fn new(month: u8, date: u8, weekday: u8, hour: u8, minute: u8) -> Self {
        Self {
            minute,
            hour,
            weekday,
            date,
            month,
        }
    }

    pub const fn minutes_since_midnight(&self) -> u16 {
        self.hour as u16 * 60 + self.minute as u16
    }
}

/// Wildcard date/time pattern; `None` fields match anything
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DatePattern {
    pub minute: Option<u8>,
    pub hour: Option<u8>,
    pub weekday: Option<u8>,
    pub date: Option<u8>,
    pub month: Option<u8>,
}

/// Field limits and wildcard codes: (max value, wildcard)
const MINUTE_RANGE: (u8, u8) = (59, 63);
const HOUR_RANGE: (u8, u8) = (23, 31);
const WEEKDAY_RANGE: (u8, u8) = (7, 15);
const DATE_RANGE: (u8, u8) = (31, 63);
const MONTH_RANGE: (u8, u8) = (11, 15);

fn decode_field(raw: u32, field: Field, (max, wildcard): (u8, u8)) -> Result<Option<u8>, TimeSpecError> {
    let value = field.get(raw) as u8;
    if value == wildcard {
        Ok(None)
    } else if value <= max {
        Ok(Some(value))
    } else {
        Err(TimeSpecError::FieldOutOfRange)
    }
}

fn encode_field(value: Option<u8>, field: Field, (max, wildcard): (u8, u8)) -> Result<u32, TimeSpecError> {
    match value {
        None => Ok(field.put(wildcard as u32)),
        Some(v) if v <= max => Ok(field.put(v as u32)),
        Some(_) => Err(TimeSpecError::FieldOutOfRange),
    }
}

fn field_matches(pattern: Option<u8>, actual: u8) -> bool {
    pattern.map_or(true, |v| v == actual)
}

impl DatePattern {
    /// Pattern matching every minute
    pub const ANY: Self = Self {
        minute: None,
        hour: None,
        weekday: None,
        date: None,
        month: None,
    };

    pub fn matches(&self, now: &DateTime) -> bool {
        field_matches(self.minute, now.minute)
            && field_matches(self.hour, now.hour)
            && field_matches(self.weekday, now.weekday)
            && field_matches(self.date, now.date)
            && field_matches(self.month, now.month)
    }

    fn decode(raw: u32) -> Result<Self, TimeSpecError> {
        Ok(Self {
            minute: decode_field(raw, MINUTE, MINUTE_RANGE)?,
            hour: decode_field(raw, HOUR, HOUR_RANGE)?,
            weekday: decode_field(raw, WEEKDAY, WEEKDAY_RANGE)?,
            date: decode_field(raw, DATE, DATE_RANGE)?,
            month: decode_field(raw, MONTH, MONTH_RANGE)?,
        })
    }

    fn encode(&self) -> Result<u32, TimeSpecError> {
        Ok(encode_field(self.minute, MINUTE, MINUTE_RANGE)?
            | encode_field(self.hour, HOUR, HOUR_RANGE)?
            | encode_field(self.weekday, WEEKDAY, WEEKDAY_RANGE)?
            | encode_field(self.date, DATE, DATE_RANGE)?
            | encode_field(self.month, MONTH, MONTH_RANGE)?)
    }
}

/// Schedule descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeSpec {
    /// Matches when every non-wildcard field equals the timestamp
    Wildcard(DatePattern),
    /// Matches every `minutes` minutes counted from midnight; `0` never matches
    Period { minutes: u16 },
    /// Matches when `low < hour < high`
    InclusiveHourRange { low: u8, high: u8 },
    /// Matches when NOT `low < hour < high`
    ExclusiveHourRange { low: u8, high: u8 },
    /// Never matches
    #[default]
    None,
}

impl TimeSpec {
    /// Packed form of [`TimeSpec::None`]
    pub const NONE_RAW: u32 = TAG_NONE << TAG_SHIFT;

    /// Every day at `hour:minute`
    pub const fn daily(hour: u8, minute: u8) -> Self {
        TimeSpec::Wildcard(DatePattern {
            minute: Some(minute),
            hour: Some(hour),
            ..DatePattern::ANY
        })
    }

    /// Every week on `weekday` at `hour:minute`
    pub const fn weekly(weekday: u8, hour: u8, minute: u8) -> Self {
        TimeSpec::Wildcard(DatePattern {
            minute: Some(minute),
            hour: Some(hour),
            weekday: Some(weekday),
            ..DatePattern::ANY
        })
    }

    /// Decode a packed 32-bit descriptor
    ///
    /// # Example
    ///
    /// ```
    /// use opentracker_core::timespec::{DateTime, TimeSpec};
    ///
    /// let every_30 = TimeSpec::decode(0x2000_001E).unwrap();
    /// assert_eq!(every_30, TimeSpec::Period { minutes: 30 });
    /// assert!(every_30.matches(&DateTime::new(0, 1, 1, 1, 30)));
    /// assert!(!every_30.matches(&DateTime::new(0, 1, 1, 1, 31)));
    /// ```
    pub fn decode(raw: u32) -> Result<Self, TimeSpecError> {
        let tag = raw >> TAG_SHIFT;
        let body = raw & BODY_MASK;

        let (spec, used) = match tag {
            TAG_WILDCARD => {
                let used = MINUTE.mask() | HOUR.mask() | WEEKDAY.mask() | DATE.mask() | MONTH.mask();
                check_unused(body, used)?;
                (TimeSpec::Wildcard(DatePattern::decode(body)?), used)
            }
            TAG_PERIOD => {
                let minutes = PERIOD.get(body) as u16;
                if minutes > MAX_PERIOD_MINUTES {
                    check_unused(body, PERIOD.mask())?;
                    return Err(TimeSpecError::FieldOutOfRange);
                }
                (TimeSpec::Period { minutes }, PERIOD.mask())
            }
            TAG_INCLUSIVE | TAG_EXCLUSIVE => {
                let low = RANGE_LOW.get(body) as u8;
                let high = RANGE_HIGH.get(body) as u8;
                check_unused(body, RANGE_LOW.mask() | RANGE_HIGH.mask())?;
                if low > HOUR_RANGE.0 || high > HOUR_RANGE.0 {
                    return Err(TimeSpecError::FieldOutOfRange);
                }
                let spec = if tag == TAG_INCLUSIVE {
                    TimeSpec::InclusiveHourRange { low, high }
                } else {
                    TimeSpec::ExclusiveHourRange { low, high }
                };
                (spec, RANGE_LOW.mask() | RANGE_HIGH.mask())
            }
            TAG_NONE => (TimeSpec::None, 0),
            reserved => return Err(TimeSpecError::ReservedVariant(reserved as u8)),
        };

        check_unused(body, used)?;
        Ok(spec)
    }

    /// Encode into the packed 32-bit form
    ///
    /// Fails if a field is outside its range, so only values that
    /// [`decode`](Self::decode) could have produced are encodable.
    pub fn encode(&self) -> Result<u32, TimeSpecError> {
        let (tag, body) = match *self {
            TimeSpec::Wildcard(pattern) => (TAG_WILDCARD, pattern.encode()?),
            TimeSpec::Period { minutes } => {
                if minutes > MAX_PERIOD_MINUTES {
                    return Err(TimeSpecError::FieldOutOfRange);
                }
                (TAG_PERIOD, PERIOD.put(minutes as u32))
            }
            TimeSpec::InclusiveHourRange { low, high } => (TAG_INCLUSIVE, encode_range(low, high)?),
            TimeSpec::ExclusiveHourRange { low, high } => (TAG_EXCLUSIVE, encode_range(low, high)?),
            TimeSpec::None => (TAG_NONE, 0),
        };
        Ok((tag << TAG_SHIFT) | body)
    }

    /// Whether the schedule fires at `now`
    pub fn matches(&self, now: &DateTime) -> bool {
        match *self {
            TimeSpec::Wildcard(pattern) => pattern.matches(now),
            TimeSpec::Period { minutes } => {
                minutes != 0 && now.minutes_since_midnight() % minutes == 0
            }
            TimeSpec::InclusiveHourRange { low, high } => low < now.hour && now.hour < high,
            TimeSpec::ExclusiveHourRange { low, high } => !(low < now.hour && now.hour < high),
            TimeSpec::None => false,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, TimeSpec::None)
    }
}

impl TryFrom<u32> for TimeSpec {
    type Error = TimeSpecError;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        TimeSpec::decode(raw)
    }
}

fn check_unused(body: u32, used: u32) -> Result<(), TimeSpecError> {
    if body & !used == 0 {
        Ok(())
    } else {
        Err(TimeSpecError::ReservedBitsSet)
    }
}

fn encode_range(low: u8, high: u8) -> Result<u32, TimeSpecError> {
    if low > HOUR_RANGE.0 || high > HOUR_RANGE.0 {
        return Err(TimeSpecError::FieldOutOfRange);
    }
    Ok(RANGE_LOW.put(low as u32) | RANGE_HIGH.put(high as u32))
}
