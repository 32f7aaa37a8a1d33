use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use std::cmp::Ordering;
use std::fmt;

use crate::engine::field_resolver::FieldValue;

/// A filter operand or target after type coercion
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Integer(i64),
    Float(f64),
    Timestamp(Timestamp),
    Text(String),
}

/// ISO-8601 timestamp. Offset-aware and naive values never compare with each other.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Timestamp {
    Aware(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

const AWARE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

impl Timestamp {
    /// Parse an ISO-8601 date or datetime. A trailing `Z` means UTC.
    ///
    /// The date must be zero-padded `YYYY-MM-DD`, optionally followed by `T` or
    /// a space and a two-digit hour. An hour without minutes means `HH:00`.
    pub fn parse(raw: &str) -> Option<Timestamp> {
        if !has_iso_shape(raw) {
            return None;
        }

        let mut normalized = match raw.strip_suffix('Z') {
            Some(stem) => format!("{}+00:00", stem),
            None => raw.to_string(),
        };
        if normalized.len() == 13 || normalized.as_bytes().get(13).is_some_and(|b| *b != b':') {
            normalized.insert_str(13, ":00");
        }

        for format in AWARE_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(&normalized, format) {
                return Some(Timestamp::Aware(dt));
            }
        }

        for format in NAIVE_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, format) {
                return Some(Timestamp::Naive(dt));
            }
        }

        NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(Timestamp::Naive)
    }

    fn compare(&self, other: &Timestamp) -> Option<Ordering> {
        match (self, other) {
            (Timestamp::Aware(a), Timestamp::Aware(b)) => Some(a.cmp(b)),
            (Timestamp::Naive(a), Timestamp::Naive(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// `YYYY-MM-DD`, or that followed by a separator and a two-digit hour
fn has_iso_shape(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    let digits = |range: std::ops::Range<usize>| bytes[range].iter().all(u8::is_ascii_digit);

    if bytes.len() < 10 || !digits(0..4) || bytes[4] != b'-' || !digits(5..7) || bytes[7] != b'-' || !digits(8..10) {
        return false;
    }
    if bytes.len() == 10 {
        return true;
    }

    matches!(bytes[10], b'T' | b' ') && bytes.len() >= 13 && digits(11..13)
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Aware(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.f%:z")),
            Timestamp::Naive(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.f")),
        }
    }
}

impl Scalar {
    /// Coerce a raw string: integer when it has no decimal point, float when
    /// it does, then ISO-8601 timestamp, else the literal text.
    pub fn coerce(raw: &str) -> Scalar {
        if raw.contains('.') {
            if let Ok(f) = raw.parse::<f64>() {
                return Scalar::Float(f);
            }
        } else if let Ok(i) = raw.parse::<i64>() {
            return Scalar::Integer(i);
        }

        if let Some(ts) = Timestamp::parse(raw) {
            return Scalar::Timestamp(ts);
        }

        Scalar::Text(raw.to_string())
    }

    /// Coerce a resolved field. Integers stay integers; text goes through `coerce`.
    pub fn from_field(value: FieldValue<'_>) -> Scalar {
        match value {
            FieldValue::Integer(i) => Scalar::Integer(i),
            FieldValue::Text(s) => Scalar::coerce(s),
        }
    }

    /// Integer, float and timestamp values support ordering
    pub fn is_ordered(&self) -> bool {
        !matches!(self, Scalar::Text(_))
    }

    /// Same variant, as required for range bounds
    pub fn same_kind(&self, other: &Scalar) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// Ordering between two ordered values. `None` when the pair is not comparable.
    pub fn compare(&self, other: &Scalar) -> Option<Ordering> {
        match (self, other) {
            (Scalar::Integer(a), Scalar::Integer(b)) => Some(a.cmp(b)),
            (Scalar::Integer(a), Scalar::Float(b)) => (*a as f64).partial_cmp(b),
            (Scalar::Float(a), Scalar::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Scalar::Float(a), Scalar::Float(b)) => a.partial_cmp(b),
            (Scalar::Timestamp(a), Scalar::Timestamp(b)) => a.compare(b),
            _ => None,
        }
    }

    /// Value equality. Mismatched kinds are unequal rather than an error.
    pub fn equals(&self, other: &Scalar) -> bool {
        match (self, other) {
            (Scalar::Text(a), Scalar::Text(b)) => a == b,
            _ => self.compare(other) == Some(Ordering::Equal),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Integer(i) => write!(f, "{}", i),
            Scalar::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 => {
                write!(f, "{:.1}", v)
            }
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::Timestamp(ts) => write!(f, "{}", ts),
            Scalar::Text(s) => write!(f, "{}", s),
        }
    }
}
