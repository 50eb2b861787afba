//! The attribute layout table: how each [AttributeType] is laid out in a
//! row.
//!
//! ```text
//! Double   : 8 bytes, IEEE-754 binary64, little-endian
//! DateTime : 8 bytes, i64 little-endian, 100ns ticks since 0001-01-01T00:00:00Z
//! String   : `string_width` bytes, UTF-8, right-padded with 0x00
//! ```
//!
//! Every layout is fixed width, which is what lets a row be addressed
//! positionally without scanning.

use std::fmt::{Debug, Formatter};

use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};

use crate::{
    codec::value::{AttributeType, Value},
    constants::{
        DATETIME_WIDTH, DEFAULT_STRING_WIDTH, DOUBLE_WIDTH, MAX_TICKS, NANOS_PER_SECOND,
        NANOS_PER_TICK, TICKS_PER_SECOND, UNIX_EPOCH_TICKS,
    },
    error::{CodecError, CodecResult},
};

/// The table used when no other is configured. Read-only for the lifetime of
/// the process.
pub static DEFAULT_LAYOUT: LayoutTable = LayoutTable::new(DEFAULT_STRING_WIDTH);

type DecodeFn = fn(&[u8]) -> CodecResult<Value>;
type EncodeFn = fn(&Value, &mut [u8]) -> CodecResult<()>;

/// The fixed width and serialization functions of one attribute type.
#[derive(Clone, Copy)]
pub struct AttributeLayout {
    pub attribute_type: AttributeType,
    pub width: usize,
    decode: DecodeFn,
    encode: EncodeFn,
}

impl AttributeLayout {
    /// Decode a value from a slot of exactly `width` bytes.
    #[inline]
    pub fn decode(&self, slot: &[u8]) -> CodecResult<Value> {
        (self.decode)(slot)
    }

    /// Encode a value in to a slot of exactly `width` bytes.
    #[inline]
    pub fn encode(&self, value: &Value, slot: &mut [u8]) -> CodecResult<()> {
        (self.encode)(value, slot)
    }
}

impl Debug for AttributeLayout {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeLayout")
            .field("attribute_type", &self.attribute_type)
            .field("width", &self.width)
            .finish()
    }
}

/// Maps attribute types to their [AttributeLayout]. The only tunable is the
/// width of a `String` slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutTable {
    string_width: usize,
}

impl Default for LayoutTable {
    fn default() -> Self {
        DEFAULT_LAYOUT
    }
}

impl LayoutTable {
    /// Create a table with `String` slots of `string_width` bytes.
    ///
    /// # Panics
    ///
    /// If `string_width` is zero. See [LayoutTable::try_new] for a width
    /// which isn't known to be valid.
    pub const fn new(string_width: usize) -> Self {
        assert!(string_width > 0, "string slots must be at least one byte");
        Self { string_width }
    }

    /// Like [LayoutTable::new], failing with
    /// [EmptyStringSlot](CodecError::EmptyStringSlot) on a zero width.
    pub const fn try_new(string_width: usize) -> CodecResult<Self> {
        if string_width == 0 {
            return Err(CodecError::EmptyStringSlot);
        }
        Ok(Self { string_width })
    }

    pub fn string_width(&self) -> usize {
        self.string_width
    }

    pub fn layout(&self, attribute_type: AttributeType) -> AttributeLayout {
        match attribute_type {
            AttributeType::String => AttributeLayout {
                attribute_type,
                width: self.string_width,
                decode: decode_string,
                encode: encode_string,
            },
            AttributeType::Double => AttributeLayout {
                attribute_type,
                width: DOUBLE_WIDTH,
                decode: decode_double,
                encode: encode_double,
            },
            AttributeType::DateTime => AttributeLayout {
                attribute_type,
                width: DATETIME_WIDTH,
                decode: decode_datetime,
                encode: encode_datetime,
            },
        }
    }

    pub fn width(&self, attribute_type: AttributeType) -> usize {
        self.layout(attribute_type).width
    }

    /// The width of a type given by its wire name.
    pub fn width_of(&self, type_name: &str) -> CodecResult<usize> {
        Ok(self.width(type_name.parse()?))
    }

    /// Decode a single value. `bytes` must be exactly one slot wide.
    pub fn decode(&self, attribute_type: AttributeType, bytes: &[u8]) -> CodecResult<Value> {
        let layout = self.layout(attribute_type);
        if bytes.len() != layout.width {
            return Err(CodecError::Malformed {
                attribute_type,
                detail: format!("expected {} bytes, found {}", layout.width, bytes.len()),
            });
        }
        layout.decode(bytes)
    }

    /// Encode a single value in to a new slot.
    pub fn encode(&self, attribute_type: AttributeType, value: &Value) -> CodecResult<Bytes> {
        let layout = self.layout(attribute_type);
        let mut slot = vec![0u8; layout.width];
        layout.encode(value, &mut slot)?;
        Ok(slot.into())
    }
}

fn mismatch(expected: AttributeType, value: &Value) -> CodecError {
    CodecError::TypeMismatch {
        expected,
        found: value.attribute_type(),
    }
}

fn decode_string(slot: &[u8]) -> CodecResult<Value> {
    let end = slot.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
    // only trailing padding may be NUL
    if let Some(i) = slot[..end].iter().position(|b| *b == 0) {
        return Err(CodecError::Malformed {
            attribute_type: AttributeType::String,
            detail: format!("NUL at byte {} before end of string", i),
        });
    }
    std::str::from_utf8(&slot[..end])
        .map(|s| Value::String(s.to_string()))
        .map_err(|e| CodecError::Malformed {
            attribute_type: AttributeType::String,
            detail: e.to_string(),
        })
}

fn encode_string(value: &Value, slot: &mut [u8]) -> CodecResult<()> {
    let Value::String(s) = value else {
        return Err(mismatch(AttributeType::String, value));
    };
    // padding is stripped on decode, so a NUL would not survive
    if s.contains('\0') {
        return Err(CodecError::EncodingOverflow {
            attribute_type: AttributeType::String,
            detail: "string contains NUL".to_string(),
        });
    }
    let bytes = s.as_bytes();
    if bytes.len() > slot.len() {
        return Err(CodecError::EncodingOverflow {
            attribute_type: AttributeType::String,
            detail: format!("{} bytes exceeds slot of {}", bytes.len(), slot.len()),
        });
    }
    let (head, tail) = slot.split_at_mut(bytes.len());
    head.copy_from_slice(bytes);
    tail.fill(0);
    Ok(())
}

fn fixed<const N: usize>(attribute_type: AttributeType, slot: &[u8]) -> CodecResult<[u8; N]> {
    slot.try_into().map_err(|_| CodecError::Malformed {
        attribute_type,
        detail: format!("expected {} bytes, found {}", N, slot.len()),
    })
}

fn put_fixed<const N: usize>(
    attribute_type: AttributeType,
    slot: &mut [u8],
    bytes: [u8; N],
) -> CodecResult<()> {
    if slot.len() != N {
        return Err(CodecError::EncodingOverflow {
            attribute_type,
            detail: format!("expected a slot of {} bytes, found {}", N, slot.len()),
        });
    }
    slot.copy_from_slice(&bytes);
    Ok(())
}

fn decode_double(slot: &[u8]) -> CodecResult<Value> {
    let raw = fixed::<DOUBLE_WIDTH>(AttributeType::Double, slot)?;
    Ok(Value::Double(f64::from_le_bytes(raw)))
}

fn encode_double(value: &Value, slot: &mut [u8]) -> CodecResult<()> {
    let Value::Double(v) = value else {
        return Err(mismatch(AttributeType::Double, value));
    };
    put_fixed(AttributeType::Double, slot, v.to_le_bytes())
}

fn decode_datetime(slot: &[u8]) -> CodecResult<Value> {
    let ticks = i64::from_le_bytes(fixed::<DATETIME_WIDTH>(AttributeType::DateTime, slot)?);
    datetime_from_ticks(ticks).map(Value::DateTime)
}

fn encode_datetime(value: &Value, slot: &mut [u8]) -> CodecResult<()> {
    let Value::DateTime(dt) = value else {
        return Err(mismatch(AttributeType::DateTime, value));
    };
    put_fixed(
        AttributeType::DateTime,
        slot,
        ticks_from_datetime(dt)?.to_le_bytes(),
    )
}

/// Convert a tick count to a timestamp. Fails for ticks outside
/// `0..=MAX_TICKS`.
pub fn datetime_from_ticks(ticks: i64) -> CodecResult<DateTime<Utc>> {
    let out_of_range = || CodecError::Malformed {
        attribute_type: AttributeType::DateTime,
        detail: format!("tick count {} out of range", ticks),
    };
    if !(0..=MAX_TICKS).contains(&ticks) {
        return Err(out_of_range());
    }
    let unix = ticks - UNIX_EPOCH_TICKS;
    let secs = unix.div_euclid(TICKS_PER_SECOND);
    // < 10^9, fits a u32
    let nanos = (unix.rem_euclid(TICKS_PER_SECOND) * NANOS_PER_TICK) as u32;
    Utc.timestamp_opt(secs, nanos).single().ok_or_else(out_of_range)
}

/// Convert a timestamp to a tick count, truncating anything finer than a
/// tick. Leap seconds have no tick count and are rejected.
pub fn ticks_from_datetime(dt: &DateTime<Utc>) -> CodecResult<i64> {
    let overflow = || CodecError::EncodingOverflow {
        attribute_type: AttributeType::DateTime,
        detail: format!("{} is outside 0001-01-01..=9999-12-31", dt),
    };
    let subsec_nanos = dt.timestamp_subsec_nanos();
    if subsec_nanos >= NANOS_PER_SECOND {
        return Err(CodecError::EncodingOverflow {
            attribute_type: AttributeType::DateTime,
            detail: format!("{} is a leap second", dt),
        });
    }
    let sub_ticks = i64::from(subsec_nanos) / NANOS_PER_TICK;
    let ticks = dt
        .timestamp()
        .checked_mul(TICKS_PER_SECOND)
        .and_then(|t| t.checked_add(sub_ticks))
        .and_then(|t| t.checked_add(UNIX_EPOCH_TICKS))
        .ok_or_else(overflow)?;
    if !(0..=MAX_TICKS).contains(&ticks) {
        return Err(overflow());
    }
    Ok(ticks)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};

    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.from_utc_datetime(
            &NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, min, s)
                .unwrap(),
        )
    }

    #[test]
    fn widths() {
        let table = LayoutTable::default();
        assert_eq!(table.width_of("Double").unwrap(), 8);
        assert_eq!(table.width_of("DateTime").unwrap(), 8);
        assert_eq!(table.width_of("String").unwrap(), DEFAULT_STRING_WIDTH);
        assert_eq!(LayoutTable::new(12).width_of("String").unwrap(), 12);
        assert_eq!(
            table.width_of("Decimal"),
            Err(CodecError::UnsupportedType("Decimal".into()))
        );
    }

    #[test]
    fn double_bytes() {
        let bytes = DEFAULT_LAYOUT
            .encode(AttributeType::Double, &Value::Double(9.0))
            .unwrap();
        assert_eq!(bytes.as_ref(), &9.0f64.to_le_bytes());
        for v in [0.0, -0.0, 1.5e-300, f64::MAX, f64::MIN_POSITIVE, f64::INFINITY] {
            let bytes = DEFAULT_LAYOUT
                .encode(AttributeType::Double, &Value::Double(v))
                .unwrap();
            assert_eq!(
                DEFAULT_LAYOUT.decode(AttributeType::Double, &bytes).unwrap(),
                Value::Double(v)
            );
        }
    }

    #[test]
    fn datetime_epochs() {
        assert_eq!(datetime_from_ticks(0).unwrap(), utc(1, 1, 1, 0, 0, 0));
        assert_eq!(
            datetime_from_ticks(UNIX_EPOCH_TICKS).unwrap(),
            utc(1970, 1, 1, 0, 0, 0)
        );
        assert_eq!(
            datetime_from_ticks(MAX_TICKS).unwrap(),
            utc(9999, 12, 31, 23, 59, 59) + Duration::nanoseconds(999_999_900)
        );
        assert!(datetime_from_ticks(-1).is_err());
        assert!(datetime_from_ticks(MAX_TICKS + 1).is_err());
    }

    #[test]
    fn datetime_round_trip() {
        let t0 = utc(2021, 6, 30, 12, 34, 56) + Duration::nanoseconds(123_456_700);
        let bytes = DEFAULT_LAYOUT
            .encode(AttributeType::DateTime, &Value::DateTime(t0))
            .unwrap();
        assert_eq!(bytes.len(), 8);
        assert_eq!(
            DEFAULT_LAYOUT
                .decode(AttributeType::DateTime, &bytes)
                .unwrap(),
            Value::DateTime(t0)
        );
    }

    #[test]
    fn datetime_truncates_to_ticks() {
        let t0 = utc(2021, 6, 30, 12, 0, 0);
        let fine = t0 + Duration::nanoseconds(199);
        let tick = t0 + Duration::nanoseconds(100);
        assert_eq!(ticks_from_datetime(&fine), ticks_from_datetime(&tick));
    }

    #[test]
    fn datetime_out_of_range() {
        let early = utc(1, 1, 1, 0, 0, 0) - Duration::seconds(1);
        assert!(matches!(
            ticks_from_datetime(&early),
            Err(CodecError::EncodingOverflow { .. })
        ));
        let late = utc(10000, 1, 1, 0, 0, 0);
        assert!(matches!(
            ticks_from_datetime(&late),
            Err(CodecError::EncodingOverflow { .. })
        ));
    }

    #[test]
    fn datetime_leap_second() {
        let leap = Utc.from_utc_datetime(
            &NaiveDate::from_ymd_opt(2016, 12, 31)
                .unwrap()
                .and_hms_milli_opt(23, 59, 59, 1_500)
                .unwrap(),
        );
        assert_eq!(leap.timestamp_subsec_nanos(), 1_500_000_000);
        assert!(matches!(
            ticks_from_datetime(&leap),
            Err(CodecError::EncodingOverflow { .. })
        ));
        assert!(DEFAULT_LAYOUT
            .encode(AttributeType::DateTime, &Value::DateTime(leap))
            .is_err());

        // the last representable instant before it still round trips
        let before = utc(2016, 12, 31, 23, 59, 59) + Duration::nanoseconds(999_999_900);
        let ticks = ticks_from_datetime(&before).unwrap();
        assert_eq!(datetime_from_ticks(ticks).unwrap(), before);
    }

    #[test]
    fn layout_widths() {
        assert_eq!(LayoutTable::try_new(3).unwrap().string_width(), 3);
        assert_eq!(
            LayoutTable::try_new(0).unwrap_err(),
            CodecError::EmptyStringSlot
        );
    }

    #[test]
    #[should_panic(expected = "at least one byte")]
    fn zero_width_panics() {
        LayoutTable::new(0);
    }

    #[test]
    fn string_padding() {
        let table = LayoutTable::new(8);
        let bytes = table
            .encode(AttributeType::String, &Value::String("abc".into()))
            .unwrap();
        assert_eq!(bytes.as_ref(), b"abc\0\0\0\0\0");
        assert_eq!(
            table.decode(AttributeType::String, &bytes).unwrap(),
            Value::String("abc".into())
        );
        // exactly full and empty slots
        for s in ["abcdefgh", "", "ñé"] {
            let bytes = table
                .encode(AttributeType::String, &Value::String(s.into()))
                .unwrap();
            assert_eq!(
                table.decode(AttributeType::String, &bytes).unwrap(),
                Value::String(s.into())
            );
        }
    }

    #[test]
    fn string_rejected() {
        let table = LayoutTable::new(4);
        assert!(matches!(
            table.encode(AttributeType::String, &Value::String("abcde".into())),
            Err(CodecError::EncodingOverflow { .. })
        ));
        assert!(matches!(
            table.encode(AttributeType::String, &Value::String("a\0".into())),
            Err(CodecError::EncodingOverflow { .. })
        ));
        assert!(matches!(
            table.decode(AttributeType::String, &[0xff, 0xfe, 0, 0]),
            Err(CodecError::Malformed { .. })
        ));
        // interior NUL could never have been encoded
        assert!(matches!(
            LayoutTable::new(5).decode(AttributeType::String, b"a\0b\0\0"),
            Err(CodecError::Malformed { .. })
        ));
    }

    #[test]
    fn wrong_value_type() {
        assert_eq!(
            DEFAULT_LAYOUT.encode(AttributeType::Double, &Value::String("1".into())),
            Err(CodecError::TypeMismatch {
                expected: AttributeType::Double,
                found: AttributeType::String,
            })
        );
    }

    #[test]
    fn wrong_slot_width() {
        assert!(matches!(
            DEFAULT_LAYOUT.decode(AttributeType::Double, &[0u8; 7]),
            Err(CodecError::Malformed { .. })
        ));
    }
}
