use std::mem::size_of;

/// Byte width of a `Double` attribute (IEEE-754 binary64, little-endian).
pub const DOUBLE_WIDTH: usize = size_of::<f64>();

/// Byte width of a `DateTime` attribute (signed tick count, little-endian).
pub const DATETIME_WIDTH: usize = size_of::<i64>();

/// Slot width used for `String` attributes unless a
/// [LayoutTable](crate::codec::LayoutTable) is built with another one.
pub const DEFAULT_STRING_WIDTH: usize = 64;

pub const NANOS_PER_SECOND: u32 = 1_000_000_000;

/// One tick is 100 nano-seconds.
pub const NANOS_PER_TICK: i64 = 100;
pub const TICKS_PER_SECOND: i64 = NANOS_PER_SECOND as i64 / NANOS_PER_TICK;

/// Ticks between 0001-01-01T00:00:00Z (tick zero) and the unix epoch.
pub const UNIX_EPOCH_TICKS: i64 = 621_355_968_000_000_000;

/// The last representable tick: 9999-12-31T23:59:59.9999999Z.
pub const MAX_TICKS: i64 = 3_155_378_975_999_999_999;
