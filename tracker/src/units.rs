//! Time types used across the tracker.

use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use tle_types::prelude::{UtcTimestamp, MINUTES_PER_DAY, SECONDS_PER_DAY, UNIX_EPOCH_JD};

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// Absolute UTC instant
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Timestamp {
    utc: UtcTimestamp,
}

impl std::fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.utc)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.utc.format("%Y-%m-%d %H:%M:%S UTC"))
    }
}

impl Timestamp {
    pub fn now() -> Timestamp {
        Timestamp::from_utc(chrono::Utc::now())
    }

    pub fn from_utc(utc: UtcTimestamp) -> Timestamp {
        Timestamp { utc }
    }

    /// Parse an RFC 3339 timestamp, e.g. `2024-03-20T12:00:00Z`
    pub fn parse_rfc3339(s: &str) -> Result<Timestamp, chrono::ParseError> {
        Ok(Timestamp::from_utc(
            chrono::DateTime::parse_from_rfc3339(s)?.with_timezone(&chrono::Utc),
        ))
    }

    pub fn as_utc(&self) -> &UtcTimestamp {
        &self.utc
    }

    pub fn julian_date(&self) -> JulianDate {
        JulianDate::from_timestamp(self)
    }
}

impl Sub<Timestamp> for Timestamp {
    type Output = Time;

    fn sub(self, rhs: Timestamp) -> Self::Output {
        let nanos = (self.utc - rhs.utc).num_nanoseconds().unwrap_or(if self > rhs {
            i64::MAX
        } else {
            i64::MIN
        });
        Time::from_nanos(nanos)
    }
}

impl Add<Time> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Time) -> Self::Output {
        let mut ts = self;
        ts += rhs;
        ts
    }
}

impl AddAssign<Time> for Timestamp {
    fn add_assign(&mut self, rhs: Time) {
        // Saturates instead of panicking, the time offset is unbounded
        self.utc = self
            .utc
            .checked_add_signed(chrono::Duration::nanoseconds(rhs.as_nanos()))
            .unwrap_or(if rhs.as_nanos() > 0 {
                UtcTimestamp::MAX_UTC
            } else {
                UtcTimestamp::MIN_UTC
            });
    }
}

impl Sub<Time> for Timestamp {
    type Output = Timestamp;

    fn sub(self, rhs: Time) -> Self::Output {
        self + (-rhs)
    }
}

impl SubAssign<Time> for Timestamp {
    fn sub_assign(&mut self, rhs: Time) {
        *self += -rhs;
    }
}

/// Signed duration with nanosecond resolution.
///
/// Arithmetic is integer based, so `t + d - d == t` holds exactly.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct Time {
    nanos: i64,
}

impl std::fmt::Debug for Time {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} s", self.as_secs())
    }
}

/// Human readable, e.g. `+1h 30m` or `-10m`
impl std::fmt::Display for Time {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.nanos < 0 { "-" } else { "+" };
        let abs = std::time::Duration::from_nanos(self.nanos.unsigned_abs());
        write!(f, "{sign}{}", humantime::format_duration(abs))
    }
}

impl Time {
    pub const ZERO: Time = Time { nanos: 0 };

    pub fn from_std_duration(duration: std::time::Duration) -> Time {
        Time::from_nanos(i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX))
    }

    pub fn from_hours(hours: f64) -> Time {
        Self::from_minutes(hours * 60.0)
    }

    pub fn from_minutes(minutes: f64) -> Time {
        Self::from_secs(minutes * 60.0)
    }

    pub fn from_secs(seconds: f64) -> Time {
        Time {
            nanos: (seconds * NANOS_PER_SEC as f64).round() as i64,
        }
    }

    pub fn from_millis(millis: f64) -> Time {
        Self::from_secs(millis / 1000.0)
    }

    pub const fn from_nanos(nanos: i64) -> Time {
        Time { nanos }
    }

    pub fn as_secs(&self) -> f64 {
        self.nanos as f64 / NANOS_PER_SEC as f64
    }

    pub fn as_minutes(&self) -> f64 {
        self.as_secs() / 60.0
    }

    pub fn as_nanos(&self) -> i64 {
        self.nanos
    }

    /// Rounded to whole seconds, for display
    pub fn round_secs(&self) -> Time {
        Time::from_secs(self.as_secs().round())
    }

    pub fn is_positive(&self) -> bool {
        self.nanos > 0
    }
}

impl Neg for Time {
    type Output = Time;

    fn neg(self) -> Self::Output {
        Time {
            nanos: self.nanos.saturating_neg(),
        }
    }
}

impl Add<Time> for Time {
    type Output = Time;

    fn add(self, rhs: Time) -> Self::Output {
        Time::from_nanos(self.nanos.saturating_add(rhs.nanos))
    }
}

impl AddAssign<Time> for Time {
    fn add_assign(&mut self, rhs: Time) {
        *self = *self + rhs;
    }
}

impl Sub<Time> for Time {
    type Output = Time;

    fn sub(self, rhs: Time) -> Self::Output {
        Time::from_nanos(self.nanos.saturating_sub(rhs.nanos))
    }
}

impl SubAssign<Time> for Time {
    fn sub_assign(&mut self, rhs: Time) {
        *self = *self - rhs;
    }
}

impl Mul<i64> for Time {
    type Output = Time;

    fn mul(self, rhs: i64) -> Self::Output {
        Time::from_nanos(self.nanos.saturating_mul(rhs))
    }
}

/// Julian date split into the day number at the preceding midnight (ends in .5)
/// and the fraction of that day, the input convention of SGP4.
///
/// Keeping the parts apart preserves sub-millisecond resolution that a single
/// f64 near 2.4e6 would lose.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug)]
pub struct JulianDate {
    pub day: f64,
    pub fraction: f64,
}

impl JulianDate {
    pub fn from_timestamp(ts: &Timestamp) -> JulianDate {
        let utc = ts.as_utc();
        let secs = utc.timestamp();
        let days = secs.div_euclid(SECONDS_PER_DAY as i64);
        let second_of_day = secs.rem_euclid(SECONDS_PER_DAY as i64) as f64
            + f64::from(utc.timestamp_subsec_nanos()) * 1e-9;
        JulianDate {
            day: UNIX_EPOCH_JD + days as f64,
            fraction: second_of_day / SECONDS_PER_DAY,
        }
    }

    pub fn as_f64(&self) -> f64 {
        self.day + self.fraction
    }

    /// Days elapsed since `earlier`, computed part by part
    pub fn days_since(&self, earlier: &JulianDate) -> f64 {
        (self.day - earlier.day) + (self.fraction - earlier.fraction)
    }

    pub fn minutes_since(&self, earlier: &JulianDate) -> f64 {
        self.days_since(earlier) * MINUTES_PER_DAY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> Timestamp {
        Timestamp::from_utc(chrono::Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap())
    }

    #[test]
    fn julian_date_of_j2000() {
        // J2000.0 is 2000-01-01 12:00 (ignoring the TT/UTC offset)
        let jd = ts(2000, 1, 1, 12, 0, 0).julian_date();
        assert_eq!(jd.day, 2_451_544.5);
        assert_eq!(jd.fraction, 0.5);
        assert_eq!(jd.as_f64(), 2_451_545.0);
    }

    #[test]
    fn julian_date_before_unix_epoch() {
        let jd = ts(1969, 12, 31, 18, 0, 0).julian_date();
        assert_eq!(jd.day, 2_440_586.5);
        assert_relative_eq!(jd.fraction, 0.75);
    }

    #[test]
    fn julian_minutes_between() {
        let a = ts(2024, 3, 20, 23, 0, 0);
        let b = a + Time::from_minutes(90.0);
        assert_relative_eq!(
            b.julian_date().minutes_since(&a.julian_date()),
            90.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn time_arithmetic_is_exact() {
        let step = Time::from_minutes(1.0);
        let t = Time::from_secs(0.1);
        assert_eq!(t + step - step, t);
        assert_eq!(-(-step), step);
        assert_eq!(step * 3, Time::from_minutes(3.0));
    }

    #[test]
    fn timestamp_difference() {
        let a = ts(2024, 3, 20, 12, 0, 0);
        let b = ts(2024, 3, 20, 12, 10, 0);
        assert_eq!(b - a, Time::from_minutes(10.0));
        assert_eq!(a - b, Time::from_minutes(-10.0));
        assert_eq!(b - Time::from_minutes(10.0), a);
    }

    #[test]
    fn time_display() {
        assert_eq!(Time::from_minutes(-10.0).to_string(), "-10m");
        assert_eq!(Time::from_minutes(90.0).to_string(), "+1h 30m");
        assert_eq!(Time::ZERO.to_string(), "+0s");
        assert_eq!(Time::from_millis(61_400.0).round_secs().to_string(), "+1m 1s");
    }
}
