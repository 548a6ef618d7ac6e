//! Date objects.

use std::fmt;

/// A date time.
///
/// Serialized as a string object in the `D:YYYYMMDDHHmmSS` form with an
/// explicit UTC offset.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct DateTime {
    /// The year.
    pub year: u16,
    /// The month.
    pub month: u8,
    /// The day.
    pub day: u8,
    /// The hour.
    pub hour: u8,
    /// The minute.
    pub minute: u8,
    /// The second.
    pub second: u8,
    /// The offset in hours from UTC.
    pub utc_offset_hour: i8,
    /// The offset in minutes from UTC.
    pub utc_offset_minute: u8,
}

impl DateTime {
    /// Create a date at midnight UTC.
    pub fn new(year: u16, month: u8, day: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour: 0,
            minute: 0,
            second: 0,
            utc_offset_hour: 0,
            utc_offset_minute: 0,
        }
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "D:{:04}{:02}{:02}{:02}{:02}{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )?;

        if self.utc_offset_hour == 0 && self.utc_offset_minute == 0 {
            write!(f, "Z")
        } else {
            let sign = if self.utc_offset_hour < 0 { '-' } else { '+' };
            write!(
                f,
                "{sign}{:02}'{:02}'",
                self.utc_offset_hour.unsigned_abs(),
                self.utc_offset_minute
            )
        }
    }
}
