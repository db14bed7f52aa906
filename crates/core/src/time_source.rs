//! Wall-clock time sources

use chrono::{Local, NaiveTime, Timelike};
use std::cell::Cell;

/// Something that can tell the local time of day
pub trait TimeSource {
    fn now(&self) -> NaiveTime;
}

/// The system clock in the local timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTimeSource;

impl TimeSource for LocalTimeSource {
    fn now(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// A settable clock for tests and previews
#[derive(Debug)]
pub struct FixedTimeSource {
    time: Cell<NaiveTime>,
}

impl FixedTimeSource {
    pub fn new(time: NaiveTime) -> Self {
        Self {
            time: Cell::new(time),
        }
    }

    /// Convenience constructor; out-of-range values fall back to midnight
    pub fn at(hour: u32, minute: u32, second: u32, milli: u32) -> Self {
        Self::new(NaiveTime::from_hms_milli_opt(hour, minute, second, milli).unwrap_or(NaiveTime::MIN))
    }

    pub fn set(&self, time: NaiveTime) {
        self.time.set(time);
    }

    /// Move the clock forward, wrapping at midnight
    pub fn advance(&self, by: chrono::Duration) {
        let (next, _) = self.time.get().overflowing_add_signed(by);
        self.time.set(next);
    }
}

impl TimeSource for FixedTimeSource {
    fn now(&self) -> NaiveTime {
        self.time.get()
    }
}

/// Milliseconds within the current second, folding a leap second into 999
pub fn millis_of_second<T: Timelike>(time: &T) -> u32 {
    (time.nanosecond() / 1_000_000).min(999)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_time_source_advance_wraps() {
        let source = FixedTimeSource::at(23, 59, 59, 500);
        source.advance(chrono::Duration::milliseconds(600));
        assert_eq!(source.now(), NaiveTime::from_hms_milli_opt(0, 0, 0, 100).unwrap());
    }

    #[test]
    fn test_millis_of_second() {
        let t = NaiveTime::from_hms_milli_opt(10, 0, 30, 500).unwrap();
        assert_eq!(millis_of_second(&t), 500);
        // Leap second representation
        let leap = NaiveTime::from_hms_milli_opt(23, 59, 59, 1_500).unwrap();
        assert_eq!(millis_of_second(&leap), 999);
    }
}
