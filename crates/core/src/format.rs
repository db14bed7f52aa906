//! Clock face text formatting

use klock_types::{ClockReading, DisplayMode};

/// What the face is showing: the time of day or the focus stopwatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeValue {
    Wall(ClockReading),
    /// Whole seconds since focus mode started
    Elapsed(u64),
}

impl TimeValue {
    pub fn reading(&self) -> ClockReading {
        match self {
            TimeValue::Wall(reading) => *reading,
            TimeValue::Elapsed(total) => ClockReading::from_elapsed_seconds(*total),
        }
    }
}

/// Zero-pad to two digits; wider values are printed in full
pub fn pad2<N: std::fmt::Display>(n: N) -> String {
    format!("{:0>2}", n)
}

/// `HH:MM:SS`, or `HH:MM` when seconds are hidden
pub fn format_reading(reading: &ClockReading, show_seconds: bool) -> String {
    if show_seconds {
        format!(
            "{}:{}:{}",
            pad2(reading.hours),
            pad2(reading.minutes),
            pad2(reading.seconds)
        )
    } else {
        format!("{}:{}", pad2(reading.hours), pad2(reading.minutes))
    }
}

/// Format a time value for the given face.
///
/// Wall time stays on the 24-hour clock. The seconds group follows
/// [`DisplayMode::shows_seconds`], identically for wall and stopwatch time.
pub fn format_time(value: TimeValue, mode: DisplayMode, klock_mode: bool) -> String {
    format_reading(&value.reading(), mode.shows_seconds(klock_mode))
}
