//! A single sampled clock value

use chrono::Timelike;
use serde::{Deserialize, Serialize};

/// Hours, minutes and seconds sampled from the wall clock or a stopwatch.
///
/// Produced once per refresh tick and discarded after formatting. Wall-clock
/// readings keep 24-hour time; stopwatch readings may exceed 23 hours.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct ClockReading {
    pub hours: u64,
    pub minutes: u32,
    pub seconds: u32,
}

impl ClockReading {
    pub fn new(hours: u64, minutes: u32, seconds: u32) -> Self {
        Self {
            hours,
            minutes,
            seconds,
        }
    }

    /// Split a stopwatch count into hours, minutes and seconds
    pub fn from_elapsed_seconds(total: u64) -> Self {
        Self {
            hours: total / 3600,
            minutes: ((total % 3600) / 60) as u32,
            seconds: (total % 60) as u32,
        }
    }

    /// Wall-clock reading from any chrono time value (sub-second part dropped)
    pub fn from_time<T: Timelike>(time: &T) -> Self {
        Self {
            hours: time.hour() as u64,
            minutes: time.minute(),
            seconds: time.second(),
        }
    }

    pub fn total_seconds(&self) -> u64 {
        self.hours * 3600 + self.minutes as u64 * 60 + self.seconds as u64
    }
}
