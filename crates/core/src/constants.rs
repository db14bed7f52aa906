//! Shared constants for the application

use std::time::Duration;

/// Wall-clock and focus stopwatch refresh interval
pub const CLOCK_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Klock progress bar sampling interval
pub const PROGRESS_SAMPLE_INTERVAL: Duration = Duration::from_millis(200);

/// Length of one flip-card fold/unfold animation
pub const FLIP_DURATION: Duration = Duration::from_millis(600);

/// How long the settings/focus buttons stay visible after the last click
pub const CONTROLS_HIDE_DELAY: Duration = Duration::from_secs(3);

/// Milliseconds in one minute, the klock progress bar's full cycle
pub const MILLIS_PER_MINUTE: f64 = 60_000.0;
