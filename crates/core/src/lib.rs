//! klock-core: Clock logic for the klock desk clock.
//!
//! This crate holds everything that decides *what* the clock shows and
//! *when* it changes, with no GTK dependency:
//! - time formatting for the plain and flip faces
//! - the per-digit flip-card state machine
//! - cancellable periodic and one-shot scheduling, with a simulated-time
//!   scheduler for tests
//! - the wall-clock ticker, focus stopwatch and klock progress sampler
//! - pointer-drag position transforms

pub mod constants;
pub mod drag;
pub mod face;
pub mod flip_cell;
pub mod format;
pub mod refresh;
pub mod scheduler;
pub mod time_source;

pub use constants::{
    CLOCK_TICK_INTERVAL, CONTROLS_HIDE_DELAY, FLIP_DURATION,
    PROGRESS_SAMPLE_INTERVAL,
};
pub use drag::{drag_clock_position, drag_panel_position, DragSession, Point, Size};
pub use face::{ClockFace, FaceInput};
pub use flip_cell::{DigitCellState, FlipCell, FlipCellSnapshot, FlipRow, FlipSlot};
pub use format::{format_reading, format_time, pad2, TimeValue};
pub use refresh::{progress_fraction, ClockTicker, FocusStopwatch, ProgressSampler};
pub use scheduler::{Scheduler, TimerHandle, VirtualScheduler};
pub use time_source::{FixedTimeSource, LocalTimeSource, TimeSource};

// Re-export the data types used in this crate's signatures
pub use klock_types::{ClockReading, DisplayMode, Theme};
