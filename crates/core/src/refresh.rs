//! Periodic refresh sources.
//!
//! - [`ClockTicker`]: samples the wall clock every second
//! - [`FocusStopwatch`]: counts focus-mode seconds, one increment per tick
//! - [`ProgressSampler`]: samples the position within the current minute
//!   every 200ms while klock mode is on
//!
//! Each source owns its [`TimerHandle`]. Stopping a source cancels the
//! handle synchronously, before any flag flips or derived value resets.

use chrono::Timelike;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::constants::{CLOCK_TICK_INTERVAL, MILLIS_PER_MINUTE, PROGRESS_SAMPLE_INTERVAL};
use crate::scheduler::{Scheduler, TimerHandle};
use crate::time_source::{millis_of_second, TimeSource};
use klock_types::ClockReading;

/// Fraction of the current minute that has elapsed, in [0, 1)
pub fn progress_fraction<T: Timelike>(time: &T) -> f64 {
    let millis = time.second().min(59) as f64 * 1000.0 + millis_of_second(time) as f64;
    millis / MILLIS_PER_MINUTE
}

type ReadingHandler = Rc<dyn Fn(ClockReading)>;

/// Samples the wall clock once per second and hands each reading on
pub struct ClockTicker {
    scheduler: Rc<dyn Scheduler>,
    time_source: Rc<dyn TimeSource>,
    source: RefCell<Option<TimerHandle>>,
}

impl ClockTicker {
    pub fn new(scheduler: Rc<dyn Scheduler>, time_source: Rc<dyn TimeSource>) -> Self {
        Self {
            scheduler,
            time_source,
            source: RefCell::new(None),
        }
    }

    /// Start ticking. The handler sees one reading immediately and then one
    /// per second. Restarting replaces the previous handler.
    pub fn start(&self, handler: impl Fn(ClockReading) + 'static) {
        self.stop();

        let handler: ReadingHandler = Rc::new(handler);
        handler(self.sample());

        let time_source = self.time_source.clone();
        let tick_handler = handler.clone();
        let handle = self.scheduler.every(
            CLOCK_TICK_INTERVAL,
            Box::new(move || {
                let reading = ClockReading::from_time(&time_source.now());
                log::trace!("Clock tick {:?}", reading);
                tick_handler(reading);
            }),
        );
        *self.source.borrow_mut() = Some(handle);
    }

    pub fn stop(&self) {
        if let Some(handle) = self.source.borrow_mut().take() {
            handle.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.source.borrow().is_some()
    }

    /// Read the wall clock now
    pub fn sample(&self) -> ClockReading {
        ClockReading::from_time(&self.time_source.now())
    }
}

impl Drop for ClockTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

type Listener<T> = RefCell<Option<Rc<dyn Fn(T)>>>;

struct StopwatchShared {
    elapsed: Cell<u64>,
    listener: Listener<u64>,
}

impl StopwatchShared {
    fn increment(&self) {
        let elapsed = self.elapsed.get() + 1;
        self.elapsed.set(elapsed);
        // Clone out before calling so the listener may touch the stopwatch
        let listener = self.listener.borrow().clone();
        if let Some(listener) = listener {
            listener(elapsed);
        }
    }
}

/// Focus-mode stopwatch.
///
/// Counts ticks rather than re-reading the clock: the elapsed value grows by
/// exactly one per 1s invocation.
pub struct FocusStopwatch {
    scheduler: Rc<dyn Scheduler>,
    shared: Rc<StopwatchShared>,
    source: RefCell<Option<TimerHandle>>,
}

impl FocusStopwatch {
    pub fn new(scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            scheduler,
            shared: Rc::new(StopwatchShared {
                elapsed: Cell::new(0),
                listener: RefCell::new(None),
            }),
            source: RefCell::new(None),
        }
    }

    /// Called with the new elapsed value after every increment
    pub fn set_listener(&self, listener: impl Fn(u64) + 'static) {
        *self.shared.listener.borrow_mut() = Some(Rc::new(listener));
    }

    /// Reset to zero and start counting. No-op while already active.
    pub fn start(&self) {
        if self.is_active() {
            return;
        }
        self.shared.elapsed.set(0);

        let weak: Weak<StopwatchShared> = Rc::downgrade(&self.shared);
        let handle = self.scheduler.every(
            CLOCK_TICK_INTERVAL,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.increment();
                }
            }),
        );
        *self.source.borrow_mut() = Some(handle);
        log::info!("Focus mode started");
    }

    /// Stop counting. The last elapsed value is kept until the next start.
    pub fn stop(&self) {
        let handle = self.source.borrow_mut().take();
        if let Some(handle) = handle {
            handle.cancel();
            log::info!("Focus mode stopped after {}s", self.shared.elapsed.get());
        }
    }

    /// Flip between active and inactive; returns the new state
    pub fn toggle(&self) -> bool {
        if self.is_active() {
            self.stop();
        } else {
            self.start();
        }
        self.is_active()
    }

    pub fn is_active(&self) -> bool {
        self.source.borrow().is_some()
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.shared.elapsed.get()
    }
}

impl Drop for FocusStopwatch {
    fn drop(&mut self) {
        self.stop();
    }
}

struct SamplerShared {
    time_source: Rc<dyn TimeSource>,
    fraction: Cell<f64>,
    listener: Listener<f64>,
}

impl SamplerShared {
    fn publish(&self, fraction: f64) {
        self.fraction.set(fraction);
        let listener = self.listener.borrow().clone();
        if let Some(listener) = listener {
            listener(fraction);
        }
    }

    fn sample(&self) {
        self.publish(progress_fraction(&self.time_source.now()));
    }
}

/// Klock-mode progress through the current minute
pub struct ProgressSampler {
    scheduler: Rc<dyn Scheduler>,
    shared: Rc<SamplerShared>,
    enabled: Cell<bool>,
    source: RefCell<Option<TimerHandle>>,
}

impl ProgressSampler {
    pub fn new(scheduler: Rc<dyn Scheduler>, time_source: Rc<dyn TimeSource>) -> Self {
        Self {
            scheduler,
            shared: Rc::new(SamplerShared {
                time_source,
                fraction: Cell::new(0.0),
                listener: RefCell::new(None),
            }),
            enabled: Cell::new(false),
            source: RefCell::new(None),
        }
    }

    /// Called with every new fraction, including the reset to 0
    pub fn set_listener(&self, listener: impl Fn(f64) + 'static) {
        *self.shared.listener.borrow_mut() = Some(Rc::new(listener));
    }

    /// Turn sampling on or off.
    ///
    /// Enabling samples once immediately, then every 200ms. Disabling cancels
    /// the pending sample, clears the flag, then resets the fraction to
    /// exactly 0 whatever it was.
    pub fn set_enabled(&self, enabled: bool) {
        if enabled {
            if self.enabled.get() {
                return;
            }
            self.enabled.set(true);
            self.shared.sample();

            let weak: Weak<SamplerShared> = Rc::downgrade(&self.shared);
            let handle = self.scheduler.every(
                PROGRESS_SAMPLE_INTERVAL,
                Box::new(move || {
                    if let Some(shared) = weak.upgrade() {
                        shared.sample();
                    }
                }),
            );
            *self.source.borrow_mut() = Some(handle);
        } else {
            let handle = self.source.borrow_mut().take();
            if let Some(handle) = handle {
                handle.cancel();
            }
            self.enabled.set(false);
            self.shared.publish(0.0);
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    pub fn fraction(&self) -> f64 {
        self.shared.fraction.get()
    }
}

impl Drop for ProgressSampler {
    fn drop(&mut self) {
        if let Some(handle) = self.source.get_mut().take() {
            handle.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::VirtualScheduler;
    use crate::time_source::FixedTimeSource;
    use chrono::NaiveTime;
    use std::time::Duration;

    fn setup() -> (VirtualScheduler, Rc<dyn Scheduler>) {
        let sched = VirtualScheduler::new();
        let dyn_sched: Rc<dyn Scheduler> = Rc::new(sched.clone());
        (sched, dyn_sched)
    }

    #[test]
    fn test_progress_fraction_half_minute() {
        let t = NaiveTime::from_hms_milli_opt(9, 41, 30, 500).unwrap();
        let fraction = progress_fraction(&t);
        assert!((fraction - 30_500.0 / 60_000.0).abs() < 1e-12);
        assert!((fraction - 0.5083).abs() < 1e-4);
    }

    #[test]
    fn test_progress_fraction_bounds() {
        let start = NaiveTime::from_hms_milli_opt(0, 0, 0, 0).unwrap();
        assert_eq!(progress_fraction(&start), 0.0);
        let end = NaiveTime::from_hms_milli_opt(0, 0, 59, 999).unwrap();
        assert!(progress_fraction(&end) < 1.0);
    }

    #[test]
    fn test_ticker_samples_immediately_then_every_second() {
        let (sched, s) = setup();
        let clock = Rc::new(FixedTimeSource::at(12, 0, 0, 0));
        let ticker = ClockTicker::new(s, clock.clone());

        let readings = Rc::new(RefCell::new(Vec::new()));
        let r = readings.clone();
        ticker.start(move |reading| r.borrow_mut().push(reading));
        assert_eq!(readings.borrow().len(), 1);

        clock.set(NaiveTime::from_hms_opt(12, 0, 1).unwrap());
        sched.advance(Duration::from_secs(1));
        assert_eq!(
            readings.borrow().last().copied(),
            Some(ClockReading::new(12, 0, 1))
        );

        ticker.stop();
        sched.advance(Duration::from_secs(5));
        assert_eq!(readings.borrow().len(), 2);
        assert!(!ticker.is_running());
    }

    #[test]
    fn test_focus_scenario_3661_ticks() {
        let (sched, s) = setup();
        let stopwatch = FocusStopwatch::new(s);
        stopwatch.start();
        assert_eq!(stopwatch.elapsed_seconds(), 0);

        sched.advance(Duration::from_secs(3661));
        assert_eq!(stopwatch.elapsed_seconds(), 3661);
        assert_eq!(
            crate::format::format_time(
                crate::format::TimeValue::Elapsed(stopwatch.elapsed_seconds()),
                klock_types::DisplayMode::FlipFull,
                false
            ),
            "01:01:01"
        );
    }

    #[test]
    fn test_focus_stop_keeps_value_and_restart_resets() {
        let (sched, s) = setup();
        let stopwatch = FocusStopwatch::new(s);
        let seen = Rc::new(Cell::new(0));
        let seen_in = seen.clone();
        stopwatch.set_listener(move |elapsed| seen_in.set(elapsed));

        assert!(stopwatch.toggle());
        sched.advance(Duration::from_secs(5));
        assert!(!stopwatch.toggle());
        assert_eq!(stopwatch.elapsed_seconds(), 5);
        assert_eq!(seen.get(), 5);
        assert_eq!(sched.pending_count(), 0);

        sched.advance(Duration::from_secs(5));
        assert_eq!(stopwatch.elapsed_seconds(), 5);

        stopwatch.start();
        assert_eq!(stopwatch.elapsed_seconds(), 0);
        sched.advance(Duration::from_secs(2));
        assert_eq!(stopwatch.elapsed_seconds(), 2);
    }

    #[test]
    fn test_progress_sampler_enable_samples_immediately() {
        let (sched, s) = setup();
        let clock = Rc::new(FixedTimeSource::at(8, 15, 30, 500));
        let sampler = ProgressSampler::new(s, clock.clone());

        sampler.set_enabled(true);
        assert!((sampler.fraction() - 0.5083).abs() < 1e-4);

        clock.advance(chrono::Duration::milliseconds(200));
        sched.advance(Duration::from_millis(200));
        assert!((sampler.fraction() - 30_700.0 / 60_000.0).abs() < 1e-12);
    }

    #[test]
    fn test_progress_sampler_disable_resets_to_zero() {
        let (sched, s) = setup();
        let clock = Rc::new(FixedTimeSource::at(8, 15, 45, 0));
        let sampler = ProgressSampler::new(s, clock);
        let last = Rc::new(Cell::new(-1.0));
        let l = last.clone();
        sampler.set_listener(move |fraction| l.set(fraction));

        sampler.set_enabled(true);
        assert!(sampler.fraction() > 0.7);

        sampler.set_enabled(false);
        assert_eq!(sampler.fraction(), 0.0);
        assert_eq!(last.get(), 0.0);
        assert!(!sampler.is_enabled());
        assert_eq!(sched.pending_count(), 0);

        // Nothing left to fire
        sched.advance(Duration::from_secs(1));
        assert_eq!(sampler.fraction(), 0.0);
    }

    #[test]
    fn test_progress_sampler_disable_when_never_enabled() {
        let (_sched, s) = setup();
        let sampler = ProgressSampler::new(s, Rc::new(FixedTimeSource::at(0, 0, 10, 0)));
        sampler.set_enabled(false);
        assert_eq!(sampler.fraction(), 0.0);
    }

    #[test]
    fn test_dropping_sources_cancels_work() {
        let (sched, s) = setup();
        let clock: Rc<dyn TimeSource> = Rc::new(FixedTimeSource::at(1, 2, 3, 0));
        {
            let ticker = ClockTicker::new(s.clone(), clock.clone());
            ticker.start(|_| {});
            let stopwatch = FocusStopwatch::new(s.clone());
            stopwatch.start();
            let sampler = ProgressSampler::new(s.clone(), clock.clone());
            sampler.set_enabled(true);
            assert_eq!(sched.pending_count(), 3);
        }
        assert_eq!(sched.pending_count(), 0);
    }
}
