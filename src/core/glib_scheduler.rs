//! Scheduler backed by glib main-loop timeouts

use gtk4::glib;
use klock_core::{Scheduler, TimerHandle};
use std::time::{Duration, Instant};

/// Runs deferred actions on the GTK main context.
///
/// Must be used from the main thread; the sources are `_local` and their
/// closures are not `Send`.
#[derive(Debug, Default, Clone, Copy)]
pub struct GlibScheduler;

impl GlibScheduler {
    pub fn new() -> Self {
        Self
    }
}

impl Scheduler for GlibScheduler {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn after(&self, delay: Duration, action: Box<dyn FnOnce()>) -> TimerHandle {
        let armed = TimerHandle::arm();
        let guarded = TimerHandle::guard_once(&armed, action);
        let source_id = glib::timeout_add_local_once(delay, guarded);
        TimerHandle::new(armed, move || source_id.remove())
    }

    fn every(&self, interval: Duration, action: Box<dyn FnMut()>) -> TimerHandle {
        let armed = TimerHandle::arm();
        let mut guarded = TimerHandle::guard_repeating(&armed, action);
        let source_id = glib::timeout_add_local(interval, move || {
            if guarded() {
                glib::ControlFlow::Continue
            } else {
                glib::ControlFlow::Break
            }
        });
        TimerHandle::new(armed, move || source_id.remove())
    }
}
