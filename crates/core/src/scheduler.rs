//! Cancellable deferred actions.
//!
//! Everything time-driven in klock (the 1s clock tick, the 200ms progress
//! sampler, the 600ms flip completion, the controls auto-hide) goes through
//! the [`Scheduler`] trait. Each scheduled action comes back as a
//! [`TimerHandle`]; cancelling or dropping the handle stops the action
//! synchronously.
//!
//! The handle shares an `armed` flag with the scheduled closure. Cancelling
//! clears the flag before removing the source, and every closure checks the
//! flag before running, so an invocation that races a cancellation is a
//! no-op. One-shot actions clear the flag as they fire, so cancelling a
//! handle whose action already ran never touches the (gone) source.
//!
//! The GTK build implements the trait on top of glib timeouts; tests and
//! headless use go through [`VirtualScheduler`], which only moves when told.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

/// Source of "now" and of one-shot / repeating deferred actions.
///
/// Single-threaded: actions run on the thread that owns the scheduler and
/// never overlap.
pub trait Scheduler {
    /// Current monotonic time as seen by this scheduler
    fn now(&self) -> Instant;

    /// Run `action` once after `delay`
    fn after(&self, delay: Duration, action: Box<dyn FnOnce()>) -> TimerHandle;

    /// Run `action` every `interval`, first after one full interval
    fn every(&self, interval: Duration, action: Box<dyn FnMut()>) -> TimerHandle;
}

/// Handle to a scheduled action. Dropping it cancels the action.
#[must_use = "dropping a TimerHandle cancels the scheduled action"]
pub struct TimerHandle {
    armed: Rc<Cell<bool>>,
    cancel: Option<Box<dyn FnOnce()>>,
}

impl TimerHandle {
    /// Build a handle from the shared `armed` flag and a closure that removes
    /// the underlying source. `cancel` only runs while the action is armed.
    pub fn new(armed: Rc<Cell<bool>>, cancel: impl FnOnce() + 'static) -> Self {
        Self {
            armed,
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A fresh armed flag for a new action
    pub fn arm() -> Rc<Cell<bool>> {
        Rc::new(Cell::new(true))
    }

    /// Wrap a one-shot action so it disarms itself as it fires and does
    /// nothing if the handle was cancelled first
    pub fn guard_once(armed: &Rc<Cell<bool>>, action: Box<dyn FnOnce()>) -> impl FnOnce() {
        let armed = armed.clone();
        move || {
            if armed.replace(false) {
                action();
            }
        }
    }

    /// Wrap a repeating action so it does nothing once cancelled.
    /// Returns `false` from the wrapper when the source should stop.
    pub fn guard_repeating(
        armed: &Rc<Cell<bool>>,
        mut action: Box<dyn FnMut()>,
    ) -> impl FnMut() -> bool {
        let armed = armed.clone();
        move || {
            if armed.get() {
                action();
            }
            armed.get()
        }
    }

    /// Whether the action may still run
    pub fn is_armed(&self) -> bool {
        self.armed.get()
    }

    /// Cancel the action. Idempotent; a fired one-shot is left alone.
    pub fn cancel(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        let was_armed = self.armed.replace(false);
        if let Some(cancel) = self.cancel.take() {
            if was_armed {
                cancel();
            }
        }
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl std::fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerHandle")
            .field("armed", &self.armed.get())
            .finish()
    }
}

enum TaskKind {
    Once(Box<dyn FnOnce()>),
    Every(Duration, Box<dyn FnMut() -> bool>),
}

struct Task {
    id: u64,
    due: Duration,
    kind: TaskKind,
}

struct VirtualInner {
    origin: Instant,
    elapsed: Duration,
    next_id: u64,
    tasks: Vec<Task>,
}

impl VirtualInner {
    /// Index of the earliest task due at or before `limit`; ties go to the
    /// task scheduled first
    fn next_due(&self, limit: Duration) -> Option<usize> {
        self.tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= limit)
            .min_by_key(|(_, t)| (t.due, t.id))
            .map(|(idx, _)| idx)
    }

    fn remove(&mut self, id: u64) {
        self.tasks.retain(|t| t.id != id);
    }
}

/// Scheduler driven by simulated time.
///
/// Nothing fires until [`advance`](VirtualScheduler::advance) is called; due
/// actions then run in deadline order with `now()` set to each deadline.
/// Cloning shares the same timeline.
#[derive(Clone)]
pub struct VirtualScheduler {
    inner: Rc<RefCell<VirtualInner>>,
}

impl VirtualScheduler {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(VirtualInner {
                origin: Instant::now(),
                elapsed: Duration::ZERO,
                next_id: 0,
                tasks: Vec::new(),
            })),
        }
    }

    /// Simulated time since the scheduler was created
    pub fn elapsed(&self) -> Duration {
        self.inner.borrow().elapsed
    }

    /// Number of scheduled actions that have not fired or been cancelled
    pub fn pending_count(&self) -> usize {
        self.inner.borrow().tasks.len()
    }

    /// Move simulated time forward, running every action that falls due
    pub fn advance(&self, by: Duration) {
        let target = self.inner.borrow().elapsed + by;

        loop {
            // Take the task out before running it so the action is free to
            // schedule or cancel other work
            let task = {
                let mut inner = self.inner.borrow_mut();
                let Some(idx) = inner.next_due(target) else {
                    break;
                };
                let task = inner.tasks.swap_remove(idx);
                inner.elapsed = task.due;
                task
            };

            match task.kind {
                TaskKind::Once(action) => action(),
                TaskKind::Every(interval, mut action) => {
                    if action() {
                        self.inner.borrow_mut().tasks.push(Task {
                            id: task.id,
                            due: task.due + interval,
                            kind: TaskKind::Every(interval, action),
                        });
                    }
                }
            }
        }

        self.inner.borrow_mut().elapsed = target;
    }

    fn push(&self, delay: Duration, armed: &Rc<Cell<bool>>, kind: TaskKind) -> TimerHandle {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            let due = inner.elapsed + delay;
            inner.tasks.push(Task { id, due, kind });
            id
        };

        let weak: Weak<RefCell<VirtualInner>> = Rc::downgrade(&self.inner);
        TimerHandle::new(armed.clone(), move || {
            if let Some(inner) = weak.upgrade() {
                // try_borrow_mut: a handle dropped from inside advance() while
                // a task list borrow is live would otherwise panic; the armed
                // flag already keeps the stale task from running
                if let Ok(mut inner) = inner.try_borrow_mut() {
                    inner.remove(id);
                }
            }
        })
    }
}

impl Default for VirtualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for VirtualScheduler {
    fn now(&self) -> Instant {
        let inner = self.inner.borrow();
        inner.origin + inner.elapsed
    }

    fn after(&self, delay: Duration, action: Box<dyn FnOnce()>) -> TimerHandle {
        let armed = TimerHandle::arm();
        let guarded = TimerHandle::guard_once(&armed, action);
        self.push(delay, &armed, TaskKind::Once(Box::new(guarded)))
    }

    fn every(&self, interval: Duration, action: Box<dyn FnMut()>) -> TimerHandle {
        // A zero interval would spin advance() forever
        let interval = interval.max(Duration::from_millis(1));
        let armed = TimerHandle::arm();
        let guarded = TimerHandle::guard_repeating(&armed, action);
        self.push(interval, &armed, TaskKind::Every(interval, Box::new(guarded)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> (Rc<Cell<u32>>, impl Fn() -> Rc<Cell<u32>>) {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        (count, move || c.clone())
    }

    #[test]
    fn test_once_fires_at_deadline() {
        let sched = VirtualScheduler::new();
        let (count, make) = counter();
        let c = make();
        let _handle = sched.after(
            Duration::from_millis(600),
            Box::new(move || c.set(c.get() + 1)),
        );

        sched.advance(Duration::from_millis(599));
        assert_eq!(count.get(), 0);
        sched.advance(Duration::from_millis(1));
        assert_eq!(count.get(), 1);
        sched.advance(Duration::from_secs(10));
        assert_eq!(count.get(), 1);
        assert_eq!(sched.pending_count(), 0);
    }

    #[test]
    fn test_every_fires_each_interval() {
        let sched = VirtualScheduler::new();
        let (count, make) = counter();
        let c = make();
        let _handle = sched.every(
            Duration::from_millis(200),
            Box::new(move || c.set(c.get() + 1)),
        );

        sched.advance(Duration::from_millis(1000));
        assert_eq!(count.get(), 5);
    }

    #[test]
    fn test_cancel_stops_repeating_action() {
        let sched = VirtualScheduler::new();
        let (count, make) = counter();
        let c = make();
        let handle = sched.every(Duration::from_secs(1), Box::new(move || c.set(c.get() + 1)));

        sched.advance(Duration::from_secs(3));
        handle.cancel();
        sched.advance(Duration::from_secs(3));
        assert_eq!(count.get(), 3);
        assert_eq!(sched.pending_count(), 0);
    }

    #[test]
    fn test_drop_cancels() {
        let sched = VirtualScheduler::new();
        let (count, make) = counter();
        let c = make();
        {
            let _handle = sched.after(Duration::from_secs(1), Box::new(move || c.set(1)));
        }
        sched.advance(Duration::from_secs(2));
        assert_eq!(count.get(), 0);
        assert_eq!(sched.pending_count(), 0);
    }

    #[test]
    fn test_cancel_after_fire_is_harmless() {
        let sched = VirtualScheduler::new();
        let handle = sched.after(Duration::from_millis(5), Box::new(|| {}));
        sched.advance(Duration::from_millis(5));
        assert!(!handle.is_armed());
        handle.cancel();
    }

    #[test]
    fn test_now_follows_deadlines() {
        let sched = VirtualScheduler::new();
        let start = sched.now();
        let seen = Rc::new(Cell::new(Duration::ZERO));
        let s = seen.clone();
        let probe = sched.clone();
        let _handle = sched.after(
            Duration::from_millis(250),
            Box::new(move || s.set(probe.now() - start)),
        );

        sched.advance(Duration::from_secs(1));
        assert_eq!(seen.get(), Duration::from_millis(250));
        assert_eq!(sched.now() - start, Duration::from_secs(1));
    }

    #[test]
    fn test_actions_run_in_deadline_order() {
        let sched = VirtualScheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let (l1, l2) = (log.clone(), log.clone());
        let _late = sched.after(Duration::from_millis(30), Box::new(move || l1.borrow_mut().push("late")));
        let _early = sched.after(Duration::from_millis(10), Box::new(move || l2.borrow_mut().push("early")));

        sched.advance(Duration::from_millis(50));
        assert_eq!(*log.borrow(), vec!["early", "late"]);
    }

    #[test]
    fn test_action_can_schedule_more_work() {
        let sched = VirtualScheduler::new();
        let (count, make) = counter();
        let c = make();
        let slot: Rc<RefCell<Option<TimerHandle>>> = Rc::new(RefCell::new(None));
        let slot_inner = slot.clone();
        let s = sched.clone();
        let _first = sched.after(
            Duration::from_millis(10),
            Box::new(move || {
                let c = c.clone();
                *slot_inner.borrow_mut() =
                    Some(s.after(Duration::from_millis(10), Box::new(move || c.set(c.get() + 1))));
            }),
        );

        sched.advance(Duration::from_millis(15));
        assert_eq!(count.get(), 0);
        sched.advance(Duration::from_millis(5));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_guards_skip_action_after_cancel() {
        let (count, make) = counter();
        let armed = TimerHandle::arm();
        let c1 = make();
        let once = TimerHandle::guard_once(&armed, Box::new(move || c1.set(c1.get() + 1)));
        let c2 = make();
        let mut repeating =
            TimerHandle::guard_repeating(&armed, Box::new(move || c2.set(c2.get() + 1)));

        armed.set(false);
        once();
        assert!(!repeating());
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_repeating_action_cancels_itself() {
        let sched = VirtualScheduler::new();
        let (count, make) = counter();
        let c = make();
        let slot: Rc<RefCell<Option<TimerHandle>>> = Rc::new(RefCell::new(None));
        let slot_inner = slot.clone();
        let handle = sched.every(
            Duration::from_secs(1),
            Box::new(move || {
                c.set(c.get() + 1);
                if c.get() == 2 {
                    let own = slot_inner.borrow_mut().take();
                    if let Some(own) = own {
                        own.cancel();
                    }
                }
            }),
        );
        *slot.borrow_mut() = Some(handle);

        sched.advance(Duration::from_secs(5));
        assert_eq!(count.get(), 2);
        assert_eq!(sched.pending_count(), 0);
        assert!(slot.borrow().is_none());
    }
}
