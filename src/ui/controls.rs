//! Auto-hiding on-screen controls
//!
//! A click on the window shows the settings and focus buttons; they hide
//! again once `CONTROLS_HIDE_DELAY` passes without another click. While the
//! settings panel is open the controls are held visible.

use log::trace;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use klock_core::{Scheduler, TimerHandle, CONTROLS_HIDE_DELAY};

struct VisibilityState {
    visible: Cell<bool>,
    held: Cell<bool>,
    hide_timer: RefCell<Option<TimerHandle>>,
    listener: RefCell<Option<Rc<dyn Fn(bool)>>>,
}

impl VisibilityState {
    fn set_visible(&self, visible: bool) {
        if self.visible.replace(visible) == visible {
            return;
        }
        let listener = self.listener.borrow().clone();
        if let Some(listener) = listener {
            listener(visible);
        }
    }
}

/// Visibility of the on-screen buttons
pub struct ControlsVisibility {
    scheduler: Rc<dyn Scheduler>,
    delay: Duration,
    state: Rc<VisibilityState>,
}

impl ControlsVisibility {
    pub fn new(scheduler: Rc<dyn Scheduler>) -> Self {
        Self::with_delay(scheduler, CONTROLS_HIDE_DELAY)
    }

    pub fn with_delay(scheduler: Rc<dyn Scheduler>, delay: Duration) -> Self {
        Self {
            scheduler,
            delay,
            state: Rc::new(VisibilityState {
                visible: Cell::new(false),
                held: Cell::new(false),
                hide_timer: RefCell::new(None),
                listener: RefCell::new(None),
            }),
        }
    }

    /// Called with the new visibility whenever it changes
    pub fn set_listener(&self, listener: impl Fn(bool) + 'static) {
        *self.state.listener.borrow_mut() = Some(Rc::new(listener));
    }

    /// Show the controls and restart the hide countdown
    pub fn poke(&self) {
        self.state.set_visible(true);
        if !self.state.held.get() {
            self.arm_hide_timer();
        }
    }

    /// Keep the controls visible until `release`
    pub fn hold(&self) {
        self.state.held.set(true);
        self.state.hide_timer.borrow_mut().take();
        self.state.set_visible(true);
    }

    /// Stop holding; the controls hide after the usual delay
    pub fn release(&self) {
        self.state.held.set(false);
        self.state.set_visible(true);
        self.arm_hide_timer();
    }

    pub fn is_visible(&self) -> bool {
        self.state.visible.get()
    }

    pub fn is_held(&self) -> bool {
        self.state.held.get()
    }

    fn arm_hide_timer(&self) {
        let weak: Weak<VisibilityState> = Rc::downgrade(&self.state);
        let handle = self.scheduler.after(
            self.delay,
            Box::new(move || {
                if let Some(state) = weak.upgrade() {
                    trace!("Hiding controls");
                    state.hide_timer.borrow_mut().take();
                    state.set_visible(false);
                }
            }),
        );
        // Replacing the previous handle cancels its countdown
        let previous = self.state.hide_timer.borrow_mut().replace(handle);
        drop(previous);
    }
}

impl Drop for ControlsVisibility {
    fn drop(&mut self) {
        self.state.hide_timer.borrow_mut().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use klock_core::VirtualScheduler;

    fn setup() -> (VirtualScheduler, ControlsVisibility, Rc<RefCell<Vec<bool>>>) {
        let sched = VirtualScheduler::new();
        let controls = ControlsVisibility::new(Rc::new(sched.clone()));
        let events = Rc::new(RefCell::new(Vec::new()));
        let e = events.clone();
        controls.set_listener(move |visible| e.borrow_mut().push(visible));
        (sched, controls, events)
    }

    #[test]
    fn test_hidden_initially() {
        let (_sched, controls, events) = setup();
        assert!(!controls.is_visible());
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_hides_three_seconds_after_click() {
        let (sched, controls, events) = setup();
        controls.poke();
        assert!(controls.is_visible());

        sched.advance(Duration::from_millis(2999));
        assert!(controls.is_visible());
        sched.advance(Duration::from_millis(1));
        assert!(!controls.is_visible());
        assert_eq!(*events.borrow(), vec![true, false]);
        assert_eq!(sched.pending_count(), 0);
    }

    #[test]
    fn test_click_restarts_countdown() {
        let (sched, controls, events) = setup();
        controls.poke();
        sched.advance(Duration::from_secs(2));
        controls.poke();
        sched.advance(Duration::from_secs(2));
        assert!(controls.is_visible());
        // Only one countdown is ever pending
        assert_eq!(sched.pending_count(), 1);
        sched.advance(Duration::from_secs(1));
        assert!(!controls.is_visible());
        assert_eq!(*events.borrow(), vec![true, false]);
    }

    #[test]
    fn test_hold_keeps_visible() {
        let (sched, controls, _events) = setup();
        controls.poke();
        controls.hold();
        assert_eq!(sched.pending_count(), 0);

        // Clicks while held don't start a countdown
        controls.poke();
        sched.advance(Duration::from_secs(60));
        assert!(controls.is_visible());
        assert!(controls.is_held());

        controls.release();
        assert!(!controls.is_held());
        sched.advance(Duration::from_secs(3));
        assert!(!controls.is_visible());
    }

    #[test]
    fn test_click_while_held_changes_nothing() {
        let (sched, controls, events) = setup();
        controls.hold();
        events.borrow_mut().clear();

        controls.poke();
        assert!(events.borrow().is_empty());
        assert_eq!(sched.pending_count(), 0);
        assert!(controls.is_visible());
        assert!(controls.is_held());
    }

    #[test]
    fn test_drop_cancels_countdown() {
        let (sched, controls, _events) = setup();
        controls.poke();
        assert_eq!(sched.pending_count(), 1);
        drop(controls);
        assert_eq!(sched.pending_count(), 0);
    }
}
