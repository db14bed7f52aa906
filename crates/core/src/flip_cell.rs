//! Flip-card digit cells.
//!
//! A [`FlipCell`] owns one character slot. When it receives a character
//! different from the one it shows, it enters the animating phase for
//! [`FLIP_DURATION`]: the static upper half already shows the new value, the
//! static lower half still shows the old one, and two overlay halves fold the
//! old value away and unfold the new one in. When the completion fires, the
//! lower half catches up and the overlays go away.
//!
//! A change arriving mid-animation restarts the animation from the last
//! settled value to the newest one. Intermediate values are skipped, never
//! queued. The pending completion lives inside the phase, so replacing the
//! phase always cancels it before a new one is scheduled.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

use crate::constants::FLIP_DURATION;
use crate::scheduler::{Scheduler, TimerHandle};

/// Observable state of one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigitCellState {
    /// The authoritative character, updated as soon as new input arrives
    pub current_value: char,
    /// The character being replaced; only moves when an animation settles
    pub previous_value: char,
    pub is_animating: bool,
}

/// Everything a renderer needs to draw the cell's four layers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlipCellSnapshot {
    /// Static upper half
    pub upper: char,
    /// Static lower half
    pub lower: char,
    /// Overlay folding down from the top, showing the outgoing value
    pub fold: Option<char>,
    /// Overlay unfolding onto the bottom, showing the incoming value
    pub unfold: Option<char>,
    /// Animation progress in [0, 1]; 0 while idle
    pub progress: f64,
}

enum FlipPhase {
    Idle,
    Animating {
        started: Instant,
        // Held only so that leaving this phase cancels the completion
        _completion: TimerHandle,
    },
}

struct CellInner {
    state: DigitCellState,
    phase: FlipPhase,
}

impl CellInner {
    /// Animating -> Idle
    fn settle(&mut self) {
        self.state.previous_value = self.state.current_value;
        self.state.is_animating = false;
        self.phase = FlipPhase::Idle;
    }
}

/// One animated character slot
pub struct FlipCell {
    inner: Rc<RefCell<CellInner>>,
    scheduler: Rc<dyn Scheduler>,
    duration: Duration,
}

impl FlipCell {
    /// A cell resting on `initial`
    pub fn new(initial: char, scheduler: Rc<dyn Scheduler>) -> Self {
        Self::with_duration(initial, scheduler, FLIP_DURATION)
    }

    pub fn with_duration(initial: char, scheduler: Rc<dyn Scheduler>, duration: Duration) -> Self {
        Self {
            inner: Rc::new(RefCell::new(CellInner {
                state: DigitCellState {
                    current_value: initial,
                    previous_value: initial,
                    is_animating: false,
                },
                phase: FlipPhase::Idle,
            })),
            scheduler,
            duration,
        }
    }

    /// Feed the cell its character for this tick.
    ///
    /// Returns `true` if an animation was started or restarted.
    pub fn set(&self, value: char) -> bool {
        let mut inner = self.inner.borrow_mut();
        if inner.state.current_value == value {
            return false;
        }

        let restarted = matches!(inner.phase, FlipPhase::Animating { .. });
        // Cancel the in-flight completion before anything new is scheduled
        inner.phase = FlipPhase::Idle;
        if !restarted {
            inner.state.previous_value = inner.state.current_value;
        }
        inner.state.current_value = value;
        inner.state.is_animating = true;

        let weak: Weak<RefCell<CellInner>> = Rc::downgrade(&self.inner);
        let completion = self.scheduler.after(
            self.duration,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.borrow_mut().settle();
                }
            }),
        );
        inner.phase = FlipPhase::Animating {
            started: self.scheduler.now(),
            _completion: completion,
        };

        log::trace!(
            "Flip cell {} -> {}{}",
            inner.state.previous_value,
            value,
            if restarted { " (restarted)" } else { "" }
        );
        true
    }

    pub fn state(&self) -> DigitCellState {
        self.inner.borrow().state
    }

    pub fn is_animating(&self) -> bool {
        self.inner.borrow().state.is_animating
    }

    pub fn snapshot(&self) -> FlipCellSnapshot {
        let inner = self.inner.borrow();
        let state = inner.state;
        match &inner.phase {
            FlipPhase::Idle => FlipCellSnapshot {
                upper: state.current_value,
                lower: state.previous_value,
                fold: None,
                unfold: None,
                progress: 0.0,
            },
            FlipPhase::Animating { started, .. } => {
                let elapsed = self.scheduler.now().saturating_duration_since(*started);
                let progress = if self.duration.is_zero() {
                    1.0
                } else {
                    (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
                };
                FlipCellSnapshot {
                    upper: state.current_value,
                    lower: state.previous_value,
                    fold: Some(state.previous_value),
                    unfold: Some(state.current_value),
                    progress,
                }
            }
        }
    }
}

impl std::fmt::Debug for FlipCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlipCell")
            .field("state", &self.state())
            .field("duration", &self.duration)
            .finish()
    }
}

/// One position in a row of flip cells
#[derive(Debug)]
pub enum FlipSlot {
    /// A static separator such as ':'
    Separator(char),
    Cell(FlipCell),
}

/// A fixed row of cells fed from a formatted time string.
///
/// The row diffs each new string per character; only cells whose character
/// changed animate. If the string's shape changes (a different length or
/// separator layout, e.g. after a theme switch), the row is rebuilt without
/// animating.
pub struct FlipRow {
    slots: Vec<FlipSlot>,
    scheduler: Rc<dyn Scheduler>,
    duration: Duration,
}

fn is_separator(c: char) -> bool {
    !c.is_ascii_alphanumeric()
}

impl FlipRow {
    pub fn new(text: &str, scheduler: Rc<dyn Scheduler>) -> Self {
        Self::with_duration(text, scheduler, FLIP_DURATION)
    }

    pub fn with_duration(text: &str, scheduler: Rc<dyn Scheduler>, duration: Duration) -> Self {
        let mut row = Self {
            slots: Vec::new(),
            scheduler,
            duration,
        };
        row.rebuild(text);
        row
    }

    fn rebuild(&mut self, text: &str) {
        self.slots = text
            .chars()
            .map(|c| {
                if is_separator(c) {
                    FlipSlot::Separator(c)
                } else {
                    FlipSlot::Cell(FlipCell::with_duration(
                        c,
                        self.scheduler.clone(),
                        self.duration,
                    ))
                }
            })
            .collect();
    }

    fn same_shape(&self, text: &str) -> bool {
        self.slots.len() == text.chars().count()
            && self.slots.iter().zip(text.chars()).all(|(slot, c)| match slot {
                FlipSlot::Separator(s) => *s == c,
                FlipSlot::Cell(_) => !is_separator(c),
            })
    }

    /// Feed a new string; returns how many cells started animating
    pub fn set_text(&mut self, text: &str) -> usize {
        if !self.same_shape(text) {
            log::debug!("Flip row reshaped to '{}'", text);
            self.rebuild(text);
            return 0;
        }

        let mut started = 0;
        for (slot, c) in self.slots.iter().zip(text.chars()) {
            if let FlipSlot::Cell(cell) = slot {
                if cell.set(c) {
                    started += 1;
                }
            }
        }
        started
    }

    pub fn slots(&self) -> &[FlipSlot] {
        &self.slots
    }

    pub fn cells(&self) -> impl Iterator<Item = &FlipCell> {
        self.slots.iter().filter_map(|slot| match slot {
            FlipSlot::Cell(cell) => Some(cell),
            FlipSlot::Separator(_) => None,
        })
    }

    pub fn is_animating(&self) -> bool {
        self.cells().any(FlipCell::is_animating)
    }

    /// The authoritative text (current values joined with separators)
    pub fn text(&self) -> String {
        self.slots
            .iter()
            .map(|slot| match slot {
                FlipSlot::Separator(c) => *c,
                FlipSlot::Cell(cell) => cell.state().current_value,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::VirtualScheduler;

    fn setup() -> (VirtualScheduler, Rc<dyn Scheduler>) {
        let sched = VirtualScheduler::new();
        let dyn_sched: Rc<dyn Scheduler> = Rc::new(sched.clone());
        (sched, dyn_sched)
    }

    #[test]
    fn test_initial_state_is_idle() {
        let (_sched, s) = setup();
        let cell = FlipCell::new('4', s);
        assert_eq!(
            cell.state(),
            DigitCellState {
                current_value: '4',
                previous_value: '4',
                is_animating: false
            }
        );
    }

    #[test]
    fn test_same_value_twice_does_not_animate() {
        let (sched, s) = setup();
        let cell = FlipCell::new('1', s);
        assert!(!cell.set('1'));
        assert!(!cell.set('1'));
        let state = cell.state();
        assert!(!state.is_animating);
        assert_eq!(state.current_value, state.previous_value);
        assert_eq!(sched.pending_count(), 0);
    }

    #[test]
    fn test_idle_animating_idle_round_trip() {
        let (sched, s) = setup();
        let cell = FlipCell::new('1', s);

        assert!(cell.set('2'));
        let state = cell.state();
        assert!(state.is_animating);
        assert_eq!(state.current_value, '2');
        assert_eq!(state.previous_value, '1');

        sched.advance(Duration::from_millis(599));
        assert!(cell.is_animating());
        assert_eq!(cell.state().previous_value, '1');

        sched.advance(Duration::from_millis(1));
        let state = cell.state();
        assert!(!state.is_animating);
        assert_eq!(state.current_value, '2');
        assert_eq!(state.previous_value, '2');
    }

    #[test]
    fn test_rapid_changes_restart_and_settle_on_last() {
        let (sched, s) = setup();
        let cell = FlipCell::new('0', s);

        cell.set('a');
        sched.advance(Duration::from_millis(100));
        cell.set('b');
        sched.advance(Duration::from_millis(100));
        cell.set('c');

        // Lower face stays on the last settled value while restarting
        assert_eq!(cell.state().previous_value, '0');
        assert_eq!(cell.state().current_value, 'c');
        assert_eq!(sched.pending_count(), 1);

        // The first completion would have been due at 600ms; it was cancelled
        sched.advance(Duration::from_millis(400));
        assert!(cell.is_animating());

        sched.advance(Duration::from_millis(200));
        let state = cell.state();
        assert!(!state.is_animating);
        assert_eq!(state.current_value, 'c');
        assert_eq!(state.previous_value, 'c');
        assert_eq!(sched.pending_count(), 0);
    }

    #[test]
    fn test_flip_back_to_previous_value_settles() {
        let (sched, s) = setup();
        let cell = FlipCell::new('5', s);
        cell.set('6');
        sched.advance(Duration::from_millis(200));
        assert!(cell.set('5'));

        sched.advance(Duration::from_millis(600));
        assert_eq!(
            cell.state(),
            DigitCellState {
                current_value: '5',
                previous_value: '5',
                is_animating: false
            }
        );
    }

    #[test]
    fn test_snapshot_layers() {
        let (sched, s) = setup();
        let cell = FlipCell::new('3', s);

        let idle = cell.snapshot();
        assert_eq!((idle.upper, idle.lower), ('3', '3'));
        assert!(idle.fold.is_none() && idle.unfold.is_none());

        cell.set('4');
        sched.advance(Duration::from_millis(300));
        let mid = cell.snapshot();
        assert_eq!(mid.upper, '4');
        assert_eq!(mid.lower, '3');
        assert_eq!(mid.fold, Some('3'));
        assert_eq!(mid.unfold, Some('4'));
        assert!((mid.progress - 0.5).abs() < 1e-9);

        sched.advance(Duration::from_millis(300));
        let done = cell.snapshot();
        assert_eq!((done.upper, done.lower), ('4', '4'));
        assert!(done.fold.is_none() && done.unfold.is_none());
    }

    #[test]
    fn test_dropping_cell_cancels_completion() {
        let (sched, s) = setup();
        let cell = FlipCell::new('1', s);
        cell.set('2');
        assert_eq!(sched.pending_count(), 1);
        drop(cell);
        assert_eq!(sched.pending_count(), 0);
        sched.advance(Duration::from_secs(1));
    }

    #[test]
    fn test_row_diffs_per_character() {
        let (sched, s) = setup();
        let mut row = FlipRow::new("12:59", s);
        assert_eq!(row.cells().count(), 4);

        assert_eq!(row.set_text("13:00"), 3);
        assert!(row.is_animating());
        assert_eq!(row.text(), "13:00");

        sched.advance(Duration::from_millis(600));
        assert!(!row.is_animating());
        assert_eq!(row.set_text("13:00"), 0);
    }

    #[test]
    fn test_row_reshape_rebuilds_without_animating() {
        let (sched, s) = setup();
        let mut row = FlipRow::new("10:15:30", s);
        row.set_text("10:15:31");
        assert_eq!(sched.pending_count(), 1);

        assert_eq!(row.set_text("10:16"), 0);
        assert_eq!(row.cells().count(), 4);
        assert!(!row.is_animating());
        // Old cells were dropped along with their completions
        assert_eq!(sched.pending_count(), 0);
        assert!(matches!(row.slots()[2], FlipSlot::Separator(':')));
    }
}
