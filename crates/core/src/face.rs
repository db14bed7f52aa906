//! Face selection and per-tick text updates

use std::rc::Rc;

use crate::flip_cell::FlipRow;
use crate::format::{format_time, TimeValue};
use crate::scheduler::Scheduler;
use klock_types::{ClockReading, DisplayMode, Theme};

/// What one refresh tick hands to the face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceInput {
    pub wall: ClockReading,
    /// Stopwatch seconds while focus mode is active
    pub focus_elapsed: Option<u64>,
}

impl FaceInput {
    pub fn time_value(&self) -> TimeValue {
        match self.focus_elapsed {
            Some(elapsed) => TimeValue::Elapsed(elapsed),
            None => TimeValue::Wall(self.wall),
        }
    }
}

/// The mounted clock face: plain text or a row of flip cells.
///
/// Holds only the theme selector, the klock flag and the face's own text or
/// cells; colors, fonts and sizes stay with the caller.
pub struct ClockFace {
    theme: Theme,
    klock_mode: bool,
    text: String,
    row: Option<FlipRow>,
    scheduler: Rc<dyn Scheduler>,
}

impl ClockFace {
    pub fn new(theme: Theme, klock_mode: bool, scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            theme,
            klock_mode,
            text: String::new(),
            row: None,
            scheduler,
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn mode(&self) -> DisplayMode {
        self.theme.display_mode()
    }

    /// Switch theme or klock mode. Flip cells are dropped when leaving the
    /// flip faces; a new row is built on the next update.
    pub fn reconfigure(&mut self, theme: Theme, klock_mode: bool) {
        if theme == self.theme && klock_mode == self.klock_mode {
            return;
        }
        log::info!(
            "Clock face: {} (klock {}) -> {} (klock {})",
            self.theme,
            self.klock_mode,
            theme,
            klock_mode
        );
        self.theme = theme;
        self.klock_mode = klock_mode;
        if !self.mode().is_flip() {
            self.row = None;
        }
    }

    /// Format the input and push it into the face; returns `true` if the
    /// displayed text changed
    pub fn update(&mut self, input: FaceInput) -> bool {
        let text = format_time(input.time_value(), self.mode(), self.klock_mode);
        if self.mode().is_flip() {
            match self.row.as_mut() {
                Some(row) => {
                    row.set_text(&text);
                }
                None => self.row = Some(FlipRow::new(&text, self.scheduler.clone())),
            }
        }
        if text == self.text {
            return false;
        }
        self.text = text;
        true
    }

    /// The formatted string currently displayed
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn flip_row(&self) -> Option<&FlipRow> {
        self.row.as_ref()
    }

    /// Whether any flip cell is mid-animation
    pub fn is_animating(&self) -> bool {
        self.row.as_ref().is_some_and(FlipRow::is_animating)
    }
}
