//! Pointer-drag repositioning.
//!
//! A drag is a pure transform from (pointer at press, position at press,
//! pointer now) to a new position. The press-time values live in a
//! [`DragSession`] created on press and dropped on release.

use klock_types::{ClockPosition, PanelPosition};

/// A pointer location in window pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A width/height pair in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Move the clock center by the pointer delta, converted to percent of the
/// parent. Not clamped: the clock may be dragged partly off screen.
pub fn drag_clock_position(
    start_pointer: Point,
    start: ClockPosition,
    pointer: Point,
    parent: Size,
) -> ClockPosition {
    if parent.width <= 0.0 || parent.height <= 0.0 {
        return start;
    }
    let d_left = (pointer.x - start_pointer.x) / parent.width * 100.0;
    let d_top = (pointer.y - start_pointer.y) / parent.height * 100.0;
    ClockPosition {
        top: start.top + d_top,
        left: start.left + d_left,
    }
}

/// Move the settings panel, anchored at the window's top-right corner.
///
/// The panel is kept inside the window; if it is larger than the window it
/// sticks to the top-right corner.
pub fn drag_panel_position(
    start_pointer: Point,
    start: PanelPosition,
    pointer: Point,
    window: Size,
    panel: Size,
) -> PanelPosition {
    let top = start.top + (pointer.y - start_pointer.y);
    // Moving right shrinks the right offset
    let right = start.right - (pointer.x - start_pointer.x);
    PanelPosition {
        top: top.min(window.height - panel.height).max(0.0),
        right: right.min(window.width - panel.width).max(0.0),
    }
}

/// Press-time state of one drag gesture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession<P> {
    pub start_pointer: Point,
    pub start_position: P,
}

impl<P: Copy> DragSession<P> {
    pub fn begin(start_pointer: Point, start_position: P) -> Self {
        Self {
            start_pointer,
            start_position,
        }
    }
}

impl DragSession<ClockPosition> {
    pub fn clock_position_at(&self, pointer: Point, parent: Size) -> ClockPosition {
        drag_clock_position(self.start_pointer, self.start_position, pointer, parent)
    }
}

impl DragSession<PanelPosition> {
    pub fn panel_position_at(&self, pointer: Point, window: Size, panel: Size) -> PanelPosition {
        drag_panel_position(self.start_pointer, self.start_position, pointer, window, panel)
    }
}
