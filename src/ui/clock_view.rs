//! The clock drawing area
//!
//! One `DrawingArea` paints the background, the mounted face (plain text or
//! flip cards) and, in klock mode, the minute progress bar. While any flip
//! card is mid-animation a frame-clock tick callback keeps redrawing.

use gtk4::prelude::*;
use gtk4::{cairo, glib, DrawingArea, GestureDrag};
use log::{debug, trace, warn};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use klock_core::{ClockFace, DragSession, FaceInput, Point, Scheduler, Size};
use klock_render::{hit_test, render_flip_row, render_plain_clock, render_progress_bar, FlipStyle, FontSpec, Rect};
use klock_types::config::FONT_CHOICES;
use klock_types::{ClockConfig, ClockPosition, ClockReading};

struct ViewState {
    config: RefCell<ClockConfig>,
    face: RefCell<ClockFace>,
    wall: Cell<ClockReading>,
    focus_elapsed: Cell<Option<u64>>,
    progress: Cell<f64>,
    /// Where the plain clock text was last drawn
    text_bounds: Cell<Option<Rect>>,
    /// A frame tick callback is registered
    pumping: Cell<bool>,
    drag: RefCell<Option<DragSession<ClockPosition>>>,
    on_moved: RefCell<Option<Rc<dyn Fn(ClockPosition)>>>,
}

impl ViewState {
    fn face_input(&self) -> FaceInput {
        FaceInput {
            wall: self.wall.get(),
            focus_elapsed: self.focus_elapsed.get(),
        }
    }
}

/// Drawing area showing the clock
pub struct ClockView {
    area: DrawingArea,
    state: Rc<ViewState>,
}

impl ClockView {
    pub fn new(config: ClockConfig, scheduler: Rc<dyn Scheduler>) -> Self {
        let area = DrawingArea::new();
        area.set_hexpand(true);
        area.set_vexpand(true);

        let face = ClockFace::new(config.theme, config.klock_mode, scheduler);
        let state = Rc::new(ViewState {
            config: RefCell::new(config),
            face: RefCell::new(face),
            wall: Cell::new(ClockReading::default()),
            focus_elapsed: Cell::new(None),
            progress: Cell::new(0.0),
            text_bounds: Cell::new(None),
            pumping: Cell::new(false),
            drag: RefCell::new(None),
            on_moved: RefCell::new(None),
        });

        let weak = Rc::downgrade(&state);
        area.set_draw_func(move |_area, cr, width, height| {
            let Some(state) = weak.upgrade() else {
                return;
            };
            if let Err(e) = draw(&state, cr, width as f64, height as f64) {
                warn!("Failed to draw clock: {}", e);
            }
        });

        let view = Self { area, state };
        view.setup_drag();
        view
    }

    pub fn widget(&self) -> &DrawingArea {
        &self.area
    }

    /// Called with the new clock position while the text is dragged
    pub fn connect_moved(&self, callback: impl Fn(ClockPosition) + 'static) {
        *self.state.on_moved.borrow_mut() = Some(Rc::new(callback));
    }

    /// Install a new configuration, remounting the face if its theme or klock
    /// flag changed
    pub fn set_config(&self, config: ClockConfig) {
        self.state
            .face
            .borrow_mut()
            .reconfigure(config.theme, config.klock_mode);
        *self.state.config.borrow_mut() = config;
        self.refresh_face();
        self.area.queue_draw();
    }

    /// New wall-clock sample from the ticker
    pub fn set_wall(&self, reading: ClockReading) {
        self.state.wall.set(reading);
        if self.state.focus_elapsed.get().is_none() {
            self.refresh_face();
        }
    }

    /// Stopwatch seconds to show instead of the wall clock, or `None`
    pub fn set_focus_elapsed(&self, elapsed: Option<u64>) {
        self.state.focus_elapsed.set(elapsed);
        self.refresh_face();
    }

    /// Klock progress fraction in [0, 1]
    pub fn set_progress(&self, fraction: f64) {
        if self.state.progress.replace(fraction) != fraction {
            self.area.queue_draw();
        }
    }

    fn refresh_face(&self) {
        let input = self.state.face_input();
        let changed = self.state.face.borrow_mut().update(input);
        if changed {
            trace!("Clock text: {}", self.state.face.borrow().text());
            self.area.queue_draw();
        }
        if self.state.face.borrow().is_animating() {
            self.start_frame_pump();
        }
    }

    /// Redraw every frame until the flip cards settle
    fn start_frame_pump(&self) {
        if self.state.pumping.replace(true) {
            return;
        }
        let weak = Rc::downgrade(&self.state);
        self.area.add_tick_callback(move |area, _frame_clock| {
            let Some(state) = weak.upgrade() else {
                return glib::ControlFlow::Break;
            };
            area.queue_draw();
            if state.face.borrow().is_animating() {
                glib::ControlFlow::Continue
            } else {
                state.pumping.set(false);
                glib::ControlFlow::Break
            }
        });
    }

    fn setup_drag(&self) {
        let gesture = GestureDrag::new();

        let weak = Rc::downgrade(&self.state);
        gesture.connect_drag_begin(move |gesture, x, y| {
            let Some(state) = weak.upgrade() else {
                return;
            };
            let config = state.config.borrow();
            let on_text = state
                .text_bounds
                .get()
                .is_some_and(|bounds| hit_test(&bounds, x, y));
            if config.is_draggable() && on_text {
                debug!("Clock drag started at ({:.0}, {:.0})", x, y);
                *state.drag.borrow_mut() =
                    Some(DragSession::begin(Point::new(x, y), config.clock_position));
                gesture.set_state(gtk4::EventSequenceState::Claimed);
            } else {
                gesture.set_state(gtk4::EventSequenceState::Denied);
            }
        });

        let weak = Rc::downgrade(&self.state);
        let area_weak = self.area.downgrade();
        gesture.connect_drag_update(move |gesture, offset_x, offset_y| {
            let (Some(state), Some(area)) = (weak.upgrade(), area_weak.upgrade()) else {
                return;
            };
            let Some((start_x, start_y)) = gesture.start_point() else {
                return;
            };
            let position = {
                let drag = state.drag.borrow();
                let Some(session) = drag.as_ref() else {
                    return;
                };
                let parent = Size::new(area.width() as f64, area.height() as f64);
                session.clock_position_at(Point::new(start_x + offset_x, start_y + offset_y), parent)
            };
            let callback = state.on_moved.borrow().clone();
            if let Some(callback) = callback {
                callback(position);
            }
        });

        let weak = Rc::downgrade(&self.state);
        gesture.connect_drag_end(move |_, _, _| {
            if let Some(state) = weak.upgrade() {
                state.drag.borrow_mut().take();
            }
        });

        self.area.add_controller(gesture);
    }
}

/// Family used for flip-card digits
const FLIP_FONT_FAMILY: &str = FONT_CHOICES[0].1;

fn draw(state: &ViewState, cr: &cairo::Context, width: f64, height: f64) -> Result<(), cairo::Error> {
    let config = state.config.borrow();
    let face = state.face.borrow();

    config.background_color.apply_to_cairo(cr);
    cr.paint()?;

    let size_px = config.text_size.to_pixels(width);
    match face.flip_row() {
        Some(row) if face.mode().is_flip() => {
            let style = FlipStyle::for_text_color(config.text_color, FLIP_FONT_FAMILY, size_px);
            render_flip_row(cr, row, &style, width, height)?;
            state.text_bounds.set(None);
        }
        _ => {
            let font = FontSpec::new(config.font_family.clone(), size_px, false);
            let bounds = render_plain_clock(
                cr,
                face.text(),
                config.text_color,
                &font,
                config.clock_position,
                width,
                height,
            )?;
            state.text_bounds.set(Some(bounds));
        }
    }

    if config.klock_mode {
        render_progress_bar(cr, state.progress.get(), config.text_color, width, height)?;
    }
    Ok(())
}
