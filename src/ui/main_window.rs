//! Main application window
//!
//! Owns the single `ClockConfig` value and swaps it on every edit, pushing
//! the new value to the clock view, the settings panel and the refresh
//! sources that depend on it.

use gtk4::prelude::*;
use gtk4::{
    gdk, glib, graphene, Align, Application, ApplicationWindow, Box as GtkBox, Button,
    EventControllerKey, GestureClick, GestureDrag, Orientation, Overlay,
};
use log::{debug, info};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use klock_core::{
    ClockTicker, DragSession, FocusStopwatch, LocalTimeSource, Point, ProgressSampler, Scheduler,
    Size, TimeSource,
};
use klock_types::{ClockConfig, PanelPosition};

use super::clock_view::ClockView;
use super::controls::ControlsVisibility;
use super::settings_panel::{SettingsEvent, SettingsPanel};
use crate::config::AppConfig;
use crate::core::GlibScheduler;

/// Margin around the corner buttons
const BUTTON_MARGIN: i32 = 20;

struct AppState {
    window: ApplicationWindow,
    overlay: Overlay,
    config: RefCell<ClockConfig>,
    view: ClockView,
    panel: SettingsPanel,
    menu_open: Cell<bool>,
    controls: ControlsVisibility,
    settings_button: Button,
    focus_button: Button,
    ticker: ClockTicker,
    stopwatch: FocusStopwatch,
    progress: ProgressSampler,
    panel_drag: RefCell<Option<DragSession<PanelPosition>>>,
}

impl AppState {
    /// Replace the configuration with `update(current)` and apply it
    fn update_config(&self, update: impl FnOnce(&ClockConfig) -> ClockConfig) {
        let (old, new) = {
            let mut config = self.config.borrow_mut();
            let new = update(&config);
            if new == *config {
                return;
            }
            let old = std::mem::replace(&mut *config, new.clone());
            (old, new)
        };

        if old.klock_mode != new.klock_mode {
            info!("Klock mode {}", if new.klock_mode { "on" } else { "off" });
            self.progress.set_enabled(new.klock_mode);
        }
        if old.theme != new.theme {
            info!("Theme changed to {}", new.theme);
        }
        if old.panel_position != new.panel_position {
            self.place_panel(new.panel_position);
        }

        self.view.set_config(new.clone());
        self.panel.sync(&new);
    }

    fn handle_settings_event(&self, event: SettingsEvent) {
        debug!("Settings event: {:?}", event);
        match event {
            SettingsEvent::TextColor(color) => self.update_config(|c| c.with_text_color(color)),
            SettingsEvent::BackgroundColor(color) => {
                self.update_config(|c| c.with_background_color(color))
            }
            SettingsEvent::Font(family) => self.update_config(|c| c.with_font_family(family)),
            SettingsEvent::MovementMode(on) => self.update_config(|c| c.with_movement_mode(on)),
            SettingsEvent::TextSize(size) => self.update_config(|c| c.with_text_size(size)),
            SettingsEvent::KlockMode(on) => self.update_config(|c| c.with_klock_mode(on)),
            SettingsEvent::Theme(theme) => self.update_config(|c| c.with_theme(theme)),
            SettingsEvent::ToggleFullscreen => self.toggle_fullscreen(),
            SettingsEvent::Close => self.toggle_menu(),
        }
    }

    fn toggle_menu(&self) {
        let open = !self.menu_open.get();
        self.menu_open.set(open);
        if open {
            self.panel.reset_page();
            self.controls.hold();
        } else {
            self.controls.release();
        }
        self.panel.widget().set_visible(open);
        self.update_buttons();
    }

    fn toggle_focus(&self) {
        if self.stopwatch.toggle() {
            self.view.set_focus_elapsed(Some(self.stopwatch.elapsed_seconds()));
        } else {
            self.view.set_focus_elapsed(None);
        }
        self.update_buttons();
    }

    fn toggle_fullscreen(&self) {
        if self.window.is_fullscreen() {
            self.window.unfullscreen();
        } else {
            self.window.fullscreen();
        }
    }

    /// A click on the clock area. The controls are held while the menu is
    /// open, so this changes nothing until the menu closes.
    fn background_clicked(&self) {
        self.controls.poke();
    }

    fn update_buttons(&self) {
        let shown = self.controls.is_visible() || self.menu_open.get();
        self.settings_button.set_visible(shown);
        self.focus_button
            .set_visible(shown || self.stopwatch.is_active());
        self.focus_button.set_tooltip_text(Some(if self.stopwatch.is_active() {
            "Stop Focus Session"
        } else {
            "Start Focus Session"
        }));
    }

    fn place_panel(&self, position: PanelPosition) {
        let panel = self.panel.widget();
        panel.set_margin_top(position.top.round() as i32);
        panel.set_margin_end(position.right.round() as i32);
    }

    /// Whether an overlay-relative point lies on the panel's drag handle
    fn on_panel_handle(&self, x: f64, y: f64) -> bool {
        if !self.menu_open.get() {
            return false;
        }
        self.panel
            .drag_handle()
            .compute_bounds(&self.overlay)
            .is_some_and(|bounds| bounds.contains_point(&graphene::Point::new(x as f32, y as f32)))
    }

    fn shutdown(&self) {
        self.ticker.stop();
        self.stopwatch.stop();
        self.progress.set_enabled(false);
    }
}

/// The top-level clock window
pub struct MainWindow {
    window: ApplicationWindow,
}

impl MainWindow {
    pub fn new(app: &Application, app_config: &AppConfig) -> Self {
        let scheduler: Rc<dyn Scheduler> = Rc::new(GlibScheduler::new());
        let time_source: Rc<dyn TimeSource> = Rc::new(LocalTimeSource);
        let config = app_config.clock.clone();

        let window = ApplicationWindow::builder()
            .application(app)
            .title("Klock")
            .default_width(app_config.window.width)
            .default_height(app_config.window.height)
            .build();

        let overlay = Overlay::new();
        let view = ClockView::new(config.clone(), scheduler.clone());
        overlay.set_child(Some(view.widget()));

        let settings_button = Button::with_label("⚙️");
        settings_button.set_tooltip_text(Some("Settings"));
        settings_button.add_css_class("clock-control-button");
        let focus_button = Button::with_label("⏱️");
        focus_button.add_css_class("clock-control-button");

        let buttons = GtkBox::new(Orientation::Horizontal, 10);
        buttons.set_halign(Align::End);
        buttons.set_valign(Align::End);
        buttons.set_margin_end(BUTTON_MARGIN);
        buttons.set_margin_bottom(BUTTON_MARGIN);
        buttons.append(&focus_button);
        buttons.append(&settings_button);
        overlay.add_overlay(&buttons);

        let state = Rc::new_cyclic(|weak: &Weak<AppState>| {
            let panel_weak = weak.clone();
            let panel = SettingsPanel::new(&config, move |event| {
                if let Some(state) = panel_weak.upgrade() {
                    state.handle_settings_event(event);
                }
            });
            panel.widget().set_visible(false);
            overlay.add_overlay(panel.widget());

            AppState {
                window: window.clone(),
                overlay: overlay.clone(),
                config: RefCell::new(config.clone()),
                view,
                panel,
                menu_open: Cell::new(false),
                controls: ControlsVisibility::new(scheduler.clone()),
                settings_button: settings_button.clone(),
                focus_button: focus_button.clone(),
                ticker: ClockTicker::new(scheduler.clone(), time_source.clone()),
                stopwatch: FocusStopwatch::new(scheduler.clone()),
                progress: ProgressSampler::new(scheduler.clone(), time_source.clone()),
                panel_drag: RefCell::new(None),
            }
        });

        state.place_panel(config.panel_position);
        state.panel.set_fullscreen(app_config.window.fullscreen);
        state.update_buttons();

        Self::connect_sources(&state);
        Self::connect_controls(&state);
        Self::connect_panel_drag(&state);
        Self::connect_window(&state);

        window.set_child(Some(&overlay));
        if app_config.window.fullscreen {
            window.fullscreen();
        }

        Self { window }
    }

    pub fn present(&self) {
        self.window.present();
    }

    fn connect_sources(state: &Rc<AppState>) {
        let weak = Rc::downgrade(state);
        state.ticker.start(move |reading| {
            if let Some(state) = weak.upgrade() {
                state.view.set_wall(reading);
            }
        });

        let weak = Rc::downgrade(state);
        state.stopwatch.set_listener(move |elapsed| {
            if let Some(state) = weak.upgrade() {
                state.view.set_focus_elapsed(Some(elapsed));
            }
        });

        let weak = Rc::downgrade(state);
        state.progress.set_listener(move |fraction| {
            if let Some(state) = weak.upgrade() {
                state.view.set_progress(fraction);
            }
        });
        let klock_mode = state.config.borrow().klock_mode;
        state.progress.set_enabled(klock_mode);

        let weak = Rc::downgrade(state);
        state.view.connect_moved(move |position| {
            if let Some(state) = weak.upgrade() {
                state.update_config(|c| c.with_clock_position(position));
            }
        });
    }

    fn connect_controls(state: &Rc<AppState>) {
        let weak = Rc::downgrade(state);
        state.controls.set_listener(move |_visible| {
            if let Some(state) = weak.upgrade() {
                state.update_buttons();
            }
        });

        let weak = Rc::downgrade(state);
        state.settings_button.connect_clicked(move |_| {
            if let Some(state) = weak.upgrade() {
                state.toggle_menu();
            }
        });

        let weak = Rc::downgrade(state);
        state.focus_button.connect_clicked(move |_| {
            if let Some(state) = weak.upgrade() {
                state.toggle_focus();
            }
        });

        let click = GestureClick::new();
        let weak = Rc::downgrade(state);
        click.connect_released(move |_, _, _, _| {
            if let Some(state) = weak.upgrade() {
                state.background_clicked();
            }
        });
        state.view.widget().add_controller(click);
    }

    fn connect_panel_drag(state: &Rc<AppState>) {
        let gesture = GestureDrag::new();

        let weak = Rc::downgrade(state);
        gesture.connect_drag_begin(move |gesture, x, y| {
            let Some(state) = weak.upgrade() else {
                return;
            };
            if state.on_panel_handle(x, y) {
                let position = state.config.borrow().panel_position;
                *state.panel_drag.borrow_mut() = Some(DragSession::begin(Point::new(x, y), position));
                gesture.set_state(gtk4::EventSequenceState::Claimed);
            } else {
                gesture.set_state(gtk4::EventSequenceState::Denied);
            }
        });

        let weak = Rc::downgrade(state);
        gesture.connect_drag_update(move |gesture, offset_x, offset_y| {
            let Some(state) = weak.upgrade() else {
                return;
            };
            let Some((start_x, start_y)) = gesture.start_point() else {
                return;
            };
            let position = {
                let drag = state.panel_drag.borrow();
                let Some(session) = drag.as_ref() else {
                    return;
                };
                let window = Size::new(state.overlay.width() as f64, state.overlay.height() as f64);
                let panel = state.panel.widget();
                let panel = Size::new(panel.width() as f64, panel.height() as f64);
                session.panel_position_at(Point::new(start_x + offset_x, start_y + offset_y), window, panel)
            };
            state.update_config(|c| c.with_panel_position(position));
        });

        let weak = Rc::downgrade(state);
        gesture.connect_drag_end(move |_, _, _| {
            if let Some(state) = weak.upgrade() {
                state.panel_drag.borrow_mut().take();
            }
        });

        state.overlay.add_controller(gesture);
    }

    fn connect_window(state: &Rc<AppState>) {
        let weak = Rc::downgrade(state);
        state.window.connect_fullscreened_notify(move |window| {
            if let Some(state) = weak.upgrade() {
                state.panel.set_fullscreen(window.is_fullscreen());
            }
        });

        let key = EventControllerKey::new();
        let weak = Rc::downgrade(state);
        key.connect_key_pressed(move |_, keyval, _, _| {
            let Some(state) = weak.upgrade() else {
                return glib::Propagation::Proceed;
            };
            if keyval == gdk::Key::F11 {
                state.toggle_fullscreen();
                glib::Propagation::Stop
            } else if keyval == gdk::Key::Escape && state.window.is_fullscreen() {
                state.window.unfullscreen();
                glib::Propagation::Stop
            } else {
                glib::Propagation::Proceed
            }
        });
        state.window.add_controller(key);

        // The window's close handler holds the only strong reference
        let strong = state.clone();
        state.window.connect_close_request(move |_| {
            info!("Window closing");
            strong.shutdown();
            glib::Propagation::Proceed
        });
    }
}
