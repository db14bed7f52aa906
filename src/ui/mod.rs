//! UI components

mod clock_view;
mod controls;
mod main_window;
mod settings_panel;

pub use clock_view::ClockView;
pub use controls::ControlsVisibility;
pub use main_window::MainWindow;
pub use settings_panel::{SettingsEvent, SettingsPanel};
