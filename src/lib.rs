//! klock: a full-screen decorative desk clock
//!
//! This library holds the GTK side of klock:
//! - configuration loading (JSON file plus command-line overrides)
//! - the glib-backed scheduler that drives the clock logic in `klock-core`
//! - the main window, clock drawing area, settings panel and controls

pub mod config;
pub mod core;
pub mod ui;

// Re-export commonly used types
pub use config::{AppConfig, WindowConfig};
pub use core::GlibScheduler;
