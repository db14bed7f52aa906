//! klock-types: Shared data types for the klock desk clock.
//!
//! This crate contains pure data types (colors, themes, readings, the
//! immutable clock configuration) shared across all klock crates. These
//! types have no GTK or Cairo dependencies unless the `gtk` feature is on,
//! making them suitable as a foundation layer.

pub mod color;
pub mod config;
pub mod error;
pub mod reading;
pub mod theme;

// Re-export commonly used types at the crate root for convenience
pub use color::Color;
pub use config::{ClockConfig, ClockPosition, PanelPosition, TextSize};
pub use error::ParseError;
pub use reading::ClockReading;
pub use theme::{DisplayMode, Theme};
