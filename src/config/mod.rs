//! Configuration management

mod settings;

pub use settings::{resolve_font_family, AppConfig, ConfigOverrides, WindowConfig};
