//! Application configuration
//!
//! The configuration file is optional and read-only: klock never writes it.
//! Command-line flags are layered on top of whatever the file provides.

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use klock_types::config::FONT_CHOICES;
use klock_types::{ClockConfig, Color, TextSize, Theme};

/// Application-wide configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Version of the config format
    #[serde(default = "default_version")]
    pub version: u32,
    /// Window dimensions and state
    #[serde(default)]
    pub window: WindowConfig,
    /// Initial clock presentation
    #[serde(default)]
    pub clock: ClockConfig,
}

fn default_version() -> u32 {
    1
}

impl AppConfig {
    /// Load the configuration, falling back to defaults.
    ///
    /// `explicit` is a path given on the command line; without one the
    /// platform config directory is searched. A missing file means defaults;
    /// an unreadable or malformed one is logged and also means defaults.
    pub fn load(explicit: Option<&Path>) -> Self {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match Self::config_path() {
                Ok(path) => path,
                Err(e) => {
                    warn!("{:#}", e);
                    return Self::default();
                }
            },
        };

        if explicit.is_none() && !path.exists() {
            info!("No config file at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::load_from_path(&path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring config file: {:#}", e);
                Self::default()
            }
        }
    }

    /// Load configuration from a specific file path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("org", "klock", "klock")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.json"))
    }

    /// Apply command-line overrides on top of the loaded values
    pub fn with_overrides(&self, overrides: &ConfigOverrides) -> Self {
        let mut clock = self.clock.clone();
        if let Some(theme) = overrides.theme {
            clock = clock.with_theme(theme);
        }
        if let Some(color) = overrides.text_color {
            clock = clock.with_text_color(color);
        }
        if let Some(color) = overrides.background_color {
            clock = clock.with_background_color(color);
        }
        if let Some(font) = &overrides.font {
            clock = clock.with_font_family(resolve_font_family(font));
        }
        if let Some(size) = &overrides.text_size {
            clock = clock.with_text_size(size.clone());
        }
        if overrides.klock_mode {
            clock = clock.with_klock_mode(true);
        }

        let mut window = self.window.clone();
        if overrides.fullscreen {
            window.fullscreen = true;
        }

        Self {
            version: self.version,
            window,
            clock,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            window: WindowConfig::default(),
            clock: ClockConfig::default(),
        }
    }
}

/// Window configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WindowConfig {
    pub width: i32,
    pub height: i32,
    /// Start in fullscreen mode
    #[serde(default)]
    pub fullscreen: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 600,
            fullscreen: false,
        }
    }
}

/// Values given on the command line, each overriding the file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub theme: Option<Theme>,
    pub text_color: Option<Color>,
    pub background_color: Option<Color>,
    pub font: Option<String>,
    pub text_size: Option<TextSize>,
    pub klock_mode: bool,
    pub fullscreen: bool,
}

/// Map a settings-menu font label to its Pango family list.
///
/// Anything that is not one of the menu labels is taken as a family name.
pub fn resolve_font_family(font: &str) -> String {
    FONT_CHOICES
        .iter()
        .find(|(label, _)| label.eq_ignore_ascii_case(font))
        .map(|(_, family)| family.to_string())
        .unwrap_or_else(|| font.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use klock_types::{ClockPosition, PanelPosition};

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("klock-test-{}-{}", std::process::id(), name));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.version, 1);
        assert!(!config.window.fullscreen);
        assert_eq!(config.clock, ClockConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let json = r##"{ "clock": { "theme": "flip", "text_color": "#ffffff" } }"##;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.clock.theme, Theme::Flip);
        assert_eq!(config.clock.text_color, Color::from_rgba8(255, 255, 255, 255));
        assert_eq!(config.clock.clock_position, ClockPosition::default());
        assert_eq!(config.clock.panel_position, PanelPosition::default());
        assert_eq!(config.window, WindowConfig::default());
    }

    #[test]
    fn test_load_from_path() {
        let path = temp_file("good.json", r#"{ "window": { "width": 800, "height": 480, "fullscreen": true } }"#);
        let config = AppConfig::load(Some(&path));
        std::fs::remove_file(&path).ok();
        assert_eq!(config.window.width, 800);
        assert!(config.window.fullscreen);
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let path = temp_file("bad.json", "{ not json");
        assert!(AppConfig::load_from_path(&path).is_err());
        let config = AppConfig::load(Some(&path));
        std::fs::remove_file(&path).ok();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_missing_explicit_file_gives_defaults() {
        let path = std::env::temp_dir().join("klock-test-does-not-exist.json");
        assert_eq!(AppConfig::load(Some(&path)), AppConfig::default());
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let base = AppConfig::default();
        let overrides = ConfigOverrides {
            theme: Some(Theme::FlipBasic),
            background_color: Some(Color::from_rgba8(0, 0, 0, 255)),
            font: Some("georgia".to_string()),
            text_size: Some(TextSize::ViewportWidth(10.0)),
            klock_mode: true,
            fullscreen: true,
            ..Default::default()
        };
        let config = base.with_overrides(&overrides);

        assert_eq!(config.clock.theme, Theme::FlipBasic);
        assert_eq!(config.clock.background_color, Color::from_rgba8(0, 0, 0, 255));
        assert_eq!(config.clock.font_family, "Georgia, Serif");
        assert_eq!(config.clock.text_size, TextSize::ViewportWidth(10.0));
        assert!(config.clock.klock_mode);
        assert!(config.window.fullscreen);
        // Untouched values stay
        assert_eq!(config.clock.text_color, base.clock.text_color);
        // The base is not modified
        assert_eq!(base, AppConfig::default());
    }

    #[test]
    fn test_no_overrides_is_identity() {
        let base = AppConfig::default();
        assert_eq!(base.with_overrides(&ConfigOverrides::default()), base);
    }

    #[test]
    fn test_resolve_font_family() {
        assert_eq!(resolve_font_family("System Default"), "Sans");
        assert_eq!(resolve_font_family("Courier New"), "Courier New, Courier, Monospace");
        assert_eq!(resolve_font_family("DejaVu Sans Mono"), "DejaVu Sans Mono");
    }
}
