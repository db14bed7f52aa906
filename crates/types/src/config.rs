//! Immutable clock configuration
//!
//! `ClockConfig` holds every user-adjustable presentation value and mode
//! flag. It is never mutated in place: each `with_*` method returns an
//! updated copy, and the composition root swaps the whole value.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::color::Color;
use crate::error::ParseError;
use crate::theme::Theme;

/// Font choices offered by the settings panel: (label, Pango family list)
pub const FONT_CHOICES: [(&str, &str); 6] = [
    ("System Default", "Sans"),
    ("Arial", "Arial, Helvetica, Sans"),
    ("Verdana", "Verdana, Geneva, Sans"),
    ("Times New Roman", "Times New Roman, Times, Serif"),
    ("Courier New", "Courier New, Courier, Monospace"),
    ("Georgia", "Georgia, Serif"),
];

/// Range of the text size slider, in percent of the window width
pub const TEXT_SIZE_VW_RANGE: (f64, f64) = (1.0, 30.0);

/// Fallback pixel size when a size string can't be interpreted
pub const FALLBACK_TEXT_SIZE_PX: f64 = 96.0;

/// Clock text size.
///
/// Sizes arrive as strings (`18vw`, `96px`, `96`). Strings that don't parse
/// are kept verbatim and rendered at the fallback size.
#[derive(Debug, Clone, PartialEq)]
pub enum TextSize {
    /// Percent of the window width
    ViewportWidth(f64),
    Pixels(f64),
    Raw(String),
}

impl TextSize {
    /// Parse without failing; unknown strings become `Raw`
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_else(|_| TextSize::Raw(s.to_string()))
    }

    /// Resolve to a pixel size for a window of the given width
    pub fn to_pixels(&self, window_width: f64) -> f64 {
        match self {
            TextSize::ViewportWidth(vw) => window_width * vw / 100.0,
            TextSize::Pixels(px) => *px,
            TextSize::Raw(_) => FALLBACK_TEXT_SIZE_PX,
        }
    }

    /// Slider value in vw, if this size is expressed in vw
    pub fn as_vw(&self) -> Option<f64> {
        match self {
            TextSize::ViewportWidth(vw) => Some(*vw),
            _ => None,
        }
    }
}

impl Default for TextSize {
    fn default() -> Self {
        TextSize::ViewportWidth(18.0)
    }
}

impl FromStr for TextSize {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidTextSize(s.to_string());
        let t = s.trim();
        let (number, make): (&str, fn(f64) -> TextSize) = if let Some(n) = t.strip_suffix("vw") {
            (n, TextSize::ViewportWidth)
        } else if let Some(n) = t.strip_suffix("px") {
            (n, TextSize::Pixels)
        } else {
            (t, TextSize::Pixels)
        };

        let value: f64 = number.trim().parse().map_err(|_| invalid())?;
        if !value.is_finite() || value <= 0.0 {
            return Err(invalid());
        }
        Ok(make(value))
    }
}

impl fmt::Display for TextSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextSize::ViewportWidth(vw) => write!(f, "{}vw", vw),
            TextSize::Pixels(px) => write!(f, "{}px", px),
            TextSize::Raw(s) => f.write_str(s),
        }
    }
}

impl Serialize for TextSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TextSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(TextSize::parse_lenient(&s))
    }
}

/// Clock center, as percentages of the parent size
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ClockPosition {
    pub top: f64,
    pub left: f64,
}

impl Default for ClockPosition {
    fn default() -> Self {
        Self {
            top: 50.0,
            left: 50.0,
        }
    }
}

/// Settings panel offset from the window's top-right corner, in pixels
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PanelPosition {
    pub top: f64,
    pub right: f64,
}

impl Default for PanelPosition {
    fn default() -> Self {
        Self {
            top: 20.0,
            right: 20.0,
        }
    }
}

/// Complete presentation configuration for the clock
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClockConfig {
    #[serde(default = "default_text_color")]
    pub text_color: Color,
    #[serde(default = "default_background_color")]
    pub background_color: Color,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default)]
    pub text_size: TextSize,
    /// Hide seconds and show the minute progress bar
    #[serde(default)]
    pub klock_mode: bool,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub clock_position: ClockPosition,
    #[serde(default)]
    pub panel_position: PanelPosition,
    /// Clock text can be dragged around the window
    #[serde(default)]
    pub movement_mode: bool,
}

fn default_text_color() -> Color {
    Color::from_rgba8(0x33, 0x33, 0x33, 0xff)
}

fn default_background_color() -> Color {
    Color::from_rgba8(0xf0, 0xf0, 0xf0, 0xff)
}

fn default_font_family() -> String {
    FONT_CHOICES[0].1.to_string()
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            text_color: default_text_color(),
            background_color: default_background_color(),
            font_family: default_font_family(),
            text_size: TextSize::default(),
            klock_mode: false,
            theme: Theme::Default,
            clock_position: ClockPosition::default(),
            panel_position: PanelPosition::default(),
            movement_mode: false,
        }
    }
}

impl ClockConfig {
    pub fn with_text_color(&self, text_color: Color) -> Self {
        Self {
            text_color,
            ..self.clone()
        }
    }

    pub fn with_background_color(&self, background_color: Color) -> Self {
        Self {
            background_color,
            ..self.clone()
        }
    }

    pub fn with_font_family(&self, font_family: impl Into<String>) -> Self {
        Self {
            font_family: font_family.into(),
            ..self.clone()
        }
    }

    pub fn with_text_size(&self, text_size: TextSize) -> Self {
        Self {
            text_size,
            ..self.clone()
        }
    }

    pub fn with_klock_mode(&self, klock_mode: bool) -> Self {
        Self {
            klock_mode,
            ..self.clone()
        }
    }

    pub fn with_theme(&self, theme: Theme) -> Self {
        Self {
            theme,
            ..self.clone()
        }
    }

    pub fn with_clock_position(&self, clock_position: ClockPosition) -> Self {
        Self {
            clock_position,
            ..self.clone()
        }
    }

    pub fn with_panel_position(&self, panel_position: PanelPosition) -> Self {
        Self {
            panel_position,
            ..self.clone()
        }
    }

    pub fn with_movement_mode(&self, movement_mode: bool) -> Self {
        Self {
            movement_mode,
            ..self.clone()
        }
    }

    /// Dragging is only offered on the plain face
    pub fn is_draggable(&self) -> bool {
        self.movement_mode && self.theme.supports_free_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_size_parse() {
        assert_eq!("18vw".parse::<TextSize>().unwrap(), TextSize::ViewportWidth(18.0));
        assert_eq!("96px".parse::<TextSize>().unwrap(), TextSize::Pixels(96.0));
        assert_eq!(" 72 ".parse::<TextSize>().unwrap(), TextSize::Pixels(72.0));
        assert!("huge".parse::<TextSize>().is_err());
        assert!("-3vw".parse::<TextSize>().is_err());
    }

    #[test]
    fn test_text_size_passthrough() {
        let size = TextSize::parse_lenient("clamp(1rem, 5vw, 3rem)");
        assert_eq!(size, TextSize::Raw("clamp(1rem, 5vw, 3rem)".to_string()));
        assert_eq!(size.to_string(), "clamp(1rem, 5vw, 3rem)");
        assert_eq!(size.to_pixels(1000.0), FALLBACK_TEXT_SIZE_PX);
    }

    #[test]
    fn test_text_size_to_pixels() {
        assert!((TextSize::ViewportWidth(18.0).to_pixels(1000.0) - 180.0).abs() < 1e-9);
        assert_eq!(TextSize::Pixels(40.0).to_pixels(1000.0), 40.0);
    }

    #[test]
    fn test_with_methods_leave_original_untouched() {
        let base = ClockConfig::default();
        let flipped = base.with_theme(Theme::Flip).with_klock_mode(true);

        assert_eq!(base.theme, Theme::Default);
        assert!(!base.klock_mode);
        assert_eq!(flipped.theme, Theme::Flip);
        assert!(flipped.klock_mode);
        assert_eq!(flipped.text_color, base.text_color);
    }

    #[test]
    fn test_draggable_requires_default_theme() {
        let cfg = ClockConfig::default().with_movement_mode(true);
        assert!(cfg.is_draggable());
        assert!(!cfg.with_theme(Theme::FlipBasic).is_draggable());
    }

    #[test]
    fn test_config_serialization() {
        let cfg = ClockConfig::default()
            .with_theme(Theme::FlipBasic)
            .with_text_size(TextSize::Pixels(120.0));
        let json = serde_json::to_string_pretty(&cfg).unwrap();
        assert!(json.contains("\"theme\": \"flip-basic\""));
        assert!(json.contains("\"text_size\": \"120px\""));
        assert!(json.contains("\"text_color\": \"#333333\""));

        let back: ClockConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn test_config_partial_json_uses_defaults() {
        let cfg: ClockConfig = serde_json::from_str(r#"{ "klock_mode": true }"#).unwrap();
        assert!(cfg.klock_mode);
        assert_eq!(cfg.theme, Theme::Default);
        assert_eq!(cfg.clock_position, ClockPosition::default());
        assert_eq!(cfg.panel_position, PanelPosition::default());
    }
}
