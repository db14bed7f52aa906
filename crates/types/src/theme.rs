//! Theme selector and the display modes it maps to

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// User-facing theme selector
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(try_from = "String")]
pub enum Theme {
    #[serde(rename = "default")]
    #[default]
    Default,
    #[serde(rename = "flip")]
    Flip,
    #[serde(rename = "flip-basic")]
    FlipBasic,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Default, Theme::Flip, Theme::FlipBasic];

    /// Config/CLI name
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Default => "default",
            Theme::Flip => "flip",
            Theme::FlipBasic => "flip-basic",
        }
    }

    /// Human-readable label for the settings panel
    pub fn label(&self) -> &'static str {
        match self {
            Theme::Default => "Default",
            Theme::Flip => "Flip",
            Theme::FlipBasic => "Flip Basic",
        }
    }

    pub fn display_mode(&self) -> DisplayMode {
        match self {
            Theme::Default => DisplayMode::PlainDigital,
            Theme::Flip => DisplayMode::FlipFull,
            Theme::FlipBasic => DisplayMode::FlipMinimal,
        }
    }

    /// Font family and drag-to-move only apply to the plain face
    pub fn supports_free_text(&self) -> bool {
        matches!(self, Theme::Default)
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        // Anything starting with "default" selects the plain face
        if s.starts_with("default") {
            return Ok(Theme::Default);
        }
        match s {
            "flip" => Ok(Theme::Flip),
            "flip-basic" => Ok(Theme::FlipBasic),
            other => Err(ParseError::UnknownTheme(other.to_string())),
        }
    }
}

impl TryFrom<String> for Theme {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Which face is rendered and how many digit groups it shows
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DisplayMode {
    #[serde(rename = "plain-digital")]
    PlainDigital,
    /// Hours and minutes only
    #[serde(rename = "flip-minimal")]
    FlipMinimal,
    /// Hours, minutes and seconds
    #[serde(rename = "flip-full")]
    FlipFull,
}

impl DisplayMode {
    /// Whether the seconds group is rendered.
    ///
    /// The plain face drops seconds only in klock mode; the flip faces ignore
    /// klock mode entirely.
    pub fn shows_seconds(&self, klock_mode: bool) -> bool {
        match self {
            DisplayMode::PlainDigital => !klock_mode,
            DisplayMode::FlipMinimal => false,
            DisplayMode::FlipFull => true,
        }
    }

    pub fn is_flip(&self) -> bool {
        !matches!(self, DisplayMode::PlainDigital)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_parse() {
        assert_eq!("flip".parse::<Theme>().unwrap(), Theme::Flip);
        assert_eq!("flip-basic".parse::<Theme>().unwrap(), Theme::FlipBasic);
        assert_eq!("default".parse::<Theme>().unwrap(), Theme::Default);
        assert_eq!("default-dark".parse::<Theme>().unwrap(), Theme::Default);
        assert!(matches!(
            "neon".parse::<Theme>(),
            Err(ParseError::UnknownTheme(_))
        ));
    }

    #[test]
    fn test_theme_serialization() {
        let json = serde_json::to_string(&Theme::FlipBasic).unwrap();
        assert_eq!(json, "\"flip-basic\"");
        let back: Theme = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Theme::FlipBasic);
    }

    #[test]
    fn test_theme_deserialize_matches_parse() {
        let theme: Theme = serde_json::from_str("\"default-dark\"").unwrap();
        assert_eq!(theme, Theme::Default);
        let theme: Theme = serde_json::from_str("\"flip\"").unwrap();
        assert_eq!(theme, Theme::Flip);
        assert!(serde_json::from_str::<Theme>("\"neon\"").is_err());
    }

    #[test]
    fn test_display_mode_seconds() {
        assert!(DisplayMode::PlainDigital.shows_seconds(false));
        assert!(!DisplayMode::PlainDigital.shows_seconds(true));
        assert!(!DisplayMode::FlipMinimal.shows_seconds(false));
        assert!(DisplayMode::FlipFull.shows_seconds(true));
    }

    #[test]
    fn test_theme_maps_to_mode() {
        assert_eq!(Theme::Default.display_mode(), DisplayMode::PlainDigital);
        assert_eq!(Theme::Flip.display_mode(), DisplayMode::FlipFull);
        assert_eq!(Theme::FlipBasic.display_mode(), DisplayMode::FlipMinimal);
        assert!(Theme::Flip.display_mode().is_flip());
    }
}
