//! Error types for parsing user-supplied presentation values

use thiserror::Error;

/// Errors produced when parsing colors, themes and sizes from strings
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid color '{0}': expected #rrggbb or #rrggbbaa")]
    InvalidColor(String),

    #[error("Unknown theme '{0}': expected default, flip or flip-basic")]
    UnknownTheme(String),

    #[error("Invalid text size '{0}': expected e.g. 18vw, 96px or 96")]
    InvalidTextSize(String),
}
