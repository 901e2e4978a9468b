//! Theme colours handed to panels when they build their views.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Errors produced while reading theme values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ThemeError {
    /// A colour string was not `#RRGGBB` or `#RGB`.
    #[error("invalid color '{0}': expected #RRGGBB or #RGB")]
    InvalidColor(String),
}

/// An opaque 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB`, `RRGGBB`, `#RGB` or `RGB`.
    pub fn from_hex(hex: &str) -> Result<Self, ThemeError> {
        let invalid = || ThemeError::InvalidColor(hex.to_string());
        let digits = hex.trim().trim_start_matches('#');
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        match digits.len() {
            6 => {
                let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16);
                match (channel(0), channel(2), channel(4)) {
                    (Ok(r), Ok(g), Ok(b)) => Ok(Self::rgb(r, g, b)),
                    _ => Err(invalid()),
                }
            }
            3 => {
                // #abc expands to #aabbcc
                let channel = |i: usize| u8::from_str_radix(&digits[i..i + 1], 16).map(|v| v * 17);
                match (channel(0), channel(1), channel(2)) {
                    (Ok(r), Ok(g), Ok(b)) => Ok(Self::rgb(r, g, b)),
                    _ => Err(invalid()),
                }
            }
            _ => Err(invalid()),
        }
    }

    /// `#RRGGBB`, upper case.
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Color {
    type Error = ThemeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// The accent colours of an application.
///
/// A `Theme` is a plain value: it is built once (usually from
/// [`UiSettings`](crate::panel::UiSettings)) and passed to every panel
/// through its [`PanelContext`](crate::panel::PanelContext).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub primary: Color,
    pub success: Color,
    pub error: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary: Color::rgb(0x16, 0x77, 0xFF),
            success: Color::rgb(0x52, 0xC4, 0x1A),
            error: Color::rgb(0xFF, 0x4D, 0x4F),
        }
    }
}

impl Theme {
    pub fn with_primary(mut self, color: Color) -> Self {
        self.primary = color;
        self
    }

    pub fn with_success(mut self, color: Color) -> Self {
        self.success = color;
        self
    }

    pub fn with_error(mut self, color: Color) -> Self {
        self.error = color;
        self
    }
}
