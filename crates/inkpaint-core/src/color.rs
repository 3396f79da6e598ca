//! Opaque RGB colors and their `#rrggbb` text form.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a color token is not `#RGB` or `#RRGGBB`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color `{0}`: expected #RGB or #RRGGBB")]
pub struct ColorParseError(pub String);

/// An opaque 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a hex color. Hex digits are case-insensitive; in the 3-digit
    /// form each nibble is duplicated (`#f80` == `#ff8800`).
    pub fn from_hex(text: &str) -> Result<Self, ColorParseError> {
        let err = || ColorParseError(text.to_string());
        let hex = text.trim().strip_prefix('#').ok_or_else(err)?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err());
        }
        match hex.len() {
            3 => {
                let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map(|v| v * 17);
                Ok(Self::new(
                    nibble(0).map_err(|_| err())?,
                    nibble(1).map_err(|_| err())?,
                    nibble(2).map_err(|_| err())?,
                ))
            }
            6 => {
                let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
                Ok(Self::new(
                    byte(0).map_err(|_| err())?,
                    byte(2).map_err(|_| err())?,
                    byte(4).map_err(|_| err())?,
                ))
            }
            _ => Err(err()),
        }
    }

    /// Parse an optional color where the literal `none` means "no color".
    pub fn parse_optional(text: &str) -> Result<Option<Self>, ColorParseError> {
        if text.trim().eq_ignore_ascii_case("none") {
            Ok(None)
        } else {
            Self::from_hex(text).map(Some)
        }
    }

    /// Canonical lowercase `#rrggbb` form.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}
