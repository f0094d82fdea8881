//! Color values and hex parsing.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use tiny_skia::Color;

use crate::error::ShowcaseError;

/// Straight (non-premultiplied) 8-bit RGBA color. `const`-constructible so it
/// can live in static layout tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba8(pub u8, pub u8, pub u8, pub u8);

impl Rgba8 {
    pub const WHITE: Rgba8 = Rgba8(255, 255, 255, 255);
    pub const BLACK: Rgba8 = Rgba8(0, 0, 0, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Rgba8(r, g, b, 255)
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Rgba8(self.0, self.1, self.2, a)
    }

    pub fn to_color(self) -> Color {
        Color::from_rgba8(self.0, self.1, self.2, self.3)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    pub fn parse_hex(s: &str) -> Result<Self, ShowcaseError> {
        let hex = s.trim().trim_start_matches('#');
        let invalid = || ShowcaseError::InvalidValue(format!("invalid color '{}'", s));

        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());

        match hex.len() {
            3 => {
                let nib = |i: usize| {
                    u8::from_str_radix(&hex[i..i + 1], 16)
                        .map(|v| v * 17)
                        .map_err(|_| invalid())
                };
                Ok(Rgba8(nib(0)?, nib(1)?, nib(2)?, 255))
            }
            6 => Ok(Rgba8(byte(0)?, byte(2)?, byte(4)?, 255)),
            8 => Ok(Rgba8(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Rgba8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.3 == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.0, self.1, self.2, self.3)
        }
    }
}

impl FromStr for Rgba8 {
    type Err = ShowcaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rgba8::parse_hex(s)
    }
}

impl Serialize for Rgba8 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Rgba8 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rgba8::parse_hex(&s).map_err(serde::de::Error::custom)
    }
}
