use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ScanError;

/// RGBA colour written as `#RRGGBB` or `#RRGGBBAA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
}

impl FromStr for Color {
    type Err = ScanError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ScanError::InvalidConfig(format!("invalid colour '{value}'"));
        let hex = value.strip_prefix('#').ok_or_else(invalid)?;
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        let a = if hex.len() == 8 { channel(6)? } else { 0xFF };
        Ok(Color::rgba(channel(0)?, channel(2)?, channel(4)?, a))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brush {
    pub fill: Color,
    pub stroke: Color,
    pub stroke_width: f32,
}

/// Look of the selection overlay, fixed for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverlayStyle {
    pub reticle: Color,
    pub aimed: Brush,
    pub selected: Brush,
    pub should_show_hints: bool,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            reticle: Color::rgba(0xFF, 0xFF, 0xFF, 0xFF),
            aimed: Brush {
                fill: Color::TRANSPARENT,
                stroke: Color::rgba(0xFF, 0xFF, 0xFF, 0xFF),
                stroke_width: 2.0,
            },
            selected: Brush {
                fill: Color::rgba(0x0A, 0x84, 0xFF, 0x33),
                stroke: Color::rgba(0x0A, 0x84, 0xFF, 0xFF),
                stroke_width: 3.0,
            },
            should_show_hints: false,
        }
    }
}
