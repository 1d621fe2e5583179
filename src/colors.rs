use crossterm::style::Color;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

/// 24-bit colour, written `#rrggbb` in settings files
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn from_hex(hex: u32) -> Self {
        Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    pub fn to_color(self) -> Color {
        Color::Rgb { r: self.0, g: self.1, b: self.2 }
    }

    /// Scale towards black, `factor` in [0, 1]
    pub fn dim(self, factor: f32) -> Self {
        let f = factor.clamp(0.0, 1.0);
        let scale = |c: u8| (c as f32 * f).round() as u8;
        Rgb(scale(self.0), scale(self.1), scale(self.2))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let hex = trimmed
            .strip_prefix('#')
            .or_else(|| trimmed.strip_prefix("0x"))
            .unwrap_or(trimmed);
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(format!("expected 6 hex digits, got '{s}'"));
        }
        u32::from_str_radix(hex, 16)
            .map(Rgb::from_hex)
            .map_err(|_| format!("invalid hex colour '{s}'"))
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Colours used when drawing the globe
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub dot: Rgb,
    pub globe: Rgb,
    pub path: Rgb,
    pub highlight: Rgb,
    pub tooltip_text: Rgb,
    pub tooltip_border: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            dot: Rgb::from_hex(0x376fff),
            globe: Rgb::from_hex(0x0b122e),
            path: Rgb::from_hex(0x00e1c6),
            highlight: Rgb::from_hex(0xffffff),
            tooltip_text: Rgb::from_hex(0xffffff),
            tooltip_border: Rgb::from_hex(0x6b718a),
        }
    }
}
