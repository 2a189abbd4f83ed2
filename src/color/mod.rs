mod spectrum;

pub use spectrum::{Spectrum, SpectrumError, SpectrumMode, MAX_COLORS, MAX_GAMMA};

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// A 24-bit RGB color
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "ColorValue")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::new(0xFF, 0xFF, 0xFF);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Unpack a `0xRRGGBB` value. Bits above the lower 24 are ignored.
    pub const fn from_rgb24(value: u32) -> Self {
        Self::new(((value >> 16) & 0xFF) as u8, ((value >> 8) & 0xFF) as u8, (value & 0xFF) as u8)
    }

    /// Pack as `0xRRGGBB`
    pub const fn to_rgb24(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Scale every channel by `factor`, truncating toward zero.
    pub fn scaled(self, factor: f32) -> Self {
        let factor = factor.max(0.0);
        // `as u8` saturates, so factors above 1.0 clip at 255
        let scale = |channel: u8| (factor * channel as f32) as u8;
        Self::new(scale(self.r), scale(self.g), scale(self.b))
    }

    /// The bitwise complement of this color
    pub const fn inverted(self) -> Self {
        Self::from_rgb24(self.to_rgb24() ^ 0xFF_FFFF)
    }
}

impl From<u32> for Color {
    fn from(value: u32) -> Self {
        Self::from_rgb24(value)
    }
}

impl From<Color> for u32 {
    fn from(color: Color) -> Self {
        color.to_rgb24()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = ColorError;

    /// Parses `#rrggbb`, `0xrrggbb` or a bare `rrggbb`.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let digits = trimmed
            .strip_prefix('#')
            .or_else(|| trimmed.strip_prefix("0x"))
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if digits.len() != 6 {
            return Err(ColorError::InvalidHex(input.to_string()));
        }
        let value = u32::from_str_radix(digits, 16).map_err(|_| ColorError::InvalidHex(input.to_string()))?;
        Ok(Self::from_rgb24(value))
    }
}

/// Errors that can occur when reading a color value
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ColorError {
    #[error("invalid hex color '{0}'")]
    InvalidHex(String),

    #[error("color value {0:#x} does not fit in 24 bits")]
    OutOfRange(u32),
}

/// Colors are accepted either as integers (`0x007070`) or hex strings (`"#007070"`)
#[derive(Deserialize)]
#[serde(untagged)]
enum ColorValue {
    Packed(u32),
    Hex(String),
}

impl TryFrom<ColorValue> for Color {
    type Error = ColorError;

    fn try_from(value: ColorValue) -> Result<Self, Self::Error> {
        match value {
            ColorValue::Packed(packed) if packed > 0xFF_FFFF => Err(ColorError::OutOfRange(packed)),
            ColorValue::Packed(packed) => Ok(Self::from_rgb24(packed)),
            ColorValue::Hex(hex) => hex.parse(),
        }
    }
}
