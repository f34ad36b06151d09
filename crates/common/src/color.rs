use crate::error::WireError;
use crate::PackedValue;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use std::str::FromStr;

/// high byte set on a packed color means "enabled"
pub const COLOR_ENABLED_MARKER: PackedValue = 0x0100_0000;
pub const COLOR_MARKER_MASK: PackedValue = 0xFF00_0000;
pub const COLOR_RGB_MASK: PackedValue = 0x00FF_FFFF;

/// An RGB color as it travels inside a packed parameter.
///
/// Packed layout is `0xMMRRGGBB` where `MM` is the enabled marker. Writers always use `0x01`,
/// readers accept any nonzero marker since older modules wrote `0xFF`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);

    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Parse `#rrggbb` (the leading `#` is optional, digits are case insensitive).
    pub fn from_hex(text: &str) -> Result<Self, WireError> {
        let digits = text.trim();
        let digits = digits.strip_prefix('#').unwrap_or(digits);
        let mut rgb = [0u8; 3];
        hex::decode_to_slice(digits, &mut rgb)
            .map_err(|_| WireError::InvalidColor(text.to_string()))?;
        Ok(Self::rgb(rgb[0], rgb[1], rgb[2]))
    }

    /// Lowercase `#rrggbb`.
    pub fn to_hex(&self) -> String {
        format!("#{}", hex::encode([self.red, self.green, self.blue]))
    }

    pub const fn pack(&self) -> PackedValue {
        COLOR_ENABLED_MARKER
            | ((self.red as PackedValue) << 16)
            | ((self.green as PackedValue) << 8)
            | (self.blue as PackedValue)
    }

    /// Reads the low 24 bits, the marker byte is ignored.
    pub fn unpack(value: PackedValue) -> Self {
        Self::rgb(
            ((value & 0x00FF_0000) >> 16) as u8,
            ((value & 0x0000_FF00) >> 8) as u8,
            (value & 0x0000_00FF) as u8,
        )
    }

    pub fn is_enabled(value: PackedValue) -> bool {
        value & COLOR_MARKER_MASK != 0
    }

    pub const fn pack_optional(color: Option<Color>) -> PackedValue {
        match color {
            Some(color) => color.pack(),
            None => 0,
        }
    }

    pub fn unpack_optional(value: PackedValue) -> Option<Color> {
        Self::is_enabled(value).then(|| Self::unpack(value))
    }
}

impl FromStr for Color {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Color::from_hex(&text).map_err(serde::de::Error::custom)
    }
}
