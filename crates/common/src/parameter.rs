use crate::color::Color;
use crate::error::WireError;
use crate::PackedValue;
use serde_json::Value;

/// What a disabled optional color shows in its color control.
pub const DISABLED_COLOR_DISPLAY: &str = "#ffffff";

/// The three layouts a parameter slot can have.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParameterShape {
    /// plain integer
    Simple,
    /// `0x01RRGGBB`
    Color,
    /// an enable toggle and a color sharing one slot, `0x00000000` while disabled
    ColorWithEnable {
        /// host-facing name of the companion toggle control
        toggle: &'static str,
    },
}

/// The value a host control shows for one parameter slot.
///
/// A `ColorWithEnable` slot is presented as two controls, so its display carries both the toggle
/// and the color text: serializing the toggle has to read the companion color.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DisplayValue {
    Number(String),
    Color(String),
    OptionalColor { enabled: bool, color: String },
}

pub fn serialize_integer(raw: &str) -> Result<PackedValue, WireError> {
    raw.trim()
        .parse::<PackedValue>()
        .map_err(|_| WireError::InvalidInteger(raw.to_string()))
}

pub fn deserialize_integer(value: PackedValue) -> String {
    value.to_string()
}

pub fn serialize_color(raw: &str) -> Result<PackedValue, WireError> {
    Ok(Color::from_hex(raw)?.pack())
}

pub fn deserialize_color(value: PackedValue) -> String {
    Color::unpack(value).to_hex()
}

/// The toggle wins: a disabled slot packs to zero whatever the color control holds.
pub fn serialize_enabled_color(enabled: bool, raw_color: &str) -> Result<PackedValue, WireError> {
    if !enabled {
        return Ok(0);
    }
    serialize_color(raw_color)
}

pub fn deserialize_enabled(value: PackedValue) -> bool {
    Color::is_enabled(value)
}

pub fn deserialize_optional_color(value: PackedValue) -> String {
    match Color::unpack_optional(value) {
        Some(color) => color.to_hex(),
        None => DISABLED_COLOR_DISPLAY.to_string(),
    }
}

impl ParameterShape {
    pub fn name(&self) -> &'static str {
        match self {
            ParameterShape::Simple => "number",
            ParameterShape::Color => "color",
            ParameterShape::ColorWithEnable { .. } => "optional color",
        }
    }

    /// The display value a freshly fetched packed value should show.
    pub fn deserialize(&self, value: PackedValue) -> DisplayValue {
        match self {
            ParameterShape::Simple => DisplayValue::Number(deserialize_integer(value)),
            ParameterShape::Color => DisplayValue::Color(deserialize_color(value)),
            ParameterShape::ColorWithEnable { .. } => DisplayValue::OptionalColor {
                enabled: deserialize_enabled(value),
                color: deserialize_optional_color(value),
            },
        }
    }
}

/// One row of a parameter table. The wire index is the row's position in its table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ParameterDescriptor {
    /// host-facing name, also the key in skin documents
    pub key: &'static str,
    pub shape: ParameterShape,
    /// module default in packed form
    pub default: PackedValue,
}

impl ParameterDescriptor {
    pub const fn simple(key: &'static str, default: PackedValue) -> Self {
        Self {
            key,
            shape: ParameterShape::Simple,
            default,
        }
    }

    pub const fn color(key: &'static str, default: Color) -> Self {
        Self {
            key,
            shape: ParameterShape::Color,
            default: default.pack(),
        }
    }

    pub const fn optional_color(
        key: &'static str,
        toggle: &'static str,
        default: Option<Color>,
    ) -> Self {
        Self {
            key,
            shape: ParameterShape::ColorWithEnable { toggle },
            default: Color::pack_optional(default),
        }
    }

    /// Pack what the host controls show.
    pub fn serialize(&self, display: &DisplayValue) -> Result<PackedValue, WireError> {
        match (self.shape, display) {
            (ParameterShape::Simple, DisplayValue::Number(raw)) => serialize_integer(raw),
            (ParameterShape::Color, DisplayValue::Color(raw)) => serialize_color(raw),
            (ParameterShape::ColorWithEnable { .. }, DisplayValue::OptionalColor { enabled, color }) => {
                serialize_enabled_color(*enabled, color)
            }
            (shape, _) => Err(WireError::ShapeMismatch {
                key: self.key,
                expected: shape.name(),
            }),
        }
    }

    pub fn deserialize(&self, value: PackedValue) -> DisplayValue {
        self.shape.deserialize(value)
    }

    /// The packing a writer produces for the same meaning: any enabled marker becomes `0x01` and a
    /// disabled optional color drops its leftover rgb bits.
    pub fn canonicalize(&self, value: PackedValue) -> PackedValue {
        match self.shape {
            ParameterShape::Simple => value,
            ParameterShape::Color => Color::unpack(value).pack(),
            ParameterShape::ColorWithEnable { .. } => {
                Color::pack_optional(Color::unpack_optional(value))
            }
        }
    }

    /// The skin document representation of a packed value.
    pub fn to_json(&self, value: PackedValue) -> Value {
        match self.shape {
            ParameterShape::Simple => Value::from(value),
            ParameterShape::Color => Value::from(Color::unpack(value).to_hex()),
            ParameterShape::ColorWithEnable { .. } => match Color::unpack_optional(value) {
                Some(color) => Value::from(color.to_hex()),
                None => Value::Null,
            },
        }
    }

    /// Inverse of [`ParameterDescriptor::to_json`].
    pub fn from_json(&self, value: &Value) -> Result<PackedValue, WireError> {
        match (self.shape, value) {
            (ParameterShape::Simple, Value::Number(n)) => n
                .as_u64()
                .and_then(|n| PackedValue::try_from(n).ok())
                .ok_or_else(|| WireError::InvalidInteger(n.to_string())),
            (ParameterShape::Color, Value::String(text)) => serialize_color(text),
            (ParameterShape::ColorWithEnable { .. }, Value::Null) => Ok(0),
            (ParameterShape::ColorWithEnable { .. }, Value::String(text)) => serialize_color(text),
            (shape, _) => Err(WireError::ShapeMismatch {
                key: self.key,
                expected: shape.name(),
            }),
        }
    }
}
