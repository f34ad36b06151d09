use crate::color::Color;
use crate::parameter::ParameterDescriptor;
use crate::parameter::ParameterShape;
use crate::PackedValue;

/// Revisions of the render module's wire contract.
///
/// A revision fixes two things the host cannot discover by itself: how many status codes the
/// module emits and which parameter sits at which index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum ProtocolVersion {
    /// signal figures only, no utf-8 status
    V1 = 1,
    /// adds the InvalidUtf8 status and the register figure parameters
    V2 = 2,
}

impl ProtocolVersion {
    pub const CURRENT: ProtocolVersion = ProtocolVersion::V2;

    pub fn from_wire(version: u32) -> Option<Self> {
        match version {
            1 => Some(ProtocolVersion::V1),
            2 => Some(ProtocolVersion::V2),
            _ => None,
        }
    }

    pub fn as_wire(self) -> u32 {
        self as u32
    }

    pub fn schema(self) -> &'static Schema {
        match self {
            ProtocolVersion::V1 => &SCHEMA_V1,
            ProtocolVersion::V2 => &SCHEMA_V2,
        }
    }
}

/// Revisions only ever append parameters, so a schema is a prefix of the full table.
#[derive(Debug, PartialEq, Eq)]
pub struct Schema {
    pub version: ProtocolVersion,
    /// statuses at or above this ordinal decode as Unknown
    pub status_count: u8,
    parameter_count: usize,
}

impl Schema {
    pub fn parameters(&self) -> &'static [ParameterDescriptor] {
        &PARAMETERS[..self.parameter_count]
    }

    pub fn len(&self) -> u32 {
        self.parameters().len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.parameters().is_empty()
    }

    pub fn descriptor(&self, index: u32) -> Option<&'static ParameterDescriptor> {
        self.parameters().get(index as usize)
    }

    /// Wire index and descriptor for a host-facing name. Toggle names of paired slots resolve to
    /// the slot they share with their color.
    pub fn resolve(&self, key: &str) -> Option<(u32, &'static ParameterDescriptor)> {
        self.parameters()
            .iter()
            .enumerate()
            .find(|(_, descriptor)| {
                descriptor.key == key
                    || matches!(descriptor.shape, ParameterShape::ColorWithEnable { toggle } if toggle == key)
            })
            .map(|(index, descriptor)| (index as u32, descriptor))
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &'static ParameterDescriptor)> {
        self.parameters()
            .iter()
            .enumerate()
            .map(|(index, descriptor)| (index as u32, descriptor))
    }

    pub fn defaults(&self) -> Vec<PackedValue> {
        self.parameters().iter().map(|d| d.default).collect()
    }
}

const GRAY: Color = Color::rgb(0xCC, 0xCC, 0xCC);
const EDGE_BLUE: Color = Color::rgb(0x00, 0x00, 0xFF);

/// number of rows shared by every revision
const SIGNAL_PARAMETER_COUNT: usize = 58;

#[rustfmt::skip]
static PARAMETERS: [ParameterDescriptor; 73] = [
    ParameterDescriptor::simple("signal-height", 24),
    ParameterDescriptor::simple("cycle-width", 48),
    ParameterDescriptor::simple("transition-offset", 4),

    ParameterDescriptor::optional_color("background", "background-enabled", None),

    ParameterDescriptor::simple("signal-marker-fontsize", 14),
    ParameterDescriptor::color("signal-marker-color", Color::BLACK),

    ParameterDescriptor::simple("signal-name-fontsize", 14),
    ParameterDescriptor::color("signal-name-color", Color::BLACK),

    ParameterDescriptor::color("signal-gap-color", Color::BLACK),
    ParameterDescriptor::color("signal-gap-background-color", Color::WHITE),

    ParameterDescriptor::color("signal-path-color", Color::BLACK),

    ParameterDescriptor::color("signal-hint-line-color", GRAY),

    ParameterDescriptor::color("signal-undefined-color", Color::BLACK),
    ParameterDescriptor::optional_color(
        "signal-undefined-background-color",
        "signal-undefined-background-color-enabled",
        None,
    ),

    ParameterDescriptor::color("bg-box2", Color::rgb(0xFF, 0xFF, 0xB4)),
    ParameterDescriptor::color("bg-box3", Color::rgb(0xFF, 0xE0, 0xB9)),
    ParameterDescriptor::color("bg-box4", Color::rgb(0xB9, 0xE0, 0xFF)),
    ParameterDescriptor::color("bg-box5", Color::rgb(0xCC, 0xFD, 0xFE)),
    ParameterDescriptor::color("bg-box6", Color::rgb(0xCD, 0xFD, 0xC5)),
    ParameterDescriptor::color("bg-box7", Color::rgb(0xF0, 0xC1, 0xFB)),
    ParameterDescriptor::color("bg-box8", Color::rgb(0xF5, 0xC2, 0xC0)),
    ParameterDescriptor::color("bg-box9", Color::rgb(0xE8, 0xE8, 0xE8)),

    ParameterDescriptor::simple("padding-figure-top", 8),
    ParameterDescriptor::simple("padding-figure-bottom", 8),
    ParameterDescriptor::simple("padding-figure-left", 8),
    ParameterDescriptor::simple("padding-figure-right", 8),
    ParameterDescriptor::simple("padding-schema-top", 8),
    ParameterDescriptor::simple("padding-schema-bottom", 8),

    ParameterDescriptor::simple("spacing-textbox-to-schema", 8),
    ParameterDescriptor::simple("spacing-groupbox-to-textbox", 8),
    ParameterDescriptor::simple("spacing-line-to-line", 8),

    ParameterDescriptor::simple("group-indicator-width", 4),
    ParameterDescriptor::simple("group-indicator-spacing", 4),
    ParameterDescriptor::color("group-indicator-color", Color::BLACK),
    ParameterDescriptor::simple("group-indicator-label-spacing", 4),
    ParameterDescriptor::simple("group-indicator-label-fontsize", 14),
    ParameterDescriptor::color("group-indicator-label-color", Color::BLACK),

    ParameterDescriptor::simple("header-fontsize", 24),
    ParameterDescriptor::simple("header-height", 32),
    ParameterDescriptor::color("header-color", Color::BLACK),
    ParameterDescriptor::simple("top-cycle-marker-height", 12),
    ParameterDescriptor::simple("top-cycle-marker-fontsize", 12),
    ParameterDescriptor::color("top-cycle-marker-color", Color::BLACK),

    ParameterDescriptor::simple("footer-fontsize", 24),
    ParameterDescriptor::simple("footer-height", 32),
    ParameterDescriptor::color("footer-color", Color::BLACK),
    ParameterDescriptor::simple("bottom-cycle-marker-height", 12),
    ParameterDescriptor::simple("bottom-cycle-marker-fontsize", 12),
    ParameterDescriptor::color("bottom-cycle-marker-color", Color::BLACK),

    ParameterDescriptor::simple("edge-node-fontsize", 14),
    ParameterDescriptor::color("edge-node-text-color", Color::BLACK),
    ParameterDescriptor::color("edge-node-background-color", Color::WHITE),

    ParameterDescriptor::simple("edge-text-fontsize", 14),
    ParameterDescriptor::color("edge-text-color", Color::BLACK),
    ParameterDescriptor::color("edge-text-background-color", Color::WHITE),

    ParameterDescriptor::color("edge-color", EDGE_BLUE),
    ParameterDescriptor::color("edge-arrow-color", EDGE_BLUE),
    ParameterDescriptor::simple("edge-arrow-size", 8),

    // everything below arrived with V2
    ParameterDescriptor::simple("register-bar-width", 800),
    ParameterDescriptor::simple("register-bar-height", 40),

    ParameterDescriptor::simple("register-hint-indent", 4),

    ParameterDescriptor::simple("register-name-fontsize", 16),
    ParameterDescriptor::simple("register-bitmarker-fontsize", 12),
    ParameterDescriptor::simple("register-attribute-fontsize", 16),

    ParameterDescriptor::simple("register-padding-top", 4),
    ParameterDescriptor::simple("register-padding-bottom", 4),
    ParameterDescriptor::simple("register-padding-left", 4),
    ParameterDescriptor::simple("register-padding-right", 4),

    ParameterDescriptor::simple("register-spacing-lane", 4),
    ParameterDescriptor::simple("register-spacing-attribute", 4),

    ParameterDescriptor::simple("register-offset-bitmarker-x", 2),
    ParameterDescriptor::simple("register-offset-bitmarker-y", 2),
    ParameterDescriptor::simple("register-offset-attribute-y", 4),
];

pub static SCHEMA_V1: Schema = Schema {
    version: ProtocolVersion::V1,
    status_count: 5,
    parameter_count: SIGNAL_PARAMETER_COUNT,
};

pub static SCHEMA_V2: Schema = Schema {
    version: ProtocolVersion::V2,
    status_count: 6,
    parameter_count: PARAMETERS.len(),
};
