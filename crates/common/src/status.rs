use serde::Deserialize;
use serde::Serialize;

/// Status byte at offset 0 of every tagged result buffer.
///
/// The ordinals are the wire format and must never be reordered. Older modules carry fewer
/// codes; anything at or beyond the count a schema knows about decodes as `Unknown`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
#[rustfmt::skip]
pub enum StatusCode {
    Success = 0,
    /// the input is not syntactically valid
    MalformedInput = 1,
    /// the input parsed but a value in it was rejected
    InvalidValue = 2,
    /// the internal model could not be built from the input
    AssemblyFailure = 3,
    /// the model was built but generating output failed
    RenderFailure = 4,
    /// the input bytes were not utf-8
    InvalidUtf8 = 5,
    /// catch-all, always the highest ordinal
    Unknown = 6,
}

impl StatusCode {
    /// every code the newest schema knows about, in wire order, excluding `Unknown`
    pub const KNOWN: [StatusCode; 6] = [
        StatusCode::Success,
        StatusCode::MalformedInput,
        StatusCode::InvalidValue,
        StatusCode::AssemblyFailure,
        StatusCode::RenderFailure,
        StatusCode::InvalidUtf8,
    ];

    /// Decode a status byte given how many codes the negotiated schema carries.
    /// Out of range values clamp to `Unknown` rather than faulting.
    pub fn from_wire(byte: u8, known_count: u8) -> Self {
        let known_count = known_count.min(Self::KNOWN.len() as u8);
        if byte >= known_count {
            return StatusCode::Unknown;
        }
        Self::KNOWN[byte as usize]
    }

    pub fn as_wire(self) -> u8 {
        self as u8
    }

    pub fn is_success(self) -> bool {
        self == StatusCode::Success
    }

    /// Short human readable text for the presentation layer.
    pub fn message(self) -> &'static str {
        match self {
            StatusCode::Success => "Successful build",
            StatusCode::MalformedInput => "Invalid JSON",
            StatusCode::InvalidValue => "Invalid value in input",
            StatusCode::AssemblyFailure => "Failed to assemble figure",
            StatusCode::RenderFailure => "Failed to render SVG",
            StatusCode::InvalidUtf8 => "Invalid UTF-8",
            StatusCode::Unknown => "Unknown error",
        }
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}
