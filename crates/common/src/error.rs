use thiserror::Error;

/// Everything that can go wrong while packing or unpacking values that cross the boundary.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum WireError {
    /// the length field of a result buffer is a u32, bigger payloads cannot be framed
    #[error("payload of {0} bytes does not fit a 32 bit length field")]
    PayloadTooLarge(usize),
    #[error("invalid hex color: {0:?}")]
    InvalidColor(String),
    #[error("invalid integer: {0:?}")]
    InvalidInteger(String),
    /// a display value was handed to a descriptor of a different shape
    #[error("parameter {key} expects a {expected} value")]
    ShapeMismatch {
        key: &'static str,
        expected: &'static str,
    },
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),
    /// the buffer is shorter than the header it claims to carry
    #[error("truncated result buffer: needed {needed} bytes, had {available}")]
    Truncated { needed: usize, available: usize },
}
