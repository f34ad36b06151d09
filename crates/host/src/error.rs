use render_wasmer_common::GuestPtr;
use render_wasmer_common::Len;
use render_wasmer_common::WireError;
use thiserror::Error;

/// Conditions that escalate past the protocol.
///
/// Guest status codes are not errors on this side, they are outcomes handed to the presenter.
/// Everything here means the host could not complete the exchange at all.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("guest export {name} is missing or mistyped: {reason}")]
    Export { name: String, reason: String },
    #[error("guest trapped: {0}")]
    Runtime(String),
    #[error("guest ran out of metering points")]
    OutOfPoints,
    #[error("{len} bytes at {ptr} are outside guest memory")]
    OutOfBounds { ptr: GuestPtr, len: Len },
    #[error("guest payload is not utf-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    #[error("unrecognized schema version {0}")]
    UnrecognizedSchema(u32),
    #[error("guest reports no schema version and none is configured")]
    MissingSchema,
    #[error("could not build module: {0}")]
    ModuleBuild(String),
    #[error("invalid host config: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Wire(#[from] WireError),
}

impl From<serde_json::Error> for HostError {
    fn from(e: serde_json::Error) -> Self {
        HostError::Config(e.to_string())
    }
}
