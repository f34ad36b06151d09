use crate::error::HostError;
use render_wasmer_common::ProtocolVersion;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;

/// sixteen mebibytes, far beyond any hand written figure description
pub const DEFAULT_MAX_INPUT_BYTES: u32 = 16 * 1024 * 1024;

/// ten giga ops per export call
pub const DEFAULT_METERING_LIMIT: u64 = 10_000_000_000;

/// utf-8 length is doubled when sizing input buffers
pub const DEFAULT_ENCODE_SLACK: u32 = 2;

/// Literal export names of a render module, keyed by what they do.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportNames {
    pub memory: String,
    pub allocate: String,
    pub release: String,
    pub render: String,
    pub get_parameter: String,
    pub modify_parameter: String,
    pub reset_parameters: String,
    pub export_parameters: String,
    pub merge_in_skin: String,
    pub schema_version: String,
}

impl Default for ExportNames {
    fn default() -> Self {
        Self {
            memory: "memory".into(),
            allocate: "allocate".into(),
            release: "release".into(),
            render: "render".into(),
            get_parameter: "get_parameter".into(),
            modify_parameter: "modify_parameter".into(),
            reset_parameters: "reset_parameters".into(),
            export_parameters: "export_parameters".into(),
            merge_in_skin: "merge_in_skin".into(),
            schema_version: "schema_version".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    pub exports: ExportNames,
    /// multiplier on the utf-8 length of input text when allocating its guest buffer
    pub encode_slack: u32,
    /// longer input is truncated at a character boundary
    pub max_input_bytes: u32,
    /// instruction budget for every single export call
    pub metering_limit: u64,
    /// schema to trust when the module has no schema_version export, fail closed if unset
    pub assume_schema: Option<u32>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            exports: ExportNames::default(),
            encode_slack: DEFAULT_ENCODE_SLACK,
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            metering_limit: DEFAULT_METERING_LIMIT,
            assume_schema: None,
        }
    }
}

impl HostConfig {
    pub fn from_json_str(json: &str) -> Result<Self, HostError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, HostError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), HostError> {
        if self.encode_slack == 0 {
            return Err(HostError::Config("encode_slack must be at least 1".into()));
        }
        if self.metering_limit == 0 {
            return Err(HostError::Config("metering_limit must be positive".into()));
        }
        if let Some(version) = self.assume_schema {
            if ProtocolVersion::from_wire(version).is_none() {
                return Err(HostError::UnrecognizedSchema(version));
            }
        }
        Ok(())
    }
}
