use once_cell::sync::Lazy;
use render_wasmer_host::prelude::*;

/// Hand written render module covering every protocol path without a wasm32 toolchain.
pub const RENDER_STUB: &str = include_str!("../wat/render_stub.wat");

static LEGACY_STUB: Lazy<String> =
    Lazy::new(|| RENDER_STUB.replace(r#" (export "schema_version")"#, ""));

static RENAMED_STUB: Lazy<String> = Lazy::new(|| {
    RENDER_STUB
        .replace(r#"(export "allocate")"#, r#"(export "malloc")"#)
        .replace(r#"(export "release")"#, r#"(export "free")"#)
});

pub enum TestWasm {
    /// speaks the current schema
    Stub,
    /// no schema_version export
    Legacy,
    /// allocator exported as malloc/free
    Renamed,
}

impl TestWasm {
    pub fn wat(&self) -> &str {
        match self {
            TestWasm::Stub => RENDER_STUB,
            TestWasm::Legacy => LEGACY_STUB.as_str(),
            TestWasm::Renamed => RENAMED_STUB.as_str(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TestWasm::Stub => "stub",
            TestWasm::Legacy => "legacy",
            TestWasm::Renamed => "renamed",
        }
    }

    /// A config the module can be driven with as is.
    pub fn config(&self) -> HostConfig {
        match self {
            TestWasm::Stub => HostConfig::default(),
            TestWasm::Legacy => HostConfig {
                assume_schema: Some(ProtocolVersion::V2.as_wire()),
                ..HostConfig::default()
            },
            TestWasm::Renamed => {
                let mut config = HostConfig::default();
                config.exports.allocate = "malloc".to_string();
                config.exports.release = "free".to_string();
                config
            }
        }
    }

    pub fn guest(&self) -> Result<WasmerGuest, HostError> {
        self.guest_with(&self.config())
    }

    pub fn guest_with(&self, config: &HostConfig) -> Result<WasmerGuest, HostError> {
        WasmerGuest::from_bytes(self.wat().as_bytes(), config)
    }
}
