use crate::parameters::ParameterStore;
use render_wasmer_common::*;

/// The figure generator behind the `render` export.
///
/// Implementations only see valid utf-8 and the current parameter table. Failures are reported
/// as the status the host should show.
pub trait Renderer {
    fn render(&self, input: &str, parameters: &ParameterStore) -> Result<String, StatusCode>;
}

/// Every export of a render module, minus the pointers.
///
/// Each method takes and returns owned host-shaped bytes. The `render_exports!` macro moves the
/// bytes in and out of linear memory.
pub struct RenderModule<R> {
    renderer: R,
    parameters: ParameterStore,
}

impl<R: Renderer> RenderModule<R> {
    pub fn new(renderer: R) -> Self {
        Self::with_schema(renderer, ProtocolVersion::CURRENT.schema())
    }

    pub fn with_schema(renderer: R, schema: &'static Schema) -> Self {
        Self {
            renderer,
            parameters: ParameterStore::new(schema),
        }
    }

    pub fn parameters(&self) -> &ParameterStore {
        &self.parameters
    }

    pub fn schema_version(&self) -> u32 {
        self.parameters.schema().version.as_wire()
    }

    /// Tagged result buffer holding the markup, or a lone status byte.
    pub fn render(&self, input: &[u8]) -> Vec<u8> {
        let Ok(text) = std::str::from_utf8(input) else {
            return status_buffer(StatusCode::InvalidUtf8);
        };
        match self.renderer.render(text, &self.parameters) {
            Ok(markup) => match success_buffer(markup.as_bytes()) {
                Ok(buffer) => buffer,
                Err(e) => {
                    tracing::error!(error = %e, "markup cannot be framed");
                    status_buffer(StatusCode::RenderFailure)
                }
            },
            Err(status) => status_buffer(status),
        }
    }

    pub fn get_parameter(&self, index: u32) -> PackedValue {
        self.parameters.get(index)
    }

    pub fn modify_parameter(&mut self, index: u32, value: PackedValue) {
        self.parameters.modify(index, value);
    }

    pub fn reset_parameters(&mut self) {
        self.parameters.reset();
    }

    /// Tagged result buffer holding the skin document.
    pub fn export_parameters(&self) -> Vec<u8> {
        let framed = self
            .parameters
            .export_json()
            .map_err(|e| e.to_string())
            .and_then(|json| success_buffer(&json).map_err(|e| e.to_string()));
        match framed {
            Ok(buffer) => buffer,
            Err(e) => {
                tracing::error!(error = %e, "parameters cannot be exported");
                status_buffer(StatusCode::Unknown)
            }
        }
    }

    /// Status ordinal of the merge, see [`ParameterStore::merge_json`].
    pub fn merge_in_skin(&mut self, input: &[u8]) -> u32 {
        self.parameters.merge_json(input).as_wire() as u32
    }
}
