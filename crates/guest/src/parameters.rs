use render_wasmer_common::*;
use serde_json::Map;
use serde_json::Value;

/// The live parameter table of a render module.
///
/// Values are stored packed, exactly as they cross the boundary. The schema fixes which index means
/// what and the default every index resets to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterStore {
    schema: &'static Schema,
    values: Vec<PackedValue>,
}

impl ParameterStore {
    pub fn new(schema: &'static Schema) -> Self {
        Self {
            schema,
            values: schema.defaults(),
        }
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// Out of range indices read as zero.
    pub fn get(&self, index: u32) -> PackedValue {
        match self.values.get(index as usize) {
            Some(value) => *value,
            None => {
                tracing::warn!(index, "get of unknown parameter index");
                0
            }
        }
    }

    /// Out of range indices are ignored. Colors are stored in canonical packing, so what `get`
    /// returns always survives a trip through a skin document.
    pub fn modify(&mut self, index: u32, value: PackedValue) {
        match (self.schema.descriptor(index), self.values.get_mut(index as usize)) {
            (Some(descriptor), Some(slot)) => *slot = descriptor.canonicalize(value),
            _ => tracing::warn!(index, value, "modify of unknown parameter index"),
        }
    }

    pub fn reset(&mut self) {
        self.values = self.schema.defaults();
    }

    /// Typed read for renderers, resolving by host-facing key.
    pub fn value(&self, key: &str) -> Option<PackedValue> {
        self.schema.resolve(key).map(|(index, _)| self.get(index))
    }

    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .schema
            .iter()
            .map(|(index, descriptor)| {
                (
                    descriptor.key.to_string(),
                    descriptor.to_json(self.get(index)),
                )
            })
            .collect();
        Value::Object(map)
    }

    /// The whole table as a skin document, keys in table order.
    pub fn export_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.to_json())
    }

    /// Merge a skin document into the table.
    ///
    /// Keys the schema does not know are ignored and keys the document omits keep their current
    /// value. A known key with an unusable value is skipped while every other key still applies,
    /// in which case the merge reports `InvalidValue`.
    pub fn merge_json(&mut self, input: &[u8]) -> StatusCode {
        let Ok(text) = std::str::from_utf8(input) else {
            return StatusCode::InvalidUtf8;
        };
        let document = match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(document)) => document,
            Ok(_) => return StatusCode::MalformedInput,
            Err(e) => {
                tracing::debug!(error = %e, "unparsable skin");
                return StatusCode::MalformedInput;
            }
        };

        let mut status = StatusCode::Success;
        for (index, descriptor) in self.schema.iter() {
            let Some(value) = document.get(descriptor.key) else {
                continue;
            };
            match descriptor.from_json(value) {
                Ok(packed) => self.values[index as usize] = packed,
                Err(e) => {
                    tracing::warn!(key = descriptor.key, error = %e, "skipping skin value");
                    status = StatusCode::InvalidValue;
                }
            }
        }
        status
    }
}
