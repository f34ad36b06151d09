use crate::config::HostConfig;
use crate::error::HostError;
use crate::guest::GuestModule;
use crate::result::decode_text_result;
use crate::result::GuestOutcome;
use crate::string;
use render_wasmer_common::*;

/// A change made through one host control.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlChange {
    /// number field or color picker
    Text(String),
    /// enable checkbox of an optional color
    Toggle(bool),
}

/// Work out which schema a guest speaks.
///
/// A reported version has to be one this host knows. A module without a `schema_version` export
/// is only trusted if the config names a schema for it. Anything else fails closed, index
/// meanings are never guessed.
pub fn negotiate_schema<G: GuestModule + ?Sized>(
    guest: &mut G,
    config: &HostConfig,
) -> Result<&'static Schema, HostError> {
    let version = match guest.schema_version()? {
        Some(version) => version,
        None => config.assume_schema.ok_or(HostError::MissingSchema)?,
    };
    let schema = ProtocolVersion::from_wire(version)
        .ok_or(HostError::UnrecognizedSchema(version))?
        .schema();
    tracing::debug!(version, parameters = schema.len(), "negotiated schema");
    Ok(schema)
}

/// Host side of the parameter table.
///
/// Holds what every control currently shows, one display per slot. The guest is the source of
/// truth for packed values: after a reset or a skin import every slot is fetched again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterRegistry {
    schema: &'static Schema,
    controls: Vec<DisplayValue>,
}

impl ParameterRegistry {
    /// Controls show the schema defaults until the first refresh.
    pub fn new(schema: &'static Schema) -> Self {
        Self {
            schema,
            controls: schema
                .iter()
                .map(|(_, descriptor)| descriptor.deserialize(descriptor.default))
                .collect(),
        }
    }

    /// Negotiate the schema and load every current value.
    pub fn connect<G: GuestModule + ?Sized>(guest: &mut G, config: &HostConfig) -> Result<Self, HostError> {
        let mut registry = Self::new(negotiate_schema(guest, config)?);
        registry.refresh(guest)?;
        Ok(registry)
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    fn slot(&self, key: &str) -> Result<(u32, &'static ParameterDescriptor), HostError> {
        self.schema
            .resolve(key)
            .ok_or_else(|| WireError::UnknownParameter(key.to_string()).into())
    }

    /// What the control for `key` shows. Toggle names resolve to their shared slot.
    pub fn display(&self, key: &str) -> Option<&DisplayValue> {
        let (index, _) = self.schema.resolve(key)?;
        self.controls.get(index as usize)
    }

    /// Every slot with its descriptor, in wire order.
    pub fn controls(&self) -> impl Iterator<Item = (&'static ParameterDescriptor, &DisplayValue)> {
        self.schema
            .parameters()
            .iter()
            .zip(self.controls.iter())
    }

    /// Current packed value straight from the guest.
    pub fn get<G: GuestModule + ?Sized>(&self, guest: &mut G, key: &str) -> Result<PackedValue, HostError> {
        let (index, _) = self.slot(key)?;
        guest.get_parameter(index)
    }

    /// Pack `display` and store it in the guest.
    pub fn set<G: GuestModule + ?Sized>(
        &mut self,
        guest: &mut G,
        key: &str,
        display: DisplayValue,
    ) -> Result<PackedValue, HostError> {
        let (index, descriptor) = self.slot(key)?;
        let packed = descriptor.serialize(&display)?;
        guest.modify_parameter(index, packed)?;
        tracing::debug!(key, index, packed, "modify parameter");
        self.controls[index as usize] = display;
        Ok(packed)
    }

    /// Apply a change from a single control.
    ///
    /// The two controls of an optional color share a slot, so each one completes the display
    /// with what its companion currently shows before packing.
    pub fn change<G: GuestModule + ?Sized>(
        &mut self,
        guest: &mut G,
        key: &str,
        change: ControlChange,
    ) -> Result<PackedValue, HostError> {
        let (index, descriptor) = self.slot(key)?;
        let display = match (descriptor.shape, change) {
            (ParameterShape::Simple, ControlChange::Text(text)) => DisplayValue::Number(text),
            (ParameterShape::Color, ControlChange::Text(text)) => DisplayValue::Color(text),
            (ParameterShape::ColorWithEnable { .. }, change) => {
                let (enabled, color) = match &self.controls[index as usize] {
                    DisplayValue::OptionalColor { enabled, color } => (*enabled, color.clone()),
                    _ => (false, DISABLED_COLOR_DISPLAY.to_string()),
                };
                match change {
                    ControlChange::Toggle(enabled) => DisplayValue::OptionalColor { enabled, color },
                    ControlChange::Text(color) => DisplayValue::OptionalColor { enabled, color },
                }
            }
            (shape, _) => {
                return Err(WireError::ShapeMismatch {
                    key: descriptor.key,
                    expected: shape.name(),
                }
                .into())
            }
        };
        self.set(guest, key, display)
    }

    /// Fetch every slot from the guest and redraw the controls.
    pub fn refresh<G: GuestModule + ?Sized>(&mut self, guest: &mut G) -> Result<(), HostError> {
        for (index, descriptor) in self.schema.iter() {
            let packed = guest.get_parameter(index)?;
            self.controls[index as usize] = descriptor.deserialize(packed);
        }
        Ok(())
    }

    /// Restore module defaults. There is no diff, everything is fetched again.
    pub fn reset<G: GuestModule + ?Sized>(&mut self, guest: &mut G) -> Result<(), HostError> {
        guest.reset_parameters()?;
        self.refresh(guest)
    }

    /// The whole table as a skin document.
    pub fn export<G: GuestModule + ?Sized>(&self, guest: &mut G) -> Result<GuestOutcome<String>, HostError> {
        let ptr = guest.export_parameters()?;
        decode_text_result(guest, ptr, self.schema.status_count)
    }

    /// Merge a skin document into the guest.
    ///
    /// A nonzero status may still have applied some keys, so the controls are refreshed whatever
    /// the outcome.
    pub fn import<G: GuestModule + ?Sized>(
        &mut self,
        guest: &mut G,
        json: &str,
        config: &HostConfig,
    ) -> Result<StatusCode, HostError> {
        let raw = {
            let mut encoded = string::encode(&mut *guest, json, config)?;
            let (ptr, len) = encoded.hand_over();
            encoded.guest().merge_in_skin(ptr, len)?
        };
        let status = match u8::try_from(raw) {
            Ok(byte) => StatusCode::from_wire(byte, self.schema.status_count),
            Err(_) => StatusCode::Unknown,
        };
        if !status.is_success() {
            tracing::warn!(%status, "skin import was not fully applied");
        }
        self.refresh(guest)?;
        Ok(status)
    }
}
