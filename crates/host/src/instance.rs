use crate::config::ExportNames;
use crate::config::HostConfig;
use crate::error::HostError;
use crate::guest::checked_range;
use crate::guest::GuestModule;
use crate::module::ModuleBuilder;
use render_wasmer_common::*;
use wasmer::imports;
use wasmer::Instance;
use wasmer::Memory;
use wasmer::Module;
use wasmer::RuntimeError;
use wasmer::Store;
use wasmer::TypedFunction;
use wasmer::WasmTypeList;
use wasmer_middlewares::metering::get_remaining_points;
use wasmer_middlewares::metering::set_remaining_points;
use wasmer_middlewares::metering::MeteringPoints;

struct Exports {
    memory: Memory,
    allocate: TypedFunction<Len, GuestPtr>,
    release: TypedFunction<(GuestPtr, Len), ()>,
    render: TypedFunction<(GuestPtr, Len), GuestPtr>,
    get_parameter: TypedFunction<u32, PackedValue>,
    modify_parameter: TypedFunction<(u32, PackedValue), ()>,
    reset_parameters: TypedFunction<(), ()>,
    export_parameters: TypedFunction<(), GuestPtr>,
    merge_in_skin: TypedFunction<(GuestPtr, Len), u32>,
    schema_version: Option<TypedFunction<(), u32>>,
}

fn typed<Args: WasmTypeList, Rets: WasmTypeList>(
    instance: &Instance,
    store: &Store,
    name: &str,
) -> Result<TypedFunction<Args, Rets>, HostError> {
    instance
        .exports
        .get_typed_function(store, name)
        .map_err(|e| HostError::Export {
            name: name.to_string(),
            reason: e.to_string(),
        })
}

impl Exports {
    fn resolve(instance: &Instance, store: &Store, names: &ExportNames) -> Result<Self, HostError> {
        let memory = instance
            .exports
            .get_memory(&names.memory)
            .map_err(|e| HostError::Export {
                name: names.memory.clone(),
                reason: e.to_string(),
            })?
            .clone();
        let schema_version = if instance.exports.contains(names.schema_version.as_str()) {
            Some(typed(instance, store, &names.schema_version)?)
        } else {
            None
        };
        Ok(Self {
            memory,
            allocate: typed(instance, store, &names.allocate)?,
            release: typed(instance, store, &names.release)?,
            render: typed(instance, store, &names.render)?,
            get_parameter: typed(instance, store, &names.get_parameter)?,
            modify_parameter: typed(instance, store, &names.modify_parameter)?,
            reset_parameters: typed(instance, store, &names.reset_parameters)?,
            export_parameters: typed(instance, store, &names.export_parameters)?,
            merge_in_skin: typed(instance, store, &names.merge_in_skin)?,
            schema_version,
        })
    }
}

/// A render module running in wasmer.
///
/// The module imports nothing. Every export call gets a fresh metering budget, running out of it
/// is a [`HostError::OutOfPoints`].
pub struct WasmerGuest {
    store: Store,
    instance: Instance,
    exports: Exports,
    metering_limit: u64,
}

impl WasmerGuest {
    /// Compile and instantiate in one go.
    pub fn from_bytes(wasm: &[u8], config: &HostConfig) -> Result<Self, HostError> {
        let builder = ModuleBuilder::new(config);
        let module = builder.build(wasm)?;
        let store = Store::new(builder.engine().clone());
        Self::instantiate(store, &module, config)
    }

    /// `store` must come from the engine `module` was built with.
    pub fn instantiate(mut store: Store, module: &Module, config: &HostConfig) -> Result<Self, HostError> {
        let instance = Instance::new(&mut store, module, &imports! {})
            .map_err(|e| HostError::ModuleBuild(e.to_string()))?;
        let exports = Exports::resolve(&instance, &store, &config.exports)?;
        Ok(Self {
            store,
            instance,
            exports,
            metering_limit: config.metering_limit,
        })
    }

    pub fn memory_size(&self) -> u64 {
        self.exports.memory.view(&self.store).data_size()
    }

    fn meter(&mut self) {
        set_remaining_points(&mut self.store, &self.instance, self.metering_limit);
    }

    fn trapped(&mut self, e: RuntimeError) -> HostError {
        match get_remaining_points(&mut self.store, &self.instance) {
            MeteringPoints::Exhausted => HostError::OutOfPoints,
            MeteringPoints::Remaining(_) => HostError::Runtime(e.to_string()),
        }
    }

    /// Reads an arbitrary exported global, handy for inspecting guest state in tests.
    pub fn global_u32(&mut self, name: &str) -> Result<u32, HostError> {
        let global = self
            .instance
            .exports
            .get_global(name)
            .map_err(|e| HostError::Export {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        match global.get(&mut self.store) {
            wasmer::Value::I32(value) => Ok(value as u32),
            other => Err(HostError::Export {
                name: name.to_string(),
                reason: format!("expected an i32 global, found {:?}", other),
            }),
        }
    }
}

impl GuestModule for WasmerGuest {
    fn read_bytes(&mut self, ptr: GuestPtr, len: Len) -> Result<Vec<u8>, HostError> {
        let view = self.exports.memory.view(&self.store);
        checked_range(ptr, len, view.data_size() as usize)?;
        let mut bytes = vec![0; len as usize];
        view.read(ptr as u64, &mut bytes)
            .map_err(|_| HostError::OutOfBounds { ptr, len })?;
        Ok(bytes)
    }

    fn write_bytes(&mut self, ptr: GuestPtr, bytes: &[u8]) -> Result<(), HostError> {
        let len = bytes.len() as Len;
        let view = self.exports.memory.view(&self.store);
        checked_range(ptr, len, view.data_size() as usize)?;
        view.write(ptr as u64, bytes)
            .map_err(|_| HostError::OutOfBounds { ptr, len })
    }

    fn allocate(&mut self, len: Len) -> Result<GuestPtr, HostError> {
        self.meter();
        self.exports
            .allocate
            .call(&mut self.store, len)
            .map_err(|e| self.trapped(e))
    }

    fn release(&mut self, ptr: GuestPtr, len: Len) -> Result<(), HostError> {
        self.meter();
        self.exports
            .release
            .call(&mut self.store, ptr, len)
            .map_err(|e| self.trapped(e))
    }

    fn render(&mut self, ptr: GuestPtr, len: Len) -> Result<GuestPtr, HostError> {
        self.meter();
        self.exports
            .render
            .call(&mut self.store, ptr, len)
            .map_err(|e| self.trapped(e))
    }

    fn get_parameter(&mut self, index: u32) -> Result<PackedValue, HostError> {
        self.meter();
        self.exports
            .get_parameter
            .call(&mut self.store, index)
            .map_err(|e| self.trapped(e))
    }

    fn modify_parameter(&mut self, index: u32, value: PackedValue) -> Result<(), HostError> {
        self.meter();
        self.exports
            .modify_parameter
            .call(&mut self.store, index, value)
            .map_err(|e| self.trapped(e))
    }

    fn reset_parameters(&mut self) -> Result<(), HostError> {
        self.meter();
        self.exports
            .reset_parameters
            .call(&mut self.store)
            .map_err(|e| self.trapped(e))
    }

    fn export_parameters(&mut self) -> Result<GuestPtr, HostError> {
        self.meter();
        self.exports
            .export_parameters
            .call(&mut self.store)
            .map_err(|e| self.trapped(e))
    }

    fn merge_in_skin(&mut self, ptr: GuestPtr, len: Len) -> Result<u32, HostError> {
        self.meter();
        self.exports
            .merge_in_skin
            .call(&mut self.store, ptr, len)
            .map_err(|e| self.trapped(e))
    }

    fn schema_version(&mut self) -> Result<Option<u32>, HostError> {
        let Some(schema_version) = self.exports.schema_version.clone() else {
            return Ok(None);
        };
        self.meter();
        schema_version
            .call(&mut self.store)
            .map(Some)
            .map_err(|e| self.trapped(e))
    }
}
