use crate::config::HostConfig;
use crate::error::HostError;
use std::sync::Arc;
use wasmer::sys::CompilerConfig;
use wasmer::wasmparser;
use wasmer::Engine;
use wasmer::Module;
use wasmer_middlewares::Metering;

/// Generate an engine with a wasm compiler
/// and Metering (use limits) in place.
///
/// The limit here only seeds the middleware, every export call resets the remaining points to
/// the configured budget before it runs.
pub fn make_engine(metering_limit: u64) -> Engine {
    let cost_function = |_operator: &wasmparser::Operator| -> u64 { 1 };
    let metering = Arc::new(Metering::new(metering_limit, cost_function));

    let mut compiler = wasmer::Cranelift::default();
    compiler.canonicalize_nans(true);
    compiler.push_middleware(metering);

    Engine::from(compiler)
}

/// Compiles render modules with a metered engine.
#[derive(Clone, Debug)]
pub struct ModuleBuilder {
    engine: Engine,
}

impl ModuleBuilder {
    pub fn new(config: &HostConfig) -> Self {
        Self {
            engine: make_engine(config.metering_limit),
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Accepts wasm binaries and, for tests and tooling, wat text.
    pub fn build(&self, wasm: &[u8]) -> Result<Module, HostError> {
        Module::new(&self.engine, wasm).map_err(|e| HostError::ModuleBuild(e.to_string()))
    }
}
