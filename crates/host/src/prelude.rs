pub use crate::allocation::GuestAllocation;
pub use crate::config::ExportNames;
pub use crate::config::HostConfig;
pub use crate::driver::Event;
pub use crate::driver::Presenter;
pub use crate::driver::RenderDriver;
pub use crate::driver::RenderOutcome;
pub use crate::driver::SharedDriver;
pub use crate::error::HostError;
pub use crate::guest::GuestModule;
pub use crate::parameters::ControlChange;
pub use crate::parameters::ParameterRegistry;
pub use crate::result::GuestOutcome;
pub use render_wasmer_common::*;

#[cfg(feature = "wasmer_sys")]
pub use crate::instance::WasmerGuest;
#[cfg(feature = "wasmer_sys")]
pub use crate::module::ModuleBuilder;
