pub mod allocation;
pub mod config;
pub mod driver;
pub mod error;
pub mod guest;
pub mod parameters;
pub mod prelude;
pub mod result;
pub mod string;

#[cfg(feature = "wasmer_sys")]
pub mod instance;
#[cfg(feature = "wasmer_sys")]
pub mod module;

#[cfg(test)]
pub mod fake;
