pub mod color;
pub mod error;
pub mod parameter;
pub mod result;
pub mod schema;
pub mod status;

pub use color::Color;
pub use error::WireError;
pub use parameter::*;
pub use result::*;
pub use schema::*;
pub use status::StatusCode;

/// something like usize for wasm
/// wasm has a memory limit of 4GB so offsets and lengths fit in u32
///
/// the host needs to directly read and write to the guest's memory so we need a predictable number
/// of bytes to represent offsets and lengths
/// the render module exports take and return plain i32 values, so every pointer, length and packed
/// parameter crossing the boundary is a WasmSize
pub type WasmSize = u32;

pub type Len = WasmSize;
pub type GuestPtr = WasmSize;

/// a packed parameter value as seen by get_parameter/modify_parameter
/// the bit layout depends on the shape of the parameter descriptor
pub type PackedValue = WasmSize;
