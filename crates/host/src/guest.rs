use crate::error::HostError;
use render_wasmer_common::*;

/// Everything the host can do to a render module.
///
/// This is the whole of the host's visibility into the guest: raw bytes at offsets it was given,
/// plus the exports. Nothing here tracks ownership, that is the job of
/// [`crate::allocation::GuestAllocation`].
///
/// Every method takes `&mut self` because a guest is never entered twice at once.
pub trait GuestModule {
    /// Copy `len` bytes out of guest memory.
    fn read_bytes(&mut self, ptr: GuestPtr, len: Len) -> Result<Vec<u8>, HostError>;

    /// Copy bytes into guest memory, the range must already be allocated.
    fn write_bytes(&mut self, ptr: GuestPtr, bytes: &[u8]) -> Result<(), HostError>;

    /// Reserve at least `len` bytes.
    fn allocate(&mut self, len: Len) -> Result<GuestPtr, HostError>;

    /// Hand `len` bytes at `ptr` back. The guest allocator does not know allocation sizes so `len`
    /// must be exactly what the protocol says the buffer holds.
    fn release(&mut self, ptr: GuestPtr, len: Len) -> Result<(), HostError>;

    /// Consumes the input buffer, returns a tagged result buffer.
    fn render(&mut self, ptr: GuestPtr, len: Len) -> Result<GuestPtr, HostError>;

    fn get_parameter(&mut self, index: u32) -> Result<PackedValue, HostError>;

    fn modify_parameter(&mut self, index: u32, value: PackedValue) -> Result<(), HostError>;

    fn reset_parameters(&mut self) -> Result<(), HostError>;

    /// Tagged result buffer holding the skin document.
    fn export_parameters(&mut self) -> Result<GuestPtr, HostError>;

    /// Consumes the input buffer, returns a status ordinal.
    fn merge_in_skin(&mut self, ptr: GuestPtr, len: Len) -> Result<u32, HostError>;

    /// `None` when the module predates versioned schemas.
    fn schema_version(&mut self) -> Result<Option<u32>, HostError>;
}

impl<G: GuestModule + ?Sized> GuestModule for &mut G {
    fn read_bytes(&mut self, ptr: GuestPtr, len: Len) -> Result<Vec<u8>, HostError> {
        (**self).read_bytes(ptr, len)
    }

    fn write_bytes(&mut self, ptr: GuestPtr, bytes: &[u8]) -> Result<(), HostError> {
        (**self).write_bytes(ptr, bytes)
    }

    fn allocate(&mut self, len: Len) -> Result<GuestPtr, HostError> {
        (**self).allocate(len)
    }

    fn release(&mut self, ptr: GuestPtr, len: Len) -> Result<(), HostError> {
        (**self).release(ptr, len)
    }

    fn render(&mut self, ptr: GuestPtr, len: Len) -> Result<GuestPtr, HostError> {
        (**self).render(ptr, len)
    }

    fn get_parameter(&mut self, index: u32) -> Result<PackedValue, HostError> {
        (**self).get_parameter(index)
    }

    fn modify_parameter(&mut self, index: u32, value: PackedValue) -> Result<(), HostError> {
        (**self).modify_parameter(index, value)
    }

    fn reset_parameters(&mut self) -> Result<(), HostError> {
        (**self).reset_parameters()
    }

    fn export_parameters(&mut self) -> Result<GuestPtr, HostError> {
        (**self).export_parameters()
    }

    fn merge_in_skin(&mut self, ptr: GuestPtr, len: Len) -> Result<u32, HostError> {
        (**self).merge_in_skin(ptr, len)
    }

    fn schema_version(&mut self) -> Result<Option<u32>, HostError> {
        (**self).schema_version()
    }
}

/// Bounds checked `ptr..ptr + len` for a guest memory of `size` bytes.
pub fn checked_range(ptr: GuestPtr, len: Len, size: usize) -> Result<std::ops::Range<usize>, HostError> {
    let start = ptr as usize;
    match start.checked_add(len as usize) {
        Some(end) if end <= size => Ok(start..end),
        _ => Err(HostError::OutOfBounds { ptr, len }),
    }
}
