use crate::error::HostError;
use crate::guest::GuestModule;
use render_wasmer_common::GuestPtr;
use render_wasmer_common::Len;

/// A range of guest memory the host is responsible for releasing.
///
/// The guest allocator keeps no record of sizes, so whoever holds a range has to remember the
/// exact size to release it with. This guard captures `(ptr, len)` when the range is obtained and
/// releases it on every exit path. Ownership moves to the guest with [`GuestAllocation::hand_over`],
/// after which dropping the guard does nothing.
///
/// The guard borrows the guest for its whole life, the guest can still be reached through
/// [`GuestAllocation::guest`] to call exports that use the range.
pub struct GuestAllocation<'g, G: GuestModule + ?Sized> {
    guest: &'g mut G,
    ptr: GuestPtr,
    len: Len,
    owned: bool,
}

impl<'g, G: GuestModule + ?Sized> GuestAllocation<'g, G> {
    /// Allocate `len` bytes in the guest.
    pub fn acquire(guest: &'g mut G, len: Len) -> Result<Self, HostError> {
        let ptr = guest.allocate(len)?;
        tracing::debug!(ptr, len, "allocate");
        Ok(Self::adopt(guest, ptr, len))
    }

    /// Take responsibility for a range the guest allocated, e.g. a returned result buffer.
    pub fn adopt(guest: &'g mut G, ptr: GuestPtr, len: Len) -> Self {
        Self {
            guest,
            ptr,
            len,
            owned: true,
        }
    }

    pub fn ptr(&self) -> GuestPtr {
        self.ptr
    }

    /// The size this range will be released with.
    pub fn len(&self) -> Len {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn guest(&mut self) -> &mut G {
        &mut *self.guest
    }

    /// Change the size the range will be released with, once the protocol reveals the true size
    /// of a buffer the guest produced.
    pub fn resize(&mut self, len: Len) {
        self.len = len;
    }

    /// Read `len` bytes at `offset` into the range.
    pub fn read(&mut self, offset: Len, len: Len) -> Result<Vec<u8>, HostError> {
        let ptr = self
            .ptr
            .checked_add(offset)
            .ok_or(HostError::OutOfBounds { ptr: self.ptr, len })?;
        self.guest.read_bytes(ptr, len)
    }

    pub fn write(&mut self, bytes: &[u8]) -> Result<(), HostError> {
        self.guest.write_bytes(self.ptr, bytes)
    }

    /// The guest now owns the range and will release it itself.
    pub fn hand_over(&mut self) -> (GuestPtr, Len) {
        self.owned = false;
        (self.ptr, self.len)
    }

    /// Release now and surface any failure, instead of logging it on drop.
    pub fn release(mut self) -> Result<(), HostError> {
        self.owned = false;
        tracing::debug!(ptr = self.ptr, len = self.len, "release");
        self.guest.release(self.ptr, self.len)
    }
}

impl<'g, G: GuestModule + ?Sized> Drop for GuestAllocation<'g, G> {
    fn drop(&mut self) {
        if self.owned {
            tracing::debug!(ptr = self.ptr, len = self.len, "release on drop");
            if let Err(e) = self.guest.release(self.ptr, self.len) {
                tracing::error!(ptr = self.ptr, len = self.len, error = %e, "failed to release guest allocation");
            }
        }
    }
}
