use render_wasmer_common::*;
use render_wasmer_guest::RenderModule;
use render_wasmer_guest::Renderer;
use render_wasmer_host::error::HostError;
use render_wasmer_host::guest::checked_range;
use render_wasmer_host::guest::GuestModule;
use std::collections::BTreeMap;

/// keep address zero unused so a zero pointer is always a bug
const ARENA_START: GuestPtr = 8;

/// Who asked for an allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    /// through the allocate export
    Host,
    /// a result buffer the guest produced
    Guest,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Block {
    pub capacity: Len,
    pub origin: Origin,
}

/// Allocator misuse the arena caught.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Violation {
    /// not a live allocation: released twice, or never allocated
    UnknownRelease { ptr: GuestPtr, len: Len },
    /// released with a size the protocol does not allow for this block
    SizeMismatch { ptr: GuestPtr, len: Len, block: Block },
}

/// Every allocator event, for tests to assert on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Audit {
    pub releases: Vec<(GuestPtr, Len)>,
    pub violations: Vec<Violation>,
}

/// A render module running in-process over a byte vector, with an auditing bump allocator.
///
/// Memory is never reused, so any stale pointer still reads what it last held and every release
/// can be checked against the exact block it names. Guest produced blocks must be released with
/// their exact size. Host allocated input may be released with the written length, since the guest
/// consumes it without knowing how much slack the host added.
pub struct ArenaGuest<R> {
    module: RenderModule<R>,
    memory: Vec<u8>,
    next: GuestPtr,
    live: BTreeMap<GuestPtr, Block>,
    schema_export: bool,
    pub audit: Audit,
}

impl<R: Renderer> ArenaGuest<R> {
    pub fn new(module: RenderModule<R>) -> Self {
        Self {
            module,
            memory: vec![0; ARENA_START as usize],
            next: ARENA_START,
            live: BTreeMap::new(),
            schema_export: true,
            audit: Audit::default(),
        }
    }

    /// Behave like a module built before versioned schemas.
    pub fn without_schema_export(mut self) -> Self {
        self.schema_export = false;
        self
    }

    pub fn module(&self) -> &RenderModule<R> {
        &self.module
    }

    pub fn live(&self) -> &BTreeMap<GuestPtr, Block> {
        &self.live
    }

    /// No leaks and no misuse so far.
    pub fn is_clean(&self) -> bool {
        self.live.is_empty() && self.audit.violations.is_empty()
    }

    fn reserve(&mut self, len: Len, origin: Origin) -> Result<GuestPtr, HostError> {
        let ptr = self.next;
        let end = ptr
            .checked_add(len.max(1))
            .ok_or(HostError::OutOfBounds { ptr, len })?;
        self.memory.resize(end as usize, 0);
        self.next = end;
        self.live.insert(
            ptr,
            Block {
                capacity: len,
                origin,
            },
        );
        Ok(ptr)
    }

    fn free(&mut self, ptr: GuestPtr, len: Len) {
        self.audit.releases.push((ptr, len));
        let Some(block) = self.live.remove(&ptr) else {
            tracing::error!(ptr, len, "release of unknown block");
            self.audit.violations.push(Violation::UnknownRelease { ptr, len });
            return;
        };
        let allowed = match block.origin {
            Origin::Guest => len == block.capacity,
            Origin::Host => len <= block.capacity,
        };
        if !allowed {
            tracing::error!(ptr, len, ?block, "release size mismatch");
            self.audit
                .violations
                .push(Violation::SizeMismatch { ptr, len, block });
        }
    }

    /// Take an input buffer the way the guest does: copy out, then release with the length.
    fn consume(&mut self, ptr: GuestPtr, len: Len) -> Result<Vec<u8>, HostError> {
        let input = self.read_bytes(ptr, len)?;
        self.free(ptr, len);
        Ok(input)
    }

    fn leak(&mut self, bytes: &[u8]) -> Result<GuestPtr, HostError> {
        let ptr = self.reserve(bytes.len() as Len, Origin::Guest)?;
        let range = checked_range(ptr, bytes.len() as Len, self.memory.len())?;
        self.memory[range].copy_from_slice(bytes);
        Ok(ptr)
    }
}

impl<R: Renderer> GuestModule for ArenaGuest<R> {
    fn read_bytes(&mut self, ptr: GuestPtr, len: Len) -> Result<Vec<u8>, HostError> {
        let range = checked_range(ptr, len, self.memory.len())?;
        Ok(self.memory[range].to_vec())
    }

    fn write_bytes(&mut self, ptr: GuestPtr, bytes: &[u8]) -> Result<(), HostError> {
        let range = checked_range(ptr, bytes.len() as Len, self.memory.len())?;
        self.memory[range].copy_from_slice(bytes);
        Ok(())
    }

    fn allocate(&mut self, len: Len) -> Result<GuestPtr, HostError> {
        self.reserve(len, Origin::Host)
    }

    fn release(&mut self, ptr: GuestPtr, len: Len) -> Result<(), HostError> {
        self.free(ptr, len);
        Ok(())
    }

    fn render(&mut self, ptr: GuestPtr, len: Len) -> Result<GuestPtr, HostError> {
        let input = self.consume(ptr, len)?;
        let buffer = self.module.render(&input);
        self.leak(&buffer)
    }

    fn get_parameter(&mut self, index: u32) -> Result<PackedValue, HostError> {
        Ok(self.module.get_parameter(index))
    }

    fn modify_parameter(&mut self, index: u32, value: PackedValue) -> Result<(), HostError> {
        self.module.modify_parameter(index, value);
        Ok(())
    }

    fn reset_parameters(&mut self) -> Result<(), HostError> {
        self.module.reset_parameters();
        Ok(())
    }

    fn export_parameters(&mut self) -> Result<GuestPtr, HostError> {
        let buffer = self.module.export_parameters();
        self.leak(&buffer)
    }

    fn merge_in_skin(&mut self, ptr: GuestPtr, len: Len) -> Result<u32, HostError> {
        let input = self.consume(ptr, len)?;
        Ok(self.module.merge_in_skin(&input))
    }

    fn schema_version(&mut self) -> Result<Option<u32>, HostError> {
        Ok(self.schema_export.then(|| self.module.schema_version()))
    }
}
