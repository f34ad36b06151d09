//! A scripted in-memory guest for unit tests.

use crate::error::HostError;
use crate::guest::checked_range;
use crate::guest::GuestModule;
use render_wasmer_common::*;
use std::collections::BTreeMap;

pub struct FakeGuest {
    pub memory: Vec<u8>,
    next: GuestPtr,
    /// ptr -> allocated size
    pub live: BTreeMap<GuestPtr, Len>,
    /// every release in order
    pub released: Vec<(GuestPtr, Len)>,
    pub params: Vec<PackedValue>,
    pub schema: Option<u32>,
    pub merge_status: u32,
    /// (index, value) pairs a merge applies
    pub merge_writes: Vec<(u32, PackedValue)>,
}

impl Default for FakeGuest {
    fn default() -> Self {
        Self {
            memory: vec![0; 1 << 16],
            next: 8,
            live: BTreeMap::new(),
            released: Vec::new(),
            params: SCHEMA_V2.defaults(),
            schema: Some(2),
            merge_status: 0,
            merge_writes: Vec::new(),
        }
    }
}

impl FakeGuest {
    fn leak(&mut self, bytes: &[u8]) -> Result<GuestPtr, HostError> {
        let ptr = self.allocate(bytes.len() as Len)?;
        self.write_bytes(ptr, bytes)?;
        Ok(ptr)
    }
}

impl GuestModule for FakeGuest {
    fn read_bytes(&mut self, ptr: GuestPtr, len: Len) -> Result<Vec<u8>, HostError> {
        let range = checked_range(ptr, len, self.memory.len())?;
        Ok(self.memory[range].to_vec())
    }

    fn write_bytes(&mut self, ptr: GuestPtr, bytes: &[u8]) -> Result<(), HostError> {
        let len = bytes.len() as Len;
        let inside = self
            .live
            .range(..=ptr)
            .next_back()
            .map(|(start, size)| ptr + len <= start + size)
            .unwrap_or(false);
        if !inside {
            return Err(HostError::OutOfBounds { ptr, len });
        }
        let range = checked_range(ptr, len, self.memory.len())?;
        self.memory[range].copy_from_slice(bytes);
        Ok(())
    }

    fn allocate(&mut self, len: Len) -> Result<GuestPtr, HostError> {
        let ptr = self.next;
        self.next += len.max(1);
        self.live.insert(ptr, len);
        Ok(ptr)
    }

    fn release(&mut self, ptr: GuestPtr, len: Len) -> Result<(), HostError> {
        match self.live.remove(&ptr) {
            Some(size) if len <= size => {
                self.released.push((ptr, len));
                Ok(())
            }
            _ => Err(HostError::Runtime(format!("bad release of {} at {}", len, ptr))),
        }
    }

    fn render(&mut self, ptr: GuestPtr, len: Len) -> Result<GuestPtr, HostError> {
        let input = String::from_utf8(self.read_bytes(ptr, len)?)?;
        self.release(ptr, len)?;
        let buffer = if input.is_empty() {
            status_buffer(StatusCode::MalformedInput)
        } else {
            success_buffer(format!("<svg>{}</svg>", input).as_bytes())?
        };
        self.leak(&buffer)
    }

    fn get_parameter(&mut self, index: u32) -> Result<PackedValue, HostError> {
        Ok(self.params.get(index as usize).copied().unwrap_or_default())
    }

    fn modify_parameter(&mut self, index: u32, value: PackedValue) -> Result<(), HostError> {
        if let Some(slot) = self.params.get_mut(index as usize) {
            *slot = value;
        }
        Ok(())
    }

    fn reset_parameters(&mut self) -> Result<(), HostError> {
        self.params = SCHEMA_V2.defaults();
        Ok(())
    }

    fn export_parameters(&mut self) -> Result<GuestPtr, HostError> {
        let json = format!("{{\"signal-height\":{}}}", self.params[0]);
        let buffer = success_buffer(json.as_bytes())?;
        self.leak(&buffer)
    }

    fn merge_in_skin(&mut self, ptr: GuestPtr, len: Len) -> Result<u32, HostError> {
        self.release(ptr, len)?;
        for (index, value) in self.merge_writes.clone() {
            self.modify_parameter(index, value)?;
        }
        Ok(self.merge_status)
    }

    fn schema_version(&mut self) -> Result<Option<u32>, HostError> {
        Ok(self.schema)
    }
}
