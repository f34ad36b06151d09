use render_wasmer_common::Len;
use std::alloc;
use std::alloc::Layout;
use std::ptr;

/// every block carries its true size just below the pointer handed out
const HEADER_LEN: usize = std::mem::size_of::<usize>();
const BLOCK_ALIGN: usize = std::mem::align_of::<usize>();

fn block_layout(capacity: usize) -> Layout {
    // capacity never exceeds u32::MAX plus a header so this cannot overflow isize on any target
    // we build for
    match Layout::from_size_align(capacity + HEADER_LEN, BLOCK_ALIGN) {
        Ok(layout) => layout,
        Err(_) => alloc::handle_alloc_error(Layout::new::<usize>()),
    }
}

/// allocate a length of bytes that won't be dropped by the allocator
/// return the pointer to it so bytes can be written to the allocation
///
/// zero length requests are bumped to one byte so every pointer handed out is distinct and can be
/// released
pub fn allocate(len: Len) -> *mut u8 {
    let capacity = (len as usize).max(1);
    let layout = block_layout(capacity);
    // SAFETY: the layout is never zero sized because of the header
    let base = unsafe { alloc::alloc_zeroed(layout) };
    if base.is_null() {
        alloc::handle_alloc_error(layout);
    }
    // SAFETY: base is valid for the header and aligned for usize
    unsafe {
        ptr::write(base as *mut usize, capacity);
        base.add(HEADER_LEN)
    }
}

/// restore an allocation so that it is dropped immediately
///
/// the host passes the size the protocol computed for the buffer, which for input text is the
/// number of bytes written rather than the number allocated. the block header holds the real
/// capacity so the layout handed back to the allocator is always the one it gave out.
///
/// # Safety
///
/// `ptr` must come from [`allocate`] and must not have been released yet.
pub unsafe fn release(ptr: *mut u8, len: Len) {
    let base = ptr.sub(HEADER_LEN);
    let capacity = ptr::read(base as *const usize);
    if len as usize > capacity {
        tracing::warn!(len, capacity, "release larger than the allocation");
    }
    alloc::dealloc(base, block_layout(capacity));
}

/// Copy `bytes` into a fresh allocation and return the pointer.
/// The recipient is responsible for releasing it with `bytes.len()`.
pub fn leak_bytes(bytes: &[u8]) -> *mut u8 {
    let ptr = allocate(bytes.len() as Len);
    // SAFETY: the allocation holds at least bytes.len() bytes and cannot overlap a live slice
    unsafe { ptr::copy_nonoverlapping(bytes.as_ptr(), ptr, bytes.len()) };
    ptr
}

/// Take ownership of a buffer the host wrote into: copy the `len` written bytes out and release
/// the allocation.
///
/// # Safety
///
/// `ptr` must come from [`allocate`] with at least `len` bytes and must not be used afterwards.
pub unsafe fn consume(ptr: *mut u8, len: Len) -> Vec<u8> {
    let bytes = std::slice::from_raw_parts(ptr, len as usize).to_vec();
    release(ptr, len);
    bytes
}
