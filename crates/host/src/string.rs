use crate::allocation::GuestAllocation;
use crate::config::HostConfig;
use crate::error::HostError;
use crate::guest::GuestModule;
use render_wasmer_common::GuestPtr;
use render_wasmer_common::Len;

/// Host text written into a guest buffer.
///
/// `written` is how many bytes of the buffer hold text. The allocation itself is sized with
/// slack and may be larger, it is released with its allocated size unless it is handed over.
pub struct EncodedString<'g, G: GuestModule + ?Sized> {
    pub allocation: GuestAllocation<'g, G>,
    pub written: Len,
    pub truncated: bool,
}

impl<'g, G: GuestModule + ?Sized> EncodedString<'g, G> {
    /// Give the buffer to an export that consumes it. Returns the `(ptr, len)` pair to pass.
    pub fn hand_over(&mut self) -> (GuestPtr, Len) {
        let (ptr, _) = self.allocation.hand_over();
        (ptr, self.written)
    }

    pub fn guest(&mut self) -> &mut G {
        self.allocation.guest()
    }
}

/// Longest prefix of `text` that fits `limit` bytes without splitting a character.
pub fn truncate_to_boundary(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }
    let end = (0..=limit)
        .rev()
        .find(|i| text.is_char_boundary(*i))
        .unwrap_or(0);
    &text[..end]
}

/// Write `text` into a fresh guest buffer.
///
/// The buffer is sized at `encode_slack` times the utf-8 length, capped at `max_input_bytes`.
/// Text that does not fit is truncated at a character boundary. That is a warning, not an error:
/// the shortened text is still what the guest gets.
pub fn encode<'g, G: GuestModule + ?Sized>(
    guest: &'g mut G,
    text: &str,
    config: &HostConfig,
) -> Result<EncodedString<'g, G>, HostError> {
    let capacity = text
        .len()
        .saturating_mul(config.encode_slack as usize)
        .min(config.max_input_bytes as usize);
    let fitting = truncate_to_boundary(text, capacity);
    let truncated = fitting.len() < text.len();
    if truncated {
        tracing::warn!(
            input = text.len(),
            written = fitting.len(),
            "input truncated to fit its guest buffer"
        );
    }

    // capacity is bounded by max_input_bytes which is a Len
    let mut allocation = GuestAllocation::acquire(guest, capacity as Len)?;
    allocation.write(fitting.as_bytes())?;
    Ok(EncodedString {
        allocation,
        written: fitting.len() as Len,
        truncated,
    })
}

/// Read `len` bytes at `ptr` as utf-8. Nothing is released.
pub fn decode<G: GuestModule + ?Sized>(guest: &mut G, ptr: GuestPtr, len: Len) -> Result<String, HostError> {
    Ok(String::from_utf8(guest.read_bytes(ptr, len)?)?)
}
