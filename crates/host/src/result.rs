use crate::allocation::GuestAllocation;
use crate::error::HostError;
use crate::guest::GuestModule;
use render_wasmer_common::*;

/// What a guest export that can fail produced: the payload bytes, or the status it failed with.
pub type GuestOutcome<T> = Result<T, StatusCode>;

/// Consume the tagged result buffer at `ptr`.
///
/// The status byte is read first and clamped to the statuses the negotiated schema knows. A
/// failure is a single byte and is released with size 1. A success carries a big endian length
/// and is released with size `5 + length` once the payload has been copied out. The buffer is
/// released on every path, including reads that fail halfway.
pub fn decode_result<G: GuestModule + ?Sized>(
    guest: &mut G,
    ptr: GuestPtr,
    status_count: u8,
) -> Result<GuestOutcome<Vec<u8>>, HostError> {
    let mut buffer = GuestAllocation::adopt(guest, ptr, RESULT_STATUS_LEN);

    let status_byte = buffer
        .read(0, RESULT_STATUS_LEN)?
        .first()
        .copied()
        .ok_or(HostError::OutOfBounds {
            ptr,
            len: RESULT_STATUS_LEN,
        })?;
    let status = StatusCode::from_wire(status_byte, status_count);
    if !status.is_success() {
        tracing::debug!(%status, byte = status_byte, "guest reported failure");
        buffer.release()?;
        return Ok(Err(status));
    }

    let length_bytes: [u8; 4] = buffer
        .read(RESULT_STATUS_LEN, RESULT_HEADER_LEN - RESULT_STATUS_LEN)?
        .try_into()
        .map_err(|_| HostError::OutOfBounds {
            ptr,
            len: RESULT_HEADER_LEN,
        })?;
    let length = decode_length(length_bytes);
    if RESULT_HEADER_LEN.checked_add(length).is_none() {
        tracing::error!(ptr, length, "result length overflows guest memory");
        buffer.release()?;
        return Err(HostError::OutOfBounds { ptr, len: length });
    }
    let header = ResultHeader::success(length);
    buffer.resize(header.release_len());

    let payload = buffer.read(RESULT_HEADER_LEN, header.length.unwrap_or_default())?;
    buffer.release()?;
    Ok(Ok(payload))
}

/// [`decode_result`] with the payload read as utf-8.
pub fn decode_text_result<G: GuestModule + ?Sized>(
    guest: &mut G,
    ptr: GuestPtr,
    status_count: u8,
) -> Result<GuestOutcome<String>, HostError> {
    match decode_result(guest, ptr, status_count)? {
        Ok(payload) => Ok(Ok(String::from_utf8(payload)?)),
        Err(status) => Ok(Err(status)),
    }
}
