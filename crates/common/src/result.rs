use crate::error::WireError;
use crate::status::StatusCode;
use crate::Len;

/// a failed result buffer is only the status byte
pub const RESULT_STATUS_LEN: Len = 1;

/// status byte followed by a big endian u32 payload length
pub const RESULT_HEADER_LEN: Len = 5;

/// The decoded header of a tagged result buffer.
///
/// Layout in guest memory:
///
/// ```text
/// [status: u8][length: u32 BE][payload: length bytes]   status == Success
/// [status: u8]                                          anything else
/// ```
///
/// The header tells the host exactly how many bytes to hand back to the guest allocator, which
/// does not track allocation sizes itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResultHeader {
    pub status: StatusCode,
    /// only present for successful results
    pub length: Option<Len>,
}

impl ResultHeader {
    pub fn failure(status: StatusCode) -> Self {
        Self {
            status,
            length: None,
        }
    }

    pub fn success(length: Len) -> Self {
        Self {
            status: StatusCode::Success,
            length: Some(length),
        }
    }

    /// The exact size to pass to release for the buffer this header starts.
    ///
    /// A length that cannot fit the address space after the header means the header is corrupt,
    /// only the status byte is known to exist then.
    pub fn release_len(&self) -> Len {
        match self.length {
            Some(length) if self.status.is_success() => RESULT_HEADER_LEN
                .checked_add(length)
                .unwrap_or(RESULT_STATUS_LEN),
            _ => RESULT_STATUS_LEN,
        }
    }
}

pub fn encode_length(length: Len) -> [u8; 4] {
    length.to_be_bytes()
}

pub fn decode_length(bytes: [u8; 4]) -> Len {
    Len::from_be_bytes(bytes)
}

/// Frame a payload as a successful result buffer.
pub fn success_buffer(payload: &[u8]) -> Result<Vec<u8>, WireError> {
    let length: Len = payload
        .len()
        .try_into()
        .map_err(|_| WireError::PayloadTooLarge(payload.len()))?;
    if length > Len::MAX - RESULT_HEADER_LEN {
        return Err(WireError::PayloadTooLarge(payload.len()));
    }
    let mut buffer = Vec::with_capacity(payload.len() + RESULT_HEADER_LEN as usize);
    buffer.push(StatusCode::Success.as_wire());
    buffer.extend_from_slice(&encode_length(length));
    buffer.extend_from_slice(payload);
    Ok(buffer)
}

/// A single status byte. Passing `Success` here yields an empty successful result instead, a
/// lone zero byte would be read as a header with a length that was never written.
pub fn status_buffer(status: StatusCode) -> Vec<u8> {
    if status.is_success() {
        return vec![StatusCode::Success.as_wire(), 0, 0, 0, 0];
    }
    vec![status.as_wire()]
}

/// Parse a complete result buffer held in host memory.
/// Returns the header and the payload slice (empty for failures).
pub fn parse_buffer(bytes: &[u8], known_status_count: u8) -> Result<(ResultHeader, &[u8]), WireError> {
    let Some(&status_byte) = bytes.first() else {
        return Err(WireError::Truncated {
            needed: RESULT_STATUS_LEN as usize,
            available: 0,
        });
    };
    let status = StatusCode::from_wire(status_byte, known_status_count);
    if !status.is_success() {
        return Ok((ResultHeader::failure(status), &[]));
    }
    let header_len = RESULT_HEADER_LEN as usize;
    let length_bytes: [u8; 4] = bytes
        .get(1..header_len)
        .and_then(|b| b.try_into().ok())
        .ok_or(WireError::Truncated {
            needed: header_len,
            available: bytes.len(),
        })?;
    let length = decode_length(length_bytes);
    let end = header_len
        .checked_add(length as usize)
        .ok_or(WireError::Truncated {
            needed: usize::MAX,
            available: bytes.len(),
        })?;
    let payload = bytes.get(header_len..end).ok_or(WireError::Truncated {
        needed: end,
        available: bytes.len(),
    })?;
    Ok((ResultHeader::success(length), payload))
}
