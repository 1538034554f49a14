//! Length-prefixed framing for the capture stream
//!
//! Frame = 4-byte body length + body. The body is UTF-8 text holding one
//! tracker-frame record. The length is an unsigned 32-bit integer whose
//! byte order must match the capture server; servers on x86 write it
//! little-endian, which is the default here.

use bytes::{BufMut, Bytes, BytesMut};

use rigstream_core::{RigError, RigResult};

/// Length header size in bytes
pub const HEADER_SIZE: usize = 4;

/// Default upper bound on a frame body
pub const DEFAULT_MAX_BODY_LEN: usize = 1 << 20;

/// Byte order of the length header
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ByteOrder {
    #[default]
    LittleEndian,
    BigEndian,
}

/// Parsed length header
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameHeader {
    pub body_len: u32,
}

impl FrameHeader {
    pub fn new(body_len: u32) -> Self {
        FrameHeader { body_len }
    }

    /// Parse from the first 4 bytes of `buf`
    pub fn parse(buf: &[u8], order: ByteOrder) -> RigResult<Self> {
        let bytes: [u8; HEADER_SIZE] = buf
            .get(..HEADER_SIZE)
            .and_then(|b| b.try_into().ok())
            .ok_or(RigError::BufferTooShort {
                expected: HEADER_SIZE,
                actual: buf.len(),
            })?;

        let body_len = match order {
            ByteOrder::LittleEndian => u32::from_le_bytes(bytes),
            ByteOrder::BigEndian => u32::from_be_bytes(bytes),
        };
        Ok(FrameHeader { body_len })
    }

    pub fn to_bytes(self, order: ByteOrder) -> [u8; HEADER_SIZE] {
        match order {
            ByteOrder::LittleEndian => self.body_len.to_le_bytes(),
            ByteOrder::BigEndian => self.body_len.to_be_bytes(),
        }
    }

    /// Check the announced length and return it as a buffer size
    pub fn validate(self, max_body_len: usize) -> RigResult<usize> {
        let len = self.body_len as usize;
        if len == 0 {
            return Err(RigError::InvalidWireFormat("empty frame body".into()));
        }
        if len > max_body_len {
            return Err(RigError::FrameTooLarge {
                len,
                max: max_body_len,
            });
        }
        Ok(len)
    }
}

/// Prefix `body` with its length header
pub fn encode_frame(body: &[u8], order: ByteOrder) -> RigResult<Bytes> {
    let len = u32::try_from(body.len()).map_err(|_| RigError::FrameTooLarge {
        len: body.len(),
        max: u32::MAX as usize,
    })?;

    let mut buf = BytesMut::with_capacity(HEADER_SIZE + body.len());
    match order {
        ByteOrder::LittleEndian => buf.put_u32_le(len),
        ByteOrder::BigEndian => buf.put_u32(len),
    }
    buf.put_slice(body);
    Ok(buf.freeze())
}
