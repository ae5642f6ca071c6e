//! Frame codec
//!
//! Encoding and decoding of wire frames, plus the stream-based I/O helpers
//! that accumulate exactly the required byte counts for header and body.
//! A single transport read may return fewer bytes than requested, so both
//! reads loop until complete (`read_exact`).
//!
//! Failure contract: a transport timeout during either read surfaces as
//! `ConnectionTimeout`; any other transport error as `Connection`.

use std::io::{Read, Write};

use bytes::{Bytes, BytesMut};

use crate::error::{DriverError, Result};

use super::frame::{Frame, Opcode, HEADER_SIZE};

/// Maximum body size accepted from the wire (256 MB, the protocol limit)
pub const MAX_BODY_SIZE: u32 = 256 * 1024 * 1024;

/// Encode a frame to a contiguous byte sequence
///
/// Header layout: version, flags, stream, opcode, length (big-endian u32).
/// The length field is derived from the body, never trusted from the caller.
pub fn encode_frame(frame: &Frame) -> Bytes {
    let mut message = BytesMut::with_capacity(HEADER_SIZE + frame.body.len());
    message.extend_from_slice(&[
        frame.version,
        frame.flags,
        frame.stream as u8,
        frame.opcode as u8,
    ]);
    message.extend_from_slice(&(frame.body.len() as u32).to_be_bytes());
    message.extend_from_slice(&frame.body);
    message.freeze()
}

/// Read a complete frame from a stream
///
/// Blocks until the 8-byte header and the full body have been accumulated.
pub fn read_frame<R: Read>(reader: &mut R) -> Result<Frame> {
    let mut header = [0u8; HEADER_SIZE];
    reader
        .read_exact(&mut header)
        .map_err(|e| DriverError::from_transport(e, "reading frame header"))?;

    let version = header[0];
    let flags = header[1];
    let stream = header[2] as i8;
    let opcode = Opcode::from_u8(header[3])?;
    let length = u32::from_be_bytes([header[4], header[5], header[6], header[7]]);

    if length > MAX_BODY_SIZE {
        return Err(DriverError::Protocol(format!(
            "Frame body too large: {} bytes (max {})",
            length, MAX_BODY_SIZE
        )));
    }

    let mut body = vec![0u8; length as usize];
    if length > 0 {
        reader
            .read_exact(&mut body)
            .map_err(|e| DriverError::from_transport(e, "reading frame body"))?;
    }

    Ok(Frame {
        version,
        flags,
        stream,
        opcode,
        body: Bytes::from(body),
    })
}

/// Write a complete frame to a stream and flush it
pub fn write_frame<W: Write>(writer: &mut W, frame: &Frame) -> Result<()> {
    let bytes = encode_frame(frame);
    writer
        .write_all(&bytes)
        .and_then(|_| writer.flush())
        .map_err(|e| DriverError::from_transport(e, "writing frame"))?;
    Ok(())
}
