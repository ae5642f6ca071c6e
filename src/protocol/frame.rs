//! Frame definitions
//!
//! One complete wire message: fixed 8-byte header plus body.

use bytes::Bytes;

use crate::error::{DriverError, Result};

/// Header size: version + flags + stream + opcode + 4-byte length
pub const HEADER_SIZE: usize = 8;

/// Protocol version byte for requests
pub const REQUEST_VERSION: u8 = 0x01;

/// Protocol version byte for responses (request version with the high bit set)
pub const RESPONSE_VERSION: u8 = 0x81;

/// Message opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    Error = 0x00,
    Startup = 0x01,
    Ready = 0x02,
    Authenticate = 0x03,
    Credentials = 0x04,
    Options = 0x05,
    Supported = 0x06,
    Query = 0x07,
    Result = 0x08,
    Prepare = 0x09,
    Execute = 0x0a,
}

impl Opcode {
    /// Parse an opcode byte
    pub fn from_u8(byte: u8) -> Result<Self> {
        match byte {
            0x00 => Ok(Opcode::Error),
            0x01 => Ok(Opcode::Startup),
            0x02 => Ok(Opcode::Ready),
            0x03 => Ok(Opcode::Authenticate),
            0x04 => Ok(Opcode::Credentials),
            0x05 => Ok(Opcode::Options),
            0x06 => Ok(Opcode::Supported),
            0x07 => Ok(Opcode::Query),
            0x08 => Ok(Opcode::Result),
            0x09 => Ok(Opcode::Prepare),
            0x0a => Ok(Opcode::Execute),
            _ => Err(DriverError::Protocol(format!(
                "Unknown opcode: 0x{:02x}",
                byte
            ))),
        }
    }
}

/// One complete wire message
///
/// Invariant: the length field written on the wire always equals
/// `body.len()`; the codec enforces this on both paths.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Protocol version byte
    pub version: u8,

    /// Frame flags (compression etc. - always 0 in scope)
    pub flags: u8,

    /// Signed stream id; fixed at 0 since only one request is ever
    /// outstanding per connection
    pub stream: i8,

    /// Message kind
    pub opcode: Opcode,

    /// Opaque message body
    pub body: Bytes,
}

impl Frame {
    /// Build a request frame with the fixed request version and stream 0
    pub fn request(opcode: Opcode, body: Bytes) -> Self {
        Self {
            version: REQUEST_VERSION,
            flags: 0,
            stream: 0,
            opcode,
            body,
        }
    }

    /// Build a response frame (used by tests and mock servers)
    pub fn response(opcode: Opcode, body: Bytes) -> Self {
        Self {
            version: RESPONSE_VERSION,
            flags: 0,
            stream: 0,
            opcode,
            body,
        }
    }
}
