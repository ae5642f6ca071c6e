//! CQL notation primitives
//!
//! Readers and writers for the protocol's value notations ([short], [int],
//! [string], [long string], [string map], [bytes], [short bytes],
//! [consistency]), plus the typed values bound to prepared statements and
//! the row representation returned from RESULT/Rows payloads.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{DriverError, Result};

// =============================================================================
// Consistency
// =============================================================================

/// Replication acknowledgement threshold for a read or write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Consistency {
    Any = 0x0000,
    One = 0x0001,
    Two = 0x0002,
    Three = 0x0003,
    Quorum = 0x0004,
    All = 0x0005,
    LocalQuorum = 0x0006,
    EachQuorum = 0x0007,
}

// =============================================================================
// Bound values
// =============================================================================

/// A value bound to a statement parameter
///
/// Serialized as the protocol's [bytes] notation; the binary layout of each
/// variant follows the CQL type serialization rules.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Int(i32),
    Bigint(i64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    /// Append this value to `buf` in [bytes] notation (null = length -1)
    pub fn put(&self, buf: &mut BytesMut) {
        match self {
            Value::Null => buf.put_i32(-1),
            Value::Boolean(b) => {
                buf.put_i32(1);
                buf.put_u8(u8::from(*b));
            }
            Value::Int(n) => {
                buf.put_i32(4);
                buf.put_i32(*n);
            }
            Value::Bigint(n) => {
                buf.put_i32(8);
                buf.put_i64(*n);
            }
            Value::Text(s) => {
                buf.put_i32(s.len() as i32);
                buf.put_slice(s.as_bytes());
            }
            Value::Blob(b) => {
                buf.put_i32(b.len() as i32);
                buf.put_slice(b);
            }
        }
    }
}

// =============================================================================
// Rows
// =============================================================================

/// One row of a RESULT/Rows payload: column name → raw cell bytes, in
/// server column order
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// (column name, cell bytes) pairs; `None` marks a null cell
    pub columns: Vec<(String, Option<Vec<u8>>)>,
}

impl Row {
    /// Look up a cell by column name; returns `None` for missing columns
    /// and for null cells
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.columns
            .iter()
            .find(|(col, _)| col == name)
            .and_then(|(_, cell)| cell.as_deref())
    }
}

// =============================================================================
// Writers
// =============================================================================

/// [string]: u16 length + UTF-8 bytes
///
/// The length prefix is 16 bits; longer input cannot be represented and
/// is rejected rather than silently truncated.
pub(crate) fn put_string(buf: &mut BytesMut, s: &str) -> Result<()> {
    if s.len() > u16::MAX as usize {
        return Err(DriverError::Protocol(format!(
            "[string] too long: {} bytes (max {})",
            s.len(),
            u16::MAX
        )));
    }
    buf.put_u16(s.len() as u16);
    buf.put_slice(s.as_bytes());
    Ok(())
}

/// [long string]: u32 length + UTF-8 bytes
pub(crate) fn put_long_string(buf: &mut BytesMut, s: &str) {
    buf.put_u32(s.len() as u32);
    buf.put_slice(s.as_bytes());
}

/// [string map]: u16 pair count + [string] key/value pairs
pub(crate) fn put_string_map(buf: &mut BytesMut, pairs: &[(&str, &str)]) -> Result<()> {
    buf.put_u16(pairs.len() as u16);
    for (key, value) in pairs {
        put_string(buf, key)?;
        put_string(buf, value)?;
    }
    Ok(())
}

/// [short bytes]: u16 length + bytes
pub(crate) fn put_short_bytes(buf: &mut BytesMut, bytes: &[u8]) {
    buf.put_u16(bytes.len() as u16);
    buf.put_slice(bytes);
}

/// [consistency]: u16 wire value
pub(crate) fn put_consistency(buf: &mut BytesMut, level: Consistency) {
    buf.put_u16(level as u16);
}

// =============================================================================
// Readers
// =============================================================================

fn need(buf: &Bytes, count: usize, what: &str) -> Result<()> {
    if buf.remaining() < count {
        return Err(DriverError::Protocol(format!(
            "Truncated {}: need {} bytes, have {}",
            what,
            count,
            buf.remaining()
        )));
    }
    Ok(())
}

/// Read a [short] (u16 big-endian)
pub(crate) fn get_short(buf: &mut Bytes) -> Result<u16> {
    need(buf, 2, "[short]")?;
    Ok(buf.get_u16())
}

/// Read an [int] (i32 big-endian)
pub(crate) fn get_int(buf: &mut Bytes) -> Result<i32> {
    need(buf, 4, "[int]")?;
    Ok(buf.get_i32())
}

/// Read a [string]
pub(crate) fn get_string(buf: &mut Bytes) -> Result<String> {
    let len = get_short(buf)? as usize;
    need(buf, len, "[string]")?;
    let raw = buf.split_to(len);
    String::from_utf8(raw.to_vec())
        .map_err(|e| DriverError::Protocol(format!("Invalid UTF-8 in [string]: {}", e)))
}

/// Read [bytes]: i32 length + bytes, negative length = null
pub(crate) fn get_bytes(buf: &mut Bytes) -> Result<Option<Vec<u8>>> {
    let len = get_int(buf)?;
    if len < 0 {
        return Ok(None);
    }
    let len = len as usize;
    need(buf, len, "[bytes]")?;
    Ok(Some(buf.split_to(len).to_vec()))
}

/// Read [short bytes]: u16 length + bytes
pub(crate) fn get_short_bytes(buf: &mut Bytes) -> Result<Vec<u8>> {
    let len = get_short(buf)? as usize;
    need(buf, len, "[short bytes]")?;
    Ok(buf.split_to(len).to_vec())
}
