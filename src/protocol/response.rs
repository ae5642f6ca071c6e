//! Response definitions
//!
//! The closed set of inbound message variants and their decoding from
//! {opcode, body}. Dispatch is exhaustive; an opcode or RESULT kind outside
//! the known set is a protocol error.

use bytes::Bytes;

use crate::error::{DriverError, Result};

use super::frame::{Frame, Opcode};
use super::types::{get_bytes, get_int, get_short, get_short_bytes, get_string, Row};

// RESULT body kinds
const RESULT_VOID: i32 = 0x0001;
const RESULT_ROWS: i32 = 0x0002;
const RESULT_SET_KEYSPACE: i32 = 0x0003;
const RESULT_PREPARED: i32 = 0x0004;
const RESULT_SCHEMA_CHANGE: i32 = 0x0005;

// Rows metadata flags
const FLAG_GLOBAL_TABLES_SPEC: i32 = 0x0001;

// Column type option ids that carry trailing data
const TYPE_CUSTOM: u16 = 0x0000;
const TYPE_LIST: u16 = 0x0020;
const TYPE_MAP: u16 = 0x0021;
const TYPE_SET: u16 = 0x0022;

/// An inbound protocol message
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Structured server error: [int] code + [string] message
    Error { code: i32, message: String },

    /// Handshake accepted without authentication
    Ready,

    /// Server demands a credential exchange; carries the authenticator
    /// class name
    Authenticate(String),

    /// RESULT/Rows: ordered sequence of row mappings
    Rows(Vec<Row>),

    /// RESULT/Void: acknowledgement without payload
    Void,

    /// RESULT/SetKeyspace: acknowledges the now-active keyspace
    Keyspace(String),

    /// RESULT/Prepared: statement handle plus bind-marker column names in
    /// server order
    Prepared { id: Vec<u8>, columns: Vec<String> },

    /// RESULT/SchemaChange: DDL acknowledgement
    SchemaChange {
        change: String,
        keyspace: String,
        table: String,
    },
}

impl Response {
    /// Decode a response from a received frame
    pub fn decode(frame: &Frame) -> Result<Self> {
        let mut body = frame.body.clone();
        match frame.opcode {
            Opcode::Error => {
                let code = get_int(&mut body)?;
                let message = get_string(&mut body)?;
                Ok(Response::Error { code, message })
            }
            Opcode::Ready => Ok(Response::Ready),
            Opcode::Authenticate => Ok(Response::Authenticate(get_string(&mut body)?)),
            Opcode::Result => decode_result(&mut body),
            other => Err(DriverError::Protocol(format!(
                "Unexpected response opcode: {:?}",
                other
            ))),
        }
    }
}

/// Decode a RESULT body by its [int] kind
fn decode_result(body: &mut Bytes) -> Result<Response> {
    let kind = get_int(body)?;
    match kind {
        RESULT_VOID => Ok(Response::Void),
        RESULT_ROWS => decode_rows(body),
        RESULT_SET_KEYSPACE => Ok(Response::Keyspace(get_string(body)?)),
        RESULT_PREPARED => {
            let id = get_short_bytes(body)?;
            let columns = decode_metadata(body)?;
            Ok(Response::Prepared { id, columns })
        }
        RESULT_SCHEMA_CHANGE => {
            let change = get_string(body)?;
            let keyspace = get_string(body)?;
            let table = get_string(body)?;
            Ok(Response::SchemaChange {
                change,
                keyspace,
                table,
            })
        }
        other => Err(DriverError::Protocol(format!(
            "Unknown RESULT kind: 0x{:04x}",
            other
        ))),
    }
}

/// Decode RESULT/Rows: metadata, then rows_count x columns_count cells
fn decode_rows(body: &mut Bytes) -> Result<Response> {
    let columns = decode_metadata(body)?;
    let rows_count = get_int(body)?;
    if rows_count < 0 {
        return Err(DriverError::Protocol(format!(
            "Negative rows count: {}",
            rows_count
        )));
    }

    let mut rows = Vec::with_capacity(rows_count as usize);
    for _ in 0..rows_count {
        let mut cells = Vec::with_capacity(columns.len());
        for name in &columns {
            cells.push((name.clone(), get_bytes(body)?));
        }
        rows.push(Row { columns: cells });
    }
    Ok(Response::Rows(rows))
}

/// Decode result metadata down to the ordered column names
///
/// Type options are consumed but not retained: cells are surfaced as raw
/// bytes and value decoding is the caller's concern.
fn decode_metadata(body: &mut Bytes) -> Result<Vec<String>> {
    let flags = get_int(body)?;
    let columns_count = get_int(body)?;
    if columns_count < 0 {
        return Err(DriverError::Protocol(format!(
            "Negative columns count: {}",
            columns_count
        )));
    }

    let global_tables_spec = flags & FLAG_GLOBAL_TABLES_SPEC != 0;
    if global_tables_spec {
        let _keyspace = get_string(body)?;
        let _table = get_string(body)?;
    }

    let mut columns = Vec::with_capacity(columns_count as usize);
    for _ in 0..columns_count {
        if !global_tables_spec {
            let _keyspace = get_string(body)?;
            let _table = get_string(body)?;
        }
        columns.push(get_string(body)?);
        skip_type_option(body)?;
    }
    Ok(columns)
}

/// Consume one [option] type descriptor, recursing into collection types
fn skip_type_option(body: &mut Bytes) -> Result<()> {
    let id = get_short(body)?;
    match id {
        TYPE_CUSTOM => {
            let _class = get_string(body)?;
        }
        TYPE_LIST | TYPE_SET => skip_type_option(body)?,
        TYPE_MAP => {
            skip_type_option(body)?;
            skip_type_option(body)?;
        }
        _ => {}
    }
    Ok(())
}
