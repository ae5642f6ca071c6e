//! Request definitions
//!
//! Typed representations of the outbound message kinds and their body
//! serialization per the CQL v1 grammar.

use bytes::BytesMut;

use crate::error::Result;

use super::frame::{Frame, Opcode};
use super::types::{
    put_consistency, put_long_string, put_short_bytes, put_string_map, Consistency, Value,
};

/// An outbound protocol message
#[derive(Debug, Clone)]
pub enum Request {
    /// Open the protocol session; body is a [string map] of options
    Startup { cql_version: String },

    /// Answer an AUTHENTICATE challenge; body is a [string map] of
    /// credentials
    Credentials { username: String, password: String },

    /// Execute a CQL statement without bound parameters
    Query { cql: String, consistency: Consistency },

    /// Ask the server to parse a statement and return a handle
    Prepare { cql: String },

    /// Execute a prepared statement with bound values
    Execute {
        id: Vec<u8>,
        values: Vec<Value>,
        consistency: Consistency,
    },
}

impl Request {
    /// The opcode this request is framed with
    pub fn opcode(&self) -> Opcode {
        match self {
            Request::Startup { .. } => Opcode::Startup,
            Request::Credentials { .. } => Opcode::Credentials,
            Request::Query { .. } => Opcode::Query,
            Request::Prepare { .. } => Opcode::Prepare,
            Request::Execute { .. } => Opcode::Execute,
        }
    }

    /// Serialize the message body
    ///
    /// Fails when a field cannot be represented in its wire notation, such
    /// as a [string] longer than its 16-bit length prefix allows.
    pub fn encode_body(&self) -> Result<BytesMut> {
        let mut body = BytesMut::new();
        match self {
            Request::Startup { cql_version } => {
                put_string_map(&mut body, &[("CQL_VERSION", cql_version.as_str())])?;
            }
            Request::Credentials { username, password } => {
                put_string_map(
                    &mut body,
                    &[
                        ("username", username.as_str()),
                        ("password", password.as_str()),
                    ],
                )?;
            }
            Request::Query { cql, consistency } => {
                put_long_string(&mut body, cql);
                put_consistency(&mut body, *consistency);
            }
            Request::Prepare { cql } => {
                put_long_string(&mut body, cql);
            }
            Request::Execute {
                id,
                values,
                consistency,
            } => {
                put_short_bytes(&mut body, id);
                body.extend_from_slice(&(values.len() as u16).to_be_bytes());
                for value in values {
                    value.put(&mut body);
                }
                put_consistency(&mut body, *consistency);
            }
        }
        Ok(body)
    }

    /// Frame this request for the wire
    pub fn to_frame(&self) -> Result<Frame> {
        Ok(Frame::request(self.opcode(), self.encode_body()?.freeze()))
    }
}
