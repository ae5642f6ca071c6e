//! Codec Tests
//!
//! Tests for frame encoding/decoding, request body serialization, and
//! response parsing.

use std::io::{Cursor, Read};

use bytes::Bytes;
use cqlsync::error::DriverError;
use cqlsync::protocol::{
    encode_frame, read_frame, Consistency, Frame, Opcode, Request, Response, Value, HEADER_SIZE,
    REQUEST_VERSION, RESPONSE_VERSION,
};

// =============================================================================
// Test Helpers
// =============================================================================

/// A reader that hands out at most `chunk` bytes per read call, to exercise
/// the accumulate-until-complete discipline
struct ChunkedReader {
    data: Vec<u8>,
    pos: usize,
    chunk: usize,
}

impl ChunkedReader {
    fn new(data: Vec<u8>, chunk: usize) -> Self {
        Self {
            data,
            pos: 0,
            chunk,
        }
    }
}

impl Read for ChunkedReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let remaining = self.data.len() - self.pos;
        let n = remaining.min(self.chunk).min(buf.len());
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// A reader whose first read fails with the given error kind
struct FailingReader {
    kind: std::io::ErrorKind,
}

impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
        Err(std::io::Error::new(self.kind, "simulated"))
    }
}

fn string(s: &str) -> Vec<u8> {
    let mut out = (s.len() as u16).to_be_bytes().to_vec();
    out.extend_from_slice(s.as_bytes());
    out
}

fn int(n: i32) -> Vec<u8> {
    n.to_be_bytes().to_vec()
}

fn cell(bytes: &[u8]) -> Vec<u8> {
    let mut out = (bytes.len() as i32).to_be_bytes().to_vec();
    out.extend_from_slice(bytes);
    out
}

// =============================================================================
// Frame Round-Trip Tests
// =============================================================================

#[test]
fn test_frame_round_trip() {
    let body = Bytes::from_static(b"arbitrary body bytes");
    let frame = Frame::request(Opcode::Query, body.clone());
    let encoded = encode_frame(&frame);

    // Header layout: version, flags, stream, opcode, length (BE u32)
    assert_eq!(encoded.len(), HEADER_SIZE + body.len());
    assert_eq!(encoded[0], REQUEST_VERSION);
    assert_eq!(encoded[1], 0);
    assert_eq!(encoded[2], 0);
    assert_eq!(encoded[3], Opcode::Query as u8);
    let length = u32::from_be_bytes([encoded[4], encoded[5], encoded[6], encoded[7]]);
    assert_eq!(length as usize, body.len());

    let decoded = read_frame(&mut Cursor::new(encoded.to_vec())).unwrap();
    assert_eq!(decoded.opcode, Opcode::Query);
    assert_eq!(decoded.body, body);
    assert_eq!(decoded.version, REQUEST_VERSION);
}

#[test]
fn test_frame_round_trip_empty_body() {
    let frame = Frame::response(Opcode::Ready, Bytes::new());
    let encoded = encode_frame(&frame);
    assert_eq!(encoded.len(), HEADER_SIZE);

    let decoded = read_frame(&mut Cursor::new(encoded.to_vec())).unwrap();
    assert_eq!(decoded.opcode, Opcode::Ready);
    assert_eq!(decoded.version, RESPONSE_VERSION);
    assert!(decoded.body.is_empty());
}

#[test]
fn test_frame_round_trip_every_opcode() {
    let opcodes = [
        Opcode::Error,
        Opcode::Startup,
        Opcode::Ready,
        Opcode::Authenticate,
        Opcode::Credentials,
        Opcode::Options,
        Opcode::Supported,
        Opcode::Query,
        Opcode::Result,
        Opcode::Prepare,
        Opcode::Execute,
    ];
    for opcode in opcodes {
        let frame = Frame::request(opcode, Bytes::from_static(&[0xde, 0xad]));
        let decoded = read_frame(&mut Cursor::new(encode_frame(&frame).to_vec())).unwrap();
        assert_eq!(decoded.opcode, opcode);
        assert_eq!(decoded.body.as_ref(), &[0xde, 0xad]);
    }
}

#[test]
fn test_partial_reads_accumulate() {
    let body: Vec<u8> = (0u8..=255).collect();
    let frame = Frame::request(Opcode::Execute, Bytes::from(body.clone()));
    let encoded = encode_frame(&frame).to_vec();

    // One byte at a time
    let mut reader = ChunkedReader::new(encoded.clone(), 1);
    let decoded = read_frame(&mut reader).unwrap();
    assert_eq!(decoded.opcode, Opcode::Execute);
    assert_eq!(decoded.body.as_ref(), body.as_slice());

    // Awkward chunk sizes that straddle the header/body boundary
    for chunk in [3, 7, 13] {
        let mut reader = ChunkedReader::new(encoded.clone(), chunk);
        let decoded = read_frame(&mut reader).unwrap();
        assert_eq!(decoded.body.as_ref(), body.as_slice());
    }
}

#[test]
fn test_read_timeout_maps_to_connection_timeout() {
    let mut reader = FailingReader {
        kind: std::io::ErrorKind::WouldBlock,
    };
    let err = read_frame(&mut reader).unwrap_err();
    assert!(matches!(err, DriverError::ConnectionTimeout(_)));

    let mut reader = FailingReader {
        kind: std::io::ErrorKind::TimedOut,
    };
    let err = read_frame(&mut reader).unwrap_err();
    assert!(matches!(err, DriverError::ConnectionTimeout(_)));
}

#[test]
fn test_other_transport_error_maps_to_connection_error() {
    let mut reader = FailingReader {
        kind: std::io::ErrorKind::ConnectionReset,
    };
    let err = read_frame(&mut reader).unwrap_err();
    assert!(matches!(err, DriverError::Connection(_)));
}

#[test]
fn test_truncated_stream_is_connection_error() {
    let frame = Frame::request(Opcode::Query, Bytes::from_static(b"full body"));
    let mut encoded = encode_frame(&frame).to_vec();
    encoded.truncate(HEADER_SIZE + 3); // body cut short

    let err = read_frame(&mut Cursor::new(encoded)).unwrap_err();
    assert!(matches!(err, DriverError::Connection(_)));
}

#[test]
fn test_oversized_length_rejected() {
    let mut header = vec![RESPONSE_VERSION, 0, 0, Opcode::Result as u8];
    header.extend_from_slice(&u32::MAX.to_be_bytes());

    let err = read_frame(&mut Cursor::new(header)).unwrap_err();
    assert!(matches!(err, DriverError::Protocol(_)));
}

#[test]
fn test_unknown_opcode_rejected() {
    let mut header = vec![RESPONSE_VERSION, 0, 0, 0x7f];
    header.extend_from_slice(&0u32.to_be_bytes());

    let err = read_frame(&mut Cursor::new(header)).unwrap_err();
    assert!(matches!(err, DriverError::Protocol(_)));
}

// =============================================================================
// Request Body Serialization Tests
// =============================================================================

#[test]
fn test_startup_body_layout() {
    let request = Request::Startup {
        cql_version: "3.0.0".to_string(),
    };
    let mut expected = 1u16.to_be_bytes().to_vec(); // one map entry
    expected.extend_from_slice(&string("CQL_VERSION"));
    expected.extend_from_slice(&string("3.0.0"));

    assert_eq!(request.encode_body().unwrap().as_ref(), expected.as_slice());
    assert_eq!(request.opcode(), Opcode::Startup);
}

#[test]
fn test_credentials_body_layout() {
    let request = Request::Credentials {
        username: "cassandra".to_string(),
        password: "secret".to_string(),
    };
    let mut expected = 2u16.to_be_bytes().to_vec();
    expected.extend_from_slice(&string("username"));
    expected.extend_from_slice(&string("cassandra"));
    expected.extend_from_slice(&string("password"));
    expected.extend_from_slice(&string("secret"));

    assert_eq!(request.encode_body().unwrap().as_ref(), expected.as_slice());
    assert_eq!(request.opcode(), Opcode::Credentials);
}

#[test]
fn test_query_body_layout() {
    let cql = "SELECT * FROM t";
    let request = Request::Query {
        cql: cql.to_string(),
        consistency: Consistency::Quorum,
    };
    let mut expected = (cql.len() as u32).to_be_bytes().to_vec();
    expected.extend_from_slice(cql.as_bytes());
    expected.extend_from_slice(&(Consistency::Quorum as u16).to_be_bytes());

    assert_eq!(request.encode_body().unwrap().as_ref(), expected.as_slice());
}

#[test]
fn test_execute_body_layout() {
    let request = Request::Execute {
        id: vec![0xca, 0xfe],
        values: vec![Value::Int(7), Value::Text("hi".to_string()), Value::Null],
        consistency: Consistency::One,
    };
    let mut expected = 2u16.to_be_bytes().to_vec(); // [short bytes] id length
    expected.extend_from_slice(&[0xca, 0xfe]);
    expected.extend_from_slice(&3u16.to_be_bytes()); // value count
    expected.extend_from_slice(&cell(&7i32.to_be_bytes())); // int
    expected.extend_from_slice(&cell(b"hi")); // text
    expected.extend_from_slice(&(-1i32).to_be_bytes()); // null
    expected.extend_from_slice(&1u16.to_be_bytes()); // consistency ONE

    assert_eq!(request.encode_body().unwrap().as_ref(), expected.as_slice());
    assert_eq!(request.opcode(), Opcode::Execute);
}

#[test]
fn test_oversized_string_field_rejected() {
    // [string] carries a u16 length prefix; longer input must not be
    // silently truncated
    let request = Request::Startup {
        cql_version: "v".repeat(u16::MAX as usize + 1),
    };
    let err = request.encode_body().unwrap_err();
    assert!(matches!(err, DriverError::Protocol(_)));

    let request = Request::Credentials {
        username: "u".repeat(70_000),
        password: "p".to_string(),
    };
    let err = request.to_frame().unwrap_err();
    assert!(matches!(err, DriverError::Protocol(_)));
}

// =============================================================================
// Response Parsing Tests
// =============================================================================

#[test]
fn test_decode_error_response() {
    let mut body = int(0x2200);
    body.extend_from_slice(&string("unconfigured table"));
    let frame = Frame::response(Opcode::Error, Bytes::from(body));

    match Response::decode(&frame).unwrap() {
        Response::Error { code, message } => {
            assert_eq!(code, 0x2200);
            assert_eq!(message, "unconfigured table");
        }
        other => panic!("Expected Error, got {:?}", other),
    }
}

#[test]
fn test_decode_ready_and_authenticate() {
    let frame = Frame::response(Opcode::Ready, Bytes::new());
    assert_eq!(Response::decode(&frame).unwrap(), Response::Ready);

    let frame = Frame::response(
        Opcode::Authenticate,
        Bytes::from(string("org.apache.cassandra.auth.PasswordAuthenticator")),
    );
    match Response::decode(&frame).unwrap() {
        Response::Authenticate(class) => assert!(class.ends_with("PasswordAuthenticator")),
        other => panic!("Expected Authenticate, got {:?}", other),
    }
}

#[test]
fn test_decode_void_and_keyspace_results() {
    let frame = Frame::response(Opcode::Result, Bytes::from(int(0x0001)));
    assert_eq!(Response::decode(&frame).unwrap(), Response::Void);

    let mut body = int(0x0003);
    body.extend_from_slice(&string("system"));
    let frame = Frame::response(Opcode::Result, Bytes::from(body));
    assert_eq!(
        Response::decode(&frame).unwrap(),
        Response::Keyspace("system".to_string())
    );
}

#[test]
fn test_decode_rows_with_global_table_spec() {
    let mut body = int(0x0002); // kind: Rows
    body.extend_from_slice(&int(0x0001)); // flags: global tables spec
    body.extend_from_slice(&int(2)); // columns
    body.extend_from_slice(&string("ks"));
    body.extend_from_slice(&string("t"));
    body.extend_from_slice(&string("name"));
    body.extend_from_slice(&0x000du16.to_be_bytes()); // varchar
    body.extend_from_slice(&string("age"));
    body.extend_from_slice(&0x0009u16.to_be_bytes()); // int
    body.extend_from_slice(&int(2)); // rows
    body.extend_from_slice(&cell(b"alice"));
    body.extend_from_slice(&cell(&30i32.to_be_bytes()));
    body.extend_from_slice(&cell(b"bob"));
    body.extend_from_slice(&(-1i32).to_be_bytes()); // null cell

    let frame = Frame::response(Opcode::Result, Bytes::from(body));
    match Response::decode(&frame).unwrap() {
        Response::Rows(rows) => {
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0].get("name"), Some(b"alice".as_slice()));
            assert_eq!(rows[0].get("age"), Some(30i32.to_be_bytes().as_slice()));
            assert_eq!(rows[1].get("name"), Some(b"bob".as_slice()));
            assert_eq!(rows[1].get("age"), None); // null
            assert_eq!(rows[1].get("missing"), None);
        }
        other => panic!("Expected Rows, got {:?}", other),
    }
}

#[test]
fn test_decode_rows_with_per_column_spec_and_collection_types() {
    let mut body = int(0x0002); // kind: Rows
    body.extend_from_slice(&int(0x0000)); // flags: none
    body.extend_from_slice(&int(2)); // columns
    // first column: list<int>
    body.extend_from_slice(&string("ks"));
    body.extend_from_slice(&string("t"));
    body.extend_from_slice(&string("tags"));
    body.extend_from_slice(&0x0020u16.to_be_bytes()); // list
    body.extend_from_slice(&0x0009u16.to_be_bytes()); // of int
    // second column: map<varchar, varchar>
    body.extend_from_slice(&string("ks"));
    body.extend_from_slice(&string("t"));
    body.extend_from_slice(&string("attrs"));
    body.extend_from_slice(&0x0021u16.to_be_bytes()); // map
    body.extend_from_slice(&0x000du16.to_be_bytes());
    body.extend_from_slice(&0x000du16.to_be_bytes());
    body.extend_from_slice(&int(1)); // one row
    body.extend_from_slice(&cell(&[0, 1]));
    body.extend_from_slice(&cell(&[2, 3]));

    let frame = Frame::response(Opcode::Result, Bytes::from(body));
    match Response::decode(&frame).unwrap() {
        Response::Rows(rows) => {
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].columns[0].0, "tags");
            assert_eq!(rows[0].columns[1].0, "attrs");
        }
        other => panic!("Expected Rows, got {:?}", other),
    }
}

#[test]
fn test_decode_prepared_result() {
    let mut body = int(0x0004); // kind: Prepared
    body.extend_from_slice(&4u16.to_be_bytes()); // [short bytes] id
    body.extend_from_slice(&[1, 2, 3, 4]);
    body.extend_from_slice(&int(0x0001)); // flags: global tables spec
    body.extend_from_slice(&int(1)); // columns
    body.extend_from_slice(&string("ks"));
    body.extend_from_slice(&string("t"));
    body.extend_from_slice(&string("x"));
    body.extend_from_slice(&0x0009u16.to_be_bytes()); // int

    let frame = Frame::response(Opcode::Result, Bytes::from(body));
    match Response::decode(&frame).unwrap() {
        Response::Prepared { id, columns } => {
            assert_eq!(id, vec![1, 2, 3, 4]);
            assert_eq!(columns, vec!["x".to_string()]);
        }
        other => panic!("Expected Prepared, got {:?}", other),
    }
}

#[test]
fn test_decode_schema_change_result() {
    let mut body = int(0x0005);
    body.extend_from_slice(&string("CREATED"));
    body.extend_from_slice(&string("ks"));
    body.extend_from_slice(&string("t"));

    let frame = Frame::response(Opcode::Result, Bytes::from(body));
    match Response::decode(&frame).unwrap() {
        Response::SchemaChange {
            change,
            keyspace,
            table,
        } => {
            assert_eq!(change, "CREATED");
            assert_eq!(keyspace, "ks");
            assert_eq!(table, "t");
        }
        other => panic!("Expected SchemaChange, got {:?}", other),
    }
}

#[test]
fn test_decode_truncated_body_is_protocol_error() {
    // ERROR frame whose message string claims more bytes than exist
    let mut body = int(0x1000);
    body.extend_from_slice(&100u16.to_be_bytes());
    body.extend_from_slice(b"short");
    let frame = Frame::response(Opcode::Error, Bytes::from(body));

    let err = Response::decode(&frame).unwrap_err();
    assert!(matches!(err, DriverError::Protocol(_)));
}

#[test]
fn test_decode_unknown_result_kind_is_protocol_error() {
    let frame = Frame::response(Opcode::Result, Bytes::from(int(0x0042)));
    let err = Response::decode(&frame).unwrap_err();
    assert!(matches!(err, DriverError::Protocol(_)));
}
