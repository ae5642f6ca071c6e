//! Protocol Module
//!
//! Defines the CQL binary wire protocol (v1) spoken with the cluster.
//!
//! ## Frame Format
//! ```text
//! ┌───────────┬──────────┬───────────┬───────────┬──────────┬─────────┐
//! │Version(1) │ Flags(1) │ Stream(1) │ Opcode(1) │ Len (4)  │  Body   │
//! └───────────┴──────────┴───────────┴───────────┴──────────┴─────────┘
//! ```
//! Length is big-endian unsigned 32-bit and always equals the body size.
//! Requests carry version 0x01, responses 0x81.
//!
//! ## Opcodes
//! - 0x00: ERROR         - 0x01: STARTUP      - 0x02: READY
//! - 0x03: AUTHENTICATE  - 0x04: CREDENTIALS  - 0x07: QUERY
//! - 0x08: RESULT        - 0x09: PREPARE      - 0x0A: EXECUTE
//!
//! The protocol in scope is strictly synchronous: one outstanding request
//! per connection, stream id fixed at 0.

mod frame;
mod codec;
mod request;
mod response;
mod types;

pub use frame::{Frame, Opcode, HEADER_SIZE, REQUEST_VERSION, RESPONSE_VERSION};
pub use codec::{encode_frame, read_frame, write_frame, MAX_BODY_SIZE};
pub use request::Request;
pub use response::Response;
pub use types::{Consistency, Row, Value};
