//! # cqlsync
//!
//! A minimal synchronous CQL client driver with:
//! - Framed binary wire protocol (fixed 8-byte header, v1)
//! - Handshake with optional CREDENTIALS authentication
//! - Prepared-parameter execution and atomic batches
//! - Per-statement consistency resolution (read vs. write defaults)
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Database                              │
//! │     (lifecycle, consistency policy, query/batch engine)     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Connection                             │
//! │        (one transport, one outstanding request)              │
//! └──────────┬──────────────────────────────────┬────────────────┘
//!            │                                  │
//!            ▼                                  ▼
//!     ┌─────────────┐                    ┌─────────────┐
//!     │   Cluster   │                    │ Frame Codec │
//!     │ (node pick) │                    │ (wire I/O)  │
//!     └─────────────┘                    └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod cluster;
pub mod protocol;
pub mod connection;
pub mod batch;
pub mod database;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{DriverError, Result};
pub use config::Config;
pub use cluster::{Cluster, Node};
pub use connection::Connection;
pub use batch::{BatchBuffer, BatchState, Params};
pub use database::{Database, QueryResult};
pub use protocol::{Consistency, Row, Value};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of cqlsync
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
