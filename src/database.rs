//! Database
//!
//! The public surface of the driver: connection lifecycle, consistency
//! policy, single-statement execution, and the batch-accumulation state
//! machine that merges multiple mutation statements into one server-side
//! atomic batch.
//!
//! ## Concurrency Model
//!
//! Fully synchronous, blocking I/O, one outstanding request at a time.
//! Every operation takes `&mut self`, so a single instance cannot be used
//! concurrently without external serialization. Independent parallelism
//! requires independent `Database` instances, each with its own node
//! selection and handshake.

use std::collections::HashMap;

use crate::batch::{BatchBuffer, BatchState, Params};
use crate::cluster::Cluster;
use crate::config::{leading_verb, Config};
use crate::connection::Connection;
use crate::error::{DriverError, Result};
use crate::protocol::{Consistency, Request, Response, Row, Value};

/// Outcome of a statement execution
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// RESULT/Rows: the ordered row mappings
    Rows(Vec<Row>),

    /// RESULT/SetKeyspace: the now-active keyspace
    Keyspace(String),

    /// RESULT/Void: acknowledged, nothing to return
    Void,

    /// RESULT/SchemaChange: DDL acknowledgement
    SchemaChange {
        change: String,
        keyspace: String,
        table: String,
    },

    /// The statement was merged into the open batch; nothing was sent
    Buffered,
}

/// A synchronous client for one cluster
#[derive(Debug)]
pub struct Database {
    config: Config,
    cluster: Cluster,
    connection: Connection,
    keyspace: Option<String>,
    batch: BatchState,
}

impl Database {
    /// Build a database from a validated configuration
    ///
    /// Fails if no nodes are configured.
    pub fn new(config: Config) -> Result<Self> {
        let cluster = Cluster::new(config.nodes.clone())?;
        let keyspace = config.keyspace.clone();
        Ok(Self {
            config,
            cluster,
            connection: Connection::new(),
            keyspace,
            batch: BatchState::Idle,
        })
    }

    // =========================================================================
    // Connection lifecycle
    // =========================================================================

    /// Connect to a randomly selected node and complete the handshake
    ///
    /// If a keyspace is configured, issues `USE <keyspace>;` at QUORUM once
    /// the connection is Ready; an ERROR response there is a `Query` error.
    /// Idempotent: a no-op when already connected.
    pub fn connect(&mut self) -> Result<()> {
        if self.connection.is_connected() {
            return Ok(());
        }

        self.connection.connect(&self.cluster, &self.config)?;

        if let Some(ks) = self.keyspace.clone() {
            let response = self.connection.send_request(&Request::Query {
                cql: format!("USE {};", ks),
                consistency: Consistency::Quorum,
            })?;
            if let Response::Error { code, message } = response {
                return Err(DriverError::Query(format!(
                    "USE {} rejected ({:#06x}): {}",
                    ks, code, message
                )));
            }
        }
        Ok(())
    }

    /// Shut down the transport; idempotent
    pub fn disconnect(&mut self) -> Result<()> {
        self.connection.disconnect()
    }

    /// True iff a transport is currently held
    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    /// Update the held keyspace
    ///
    /// If currently connected, issues `USE <ks>;` at fixed QUORUM
    /// consistency regardless of the configured defaults.
    pub fn set_keyspace(&mut self, ks: &str) -> Result<()> {
        self.keyspace = Some(ks.to_string());

        if self.connection.is_connected() {
            let response = self.connection.send_request(&Request::Query {
                cql: format!("USE {};", ks),
                consistency: Consistency::Quorum,
            })?;
            if let Response::Error { code, message } = response {
                return Err(DriverError::Cassandra { code, message });
            }
        }
        Ok(())
    }

    // =========================================================================
    // Query execution
    // =========================================================================

    /// Execute one CQL statement, or merge it into the open batch
    ///
    /// While a batch is open and the statement is a mutation
    /// (INSERT/UPDATE/DELETE), the statement is buffered and
    /// `QueryResult::Buffered` is returned without a network round trip.
    /// Otherwise the statement executes immediately: without bound values
    /// as a direct QUERY, with bound values as PREPARE followed by EXECUTE.
    pub fn query(
        &mut self,
        cql: &str,
        values: Params,
        consistency: Option<Consistency>,
    ) -> Result<QueryResult> {
        if let BatchState::Batching(buffer) = &mut self.batch {
            if is_dml(cql) {
                buffer.push(cql, values);
                return Ok(QueryResult::Buffered);
            }
        }

        let level = self.config.consistency_for(cql, consistency);
        self.execute_now(cql, values, level)
    }

    /// Open a batch; a no-op if one is already open
    ///
    /// An already-accumulated buffer is never reset or duplicated by a
    /// repeated call.
    pub fn begin_batch(&mut self) {
        if let BatchState::Idle = self.batch {
            self.batch = BatchState::Batching(BatchBuffer::new());
        }
    }

    /// True while a batch is open
    pub fn is_batching(&self) -> bool {
        self.batch.is_batching()
    }

    /// Current batch state (for inspection in tests and debugging)
    pub fn batch_state(&self) -> &BatchState {
        &self.batch
    }

    /// Close the open batch and execute it as one atomic statement
    ///
    /// Defaults to QUORUM when no consistency is given. The batch state
    /// returns to Idle before the statement is sent, so a failed execution
    /// can never leave stale buffered statements behind.
    pub fn apply_batch(&mut self, consistency: Option<Consistency>) -> Result<QueryResult> {
        let buffer = match std::mem::replace(&mut self.batch, BatchState::Idle) {
            BatchState::Batching(buffer) => buffer,
            BatchState::Idle => {
                return Err(DriverError::Query(
                    "apply_batch called with no open batch".to_string(),
                ))
            }
        };

        let (cql, params) = buffer.finish();
        let level = consistency.unwrap_or(Consistency::Quorum);
        self.execute_now(&cql, params, level)
    }

    // =========================================================================
    // Internal execution path
    // =========================================================================

    /// Send a statement over the connection and interpret the response
    fn execute_now(
        &mut self,
        cql: &str,
        values: Params,
        consistency: Consistency,
    ) -> Result<QueryResult> {
        let response = if values.is_empty() {
            self.connection.send_request(&Request::Query {
                cql: cql.to_string(),
                consistency,
            })?
        } else {
            let prepared = self.connection.send_request(&Request::Prepare {
                cql: cql.to_string(),
            })?;
            let (id, columns) = match prepared {
                Response::Prepared { id, columns } => (id, columns),
                Response::Error { code, message } => {
                    return Err(DriverError::Query(format!(
                        "PREPARE rejected ({:#06x}): {}",
                        code, message
                    )))
                }
                other => {
                    return Err(DriverError::Query(format!(
                        "PREPARE returned unexpected response: {:?}",
                        other
                    )))
                }
            };
            let bound = bind_values(&columns, values)?;
            self.connection.send_request(&Request::Execute {
                id,
                values: bound,
                consistency,
            })?
        };

        match response {
            Response::Error { code, message } => Err(DriverError::Cassandra { code, message }),
            Response::Rows(rows) => Ok(QueryResult::Rows(rows)),
            Response::Keyspace(ks) => Ok(QueryResult::Keyspace(ks)),
            Response::Void => Ok(QueryResult::Void),
            Response::SchemaChange {
                change,
                keyspace,
                table,
            } => Ok(QueryResult::SchemaChange {
                change,
                keyspace,
                table,
            }),
            other => Err(DriverError::Protocol(format!(
                "Unexpected response to statement execution: {:?}",
                other
            ))),
        }
    }
}

/// Whether a statement is a mutation eligible for batching
///
/// Same six-character lexical check as consistency resolution.
fn is_dml(cql: &str) -> bool {
    matches!(leading_verb(cql).as_str(), "INSERT" | "UPDATE" | "DELETE")
}

/// Order named values against the prepared statement's column metadata
fn bind_values(columns: &[String], values: Params) -> Result<Vec<Value>> {
    let mut by_name: HashMap<String, Value> = values.into_iter().collect();
    let mut bound = Vec::with_capacity(columns.len());
    for column in columns {
        match by_name.remove(column) {
            Some(value) => bound.push(value),
            None => {
                return Err(DriverError::Query(format!(
                    "No value bound for parameter '{}'",
                    column
                )))
            }
        }
    }
    Ok(bound)
}
