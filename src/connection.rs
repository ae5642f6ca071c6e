//! Connection
//!
//! Owns exactly one transport channel bound to one selected node and
//! serializes one outstanding request/response cycle at a time. No
//! pipelining: issuing a second request before the first response has been
//! read is forbidden by construction (`send_request` takes `&mut self` and
//! blocks until the full response frame is decoded).

use std::io::{BufReader, BufWriter};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

use crate::cluster::{Cluster, Node};
use crate::config::Config;
use crate::error::{DriverError, Result};
use crate::protocol::{read_frame, write_frame, Request, Response};

/// A live TCP channel with buffered halves
#[derive(Debug)]
struct Transport {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Peer address for logging
    peer_addr: String,
}

/// A single synchronous connection to one cluster node
///
/// Lifecycle: unconnected → connected (handshake done, Ready) →
/// disconnected; reconnecting performs a fresh random node selection.
#[derive(Debug)]
pub struct Connection {
    transport: Option<Transport>,
}

impl Connection {
    /// Create an unconnected connection
    pub fn new() -> Self {
        Self { transport: None }
    }

    /// True iff a transport handle is currently held
    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    /// Open a transport to a randomly selected node and run the handshake
    ///
    /// Node selection is retried up to `config.connect_attempts` times when
    /// the transport fails to open; exhaustion fails with a connection
    /// error. A handshake rejection is terminal and is not retried.
    /// Calling `connect` while already connected is a no-op.
    pub fn connect(&mut self, cluster: &Cluster, config: &Config) -> Result<()> {
        if self.is_connected() {
            return Ok(());
        }

        let attempts = config.connect_attempts.max(1);
        let mut last_err: Option<DriverError> = None;

        for attempt in 1..=attempts {
            let node = cluster.random_node().clone();
            match open_transport(&node, config) {
                Ok(transport) => {
                    tracing::debug!("Connected to {} (attempt {})", transport.peer_addr, attempt);
                    self.transport = Some(transport);
                    if let Err(e) = self.handshake(&node, config) {
                        // Handshake rejections are server decisions, not
                        // transient socket failures; surface them as-is.
                        let _ = self.disconnect();
                        return Err(e);
                    }
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(
                        "Attempt {}/{} to {} failed: {}",
                        attempt,
                        attempts,
                        node.address(),
                        e
                    );
                    last_err = Some(e);
                }
            }
        }

        Err(DriverError::Connection(format!(
            "All {} connection attempts failed (last: {})",
            attempts,
            last_err.map(|e| e.to_string()).unwrap_or_default()
        )))
    }

    /// Run the STARTUP / AUTHENTICATE / CREDENTIALS exchange
    ///
    /// State machine: Connected-Pending-Handshake → Ready, or Disconnected
    /// on an ERROR response at either step.
    fn handshake(&mut self, node: &Node, config: &Config) -> Result<()> {
        let startup = Request::Startup {
            cql_version: config.cql_version.clone(),
        };
        let mut response = self.send_request(&startup)?;

        if let Response::Authenticate(authenticator) = response {
            tracing::debug!(
                "Server demands authentication via {}, sending credentials",
                authenticator
            );
            let (username, password) = match (&node.username, &node.password) {
                (Some(user), Some(pass)) => (user.clone(), pass.clone()),
                _ => {
                    return Err(DriverError::Connection(format!(
                        "{} demands authentication ({}) but node has no credentials",
                        node.address(),
                        authenticator
                    )))
                }
            };
            response = self.send_request(&Request::Credentials { username, password })?;
        }

        match response {
            Response::Error { code, message } => Err(DriverError::Connection(format!(
                "Handshake rejected by {} ({:#06x}): {}",
                node.address(),
                code,
                message
            ))),
            _ => {
                tracing::debug!("Handshake with {} complete", node.address());
                Ok(())
            }
        }
    }

    /// Send one request and block until its response frame is decoded
    pub fn send_request(&mut self, request: &Request) -> Result<Response> {
        let transport = self
            .transport
            .as_mut()
            .ok_or_else(|| DriverError::Connection("not connected".to_string()))?;

        let frame = request.to_frame()?;
        tracing::trace!(
            "Sending {:?} frame ({} byte body) to {}",
            frame.opcode,
            frame.body.len(),
            transport.peer_addr
        );
        write_frame(&mut transport.writer, &frame)?;

        let reply = read_frame(&mut transport.reader)?;
        tracing::trace!(
            "Received {:?} frame ({} byte body) from {}",
            reply.opcode,
            reply.body.len(),
            transport.peer_addr
        );
        Response::decode(&reply)
    }

    /// Shut down the transport if connected; idempotent
    pub fn disconnect(&mut self) -> Result<()> {
        if let Some(transport) = self.transport.take() {
            let _ = transport.writer.get_ref().shutdown(Shutdown::Both);
            tracing::debug!("Disconnected from {}", transport.peer_addr);
        }
        Ok(())
    }
}

impl Default for Connection {
    fn default() -> Self {
        Self::new()
    }
}

/// Open a TCP stream to one node and split it into buffered halves
fn open_transport(node: &Node, config: &Config) -> Result<Transport> {
    let addr = node.address();
    let stream = TcpStream::connect(&addr)
        .map_err(|e| DriverError::Connection(format!("Failed to open {}: {}", addr, e)))?;

    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| addr.clone());

    // Disable Nagle's algorithm for low latency
    stream.set_nodelay(true)?;

    if config.read_timeout_ms > 0 {
        stream.set_read_timeout(Some(Duration::from_millis(config.read_timeout_ms)))?;
    }
    if config.write_timeout_ms > 0 {
        stream.set_write_timeout(Some(Duration::from_millis(config.write_timeout_ms)))?;
    }

    // Clone stream for separate read/write handles
    let read_stream = stream.try_clone()?;
    let write_stream = stream;

    Ok(Transport {
        reader: BufReader::new(read_stream),
        writer: BufWriter::new(write_stream),
        peer_addr,
    })
}
