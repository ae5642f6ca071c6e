//! Node registry
//!
//! Holds the flat set of configured endpoints and picks one uniformly at
//! random per connection attempt. No health tracking, no preference
//! ordering, no sticky selection.

use rand::Rng;

use crate::error::{DriverError, Result};

/// One reachable endpoint with its credentials
///
/// Immutable once configured.
#[derive(Debug, Clone)]
pub struct Node {
    /// Hostname or IP address
    pub host: String,

    /// CQL native transport port
    pub port: u16,

    /// Username for the CREDENTIALS exchange, if the server authenticates
    pub username: Option<String>,

    /// Password for the CREDENTIALS exchange
    pub password: Option<String>,
}

impl Node {
    /// Create a node without credentials
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            username: None,
            password: None,
        }
    }

    /// Create a node with username/password credentials
    pub fn with_auth(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }

    /// The `host:port` address string used to open the transport
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Ordered set of configured nodes
#[derive(Debug, Clone)]
pub struct Cluster {
    nodes: Vec<Node>,
}

impl Cluster {
    /// Build a registry from the configured node list
    ///
    /// Fails if the list is empty: there would be nothing to connect to.
    pub fn new(nodes: Vec<Node>) -> Result<Self> {
        if nodes.is_empty() {
            return Err(DriverError::Config(
                "at least one node must be configured".to_string(),
            ));
        }
        Ok(Self { nodes })
    }

    /// Select one node uniformly at random
    ///
    /// Opening the actual transport is the connection layer's job.
    pub fn random_node(&self) -> &Node {
        let idx = rand::thread_rng().gen_range(0..self.nodes.len());
        &self.nodes[idx]
    }

    /// Number of configured nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if no nodes are configured (never the case after `new`)
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
