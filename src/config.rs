//! Configuration for cqlsync
//!
//! Centralized configuration with sensible defaults. All options are named
//! fields with documented defaults rather than a free-form map, so invalid
//! keys cannot exist at runtime.

use crate::cluster::Node;
use crate::protocol::Consistency;

/// Main configuration for a [`Database`](crate::Database) instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Cluster Configuration
    // -------------------------------------------------------------------------
    /// Flat list of reachable endpoints; one is picked at random per
    /// connection attempt
    pub nodes: Vec<Node>,

    /// Keyspace to `USE` once the handshake completes, if any
    pub keyspace: Option<String>,

    // -------------------------------------------------------------------------
    // Consistency Configuration
    // -------------------------------------------------------------------------
    /// Consistency level applied to SELECT statements without an override
    pub read_consistency: Consistency,

    /// Consistency level applied to all other statements without an override
    pub write_consistency: Consistency,

    // -------------------------------------------------------------------------
    // Protocol Configuration
    // -------------------------------------------------------------------------
    /// CQL version string advertised in the STARTUP body
    pub cql_version: String,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// How many node selections to try before giving up on `connect`
    pub connect_attempts: usize,

    /// Transport read timeout (milliseconds, 0 = no timeout)
    pub read_timeout_ms: u64,

    /// Transport write timeout (milliseconds, 0 = no timeout)
    pub write_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            keyspace: None,
            read_consistency: Consistency::One,
            write_consistency: Consistency::Quorum,
            cql_version: "3.0.0".to_string(),
            connect_attempts: 3,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Resolve the consistency level for a statement
    ///
    /// An explicit override always wins. Otherwise the level is derived
    /// from the statement's leading verb: `SELECT` uses the configured read
    /// level, anything else the configured write level. This is a lexical
    /// prefix check on the uppercased first six characters, not a parse.
    pub fn consistency_for(&self, cql: &str, explicit: Option<Consistency>) -> Consistency {
        if let Some(level) = explicit {
            return level;
        }
        if leading_verb(cql) == "SELECT" {
            self.read_consistency
        } else {
            self.write_consistency
        }
    }
}

/// Uppercased first six characters of the statement text
pub(crate) fn leading_verb(cql: &str) -> String {
    cql.trim_start()
        .chars()
        .take(6)
        .collect::<String>()
        .to_uppercase()
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Add a node without credentials
    pub fn node(mut self, host: impl Into<String>, port: u16) -> Self {
        self.config.nodes.push(Node::new(host, port));
        self
    }

    /// Add a node with username/password credentials
    pub fn node_with_auth(
        mut self,
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.config
            .nodes
            .push(Node::with_auth(host, port, username, password));
        self
    }

    /// Set the keyspace selected after the handshake
    pub fn keyspace(mut self, ks: impl Into<String>) -> Self {
        self.config.keyspace = Some(ks.into());
        self
    }

    /// Set the default consistency for reads
    pub fn read_consistency(mut self, level: Consistency) -> Self {
        self.config.read_consistency = level;
        self
    }

    /// Set the default consistency for writes
    pub fn write_consistency(mut self, level: Consistency) -> Self {
        self.config.write_consistency = level;
        self
    }

    /// Set the CQL version string sent in STARTUP
    pub fn cql_version(mut self, version: impl Into<String>) -> Self {
        self.config.cql_version = version.into();
        self
    }

    /// Set the number of node selections tried before `connect` fails
    pub fn connect_attempts(mut self, attempts: usize) -> Self {
        self.config.connect_attempts = attempts;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
