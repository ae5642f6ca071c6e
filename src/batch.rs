//! Batch accumulation
//!
//! While a batch is open, DML statements are merged into one buffer and
//! sent to the server as a single atomic `BEGIN BATCH .. APPLY BATCH`
//! statement. The state machine is explicit (Idle | Batching) so its
//! transitions are testable without a transport.
//!
//! Invariant: parameter names in the merged map are unique. A colliding
//! name is rewritten with a numeric suffix in both the CQL placeholder
//! tokens and the value map, re-checking after each rewrite until no
//! collision remains. The rename counter is scoped to the buffer's
//! lifetime and only ever increases.

use std::collections::HashMap;

use crate::protocol::Value;

/// Named parameters bound to a statement, in caller order
pub type Params = Vec<(String, Value)>;

const BATCH_OPEN: &str = "BEGIN BATCH";
const BATCH_CLOSE: &str = "APPLY BATCH;";

/// Whether the query engine is currently accumulating a batch
#[derive(Debug)]
pub enum BatchState {
    Idle,
    Batching(BatchBuffer),
}

impl BatchState {
    /// True while a batch is open
    pub fn is_batching(&self) -> bool {
        matches!(self, BatchState::Batching(_))
    }
}

/// Accumulated batch text plus the merged parameter map
#[derive(Debug, Clone)]
pub struct BatchBuffer {
    cql: String,
    params: HashMap<String, Value>,
    rename_counter: u32,
    statements: usize,
}

impl BatchBuffer {
    /// Start an empty buffer seeded with the batch-open marker
    pub fn new() -> Self {
        Self {
            cql: BATCH_OPEN.to_string(),
            params: HashMap::new(),
            rename_counter: 0,
            statements: 0,
        }
    }

    /// Merge one statement and its parameters into the buffer
    ///
    /// Each parameter whose name already exists in the merged map is
    /// renamed to the base name plus the incremented counter; the
    /// statement's placeholder tokens are rewritten to match. The check
    /// repeats on the renamed name until it is collision-free, so `x`
    /// becomes `x_1`, then `x_2`, never `x_1_2`.
    pub fn push(&mut self, cql: &str, values: Params) {
        let mut stmt = cql.trim().to_string();
        for (base, value) in values {
            let mut name = base.clone();
            while self.params.contains_key(&name) {
                self.rename_counter += 1;
                let renamed = format!("{}_{}", base, self.rename_counter);
                stmt = rewrite_placeholder(&stmt, &name, &renamed);
                name = renamed;
            }
            self.params.insert(name, value);
        }

        self.cql.push('\n');
        self.cql.push_str(&stmt);
        if !stmt.ends_with(';') {
            self.cql.push(';');
        }
        self.statements += 1;
    }

    /// The accumulated CQL text so far (open marker included)
    pub fn cql(&self) -> &str {
        &self.cql
    }

    /// The merged parameter map so far
    pub fn params(&self) -> &HashMap<String, Value> {
        &self.params
    }

    /// Number of statements merged so far
    pub fn statement_count(&self) -> usize {
        self.statements
    }

    /// Close the buffer: append the batch-close marker and hand back the
    /// full statement text with its merged parameters
    pub fn finish(mut self) -> (String, Params) {
        self.cql.push('\n');
        self.cql.push_str(BATCH_CLOSE);
        (self.cql, self.params.into_iter().collect())
    }
}

impl Default for BatchBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Rewrite every `:from` placeholder token in `stmt` to `:to`
///
/// A token only matches when the following character cannot extend the
/// identifier, so renaming `x` leaves `:x2` or `:x_old` untouched.
fn rewrite_placeholder(stmt: &str, from: &str, to: &str) -> String {
    let needle = format!(":{}", from);
    let mut out = String::with_capacity(stmt.len() + to.len());
    let mut rest = stmt;

    while let Some(pos) = rest.find(&needle) {
        let tail = &rest[pos + needle.len()..];
        let boundary = tail
            .chars()
            .next()
            .map_or(true, |c| !c.is_ascii_alphanumeric() && c != '_');

        out.push_str(&rest[..pos]);
        if boundary {
            out.push(':');
            out.push_str(to);
        } else {
            out.push_str(&needle);
        }
        rest = tail;
    }
    out.push_str(rest);
    out
}
