//! In-memory graph store
//!
//! Nodes live in an `Arc` snapshot guarded by a lock. `begin` clones the
//! `Arc`, so a transaction reads a stable view while writers copy on write.
//! Cursors walk the label index lazily and evaluate the predicate per node.

use crate::node::{Node, NodeId, Row};
use crate::query::{Matcher, Pattern, Query};
use crate::store::{GraphStore, RowCursor, StoreError, StoreResult, Transaction};
use crate::value::Value;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

#[derive(Clone, Debug, Default)]
struct Graph {
    nodes: Vec<Node>,
    /// label -> positions in `nodes`, in insertion order
    labels: HashMap<String, Vec<usize>>,
}

/// Transaction open/close counters.
#[derive(Debug, Default)]
pub struct TxStats {
    opened: AtomicUsize,
    closed: AtomicUsize,
}

impl TxStats {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn open(&self) -> usize {
        self.opened().saturating_sub(self.closed())
    }
}

/// Releases its transaction when dropped.
struct TxGuard {
    stats: Arc<TxStats>,
}

impl TxGuard {
    fn acquire(stats: &Arc<TxStats>) -> Self {
        stats.opened.fetch_add(1, Ordering::SeqCst);
        Self {
            stats: stats.clone(),
        }
    }
}

impl Drop for TxGuard {
    fn drop(&mut self) {
        self.stats.closed.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Deserialize)]
struct SeedFile {
    nodes: Vec<SeedNode>,
}

#[derive(Deserialize)]
struct SeedNode {
    labels: Vec<String>,
    #[serde(default)]
    properties: BTreeMap<String, Value>,
}

#[derive(Default)]
pub struct MemoryGraph {
    graph: RwLock<Arc<Graph>>,
    stats: Arc<TxStats>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its id.
    pub fn insert_node<L, P>(&self, labels: L, properties: P) -> StoreResult<NodeId>
    where
        L: IntoIterator,
        L::Item: Into<String>,
        P: IntoIterator<Item = (String, Value)>,
    {
        let mut guard = self
            .graph
            .write()
            .map_err(|_| StoreError::Unavailable("graph lock poisoned".into()))?;
        let graph = Arc::make_mut(&mut guard);

        let position = graph.nodes.len();
        let id = NodeId(position as u64);
        let node = Node {
            id,
            labels: labels.into_iter().map(Into::into).collect(),
            properties: properties.into_iter().collect(),
        };
        for label in &node.labels {
            graph.labels.entry(label.clone()).or_default().push(position);
        }
        graph.nodes.push(node);
        Ok(id)
    }

    /// Shorthand for a single-label node with string properties.
    pub fn insert_with(&self, label: &str, properties: &[(&str, &str)]) -> StoreResult<NodeId> {
        self.insert_node(
            [label],
            properties
                .iter()
                .map(|(name, value)| (name.to_string(), Value::from(*value))),
        )
    }

    /// Seed from JSON: `{"nodes": [{"labels": [...], "properties": {...}}]}`.
    pub fn load_json_str(&self, json: &str) -> StoreResult<usize> {
        let seed: SeedFile = serde_json::from_str(json)?;
        let count = seed.nodes.len();
        for node in seed.nodes {
            self.insert_node(node.labels, node.properties)?;
        }
        Ok(count)
    }

    pub fn load_json(&self, path: &Path) -> StoreResult<usize> {
        let content = std::fs::read_to_string(path)?;
        let count = self.load_json_str(&content)?;
        info!("Loaded {} nodes from {}", count, path.display());
        Ok(count)
    }

    pub fn node_count(&self) -> usize {
        self.graph.read().map(|g| g.nodes.len()).unwrap_or(0)
    }

    pub fn stats(&self) -> Arc<TxStats> {
        self.stats.clone()
    }
}

#[async_trait::async_trait]
impl GraphStore for MemoryGraph {
    async fn begin(&self) -> StoreResult<Box<dyn Transaction>> {
        let snapshot = self
            .graph
            .read()
            .map_err(|_| StoreError::Unavailable("graph lock poisoned".into()))?
            .clone();
        Ok(Box::new(MemoryTransaction {
            snapshot,
            guard: TxGuard::acquire(&self.stats),
        }))
    }

    fn open_transactions(&self) -> Option<usize> {
        Some(self.stats.open())
    }
}

struct MemoryTransaction {
    snapshot: Arc<Graph>,
    guard: TxGuard,
}

#[async_trait::async_trait]
impl Transaction for MemoryTransaction {
    async fn execute(self: Box<Self>, query: Query) -> StoreResult<Box<dyn RowCursor>> {
        let pattern = Pattern::parse(query.text())?;
        let matcher = pattern.bind(&query)?;
        debug!(label = %pattern.label, property = %pattern.property, "memory query");
        let MemoryTransaction { snapshot, guard } = *self;
        Ok(Box::new(MemoryCursor {
            snapshot,
            pattern,
            matcher,
            position: 0,
            _guard: guard,
        }))
    }
}

struct MemoryCursor {
    snapshot: Arc<Graph>,
    pattern: Pattern,
    matcher: Matcher,
    /// next index into the label's position list
    position: usize,
    _guard: TxGuard,
}

#[async_trait::async_trait]
impl RowCursor for MemoryCursor {
    async fn next_row(&mut self) -> StoreResult<Option<Row>> {
        let Some(candidates) = self.snapshot.labels.get(&self.pattern.label) else {
            return Ok(None);
        };
        while let Some(&index) = candidates.get(self.position) {
            self.position += 1;
            let node = &self.snapshot.nodes[index];
            if node
                .property(&self.pattern.property)
                .is_some_and(|v| self.matcher.matches(v))
            {
                return Ok(Some(Row::new().with(self.pattern.variable.clone(), node.clone())));
            }
        }
        Ok(None)
    }

    async fn close(self: Box<Self>) -> StoreResult<()> {
        Ok(())
    }
}
