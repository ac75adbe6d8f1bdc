// Call graph structures for Callflow.
// Represents caller -> callee relationships observed at runtime.

use crate::domain::frame::Frame;
use std::collections::HashMap;

/// A node in the call graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallGraphNode {
    pub id: String,           // fully-qualified function identifier
    pub callees: Vec<String>, // children in discovery order, duplicates allowed
}

/// The call graph itself.
///
/// Nodes keep first-seen order so that rendering is deterministic; `index`
/// maps each id to its position for constant-time lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallGraph {
    nodes: Vec<CallGraphNode>,
    index: HashMap<String, usize>,
}

impl CallGraph {
    /// Build a graph from nodes; repeated ids are merged into the first.
    pub fn new(nodes: Vec<CallGraphNode>) -> Self {
        let mut cg = Self::default();
        for node in nodes {
            let idx = cg.node_index(&node.id);
            cg.nodes[idx].callees.extend(node.callees);
        }
        cg
    }

    /// Build a graph from `(id, callees)` pairs.
    pub fn from_adjacency<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a [&'a str])>,
    {
        Self::new(
            entries
                .into_iter()
                .map(|(id, callees)| CallGraphNode {
                    id: id.to_string(),
                    callees: callees.iter().map(|c| c.to_string()).collect(),
                })
                .collect(),
        )
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in first-seen order.
    pub fn nodes(&self) -> &[CallGraphNode] {
        &self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&CallGraphNode> {
        self.index.get(id).map(|&idx| &self.nodes[idx])
    }

    pub fn callees(&self, id: &str) -> &[String] {
        self.node(id).map(|n| n.callees.as_slice()).unwrap_or(&[])
    }

    /// Append `callee` to `caller`'s children, creating the caller node if
    /// needed. Skipped when `callee` is already the most recent child.
    pub fn add_edge(&mut self, caller_id: &str, callee_id: &str) {
        let idx = self.node_index(caller_id);
        let node = &mut self.nodes[idx];
        if node.callees.last().map(String::as_str) != Some(callee_id) {
            node.callees.push(callee_id.to_string());
        }
    }

    fn node_index(&mut self, id: &str) -> usize {
        if let Some(&idx) = self.index.get(id) {
            return idx;
        }
        let idx = self.nodes.len();
        self.nodes.push(CallGraphNode {
            id: id.to_string(),
            callees: vec![],
        });
        self.index.insert(id.to_string(), idx);
        idx
    }

    /// Record the edges implied by one snapshot (innermost frame first).
    ///
    /// Pairs are walked from the outermost inward, so each shallower frame
    /// gains the next deeper frame as a child.
    pub fn record_snapshot(&mut self, frames: &[Frame]) {
        for pair in frames.windows(2).rev() {
            let (deeper, shallower) = (&pair[0], &pair[1]);
            self.add_edge(&shallower.function, &deeper.function);
        }
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.callees.len()).sum()
    }
}
