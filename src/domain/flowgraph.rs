//! Flow tree rendering
//!
//! Depth-first, pre-order serialization of a recorded call graph from a
//! chosen root.
//!
//! A node is expanded at most once per pass. This stops cycles (recursion,
//! callbacks into an ancestor) but also means a function reached from two
//! different parents only shows its subtree under the first one. The output
//! is a spanning tree of the graph, not a complete unfolding.

use crate::domain::callgraph::CallGraph;
use std::collections::HashSet;

/// A rendered flow tree.
#[derive(Debug, Clone)]
pub struct FlowTree {
    /// Identifier the walk started from
    pub root: String,
    /// Nodes in pre-order
    pub nodes: Vec<FlowNode>,
    /// Parent -> child links actually walked
    pub edges: Vec<FlowEdge>,
}

/// A node in the flow tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowNode {
    /// Function identifier
    pub id: String,
    /// Short display label (last path segment)
    pub label: String,
    /// Distance from the root
    pub depth: usize,
}

/// A tree edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowEdge {
    pub from: String,
    pub to: String,
    /// Pre-order sequence number of the child
    pub sequence: usize,
}

impl FlowTree {
    /// Walk `callgraph` from `root`, descending at most `max_depth` levels.
    pub fn from_callgraph(callgraph: &CallGraph, root: &str, max_depth: Option<usize>) -> Self {
        let mut tree = FlowTree {
            root: root.to_string(),
            nodes: Vec::new(),
            edges: Vec::new(),
        };
        let mut visited = HashSet::new();
        tree.expand_node(callgraph, None, root, 0, max_depth, &mut visited);
        tree
    }

    fn expand_node(
        &mut self,
        callgraph: &CallGraph,
        parent: Option<&str>,
        node_id: &str,
        depth: usize,
        max_depth: Option<usize>,
        visited: &mut HashSet<String>,
    ) {
        if !visited.insert(node_id.to_string()) {
            return;
        }

        self.nodes.push(FlowNode {
            id: node_id.to_string(),
            label: short_label(node_id),
            depth,
        });
        if let Some(parent) = parent {
            self.edges.push(FlowEdge {
                from: parent.to_string(),
                to: node_id.to_string(),
                sequence: self.nodes.len() - 1,
            });
        }

        if max_depth.is_some_and(|max| depth >= max) {
            return;
        }
        for callee in callgraph.callees(node_id) {
            self.expand_node(callgraph, Some(node_id), callee, depth + 1, max_depth, visited);
        }
    }

    /// One line per node: `<2*depth spaces>- <id>`, each newline-terminated.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            for _ in 0..node.depth {
                out.push_str("  ");
            }
            out.push_str("- ");
            out.push_str(&node.id);
            out.push('\n');
        }
        out
    }

    /// Get nodes grouped by depth for layered rendering
    pub fn nodes_by_depth(&self) -> Vec<Vec<&FlowNode>> {
        let max_depth = self.nodes.iter().map(|n| n.depth).max().unwrap_or(0);
        let mut layers = vec![Vec::new(); max_depth + 1];
        for node in &self.nodes {
            layers[node.depth].push(node);
        }
        layers
    }
}

/// Render the flow tree of `callgraph` rooted at `root` as indented text.
pub fn render(callgraph: &CallGraph, root: &str) -> String {
    FlowTree::from_callgraph(callgraph, root, None).to_text()
}

fn short_label(id: &str) -> String {
    // `a::b::{{closure}}` reads better as `b::{{closure}}`
    let mut parts = id.rsplit("::");
    match parts.next() {
        Some(last) if last.starts_with("{{") => match parts.next() {
            Some(owner) => format!("{owner}::{last}"),
            None => last.to_string(),
        },
        Some(last) => last.to_string(),
        None => id.to_string(),
    }
}
