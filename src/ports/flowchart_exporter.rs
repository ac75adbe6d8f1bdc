//! Flowchart DOT Exporter
//!
//! Exports a FlowTree as Graphviz DOT with flowchart styling.

use crate::domain::flowgraph::FlowTree;
use std::io::Result;

pub struct FlowchartExporter;

impl FlowchartExporter {
    /// Export a FlowTree to DOT format.
    pub fn export(tree: &FlowTree, path: &str) -> Result<()> {
        let content = Self::to_dot(tree);
        std::fs::write(path, content)
    }

    /// Convert FlowTree to DOT string.
    pub fn to_dot(tree: &FlowTree) -> String {
        let mut lines = Vec::new();

        lines.push("digraph FlowTree {".to_string());
        lines.push("    rankdir=TB;".to_string());
        lines.push("    nodesep=0.6;".to_string());
        lines.push("    node [fontname=\"Helvetica\", fontsize=12, shape=box, style=filled];".to_string());
        lines.push("    edge [fontname=\"Helvetica\", fontsize=10];".to_string());
        lines.push(String::new());

        for node in &tree.nodes {
            let (fill, border) = Self::node_colors(node.depth);
            lines.push(format!(
                "    \"{}\" [label=\"{}\", tooltip=\"{}\", fillcolor=\"{}\", color=\"{}\"];",
                Self::escape(&node.id),
                Self::escape(&node.label),
                Self::escape(&node.id),
                fill,
                border
            ));
        }

        lines.push(String::new());

        for edge in &tree.edges {
            lines.push(format!(
                "    \"{}\" -> \"{}\" [label=\"{}\"];",
                Self::escape(&edge.from),
                Self::escape(&edge.to),
                edge.sequence
            ));
        }

        for layer in tree.nodes_by_depth() {
            if !layer.is_empty() {
                let node_ids: Vec<String> = layer
                    .iter()
                    .map(|n| format!("\"{}\"", Self::escape(&n.id)))
                    .collect();
                lines.push(format!("    {{ rank=same; {} }}", node_ids.join("; ")));
            }
        }

        lines.push("}".to_string());

        lines.join("\n")
    }

    fn node_colors(depth: usize) -> (&'static str, &'static str) {
        match depth {
            0 => ("#a6e3a1", "#40a02b"), // Green: root
            1 => ("#89b4fa", "#1e66f5"), // Blue
            2 => ("#f9e2af", "#df8e1d"), // Yellow
            _ => ("#cba6f7", "#8839ef"), // Purple
        }
    }

    fn escape(label: &str) -> String {
        label
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n")
    }
}
