//! Structural context derived from a diagram before layout runs.
//!
//! [`LayoutContext`] is a read-only snapshot of the signals the rule set
//! conditions on: counts, density, hierarchy presence, node size shape.
//! It is computed once per selection call from the same node/edge lists
//! the analyzer later measures.

use std::collections::HashSet;

use sextant_core::geometry::Size;
use sextant_core::model::{DiagramEdge, DiagramLevel, DiagramNode};

/// Coarse complexity bucket for a diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
}

/// Read-only structural summary used by rule conditions and actions.
#[derive(Debug, Clone)]
pub struct LayoutContext {
    pub node_count: usize,
    pub edge_count: usize,
    /// True when any node has a parent
    pub has_hierarchy: bool,
    /// True when any node is in the expanded set (showing its internals)
    pub has_expanded_nodes: bool,
    pub average_node_size: Size,
    pub complexity: Complexity,
    /// Edges per node; 0 for an empty diagram
    pub relationship_density: f32,
    /// True when some pair of nodes is connected in both directions
    pub has_bidirectional: bool,
    pub level: Option<DiagramLevel>,
    pub focused_system: Option<String>,
    pub focused_container: Option<String>,
}

impl LayoutContext {
    /// Derives the context from a diagram snapshot.
    pub fn derive(
        nodes: &[DiagramNode],
        edges: &[DiagramEdge],
        level: Option<DiagramLevel>,
        focused_system: Option<&str>,
        focused_container: Option<&str>,
        expanded_nodes: &[String],
    ) -> Self {
        let node_count = nodes.len();
        let edge_count = edges.len();

        let has_hierarchy = nodes.iter().any(|node| node.parent_id.is_some());
        let expanded: HashSet<&str> = expanded_nodes.iter().map(String::as_str).collect();
        let has_expanded_nodes = nodes.iter().any(|node| expanded.contains(node.id.as_str()));

        let average_node_size = if node_count == 0 {
            Size::default()
        } else {
            let width: f32 = nodes.iter().map(|node| node.size.width()).sum();
            let height: f32 = nodes.iter().map(|node| node.size.height()).sum();
            Size::new(width / node_count as f32, height / node_count as f32)
        };

        let complexity = if node_count <= 5 && edge_count <= 8 {
            Complexity::Simple
        } else if node_count > 20 || edge_count > 30 {
            Complexity::Complex
        } else {
            Complexity::Moderate
        };

        let relationship_density = if node_count == 0 {
            0.0
        } else {
            edge_count as f32 / node_count as f32
        };

        let forward: HashSet<(&str, &str)> = edges
            .iter()
            .map(|edge| (edge.source.as_str(), edge.target.as_str()))
            .collect();
        let has_bidirectional = edges.iter().any(|edge| {
            edge.source != edge.target
                && forward.contains(&(edge.target.as_str(), edge.source.as_str()))
        });

        Self {
            node_count,
            edge_count,
            has_hierarchy,
            has_expanded_nodes,
            average_node_size,
            complexity,
            relationship_density,
            has_bidirectional,
            level,
            focused_system: focused_system.map(str::to_owned),
            focused_container: focused_container.map(str::to_owned),
        }
    }
}
