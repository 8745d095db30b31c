//! Diagram data model: nodes, edges, and the parent-relative hierarchy.
//!
//! The types in this module mirror the node/edge snapshots produced by the
//! external layout algorithm and the rendering layer. They deserialize
//! directly from the camelCase JSON exposed by a live page, so the analyzer
//! and the auditor share one model.
//!
//! # Coordinate Frames
//!
//! A node without a `parent_id` is positioned in absolute diagram
//! coordinates. A node with a `parent_id` is positioned in its parent's
//! local frame; its absolute position is the parent's absolute position
//! plus its own, recursively. [`Hierarchy`] performs that resolution once
//! per analysis and answers ancestry queries.

use std::collections::HashMap;

use indexmap::IndexMap;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect, Size};

/// Default size applied to nodes whose snapshot carries no size
fn default_node_size() -> Size {
    Size::new(100.0, 100.0)
}

/// The kind of element a node represents.
///
/// Kinds drive a handful of analysis and selection decisions (rank pinning
/// of persons and storage, per-kind consistency grouping); they carry no
/// other semantics here. Unknown kind strings map to [`NodeKind::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    System,
    Container,
    Component,
    Person,
    Datastore,
    Queue,
    Topic,
    Cache,
    Filesystem,
    Deployment,
    Boundary,
    ExternalSystem,
    ExternalContainer,
    #[default]
    #[serde(other)]
    Other,
}

impl NodeKind {
    /// Storage-flavored kinds that get pinned toward the bottom layer
    /// during layout selection.
    pub fn is_storage(self) -> bool {
        matches!(
            self,
            NodeKind::Datastore
                | NodeKind::Queue
                | NodeKind::Topic
                | NodeKind::Cache
                | NodeKind::Filesystem
        )
    }
}

/// Interaction style of an edge. Cosmetic only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Interaction {
    #[default]
    Sync,
    Async,
    Event,
    #[serde(other)]
    Other,
}

/// C4-style abstraction level of a diagram view.
///
/// L0 is the landscape view, L1 the system context, L2 the container view,
/// L3 the component view. The level selects a weight table and biases
/// layout rule selection; analysis itself is level-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagramLevel {
    L0,
    L1,
    L2,
    L3,
}

/// A positioned box in the diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramNode {
    /// Unique id within the diagram
    pub id: String,

    /// Top-left position: absolute for root nodes, parent-local otherwise
    #[serde(default)]
    pub position: Point,

    /// Rendered size; defaults to 100×100 when the snapshot omits it
    #[serde(default = "default_node_size")]
    pub size: Size,

    /// Owning parent, when nested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    #[serde(default)]
    pub kind: NodeKind,

    #[serde(default)]
    pub is_external: bool,

    /// Display strings, used only for label clipping estimation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technology: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl DiagramNode {
    /// Creates a node with the given id, position, and size, and all other
    /// fields defaulted. Primarily a convenience for tests and fixtures.
    pub fn new(id: impl Into<String>, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            id: id.into(),
            position: Point::new(x, y),
            size: Size::new(width, height),
            parent_id: None,
            kind: NodeKind::default(),
            is_external: false,
            label: None,
            technology: None,
            description: None,
        }
    }

    /// Sets the parent id, returning the node
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Sets the kind, returning the node
    pub fn with_kind(mut self, kind: NodeKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the display label, returning the node
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The node's rectangle in whatever frame its position is expressed in
    pub fn local_rect(&self) -> Rect {
        Rect::from_position_size(self.position, self.size)
    }
}

/// A routed connector between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramEdge {
    pub id: String,

    /// Source node id; must resolve against the node list
    pub source: String,

    /// Target node id; must resolve against the node list
    pub target: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technology: Option<String>,

    /// Routed polyline in absolute coordinates; when absent the edge is
    /// treated as the straight segment between node centers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<Point>>,

    /// Absolute label anchor, when the router placed one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_position: Option<Point>,

    #[serde(default)]
    pub interaction: Interaction,
}

impl DiagramEdge {
    /// Creates an edge between two node ids with all optional fields empty
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            label: None,
            technology: None,
            points: None,
            label_position: None,
            interaction: Interaction::default(),
        }
    }

    /// Sets the routed polyline, returning the edge
    pub fn with_points(mut self, points: Vec<Point>) -> Self {
        self.points = Some(points);
        self
    }

    /// Sets the display label, returning the edge
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Parent chains deeper than this are treated as malformed. Real diagrams
/// are at most system → container → component.
const MAX_DEPTH: usize = 64;

/// Resolved view of a node list: absolute rectangles and ancestry.
///
/// Built once per analysis call. Nodes referencing a missing parent are
/// treated as roots; a node participating in a parent cycle has its chain
/// cut at the point of the cycle rather than failing the analysis, since a
/// partially-broken diagram must still be scorable.
#[derive(Debug)]
pub struct Hierarchy<'a> {
    nodes: Vec<&'a DiagramNode>,
    by_id: HashMap<&'a str, &'a DiagramNode>,
    absolute: IndexMap<&'a str, Rect>,
}

impl<'a> Hierarchy<'a> {
    /// Resolves absolute rectangles for every node in the list.
    pub fn build(nodes: &'a [DiagramNode]) -> Self {
        let by_id: HashMap<&str, &DiagramNode> =
            nodes.iter().map(|node| (node.id.as_str(), node)).collect();

        let mut absolute = IndexMap::with_capacity(nodes.len());
        for node in nodes {
            let mut origin = node.position;
            let mut current = node;
            let mut depth = 0;
            while let Some(parent_id) = current.parent_id.as_deref() {
                depth += 1;
                if depth > MAX_DEPTH || parent_id == node.id {
                    warn!(node_id = node.id.as_str(); "Parent chain is cyclic or too deep; truncating");
                    break;
                }
                match by_id.get(parent_id) {
                    Some(&parent) => {
                        origin = origin.add_point(parent.position);
                        current = parent;
                    }
                    None => {
                        warn!(node_id = node.id.as_str(), parent_id; "Parent not found; treating node as root");
                        break;
                    }
                }
            }
            absolute.insert(
                node.id.as_str(),
                Rect::from_position_size(origin, node.size),
            );
        }

        Self {
            nodes: nodes.iter().collect(),
            by_id,
            absolute,
        }
    }

    /// All nodes, in input order
    pub fn nodes(&self) -> &[&'a DiagramNode] {
        &self.nodes
    }

    /// Looks up a node by id
    pub fn node(&self, id: &str) -> Option<&'a DiagramNode> {
        self.by_id.get(id).copied()
    }

    /// The node's rectangle in absolute diagram coordinates
    pub fn absolute_rect(&self, id: &str) -> Option<Rect> {
        self.absolute.get(id).copied()
    }

    /// Nodes without a resolvable parent
    pub fn roots(&self) -> impl Iterator<Item = &'a DiagramNode> + '_ {
        self.nodes
            .iter()
            .copied()
            .filter(|node| match node.parent_id.as_deref() {
                Some(parent_id) => !self.by_id.contains_key(parent_id),
                None => true,
            })
    }

    /// Direct children of the given node
    pub fn children_of(&self, parent_id: &str) -> impl Iterator<Item = &'a DiagramNode> + '_ {
        let parent_id = parent_id.to_owned();
        self.nodes
            .iter()
            .copied()
            .filter(move |node| node.parent_id.as_deref() == Some(parent_id.as_str()))
    }

    /// True when `ancestor_id` appears on `node_id`'s parent chain
    pub fn is_ancestor(&self, ancestor_id: &str, node_id: &str) -> bool {
        let mut current = match self.by_id.get(node_id) {
            Some(node) => *node,
            None => return false,
        };
        let mut depth = 0;
        while let Some(parent_id) = current.parent_id.as_deref() {
            if parent_id == ancestor_id {
                return true;
            }
            depth += 1;
            if depth > MAX_DEPTH {
                return false;
            }
            match self.by_id.get(parent_id) {
                Some(&parent) => current = parent,
                None => return false,
            }
        }
        false
    }

    /// True when either node is an ancestor of the other.
    ///
    /// Related pairs are exempt from overlap and spacing checks: a child is
    /// *supposed* to sit inside its ancestors, and containment has its own
    /// analysis.
    pub fn are_related(&self, a: &str, b: &str) -> bool {
        self.is_ancestor(a, b) || self.is_ancestor(b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested_fixture() -> Vec<DiagramNode> {
        vec![
            DiagramNode::new("system", 100.0, 100.0, 600.0, 400.0).with_kind(NodeKind::System),
            DiagramNode::new("container", 50.0, 50.0, 300.0, 200.0)
                .with_parent("system")
                .with_kind(NodeKind::Container),
            DiagramNode::new("component", 20.0, 30.0, 100.0, 60.0)
                .with_parent("container")
                .with_kind(NodeKind::Component),
            DiagramNode::new("lonely", 900.0, 100.0, 100.0, 100.0),
        ]
    }

    #[test]
    fn test_absolute_positions_accumulate() {
        let nodes = nested_fixture();
        let hierarchy = Hierarchy::build(&nodes);

        let system = hierarchy.absolute_rect("system").unwrap();
        assert_eq!(system.min_x(), 100.0);

        let container = hierarchy.absolute_rect("container").unwrap();
        assert_eq!(container.min_x(), 150.0);
        assert_eq!(container.min_y(), 150.0);

        let component = hierarchy.absolute_rect("component").unwrap();
        assert_eq!(component.min_x(), 170.0);
        assert_eq!(component.min_y(), 180.0);
    }

    #[test]
    fn test_ancestry() {
        let nodes = nested_fixture();
        let hierarchy = Hierarchy::build(&nodes);

        assert!(hierarchy.is_ancestor("system", "component"));
        assert!(hierarchy.is_ancestor("container", "component"));
        assert!(!hierarchy.is_ancestor("component", "system"));
        assert!(!hierarchy.is_ancestor("lonely", "component"));

        assert!(hierarchy.are_related("system", "component"));
        assert!(hierarchy.are_related("component", "system"));
        assert!(!hierarchy.are_related("lonely", "component"));
    }

    #[test]
    fn test_missing_parent_treated_as_root() {
        let nodes = vec![DiagramNode::new("orphan", 10.0, 20.0, 50.0, 50.0).with_parent("ghost")];
        let hierarchy = Hierarchy::build(&nodes);

        let rect = hierarchy.absolute_rect("orphan").unwrap();
        assert_eq!(rect.min_x(), 10.0);
        assert_eq!(rect.min_y(), 20.0);
        assert_eq!(hierarchy.roots().count(), 1);
    }

    #[test]
    fn test_parent_cycle_does_not_hang() {
        let nodes = vec![
            DiagramNode::new("a", 10.0, 0.0, 50.0, 50.0).with_parent("b"),
            DiagramNode::new("b", 20.0, 0.0, 50.0, 50.0).with_parent("a"),
        ];
        let hierarchy = Hierarchy::build(&nodes);
        // Chains are truncated; both nodes still get rectangles
        assert!(hierarchy.absolute_rect("a").is_some());
        assert!(hierarchy.absolute_rect("b").is_some());
    }

    #[test]
    fn test_children_of() {
        let nodes = nested_fixture();
        let hierarchy = Hierarchy::build(&nodes);
        let children: Vec<_> = hierarchy.children_of("system").map(|n| n.id.as_str()).collect();
        assert_eq!(children, vec!["container"]);
    }

    #[test]
    fn test_node_deserializes_from_snapshot_json() {
        let json = r#"{
            "id": "api",
            "position": { "x": 10.0, "y": 20.0 },
            "size": { "width": 180.0, "height": 90.0 },
            "parentId": "backend",
            "kind": "container",
            "isExternal": false,
            "label": "API Gateway"
        }"#;
        let node: DiagramNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.parent_id.as_deref(), Some("backend"));
        assert_eq!(node.kind, NodeKind::Container);
        assert_eq!(node.size.width(), 180.0);
    }

    #[test]
    fn test_node_defaults_applied_when_fields_missing() {
        let node: DiagramNode = serde_json::from_str(r#"{ "id": "bare" }"#).unwrap();
        assert_eq!(node.size.width(), 100.0);
        assert_eq!(node.size.height(), 100.0);
        assert_eq!(node.position, Point::new(0.0, 0.0));
        assert_eq!(node.kind, NodeKind::Other);
    }

    #[test]
    fn test_unknown_kind_maps_to_other() {
        let node: DiagramNode =
            serde_json::from_str(r#"{ "id": "x", "kind": "somethingNew" }"#).unwrap();
        assert_eq!(node.kind, NodeKind::Other);
    }

    #[test]
    fn test_edge_deserializes_with_points() {
        let json = r#"{
            "id": "e1",
            "source": "a",
            "target": "b",
            "points": [ { "x": 0.0, "y": 0.0 }, { "x": 50.0, "y": 0.0 } ],
            "interaction": "async"
        }"#;
        let edge: DiagramEdge = serde_json::from_str(json).unwrap();
        assert_eq!(edge.points.as_ref().unwrap().len(), 2);
        assert_eq!(edge.interaction, Interaction::Async);
    }
}
