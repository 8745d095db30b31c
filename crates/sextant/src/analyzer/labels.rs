//! Label heuristics: clipped node labels and edge-label collisions.
//!
//! Text size is estimated from character count (≈7px per character), not
//! measured from font metrics. The estimate is intentionally conservative
//! and portable; swapping in a real text-measurement backend would only
//! tighten these checks, not change their shape.

use sextant_core::geometry::{Point, Rect};
use sextant_core::model::{DiagramEdge, Hierarchy};

use crate::config::AnalysisConfig;

#[derive(Debug)]
pub(crate) struct LabelReport {
    pub clipped_node_labels: usize,
    pub edge_label_overlaps: usize,
    pub label_score: f32,
}

pub(crate) fn analyze_labels(
    edges: &[DiagramEdge],
    hierarchy: &Hierarchy<'_>,
    config: &AnalysisConfig,
) -> LabelReport {
    let clipped_node_labels = count_clipped_labels(hierarchy, config);
    let edge_label_overlaps = count_edge_label_overlaps(edges, hierarchy, config);

    let label_score = (100.0
        - 10.0 * clipped_node_labels as f32
        - 8.0 * edge_label_overlaps as f32)
        .clamp(0.0, 100.0);

    LabelReport {
        clipped_node_labels,
        edge_label_overlaps,
        label_score,
    }
}

/// Estimated rendered width of a text run
fn estimated_width(text: &str, config: &AnalysisConfig) -> f32 {
    text.chars().count() as f32 * config.label_char_width
}

fn count_clipped_labels(hierarchy: &Hierarchy<'_>, config: &AnalysisConfig) -> usize {
    let mut clipped = 0usize;
    for node in hierarchy.nodes() {
        let available = node.size.width() - 2.0 * config.node_text_inset;
        if available <= 0.0 {
            continue;
        }
        let widest = [node.label.as_deref(), node.technology.as_deref()]
            .into_iter()
            .flatten()
            .map(|text| estimated_width(text, config))
            .fold(0.0f32, f32::max);
        if widest > available {
            clipped += 1;
        }
    }
    clipped
}

fn count_edge_label_overlaps(
    edges: &[DiagramEdge],
    hierarchy: &Hierarchy<'_>,
    config: &AnalysisConfig,
) -> usize {
    let mut overlaps = 0usize;

    for edge in edges {
        let Some(label) = edge.label.as_deref() else {
            continue;
        };

        // Anchor: the router's label position, else the path midpoint
        let anchor = edge.label_position.or_else(|| path_midpoint(edge, hierarchy));
        let Some(anchor) = anchor else {
            continue;
        };

        let width = estimated_width(label, config);
        let height = config.label_line_height;
        let label_box = Rect::new(
            anchor.x() - width / 2.0,
            anchor.y() - height / 2.0,
            width,
            height,
        );

        let collides = hierarchy.nodes().iter().any(|node| {
            if node.id == edge.source || node.id == edge.target {
                return false;
            }
            match hierarchy.absolute_rect(&node.id) {
                Some(rect) => {
                    sextant_core::geometry::overlap_area(
                        label_box,
                        rect.expand(config.label_clearance),
                    ) > 0.0
                }
                None => false,
            }
        });
        if collides {
            overlaps += 1;
        }
    }

    overlaps
}

/// Midpoint of an edge's path: the middle routed point when one exists,
/// else the midpoint of the straight center segment. Shared with the
/// congestion analysis.
pub(crate) fn path_midpoint(edge: &DiagramEdge, hierarchy: &Hierarchy<'_>) -> Option<Point> {
    if let Some(points) = edge.points.as_ref() {
        if points.len() >= 2 {
            return Some(points[points.len() / 2]);
        }
    }
    let source = hierarchy.absolute_rect(&edge.source)?;
    let target = hierarchy.absolute_rect(&edge.target)?;
    Some(source.center().midpoint(target.center()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sextant_core::model::DiagramNode;

    fn analyze(nodes: &[DiagramNode], edges: &[DiagramEdge]) -> LabelReport {
        let hierarchy = Hierarchy::build(nodes);
        analyze_labels(edges, &hierarchy, &AnalysisConfig::default())
    }

    #[test]
    fn test_short_label_fits() {
        let nodes = vec![DiagramNode::new("a", 0.0, 0.0, 200.0, 100.0).with_label("API")];
        let report = analyze(&nodes, &[]);
        assert_eq!(report.clipped_node_labels, 0);
        assert_eq!(report.label_score, 100.0);
    }

    #[test]
    fn test_long_label_clips() {
        // 40 chars * 7px = 280 > 100 - 16
        let nodes = vec![
            DiagramNode::new("a", 0.0, 0.0, 100.0, 100.0)
                .with_label("An unreasonably verbose component name"),
        ];
        let report = analyze(&nodes, &[]);
        assert_eq!(report.clipped_node_labels, 1);
        assert_eq!(report.label_score, 90.0);
    }

    #[test]
    fn test_edge_label_over_third_node() {
        let nodes = vec![
            DiagramNode::new("a", 0.0, 0.0, 100.0, 100.0),
            DiagramNode::new("b", 400.0, 0.0, 100.0, 100.0),
            // Sits exactly at the midpoint of a->b
            DiagramNode::new("bystander", 200.0, 0.0, 100.0, 100.0),
        ];
        let edges = vec![DiagramEdge::new("e", "a", "b").with_label("calls")];
        let report = analyze(&nodes, &edges);
        assert_eq!(report.edge_label_overlaps, 1);
    }

    #[test]
    fn test_edge_label_clear_of_nodes() {
        let nodes = vec![
            DiagramNode::new("a", 0.0, 0.0, 100.0, 100.0),
            DiagramNode::new("b", 400.0, 0.0, 100.0, 100.0),
        ];
        let edges = vec![DiagramEdge::new("e", "a", "b").with_label("calls")];
        let report = analyze(&nodes, &edges);
        assert_eq!(report.edge_label_overlaps, 0);
    }

    #[test]
    fn test_explicit_label_position_wins() {
        let nodes = vec![
            DiagramNode::new("a", 0.0, 0.0, 100.0, 100.0),
            DiagramNode::new("b", 400.0, 0.0, 100.0, 100.0),
            DiagramNode::new("bystander", 200.0, 0.0, 100.0, 100.0),
        ];
        // Label pushed well away from the bystander
        let mut edge = DiagramEdge::new("e", "a", "b").with_label("calls");
        edge.label_position = Some(Point::new(250.0, 400.0));
        let report = analyze(&nodes, &[edge]);
        assert_eq!(report.edge_label_overlaps, 0);
    }
}
