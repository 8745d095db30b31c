//! Secondary geometry heuristics: edge congestion, sibling alignment, and
//! routed-path detours.
//!
//! These refine the score for diagrams that already pass the primary
//! checks; their weights are small, and each degrades to a neutral 100
//! when the diagram has nothing for them to measure.

use std::collections::HashMap;

use sextant_core::geometry::polyline_length;
use sextant_core::model::{DiagramEdge, Hierarchy};

use crate::analyzer::labels::path_midpoint;
use crate::config::AnalysisConfig;

#[derive(Debug)]
pub(crate) struct RefinementReport {
    pub congestion_score: f32,
    pub alignment_score: f32,
    pub detour_score: f32,
}

pub(crate) fn analyze_refinements(
    edges: &[DiagramEdge],
    hierarchy: &Hierarchy<'_>,
    config: &AnalysisConfig,
) -> RefinementReport {
    RefinementReport {
        congestion_score: congestion(edges, hierarchy, config),
        alignment_score: sibling_alignment(hierarchy, config),
        detour_score: detour(edges, config),
    }
}

/// Grid-bucket density of edge midpoints. Cells holding more midpoints
/// than the limit are congested; each congested cell costs 15 points.
fn congestion(edges: &[DiagramEdge], hierarchy: &Hierarchy<'_>, config: &AnalysisConfig) -> f32 {
    if edges.is_empty() || config.congestion_cell <= 0.0 {
        return 100.0;
    }

    let mut cells: HashMap<(i64, i64), usize> = HashMap::new();
    for edge in edges {
        let Some(midpoint) = path_midpoint(edge, hierarchy) else {
            continue;
        };
        if !midpoint.is_finite() {
            continue;
        }
        let cell = (
            (midpoint.x() / config.congestion_cell).floor() as i64,
            (midpoint.y() / config.congestion_cell).floor() as i64,
        );
        *cells.entry(cell).or_insert(0) += 1;
    }

    let congested = cells
        .values()
        .filter(|&&count| count > config.congestion_limit)
        .count();
    (100.0 - 15.0 * congested as f32).clamp(0.0, 100.0)
}

/// Fraction of siblings sharing a row or column with another sibling.
fn sibling_alignment(hierarchy: &Hierarchy<'_>, config: &AnalysisConfig) -> f32 {
    // Group by parent; roots form their own group
    let mut groups: HashMap<Option<&str>, Vec<(f32, f32)>> = HashMap::new();
    for node in hierarchy.nodes() {
        if let Some(rect) = hierarchy.absolute_rect(&node.id) {
            groups
                .entry(node.parent_id.as_deref())
                .or_default()
                .push((rect.center().x(), rect.center().y()));
        }
    }

    let mut aligned = 0usize;
    let mut total = 0usize;
    for centers in groups.values() {
        if centers.len() < 2 {
            continue;
        }
        total += centers.len();
        for (i, &(x, y)) in centers.iter().enumerate() {
            let has_partner = centers.iter().enumerate().any(|(j, &(ox, oy))| {
                i != j
                    && ((x - ox).abs() <= config.alignment_tolerance
                        || (y - oy).abs() <= config.alignment_tolerance)
            });
            if has_partner {
                aligned += 1;
            }
        }
    }

    if total == 0 {
        100.0
    } else {
        aligned as f32 / total as f32 * 100.0
    }
}

/// Average routed-path length over straight-line length, scored against
/// the tolerated detour ratio.
fn detour(edges: &[DiagramEdge], config: &AnalysisConfig) -> f32 {
    let mut ratio_sum = 0.0f32;
    let mut measured = 0usize;

    for edge in edges {
        let Some(points) = edge.points.as_ref() else {
            continue;
        };
        if points.len() < 2 {
            continue;
        }
        let routed = polyline_length(points);
        let straight = points[0].distance_to(points[points.len() - 1]);
        if straight <= f32::EPSILON || !routed.is_finite() {
            continue;
        }
        ratio_sum += routed / straight;
        measured += 1;
    }

    if measured == 0 {
        return 100.0;
    }
    let average = ratio_sum / measured as f32;
    if average <= config.detour_tolerance {
        100.0
    } else {
        (100.0 - (average - config.detour_tolerance) * 100.0).clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sextant_core::geometry::Point;
    use sextant_core::model::DiagramNode;

    fn analyze(nodes: &[DiagramNode], edges: &[DiagramEdge]) -> RefinementReport {
        let hierarchy = Hierarchy::build(nodes);
        analyze_refinements(edges, &hierarchy, &AnalysisConfig::default())
    }

    #[test]
    fn test_no_edges_is_neutral() {
        let report = analyze(&[], &[]);
        assert_eq!(report.congestion_score, 100.0);
        assert_eq!(report.detour_score, 100.0);
    }

    #[test]
    fn test_funnel_of_midpoints_congests_a_cell() {
        // Five edges whose straight midpoints all land in the same cell
        let mut nodes = vec![DiagramNode::new("hub", 400.0, 400.0, 100.0, 100.0)];
        let mut edges = Vec::new();
        for i in 0..5 {
            let id = format!("spoke{i}");
            nodes.push(DiagramNode::new(&id, 400.0, 700.0 + i as f32, 100.0, 100.0));
            edges.push(DiagramEdge::new(format!("e{i}"), "hub", &id));
        }
        let report = analyze(&nodes, &edges);
        assert_eq!(report.congestion_score, 85.0);
    }

    #[test]
    fn test_row_of_siblings_is_aligned() {
        let nodes = vec![
            DiagramNode::new("a", 0.0, 0.0, 100.0, 100.0),
            DiagramNode::new("b", 300.0, 0.0, 100.0, 100.0),
            DiagramNode::new("c", 600.0, 0.0, 100.0, 100.0),
        ];
        let report = analyze(&nodes, &[]);
        assert_eq!(report.alignment_score, 100.0);
    }

    #[test]
    fn test_scattered_siblings_score_low() {
        let nodes = vec![
            DiagramNode::new("a", 0.0, 0.0, 100.0, 100.0),
            DiagramNode::new("b", 300.0, 500.0, 100.0, 100.0),
            DiagramNode::new("c", 600.0, 900.0, 100.0, 100.0),
        ];
        let report = analyze(&nodes, &[]);
        assert_eq!(report.alignment_score, 0.0);
    }

    #[test]
    fn test_straight_routes_have_no_detour() {
        let edges = vec![
            DiagramEdge::new("e", "a", "b")
                .with_points(vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)]),
        ];
        let report = analyze(&[], &edges);
        assert_eq!(report.detour_score, 100.0);
    }

    #[test]
    fn test_winding_route_is_a_detour() {
        // Path length 300 for a straight distance of 100: ratio 3.0
        let edges = vec![DiagramEdge::new("e", "a", "b").with_points(vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 100.0),
            Point::new(100.0, 100.0),
            Point::new(100.0, 0.0),
        ])];
        let report = analyze(&[], &edges);
        assert!(report.detour_score < 100.0);
    }
}
