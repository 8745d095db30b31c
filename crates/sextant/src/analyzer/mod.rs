//! Diagram quality analysis.
//!
//! [`analyze`] consumes a positioned diagram snapshot and produces a
//! [`DiagramQualityMetrics`] record: per-criterion violation lists, scalar
//! measurements, sub-scores, and the weighted aggregate. The analysis is
//! deterministic and side-effect free apart from diagnostic logging;
//! calling it twice on identical input yields identical records.
//!
//! Each sub-analysis lives in its own submodule and is independently
//! testable:
//!
//! - `pairs` — sibling overlap and minimum spacing
//! - `containment` — parent/child containment and parent sizing
//! - `edges` — crossings, edges over nodes, bends, lengths, direction
//! - `labels` — clipped node labels and edge-label collisions
//! - `balance` — viewport utilization, empty space, consistency, aspect
//! - `refinement` — congestion, alignment, detour

mod balance;
mod containment;
mod edges;
mod labels;
mod pairs;
mod refinement;

use log::debug;

use sextant_core::geometry::Size;
use sextant_core::metrics::{DiagramQualityMetrics, SubScores};
use sextant_core::model::{DiagramEdge, DiagramLevel, DiagramNode, Hierarchy};
use sextant_core::weights::QualityWeights;

use crate::config::AnalysisConfig;
use crate::scoring;

/// Analyzes a positioned diagram and scores it.
///
/// # Arguments
///
/// * `nodes` - Positioned nodes; nested nodes carry parent-relative
///   positions
/// * `edges` - Connectors, optionally with routed polylines
/// * `viewport` - The viewport the diagram renders into
/// * `weights` - Weight vector for aggregation; `None` selects the table
///   for `level` (or the defaults when no level is given)
/// * `level` - C4 abstraction level of the view, when known
/// * `config` - Analysis thresholds; [`AnalysisConfig::default`] holds the
///   documented defaults
///
/// Malformed geometry never fails the call: degenerate rectangles,
/// unresolvable edges, and cyclic parent chains degrade to "no violation"
/// so a partially-broken diagram still gets a score.
pub fn analyze(
    nodes: &[DiagramNode],
    edges: &[DiagramEdge],
    viewport: Size,
    weights: Option<&QualityWeights>,
    level: Option<DiagramLevel>,
    config: &AnalysisConfig,
) -> DiagramQualityMetrics {
    debug!(
        node_count = nodes.len(),
        edge_count = edges.len(),
        level:? = level;
        "Analyzing diagram"
    );

    let hierarchy = Hierarchy::build(nodes);

    let pair_report = pairs::scan_pairs(&hierarchy, config);
    let containment_report = containment::check_containment(&hierarchy, config);
    let edge_report = edges::analyze_edges(edges, &hierarchy, config);
    let label_report = labels::analyze_labels(edges, &hierarchy, config);
    let balance_report = balance::analyze_balance(&hierarchy, viewport, config);
    let refinement_report = refinement::analyze_refinements(edges, &hierarchy, config);

    let scores = SubScores {
        overlap: pair_report.overlap_score,
        spacing: pair_report.spacing_score,
        hierarchy: containment_report.hierarchy_score,
        sizing: containment_report.sizing_score,
        crossings: edge_report.crossing_score,
        edges_over_nodes: edge_report.edge_node_score,
        edge_length: edge_report.edge_length_score,
        bends: edge_report.bend_score,
        direction: edge_report.direction_score,
        utilization: balance_report.utilization_score,
        density: balance_report.density_score,
        consistency: balance_report.consistency_score,
        aspect: balance_report.aspect_score,
        labels: label_report.label_score,
        congestion: refinement_report.congestion_score,
        crossing_angle: edge_report.crossing_angle_score,
        alignment: refinement_report.alignment_score,
        detour: refinement_report.detour_score,
    };

    let mut metrics = DiagramQualityMetrics {
        overlapping_nodes: pair_report.overlaps,
        spacing_violations: pair_report.spacing,
        parent_child_containment: containment_report.containment,
        parent_child_size_violations: containment_report.sizing,
        direction_violations: edge_report.direction,
        edge_crossings: edge_report.crossings,
        edges_over_nodes: edge_report.edges_over_nodes,
        edge_bends: edge_report.bends,
        edge_label_overlaps: label_report.edge_label_overlaps,
        clipped_node_labels: label_report.clipped_node_labels,
        min_spacing: pair_report.min_spacing,
        average_spacing: pair_report.average_spacing,
        edge_length: edge_report.lengths,
        aspect_ratio: balance_report.aspect_ratio,
        viewport_utilization: balance_report.viewport_utilization,
        empty_space: balance_report.empty_space,
        scores,
        ..DiagramQualityMetrics::default()
    };

    let resolved_weights = match weights {
        Some(weights) => *weights,
        None => QualityWeights::for_level(level),
    };
    scoring::finalize(&mut metrics, &resolved_weights);

    debug!(
        weighted_score = metrics.weighted_score,
        grade:? = metrics.grade,
        overlaps = metrics.overlapping_nodes.len(),
        containment = metrics.parent_child_containment.len();
        "Analysis complete"
    );

    metrics
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Size {
        Size::new(1920.0, 1080.0)
    }

    #[test]
    fn test_empty_diagram_scores_neutral() {
        let metrics = analyze(&[], &[], viewport(), None, None, &AnalysisConfig::default());
        assert!(metrics.is_clean());
        assert_eq!(metrics.scores.overlap, 100.0);
        assert_eq!(metrics.scores.crossings, 100.0);
    }

    #[test]
    fn test_analysis_is_idempotent() {
        let nodes = vec![
            DiagramNode::new("sys", 100.0, 100.0, 700.0, 600.0),
            DiagramNode::new("svc", 120.0, 120.0, 200.0, 100.0).with_parent("sys"),
            DiagramNode::new("db", 300.0, 850.0, 150.0, 100.0),
        ];
        let edges = vec![DiagramEdge::new("e", "svc", "db")];
        let config = AnalysisConfig::default();

        let first = analyze(&nodes, &edges, viewport(), None, None, &config);
        let second = analyze(&nodes, &edges, viewport(), None, None, &config);
        assert_eq!(first, second);
    }

    #[test]
    fn test_level_weight_table_changes_weighted_score_only() {
        let nodes = vec![
            DiagramNode::new("top", 0.0, 400.0, 100.0, 100.0),
            DiagramNode::new("bottom", 400.0, 0.0, 100.0, 100.0),
        ];
        // One upward edge
        let edges = vec![DiagramEdge::new("up", "top", "bottom")];
        let config = AnalysisConfig::default();

        let default = analyze(&nodes, &edges, viewport(), None, None, &config);
        let l1 = analyze(
            &nodes,
            &edges,
            viewport(),
            None,
            Some(DiagramLevel::L1),
            &config,
        );

        assert_eq!(default.scores, l1.scores);
        // L1 weighs direction more heavily, so the upward edge costs more
        assert!(l1.weighted_score < default.weighted_score);
    }

    #[test]
    fn test_critical_cap_ignores_the_weight_table() {
        let nodes = vec![
            DiagramNode::new("parent", 0.0, 0.0, 300.0, 300.0),
            DiagramNode::new("child", 250.0, 250.0, 100.0, 100.0).with_parent("parent"),
        ];
        // Zeroing out the hierarchy weight cannot rescue the score: the
        // containment cap applies after aggregation
        let custom = QualityWeights {
            hierarchy: 0.0,
            ..QualityWeights::default()
        };
        let metrics = analyze(
            &nodes,
            &[],
            viewport(),
            Some(&custom),
            None,
            &AnalysisConfig::default(),
        );
        assert_eq!(metrics.parent_child_containment.len(), 1);
        assert!(metrics.weighted_score <= 60.0);
    }
}
