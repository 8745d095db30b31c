//! Node-pair analyses: sibling overlap and minimum spacing.
//!
//! Both checks walk the same set of unordered node pairs, excluding pairs
//! where one node is an ancestor of the other: a child sits inside its
//! ancestors by design, and containment has its own analysis.

use log::trace;

use sextant_core::geometry::{edge_to_edge_distance, overlap_area};
use sextant_core::metrics::{OverlapViolation, SpacingViolation};
use sextant_core::model::Hierarchy;

use crate::config::AnalysisConfig;

#[derive(Debug)]
pub(crate) struct PairReport {
    pub overlaps: Vec<OverlapViolation>,
    pub spacing: Vec<SpacingViolation>,
    pub min_spacing: f32,
    pub average_spacing: f32,
    pub overlap_score: f32,
    pub spacing_score: f32,
}

pub(crate) fn scan_pairs(hierarchy: &Hierarchy<'_>, config: &AnalysisConfig) -> PairReport {
    let nodes = hierarchy.nodes();

    let mut overlaps = Vec::new();
    let mut spacing = Vec::new();
    let mut eligible_pairs = 0usize;
    let mut min_distance = f32::INFINITY;
    let mut distance_sum = 0.0f32;
    let mut measured = 0usize;

    for i in 0..nodes.len() {
        for j in (i + 1)..nodes.len() {
            let a = nodes[i];
            let b = nodes[j];
            if hierarchy.are_related(&a.id, &b.id) {
                continue;
            }
            let (Some(rect_a), Some(rect_b)) = (
                hierarchy.absolute_rect(&a.id),
                hierarchy.absolute_rect(&b.id),
            ) else {
                continue;
            };
            eligible_pairs += 1;

            let area = overlap_area(rect_a, rect_b);
            if area > 0.0 {
                let smaller = rect_a.area().min(rect_b.area());
                let percentage = if smaller > 0.0 {
                    (area / smaller * 100.0).min(100.0)
                } else {
                    0.0
                };
                trace!(node_a = a.id.as_str(), node_b = b.id.as_str(), area; "Node overlap");
                overlaps.push(OverlapViolation {
                    node_a: a.id.clone(),
                    node_b: b.id.clone(),
                    overlap_area: area,
                    overlap_percentage: percentage,
                });
            }

            let distance = edge_to_edge_distance(rect_a, rect_b);
            if distance.is_finite() {
                min_distance = min_distance.min(distance);
                distance_sum += distance.max(0.0);
                measured += 1;

                // Overlapping pairs are already critical; the spacing list
                // holds the near-miss pairs only.
                if distance >= 0.0 && distance < config.min_spacing {
                    spacing.push(SpacingViolation {
                        node_a: a.id.clone(),
                        node_b: b.id.clone(),
                        distance,
                        required: config.min_spacing,
                    });
                }
            }
        }
    }

    let average_spacing = if measured > 0 {
        distance_sum / measured as f32
    } else {
        0.0
    };
    let min_spacing = if min_distance.is_finite() {
        min_distance
    } else {
        0.0
    };

    let overlap_score = if eligible_pairs == 0 {
        100.0
    } else {
        (eligible_pairs - overlaps.len()) as f32 / eligible_pairs as f32 * 100.0
    };

    let mut spacing_score = 100.0 - config.spacing_penalty * spacing.len() as f32;
    if average_spacing > config.spacing_bonus_threshold {
        let bonus = ((average_spacing - config.spacing_bonus_threshold) * 0.2)
            .min(config.spacing_bonus_max);
        spacing_score += bonus;
    }
    let spacing_score = spacing_score.clamp(0.0, 100.0);

    PairReport {
        overlaps,
        spacing,
        min_spacing,
        average_spacing,
        overlap_score,
        spacing_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sextant_core::model::DiagramNode;

    fn scan(nodes: &[DiagramNode]) -> PairReport {
        let hierarchy = Hierarchy::build(nodes);
        scan_pairs(&hierarchy, &AnalysisConfig::default())
    }

    #[test]
    fn test_clean_row_has_no_violations() {
        let nodes = vec![
            DiagramNode::new("a", 0.0, 0.0, 100.0, 100.0),
            DiagramNode::new("b", 300.0, 0.0, 100.0, 100.0),
            DiagramNode::new("c", 600.0, 0.0, 100.0, 100.0),
        ];
        let report = scan(&nodes);
        assert!(report.overlaps.is_empty());
        assert!(report.spacing.is_empty());
        assert_eq!(report.overlap_score, 100.0);
        assert_eq!(report.min_spacing, 100.0);
    }

    #[test]
    fn test_identical_nodes_fully_overlap() {
        let nodes = vec![
            DiagramNode::new("a", 0.0, 0.0, 100.0, 100.0),
            DiagramNode::new("b", 0.0, 0.0, 100.0, 100.0),
        ];
        let report = scan(&nodes);
        assert_eq!(report.overlaps.len(), 1);
        assert_eq!(report.overlaps[0].overlap_percentage, 100.0);
        assert_eq!(report.overlap_score, 0.0);
    }

    #[test]
    fn test_near_miss_is_a_spacing_violation() {
        let nodes = vec![
            DiagramNode::new("a", 0.0, 0.0, 100.0, 100.0),
            DiagramNode::new("b", 110.0, 0.0, 100.0, 100.0),
        ];
        let report = scan(&nodes);
        assert!(report.overlaps.is_empty());
        assert_eq!(report.spacing.len(), 1);
        assert_eq!(report.spacing[0].distance, 10.0);
        assert_eq!(report.spacing[0].required, 30.0);
    }

    #[test]
    fn test_parent_child_pair_is_skipped() {
        let nodes = vec![
            DiagramNode::new("parent", 0.0, 0.0, 400.0, 400.0),
            DiagramNode::new("child", 50.0, 50.0, 100.0, 100.0).with_parent("parent"),
        ];
        let report = scan(&nodes);
        assert!(report.overlaps.is_empty());
        assert!(report.spacing.is_empty());
        assert_eq!(report.overlap_score, 100.0);
    }

    #[test]
    fn test_grandparent_pair_is_skipped() {
        let nodes = vec![
            DiagramNode::new("system", 0.0, 0.0, 600.0, 600.0),
            DiagramNode::new("container", 100.0, 100.0, 400.0, 400.0).with_parent("system"),
            DiagramNode::new("component", 100.0, 100.0, 100.0, 100.0).with_parent("container"),
        ];
        let report = scan(&nodes);
        assert!(report.overlaps.is_empty());
    }

    #[test]
    fn test_single_node_scores_neutral() {
        let nodes = vec![DiagramNode::new("only", 0.0, 0.0, 100.0, 100.0)];
        let report = scan(&nodes);
        assert_eq!(report.overlap_score, 100.0);
        assert_eq!(report.spacing_score, 100.0);
    }

    #[test]
    fn test_generous_spacing_earns_bonus_but_caps_at_100() {
        let nodes = vec![
            DiagramNode::new("a", 0.0, 0.0, 100.0, 100.0),
            DiagramNode::new("b", 500.0, 0.0, 100.0, 100.0),
        ];
        let report = scan(&nodes);
        assert_eq!(report.spacing_score, 100.0);
    }
}
