//! Whole-diagram balance: viewport utilization, empty space, per-kind
//! consistency, and aspect ratio.

use std::collections::HashMap;

use sextant_core::geometry::{Rect, Size};
use sextant_core::model::{Hierarchy, NodeKind};

use crate::config::AnalysisConfig;

#[derive(Debug)]
pub(crate) struct BalanceReport {
    pub aspect_ratio: f32,
    pub viewport_utilization: f32,
    pub empty_space: f32,
    pub utilization_score: f32,
    pub density_score: f32,
    pub consistency_score: f32,
    pub aspect_score: f32,
}

pub(crate) fn analyze_balance(
    hierarchy: &Hierarchy<'_>,
    viewport: Size,
    config: &AnalysisConfig,
) -> BalanceReport {
    let bounding = bounding_box(hierarchy);
    let root_count = hierarchy.roots().count();

    let Some(bounding) = bounding else {
        // No nodes: nothing to measure, nothing to penalize
        return BalanceReport {
            aspect_ratio: 1.0,
            viewport_utilization: 0.0,
            empty_space: 0.0,
            utilization_score: 100.0,
            density_score: 100.0,
            consistency_score: 100.0,
            aspect_score: 100.0,
        };
    };

    let aspect_ratio = if bounding.height() > 0.0 {
        bounding.width() / bounding.height()
    } else {
        1.0
    };

    let viewport_utilization =
        if viewport.width() > 0.0 && viewport.height() > 0.0 {
            let horizontal = bounding.width() / viewport.width();
            let vertical = bounding.height() / viewport.height();
            (horizontal + vertical) / 2.0
        } else {
            0.0
        };

    let utilization_score = if viewport.width() <= 0.0 || viewport.height() <= 0.0 {
        100.0
    } else if viewport_utilization < config.utilization_min {
        (100.0 - (config.utilization_min - viewport_utilization) * 200.0).clamp(0.0, 100.0)
    } else if viewport_utilization > config.utilization_max {
        (100.0 - (viewport_utilization - config.utilization_max) * 300.0).clamp(0.0, 100.0)
    } else {
        100.0
    };

    let root_area: f32 = hierarchy
        .roots()
        .filter_map(|node| hierarchy.absolute_rect(&node.id))
        .map(Rect::area)
        .sum();
    let empty_space = if bounding.area() > 0.0 {
        (1.0 - root_area / bounding.area()).clamp(0.0, 1.0)
    } else {
        0.0
    };

    // A lone root node occupies its own bounding box by definition;
    // density is only meaningful with at least two roots
    let density_score = if root_count < 2 {
        100.0
    } else if empty_space < config.empty_space_min {
        (empty_space / config.empty_space_min * 100.0).clamp(0.0, 100.0)
    } else if empty_space > config.empty_space_max {
        ((1.0 - empty_space) / (1.0 - config.empty_space_max) * 100.0).clamp(0.0, 100.0)
    } else {
        100.0
    };

    let consistency_score = consistency(hierarchy, config);

    let aspect_score = if aspect_ratio < config.aspect_min {
        (100.0 - (config.aspect_min - aspect_ratio) * 200.0).clamp(0.0, 100.0)
    } else if aspect_ratio > config.aspect_max {
        (100.0 - (aspect_ratio - config.aspect_max) * 25.0).clamp(0.0, 100.0)
    } else {
        100.0
    };

    BalanceReport {
        aspect_ratio,
        viewport_utilization,
        empty_space,
        utilization_score,
        density_score,
        consistency_score,
        aspect_score,
    }
}

pub(crate) fn bounding_box(hierarchy: &Hierarchy<'_>) -> Option<Rect> {
    hierarchy
        .nodes()
        .iter()
        .filter_map(|node| hierarchy.absolute_rect(&node.id))
        .reduce(Rect::merge)
}

/// Position variance within each kind group; tighter groups score higher.
///
/// A group is "aligned" when its members share a row or a column, so the
/// smaller of the two axis deviations is the one that matters.
fn consistency(hierarchy: &Hierarchy<'_>, config: &AnalysisConfig) -> f32 {
    let mut groups: HashMap<NodeKind, Vec<(f32, f32)>> = HashMap::new();
    for node in hierarchy.nodes() {
        if let Some(rect) = hierarchy.absolute_rect(&node.id) {
            groups
                .entry(node.kind)
                .or_default()
                .push((rect.center().x(), rect.center().y()));
        }
    }

    let mut total = 0.0f32;
    let mut counted = 0usize;
    for centers in groups.values() {
        if centers.len() < 2 {
            continue;
        }
        let n = centers.len() as f32;
        let mean_x = centers.iter().map(|c| c.0).sum::<f32>() / n;
        let mean_y = centers.iter().map(|c| c.1).sum::<f32>() / n;
        let dev_x =
            (centers.iter().map(|c| (c.0 - mean_x).powi(2)).sum::<f32>() / n).sqrt();
        let dev_y =
            (centers.iter().map(|c| (c.1 - mean_y).powi(2)).sum::<f32>() / n).sqrt();
        let deviation = dev_x.min(dev_y);

        let group_score = if deviation <= config.alignment_tolerance {
            100.0
        } else {
            (100.0 - (deviation - config.alignment_tolerance) * 0.5).clamp(0.0, 100.0)
        };
        total += group_score;
        counted += 1;
    }

    if counted == 0 { 100.0 } else { total / counted as f32 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sextant_core::model::DiagramNode;

    fn analyze(nodes: &[DiagramNode], viewport: Size) -> BalanceReport {
        let hierarchy = Hierarchy::build(nodes);
        analyze_balance(&hierarchy, viewport, &AnalysisConfig::default())
    }

    #[test]
    fn test_empty_diagram_is_neutral() {
        let report = analyze(&[], Size::new(1920.0, 1080.0));
        assert_eq!(report.utilization_score, 100.0);
        assert_eq!(report.density_score, 100.0);
        assert_eq!(report.aspect_score, 100.0);
    }

    #[test]
    fn test_utilization_in_band() {
        // Bounding box 800x450 in a 1000x562.5 viewport: 80% both axes
        let nodes = vec![
            DiagramNode::new("a", 0.0, 0.0, 100.0, 100.0),
            DiagramNode::new("b", 700.0, 350.0, 100.0, 100.0),
        ];
        let report = analyze(&nodes, Size::new(1000.0, 562.5));
        assert!((report.viewport_utilization - 0.8).abs() < 0.001);
        assert_eq!(report.utilization_score, 100.0);
    }

    #[test]
    fn test_tiny_diagram_underutilizes() {
        let nodes = vec![
            DiagramNode::new("a", 0.0, 0.0, 50.0, 50.0),
            DiagramNode::new("b", 60.0, 0.0, 50.0, 50.0),
        ];
        let report = analyze(&nodes, Size::new(1920.0, 1080.0));
        assert!(report.viewport_utilization < 0.2);
        assert!(report.utilization_score < 100.0);
    }

    #[test]
    fn test_aspect_in_band() {
        let nodes = vec![
            DiagramNode::new("a", 0.0, 0.0, 100.0, 100.0),
            DiagramNode::new("b", 300.0, 200.0, 100.0, 100.0),
        ];
        // 400 wide, 300 tall: ratio 1.33
        let report = analyze(&nodes, Size::new(1920.0, 1080.0));
        assert!((report.aspect_ratio - 400.0 / 300.0).abs() < 0.001);
        assert_eq!(report.aspect_score, 100.0);
    }

    #[test]
    fn test_extreme_ribbon_penalized() {
        let nodes = vec![
            DiagramNode::new("a", 0.0, 0.0, 100.0, 100.0),
            DiagramNode::new("b", 2900.0, 0.0, 100.0, 100.0),
        ];
        // 3000 wide, 100 tall: ratio 30
        let report = analyze(&nodes, Size::new(1920.0, 1080.0));
        assert!(report.aspect_ratio > 2.0);
        assert_eq!(report.aspect_score, 0.0);
    }

    #[test]
    fn test_single_root_density_neutral() {
        let nodes = vec![DiagramNode::new("a", 0.0, 0.0, 100.0, 100.0)];
        let report = analyze(&nodes, Size::new(1920.0, 1080.0));
        assert_eq!(report.density_score, 100.0);
    }

    #[test]
    fn test_aligned_kind_group_scores_high() {
        use sextant_core::model::NodeKind;
        let nodes = vec![
            DiagramNode::new("p1", 0.0, 0.0, 100.0, 100.0).with_kind(NodeKind::Person),
            DiagramNode::new("p2", 300.0, 0.0, 100.0, 100.0).with_kind(NodeKind::Person),
            DiagramNode::new("p3", 600.0, 0.0, 100.0, 100.0).with_kind(NodeKind::Person),
        ];
        // Same row: y-deviation is zero
        let report = analyze(&nodes, Size::new(1920.0, 1080.0));
        assert_eq!(report.consistency_score, 100.0);
    }

    #[test]
    fn test_scattered_kind_group_scores_lower() {
        use sextant_core::model::NodeKind;
        let nodes = vec![
            DiagramNode::new("p1", 0.0, 0.0, 100.0, 100.0).with_kind(NodeKind::Person),
            DiagramNode::new("p2", 400.0, 500.0, 100.0, 100.0).with_kind(NodeKind::Person),
            DiagramNode::new("p3", 900.0, 200.0, 100.0, 100.0).with_kind(NodeKind::Person),
        ];
        let report = analyze(&nodes, Size::new(1920.0, 1080.0));
        assert!(report.consistency_score < 100.0);
    }
}
