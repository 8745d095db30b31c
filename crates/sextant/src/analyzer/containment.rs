//! Parent/child containment and parent sizing checks.
//!
//! Containment works in the parent's local frame: a child's rectangle must
//! lie within `[padding, parent_size - padding]` on both axes. Violations
//! are classified [`ContainmentKind::Outside`] when the box exits the
//! parent's bounds proper, and [`ContainmentKind::TooCloseToEdge`] when it
//! stays inside but eats into the padding. Containment breaks encapsulation
//! semantics, so its score is cut far more sharply than any other
//! criterion.

use log::trace;

use sextant_core::geometry::Size;
use sextant_core::metrics::{
    ContainmentKind, ContainmentViolation, Overflow, ParentSizeViolation, SizeDimension,
};
use sextant_core::model::Hierarchy;

use crate::config::AnalysisConfig;

#[derive(Debug)]
pub(crate) struct ContainmentReport {
    pub containment: Vec<ContainmentViolation>,
    pub sizing: Vec<ParentSizeViolation>,
    pub hierarchy_score: f32,
    pub sizing_score: f32,
}

pub(crate) fn check_containment(
    hierarchy: &Hierarchy<'_>,
    config: &AnalysisConfig,
) -> ContainmentReport {
    let padding = config.containment_padding;
    let mut containment = Vec::new();

    for node in hierarchy.nodes() {
        let Some(parent_id) = node.parent_id.as_deref() else {
            continue;
        };
        let Some(parent) = hierarchy.node(parent_id) else {
            continue;
        };

        let child = node.local_rect();
        let parent_size = parent.size;

        // Overflow past the parent's bounds proper
        let outside = Overflow {
            left: -child.min_x(),
            right: child.max_x() - parent_size.width(),
            top: -child.min_y(),
            bottom: child.max_y() - parent_size.height(),
        };

        if !outside.is_empty() {
            trace!(child = node.id.as_str(), parent = parent_id; "Child outside parent bounds");
            containment.push(ContainmentViolation {
                child: node.id.clone(),
                parent: parent_id.to_owned(),
                violation: ContainmentKind::Outside,
                details: clamp_overflow(outside),
            });
            continue;
        }

        // Overflow into the required padding
        let padded = Overflow {
            left: padding - child.min_x(),
            right: child.max_x() - (parent_size.width() - padding),
            top: padding - child.min_y(),
            bottom: child.max_y() - (parent_size.height() - padding),
        };

        if !padded.is_empty() {
            containment.push(ContainmentViolation {
                child: node.id.clone(),
                parent: parent_id.to_owned(),
                violation: ContainmentKind::TooCloseToEdge,
                details: clamp_overflow(padded),
            });
        }
    }

    let sizing = check_parent_sizing(hierarchy, padding);

    // One violation caps the score at 50; each additional violation lowers
    // the cap by another 20.
    let hierarchy_score = match containment.len() {
        0 => 100.0,
        n => (50.0 - 20.0 * (n as f32 - 1.0)).max(0.0),
    };

    let sizing_score = (100.0 - 15.0 * sizing.len() as f32).max(0.0);

    ContainmentReport {
        containment,
        sizing,
        hierarchy_score,
        sizing_score,
    }
}

/// Zeroes the non-overflowing sides so the report only names real overflow
fn clamp_overflow(overflow: Overflow) -> Overflow {
    Overflow {
        left: overflow.left.max(0.0),
        right: overflow.right.max(0.0),
        top: overflow.top.max(0.0),
        bottom: overflow.bottom.max(0.0),
    }
}

fn check_parent_sizing(hierarchy: &Hierarchy<'_>, padding: f32) -> Vec<ParentSizeViolation> {
    let mut violations = Vec::new();

    for parent in hierarchy.nodes() {
        let mut extent: Option<sextant_core::geometry::Rect> = None;
        for child in hierarchy.children_of(&parent.id) {
            let rect = child.local_rect();
            extent = Some(match extent {
                Some(bounds) => bounds.merge(rect),
                None => rect,
            });
        }
        let Some(extent) = extent else {
            continue;
        };

        let required = Size::new(
            extent.width() + padding * 2.0,
            extent.height() + padding * 2.0,
        );
        let actual = parent.size;

        let too_narrow = actual.width() < required.width();
        let too_short = actual.height() < required.height();
        let dimension = match (too_narrow, too_short) {
            (true, true) => SizeDimension::Both,
            (true, false) => SizeDimension::Width,
            (false, true) => SizeDimension::Height,
            (false, false) => continue,
        };

        violations.push(ParentSizeViolation {
            parent: parent.id.clone(),
            required,
            actual,
            dimension,
        });
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use sextant_core::model::DiagramNode;

    fn check(nodes: &[DiagramNode]) -> ContainmentReport {
        let hierarchy = Hierarchy::build(nodes);
        check_containment(&hierarchy, &AnalysisConfig::default())
    }

    #[test]
    fn test_well_contained_child_passes() {
        let nodes = vec![
            DiagramNode::new("parent", 0.0, 0.0, 500.0, 500.0),
            DiagramNode::new("child", 100.0, 100.0, 200.0, 200.0).with_parent("parent"),
        ];
        let report = check(&nodes);
        assert!(report.containment.is_empty());
        assert_eq!(report.hierarchy_score, 100.0);
    }

    #[test]
    fn test_child_past_right_and_bottom_is_outside() {
        let nodes = vec![
            DiagramNode::new("parent", 0.0, 0.0, 300.0, 300.0),
            DiagramNode::new("child", 250.0, 250.0, 100.0, 100.0).with_parent("parent"),
        ];
        let report = check(&nodes);
        assert_eq!(report.containment.len(), 1);
        let violation = &report.containment[0];
        assert_eq!(violation.violation, ContainmentKind::Outside);
        assert_eq!(violation.details.right, 50.0);
        assert_eq!(violation.details.bottom, 50.0);
        assert_eq!(violation.details.left, 0.0);
        assert_eq!(violation.details.top, 0.0);
        assert!(!violation.details.describe().is_empty());
        assert_eq!(report.hierarchy_score, 50.0);
    }

    #[test]
    fn test_child_inside_padding_is_too_close() {
        let nodes = vec![
            DiagramNode::new("parent", 0.0, 0.0, 500.0, 500.0),
            // Inside the parent but only 20 from the left edge (padding 80)
            DiagramNode::new("child", 20.0, 100.0, 100.0, 100.0).with_parent("parent"),
        ];
        let report = check(&nodes);
        assert_eq!(report.containment.len(), 1);
        assert_eq!(
            report.containment[0].violation,
            ContainmentKind::TooCloseToEdge
        );
        assert_eq!(report.containment[0].details.left, 60.0);
    }

    #[test]
    fn test_multiple_violations_drop_the_cap() {
        let nodes = vec![
            DiagramNode::new("parent", 0.0, 0.0, 300.0, 300.0),
            DiagramNode::new("a", 250.0, 10.0, 100.0, 100.0).with_parent("parent"),
            DiagramNode::new("b", 10.0, 250.0, 100.0, 100.0).with_parent("parent"),
            DiagramNode::new("c", -50.0, 10.0, 100.0, 100.0).with_parent("parent"),
        ];
        let report = check(&nodes);
        assert_eq!(report.containment.len(), 3);
        assert_eq!(report.hierarchy_score, 10.0);
    }

    #[test]
    fn test_parent_too_small_for_children() {
        let nodes = vec![
            DiagramNode::new("parent", 0.0, 0.0, 200.0, 500.0),
            DiagramNode::new("child", 80.0, 80.0, 100.0, 100.0).with_parent("parent"),
        ];
        let report = check(&nodes);
        // Children extent 100 wide + 160 padding = 260 > 200 actual width
        assert_eq!(report.sizing.len(), 1);
        assert_eq!(report.sizing[0].dimension, SizeDimension::Width);
        assert!(report.sizing[0].required.width() > 200.0);
    }

    #[test]
    fn test_root_nodes_are_never_checked() {
        let nodes = vec![DiagramNode::new("root", -500.0, -500.0, 100.0, 100.0)];
        let report = check(&nodes);
        assert!(report.containment.is_empty());
        assert!(report.sizing.is_empty());
    }
}
