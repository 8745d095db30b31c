//! Quality metrics: violation records, sub-scores, and the analysis result.
//!
//! [`DiagramQualityMetrics`] is the immutable record produced by one
//! analysis pass. It is created fresh on every call and never mutated in
//! place; maps keyed by node id use [`IndexMap`] so iteration order, and
//! therefore serialized output, is deterministic for identical input.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::geometry::Size;

/// Two sibling nodes whose rectangles intersect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlapViolation {
    pub node_a: String,
    pub node_b: String,
    /// Intersection area in square units
    pub overlap_area: f32,
    /// Intersection area relative to the smaller node's area, 0–100
    pub overlap_percentage: f32,
}

/// Two non-related nodes closer than the minimum spacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpacingViolation {
    pub node_a: String,
    pub node_b: String,
    /// Measured edge-to-edge distance
    pub distance: f32,
    /// The minimum spacing that was required
    pub required: f32,
}

/// How a child broke out of its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContainmentKind {
    /// The child's box exits the parent's bounds entirely on some side
    Outside,
    /// The child stays inside the parent but violates the required padding
    TooCloseToEdge,
}

/// Per-side overflow amounts, in units. A positive value means the child
/// protrudes past (or into the padding of) that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Overflow {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Overflow {
    /// True when no side overflows
    pub fn is_empty(self) -> bool {
        self.left <= 0.0 && self.right <= 0.0 && self.top <= 0.0 && self.bottom <= 0.0
    }

    /// Sides with positive overflow, rendered as `"right by 50, bottom by 50"`
    pub fn describe(self) -> String {
        let mut parts = Vec::new();
        for (side, amount) in [
            ("left", self.left),
            ("right", self.right),
            ("top", self.top),
            ("bottom", self.bottom),
        ] {
            if amount > 0.0 {
                parts.push(format!("{side} by {amount:.0}"));
            }
        }
        parts.join(", ")
    }
}

/// A child node rendered outside its parent's padded interior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainmentViolation {
    pub child: String,
    pub parent: String,
    pub violation: ContainmentKind,
    /// Directional breakdown of the overflow
    pub details: Overflow,
}

/// Which parent dimension is too small for its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SizeDimension {
    Width,
    Height,
    Both,
}

/// A parent whose actual size cannot contain its children plus padding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentSizeViolation {
    pub parent: String,
    /// Minimal size that would contain all children with padding
    pub required: Size,
    pub actual: Size,
    pub dimension: SizeDimension,
}

/// An edge that flows against the top-down layout convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionViolation {
    pub edge_id: String,
    pub source: String,
    pub target: String,
    /// How far above the source the target sits, beyond the threshold
    pub upward_by: f32,
}

/// Min/max/average of per-edge node-center distances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeLengthStats {
    pub min: f32,
    pub max: f32,
    pub average: f32,
}

/// Letter grade derived from the weighted score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    #[default]
    F,
}

impl Grade {
    /// Grade bands: A≥90, B≥80, C≥70, D≥60, else F
    pub fn from_score(score: f32) -> Self {
        if score >= 90.0 {
            Grade::A
        } else if score >= 80.0 {
            Grade::B
        } else if score >= 70.0 {
            Grade::C
        } else if score >= 60.0 {
            Grade::D
        } else {
            Grade::F
        }
    }

    /// True for the passing grades A–C
    pub fn is_passing(self) -> bool {
        matches!(self, Grade::A | Grade::B | Grade::C)
    }
}

/// Per-criterion sub-scores, each 0–100.
///
/// A criterion with no measurable instances (no edges, a single node)
/// scores a neutral 100 rather than penalizing the diagram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubScores {
    pub overlap: f32,
    pub spacing: f32,
    pub hierarchy: f32,
    pub sizing: f32,
    pub crossings: f32,
    pub edges_over_nodes: f32,
    pub edge_length: f32,
    pub bends: f32,
    pub direction: f32,
    pub utilization: f32,
    pub density: f32,
    pub consistency: f32,
    pub aspect: f32,
    pub labels: f32,
    pub congestion: f32,
    pub crossing_angle: f32,
    pub alignment: f32,
    pub detour: f32,
}

impl Default for SubScores {
    fn default() -> Self {
        Self {
            overlap: 100.0,
            spacing: 100.0,
            hierarchy: 100.0,
            sizing: 100.0,
            crossings: 100.0,
            edges_over_nodes: 100.0,
            edge_length: 100.0,
            bends: 100.0,
            direction: 100.0,
            utilization: 100.0,
            density: 100.0,
            consistency: 100.0,
            aspect: 100.0,
            labels: 100.0,
            congestion: 100.0,
            crossing_angle: 100.0,
            alignment: 100.0,
            detour: 100.0,
        }
    }
}

/// The complete, immutable result of one analysis pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramQualityMetrics {
    // Violation lists
    pub overlapping_nodes: Vec<OverlapViolation>,
    pub spacing_violations: Vec<SpacingViolation>,
    pub parent_child_containment: Vec<ContainmentViolation>,
    pub parent_child_size_violations: Vec<ParentSizeViolation>,
    pub direction_violations: Vec<DirectionViolation>,

    // Scalar counts
    pub edge_crossings: usize,
    pub edges_over_nodes: usize,
    pub edge_bends: usize,
    pub edge_label_overlaps: usize,
    pub clipped_node_labels: usize,

    // Scalar measurements
    pub min_spacing: f32,
    pub average_spacing: f32,
    pub edge_length: EdgeLengthStats,
    pub aspect_ratio: f32,
    /// Fraction of the viewport covered by the diagram bounding box, 0–1
    pub viewport_utilization: f32,
    /// Fraction of the bounding box not covered by root nodes, 0–1
    pub empty_space: f32,

    // Per-criterion sub-scores
    pub scores: SubScores,

    /// Weighted 0–100 aggregate, subject to critical-violation caps
    pub weighted_score: f32,
    /// Fixed unweighted blend of the primary criteria, kept for comparison
    pub overall_score: f32,
    pub grade: Grade,
    /// Per-node 0–1 severity, the worst any single violation attributes to
    /// that node
    pub node_badness: IndexMap<String, f32>,
}

impl DiagramQualityMetrics {
    /// Total count of critical violations (containment + overlap)
    pub fn critical_violation_count(&self) -> usize {
        self.parent_child_containment.len() + self.overlapping_nodes.len()
    }

    /// Total count of label-related issues
    pub fn label_issue_count(&self) -> usize {
        self.edge_label_overlaps + self.clipped_node_labels
    }

    /// True when no violation list or counter is non-empty
    pub fn is_clean(&self) -> bool {
        self.overlapping_nodes.is_empty()
            && self.spacing_violations.is_empty()
            && self.parent_child_containment.is_empty()
            && self.parent_child_size_violations.is_empty()
            && self.direction_violations.is_empty()
            && self.edge_crossings == 0
            && self.edges_over_nodes == 0
            && self.label_issue_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_bands() {
        assert_eq!(Grade::from_score(95.0), Grade::A);
        assert_eq!(Grade::from_score(90.0), Grade::A);
        assert_eq!(Grade::from_score(89.9), Grade::B);
        assert_eq!(Grade::from_score(80.0), Grade::B);
        assert_eq!(Grade::from_score(75.0), Grade::C);
        assert_eq!(Grade::from_score(60.0), Grade::D);
        assert_eq!(Grade::from_score(59.9), Grade::F);
        assert_eq!(Grade::from_score(0.0), Grade::F);
    }

    #[test]
    fn test_overflow_describe() {
        let overflow = Overflow {
            left: 0.0,
            right: 50.0,
            top: 0.0,
            bottom: 12.4,
        };
        assert_eq!(overflow.describe(), "right by 50, bottom by 12");
        assert!(!overflow.is_empty());
        assert!(Overflow::default().is_empty());
    }

    #[test]
    fn test_default_metrics_are_clean() {
        let metrics = DiagramQualityMetrics::default();
        assert!(metrics.is_clean());
        assert_eq!(metrics.critical_violation_count(), 0);
        assert_eq!(metrics.scores.overlap, 100.0);
    }

    #[test]
    fn test_containment_kind_serializes_kebab_case() {
        let json = serde_json::to_string(&ContainmentKind::TooCloseToEdge).unwrap();
        assert_eq!(json, "\"too-close-to-edge\"");
        let json = serde_json::to_string(&ContainmentKind::Outside).unwrap();
        assert_eq!(json, "\"outside\"");
    }
}
