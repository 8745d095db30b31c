//! Quality weight vectors and per-level overrides.
//!
//! Weights are non-negative and need not sum to 1: the scoring engine
//! normalizes the weighted sum by the total of the weights actually used.
//! [`QualityWeights::for_level`] returns the tuned table for a given C4
//! level: context views (L1) care most about flow direction and edge
//! crossings, container views (L2) about containment and edges routed over
//! boxes.

use serde::{Deserialize, Serialize};

use crate::model::DiagramLevel;

/// One weight per analysis criterion.
///
/// The field set matches [`crate::metrics::SubScores`] one-to-one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QualityWeights {
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

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            overlap: 15.0,
            spacing: 10.0,
            hierarchy: 15.0,
            sizing: 4.0,
            crossings: 10.0,
            edges_over_nodes: 8.0,
            edge_length: 5.0,
            bends: 3.0,
            direction: 8.0,
            utilization: 5.0,
            density: 4.0,
            consistency: 3.0,
            aspect: 3.0,
            labels: 8.0,
            congestion: 3.0,
            crossing_angle: 2.0,
            alignment: 3.0,
            detour: 2.0,
        }
    }
}

impl QualityWeights {
    /// The weight table for a diagram level, or the default table when no
    /// level is known.
    pub fn for_level(level: Option<DiagramLevel>) -> Self {
        match level {
            // Context views: flow direction and crossing-free routing
            // dominate readability
            Some(DiagramLevel::L1) => Self {
                direction: 14.0,
                crossings: 14.0,
                ..Self::default()
            },
            // Container views: containment integrity and clean routing
            // around boxes matter most
            Some(DiagramLevel::L2) => Self {
                hierarchy: 20.0,
                edges_over_nodes: 12.0,
                ..Self::default()
            },
            // Component views: dense label-heavy diagrams
            Some(DiagramLevel::L3) => Self {
                spacing: 12.0,
                labels: 11.0,
                ..Self::default()
            },
            Some(DiagramLevel::L0) | None => Self::default(),
        }
    }

    /// Sum of all weights; used by the scoring engine for normalization
    pub fn total(&self) -> f32 {
        self.overlap
            + self.spacing
            + self.hierarchy
            + self.sizing
            + self.crossings
            + self.edges_over_nodes
            + self.edge_length
            + self.bends
            + self.direction
            + self.utilization
            + self.density
            + self.consistency
            + self.aspect
            + self.labels
            + self.congestion
            + self.crossing_angle
            + self.alignment
            + self.detour
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_are_non_negative() {
        let weights = QualityWeights::default();
        assert!(weights.total() > 0.0);
        assert!(weights.overlap >= 0.0);
        assert!(weights.detour >= 0.0);
    }

    #[test]
    fn test_level_tables_shift_emphasis() {
        let base = QualityWeights::default();
        let l1 = QualityWeights::for_level(Some(DiagramLevel::L1));
        assert!(l1.direction > base.direction);
        assert!(l1.crossings > base.crossings);

        let l2 = QualityWeights::for_level(Some(DiagramLevel::L2));
        assert!(l2.hierarchy > base.hierarchy);
        assert!(l2.edges_over_nodes > base.edges_over_nodes);

        assert_eq!(QualityWeights::for_level(None), base);
        assert_eq!(QualityWeights::for_level(Some(DiagramLevel::L0)), base);
    }
}
