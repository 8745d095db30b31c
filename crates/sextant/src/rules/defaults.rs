//! The built-in layout rule set.
//!
//! Rules are evaluated in descending priority order; the first whose
//! condition matches supplies the base [`LayoutConfig`]. The spacing
//! constants are tuned values preserved for behavioral compatibility; the
//! catch-all rule at the bottom always matches, so selection never comes
//! up empty.

use crate::rules::context::Complexity;
use crate::rules::{Direction, EdgeRouting, LayoutConfig, LayoutRule};

use sextant_core::model::DiagramLevel;

/// Spacing for small flat diagrams: generous because there is room to
/// spare
pub const SIMPLE_NODE_SPACING: f32 = 150.0;
pub const SIMPLE_RANK_SPACING: f32 = 120.0;

/// Hierarchical diagrams need width for containment padding
pub const HIERARCHICAL_NODE_SPACING: f32 = 250.0;
pub const HIERARCHICAL_RANK_SPACING: f32 = 200.0;

/// Expanded nodes show their internals and need even more room
pub const EXPANDED_NODE_SPACING: f32 = 280.0;
pub const EXPANDED_RANK_SPACING: f32 = 320.0;

pub const LEVEL1_NODE_SPACING: f32 = 200.0;
pub const LEVEL1_RANK_SPACING: f32 = 160.0;
pub const LEVEL1_DENSE_NODE_SPACING: f32 = 220.0;
pub const LEVEL1_DENSE_RANK_SPACING: f32 = 180.0;
pub const LEVEL2_NODE_SPACING: f32 = 180.0;
pub const LEVEL2_RANK_SPACING: f32 = 140.0;
pub const LEVEL3_NODE_SPACING: f32 = 160.0;
pub const LEVEL3_RANK_SPACING: f32 = 120.0;

pub const COMPLEX_NODE_SPACING: f32 = 260.0;
pub const COMPLEX_RANK_SPACING: f32 = 220.0;
pub const DENSE_NODE_SPACING: f32 = 300.0;
pub const DENSE_RANK_SPACING: f32 = 240.0;

/// Edge count past which a diagram counts as complex regardless of nodes
pub const COMPLEX_EDGE_THRESHOLD: usize = 30;
/// Edges-per-node ratio past which explicit orthogonal routing pays off
pub const DENSE_RATIO_THRESHOLD: f32 = 2.0;
/// L1 diagrams with more edges than this take the denser variant
pub const LEVEL1_DENSE_EDGE_THRESHOLD: usize = 15;
/// Average node aspect ratio past which direction is forced
pub const NODE_ASPECT_THRESHOLD: f32 = 2.5;

/// The built-in rule set, in no particular order; selection sorts by
/// priority.
pub fn default_rules() -> Vec<LayoutRule> {
    vec![
        LayoutRule::new(
            "simple-flat",
            "Small flat diagram",
            100,
            |ctx| ctx.complexity == Complexity::Simple && !ctx.has_hierarchy,
            |_ctx| LayoutConfig::with_spacing(SIMPLE_NODE_SPACING, SIMPLE_RANK_SPACING),
        ),
        LayoutRule::new(
            "expanded-hierarchical",
            "Hierarchy with expanded internals",
            96,
            |ctx| ctx.has_hierarchy && ctx.has_expanded_nodes,
            |_ctx| LayoutConfig::with_spacing(EXPANDED_NODE_SPACING, EXPANDED_RANK_SPACING),
        ),
        LayoutRule::new(
            "hierarchical",
            "Nested containers present",
            95,
            |ctx| ctx.has_hierarchy,
            |_ctx| LayoutConfig::with_spacing(HIERARCHICAL_NODE_SPACING, HIERARCHICAL_RANK_SPACING),
        ),
        LayoutRule::new(
            "level-1-dense",
            "Context view with many relationships",
            86,
            |ctx| {
                ctx.level == Some(DiagramLevel::L1) && ctx.edge_count > LEVEL1_DENSE_EDGE_THRESHOLD
            },
            |_ctx| LayoutConfig::with_spacing(LEVEL1_DENSE_NODE_SPACING, LEVEL1_DENSE_RANK_SPACING),
        ),
        LayoutRule::new(
            "level-1",
            "Context view",
            85,
            |ctx| ctx.level == Some(DiagramLevel::L1),
            |_ctx| LayoutConfig::with_spacing(LEVEL1_NODE_SPACING, LEVEL1_RANK_SPACING),
        ),
        LayoutRule::new(
            "level-2",
            "Container view",
            75,
            |ctx| ctx.level == Some(DiagramLevel::L2),
            |_ctx| LayoutConfig::with_spacing(LEVEL2_NODE_SPACING, LEVEL2_RANK_SPACING),
        ),
        LayoutRule::new(
            "level-3",
            "Component view",
            70,
            |ctx| ctx.level == Some(DiagramLevel::L3),
            |_ctx| LayoutConfig::with_spacing(LEVEL3_NODE_SPACING, LEVEL3_RANK_SPACING),
        ),
        LayoutRule::new(
            "complex",
            "Many edges",
            60,
            |ctx| ctx.edge_count > COMPLEX_EDGE_THRESHOLD,
            |_ctx| LayoutConfig::with_spacing(COMPLEX_NODE_SPACING, COMPLEX_RANK_SPACING),
        ),
        LayoutRule::new(
            "high-density",
            "High relationship density",
            58,
            |ctx| ctx.relationship_density > DENSE_RATIO_THRESHOLD,
            |_ctx| {
                let mut config = LayoutConfig::with_spacing(DENSE_NODE_SPACING, DENSE_RANK_SPACING);
                config.options.edge_routing = EdgeRouting::Orthogonal;
                config
            },
        ),
        LayoutRule::new(
            "bidirectional",
            "Bidirectional edge pairs",
            55,
            |ctx| ctx.has_bidirectional,
            |_ctx| {
                let mut config =
                    LayoutConfig::with_spacing(LEVEL1_NODE_SPACING, LEVEL1_RANK_SPACING);
                config.direction = Direction::Right;
                config
            },
        ),
        LayoutRule::new(
            "wide-nodes",
            "Wide average node shape",
            50,
            |ctx| {
                ctx.average_node_size.height() > 0.0
                    && ctx.average_node_size.width() / ctx.average_node_size.height()
                        > NODE_ASPECT_THRESHOLD
            },
            |_ctx| {
                // Wide boxes stack best vertically
                let mut config =
                    LayoutConfig::with_spacing(SIMPLE_NODE_SPACING, SIMPLE_RANK_SPACING);
                config.direction = Direction::Down;
                config
            },
        ),
        LayoutRule::new(
            "tall-nodes",
            "Tall average node shape",
            45,
            |ctx| {
                ctx.average_node_size.width() > 0.0
                    && ctx.average_node_size.height() / ctx.average_node_size.width()
                        > NODE_ASPECT_THRESHOLD
            },
            |_ctx| {
                let mut config =
                    LayoutConfig::with_spacing(SIMPLE_NODE_SPACING, SIMPLE_RANK_SPACING);
                config.direction = Direction::Right;
                config
            },
        ),
        LayoutRule::new(
            "default",
            "Fallback",
            10,
            |_ctx| true,
            |_ctx| LayoutConfig::with_spacing(SIMPLE_NODE_SPACING, SIMPLE_RANK_SPACING),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rule_always_matches() {
        let rules = default_rules();
        let fallback = rules.iter().find(|rule| rule.id() == "default").unwrap();
        let context = crate::rules::context::LayoutContext::derive(&[], &[], None, None, None, &[]);
        assert!(fallback.matches(&context));
    }

    #[test]
    fn test_rule_ids_are_unique() {
        let rules = default_rules();
        let mut ids: Vec<_> = rules.iter().map(|rule| rule.id().to_owned()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), rules.len());
    }
}
