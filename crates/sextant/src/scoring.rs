//! Weighted scoring: aggregation, critical caps, grades, and the node
//! badness map.
//!
//! Scoring is lexicographically violation-first: the weighted sum only
//! decides the score of diagrams whose critical checks pass. Any
//! containment or overlap violation caps the final score below the
//! passing grades no matter how well every other criterion does.

use indexmap::IndexMap;
use log::debug;

use sextant_core::metrics::{DiagramQualityMetrics, Grade, SubScores};
use sextant_core::weights::QualityWeights;

/// Containment caps: one violation forces the score to 60 or below, two or
/// more force 40 or below, and each violation past the second subtracts a
/// further 25 points.
const CONTAINMENT_CAP_ONE: f32 = 60.0;
const CONTAINMENT_CAP_MANY: f32 = 40.0;
const CONTAINMENT_EXTRA_PENALTY: f32 = 25.0;

/// Gentler cap for the remaining critical violations (overlaps and label
/// issues): at most 85, losing 5 points per violation, never below 60 from
/// this cap alone.
const OTHER_CAP_BASE: f32 = 85.0;
const OTHER_CAP_PENALTY: f32 = 5.0;
const OTHER_CAP_FLOOR: f32 = 60.0;

/// Normalized weighted sum of the sub-scores.
///
/// Weights need not sum to 1; the result divides by the total of the
/// weights actually used. An all-zero weight vector yields the unweighted
/// mean rather than NaN.
pub fn weighted_sum(scores: &SubScores, weights: &QualityWeights) -> f32 {
    let pairs = [
        (scores.overlap, weights.overlap),
        (scores.spacing, weights.spacing),
        (scores.hierarchy, weights.hierarchy),
        (scores.sizing, weights.sizing),
        (scores.crossings, weights.crossings),
        (scores.edges_over_nodes, weights.edges_over_nodes),
        (scores.edge_length, weights.edge_length),
        (scores.bends, weights.bends),
        (scores.direction, weights.direction),
        (scores.utilization, weights.utilization),
        (scores.density, weights.density),
        (scores.consistency, weights.consistency),
        (scores.aspect, weights.aspect),
        (scores.labels, weights.labels),
        (scores.congestion, weights.congestion),
        (scores.crossing_angle, weights.crossing_angle),
        (scores.alignment, weights.alignment),
        (scores.detour, weights.detour),
    ];

    let total_weight: f32 = pairs.iter().map(|(_, w)| w).sum();
    if total_weight <= 0.0 {
        return pairs.iter().map(|(s, _)| s).sum::<f32>() / pairs.len() as f32;
    }
    pairs.iter().map(|(s, w)| s * w).sum::<f32>() / total_weight
}

/// Fixed unweighted blend of the eight primary criteria, kept alongside
/// the weighted score for comparison across weight-table changes.
fn overall_blend(scores: &SubScores) -> f32 {
    (scores.overlap
        + scores.spacing
        + scores.hierarchy
        + scores.crossings
        + scores.edge_length
        + scores.direction
        + scores.utilization
        + scores.density)
        / 8.0
}

/// Applies the critical-violation caps to a raw weighted score.
fn apply_caps(raw: f32, metrics: &DiagramQualityMetrics) -> f32 {
    let mut score = raw;

    let containment = metrics.parent_child_containment.len();
    if containment > 0 {
        let cap = if containment == 1 {
            CONTAINMENT_CAP_ONE
        } else {
            CONTAINMENT_CAP_MANY
        };
        score = score.min(cap);
        if containment > 2 {
            score -= CONTAINMENT_EXTRA_PENALTY * (containment - 2) as f32;
        }
    }

    let other = metrics.overlapping_nodes.len() + metrics.label_issue_count();
    if other > 0 {
        let cap = (OTHER_CAP_BASE - OTHER_CAP_PENALTY * other as f32).max(OTHER_CAP_FLOOR);
        score = score.min(cap);
    }

    score.clamp(0.0, 100.0)
}

/// Per-node 0–1 severity: the worst any single violation attributes to
/// the node.
fn node_badness(metrics: &DiagramQualityMetrics) -> IndexMap<String, f32> {
    let mut badness: IndexMap<String, f32> = IndexMap::new();
    let mut raise = |id: &str, severity: f32| {
        let entry = badness.entry(id.to_owned()).or_insert(0.0);
        if severity > *entry {
            *entry = severity;
        }
    };

    for overlap in &metrics.overlapping_nodes {
        raise(&overlap.node_a, 1.0);
        raise(&overlap.node_b, 1.0);
    }
    for containment in &metrics.parent_child_containment {
        raise(&containment.child, 1.0);
        raise(&containment.parent, 0.5);
    }
    for spacing in &metrics.spacing_violations {
        let severity = if spacing.required > 0.0 {
            ((spacing.required - spacing.distance) / spacing.required).clamp(0.0, 1.0)
        } else {
            0.0
        };
        raise(&spacing.node_a, severity);
        raise(&spacing.node_b, severity);
    }

    badness
}

/// Fills the aggregate fields of a metrics record whose violation lists
/// and sub-scores are already populated.
pub(crate) fn finalize(metrics: &mut DiagramQualityMetrics, weights: &QualityWeights) {
    let raw = weighted_sum(&metrics.scores, weights);
    metrics.weighted_score = apply_caps(raw, metrics);
    metrics.overall_score = overall_blend(&metrics.scores).clamp(0.0, 100.0);
    metrics.grade = Grade::from_score(metrics.weighted_score);
    metrics.node_badness = node_badness(metrics);

    debug!(
        raw,
        weighted = metrics.weighted_score,
        grade:? = metrics.grade;
        "Scores aggregated"
    );
}

/// A smoother objective for external search/optimization loops.
///
/// Starts from the weighted score and applies additive penalties and small
/// in-band bonuses instead of hard caps, giving iterative optimizers a
/// gradient to follow where `weighted_score` is flat. May go negative.
pub fn composite_objective(metrics: &DiagramQualityMetrics) -> f32 {
    let mut objective = metrics.weighted_score;

    objective -= 15.0 * metrics.parent_child_containment.len() as f32;
    objective -= 10.0 * metrics.overlapping_nodes.len() as f32;
    objective -= 5.0 * metrics.edge_crossings.saturating_sub(3) as f32;
    objective -= 4.0 * metrics.edges_over_nodes.saturating_sub(2) as f32;
    objective -= 6.0 * metrics.label_issue_count() as f32;

    if (0.70..=0.90).contains(&metrics.viewport_utilization) {
        objective += 3.0;
    }
    if metrics.direction_violations.is_empty() {
        objective += 3.0;
    }
    if metrics.spacing_violations.is_empty() {
        objective += 3.0;
    }

    objective
}

#[cfg(test)]
mod tests {
    use super::*;
    use sextant_core::metrics::{ContainmentKind, ContainmentViolation, OverlapViolation, Overflow};

    fn perfect_metrics() -> DiagramQualityMetrics {
        DiagramQualityMetrics {
            scores: SubScores::default(),
            ..DiagramQualityMetrics::default()
        }
    }

    fn containment_violation(child: &str) -> ContainmentViolation {
        ContainmentViolation {
            child: child.to_owned(),
            parent: "parent".to_owned(),
            violation: ContainmentKind::Outside,
            details: Overflow {
                right: 50.0,
                ..Overflow::default()
            },
        }
    }

    #[test]
    fn test_perfect_scores_weight_to_100() {
        let metrics = perfect_metrics();
        let raw = weighted_sum(&metrics.scores, &QualityWeights::default());
        assert!((raw - 100.0).abs() < 0.001);
    }

    #[test]
    fn test_zero_weights_fall_back_to_mean() {
        let scores = SubScores::default();
        let weights = QualityWeights {
            overlap: 0.0,
            spacing: 0.0,
            hierarchy: 0.0,
            sizing: 0.0,
            crossings: 0.0,
            edges_over_nodes: 0.0,
            edge_length: 0.0,
            bends: 0.0,
            direction: 0.0,
            utilization: 0.0,
            density: 0.0,
            consistency: 0.0,
            aspect: 0.0,
            labels: 0.0,
            congestion: 0.0,
            crossing_angle: 0.0,
            alignment: 0.0,
            detour: 0.0,
        };
        assert!((weighted_sum(&scores, &weights) - 100.0).abs() < 0.001);
    }

    #[test]
    fn test_one_containment_violation_caps_at_60() {
        let mut metrics = perfect_metrics();
        metrics.parent_child_containment.push(containment_violation("child"));
        finalize(&mut metrics, &QualityWeights::default());
        assert!(metrics.weighted_score <= 60.0);
        assert!(matches!(metrics.grade, Grade::D | Grade::F));
    }

    #[test]
    fn test_two_containment_violations_cap_at_40() {
        let mut metrics = perfect_metrics();
        metrics.parent_child_containment.push(containment_violation("a"));
        metrics.parent_child_containment.push(containment_violation("b"));
        finalize(&mut metrics, &QualityWeights::default());
        assert!(metrics.weighted_score <= 40.0);
        assert_eq!(metrics.grade, Grade::F);
    }

    #[test]
    fn test_many_containment_violations_keep_subtracting() {
        let mut metrics = perfect_metrics();
        for id in ["a", "b", "c", "d"] {
            metrics.parent_child_containment.push(containment_violation(id));
        }
        finalize(&mut metrics, &QualityWeights::default());
        // 40 cap minus 25 for each of the two beyond the second
        assert!(metrics.weighted_score <= 0.0 + f32::EPSILON);
    }

    #[test]
    fn test_overlap_caps_gently() {
        let mut metrics = perfect_metrics();
        metrics.overlapping_nodes.push(OverlapViolation {
            node_a: "a".to_owned(),
            node_b: "b".to_owned(),
            overlap_area: 100.0,
            overlap_percentage: 10.0,
        });
        finalize(&mut metrics, &QualityWeights::default());
        assert!(metrics.weighted_score <= 80.0);
        assert!(metrics.weighted_score >= 60.0);
    }

    #[test]
    fn test_clean_metrics_are_uncapped() {
        let mut metrics = perfect_metrics();
        finalize(&mut metrics, &QualityWeights::default());
        assert!((metrics.weighted_score - 100.0).abs() < 0.001);
        assert_eq!(metrics.grade, Grade::A);
        assert!(metrics.node_badness.is_empty());
    }

    #[test]
    fn test_node_badness_severities() {
        use sextant_core::metrics::SpacingViolation;
        let mut metrics = perfect_metrics();
        metrics.overlapping_nodes.push(OverlapViolation {
            node_a: "x".to_owned(),
            node_b: "y".to_owned(),
            overlap_area: 100.0,
            overlap_percentage: 50.0,
        });
        metrics.parent_child_containment.push(containment_violation("child"));
        metrics.spacing_violations.push(SpacingViolation {
            node_a: "near1".to_owned(),
            node_b: "near2".to_owned(),
            distance: 15.0,
            required: 30.0,
        });
        finalize(&mut metrics, &QualityWeights::default());

        assert_eq!(metrics.node_badness["x"], 1.0);
        assert_eq!(metrics.node_badness["y"], 1.0);
        assert_eq!(metrics.node_badness["child"], 1.0);
        assert_eq!(metrics.node_badness["parent"], 0.5);
        assert_eq!(metrics.node_badness["near1"], 0.5);
    }

    #[test]
    fn test_composite_objective_rewards_clean_diagrams() {
        let mut clean = perfect_metrics();
        clean.viewport_utilization = 0.8;
        finalize(&mut clean, &QualityWeights::default());

        let mut dirty = perfect_metrics();
        dirty.viewport_utilization = 0.8;
        dirty.parent_child_containment.push(containment_violation("child"));
        dirty.edge_crossings = 10;
        finalize(&mut dirty, &QualityWeights::default());

        assert!(composite_objective(&clean) > composite_objective(&dirty));
    }

    #[test]
    fn test_composite_objective_is_smoother_than_the_cap() {
        // Two diagrams, both capped to the same weighted score, still
        // separate under the composite objective
        let mut one = perfect_metrics();
        for id in ["a", "b", "c"] {
            one.parent_child_containment.push(containment_violation(id));
        }
        finalize(&mut one, &QualityWeights::default());

        let mut two = perfect_metrics();
        for id in ["a", "b", "c", "d", "e"] {
            two.parent_child_containment.push(containment_violation(id));
        }
        finalize(&mut two, &QualityWeights::default());

        assert!(composite_objective(&one) > composite_objective(&two));
    }
}
