//! Edge-path analyses: crossings, routing over nodes, bends, lengths, and
//! flow direction.
//!
//! An edge's tested path is its routed polyline when the snapshot carries
//! one, otherwise the straight segment between its endpoints' centers.
//! Crossing tests require both edges of a pair to be routed before
//! polylines are used; a routed/unrouted pair falls back to straight
//! segments so the comparison stays symmetric.

use log::trace;

use sextant_core::geometry::{
    Point, crossing_angle_degrees, segment_intersects_rect, segments_properly_intersect,
};
use sextant_core::metrics::{DirectionViolation, EdgeLengthStats};
use sextant_core::model::{DiagramEdge, Hierarchy};

use crate::config::AnalysisConfig;

#[derive(Debug)]
pub(crate) struct EdgeReport {
    pub crossings: usize,
    pub shallow_crossings: usize,
    pub edges_over_nodes: usize,
    pub bends: usize,
    pub lengths: EdgeLengthStats,
    pub direction: Vec<DirectionViolation>,
    pub crossing_score: f32,
    pub crossing_angle_score: f32,
    pub edge_node_score: f32,
    pub bend_score: f32,
    pub edge_length_score: f32,
    pub direction_score: f32,
}

/// The straight center-to-center segment for an edge, when both endpoints
/// resolve.
fn straight_segment(edge: &DiagramEdge, hierarchy: &Hierarchy<'_>) -> Option<(Point, Point)> {
    let source = hierarchy.absolute_rect(&edge.source)?;
    let target = hierarchy.absolute_rect(&edge.target)?;
    Some((source.center(), target.center()))
}

/// The routed polyline when present and usable, else the straight segment.
fn edge_path(edge: &DiagramEdge, hierarchy: &Hierarchy<'_>) -> Option<Vec<Point>> {
    if let Some(points) = edge.points.as_ref() {
        if points.len() >= 2 {
            return Some(points.clone());
        }
    }
    straight_segment(edge, hierarchy).map(|(a, b)| vec![a, b])
}

fn is_routed(edge: &DiagramEdge) -> bool {
    edge.points.as_ref().is_some_and(|points| points.len() >= 2)
}

fn share_endpoint(a: &DiagramEdge, b: &DiagramEdge) -> bool {
    a.source == b.source || a.source == b.target || a.target == b.source || a.target == b.target
}

pub(crate) fn analyze_edges(
    edges: &[DiagramEdge],
    hierarchy: &Hierarchy<'_>,
    config: &AnalysisConfig,
) -> EdgeReport {
    let (crossings, shallow_crossings) = count_crossings(edges, hierarchy, config);
    let edges_over_nodes = count_edges_over_nodes(edges, hierarchy);
    let (bends, routed_edges) = count_bends(edges);
    let (lengths, outliers) = length_stats(edges, hierarchy, config);
    let direction = direction_violations(edges, hierarchy, config);

    let edge_count = edges.len();

    // The per-crossing penalty shrinks as edge count grows: a crossing in a
    // five-edge diagram is nearly unforgivable, while a dense diagram
    // cannot avoid a few.
    let crossing_score = if edge_count == 0 {
        100.0
    } else {
        let per_crossing = config.crossing_penalty / (1.0 + edge_count as f32 / config.crossing_damping);
        let flood = if crossings > config.crossing_flood_limit {
            config.crossing_flood_penalty
        } else {
            0.0
        };
        (100.0 - per_crossing * crossings as f32 - flood).clamp(0.0, 100.0)
    };

    let crossing_angle_score = (100.0 - 10.0 * shallow_crossings as f32).clamp(0.0, 100.0);

    let edge_node_score = (100.0 - 10.0 * edges_over_nodes as f32).clamp(0.0, 100.0);

    // One bend per routed edge is free; orthogonal routing needs it
    let allowed_bends = routed_edges;
    let bend_score = if bends > allowed_bends {
        (100.0 - 4.0 * (bends - allowed_bends) as f32).clamp(0.0, 100.0)
    } else {
        100.0
    };

    let edge_length_score = if edge_count == 0 {
        100.0
    } else {
        let mut score = 100.0;
        if lengths.average < config.edge_length_min {
            score -= (config.edge_length_min - lengths.average) * 0.3;
        } else if lengths.average > config.edge_length_max {
            score -= (lengths.average - config.edge_length_max) * 0.1;
        }
        score -= 10.0 * outliers as f32;
        score.clamp(0.0, 100.0)
    };

    // Half the edges flowing upward zeroes the score
    let eligible = direction_eligible_count(edges, hierarchy);
    let direction_score = if eligible == 0 {
        100.0
    } else {
        let ratio = direction.len() as f32 / eligible as f32;
        (100.0 * (1.0 - ratio / 0.5)).clamp(0.0, 100.0)
    };

    EdgeReport {
        crossings,
        shallow_crossings,
        edges_over_nodes,
        bends,
        lengths,
        direction,
        crossing_score,
        crossing_angle_score,
        edge_node_score,
        bend_score,
        edge_length_score,
        direction_score,
    }
}

fn count_crossings(
    edges: &[DiagramEdge],
    hierarchy: &Hierarchy<'_>,
    config: &AnalysisConfig,
) -> (usize, usize) {
    let mut crossings = 0usize;
    let mut shallow = 0usize;

    for i in 0..edges.len() {
        for j in (i + 1)..edges.len() {
            let a = &edges[i];
            let b = &edges[j];
            if share_endpoint(a, b) {
                continue;
            }

            // Polylines only when both edges are routed
            let (path_a, path_b) = if is_routed(a) && is_routed(b) {
                (edge_path(a, hierarchy), edge_path(b, hierarchy))
            } else {
                (
                    straight_segment(a, hierarchy).map(|(p, q)| vec![p, q]),
                    straight_segment(b, hierarchy).map(|(p, q)| vec![p, q]),
                )
            };
            let (Some(path_a), Some(path_b)) = (path_a, path_b) else {
                continue;
            };

            let mut pair_crossed = false;
            let mut pair_shallow = false;
            'segments: for seg_a in path_a.windows(2) {
                for seg_b in path_b.windows(2) {
                    if segments_properly_intersect(seg_a[0], seg_a[1], seg_b[0], seg_b[1]) {
                        pair_crossed = true;
                        let angle =
                            crossing_angle_degrees(seg_a[0], seg_a[1], seg_b[0], seg_b[1]);
                        if angle < config.shallow_angle {
                            pair_shallow = true;
                        }
                        break 'segments;
                    }
                }
            }

            if pair_crossed {
                trace!(edge_a = a.id.as_str(), edge_b = b.id.as_str(); "Edge crossing");
                crossings += 1;
                if pair_shallow {
                    shallow += 1;
                }
            }
        }
    }

    (crossings, shallow)
}

fn count_edges_over_nodes(edges: &[DiagramEdge], hierarchy: &Hierarchy<'_>) -> usize {
    let mut count = 0usize;

    for edge in edges {
        let Some(path) = edge_path(edge, hierarchy) else {
            continue;
        };
        for node in hierarchy.nodes() {
            if node.id == edge.source || node.id == edge.target {
                continue;
            }
            // Immediate children of either endpoint sit inside the endpoint
            // box; the edge inevitably passes near them
            if node.parent_id.as_deref() == Some(edge.source.as_str())
                || node.parent_id.as_deref() == Some(edge.target.as_str())
            {
                continue;
            }
            let Some(rect) = hierarchy.absolute_rect(&node.id) else {
                continue;
            };
            if path
                .windows(2)
                .any(|seg| segment_intersects_rect(seg[0], seg[1], rect))
            {
                count += 1;
            }
        }
    }

    count
}

fn count_bends(edges: &[DiagramEdge]) -> (usize, usize) {
    let mut bends = 0usize;
    let mut routed = 0usize;
    for edge in edges {
        if let Some(points) = edge.points.as_ref() {
            if points.len() > 2 {
                bends += points.len() - 2;
            }
        }
        if is_routed(edge) {
            routed += 1;
        }
    }
    (bends, routed)
}

fn length_stats(
    edges: &[DiagramEdge],
    hierarchy: &Hierarchy<'_>,
    config: &AnalysisConfig,
) -> (EdgeLengthStats, usize) {
    let mut min = f32::INFINITY;
    let mut max = 0.0f32;
    let mut sum = 0.0f32;
    let mut measured = 0usize;
    let mut outliers = 0usize;

    for edge in edges {
        let Some((source, target)) = straight_segment(edge, hierarchy) else {
            continue;
        };
        let length = source.distance_to(target);
        min = min.min(length);
        max = max.max(length);
        sum += length;
        measured += 1;
        if length > config.edge_outlier_long || (length > 0.0 && length < config.edge_outlier_short)
        {
            outliers += 1;
        }
    }

    if measured == 0 {
        return (EdgeLengthStats::default(), 0);
    }
    (
        EdgeLengthStats {
            min,
            max,
            average: sum / measured as f32,
        },
        outliers,
    )
}

/// Self-loops and parent/child edges are exempt from the top-down flow
/// convention.
fn direction_exempt(edge: &DiagramEdge, hierarchy: &Hierarchy<'_>) -> bool {
    edge.source == edge.target || hierarchy.are_related(&edge.source, &edge.target)
}

fn direction_eligible_count(edges: &[DiagramEdge], hierarchy: &Hierarchy<'_>) -> usize {
    edges
        .iter()
        .filter(|edge| {
            !direction_exempt(edge, hierarchy) && straight_segment(edge, hierarchy).is_some()
        })
        .count()
}

fn direction_violations(
    edges: &[DiagramEdge],
    hierarchy: &Hierarchy<'_>,
    config: &AnalysisConfig,
) -> Vec<DirectionViolation> {
    let mut violations = Vec::new();
    for edge in edges {
        if direction_exempt(edge, hierarchy) {
            continue;
        }
        let Some((source, target)) = straight_segment(edge, hierarchy) else {
            continue;
        };
        let upward = source.y() - target.y();
        if upward > config.direction_threshold {
            violations.push(DirectionViolation {
                edge_id: edge.id.clone(),
                source: edge.source.clone(),
                target: edge.target.clone(),
                upward_by: upward - config.direction_threshold,
            });
        }
    }
    violations
}
