//! Analysis thresholds and tuned constants.
//!
//! Every threshold the analyzer consults lives here with its documented
//! default. The defaults are behavioral-compatibility constants, tuned
//! empirically against real rendered diagrams; callers overriding them
//! should expect scores to shift. All fields deserialize with
//! [`serde::Deserialize`] so a config section can be loaded from an
//! external document, but the normal path is passing a value in-process.

use serde::Deserialize;

/// Tunable thresholds for one analysis pass.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisConfig {
    /// Minimum edge-to-edge distance between unrelated nodes, in units
    pub min_spacing: f32,
    /// Padding a child must keep from every parent edge, in units
    pub containment_padding: f32,
    /// Penalty per spacing violation
    pub spacing_penalty: f32,
    /// Average spacing above this earns a bonus
    pub spacing_bonus_threshold: f32,
    /// Cap on the generous-spacing bonus
    pub spacing_bonus_max: f32,

    /// How far above its source a target may sit before the edge counts as
    /// flowing upward, in units
    pub direction_threshold: f32,

    /// Optimal average edge length band, in units
    pub edge_length_min: f32,
    pub edge_length_max: f32,
    /// Individual edges shorter/longer than these are outliers
    pub edge_outlier_short: f32,
    pub edge_outlier_long: f32,

    /// Base per-crossing penalty before edge-count damping
    pub crossing_penalty: f32,
    /// Edge count at which the per-crossing penalty has halved
    pub crossing_damping: f32,
    /// Crossing count past which a flat extra penalty applies
    pub crossing_flood_limit: usize,
    pub crossing_flood_penalty: f32,

    /// Optimal viewport utilization band, 0–1
    pub utilization_min: f32,
    pub utilization_max: f32,
    /// Optimal empty-space band, 0–1
    pub empty_space_min: f32,
    pub empty_space_max: f32,
    /// Optimal bounding-box aspect ratio band
    pub aspect_min: f32,
    pub aspect_max: f32,

    /// Estimated rendered width per label character, in px
    pub label_char_width: f32,
    /// Estimated rendered label height, in px
    pub label_line_height: f32,
    /// Padding added around node rectangles when testing label overlap
    pub label_clearance: f32,
    /// Interior inset a node label must fit within
    pub node_text_inset: f32,

    /// Congestion grid cell size, in units
    pub congestion_cell: f32,
    /// Edge midpoints per cell before the cell counts as congested
    pub congestion_limit: usize,
    /// Crossings at angles below this many degrees count as shallow
    pub shallow_angle: f32,
    /// Routed-path length over straight-line length ratio tolerated before
    /// an edge counts as a detour
    pub detour_tolerance: f32,
    /// Sibling positions within this distance count as aligned
    pub alignment_tolerance: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_spacing: 30.0,
            containment_padding: 80.0,
            spacing_penalty: 5.0,
            spacing_bonus_threshold: 50.0,
            spacing_bonus_max: 20.0,

            direction_threshold: 10.0,

            edge_length_min: 100.0,
            edge_length_max: 300.0,
            edge_outlier_short: 20.0,
            edge_outlier_long: 2000.0,

            crossing_penalty: 30.0,
            crossing_damping: 10.0,
            crossing_flood_limit: 50,
            crossing_flood_penalty: 20.0,

            utilization_min: 0.70,
            utilization_max: 0.90,
            empty_space_min: 0.20,
            empty_space_max: 0.80,
            aspect_min: 0.5,
            aspect_max: 2.0,

            label_char_width: 7.0,
            label_line_height: 14.0,
            label_clearance: 5.0,
            node_text_inset: 8.0,

            congestion_cell: 100.0,
            congestion_limit: 3,
            shallow_angle: 30.0,
            detour_tolerance: 1.3,
            alignment_tolerance: 10.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documented_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.min_spacing, 30.0);
        assert_eq!(config.containment_padding, 80.0);
        assert_eq!(config.direction_threshold, 10.0);
        assert_eq!(config.label_char_width, 7.0);
        assert_eq!(config.crossing_flood_limit, 50);
    }

    #[test]
    fn test_partial_deserialization_fills_defaults() {
        let config: AnalysisConfig = serde_json::from_str(r#"{ "minSpacing": 40.0 }"#).unwrap();
        assert_eq!(config.min_spacing, 40.0);
        assert_eq!(config.containment_padding, 80.0);
    }
}
