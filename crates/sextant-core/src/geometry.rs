//! Geometric primitives for diagram quality analysis.
//!
//! This module provides the fundamental geometric types used throughout
//! Sextant for measuring positioned diagrams, together with the pure
//! predicates the analyzer is built on: rectangle overlap, edge-to-edge
//! distance, and line-segment intersection.
//!
//! # Coordinate System
//!
//! Sextant uses a coordinate system consistent with SVG and browser
//! viewports:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! - **Origin**: Top-left corner at `(0, 0)`
//! - **X-axis**: Increases rightward
//! - **Y-axis**: Increases downward
//!
//! Rectangles are stored as a top-left origin plus a size, matching the
//! node snapshots produced by the rendering layer.
//!
//! # Degenerate Input
//!
//! Every predicate in this module is total: zero-area rectangles,
//! coincident points, and non-finite coordinates produce a "no violation"
//! answer (`0.0`, `false`, or a non-negative distance) instead of NaN or a
//! panic. A partially-broken diagram must still be measurable.

use serde::{Deserialize, Serialize};

/// A 2D point representing a position in diagram coordinate space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Adds another point to this point, returning a new point
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtracts another point from this point, returning a new point
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Calculates the midpoint between this point and another point
    pub fn midpoint(self, other: Point) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    /// Euclidean distance between this point and another point
    pub fn distance_to(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Returns true if both coordinates are finite
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Represents the dimensions of an element with width and height.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f32 {
        self.height
    }

    /// Area covered by this size; zero when either dimension is not positive
    pub fn area(self) -> f32 {
        if self.width > 0.0 && self.height > 0.0 {
            self.width * self.height
        } else {
            0.0
        }
    }

    /// Returns true if both dimensions are zero
    pub fn is_zero(self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }
}

/// An axis-aligned rectangle defined by a top-left origin and a size.
///
/// This is the unit of measurement for node geometry: a node's `position`
/// and `size` map directly onto a `Rect` in whatever coordinate frame the
/// position was expressed in (absolute for root nodes, parent-local for
/// nested ones).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl Rect {
    /// Creates a new rectangle from its top-left corner and dimensions
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle from a position point and a size
    pub fn from_position_size(position: Point, size: Size) -> Self {
        Self {
            x: position.x(),
            y: position.y(),
            width: size.width(),
            height: size.height(),
        }
    }

    /// Returns the x-coordinate of the left edge
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the top edge
    pub fn y(self) -> f32 {
        self.y
    }

    /// Returns the width of the rectangle
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height of the rectangle
    pub fn height(self) -> f32 {
        self.height
    }

    /// Returns the x-coordinate of the left edge
    pub fn min_x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the top edge
    pub fn min_y(self) -> f32 {
        self.y
    }

    /// Returns the x-coordinate of the right edge
    pub fn max_x(self) -> f32 {
        self.x + self.width
    }

    /// Returns the y-coordinate of the bottom edge
    pub fn max_y(self) -> f32 {
        self.y + self.height
    }

    /// Returns the center of the rectangle
    pub fn center(self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }

    /// Returns the size of the rectangle
    pub fn size(self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }

    /// Area of the rectangle; zero when degenerate
    pub fn area(self) -> f32 {
        self.size().area()
    }

    /// Moves the rectangle by the given offset
    pub fn translate(self, offset: Point) -> Self {
        Self {
            x: self.x + offset.x(),
            y: self.y + offset.y(),
            ..self
        }
    }

    /// Grows the rectangle outward by `amount` on every side
    pub fn expand(self, amount: f32) -> Self {
        Self {
            x: self.x - amount,
            y: self.y - amount,
            width: self.width + amount * 2.0,
            height: self.height + amount * 2.0,
        }
    }

    /// Merges two rectangles into the smallest rectangle containing both
    pub fn merge(self, other: Rect) -> Self {
        let min_x = self.min_x().min(other.min_x());
        let min_y = self.min_y().min(other.min_y());
        let max_x = self.max_x().max(other.max_x());
        let max_y = self.max_y().max(other.max_y());
        Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        }
    }

    /// Returns true when the rectangle cannot meaningfully participate in
    /// geometric tests: non-positive dimensions or non-finite coordinates.
    pub fn is_degenerate(self) -> bool {
        !(self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }

    /// Tests whether the given point lies inside the rectangle (inclusive)
    pub fn contains_point(self, point: Point) -> bool {
        if self.is_degenerate() || !point.is_finite() {
            return false;
        }
        point.x() >= self.min_x()
            && point.x() <= self.max_x()
            && point.y() >= self.min_y()
            && point.y() <= self.max_y()
    }

    /// Tests whether another rectangle lies entirely within this one (inclusive)
    pub fn contains_rect(self, other: Rect) -> bool {
        if self.is_degenerate() || other.is_degenerate() {
            return false;
        }
        other.min_x() >= self.min_x()
            && other.min_y() >= self.min_y()
            && other.max_x() <= self.max_x()
            && other.max_y() <= self.max_y()
    }

    /// The four boundary segments of the rectangle, clockwise from the top edge
    pub fn boundary_segments(self) -> [(Point, Point); 4] {
        let tl = Point::new(self.min_x(), self.min_y());
        let tr = Point::new(self.max_x(), self.min_y());
        let br = Point::new(self.max_x(), self.max_y());
        let bl = Point::new(self.min_x(), self.max_y());
        [(tl, tr), (tr, br), (br, bl), (bl, tl)]
    }
}

/// Returns the overlap area of two axis-aligned rectangles in a shared
/// coordinate frame, or `0.0` if they are disjoint or either is degenerate.
pub fn overlap_area(a: Rect, b: Rect) -> f32 {
    if a.is_degenerate() || b.is_degenerate() {
        return 0.0;
    }

    let overlap_width = a.max_x().min(b.max_x()) - a.min_x().max(b.min_x());
    let overlap_height = a.max_y().min(b.max_y()) - a.min_y().max(b.min_y());

    if overlap_width > 0.0 && overlap_height > 0.0 {
        overlap_width * overlap_height
    } else {
        0.0
    }
}

/// Edge-to-edge distance between two rectangles.
///
/// Computed from center-to-center distance minus half-extents along each
/// axis. Positive values are the actual gap between the nearest edges;
/// negative values indicate overlap (the magnitude is the smaller
/// penetration depth). Degenerate input yields `f32::INFINITY`, which no
/// minimum-spacing threshold can flag.
pub fn edge_to_edge_distance(a: Rect, b: Rect) -> f32 {
    if a.is_degenerate() || b.is_degenerate() {
        return f32::INFINITY;
    }

    let gap_x = (a.center().x() - b.center().x()).abs() - (a.width() + b.width()) / 2.0;
    let gap_y = (a.center().y() - b.center().y()).abs() - (a.height() + b.height()) / 2.0;

    if gap_x > 0.0 && gap_y > 0.0 {
        // Diagonal separation: nearest corners
        gap_x.hypot(gap_y)
    } else if gap_x > 0.0 {
        gap_x
    } else if gap_y > 0.0 {
        gap_y
    } else {
        // Overlapping on both axes; report the shallower penetration
        gap_x.max(gap_y)
    }
}

/// Cross product of vectors `(b - a)` and `(c - a)`.
///
/// Sign gives the orientation of `c` relative to the directed line `a → b`.
fn cross(a: Point, b: Point, c: Point) -> f32 {
    (b.x() - a.x()) * (c.y() - a.y()) - (b.y() - a.y()) * (c.x() - a.x())
}

/// Strict ("proper") intersection test for two line segments.
///
/// Returns `true` only when segment `p1→p2` and segment `p3→p4` cross at a
/// single interior point. Shared endpoints, collinear overlap, and merely
/// touching configurations do **not** count as a crossing, matching the
/// edge-crossing definition: two connectors that meet at a node are not
/// crossing each other.
pub fn segments_properly_intersect(p1: Point, p2: Point, p3: Point, p4: Point) -> bool {
    if !(p1.is_finite() && p2.is_finite() && p3.is_finite() && p4.is_finite()) {
        return false;
    }

    let d1 = cross(p3, p4, p1);
    let d2 = cross(p3, p4, p2);
    let d3 = cross(p1, p2, p3);
    let d4 = cross(p1, p2, p4);

    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}

/// Tests whether the segment `p1→p2` passes through the given rectangle.
///
/// The rectangle is treated as its four boundary segments plus interior
/// containment of either endpoint, so segments fully inside the rectangle
/// are detected as well as segments that pierce a wall.
pub fn segment_intersects_rect(p1: Point, p2: Point, rect: Rect) -> bool {
    if rect.is_degenerate() || !p1.is_finite() || !p2.is_finite() {
        return false;
    }

    if rect.contains_point(p1) || rect.contains_point(p2) {
        return true;
    }

    rect.boundary_segments()
        .iter()
        .any(|&(a, b)| segments_properly_intersect(p1, p2, a, b))
}

/// Acute angle, in degrees, between two crossing segments.
///
/// Returns a value in `[0, 90]`. Degenerate segments yield `90.0` (a right
/// angle), which no shallow-crossing threshold will flag.
pub fn crossing_angle_degrees(p1: Point, p2: Point, p3: Point, p4: Point) -> f32 {
    let v1 = p2.sub_point(p1);
    let v2 = p4.sub_point(p3);

    let len1 = v1.x().hypot(v1.y());
    let len2 = v2.x().hypot(v2.y());
    if len1 <= f32::EPSILON || len2 <= f32::EPSILON || !len1.is_finite() || !len2.is_finite() {
        return 90.0;
    }

    let cos = ((v1.x() * v2.x() + v1.y() * v2.y()) / (len1 * len2)).clamp(-1.0, 1.0);
    let angle = cos.acos().to_degrees();
    // Fold obtuse angles: crossing sharpness is symmetric
    if angle > 90.0 { 180.0 - angle } else { angle }
}

/// Total length of a polyline; `0.0` for fewer than two points
pub fn polyline_length(points: &[Point]) -> f32 {
    points
        .windows(2)
        .map(|pair| pair[0].distance_to(pair[1]))
        .sum()
}
