use super::{cross, heading_of, Point2d, Vector2d};
use cgmath::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tolerance used when testing whether a point lies on a line segment.
const ON_LINE_TOLERANCE: f64 = 1e-6;

/// A straight line segment between two points.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LineSegment2d {
    pub start: Point2d,
    pub end: Point2d,
}

impl LineSegment2d {
    /// Creates a line segment from its two end points.
    pub const fn from_ends(start: Point2d, end: Point2d) -> Self {
        Self { start, end }
    }

    /// The vector from the start to the end of the line segment.
    pub fn vector(&self) -> Vector2d {
        self.end - self.start
    }

    /// The length of the line segment.
    pub fn length(&self) -> f64 {
        self.vector().magnitude()
    }

    /// A unit vector pointing from the start to the end.
    pub fn direction(&self) -> Vector2d {
        self.vector().normalize()
    }

    /// The heading of the line segment in degrees.
    pub fn heading(&self) -> f64 {
        heading_of(self.vector())
    }

    /// The mid-point of the line segment.
    pub fn midpoint(&self) -> Point2d {
        self.start.midpoint(self.end)
    }

    /// The shortest distance between the line segment and a point.
    pub fn distance_to(&self, point: Point2d) -> f64 {
        let vec = self.vector();
        let len2 = vec.magnitude2();
        if len2 == 0.0 {
            return self.start.distance(point);
        }
        let t = ((point - self.start).dot(vec) / len2).clamp(0.0, 1.0);
        (self.start + t * vec).distance(point)
    }

    /// Checks whether the point lies on the line segment.
    pub fn contains_point(&self, point: Point2d) -> bool {
        self.distance_to(point) <= ON_LINE_TOLERANCE
    }

    /// Checks whether two line segments intersect, including touching end points.
    pub fn intersects(&self, other: &LineSegment2d) -> bool {
        let d1 = orientation(other.start, other.end, self.start);
        let d2 = orientation(other.start, other.end, self.end);
        let d3 = orientation(self.start, self.end, other.start);
        let d4 = orientation(self.start, self.end, other.end);

        if d1 * d2 < 0.0 && d3 * d4 < 0.0 {
            return true;
        }

        // Collinear or touching cases
        (d1 == 0.0 && other.contains_point(self.start))
            || (d2 == 0.0 && other.contains_point(self.end))
            || (d3 == 0.0 && self.contains_point(other.start))
            || (d4 == 0.0 && self.contains_point(other.end))
    }
}

/// Which side of the line `a -> b` the point `p` is on.
/// Positive means to the left, negative to the right.
fn orientation(a: Point2d, b: Point2d, p: Point2d) -> f64 {
    let o = cross(b - a, p - a);
    if o.abs() < ON_LINE_TOLERANCE {
        0.0
    } else {
        o
    }
}
