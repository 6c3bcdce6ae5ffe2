use super::{cross, direction, rot90, LineSegment2d, Point2d, Vector2d};
use crate::util::Interval;
use cgmath::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A convex quadrilateral, with its corners in counter-clockwise order.
///
/// Used both for the oriented bounding box of a vehicle
/// and for the region a vehicle can see ahead of itself.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Quad {
    pub corners: [Point2d; 4],
}

impl Quad {
    /// Creates a rectangle centred on `centre` and aligned with `heading`.
    ///
    /// # Parameters
    /// * `centre` - The centre of the rectangle
    /// * `heading` - The heading of the rectangle's long axis, in degrees
    /// * `half_len` - Half the extent along the heading
    /// * `half_wid` - Half the extent perpendicular to the heading
    pub fn oriented_rect(centre: Point2d, heading: f64, half_len: f64, half_wid: f64) -> Self {
        let dir = direction(heading);
        Self::from_axis(centre - half_len * dir, centre + half_len * dir, dir, half_wid)
    }

    /// Creates a rectangle which starts at `origin` and extends `distance` along `heading`.
    pub fn ahead(origin: Point2d, heading: f64, half_wid: f64, distance: f64) -> Self {
        let dir = direction(heading);
        Self::from_axis(origin, origin + distance * dir, dir, half_wid)
    }

    fn from_axis(rear: Point2d, front: Point2d, dir: Vector2d, half_wid: f64) -> Self {
        let left = half_wid * rot90(dir);
        Self {
            corners: [rear - left, front - left, front + left, rear + left],
        }
    }

    /// The four edges of the quad.
    pub fn edges(&self) -> [LineSegment2d; 4] {
        let c = self.corners;
        [0, 1, 2, 3].map(|i| LineSegment2d::from_ends(c[i], c[(i + 1) % 4]))
    }

    /// Checks whether the point lies inside the quad or on its boundary.
    pub fn contains_point(&self, point: Point2d) -> bool {
        let sides = self.edges().map(|e| cross(e.vector(), point - e.start));
        sides.iter().all(|s| *s >= -1e-9) || sides.iter().all(|s| *s <= 1e-9)
    }

    /// Checks whether a line segment touches or passes through the quad.
    pub fn intersects_line(&self, line: &LineSegment2d) -> bool {
        self.contains_point(line.start)
            || self.contains_point(line.end)
            || self.edges().iter().any(|edge| edge.intersects(line))
    }

    /// Checks whether two quads overlap, using the separating axis theorem.
    pub fn intersects(&self, other: &Quad) -> bool {
        self.edges()
            .iter()
            .chain(other.edges().iter())
            .filter(|edge| edge.vector().magnitude2() > 0.0)
            .map(|edge| rot90(edge.vector()))
            .all(|axis| self.project(axis).overlaps(&other.project(axis)))
    }

    /// Projects the corners onto an axis.
    fn project(&self, axis: Vector2d) -> Interval {
        let ds = self.corners.map(|c| c.to_vec().dot(axis));
        Interval::new(
            ds.iter().copied().fold(f64::INFINITY, f64::min),
            ds.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        )
    }
}
