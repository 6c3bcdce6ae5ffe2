use super::Vector2d;

/// Two headings closer than this, in degrees, are considered identical.
pub const HEADING_TOLERANCE: f64 = 1e-6;

/// Rotates a vector 90 degrees anti-clockwise.
pub fn rot90(vec: Vector2d) -> Vector2d {
    Vector2d::new(-vec.y, vec.x)
}

/// Computes the heading of a vector in degrees, in the range `[0, 360)`.
///
/// A heading of 0 points along the positive x-axis and increases
/// towards the positive y-axis.
pub fn heading_of(vec: Vector2d) -> f64 {
    let deg = vec.y.atan2(vec.x).to_degrees();
    if deg < 0.0 {
        deg + 360.0
    } else {
        deg
    }
}

/// Computes the unit vector pointing along the given heading in degrees.
pub fn direction(heading: f64) -> Vector2d {
    let rad = heading.to_radians();
    Vector2d::new(rad.cos(), rad.sin())
}

/// Computes the smallest angle between two headings, in the range `[0, 180]`.
pub fn heading_delta(a: f64, b: f64) -> f64 {
    let delta = (a - b).abs() % 360.0;
    if delta > 180.0 {
        360.0 - delta
    } else {
        delta
    }
}

/// Checks whether two headings are identical, within [HEADING_TOLERANCE].
pub fn same_heading(a: f64, b: f64) -> bool {
    heading_delta(a, b) < HEADING_TOLERANCE
}

/// The 2D cross product of two vectors.
pub fn cross(a: Vector2d, b: Vector2d) -> f64 {
    a.x * b.y - a.y * b.x
}
