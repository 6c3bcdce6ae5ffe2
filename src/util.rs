//! Miscellaneous utility structs and functions.

/// The number of metres in a mile.
const METRES_PER_MILE: f64 = 1609.344;

/// The number of seconds in an hour.
const SECONDS_PER_HOUR: f64 = 3600.0;

/// A closed range of projections onto an axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    /// Creates a new interval.
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Checks whether the intervals share more than a single end point.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.max > other.min && other.max > self.min
    }
}

/// Converts a speed in miles per hour to metres per second.
pub fn mph_to_mps(mph: f64) -> f64 {
    mph * METRES_PER_MILE / SECONDS_PER_HOUR
}

/// Converts a speed in metres per second to miles per hour.
pub fn mps_to_mph(mps: f64) -> f64 {
    mps / METRES_PER_MILE * SECONDS_PER_HOUR
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn speed_conversions() {
        assert_approx_eq!(mph_to_mps(1.0), 0.44704);
        assert_approx_eq!(mph_to_mps(60.0), 26.8224);
        assert_approx_eq!(mps_to_mph(mph_to_mps(37.0)), 37.0);
    }

    #[test]
    fn interval_overlap_is_strict() {
        let a = Interval::new(0.0, 1.0);
        assert!(a.overlaps(&Interval::new(0.5, 2.0)));
        assert!(!a.overlaps(&Interval::new(1.0, 2.0)));
        assert!(!a.overlaps(&Interval::new(-3.0, -1.0)));
    }
}
