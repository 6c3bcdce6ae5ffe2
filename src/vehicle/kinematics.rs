//! The longitudinal speed model of a vehicle.

/// The slowest a braking vehicle will travel, in m/s (1 mph).
/// Braking alone never brings a vehicle to a full stop or reverses it.
pub const MIN_CREEP_VEL: f64 = 0.44704;

/// A velocity within this distance of the desired velocity is snapped to it, in m/s.
pub const SNAP_TOLERANCE: f64 = 0.1;

/// Applies braking for one time step.
///
/// # Parameters
/// * `vel` - The current velocity in m/s
/// * `dec` - The braking rate, a positive number in m/s<sup>2</sup>
/// * `dt` - The time step in seconds
pub fn brake(vel: f64, dec: f64, dt: f64) -> f64 {
    f64::max(vel - dec * dt, MIN_CREEP_VEL)
}

/// Moves a velocity towards the desired velocity for one time step,
/// speeding up or slowing down at the same rate.
///
/// # Parameters
/// * `vel` - The current velocity in m/s
/// * `desired` - The velocity the driver wants to travel at in m/s
/// * `acc` - The rate of change, a positive number in m/s<sup>2</sup>
/// * `dt` - The time step in seconds
pub fn approach(vel: f64, desired: f64, acc: f64, dt: f64) -> f64 {
    if (desired - vel).abs() < SNAP_TOLERANCE {
        desired
    } else if vel < desired {
        f64::min(vel + acc * dt, desired)
    } else {
        f64::max(f64::max(vel - acc * dt, desired), 0.0)
    }
}

/// Maps the change in heading at an upcoming corner, in degrees,
/// to the fraction of the desired velocity that's safe to take it at.
pub fn cornering_factor(heading_delta: f64) -> f64 {
    match heading_delta {
        d if d < 12.0 => 1.0,
        d if d < 25.0 => 0.9,
        d if d < 45.0 => 0.75,
        d if d < 90.0 => 0.5,
        d if d < 135.0 => 0.25,
        _ => 0.175,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn braking_stops_at_creep_speed() {
        assert_approx_eq!(brake(10.0, 14.0, 0.5), 3.0);
        assert_eq!(brake(1.0, 14.0, 0.5), MIN_CREEP_VEL);
        assert_eq!(brake(0.0, 14.0, 0.01), MIN_CREEP_VEL);

        let mut vel = 30.0;
        for _ in 0..1000 {
            vel = brake(vel, 14.0, 0.05);
            assert!(vel >= MIN_CREEP_VEL);
        }
        assert_eq!(vel, MIN_CREEP_VEL);
    }

    #[test]
    fn approach_from_below() {
        let mut vel = 0.0;
        let mut prev = vel;
        for _ in 0..100 {
            vel = approach(vel, 10.0, 3.5, 0.1);
            assert!(vel > prev || vel == 10.0);
            assert!(vel <= 10.0);
            prev = vel;
        }
        assert_eq!(vel, 10.0);
        assert_approx_eq!(approach(0.0, 10.0, 3.5, 1.0), 3.5);
        assert_eq!(approach(9.95, 10.0, 3.5, 0.01), 10.0);
    }

    #[test]
    fn approach_from_above() {
        assert_approx_eq!(approach(20.0, 10.0, 3.5, 1.0), 16.5);
        assert_eq!(approach(10.05, 10.0, 3.5, 1.0), 10.0);
        assert_eq!(approach(11.0, 10.0, 3.5, 1.0), 10.0);
        assert_eq!(approach(1.0, 0.0, 3.5, 1.0), 0.0);
    }

    #[test]
    fn cornering_factor_steps() {
        assert_eq!(cornering_factor(0.0), 1.0);
        assert_eq!(cornering_factor(11.9), 1.0);
        assert_eq!(cornering_factor(12.0), 0.9);
        assert_eq!(cornering_factor(30.0), 0.75);
        assert_eq!(cornering_factor(89.9), 0.5);
        assert_eq!(cornering_factor(90.0), 0.25);
        assert_eq!(cornering_factor(134.9), 0.25);
        assert_eq!(cornering_factor(135.0), 0.175);
        assert_eq!(cornering_factor(180.0), 0.175);
    }
}
