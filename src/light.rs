use crate::error::TopologyError;
use crate::math::Point2d;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A traffic light with a fixed green, yellow, red cycle.
///
/// The light holds no mutable state. Its colour is a pure function of the
/// simulation clock, so any number of readers can query it at any time.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StopLight {
    /// The world space position of the stop line.
    location: Point2d,
    /// The duration of each phase in seconds, in cycle order.
    phases: [(LightState, f64); 3],
    /// Shifts the cycle relative to the simulation clock, in seconds.
    offset: f64,
}

/// The state of a traffic light.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LightState {
    Green,
    Yellow,
    Red,
}

impl LightState {
    /// Whether vehicles should stop for a light in this state.
    pub fn is_stop(self) -> bool {
        self != LightState::Green
    }
}

impl StopLight {
    /// Creates a new stop light.
    ///
    /// # Parameters
    /// * `location` - The position of the stop line; must lie on the segment it's added to
    /// * `green` - The duration of the green phase in seconds
    /// * `yellow` - The duration of the yellow phase in seconds
    /// * `red` - The duration of the red phase in seconds
    pub fn new(location: Point2d, green: f64, yellow: f64, red: f64) -> Result<Self, TopologyError> {
        let durations = [green, yellow, red];
        if durations.iter().any(|d| !d.is_finite() || *d < 0.0) || green + yellow + red <= 0.0 {
            return Err(TopologyError::InvalidLightCycle);
        }
        Ok(Self {
            location,
            phases: [
                (LightState::Green, green),
                (LightState::Yellow, yellow),
                (LightState::Red, red),
            ],
            offset: 0.0,
        })
    }

    /// Starts the cycle `offset` seconds in, so lights at a junction can be staggered.
    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    /// The position of the stop line.
    pub fn location(&self) -> Point2d {
        self.location
    }

    /// The total length of one cycle in seconds.
    pub fn cycle_length(&self) -> f64 {
        self.phases.iter().map(|(_, d)| d).sum()
    }

    /// Gets the state of the light at the given simulation time, in seconds.
    pub fn state(&self, time: f64) -> LightState {
        let mut t = (time + self.offset).rem_euclid(self.cycle_length());
        for (state, duration) in self.phases {
            if t < duration {
                return state;
            }
            t -= duration;
        }
        // Only reachable through rounding at the very end of the cycle
        LightState::Red
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn light() -> StopLight {
        StopLight::new(Point2d::new(0.0, 0.0), 10.0, 3.0, 7.0).unwrap()
    }

    #[test]
    fn phases_in_order() {
        let light = light();
        assert_eq!(light.state(0.0), LightState::Green);
        assert_eq!(light.state(9.99), LightState::Green);
        assert_eq!(light.state(10.0), LightState::Yellow);
        assert_eq!(light.state(12.5), LightState::Yellow);
        assert_eq!(light.state(13.0), LightState::Red);
        assert_eq!(light.state(19.9), LightState::Red);
        assert_eq!(light.state(20.0), LightState::Green);
    }

    #[test]
    fn state_is_periodic() {
        let light = light();
        let cycle = light.cycle_length();
        for i in 0..200 {
            let t = 0.137 * i as f64;
            assert_eq!(light.state(t), light.state(t + cycle));
            assert_eq!(light.state(t), light.state(t + 5.0 * cycle));
        }
    }

    #[test]
    fn offset_shifts_cycle() {
        let light = light().with_offset(10.0);
        assert_eq!(light.state(0.0), LightState::Yellow);
        assert_eq!(light.state(3.0), LightState::Red);
    }

    #[test]
    fn rejects_empty_cycle() {
        let origin = Point2d::new(0.0, 0.0);
        assert_eq!(StopLight::new(origin, 0.0, 0.0, 0.0), Err(TopologyError::InvalidLightCycle));
        assert_eq!(StopLight::new(origin, 5.0, -1.0, 5.0), Err(TopologyError::InvalidLightCycle));
        assert!(!LightState::Green.is_stop());
        assert!(LightState::Yellow.is_stop());
        assert!(LightState::Red.is_stop());
    }
}
