//! Tunable parameters of a simulation.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters which control how vehicles perceive the network.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimulationParams {
    /// Seconds of travel at the current velocity a vehicle looks ahead,
    /// on top of its own length.
    pub look_ahead_time: f64,
    /// Seconds after starting a lane change before a vehicle may start another.
    /// Zero disables the cooldown.
    pub lane_change_cooldown: f64,
    /// Seed for the random choice of segment at junctions.
    pub seed: u64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            look_ahead_time: 2.0,
            lane_change_cooldown: 0.0,
            seed: 0,
        }
    }
}
