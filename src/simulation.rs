#[cfg(feature = "debug")]
use crate::debug::take_debug_frame;
use crate::debug::debug_line;
use crate::error::TopologyError;
use crate::light::{LightState, StopLight};
use crate::math::{direction, heading_of, Point2d};
use crate::network::RoadNetwork;
use crate::params::SimulationParams;
use crate::segment::{Segment, SegmentAttributes};
use crate::vehicle::kinematics::cornering_factor;
use crate::vehicle::{Vehicle, VehicleAttributes};
use crate::{SegmentId, StopLightId, VehicleId};
use cgmath::prelude::*;
use itertools::iproduct;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal, NormalError};

/// A traffic simulation.
///
/// Owns the road network, the simulation clock and the random number generator,
/// so separate simulations never share any state.
///
/// Vehicles are updated one after another in registry order, in place.
/// A vehicle updated later in a tick sees where earlier vehicles have
/// already moved to during that same tick.
pub struct Simulation {
    /// The road network and the vehicles on it.
    network: RoadNetwork,
    /// The tunable parameters.
    params: SimulationParams,
    /// Chooses between segments at junctions.
    rng: StdRng,
    /// The elapsed simulation time in s.
    clock: f64,
    /// The current frame of simulation.
    frame: usize,
    /// Debugging information from the previously simulated frame.
    #[cfg(feature = "debug")]
    debug: serde_json::Value,
}

/// Something a vehicle has to slow down for.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Hazard {
    /// Another vehicle in the way.
    Vehicle(VehicleId),
    /// A stop light showing yellow or red.
    StopLight(StopLightId),
    /// A change of heading at the end of the current segment.
    Corner {
        /// The fraction of the desired velocity the corner can be taken at.
        factor: f64,
    },
}

/// A lane a vehicle has decided to merge into.
#[derive(Clone, Copy, Debug)]
struct LaneChoice {
    segment: SegmentId,
    heading: f64,
}

/// Where a vehicle ends up after moving for one tick.
enum Route {
    /// Still on the same segment.
    Stay(Point2d),
    /// Moved onto a new segment.
    Enter(SegmentId, Point2d),
    /// Drove off the end of a sink.
    Exit,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulation {
    /// Creates a new simulation with default parameters.
    pub fn new() -> Self {
        Self::with_params(SimulationParams::default())
    }

    /// Creates a new simulation.
    pub fn with_params(params: SimulationParams) -> Self {
        Self {
            network: RoadNetwork::new(),
            rng: StdRng::seed_from_u64(params.seed),
            params,
            clock: 0.0,
            frame: 0,
            #[cfg(feature = "debug")]
            debug: serde_json::Value::Null,
        }
    }

    /// Adds a segment to the network.
    pub fn add_segment(&mut self, attributes: &SegmentAttributes) -> Result<SegmentId, TopologyError> {
        self.network.add_segment(attributes)
    }

    /// Adds a stop light to a segment.
    pub fn add_stop_light(&mut self, segment: SegmentId, light: StopLight) -> Result<StopLightId, TopologyError> {
        self.network.add_stop_light(segment, light)
    }

    /// Adds a vehicle to the simulation, optionally onto a segment.
    pub fn add_vehicle(
        &mut self,
        attributes: &VehicleAttributes,
        segment: Option<SegmentId>,
    ) -> Result<VehicleId, TopologyError> {
        self.network.add_vehicle(attributes, segment)
    }

    /// Attaches a vehicle which was added without a segment.
    pub fn attach_vehicle(&mut self, vehicle: VehicleId, segment: SegmentId) -> Result<(), TopologyError> {
        self.network.attach_vehicle(vehicle, segment)
    }

    /// Removes a vehicle from the simulation.
    pub fn remove_vehicle(&mut self, id: VehicleId) -> Option<Vehicle> {
        self.network.remove_vehicle(id)
    }

    /// Checks the network for segments that lead nowhere without being declared sinks.
    pub fn validate(&self) -> Result<(), TopologyError> {
        self.network.validate()
    }

    /// Randomly scales the desired velocity of each vehicle by a factor
    /// sampled from a normal distribution with a mean of 1 (no adjustment)
    /// and standard deviation of `stddev`.
    pub fn randomise_desired_velocities(&mut self, stddev: f64) -> Result<(), NormalError> {
        let distr = Normal::new(1.0, stddev)?;
        for id in self.network.vehicle_ids() {
            self.scale_desired_vel(id, &distr);
        }
        Ok(())
    }

    /// Like [Self::randomise_desired_velocities], but for a single vehicle,
    /// such as one which has just entered the network.
    pub fn randomise_desired_velocity(&mut self, vehicle_id: VehicleId, stddev: f64) -> Result<(), NormalError> {
        let distr = Normal::new(1.0, stddev)?;
        self.scale_desired_vel(vehicle_id, &distr);
        Ok(())
    }

    fn scale_desired_vel(&mut self, vehicle_id: VehicleId, distr: &Normal<f64>) {
        let factor = distr.sample(&mut self.rng).clamp(0.75, 1.25);
        if let Some(vehicle) = self.network.vehicle_mut(vehicle_id) {
            vehicle.set_desired_vel(factor * vehicle.desired_vel());
        }
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// Does nothing unless `dt` is positive and finite.
    pub fn step(&mut self, dt: f64) {
        if !(dt > 0.0 && dt.is_finite()) {
            return;
        }
        for vehicle_id in self.network.vehicle_ids() {
            self.step_vehicle(vehicle_id, dt);
        }
        self.clock += dt;
        self.frame += 1;

        #[cfg(feature = "debug")]
        {
            self.debug = take_debug_frame();
        }
    }

    /// Gets the elapsed simulation time in seconds.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Gets the current simulation frame index.
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// The parameters the simulation was created with.
    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// The road network.
    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }

    /// Returns an iterator over all the segments in the simulation.
    pub fn iter_segments(&self) -> impl Iterator<Item = &Segment> {
        self.network.iter_segments()
    }

    /// Returns an iterator over all the vehicles in the simulation.
    pub fn iter_vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.network.iter_vehicles()
    }

    /// Returns an iterator over all the stop lights and their current states.
    pub fn iter_lights(&self) -> impl Iterator<Item = (StopLightId, &StopLight, LightState)> {
        let clock = self.clock;
        self.network
            .iter_lights()
            .map(move |(id, light)| (id, light, light.state(clock)))
    }

    /// Gets the current state of a stop light.
    pub fn light_state(&self, light_id: StopLightId) -> Option<LightState> {
        self.network
            .stop_light(light_id)
            .map(|light| light.state(self.clock))
    }

    /// Gets a reference to the vehicle with the given ID.
    pub fn vehicle(&self, vehicle_id: VehicleId) -> Option<&Vehicle> {
        self.network.vehicle(vehicle_id)
    }

    /// Gets a reference to the segment with the given ID.
    pub fn segment(&self, segment_id: SegmentId) -> Option<&Segment> {
        self.network.segment(segment_id)
    }

    /// Gets the debugging information for the previously simulated frame as JSON array.
    #[cfg(feature = "debug")]
    pub fn debug(&mut self) -> serde_json::Value {
        self.debug.clone()
    }

    /// Finds the most pressing hazard ahead of a vehicle.
    ///
    /// Vehicles take priority over stop lights, which take priority over corners.
    pub fn hazard(&self, vehicle_id: VehicleId) -> Option<Hazard> {
        let vehicle = self.network.vehicle(vehicle_id)?;
        let probe = vehicle.probe()?;
        let look_ahead = vehicle.look_ahead(self.params.look_ahead_time);

        if let Some(other) = self.network.vehicle_within_distance(&probe, look_ahead) {
            return Some(Hazard::Vehicle(other));
        }

        let stop_light = self
            .network
            .stop_lights_within_distance(probe.location, probe.segment, look_ahead)
            .into_iter()
            .find(|id| self.light_state(*id).map_or(false, LightState::is_stop));
        if let Some(light) = stop_light {
            return Some(Hazard::StopLight(light));
        }

        let turn = self
            .network
            .upcoming_turn(probe.location, probe.segment, look_ahead);
        if turn > 0.0 {
            return Some(Hazard::Corner {
                factor: cornering_factor(turn),
            });
        }

        None
    }

    /// Advances a single vehicle by `dt` seconds.
    fn step_vehicle(&mut self, vehicle_id: VehicleId, dt: f64) {
        let Some(vehicle) = self.network.vehicle(vehicle_id) else {
            return;
        };
        // Vehicles waiting to be attached stay put
        let Some(segment_id) = vehicle.segment_id() else {
            return;
        };

        let hazard = self.hazard(vehicle_id);
        log::trace!("{:?}: {:?}", vehicle_id, hazard);
        let lane_change = match hazard {
            Some(Hazard::Vehicle(_))
                if vehicle.can_change_lanes(self.clock, self.params.lane_change_cooldown) =>
            {
                self.choose_lane(vehicle, segment_id)
            }
            _ => None,
        };
        let braking = match hazard {
            Some(Hazard::Corner { factor }) => vehicle.vel() > factor * vehicle.desired_vel(),
            Some(_) => true,
            None => false,
        };
        let finishing_lane_change = lane_change.is_none()
            && vehicle.changing_lanes()
            && self.network.segment(segment_id).map_or(false, |segment| {
                vehicle.bounding_box().intersects_line(segment.line())
            });

        let clock = self.clock;
        let Some(vehicle) = self.network.vehicle_mut(vehicle_id) else {
            return;
        };
        let old_vel = vehicle.vel();
        if let Some(choice) = lane_change {
            vehicle.begin_lane_change(choice.heading, clock);
        }
        if braking {
            vehicle.brake(dt);
        } else {
            vehicle.approach_desired_vel(dt);
        }
        let travel = 0.5 * (old_vel + vehicle.vel()) * dt;

        if let Some(choice) = lane_change {
            log::debug!("{:?} changing lanes into {:?}", vehicle_id, choice.segment);
            // Ownership moves now, before the vehicle has physically arrived
            if let Err(err) = self.network.attach_vehicle(vehicle_id, choice.segment) {
                log::error!("lane change of {:?} failed: {}", vehicle_id, err);
            }
        } else if finishing_lane_change {
            if let Some(heading) = self.network.segment(segment_id).map(|s| s.heading()) {
                if let Some(vehicle) = self.network.vehicle_mut(vehicle_id) {
                    vehicle.end_lane_change(heading);
                }
            }
        }

        self.advance(vehicle_id, travel);
    }

    /// Looks for an adjacent lane the vehicle can merge into.
    ///
    /// A lane qualifies if one of the current segment's lane-change lines
    /// runs under the vehicle and reaches the lane, and no vehicle in that
    /// lane is sitting across the same line.
    fn choose_lane(&self, vehicle: &Vehicle, segment_id: SegmentId) -> Option<LaneChoice> {
        let current = self.network.segment(segment_id)?;
        let bounds = vehicle.bounding_box();
        let alternates = self.network.similar_segments_in_road(segment_id);

        let target = iproduct!(current.lane_lines(), alternates.iter())
            .filter(|(lane_line, _)| bounds.intersects_line(&lane_line.line))
            .filter(|(lane_line, alt)| {
                self.network
                    .segment(**alt)
                    .map_or(false, |alt| lane_line.line.intersects(alt.line()))
            })
            .find(|(lane_line, alt)| {
                self.network
                    .vehicles_in_segment(**alt)
                    .all(|other| !other.bounding_box().intersects_line(&lane_line.line))
            })
            .map(|(_, alt)| *alt)?;

        let heading = self.heading_to_lane(vehicle, target)?;
        Some(LaneChoice {
            segment: target,
            heading,
        })
    }

    /// Finds the heading towards the nearest point where one of the target lane's
    /// lane-change lines crosses it, out of those ahead of the vehicle's front.
    fn heading_to_lane(&self, vehicle: &Vehicle, target: SegmentId) -> Option<f64> {
        let dir = vehicle.direction();
        let aim = self
            .network
            .segment(target)?
            .lane_lines()
            .iter()
            .map(|lane_line| lane_line.centre)
            .filter(|centre| (*centre - vehicle.location()).dot(dir) > 0.5 * vehicle.length())
            .min_by(|a, b| {
                let da = (*a - vehicle.location()).dot(dir);
                let db = (*b - vehicle.location()).dot(dir);
                da.total_cmp(&db)
            })?;
        debug_line("lane change", vehicle.location(), aim);
        Some(heading_of(aim - vehicle.location()))
    }

    /// Moves a vehicle `travel` m along its heading, carrying it onto
    /// the next segment if it passes the end of its current one.
    fn advance(&mut self, vehicle_id: VehicleId, travel: f64) {
        let Some(vehicle) = self.network.vehicle(vehicle_id) else {
            return;
        };
        let Some(mut segment) = vehicle.segment_id().and_then(|id| self.network.segment(id)) else {
            return;
        };
        let mut from = vehicle.location();
        let mut heading = vehicle.heading();
        let mut travel = travel;
        let mut entered = None;

        let route = loop {
            let to = from + travel * direction(heading);
            if !segment.is_beyond(to) {
                break match entered {
                    Some(segment_id) => Route::Enter(segment_id, to),
                    None => Route::Stay(to),
                };
            }

            let overshoot = f64::max(travel - segment.distance_to_end(from), 0.0);
            let next = self.network.segments_from(segment.id());
            if next.is_empty() {
                break Route::Exit;
            }
            let next_id = next[self.rng.gen_range(0..next.len())];
            let Some(next) = self.network.segment(next_id) else {
                break Route::Exit;
            };
            segment = next;
            from = segment.start();
            heading = segment.heading();
            travel = overshoot;
            entered = Some(next_id);
        };

        match route {
            Route::Stay(location) => {
                if let Some(vehicle) = self.network.vehicle_mut(vehicle_id) {
                    vehicle.set_pose(location, heading);
                }
            }
            Route::Enter(segment_id, location) => {
                log::debug!("{:?} entered {:?}", vehicle_id, segment_id);
                self.network.move_vehicle(vehicle_id, segment_id, location);
            }
            Route::Exit => {
                log::debug!("{:?} left the network", vehicle_id);
                self.network.remove_vehicle(vehicle_id);
            }
        }
    }
}
