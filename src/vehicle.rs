use crate::math::{direction, Point2d, Quad, Vector2d};
use crate::network::Probe;
use crate::{SegmentId, VehicleId};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod kinematics;

/// A simulated vehicle.
///
/// Only kinematic state is stored. The bounding box and the view area are
/// derived from it whenever they're asked for, so they never go stale.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vehicle {
    /// The vehicle's ID
    pub(crate) id: VehicleId,
    /// The segment the vehicle belongs to, if it's on the network.
    segment: Option<SegmentId>,
    /// Half the vehicle's width in m.
    half_wid: f64,
    /// Half the vehicle's length in m.
    half_len: f64,
    /// The world space coordinates of the centre of the vehicle.
    location: Point2d,
    /// The direction of travel in degrees.
    heading: f64,
    /// The velocity in m/s.
    vel: f64,
    /// The velocity the driver wants to travel at in m/s.
    desired_vel: f64,
    /// The rate the vehicle speeds up at in m/s<sup>2</sup>.
    acc: f64,
    /// The rate the vehicle brakes at in m/s<sup>2</sup>.
    dec: f64,
    /// Whether the vehicle is merging into the lane it now belongs to.
    changing_lanes: bool,
    /// The simulation time at which the last lane change started.
    last_lane_change: Option<f64>,
}

/// The attributes of a simulated vehicle.
#[derive(Clone, Copy, Debug)]
pub struct VehicleAttributes {
    /// The vehicle width in m.
    pub width: f64,
    /// The vehicle length in m.
    pub length: f64,
    /// The initial velocity in m/s.
    pub vel: f64,
    /// The velocity the driver wants to travel at in m/s.
    pub desired_vel: f64,
    /// The rate the vehicle speeds up or eases off at, in m/s<sup>2</sup>.
    pub acc: f64,
    /// The rate the vehicle brakes at for hazards, in m/s<sup>2</sup>.
    pub dec: f64,
    /// The initial location. Ignored if the vehicle is added onto a segment.
    pub location: Point2d,
    /// The initial heading in degrees. Ignored if the vehicle is added onto a segment.
    pub heading: f64,
}

impl Default for VehicleAttributes {
    fn default() -> Self {
        Self {
            width: 1.8,
            length: 4.5,
            vel: 0.0,
            desired_vel: 13.4,
            acc: 3.5,
            dec: 14.0,
            location: Point2d::new(0.0, 0.0),
            heading: 0.0,
        }
    }
}

impl Vehicle {
    /// Creates a new vehicle.
    pub(crate) fn new(id: VehicleId, attributes: &VehicleAttributes) -> Self {
        Self {
            id,
            segment: None,
            half_wid: 0.5 * attributes.width,
            half_len: 0.5 * attributes.length,
            location: attributes.location,
            heading: attributes.heading,
            vel: attributes.vel,
            desired_vel: attributes.desired_vel,
            acc: attributes.acc,
            dec: attributes.dec,
            changing_lanes: false,
            last_lane_change: None,
        }
    }

    /// Gets the vehicle's ID.
    pub fn id(&self) -> VehicleId {
        self.id
    }

    /// The ID of the segment the vehicle belongs to.
    pub fn segment_id(&self) -> Option<SegmentId> {
        self.segment
    }

    /// The vehicle's width in m.
    pub fn width(&self) -> f64 {
        2.0 * self.half_wid
    }

    /// The vehicle's length in m.
    pub fn length(&self) -> f64 {
        2.0 * self.half_len
    }

    /// The coordinates in world space of the centre of the vehicle.
    pub fn location(&self) -> Point2d {
        self.location
    }

    /// The vehicle's heading in degrees.
    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// A unit vector in world space aligned with the vehicle's heading.
    pub fn direction(&self) -> Vector2d {
        direction(self.heading)
    }

    /// The vehicle's velocity in m/s.
    pub fn vel(&self) -> f64 {
        self.vel
    }

    /// The velocity the driver wants to travel at in m/s.
    pub fn desired_vel(&self) -> f64 {
        self.desired_vel
    }

    pub fn acc(&self) -> f64 {
        self.acc
    }

    pub fn dec(&self) -> f64 {
        self.dec
    }

    /// Whether the vehicle is part way through merging into another lane.
    pub fn changing_lanes(&self) -> bool {
        self.changing_lanes
    }

    /// The oriented rectangle the vehicle occupies.
    pub fn bounding_box(&self) -> Quad {
        Quad::oriented_rect(self.location, self.heading, self.half_len, self.half_wid)
    }

    /// How far ahead the driver looks, in m. Grows with velocity.
    ///
    /// # Parameters
    /// * `look_ahead_time` - Seconds of travel at the current velocity to look ahead
    pub fn look_ahead(&self, look_ahead_time: f64) -> f64 {
        self.length() + self.vel * look_ahead_time
    }

    /// The region in front of the vehicle that the driver watches,
    /// starting at the vehicle's centre and extending `distance` m ahead.
    pub fn view_area(&self, distance: f64) -> Quad {
        Quad::ahead(self.location, self.heading, self.half_wid, distance)
    }

    /// A snapshot of the vehicle used to scan the road ahead.
    /// Returns `None` if the vehicle isn't on a segment.
    pub fn probe(&self) -> Option<Probe> {
        Some(Probe {
            vehicle: self.id,
            segment: self.segment?,
            location: self.location,
            heading: self.heading,
            half_wid: self.half_wid,
        })
    }

    /// Whether enough time has passed since the last lane change to start another.
    pub(crate) fn can_change_lanes(&self, now: f64, cooldown: f64) -> bool {
        !self.changing_lanes
            && self
                .last_lane_change
                .map_or(true, |since| now - since >= cooldown)
    }

    /// Sets the vehicle's desired velocity.
    pub fn set_desired_vel(&mut self, desired_vel: f64) {
        self.desired_vel = desired_vel;
    }

    /// Places the vehicle at the start of a segment, travelling along it.
    pub(crate) fn enter_segment(&mut self, segment: SegmentId, start: Point2d, heading: f64) {
        self.segment = Some(segment);
        self.location = start;
        self.heading = heading;
        self.changing_lanes = false;
    }

    /// Changes which segment the vehicle belongs to without moving it.
    pub(crate) fn set_segment(&mut self, segment: Option<SegmentId>) {
        self.segment = segment;
    }

    /// Starts merging into another lane.
    pub(crate) fn begin_lane_change(&mut self, heading: f64, now: f64) {
        self.changing_lanes = true;
        self.heading = heading;
        self.last_lane_change = Some(now);
    }

    /// Finishes a lane change, lining up with the new lane.
    pub(crate) fn end_lane_change(&mut self, heading: f64) {
        self.changing_lanes = false;
        self.heading = heading;
    }

    /// Brakes for a hazard for one time step.
    pub(crate) fn brake(&mut self, dt: f64) {
        self.vel = kinematics::brake(self.vel, self.dec, dt);
    }

    /// Speeds up or eases off towards the desired velocity for one time step.
    pub(crate) fn approach_desired_vel(&mut self, dt: f64) {
        self.vel = kinematics::approach(self.vel, self.desired_vel, self.acc, dt);
    }

    /// Moves the vehicle.
    pub(crate) fn set_pose(&mut self, location: Point2d, heading: f64) {
        self.location = location;
        self.heading = heading;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use slotmap::KeyData;

    fn vehicle(vel: f64) -> Vehicle {
        let attribs = VehicleAttributes {
            vel,
            location: Point2d::new(10.0, 0.0),
            ..Default::default()
        };
        Vehicle::new(VehicleId::from(KeyData::from_ffi(1)), &attribs)
    }

    #[test]
    fn look_ahead_grows_with_velocity() {
        assert_approx_eq!(vehicle(0.0).look_ahead(2.0), 4.5);
        assert_approx_eq!(vehicle(10.0).look_ahead(2.0), 24.5);
    }

    #[test]
    fn derived_shapes_follow_state() {
        let mut veh = vehicle(10.0);
        assert!(veh.bounding_box().contains_point(Point2d::new(12.0, 0.5)));
        assert!(veh.view_area(20.0).contains_point(Point2d::new(25.0, 0.0)));

        veh.set_pose(Point2d::new(0.0, 0.0), 90.0);
        assert!(!veh.bounding_box().contains_point(Point2d::new(12.0, 0.5)));
        assert!(veh.view_area(20.0).contains_point(Point2d::new(0.0, 15.0)));
        assert!(!veh.view_area(20.0).contains_point(Point2d::new(0.0, -5.0)));
    }

    #[test]
    fn unattached_vehicle_has_no_probe() {
        let mut veh = vehicle(0.0);
        assert!(veh.probe().is_none());
        let segment = SegmentId::from(KeyData::from_ffi(1));
        veh.enter_segment(segment, Point2d::new(0.0, 0.0), 0.0);
        assert_eq!(veh.probe().map(|p| p.segment), Some(segment));
    }

    #[test]
    fn lane_change_cooldown() {
        let mut veh = vehicle(0.0);
        assert!(veh.can_change_lanes(0.0, 15.0));
        veh.begin_lane_change(10.0, 1.0);
        assert!(!veh.can_change_lanes(2.0, 0.0));
        veh.end_lane_change(0.0);
        assert!(!veh.can_change_lanes(10.0, 15.0));
        assert!(veh.can_change_lanes(16.0, 15.0));
    }
}
