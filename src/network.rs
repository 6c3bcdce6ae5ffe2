use crate::error::TopologyError;
use crate::light::StopLight;
use crate::math::{same_heading, Point2d};
use crate::segment::{Segment, SegmentAttributes};
use crate::vehicle::{Vehicle, VehicleAttributes};
use crate::{NodeId, SegmentId, SegmentSet, StopLightId, VehicleId, VehicleSet};
use cgmath::prelude::*;
use slotmap::SlotMap;
use smallvec::SmallVec;

pub use lookahead::Probe;

mod lookahead;

/// Points closer than this, in m, are treated as the same graph node.
const NODE_TOLERANCE: f64 = 1e-6;

/// The road network: a directed graph of segments, the stop lights on them
/// and the registry of vehicles travelling over them.
///
/// Segment end points are resolved to integer node IDs once, when each segment
/// is added, so walking the graph never compares floating point coordinates.
#[derive(Clone, Default)]
pub struct RoadNetwork {
    /// The junctions between segments.
    nodes: SlotMap<NodeId, Node>,
    /// The segments in the network.
    segments: SegmentSet,
    /// The stop lights.
    lights: SlotMap<StopLightId, StopLight>,
    /// The vehicles being simulated.
    vehicles: VehicleSet,
}

/// A point where segments meet.
#[derive(Clone)]
struct Node {
    point: Point2d,
    /// The segments which start at this node.
    outgoing: SmallVec<[SegmentId; 4]>,
}

impl RoadNetwork {
    /// Creates an empty network.
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds a segment to the network.
    ///
    /// Fails if the segment has zero length, or if both its ends snap onto the
    /// same node, since distance-bounded scans of the road ahead rely on every
    /// segment consuming some distance.
    pub fn add_segment(&mut self, attributes: &SegmentAttributes) -> Result<SegmentId, TopologyError> {
        let length = attributes.start.distance(attributes.end);
        let start_existing = self.find_node(attributes.start);
        let self_loop = start_existing.is_some() && start_existing == self.find_node(attributes.end);
        if !(length > NODE_TOLERANCE) || self_loop {
            return Err(TopologyError::ZeroLengthSegment {
                start: attributes.start,
            });
        }
        let start_node = self.node_at(attributes.start);
        let end_node = self.node_at(attributes.end);
        let id = self
            .segments
            .insert_with_key(|id| Segment::new(id, start_node, end_node, attributes));
        self.nodes[start_node].outgoing.push(id);
        Ok(id)
    }

    /// Adds a stop light to a segment. The light must lie on the segment,
    /// and each segment may have at most one.
    pub fn add_stop_light(
        &mut self,
        segment_id: SegmentId,
        light: StopLight,
    ) -> Result<StopLightId, TopologyError> {
        let segment = self
            .segments
            .get(segment_id)
            .ok_or(TopologyError::UnknownSegment(segment_id))?;
        if segment.stop_light().is_some() {
            return Err(TopologyError::LightAlreadyPresent(segment_id));
        }
        if !segment.line().contains_point(light.location()) {
            return Err(TopologyError::LightOffSegment {
                segment: segment_id,
                location: light.location(),
            });
        }
        let light_id = self.lights.insert(light);
        self.segments[segment_id].set_stop_light(light_id);
        Ok(light_id)
    }

    /// Adds a vehicle to the network.
    ///
    /// If a segment is given the vehicle is attached to it, which moves the
    /// vehicle to the start of the segment. Otherwise it's registered without
    /// a segment, at the location given in its attributes, and is left
    /// alone by the simulation until it's attached.
    pub fn add_vehicle(
        &mut self,
        attributes: &VehicleAttributes,
        segment: Option<SegmentId>,
    ) -> Result<VehicleId, TopologyError> {
        if let Some(segment_id) = segment {
            if !self.segments.contains_key(segment_id) {
                return Err(TopologyError::UnknownSegment(segment_id));
            }
        }
        let vehicle_id = self
            .vehicles
            .insert_with_key(|id| Vehicle::new(id, attributes));
        if let Some(segment_id) = segment {
            self.attach_vehicle(vehicle_id, segment_id)?;
        }
        Ok(vehicle_id)
    }

    /// Attaches a vehicle to a segment.
    ///
    /// A vehicle entering the network fresh is moved to the start of the segment
    /// and lined up with it. A vehicle already on another segment keeps its
    /// position and is only transferred.
    pub fn attach_vehicle(&mut self, vehicle_id: VehicleId, segment_id: SegmentId) -> Result<(), TopologyError> {
        let segment = self
            .segments
            .get(segment_id)
            .ok_or(TopologyError::UnknownSegment(segment_id))?;
        let vehicle = self
            .vehicles
            .get_mut(vehicle_id)
            .ok_or(TopologyError::UnknownVehicle(vehicle_id))?;
        match vehicle.segment_id() {
            None => vehicle.enter_segment(segment_id, segment.start(), segment.heading()),
            Some(old_id) => {
                vehicle.set_segment(Some(segment_id));
                if let Some(old) = self.segments.get_mut(old_id) {
                    old.remove_vehicle(vehicle_id);
                }
            }
        }
        self.segments[segment_id].insert_vehicle(vehicle_id);
        Ok(())
    }

    /// Moves a vehicle onto the given segment at the given location, following the segment.
    pub(crate) fn move_vehicle(&mut self, vehicle_id: VehicleId, segment_id: SegmentId, location: Point2d) {
        let Some(vehicle) = self.vehicles.get_mut(vehicle_id) else {
            return;
        };
        if let Some(old) = vehicle.segment_id().and_then(|id| self.segments.get_mut(id)) {
            old.remove_vehicle(vehicle_id);
        }
        let segment = &mut self.segments[segment_id];
        vehicle.enter_segment(segment_id, location, segment.heading());
        segment.insert_vehicle(vehicle_id);
    }

    /// Removes a vehicle from the network.
    pub fn remove_vehicle(&mut self, id: VehicleId) -> Option<Vehicle> {
        let vehicle = self.vehicles.remove(id)?;
        if let Some(segment) = vehicle.segment_id().and_then(|s| self.segments.get_mut(s)) {
            segment.remove_vehicle(id);
        }
        Some(vehicle)
    }

    /// Checks that every segment without a continuation was declared a sink.
    /// Run this once the network is built; a failure means the map is broken.
    pub fn validate(&self) -> Result<(), TopologyError> {
        for segment in self.segments.values() {
            if self.nodes[segment.end_node()].outgoing.is_empty() && !segment.is_sink() {
                log::warn!(
                    "segment {:?} ({}) ends at {:?} with nowhere to go",
                    segment.id(),
                    segment.road(),
                    segment.end()
                );
                return Err(TopologyError::UnexpectedSink(segment.id()));
            }
        }
        Ok(())
    }

    /// Gets the segments that start at the given point.
    /// Returns an empty slice if there are none.
    pub fn segments_starting_at(&self, point: Point2d) -> &[SegmentId] {
        self.find_node(point)
            .map(|node| &self.nodes[node].outgoing[..])
            .unwrap_or(&[])
    }

    /// Checks whether any segment starts at the given point.
    pub fn contains_start_point(&self, point: Point2d) -> bool {
        !self.segments_starting_at(point).is_empty()
    }

    /// Gets the segments which continue on from the end of the given segment.
    /// Returns an empty slice for a sink.
    pub fn segments_from(&self, segment_id: SegmentId) -> &[SegmentId] {
        self.segments
            .get(segment_id)
            .map(|segment| &self.nodes[segment.end_node()].outgoing[..])
            .unwrap_or(&[])
    }

    /// Finds the other lanes of the same road travelling in the same direction
    /// which one of the segment's lane-change lines reaches.
    pub fn similar_segments_in_road(&self, segment_id: SegmentId) -> SmallVec<[SegmentId; 4]> {
        let Some(current) = self.segments.get(segment_id) else {
            return SmallVec::new();
        };
        self.segments
            .values()
            .filter(|segment| segment.id() != segment_id)
            .filter(|segment| segment.road() == current.road())
            .filter(|segment| same_heading(segment.heading(), current.heading()))
            .filter(|segment| {
                current
                    .lane_lines()
                    .iter()
                    .any(|lane_line| lane_line.line.intersects(segment.line()))
            })
            .map(|segment| segment.id())
            .collect()
    }

    /// Gets the vehicles which belong to the given segment.
    pub fn vehicles_in_segment(&self, segment_id: SegmentId) -> impl Iterator<Item = &Vehicle> + '_ {
        self.segments
            .get(segment_id)
            .map(|segment| segment.vehicles())
            .unwrap_or(&[])
            .iter()
            .filter_map(|id| self.vehicles.get(*id))
    }

    /// Gets a reference to the segment with the given ID.
    pub fn segment(&self, segment_id: SegmentId) -> Option<&Segment> {
        self.segments.get(segment_id)
    }

    /// Gets a reference to the vehicle with the given ID.
    pub fn vehicle(&self, vehicle_id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(vehicle_id)
    }

    pub(crate) fn vehicle_mut(&mut self, vehicle_id: VehicleId) -> Option<&mut Vehicle> {
        self.vehicles.get_mut(vehicle_id)
    }

    /// Gets a reference to the stop light with the given ID.
    pub fn stop_light(&self, light_id: StopLightId) -> Option<&StopLight> {
        self.lights.get(light_id)
    }

    /// Returns an iterator over all the segments in the network.
    pub fn iter_segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.values()
    }

    /// Returns an iterator over all the vehicles in the network.
    pub fn iter_vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.values()
    }

    /// Returns an iterator over all the stop lights in the network.
    pub fn iter_lights(&self) -> impl Iterator<Item = (StopLightId, &StopLight)> {
        self.lights.iter()
    }

    /// The IDs of all vehicles, in the order the simulation updates them.
    pub(crate) fn vehicle_ids(&self) -> Vec<VehicleId> {
        self.vehicles.keys().collect()
    }

    /// Finds the node at the given point.
    fn find_node(&self, point: Point2d) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.point.distance(point) <= NODE_TOLERANCE)
            .map(|(id, _)| id)
    }

    /// Finds the node at the given point, creating it if there isn't one.
    fn node_at(&mut self, point: Point2d) -> NodeId {
        self.find_node(point).unwrap_or_else(|| {
            self.nodes.insert(Node {
                point,
                outgoing: SmallVec::new(),
            })
        })
    }
}
