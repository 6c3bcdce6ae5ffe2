//! Distance-bounded scans of the road ahead of a vehicle.
//!
//! Both scans walk forward from a point on a segment, spending the distance
//! budget on what's left of each segment and branching into every segment
//! that continues from its end. Segments always have a positive length,
//! so the budget shrinks on every step past the first and the walk ends.

use super::RoadNetwork;
use crate::debug::debug_quad;
use crate::math::{heading_delta, Point2d, Quad};
use crate::{SegmentId, StopLightId, VehicleId};
use cgmath::prelude::*;

/// A lightweight snapshot of a vehicle, carried along a scan of the road ahead.
#[derive(Clone, Copy, Debug)]
pub struct Probe {
    /// The vehicle doing the looking, which never counts as a hazard to itself.
    pub vehicle: VehicleId,
    /// The segment being scanned.
    pub segment: SegmentId,
    /// Where the scan starts on the segment.
    pub location: Point2d,
    /// The direction to look in, in degrees.
    pub heading: f64,
    /// Half the width of the vehicle in m.
    pub half_wid: f64,
}

impl Probe {
    /// The region `distance` m ahead of the probe.
    pub fn view_area(&self, distance: f64) -> Quad {
        Quad::ahead(self.location, self.heading, self.half_wid, distance)
    }
}

impl RoadNetwork {
    /// Finds a vehicle within `distance` m ahead of the probe, if there is one.
    ///
    /// Vehicles on the probe's segment are checked against the view area.
    /// If the view reaches past the end of the segment, every continuing segment
    /// is scanned in turn with the leftover distance. The scan stops at the first
    /// vehicle found on any branch.
    pub fn vehicle_within_distance(&self, probe: &Probe, distance: f64) -> Option<VehicleId> {
        if distance <= 0.0 {
            return None;
        }
        let segment = self.segments.get(probe.segment)?;
        let remaining = segment.distance_to_end(probe.location);

        let view = probe.view_area(distance);
        debug_quad("view area", &view);
        let found = segment
            .vehicles()
            .iter()
            .copied()
            .filter(|id| *id != probe.vehicle)
            .find(|id| {
                self.vehicles
                    .get(*id)
                    .map_or(false, |v| v.bounding_box().intersects(&view))
            });
        if found.is_some() {
            return found;
        }

        if remaining < distance {
            for next_id in self.segments_from(probe.segment) {
                let next = &self.segments[*next_id];
                let probe = Probe {
                    segment: *next_id,
                    location: segment.end(),
                    heading: next.heading(),
                    ..*probe
                };
                if let Some(vehicle) = self.vehicle_within_distance(&probe, distance - remaining) {
                    return Some(vehicle);
                }
            }
        }

        None
    }

    /// Collects the stop lights within `distance` m ahead of `point` on `segment`
    /// and the segments after it.
    ///
    /// Unlike [Self::vehicle_within_distance] this never stops early: the lights
    /// found on every branch are concatenated, so a light reached by two
    /// routes appears twice.
    pub fn stop_lights_within_distance(
        &self,
        point: Point2d,
        segment_id: SegmentId,
        distance: f64,
    ) -> Vec<StopLightId> {
        let mut lights = vec![];
        if distance <= 0.0 {
            return lights;
        }
        let Some(segment) = self.segments.get(segment_id) else {
            return lights;
        };
        let remaining = segment.distance_to_end(point);

        // Only lights ahead of the point count
        if let Some(light_id) = segment.stop_light() {
            let ahead = (self.lights[light_id].location() - point).dot(segment.direction());
            if ahead >= 0.0 && ahead <= distance {
                lights.push(light_id);
            }
        }

        if remaining < distance {
            for next_id in self.segments_from(segment_id) {
                lights.extend(self.stop_lights_within_distance(
                    segment.end(),
                    *next_id,
                    distance - remaining,
                ));
            }
        }

        lights
    }

    /// Finds the sharpest change of heading, in degrees, from the given segment
    /// into any segment continuing from it, if its end is within `distance` m of `point`.
    /// Returns zero if the end is out of sight or the road runs straight on.
    pub fn upcoming_turn(&self, point: Point2d, segment_id: SegmentId, distance: f64) -> f64 {
        let Some(segment) = self.segments.get(segment_id) else {
            return 0.0;
        };
        if segment.distance_to_end(point) >= distance {
            return 0.0;
        }
        self.segments_from(segment_id)
            .iter()
            .map(|next| heading_delta(segment.heading(), self.segments[*next].heading()))
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::light::StopLight;
    use crate::segment::SegmentAttributes;
    use crate::vehicle::VehicleAttributes;

    fn add(net: &mut RoadNetwork, start: (f64, f64), end: (f64, f64)) -> SegmentId {
        net.add_segment(&SegmentAttributes {
            road: "main",
            start: Point2d::new(start.0, start.1),
            end: Point2d::new(end.0, end.1),
            sink: false,
        })
        .unwrap()
    }

    /// Adds a vehicle to the segment, then drives it `pos` m along it.
    fn place(net: &mut RoadNetwork, segment: SegmentId, pos: f64) -> VehicleId {
        let id = net.add_vehicle(&VehicleAttributes::default(), Some(segment)).unwrap();
        let seg = net.segment(segment).unwrap();
        let location = seg.start() + pos * seg.direction();
        net.move_vehicle(id, segment, location);
        id
    }

    fn probe(net: &RoadNetwork, vehicle: VehicleId) -> Probe {
        net.vehicle(vehicle).unwrap().probe().unwrap()
    }

    #[test]
    fn finds_vehicle_ahead_on_same_segment() {
        let mut net = RoadNetwork::new();
        let a = add(&mut net, (0.0, 0.0), (100.0, 0.0));
        let me = place(&mut net, a, 10.0);
        let ahead = place(&mut net, a, 25.0);
        let behind = place(&mut net, a, 0.0);

        let p = probe(&net, me);
        assert_eq!(net.vehicle_within_distance(&p, 20.0), Some(ahead));
        assert_eq!(net.vehicle_within_distance(&p, 5.0), None);
        assert_eq!(net.vehicle_within_distance(&probe(&net, ahead), 50.0), None);
        assert_eq!(net.vehicle_within_distance(&probe(&net, behind), 8.0), Some(me));
    }

    #[test]
    fn zero_distance_sees_nothing() {
        let mut net = RoadNetwork::new();
        let a = add(&mut net, (0.0, 0.0), (100.0, 0.0));
        let me = place(&mut net, a, 10.0);
        // Overlapping vehicles still aren't reported without any distance to look over
        place(&mut net, a, 11.0);
        place(&mut net, a, 15.0);
        assert_eq!(net.vehicle_within_distance(&probe(&net, me), 0.0), None);
        assert_eq!(net.vehicle_within_distance(&probe(&net, me), -1.0), None);
    }

    #[test]
    fn looks_past_segment_end_into_every_branch() {
        let mut net = RoadNetwork::new();
        let a = add(&mut net, (0.0, 0.0), (100.0, 0.0));
        let straight = add(&mut net, (100.0, 0.0), (200.0, 0.0));
        let left = add(&mut net, (100.0, 0.0), (100.0, 100.0));
        let me = place(&mut net, a, 90.0);
        let around_corner = place(&mut net, left, 5.0);

        let p = probe(&net, me);
        assert_eq!(net.vehicle_within_distance(&p, 20.0), Some(around_corner));
        assert_eq!(net.vehicle_within_distance(&p, 12.0), None);
        assert!(net.vehicles_in_segment(straight).next().is_none());
    }

    #[test]
    fn vehicle_scan_stops_at_first_match() {
        let mut net = RoadNetwork::new();
        let a = add(&mut net, (0.0, 0.0), (100.0, 0.0));
        let first = add(&mut net, (100.0, 0.0), (200.0, 0.0));
        let second = add(&mut net, (100.0, 0.0), (100.0, 100.0));
        let me = place(&mut net, a, 95.0);
        let on_first = place(&mut net, first, 5.0);
        place(&mut net, second, 5.0);

        assert_eq!(net.vehicle_within_distance(&probe(&net, me), 30.0), Some(on_first));
    }

    #[test]
    fn stop_light_scan_collects_every_branch() {
        let mut net = RoadNetwork::new();
        let a = add(&mut net, (0.0, 0.0), (100.0, 0.0));
        let b = add(&mut net, (100.0, 0.0), (150.0, 0.0));
        let c = add(&mut net, (100.0, 0.0), (100.0, 50.0));
        let merge = add(&mut net, (150.0, 0.0), (150.0, 50.0));
        add(&mut net, (100.0, 50.0), (150.0, 50.0));
        let light = |x, y| StopLight::new(Point2d::new(x, y), 10.0, 2.0, 10.0).unwrap();
        let on_a = net.add_stop_light(a, light(100.0, 0.0)).unwrap();
        let on_b = net.add_stop_light(b, light(150.0, 0.0)).unwrap();
        let on_c = net.add_stop_light(c, light(100.0, 50.0)).unwrap();
        let on_merge = net.add_stop_light(merge, light(150.0, 25.0)).unwrap();

        let origin = Point2d::new(0.0, 0.0);
        assert!(net.stop_lights_within_distance(origin, a, 99.0).is_empty());
        assert_eq!(net.stop_lights_within_distance(origin, a, 100.0), vec![on_a]);
        assert_eq!(
            net.stop_lights_within_distance(origin, a, 160.0),
            vec![on_a, on_b, on_c]
        );
        assert_eq!(
            net.stop_lights_within_distance(origin, a, 175.0),
            vec![on_a, on_b, on_merge, on_c]
        );

        // Lights behind the point are ignored
        let past = Point2d::new(150.0, 30.0);
        assert!(net.stop_lights_within_distance(past, merge, 10.0).is_empty());
    }

    #[test]
    fn stop_light_scan_keeps_duplicates_from_converging_routes() {
        let mut net = RoadNetwork::new();
        let a = add(&mut net, (0.0, 0.0), (10.0, 0.0));
        add(&mut net, (10.0, 0.0), (20.0, 0.0));
        add(&mut net, (10.0, 0.0), (15.0, 5.0));
        add(&mut net, (15.0, 5.0), (20.0, 0.0));
        let joined = add(&mut net, (20.0, 0.0), (30.0, 0.0));
        let light = StopLight::new(Point2d::new(30.0, 0.0), 1.0, 1.0, 1.0).unwrap();
        let light = net.add_stop_light(joined, light).unwrap();

        let found = net.stop_lights_within_distance(Point2d::new(0.0, 0.0), a, 40.0);
        assert_eq!(found, vec![light, light]);
    }

    #[test]
    fn upcoming_turn_takes_sharpest_branch() {
        let mut net = RoadNetwork::new();
        let a = add(&mut net, (0.0, 0.0), (100.0, 0.0));
        add(&mut net, (100.0, 0.0), (200.0, 0.0));
        add(&mut net, (100.0, 0.0), (150.0, -50.0));
        let near = Point2d::new(95.0, 0.0);
        assert!((net.upcoming_turn(near, a, 10.0) - 45.0).abs() < 1e-9);
        assert_eq!(net.upcoming_turn(near, a, 5.0), 0.0);
        assert_eq!(net.upcoming_turn(Point2d::new(0.0, 0.0), a, 10.0), 0.0);
    }
}
