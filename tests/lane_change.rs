//! Tests of vehicles merging between the lanes of a two lane road.

use assert_approx_eq::assert_approx_eq;
use roadnet_sim::{math::Point2d, SegmentAttributes, SegmentId, Simulation, VehicleAttributes, VehicleId};

/// Builds two parallel lanes of the same road, 4 m apart.
fn two_lane_road(sim: &mut Simulation) -> (SegmentId, SegmentId) {
    let mut lane = |y: f64| {
        sim.add_segment(&SegmentAttributes {
            road: "main",
            start: Point2d::new(0.0, y),
            end: Point2d::new(200.0, y),
            sink: true,
        })
        .unwrap()
    };
    (lane(0.0), lane(4.0))
}

/// Adds a vehicle that comes to a dead stop `vel / 2` m along the segment
/// after the next one second step.
fn parked(sim: &mut Simulation, segment: SegmentId, vel: f64) -> VehicleId {
    let attribs = VehicleAttributes {
        vel,
        desired_vel: 0.0,
        acc: 1000.0,
        ..Default::default()
    };
    sim.add_vehicle(&attribs, Some(segment)).unwrap()
}

fn slow_vehicle(sim: &mut Simulation, segment: SegmentId) -> VehicleId {
    let attribs = VehicleAttributes {
        vel: 5.0,
        desired_vel: 5.0,
        ..Default::default()
    };
    sim.add_vehicle(&attribs, Some(segment)).unwrap()
}

#[test]
fn merges_around_a_stopped_vehicle() {
    let mut sim = Simulation::new();
    let (left, right) = two_lane_road(&mut sim);
    let blocker = parked(&mut sim, left, 12.0);
    sim.step(1.0);
    assert_approx_eq!(sim.vehicle(blocker).unwrap().location().x, 6.0);

    let me = slow_vehicle(&mut sim, left);
    let mut merged = false;
    for _ in 0..300 {
        sim.step(0.1);
        let v = sim.vehicle(me).unwrap();
        if v.segment_id() == Some(right) {
            merged = true;
            if !v.changing_lanes() {
                break;
            }
        } else {
            assert!(!merged, "vehicle went back to its old lane");
        }
    }
    assert!(merged);

    let v = sim.vehicle(me).unwrap();
    assert!(!v.changing_lanes());
    assert_approx_eq!(v.heading(), 0.0);
    assert!(v.location().y > 1.0);
    assert!(sim.segment(left).unwrap().vehicles().iter().all(|id| *id != me));
    assert!(sim.segment(right).unwrap().vehicles().contains(&me));

    // Back up to speed once the lane ahead is clear
    for _ in 0..50 {
        sim.step(0.1);
    }
    assert_approx_eq!(sim.vehicle(me).unwrap().vel(), 5.0);
}

#[test]
fn waits_while_the_other_lane_is_occupied() {
    let mut sim = Simulation::new();
    let (left, right) = two_lane_road(&mut sim);
    parked(&mut sim, left, 12.0);
    // Comes to rest across the first lane-change line of the left lane
    let beside = parked(&mut sim, right, 10.0);
    sim.step(1.0);
    assert_approx_eq!(sim.vehicle(beside).unwrap().location().x, 5.0);

    let me = slow_vehicle(&mut sim, left);
    for _ in 0..100 {
        sim.step(0.1);
        let v = sim.vehicle(me).unwrap();
        assert_eq!(v.segment_id(), Some(left));
        assert!(!v.changing_lanes());
    }
}

#[test]
fn merges_when_the_other_lane_is_clear_of_the_crossing() {
    let mut sim = Simulation::new();
    let (left, right) = two_lane_road(&mut sim);
    parked(&mut sim, left, 12.0);
    // Occupies the other lane, well down the road from the first lane-change line
    let far_ahead = parked(&mut sim, right, 120.0);
    sim.step(1.0);
    assert_approx_eq!(sim.vehicle(far_ahead).unwrap().location().x, 60.0);

    let me = slow_vehicle(&mut sim, left);
    let mut merged = false;
    for _ in 0..300 {
        sim.step(0.1);
        if sim.vehicle(me).unwrap().segment_id() == Some(right) {
            merged = true;
            break;
        }
    }
    assert!(merged);
    assert!(sim.vehicle(me).unwrap().changing_lanes());
    assert_eq!(sim.segment(right).unwrap().vehicles().len(), 2);
}

#[test]
fn no_lane_change_without_another_lane() {
    let mut sim = Simulation::new();
    let lane = sim
        .add_segment(&SegmentAttributes {
            road: "main",
            start: Point2d::new(0.0, 0.0),
            end: Point2d::new(200.0, 0.0),
            sink: true,
        })
        .unwrap();
    // A parallel lane of a different road doesn't count
    sim.add_segment(&SegmentAttributes {
        road: "other",
        start: Point2d::new(0.0, 4.0),
        end: Point2d::new(200.0, 4.0),
        sink: true,
    })
    .unwrap();
    parked(&mut sim, lane, 12.0);
    sim.step(1.0);

    let me = slow_vehicle(&mut sim, lane);
    for _ in 0..100 {
        sim.step(0.1);
        assert_eq!(sim.vehicle(me).unwrap().segment_id(), Some(lane));
    }
}
