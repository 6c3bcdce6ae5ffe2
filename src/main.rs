use std::time::Instant;

use roadnet_sim::math::Point2d;
use roadnet_sim::util::{mph_to_mps, mps_to_mph};
use roadnet_sim::{SegmentAttributes, SegmentId, Simulation, StopLight, VehicleAttributes};

/// The fixed simulation tick, in seconds.
const TICK: f64 = 0.01;

/// How long to simulate for, in seconds.
const DURATION: f64 = 120.0;

/// Seconds between vehicles entering each lane.
const SPAWN_INTERVAL: f64 = 4.0;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut sim = Simulation::new();
    let entries = build_network(&mut sim)?;
    sim.validate()?;

    let frames = (DURATION / TICK).round() as usize;
    let spawn_every = (SPAWN_INTERVAL / TICK).round() as usize;
    let report_every = (1.0 / TICK).round() as usize;
    let mut spawned = 0;

    log::info!("Simulating {}s at a {}s tick...", DURATION, TICK);
    let start = Instant::now();
    for frame in 0..frames {
        if frame % spawn_every == 0 {
            for entry in &entries {
                let attribs = VehicleAttributes {
                    vel: mph_to_mps(20.0),
                    desired_vel: mph_to_mps(30.0),
                    ..Default::default()
                };
                let vehicle = sim.add_vehicle(&attribs, Some(*entry))?;
                sim.randomise_desired_velocity(vehicle, 0.1)?;
                spawned += 1;
            }
        }

        sim.step(TICK);

        if sim.frame() % report_every == 0 {
            let count = sim.iter_vehicles().count();
            let mean_mph = match count {
                0 => 0.0,
                n => sim.iter_vehicles().map(|v| mps_to_mph(v.vel())).sum::<f64>() / n as f64,
            };
            let lights = sim
                .iter_lights()
                .map(|(_, _, state)| format!("{:?}", state))
                .collect::<Vec<_>>()
                .join("/");
            log::info!(
                "t={:>5.1}s vehicles={:>3} mean={:>4.1}mph lights={}",
                sim.clock(),
                count,
                mean_mph,
                lights
            );
        }
    }

    let elapsed = start.elapsed();
    log::info!(
        "Done: {} frames in {:?} ({:?}/frame), {} spawned, {} still on the road",
        frames,
        elapsed,
        elapsed / frames as u32,
        spawned,
        sim.iter_vehicles().count()
    );
    Ok(())
}

/// Builds a two lane road with a signalised junction half way along.
/// Both lanes carry on straight after the junction, and the right lane may also turn right.
/// Returns the segments vehicles enter the network on.
fn build_network(sim: &mut Simulation) -> Result<Vec<SegmentId>, Box<dyn std::error::Error>> {
    let mut segment = |start: (f64, f64), end: (f64, f64), sink: bool| {
        sim.add_segment(&SegmentAttributes {
            road: "high street",
            start: Point2d::new(start.0, start.1),
            end: Point2d::new(end.0, end.1),
            sink,
        })
    };

    let left = segment((0.0, 0.0), (300.0, 0.0), false)?;
    let right = segment((0.0, -4.0), (300.0, -4.0), false)?;
    segment((300.0, 0.0), (600.0, 0.0), true)?;
    segment((300.0, -4.0), (600.0, -4.0), true)?;
    segment((300.0, -4.0), (300.0, -300.0), true)?;

    for lane in [left, right] {
        let Some(end) = sim.segment(lane).map(|s| s.end()) else {
            continue;
        };
        let light = StopLight::new(end, 20.0, 3.0, 15.0)?;
        sim.add_stop_light(lane, light)?;
    }

    Ok(vec![left, right])
}
