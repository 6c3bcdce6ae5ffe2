//! A deterministic, tick-driven traffic simulation over a directed graph of road segments.
//!
//! Each tick, every vehicle looks down the road for the vehicle in front,
//! for yellow and red stop lights and for sharp corners, brakes for the first
//! of those it finds, merges into a free adjacent lane when stuck behind
//! another vehicle, and otherwise drifts towards its desired velocity.

pub use cgmath;
pub use error::TopologyError;
pub use light::{LightState, StopLight};
pub use network::{Probe, RoadNetwork};
pub use params::SimulationParams;
pub use segment::{LaneLine, Segment, SegmentAttributes, LANE_LINE_SPACING, LANE_SEARCH_RADIUS};
pub use simulation::{Hazard, Simulation};
use slotmap::{new_key_type, SlotMap};
pub use slotmap::{Key, KeyData};
pub use vehicle::kinematics;
pub use vehicle::{Vehicle, VehicleAttributes};

mod debug;
mod error;
mod light;
pub mod math;
mod network;
mod params;
mod segment;
mod simulation;
pub mod util;
mod vehicle;

new_key_type! {
    /// Unique ID of a junction between [Segment]s.
    pub struct NodeId;
    /// Unique ID of a [Segment].
    pub struct SegmentId;
    /// Unique ID of a [Vehicle].
    pub struct VehicleId;
    /// Unique ID of a [StopLight].
    pub struct StopLightId;
}

type SegmentSet = SlotMap<SegmentId, Segment>;
type VehicleSet = SlotMap<VehicleId, Vehicle>;
