//! Errors raised while building a road network.

use crate::math::Point2d;
use crate::{SegmentId, VehicleId};
use thiserror::Error;

/// A problem with the topology of the road network, detected at load time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TopologyError {
    /// Lookahead over a zero-length segment never consumes any distance.
    #[error("segment starting at {start:?} has zero length")]
    ZeroLengthSegment { start: Point2d },
    #[error("segment {0:?} does not exist")]
    UnknownSegment(SegmentId),
    #[error("vehicle {0:?} does not exist")]
    UnknownVehicle(VehicleId),
    /// The segment has no continuation but was not declared a sink.
    #[error("segment {0:?} ends where no other segment starts and is not a sink")]
    UnexpectedSink(SegmentId),
    #[error("stop light at {location:?} does not lie on segment {segment:?}")]
    LightOffSegment { segment: SegmentId, location: Point2d },
    #[error("segment {0:?} already has a stop light")]
    LightAlreadyPresent(SegmentId),
    #[error("stop light phases must be non-negative and sum to a positive cycle")]
    InvalidLightCycle,
}
