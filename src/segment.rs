use crate::math::{rot90, LineSegment2d, Point2d, Vector2d};
use crate::{NodeId, SegmentId, StopLightId, VehicleId};
use cgmath::prelude::*;
use smallvec::SmallVec;

/// How far either side of a segment its lane-change lines reach, in m.
/// Parallel segments within this distance are candidate lanes to merge into.
pub const LANE_SEARCH_RADIUS: f64 = 20.0;

/// The longitudinal spacing between lane-change lines, in m.
pub const LANE_LINE_SPACING: f64 = 10.0;

/// A segment is a single directed lane of road between two points.
#[derive(Clone, Debug)]
pub struct Segment {
    /// The segment ID.
    id: SegmentId,
    /// The name of the road this lane belongs to.
    road: String,
    /// The centre line of the segment.
    line: LineSegment2d,
    /// The graph node at the start of the segment.
    start_node: NodeId,
    /// The graph node at the end of the segment.
    end_node: NodeId,
    /// Heading in degrees.
    heading: f64,
    /// Unit vector along the segment.
    dir: Vector2d,
    /// Short cross lines used to find adjacent lanes.
    lane_lines: SmallVec<[LaneLine; 8]>,
    /// The stop light at the end of this segment, if there is one.
    light: Option<StopLightId>,
    /// Whether vehicles are expected to leave the network at the end of this segment.
    sink: bool,
    /// The vehicles currently on the segment.
    vehicles: Vec<VehicleId>,
}

/// The attributes of a segment.
pub struct SegmentAttributes<'a> {
    /// The name of the road; lane changes only happen between lanes of the same road.
    pub road: &'a str,
    /// The start point of the segment.
    pub start: Point2d,
    /// The end point of the segment.
    pub end: Point2d,
    /// Whether the segment deliberately has no continuation.
    pub sink: bool,
}

/// A lane-change line: a short line perpendicular to a segment.
#[derive(Clone, Copy, Debug)]
pub struct LaneLine {
    /// The line itself, running from right to left across the segment.
    pub line: LineSegment2d,
    /// Where the line crosses its own segment.
    pub centre: Point2d,
}

impl Segment {
    /// Creates a new segment. The length must be positive.
    pub(crate) fn new(
        id: SegmentId,
        start_node: NodeId,
        end_node: NodeId,
        attribs: &SegmentAttributes,
    ) -> Self {
        let line = LineSegment2d::from_ends(attribs.start, attribs.end);
        let dir = line.direction();
        Self {
            id,
            road: attribs.road.to_owned(),
            line,
            start_node,
            end_node,
            heading: line.heading(),
            dir,
            lane_lines: lane_lines(&line, dir),
            light: None,
            sink: attribs.sink,
            vehicles: vec![],
        }
    }

    /// Gets the segment's ID.
    pub fn id(&self) -> SegmentId {
        self.id
    }

    /// The name of the road the segment belongs to.
    pub fn road(&self) -> &str {
        &self.road
    }

    pub fn start(&self) -> Point2d {
        self.line.start
    }

    pub fn end(&self) -> Point2d {
        self.line.end
    }

    /// The centre line of the segment.
    pub fn line(&self) -> &LineSegment2d {
        &self.line
    }

    /// The graph node the segment starts at.
    pub fn start_node(&self) -> NodeId {
        self.start_node
    }

    /// The graph node the segment ends at.
    pub fn end_node(&self) -> NodeId {
        self.end_node
    }

    /// The heading of the segment in degrees.
    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// A unit vector pointing along the segment.
    pub fn direction(&self) -> Vector2d {
        self.dir
    }

    /// Gets the length of the segment in m.
    pub fn length(&self) -> f64 {
        self.line.length()
    }

    /// The lane-change lines of the segment, ordered from start to end.
    pub fn lane_lines(&self) -> &[LaneLine] {
        &self.lane_lines
    }

    /// The stop light on this segment, if there is one.
    pub fn stop_light(&self) -> Option<StopLightId> {
        self.light
    }

    pub(crate) fn set_stop_light(&mut self, light: StopLightId) {
        self.light = Some(light);
    }

    /// Whether the segment was declared as an exit from the network.
    pub fn is_sink(&self) -> bool {
        self.sink
    }

    /// The vehicles currently attached to the segment.
    pub fn vehicles(&self) -> &[VehicleId] {
        &self.vehicles
    }

    /// The straight line distance from `point` to the end of the segment.
    pub fn distance_to_end(&self, point: Point2d) -> f64 {
        point.distance(self.line.end)
    }

    /// Checks whether `point` has travelled past the end of the segment.
    ///
    /// The comparison is made along whichever axis the segment changes most in,
    /// so a vehicle which drifts sideways is not mistaken for one that overshot.
    pub fn is_beyond(&self, point: Point2d) -> bool {
        let (start, end) = (self.line.start, self.line.end);
        let delta = end - start;
        if delta.x.abs() > delta.y.abs() {
            if start.x < end.x {
                point.x > end.x
            } else {
                point.x < end.x
            }
        } else if start.y < end.y {
            point.y > end.y
        } else {
            point.y < end.y
        }
    }

    /// Inserts the vehicle with the given ID into the segment.
    pub(crate) fn insert_vehicle(&mut self, id: VehicleId) {
        if !self.vehicles.contains(&id) {
            self.vehicles.push(id);
        }
    }

    /// Removes the vehicle with the given ID from the segment.
    pub(crate) fn remove_vehicle(&mut self, id: VehicleId) {
        if let Some(idx) = self.vehicles.iter().rposition(|v| *v == id) {
            self.vehicles.remove(idx);
        }
    }
}

/// Builds the lane-change lines along a segment.
fn lane_lines(line: &LineSegment2d, dir: Vector2d) -> SmallVec<[LaneLine; 8]> {
    let length = line.length();
    let reach = LANE_SEARCH_RADIUS * rot90(dir);
    let count = usize::max((length / LANE_LINE_SPACING).ceil() as usize, 1);
    let spacing = length / count as f64;
    (0..count)
        .map(|i| (i as f64 + 0.5) * spacing)
        .map(|pos| line.start + pos * dir)
        .map(|centre| LaneLine {
            line: LineSegment2d::from_ends(centre - reach, centre + reach),
            centre,
        })
        .collect()
}
