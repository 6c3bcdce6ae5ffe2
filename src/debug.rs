//! Geometry recorded while simulating a frame, for drawing over a visualisation.
//!
//! Recording is compiled out unless the `debug` feature is enabled.

use crate::math::{Point2d, Quad};
#[cfg(feature = "debug")]
use serde_json::{json, Value};

#[cfg(feature = "debug")]
thread_local!(
    static FRAME: std::cell::RefCell<Vec<Value>> = Default::default();
);

#[cfg(feature = "debug")]
fn record(shape: Value) {
    FRAME.with(|frame| frame.borrow_mut().push(shape));
}

/// Records a line, such as the path towards a lane change target.
#[allow(unused)]
pub fn debug_line(name: &str, from: Point2d, to: Point2d) {
    #[cfg(feature = "debug")]
    record(json!({
        "type": "line",
        "name": name,
        "p1": [from.x, from.y],
        "p2": [to.x, to.y],
    }));
}

/// Records a quad, such as the area a vehicle watches for hazards.
#[allow(unused)]
pub fn debug_quad(name: &str, quad: &Quad) {
    #[cfg(feature = "debug")]
    record(json!({
        "type": "quad",
        "name": name,
        "corners": quad.corners.map(|c| [c.x, c.y]),
    }));
}

/// Drains everything recorded since the last call, as a JSON array.
#[cfg(feature = "debug")]
pub fn take_debug_frame() -> Value {
    Value::Array(FRAME.with(|frame| frame.take()))
}
