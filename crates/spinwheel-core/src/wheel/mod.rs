use std::f64::consts::PI;

pub mod easing;
pub mod geometry;
pub mod segment;
pub mod spin;

pub use easing::{Easing, Tween};
pub use geometry::WheelGeometry;
pub use segment::{Segment, SegmentColor, SegmentLabel, Wheel};
pub use spin::{
    Motion, SpinController, SpinError, SpinPhase, SpinPlan, SpinResult, SpinStart, WheelState,
};

pub const FULL_TURN: f64 = 2.0 * PI;
pub const FULL_TURN_DEGREES: f64 = 360.0;
/// Quarter turn applied to the face so segment 0 sits under the pointer at 12 o'clock.
pub const START_OFFSET: f64 = -PI / 2.0;
