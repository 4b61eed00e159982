use super::{FULL_TURN, FULL_TURN_DEGREES, START_OFFSET};
use crate::config::SpinDirection;

/// Maps between segment indices and angular positions on a wheel of `segment_count` equal
/// slices. Angles are measured from the pointer in the direction of increasing index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WheelGeometry {
    segment_count: usize,
}

impl WheelGeometry {
    pub fn new(segment_count: usize) -> Self {
        Self {
            segment_count: segment_count.max(1),
        }
    }

    pub fn segment_count(&self) -> usize {
        self.segment_count
    }

    pub fn slice_width(&self) -> f64 {
        FULL_TURN / self.segment_count as f64
    }

    pub fn slice_degrees(&self) -> f64 {
        FULL_TURN_DEGREES / self.segment_count as f64
    }

    /// Centre of segment `index` relative to the pointer, at zero rotation.
    pub fn center_angle(&self, index: usize) -> f64 {
        (index % self.segment_count) as f64 * self.slice_width()
    }

    /// Angle of a segment centre on the unrotated face, in drawing coordinates (0 at
    /// 3 o'clock, clockwise). Indices run with the spin direction, so a counterclockwise
    /// wheel is laid out mirrored.
    pub fn draw_angle(&self, index: usize, direction: SpinDirection) -> f64 {
        START_OFFSET - direction.sign() * self.center_angle(index)
    }

    /// Where a segment centre sits on screen once the face has turned by `rotation`.
    ///
    /// The face is drawn turned by `-rotation`: negative accumulation shows as a clockwise
    /// turn, positive as counterclockwise.
    pub fn screen_angle(&self, index: usize, rotation: f64, direction: SpinDirection) -> f64 {
        self.draw_angle(index, direction) - rotation
    }

    /// Reduces any rotation to degrees in `[0, 360)`. The sign of the rotation is dropped.
    pub fn reduce_degrees(rotation: f64) -> f64 {
        if !rotation.is_finite() {
            return 0.0;
        }
        rotation.abs().to_degrees().rem_euclid(FULL_TURN_DEGREES)
    }

    /// Index of the segment under the pointer once the wheel has turned by `rotation` radians.
    ///
    /// The face advances past the pointer against index order, so each slice of rotation
    /// steps the winner back by one. Exact half-slice ties round up to the next step.
    pub fn winning_index(&self, rotation: f64) -> usize {
        self.index_at_degrees(Self::reduce_degrees(rotation))
    }

    /// `winning_index` for a rotation already reduced to `[0, 360)` degrees.
    pub fn index_at_degrees(&self, degrees: f64) -> usize {
        let n = self.segment_count;
        if !degrees.is_finite() {
            return 0;
        }
        // non-negative, so round() is round-half-up
        let steps = (degrees.abs() / self.slice_degrees()).round() as usize;
        (n - steps % n) % n
    }

    /// Offset in `[0, 2π)` that `winning_index` resolves to `index`.
    pub fn target_offset(&self, index: usize) -> f64 {
        let n = self.segment_count;
        ((n - index % n) % n) as f64 * self.slice_width()
    }
}
