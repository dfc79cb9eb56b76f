//! Curve sampling over the flat segment/point arrays of a [`MotionData`].
//!
//! Model:
//! - A curve's segments are ordered by time; segment i ends where segment i+1 starts.
//! - The active segment is the first one whose last point lies strictly after `time`.
//! - Past the last point the curve holds its final value (no extrapolation).

use crate::data::{MotionCurve, MotionData};

/// Sample `curve` at `time` (seconds from motion start).
pub fn evaluate_curve(data: &MotionData, curve: &MotionCurve, time: f32) -> f32 {
    let Some(first) = data.points.get(curve.base_point) else {
        return 0.0;
    };
    let segments = &data.segments[curve.base_segment..curve.base_segment + curve.segment_count];

    let mut last_value = first.value;
    // Linear scan: curves are short, tens of points.
    for segment in segments {
        let last = segment.last_point();
        if data.points[last].time > time {
            return segment.kind.evaluate(&data.points[segment.base_point..=last], time);
        }
        last_value = data.points[last].value;
    }
    last_value
}
