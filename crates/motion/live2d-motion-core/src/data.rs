//! Parsed motion timelines.
//!
//! A motion stores all curves' points and segments in two flat arrays; each curve owns a
//! contiguous run of segments, and each segment owns 2 (linear/stepped) or 4 (bezier)
//! consecutive points, sharing its first point with the previous segment's last point.

use serde::{Deserialize, Serialize};

use crate::interp::functions::{
    bezier_evaluate, inverse_stepped_evaluate, linear_evaluate, stepped_evaluate,
};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub time: f32,
    pub value: f32,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum SegmentKind {
    Linear,
    Bezier,
    Stepped,
    InverseStepped,
}

impl SegmentKind {
    /// Kind for a motion3 segment type code.
    pub fn from_code(code: f32) -> Option<Self> {
        match code {
            c if c == 0.0 => Some(SegmentKind::Linear),
            c if c == 1.0 => Some(SegmentKind::Bezier),
            c if c == 2.0 => Some(SegmentKind::Stepped),
            c if c == 3.0 => Some(SegmentKind::InverseStepped),
            _ => None,
        }
    }

    /// Number of points the segment owns, its first point included.
    #[inline]
    pub fn point_count(self) -> usize {
        match self {
            SegmentKind::Bezier => 4,
            _ => 2,
        }
    }

    #[inline]
    pub fn evaluate(self, points: &[CurvePoint], time: f32) -> f32 {
        match self {
            SegmentKind::Linear => linear_evaluate(points, time),
            SegmentKind::Bezier => bezier_evaluate(points, time),
            SegmentKind::Stepped => stepped_evaluate(points, time),
            SegmentKind::InverseStepped => inverse_stepped_evaluate(points, time),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub base_point: usize,
}

impl Segment {
    #[inline]
    pub fn last_point(&self) -> usize {
        self.base_point + self.kind.point_count() - 1
    }
}

/// Evaluation group of a curve. The declaration order is the evaluation order.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum CurveTarget {
    Model,
    Parameter,
    PartOpacity,
}

impl CurveTarget {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Model" => Some(CurveTarget::Model),
            "Parameter" => Some(CurveTarget::Parameter),
            "PartOpacity" => Some(CurveTarget::PartOpacity),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotionCurve {
    pub target: CurveTarget,
    pub id: String,
    /// First point of the curve; the only point when `segment_count` is 0.
    pub base_point: usize,
    pub base_segment: usize,
    pub segment_count: usize,
    /// Per-curve fade overrides. When both are `None` the motion-level weight applies.
    pub fade_in_seconds: Option<f32>,
    pub fade_out_seconds: Option<f32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotionEvent {
    pub fire_time: f32,
    pub value: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MotionData {
    pub duration: f32,
    pub fps: f32,
    pub is_loop: bool,
    pub fade_in_seconds: f32,
    pub fade_out_seconds: f32,
    pub curves: Vec<MotionCurve>,
    pub segments: Vec<Segment>,
    pub points: Vec<CurvePoint>,
    pub events: Vec<MotionEvent>,
}
