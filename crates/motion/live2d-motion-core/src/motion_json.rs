//! motion3.json parsing.
//!
//! Raw serde structs mirror the document; [`parse_motion_json`] converts them into the flat
//! [`MotionData`] layout and validates segment arrays on the way.
//!
//! Segment arrays start with the first point `(time, value)`, followed by repeated
//! `code, t, v[, t, v, t, v]` tuples: 0 linear, 1 bezier (three points), 2 stepped,
//! 3 inverse stepped.

use serde::Deserialize;

use crate::data::{CurvePoint, CurveTarget, MotionCurve, MotionData, MotionEvent, Segment, SegmentKind};
use crate::error::{MotionError, Result};

/// Fade length used when a document omits a fade time or gives a negative one.
pub const DEFAULT_FADE_SECONDS: f32 = 1.0;

fn default_fps() -> f32 {
    30.0
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawMotion {
    meta: RawMeta,
    #[serde(default)]
    curves: Vec<RawCurve>,
    #[serde(default)]
    user_data: Vec<RawUserData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawMeta {
    duration: f32,
    #[serde(default = "default_fps")]
    fps: f32,
    #[serde(rename = "Loop", default)]
    is_loop: bool,
    #[serde(default)]
    fade_in_time: Option<f32>,
    #[serde(default)]
    fade_out_time: Option<f32>,
    #[serde(default)]
    curve_count: Option<usize>,
    #[serde(default)]
    total_segment_count: Option<usize>,
    #[serde(default)]
    total_point_count: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawCurve {
    target: String,
    id: String,
    #[serde(default)]
    fade_in_time: Option<f32>,
    #[serde(default)]
    fade_out_time: Option<f32>,
    segments: Vec<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawUserData {
    time: f32,
    value: String,
}

/// Parse a motion3.json document.
///
/// Curves with an unknown target are skipped with a warning. Curves are stably grouped by
/// target (Model, Parameter, PartOpacity) so evaluation order never depends on file order.
pub fn parse_motion_json(s: &str) -> Result<MotionData> {
    let raw: RawMotion = serde_json::from_str(s)?;
    let meta = raw.meta;
    if !(meta.duration >= 0.0) {
        return Err(MotionError::InvalidMotion(format!(
            "duration must be non-negative, got {}",
            meta.duration
        )));
    }

    let mut curves: Vec<(CurveTarget, RawCurve)> = raw
        .curves
        .into_iter()
        .filter_map(|curve| match CurveTarget::from_name(&curve.target) {
            Some(target) => Some((target, curve)),
            None => {
                log::warn!(
                    "skipping motion curve '{}' with unknown target '{}'",
                    curve.id,
                    curve.target
                );
                None
            }
        })
        .collect();
    curves.sort_by_key(|(target, _)| *target);

    let mut data = MotionData {
        duration: meta.duration,
        fps: meta.fps,
        is_loop: meta.is_loop,
        fade_in_seconds: fade_or_default(meta.fade_in_time),
        fade_out_seconds: fade_or_default(meta.fade_out_time),
        ..Default::default()
    };

    for (target, curve) in curves {
        let base_point = data.points.len();
        let base_segment = data.segments.len();
        push_segments(&mut data, &curve.id, &curve.segments)?;
        data.curves.push(MotionCurve {
            target,
            id: curve.id,
            base_point,
            base_segment,
            segment_count: data.segments.len() - base_segment,
            fade_in_seconds: curve.fade_in_time.filter(|v| *v >= 0.0),
            fade_out_seconds: curve.fade_out_time.filter(|v| *v >= 0.0),
        });
    }

    data.events = raw
        .user_data
        .into_iter()
        .map(|u| MotionEvent {
            fire_time: u.time,
            value: u.value,
        })
        .collect();

    check_count("curve", meta.curve_count, data.curves.len());
    check_count("segment", meta.total_segment_count, data.segments.len());
    check_count("point", meta.total_point_count, data.points.len());
    Ok(data)
}

fn fade_or_default(value: Option<f32>) -> f32 {
    value.filter(|v| *v >= 0.0).unwrap_or(DEFAULT_FADE_SECONDS)
}

// Meta counts are advisory; the curve arrays are authoritative.
fn check_count(kind: &str, declared: Option<usize>, actual: usize) {
    if let Some(declared) = declared {
        if declared != actual {
            log::debug!("motion meta declares {declared} {kind}s, found {actual}");
        }
    }
}

fn push_segments(data: &mut MotionData, id: &str, raw: &[f32]) -> Result<()> {
    if raw.len() < 2 {
        return Err(MotionError::InvalidMotion(format!(
            "curve '{id}' has no first point"
        )));
    }
    data.points.push(CurvePoint {
        time: raw[0],
        value: raw[1],
    });

    let mut pos = 2;
    while pos < raw.len() {
        let kind = SegmentKind::from_code(raw[pos]).ok_or_else(|| {
            MotionError::InvalidMotion(format!(
                "curve '{id}' has unknown segment type {} at {pos}",
                raw[pos]
            ))
        })?;
        let end = pos + 1 + (kind.point_count() - 1) * 2;
        let values = raw.get(pos + 1..end).ok_or_else(|| {
            MotionError::InvalidMotion(format!("curve '{id}' is truncated at {pos}"))
        })?;

        data.segments.push(Segment {
            kind,
            base_point: data.points.len() - 1,
        });
        data.points.extend(values.chunks_exact(2).map(|pair| CurvePoint {
            time: pair[0],
            value: pair[1],
        }));
        pos = end;
    }
    Ok(())
}
