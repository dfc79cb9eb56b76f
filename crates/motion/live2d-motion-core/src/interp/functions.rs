//! Interpolation helpers:
//! - lerp_f32 / lerp_point
//! - one evaluator per segment kind (linear, bezier, stepped, inverse stepped)
//! - easing_sine for fade envelopes

use crate::data::CurvePoint;

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Linear interpolation of (time, value) points.
#[inline]
pub fn lerp_point(a: CurvePoint, b: CurvePoint, t: f32) -> CurvePoint {
    CurvePoint {
        time: lerp_f32(a.time, b.time, t),
        value: lerp_f32(a.value, b.value, t),
    }
}

/// Sine ease used by every fade envelope. Input is clamped to [0, 1].
#[inline]
pub fn easing_sine(value: f32) -> f32 {
    if value < 0.0 {
        0.0
    } else if value > 1.0 {
        1.0
    } else {
        0.5 - 0.5 * (value * std::f32::consts::PI).cos()
    }
}

/// `t` is floored at 0 but not capped at 1; callers pass times inside the segment.
#[inline]
pub fn linear_evaluate(points: &[CurvePoint], time: f32) -> f32 {
    let (p0, p1) = (points[0], points[1]);
    let t = ((time - p0.time) / (p1.time - p0.time)).max(0.0);
    lerp_f32(p0.value, p1.value, t)
}

/// De Casteljau over four (time, value) control points; `t` is linear in time.
#[inline]
pub fn bezier_evaluate(points: &[CurvePoint], time: f32) -> f32 {
    let t = ((time - points[0].time) / (points[3].time - points[0].time)).max(0.0);

    let p01 = lerp_point(points[0], points[1], t);
    let p12 = lerp_point(points[1], points[2], t);
    let p23 = lerp_point(points[2], points[3], t);

    let p012 = lerp_point(p01, p12, t);
    let p123 = lerp_point(p12, p23, t);

    lerp_point(p012, p123, t).value
}

#[inline]
pub fn stepped_evaluate(points: &[CurvePoint], _time: f32) -> f32 {
    points[0].value
}

#[inline]
pub fn inverse_stepped_evaluate(points: &[CurvePoint], _time: f32) -> f32 {
    points[1].value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(time: f32, value: f32) -> CurvePoint {
        CurvePoint { time, value }
    }

    #[test]
    fn easing_is_clamped_and_symmetric() {
        assert_eq!(easing_sine(-1.0), 0.0);
        assert_eq!(easing_sine(2.0), 1.0);
        assert!((easing_sine(0.5) - 0.5).abs() < 1e-6);
        assert!((easing_sine(0.25) + easing_sine(0.75) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn linear_floors_t_at_zero() {
        let pts = [pt(1.0, 10.0), pt(2.0, 20.0)];
        assert_eq!(linear_evaluate(&pts, 0.0), 10.0);
        assert_eq!(linear_evaluate(&pts, 1.5), 15.0);
    }

    #[test]
    fn bezier_hits_endpoints() {
        let pts = [pt(0.0, 0.0), pt(0.3, 5.0), pt(0.6, -5.0), pt(1.0, 1.0)];
        assert_eq!(bezier_evaluate(&pts, 0.0), 0.0);
        assert!((bezier_evaluate(&pts, 1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn stepped_variants_pick_one_side() {
        let pts = [pt(0.0, 3.0), pt(1.0, 7.0)];
        assert_eq!(stepped_evaluate(&pts, 0.9), 3.0);
        assert_eq!(inverse_stepped_evaluate(&pts, 0.1), 7.0);
    }
}
