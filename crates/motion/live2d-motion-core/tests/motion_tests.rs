use std::sync::Arc;

use live2d_motion_core::{
    data::{CurvePoint, CurveTarget, MotionCurve, MotionData, Segment, SegmentKind},
    entry::{EffectTargets, QueueEntry},
    ids::MotionHandle,
    motion::Motion,
    parameters::{ParameterDef, ParameterStore},
    sampling::evaluate_curve,
};
use live2d_test_fixtures::motions;

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn load_motion(name: &str) -> Motion {
    Motion::from_json(&motions::json(name).expect("fixture")).expect("motion parses")
}

fn mk_store() -> ParameterStore {
    ParameterStore::new(
        [
            ParameterDef::new("ParamAngleX", -30.0, 30.0, 0.0),
            ParameterDef::new("ParamBodyAngleX", -10.0, 10.0, 0.0),
            ParameterDef::new("ParamBreath", 0.0, 1.0, 0.0),
            ParameterDef::new("ParamEyeLOpen", 0.0, 1.0, 1.0),
            ParameterDef::new("ParamEyeROpen", 0.0, 1.0, 1.0),
            ParameterDef::new("ParamArmR", -10.0, 10.0, 0.0),
        ],
        [],
    )
}

fn mk_entry(motion: &Motion) -> QueueEntry {
    QueueEntry::new(MotionHandle(0), Arc::new(motion.clone()), true)
}

fn pt(time: f32, value: f32) -> CurvePoint {
    CurvePoint { time, value }
}

/// it should set the exact midpoint of a two-key linear curve
#[test]
fn linear_motion_midpoint() {
    let motion = load_motion("angle-sweep");
    let mut store = mk_store();
    let mut entry = mk_entry(&motion);
    motion.evaluate(&mut store, &EffectTargets::default(), 0.5, 1.0, &mut entry);
    assert_eq!(store.parameter_by_id("ParamAngleX"), 15.0);
    assert!(!entry.is_finished());
}

/// it should finish a non-looping motion once its duration is reached
#[test]
fn non_looping_motion_finishes() {
    let motion = load_motion("angle-sweep");
    let mut store = mk_store();
    let mut entry = mk_entry(&motion);
    motion.evaluate(&mut store, &EffectTargets::default(), 1.0, 1.0, &mut entry);
    assert_eq!(store.parameter_by_id("ParamAngleX"), 30.0);
    assert!(entry.is_finished());
}

/// it should be continuous across linear and bezier boundaries and hold stepped values
#[test]
fn curve_continuity_at_segment_boundaries() {
    let points = vec![
        pt(0.0, 0.0),
        pt(1.0, 10.0),
        pt(1.3, 12.0),
        pt(1.7, 2.0),
        pt(2.0, 5.0),
        pt(3.0, -4.0),
        pt(4.0, 8.0),
    ];
    let kinds = [
        SegmentKind::Linear,
        SegmentKind::Bezier,
        SegmentKind::Stepped,
        SegmentKind::InverseStepped,
    ];
    let mut segments = Vec::new();
    let mut base = 0;
    for kind in kinds {
        segments.push(Segment {
            kind,
            base_point: base,
        });
        base += kind.point_count() - 1;
    }
    let data = MotionData {
        duration: 4.0,
        fps: 30.0,
        curves: vec![MotionCurve {
            target: CurveTarget::Parameter,
            id: "P".into(),
            base_point: 0,
            base_segment: 0,
            segment_count: segments.len(),
            fade_in_seconds: None,
            fade_out_seconds: None,
        }],
        segments,
        points,
        ..Default::default()
    };
    let curve = &data.curves[0];
    let eps = 1e-3;

    // linear -> bezier at t=1, bezier -> stepped at t=2
    for boundary in [1.0_f32, 2.0] {
        let shared = data
            .points
            .iter()
            .find(|p| p.time == boundary)
            .map(|p| p.value)
            .unwrap();
        approx(evaluate_curve(&data, curve, boundary - eps), shared, 0.05);
        approx(evaluate_curve(&data, curve, boundary), shared, 1e-5);
    }
    // stepped holds its first value, inverse stepped shows the upcoming one
    assert_eq!(evaluate_curve(&data, curve, 2.99), 5.0);
    assert_eq!(evaluate_curve(&data, curve, 3.0), 8.0);
    assert_eq!(evaluate_curve(&data, curve, 3.5), 8.0);
    assert_eq!(evaluate_curve(&data, curve, 10.0), 8.0);
}

/// it should produce identical outputs one or more loop lengths apart
#[test]
fn looping_motion_repeats_every_duration() {
    let motion = load_motion("idle-loop");
    assert!(motion.is_loop());
    let d = motion.loop_duration();
    let targets = EffectTargets::default();
    let sample = |time: f32| {
        let mut store = mk_store();
        let mut entry = mk_entry(&motion);
        motion.evaluate(&mut store, &targets, time, 1.0, &mut entry);
        (
            store.parameter_by_id("ParamAngleX"),
            store.parameter_by_id("ParamBodyAngleX"),
            store.parameter_by_id("ParamBreath"),
        )
    };
    for t in [0.1_f32, 0.25, 0.6, 1.3, 1.75] {
        let base = sample(t);
        for k in 1..=3 {
            let shifted = sample(t + d * k as f32);
            approx(shifted.0, base.0, 1e-3);
            approx(shifted.1, base.1, 1e-3);
            approx(shifted.2, base.2, 1e-3);
        }
    }
}

/// it should rewind the entry start time when a loop completes
#[test]
fn loop_rewinds_start_and_fade_in() {
    let motion = load_motion("idle-loop");
    let mut store = mk_store();
    let mut entry = mk_entry(&motion);
    motion.evaluate(&mut store, &EffectTargets::default(), 2.5, 1.0, &mut entry);
    assert_eq!(entry.start_time(), 2.5);
    assert_eq!(entry.fade_in_start_time(), 2.5);
    assert!(!entry.is_finished());
}

/// it should fire an event only inside its half-open window
#[test]
fn event_window_is_half_open() {
    let motion = load_motion("wave");
    assert_eq!(motion.fired_events(0.5, 1.0), vec!["wave"]);
    assert!(motion.fired_events(1.0, 1.5).is_empty());
    assert!(motion.fired_events(0.0, 0.99).is_empty());
}

/// it should scale claimed eye-blink targets and blend unclaimed ones toward the strength
#[test]
fn eye_blink_strength_claims_and_fallback() {
    let motion = load_motion("wave");
    let targets = EffectTargets::new(
        vec!["ParamEyeLOpen".into(), "ParamEyeROpen".into()],
        Vec::new(),
    );
    let mut store = mk_store();
    store.set_parameter_by_id("ParamEyeROpen", 0.2, 1.0);
    let mut entry = mk_entry(&motion);

    motion.evaluate(&mut store, &targets, 0.5, 0.5, &mut entry);

    // curve value 1 * strength 0.5, blended from 1.0 with weight 0.5
    approx(store.parameter_by_id("ParamEyeLOpen"), 0.75, 1e-5);
    // no curve: 0.2 + (0.5 - 0.2) * 0.5
    approx(store.parameter_by_id("ParamEyeROpen"), 0.35, 1e-5);
    // per-curve fade of 0 ignores the motion-level weight
    approx(store.parameter_by_id("ParamArmR"), 5.0, 1e-5);
    // part opacity curves drive the parameter named after the part
    assert_eq!(store.parameter_by_id("PartArmB"), 0.0);
}

/// it should silently evaluate curves that target parameters missing from the model
#[test]
fn unknown_targets_use_phantom_slots() {
    let motion = load_motion("wave");
    let mut store = ParameterStore::new([ParameterDef::new("ParamOnly", 0.0, 1.0, 0.0)], []);
    let mut entry = mk_entry(&motion);
    motion.evaluate(&mut store, &EffectTargets::default(), 0.5, 1.0, &mut entry);
    assert_eq!(store.parameter_count(), 1);
    approx(store.parameter_by_id("ParamArmR"), 5.0, 1e-5);
}

fn mouth_store() -> ParameterStore {
    ParameterStore::new(
        [
            ParameterDef::new("ParamMouthOpenY", 0.0, 1.0, 0.0),
            ParameterDef::new("ParamMouthForm", -1.0, 1.0, 0.0),
        ],
        [],
    )
}

/// it should add the lip-sync strength to claimed targets and blend unclaimed ones toward it
#[test]
fn lip_sync_strength_claims_and_fallback() {
    let motion = load_motion("talk");
    let targets = EffectTargets::new(
        Vec::new(),
        vec!["ParamMouthOpenY".into(), "ParamMouthForm".into()],
    );
    let mut store = mouth_store();
    let mut entry = mk_entry(&motion);

    motion.evaluate(&mut store, &targets, 0.5, 0.5, &mut entry);

    // curve value 0.25 + strength 0.5, blended from 0 with weight 0.5; the
    // direct pass leaves it alone
    approx(store.parameter_by_id("ParamMouthOpenY"), 0.375, 1e-5);
    // no curve: 0 + (0.5 - 0) * 0.5
    approx(store.parameter_by_id("ParamMouthForm"), 0.25, 1e-5);
}

/// it should leave lip-sync targets untouched when the motion has no strength curve
#[test]
fn lip_sync_targets_ignored_without_strength() {
    let motion = load_motion("angle-sweep");
    let targets = EffectTargets::new(Vec::new(), vec!["ParamMouthForm".into()]);
    let mut store = mouth_store();
    store.set_parameter_by_id("ParamMouthForm", -0.4, 1.0);
    let mut entry = mk_entry(&motion);
    motion.evaluate(&mut store, &targets, 0.5, 1.0, &mut entry);
    assert_eq!(store.parameter_by_id("ParamMouthForm"), -0.4);
}
