use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use live2d_model_core::{
    CanvasInfo, CoreModel, FrameworkContext, Live2DModel, MeshDef, ModelConfig, ModelError,
    ModelSettings, MorphMesh, UserData,
};
use live2d_motion_core::{
    EffectTargets, EyeBlink, EyeBlinkConfig, Expression, Motion, ParameterDef, PartDef, Physics,
    Playable, Pose,
};
use live2d_test_fixtures::{expressions, models, motions, physics, poses};
use nalgebra::Vector2;

const ANGLE_X: usize = 0;
const EYE_L: usize = 2;
const MOUTH_OPEN: usize = 4;
const MOUTH_FORM: usize = 5;
const HAIR: usize = 7;

fn approx(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

fn mk_core(eye_default: f32) -> MorphMesh {
    MorphMesh::new(
        CanvasInfo {
            width_pixels: 200.0,
            height_pixels: 200.0,
            origin_pixels: Vector2::new(100.0, 100.0),
            pixels_per_unit: 100.0,
        },
        vec![
            ParameterDef::new("ParamAngleX", -30.0, 30.0, 0.0),
            ParameterDef::new("ParamAngleZ", -30.0, 30.0, 0.0),
            ParameterDef::new("ParamEyeLOpen", 0.0, 1.0, eye_default),
            ParameterDef::new("ParamEyeROpen", 0.0, 1.0, eye_default),
            ParameterDef::new("ParamMouthOpenY", 0.0, 1.0, 0.0),
            ParameterDef::new("ParamMouthForm", -1.0, 1.0, 0.0),
            ParameterDef::new("ParamArmR", -10.0, 10.0, 0.0),
            ParameterDef::new("ParamHairFront", -1.0, 1.0, 0.0),
            ParameterDef::new("PartArmA", 0.0, 1.0, 0.0),
            ParameterDef::new("PartArmB", 0.0, 1.0, 0.0),
        ],
        vec![
            PartDef::new("PartArmA", 1.0),
            PartDef::new("PartArmB", 1.0),
            PartDef::new("PartSleeveA", 1.0),
        ],
        vec![
            MeshDef::new("ArtMeshFace", vec![0.0, 0.0, 1.0, 1.0])
                .with_morph(ANGLE_X, vec![0.01, 0.0, 0.01, 0.0]),
            MeshDef::new("ArtMeshArmA", vec![0.5, 0.5]).with_part(0),
        ],
    )
}

fn quiet_config() -> ModelConfig {
    ModelConfig {
        breath: false,
        ..ModelConfig::default()
    }
}

fn motion(name: &str) -> Arc<dyn Playable> {
    let json = motions::json(name).expect("motion fixture");
    Arc::new(Motion::from_json(&json).unwrap())
}

fn settings() -> ModelSettings {
    ModelSettings::from_json(&models::json("sample").expect("model fixture")).unwrap()
}

/// it should refuse to build a model before the framework is initialized
#[test]
fn model_requires_initialized_framework() {
    let mut ctx = FrameworkContext::new();
    let err = Live2DModel::new(&ctx, mk_core(1.0), ModelConfig::default()).unwrap_err();
    assert!(matches!(err, ModelError::FrameworkNotInitialized));

    ctx.start_up(None);
    assert!(Live2DModel::new(&ctx, mk_core(1.0), ModelConfig::default()).is_err());
    ctx.initialize();
    assert!(Live2DModel::new(&ctx, mk_core(1.0), ModelConfig::default()).is_ok());
}

/// it should wire effect targets, eye-blink and layout from the settings document
#[test]
fn settings_fixture_configures_model() {
    let ctx = FrameworkContext::ready();
    let model = Live2DModel::with_settings(&ctx, mk_core(1.0), settings(), quiet_config()).unwrap();

    let targets = model.motions().effect_targets();
    assert_eq!(targets.eye_blink, vec!["ParamEyeLOpen", "ParamEyeROpen"]);
    assert_eq!(targets.lip_sync, vec!["ParamMouthOpenY"]);

    // 2x2 unit canvas, Width 2 and centred on the origin
    let m = model.matrix();
    assert_eq!(m.scale_x(), 1.0);
    assert_eq!(m.transform_point(Vector2::new(1.0, 1.0)), Vector2::new(0.0, 0.0));

    let s = model.settings().unwrap();
    assert_eq!(s.motion("Idle", 0).and_then(|r| r.fade_in_seconds), Some(0.8));
    assert_eq!(s.hit_area_name("HitAreaHead"), Some("Head"));
}

/// it should route the lip-sync strength through the claim set configured on the model
#[test]
fn lip_sync_targets_follow_the_model() {
    let ctx = FrameworkContext::ready();
    let mut model =
        Live2DModel::with_settings(&ctx, mk_core(1.0), settings(), quiet_config()).unwrap();
    model.start_motion(motion("talk"));

    model.update(0.0).unwrap();
    let frame = model.update(0.5).unwrap();
    // claimed: curve 0.25 plus strength 0.5
    assert!(approx(frame.parameters[MOUTH_OPEN], 0.75, 1e-5));
    assert_eq!(frame.parameters[MOUTH_FORM], 0.0);

    model.set_effect_targets(EffectTargets::new(Vec::new(), vec!["ParamMouthForm".into()]));
    let frame = model.update(0.5).unwrap();
    // no longer a target: plain curve value
    assert!(approx(frame.parameters[MOUTH_OPEN], 0.25, 1e-5));
    // unclaimed target: blended straight to the strength
    assert!(approx(frame.parameters[MOUTH_FORM], 0.5, 1e-5));
}

/// it should let physics see the value written by the motion in the same frame
#[test]
fn physics_runs_after_motions() {
    let ctx = FrameworkContext::ready();
    let mut model = Live2DModel::new(&ctx, mk_core(1.0), quiet_config()).unwrap();
    model.set_physics(Physics::from_json(&physics::json("hair").unwrap()).unwrap());
    model.start_motion(motion("angle-sweep"));

    model.update(0.0).unwrap();
    let frame = model.update(0.5).unwrap();
    assert_eq!(frame.parameters[ANGLE_X], 15.0);
    assert!(frame.motion_updated);
    assert!(frame.parameters[HAIR] < 0.0, "hair={}", frame.parameters[HAIR]);
}

/// it should not let additive layers accumulate across frames
#[test]
fn breath_restarts_from_snapshot_each_frame() {
    let ctx = FrameworkContext::ready();
    let mut model = Live2DModel::new(&ctx, mk_core(1.0), ModelConfig::default()).unwrap();

    let first = model.update(1.0).unwrap().parameters[ANGLE_X];
    let expected = 15.0 * (std::f32::consts::TAU / 6.5345).sin() * 0.5;
    assert!(approx(first, expected, 1e-4), "first={first}");

    let again = model.update(0.0).unwrap().parameters[ANGLE_X];
    assert!(approx(again, first, 1e-6));
    assert_eq!(model.store().values()[ANGLE_X], 0.0);
}

/// it should hold eye-blink back while a motion plays unless configured otherwise
#[test]
fn eye_blink_waits_for_motions() {
    let ctx = FrameworkContext::ready();
    let mut model =
        Live2DModel::with_settings(&ctx, mk_core(0.3), settings(), quiet_config()).unwrap();
    let handle = model.start_motion(motion("angle-sweep"));

    model.update(0.0).unwrap();
    let during = model.update(0.5).unwrap().parameters[EYE_L];
    assert_eq!(during, 0.3);

    model.update(0.5).unwrap();
    assert!(model.is_motion_finished(handle));
    let frame = model.update(0.1).unwrap();
    assert!(!frame.motion_updated);
    assert_eq!(frame.parameters[EYE_L], 1.0);

    let config = ModelConfig {
        blink_during_motion: true,
        ..quiet_config()
    };
    let mut model = Live2DModel::with_settings(&ctx, mk_core(0.3), settings(), config).unwrap();
    model.set_eye_blink(Some(EyeBlink::with_seed(
        vec!["ParamEyeLOpen".into()],
        EyeBlinkConfig::default(),
        5,
    )));
    model.start_motion(motion("angle-sweep"));
    model.update(0.0).unwrap();
    assert_eq!(model.update(0.1).unwrap().parameters[EYE_L], 1.0);
}

/// it should report only drawables whose flags changed
#[test]
fn changed_drawables_follow_flags() {
    let ctx = FrameworkContext::ready();
    let mut model = Live2DModel::new(&ctx, mk_core(1.0), quiet_config()).unwrap();

    assert_eq!(model.update(0.0).unwrap().changed_drawables, vec![0, 1]);
    assert!(model.update(0.1).unwrap().changed_drawables.is_empty());

    model.start_motion(motion("angle-sweep"));
    model.update(0.0).unwrap();
    let frame = model.update(0.25).unwrap();
    assert_eq!(frame.changed_drawables, vec![0]);
}

/// it should drive pose opacities and hide drawables of hidden parts
#[test]
fn pose_hides_parts_through_the_core() {
    let ctx = FrameworkContext::ready();
    let mut model = Live2DModel::new(&ctx, mk_core(1.0), quiet_config()).unwrap();
    model.set_pose(Pose::from_json(&poses::json("arms").unwrap()).unwrap());

    let frame = model.update(0.0).unwrap();
    assert_eq!(frame.part_opacities, vec![1.0, 0.0, 1.0]);

    model.store_mut().set_parameter_by_id("PartArmA", 0.0, 1.0);
    model.store_mut().set_parameter_by_id("PartArmB", 1.0, 1.0);
    model.update(0.5).unwrap();
    let arm = &model.core().drawables()[1];
    assert_eq!(arm.opacity, 0.0);
    assert!(!arm.flags.is_visible);
}

/// it should crossfade expressions on their own queue and forward motion events
#[test]
fn expressions_and_events() {
    let ctx = FrameworkContext::ready();
    let mut model =
        Live2DModel::with_settings(&ctx, mk_core(1.0), settings(), quiet_config()).unwrap();
    model.set_expressions(
        ["smile", "surprised"]
            .into_iter()
            .map(|name| {
                let json = expressions::json(name).unwrap();
                (name.to_string(), Expression::from_json(&json).unwrap())
            }),
    );
    assert!(model.set_expression("angry").is_none());
    assert!(model.set_expression("smile").is_some());

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    model.set_motion_event_callback(move |e| sink.borrow_mut().push(e.value.clone()));
    model.start_motion(motion("wave"));

    model.update(0.0).unwrap();
    model.update(0.5).unwrap();
    let frame = model.update(0.5).unwrap();
    assert_eq!(frame.parameters[MOUTH_FORM], 1.0);
    assert_eq!(frame.events.len(), 1);
    assert_eq!(frame.events[0].value, "wave");
    assert_eq!(*seen.borrow(), vec!["wave".to_string()]);
    assert_eq!(model.expressions().current(), Some("smile"));
}

/// it should keep user data entries aimed at art meshes apart
#[test]
fn user_data_fixture() {
    let data = UserData::from_json(&models::json("sample-user-data").unwrap()).unwrap();
    assert_eq!(data.nodes().len(), 2);
    let meshes: Vec<_> = data.art_mesh_nodes().map(|n| n.target_id.as_str()).collect();
    assert_eq!(meshes, vec!["ArtMeshFace"]);
    assert_eq!(data.value_for("PartArmA"), Some("left arm"));
}
