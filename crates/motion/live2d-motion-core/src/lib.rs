//! Live2D motion core (renderer-agnostic)
//!
//! Turns time plus a queue of playing motions, expressions and secondary effects into one
//! coherent set of parameter values and part opacities per frame. Everything here is
//! single-threaded and frame-driven: callers own the [`ParameterStore`] and run the layers
//! in a fixed order (see `live2d-model-core` for the facade that does so).

pub mod config;
pub mod data;
pub mod effects;
pub mod entry;
pub mod error;
pub mod expression;
pub mod ids;
pub mod interp;
pub mod motion;
pub mod motion_json;
pub mod parameters;
pub mod physics;
pub mod queue;
pub mod sampling;

// Re-exports for consumers (the model facade and hosts)
pub use config::{BlinkPolarity, EyeBlinkConfig};
pub use data::{CurvePoint, CurveTarget, MotionCurve, MotionData, MotionEvent, Segment, SegmentKind};
pub use effects::{Breath, BreathParameter, EyeBlink, EyeState, Pose, PoseGroupPart};
pub use entry::{EffectTargets, EntryState, Playable, QueueEntry};
pub use error::{MotionError, Result};
pub use expression::{Expression, ExpressionBlend, ExpressionManager, ExpressionParameter};
pub use ids::{MotionHandle, ParameterIndex, PartIndex};
pub use motion::{Motion, EYE_BLINK_CURVE_ID, LIP_SYNC_CURVE_ID};
pub use motion_json::parse_motion_json;
pub use parameters::{ParameterBounds, ParameterDef, ParameterStore, PartDef};
pub use physics::Physics;
pub use queue::{FiredEvent, MotionQueueManager};
pub use sampling::evaluate_curve;
