//! Per-frame secondary effects layered after motion evaluation.

pub mod breath;
pub mod eye_blink;
pub mod pose;

pub use breath::{Breath, BreathParameter};
pub use eye_blink::{EyeBlink, EyeState};
pub use pose::{Pose, PoseGroupPart};
