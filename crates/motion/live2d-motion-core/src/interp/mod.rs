//! Interpolation primitives used by curve sampling and fade envelopes.

pub mod functions;

pub use functions::{easing_sine, lerp_f32, lerp_point};
