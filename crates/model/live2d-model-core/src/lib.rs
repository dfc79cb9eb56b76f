//! Live2D model facade (renderer-agnostic)
//!
//! Wraps an opaque [`CoreModel`] with the evaluation layers of `live2d-motion-core` and
//! runs them once per frame in a fixed order. Settings, user data and layout documents are
//! parsed here; textures, rendering and asset loading belong to the host.

pub mod config;
pub mod core_model;
pub mod drawable;
pub mod error;
pub mod frame;
pub mod framework;
pub mod matrix;
pub mod model;
pub mod morph_mesh;
pub mod settings;
pub mod user_data;

pub use config::ModelConfig;
pub use core_model::{CanvasInfo, CoreModel};
pub use drawable::{BlendMode, Drawable, DynamicFlags};
pub use error::{ModelError, Result};
pub use frame::ModelFrame;
pub use framework::{FrameworkContext, StartupOptions};
pub use matrix::ModelMatrix;
pub use model::Live2DModel;
pub use morph_mesh::{MeshDef, MorphMesh, VertexMorph};
pub use settings::{ExpressionRef, HitArea, ModelSettings, MotionRef, ParameterGroup};
pub use user_data::{UserData, UserDataNode};
