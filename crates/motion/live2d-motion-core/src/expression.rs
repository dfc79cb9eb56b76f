//! Expressions: time-invariant parameter operations layered over the motion result.
//!
//! An expression plays through its own [`MotionQueueManager`], so switching expressions
//! crossfades exactly like switching motions, without touching the motion queue.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::entry::{EffectTargets, Playable, QueueEntry};
use crate::error::Result;
use crate::ids::MotionHandle;
use crate::motion_json::DEFAULT_FADE_SECONDS;
use crate::parameters::ParameterStore;
use crate::queue::MotionQueueManager;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum ExpressionBlend {
    Add,
    Multiply,
    Overwrite,
}

impl ExpressionBlend {
    /// Unrecognized names fall back to `Add`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Add" => ExpressionBlend::Add,
            "Multiply" => ExpressionBlend::Multiply,
            "Overwrite" => ExpressionBlend::Overwrite,
            other => {
                log::warn!("unknown expression blend '{other}', using Add");
                ExpressionBlend::Add
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpressionParameter {
    pub id: String,
    pub value: f32,
    pub blend: ExpressionBlend,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawExpression {
    #[serde(default)]
    fade_in_time: Option<f32>,
    #[serde(default)]
    fade_out_time: Option<f32>,
    #[serde(default)]
    parameters: Vec<RawExpressionParameter>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawExpressionParameter {
    id: String,
    value: f32,
    #[serde(default)]
    blend: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub fade_in_seconds: f32,
    pub fade_out_seconds: f32,
    pub parameters: Vec<ExpressionParameter>,
}

impl Expression {
    pub fn new(parameters: Vec<ExpressionParameter>) -> Self {
        Self {
            fade_in_seconds: DEFAULT_FADE_SECONDS,
            fade_out_seconds: DEFAULT_FADE_SECONDS,
            parameters,
        }
    }

    /// Parse an exp3.json document. Missing fade times default to one second; zero or negative
    /// times fade instantly.
    pub fn from_json(s: &str) -> Result<Self> {
        let raw: RawExpression = serde_json::from_str(s)?;
        let fade = |v: Option<f32>| v.unwrap_or(DEFAULT_FADE_SECONDS);
        Ok(Self {
            fade_in_seconds: fade(raw.fade_in_time),
            fade_out_seconds: fade(raw.fade_out_time),
            parameters: raw
                .parameters
                .into_iter()
                .map(|p| ExpressionParameter {
                    blend: p
                        .blend
                        .as_deref()
                        .map_or(ExpressionBlend::Add, ExpressionBlend::from_name),
                    id: p.id,
                    value: p.value,
                })
                .collect(),
        })
    }

    /// Apply every operation with `weight`.
    pub fn apply_to(&self, store: &mut ParameterStore, weight: f32) {
        for p in &self.parameters {
            match p.blend {
                ExpressionBlend::Add => store.add_parameter_by_id(&p.id, p.value, weight),
                ExpressionBlend::Multiply => store.multiply_parameter_by_id(&p.id, p.value, weight),
                ExpressionBlend::Overwrite => store.set_parameter_by_id(&p.id, p.value, weight),
            }
        }
    }
}

impl Playable for Expression {
    fn fade_in_seconds(&self) -> f32 {
        self.fade_in_seconds
    }

    fn fade_out_seconds(&self) -> f32 {
        self.fade_out_seconds
    }

    fn duration(&self) -> Option<f32> {
        None
    }

    fn apply(
        &self,
        store: &mut ParameterStore,
        _targets: &EffectTargets,
        _user_time: f32,
        fade_weight: f32,
        _entry: &mut QueueEntry,
    ) {
        self.apply_to(store, fade_weight);
    }
}

/// Named expression set with a dedicated queue.
#[derive(Debug, Default)]
pub struct ExpressionManager {
    expressions: Vec<(String, Arc<Expression>)>,
    queue: MotionQueueManager,
    current: Option<usize>,
}

impl ExpressionManager {
    pub fn new(expressions: impl IntoIterator<Item = (String, Expression)>) -> Self {
        Self {
            expressions: expressions
                .into_iter()
                .map(|(name, e)| (name, Arc::new(e)))
                .collect(),
            ..Self::default()
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.expressions.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.expressions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }

    /// Name of the expression most recently started.
    pub fn current(&self) -> Option<&str> {
        self.current
            .and_then(|i| self.expressions.get(i))
            .map(|(name, _)| name.as_str())
    }

    pub fn set_expression(&mut self, name: &str, now: f32) -> Option<MotionHandle> {
        let index = self.expressions.iter().position(|(n, _)| n == name)?;
        self.set_expression_by_index(index, now)
    }

    pub fn set_expression_by_index(&mut self, index: usize, now: f32) -> Option<MotionHandle> {
        let (_, expression) = self.expressions.get(index)?;
        let playable: Arc<dyn Playable> = expression.clone();
        self.current = Some(index);
        Some(self.queue.start_motion(playable, false, now))
    }

    /// Fade the active expression out by starting an empty one.
    pub fn reset_expression(&mut self, now: f32) {
        self.current = None;
        self.queue
            .start_motion(Arc::new(Expression::new(Vec::new())), true, now);
    }

    pub fn update(&mut self, store: &mut ParameterStore, now: f32) -> bool {
        self.queue.update(store, now)
    }

    pub fn queue(&self) -> &MotionQueueManager {
        &self.queue
    }
}
