//! Breathing: independent sine oscillators added onto parameters.

use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::parameters::ParameterStore;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BreathParameter {
    pub parameter_id: String,
    pub offset: f32,
    pub peak: f32,
    /// Period in seconds; entries with a non-positive cycle are skipped.
    pub cycle: f32,
    pub weight: f32,
}

impl BreathParameter {
    pub fn new(id: impl Into<String>, offset: f32, peak: f32, cycle: f32, weight: f32) -> Self {
        Self {
            parameter_id: id.into(),
            offset,
            peak,
            cycle,
            weight,
        }
    }

    /// Oscillator output at `time` seconds.
    #[inline]
    pub fn value_at(&self, time: f32) -> f32 {
        self.offset + self.peak * (TAU * time / self.cycle).sin()
    }
}

#[derive(Clone, Debug, Default)]
pub struct Breath {
    parameters: Vec<BreathParameter>,
    current_time: f32,
}

impl Breath {
    pub fn new(parameters: Vec<BreathParameter>) -> Self {
        Self {
            parameters,
            current_time: 0.0,
        }
    }

    /// Head sway on the three angle axes, body sway and the breath parameter.
    pub fn with_default_parameters() -> Self {
        Self::new(vec![
            BreathParameter::new("ParamAngleX", 0.0, 15.0, 6.5345, 0.5),
            BreathParameter::new("ParamAngleY", 0.0, 8.0, 3.5345, 0.5),
            BreathParameter::new("ParamAngleZ", 0.0, 10.0, 5.5345, 0.5),
            BreathParameter::new("ParamBodyAngleX", 0.0, 4.0, 15.5345, 0.5),
            BreathParameter::new("ParamBreath", 0.5, 0.5, 3.2345, 0.5),
        ])
    }

    pub fn parameters(&self) -> &[BreathParameter] {
        &self.parameters
    }

    pub fn set_parameters(&mut self, parameters: Vec<BreathParameter>) {
        self.parameters = parameters;
    }

    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    pub fn update(&mut self, store: &mut ParameterStore, dt: f32) {
        self.current_time += dt;
        for p in self.parameters.iter().filter(|p| p.cycle > 0.0) {
            store.add_parameter_by_id(&p.parameter_id, p.value_at(self.current_time), p.weight);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::ParameterDef;

    #[test]
    fn adds_weighted_sine_of_accumulated_time() {
        let mut store = ParameterStore::new([ParameterDef::new("ParamBreath", 0.0, 10.0, 0.0)], []);
        let mut breath = Breath::new(vec![BreathParameter::new("ParamBreath", 1.0, 2.0, 4.0, 0.5)]);
        breath.update(&mut store, 1.0);
        // quarter cycle: offset + peak
        assert!((store.parameter_by_id("ParamBreath") - 1.5).abs() < 1e-5);
        store.set_parameter_by_id("ParamBreath", 0.0, 1.0);
        breath.update(&mut store, 1.0);
        assert!((store.parameter_by_id("ParamBreath") - 0.5).abs() < 1e-5);
    }

    #[test]
    fn zero_cycle_is_ignored() {
        let mut store = ParameterStore::new([ParameterDef::new("P", -1.0, 1.0, 0.0)], []);
        let mut breath = Breath::new(vec![BreathParameter::new("P", 0.0, 1.0, 0.0, 1.0)]);
        breath.update(&mut store, 0.3);
        assert_eq!(store.parameter_by_id("P"), 0.0);
    }
}
