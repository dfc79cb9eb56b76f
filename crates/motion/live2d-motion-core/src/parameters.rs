//! Per-model parameter and part-opacity storage.
//!
//! Real slots come from the model definition and are never removed. Looking up an id the
//! model does not define allocates a phantom slot past the real range: phantom slots start
//! at 0, keep their index for the lifetime of the store and are never clamped.

use std::sync::atomic::{AtomicU64, Ordering};

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::{MotionError, Result};
use crate::ids::{ParameterIndex, PartIndex};

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// Parameter definition as exposed by the model data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterDef {
    pub id: String,
    pub minimum: f32,
    pub maximum: f32,
    pub default: f32,
}

impl ParameterDef {
    pub fn new(id: impl Into<String>, minimum: f32, maximum: f32, default: f32) -> Self {
        Self {
            id: id.into(),
            minimum,
            maximum,
            default,
        }
    }
}

/// Part definition with its initial opacity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PartDef {
    pub id: String,
    pub opacity: f32,
}

impl PartDef {
    pub fn new(id: impl Into<String>, opacity: f32) -> Self {
        Self {
            id: id.into(),
            opacity,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterBounds {
    pub minimum: f32,
    pub maximum: f32,
    pub default: f32,
}

/// Id to slot table. Real slots occupy `0..real`, phantom slots follow in allocation order.
#[derive(Clone, Debug, Default)]
struct SlotTable {
    ids: Vec<String>,
    lookup: HashMap<String, usize>,
    values: Vec<f32>,
    real: usize,
}

impl SlotTable {
    fn new(entries: impl IntoIterator<Item = (String, f32)>) -> Self {
        let mut table = SlotTable::default();
        for (id, value) in entries {
            let index = table.values.len();
            // First definition wins for duplicated ids.
            table.lookup.entry(id.clone()).or_insert(index);
            table.ids.push(id);
            table.values.push(value);
        }
        table.real = table.values.len();
        table
    }

    fn index_of(&mut self, id: &str) -> usize {
        if let Some(&index) = self.lookup.get(id) {
            return index;
        }
        let index = self.values.len();
        self.ids.push(id.to_owned());
        self.values.push(0.0);
        self.lookup.insert(id.to_owned(), index);
        index
    }

    fn find(&self, id: &str) -> Option<usize> {
        self.lookup.get(id).copied()
    }

    fn check(&self, kind: &'static str, index: usize) -> Result<()> {
        if index < self.values.len() {
            Ok(())
        } else {
            Err(MotionError::IndexOutOfRange {
                kind,
                index,
                len: self.values.len(),
            })
        }
    }
}

/// Parameters and part opacities of a single model instance.
#[derive(Clone, Debug)]
pub struct ParameterStore {
    instance: u64,
    parameters: SlotTable,
    bounds: Vec<ParameterBounds>,
    parts: SlotTable,
    saved: Vec<f32>,
}

impl ParameterStore {
    pub fn new(
        parameters: impl IntoIterator<Item = ParameterDef>,
        parts: impl IntoIterator<Item = PartDef>,
    ) -> Self {
        let mut bounds = Vec::new();
        let parameters = SlotTable::new(parameters.into_iter().map(|def| {
            bounds.push(ParameterBounds {
                minimum: def.minimum,
                maximum: def.maximum,
                default: def.default,
            });
            (def.id, def.default)
        }));
        let parts = SlotTable::new(parts.into_iter().map(|def| (def.id, def.opacity)));
        Self {
            instance: NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed),
            parameters,
            bounds,
            parts,
            saved: Vec::new(),
        }
    }

    /// Process-unique id of this store; effects use it to notice a different model.
    pub fn instance_id(&self) -> u64 {
        self.instance
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters.real
    }

    pub fn part_count(&self) -> usize {
        self.parts.real
    }

    pub fn parameter_ids(&self) -> &[String] {
        &self.parameters.ids[..self.parameters.real]
    }

    pub fn part_ids(&self) -> &[String] {
        &self.parts.ids[..self.parts.real]
    }

    /// Values of the real parameters, in model order.
    pub fn values(&self) -> &[f32] {
        &self.parameters.values[..self.parameters.real]
    }

    /// Opacities of the real parts, in model order.
    pub fn part_opacities(&self) -> &[f32] {
        &self.parts.values[..self.parts.real]
    }

    // ----- parameters -----

    /// Index for `id`, allocating a phantom slot on first reference to an unknown id.
    pub fn parameter_index(&mut self, id: &str) -> ParameterIndex {
        ParameterIndex(self.parameters.index_of(id))
    }

    /// Index for `id` without allocating.
    pub fn find_parameter(&self, id: &str) -> Option<ParameterIndex> {
        self.parameters.find(id).map(ParameterIndex)
    }

    pub fn is_phantom_parameter(&self, index: ParameterIndex) -> bool {
        index.0 >= self.parameters.real
    }

    /// Bounds of a real parameter; `None` for phantom or unknown indices.
    pub fn parameter_bounds(&self, index: ParameterIndex) -> Option<ParameterBounds> {
        self.bounds.get(index.0).copied()
    }

    pub fn parameter(&self, index: ParameterIndex) -> Result<f32> {
        self.parameters.check("parameter", index.0)?;
        Ok(self.parameters.values[index.0])
    }

    /// Writes `value` (clamped on real slots), blended with the current value by `weight`.
    pub fn set_parameter(&mut self, index: ParameterIndex, value: f32, weight: f32) -> Result<()> {
        self.parameters.check("parameter", index.0)?;
        self.write_parameter(index.0, value, weight);
        Ok(())
    }

    pub fn add_parameter(&mut self, index: ParameterIndex, value: f32, weight: f32) -> Result<()> {
        let current = self.parameter(index)?;
        self.write_parameter(index.0, current + value * weight, 1.0);
        Ok(())
    }

    pub fn multiply_parameter(
        &mut self,
        index: ParameterIndex,
        value: f32,
        weight: f32,
    ) -> Result<()> {
        let current = self.parameter(index)?;
        self.write_parameter(index.0, current * (1.0 + (value - 1.0) * weight), 1.0);
        Ok(())
    }

    pub fn parameter_by_id(&mut self, id: &str) -> f32 {
        let index = self.parameters.index_of(id);
        self.parameters.values[index]
    }

    pub fn set_parameter_by_id(&mut self, id: &str, value: f32, weight: f32) {
        let index = self.parameters.index_of(id);
        self.write_parameter(index, value, weight);
    }

    pub fn add_parameter_by_id(&mut self, id: &str, value: f32, weight: f32) {
        let index = self.parameters.index_of(id);
        let current = self.parameters.values[index];
        self.write_parameter(index, current + value * weight, 1.0);
    }

    pub fn multiply_parameter_by_id(&mut self, id: &str, value: f32, weight: f32) {
        let index = self.parameters.index_of(id);
        let current = self.parameters.values[index];
        self.write_parameter(index, current * (1.0 + (value - 1.0) * weight), 1.0);
    }

    fn write_parameter(&mut self, index: usize, value: f32, weight: f32) {
        let value = match self.bounds.get(index) {
            Some(b) => value.max(b.minimum).min(b.maximum),
            None => value,
        };
        let slot = &mut self.parameters.values[index];
        *slot = if weight == 1.0 {
            value
        } else {
            *slot * (1.0 - weight) + value * weight
        };
    }

    /// Snapshot of the real parameter values.
    pub fn save_parameters(&mut self) {
        self.saved.clear();
        self.saved
            .extend_from_slice(&self.parameters.values[..self.parameters.real]);
    }

    /// Restores the last snapshot; does nothing before the first save.
    pub fn load_parameters(&mut self) {
        let n = self.saved.len().min(self.parameters.real);
        self.parameters.values[..n].copy_from_slice(&self.saved[..n]);
    }

    // ----- parts -----

    pub fn part_index(&mut self, id: &str) -> PartIndex {
        PartIndex(self.parts.index_of(id))
    }

    pub fn find_part(&self, id: &str) -> Option<PartIndex> {
        self.parts.find(id).map(PartIndex)
    }

    pub fn part_opacity(&self, index: PartIndex) -> Result<f32> {
        self.parts.check("part", index.0)?;
        Ok(self.parts.values[index.0])
    }

    pub fn set_part_opacity(&mut self, index: PartIndex, opacity: f32) -> Result<()> {
        self.parts.check("part", index.0)?;
        self.parts.values[index.0] = opacity;
        Ok(())
    }

    pub fn part_opacity_by_id(&mut self, id: &str) -> f32 {
        let index = self.parts.index_of(id);
        self.parts.values[index]
    }

    pub fn set_part_opacity_by_id(&mut self, id: &str, opacity: f32) {
        let index = self.parts.index_of(id);
        self.parts.values[index] = opacity;
    }
}
