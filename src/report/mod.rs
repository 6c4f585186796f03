//! Telemetry report model.
//!
//! A [`StatsReport`] is one periodic snapshot of a set of entities, each
//! carrying raw counters and gauges plus the calculated metrics attached to
//! it by the engine. Entities keep their insertion order because that order
//! drives calculator application and the exported wire form.

use std::collections::HashMap;

use serde_json::Value;

pub mod wire;

#[cfg(test)]
mod tests;

pub use wire::{StatsPayload, StatsRecord};

/// Tries to read a raw stat value as a number.
///
/// Raw values arrive heterogeneous from the wire: JSON numbers or
/// numeric-looking strings. Anything else yields `None` rather than an
/// error, so calculators can treat unparsable data like missing data.
pub fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// A calculated metric value, produced by a calculator.
///
/// Most calculators produce numbers; reference lookups produce a display
/// string (for example `"opus (payloadType: 111)"`).
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

impl MetricValue {
    /// Numeric view of the value, `None` for text.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            MetricValue::Number(n) => Some(*n),
            MetricValue::Text(_) => None,
        }
    }
}

/// One calculated metric attached to an entity: a name plus an optional
/// value. An absent value means a calculator precondition failed (missing
/// data, coercion failure, non-positive delta).
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatedMetric {
    name: String,
    value: Option<MetricValue>,
}

impl CalculatedMetric {
    pub fn new(name: impl Into<String>, value: Option<MetricValue>) -> Self {
        Self { name: name.into(), value }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> Option<&MetricValue> {
        self.value.as_ref()
    }

    /// Wire form of the value. Absent values export as `0` so downstream
    /// charting always receives a renderable number.
    pub fn value_or_zero(&self) -> Value {
        match &self.value {
            None => Value::from(0),
            Some(MetricValue::Text(s)) => Value::String(s.clone()),
            Some(MetricValue::Number(n)) => {
                serde_json::Number::from_f64(*n).map(Value::Number).unwrap_or_else(|| Value::from(0))
            }
        }
    }
}

/// One entity within a report: an id, a type tag, a timestamp and the raw
/// metric values sampled for it.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySnapshot {
    id: String,
    entity_type: String,
    /// Sample time in seconds.
    timestamp: f64,
    /// Raw fields in insertion order. Lookups are linear; entities carry a
    /// few dozen fields at most.
    raw: Vec<(String, Value)>,
    /// Calculated metrics keyed by the source metric name that produced
    /// them, each list in calculator-registration order.
    calculated: HashMap<String, Vec<CalculatedMetric>>,
}

impl EntitySnapshot {
    pub fn new(id: impl Into<String>, entity_type: impl Into<String>, timestamp: f64) -> Self {
        Self {
            id: id.into(),
            entity_type: entity_type.into(),
            timestamp,
            raw: Vec::new(),
            calculated: HashMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// Sample time in seconds.
    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    /// Sets a raw field. A repeated name overwrites the value in place,
    /// keeping the field's original position (map semantics).
    pub fn set_raw(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.raw.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.raw.push((name, value)),
        }
    }

    /// Raw field by name.
    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.raw.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Raw field coerced to a number. The pseudo-metric `"timestamp"`
    /// resolves to the snapshot timestamp in seconds, so rate calculators
    /// can be configured against it like any other field.
    pub fn number(&self, name: &str) -> Option<f64> {
        if name == "timestamp" {
            return Some(self.timestamp);
        }
        self.raw(name).and_then(to_number)
    }

    /// Raw fields in insertion order.
    pub fn raw_fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.raw.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Calculated metrics stored under a source metric name, in
    /// registration order.
    pub fn calculated_for(&self, source_metric: &str) -> &[CalculatedMetric] {
        self.calculated.get(source_metric).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn push_calculated(&mut self, source_metric: &str, metric: CalculatedMetric) {
        self.calculated.entry(source_metric.to_string()).or_default().push(metric);
    }
}

/// One telemetry snapshot: an insertion-ordered collection of entities with
/// O(1) lookup by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsReport {
    entities: Vec<EntitySnapshot>,
    index: HashMap<String, usize>,
}

impl StatsReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entity. A duplicate id replaces the existing entity in
    /// place, keeping its original position.
    pub fn insert(&mut self, entity: EntitySnapshot) {
        match self.index.get(entity.id()) {
            Some(&pos) => self.entities[pos] = entity,
            None => {
                self.index.insert(entity.id().to_string(), self.entities.len());
                self.entities.push(entity);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&EntitySnapshot> {
        self.index.get(id).map(|&pos| &self.entities[pos])
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut EntitySnapshot> {
        self.index.get(id).map(|&pos| &mut self.entities[pos])
    }

    /// Entities in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &EntitySnapshot> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
