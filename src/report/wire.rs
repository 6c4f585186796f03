//! Flattened wire form used by the surrounding system.
//!
//! Each record carries its stats as a flat array alternating metric names
//! and values (`[name1, value1, name2, value2, ...]`) with the timestamp in
//! milliseconds. The adapter converts to and from [`StatsReport`], skipping
//! malformed records instead of failing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{EntitySnapshot, StatsReport};

/// One wire record, as consumed and produced by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<StatsPayload>,
}

/// The stats payload of a wire record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsPayload {
    /// Sample time in milliseconds.
    pub timestamp: f64,
    /// Flat array alternating metric names and values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Value>>,
}

impl StatsReport {
    /// Builds a report from wire records.
    ///
    /// Records lacking a `stats` or `values` field are skipped silently.
    /// A trailing unpaired name and pairs whose name is not a string are
    /// dropped. Duplicate record ids: last write wins.
    pub fn from_records(records: Vec<StatsRecord>) -> Self {
        let mut report = StatsReport::new();
        for record in records {
            let stats = match record.stats {
                Some(stats) => stats,
                None => {
                    tracing::debug!(id = %record.id, "skipping record without stats");
                    continue;
                }
            };
            let values = match stats.values {
                Some(values) => values,
                None => {
                    tracing::debug!(id = %record.id, "skipping record without values");
                    continue;
                }
            };

            let mut entity =
                EntitySnapshot::new(record.id, record.entity_type, stats.timestamp / 1000.0);
            for pair in values.chunks_exact(2) {
                match pair[0].as_str() {
                    Some(name) => entity.set_raw(name, pair[1].clone()),
                    None => tracing::trace!("skipping stat pair with non-string name"),
                }
            }
            report.insert(entity);
        }
        report
    }

    /// Emits the report in wire form.
    ///
    /// Every raw field is followed immediately by the calculated metrics
    /// stored under its name, in registration order, with absent values
    /// exported as `0`.
    pub fn to_records(&self) -> Vec<StatsRecord> {
        self.iter()
            .map(|entity| {
                let mut values = Vec::new();
                for (name, value) in entity.raw_fields() {
                    values.push(Value::String(name.to_string()));
                    values.push(value.clone());
                    for metric in entity.calculated_for(name) {
                        values.push(Value::String(metric.name().to_string()));
                        values.push(metric.value_or_zero());
                    }
                }
                StatsRecord {
                    id: entity.id().to_string(),
                    entity_type: entity.entity_type().to_string(),
                    stats: Some(StatsPayload {
                        timestamp: entity.timestamp() * 1000.0,
                        values: Some(values),
                    }),
                }
            })
            .collect()
    }
}
