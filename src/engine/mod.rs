//! The engine holds the two most recent reports and drives recomputation.
//!
//! Each ingested report retires the old current report to previous, then a
//! single recomputation pass evaluates every registered calculator against
//! the pair and attaches the results to the current report. The pass is a
//! pure function of `(previous, current, registry)`; previous results are
//! never revised.

use std::sync::Arc;

use crate::error::Result;
use crate::registry::Registry;
use crate::report::{CalculatedMetric, StatsRecord, StatsReport};


/// Derived-metric computation engine over a stream of reports.
///
/// Single-threaded and synchronous; use one engine per independent metric
/// stream and serialize calls to it externally.
#[derive(Debug, Clone)]
pub struct StatsEngine {
    registry: Arc<Registry>,
    previous: Option<StatsReport>,
    current: Option<StatsReport>,
}

impl StatsEngine {
    /// An engine using the standard registry.
    pub fn new() -> Self {
        Self::with_registry(Registry::global())
    }

    /// An engine using a custom registry.
    pub fn with_registry(registry: Arc<Registry>) -> Self {
        Self { registry, previous: None, current: None }
    }

    /// Ingests the next report, making it current and recomputing all
    /// calculated metrics against the retired one. Never fails; malformed
    /// entities yield absent metrics.
    pub fn add_report(&mut self, report: StatsReport) {
        self.previous = self.current.take();
        self.current = Some(report);
        self.recompute();
    }

    /// Ingests wire records (adapter + [`StatsEngine::add_report`]).
    pub fn ingest(&mut self, records: Vec<StatsRecord>) {
        self.add_report(StatsReport::from_records(records));
    }

    /// Ingests wire records from JSON text. The only failure mode is
    /// malformed JSON text; malformed records within valid JSON are
    /// skipped by the adapter.
    pub fn ingest_json(&mut self, json: &str) -> Result<()> {
        let records: Vec<StatsRecord> = serde_json::from_str(json)?;
        self.ingest(records);
        Ok(())
    }

    /// The current report in wire form, empty before the first ingest.
    pub fn export(&self) -> Vec<StatsRecord> {
        self.current.as_ref().map(StatsReport::to_records).unwrap_or_default()
    }

    /// The current report as JSON text.
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.export())?)
    }

    pub fn current(&self) -> Option<&StatsReport> {
        self.current.as_ref()
    }

    pub fn previous(&self) -> Option<&StatsReport> {
        self.previous.as_ref()
    }

    /// One recomputation pass. Evaluates against the immutable report pair
    /// first, then attaches the results, keyed by (entity id, source
    /// metric), in registration order.
    fn recompute(&mut self) {
        let current = match self.current.as_ref() {
            Some(current) => current,
            None => return,
        };
        let previous = self.previous.as_ref();

        let mut results: Vec<(String, String, CalculatedMetric)> = Vec::new();
        for entity in current.iter() {
            for binding in self.registry.bindings_for(entity.entity_type()) {
                for calculator in binding.calculators() {
                    let value = calculator.evaluate(entity.id(), previous, current);
                    results.push((
                        entity.id().to_string(),
                        binding.metric().to_string(),
                        CalculatedMetric::new(calculator.name(), value),
                    ));
                }
            }
        }

        tracing::debug!(
            entities = current.len(),
            metrics = results.len(),
            has_previous = previous.is_some(),
            "recomputed calculated metrics"
        );

        if let Some(current) = self.current.as_mut() {
            for (id, metric, calculated) in results {
                if let Some(entity) = current.get_mut(&id) {
                    entity.push_calculated(&metric, calculated);
                }
            }
        }
    }
}

impl Default for StatsEngine {
    fn default() -> Self {
        Self::new()
    }
}
